use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Aluno, PresencaSessao, SessaoAula, Turma};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurmaInput {
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub instrutor_id: Option<Uuid>,
    #[serde(default)]
    pub instrutor_secundario_id: Option<Uuid>,
    #[serde(default)]
    pub instrumento_id: Option<Uuid>,
    #[serde(default)]
    pub fase_id: Option<Uuid>,
    #[serde(default = "default_ativa")]
    pub ativa: bool,
}

fn default_ativa() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessaoInput {
    pub data: NaiveDate,
    #[serde(default)]
    pub conteudo: Option<String>,
    #[serde(default)]
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresencaInput {
    pub aluno_id: Uuid,
    pub presente: bool,
    #[serde(default)]
    pub observacao: Option<String>,
}

pub async fn list(pool: &PgPool, scope: Option<Uuid>, ativa: Option<bool>) -> Result<Vec<Turma>, DatabaseError> {
    let turmas = sqlx::query_as::<_, Turma>(
        "SELECT * FROM turmas
         WHERE ($1::uuid IS NULL OR instrutor_id = $1 OR instrutor_secundario_id = $1)
           AND ($2::bool IS NULL OR ativa = $2)
         ORDER BY nome",
    )
    .bind(scope)
    .bind(ativa)
    .fetch_all(pool)
    .await?;

    Ok(turmas)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Turma>, DatabaseError> {
    let turma = sqlx::query_as::<_, Turma>("SELECT * FROM turmas WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(turma)
}

pub async fn insert(pool: &PgPool, input: &TurmaInput, instrutor_id: Uuid) -> Result<Turma, DatabaseError> {
    let turma = sqlx::query_as::<_, Turma>(
        "INSERT INTO turmas (id, nome, descricao, instrutor_id, instrutor_secundario_id, instrumento_id, fase_id, ativa)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(input.nome.trim())
    .bind(input.descricao.as_deref())
    .bind(instrutor_id)
    .bind(input.instrutor_secundario_id)
    .bind(input.instrumento_id)
    .bind(input.fase_id)
    .bind(input.ativa)
    .fetch_one(pool)
    .await?;

    Ok(turma)
}

pub async fn update(pool: &PgPool, turma: &Turma) -> Result<Turma, DatabaseError> {
    let updated = sqlx::query_as::<_, Turma>(
        "UPDATE turmas SET
             nome = $2, descricao = $3, instrutor_id = $4, instrutor_secundario_id = $5,
             instrumento_id = $6, fase_id = $7, ativa = $8, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(turma.id)
    .bind(&turma.nome)
    .bind(turma.descricao.as_deref())
    .bind(turma.instrutor_id)
    .bind(turma.instrutor_secundario_id)
    .bind(turma.instrumento_id)
    .bind(turma.fase_id)
    .bind(turma.ativa)
    .fetch_one(pool)
    .await?;

    Ok(updated)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM turmas WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_alunos(pool: &PgPool, turma_id: Uuid) -> Result<Vec<Aluno>, DatabaseError> {
    let alunos = sqlx::query_as::<_, Aluno>(
        "SELECT a.* FROM alunos a
         JOIN turma_alunos ta ON ta.aluno_id = a.id
         WHERE ta.turma_id = $1
         ORDER BY a.nome",
    )
    .bind(turma_id)
    .fetch_all(pool)
    .await?;

    Ok(alunos)
}

/// Returns false when the aluno was already a member
pub async fn add_aluno(pool: &PgPool, turma_id: Uuid, aluno_id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        "INSERT INTO turma_alunos (turma_id, aluno_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(turma_id)
    .bind(aluno_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn remove_aluno(pool: &PgPool, turma_id: Uuid, aluno_id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM turma_alunos WHERE turma_id = $1 AND aluno_id = $2")
        .bind(turma_id)
        .bind(aluno_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn member_ids(pool: &PgPool, turma_id: Uuid) -> Result<Vec<Uuid>, DatabaseError> {
    let ids: Vec<(Uuid,)> = sqlx::query_as("SELECT aluno_id FROM turma_alunos WHERE turma_id = $1")
        .bind(turma_id)
        .fetch_all(pool)
        .await?;

    Ok(ids.into_iter().map(|(id,)| id).collect())
}

pub async fn list_sessoes(pool: &PgPool, turma_id: Uuid) -> Result<Vec<SessaoAula>, DatabaseError> {
    let sessoes = sqlx::query_as::<_, SessaoAula>(
        "SELECT * FROM sessoes_aula WHERE turma_id = $1 ORDER BY data DESC, created_at DESC",
    )
    .bind(turma_id)
    .fetch_all(pool)
    .await?;

    Ok(sessoes)
}

pub async fn find_sessao(pool: &PgPool, turma_id: Uuid, sessao_id: Uuid) -> Result<Option<SessaoAula>, DatabaseError> {
    let sessao = sqlx::query_as::<_, SessaoAula>(
        "SELECT * FROM sessoes_aula WHERE id = $1 AND turma_id = $2",
    )
    .bind(sessao_id)
    .bind(turma_id)
    .fetch_optional(pool)
    .await?;

    Ok(sessao)
}

pub async fn insert_sessao(pool: &PgPool, turma_id: Uuid, input: &SessaoInput) -> Result<SessaoAula, DatabaseError> {
    let sessao = sqlx::query_as::<_, SessaoAula>(
        "INSERT INTO sessoes_aula (id, turma_id, data, conteudo, observacoes)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(turma_id)
    .bind(input.data)
    .bind(input.conteudo.as_deref())
    .bind(input.observacoes.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(sessao)
}

pub async fn update_sessao(pool: &PgPool, sessao: &SessaoAula) -> Result<SessaoAula, DatabaseError> {
    let updated = sqlx::query_as::<_, SessaoAula>(
        "UPDATE sessoes_aula SET data = $2, conteudo = $3, observacoes = $4, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(sessao.id)
    .bind(sessao.data)
    .bind(sessao.conteudo.as_deref())
    .bind(sessao.observacoes.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(updated)
}

pub async fn delete_sessao(pool: &PgPool, sessao_id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM sessoes_aula WHERE id = $1")
        .bind(sessao_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_presencas(pool: &PgPool, sessao_id: Uuid) -> Result<Vec<PresencaSessao>, DatabaseError> {
    let presencas = sqlx::query_as::<_, PresencaSessao>(
        "SELECT * FROM presencas_sessao WHERE sessao_id = $1",
    )
    .bind(sessao_id)
    .fetch_all(pool)
    .await?;

    Ok(presencas)
}

pub async fn upsert_presenca(
    conn: &mut PgConnection,
    sessao_id: Uuid,
    presenca: &PresencaInput,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO presencas_sessao (sessao_id, aluno_id, presente, observacao)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (sessao_id, aluno_id)
         DO UPDATE SET presente = EXCLUDED.presente, observacao = EXCLUDED.observacao",
    )
    .bind(sessao_id)
    .bind(presenca.aluno_id)
    .bind(presenca.presente)
    .bind(presenca.observacao.as_deref())
    .execute(conn)
    .await?;

    Ok(())
}
