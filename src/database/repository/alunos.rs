use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Aluno;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlunoInput {
    pub nome: String,
    #[serde(default)]
    pub data_nascimento: Option<NaiveDate>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub congregacao: String,
    pub instrumento_id: Uuid,
    pub fase_id: Uuid,
    /// Defaults to the caller's own profile when an instrutor creates the aluno
    #[serde(default)]
    pub instrutor_id: Option<Uuid>,
    #[serde(default)]
    pub instrutor_secundario_id: Option<Uuid>,
    #[serde(default = "default_ativo")]
    pub ativo: bool,
    #[serde(default)]
    pub observacoes: Option<String>,
}

fn default_ativo() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlunoFiltro {
    pub fase_id: Option<Uuid>,
    pub instrumento_id: Option<Uuid>,
    pub ativo: Option<bool>,
    pub busca: Option<String>,
}

/// `scope` restricts to alunos where the instrutor is primary or secondary
pub async fn list(pool: &PgPool, scope: Option<Uuid>, filtro: &AlunoFiltro) -> Result<Vec<Aluno>, DatabaseError> {
    let busca = filtro
        .busca
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty());

    let alunos = sqlx::query_as::<_, Aluno>(
        "SELECT * FROM alunos
         WHERE ($1::uuid IS NULL OR instrutor_id = $1 OR instrutor_secundario_id = $1)
           AND ($2::uuid IS NULL OR fase_id = $2)
           AND ($3::uuid IS NULL OR instrumento_id = $3)
           AND ($4::bool IS NULL OR ativo = $4)
           AND ($5::text IS NULL OR nome ILIKE '%' || $5 || '%')
         ORDER BY nome",
    )
    .bind(scope)
    .bind(filtro.fase_id)
    .bind(filtro.instrumento_id)
    .bind(filtro.ativo)
    .bind(busca)
    .fetch_all(pool)
    .await?;

    Ok(alunos)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Aluno>, DatabaseError> {
    let aluno = sqlx::query_as::<_, Aluno>("SELECT * FROM alunos WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(aluno)
}

/// `input.instrutor_id` must already be resolved
pub async fn insert(pool: &PgPool, input: &AlunoInput, instrutor_id: Uuid) -> Result<Aluno, DatabaseError> {
    let aluno = sqlx::query_as::<_, Aluno>(
        "INSERT INTO alunos (
             id, nome, data_nascimento, telefone, email, congregacao, instrumento_id, fase_id,
             instrutor_id, instrutor_secundario_id, ativo, observacoes
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(input.nome.trim())
    .bind(input.data_nascimento)
    .bind(input.telefone.as_deref())
    .bind(input.email.as_deref())
    .bind(input.congregacao.trim())
    .bind(input.instrumento_id)
    .bind(input.fase_id)
    .bind(instrutor_id)
    .bind(input.instrutor_secundario_id)
    .bind(input.ativo)
    .bind(input.observacoes.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(aluno)
}

/// Writes every mutable column of `aluno`
pub async fn update(pool: &PgPool, aluno: &Aluno) -> Result<Aluno, DatabaseError> {
    let updated = sqlx::query_as::<_, Aluno>(
        "UPDATE alunos SET
             nome = $2, data_nascimento = $3, telefone = $4, email = $5, congregacao = $6,
             instrumento_id = $7, fase_id = $8, instrutor_id = $9, instrutor_secundario_id = $10,
             ativo = $11, observacoes = $12, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(aluno.id)
    .bind(&aluno.nome)
    .bind(aluno.data_nascimento)
    .bind(aluno.telefone.as_deref())
    .bind(aluno.email.as_deref())
    .bind(&aluno.congregacao)
    .bind(aluno.instrumento_id)
    .bind(aluno.fase_id)
    .bind(aluno.instrutor_id)
    .bind(aluno.instrutor_secundario_id)
    .bind(aluno.ativo)
    .bind(aluno.observacoes.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(updated)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM alunos WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
