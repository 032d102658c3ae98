use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{AulaRegistro, Avaliacao, FichaAcompanhamento};
use crate::types::TipoAula;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FichaFiltro {
    pub aluno_id: Option<Uuid>,
    pub finalizada: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AulaInput {
    pub numero_aula: i32,
    pub data: NaiveDate,
    #[serde(default)]
    pub presenca: bool,
    #[serde(default)]
    pub conteudo: Option<String>,
    #[serde(default)]
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvaliacaoInput {
    pub numero: i32,
    #[serde(default)]
    pub data: Option<NaiveDate>,
    #[serde(default)]
    pub nota: Option<f64>,
    #[serde(default)]
    pub observacoes: Option<String>,
}

/// Values written by a successful finalization
pub struct Finalizacao<'a> {
    pub media_final: Option<f64>,
    pub apto: bool,
    pub observacoes: Option<&'a str>,
}

pub async fn list(pool: &PgPool, scope: Option<Uuid>, filtro: &FichaFiltro) -> Result<Vec<FichaAcompanhamento>, DatabaseError> {
    let fichas = sqlx::query_as::<_, FichaAcompanhamento>(
        "SELECT f.* FROM fichas_acompanhamento f
         JOIN alunos a ON a.id = f.aluno_id
         WHERE ($1::uuid IS NULL OR f.instrutor_id = $1 OR a.instrutor_id = $1 OR a.instrutor_secundario_id = $1)
           AND ($2::uuid IS NULL OR f.aluno_id = $2)
           AND ($3::bool IS NULL OR (f.finalizada_em IS NOT NULL) = $3)
         ORDER BY f.data_inicio DESC, f.created_at DESC",
    )
    .bind(scope)
    .bind(filtro.aluno_id)
    .bind(filtro.finalizada)
    .fetch_all(pool)
    .await?;

    Ok(fichas)
}

pub async fn list_by_aluno(pool: &PgPool, aluno_id: Uuid) -> Result<Vec<FichaAcompanhamento>, DatabaseError> {
    list(
        pool,
        None,
        &FichaFiltro {
            aluno_id: Some(aluno_id),
            finalizada: None,
        },
    )
    .await
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<FichaAcompanhamento>, DatabaseError> {
    let ficha = sqlx::query_as::<_, FichaAcompanhamento>("SELECT * FROM fichas_acompanhamento WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(ficha)
}

pub async fn insert(
    pool: &PgPool,
    aluno_id: Uuid,
    instrutor_id: Uuid,
    tipo_aula: TipoAula,
    data_inicio: NaiveDate,
) -> Result<FichaAcompanhamento, DatabaseError> {
    let ficha = sqlx::query_as::<_, FichaAcompanhamento>(
        "INSERT INTO fichas_acompanhamento (id, aluno_id, instrutor_id, tipo_aula, data_inicio)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(aluno_id)
    .bind(instrutor_id)
    .bind(tipo_aula.as_str())
    .bind(data_inicio)
    .fetch_one(pool)
    .await?;

    Ok(ficha)
}

pub async fn update(pool: &PgPool, ficha: &FichaAcompanhamento) -> Result<FichaAcompanhamento, DatabaseError> {
    let updated = sqlx::query_as::<_, FichaAcompanhamento>(
        "UPDATE fichas_acompanhamento
         SET instrutor_id = $2, tipo_aula = $3, data_inicio = $4, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(ficha.id)
    .bind(ficha.instrutor_id)
    .bind(ficha.tipo_aula.as_str())
    .bind(ficha.data_inicio)
    .fetch_one(pool)
    .await?;

    Ok(updated)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM fichas_acompanhamento WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// One-shot transition: returns `None` if the ficha was already finalized
/// (including by a concurrent request)
pub async fn finalize(
    pool: &PgPool,
    id: Uuid,
    finalizacao: &Finalizacao<'_>,
) -> Result<Option<FichaAcompanhamento>, DatabaseError> {
    let ficha = sqlx::query_as::<_, FichaAcompanhamento>(
        "UPDATE fichas_acompanhamento
         SET media_final = $2, apto = $3, observacoes_finais = $4, finalizada_em = now(), updated_at = now()
         WHERE id = $1 AND finalizada_em IS NULL
         RETURNING *",
    )
    .bind(id)
    .bind(finalizacao.media_final)
    .bind(finalizacao.apto)
    .bind(finalizacao.observacoes)
    .fetch_optional(pool)
    .await?;

    Ok(ficha)
}

pub async fn list_aulas(pool: &PgPool, ficha_id: Uuid) -> Result<Vec<AulaRegistro>, DatabaseError> {
    let aulas = sqlx::query_as::<_, AulaRegistro>(
        "SELECT * FROM aula_registros WHERE ficha_id = $1 ORDER BY numero_aula",
    )
    .bind(ficha_id)
    .fetch_all(pool)
    .await?;

    Ok(aulas)
}

pub async fn find_aula(pool: &PgPool, ficha_id: Uuid, aula_id: Uuid) -> Result<Option<AulaRegistro>, DatabaseError> {
    let aula = sqlx::query_as::<_, AulaRegistro>(
        "SELECT * FROM aula_registros WHERE id = $1 AND ficha_id = $2",
    )
    .bind(aula_id)
    .bind(ficha_id)
    .fetch_optional(pool)
    .await?;

    Ok(aula)
}

/// Locks the parent ficha against finalization for the rest of the statement;
/// selects nothing once it is finalized
const FICHA_ABERTA: &str =
    "WITH aberta AS (SELECT id FROM fichas_acompanhamento WHERE id = $2 AND finalizada_em IS NULL FOR SHARE)";

/// `None` when the ficha was finalized before the insert ran
pub async fn insert_aula(pool: &PgPool, ficha_id: Uuid, input: &AulaInput) -> Result<Option<AulaRegistro>, DatabaseError> {
    let sql = format!(
        "{FICHA_ABERTA}
         INSERT INTO aula_registros (id, ficha_id, numero_aula, data, presenca, conteudo, observacoes)
         SELECT $1, aberta.id, $3, $4, $5, $6, $7 FROM aberta
         RETURNING *"
    );
    let aula = sqlx::query_as::<_, AulaRegistro>(&sql)
        .bind(Uuid::new_v4())
        .bind(ficha_id)
        .bind(input.numero_aula)
        .bind(input.data)
        .bind(input.presenca)
        .bind(input.conteudo.as_deref())
        .bind(input.observacoes.as_deref())
        .fetch_optional(pool)
        .await?;

    Ok(aula)
}

/// `None` when the ficha is finalized
pub async fn update_aula(pool: &PgPool, aula: &AulaRegistro) -> Result<Option<AulaRegistro>, DatabaseError> {
    let sql = format!(
        "{FICHA_ABERTA}
         UPDATE aula_registros
         SET numero_aula = $3, data = $4, presenca = $5, conteudo = $6, observacoes = $7, updated_at = now()
         WHERE id = $1 AND ficha_id IN (SELECT id FROM aberta)
         RETURNING *"
    );
    let updated = sqlx::query_as::<_, AulaRegistro>(&sql)
        .bind(aula.id)
        .bind(aula.ficha_id)
        .bind(aula.numero_aula)
        .bind(aula.data)
        .bind(aula.presenca)
        .bind(aula.conteudo.as_deref())
        .bind(aula.observacoes.as_deref())
        .fetch_optional(pool)
        .await?;

    Ok(updated)
}

/// `false` when the ficha is finalized or the aula is gone
pub async fn delete_aula(pool: &PgPool, ficha_id: Uuid, aula_id: Uuid) -> Result<bool, DatabaseError> {
    let sql = format!(
        "{FICHA_ABERTA}
         DELETE FROM aula_registros WHERE id = $1 AND ficha_id IN (SELECT id FROM aberta)"
    );
    let result = sqlx::query(&sql)
        .bind(aula_id)
        .bind(ficha_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_avaliacoes(pool: &PgPool, ficha_id: Uuid) -> Result<Vec<Avaliacao>, DatabaseError> {
    let avaliacoes = sqlx::query_as::<_, Avaliacao>(
        "SELECT * FROM avaliacoes WHERE ficha_id = $1 ORDER BY numero",
    )
    .bind(ficha_id)
    .fetch_all(pool)
    .await?;

    Ok(avaliacoes)
}

pub async fn find_avaliacao(pool: &PgPool, ficha_id: Uuid, avaliacao_id: Uuid) -> Result<Option<Avaliacao>, DatabaseError> {
    let avaliacao = sqlx::query_as::<_, Avaliacao>(
        "SELECT * FROM avaliacoes WHERE id = $1 AND ficha_id = $2",
    )
    .bind(avaliacao_id)
    .bind(ficha_id)
    .fetch_optional(pool)
    .await?;

    Ok(avaliacao)
}

/// `None` when the ficha was finalized before the insert ran
pub async fn insert_avaliacao(
    pool: &PgPool,
    ficha_id: Uuid,
    input: &AvaliacaoInput,
) -> Result<Option<Avaliacao>, DatabaseError> {
    let sql = format!(
        "{FICHA_ABERTA}
         INSERT INTO avaliacoes (id, ficha_id, numero, data, nota, observacoes)
         SELECT $1, aberta.id, $3, $4, $5, $6 FROM aberta
         RETURNING *"
    );
    let avaliacao = sqlx::query_as::<_, Avaliacao>(&sql)
        .bind(Uuid::new_v4())
        .bind(ficha_id)
        .bind(input.numero)
        .bind(input.data)
        .bind(input.nota)
        .bind(input.observacoes.as_deref())
        .fetch_optional(pool)
        .await?;

    Ok(avaliacao)
}

/// `None` when the ficha is finalized
pub async fn update_avaliacao(pool: &PgPool, avaliacao: &Avaliacao) -> Result<Option<Avaliacao>, DatabaseError> {
    let sql = format!(
        "{FICHA_ABERTA}
         UPDATE avaliacoes
         SET numero = $3, data = $4, nota = $5, observacoes = $6, updated_at = now()
         WHERE id = $1 AND ficha_id IN (SELECT id FROM aberta)
         RETURNING *"
    );
    let updated = sqlx::query_as::<_, Avaliacao>(&sql)
        .bind(avaliacao.id)
        .bind(avaliacao.ficha_id)
        .bind(avaliacao.numero)
        .bind(avaliacao.data)
        .bind(avaliacao.nota)
        .bind(avaliacao.observacoes.as_deref())
        .fetch_optional(pool)
        .await?;

    Ok(updated)
}

/// `false` when the ficha is finalized or the avaliação is gone
pub async fn delete_avaliacao(pool: &PgPool, ficha_id: Uuid, avaliacao_id: Uuid) -> Result<bool, DatabaseError> {
    let sql = format!(
        "{FICHA_ABERTA}
         DELETE FROM avaliacoes WHERE id = $1 AND ficha_id IN (SELECT id FROM aberta)"
    );
    let result = sqlx::query(&sql)
        .bind(avaliacao_id)
        .bind(ficha_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
