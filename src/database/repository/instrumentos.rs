use serde::Deserialize;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Instrumento;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentoInput {
    pub nome: String,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(default = "default_ativo")]
    pub ativo: bool,
}

fn default_ativo() -> bool {
    true
}

pub async fn list(pool: &PgPool, somente_ativos: bool) -> Result<Vec<Instrumento>, DatabaseError> {
    let instrumentos = sqlx::query_as::<_, Instrumento>(
        "SELECT * FROM instrumentos WHERE (NOT $1 OR ativo) ORDER BY nome",
    )
    .bind(somente_ativos)
    .fetch_all(pool)
    .await?;

    Ok(instrumentos)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Instrumento>, DatabaseError> {
    let instrumento = sqlx::query_as::<_, Instrumento>("SELECT * FROM instrumentos WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(instrumento)
}

/// Ids among `ids` that exist and are active
pub async fn active_ids<'e, E: PgExecutor<'e>>(executor: E, ids: &[Uuid]) -> Result<Vec<Uuid>, DatabaseError> {
    let found: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM instrumentos WHERE id = ANY($1) AND ativo")
        .bind(ids)
        .fetch_all(executor)
        .await?;

    Ok(found.into_iter().map(|(id,)| id).collect())
}

pub async fn insert(pool: &PgPool, input: &InstrumentoInput) -> Result<Instrumento, DatabaseError> {
    let instrumento = sqlx::query_as::<_, Instrumento>(
        "INSERT INTO instrumentos (id, nome, categoria, ativo)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(input.nome.trim())
    .bind(input.categoria.as_deref())
    .bind(input.ativo)
    .fetch_one(pool)
    .await?;

    Ok(instrumento)
}

pub async fn update(pool: &PgPool, id: Uuid, input: &InstrumentoInput) -> Result<Instrumento, DatabaseError> {
    let instrumento = sqlx::query_as::<_, Instrumento>(
        "UPDATE instrumentos SET nome = $2, categoria = $3, ativo = $4, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(input.nome.trim())
    .bind(input.categoria.as_deref())
    .bind(input.ativo)
    .fetch_one(pool)
    .await?;

    Ok(instrumento)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM instrumentos WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
