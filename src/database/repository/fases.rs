use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Fase, TopicoMsa};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaseInput {
    pub nome: String,
    pub ordem: i32,
    #[serde(default)]
    pub descricao: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicoInput {
    pub titulo: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub ordem: i32,
}

pub async fn list(pool: &PgPool) -> Result<Vec<Fase>, DatabaseError> {
    let fases = sqlx::query_as::<_, Fase>("SELECT * FROM fases ORDER BY ordem")
        .fetch_all(pool)
        .await?;

    Ok(fases)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Fase>, DatabaseError> {
    let fase = sqlx::query_as::<_, Fase>("SELECT * FROM fases WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(fase)
}

pub async fn insert(pool: &PgPool, input: &FaseInput) -> Result<Fase, DatabaseError> {
    let fase = sqlx::query_as::<_, Fase>(
        "INSERT INTO fases (id, nome, ordem, descricao)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(input.nome.trim())
    .bind(input.ordem)
    .bind(input.descricao.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(fase)
}

pub async fn update(pool: &PgPool, id: Uuid, input: &FaseInput) -> Result<Fase, DatabaseError> {
    let fase = sqlx::query_as::<_, Fase>(
        "UPDATE fases SET nome = $2, ordem = $3, descricao = $4, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(input.nome.trim())
    .bind(input.ordem)
    .bind(input.descricao.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(fase)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM fases WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_topicos(pool: &PgPool, fase_id: Uuid) -> Result<Vec<TopicoMsa>, DatabaseError> {
    let topicos = sqlx::query_as::<_, TopicoMsa>(
        "SELECT * FROM topicos_msa WHERE fase_id = $1 ORDER BY ordem, titulo",
    )
    .bind(fase_id)
    .fetch_all(pool)
    .await?;

    Ok(topicos)
}

pub async fn find_topico(pool: &PgPool, id: Uuid) -> Result<Option<TopicoMsa>, DatabaseError> {
    let topico = sqlx::query_as::<_, TopicoMsa>("SELECT * FROM topicos_msa WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(topico)
}

pub async fn insert_topico(pool: &PgPool, fase_id: Uuid, input: &TopicoInput) -> Result<TopicoMsa, DatabaseError> {
    let topico = sqlx::query_as::<_, TopicoMsa>(
        "INSERT INTO topicos_msa (id, fase_id, titulo, descricao, ordem)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(fase_id)
    .bind(input.titulo.trim())
    .bind(input.descricao.as_deref())
    .bind(input.ordem)
    .fetch_one(pool)
    .await?;

    Ok(topico)
}

pub async fn update_topico(pool: &PgPool, id: Uuid, input: &TopicoInput) -> Result<TopicoMsa, DatabaseError> {
    let topico = sqlx::query_as::<_, TopicoMsa>(
        "UPDATE topicos_msa SET titulo = $2, descricao = $3, ordem = $4, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(input.titulo.trim())
    .bind(input.descricao.as_deref())
    .bind(input.ordem)
    .fetch_one(pool)
    .await?;

    Ok(topico)
}

pub async fn delete_topico(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM topicos_msa WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
