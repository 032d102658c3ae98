use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{ProgramaMinimo, ProgramaMinimoItem};
use crate::types::NivelPrograma;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramaInput {
    pub instrumento_id: Uuid,
    pub nivel: NivelPrograma,
    #[serde(default)]
    pub descricao: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    pub titulo: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub ordem: i32,
    #[serde(default = "default_obrigatorio")]
    pub obrigatorio: bool,
}

fn default_obrigatorio() -> bool {
    true
}

pub async fn list(pool: &PgPool, instrumento_id: Option<Uuid>) -> Result<Vec<ProgramaMinimo>, DatabaseError> {
    let programas = sqlx::query_as::<_, ProgramaMinimo>(
        "SELECT p.* FROM programas_minimos p
         JOIN instrumentos i ON i.id = p.instrumento_id
         WHERE ($1::uuid IS NULL OR p.instrumento_id = $1)
         ORDER BY i.nome, p.nivel",
    )
    .bind(instrumento_id)
    .fetch_all(pool)
    .await?;

    Ok(programas)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<ProgramaMinimo>, DatabaseError> {
    let programa = sqlx::query_as::<_, ProgramaMinimo>("SELECT * FROM programas_minimos WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(programa)
}

pub async fn find_by_nivel(
    pool: &PgPool,
    instrumento_id: Uuid,
    nivel: NivelPrograma,
) -> Result<Option<ProgramaMinimo>, DatabaseError> {
    let programa = sqlx::query_as::<_, ProgramaMinimo>(
        "SELECT * FROM programas_minimos WHERE instrumento_id = $1 AND nivel = $2",
    )
    .bind(instrumento_id)
    .bind(nivel.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(programa)
}

pub async fn insert(pool: &PgPool, input: &ProgramaInput) -> Result<ProgramaMinimo, DatabaseError> {
    let programa = sqlx::query_as::<_, ProgramaMinimo>(
        "INSERT INTO programas_minimos (id, instrumento_id, nivel, descricao)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(input.instrumento_id)
    .bind(input.nivel.as_str())
    .bind(input.descricao.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(programa)
}

pub async fn update(pool: &PgPool, programa: &ProgramaMinimo) -> Result<ProgramaMinimo, DatabaseError> {
    let updated = sqlx::query_as::<_, ProgramaMinimo>(
        "UPDATE programas_minimos SET instrumento_id = $2, nivel = $3, descricao = $4, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(programa.id)
    .bind(programa.instrumento_id)
    .bind(programa.nivel.as_str())
    .bind(programa.descricao.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(updated)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM programas_minimos WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_itens(pool: &PgPool, programa_id: Uuid) -> Result<Vec<ProgramaMinimoItem>, DatabaseError> {
    let itens = sqlx::query_as::<_, ProgramaMinimoItem>(
        "SELECT * FROM programa_minimo_itens WHERE programa_id = $1 ORDER BY ordem, titulo",
    )
    .bind(programa_id)
    .fetch_all(pool)
    .await?;

    Ok(itens)
}

pub async fn find_item(pool: &PgPool, id: Uuid) -> Result<Option<ProgramaMinimoItem>, DatabaseError> {
    let item = sqlx::query_as::<_, ProgramaMinimoItem>("SELECT * FROM programa_minimo_itens WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(item)
}

pub async fn insert_item(pool: &PgPool, programa_id: Uuid, input: &ItemInput) -> Result<ProgramaMinimoItem, DatabaseError> {
    let item = sqlx::query_as::<_, ProgramaMinimoItem>(
        "INSERT INTO programa_minimo_itens (id, programa_id, ordem, titulo, descricao, obrigatorio)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(programa_id)
    .bind(input.ordem)
    .bind(input.titulo.trim())
    .bind(input.descricao.as_deref())
    .bind(input.obrigatorio)
    .fetch_one(pool)
    .await?;

    Ok(item)
}

pub async fn update_item(pool: &PgPool, item: &ProgramaMinimoItem) -> Result<ProgramaMinimoItem, DatabaseError> {
    let updated = sqlx::query_as::<_, ProgramaMinimoItem>(
        "UPDATE programa_minimo_itens
         SET ordem = $2, titulo = $3, descricao = $4, obrigatorio = $5, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(item.id)
    .bind(item.ordem)
    .bind(&item.titulo)
    .bind(item.descricao.as_deref())
    .bind(item.obrigatorio)
    .fetch_one(pool)
    .await?;

    Ok(updated)
}

pub async fn delete_item(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM programa_minimo_itens WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
