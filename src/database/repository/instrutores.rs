use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Instrutor, InstrutorDetalhe};

const DETALHE_SELECT: &str = "
    SELECT i.id, i.usuario_id, u.nome, u.email, u.role, u.ativo, i.congregacao, i.telefone,
           COALESCE(
               array_agg(ii.instrumento_id ORDER BY ii.instrumento_id)
                   FILTER (WHERE ii.instrumento_id IS NOT NULL),
               '{}'
           ) AS instrumento_ids,
           i.created_at, i.updated_at
    FROM instrutores i
    JOIN usuarios u ON u.id = i.usuario_id
    LEFT JOIN instrutor_instrumentos ii ON ii.instrutor_id = i.id";

pub async fn insert<'e, E: PgExecutor<'e>>(
    executor: E,
    usuario_id: Uuid,
    congregacao: &str,
    telefone: Option<&str>,
) -> Result<Instrutor, DatabaseError> {
    let instrutor = sqlx::query_as::<_, Instrutor>(
        "INSERT INTO instrutores (id, usuario_id, congregacao, telefone)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(usuario_id)
    .bind(congregacao)
    .bind(telefone)
    .fetch_one(executor)
    .await?;

    Ok(instrutor)
}

/// Replaces the taught-instruments list
pub async fn set_instrumentos(
    conn: &mut PgConnection,
    instrutor_id: Uuid,
    instrumento_ids: &[Uuid],
) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM instrutor_instrumentos WHERE instrutor_id = $1")
        .bind(instrutor_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        "INSERT INTO instrutor_instrumentos (instrutor_id, instrumento_id)
         SELECT $1, UNNEST($2::uuid[])
         ON CONFLICT DO NOTHING",
    )
    .bind(instrutor_id)
    .bind(instrumento_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Instrutor>, DatabaseError> {
    let instrutor = sqlx::query_as::<_, Instrutor>("SELECT * FROM instrutores WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(instrutor)
}

pub async fn find_detalhe(pool: &PgPool, id: Uuid) -> Result<Option<InstrutorDetalhe>, DatabaseError> {
    let sql = format!("{} WHERE i.id = $1 GROUP BY i.id, u.id", DETALHE_SELECT);
    let instrutor = sqlx::query_as::<_, InstrutorDetalhe>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(instrutor)
}

pub async fn list_detalhe(pool: &PgPool, congregacao: Option<&str>) -> Result<Vec<InstrutorDetalhe>, DatabaseError> {
    let sql = format!(
        "{} WHERE ($1::text IS NULL OR i.congregacao = $1) GROUP BY i.id, u.id ORDER BY u.nome",
        DETALHE_SELECT
    );
    let instrutores = sqlx::query_as::<_, InstrutorDetalhe>(&sql)
        .bind(congregacao)
        .fetch_all(pool)
        .await?;

    Ok(instrutores)
}

/// Ids among `ids` that exist as instrutores
pub async fn existing_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Uuid>, DatabaseError> {
    let found: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM instrutores WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;

    Ok(found.into_iter().map(|(id,)| id).collect())
}

pub async fn update<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    congregacao: &str,
    telefone: Option<&str>,
) -> Result<Instrutor, DatabaseError> {
    let instrutor = sqlx::query_as::<_, Instrutor>(
        "UPDATE instrutores SET congregacao = $2, telefone = $3, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(congregacao)
    .bind(telefone)
    .fetch_one(executor)
    .await?;

    Ok(instrutor)
}
