use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Usuario;
use crate::domain::registration::Lotacao;
use crate::middleware::SessionUser;
use crate::types::Role;

pub struct NovoUsuario<'a> {
    pub nome: &'a str,
    pub email: &'a str,
    pub senha_hash: &'a str,
    pub role: Role,
    pub congregacao: &'a str,
}

pub async fn find_session_user(pool: &PgPool, id: Uuid) -> Result<Option<SessionUser>, DatabaseError> {
    let user = sqlx::query_as::<_, SessionUser>(
        "SELECT u.id, u.nome, u.email, u.role, u.congregacao, u.ativo, i.id AS instrutor_id
         FROM usuarios u
         LEFT JOIN instrutores i ON i.usuario_id = u.id
         WHERE u.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Usuario>, DatabaseError> {
    let usuario = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(usuario)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Usuario>, DatabaseError> {
    let usuario = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(usuario)
}

pub async fn email_exists<'e, E: PgExecutor<'e>>(executor: E, email: &str) -> Result<bool, DatabaseError> {
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM usuarios WHERE email = $1)")
        .bind(email)
        .fetch_one(executor)
        .await?;

    Ok(exists)
}

/// Same as [`email_exists`] but ignoring one account (for updates)
pub async fn email_taken_by_other(pool: &PgPool, email: &str, id: Uuid) -> Result<bool, DatabaseError> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM usuarios WHERE email = $1 AND id <> $2)")
            .bind(email)
            .bind(id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

/// ENCARREGADO/ADMIN headcount of a congregação
pub async fn lotacao<'e, E: PgExecutor<'e>>(executor: E, congregacao: &str) -> Result<Lotacao, DatabaseError> {
    let (encarregados_e_admins, admins): (i64, i64) = sqlx::query_as(
        "SELECT
             COUNT(*) FILTER (WHERE role IN ('ENCARREGADO', 'ADMIN')),
             COUNT(*) FILTER (WHERE role = 'ADMIN')
         FROM usuarios
         WHERE congregacao = $1",
    )
    .bind(congregacao)
    .fetch_one(executor)
    .await?;

    Ok(Lotacao {
        encarregados_e_admins,
        admins,
    })
}

pub async fn insert<'e, E: PgExecutor<'e>>(executor: E, novo: &NovoUsuario<'_>) -> Result<Usuario, DatabaseError> {
    let usuario = sqlx::query_as::<_, Usuario>(
        "INSERT INTO usuarios (id, nome, email, senha_hash, role, congregacao)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(novo.nome)
    .bind(novo.email)
    .bind(novo.senha_hash)
    .bind(novo.role.as_str())
    .bind(novo.congregacao)
    .fetch_one(executor)
    .await?;

    Ok(usuario)
}

pub async fn update_conta<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    nome: &str,
    email: &str,
    role: Role,
    congregacao: &str,
    ativo: bool,
) -> Result<Usuario, DatabaseError> {
    let usuario = sqlx::query_as::<_, Usuario>(
        "UPDATE usuarios
         SET nome = $2, email = $3, role = $4, congregacao = $5, ativo = $6, updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(nome)
    .bind(email)
    .bind(role.as_str())
    .bind(congregacao)
    .bind(ativo)
    .fetch_one(executor)
    .await?;

    Ok(usuario)
}

pub async fn update_senha(pool: &PgPool, id: Uuid, senha_hash: &str) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE usuarios SET senha_hash = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(senha_hash)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM usuarios WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
