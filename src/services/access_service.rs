//! Record-level authorization for instrutor-owned resources.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Aluno, FichaAcompanhamento, Turma};
use crate::database::repository::{alunos, fichas, turmas};
use crate::domain::Actor;
use crate::error::ApiError;

/// A row that belongs to one or more instrutores
#[async_trait]
pub trait OwnedResource: Sized + Send + Sync {
    /// Noun used in the 403 message
    const RECURSO: &'static str;
    const NAO_ENCONTRADO: &'static str;

    async fn load(pool: &PgPool, id: Uuid) -> Result<Option<Self>, DatabaseError>;

    /// Instrutor ids allowed to act on this row
    async fn owners(&self, pool: &PgPool) -> Result<Vec<Uuid>, DatabaseError>;
}

#[async_trait]
impl OwnedResource for Aluno {
    const RECURSO: &'static str = "aluno";
    const NAO_ENCONTRADO: &'static str = "Aluno não encontrado";

    async fn load(pool: &PgPool, id: Uuid) -> Result<Option<Self>, DatabaseError> {
        alunos::find(pool, id).await
    }

    async fn owners(&self, _pool: &PgPool) -> Result<Vec<Uuid>, DatabaseError> {
        Ok(self.instrutores())
    }
}

#[async_trait]
impl OwnedResource for Turma {
    const RECURSO: &'static str = "turma";
    const NAO_ENCONTRADO: &'static str = "Turma não encontrada";

    async fn load(pool: &PgPool, id: Uuid) -> Result<Option<Self>, DatabaseError> {
        turmas::find(pool, id).await
    }

    async fn owners(&self, _pool: &PgPool) -> Result<Vec<Uuid>, DatabaseError> {
        Ok(self.instrutores())
    }
}

/// The ficha's own instrutor plus whoever teaches its aluno
#[async_trait]
impl OwnedResource for FichaAcompanhamento {
    const RECURSO: &'static str = "ficha";
    const NAO_ENCONTRADO: &'static str = "Ficha não encontrada";

    async fn load(pool: &PgPool, id: Uuid) -> Result<Option<Self>, DatabaseError> {
        fichas::find(pool, id).await
    }

    async fn owners(&self, pool: &PgPool) -> Result<Vec<Uuid>, DatabaseError> {
        let mut owners = vec![self.instrutor_id];
        if let Some(aluno) = alunos::find(pool, self.aluno_id).await? {
            owners.extend(aluno.instrutores());
        }
        Ok(owners)
    }
}

/// Loads `id` and checks the actor may act on it: 404 when missing, 403 when not owned
pub async fn load_authorized<R: OwnedResource>(pool: &PgPool, actor: &Actor, id: Uuid) -> Result<R, ApiError> {
    let resource = R::load(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found(R::NAO_ENCONTRADO))?;

    authorize(pool, actor, &resource).await?;
    Ok(resource)
}

pub async fn authorize<R: OwnedResource>(pool: &PgPool, actor: &Actor, resource: &R) -> Result<(), ApiError> {
    if actor.is_global() {
        return Ok(());
    }

    let owners = resource.owners(pool).await?;
    actor.ensure_access(&owners, R::RECURSO).map_err(|e| {
        tracing::warn!(
            "Usuario {} denied access to {} owned by {:?}",
            actor.usuario_id,
            R::RECURSO,
            owners
        );
        ApiError::from(e)
    })
}
