// handlers/protected/alunos/mod.rs - Aluno endpoints
//
// INSTRUTOR callers only see and touch alunos where they are the primary or
// secondary instrutor; ADMIN and ENCARREGADO see everything.

use sqlx::PgPool;
use uuid::Uuid;

use crate::database::repository::{fases, instrumentos, instrutores};
use crate::error::{ApiError, Issue};

pub mod collection;
pub mod record;

pub use collection::get as collection_get;
pub use collection::post as collection_post;
pub use record::delete as record_delete;
pub use record::get as record_get;
pub use record::put as record_put;

/// Referenced catalog rows and instrutores must exist before insert/update
pub(crate) async fn check_referencias(
    pool: &PgPool,
    instrumento_id: Uuid,
    fase_id: Uuid,
    instrutor_ids: &[Uuid],
) -> Result<(), ApiError> {
    let mut issues = Vec::new();

    if instrumentos::find(pool, instrumento_id).await?.is_none() {
        issues.push(Issue::new("instrumentoId", "Instrumento não encontrado"));
    }
    if fases::find(pool, fase_id).await?.is_none() {
        issues.push(Issue::new("faseId", "Fase não encontrada"));
    }

    let existentes = instrutores::existing_ids(pool, instrutor_ids).await?;
    if instrutor_ids.iter().any(|id| !existentes.contains(id)) {
        issues.push(Issue::new("instrutorId", "Instrutor não encontrado"));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(issues))
    }
}
