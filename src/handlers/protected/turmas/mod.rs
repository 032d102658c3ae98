// handlers/protected/turmas/mod.rs - Turma, membership, sessão and presença endpoints
//
// A turma belongs to its primary and secondary instrutor; sessions and
// attendance inherit that ownership.

use sqlx::PgPool;
use uuid::Uuid;

use crate::database::repository::{fases, instrumentos, instrutores};
use crate::error::{ApiError, Issue};

pub mod collection;
pub mod membros;
pub mod presencas;
pub mod record;
pub mod sessoes;

pub use collection::get as collection_get;
pub use collection::post as collection_post;
pub use membros::delete as membro_delete;
pub use membros::post as membro_post;
pub use presencas::put as presencas_put;
pub use record::delete as record_delete;
pub use record::get as record_get;
pub use record::put as record_put;
pub use sessoes::delete as sessao_delete;
pub use sessoes::get as sessao_get;
pub use sessoes::list as sessoes_get;
pub use sessoes::post as sessoes_post;
pub use sessoes::put as sessao_put;

/// Optional catalog links and every named instrutor must exist
pub(crate) async fn check_referencias(
    pool: &PgPool,
    instrumento_id: Option<Uuid>,
    fase_id: Option<Uuid>,
    instrutor_ids: &[Uuid],
) -> Result<(), ApiError> {
    let mut issues = Vec::new();

    if let Some(id) = instrumento_id {
        if instrumentos::find(pool, id).await?.is_none() {
            issues.push(Issue::new("instrumentoId", "Instrumento não encontrado"));
        }
    }
    if let Some(id) = fase_id {
        if fases::find(pool, id).await?.is_none() {
            issues.push(Issue::new("faseId", "Fase não encontrada"));
        }
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
