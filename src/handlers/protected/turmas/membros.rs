use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Aluno, Turma};
use crate::database::repository::turmas;
use crate::domain::Validate;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};
use crate::services::load_authorized;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembroRequest {
    pub aluno_id: Uuid,
}

impl Validate for MembroRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// POST /api/turmas/:id/alunos - Enrol an aluno the caller can also access
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<MembroRequest>,
) -> ApiResult<Vec<Aluno>> {
    let actor = user.actor();
    let turma: Turma = load_authorized(&state.pool, &actor, id).await?;
    let aluno: Aluno = load_authorized(&state.pool, &actor, payload.aluno_id).await?;

    if !turmas::add_aluno(&state.pool, turma.id, aluno.id).await? {
        return Err(ApiError::conflict("Aluno já pertence a esta turma"));
    }

    let alunos = turmas::list_alunos(&state.pool, turma.id).await?;
    Ok(ApiResponse::created(alunos))
}

/// DELETE /api/turmas/:id/alunos/:aluno_id - Past presenças are kept
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path((id, aluno_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    let turma: Turma = load_authorized(&state.pool, &user.actor(), id).await?;

    if !turmas::remove_aluno(&state.pool, turma.id, aluno_id).await? {
        return Err(ApiError::not_found("Aluno não pertence a esta turma"));
    }
    Ok(ApiResponse::no_content())
}
