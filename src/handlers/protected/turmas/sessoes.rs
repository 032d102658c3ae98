use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{PresencaSessao, SessaoAula, Turma};
use crate::database::repository::turmas::{self, SessaoInput};
use crate::domain::{Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};
use crate::services::load_authorized;
use crate::types::nullable;

impl Validate for SessaoInput {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .optional_text("conteudo", self.conteudo.as_deref(), 2000)
            .optional_text("observacoes", self.observacoes.as_deref(), 2000)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessaoPatch {
    pub data: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub conteudo: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub observacoes: Option<Option<String>>,
}

impl Validate for SessaoPatch {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .optional_text("conteudo", self.conteudo.as_ref().and_then(|c| c.as_deref()), 2000)
            .optional_text("observacoes", self.observacoes.as_ref().and_then(|o| o.as_deref()), 2000)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessaoDetalhe {
    #[serde(flatten)]
    pub sessao: SessaoAula,
    pub presencas: Vec<PresencaSessao>,
}

async fn load_sessao(state: &AppState, turma: &Turma, sessao_id: Uuid) -> Result<SessaoAula, ApiError> {
    turmas::find_sessao(&state.pool, turma.id, sessao_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sessão não encontrada"))
}

/// GET /api/turmas/:id/sessoes - Sessions, most recent first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<SessaoAula>> {
    let turma: Turma = load_authorized(&state.pool, &user.actor(), id).await?;
    let sessoes = turmas::list_sessoes(&state.pool, turma.id).await?;
    Ok(ApiResponse::success(sessoes))
}

/// POST /api/turmas/:id/sessoes
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<SessaoInput>,
) -> ApiResult<SessaoAula> {
    let turma: Turma = load_authorized(&state.pool, &user.actor(), id).await?;
    let sessao = turmas::insert_sessao(&state.pool, turma.id, &input).await?;
    Ok(ApiResponse::created(sessao))
}

/// GET /api/turmas/:id/sessoes/:sessao_id - Session with its attendance register
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path((id, sessao_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<SessaoDetalhe> {
    let turma: Turma = load_authorized(&state.pool, &user.actor(), id).await?;
    let sessao = load_sessao(&state, &turma, sessao_id).await?;
    let presencas = turmas::list_presencas(&state.pool, sessao.id).await?;

    Ok(ApiResponse::success(SessaoDetalhe { sessao, presencas }))
}

/// PUT /api/turmas/:id/sessoes/:sessao_id
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path((id, sessao_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(patch): ValidatedJson<SessaoPatch>,
) -> ApiResult<SessaoAula> {
    let turma: Turma = load_authorized(&state.pool, &user.actor(), id).await?;
    let mut sessao = load_sessao(&state, &turma, sessao_id).await?;

    if let Some(data) = patch.data {
        sessao.data = data;
    }
    if let Some(conteudo) = patch.conteudo {
        sessao.conteudo = conteudo;
    }
    if let Some(observacoes) = patch.observacoes {
        sessao.observacoes = observacoes;
    }

    let sessao = turmas::update_sessao(&state.pool, &sessao).await?;
    Ok(ApiResponse::success(sessao))
}

/// DELETE /api/turmas/:id/sessoes/:sessao_id - Presenças go with it
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path((id, sessao_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    let turma: Turma = load_authorized(&state.pool, &user.actor(), id).await?;
    let sessao = load_sessao(&state, &turma, sessao_id).await?;

    turmas::delete_sessao(&state.pool, sessao.id).await?;
    Ok(ApiResponse::no_content())
}
