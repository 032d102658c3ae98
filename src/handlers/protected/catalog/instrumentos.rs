use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Instrumento;
use crate::database::repository::instrumentos::{self, InstrumentoInput};
use crate::domain::{Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};

impl Validate for InstrumentoInput {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required_text("nome", &self.nome, 100)
            .optional_text("categoria", self.categoria.as_deref(), 100)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InstrumentoQuery {
    #[serde(default)]
    pub ativos: bool,
}

/// GET /api/instrumentos - List instrumentos (`?ativos=true` hides inactive ones)
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<InstrumentoQuery>,
) -> ApiResult<Vec<Instrumento>> {
    let instrumentos = instrumentos::list(&state.pool, query.ativos).await?;
    Ok(ApiResponse::success(instrumentos))
}

/// GET /api/instrumentos/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Instrumento> {
    let instrumento = instrumentos::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Instrumento não encontrado"))?;
    Ok(ApiResponse::success(instrumento))
}

/// POST /api/instrumentos
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    ValidatedJson(input): ValidatedJson<InstrumentoInput>,
) -> ApiResult<Instrumento> {
    user.actor().ensure_global()?;

    let instrumento = instrumentos::insert(&state.pool, &input).await?;
    tracing::info!("Instrumento '{}' created by {}", instrumento.nome, user.email);
    Ok(ApiResponse::created(instrumento))
}

/// PUT /api/instrumentos/:id - Replace nome, categoria and ativo
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<InstrumentoInput>,
) -> ApiResult<Instrumento> {
    user.actor().ensure_global()?;

    if instrumentos::find(&state.pool, id).await?.is_none() {
        return Err(ApiError::not_found("Instrumento não encontrado"));
    }
    let instrumento = instrumentos::update(&state.pool, id, &input).await?;
    Ok(ApiResponse::success(instrumento))
}

/// DELETE /api/instrumentos/:id - Refused with 409 while alunos or programas reference it
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    user.actor().ensure_global()?;

    if !instrumentos::delete(&state.pool, id).await? {
        return Err(ApiError::not_found("Instrumento não encontrado"));
    }
    Ok(ApiResponse::no_content())
}
