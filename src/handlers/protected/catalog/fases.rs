use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Fase, TopicoMsa};
use crate::database::repository::fases::{self, FaseInput, TopicoInput};
use crate::domain::{Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};

impl Validate for FaseInput {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required_text("nome", &self.nome, 100)
            .check(self.ordem >= 1, "ordem", "Deve ser maior que zero")
            .optional_text("descricao", self.descricao.as_deref(), 2000)
            .finish()
    }
}

impl Validate for TopicoInput {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required_text("titulo", &self.titulo, 200)
            .check(self.ordem >= 0, "ordem", "Não pode ser negativa")
            .optional_text("descricao", self.descricao.as_deref(), 2000)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaseDetalhe {
    #[serde(flatten)]
    pub fase: Fase,
    pub topicos: Vec<TopicoMsa>,
}

/// GET /api/fases - Fases in curriculum order
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Fase>> {
    let fases = fases::list(&state.pool).await?;
    Ok(ApiResponse::success(fases))
}

/// GET /api/fases/:id - Fase with its tópicos MSA
pub async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<FaseDetalhe> {
    let fase = fases::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Fase não encontrada"))?;
    let topicos = fases::list_topicos(&state.pool, fase.id).await?;

    Ok(ApiResponse::success(FaseDetalhe { fase, topicos }))
}

/// POST /api/fases - `ordem` is unique across fases (409 on clash)
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    ValidatedJson(input): ValidatedJson<FaseInput>,
) -> ApiResult<Fase> {
    user.actor().ensure_global()?;

    let fase = fases::insert(&state.pool, &input).await?;
    tracing::info!("Fase '{}' (ordem {}) created by {}", fase.nome, fase.ordem, user.email);
    Ok(ApiResponse::created(fase))
}

/// PUT /api/fases/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<FaseInput>,
) -> ApiResult<Fase> {
    user.actor().ensure_global()?;

    if fases::find(&state.pool, id).await?.is_none() {
        return Err(ApiError::not_found("Fase não encontrada"));
    }
    let fase = fases::update(&state.pool, id, &input).await?;
    Ok(ApiResponse::success(fase))
}

/// DELETE /api/fases/:id - Tópicos go with it; refused while alunos reference it
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    user.actor().ensure_global()?;

    if !fases::delete(&state.pool, id).await? {
        return Err(ApiError::not_found("Fase não encontrada"));
    }
    Ok(ApiResponse::no_content())
}

/// GET /api/fases/:id/topicos
pub async fn topicos_list(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Vec<TopicoMsa>> {
    if fases::find(&state.pool, id).await?.is_none() {
        return Err(ApiError::not_found("Fase não encontrada"));
    }
    let topicos = fases::list_topicos(&state.pool, id).await?;
    Ok(ApiResponse::success(topicos))
}

/// POST /api/fases/:id/topicos
pub async fn topicos_create(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<TopicoInput>,
) -> ApiResult<TopicoMsa> {
    user.actor().ensure_global()?;

    if fases::find(&state.pool, id).await?.is_none() {
        return Err(ApiError::not_found("Fase não encontrada"));
    }
    let topico = fases::insert_topico(&state.pool, id, &input).await?;
    Ok(ApiResponse::created(topico))
}

/// PUT /api/topicos/:id
pub async fn topico_update(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<TopicoInput>,
) -> ApiResult<TopicoMsa> {
    user.actor().ensure_global()?;

    if fases::find_topico(&state.pool, id).await?.is_none() {
        return Err(ApiError::not_found("Tópico não encontrado"));
    }
    let topico = fases::update_topico(&state.pool, id, &input).await?;
    Ok(ApiResponse::success(topico))
}

/// DELETE /api/topicos/:id
pub async fn topico_remove(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    user.actor().ensure_global()?;

    if !fases::delete_topico(&state.pool, id).await? {
        return Err(ApiError::not_found("Tópico não encontrado"));
    }
    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fase_order_must_be_positive() {
        let input: FaseInput = serde_json::from_value(json!({ "nome": "Fase 1", "ordem": 0 })).unwrap();
        assert!(input.validate().is_err());

        let input: FaseInput = serde_json::from_value(json!({ "nome": "Fase 1", "ordem": 1 })).unwrap();
        assert!(input.validate().is_ok());
    }

    #[test]
    fn topico_needs_a_title() {
        let input: TopicoInput = serde_json::from_value(json!({ "titulo": "  " })).unwrap();
        assert!(input.validate().is_err());
    }
}
