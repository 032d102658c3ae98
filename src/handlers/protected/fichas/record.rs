use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{AulaRegistro, Avaliacao, FichaAcompanhamento};
use crate::database::repository::{fichas, instrutores};
use crate::domain::ficha::{ensure_aberta, ResumoFicha};
use crate::domain::Validate;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};
use crate::services::load_authorized;
use crate::types::TipoAula;

/// Ficha with its entries and the live computed summary
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FichaDetalhe {
    #[serde(flatten)]
    pub ficha: FichaAcompanhamento,
    pub aulas: Vec<AulaRegistro>,
    pub avaliacoes: Vec<Avaliacao>,
    pub resumo: ResumoFicha,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FichaPatch {
    pub tipo_aula: Option<TipoAula>,
    pub data_inicio: Option<NaiveDate>,
    pub instrutor_id: Option<Uuid>,
}

impl Validate for FichaPatch {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// GET /api/fichas/:id - Ficha detail with aulas, avaliações and summary
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<FichaDetalhe> {
    let ficha: FichaAcompanhamento = load_authorized(&state.pool, &user.actor(), id).await?;

    let aulas = fichas::list_aulas(&state.pool, ficha.id).await?;
    let avaliacoes = fichas::list_avaliacoes(&state.pool, ficha.id).await?;
    let resumo = ResumoFicha::from_registros(&aulas, &avaliacoes);

    Ok(ApiResponse::success(FichaDetalhe {
        ficha,
        aulas,
        avaliacoes,
        resumo,
    }))
}

/// PUT /api/fichas/:id - Change tipo, start date or (global roles) instrutor
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<FichaPatch>,
) -> ApiResult<FichaAcompanhamento> {
    let actor = user.actor();
    let mut ficha: FichaAcompanhamento = load_authorized(&state.pool, &actor, id).await?;
    ensure_aberta(&ficha)?;

    if let Some(tipo) = patch.tipo_aula {
        ficha.tipo_aula = tipo;
    }
    if let Some(data) = patch.data_inicio {
        ficha.data_inicio = data;
    }
    if let Some(instrutor_id) = patch.instrutor_id.filter(|i| *i != ficha.instrutor_id) {
        actor.ensure_global()?;
        if instrutores::find(&state.pool, instrutor_id).await?.is_none() {
            return Err(ApiError::invalid_field("instrutorId", "Instrutor não encontrado"));
        }
        ficha.instrutor_id = instrutor_id;
    }

    let ficha = fichas::update(&state.pool, &ficha).await?;
    Ok(ApiResponse::success(ficha))
}

/// DELETE /api/fichas/:id - Remove a ficha with its aulas and avaliações
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let ficha: FichaAcompanhamento = load_authorized(&state.pool, &user.actor(), id).await?;

    if !fichas::delete(&state.pool, ficha.id).await? {
        return Err(ApiError::not_found("Ficha não encontrada"));
    }
    tracing::info!("Ficha {} deleted by {}", ficha.id, user.email);

    Ok(ApiResponse::no_content())
}
