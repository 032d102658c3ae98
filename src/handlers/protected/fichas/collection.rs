use axum::{
    extract::{Query, State},
    Extension,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Aluno, FichaAcompanhamento};
use crate::database::repository::{fichas, instrutores};
use crate::domain::Validate;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};
use crate::services::load_authorized;
use crate::types::TipoAula;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovaFicha {
    pub aluno_id: Uuid,
    pub tipo_aula: TipoAula,
    #[serde(default)]
    pub data_inicio: Option<NaiveDate>,
    /// Only honoured for ADMIN/ENCARREGADO; instrutores always own their fichas
    #[serde(default)]
    pub instrutor_id: Option<Uuid>,
}

impl Validate for NovaFicha {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// GET /api/fichas - List fichas visible to the caller
///
/// Filters: `alunoId`, `finalizada` (true/false).
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Query(filtro): Query<fichas::FichaFiltro>,
) -> ApiResult<Vec<FichaAcompanhamento>> {
    let fichas = fichas::list(&state.pool, user.actor().scope(), &filtro).await?;
    Ok(ApiResponse::success(fichas))
}

/// POST /api/fichas - Open a new ficha for an aluno the caller can access
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    ValidatedJson(nova): ValidatedJson<NovaFicha>,
) -> ApiResult<FichaAcompanhamento> {
    let actor = user.actor();
    let aluno: Aluno = load_authorized(&state.pool, &actor, nova.aluno_id).await?;

    let instrutor_id = if actor.is_global() {
        nova.instrutor_id.or(actor.instrutor_id).unwrap_or(aluno.instrutor_id)
    } else {
        actor
            .instrutor_id
            .ok_or_else(|| ApiError::forbidden("Usuário sem perfil de instrutor"))?
    };

    if instrutores::find(&state.pool, instrutor_id).await?.is_none() {
        return Err(ApiError::invalid_field("instrutorId", "Instrutor não encontrado"));
    }

    let data_inicio = nova.data_inicio.unwrap_or_else(|| Utc::now().date_naive());
    let ficha = fichas::insert(&state.pool, aluno.id, instrutor_id, nova.tipo_aula, data_inicio).await?;

    tracing::info!(
        "Ficha {} ({}) opened for aluno {} by {}",
        ficha.id,
        ficha.tipo_aula,
        aluno.id,
        user.email
    );
    Ok(ApiResponse::created(ficha))
}
