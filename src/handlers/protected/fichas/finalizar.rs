use axum::{
    extract::{Path, State},
    Extension,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::FichaAcompanhamento;
use crate::database::repository::fichas::{self, Finalizacao};
use crate::domain::ficha::{ensure_aberta, ResumoFicha};
use crate::domain::{DomainError, Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};
use crate::services::load_authorized;

#[derive(Debug, Deserialize)]
pub struct FinalizarRequest {
    pub apto: bool,
    #[serde(default)]
    pub observacoes: Option<String>,
}

impl Validate for FinalizarRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .optional_text("observacoes", self.observacoes.as_deref(), 2000)
            .finish()
    }
}

/// Finalized ficha plus the advisory flags computed at finalization time
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizarResponse {
    #[serde(flatten)]
    pub ficha: FichaAcompanhamento,
    #[serde(flatten)]
    pub resumo: ResumoFicha,
}

/// POST /api/fichas/:id/finalizar - Close a ficha
///
/// Stores the computed average as `mediaFinal` and the caller's `apto`
/// verbatim. The computed `aprovadoPorMedia`/`aprovadoPorPresenca` flags are
/// returned but never override `apto`. A ficha can be finalized once.
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<FinalizarRequest>,
) -> ApiResult<FinalizarResponse> {
    let ficha: FichaAcompanhamento = load_authorized(&state.pool, &user.actor(), id).await?;
    ensure_aberta(&ficha)?;

    let aulas = fichas::list_aulas(&state.pool, ficha.id).await?;
    let avaliacoes = fichas::list_avaliacoes(&state.pool, ficha.id).await?;
    let resumo = ResumoFicha::from_registros(&aulas, &avaliacoes);

    let finalizacao = Finalizacao {
        media_final: resumo.media,
        apto: payload.apto,
        observacoes: payload.observacoes.as_deref(),
    };

    // Conditional update: a concurrent finalization leaves nothing to update
    let ficha = fichas::finalize(&state.pool, ficha.id, &finalizacao)
        .await?
        .ok_or(DomainError::FichaFinalizada)?;

    if payload.apto != (resumo.aprovado_por_media && resumo.aprovado_por_presenca) {
        tracing::info!(
            "Ficha {} finalized with apto={} against computed media={:?} presencas={}",
            ficha.id,
            payload.apto,
            resumo.media,
            resumo.total_presencas
        );
    } else {
        tracing::info!("Ficha {} finalized by {} (apto={})", ficha.id, user.email, payload.apto);
    }

    Ok(ApiResponse::success(FinalizarResponse { ficha, resumo }))
}
