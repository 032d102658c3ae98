use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Avaliacao, FichaAcompanhamento};
use crate::database::repository::fichas::{self, AvaliacaoInput};
use crate::domain::ficha::{ensure_aberta, MAX_AVALIACOES, NOTA_MAXIMA, NOTA_MINIMA};
use crate::domain::{DomainError, Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};
use crate::services::load_authorized;
use crate::types::nullable;

impl Validate for AvaliacaoInput {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .range("numero", self.numero, 1, MAX_AVALIACOES)
            .range_f64("nota", self.nota, NOTA_MINIMA, NOTA_MAXIMA)
            .optional_text("observacoes", self.observacoes.as_deref(), 2000)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvaliacaoPatch {
    pub numero: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub data: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub nota: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub observacoes: Option<Option<String>>,
}

impl Validate for AvaliacaoPatch {
    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(numero) = self.numero {
            v.range("numero", numero, 1, MAX_AVALIACOES);
        }
        v.range_f64("nota", self.nota.flatten(), NOTA_MINIMA, NOTA_MAXIMA)
            .optional_text("observacoes", self.observacoes.as_ref().and_then(|o| o.as_deref()), 2000)
            .finish()
    }
}

/// GET /api/fichas/:id/avaliacoes - Evaluations ordered by number
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Avaliacao>> {
    let ficha: FichaAcompanhamento = load_authorized(&state.pool, &user.actor(), id).await?;
    let avaliacoes = fichas::list_avaliacoes(&state.pool, ficha.id).await?;
    Ok(ApiResponse::success(avaliacoes))
}

/// POST /api/fichas/:id/avaliacoes - Add an evaluation (numbers 1..=3, nota 0..=10)
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<AvaliacaoInput>,
) -> ApiResult<Avaliacao> {
    let ficha: FichaAcompanhamento = load_authorized(&state.pool, &user.actor(), id).await?;
    ensure_aberta(&ficha)?;

    let avaliacao = fichas::insert_avaliacao(&state.pool, ficha.id, &input)
        .await?
        .ok_or(DomainError::FichaFinalizada)?;
    Ok(ApiResponse::created(avaliacao))
}

/// PUT /api/fichas/:id/avaliacoes/:avaliacao_id - Edit an evaluation
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path((id, avaliacao_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(patch): ValidatedJson<AvaliacaoPatch>,
) -> ApiResult<Avaliacao> {
    let ficha: FichaAcompanhamento = load_authorized(&state.pool, &user.actor(), id).await?;
    ensure_aberta(&ficha)?;

    let mut avaliacao = fichas::find_avaliacao(&state.pool, ficha.id, avaliacao_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Avaliação não encontrada"))?;

    if let Some(numero) = patch.numero {
        avaliacao.numero = numero;
    }
    if let Some(data) = patch.data {
        avaliacao.data = data;
    }
    if let Some(nota) = patch.nota {
        avaliacao.nota = nota;
    }
    if let Some(observacoes) = patch.observacoes {
        avaliacao.observacoes = observacoes;
    }

    let avaliacao = fichas::update_avaliacao(&state.pool, &avaliacao)
        .await?
        .ok_or(DomainError::FichaFinalizada)?;
    Ok(ApiResponse::success(avaliacao))
}

/// DELETE /api/fichas/:id/avaliacoes/:avaliacao_id - Remove an evaluation
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path((id, avaliacao_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    let ficha: FichaAcompanhamento = load_authorized(&state.pool, &user.actor(), id).await?;
    ensure_aberta(&ficha)?;

    let avaliacao = fichas::find_avaliacao(&state.pool, ficha.id, avaliacao_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Avaliação não encontrada"))?;
    if !fichas::delete_avaliacao(&state.pool, ficha.id, avaliacao.id).await? {
        return Err(DomainError::FichaFinalizada.into());
    }

    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn input(body: Value) -> AvaliacaoInput {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn evaluation_numbers_are_limited_to_three() {
        assert!(input(json!({ "numero": 3, "nota": 8.5 })).validate().is_ok());
        assert!(input(json!({ "numero": 4 })).validate().is_err());
        assert!(input(json!({ "numero": 0 })).validate().is_err());
    }

    #[test]
    fn notas_must_be_between_zero_and_ten() {
        assert!(input(json!({ "numero": 1, "nota": 0.0 })).validate().is_ok());
        assert!(input(json!({ "numero": 1, "nota": 10.0 })).validate().is_ok());
        assert!(input(json!({ "numero": 1, "nota": 10.5 })).validate().is_err());
        assert!(input(json!({ "numero": 1, "nota": -1 })).validate().is_err());
        assert!(input(json!({ "numero": 1 })).validate().is_ok());
    }

    #[test]
    fn patch_can_clear_a_nota() {
        let patch: AvaliacaoPatch = serde_json::from_value(json!({ "nota": null })).unwrap();
        assert_eq!(patch.nota, Some(None));
        assert!(patch.validate().is_ok());
    }
}
