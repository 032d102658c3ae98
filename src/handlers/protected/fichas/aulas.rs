use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{AulaRegistro, FichaAcompanhamento};
use crate::database::repository::fichas::{self, AulaInput};
use crate::domain::ficha::{ensure_aberta, MAX_AULAS};
use crate::domain::{DomainError, Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};
use crate::services::load_authorized;
use crate::types::nullable;

impl Validate for AulaInput {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .range("numeroAula", self.numero_aula, 1, MAX_AULAS)
            .optional_text("conteudo", self.conteudo.as_deref(), 2000)
            .optional_text("observacoes", self.observacoes.as_deref(), 2000)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AulaPatch {
    pub numero_aula: Option<i32>,
    pub data: Option<NaiveDate>,
    pub presenca: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub conteudo: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub observacoes: Option<Option<String>>,
}

impl Validate for AulaPatch {
    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(numero) = self.numero_aula {
            v.range("numeroAula", numero, 1, MAX_AULAS);
        }
        v.optional_text("conteudo", self.conteudo.as_ref().and_then(|c| c.as_deref()), 2000)
            .optional_text("observacoes", self.observacoes.as_ref().and_then(|o| o.as_deref()), 2000)
            .finish()
    }
}

/// GET /api/fichas/:id/aulas - Lesson entries ordered by number
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<AulaRegistro>> {
    let ficha: FichaAcompanhamento = load_authorized(&state.pool, &user.actor(), id).await?;
    let aulas = fichas::list_aulas(&state.pool, ficha.id).await?;
    Ok(ApiResponse::success(aulas))
}

/// POST /api/fichas/:id/aulas - Record a lesson (numbers 1..=20, unique per ficha)
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<AulaInput>,
) -> ApiResult<AulaRegistro> {
    let ficha: FichaAcompanhamento = load_authorized(&state.pool, &user.actor(), id).await?;
    ensure_aberta(&ficha)?;

    let aula = fichas::insert_aula(&state.pool, ficha.id, &input)
        .await?
        .ok_or(DomainError::FichaFinalizada)?;
    Ok(ApiResponse::created(aula))
}

/// PUT /api/fichas/:id/aulas/:aula_id - Edit a lesson entry
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path((id, aula_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(patch): ValidatedJson<AulaPatch>,
) -> ApiResult<AulaRegistro> {
    let ficha: FichaAcompanhamento = load_authorized(&state.pool, &user.actor(), id).await?;
    ensure_aberta(&ficha)?;

    let mut aula = fichas::find_aula(&state.pool, ficha.id, aula_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Aula não encontrada"))?;

    if let Some(numero) = patch.numero_aula {
        aula.numero_aula = numero;
    }
    if let Some(data) = patch.data {
        aula.data = data;
    }
    if let Some(presenca) = patch.presenca {
        aula.presenca = presenca;
    }
    if let Some(conteudo) = patch.conteudo {
        aula.conteudo = conteudo;
    }
    if let Some(observacoes) = patch.observacoes {
        aula.observacoes = observacoes;
    }

    let aula = fichas::update_aula(&state.pool, &aula)
        .await?
        .ok_or(DomainError::FichaFinalizada)?;
    Ok(ApiResponse::success(aula))
}

/// DELETE /api/fichas/:id/aulas/:aula_id - Remove a lesson entry
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path((id, aula_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    let ficha: FichaAcompanhamento = load_authorized(&state.pool, &user.actor(), id).await?;
    ensure_aberta(&ficha)?;

    let aula = fichas::find_aula(&state.pool, ficha.id, aula_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Aula não encontrada"))?;
    if !fichas::delete_aula(&state.pool, ficha.id, aula.id).await? {
        return Err(DomainError::FichaFinalizada.into());
    }

    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(numero_aula: i32) -> AulaInput {
        serde_json::from_value(json!({ "numeroAula": numero_aula, "data": "2024-03-02", "presenca": true })).unwrap()
    }

    #[test]
    fn lesson_numbers_are_limited_to_twenty() {
        assert!(input(1).validate().is_ok());
        assert!(input(20).validate().is_ok());
        assert!(input(0).validate().is_err());
        assert!(input(21).validate().is_err());
    }

    #[test]
    fn patch_checks_number_only_when_present() {
        assert!(AulaPatch::default().validate().is_ok());
        let patch: AulaPatch = serde_json::from_value(json!({ "numeroAula": 25 })).unwrap();
        assert!(patch.validate().is_err());
    }
}
