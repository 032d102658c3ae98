use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::Turma;
use crate::database::repository::turmas::{self, TurmaInput};
use crate::domain::{Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};

use super::check_referencias;

impl Validate for TurmaInput {
    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.required_text("nome", &self.nome, 150)
            .optional_text("descricao", self.descricao.as_deref(), 2000);
        if let (Some(primario), Some(secundario)) = (self.instrutor_id, self.instrutor_secundario_id) {
            v.check(
                primario != secundario,
                "instrutorSecundarioId",
                "Instrutor secundário deve ser diferente do principal",
            );
        }
        v.finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TurmaQuery {
    pub ativa: Option<bool>,
}

/// GET /api/turmas - Turmas visible to the caller (filter: `ativa`)
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<TurmaQuery>,
) -> ApiResult<Vec<Turma>> {
    let turmas = turmas::list(&state.pool, user.actor().scope(), query.ativa).await?;
    Ok(ApiResponse::success(turmas))
}

/// POST /api/turmas - Create a turma; the caller must stay one of its instrutores
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    ValidatedJson(input): ValidatedJson<TurmaInput>,
) -> ApiResult<Turma> {
    let actor = user.actor();

    let instrutor_id = input
        .instrutor_id
        .or(actor.instrutor_id)
        .ok_or_else(|| ApiError::invalid_field("instrutorId", "Campo obrigatório"))?;

    let owners: Vec<_> = std::iter::once(instrutor_id)
        .chain(input.instrutor_secundario_id)
        .collect();
    actor.ensure_access(&owners, "turma")?;

    check_referencias(&state.pool, input.instrumento_id, input.fase_id, &owners).await?;

    let turma = turmas::insert(&state.pool, &input, instrutor_id).await?;
    tracing::info!("Turma '{}' created by {}", turma.nome, user.email);

    Ok(ApiResponse::created(turma))
}
