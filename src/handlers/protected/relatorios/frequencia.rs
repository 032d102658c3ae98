use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Turma;
use crate::database::repository::relatorios::{self, FrequenciaAluno};
use crate::middleware::{ApiResponse, ApiResult, SessionUser};
use crate::services::load_authorized;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinhaFrequencia {
    #[serde(flatten)]
    pub linha: FrequenciaAluno,
    pub taxa: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequenciaTurma {
    pub turma_id: Uuid,
    pub nome: String,
    pub alunos: Vec<LinhaFrequencia>,
}

/// GET /api/relatorios/turmas/:id/frequencia - Per-member attendance
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<FrequenciaTurma> {
    let turma: Turma = load_authorized(&state.pool, &user.actor(), id).await?;

    let alunos = relatorios::frequencia_turma(&state.pool, turma.id)
        .await?
        .into_iter()
        .map(|linha| LinhaFrequencia {
            taxa: linha.taxa(),
            linha,
        })
        .collect();

    Ok(ApiResponse::success(FrequenciaTurma {
        turma_id: turma.id,
        nome: turma.nome,
        alunos,
    }))
}
