use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Aluno, FichaAcompanhamento};
use crate::database::repository::{fichas, relatorios};
use crate::domain::ficha::ResumoFicha;
use crate::middleware::{ApiResponse, ApiResult, SessionUser};
use crate::services::load_authorized;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FichaProgresso {
    #[serde(flatten)]
    pub ficha: FichaAcompanhamento,
    pub resumo: ResumoFicha,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequenciaTurmas {
    pub presencas: i64,
    pub registradas: i64,
    pub taxa: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressoAluno {
    pub aluno: Aluno,
    pub fichas: Vec<FichaProgresso>,
    pub frequencia_turmas: FrequenciaTurmas,
}

/// GET /api/relatorios/alunos/:id - Every ficha with its summary plus turma attendance
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProgressoAluno> {
    let aluno: Aluno = load_authorized(&state.pool, &user.actor(), id).await?;

    let mut progresso = Vec::new();
    for ficha in fichas::list_by_aluno(&state.pool, aluno.id).await? {
        let aulas = fichas::list_aulas(&state.pool, ficha.id).await?;
        let avaliacoes = fichas::list_avaliacoes(&state.pool, ficha.id).await?;
        let resumo = ResumoFicha::from_registros(&aulas, &avaliacoes);
        progresso.push(FichaProgresso { ficha, resumo });
    }

    let presenca = relatorios::presenca_em_turmas(&state.pool, aluno.id).await?;
    let frequencia_turmas = FrequenciaTurmas {
        taxa: presenca.taxa(),
        presencas: presenca.presencas,
        registradas: presenca.registradas,
    };

    Ok(ApiResponse::success(ProgressoAluno {
        aluno,
        fichas: progresso,
        frequencia_turmas,
    }))
}
