use axum::{extract::State, Extension};
use serde::Serialize;

use crate::app::AppState;
use crate::database::repository::relatorios::{self, Contagem, TotaisAlunos, TotaisFichas};
use crate::middleware::{ApiResponse, ApiResult, SessionUser};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resumo {
    pub alunos: TotaisAlunos,
    pub alunos_por_fase: Vec<Contagem>,
    pub alunos_por_instrumento: Vec<Contagem>,
    pub fichas: TotaisFichas,
    pub turmas_ativas: i64,
}

/// GET /api/relatorios/resumo - Dashboard counts
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> ApiResult<Resumo> {
    let scope = user.actor().scope();
    let pool = &state.pool;

    let (alunos, alunos_por_fase, alunos_por_instrumento, fichas, turmas_ativas) = tokio::try_join!(
        relatorios::totais_alunos(pool, scope),
        relatorios::alunos_por_fase(pool, scope),
        relatorios::alunos_por_instrumento(pool, scope),
        relatorios::totais_fichas(pool, scope),
        relatorios::turmas_ativas(pool, scope),
    )?;

    Ok(ApiResponse::success(Resumo {
        alunos,
        alunos_por_fase,
        alunos_por_instrumento,
        fichas,
        turmas_ativas,
    }))
}
