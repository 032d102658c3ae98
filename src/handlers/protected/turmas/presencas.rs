use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{PresencaSessao, Turma};
use crate::database::repository::turmas::{self, PresencaInput};
use crate::domain::{Validate, Validator};
use crate::error::{ApiError, Issue};
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};
use crate::services::load_authorized;

#[derive(Debug, Deserialize)]
pub struct PresencasRequest {
    pub presencas: Vec<PresencaInput>,
}

impl Validate for PresencasRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        let mut vistos = HashSet::new();
        for (i, presenca) in self.presencas.iter().enumerate() {
            v.check(
                vistos.insert(presenca.aluno_id),
                &format!("presencas[{}].alunoId", i),
                "Aluno repetido na lista",
            )
            .optional_text(
                &format!("presencas[{}].observacao", i),
                presenca.observacao.as_deref(),
                500,
            );
        }
        v.finish()
    }
}

/// Entries naming alunos outside the turma, as issue paths
fn nao_membros(presencas: &[PresencaInput], membros: &[Uuid]) -> Vec<Issue> {
    presencas
        .iter()
        .enumerate()
        .filter(|(_, p)| !membros.contains(&p.aluno_id))
        .map(|(i, _)| Issue::new(format!("presencas[{}].alunoId", i), "Aluno não pertence à turma"))
        .collect()
}

/// PUT /api/turmas/:id/sessoes/:sessao_id/presencas - Upsert the attendance register
///
/// All entries are written in one transaction; any non-member rejects the
/// whole list. Members left out keep whatever was recorded before.
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path((id, sessao_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<PresencasRequest>,
) -> ApiResult<Vec<PresencaSessao>> {
    let turma: Turma = load_authorized(&state.pool, &user.actor(), id).await?;
    let sessao = turmas::find_sessao(&state.pool, turma.id, sessao_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sessão não encontrada"))?;

    let membros = turmas::member_ids(&state.pool, turma.id).await?;
    let issues = nao_membros(&payload.presencas, &membros);
    if !issues.is_empty() {
        return Err(ApiError::validation(issues));
    }

    let mut tx = state.pool.begin().await?;
    for presenca in &payload.presencas {
        turmas::upsert_presenca(&mut *tx, sessao.id, presenca).await?;
    }
    tx.commit().await?;

    tracing::debug!(
        "Recorded {} presenças for sessão {} of turma {}",
        payload.presencas.len(),
        sessao.id,
        turma.id
    );

    let presencas = turmas::list_presencas(&state.pool, sessao.id).await?;
    Ok(ApiResponse::success(presencas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn presenca(aluno_id: Uuid) -> PresencaInput {
        PresencaInput {
            aluno_id,
            presente: true,
            observacao: None,
        }
    }

    #[test]
    fn repeated_alunos_are_rejected() {
        let id = Uuid::new_v4();
        let request = PresencasRequest {
            presencas: vec![presenca(id), presenca(Uuid::new_v4()), presenca(id)],
        };

        match request.validate().unwrap_err() {
            ApiError::ValidationError { issues, .. } => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].path, "presencas[2].alunoId");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn flags_only_non_members() {
        let membro = Uuid::new_v4();
        let estranho = Uuid::new_v4();
        let issues = nao_membros(&[presenca(membro), presenca(estranho)], &[membro]);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "presencas[1].alunoId");
    }

    #[test]
    fn observacao_defaults_to_none() {
        let request: PresencasRequest = serde_json::from_value(json!({
            "presencas": [{ "alunoId": Uuid::new_v4(), "presente": false }]
        }))
        .unwrap();
        assert_eq!(request.presencas[0].observacao, None);
        assert!(!request.presencas[0].presente);
    }
}
