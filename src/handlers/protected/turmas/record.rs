use axum::{
    extract::{Path, State},
    Extension,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Aluno, Turma};
use crate::database::repository::turmas;
use crate::domain::{Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};
use crate::services::load_authorized;
use crate::types::nullable;

use super::check_referencias;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurmaDetalhe {
    #[serde(flatten)]
    pub turma: Turma,
    pub alunos: Vec<Aluno>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurmaPatch {
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub descricao: Option<Option<String>>,
    pub instrutor_id: Option<Uuid>,
    #[serde(default, deserialize_with = "nullable")]
    pub instrutor_secundario_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable")]
    pub instrumento_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable")]
    pub fase_id: Option<Option<Uuid>>,
    pub ativa: Option<bool>,
}

impl Validate for TurmaPatch {
    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(nome) = &self.nome {
            v.required_text("nome", nome, 150);
        }
        v.optional_text("descricao", self.descricao.as_ref().and_then(|d| d.as_deref()), 2000)
            .finish()
    }
}

impl TurmaPatch {
    fn apply(self, turma: &mut Turma) {
        if let Some(nome) = self.nome {
            turma.nome = nome.trim().to_string();
        }
        if let Some(descricao) = self.descricao {
            turma.descricao = descricao;
        }
        if let Some(id) = self.instrutor_id {
            turma.instrutor_id = id;
        }
        if let Some(id) = self.instrutor_secundario_id {
            turma.instrutor_secundario_id = id;
        }
        if let Some(id) = self.instrumento_id {
            turma.instrumento_id = id;
        }
        if let Some(id) = self.fase_id {
            turma.fase_id = id;
        }
        if let Some(ativa) = self.ativa {
            turma.ativa = ativa;
        }
    }
}

/// GET /api/turmas/:id - Turma with its members
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<TurmaDetalhe> {
    let turma: Turma = load_authorized(&state.pool, &user.actor(), id).await?;
    let alunos = turmas::list_alunos(&state.pool, turma.id).await?;

    Ok(ApiResponse::success(TurmaDetalhe { turma, alunos }))
}

/// PUT /api/turmas/:id - Partial update
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<TurmaPatch>,
) -> ApiResult<Turma> {
    let actor = user.actor();
    let mut turma: Turma = load_authorized(&state.pool, &actor, id).await?;

    patch.apply(&mut turma);

    if turma.instrutor_secundario_id == Some(turma.instrutor_id) {
        return Err(ApiError::invalid_field(
            "instrutorSecundarioId",
            "Instrutor secundário deve ser diferente do principal",
        ));
    }

    let owners = turma.instrutores();
    actor.ensure_access(&owners, "turma")?;
    check_referencias(&state.pool, turma.instrumento_id, turma.fase_id, &owners).await?;

    let turma = turmas::update(&state.pool, &turma).await?;
    Ok(ApiResponse::success(turma))
}

/// DELETE /api/turmas/:id - Sessions, presenças and memberships go with it
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let turma: Turma = load_authorized(&state.pool, &user.actor(), id).await?;

    if !turmas::delete(&state.pool, turma.id).await? {
        return Err(ApiError::not_found("Turma não encontrada"));
    }
    tracing::info!("Turma {} deleted by {}", turma.id, user.email);

    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn turma() -> Turma {
        Turma {
            id: Uuid::new_v4(),
            nome: "Turma de sábado".into(),
            descricao: Some("Teoria básica".into()),
            instrutor_id: Uuid::new_v4(),
            instrutor_secundario_id: None,
            instrumento_id: Some(Uuid::new_v4()),
            fase_id: None,
            ativa: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn null_unlinks_optional_references() {
        let mut t = turma();
        let patch: TurmaPatch = serde_json::from_value(json!({ "instrumentoId": null, "ativa": false })).unwrap();
        patch.apply(&mut t);

        assert_eq!(t.instrumento_id, None);
        assert!(!t.ativa);
        assert_eq!(t.descricao.as_deref(), Some("Teoria básica"));
    }

    #[test]
    fn blank_name_is_rejected() {
        let patch: TurmaPatch = serde_json::from_value(json!({ "nome": " " })).unwrap();
        assert!(patch.validate().is_err());
    }
}
