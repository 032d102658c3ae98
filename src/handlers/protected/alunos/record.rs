use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Aluno;
use crate::database::repository::alunos;
use crate::domain::{Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};
use crate::services::load_authorized;
use crate::types::nullable;

use super::check_referencias;

/// Partial update; absent fields are left untouched, `null` clears optional ones
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlunoPatch {
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub data_nascimento: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub telefone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    pub congregacao: Option<String>,
    pub instrumento_id: Option<Uuid>,
    pub fase_id: Option<Uuid>,
    pub instrutor_id: Option<Uuid>,
    #[serde(default, deserialize_with = "nullable")]
    pub instrutor_secundario_id: Option<Option<Uuid>>,
    pub ativo: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub observacoes: Option<Option<String>>,
}

impl Validate for AlunoPatch {
    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        if let Some(nome) = &self.nome {
            v.required_text("nome", nome, 150);
        }
        if let Some(congregacao) = &self.congregacao {
            v.required_text("congregacao", congregacao, 150);
        }
        if let Some(Some(email)) = &self.email {
            v.email("email", email);
        }
        v.optional_text("telefone", self.telefone.as_ref().and_then(|t| t.as_deref()), 30)
            .optional_text("observacoes", self.observacoes.as_ref().and_then(|o| o.as_deref()), 2000)
            .finish()
    }
}

impl AlunoPatch {
    fn apply(self, aluno: &mut Aluno) {
        if let Some(nome) = self.nome {
            aluno.nome = nome.trim().to_string();
        }
        if let Some(data) = self.data_nascimento {
            aluno.data_nascimento = data;
        }
        if let Some(telefone) = self.telefone {
            aluno.telefone = telefone;
        }
        if let Some(email) = self.email {
            aluno.email = email;
        }
        if let Some(congregacao) = self.congregacao {
            aluno.congregacao = congregacao.trim().to_string();
        }
        if let Some(id) = self.instrumento_id {
            aluno.instrumento_id = id;
        }
        if let Some(id) = self.fase_id {
            aluno.fase_id = id;
        }
        if let Some(id) = self.instrutor_id {
            aluno.instrutor_id = id;
        }
        if let Some(id) = self.instrutor_secundario_id {
            aluno.instrutor_secundario_id = id;
        }
        if let Some(ativo) = self.ativo {
            aluno.ativo = ativo;
        }
        if let Some(observacoes) = self.observacoes {
            aluno.observacoes = observacoes;
        }
    }
}

/// GET /api/alunos/:id - Aluno detail (owner or global role)
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Aluno> {
    let aluno: Aluno = load_authorized(&state.pool, &user.actor(), id).await?;
    Ok(ApiResponse::success(aluno))
}

/// PUT /api/alunos/:id - Update an aluno (owner or global role)
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<AlunoPatch>,
) -> ApiResult<Aluno> {
    let actor = user.actor();
    let mut aluno: Aluno = load_authorized(&state.pool, &actor, id).await?;

    patch.apply(&mut aluno);

    if aluno.instrutor_secundario_id == Some(aluno.instrutor_id) {
        return Err(ApiError::invalid_field(
            "instrutorSecundarioId",
            "Instrutor secundário deve ser diferente do principal",
        ));
    }
    // An instrutor cannot hand the aluno over and lose access to it
    actor.ensure_access(&aluno.instrutores(), "aluno")?;

    check_referencias(&state.pool, aluno.instrumento_id, aluno.fase_id, &aluno.instrutores()).await?;

    let aluno = alunos::update(&state.pool, &aluno).await?;
    tracing::info!("Aluno {} updated by {}", aluno.id, user.email);

    Ok(ApiResponse::success(aluno))
}

/// DELETE /api/alunos/:id - Remove an aluno with its fichas and presenças
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let aluno: Aluno = load_authorized(&state.pool, &user.actor(), id).await?;

    if !alunos::delete(&state.pool, aluno.id).await? {
        return Err(ApiError::not_found("Aluno não encontrado"));
    }
    tracing::info!("Aluno {} deleted by {}", aluno.id, user.email);

    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn aluno() -> Aluno {
        Aluno {
            id: Uuid::new_v4(),
            nome: "João".to_string(),
            data_nascimento: None,
            telefone: Some("1199".to_string()),
            email: None,
            congregacao: "Centro".to_string(),
            instrumento_id: Uuid::new_v4(),
            fase_id: Uuid::new_v4(),
            instrutor_id: Uuid::new_v4(),
            instrutor_secundario_id: Some(Uuid::new_v4()),
            ativo: true,
            observacoes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let mut a = aluno();
        let patch: AlunoPatch = serde_json::from_value(json!({
            "nome": "  João Pedro ",
            "telefone": null,
            "ativo": false
        }))
        .unwrap();
        let secundario = a.instrutor_secundario_id;

        patch.apply(&mut a);

        assert_eq!(a.nome, "João Pedro");
        assert_eq!(a.telefone, None);
        assert!(!a.ativo);
        assert_eq!(a.instrutor_secundario_id, secundario);
    }

    #[test]
    fn patch_clears_secondary_instrutor() {
        let mut a = aluno();
        let patch: AlunoPatch = serde_json::from_value(json!({ "instrutorSecundarioId": null })).unwrap();
        patch.apply(&mut a);
        assert_eq!(a.instrutor_secundario_id, None);
    }

    #[test]
    fn blank_name_is_rejected() {
        let patch: AlunoPatch = serde_json::from_value(json!({ "nome": "  " })).unwrap();
        assert!(patch.validate().is_err());
        assert!(AlunoPatch::default().validate().is_ok());
    }
}
