use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::InstrutorDetalhe;
use crate::database::repository::instrutores;
use crate::domain::{Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};
use crate::services::{NovaConta, Origem, RegistrationService};
use crate::types::Role;

#[derive(Debug, Default, Deserialize)]
pub struct InstrutorQuery {
    pub congregacao: Option<String>,
}

/// Administrator-created account; any role is accepted
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovoInstrutor {
    pub nome: String,
    pub email: String,
    pub senha: String,
    #[serde(default = "default_role")]
    pub role: Role,
    pub congregacao: String,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub instrumento_ids: Vec<Uuid>,
}

fn default_role() -> Role {
    Role::Instrutor
}

impl Validate for NovoInstrutor {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required_text("nome", &self.nome, 150)
            .email("email", &self.email)
            .senha("senha", &self.senha)
            .required_text("congregacao", &self.congregacao, 150)
            .optional_text("telefone", self.telefone.as_deref(), 30)
            .finish()
    }
}

impl From<NovoInstrutor> for NovaConta {
    fn from(req: NovoInstrutor) -> Self {
        NovaConta {
            nome: req.nome,
            email: req.email,
            senha: req.senha,
            role: req.role,
            congregacao: req.congregacao,
            telefone: req.telefone,
            instrumento_ids: req.instrumento_ids,
        }
    }
}

/// GET /api/instrutores - All instrutores with their taught instruments
///
/// Filter: `congregacao` (exact match).
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<InstrutorQuery>,
) -> ApiResult<Vec<InstrutorDetalhe>> {
    user.actor().ensure_global()?;

    let congregacao = query.congregacao.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let instrutores = instrutores::list_detalhe(&state.pool, congregacao).await?;
    Ok(ApiResponse::success(instrutores))
}

/// POST /api/instrutores - Create an account of any role (ADMIN only)
///
/// Same checks as public registration plus the per-congregação admin cap.
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    ValidatedJson(payload): ValidatedJson<NovoInstrutor>,
) -> ApiResult<InstrutorDetalhe> {
    user.actor().ensure_admin()?;

    let detalhe = RegistrationService::new(state.pool.clone())
        .registrar(payload.into(), Origem::Administrador)
        .await?;

    tracing::info!("Instrutor {} created by {}", detalhe.email, user.email);
    Ok(ApiResponse::created(detalhe))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_defaults_to_instrutor() {
        let req: NovoInstrutor = serde_json::from_value(json!({
            "nome": "Paulo",
            "email": "paulo@ccb.org.br",
            "senha": "segredo1",
            "congregacao": "Central"
        }))
        .unwrap();

        assert_eq!(req.role, Role::Instrutor);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn admin_creation_accepts_admin_role() {
        let req: NovoInstrutor = serde_json::from_value(json!({
            "nome": "Maria",
            "email": "maria@ccb.org.br",
            "senha": "segredo1",
            "role": "ADMIN",
            "congregacao": "Central"
        }))
        .unwrap();

        assert_eq!(NovaConta::from(req).role, Role::Admin);
    }
}
