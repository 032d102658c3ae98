// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::InstrutorDetalhe;
use crate::domain::{Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ValidatedJson};
use crate::services::{NovaConta, Origem, RegistrationService};
use crate::types::Role;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub role: Role,
    pub congregacao: String,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub instrumento_ids: Vec<Uuid>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .required_text("nome", &self.nome, 150)
            .email("email", &self.email)
            .senha("senha", &self.senha)
            .required_text("congregacao", &self.congregacao, 150)
            .optional_text("telefone", self.telefone.as_deref(), 30)
            .check(
                matches!(self.role, Role::Instrutor | Role::Encarregado),
                "role",
                "Cadastro público aceita apenas INSTRUTOR ou ENCARREGADO",
            )
            .finish()
    }
}

impl From<RegisterRequest> for NovaConta {
    fn from(req: RegisterRequest) -> Self {
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

/// POST /api/auth/register - Self-registration of an instrutor or encarregado
///
/// Creates the usuario and its instrutor profile. Does not start a session.
pub async fn register_post(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> ApiResult<InstrutorDetalhe> {
    let detalhe = RegistrationService::new(state.pool.clone())
        .registrar(payload.into(), Origem::Publica)
        .await?;

    Ok(ApiResponse::created(detalhe))
}
