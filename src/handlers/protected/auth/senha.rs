use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::database::repository::usuarios;
use crate::domain::{Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionUser, ValidatedJson};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenhaRequest {
    pub senha_atual: String,
    pub nova_senha: String,
}

impl Validate for SenhaRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .check(!self.senha_atual.is_empty(), "senhaAtual", "Campo obrigatório")
            .senha("novaSenha", &self.nova_senha)
            .finish()
    }
}

/// PUT /api/auth/senha - Change the caller's own password
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    ValidatedJson(payload): ValidatedJson<SenhaRequest>,
) -> ApiResult<Value> {
    let usuario = usuarios::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Sessão inválida ou expirada"))?;

    if !verify_password_blocking(payload.senha_atual, usuario.senha_hash).await? {
        tracing::warn!("Password change rejected for '{}': wrong current password", user.email);
        return Err(ApiError::invalid_field("senhaAtual", "Senha atual incorreta"));
    }

    let hash = hash_password_blocking(payload.nova_senha).await?;
    usuarios::update_senha(&state.pool, user.id, &hash).await?;

    tracing::info!("Usuario '{}' changed password", user.email);
    Ok(ApiResponse::success(json!({ "message": "Senha alterada" })))
}
