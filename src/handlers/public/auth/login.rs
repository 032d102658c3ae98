// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::{extract::State, http::header, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::{self, password::verify_password_blocking};
use crate::config;
use crate::database::models::Usuario;
use crate::database::repository::usuarios;
use crate::domain::registration::normalize_email;
use crate::domain::{Validate, Validator};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ValidatedJson};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .email("email", &self.email)
            .check(!self.senha.is_empty(), "senha", "Campo obrigatório")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub usuario: Usuario,
    pub token: String,
}

/// POST /api/auth/login - Verify email and senha, start a session
///
/// The token is returned both in the body and as the HttpOnly session cookie.
/// Unknown email and wrong password produce the same 401.
pub async fn login_post(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(&payload.email);

    let usuario = match usuarios::find_by_email(&state.pool, &email).await? {
        Some(u) => u,
        None => {
            tracing::warn!("Login failed: unknown email '{}'", email);
            return Err(ApiError::unauthorized("Email ou senha inválidos"));
        }
    };

    if !verify_password_blocking(payload.senha, usuario.senha_hash.clone()).await? {
        tracing::warn!("Login failed: wrong password for '{}'", email);
        return Err(ApiError::unauthorized("Email ou senha inválidos"));
    }

    if !usuario.ativo {
        tracing::warn!("Login refused: usuario '{}' is inactive", email);
        return Err(ApiError::forbidden("Usuário inativo"));
    }

    let token = auth::issue_session(usuario.id, usuario.role, &usuario.congregacao)?;
    let cookie = auth::session_cookie(&token, &config::config().security);

    tracing::info!("Usuario '{}' logged in as {}", usuario.email, usuario.role);

    Ok((
        [(header::SET_COOKIE, cookie)],
        ApiResponse::success(LoginResponse { usuario, token }),
    ))
}
