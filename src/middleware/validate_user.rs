use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::Claims;
use crate::database::repository::usuarios;
use crate::domain::Actor;
use crate::error::ApiError;
use crate::types::Role;

/// The caller, as currently stored in `usuarios` (not as the token remembers it)
#[derive(Clone, Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub congregacao: String,
    pub ativo: bool,
    pub instrutor_id: Option<Uuid>,
}

impl SessionUser {
    pub fn actor(&self) -> Actor {
        Actor {
            usuario_id: self.id,
            role: self.role,
            instrutor_id: self.instrutor_id,
        }
    }
}

/// Middleware that resolves the token subject against `usuarios`.
/// Ensures the account still exists and is active; role changes take effect
/// on the next request.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Não autenticado"))?;

    let user = usuarios::find_session_user(&state.pool, claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Session for unknown usuario {}", claims.sub);
            ApiError::unauthorized("Sessão inválida ou expirada")
        })?;

    if !user.ativo {
        tracing::warn!("Session rejected: usuario '{}' is inactive", user.email);
        return Err(ApiError::forbidden("Usuário inativo"));
    }

    if user.role != claims.role {
        tracing::debug!(
            "Role of '{}' changed from {} to {} since login",
            user.email,
            claims.role,
            user.role
        );
    }

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
