// handlers/public/auth/logout.rs - POST /api/auth/logout handler

use axum::{http::header, response::IntoResponse};
use serde_json::json;

use crate::auth::clear_session_cookie;
use crate::config;
use crate::middleware::ApiResponse;

/// POST /api/auth/logout - Expire the session cookie
///
/// Tokens are stateless, so this only instructs the browser to drop it.
pub async fn logout_post() -> impl IntoResponse {
    let cookie = clear_session_cookie(&config::config().security);

    (
        [(header::SET_COOKIE, cookie)],
        ApiResponse::success(json!({ "message": "Sessão encerrada" })),
    )
}
