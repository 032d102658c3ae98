use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{validate_jwt, Claims};
use crate::config::{self, SecurityConfig};
use crate::error::ApiError;

/// Session authentication middleware: validates the session token and
/// injects its [`Claims`](crate::auth::Claims) into the request.
///
/// The token is read from the session cookie, or from an
/// `Authorization: Bearer` header for API clients. A stale cookie does not
/// shadow a valid Bearer token.
pub async fn session_auth_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let security = &config::config().security;

    let claims = authenticate(request.headers(), security)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// First candidate token that validates, session cookie before Bearer header
fn authenticate(headers: &HeaderMap, security: &SecurityConfig) -> Result<Claims, ApiError> {
    let candidates: Vec<String> = extract_cookie(headers, &security.session_cookie_name)
        .into_iter()
        .chain(extract_bearer(headers))
        .collect();

    if candidates.is_empty() {
        return Err(ApiError::unauthorized("Não autenticado"));
    }

    candidates
        .iter()
        .find_map(|token| match validate_jwt(token, security) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!("Rejected session token: {}", e);
                None
            }
        })
        .ok_or_else(|| ApiError::unauthorized("Sessão inválida ou expirada"))
}

fn extract_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
