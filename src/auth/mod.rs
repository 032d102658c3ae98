pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{self, SecurityConfig};
use crate::types::Role;

/// Session token payload. Role and congregação are re-read from the database
/// on every request; the copies here are informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub congregacao: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(usuario_id: Uuid, role: Role, congregacao: String, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: usuario_id,
            role,
            congregacao,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,
}

pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, JwtError> {
    let secret = &security.jwt_secret;
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, JwtError> {
    let secret = &security.jwt_secret;
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

/// Issues a session token for a user with the global security settings
pub fn issue_session(usuario_id: Uuid, role: Role, congregacao: &str) -> Result<String, JwtError> {
    let security = &config::config().security;
    let claims = Claims::new(usuario_id, role, congregacao.to_string(), security.session_expiry_hours);
    generate_jwt(&claims, security)
}

/// `Set-Cookie` value carrying the session token
pub fn session_cookie(token: &str, security: &SecurityConfig) -> String {
    let max_age = security.session_expiry_hours * 3600;
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        security.session_cookie_name, token, max_age
    );
    if security.session_cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(security: &SecurityConfig) -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        security.session_cookie_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security(secret: &str) -> SecurityConfig {
        SecurityConfig {
            jwt_secret: secret.to_string(),
            session_expiry_hours: 2,
            session_cookie_name: "msa_session".to_string(),
            session_cookie_secure: true,
            cors_origins: vec![],
        }
    }

    #[test]
    fn token_round_trip_keeps_identity() {
        let sec = security("test-secret");
        let id = Uuid::new_v4();
        let claims = Claims::new(id, Role::Encarregado, "Centro".to_string(), 2);

        let token = generate_jwt(&claims, &sec).unwrap();
        let decoded = validate_jwt(&token, &sec).unwrap();

        assert_eq!(decoded.sub, id);
        assert_eq!(decoded.role, Role::Encarregado);
        assert_eq!(decoded.congregacao, "Centro");
        assert_eq!(decoded.exp - decoded.iat, 2 * 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let claims = Claims::new(Uuid::new_v4(), Role::Instrutor, "Centro".to_string(), 1);
        let token = generate_jwt(&claims, &security("one")).unwrap();
        assert!(matches!(
            validate_jwt(&token, &security("two")),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let sec = security("test-secret");
        let mut claims = Claims::new(Uuid::new_v4(), Role::Instrutor, "Centro".to_string(), 1);
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = generate_jwt(&claims, &sec).unwrap();
        assert!(validate_jwt(&token, &sec).is_err());
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        let claims = Claims::new(Uuid::new_v4(), Role::Admin, "Centro".to_string(), 1);
        assert!(matches!(generate_jwt(&claims, &security("")), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn cookie_attributes() {
        let sec = security("s");
        let cookie = session_cookie("abc", &sec);
        assert!(cookie.starts_with("msa_session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=7200"));
        assert!(cookie.ends_with("; Secure"));

        assert!(clear_session_cookie(&sec).contains("Max-Age=0"));
    }
}
