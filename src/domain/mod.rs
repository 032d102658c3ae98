//! Business rules that do not touch the database.
//!
//! Handlers load rows, hand plain values to these functions, and translate
//! the resulting [`DomainError`] into an HTTP response through [`ApiError`].

pub mod ficha;
pub mod permission;
pub mod registration;
pub mod validate;

use thiserror::Error;

use crate::error::ApiError;

pub use permission::Actor;
pub use validate::{Validate, Validator};

#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("Ficha já foi finalizada")]
    FichaFinalizada,

    #[error("Já existe um Encarregado de Orquestra cadastrado para a congregação {0}")]
    LimiteEncarregados(String),

    #[error("Limite de administradores atingido para a congregação {0}")]
    LimiteAdministradores(String),

    #[error("Você não tem permissão para acessar este {0}")]
    AcessoNegado(&'static str),

    #[error("Apenas administradores podem executar esta operação")]
    RequerAdministrador,

    #[error("Apenas administradores ou encarregados podem executar esta operação")]
    RequerEncarregado,
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::FichaFinalizada
            | DomainError::LimiteEncarregados(_)
            | DomainError::LimiteAdministradores(_) => ApiError::bad_request(err.to_string()),
            DomainError::AcessoNegado(_)
            | DomainError::RequerAdministrador
            | DomainError::RequerEncarregado => ApiError::forbidden(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn rule_violations_are_bad_requests() {
        let err: ApiError = DomainError::FichaFinalizada.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Ficha já foi finalizada");
    }

    #[test]
    fn access_violations_are_forbidden() {
        let err: ApiError = DomainError::AcessoNegado("aluno").into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.message(), "Você não tem permissão para acessar este aluno");
    }
}
