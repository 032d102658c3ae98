use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{hash_password_blocking, PasswordError};
use crate::database::manager::DatabaseError;
use crate::database::models::InstrutorDetalhe;
use crate::database::repository::{instrumentos, instrutores, usuarios};
use crate::domain::registration::{self, check_limite_admins, check_limite_encarregados};
use crate::domain::DomainError;
use crate::error::ApiError;
use crate::types::Role;

/// Account data accepted by both registration paths
#[derive(Debug, Clone)]
pub struct NovaConta {
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub role: Role,
    pub congregacao: String,
    pub telefone: Option<String>,
    pub instrumento_ids: Vec<Uuid>,
}

/// Who is creating the account; administrators are also bound by the admin cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origem {
    Publica,
    Administrador,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Email já cadastrado")]
    EmailEmUso,
    #[error("Instrumentos inválidos ou inativos")]
    InstrumentosInvalidos(Vec<Uuid>),
    #[error(transparent)]
    Limite(#[from] DomainError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl From<sqlx::Error> for RegistrationError {
    fn from(err: sqlx::Error) -> Self {
        RegistrationError::Database(err.into())
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::EmailEmUso => ApiError::conflict(err.to_string()),
            RegistrationError::InstrumentosInvalidos(ids) => {
                let lista = ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(", ");
                ApiError::invalid_field("instrumentoIds", format!("Instrumentos inválidos ou inativos: {}", lista))
            }
            RegistrationError::Limite(e) => e.into(),
            RegistrationError::Database(e) => e.into(),
            RegistrationError::Password(e) => e.into(),
        }
    }
}

pub struct RegistrationService {
    pool: PgPool,
}

impl RegistrationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the usuario and its instrutor profile in one transaction
    pub async fn registrar(&self, conta: NovaConta, origem: Origem) -> Result<InstrutorDetalhe, RegistrationError> {
        let email = registration::normalize_email(&conta.email);
        let congregacao = conta.congregacao.trim().to_string();

        if usuarios::email_exists(&self.pool, &email).await? {
            tracing::warn!("Registration rejected: email '{}' already in use", email);
            return Err(RegistrationError::EmailEmUso);
        }

        if !conta.instrumento_ids.is_empty() {
            let ativos = instrumentos::active_ids(&self.pool, &conta.instrumento_ids).await?;
            let invalidos = registration::instrumentos_invalidos(&conta.instrumento_ids, &ativos);
            if !invalidos.is_empty() {
                return Err(RegistrationError::InstrumentosInvalidos(invalidos));
            }
        }

        let senha_hash = hash_password_blocking(conta.senha).await?;

        let mut tx = self.pool.begin().await?;

        let lotacao = usuarios::lotacao(&mut *tx, &congregacao).await?;
        check_limite_encarregados(conta.role, &congregacao, lotacao)?;
        if origem == Origem::Administrador {
            check_limite_admins(conta.role, &congregacao, lotacao)?;
        }

        let usuario = usuarios::insert(
            &mut *tx,
            &usuarios::NovoUsuario {
                nome: conta.nome.trim(),
                email: &email,
                senha_hash: &senha_hash,
                role: conta.role,
                congregacao: &congregacao,
            },
        )
        .await?;

        let instrutor = instrutores::insert(&mut *tx, usuario.id, &congregacao, conta.telefone.as_deref()).await?;
        instrutores::set_instrumentos(&mut *tx, instrutor.id, &conta.instrumento_ids).await?;

        tx.commit().await?;

        tracing::info!(
            "Registered {} '{}' for congregação '{}' ({:?})",
            usuario.role,
            usuario.email,
            congregacao,
            origem
        );

        instrutores::find_detalhe(&self.pool, instrutor.id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Instrutor não encontrado".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn duplicate_email_is_a_conflict() {
        let err: ApiError = RegistrationError::EmailEmUso.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_instruments_are_reported_on_the_field() {
        let id = Uuid::new_v4();
        let err: ApiError = RegistrationError::InstrumentosInvalidos(vec![id]).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = err.to_json();
        assert_eq!(body["issues"][0]["path"], "instrumentoIds");
        assert!(body["issues"][0]["message"].as_str().unwrap().contains(&id.to_string()));
    }

    #[test]
    fn cap_violation_keeps_exact_message() {
        let err: ApiError = RegistrationError::Limite(DomainError::LimiteEncarregados("Centro".to_string())).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.message(),
            "Já existe um Encarregado de Orquestra cadastrado para a congregação Centro"
        );
    }
}
