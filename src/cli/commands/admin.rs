use clap::Args;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::domain::validate::validate_email_format;
use crate::services::{NovaConta, Origem, RegistrationService};
use crate::types::Role;

#[derive(Debug, Args)]
pub struct CreateAdminArgs {
    #[arg(long, help = "Full name")]
    pub nome: String,
    #[arg(long, help = "Login email")]
    pub email: String,
    #[arg(long, env = "MSA_ADMIN_SENHA", help = "Password (at least 6 characters)")]
    pub senha: String,
    #[arg(long, help = "Congregação the account belongs to")]
    pub congregacao: String,
    #[arg(long, help = "Contact phone")]
    pub telefone: Option<String>,
}

impl CreateAdminArgs {
    fn into_conta(self) -> anyhow::Result<NovaConta> {
        validate_email_format(&self.email).map_err(anyhow::Error::msg)?;
        if self.senha.chars().count() < 6 {
            anyhow::bail!("A senha deve ter pelo menos 6 caracteres");
        }
        if self.nome.trim().is_empty() || self.congregacao.trim().is_empty() {
            anyhow::bail!("nome and congregacao are required");
        }

        Ok(NovaConta {
            nome: self.nome,
            email: self.email,
            senha: self.senha,
            role: Role::Admin,
            congregacao: self.congregacao,
            telefone: self.telefone,
            instrumento_ids: Vec::new(),
        })
    }
}

/// Bootstraps the first administrator; the per-congregação caps still apply
pub async fn handle(args: CreateAdminArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let conta = args.into_conta()?;
    let pool = super::connect().await?;

    let detalhe = RegistrationService::new(pool)
        .registrar(conta, Origem::Administrador)
        .await?;

    output_success(
        output_format,
        &format!("Administrator {} created for {}", detalhe.email, detalhe.congregacao),
        Some(json!({ "instrutor": detalhe })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(email: &str, senha: &str) -> CreateAdminArgs {
        CreateAdminArgs {
            nome: "Administrador".into(),
            email: email.into(),
            senha: senha.into(),
            congregacao: "Central".into(),
            telefone: None,
        }
    }

    #[test]
    fn builds_an_admin_account() {
        let conta = args("admin@ccb.org.br", "segredo1").into_conta().unwrap();
        assert_eq!(conta.role, Role::Admin);
        assert!(conta.instrumento_ids.is_empty());
    }

    #[test]
    fn rejects_bad_input_before_touching_the_database() {
        assert!(args("sem-arroba", "segredo1").into_conta().is_err());
        assert!(args("admin@ccb.org.br", "123").into_conta().is_err());
    }
}
