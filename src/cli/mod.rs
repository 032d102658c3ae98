pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "msa-admin")]
#[command(about = "MSA Acompanhamento administration - migrations, accounts and catalog seeding")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Create an ADMIN account with its instrutor profile")]
    CreateAdmin(commands::admin::CreateAdminArgs),

    #[command(about = "Load instrumentos, fases/tópicos and programas mínimos from a YAML fixture")]
    Seed {
        #[arg(help = "Path to the fixture file")]
        file: std::path::PathBuf,
    },

    #[command(about = "Check a running server through its /health endpoint")]
    Health {
        #[arg(long, env = "MSA_API_URL", default_value = "http://localhost:3000", help = "Server base URL")]
        url: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::CreateAdmin(args) => commands::admin::handle(args, output_format).await,
        Commands::Seed { file } => commands::seed::handle(file, output_format).await,
        Commands::Health { url } => commands::health::handle(url, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_json_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["msa-admin", "migrate", "--json"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Migrate));
    }

    #[test]
    fn seed_requires_a_file() {
        assert!(Cli::try_parse_from(["msa-admin", "seed"]).is_err());
        let cli = Cli::try_parse_from(["msa-admin", "seed", "fixtures/catalogo.yaml"]).unwrap();
        match cli.command {
            Commands::Seed { file } => assert!(file.ends_with("catalogo.yaml")),
            _ => panic!("expected seed"),
        }
    }

    #[test]
    fn health_takes_a_url() {
        let cli = Cli::try_parse_from(["msa-admin", "health", "--url", "http://api.local:8080"]).unwrap();
        match cli.command {
            Commands::Health { url } => assert_eq!(url, "http://api.local:8080"),
            _ => panic!("expected health"),
        }
    }
}
