use tracing_subscriber::EnvFilter;

use msa_acompanhamento::app::{app, AppState};
use msa_acompanhamento::config::{self, AppConfig};
use msa_acompanhamento::database::DatabaseManager;
use msa_acompanhamento::is_production;

/// `RUST_LOG` wins; otherwise request and query logging follow the config flags
fn env_filter(config: &AppConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives = vec!["info".to_string()];
        if config.api.enable_request_logging {
            directives.push("tower_http=debug".to_string());
        }
        directives.push(if config.database.enable_query_logging {
            "sqlx=info".to_string()
        } else {
            "sqlx=warn".to_string()
        });
        EnvFilter::new(directives.join(","))
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = config::config();
    tracing_subscriber::fmt().with_env_filter(env_filter(config)).init();

    tracing::info!("Starting MSA Acompanhamento API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        if is_production!() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        tracing::warn!("JWT_SECRET is not set; logins will fail until it is configured");
    }

    let pool = DatabaseManager::connect_lazy(&config.database)?;
    let app = app(AppState::new(pool));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("MSA Acompanhamento API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
