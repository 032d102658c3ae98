use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = super::connect().await?;
    DatabaseManager::migrate(&pool).await?;

    let database = DatabaseManager::redacted_url(&config::config().database.url);
    output_success(
        output_format,
        &format!("Migrations applied to {}", database),
        Some(json!({ "database": database })),
    )
}
