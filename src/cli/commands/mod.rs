pub mod admin;
pub mod health;
pub mod migrate;
pub mod seed;

use sqlx::PgPool;

use crate::config;
use crate::database::DatabaseManager;

/// Admin commands fail fast instead of waiting on a lazy pool
pub(crate) async fn connect() -> anyhow::Result<PgPool> {
    let pool = DatabaseManager::connect(&config::config().database).await?;
    Ok(pool)
}
