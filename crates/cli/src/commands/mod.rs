//! CLI subcommands.

pub mod list;
pub mod migrate;
pub mod seed;

use sqlx::PgPool;
use thiserror::Error;

use pessoas_web::config::{ConfigError, PessoasConfig};
use pessoas_web::services::PersonError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Person error: {0}")]
    Person(#[from] PersonError),
}

/// Connect to the database named by the service configuration.
pub async fn connect() -> Result<PgPool, CliError> {
    let config = PessoasConfig::from_env()?;

    tracing::info!("Connecting to database...");
    Ok(pessoas_web::db::create_pool(&config.database_url).await?)
}
