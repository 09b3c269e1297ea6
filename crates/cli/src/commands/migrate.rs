//! Database migration command.
//!
//! Migrations live in `crates/web/migrations/` and are embedded at build time.

use sqlx::PgPool;

use super::CliError;

/// Run every pending migration.
pub async fn run(pool: &PgPool) -> Result<(), CliError> {
    tracing::info!("Running migrations...");
    sqlx::migrate!("../web/migrations").run(pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
