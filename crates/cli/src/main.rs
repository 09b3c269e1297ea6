//! Person registry CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! pessoas migrate
//!
//! # Insert demo people (existing tax ids are skipped)
//! pessoas seed --count 20
//!
//! # Print every person
//! pessoas list
//! ```
//!
//! # Environment Variables
//!
//! - `PESSOAS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pessoas")]
#[command(author, version, about = "Person registry CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert demo people through the validating service
    Seed {
        /// Number of people to generate
        #[arg(short, long, default_value_t = 10)]
        count: u32,
    },
    /// Print every person
    List,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let pool = commands::connect().await?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await?,
        Commands::Seed { count } => {
            commands::seed::run(&pool, count).await?;
        }
        Commands::List => commands::list::run(&pool).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_seed_count_default() {
        let cli = Cli::parse_from(["pessoas", "seed"]);
        assert!(matches!(cli.command, Commands::Seed { count: 10 }));

        let cli = Cli::parse_from(["pessoas", "seed", "--count", "3"]);
        assert!(matches!(cli.command, Commands::Seed { count: 3 }));
    }
}
