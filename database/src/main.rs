//! Schema management for the LedUp event indexer database

use clap::{Parser, Subcommand};
use std::error::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod migration;

use config::{ConfigError, DatabaseConfig};

#[derive(Debug, Parser)]
#[command(name = "ledup-database", version, about = "Manage the LedUp indexer database schema")]
struct Cli {
    /// Connection URL of the indexer database
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Create the indexer database, or the one named by --name
    Create {
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Apply pending migrations, all of them unless --steps is given
    Migrate {
        #[arg(short, long)]
        steps: Option<u32>,
    },
    /// Drop the checkpoint, event and lease tables and migrate from scratch
    Reset {
        /// Required, the reset discards every recorded event
        #[arg(long)]
        force: bool,
    },
    /// List applied and pending migrations
    Status,
}

impl Cli {
    fn database(&self) -> Result<DatabaseConfig, ConfigError> {
        let url = self.database_url.as_deref().ok_or(ConfigError::MissingUrl)?;
        DatabaseConfig::parse(url)
    }
}

impl Command {
    async fn run(self, database: &DatabaseConfig) -> Result<(), Box<dyn Error>> {
        match self {
            Command::Create { name } => commands::create::execute(database, name).await,
            Command::Migrate { steps } => commands::migrate::execute(database, steps).await,
            Command::Reset { force: false } => {
                Err("reset drops all indexer tables; rerun with --force".into())
            }
            Command::Reset { force: true } => commands::migrate::reset(database).await,
            Command::Status => commands::migrate::status(database).await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Loaded first so DATABASE_URL from .env reaches the argument parser
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let database = cli.database()?;
    info!(database = %database.name, url = %database.redacted_url(), "using database");

    cli.command.run(&database).await
}
