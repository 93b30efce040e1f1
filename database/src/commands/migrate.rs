use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::prelude::*;
use std::error::Error;
use tracing::{error, info};

use crate::config::DatabaseConfig;
use crate::migration::Migrator;

async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, Box<dyn Error>> {
    info!("Connecting to database: {}", config.redacted_url());

    Database::connect(&config.url).await.map_err(|e| {
        error!("Failed to connect to database: {}", e);
        e.into()
    })
}

/// Execute the migrate command
pub async fn execute(config: &DatabaseConfig, steps: Option<u32>) -> Result<(), Box<dyn Error>> {
    let connection = connect(config).await?;

    let pending = Migrator::get_pending_migrations(&connection).await?;
    info!("Found {} pending migrations", pending.len());
    for m in &pending {
        info!("Pending migration: {}", m.name());
    }

    match steps {
        Some(n) => info!("Running {} migrations", n),
        None => info!("Running all pending migrations"),
    }

    Migrator::up(&connection, steps).await.map_err(|e| {
        error!("Failed to run migrations: {}", e);
        e
    })?;

    info!("Migrations applied");
    Ok(())
}

/// Drop every table and re-apply all migrations
pub async fn reset(config: &DatabaseConfig) -> Result<(), Box<dyn Error>> {
    let connection = connect(config).await?;

    info!("Dropping all tables and re-running migrations");
    Migrator::fresh(&connection).await.map_err(|e| {
        error!("Failed to reset database: {}", e);
        e
    })?;

    info!("Database reset complete");
    Ok(())
}

/// Log applied and pending migrations
pub async fn status(config: &DatabaseConfig) -> Result<(), Box<dyn Error>> {
    let connection = connect(config).await?;

    let applied = Migrator::get_applied_migrations(&connection).await?;
    let pending = Migrator::get_pending_migrations(&connection).await?;

    info!(
        "{} of {} migrations applied",
        applied.len(),
        applied.len() + pending.len()
    );
    for m in &applied {
        info!("Applied: {}", m.name());
    }
    for m in &pending {
        info!("Pending: {}", m.name());
    }

    Ok(())
}
