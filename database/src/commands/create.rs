use sea_orm::{ConnectionTrait, Database, DbBackend, Statement};
use std::error::Error;
use tracing::{error, info};

use crate::config::DatabaseConfig;

/// Database used to issue `CREATE DATABASE`
const MAINTENANCE_DB: &str = "postgres";

/// Execute the create command
pub async fn execute(config: &DatabaseConfig, name: Option<String>) -> Result<(), Box<dyn Error>> {
    let db_name = name.unwrap_or_else(|| config.name.clone());
    validate_name(&db_name)?;

    info!("Creating database: {}", db_name);

    let connection = Database::connect(config.url_for(MAINTENANCE_DB))
        .await
        .map_err(|e| {
            error!("Failed to connect to {}: {}", MAINTENANCE_DB, e);
            e
        })?;

    let existing = connection
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT 1 FROM pg_database WHERE datname = $1",
            [db_name.clone().into()],
        ))
        .await?;

    if existing.is_some() {
        info!("Database '{}' already exists", db_name);
        return Ok(());
    }

    connection
        .execute_unprepared(&format!("CREATE DATABASE \"{}\"", db_name))
        .await
        .map_err(|e| {
            error!("Failed to create database: {}", e);
            e
        })?;

    info!("Database '{}' created successfully", db_name);
    Ok(())
}

/// Names are interpolated into SQL: plain identifiers only
fn validate_name(name: &str) -> Result<(), String> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(format!("Invalid database name: {}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::validate_name;

    #[test]
    fn accepts_plain_identifiers() {
        assert!(validate_name("ledup_events").is_ok());
        assert!(validate_name("ledup-events-2").is_ok());
    }

    #[test]
    fn rejects_quoting_characters() {
        assert!(validate_name("").is_err());
        assert!(validate_name("x\"; DROP DATABASE y; --").is_err());
        assert!(validate_name(&"a".repeat(64)).is_err());
    }
}
