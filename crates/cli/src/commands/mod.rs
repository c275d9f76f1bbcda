//! CLI command implementations.

pub mod customers;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use farmaup_api::db::{self, RepositoryError};
use farmaup_api::services::CustomerError;

/// Errors returned by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("missing environment variable: FARMAUP_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("customer error: {0}")]
    Customer(#[from] CustomerError),
}

/// Connect to the database named by `FARMAUP_DATABASE_URL` or `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = ["FARMAUP_DATABASE_URL", "DATABASE_URL"]
        .into_iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
        .map(SecretString::from)
        .ok_or(CommandError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
