//! Database migration command.
//!
//! Applies the migrations embedded from `crates/api/migrations/`.

use super::{CommandError, connect};

/// Run all pending migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    farmaup_api::db::run_migrations(&pool).await?;
    tracing::info!("Migrations complete!");

    pool.close().await;
    Ok(())
}
