//! Customer persistence.
//!
//! # Database: `farmaup`
//!
//! ## Tables
//!
//! - `customers` - One row per customer, unique index on `lower(email)`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p farmaup-cli -- migrate
//! ```
//!
//! # Stores
//!
//! The service only talks to [`CustomerStore`]. [`PgCustomerStore`] is the
//! production implementation; [`MemoryCustomerStore`] backs tests and local
//! runs without a database. Both enforce email uniqueness themselves and
//! report a violation as [`RepositoryError::Conflict`].

pub mod customers;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use farmaup_core::{Customer, CustomerFilter, CustomerId, Email, NewCustomer};

pub use customers::PgCustomerStore;
pub use memory::MemoryCustomerStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Storage operations the customer service depends on.
///
/// `replace` and `remove` return `None` when no row has the given id, so a
/// record deleted between a lookup and the write is reported as absent
/// rather than as a storage failure.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Customers matching every set filter term, ordered by ascending id.
    async fn find_many(&self, filter: &CustomerFilter) -> Result<Vec<Customer>, RepositoryError>;

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    /// Customer holding `email`, optionally ignoring the record `exclude`.
    async fn find_by_email(
        &self,
        email: &Email,
        exclude: Option<CustomerId>,
    ) -> Result<Option<Customer>, RepositoryError>;

    /// Insert a customer and return it with its assigned id.
    ///
    /// Fails with [`RepositoryError::Conflict`] if the email is taken.
    async fn insert(&self, customer: &NewCustomer) -> Result<Customer, RepositoryError>;

    /// Overwrite all four fields of an existing customer.
    ///
    /// Fails with [`RepositoryError::Conflict`] if another record holds the email.
    async fn replace(
        &self,
        id: CustomerId,
        customer: &NewCustomer,
    ) -> Result<Option<Customer>, RepositoryError>;

    /// Delete a customer, returning the row as it was before removal.
    async fn remove(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Short name of the backend, reported by the info endpoint.
    fn backend(&self) -> &'static str;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the embedded migrations against `pool`.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
