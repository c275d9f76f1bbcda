//! Seed the database with demo customers.
//!
//! Records go through `CustomerService`, so they are validated and
//! normalized exactly like API input. Customers whose email is already
//! registered are skipped, which makes the command safe to re-run.

use std::sync::Arc;

use tracing::info;

use farmaup_api::db::PgCustomerStore;
use farmaup_api::services::{CustomerError, CustomerService};
use farmaup_core::CustomerInput;

use super::{CommandError, connect};

/// Demo customers as `(name, email, phone, city)`.
pub const DEMO_CUSTOMERS: [(&str, &str, &str, &str); 3] = [
    ("Ana Souza", "ana@email.com", "85999999999", "Fortaleza"),
    ("João Silva", "joao@email.com", "85988888888", "Fortaleza"),
    ("Maria Santos", "maria@email.com", "85977777777", "Caucaia"),
];

/// Outcome of a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedResult {
    pub removed: u64,
    pub inserted: usize,
    pub skipped: usize,
}

/// Insert the demo customers through `service`.
///
/// # Errors
///
/// Returns the first error other than a duplicate email.
pub async fn seed_with(service: &CustomerService) -> Result<SeedResult, CustomerError> {
    let mut result = SeedResult::default();

    for (name, email, phone, city) in DEMO_CUSTOMERS {
        match service
            .create(&CustomerInput::new(name, email, phone, city))
            .await
        {
            Ok(customer) => {
                info!(customer_id = %customer.id, email, "Inserted customer");
                result.inserted += 1;
            }
            Err(CustomerError::DuplicateEmail { existing_id }) => {
                info!(%existing_id, email, "Customer already exists, skipping");
                result.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(result)
}

/// Seed the configured database.
pub async fn demo_customers(reset: bool) -> Result<(), CommandError> {
    let pool = connect().await?;
    let store = Arc::new(PgCustomerStore::new(pool.clone()));

    let removed = if reset {
        let removed = store.delete_all().await?;
        info!(removed, "Removed existing customers");
        removed
    } else {
        0
    };

    let service = CustomerService::new(store);
    let result = SeedResult {
        removed,
        ..seed_with(&service).await?
    };

    info!("Seeding complete!");
    info!("  Customers removed: {}", result.removed);
    info!("  Customers inserted: {}", result.inserted);
    info!("  Customers skipped (already exist): {}", result.skipped);

    pool.close().await;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use farmaup_api::db::MemoryCustomerStore;
    use farmaup_core::CustomerFilter;

    use super::*;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let service = CustomerService::new(Arc::new(MemoryCustomerStore::new()));

        let first = seed_with(&service).await.unwrap();
        assert_eq!(first.inserted, 3);
        assert_eq!(first.skipped, 0);

        let second = seed_with(&service).await.unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped, 3);

        let list = service.list(CustomerFilter::default()).await.unwrap();
        assert_eq!(list.total, 3);
    }

    #[tokio::test]
    async fn test_demo_customers_are_valid() {
        let service = CustomerService::new(Arc::new(MemoryCustomerStore::new()));
        seed_with(&service).await.unwrap();

        let fortaleza = service
            .list(CustomerFilter::new(None, Some("Fortaleza".into())))
            .await
            .unwrap();
        assert_eq!(fortaleza.total, 2);
    }
}
