//! Customer service.
//!
//! Validates and normalizes input, enforces email uniqueness, and delegates
//! persistence to a [`CustomerStore`]. Every transport entry point (HTTP
//! routes, the CLI seeder) goes through this one type.
//!
//! # Uniqueness
//!
//! Writes are preceded by an explicit email lookup so the common case returns
//! [`CustomerError::DuplicateEmail`] with the conflicting id before touching
//! the store. Two concurrent writers can both pass that lookup; the store's
//! own constraint then rejects the second write with
//! [`RepositoryError::Conflict`], which is translated here into the same
//! `DuplicateEmail` outcome.

mod error;

pub use error::CustomerError;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use farmaup_core::validation::validate;
use farmaup_core::{Customer, CustomerFilter, CustomerId, CustomerInput, Email};

use crate::db::{CustomerStore, RepositoryError};

/// Result of a list query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerList {
    pub total: usize,
    pub customers: Vec<Customer>,
}

/// Customer record service.
///
/// Stateless apart from the shared store handle; cheap to clone.
#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn CustomerStore>,
}

impl std::fmt::Debug for CustomerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerService")
            .field("store", &self.store.backend())
            .finish()
    }
}

impl CustomerService {
    /// Create a new customer service over a store.
    #[must_use]
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self { store }
    }

    /// Get a reference to the underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn CustomerStore {
        self.store.as_ref()
    }

    /// List customers matching the filter, ordered by ascending id.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Storage` if the store query fails.
    pub async fn list(&self, filter: CustomerFilter) -> Result<CustomerList, CustomerError> {
        let customers = self.store.find_many(&filter.normalized()).await?;
        Ok(CustomerList {
            total: customers.len(),
            customers,
        })
    }

    /// Get a customer by its id token.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::InvalidId` if `raw_id` is not a positive integer.
    /// Returns `CustomerError::NotFound` if no customer has that id.
    pub async fn get(&self, raw_id: &str) -> Result<Customer, CustomerError> {
        let id = parse_id(raw_id)?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or(CustomerError::NotFound(id))
    }

    /// Create a customer.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::MissingFields`, `InvalidEmail` or `InvalidPhone`
    /// for rejected input (the store is never called).
    /// Returns `CustomerError::DuplicateEmail` if the normalized email is taken.
    pub async fn create(&self, input: &CustomerInput) -> Result<Customer, CustomerError> {
        let customer = validate(input)?;

        if let Some(existing) = self.store.find_by_email(&customer.email, None).await? {
            warn!(existing_id = %existing.id, "Rejected customer with duplicate email");
            return Err(CustomerError::DuplicateEmail {
                existing_id: existing.id,
            });
        }

        let created = match self.store.insert(&customer).await {
            Ok(created) => created,
            Err(err @ RepositoryError::Conflict(_)) => {
                return Err(self.resolve_conflict(&customer.email, None, err).await);
            }
            Err(err) => return Err(err.into()),
        };

        info!(customer_id = %created.id, "Customer created");
        Ok(created)
    }

    /// Replace all fields of an existing customer.
    ///
    /// A customer may resubmit its own email; only another record holding it
    /// counts as a duplicate.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::InvalidId` before any field validation.
    /// Returns the field validation errors of [`CustomerService::create`].
    /// Returns `CustomerError::NotFound` if the customer does not exist.
    /// Returns `CustomerError::DuplicateEmail` if another customer holds the email.
    pub async fn update(
        &self,
        raw_id: &str,
        input: &CustomerInput,
    ) -> Result<Customer, CustomerError> {
        let id = parse_id(raw_id)?;
        let customer = validate(input)?;

        if self.store.find_by_id(id).await?.is_none() {
            return Err(CustomerError::NotFound(id));
        }

        if let Some(existing) = self.store.find_by_email(&customer.email, Some(id)).await? {
            warn!(
                customer_id = %id,
                existing_id = %existing.id,
                "Rejected update with duplicate email"
            );
            return Err(CustomerError::DuplicateEmail {
                existing_id: existing.id,
            });
        }

        let updated = match self.store.replace(id, &customer).await {
            Ok(Some(updated)) => updated,
            Ok(None) => return Err(CustomerError::NotFound(id)),
            Err(err @ RepositoryError::Conflict(_)) => {
                return Err(self.resolve_conflict(&customer.email, Some(id), err).await);
            }
            Err(err) => return Err(err.into()),
        };

        info!(customer_id = %updated.id, "Customer updated");
        Ok(updated)
    }

    /// Delete a customer, returning the record as it was before removal.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::InvalidId` if `raw_id` is not a positive integer.
    /// Returns `CustomerError::NotFound` if no customer has that id.
    pub async fn delete(&self, raw_id: &str) -> Result<Customer, CustomerError> {
        let id = parse_id(raw_id)?;
        let removed = self
            .store
            .remove(id)
            .await?
            .ok_or(CustomerError::NotFound(id))?;

        info!(customer_id = %removed.id, "Customer deleted");
        Ok(removed)
    }

    /// Turn a store-level uniqueness violation into `DuplicateEmail`.
    ///
    /// Falls back to `Storage` with the original error if the conflicting row
    /// cannot be found (e.g. it was deleted in the meantime).
    async fn resolve_conflict(
        &self,
        email: &Email,
        exclude: Option<CustomerId>,
        err: RepositoryError,
    ) -> CustomerError {
        match self.store.find_by_email(email, exclude).await {
            Ok(Some(existing)) => {
                warn!(
                    existing_id = %existing.id,
                    "Store rejected write with duplicate email"
                );
                CustomerError::DuplicateEmail {
                    existing_id: existing.id,
                }
            }
            Ok(None) => CustomerError::Storage(err),
            Err(lookup_err) => CustomerError::Storage(lookup_err),
        }
    }
}

/// Parse an id token from a request path.
fn parse_id(raw_id: &str) -> Result<CustomerId, CustomerError> {
    Ok(raw_id.parse::<CustomerId>()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use farmaup_core::{Field, NewCustomer};

    use super::*;
    use crate::db::MemoryCustomerStore;

    /// Wraps a memory store, counting writes and optionally simulating a
    /// concurrent writer that slips in between the lookup and the write.
    #[derive(Default)]
    struct ProbeStore {
        inner: MemoryCustomerStore,
        writes: AtomicUsize,
        stale_lookup_once: AtomicBool,
    }

    #[async_trait]
    impl CustomerStore for ProbeStore {
        async fn find_many(
            &self,
            filter: &CustomerFilter,
        ) -> Result<Vec<Customer>, RepositoryError> {
            self.inner.find_many(filter).await
        }

        async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_email(
            &self,
            email: &Email,
            exclude: Option<CustomerId>,
        ) -> Result<Option<Customer>, RepositoryError> {
            if self.stale_lookup_once.swap(false, Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_by_email(email, exclude).await
        }

        async fn insert(&self, customer: &NewCustomer) -> Result<Customer, RepositoryError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.insert(customer).await
        }

        async fn replace(
            &self,
            id: CustomerId,
            customer: &NewCustomer,
        ) -> Result<Option<Customer>, RepositoryError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.replace(id, customer).await
        }

        async fn remove(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.remove(id).await
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            Ok(())
        }

        fn backend(&self) -> &'static str {
            "probe"
        }
    }

    /// Store whose every call fails.
    struct BrokenStore;

    #[async_trait]
    impl CustomerStore for BrokenStore {
        async fn find_many(&self, _: &CustomerFilter) -> Result<Vec<Customer>, RepositoryError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn find_by_id(&self, _: CustomerId) -> Result<Option<Customer>, RepositoryError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn find_by_email(
            &self,
            _: &Email,
            _: Option<CustomerId>,
        ) -> Result<Option<Customer>, RepositoryError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn insert(&self, _: &NewCustomer) -> Result<Customer, RepositoryError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn replace(
            &self,
            _: CustomerId,
            _: &NewCustomer,
        ) -> Result<Option<Customer>, RepositoryError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn remove(&self, _: CustomerId) -> Result<Option<Customer>, RepositoryError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        fn backend(&self) -> &'static str {
            "broken"
        }
    }

    fn service() -> (CustomerService, Arc<ProbeStore>) {
        let store = Arc::new(ProbeStore::default());
        (CustomerService::new(store.clone()), store)
    }

    fn ana() -> CustomerInput {
        CustomerInput::new("Ana Souza", "ana@email.com", "85999999999", "Fortaleza")
    }

    fn joao() -> CustomerInput {
        CustomerInput::new("João Silva", "joao@email.com", "85988888888", "Fortaleza")
    }

    #[tokio::test]
    async fn test_create_normalizes_and_assigns_id() {
        let (service, _) = service();
        let created = service
            .create(&CustomerInput::new(
                "Ana Souza",
                "ANA@EMAIL.COM ",
                "85 99999-9999",
                " Fortaleza",
            ))
            .await
            .unwrap();

        assert_eq!(created.id, CustomerId::new(1));
        assert_eq!(created.name, "Ana Souza");
        assert_eq!(created.email.as_str(), "ana@email.com");
        assert_eq!(created.phone.as_str(), "85999999999");
        assert_eq!(created.city, "Fortaleza");

        let stored = service.get("1").await.unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_missing_fields_never_reach_the_write_path() {
        let (service, store) = service();
        let existing = service.create(&ana()).await.unwrap();
        let writes_before = store.writes.load(Ordering::SeqCst);

        for field in Field::ALL {
            let mut input = joao();
            match field {
                Field::Name => input.name = Some(String::new()),
                Field::Email => input.email = None,
                Field::Phone => input.phone = Some(String::new()),
                Field::City => input.city = None,
            }

            let err = service.create(&input).await.unwrap_err();
            assert!(matches!(err, CustomerError::MissingFields(ref f) if f == &[field]));

            let err = service
                .update(&existing.id.to_string(), &input)
                .await
                .unwrap_err();
            assert!(matches!(err, CustomerError::MissingFields(_)));
        }

        assert_eq!(store.writes.load(Ordering::SeqCst), writes_before);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_shapes() {
        let (service, store) = service();

        let mut input = ana();
        input.email = Some("a@b".into());
        assert!(matches!(
            service.create(&input).await,
            Err(CustomerError::InvalidEmail(_))
        ));

        let mut input = ana();
        input.phone = Some("9999-9999".into());
        assert!(matches!(
            service.create(&input).await,
            Err(CustomerError::InvalidPhone(_))
        ));

        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_case_insensitive() {
        let (service, store) = service();
        let first = service.create(&ana()).await.unwrap();

        let mut input = joao();
        input.email = Some("Ana@Email.com".into());
        let err = service.create(&input).await.unwrap_err();

        assert!(matches!(
            err,
            CustomerError::DuplicateEmail { existing_id } if existing_id == first.id
        ));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_conflict_is_reported_as_duplicate() {
        let (service, store) = service();
        let first = service.create(&ana()).await.unwrap();

        // The pre-check misses the existing row, as it would under a race
        store.stale_lookup_once.store(true, Ordering::SeqCst);
        let mut input = joao();
        input.email = Some("ANA@email.com".into());
        let err = service.create(&input).await.unwrap_err();

        assert!(matches!(
            err,
            CustomerError::DuplicateEmail { existing_id } if existing_id == first.id
        ));
    }

    #[tokio::test]
    async fn test_update_conflict_from_store_is_reported_as_duplicate() {
        let (service, store) = service();
        let ana = service.create(&ana()).await.unwrap();
        let joao = service.create(&joao()).await.unwrap();

        store.stale_lookup_once.store(true, Ordering::SeqCst);
        let mut input = self::joao();
        input.email = Some("ana@email.com".into());
        let err = service.update(&joao.id.to_string(), &input).await.unwrap_err();

        assert!(matches!(
            err,
            CustomerError::DuplicateEmail { existing_id } if existing_id == ana.id
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_own_email() {
        let (service, _) = service();
        let created = service.create(&ana()).await.unwrap();

        let mut input = ana();
        input.name = Some("Ana Souza Lima".into());
        input.email = Some(" ANA@email.com".into());
        let updated = service.update("1", &input).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Ana Souza Lima");
        assert_eq!(updated.email, created.email);
    }

    #[tokio::test]
    async fn test_update_rejects_email_of_another_customer() {
        let (service, _) = service();
        let ana = service.create(&ana()).await.unwrap();
        let joao = service.create(&joao()).await.unwrap();

        let mut input = self::joao();
        input.email = Some("ana@email.com".into());
        let err = service.update(&joao.id.to_string(), &input).await.unwrap_err();

        assert!(matches!(
            err,
            CustomerError::DuplicateEmail { existing_id } if existing_id == ana.id
        ));
        assert_eq!(service.get("2").await.unwrap().email.as_str(), "joao@email.com");
    }

    #[tokio::test]
    async fn test_update_missing_customer() {
        let (service, store) = service();
        let err = service.update("42", &ana()).await.unwrap_err();
        assert!(matches!(err, CustomerError::NotFound(id) if id == CustomerId::new(42)));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_checks_id_before_fields() {
        let (service, _) = service();
        let err = service
            .update("abc", &CustomerInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CustomerError::InvalidId(_)));
    }

    #[tokio::test]
    async fn test_get_invalid_and_missing_ids() {
        let (service, _) = service();
        assert!(matches!(
            service.get("abc").await,
            Err(CustomerError::InvalidId(_))
        ));
        assert!(matches!(
            service.get("0").await,
            Err(CustomerError::InvalidId(_))
        ));
        assert!(matches!(
            service.get("9999").await,
            Err(CustomerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_returns_snapshot_then_not_found() {
        let (service, _) = service();
        let created = service.create(&ana()).await.unwrap();

        let removed = service.delete("1").await.unwrap();
        assert_eq!(removed, created);

        assert!(matches!(
            service.get("1").await,
            Err(CustomerError::NotFound(_))
        ));
        assert!(matches!(
            service.delete("1").await,
            Err(CustomerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_counts() {
        let (service, _) = service();
        service.create(&ana()).await.unwrap();
        service.create(&joao()).await.unwrap();
        service
            .create(&CustomerInput::new(
                "Maria Santos",
                "maria@email.com",
                "85977777777",
                "Caucaia",
            ))
            .await
            .unwrap();

        let all = service.list(CustomerFilter::default()).await.unwrap();
        assert_eq!(all.total, 3);
        let ids: Vec<_> = all.customers.iter().map(|c| c.id.as_i32()).collect();
        assert_eq!(ids, [1, 2, 3]);

        let filtered = service
            .list(CustomerFilter::new(Some("SILVA".into()), Some("forta".into())))
            .await
            .unwrap();
        assert_eq!(filtered.total, 1);
        assert_eq!(filtered.customers[0].name, "João Silva");

        let empty_terms = service
            .list(CustomerFilter {
                name: Some(String::new()),
                city: None,
            })
            .await
            .unwrap();
        assert_eq!(empty_terms.total, 3);
    }

    #[tokio::test]
    async fn test_storage_failures_surface_as_storage_errors() {
        let service = CustomerService::new(Arc::new(BrokenStore));

        assert!(matches!(
            service.list(CustomerFilter::default()).await,
            Err(CustomerError::Storage(_))
        ));
        assert!(matches!(
            service.get("1").await,
            Err(CustomerError::Storage(_))
        ));
        assert!(matches!(
            service.create(&ana()).await,
            Err(CustomerError::Storage(_))
        ));
        assert!(matches!(
            service.delete("1").await,
            Err(CustomerError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_validation_wins_over_storage_failures() {
        let service = CustomerService::new(Arc::new(BrokenStore));
        assert!(matches!(
            service.create(&CustomerInput::default()).await,
            Err(CustomerError::MissingFields(_))
        ));
        assert!(matches!(
            service.get("abc").await,
            Err(CustomerError::InvalidId(_))
        ));
    }
}
