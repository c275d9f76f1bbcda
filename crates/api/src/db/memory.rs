//! In-memory customer store.
//!
//! Used by tests and for running the API without a database. Uniqueness is
//! checked and the write applied under a single write lock, which gives the
//! same guarantee as the unique index in `PostgreSQL`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use farmaup_core::{Customer, CustomerFilter, CustomerId, Email, NewCustomer};

use super::{CustomerStore, RepositoryError};

#[derive(Debug)]
struct Inner {
    next_id: i32,
    customers: BTreeMap<CustomerId, Customer>,
}

impl Inner {
    fn email_holder(&self, email: &Email, exclude: Option<CustomerId>) -> Option<&Customer> {
        self.customers
            .values()
            .find(|c| &c.email == email && Some(c.id) != exclude)
    }
}

/// Customer store kept in process memory.
#[derive(Debug)]
pub struct MemoryCustomerStore {
    inner: RwLock<Inner>,
}

impl Default for MemoryCustomerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCustomerStore {
    /// Create an empty store. Ids start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                customers: BTreeMap::new(),
            }),
        }
    }
}

#[async_trait]
impl CustomerStore for MemoryCustomerStore {
    async fn find_many(&self, filter: &CustomerFilter) -> Result<Vec<Customer>, RepositoryError> {
        let inner = self.inner.read().await;
        // BTreeMap iterates in ascending id order
        Ok(inner
            .customers
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.inner.read().await.customers.get(&id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &Email,
        exclude: Option<CustomerId>,
    ) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.inner.read().await.email_holder(email, exclude).cloned())
    }

    async fn insert(&self, customer: &NewCustomer) -> Result<Customer, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.email_holder(&customer.email, None).is_some() {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let id = CustomerId::new(inner.next_id);
        inner.next_id += 1;
        let stored = customer.clone().with_id(id);
        inner.customers.insert(id, stored.clone());
        Ok(stored)
    }

    async fn replace(
        &self,
        id: CustomerId,
        customer: &NewCustomer,
    ) -> Result<Option<Customer>, RepositoryError> {
        let mut inner = self.inner.write().await;
        if !inner.customers.contains_key(&id) {
            return Ok(None);
        }
        if inner.email_holder(&customer.email, Some(id)).is_some() {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let stored = customer.clone().with_id(id);
        inner.customers.insert(id, stored.clone());
        Ok(Some(stored))
    }

    async fn remove(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.inner.write().await.customers.remove(&id))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
