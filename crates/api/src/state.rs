//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::CustomerStore;
use crate::services::CustomerService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the configuration and the customer
/// service built over the configured store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    customers: CustomerService,
}

impl AppState {
    /// Create a new application state over a store.
    #[must_use]
    pub fn new(config: ApiConfig, store: Arc<dyn CustomerStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                customers: CustomerService::new(store),
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the customer service.
    #[must_use]
    pub fn customers(&self) -> &CustomerService {
        &self.inner.customers
    }
}
