//! Integration tests for the FarmaUP customer records API.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process HTTP tests against the in-memory store
//! cargo test -p farmaup-integration-tests
//!
//! # Also run the PostgreSQL-backed tests
//! FARMAUP_TEST_DATABASE_URL=postgres://localhost/farmaup_test \
//!     cargo test -p farmaup-integration-tests -- --include-ignored
//! ```
//!
//! Requests are driven through the real router with `tower::ServiceExt::oneshot`,
//! so every middleware layer is exercised without binding a socket.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use farmaup_api::config::ApiConfig;
use farmaup_api::db::{CustomerStore, MemoryCustomerStore, RepositoryError};
use farmaup_api::routes;
use farmaup_api::state::AppState;
use farmaup_core::{Customer, CustomerFilter, CustomerId, Email, NewCustomer};

/// Token accepted by every [`TestApp`].
pub const TEST_TOKEN: &str = "integration-s3cret";

/// Build a configuration for `environment` without touching the process env.
pub fn test_config(environment: &str) -> ApiConfig {
    let vars: HashMap<&str, &str> = [
        ("FARMAUP_DATABASE_URL", "postgres://localhost/farmaup_test"),
        ("FARMAUP_API_TOKEN", TEST_TOKEN),
        ("FARMAUP_ENV", environment),
    ]
    .into_iter()
    .collect();

    ApiConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_owned())).unwrap()
}

/// A router plus the helpers to call it.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    /// Production-mode app over a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_store("production", Arc::new(MemoryCustomerStore::new()))
    }

    /// Development-mode app over a fresh in-memory store.
    pub fn development() -> Self {
        Self::with_store("development", Arc::new(MemoryCustomerStore::new()))
    }

    /// App over an arbitrary store.
    pub fn with_store(environment: &str, store: Arc<dyn CustomerStore>) -> Self {
        let state = AppState::new(test_config(environment), store);
        Self {
            router: routes::router(state),
        }
    }

    /// Send a request with explicit headers and an optional raw body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        headers: &[(header::HeaderName, &str)],
        body: Option<String>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(name, *value);
        }
        let request = builder
            .body(body.map_or_else(Body::empty, Body::from))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Send an authorized request, with `body` encoded as JSON.
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let auth = format!("Bearer {TEST_TOKEN}");
        let mut headers = vec![(header::AUTHORIZATION, auth.as_str())];
        if body.is_some() {
            headers.push((header::CONTENT_TYPE, "application/json"));
        }
        self.send(method, uri, &headers, body.map(|b| b.to_string()))
            .await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.call(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.call(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.call(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.call(Method::DELETE, uri, None).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Store whose every operation fails, including `ping`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrokenStore;

/// Cause reported by [`BrokenStore`].
pub const BROKEN_STORE_CAUSE: &str = "customers table is unreadable";

fn broken<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::DataCorruption(BROKEN_STORE_CAUSE.to_owned()))
}

#[async_trait]
impl CustomerStore for BrokenStore {
    async fn find_many(&self, _filter: &CustomerFilter) -> Result<Vec<Customer>, RepositoryError> {
        broken()
    }

    async fn find_by_id(&self, _id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        broken()
    }

    async fn find_by_email(
        &self,
        _email: &Email,
        _exclude: Option<CustomerId>,
    ) -> Result<Option<Customer>, RepositoryError> {
        broken()
    }

    async fn insert(&self, _customer: &NewCustomer) -> Result<Customer, RepositoryError> {
        broken()
    }

    async fn replace(
        &self,
        _id: CustomerId,
        _customer: &NewCustomer,
    ) -> Result<Option<Customer>, RepositoryError> {
        broken()
    }

    async fn remove(&self, _id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        broken()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        broken()
    }

    fn backend(&self) -> &'static str {
        "broken"
    }
}

/// JSON body for a customer.
pub fn customer_json(name: &str, email: &str, phone: &str, city: &str) -> Value {
    serde_json::json!({
        "name": name,
        "email": email,
        "phone": phone,
        "city": city,
    })
}

/// Ana Souza from Fortaleza.
pub fn ana() -> Value {
    customer_json("Ana Souza", "ana@email.com", "85999999999", "Fortaleza")
}

/// João Silva from Fortaleza.
pub fn joao() -> Value {
    customer_json("João Silva", "joao@email.com", "85988888888", "Fortaleza")
}

/// Maria Santos from Caucaia.
pub fn maria() -> Value {
    customer_json("Maria Santos", "maria@email.com", "85977777777", "Caucaia")
}
