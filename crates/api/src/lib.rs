//! FarmaUP customer records API library.
//!
//! The HTTP service is exposed as a library so the CLI and the integration
//! tests can build the same router, service and stores as the binary.
//!
//! - [`services::CustomerService`] holds all validation and uniqueness rules
//! - [`db::CustomerStore`] is the persistence seam, with `PostgreSQL` and
//!   in-memory implementations
//! - [`routes::router`] wires the service to axum with the middleware stack

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
