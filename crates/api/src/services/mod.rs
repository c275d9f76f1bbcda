//! Business logic services.
//!
//! Services coordinate between the HTTP layer and the store layer.

pub mod customers;

pub use customers::{CustomerError, CustomerList, CustomerService};
