//! FarmaUP Core - customer types and validation rules.
//!
//! This crate provides the pieces shared by every FarmaUP component:
//! - `api` - HTTP service for customer records
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Store implementations live in `farmaup-api`.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails and phone numbers
//! - [`customer`] - Customer record, raw input and list filter
//! - [`validation`] - Presence and shape checks with normalization

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod customer;
pub mod types;
pub mod validation;

pub use customer::{Customer, CustomerFilter, CustomerInput, Field, NewCustomer};
pub use types::*;
pub use validation::ValidationError;
