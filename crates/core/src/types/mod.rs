//! Core value types for FarmaUP.
//!
//! Each type normalizes on parse, so holding one means the value already
//! satisfies its storage rules.

pub mod email;
pub mod id;
pub mod phone;

pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};
