//! Customer service error types.

use thiserror::Error;

use farmaup_core::{CustomerId, EmailError, Field, IdError, PhoneError, ValidationError};

use crate::db::RepositoryError;

/// Errors that can occur during customer operations.
#[derive(Debug, Error)]
pub enum CustomerError {
    /// One or more required fields are absent or blank.
    #[error("all fields are required, missing: {}", .0.iter().map(Field::as_str).collect::<Vec<_>>().join(", "))]
    MissingFields(Vec<Field>),

    /// Email does not look like `local@domain.tld`.
    #[error("invalid email: {0}")]
    InvalidEmail(#[source] EmailError),

    /// Phone does not have 10 or 11 digits.
    #[error("invalid phone: {0}")]
    InvalidPhone(#[source] PhoneError),

    /// The id token is not a positive integer.
    #[error("invalid id: {0}")]
    InvalidId(#[from] IdError),

    /// No customer has this id.
    #[error("customer {0} not found")]
    NotFound(CustomerId),

    /// Another customer already holds the normalized email.
    #[error("email already registered to customer {existing_id}")]
    DuplicateEmail {
        /// Id of the customer holding the email.
        existing_id: CustomerId,
    },

    /// Repository/database error.
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

impl From<ValidationError> for CustomerError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingFields(fields) => Self::MissingFields(fields),
            ValidationError::InvalidEmail(e) => Self::InvalidEmail(e),
            ValidationError::InvalidPhone(e) => Self::InvalidPhone(e),
        }
    }
}

impl CustomerError {
    /// Machine-stable reason code reported to clients.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "missing_fields",
            Self::InvalidEmail(_) => "invalid_email",
            Self::InvalidPhone(_) => "invalid_phone",
            Self::InvalidId(_) => "invalid_id",
            Self::NotFound(_) => "not_found",
            Self::DuplicateEmail { .. } => "duplicate_email",
            Self::Storage(_) => "storage_error",
        }
    }
}
