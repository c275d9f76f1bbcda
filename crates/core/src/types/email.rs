//! Email address type.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimal `local@domain.tld` shape: no whitespace anywhere, exactly one `@`,
/// at least one `.` after it with something on both sides.
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty after trimming.
    #[error("email cannot be empty")]
    Empty,
    /// The input does not look like `local@domain.tld`.
    #[error("email must look like local@domain.tld")]
    InvalidShape,
}

/// A normalized email address.
///
/// Parsing trims surrounding whitespace, checks the permissive
/// `local@domain.tld` shape and lower-cases the result, so two addresses that
/// differ only in case or padding compare equal.
///
/// The shape check does not verify deliverability or RFC 5322 compliance.
///
/// ## Examples
///
/// ```
/// use farmaup_core::Email;
///
/// let email = Email::parse(" Ana@Email.COM ").unwrap();
/// assert_eq!(email.as_str(), "ana@email.com");
///
/// assert!(Email::parse("a@b.c").is_ok());
/// assert!(Email::parse("a@b").is_err());          // no dot after @
/// assert!(Email::parse("no-at-symbol").is_err()); // missing @
/// assert!(Email::parse("a b@c.d").is_err());      // inner whitespace
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse and normalize an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Empty`] for blank input and
    /// [`EmailError::InvalidShape`] when the trimmed input does not match the
    /// `local@domain.tld` shape.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }
        if !is_valid_shape(trimmed) {
            return Err(EmailError::InvalidShape);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns `true` when `s` matches the `local@domain.tld` shape as-is.
fn is_valid_shape(s: &str) -> bool {
    EMAIL_SHAPE.is_match(s)
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
