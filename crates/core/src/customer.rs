//! Customer record, its raw input shape, and list filters.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{CustomerId, Email, Phone};

/// A field of the customer input, used to report which ones are missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Phone,
    City,
}

impl Field {
    /// Every field, in the order they are reported.
    pub const ALL: [Self; 4] = [Self::Name, Self::Email, Self::Phone, Self::City];

    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::City => "city",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer data as submitted by a client, before any validation.
///
/// Every field is optional so that absence can be reported precisely
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl CustomerInput {
    /// Build an input with all four fields set.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            phone: Some(phone.into()),
            city: Some(city.into()),
        }
    }

    /// Returns the raw value of a field.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::Phone => self.phone.as_deref(),
            Field::City => self.city.as_deref(),
        }
    }
}

/// Validated, normalized customer data ready to be written.
///
/// Only [`crate::validation::validate`] produces one from client input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub city: String,
}

impl NewCustomer {
    /// Attach a store-assigned id.
    #[must_use]
    pub fn with_id(self, id: CustomerId) -> Customer {
        Customer {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            city: self.city,
        }
    }
}

/// A stored customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub city: String,
}

/// Optional list filters; each is a case-insensitive substring match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerFilter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl CustomerFilter {
    /// Build a filter, discarding empty terms.
    #[must_use]
    pub fn new(name: Option<String>, city: Option<String>) -> Self {
        Self {
            name: name.filter(|s| !s.is_empty()),
            city: city.filter(|s| !s.is_empty()),
        }
    }

    /// Returns the same filter with empty terms discarded.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::new(self.name, self.city)
    }

    /// Returns `true` if the customer satisfies every set term.
    #[must_use]
    pub fn matches(&self, customer: &Customer) -> bool {
        contains_ignore_case(&customer.name, self.name.as_deref())
            && contains_ignore_case(&customer.city, self.city.as_deref())
    }
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    needle.is_none_or(|needle| haystack.to_lowercase().contains(&needle.to_lowercase()))
}
