//! Customer validation rules.
//!
//! Presence is always checked first; shape checks on an absent field would be
//! meaningless. [`validate`] runs presence → email → phone and stops at the
//! first failure.

use thiserror::Error;

use crate::customer::{CustomerInput, Field, NewCustomer};
use crate::types::{Email, EmailError, Phone, PhoneError};

/// Why a customer input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields are absent or blank.
    #[error("missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<Field>),

    /// Email does not look like `local@domain.tld`.
    #[error("invalid email: {0}")]
    InvalidEmail(#[source] EmailError),

    /// Phone does not have 10 or 11 digits.
    #[error("invalid phone: {0}")]
    InvalidPhone(#[source] PhoneError),
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Borrowed view of an input whose four fields are known to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentFields<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub city: &'a str,
}

/// Check that name, email, phone and city are all present and non-blank.
///
/// # Errors
///
/// Returns [`ValidationError::MissingFields`] listing every missing field.
pub fn require_all_fields(input: &CustomerInput) -> Result<PresentFields<'_>, ValidationError> {
    let missing: Vec<Field> = Field::ALL
        .into_iter()
        .filter(|field| input.get(*field).is_none_or(|v| v.trim().is_empty()))
        .collect();

    match (
        input.name.as_deref(),
        input.email.as_deref(),
        input.phone.as_deref(),
        input.city.as_deref(),
    ) {
        (Some(name), Some(email), Some(phone), Some(city)) if missing.is_empty() => {
            Ok(PresentFields {
                name,
                email,
                phone,
                city,
            })
        }
        _ => Err(ValidationError::MissingFields(missing)),
    }
}

/// Check the `local@domain.tld` shape of an email, ignoring outer whitespace.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidEmail`] if the shape does not match.
pub fn validate_email_shape(email: &str) -> Result<(), ValidationError> {
    Email::parse(email)
        .map(drop)
        .map_err(ValidationError::InvalidEmail)
}

/// Check that a phone has 10 or 11 digits once non-digits are stripped.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPhone`] otherwise.
pub fn validate_phone_shape(phone: &str) -> Result<(), ValidationError> {
    Phone::parse(phone)
        .map(drop)
        .map_err(ValidationError::InvalidPhone)
}

/// Validate and normalize a customer input.
///
/// Name and city are trimmed, email is trimmed and lower-cased, phone is
/// reduced to its digits. Applying this to its own output is a no-op.
///
/// # Errors
///
/// Returns the first failing check, in presence → email → phone order.
pub fn validate(input: &CustomerInput) -> Result<NewCustomer, ValidationError> {
    let present = require_all_fields(input)?;
    let email = Email::parse(present.email).map_err(ValidationError::InvalidEmail)?;
    let phone = Phone::parse(present.phone).map_err(ValidationError::InvalidPhone)?;

    Ok(NewCustomer {
        name: present.name.trim().to_owned(),
        email,
        phone,
        city: present.city.trim().to_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn full_input() -> CustomerInput {
        CustomerInput::new("Ana Souza", "ANA@EMAIL.COM ", "85 99999-9999", " Fortaleza")
    }

    #[test]
    fn test_each_missing_field_is_reported() {
        for field in Field::ALL {
            let mut input = full_input();
            match field {
                Field::Name => input.name = None,
                Field::Email => input.email = None,
                Field::Phone => input.phone = None,
                Field::City => input.city = None,
            }
            assert_eq!(
                require_all_fields(&input),
                Err(ValidationError::MissingFields(vec![field]))
            );
        }
    }

    #[test]
    fn test_empty_and_blank_strings_count_as_missing() {
        let input = CustomerInput::new("", "  ", "85999999999", "Fortaleza");
        assert_eq!(
            validate(&input),
            Err(ValidationError::MissingFields(vec![Field::Name, Field::Email]))
        );
    }

    #[test]
    fn test_all_missing_lists_every_field() {
        let err = validate(&CustomerInput::default()).unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(Field::ALL.to_vec()));
        assert_eq!(
            err.to_string(),
            "missing required fields: name, email, phone, city"
        );
    }

    #[test]
    fn test_presence_is_checked_before_shape() {
        let input = CustomerInput {
            email: Some("not-an-email".into()),
            phone: Some("1".into()),
            ..CustomerInput::default()
        };
        assert!(matches!(
            validate(&input),
            Err(ValidationError::MissingFields(_))
        ));
    }

    #[test]
    fn test_email_checked_before_phone() {
        let input = CustomerInput::new("Ana", "a@b", "1", "Fortaleza");
        assert!(matches!(
            validate(&input),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_email_shape_examples() {
        assert!(validate_email_shape("a@b.c").is_ok());
        assert!(validate_email_shape("a@b").is_err());
        assert!(validate_email_shape("ab.c").is_err());
        assert!(validate_email_shape("a.b@c").is_err());
    }

    #[test]
    fn test_phone_shape_examples() {
        assert!(validate_phone_shape("(85) 98888-8888").is_ok());
        assert!(validate_phone_shape("8533334444").is_ok());
        assert!(validate_phone_shape("853333444").is_err());
        assert!(validate_phone_shape("853333444455").is_err());
    }

    #[test]
    fn test_invalid_phone_is_reported() {
        let input = CustomerInput::new("Ana", "ana@email.com", "9999-9999", "Fortaleza");
        assert_eq!(
            validate(&input),
            Err(ValidationError::InvalidPhone(PhoneError::DigitCount {
                digits: 8
            }))
        );
    }

    #[test]
    fn test_validate_normalizes_every_field() {
        let customer = validate(&full_input()).unwrap();
        assert_eq!(customer.name, "Ana Souza");
        assert_eq!(customer.email.as_str(), "ana@email.com");
        assert_eq!(customer.phone.as_str(), "85999999999");
        assert_eq!(customer.city, "Fortaleza");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            full_input(),
            CustomerInput::new("  João Silva ", "Joao@Email.com", "(85) 98888-8888", "Fortaleza "),
            CustomerInput::new("Maria", "maria@email.com", "85977777777", "Caucaia"),
        ];
        for input in inputs {
            let once = validate(&input).unwrap();
            let again = CustomerInput::new(
                once.name.clone(),
                once.email.as_str(),
                once.phone.as_str(),
                once.city.clone(),
            );
            let twice = validate(&again).unwrap();
            assert_eq!(once, twice);
        }
    }
}
