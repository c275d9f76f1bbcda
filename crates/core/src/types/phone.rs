//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// Wrong number of digits once formatting characters are removed.
    #[error("phone must have 10 or 11 digits, got {digits}")]
    DigitCount {
        /// Digits left after stripping.
        digits: usize,
    },
}

/// A phone number stored as its bare digits.
///
/// Any formatting (spaces, dashes, parentheses, a leading `+`) is discarded;
/// what remains must be 10 digits (area code + landline) or 11 digits
/// (area code + mobile).
///
/// ```
/// use farmaup_core::Phone;
///
/// let phone = Phone::parse("(85) 98888-8888").unwrap();
/// assert_eq!(phone.as_str(), "85988888888");
/// assert!(Phone::parse("12345").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Minimum accepted digit count.
    pub const MIN_DIGITS: usize = 10;
    /// Maximum accepted digit count.
    pub const MAX_DIGITS: usize = 11;

    /// Parse a `Phone`, keeping only its ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::DigitCount`] unless 10 or 11 digits remain.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let digits = strip_non_digits(s);
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len()) {
            return Err(PhoneError::DigitCount {
                digits: digits.len(),
            });
        }
        Ok(Self(digits))
    }

    /// Returns the digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Removes every character that is not an ASCII digit.
fn strip_non_digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formatted_mobile() {
        let phone = Phone::parse("(85) 98888-8888").unwrap();
        assert_eq!(phone.as_str(), "85988888888");
    }

    #[test]
    fn test_parse_landline() {
        let phone = Phone::parse("85 3333-4444").unwrap();
        assert_eq!(phone.as_str(), "8533334444");
    }

    #[test]
    fn test_parse_rejects_wrong_digit_counts() {
        for input in ["", "abc", "123456789", "123456789012", "+55 85 99999-9999"] {
            assert!(
                matches!(Phone::parse(input), Err(PhoneError::DigitCount { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_reports_digit_count() {
        assert_eq!(
            Phone::parse("12-34"),
            Err(PhoneError::DigitCount { digits: 4 })
        );
    }

    #[test]
    fn test_non_ascii_digits_are_stripped() {
        // Arabic-Indic digits are not counted
        assert!(Phone::parse("٠١٢٣٤٥٦٧٨٩").is_err());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let once = Phone::parse("85 99999-9999").unwrap();
        let twice = Phone::parse(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }
}
