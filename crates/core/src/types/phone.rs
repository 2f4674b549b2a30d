//! Ukrainian phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input contains no digits.
    #[error("phone number cannot be empty")]
    Empty,
    /// The digits do not form a Ukrainian mobile number.
    #[error("invalid phone number: {0}")]
    InvalidFormat(String),
}

/// A phone number normalized to `+380XXXXXXXXX`.
///
/// ## Accepted inputs
///
/// Non-digit characters are ignored, then the remaining digits must be one of:
/// - `0XXXXXXXXX` (10 digits, national format)
/// - `380XXXXXXXXX` (12 digits, international format)
/// - `XXXXXXXXX` (9 digits, without the leading zero)
///
/// ## Examples
///
/// ```
/// use ferrik_core::Phone;
///
/// assert_eq!(Phone::parse("050 123 45 67").unwrap().as_str(), "+380501234567");
/// assert_eq!(Phone::parse("+38 (050) 123-45-67").unwrap().as_str(), "+380501234567");
/// assert!(Phone::parse("12345").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Parse and normalize a phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input has no digits or the digits do not match
    /// one of the accepted layouts.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();

        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }

        let normalized = match digits.len() {
            10 if digits.starts_with('0') => format!("+38{digits}"),
            12 if digits.starts_with("380") => format!("+{digits}"),
            9 => format!("+380{digits}"),
            _ => return Err(PhoneError::InvalidFormat(s.to_owned())),
        };

        Ok(Self(normalized))
    }

    /// Returns the normalized number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
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

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
