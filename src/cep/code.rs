//! Postal code validation.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Number of digits in a Brazilian postal code.
pub const CEP_LENGTH: usize = 8;

/// Returned when raw input is not an 8-digit postal code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid zipcode")]
pub struct InvalidPostalCode;

/// Check whether `input` is exactly eight ASCII digits.
///
/// No trimming is performed: surrounding whitespace makes the input invalid.
pub fn validate(input: &str) -> bool {
    input.len() == CEP_LENGTH && input.bytes().all(|b| b.is_ascii_digit())
}

/// A validated 8-digit postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    /// Build a postal code from raw request input.
    pub fn parse(input: &str) -> Result<Self, InvalidPostalCode> {
        if validate(input) {
            Ok(Self(input.to_string()))
        } else {
            Err(InvalidPostalCode)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
