//! Postal index number (PIN code) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Pincode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PincodeError {
    /// Not exactly six ASCII digits.
    #[error("pincode must be exactly 6 digits")]
    Malformed,
}

/// A six-digit Indian postal code.
///
/// ```
/// use shopfront_core::Pincode;
///
/// assert!(Pincode::parse("560001").is_ok());
/// assert!(Pincode::parse("5600").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// Parse a pincode, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PincodeError::Malformed`] unless the input is six digits.
    pub fn parse(s: &str) -> Result<Self, PincodeError> {
        let s = s.trim();
        if s.len() == 6 && s.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(PincodeError::Malformed)
        }
    }

    /// Returns the pincode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert!(Pincode::parse("110001").is_ok());
        assert!(Pincode::parse(" 110001 ").is_ok());
        assert_eq!(Pincode::parse("11000"), Err(PincodeError::Malformed));
        assert_eq!(Pincode::parse("1100011"), Err(PincodeError::Malformed));
        assert_eq!(Pincode::parse("11O001"), Err(PincodeError::Malformed));
    }
}
