//! Mobile number and one-time password types used for OTP login.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`MobileNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MobileError {
    /// The input string is empty.
    #[error("mobile number cannot be empty")]
    Empty,
    /// The input contains something other than digits and a leading `+`.
    #[error("mobile number may only contain digits and a leading +")]
    InvalidCharacter,
    /// The number starts with zero.
    #[error("mobile number must not start with 0")]
    LeadingZero,
    /// Wrong number of digits.
    #[error("mobile number must have {min}-{max} digits including country code")]
    InvalidLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
}

/// A mobile number with country code (e.g. `+919876543210`).
///
/// ## Constraints
///
/// - Optional leading `+`
/// - First digit 1-9
/// - 10-15 digits in total
///
/// ## Examples
///
/// ```
/// use shopfront_core::MobileNumber;
///
/// assert!(MobileNumber::parse("+919876543210").is_ok());
/// assert!(MobileNumber::parse("9876543210").is_ok());
///
/// assert!(MobileNumber::parse("").is_err());
/// assert!(MobileNumber::parse("0987654321").is_err());
/// assert!(MobileNumber::parse("98765").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 10;
    /// Maximum number of digits.
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `MobileNumber` from a string, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains non-digits, starts
    /// with zero, or has the wrong number of digits.
    pub fn parse(s: &str) -> Result<Self, MobileError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MobileError::Empty);
        }

        let digits = s.strip_prefix('+').unwrap_or(s);
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(MobileError::InvalidCharacter);
        }
        if digits.starts_with('0') {
            return Err(MobileError::LeadingZero);
        }
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len()) {
            return Err(MobileError::InvalidLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Masked form safe for logs (first four characters, then `****`).
    #[must_use]
    pub fn masked(&self) -> String {
        let prefix: String = self.0.chars().take(4).collect();
        format!("{prefix}****")
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for MobileNumber {
    type Err = MobileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Errors that can occur when parsing an [`Otp`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    /// Not exactly six ASCII digits.
    #[error("OTP must be exactly {len} digits")]
    Malformed {
        /// Expected length.
        len: usize,
    },
}

/// A six-digit one-time password.
///
/// `Debug` is redacted so codes never end up in logs.
#[derive(Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Otp(String);

impl Otp {
    /// Required number of digits.
    pub const LEN: usize = 6;

    /// Parse an OTP, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`OtpError::Malformed`] unless the input is six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, OtpError> {
        let s = s.trim();
        if s.len() != Self::LEN || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(OtpError::Malformed { len: Self::LEN });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Otp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Otp([REDACTED])")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_numbers() {
        assert!(MobileNumber::parse("+919876543210").is_ok());
        assert!(MobileNumber::parse("9876543210").is_ok());
        assert!(MobileNumber::parse(" +14155550123 ").is_ok());
        assert!(MobileNumber::parse("123456789012345").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(MobileNumber::parse("  "), Err(MobileError::Empty));
    }

    #[test]
    fn test_parse_invalid_characters() {
        assert_eq!(
            MobileNumber::parse("98765-43210"),
            Err(MobileError::InvalidCharacter)
        );
        assert_eq!(
            MobileNumber::parse("++919876543210"),
            Err(MobileError::InvalidCharacter)
        );
    }

    #[test]
    fn test_parse_leading_zero() {
        assert_eq!(
            MobileNumber::parse("+0919876543"),
            Err(MobileError::LeadingZero)
        );
    }

    #[test]
    fn test_parse_length() {
        assert!(matches!(
            MobileNumber::parse("987654321"),
            Err(MobileError::InvalidLength { .. })
        ));
        assert!(matches!(
            MobileNumber::parse("1234567890123456"),
            Err(MobileError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_masked() {
        let mobile = MobileNumber::parse("+919876543210").unwrap();
        assert_eq!(mobile.masked(), "+919****");
    }

    #[test]
    fn test_otp_parse() {
        assert_eq!(Otp::parse(" 123456 ").unwrap().as_str(), "123456");
        assert!(Otp::parse("12345").is_err());
        assert!(Otp::parse("12a456").is_err());
    }

    #[test]
    fn test_otp_debug_redacted() {
        let otp = Otp::parse("654321").unwrap();
        assert!(!format!("{otp:?}").contains("654321"));
    }
}
