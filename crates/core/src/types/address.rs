//! Delivery address types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::AddressId;
use super::mobile::{MobileError, MobileNumber};
use super::pincode::{Pincode, PincodeError};
use super::status::AddressType;

/// Default country for new addresses.
pub const DEFAULT_COUNTRY: &str = "India";

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub name: String,
    pub mobile: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub address_type: AddressType,
    #[serde(default)]
    pub landmark: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, with = "super::timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

impl Address {
    /// One-line summary for lists.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.line1.as_str()];
        if let Some(line2) = self.line2.as_deref().filter(|l| !l.is_empty()) {
            parts.push(line2);
        }
        parts.push(&self.city);
        parts.push(&self.state);
        format!("{} - {}", parts.join(", "), self.pincode)
    }
}

/// Field-level validation failures for address input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} cannot exceed {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error(transparent)]
    Mobile(#[from] MobileError),
    #[error(transparent)]
    Pincode(#[from] PincodeError),
}

const MAX_NAME: usize = 100;
const MAX_LINE: usize = 255;
const MAX_PLACE: usize = 100;

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), AddressError> {
    if value.chars().count() > max {
        return Err(AddressError::TooLong { field, max });
    }
    Ok(())
}

fn check_required(field: &'static str, value: &str, max: usize) -> Result<(), AddressError> {
    if value.trim().is_empty() {
        return Err(AddressError::Required { field });
    }
    check_len(field, value, max)
}

/// Body of `POST /users/me/addresses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    pub name: String,
    pub mobile: MobileNumber,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: Pincode,
    pub country: String,
    pub address_type: AddressType,
    pub landmark: Option<String>,
    pub is_default: bool,
}

impl AddressInput {
    /// Check lengths and required fields before sending.
    ///
    /// Mobile number and pincode are already validated by their types.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> Result<(), AddressError> {
        check_required("name", &self.name, MAX_NAME)?;
        check_required("line1", &self.line1, MAX_LINE)?;
        check_required("city", &self.city, MAX_PLACE)?;
        check_required("state", &self.state, MAX_PLACE)?;
        check_required("country", &self.country, MAX_PLACE)?;
        if let Some(line2) = &self.line2 {
            check_len("line2", line2, MAX_LINE)?;
        }
        if let Some(landmark) = &self.landmark {
            check_len("landmark", landmark, MAX_LINE)?;
        }
        Ok(())
    }
}

/// Body of `PUT /users/me/addresses/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<MobileNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<Pincode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_type: Option<AddressType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl AddressUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check lengths of the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> Result<(), AddressError> {
        let checks: [(&'static str, Option<&String>, usize); 7] = [
            ("name", self.name.as_ref(), MAX_NAME),
            ("line1", self.line1.as_ref(), MAX_LINE),
            ("line2", self.line2.as_ref(), MAX_LINE),
            ("city", self.city.as_ref(), MAX_PLACE),
            ("state", self.state.as_ref(), MAX_PLACE),
            ("country", self.country.as_ref(), MAX_PLACE),
            ("landmark", self.landmark.as_ref(), MAX_LINE),
        ];
        for (field, value, max) in checks {
            if let Some(value) = value {
                check_len(field, value, max)?;
            }
        }
        Ok(())
    }
}
