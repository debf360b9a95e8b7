//! Addresses

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::{ids::TypedId, validation::FieldErrors};

/// Address identifier: server-assigned or `local-<millis>`.
pub type AddressId = TypedId<Address>;

/// Kind of address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    /// Home address.
    #[default]
    Home,

    /// Work address.
    Work,

    /// Anything else.
    Other,
}

impl Display for AddressType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Home => "Home",
            Self::Work => "Work",
            Self::Other => "Other",
        })
    }
}

/// Unknown address type string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown address type: {0}")]
pub struct UnknownAddressType(String);

impl FromStr for AddressType {
    type Err = UnknownAddressType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "work" => Ok(Self::Work),
            "other" => Ok(Self::Other),
            _ => Err(UnknownAddressType(s.to_string())),
        }
    }
}

/// A pincode that is exactly six ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pincode(String);

/// Rejected pincode input.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PincodeError {
    /// Nothing was entered.
    #[error("Pincode is required")]
    Missing,

    /// Not six ASCII digits.
    #[error("Pincode must be 6 digits")]
    Malformed,
}

impl Pincode {
    /// Validate and wrap a pincode.
    ///
    /// # Errors
    ///
    /// [`PincodeError::Missing`] for blank input, [`PincodeError::Malformed`]
    /// for anything other than six ASCII digits.
    pub fn parse(input: &str) -> Result<Self, PincodeError> {
        let input = input.trim();

        if input.is_empty() {
            return Err(PincodeError::Missing);
        }

        if input.len() != 6 || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PincodeError::Malformed);
        }

        Ok(Self(input.to_string()))
    }

    /// The digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Pincode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl Serialize for Pincode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Pincode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A saved service address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Identifier.
    pub id: AddressId,

    /// Home, Work or Other.
    #[serde(rename = "type", default)]
    pub kind: AddressType,

    /// Street address line.
    pub address: String,

    /// City.
    pub city: String,

    /// Six-digit pincode.
    pub pincode: Pincode,

    /// Optional latitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// Optional longitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Unvalidated address form input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAddress {
    /// Home, Work or Other.
    pub kind: AddressType,

    /// Street address line.
    pub address: String,

    /// City.
    pub city: String,

    /// Pincode as typed.
    pub pincode: String,

    /// Optional latitude.
    pub latitude: Option<f64>,

    /// Optional longitude.
    pub longitude: Option<f64>,
}

/// Address form input that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidAddress {
    /// Home, Work or Other.
    pub kind: AddressType,

    /// Trimmed street address line.
    pub address: String,

    /// Trimmed city.
    pub city: String,

    /// Validated pincode.
    pub pincode: Pincode,

    /// Optional latitude.
    pub latitude: Option<f64>,

    /// Optional longitude.
    pub longitude: Option<f64>,
}

impl NewAddress {
    /// Check every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors when any field is invalid.
    pub fn validate(&self) -> Result<ValidAddress, FieldErrors> {
        let mut errors = FieldErrors::new();

        let address = self.address.trim();
        if address.is_empty() {
            errors.insert("address", "Address is required");
        }

        let city = self.city.trim();
        if city.is_empty() {
            errors.insert("city", "City is required");
        }

        let pincode = match Pincode::parse(&self.pincode) {
            Ok(pincode) => Some(pincode),
            Err(error) => {
                errors.insert("pincode", error.to_string());
                None
            }
        };

        match pincode {
            Some(pincode) if errors.is_empty() => Ok(ValidAddress {
                kind: self.kind,
                address: address.to_string(),
                city: city.to_string(),
                pincode,
                latitude: self.latitude,
                longitude: self.longitude,
            }),
            _ => Err(errors),
        }
    }
}

impl ValidAddress {
    /// Attach an identifier.
    #[must_use]
    pub fn with_id(self, id: AddressId) -> Address {
        Address {
            id,
            kind: self.kind,
            address: self.address,
            city: self.city,
            pincode: self.pincode,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}
