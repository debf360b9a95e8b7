//! Row shapes of the remote collections.
//!
//! Remote rows use snake_case columns (`user_id`, `booking_date`) while the
//! local model is camelCase; these types are the only place the two meet.

use homefix::{
    addresses::{Address, AddressId, AddressType, Pincode, PincodeError, ValidAddress},
    bookings::{Booking, BookingId, BookingStatus, DEFAULT_PROVIDER_ID, NewBooking},
    catalog::{ProviderId, ServiceId, ServiceOverride},
    profiles::{Role, Session, UserId, UserProfile},
};
use jiff::civil::Date;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accept a string or a number where an identifier is expected.
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        Value::Number(value) => Ok(value.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(value) => Ok(Some(value)),
        Value::Number(value) => Ok(Some(value.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

/// Accept whole or fractional numbers, and numeric strings, as rupees.
fn rupees<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;

    let amount = match &value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().and_then(whole_rupees)),
        Value::String(raw) => raw.trim().parse::<f64>().ok().and_then(whole_rupees),
        _ => None,
    };

    amount.ok_or_else(|| serde::de::Error::custom(format!("invalid amount {value}")))
}

fn optional_rupees<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Value::deserialize(deserializer)?;

    if value.is_null() {
        return Ok(None);
    }

    rupees(value).map(Some).map_err(serde::de::Error::custom)
}

fn whole_rupees(amount: f64) -> Option<u64> {
    (amount.is_finite() && amount >= 0.0).then(|| amount.round() as u64)
}

/// A row of `addresses`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressRow {
    #[serde(deserialize_with = "text")]
    pub id: String,

    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    pub address: String,

    pub city: String,

    #[serde(deserialize_with = "text")]
    pub pincode: String,

    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,
}

impl AddressRow {
    /// Convert to the local model. A missing or unknown type reads as Home.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored pincode is not six digits.
    pub fn into_address(self) -> Result<Address, PincodeError> {
        Ok(Address {
            id: AddressId::new(self.id),
            kind: self
                .kind
                .as_deref()
                .and_then(|kind| kind.parse().ok())
                .unwrap_or_default(),
            address: self.address,
            city: self.city,
            pincode: Pincode::parse(&self.pincode)?,
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

/// Body of an `addresses` insert or update.
#[derive(Debug, Clone, Serialize)]
pub struct AddressWrite<'a> {
    pub user_id: &'a UserId,

    #[serde(rename = "type")]
    pub kind: AddressType,

    pub address: &'a str,

    pub city: &'a str,

    pub pincode: &'a Pincode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl<'a> AddressWrite<'a> {
    #[must_use]
    pub fn new(user_id: &'a UserId, address: &'a ValidAddress) -> Self {
        Self {
            user_id,
            kind: address.kind,
            address: &address.address,
            city: &address.city,
            pincode: &address.pincode,
            latitude: address.latitude,
            longitude: address.longitude,
        }
    }
}

/// A row of `bookings`.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRow {
    #[serde(deserialize_with = "text")]
    pub id: String,

    #[serde(deserialize_with = "text")]
    pub user_id: String,

    #[serde(deserialize_with = "text")]
    pub service_id: String,

    #[serde(default, deserialize_with = "optional_text")]
    pub provider_id: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub address_id: Option<String>,

    pub booking_date: Date,

    pub booking_time: String,

    pub status: BookingStatus,

    #[serde(deserialize_with = "rupees")]
    pub price: u64,

    #[serde(default, deserialize_with = "optional_rupees")]
    pub tip_amount: Option<u64>,

    #[serde(default)]
    pub payment_method: Option<String>,

    #[serde(default)]
    pub payment_status: Option<String>,

    #[serde(default)]
    pub payment_id: Option<String>,

    #[serde(default)]
    pub payment_order_id: Option<String>,
}

impl BookingRow {
    /// Convert to the local model.
    ///
    /// Display fields and the address snapshot are not stored remotely; they
    /// are taken from `draft` when the row was just created from one.
    #[must_use]
    pub fn into_booking(self, draft: Option<&NewBooking>) -> Booking {
        Booking {
            id: BookingId::new(self.id),
            user_id: UserId::new(self.user_id),
            service_id: ServiceId::new(self.service_id),
            provider_id: ProviderId::new(
                self.provider_id
                    .unwrap_or_else(|| DEFAULT_PROVIDER_ID.to_string()),
            ),
            address_id: AddressId::new(self.address_id.unwrap_or_default()),
            date: self.booking_date,
            time: self.booking_time,
            status: self.status,
            price: self.price,
            tip_amount: self.tip_amount,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            payment_id: self.payment_id,
            payment_order_id: self.payment_order_id,
            service_name: draft.and_then(|draft| draft.service_name.clone()),
            provider_name: draft.and_then(|draft| draft.provider_name.clone()),
            service_image: draft.and_then(|draft| draft.service_image.clone()),
            address: draft.and_then(|draft| draft.address.clone()),
        }
    }
}

/// Body of a `bookings` insert.
#[derive(Debug, Clone, Serialize)]
pub struct BookingInsert<'a> {
    pub user_id: &'a UserId,
    pub service_id: &'a ServiceId,
    pub provider_id: &'a ProviderId,
    pub booking_date: Date,
    pub booking_time: &'a str,
    pub status: BookingStatus,
    pub address_id: &'a AddressId,
    pub price: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip_amount: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<&'a str>,
}

impl<'a> From<&'a NewBooking> for BookingInsert<'a> {
    fn from(booking: &'a NewBooking) -> Self {
        Self {
            user_id: &booking.user_id,
            service_id: &booking.service_id,
            provider_id: &booking.provider_id,
            booking_date: booking.date,
            booking_time: &booking.time,
            status: booking.status,
            address_id: &booking.address_id,
            price: booking.price,
            tip_amount: booking.tip_amount,
            payment_method: booking.payment_method.as_deref(),
        }
    }
}

/// A row of `services`: an id plus whichever fields override the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceRow {
    #[serde(deserialize_with = "text")]
    pub id: String,

    #[serde(flatten)]
    pub overrides: ServiceOverride,
}

/// A row of `profiles`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    #[serde(deserialize_with = "text")]
    pub id: String,

    #[serde(default)]
    pub role: Option<Role>,

    #[serde(default)]
    pub full_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl ProfileRow {
    /// Convert to the local model, filling blanks from the session.
    #[must_use]
    pub fn into_profile(self, session: &Session) -> UserProfile {
        let fallback = UserProfile::from_session(session);
        let present = |value: Option<String>| value.filter(|value| !value.trim().is_empty());

        UserProfile {
            id: UserId::new(self.id),
            role: self.role.unwrap_or(fallback.role),
            full_name: present(self.full_name).unwrap_or(fallback.full_name),
            email: present(self.email).unwrap_or(fallback.email),
            phone: present(self.phone),
            avatar_url: present(self.avatar_url),
            addresses: Vec::new(),
        }
    }
}

/// Body of a `profiles` insert.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileInsert<'a> {
    pub id: &'a UserId,
    pub full_name: &'a str,
    pub email: &'a str,
    pub role: Role,
}

impl<'a> From<&'a UserProfile> for ProfileInsert<'a> {
    fn from(profile: &'a UserProfile) -> Self {
        Self {
            id: &profile.id,
            full_name: &profile.full_name,
            email: &profile.email,
            role: profile.role,
        }
    }
}

/// Body of a `provider_profiles` insert.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderProfileInsert<'a> {
    pub id: &'a UserId,
    pub business_name: &'a str,
    pub description: &'a str,
}
