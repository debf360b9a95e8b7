//! Bookings

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    addresses::{Address, AddressId},
    cart::CartLine,
    catalog::{ProviderId, ServiceId},
    ids::TypedId,
    profiles::UserId,
};

/// Booking identifier.
pub type BookingId = TypedId<Booking>;

/// Provider assigned when the service does not name one.
pub const DEFAULT_PROVIDER_ID: &str = "1";

/// Fields a stored booking must carry to be loaded.
pub const REQUIRED_FIELDS: [&str; 6] = ["id", "userId", "serviceId", "date", "time", "status"];

/// Lifecycle of a booking.
///
/// `pending -> confirmed -> completed`, with `cancelled` reachable from
/// `pending` or `confirmed`. `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting provider confirmation.
    Pending,

    /// Accepted by the provider.
    Confirmed,

    /// Work done.
    Completed,

    /// Called off.
    Cancelled,
}

/// A status change the lifecycle does not allow.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot move a {from} booking to {to}")]
pub struct InvalidTransition {
    /// Current status.
    pub from: BookingStatus,

    /// Requested status.
    pub to: BookingStatus,
}

impl BookingStatus {
    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the booking may still be cancelled.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Validate a move to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] for any move outside the lifecycle.
    pub fn transition(self, to: Self) -> Result<Self, InvalidTransition> {
        match (self, to) {
            (Self::Pending, Self::Confirmed)
            | (Self::Confirmed, Self::Completed)
            | (Self::Pending | Self::Confirmed, Self::Cancelled) => Ok(to),
            (from, to) => Err(InvalidTransition { from, to }),
        }
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        })
    }
}

/// A booking as stored on this device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Identifier, server-assigned or `local-<millis>-<token>`.
    pub id: BookingId,

    /// Customer.
    pub user_id: UserId,

    /// Booked service.
    pub service_id: ServiceId,

    /// Assigned provider.
    pub provider_id: ProviderId,

    /// Service address.
    pub address_id: AddressId,

    /// Service date.
    pub date: Date,

    /// Time slot label, e.g. "09:00 AM - 11:00 AM".
    pub time: String,

    /// Lifecycle status.
    pub status: BookingStatus,

    /// Service price × quantity, fixed at creation.
    pub price: u64,

    /// Optional tip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip_amount: Option<u64>,

    /// e.g. "online" or "cash".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,

    /// e.g. "paid".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,

    /// Payment gateway payment id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,

    /// Payment gateway order id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_order_id: Option<String>,

    /// Display name of the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,

    /// Display name of the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,

    /// Service image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_image: Option<String>,

    /// Copy of the address taken at booking time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// A booking that has not been given an identifier yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    /// Customer.
    pub user_id: UserId,

    /// Booked service.
    pub service_id: ServiceId,

    /// Assigned provider.
    pub provider_id: ProviderId,

    /// Service address.
    pub address_id: AddressId,

    /// Service date.
    pub date: Date,

    /// Time slot label.
    pub time: String,

    /// Initial status.
    pub status: BookingStatus,

    /// Fixed price.
    pub price: u64,

    /// Optional tip.
    pub tip_amount: Option<u64>,

    /// Payment method.
    pub payment_method: Option<String>,

    /// Payment status.
    pub payment_status: Option<String>,

    /// Display name of the service.
    pub service_name: Option<String>,

    /// Display name of the provider.
    pub provider_name: Option<String>,

    /// Service image.
    pub service_image: Option<String>,

    /// Copy of the address.
    pub address: Option<Address>,
}

impl NewBooking {
    /// Build the booking for one cart line.
    ///
    /// The price is fixed here as service price × quantity and the address is
    /// copied in so the booking stays readable if the address is deleted.
    #[must_use]
    pub fn for_line(
        line: &CartLine,
        user_id: UserId,
        address: &Address,
        date: Date,
        time: impl Into<String>,
    ) -> Self {
        let service = &line.service;

        Self {
            user_id,
            service_id: service.id.clone(),
            provider_id: service
                .provider_id
                .clone()
                .unwrap_or_else(|| ProviderId::new(DEFAULT_PROVIDER_ID)),
            address_id: address.id.clone(),
            date,
            time: time.into(),
            status: BookingStatus::Confirmed,
            price: line.line_total(),
            tip_amount: None,
            payment_method: None,
            payment_status: None,
            service_name: Some(service.name.clone()),
            provider_name: None,
            service_image: Some(service.image.clone()),
            address: Some(address.clone()),
        }
    }

    /// Attach an identifier.
    #[must_use]
    pub fn with_id(self, id: BookingId) -> Booking {
        Booking {
            id,
            user_id: self.user_id,
            service_id: self.service_id,
            provider_id: self.provider_id,
            address_id: self.address_id,
            date: self.date,
            time: self.time,
            status: self.status,
            price: self.price,
            tip_amount: self.tip_amount,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            payment_id: None,
            payment_order_id: None,
            service_name: self.service_name,
            provider_name: self.provider_name,
            service_image: self.service_image,
            address: self.address,
        }
    }
}

/// Input to a booking store `add`: with or without an identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingDraft {
    /// Needs a local identifier.
    New(NewBooking),

    /// Already identified, e.g. by the backend; upserted by id.
    Identified(Booking),
}

impl From<NewBooking> for BookingDraft {
    fn from(value: NewBooking) -> Self {
        Self::New(value)
    }
}

impl From<Booking> for BookingDraft {
    fn from(value: Booking) -> Self {
        Self::Identified(value)
    }
}

/// Result of parsing a persisted booking list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredBookings {
    /// Records that were well-formed, sorted by date descending.
    pub bookings: Vec<Booking>,

    /// Number of records dropped as corrupt.
    pub dropped: usize,
}

/// Parse persisted booking records one by one.
///
/// A record missing any of [`REQUIRED_FIELDS`], or that fails to parse, is
/// dropped on its own; the rest of the list survives.
#[must_use]
pub fn parse_stored_bookings(records: Vec<Value>) -> StoredBookings {
    let total = records.len();

    let mut bookings: Vec<Booking> = records
        .into_iter()
        .filter(has_required_fields)
        .filter_map(|record| serde_json::from_value(record).ok())
        .collect();

    sort_by_date_desc(&mut bookings);

    StoredBookings {
        dropped: total - bookings.len(),
        bookings,
    }
}

fn has_required_fields(record: &Value) -> bool {
    REQUIRED_FIELDS.iter().all(|field| {
        record
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|value| !value.trim().is_empty())
    })
}

/// Most recent date first; bookings on the same date keep their order.
pub fn sort_by_date_desc(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Total a provider has earned: price plus tip over completed bookings.
#[must_use]
pub fn provider_earnings<'a>(
    bookings: impl IntoIterator<Item = &'a Booking>,
    provider: &ProviderId,
) -> u64 {
    bookings
        .into_iter()
        .filter(|booking| {
            &booking.provider_id == provider && booking.status == BookingStatus::Completed
        })
        .map(|booking| booking.price.saturating_add(booking.tip_amount.unwrap_or(0)))
        .fold(0, u64::saturating_add)
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        addresses::{AddressType, Pincode},
        catalog::{Catalog, ServiceId},
    };

    use super::*;

    fn record(id: &str, day: &str) -> Value {
        json!({
            "id": id,
            "userId": "user-1",
            "serviceId": "101",
            "providerId": "1",
            "addressId": "addr-1",
            "date": day,
            "time": "09:00 AM - 11:00 AM",
            "status": "confirmed",
            "price": 499
        })
    }

    #[test]
    fn lifecycle_allows_forward_moves_and_cancellation() {
        use BookingStatus::{Cancelled, Completed, Confirmed, Pending};

        assert_eq!(Pending.transition(Confirmed), Ok(Confirmed));
        assert_eq!(Confirmed.transition(Completed), Ok(Completed));
        assert_eq!(Pending.transition(Cancelled), Ok(Cancelled));
        assert_eq!(Confirmed.transition(Cancelled), Ok(Cancelled));
    }

    #[test]
    fn lifecycle_rejects_leaving_terminal_states() {
        use BookingStatus::{Cancelled, Completed, Confirmed, Pending};

        assert!(Completed.transition(Cancelled).is_err());
        assert!(Cancelled.transition(Confirmed).is_err());
        assert!(Confirmed.transition(Pending).is_err());
        assert!(Pending.transition(Completed).is_err());
    }

    #[test]
    fn record_missing_status_is_dropped_alone() {
        let mut broken = record("b-2", "2025-04-20");

        if let Some(object) = broken.as_object_mut() {
            object.remove("status");
        }

        let stored = parse_stored_bookings(vec![record("b-1", "2025-04-22"), broken]);

        assert_eq!(stored.bookings.len(), 1);
        assert_eq!(stored.dropped, 1);
        assert_eq!(stored.bookings.first().map(|b| b.id.as_str()), Some("b-1"));
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let mut broken = record("b-1", "2025-04-22");

        if let Some(object) = broken.as_object_mut() {
            object.insert("userId".to_string(), json!(""));
        }

        assert!(parse_stored_bookings(vec![broken]).bookings.is_empty());
    }

    #[test]
    fn unparsable_record_is_dropped() {
        let mut broken = record("b-1", "2025-04-22");

        if let Some(object) = broken.as_object_mut() {
            object.insert("status".to_string(), json!("teleported"));
        }

        let stored = parse_stored_bookings(vec![broken, record("b-2", "2025-04-21")]);

        assert_eq!(stored.bookings.len(), 1);
        assert_eq!(stored.dropped, 1);
    }

    #[test]
    fn loaded_bookings_are_newest_first() {
        let stored = parse_stored_bookings(vec![
            record("old", "2025-04-15"),
            record("new", "2025-04-25"),
            record("mid", "2025-04-22"),
        ]);

        let ids: Vec<&str> = stored.bookings.iter().map(|b| b.id.as_str()).collect();

        assert_eq!(ids, ["new", "mid", "old"]);
    }

    #[test]
    fn for_line_fixes_price_and_snapshots_address() -> TestResult {
        let service = Catalog::builtin()
            .service(&ServiceId::new("101"))
            .cloned()
            .ok_or("missing service")?;

        let line = CartLine {
            service,
            quantity: 3,
        };

        let address = Address {
            id: AddressId::new("addr-1"),
            kind: AddressType::Work,
            address: "456 Office Park".to_string(),
            city: "Delhi".to_string(),
            pincode: Pincode::parse("110001")?,
            latitude: None,
            longitude: None,
        };

        let booking = NewBooking::for_line(
            &line,
            UserId::new("user-1"),
            &address,
            date(2025, 4, 25),
            "09:00 AM - 11:00 AM",
        );

        assert_eq!(booking.price, 1497);
        assert_eq!(booking.provider_id.as_str(), DEFAULT_PROVIDER_ID);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.address.as_ref().map(|a| a.city.as_str()), Some("Delhi"));

        Ok(())
    }

    #[test]
    fn earnings_count_completed_bookings_with_tips() -> TestResult {
        let mut done: Booking = serde_json::from_value(record("a", "2025-04-20"))?;
        done.status = BookingStatus::Completed;
        done.tip_amount = Some(50);

        let pending: Booking = serde_json::from_value(record("b", "2025-04-21"))?;

        let mut other: Booking = serde_json::from_value(record("c", "2025-04-21"))?;
        other.status = BookingStatus::Completed;
        other.provider_id = ProviderId::new("2");

        let total = provider_earnings([&done, &pending, &other], &ProviderId::new("1"));

        assert_eq!(total, 549);

        Ok(())
    }

    #[test]
    fn earnings_saturate_on_huge_tips() -> TestResult {
        let mut first: Booking = serde_json::from_value(record("a", "2025-04-20"))?;
        first.status = BookingStatus::Completed;
        first.tip_amount = Some(u64::MAX);

        let mut second = first.clone();
        second.id = BookingId::new("b");

        let total = provider_earnings([&first, &second], &ProviderId::new("1"));

        assert_eq!(total, u64::MAX, "expected saturated earnings, got {total}");

        Ok(())
    }

    #[test]
    fn stored_json_uses_camel_case() -> TestResult {
        let booking: Booking = serde_json::from_value(record("a", "2025-04-20"))?;
        let value = serde_json::to_value(&booking)?;

        assert_eq!(value.get("userId"), Some(&json!("user-1")));
        assert_eq!(value.get("date"), Some(&json!("2025-04-20")));
        assert!(value.get("tipAmount").is_none());

        Ok(())
    }
}
