//! Homefix prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    addresses::{Address, AddressId, AddressType, NewAddress, Pincode, PincodeError, ValidAddress},
    bookings::{
        Booking, BookingDraft, BookingId, BookingStatus, InvalidTransition, NewBooking,
        StoredBookings, parse_stored_bookings, provider_earnings, sort_by_date_desc,
    },
    cart::{Cart, CartLine, Removal},
    catalog::{
        Catalog, ProviderId, ServiceCategory, ServiceId, ServiceOverride, ServiceSnapshot,
    },
    ids::TypedId,
    pricing::{PriceBreakdown, rupees},
    profiles::{Role, Session, UserId, UserProfile},
    provenance::{Provenance, ResolvedAddresses, resolve_addresses},
    schedule::{TIME_SLOTS, available_dates},
    validation::FieldErrors,
};
