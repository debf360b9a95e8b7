//! Booking store errors.

use homefix::bookings::{BookingId, InvalidTransition};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BookingsError {
    #[error("booking {0} not found")]
    NotFound(BookingId),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("booking {0} could not be saved on this device")]
    NotPersisted(BookingId),
}
