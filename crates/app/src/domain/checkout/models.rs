//! Checkout models.

use homefix::{
    addresses::Address,
    bookings::Booking,
    catalog::ServiceId,
    pricing::PriceBreakdown,
};
use jiff::civil::Date;

use crate::{domain::bookings::BookingsError, gateway::GatewayError};

/// What the customer picked on the checkout form.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    /// Service date.
    pub date: Option<Date>,

    /// Time slot label.
    pub time: Option<String>,

    /// Service address; copied into every booking.
    pub address: Option<Address>,

    /// Tip in rupees, attached to the first booking only.
    pub tip: u64,

    /// e.g. "cash" or "online".
    pub payment_method: String,
}

/// How one cart line fared.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    /// Accepted by the backend.
    Remote(Booking),

    /// Saved on this device after the backend could not take it.
    Local {
        booking: Booking,
        reason: GatewayError,
    },

    /// Neither the backend nor this device could take it. The line stays in
    /// the cart.
    Failed {
        reason: GatewayError,
        error: BookingsError,
    },
}

impl BookingOutcome {
    /// Whether a booking exists for the line, remotely or locally.
    #[must_use]
    pub fn is_booked(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    #[must_use]
    pub fn booking(&self) -> Option<&Booking> {
        match self {
            Self::Remote(booking) | Self::Local { booking, .. } => Some(booking),
            Self::Failed { .. } => None,
        }
    }
}

/// Outcome for one cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineOutcome {
    pub service_id: ServiceId,
    pub quantity: u32,
    pub result: BookingOutcome,
}

/// Everything that happened during one checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReport {
    /// One entry per cart line, in cart order.
    pub outcomes: Vec<LineOutcome>,

    /// Prices as quoted when the order was placed.
    pub breakdown: PriceBreakdown,
}

impl CheckoutReport {
    /// Bookings that were created, remotely or locally.
    pub fn bookings(&self) -> impl Iterator<Item = &Booking> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.booking())
    }

    /// Lines that could not be booked anywhere.
    pub fn failed(&self) -> impl Iterator<Item = &LineOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.result.is_booked())
    }

    /// Every line was booked.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_booked())
    }

    /// Some lines were booked and some were not.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        let booked = self.bookings().count();

        booked > 0 && booked < self.outcomes.len()
    }
}
