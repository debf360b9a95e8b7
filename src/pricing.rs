//! Checkout pricing

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};

/// Flat fee added to every order, in rupees.
pub const SERVICE_FEE: u64 = 49;

/// Tax rate applied to the subtotal (9%).
pub const TAX_RATE: Decimal = Decimal::from_parts(9, 0, 0, false, 2);

/// What the customer pays at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreakdown {
    /// Sum of cart lines.
    pub subtotal: u64,

    /// Flat service fee.
    pub service_fee: u64,

    /// Tax on the subtotal, rounded to whole rupees.
    pub taxes: u64,

    /// Optional tip.
    pub tip: u64,
}

impl PriceBreakdown {
    /// Price an order.
    #[must_use]
    pub fn new(subtotal: u64, tip: u64) -> Self {
        Self {
            subtotal,
            service_fee: SERVICE_FEE,
            taxes: taxes_on(subtotal),
            tip,
        }
    }

    /// Everything added up.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.subtotal
            .saturating_add(self.service_fee)
            .saturating_add(self.taxes)
            .saturating_add(self.tip)
    }

    /// The total as rupees.
    #[must_use]
    pub fn total_money(&self) -> Money<'static, Currency> {
        rupees(self.total())
    }
}

/// Tax on `subtotal`, rounding half away from zero.
#[must_use]
pub fn taxes_on(subtotal: u64) -> u64 {
    (Decimal::from(subtotal) * TAX_RATE)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .unwrap_or(0)
}

/// A whole-rupee amount as money.
#[must_use]
pub fn rupees(amount: u64) -> Money<'static, Currency> {
    Money::from_decimal(Decimal::from(amount), iso::INR)
}
