//! Cart

use serde::{Deserialize, Serialize};

use crate::catalog::{ServiceId, ServiceSnapshot};

/// A service in the cart and how many of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// The service snapshot taken when it was first added.
    pub service: ServiceSnapshot,

    /// Always at least one.
    pub quantity: u32,
}

impl CartLine {
    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.service.price.saturating_mul(u64::from(self.quantity))
    }
}

/// What a call to [`Cart::remove`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Quantity went down by one.
    Decremented,

    /// The line was at quantity one and is gone.
    Removed,

    /// No line for that service.
    Missing,
}

/// Insertion-ordered cart lines, unique by service id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from persisted lines.
    ///
    /// Zero-quantity lines are dropped and repeated services are folded into
    /// the first line for that service.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();

        for line in lines.into_iter().filter(|line| line.quantity > 0) {
            match cart.line_mut(&line.service.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => cart.lines.push(line),
            }
        }

        cart
    }

    /// Add one of `service`.
    pub fn add(&mut self, service: ServiceSnapshot) {
        match self.line_mut(&service.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine {
                service,
                quantity: 1,
            }),
        }
    }

    /// Remove one of the service.
    pub fn remove(&mut self, service: &ServiceId) -> Removal {
        let Some(line) = self.line_mut(service) else {
            return Removal::Missing;
        };

        if line.quantity > 1 {
            line.quantity -= 1;

            return Removal::Decremented;
        }

        self.lines.retain(|line| &line.service.id != service);

        Removal::Removed
    }

    /// Drop the whole line for a service, returning it when present.
    pub fn remove_line(&mut self, service: &ServiceId) -> Option<CartLine> {
        let index = self
            .lines
            .iter()
            .position(|line| &line.service.id == service)?;

        Some(self.lines.remove(index))
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of price × quantity over all lines.
    #[must_use]
    pub fn total_price(&self) -> u64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// The quantity held for a service, zero when absent.
    #[must_use]
    pub fn quantity(&self, service: &ServiceId) -> u32 {
        self.lines
            .iter()
            .find(|line| &line.service.id == service)
            .map_or(0, |line| line.quantity)
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, service: &ServiceId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| &line.service.id == service)
    }
}
