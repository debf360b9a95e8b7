//! Cart store.

use std::sync::Arc;

use homefix::{
    cart::{Cart, CartLine, Removal},
    catalog::{ServiceId, ServiceSnapshot},
};
use parking_lot::Mutex;
use tracing::debug;

use crate::storage::{LocalStorage, keys};

/// The cart, persisted durably after every change.
#[derive(Debug)]
pub struct CartStore {
    storage: Arc<LocalStorage>,
    cart: Mutex<Cart>,
}

impl CartStore {
    /// Load the persisted cart. A missing or undecodable value yields an
    /// empty cart.
    #[must_use]
    pub fn load(storage: Arc<LocalStorage>) -> Self {
        let lines: Vec<CartLine> = storage.read_durable(keys::CART).unwrap_or_default();
        let cart = Cart::from_lines(lines);

        debug!(lines = cart.lines().len(), "loaded cart");

        Self {
            storage,
            cart: Mutex::new(cart),
        }
    }

    /// Add one of `service`, returning the new quantity for it.
    pub fn add(&self, service: ServiceSnapshot) -> u32 {
        let id = service.id.clone();

        self.mutate(|cart| {
            cart.add(service);
            cart.quantity(&id)
        })
    }

    /// Take one of `service` out of the cart.
    pub fn remove(&self, service: &ServiceId) -> Removal {
        let mut cart = self.cart.lock();
        let removal = cart.remove(service);

        if removal != Removal::Missing {
            self.persist(&cart);
        }

        removal
    }

    /// Drop the whole line for `service`.
    pub fn remove_line(&self, service: &ServiceId) -> Option<CartLine> {
        let mut cart = self.cart.lock();
        let line = cart.remove_line(service)?;

        self.persist(&cart);

        Some(line)
    }

    /// Empty the cart.
    pub fn clear(&self) {
        self.mutate(Cart::clear);
    }

    /// Current lines, in insertion order.
    pub fn items(&self) -> Vec<CartLine> {
        self.cart.lock().lines().to_vec()
    }

    /// A copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.cart.lock().clone()
    }

    /// Sum of price × quantity.
    pub fn total_price(&self) -> u64 {
        self.cart.lock().total_price()
    }

    /// Sum of quantities.
    pub fn total_items(&self) -> u64 {
        self.cart.lock().total_items()
    }

    /// Quantity of `service`, zero when absent.
    pub fn quantity(&self, service: &ServiceId) -> u32 {
        self.cart.lock().quantity(service)
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.cart.lock().is_empty()
    }

    fn mutate<R>(&self, change: impl FnOnce(&mut Cart) -> R) -> R {
        let mut cart = self.cart.lock();
        let result = change(&mut cart);

        self.persist(&cart);

        result
    }

    fn persist(&self, cart: &Cart) -> bool {
        self.storage.write_durable(keys::CART, cart.lines())
    }
}

#[cfg(test)]
mod tests {
    use crate::test::{TestContext, service};

    use super::*;

    #[test]
    fn totals_follow_adds_and_removes() {
        let ctx = TestContext::new();
        let cart = CartStore::load(ctx.storage.clone());

        cart.add(service("101"));
        cart.add(service("101"));
        cart.add(service("102"));

        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), 499 * 2 + 599);

        let id = ServiceId::new("101");

        assert_eq!(cart.remove(&id), Removal::Decremented);
        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.total_price(), 499 + 599);

        assert_eq!(cart.remove(&id), Removal::Removed);
        assert_eq!(cart.quantity(&id), 0);
    }

    #[test]
    fn cart_survives_a_restart() {
        let ctx = TestContext::new();
        let cart = CartStore::load(ctx.storage.clone());

        assert_eq!(cart.add(service("201")), 1);
        assert_eq!(cart.add(service("201")), 2);
        cart.add(service("301"));

        let reloaded = CartStore::load(ctx.restarted());

        assert_eq!(reloaded.items(), cart.items());
        assert_eq!(reloaded.total_price(), 799 * 2 + 999);
    }

    #[test]
    fn undecodable_cart_loads_empty() {
        let ctx = TestContext::new();
        assert!(ctx.storage.write_durable(keys::CART, "not a cart"), "seeded");

        let cart = CartStore::load(ctx.storage.clone());

        assert!(cart.is_empty(), "expected an empty cart");
        assert_eq!(ctx.storage.read_durable::<Vec<CartLine>>(keys::CART), None);
    }

    #[test]
    fn removing_a_missing_service_changes_nothing() {
        let ctx = TestContext::new();
        let cart = CartStore::load(ctx.storage.clone());
        cart.add(service("101"));

        assert_eq!(cart.remove(&ServiceId::new("999")), Removal::Missing);
        assert_eq!(cart.remove_line(&ServiceId::new("999")), None);
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn clear_empties_the_persisted_cart() {
        let ctx = TestContext::new();
        let cart = CartStore::load(ctx.storage.clone());
        cart.add(service("101"));

        cart.clear();

        assert!(CartStore::load(ctx.restarted()).is_empty(), "cart cleared");
    }

    #[test]
    fn failed_persistence_keeps_the_in_memory_cart() {
        let ctx = TestContext::full();
        let cart = CartStore::load(ctx.storage.clone());

        cart.add(service("101"));

        assert_eq!(cart.total_items(), 1);
        assert!(CartStore::load(ctx.restarted()).is_empty(), "nothing persisted");
    }
}
