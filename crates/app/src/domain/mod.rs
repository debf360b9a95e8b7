//! Homefix Domain Concerns

pub mod addresses;
pub mod bookings;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod profiles;
