//! Homefix
//!
//! Data model and pure state logic for the Homefix home-services marketplace
//! client: the service catalog, cart arithmetic, addresses and their source
//! resolution, the booking lifecycle, and checkout pricing.
//!
//! Nothing in this crate performs I/O. Persistence, the remote backend and the
//! stores that reconcile them live in `homefix-app`.

pub mod addresses;
pub mod bookings;
pub mod cart;
pub mod catalog;
pub mod ids;
pub mod prelude;
pub mod pricing;
pub mod profiles;
pub mod provenance;
pub mod schedule;
pub mod validation;
