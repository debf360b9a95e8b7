//! Bookings

pub mod errors;
mod store;

pub use errors::BookingsError;
pub use store::BookingStore;
