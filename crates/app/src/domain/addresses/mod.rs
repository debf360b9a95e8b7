//! Addresses

pub mod errors;
pub mod models;
pub mod service;

pub use errors::AddressError;
pub use service::*;
