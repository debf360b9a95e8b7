//! Profiles

pub mod errors;
pub mod service;

pub use errors::ProfileError;
pub use service::*;
