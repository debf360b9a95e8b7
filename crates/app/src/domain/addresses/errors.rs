//! Address service errors.

use homefix::{addresses::AddressId, validation::FieldErrors};
use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Debug, Error, PartialEq)]
pub enum AddressError {
    #[error("invalid address: {0}")]
    Invalid(#[from] FieldErrors),

    #[error("address {0} not found")]
    NotFound(AddressId),

    #[error("address could not be saved remotely ({0}) or on this device")]
    NotSaved(GatewayError),

    #[error("remote address change failed: {0}")]
    Remote(GatewayError),
}
