//! Profile service errors.

use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("sign in to continue")]
    NotSignedIn,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
