//! Checkout errors.

use homefix::validation::FieldErrors;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("an order is already being placed")]
    AlreadyInProgress,

    #[error("order is incomplete: {0}")]
    Invalid(#[from] FieldErrors),
}
