//! Storage errors.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage key {0:?} is not a plain identifier")]
    InvalidKey(String),

    #[error("writing {key} needs {needed} bytes but the quota is {quota}")]
    QuotaExceeded { key: String, needed: u64, quota: u64 },

    #[error("storage I/O failed")]
    Io(#[from] io::Error),
}
