//! Local persistence
//!
//! Two key-value scopes back the stores: a durable one that survives restarts
//! (a directory of JSON files) and a session one that lives as long as the
//! process. [`LocalStorage`] layers JSON encoding on top and never lets a
//! storage failure escape to callers.

pub mod errors;
mod file;
pub mod keys;
mod local;
mod memory;

use std::fmt::Debug;

pub use errors::StorageError;
pub use file::FileStore;
pub use local::LocalStorage;
pub use memory::MemoryStore;

/// Raw string storage keyed by name.
pub trait KeyValueStore: Debug + Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error when the write is rejected, e.g. over quota.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
