//! Process-lifetime session store.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::storage::{KeyValueStore, StorageError, validate_key};

/// In-memory key-value store, cleared when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<FxHashMap<String, String>>,
    quota: Option<u64>,
}

impl MemoryStore {
    /// An empty, unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store capped at `quota` bytes across all values.
    #[must_use]
    pub fn with_quota(quota: u64) -> Self {
        Self {
            values: Mutex::default(),
            quota: Some(quota),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;

        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        let mut values = self.values.lock();

        if let Some(quota) = self.quota {
            let others: usize = values
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(_, value)| value.len())
                .sum();

            let needed = (others + value.len()) as u64;

            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }

        values.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        self.values.lock().remove(key);

        Ok(())
    }
}
