//! JSON adapter over the durable and session scopes.

use std::{fmt, path::PathBuf, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

#[derive(Debug, Clone, Copy)]
enum Scope {
    Durable,
    Session,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Durable => "durable",
            Self::Session => "session",
        })
    }
}

/// Typed reads and writes against both storage scopes.
///
/// Reads of missing or undecodable values return `None`; an undecodable
/// value is removed so the next read starts clean. Writes report success as
/// a `bool` and log the reason for a failure.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl LocalStorage {
    /// Wrap a durable and a session store.
    #[must_use]
    pub fn new(durable: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, session }
    }

    /// Durable files under `dir` plus an in-memory session scope.
    ///
    /// # Errors
    ///
    /// Returns an error when the data directory cannot be created.
    pub fn on_disk(dir: impl Into<PathBuf>, quota: Option<u64>) -> Result<Self, StorageError> {
        let mut files = FileStore::open(dir)?;

        if let Some(quota) = quota {
            files = files.with_quota(quota);
        }

        Ok(Self::new(Arc::new(files), Arc::new(MemoryStore::new())))
    }

    /// Both scopes in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    /// Read a durable value.
    pub fn read_durable<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        read(self.durable.as_ref(), key, Scope::Durable)
    }

    /// Write a durable value, returning whether it was stored.
    pub fn write_durable<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        write(self.durable.as_ref(), key, value, Scope::Durable)
    }

    /// Remove a durable value, returning whether the removal went through.
    pub fn remove_durable(&self, key: &str) -> bool {
        remove(self.durable.as_ref(), key, Scope::Durable)
    }

    /// Read a session value.
    pub fn read_session<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        read(self.session.as_ref(), key, Scope::Session)
    }

    /// Write a session value, returning whether it was stored.
    pub fn write_session<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        write(self.session.as_ref(), key, value, Scope::Session)
    }

    /// Remove a session value, returning whether the removal went through.
    pub fn remove_session(&self, key: &str) -> bool {
        remove(self.session.as_ref(), key, Scope::Session)
    }
}

fn read<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, scope: Scope) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(error) => {
            warn!(%key, %scope, %error, "failed to read stored value");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(%key, %scope, %error, "discarding undecodable stored value");

            if let Err(error) = store.remove(key) {
                warn!(%key, %scope, %error, "failed to discard undecodable value");
            }

            None
        }
    }
}

fn write<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
    scope: Scope,
) -> bool {
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(error) => {
            warn!(%key, %scope, %error, "failed to encode value");
            return false;
        }
    };

    match store.set(key, &encoded) {
        Ok(()) => {
            debug!(%key, %scope, bytes = encoded.len(), "stored value");
            true
        }
        Err(error) => {
            warn!(%key, %scope, %error, "failed to store value");
            false
        }
    }
}

fn remove(store: &dyn KeyValueStore, key: &str, scope: Scope) -> bool {
    match store.remove(key) {
        Ok(()) => true,
        Err(error) => {
            warn!(%key, %scope, %error, "failed to remove value");
            false
        }
    }
}
