//! Directory-backed durable store.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::storage::{KeyValueStore, StorageError, validate_key};

/// One `<key>.json` file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota: Option<u64>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();

        fs::create_dir_all(&dir)?;

        Ok(Self { dir, quota: None })
    }

    /// Cap the total bytes held across all keys.
    #[must_use]
    pub fn with_quota(mut self, quota: u64) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Root directory of the store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn used_excluding(&self, key: &str) -> Result<u64, StorageError> {
        let skip = self.path(key);
        let mut used = 0;

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;

            if entry.path() == skip {
                continue;
            }

            let metadata = entry.metadata()?;

            if metadata.is_file() {
                used += metadata.len();
            }
        }

        Ok(used)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;

        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        if let Some(quota) = self.quota {
            let needed = self.used_excluding(key)? + value.len() as u64;

            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }

        fs::write(self.path(key), value)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn values_survive_reopening() -> TestResult {
        let dir = tempfile::tempdir()?;

        FileStore::open(dir.path())?.set("cart", "[]")?;

        let value = FileStore::open(dir.path())?.get("cart")?;

        assert_eq!(value.as_deref(), Some("[]"));

        Ok(())
    }

    #[test]
    fn missing_key_reads_as_none_and_removes_cleanly() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path())?;

        assert_eq!(store.get("bookings")?, None);
        store.remove("bookings")?;

        Ok(())
    }

    #[test]
    fn quota_counts_other_keys_but_not_the_replaced_value() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path())?.with_quota(10);

        store.set("a", "12345")?;
        store.set("a", "123456")?;
        store.set("b", "1234")?;

        let result = store.set("c", "1");

        assert!(
            matches!(result, Err(StorageError::QuotaExceeded { needed: 11, .. })),
            "expected QuotaExceeded, got {result:?}"
        );
        assert_eq!(store.get("c")?, None);

        Ok(())
    }
}
