//! String key/value persistence backends for [`SecurePreferences`](crate::SecurePreferences).
//!
//! Stores see only already-encrypted values.

use crate::error::{Result, VaultError};
use crate::keystore::write_private;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Durable string key/value store.
///
/// Each `put` fully replaces the previous value under its key.
pub trait PreferenceStore: Send + Sync + fmt::Debug {
    /// Read the value under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Whether `key` has a value.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Remove every key.
    fn clear(&self) -> Result<()>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .values
            .read()
            .expect("preference store lock poisoned")
            .get(key)
            .cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .expect("preference store lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values
            .write()
            .expect("preference store lock poisoned")
            .remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.values
            .write()
            .expect("preference store lock poisoned")
            .clear();
        Ok(())
    }
}

/// JSON-file store. The whole map is rewritten through a temp file and
/// renamed into place on every change.
pub struct FilePreferenceStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FilePreferenceStore {
    /// Open the store at `path`, loading existing values if the file exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents)
                .map_err(|e| VaultError::Serialization(format!("invalid preferences file: {e}")))?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), entries = values.len(), "Opened preference store");
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut values = self.values.write().expect("preference store lock poisoned");
        let mut next = values.clone();
        mutate(&mut next);

        let contents = serde_json::to_string_pretty(&next)
            .map_err(|e| VaultError::Serialization(e.to_string()))?;
        write_private(&self.path, contents.as_bytes())
            .map_err(|e| VaultError::Storage(format!("failed to write preferences: {e}")))?;

        *values = next;
        Ok(())
    }
}

impl fmt::Debug for FilePreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePreferenceStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .values
            .read()
            .expect("preference store lock poisoned")
            .get(key)
            .cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.contains(key)? {
            return Ok(());
        }
        self.update(|values| {
            values.remove(key);
        })
    }

    fn clear(&self) -> Result<()> {
        self.update(BTreeMap::clear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.get("k").expect("get"), None);

        store.put("k", "v1").expect("put");
        store.put("k", "v2").expect("overwrite");
        assert_eq!(store.get("k").expect("get").as_deref(), Some("v2"));
        assert!(store.contains("k").expect("contains"));

        store.remove("k").expect("remove");
        store.remove("k").expect("remove absent");
        assert!(!store.contains("k").expect("contains"));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("secure_prefs.json");

        {
            let store = FilePreferenceStore::open(&path).expect("open");
            store.put("auth_token", "c2VhbGVk").expect("put");
            store.put("refresh_token", "cmVmcmVzaA").expect("put");
            store.remove("refresh_token").expect("remove");
        }

        let reopened = FilePreferenceStore::open(&path).expect("reopen");
        assert_eq!(
            reopened.get("auth_token").expect("get").as_deref(),
            Some("c2VhbGVk")
        );
        assert!(!reopened.contains("refresh_token").expect("contains"));
    }

    #[test]
    fn test_file_store_clear() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("prefs.json");

        let store = FilePreferenceStore::open(&path).expect("open");
        store.put("a", "1").expect("put");
        store.put("b", "2").expect("put");
        store.clear().expect("clear");

        let reopened = FilePreferenceStore::open(&path).expect("reopen");
        assert!(reopened.get("a").expect("get").is_none());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("prefs.json");
        fs::write(&path, "not json").expect("write");

        assert!(matches!(
            FilePreferenceStore::open(&path),
            Err(VaultError::Serialization(_))
        ));
    }
}
