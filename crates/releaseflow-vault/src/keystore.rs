//! Key-store backends.
//!
//! A key store holds 256-bit symmetric keys under named aliases. Keys never
//! leave a store as raw bytes: callers receive an initialised
//! [`ChaCha20Poly1305`] instance instead.

use crate::error::{Result, VaultError};
use chacha20poly1305::{ChaCha20Poly1305, KeyInit};
use rand::{rngs::OsRng, RngCore};
use releaseflow_core::KeyAlias;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use zeroize::{Zeroize, Zeroizing};

/// Length of a generated key in bytes (256 bits).
pub const KEY_LENGTH: usize = 32;

type KeyBytes = Zeroizing<[u8; KEY_LENGTH]>;

/// Storage for named, non-exportable symmetric keys.
pub trait KeyStore: Send + Sync + fmt::Debug {
    /// Whether a key exists under `alias`.
    fn contains(&self, alias: &KeyAlias) -> Result<bool>;

    /// Fetch the key under `alias`, generating it first if absent.
    ///
    /// The existence check and the insert happen under one lock so
    /// concurrent callers agree on a single key. The flag is `true` when
    /// this call created the key.
    fn get_or_create(&self, alias: &KeyAlias) -> Result<(ChaCha20Poly1305, bool)>;

    /// Fetch the key under `alias` without creating it.
    fn cipher(&self, alias: &KeyAlias) -> Result<Option<ChaCha20Poly1305>>;

    /// Delete the key under `alias`. Returns whether a key was removed.
    fn delete(&self, alias: &KeyAlias) -> Result<bool>;
}

fn generate_key() -> KeyBytes {
    let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
    OsRng.fill_bytes(key.as_mut());
    key
}

fn cipher_for(key: &KeyBytes) -> ChaCha20Poly1305 {
    let bytes: &[u8; KEY_LENGTH] = key;
    ChaCha20Poly1305::new(bytes.into())
}

/// In-memory key store. Keys are lost when the store is dropped.
#[derive(Default)]
pub struct MemoryKeyStore {
    keys: RwLock<HashMap<KeyAlias, KeyBytes>>,
}

impl MemoryKeyStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for MemoryKeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.keys.read().map(|keys| keys.len()).unwrap_or_default();
        f.debug_struct("MemoryKeyStore")
            .field("keys", &count)
            .finish()
    }
}

impl KeyStore for MemoryKeyStore {
    fn contains(&self, alias: &KeyAlias) -> Result<bool> {
        Ok(self
            .keys
            .read()
            .expect("key store lock poisoned")
            .contains_key(alias))
    }

    fn get_or_create(&self, alias: &KeyAlias) -> Result<(ChaCha20Poly1305, bool)> {
        let mut keys = self.keys.write().expect("key store lock poisoned");
        if let Some(key) = keys.get(alias) {
            return Ok((cipher_for(key), false));
        }

        let key = generate_key();
        let cipher = cipher_for(&key);
        keys.insert(alias.clone(), key);
        tracing::debug!(alias = %alias, "Generated key in memory store");
        Ok((cipher, true))
    }

    fn cipher(&self, alias: &KeyAlias) -> Result<Option<ChaCha20Poly1305>> {
        Ok(self
            .keys
            .read()
            .expect("key store lock poisoned")
            .get(alias)
            .map(cipher_for))
    }

    fn delete(&self, alias: &KeyAlias) -> Result<bool> {
        Ok(self
            .keys
            .write()
            .expect("key store lock poisoned")
            .remove(alias)
            .is_some())
    }
}

/// On-disk format of [`FileKeyStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct KeyFile {
    version: u8,
    keys: BTreeMap<String, String>,
}

impl Drop for KeyFile {
    fn drop(&mut self) {
        for value in self.keys.values_mut() {
            value.zeroize();
        }
    }
}

const KEY_FILE_VERSION: u8 = 1;

/// Software key store persisting keys as hex in a JSON file.
///
/// Used on hosts without a hardware-backed key store. The file is written
/// with owner-only permissions on Unix and replaced atomically on each change.
pub struct FileKeyStore {
    path: PathBuf,
    keys: RwLock<HashMap<KeyAlias, KeyBytes>>,
}

impl FileKeyStore {
    /// Open the store at `path`, loading existing keys if the file exists.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut keys = HashMap::new();

        if path.exists() {
            let contents = Zeroizing::new(fs::read_to_string(&path)?);
            let file: KeyFile = serde_json::from_str(&contents)
                .map_err(|e| VaultError::Serialization(format!("invalid key file: {e}")))?;
            if file.version != KEY_FILE_VERSION {
                return Err(VaultError::KeyStore(format!(
                    "unsupported key file version {}",
                    file.version
                )));
            }

            for (alias, encoded) in &file.keys {
                let alias = KeyAlias::new(alias.as_str())
                    .map_err(|e| VaultError::KeyStore(e.to_string()))?;
                let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
                hex::decode_to_slice(encoded, key.as_mut()).map_err(|e| {
                    VaultError::KeyStore(format!("corrupt key for alias {alias}: {e}"))
                })?;
                keys.insert(alias, key);
            }
            tracing::debug!(path = %path.display(), keys = keys.len(), "Loaded key file");
        }

        Ok(Self {
            path,
            keys: RwLock::new(keys),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, keys: &HashMap<KeyAlias, KeyBytes>) -> Result<()> {
        let file = KeyFile {
            version: KEY_FILE_VERSION,
            keys: keys
                .iter()
                .map(|(alias, key)| (alias.to_string(), hex::encode(key.as_slice())))
                .collect(),
        };
        let contents = Zeroizing::new(
            serde_json::to_string_pretty(&file)
                .map_err(|e| VaultError::Serialization(e.to_string()))?,
        );

        write_private(&self.path, contents.as_bytes())
    }
}

impl fmt::Debug for FileKeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileKeyStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl KeyStore for FileKeyStore {
    fn contains(&self, alias: &KeyAlias) -> Result<bool> {
        Ok(self
            .keys
            .read()
            .expect("key store lock poisoned")
            .contains_key(alias))
    }

    fn get_or_create(&self, alias: &KeyAlias) -> Result<(ChaCha20Poly1305, bool)> {
        let mut keys = self.keys.write().expect("key store lock poisoned");
        if let Some(key) = keys.get(alias) {
            return Ok((cipher_for(key), false));
        }

        let key = generate_key();
        let cipher = cipher_for(&key);
        keys.insert(alias.clone(), key);

        if let Err(e) = self.persist(&keys) {
            keys.remove(alias);
            return Err(e);
        }

        tracing::info!(alias = %alias, "Generated key in file store");
        Ok((cipher, true))
    }

    fn cipher(&self, alias: &KeyAlias) -> Result<Option<ChaCha20Poly1305>> {
        Ok(self
            .keys
            .read()
            .expect("key store lock poisoned")
            .get(alias)
            .map(cipher_for))
    }

    fn delete(&self, alias: &KeyAlias) -> Result<bool> {
        let mut keys = self.keys.write().expect("key store lock poisoned");
        let Some(removed) = keys.remove(alias) else {
            return Ok(false);
        };

        if let Err(e) = self.persist(&keys) {
            keys.insert(alias.clone(), removed);
            return Err(e);
        }

        tracing::info!(alias = %alias, "Deleted key from file store");
        Ok(true)
    }
}

/// Write `contents` to a sibling temp file, then rename it over `path`.
pub(crate) fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp, path)?;
    Ok(())
}
