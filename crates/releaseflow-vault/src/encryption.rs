//! Alias-keyed authenticated encryption.

use crate::cipher::EncryptedBlob;
use crate::error::{Result, VaultError};
use crate::keystore::KeyStore;
use releaseflow_core::KeyAlias;
use std::sync::Arc;

/// Encrypts and decrypts strings under keys named by alias.
///
/// Keys are created on first use and live in the injected [`KeyStore`].
/// Every call draws a fresh nonce.
#[derive(Debug, Clone)]
pub struct EncryptionManager {
    key_store: Arc<dyn KeyStore>,
}

impl EncryptionManager {
    /// Create a manager over a key store.
    #[must_use]
    pub fn new(key_store: Arc<dyn KeyStore>) -> Self {
        Self { key_store }
    }

    /// Encrypt `plaintext` under `alias`, generating the key if needed.
    pub fn encrypt(&self, plaintext: &str, alias: &KeyAlias) -> Result<EncryptedBlob> {
        let (cipher, created) = self.key_store.get_or_create(alias)?;
        if created {
            tracing::info!(alias = %alias, "Created encryption key on first use");
        }
        EncryptedBlob::seal(&cipher, alias, plaintext.as_bytes())
    }

    /// Decrypt `blob` under `alias`.
    ///
    /// Fails without returning any data if the key is missing, the tag does
    /// not verify, or the plaintext is not UTF-8. No other key is tried.
    pub fn decrypt(&self, blob: &EncryptedBlob, alias: &KeyAlias) -> Result<String> {
        let cipher = self
            .key_store
            .cipher(alias)?
            .ok_or_else(|| VaultError::KeyNotFound(alias.to_string()))?;

        let plaintext = blob.open(&cipher, alias)?;
        String::from_utf8(plaintext.to_vec())
            .map_err(|_| VaultError::Decryption("plaintext is not valid UTF-8".to_string()))
    }

    /// Whether a key exists under `alias`.
    pub fn key_exists(&self, alias: &KeyAlias) -> Result<bool> {
        self.key_store.contains(alias)
    }

    /// Create the key under `alias` if absent. Returns `true` if it was created.
    pub fn ensure_key(&self, alias: &KeyAlias) -> Result<bool> {
        let (_, created) = self.key_store.get_or_create(alias)?;
        if created {
            tracing::info!(alias = %alias, "Created encryption key");
        }
        Ok(created)
    }

    /// Create a key under `new_alias`, then delete the key under `old_alias`.
    ///
    /// Blobs sealed under the old key become undecryptable; re-encrypting
    /// them is the caller's job. Rotating an alias onto itself replaces its
    /// key with a fresh one.
    pub fn rotate_key(&self, old_alias: &KeyAlias, new_alias: &KeyAlias) -> Result<()> {
        if old_alias == new_alias {
            self.key_store.delete(old_alias)?;
            self.key_store.get_or_create(new_alias)?;
            tracing::info!(alias = %new_alias, "Regenerated encryption key");
            return Ok(());
        }

        self.key_store.get_or_create(new_alias)?;
        self.key_store.delete(old_alias)?;
        tracing::info!(old = %old_alias, new = %new_alias, "Rotated encryption key");
        Ok(())
    }

    /// Delete the key under `alias`. Deleting an absent key is not an error.
    pub fn delete_key(&self, alias: &KeyAlias) -> Result<()> {
        if self.key_store.delete(alias)? {
            tracing::info!(alias = %alias, "Deleted encryption key");
        }
        Ok(())
    }
}
