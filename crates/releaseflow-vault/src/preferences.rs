//! Encrypted key/value preferences.

use crate::cipher::EncryptedBlob;
use crate::encryption::EncryptionManager;
use crate::error::{Result, VaultError};
use crate::store::PreferenceStore;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use releaseflow_core::KeyAlias;
use std::sync::Arc;

/// Well-known preference keys.
pub mod keys {
    /// Access token of the current session
    pub const AUTH_TOKEN: &str = "auth_token";
    /// Refresh token of the current session
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// Access token expiry, Unix milliseconds
    pub const TOKEN_EXPIRES_AT: &str = "token_expires_at";
    /// Last user activity, Unix milliseconds
    pub const LAST_AUTH_TIME: &str = "last_auth_time";
    /// PKCE verifier of an in-flight authorization
    pub const OAUTH2_CODE_VERIFIER: &str = "oauth2_code_verifier";
    /// Anti-CSRF state of an in-flight authorization
    pub const OAUTH2_STATE: &str = "oauth2_state";
}

/// Key/value store whose values are encrypted under one master alias.
///
/// Values are sealed with [`EncryptionManager`], then written to the
/// [`PreferenceStore`] as base64 of the blob's byte form. Reads fail closed:
/// a value that no longer decrypts is an error, not an absent key.
#[derive(Debug, Clone)]
pub struct SecurePreferences {
    encryption: EncryptionManager,
    store: Arc<dyn PreferenceStore>,
    alias: KeyAlias,
}

impl SecurePreferences {
    /// Create preferences sealed under `alias`.
    #[must_use]
    pub fn new(
        encryption: EncryptionManager,
        store: Arc<dyn PreferenceStore>,
        alias: KeyAlias,
    ) -> Self {
        Self {
            encryption,
            store,
            alias,
        }
    }

    /// Alias of the master key.
    #[must_use]
    pub fn alias(&self) -> &KeyAlias {
        &self.alias
    }

    /// Encrypt and store `value` under `key`, replacing any previous value.
    pub fn put_string(&self, key: &str, value: &str) -> Result<()> {
        let blob = self.encryption.encrypt(value, &self.alias)?;
        self.store.put(key, &STANDARD.encode(blob.to_bytes()))
    }

    /// Read and decrypt the value under `key`.
    pub fn get_string(&self, key: &str) -> Result<Option<String>> {
        let Some(encoded) = self.store.get(key)? else {
            return Ok(None);
        };

        let bytes = STANDARD.decode(encoded.as_bytes()).map_err(|e| {
            VaultError::InvalidData(format!("stored value for {key} is not base64: {e}"))
        })?;
        let blob = EncryptedBlob::from_bytes(self.alias.clone(), &bytes)?;

        self.encryption.decrypt(&blob, &self.alias).map(Some)
    }

    /// Store an integer.
    pub fn put_i64(&self, key: &str, value: i64) -> Result<()> {
        self.put_string(key, &value.to_string())
    }

    /// Read an integer stored with [`SecurePreferences::put_i64`].
    pub fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        self.get_string(key)?
            .map(|raw| {
                raw.parse().map_err(|_| {
                    VaultError::InvalidData(format!("value for {key} is not an integer"))
                })
            })
            .transpose()
    }

    /// Remove `key`.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.store.remove(key)
    }

    /// Whether `key` has a stored value. Does not decrypt.
    pub fn contains(&self, key: &str) -> Result<bool> {
        self.store.contains(key)
    }

    /// Remove every stored value.
    pub fn clear(&self) -> Result<()> {
        tracing::info!("Clearing secure preferences");
        self.store.clear()
    }
}
