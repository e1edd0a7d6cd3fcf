//! Alias-bound encrypted blobs using ChaCha20-Poly1305 AEAD.
//!
//! # Security Properties
//!
//! - **Confidentiality**: `ChaCha20` stream cipher
//! - **Authenticity**: `Poly1305` MAC over ciphertext and key alias
//! - **Nonce**: 96-bit random nonce per encryption
//! - **Key**: 256-bit random key held by the key store
//!
//! The key alias is passed as associated data, so a blob only opens under
//! the alias that sealed it.

use crate::error::{Result, VaultError};
use chacha20poly1305::{
    aead::{Aead, AeadCore, OsRng, Payload},
    ChaCha20Poly1305, Nonce,
};
use releaseflow_core::KeyAlias;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Length of the nonce in bytes (96 bits for ChaCha20-Poly1305).
pub const NONCE_LENGTH: usize = 12;

/// Length of the Poly1305 authentication tag in bytes.
pub const TAG_LENGTH: usize = 16;

/// Current version byte of the serialized blob format.
pub const BLOB_VERSION: u8 = 1;

/// Ciphertext bound to its nonce and the alias of the key that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBlob {
    /// Alias of the sealing key
    key_alias: KeyAlias,
    /// Random nonce used for this encryption
    nonce: [u8; NONCE_LENGTH],
    /// Ciphertext + authentication tag (16 bytes)
    ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    /// Seal `plaintext` with `cipher`, binding `alias` as associated data.
    ///
    /// # Errors
    /// Returns `VaultError::Encryption` if the AEAD operation fails.
    pub fn seal(cipher: &ChaCha20Poly1305, alias: &KeyAlias, plaintext: &[u8]) -> Result<Self> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext,
                    aad: alias.as_bytes(),
                },
            )
            .map_err(|e| VaultError::Encryption(format!("encryption failed: {e}")))?;

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        nonce_bytes.copy_from_slice(nonce.as_slice());

        Ok(Self {
            key_alias: alias.clone(),
            nonce: nonce_bytes,
            ciphertext,
        })
    }

    /// Open the blob with `cipher`, authenticating against `alias`.
    ///
    /// The caller-supplied alias is used as associated data, not the one
    /// recorded in the blob.
    ///
    /// # Errors
    /// Returns `VaultError::Decryption` if:
    /// - The key is incorrect
    /// - The alias differs from the sealing alias
    /// - The nonce or ciphertext has been tampered with
    pub fn open(&self, cipher: &ChaCha20Poly1305, alias: &KeyAlias) -> Result<Zeroizing<Vec<u8>>> {
        let nonce = Nonce::from_slice(&self.nonce);
        cipher
            .decrypt(
                nonce,
                Payload {
                    msg: &self.ciphertext,
                    aad: alias.as_bytes(),
                },
            )
            .map(Zeroizing::new)
            .map_err(|_| VaultError::Decryption("authentication tag mismatch".to_string()))
    }

    /// Serialize to `[version][nonce][ciphertext+tag]`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + NONCE_LENGTH + self.ciphertext.len());
        bytes.push(BLOB_VERSION);
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Parse the byte form produced by [`EncryptedBlob::to_bytes`].
    ///
    /// The alias is not part of the byte form; callers supply the alias the
    /// blob was stored under.
    ///
    /// # Errors
    /// Returns `VaultError::InvalidData` on an unknown version or truncated input.
    pub fn from_bytes(key_alias: KeyAlias, bytes: &[u8]) -> Result<Self> {
        let Some((&version, rest)) = bytes.split_first() else {
            return Err(VaultError::InvalidData("empty blob".to_string()));
        };
        if version != BLOB_VERSION {
            return Err(VaultError::InvalidData(format!(
                "unsupported blob version {version}"
            )));
        }
        if rest.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(VaultError::InvalidData(format!(
                "blob too short: {} bytes",
                bytes.len()
            )));
        }

        let (nonce_slice, ciphertext) = rest.split_at(NONCE_LENGTH);
        let mut nonce = [0u8; NONCE_LENGTH];
        nonce.copy_from_slice(nonce_slice);

        Ok(Self {
            key_alias,
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Alias of the key that sealed this blob.
    #[must_use]
    pub fn key_alias(&self) -> &KeyAlias {
        &self.key_alias
    }

    /// Get the nonce.
    #[must_use]
    pub fn nonce(&self) -> &[u8; NONCE_LENGTH] {
        &self.nonce
    }

    /// Get the ciphertext, including the authentication tag.
    #[must_use]
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}
