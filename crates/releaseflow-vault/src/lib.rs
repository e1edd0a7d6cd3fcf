//! ReleaseFlow Vault - Encryption at rest for locally persisted secrets.
//!
//! Provides alias-keyed authenticated encryption and an encrypted
//! key/value preference store built on it.
//!
//! # Security Model
//!
//! - 256-bit random keys held in a [`KeyStore`], never exported as bytes
//! - ChaCha20-Poly1305 AEAD with a fresh 96-bit nonce per encryption
//! - The key alias is bound as associated data, so blobs only open under
//!   the alias that sealed them
//! - Decryption failures never return partial data
//!
//! # Example
//!
//! ```rust
//! use releaseflow_core::KeyAlias;
//! use releaseflow_vault::{EncryptionManager, MemoryKeyStore};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = EncryptionManager::new(Arc::new(MemoryKeyStore::new()));
//! let alias = KeyAlias::new("releaseflow_master_key")?;
//!
//! let blob = manager.encrypt("spotify-refresh-token", &alias)?;
//! assert_eq!(manager.decrypt(&blob, &alias)?, "spotify-refresh-token");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cipher;
pub mod encryption;
pub mod error;
pub mod keystore;
pub mod preferences;
pub mod store;

pub use cipher::EncryptedBlob;
pub use encryption::EncryptionManager;
pub use error::{Result, VaultError};
pub use keystore::{FileKeyStore, KeyStore, MemoryKeyStore};
pub use preferences::{keys, SecurePreferences};
pub use store::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
