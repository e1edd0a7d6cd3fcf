//! Error types for the vault module.

use thiserror::Error;

/// Errors that can occur during key-store, encryption or preference operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// No key exists under the requested alias.
    #[error("no key under alias {0}")]
    KeyNotFound(String),

    /// Key store backend failed.
    #[error("key store error: {0}")]
    KeyStore(String),

    /// Encryption operation failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption operation failed (wrong key, wrong alias or tampered data).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Invalid blob format or corrupted data.
    #[error("invalid encrypted data: {0}")]
    InvalidData(String),

    /// Preference persistence failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
