//! Error types for runtime integrity checks.

use thiserror::Error;

/// Errors raised while probing the execution environment.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// A probe could not produce an answer.
    #[error("introspection failed: {0}")]
    Introspection(String),

    /// Reading a system file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for integrity operations.
pub type Result<T> = std::result::Result<T, IntegrityError>;
