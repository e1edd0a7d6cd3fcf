//! Error types for input validation.

use thiserror::Error;

/// Reasons an input is rejected.
///
/// Validation failures are always recoverable: the input is refused and no
/// state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Input exceeds the maximum length for its kind.
    #[error("input too long: {actual} characters exceeds maximum of {max}")]
    TooLong {
        /// Maximum allowed characters
        max: usize,
        /// Actual characters
        actual: usize,
    },

    /// Input matched an injection signature.
    #[error("input rejected: {0} signature detected")]
    InjectionDetected(&'static str),

    /// Input does not match the expected format.
    #[error("invalid format for {0}")]
    InvalidFormat(String),
}

/// Result type for validation operations.
pub type Result<T> = std::result::Result<T, ValidationError>;
