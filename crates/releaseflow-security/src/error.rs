//! Errors surfaced by the security orchestrator.

use releaseflow_auth::AuthError;
use releaseflow_core::CoreError;
use releaseflow_integrity::IntegrityError;
use releaseflow_validation::ValidationError;
use releaseflow_vault::VaultError;
use thiserror::Error;

/// Any failure of a [`SecurityManager`](crate::SecurityManager) operation.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// Encryption, key store or secure storage failure
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// Session or authorization failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Input rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Environment probing failed
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// Invalid configuration value
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SecurityError {
    /// Stable code for presentation layers (e.g. `"DECRYPTION_FAILED"`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Vault(VaultError::KeyNotFound(_)) => "KEY_NOT_FOUND",
            Self::Vault(VaultError::Encryption(_)) => "ENCRYPTION_FAILED",
            Self::Vault(VaultError::Decryption(_)) => "DECRYPTION_FAILED",
            Self::Vault(VaultError::InvalidData(_)) => "INVALID_DATA",
            Self::Vault(_) => "STORAGE_ERROR",
            Self::Auth(AuthError::SessionExpired) => "SESSION_EXPIRED",
            Self::Auth(AuthError::NotAuthenticated) => "NOT_AUTHENTICATED",
            Self::Auth(AuthError::MalformedToken(_)) => "MALFORMED_TOKEN",
            Self::Auth(AuthError::StateMismatch) => "STATE_MISMATCH",
            Self::Auth(_) => "AUTH_ERROR",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Integrity(_) => "INTEGRITY_CHECK_FAILED",
            Self::Core(_) => "CONFIG_ERROR",
        }
    }
}

/// Result type for orchestrator operations
pub type Result<T> = std::result::Result<T, SecurityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err: SecurityError = VaultError::Decryption("tag".to_string()).into();
        assert_eq!(err.code(), "DECRYPTION_FAILED");
        assert_eq!(err.to_string(), "decryption failed: tag");

        let err: SecurityError = AuthError::SessionExpired.into();
        assert_eq!(err.code(), "SESSION_EXPIRED");

        let err: SecurityError = VaultError::Storage("disk full".to_string()).into();
        assert_eq!(err.code(), "STORAGE_ERROR");
    }
}
