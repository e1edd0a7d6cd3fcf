//! Error type for command handlers.

use releaseflow_security::SecurityError;
use releaseflow_vault::VaultError;
use serde::Serialize;

/// Serializable error returned to the presentation layer.
#[derive(Debug, Serialize)]
pub struct CommandError {
    /// Error code for frontend handling (e.g., "SESSION_EXPIRED")
    pub code: String,
    /// User-facing message
    pub message: String,
    /// Optional debugging context (never contains sensitive data)
    pub details: Option<serde_json::Value>,
}

impl CommandError {
    /// Create a new command error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Create a command error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

impl From<SecurityError> for CommandError {
    fn from(err: SecurityError) -> Self {
        let code = err.code();
        match err {
            // The alias is safe to show; the blob contents are not.
            SecurityError::Vault(VaultError::KeyNotFound(alias)) => Self::with_details(
                code,
                "Encryption key not found",
                serde_json::json!({ "alias": alias }),
            ),
            SecurityError::Vault(VaultError::Decryption(_)) => {
                Self::new(code, "Data could not be decrypted")
            }
            other => Self::new(code, other.to_string()),
        }
    }
}

impl From<VaultError> for CommandError {
    fn from(err: VaultError) -> Self {
        SecurityError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use releaseflow_auth::AuthError;

    #[test]
    fn test_from_security_error() {
        let err: CommandError = SecurityError::from(AuthError::SessionExpired).into();
        assert_eq!(err.code, "SESSION_EXPIRED");
        assert_eq!(err.message, "session expired");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_key_not_found_details() {
        let err: CommandError = VaultError::KeyNotFound("backup_key".to_string()).into();
        assert_eq!(err.code, "KEY_NOT_FOUND");
        assert_eq!(err.details, Some(serde_json::json!({ "alias": "backup_key" })));
    }

    #[test]
    fn test_decryption_message_is_generic() {
        let err: CommandError =
            VaultError::Decryption("authentication tag mismatch".to_string()).into();
        assert_eq!(err.code, "DECRYPTION_FAILED");
        assert!(!err.message.contains("tag"));
    }
}
