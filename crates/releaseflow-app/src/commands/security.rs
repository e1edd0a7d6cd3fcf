//! Status, input validation and secret encryption commands.

use crate::error::CommandError;
use crate::state::AppState;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use releaseflow_audit::SecurityEvent;
use releaseflow_core::KeyAlias;
use releaseflow_security::SecurityState;
use releaseflow_validation::InputType;
use releaseflow_vault::EncryptedBlob;
use serde::Serialize;

/// Events included in a status report.
const STATUS_EVENT_LIMIT: usize = 20;

/// Snapshot of the security layer.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// Crate version
    pub version: &'static str,
    /// Current security state
    pub state: SecurityState,
    /// Whether the environment passed a fresh runtime check
    pub environment_secure: bool,
    /// Whether a live session exists
    pub authenticated: bool,
    /// Most recent security events, oldest first
    pub recent_events: Vec<SecurityEvent>,
}

/// Current state, a fresh runtime check and the latest security events.
pub async fn security_status(state: &AppState) -> StatusReport {
    let security = &state.security;
    StatusReport {
        version: env!("CARGO_PKG_VERSION"),
        state: security.state(),
        environment_secure: security.perform_periodic_check().await,
        authenticated: security.is_authenticated(),
        recent_events: security.logger().recent_entries(STATUS_EVENT_LIMIT),
    }
}

/// Validate and sanitize user input. Returns the sanitized form.
pub fn validate_input(
    state: &AppState,
    input: &str,
    input_type: InputType,
) -> Result<String, CommandError> {
    state
        .security
        .validate_input(input, input_type)
        .sanitized_input
        .ok_or_else(|| {
            CommandError::with_details(
                "VALIDATION_FAILED",
                format!("Invalid {input_type}"),
                serde_json::json!({ "input_type": input_type }),
            )
        })
}

/// Encrypt a secret under the default key. Returns base64 of the blob bytes.
pub fn encrypt_secret(state: &AppState, plaintext: &str) -> Result<String, CommandError> {
    let blob = state.security.encrypt_data(plaintext, None)?;
    Ok(STANDARD.encode(blob.to_bytes()))
}

/// Decrypt a value produced by [`encrypt_secret`].
pub fn decrypt_secret(
    state: &AppState,
    encoded: &str,
    alias: Option<&str>,
) -> Result<String, CommandError> {
    let alias = match alias {
        Some(alias) => KeyAlias::new(alias)
            .map_err(|e| CommandError::new("INVALID_ALIAS", e.to_string()))?,
        None => state.security.default_alias().clone(),
    };
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| CommandError::new("INVALID_DATA", format!("Invalid base64: {e}")))?;
    let blob = EncryptedBlob::from_bytes(alias.clone(), &bytes)?;

    Ok(state.security.decrypt_data(&blob, Some(&alias))?)
}
