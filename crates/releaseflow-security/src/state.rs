//! Security state and initialization outcomes.

use releaseflow_integrity::SecurityThreat;
use serde::{Deserialize, Serialize};

/// Current security posture of the application.
///
/// Exactly one value is active at a time. Only
/// [`SecurityManager`](crate::SecurityManager) changes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SecurityState {
    /// Checks are running
    Initializing,
    /// Ready; `threats` holds non-critical warnings
    Secure {
        /// Whether biometric authentication can be offered
        biometric_available: bool,
        /// Non-critical threats seen at startup
        threats: Vec<SecurityThreat>,
    },
    /// A critical threat was found; the caller decides whether to block use
    SecurityThreatDetected {
        /// Every threat seen, critical or not
        threats: Vec<SecurityThreat>,
    },
    /// Initialization failed for a reason other than a threat
    Error {
        /// What went wrong
        message: String,
    },
}

impl SecurityState {
    /// Whether the application may proceed.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        matches!(self, Self::Secure { .. })
    }
}

/// Result of [`SecurityManager::initialize`](crate::SecurityManager::initialize).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InitOutcome {
    /// Startup may continue
    Success {
        /// Whether biometric authentication can be offered
        biometric_available: bool,
        /// Non-critical threats to surface to the user
        warnings: Vec<SecurityThreat>,
    },
    /// Startup should not continue
    Failed {
        /// Human-readable reason
        reason: String,
        /// Threats that caused the failure; empty for internal errors
        threats: Vec<SecurityThreat>,
    },
}

impl InitOutcome {
    /// Whether initialization succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serializes_with_tag() {
        let state = SecurityState::SecurityThreatDetected {
            threats: vec![SecurityThreat::AppTampered],
        };
        let json = serde_json::to_value(&state).expect("serialize");
        assert_eq!(json["state"], "security_threat_detected");
        assert_eq!(json["threats"][0], "app_tampered");
        assert!(!state.is_secure());
    }

    #[test]
    fn test_outcome() {
        let outcome = InitOutcome::Success {
            biometric_available: false,
            warnings: Vec::new(),
        };
        assert!(outcome.is_success());
        let failed = InitOutcome::Failed {
            reason: "x".to_string(),
            threats: Vec::new(),
        };
        assert!(!failed.is_success());
    }
}
