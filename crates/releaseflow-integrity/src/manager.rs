//! Runtime self-protection checks.

use crate::introspect::DeviceIntrospector;
use crate::threat::{SecurityCheckResult, SecurityThreat};
use releaseflow_core::SecurityConfig;
use std::sync::Arc;

/// Which signals to evaluate and what counts as genuine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityPolicy {
    /// Report [`SecurityThreat::RootDetected`]
    pub check_root: bool,
    /// Report [`SecurityThreat::EmulatorDetected`]
    pub check_emulator: bool,
    /// Expected signature digest; `None` skips the tamper check
    pub expected_signature_sha256: Option<String>,
    /// Trusted installers; empty skips the installer check
    pub trusted_installers: Vec<String>,
}

impl From<&SecurityConfig> for IntegrityPolicy {
    fn from(config: &SecurityConfig) -> Self {
        Self {
            check_root: config.check_root,
            check_emulator: config.check_emulator,
            expected_signature_sha256: config.expected_signature_sha256.clone(),
            trusted_installers: config.trusted_installers.clone(),
        }
    }
}

/// Evaluates the execution environment for tampering and debugging.
///
/// Every call re-probes; nothing is cached, since a debugger can attach at
/// any time. Probe errors are logged and treated as "not observed", except
/// for the signature check, which fails closed.
#[derive(Debug, Clone)]
pub struct RuntimeSecurityManager {
    introspector: Arc<dyn DeviceIntrospector>,
    policy: IntegrityPolicy,
}

impl RuntimeSecurityManager {
    /// Create a manager over an introspector.
    #[must_use]
    pub fn new(introspector: Arc<dyn DeviceIntrospector>, policy: IntegrityPolicy) -> Self {
        Self {
            introspector,
            policy,
        }
    }

    /// Active policy.
    #[must_use]
    pub fn policy(&self) -> &IntegrityPolicy {
        &self.policy
    }

    /// Evaluate every enabled signal and union the results.
    pub async fn perform_security_check(&self) -> SecurityCheckResult {
        let mut threats = Vec::new();

        if self.policy.check_root
            && Self::probe("root", false, self.introspector.is_rooted()).await
        {
            threats.push(SecurityThreat::RootDetected);
        }
        if self.is_debuggable() {
            threats.push(SecurityThreat::DebuggableApp);
        }
        if self.is_debugger_attached().await {
            threats.push(SecurityThreat::DebuggerAttached);
        }
        if self.is_tampered().await {
            threats.push(SecurityThreat::AppTampered);
        }
        if self.policy.check_emulator
            && Self::probe("emulator", false, self.introspector.is_emulator()).await
        {
            threats.push(SecurityThreat::EmulatorDetected);
        }
        if Self::probe("instrumentation", false, self.introspector.is_instrumented()).await {
            threats.push(SecurityThreat::HookingDetected);
        }
        if self.is_untrusted_installer().await {
            threats.push(SecurityThreat::UntrustedInstaller);
        }

        let result = SecurityCheckResult::from_threats(threats);
        tracing::debug!(
            secure = result.is_secure,
            threats = result.threats.len(),
            "Runtime security check complete"
        );
        result
    }

    /// Whether the running build permits debugging.
    #[must_use]
    pub fn is_debuggable(&self) -> bool {
        self.introspector.is_debuggable()
    }

    /// Whether a debugger is attached right now.
    ///
    /// A probe that cannot answer counts as attached.
    pub async fn is_debugger_attached(&self) -> bool {
        Self::probe("debugger", true, self.introspector.is_debugger_attached()).await
    }

    /// Whether the package signature fails to match the expected digest.
    ///
    /// Returns `false` when no digest is configured. An unavailable
    /// signature counts as tampering.
    pub async fn is_tampered(&self) -> bool {
        let Some(expected) = &self.policy.expected_signature_sha256 else {
            tracing::debug!("No expected signature configured, skipping tamper check");
            return false;
        };

        match self.introspector.signature_sha256().await {
            Ok(Some(actual)) => !digests_match(expected, &actual),
            Ok(None) => {
                tracing::warn!("Package signature unavailable");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Package signature probe failed");
                true
            }
        }
    }

    async fn is_untrusted_installer(&self) -> bool {
        if self.policy.trusted_installers.is_empty() {
            return false;
        }

        match self.introspector.installer().await {
            Ok(installer) => !installer.is_some_and(|installer| {
                self.policy
                    .trusted_installers
                    .iter()
                    .any(|trusted| *trusted == installer)
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Installer probe failed");
                false
            }
        }
    }

    /// Await a probe. On error, `fail_closed` decides whether the signal is
    /// reported as detected.
    async fn probe<F>(signal: &'static str, fail_closed: bool, check: F) -> bool
    where
        F: std::future::Future<Output = crate::Result<bool>>,
    {
        match check.await {
            Ok(detected) => detected,
            Err(e) => {
                tracing::warn!(signal, fail_closed, error = %e, "Security probe failed");
                fail_closed
            }
        }
    }
}

/// Compare hex digests ignoring case and `:` separators, without early exit.
fn digests_match(expected: &str, actual: &str) -> bool {
    let normalize = |digest: &str| -> Vec<u8> {
        digest
            .bytes()
            .filter(|b| *b != b':')
            .map(|b| b.to_ascii_lowercase())
            .collect()
    };
    let expected = normalize(expected);
    let actual = normalize(actual);

    if expected.len() != actual.len() {
        return false;
    }
    expected
        .iter()
        .zip(&actual)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
