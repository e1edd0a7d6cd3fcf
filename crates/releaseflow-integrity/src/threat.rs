//! Threat signals and check results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a threat affects startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatSeverity {
    /// Surfaced to the caller; startup continues
    Warning,
    /// Startup is refused
    Critical,
}

/// An environment compromise signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityThreat {
    /// Running with superuser privileges
    RootDetected,
    /// Build allows debugger attachment
    DebuggableApp,
    /// A debugger or tracer is attached
    DebuggerAttached,
    /// Package signature does not match the expected digest
    AppTampered,
    /// Running inside an emulator or virtual machine
    EmulatorDetected,
    /// An instrumentation framework is loaded in-process
    HookingDetected,
    /// Installed from a source outside the trusted list
    UntrustedInstaller,
}

impl SecurityThreat {
    /// Severity of this threat. Only tampering and an attached debugger are critical.
    #[must_use]
    pub fn severity(self) -> ThreatSeverity {
        match self {
            Self::AppTampered | Self::DebuggerAttached => ThreatSeverity::Critical,
            Self::RootDetected
            | Self::DebuggableApp
            | Self::EmulatorDetected
            | Self::HookingDetected
            | Self::UntrustedInstaller => ThreatSeverity::Warning,
        }
    }

    /// Whether this threat blocks startup.
    #[must_use]
    pub fn is_critical(self) -> bool {
        self.severity() == ThreatSeverity::Critical
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::RootDetected => "Device is rooted",
            Self::DebuggableApp => "App is debuggable",
            Self::DebuggerAttached => "Debugger is attached",
            Self::AppTampered => "App has been tampered with",
            Self::EmulatorDetected => "Running on emulator",
            Self::HookingDetected => "Hooking framework detected",
            Self::UntrustedInstaller => "App was installed from an untrusted source",
        }
    }
}

impl fmt::Display for SecurityThreat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Outcome of one environment check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityCheckResult {
    /// True iff `threats` is empty
    pub is_secure: bool,
    /// Threats observed by this check
    pub threats: Vec<SecurityThreat>,
}

impl SecurityCheckResult {
    /// Build a result from observed threats.
    #[must_use]
    pub fn from_threats(threats: Vec<SecurityThreat>) -> Self {
        Self {
            is_secure: threats.is_empty(),
            threats,
        }
    }

    /// Threats that block startup.
    pub fn critical_threats(&self) -> impl Iterator<Item = SecurityThreat> + '_ {
        self.threats.iter().copied().filter(|t| t.is_critical())
    }

    /// Whether any observed threat is critical.
    #[must_use]
    pub fn has_critical(&self) -> bool {
        self.critical_threats().next().is_some()
    }

    /// Summary line for logs and UI.
    #[must_use]
    pub fn message(&self) -> String {
        match self.threats.as_slice() {
            [] => "App is secure".to_string(),
            [only] => format!("Security threat detected: {only}"),
            many => format!(
                "Multiple security threats detected: {}",
                many.iter()
                    .map(|t| t.description())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_classification() {
        assert!(SecurityThreat::AppTampered.is_critical());
        assert!(SecurityThreat::DebuggerAttached.is_critical());
        for threat in [
            SecurityThreat::RootDetected,
            SecurityThreat::DebuggableApp,
            SecurityThreat::EmulatorDetected,
            SecurityThreat::HookingDetected,
            SecurityThreat::UntrustedInstaller,
        ] {
            assert_eq!(threat.severity(), ThreatSeverity::Warning, "{threat:?}");
        }
    }

    #[test]
    fn test_result_message() {
        assert_eq!(SecurityCheckResult::default().message(), "App is secure");

        let one = SecurityCheckResult::from_threats(vec![SecurityThreat::RootDetected]);
        assert!(!one.is_secure);
        assert_eq!(one.message(), "Security threat detected: Device is rooted");

        let many = SecurityCheckResult::from_threats(vec![
            SecurityThreat::RootDetected,
            SecurityThreat::EmulatorDetected,
        ]);
        assert_eq!(
            many.message(),
            "Multiple security threats detected: Device is rooted, Running on emulator"
        );
        assert!(!many.has_critical());
    }

    #[test]
    fn test_critical_threats_filter() {
        let result = SecurityCheckResult::from_threats(vec![
            SecurityThreat::DebuggableApp,
            SecurityThreat::DebuggerAttached,
        ]);
        assert!(result.has_critical());
        assert_eq!(
            result.critical_threats().collect::<Vec<_>>(),
            vec![SecurityThreat::DebuggerAttached]
        );
    }

    #[test]
    fn test_threat_serialization() {
        let json = serde_json::to_string(&SecurityThreat::AppTampered).expect("serialize");
        assert_eq!(json, "\"app_tampered\"");
    }
}
