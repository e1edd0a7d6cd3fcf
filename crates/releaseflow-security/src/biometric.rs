//! Biometric capability reporting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether biometric authentication can be offered on this device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiometricAvailability {
    /// Hardware present and a biometric enrolled
    Available,
    /// No biometric hardware
    NoHardware,
    /// Hardware present but currently unavailable
    HardwareUnavailable,
    /// Hardware present, nothing enrolled
    NoneEnrolled,
    /// A platform security update is required first
    SecurityUpdateRequired,
    /// Platform does not support biometrics
    Unsupported,
    /// Status could not be determined
    Unknown,
}

impl BiometricAvailability {
    /// True only for [`BiometricAvailability::Available`].
    #[must_use]
    pub fn is_available(self) -> bool {
        self == Self::Available
    }
}

/// Platform biometric subsystem.
pub trait BiometricProvider: Send + Sync + fmt::Debug {
    /// Current availability.
    fn availability(&self) -> BiometricAvailability;
}

/// Provider for platforms without biometric support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBiometrics;

impl BiometricProvider for NoBiometrics {
    fn availability(&self) -> BiometricAvailability {
        BiometricAvailability::Unsupported
    }
}
