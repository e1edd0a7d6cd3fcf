//! ReleaseFlow Integrity - Runtime application self-protection.
//!
//! Detects debugging, tampering and hostile execution environments.
//!
//! # Signals
//!
//! | Threat | Severity |
//! |---|---|
//! | `AppTampered` | critical |
//! | `DebuggerAttached` | critical |
//! | `RootDetected`, `DebuggableApp`, `EmulatorDetected`, `HookingDetected`, `UntrustedInstaller` | warning |
//!
//! Platform probing sits behind [`DeviceIntrospector`]; [`HostIntrospector`]
//! implements it for Linux hosts.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod introspect;
pub mod manager;
pub mod threat;

pub use error::{IntegrityError, Result};
pub use introspect::{DeviceIntrospector, HostIntrospector};
pub use manager::{IntegrityPolicy, RuntimeSecurityManager};
pub use threat::{SecurityCheckResult, SecurityThreat, ThreatSeverity};
