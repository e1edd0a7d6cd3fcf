//! ReleaseFlow Security - The application's security entry point.
//!
//! [`SecurityManager`] composes runtime integrity checks, encryption, secure
//! preferences, input validation, session tokens and OAuth into one surface,
//! and publishes the resulting [`SecurityState`].
//!
//! # Startup
//!
//! ```text
//! Initializing --critical threat--> SecurityThreatDetected
//!              --internal error---> Error
//!              --otherwise--------> Secure { warnings }
//! ```
//!
//! Periodic checks after startup only log; they never change the state.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod biometric;
pub mod error;
pub mod manager;
pub mod state;

pub use biometric::{BiometricAvailability, BiometricProvider, NoBiometrics};
pub use error::{Result, SecurityError};
pub use manager::{Collaborators, SecurityManager};
pub use state::{InitOutcome, SecurityState};
