//! ReleaseFlow Core - Foundation crate for the ReleaseFlow security layer.
//!
//! This crate provides the configuration model, shared newtypes and the
//! error types every other ReleaseFlow crate depends on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with platform paths
//! - [`types`] - Shared newtypes (`KeyAlias`)
//!
//! # Example
//!
//! ```rust
//! use releaseflow_core::{AppConfig, KeyAlias};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let alias = KeyAlias::new(config.security.default_key_alias.clone())?;
//! assert_eq!(alias.as_str(), "releaseflow_master_key");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, AuditConfig, LoggingConfig, SecurityConfig, StorageConfig};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use types::KeyAlias;
