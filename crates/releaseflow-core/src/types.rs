//! Shared types used across the ReleaseFlow security crates.

use crate::error::CoreError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Newtype for key-store aliases with validation.
///
/// Aliases name keys inside the key store and are bound into every blob
/// encrypted under them. They must be 1-64 characters of ASCII letters,
/// digits, `_`, `-` or `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyAlias(String);

impl KeyAlias {
    /// Create a new `KeyAlias` from a string.
    ///
    /// # Errors
    /// Returns error if the alias is empty, too long, or contains characters
    /// outside the allowed set.
    pub fn new(alias: impl Into<String>) -> Result<Self, CoreError> {
        let alias = alias.into();
        Self::validate(&alias)?;
        Ok(Self(alias))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the alias as bytes, used as AEAD associated data.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn validate(alias: &str) -> Result<(), CoreError> {
        static ALIAS_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = ALIAS_REGEX
            .get_or_init(|| Regex::new(r"^[A-Za-z0-9_.\-]{1,64}$").expect("valid regex"));

        if regex.is_match(alias) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "invalid key alias: must be 1-64 characters of [A-Za-z0-9_.-], got {} characters",
                alias.len()
            )))
        }
    }
}

impl fmt::Display for KeyAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for KeyAlias {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for KeyAlias {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<KeyAlias> for String {
    fn from(alias: KeyAlias) -> Self {
        alias.0
    }
}

impl AsRef<str> for KeyAlias {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
