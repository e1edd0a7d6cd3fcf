//! Configuration management for the ReleaseFlow security layer.
//!
//! Provides TOML-based configuration with platform-specific paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/releaseflow/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Session, key and runtime-check settings
    pub security: SecurityConfig,
    /// Local persistence settings
    pub storage: StorageConfig,
    /// Tracing subscriber settings
    pub logging: LoggingConfig,
    /// Security event journal settings
    pub audit: AuditConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, falling back to defaults if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `RELEASEFLOW_SESSION_TIMEOUT_MINUTES`: Override the inactivity timeout
    /// - `RELEASEFLOW_LOG`: Override the tracing filter directive
    /// - `RELEASEFLOW_EXPECTED_SIGNATURE`: Override the expected package signature digest
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to an already loaded config.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("RELEASEFLOW_SESSION_TIMEOUT_MINUTES") {
            if let Ok(minutes) = val.parse() {
                self.security.session_timeout_minutes = minutes;
                tracing::debug!("Override session_timeout_minutes from env: {}", minutes);
            }
        }

        if let Ok(val) = std::env::var("RELEASEFLOW_LOG") {
            tracing::debug!("Override logging.filter from env: {}", val);
            self.logging.filter = val;
        }

        if let Ok(val) = std::env::var("RELEASEFLOW_EXPECTED_SIGNATURE") {
            self.security.expected_signature_sha256 = Some(val);
            tracing::debug!("Override expected_signature_sha256 from env");
        }
    }

    /// Check values that would otherwise fail later at runtime.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.security.session_timeout_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "security.session_timeout_minutes".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.security.periodic_check_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "security.periodic_check_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.audit.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "audit.capacity".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(digest) = &self.security.expected_signature_sha256 {
            let hex_digits = digest.chars().filter(|c| *c != ':').count();
            if hex_digits != 64 || !digest.chars().all(|c| c == ':' || c.is_ascii_hexdigit()) {
                return Err(ConfigError::InvalidValue {
                    field: "security.expected_signature_sha256".to_string(),
                    reason: "must be a SHA-256 digest in hex".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config_dir = path.parent().ok_or_else(|| ConfigError::InvalidValue {
            field: "config_path".to_string(),
            reason: "no parent directory".to_string(),
        })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Get the data directory path, where the key store and encrypted
    /// preferences live.
    pub fn data_dir() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }
}

fn project_dirs() -> ConfigResult<ProjectDirs> {
    ProjectDirs::from("com", "managr", "releaseflow").ok_or(ConfigError::NoConfigDir)
}

/// Session, key and runtime-check settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Inactivity timeout after which a stored session is treated as expired
    pub session_timeout_minutes: u32,
    /// Alias used by `encrypt_data`/`decrypt_data` when none is given
    pub default_key_alias: String,
    /// Alias of the master key protecting secure preferences
    pub preferences_key_alias: String,
    /// Whether root/superuser detection runs during security checks
    pub check_root: bool,
    /// Whether emulator detection runs during security checks
    pub check_emulator: bool,
    /// Expected SHA-256 of the package signature, hex (colons allowed)
    pub expected_signature_sha256: Option<String>,
    /// Installer package names considered trustworthy (empty = not checked)
    pub trusted_installers: Vec<String>,
    /// Interval between periodic runtime checks in seconds
    pub periodic_check_secs: u64,
}

impl SecurityConfig {
    /// Session timeout as a `Duration`.
    #[must_use]
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.session_timeout_minutes) * 60)
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            session_timeout_minutes: 30,
            default_key_alias: "releaseflow_master_key".to_string(),
            preferences_key_alias: "releaseflow_prefs_key".to_string(),
            check_root: true,
            check_emulator: true,
            expected_signature_sha256: None,
            trusted_installers: Vec::new(),
            periodic_check_secs: 300,
        }
    }
}

/// Local persistence settings. Relative paths resolve against the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Encrypted preferences file
    pub preferences_file: PathBuf,
    /// Software key store file
    pub keystore_file: PathBuf,
}

impl StorageConfig {
    /// Resolve the preferences file against a base directory.
    #[must_use]
    pub fn preferences_path(&self, base: &Path) -> PathBuf {
        base.join(&self.preferences_file)
    }

    /// Resolve the key store file against a base directory.
    #[must_use]
    pub fn keystore_path(&self, base: &Path) -> PathBuf {
        base.join(&self.keystore_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            preferences_file: PathBuf::from("secure_prefs.json"),
            keystore_file: PathBuf::from("keystore.json"),
        }
    }
}

/// Tracing subscriber settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,releaseflow=debug".to_string(),
            json: false,
        }
    }
}

/// Security event journal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Number of events retained in memory
    pub capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.security.session_timeout_minutes, 30);
        assert_eq!(config.security.default_key_alias, "releaseflow_master_key");
        assert!(config.security.check_root);
        assert!(config.security.expected_signature_sha256.is_none());
        assert_eq!(config.audit.capacity, 100);
        assert_eq!(
            config.security.session_timeout(),
            Duration::from_secs(30 * 60)
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[security]"));
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[logging]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(
            parsed.security.default_key_alias,
            config.security.default_key_alias
        );
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.security.session_timeout_minutes = 5;
        config.security.trusted_installers = vec!["com.android.vending".to_string()];
        config.save_to(&config_path).expect("save config");

        let loaded = AppConfig::load_from(&config_path).expect("load config");
        assert_eq!(loaded.security.session_timeout_minutes, 5);
        assert_eq!(
            loaded.security.trusted_installers,
            vec!["com.android.vending".to_string()]
        );
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().expect("create temp dir");
        let loaded = AppConfig::load_from(&tmp.path().join("absent.toml")).expect("load");
        assert_eq!(loaded.security.session_timeout_minutes, 30);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[security]
session_timeout_minutes = 10
check_emulator = false
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.security.session_timeout_minutes, 10);
        assert!(!config.security.check_emulator);
        assert!(config.security.check_root);
        assert_eq!(config.logging.filter, "info,releaseflow=debug");
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = AppConfig::default();
        config.security.session_timeout_minutes = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_check_interval() {
        let mut config = AppConfig::default();
        config.security.periodic_check_secs = 0;
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "security.periodic_check_secs");
            }
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_signature_digest() {
        let mut config = AppConfig::default();
        config.security.expected_signature_sha256 = Some("not-hex".to_string());
        assert!(config.validate().is_err());

        config.security.expected_signature_sha256 = Some("ab".repeat(32));
        assert!(config.validate().is_ok());

        let colon_form = vec!["AB"; 32].join(":");
        config.security.expected_signature_sha256 = Some(colon_form);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_storage_paths() {
        let storage = StorageConfig::default();
        let base = Path::new("/data/releaseflow");
        assert_eq!(
            storage.preferences_path(base),
            PathBuf::from("/data/releaseflow/secure_prefs.json")
        );
        assert_eq!(
            storage.keystore_path(base),
            PathBuf::from("/data/releaseflow/keystore.json")
        );
    }
}
