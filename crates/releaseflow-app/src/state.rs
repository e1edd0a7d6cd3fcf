//! Application state management.

use anyhow::Context;
use releaseflow_auth::SystemClock;
use releaseflow_core::AppConfig;
use releaseflow_integrity::HostIntrospector;
use releaseflow_security::{Collaborators, NoBiometrics, SecurityManager};
use releaseflow_vault::{FileKeyStore, FilePreferenceStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// State shared by every command handler.
#[derive(Debug)]
pub struct AppState {
    /// Directory holding the key store and encrypted preferences
    pub data_dir: PathBuf,

    /// The security layer
    pub security: Arc<SecurityManager>,

    /// Interval between background runtime checks
    pub check_interval: Duration,
}

impl AppState {
    /// Wire the security layer over files in `data_dir`, creating it if needed.
    pub fn new(config: &AppConfig, data_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
        tracing::info!("Data directory: {}", data_dir.display());

        let key_store = FileKeyStore::open(config.storage.keystore_path(data_dir))
            .context("failed to open key store")?;
        let preference_store = FilePreferenceStore::open(config.storage.preferences_path(data_dir))
            .context("failed to open secure preferences")?;

        let security = SecurityManager::new(
            config,
            Collaborators {
                key_store: Arc::new(key_store),
                preference_store: Arc::new(preference_store),
                introspector: Arc::new(HostIntrospector::new()),
                biometrics: Arc::new(NoBiometrics),
                clock: Arc::new(SystemClock),
            },
        )
        .context("failed to build security layer")?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            security: Arc::new(security),
            check_interval: Duration::from_secs(config.security.periodic_check_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_appstate_new_creates_data_dir() {
        let tmp = TempDir::new().expect("create temp dir");
        let data_dir = tmp.path().join("releaseflow");

        let state = AppState::new(&AppConfig::default(), &data_dir).expect("state");
        assert!(data_dir.is_dir());
        assert_eq!(state.data_dir, data_dir);
        assert_eq!(state.check_interval, Duration::from_secs(300));
    }

    #[test]
    fn test_appstate_rejects_corrupt_key_store() {
        let tmp = TempDir::new().expect("create temp dir");
        std::fs::write(tmp.path().join("keystore.json"), "{not json").expect("write");

        let err = AppState::new(&AppConfig::default(), tmp.path()).expect_err("corrupt");
        assert!(err.to_string().contains("key store"));
    }
}
