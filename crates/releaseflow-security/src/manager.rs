//! Top-level security orchestrator.

use crate::biometric::BiometricProvider;
use crate::error::Result;
use crate::state::{InitOutcome, SecurityState};
use releaseflow_audit::{SecurityLevel, SecurityLogger};
use releaseflow_auth::{AuthError, Clock, JwtTokenManager, OAuth2Manager};
use releaseflow_core::{AppConfig, KeyAlias};
use releaseflow_integrity::{
    DeviceIntrospector, IntegrityPolicy, RuntimeSecurityManager, SecurityThreat, ThreatSeverity,
};
use releaseflow_validation::{InputType, InputValidator, ValidationOutcome};
use releaseflow_vault::{
    EncryptedBlob, EncryptionManager, KeyStore, PreferenceStore, SecurePreferences,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

/// Shortest interval [`SecurityManager::monitor`] will run checks at.
const MIN_MONITOR_INTERVAL: Duration = Duration::from_secs(1);

/// Platform services the orchestrator is built on.
#[derive(Debug, Clone)]
pub struct Collaborators {
    /// Where encryption keys live
    pub key_store: Arc<dyn KeyStore>,
    /// Where encrypted preferences are persisted
    pub preference_store: Arc<dyn PreferenceStore>,
    /// Environment probe for runtime checks
    pub introspector: Arc<dyn DeviceIntrospector>,
    /// Biometric capability source
    pub biometrics: Arc<dyn BiometricProvider>,
    /// Time source for session expiry
    pub clock: Arc<dyn Clock>,
}

/// Single entry point to the security layer.
///
/// Owns the [`SecurityState`]. Observers read it with
/// [`SecurityManager::state`] or follow changes with
/// [`SecurityManager::subscribe`]. Threats never terminate the process;
/// blocking use of the application is the caller's decision.
#[derive(Debug)]
pub struct SecurityManager {
    runtime: RuntimeSecurityManager,
    biometrics: Arc<dyn BiometricProvider>,
    encryption: EncryptionManager,
    prefs: SecurePreferences,
    validator: InputValidator,
    jwt: JwtTokenManager,
    oauth: OAuth2Manager,
    logger: Arc<SecurityLogger>,
    default_alias: KeyAlias,
    state: watch::Sender<SecurityState>,
    init_lock: Mutex<()>,
}

impl SecurityManager {
    /// Wire the security layer from configuration and platform services.
    pub fn new(config: &AppConfig, collaborators: Collaborators) -> Result<Self> {
        let security = &config.security;
        let default_alias = KeyAlias::new(security.default_key_alias.clone())?;
        let prefs_alias = KeyAlias::new(security.preferences_key_alias.clone())?;

        let encryption = EncryptionManager::new(collaborators.key_store);
        let prefs = SecurePreferences::new(
            encryption.clone(),
            collaborators.preference_store,
            prefs_alias,
        );
        let jwt = JwtTokenManager::new(
            prefs.clone(),
            collaborators.clock,
            security.session_timeout(),
        );
        let oauth = OAuth2Manager::new(prefs.clone(), jwt.clone());
        let runtime = RuntimeSecurityManager::new(
            collaborators.introspector,
            IntegrityPolicy::from(security),
        );
        let (state, _) = watch::channel(SecurityState::Initializing);

        Ok(Self {
            runtime,
            biometrics: collaborators.biometrics,
            encryption,
            prefs,
            validator: InputValidator::new(),
            jwt,
            oauth,
            logger: Arc::new(SecurityLogger::with_capacity(config.audit.capacity)),
            default_alias,
            state,
            init_lock: Mutex::new(()),
        })
    }

    /// Run startup checks and prepare encryption.
    ///
    /// Any critical threat yields [`InitOutcome::Failed`] and the
    /// `SecurityThreatDetected` state. Otherwise the default key is created if
    /// missing and non-critical threats come back as warnings. Concurrent
    /// calls run one after another.
    pub async fn initialize(&self) -> InitOutcome {
        let _guard = self.init_lock.lock().await;
        self.set_state(SecurityState::Initializing);

        match self.run_initialization().await {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = e.to_string();
                self.logger.log_security_threat(
                    &format!("Security initialization failed: {message}"),
                    SecurityLevel::Error,
                );
                self.set_state(SecurityState::Error {
                    message: message.clone(),
                });
                InitOutcome::Failed {
                    reason: message,
                    threats: Vec::new(),
                }
            }
        }
    }

    async fn run_initialization(&self) -> Result<InitOutcome> {
        let check = self.runtime.perform_security_check().await;
        self.log_threats(&check.threats);

        if check.has_critical() {
            tracing::error!(threats = %check.message(), "Critical security threats detected");
            self.set_state(SecurityState::SecurityThreatDetected {
                threats: check.threats.clone(),
            });
            return Ok(InitOutcome::Failed {
                reason: "Critical security threats detected".to_string(),
                threats: check.threats,
            });
        }

        if self.encryption.ensure_key(&self.default_alias)? {
            self.logger.log_crypto_operation(
                "Master key initialization",
                true,
                Some(self.default_alias.as_str()),
            );
        }

        let biometric_available = self.biometrics.availability().is_available();
        self.set_state(SecurityState::Secure {
            biometric_available,
            threats: check.threats.clone(),
        });
        self.logger
            .log_session_event("Security system initialized successfully", None);

        Ok(InitOutcome::Success {
            biometric_available,
            warnings: check.threats,
        })
    }

    /// Re-run the runtime checks. Advisory only; the state is left alone.
    pub async fn perform_periodic_check(&self) -> bool {
        let check = self.runtime.perform_security_check().await;
        self.log_threats(&check.threats);
        check.is_secure
    }

    /// Run [`SecurityManager::perform_periodic_check`] every `every` until
    /// `shutdown` flips to `true` or its sender is dropped.
    ///
    /// Intervals shorter than one second are raised to one second.
    pub async fn monitor(&self, every: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(every.max(MIN_MONITOR_INTERVAL));
        // the first tick completes immediately
        interval.tick().await;

        while !*shutdown.borrow() {
            tokio::select! {
                _ = interval.tick() => {
                    if !self.perform_periodic_check().await {
                        tracing::warn!("Periodic security check found threats");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("Security monitor stopped");
    }

    /// Validate untrusted input, logging a rejection.
    #[must_use]
    pub fn validate_input(&self, input: &str, input_type: InputType) -> ValidationOutcome {
        let outcome = self.validator.validate(input, input_type);
        if !outcome.is_valid {
            self.logger
                .log_validation_failure(input_type.as_str(), "Invalid format");
        }
        outcome
    }

    /// Encrypt under `alias`, or the configured default alias.
    pub fn encrypt_data(&self, data: &str, alias: Option<&KeyAlias>) -> Result<EncryptedBlob> {
        let alias = alias.unwrap_or(&self.default_alias);
        let result = self.encryption.encrypt(data, alias);
        self.logger
            .log_crypto_operation("Data encryption", result.is_ok(), Some(alias.as_str()));
        Ok(result?)
    }

    /// Decrypt with `alias`, or the configured default alias.
    pub fn decrypt_data(&self, blob: &EncryptedBlob, alias: Option<&KeyAlias>) -> Result<String> {
        let alias = alias.unwrap_or(&self.default_alias);
        let result = self.encryption.decrypt(blob, alias);
        self.logger
            .log_crypto_operation("Data decryption", result.is_ok(), Some(alias.as_str()));
        Ok(result?)
    }

    /// Whether a live session exists.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.jwt.is_session_valid()
    }

    /// Store a session obtained from the backend.
    ///
    /// The access token must be a three-segment JWT.
    pub fn establish_session(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        if !JwtTokenManager::validate_token_format(access_token) {
            self.logger.log_authentication_attempt(false, "token", None);
            return Err(AuthError::MalformedToken(
                "expected three dot-separated segments".to_string(),
            )
            .into());
        }

        self.jwt.save_tokens(access_token, refresh_token)?;
        let subject = JwtTokenManager::parse_claims(access_token)
            .ok()
            .map(|claims| claims.subject)
            .filter(|subject| !subject.is_empty());
        self.logger
            .log_authentication_attempt(true, "token", subject.as_deref());
        self.logger
            .log_session_event("Session established", subject.as_deref());
        Ok(())
    }

    /// Extend the current session. Fails if it has already expired.
    pub fn record_activity(&self) -> Result<()> {
        if let Err(e) = self.jwt.check_session() {
            if matches!(e, AuthError::SessionExpired) {
                self.logger.log_session_event("Session expired", None);
            }
            return Err(e.into());
        }
        self.jwt.update_activity()?;
        Ok(())
    }

    /// End the session and drop any pending authorization. Safe to repeat.
    pub fn logout(&self) -> Result<()> {
        self.oauth.clear_session()?;
        self.logger.log_session_event("User logged out", None);
        Ok(())
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SecurityState {
        self.state.borrow().clone()
    }

    /// Follow state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SecurityState> {
        self.state.subscribe()
    }

    /// Alias used when callers do not name one.
    #[must_use]
    pub fn default_alias(&self) -> &KeyAlias {
        &self.default_alias
    }

    /// OAuth helper sharing this manager's session storage.
    #[must_use]
    pub fn oauth(&self) -> &OAuth2Manager {
        &self.oauth
    }

    /// Session token manager.
    #[must_use]
    pub fn jwt(&self) -> &JwtTokenManager {
        &self.jwt
    }

    /// Input validator.
    #[must_use]
    pub fn validator(&self) -> &InputValidator {
        &self.validator
    }

    /// Security event journal.
    #[must_use]
    pub fn logger(&self) -> &Arc<SecurityLogger> {
        &self.logger
    }

    /// Encryption service.
    #[must_use]
    pub fn encryption(&self) -> &EncryptionManager {
        &self.encryption
    }

    /// Encrypted preference store.
    #[must_use]
    pub fn preferences(&self) -> &SecurePreferences {
        &self.prefs
    }

    /// Runtime environment checks.
    #[must_use]
    pub fn runtime(&self) -> &RuntimeSecurityManager {
        &self.runtime
    }

    fn log_threats(&self, threats: &[SecurityThreat]) {
        for threat in threats {
            let level = match threat.severity() {
                ThreatSeverity::Critical => SecurityLevel::Critical,
                ThreatSeverity::Warning => SecurityLevel::Warning,
            };
            self.logger.log_security_threat(threat.description(), level);
        }
    }

    fn set_state(&self, state: SecurityState) {
        tracing::debug!(?state, "Security state changed");
        self.state.send_replace(state);
    }
}
