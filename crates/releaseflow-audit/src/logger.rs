//! Security event logging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::RwLock;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Default number of events retained by the journal.
pub const DEFAULT_CAPACITY: usize = 100;

/// Records security events for diagnostics and monitoring.
///
/// The journal is append-only: callers can read, filter and subscribe but
/// cannot rewrite history. Once `capacity` is reached the oldest event is
/// dropped.
#[derive(Debug)]
pub struct SecurityLogger {
    entries: RwLock<VecDeque<SecurityEvent>>,
    capacity: usize,
    sender: broadcast::Sender<SecurityEvent>,
}

impl SecurityLogger {
    /// Create a logger with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a logger retaining at most `capacity` events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
            sender,
        }
    }

    /// Subscribe to events logged from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SecurityEvent> {
        self.sender.subscribe()
    }

    /// Log a detected security threat.
    pub fn log_security_threat(&self, threat: &str, level: SecurityLevel) {
        self.log_event(SecurityEvent::new(
            SecurityEventType::ThreatDetected,
            level,
            format!("Security threat detected: {threat}"),
            BTreeMap::new(),
        ));
    }

    /// Log the outcome of an encryption or decryption operation.
    pub fn log_crypto_operation(&self, operation: &str, success: bool, key_alias: Option<&str>) {
        let mut details = BTreeMap::new();
        details.insert("operation".to_string(), operation.to_string());
        details.insert("success".to_string(), success.to_string());
        details.insert("key_alias".to_string(), mask_sensitive(key_alias));

        self.log_event(SecurityEvent::new(
            SecurityEventType::Encryption,
            if success {
                SecurityLevel::Info
            } else {
                SecurityLevel::Error
            },
            format!("Crypto operation: {operation}"),
            details,
        ));
    }

    /// Log rejected input. `field` names the input kind, never its value.
    pub fn log_validation_failure(&self, field: &str, reason: &str) {
        let mut details = BTreeMap::new();
        details.insert("field".to_string(), field.to_string());
        details.insert("reason".to_string(), reason.to_string());

        self.log_event(SecurityEvent::new(
            SecurityEventType::Validation,
            SecurityLevel::Warning,
            format!("Validation failed for {field}"),
            details,
        ));
    }

    /// Log a session lifecycle transition.
    pub fn log_session_event(&self, event: &str, user_id: Option<&str>) {
        let mut details = BTreeMap::new();
        details.insert("event".to_string(), event.to_string());
        details.insert("user_id".to_string(), mask_sensitive(user_id));

        self.log_event(SecurityEvent::new(
            SecurityEventType::Session,
            SecurityLevel::Info,
            format!("Session event: {event}"),
            details,
        ));
    }

    /// Log an authentication attempt.
    pub fn log_authentication_attempt(&self, success: bool, method: &str, user_id: Option<&str>) {
        let mut details = BTreeMap::new();
        details.insert("method".to_string(), method.to_string());
        details.insert("success".to_string(), success.to_string());
        details.insert("user_id".to_string(), mask_sensitive(user_id));

        self.log_event(SecurityEvent::new(
            SecurityEventType::Authentication,
            if success {
                SecurityLevel::Info
            } else {
                SecurityLevel::Warning
            },
            format!(
                "Authentication attempt {}",
                if success { "succeeded" } else { "failed" }
            ),
            details,
        ));
    }

    fn log_event(&self, event: SecurityEvent) {
        match event.level {
            SecurityLevel::Info => {
                info!(event_type = %event.event_type, details = ?event.details, "{}", event.message);
            }
            SecurityLevel::Warning => {
                warn!(event_type = %event.event_type, details = ?event.details, "{}", event.message);
            }
            SecurityLevel::Error => {
                error!(event_type = %event.event_type, details = ?event.details, "{}", event.message);
            }
            SecurityLevel::Critical => {
                error!(
                    event_type = %event.event_type,
                    details = ?event.details,
                    critical = true,
                    "CRITICAL: {}",
                    event.message
                );
            }
        }

        {
            let mut entries = self.entries.write().expect("security log lock poisoned");
            if entries.len() == self.capacity {
                entries.pop_front();
            }
            entries.push_back(event.clone());
        }

        // No subscribers is not an error.
        let _ = self.sender.send(event);
    }

    /// Get all retained events, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<SecurityEvent> {
        self.entries
            .read()
            .expect("security log lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Get the last `count` events, oldest first.
    #[must_use]
    pub fn recent_entries(&self, count: usize) -> Vec<SecurityEvent> {
        let entries = self.entries.read().expect("security log lock poisoned");
        let start = entries.len().saturating_sub(count);
        entries.iter().skip(start).cloned().collect()
    }

    /// Get retained events of one type.
    #[must_use]
    pub fn entries_of_type(&self, event_type: SecurityEventType) -> Vec<SecurityEvent> {
        self.entries
            .read()
            .expect("security log lock poisoned")
            .iter()
            .filter(|event| event.event_type == event_type)
            .cloned()
            .collect()
    }

    /// Number of retained events.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.read().expect("security log lock poisoned").len()
    }
}

impl Default for SecurityLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// A single security event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unique identifier for this event
    pub id: Uuid,
    /// When this event occurred
    pub timestamp: DateTime<Utc>,
    /// Category of event
    pub event_type: SecurityEventType,
    /// Severity
    pub level: SecurityLevel,
    /// Human-readable summary
    pub message: String,
    /// Structured, non-secret details
    pub details: BTreeMap<String, String>,
}

impl SecurityEvent {
    fn new(
        event_type: SecurityEventType,
        level: SecurityLevel,
        message: String,
        details: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event_type,
            level,
            message,
            details,
        }
    }
}

/// Category of security event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventType {
    /// Login or biometric attempt
    Authentication,
    /// Encryption or decryption outcome
    Encryption,
    /// Runtime threat signal
    ThreatDetected,
    /// Session lifecycle transition
    Session,
    /// Rejected input
    Validation,
}

impl fmt::Display for SecurityEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authentication => "authentication",
            Self::Encryption => "encryption",
            Self::ThreatDetected => "threat_detected",
            Self::Session => "session",
            Self::Validation => "validation",
        };
        f.write_str(name)
    }
}

/// Severity of a security event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    /// Routine event
    Info,
    /// Suspicious but non-blocking
    Warning,
    /// Operation failed
    Error,
    /// Environment compromise
    Critical,
}

/// Mask an identifier so only its first and last two characters remain.
///
/// Values of four characters or fewer (and absent values) become `***`.
#[must_use]
pub fn mask_sensitive(data: Option<&str>) -> String {
    match data.map(str::trim) {
        Some(value) if value.chars().count() > 4 => {
            let chars: Vec<char> = value.chars().collect();
            let head: String = chars[..2].iter().collect();
            let tail: String = chars[chars.len() - 2..].iter().collect();
            format!("{head}***{tail}")
        }
        _ => "***".to_string(),
    }
}
