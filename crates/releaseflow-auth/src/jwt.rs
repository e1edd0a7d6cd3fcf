//! Session token storage and liveness.
//!
//! Tokens are kept in [`SecurePreferences`]. Signatures are never verified
//! here; that is the issuing server's job. Only structure and the inactivity
//! timeout are checked.

use crate::clock::Clock;
use crate::error::{AuthError, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use releaseflow_vault::{keys, SecurePreferences};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Stored session state.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Bearer token
    pub access_token: String,
    /// Refresh token, if the provider issued one
    pub refresh_token: Option<String>,
    /// Access token expiry as reported at issue time
    pub expires_at: Option<DateTime<Utc>>,
    /// Last recorded user activity
    pub last_activity_at: DateTime<Utc>,
}

impl fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRecord")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .field("last_activity_at", &self.last_activity_at)
            .finish()
    }
}

/// Claims read from a JWT payload. Unverified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtClaims {
    /// `sub`
    #[serde(rename = "sub")]
    pub subject: String,
    /// `iss`
    #[serde(rename = "iss")]
    pub issuer: String,
    /// `aud`, normalised to a list
    #[serde(rename = "aud", deserialize_with = "one_or_many")]
    pub audience: Vec<String>,
    /// `exp`, seconds since the epoch
    #[serde(rename = "exp")]
    pub expiration: Option<i64>,
    /// `iat`, seconds since the epoch
    #[serde(rename = "iat")]
    pub issued_at: Option<i64>,
    /// Application user id
    pub user_id: String,
    /// Account email
    pub email: String,
    /// Granted roles
    pub roles: Vec<String>,
}

impl JwtClaims {
    /// `exp` as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiration
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(aud)) => vec![aud],
        Some(OneOrMany::Many(auds)) => auds,
    })
}

/// Manages the stored session and decides whether it is still live.
///
/// Validity is recomputed from the last activity time on every query;
/// there is no background timer.
#[derive(Debug, Clone)]
pub struct JwtTokenManager {
    prefs: SecurePreferences,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl JwtTokenManager {
    /// Create a manager with an inactivity `timeout`.
    #[must_use]
    pub fn new(prefs: SecurePreferences, clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            prefs,
            clock,
            timeout,
        }
    }

    /// Inactivity timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current time according to this manager's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// True iff `token` is exactly three non-empty dot-separated segments.
    #[must_use]
    pub fn validate_token_format(token: &str) -> bool {
        let segments: Vec<&str> = token.split('.').collect();
        segments.len() == 3 && segments.iter().all(|segment| !segment.is_empty())
    }

    /// Read the claims of a JWT without verifying its signature.
    pub fn parse_claims(token: &str) -> Result<JwtClaims> {
        if !Self::validate_token_format(token) {
            return Err(AuthError::MalformedToken(
                "expected three dot-separated segments".to_string(),
            ));
        }

        let payload = token.split('.').nth(1).unwrap_or_default();
        let decoded = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| AuthError::MalformedToken(format!("payload is not base64url: {e}")))?;
        serde_json::from_slice(&decoded)
            .map_err(|e| AuthError::MalformedToken(format!("payload is not JSON: {e}")))
    }

    /// Whether `token`'s `exp` claim has passed. Unreadable tokens count as expired.
    #[must_use]
    pub fn is_token_expired(&self, token: &str) -> bool {
        match Self::parse_claims(token).map(|claims| claims.expires_at()) {
            Ok(Some(expires_at)) => self.clock.now() >= expires_at,
            Ok(None) | Err(_) => true,
        }
    }

    /// Store a new session and mark activity now.
    pub fn save_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        self.save_tokens_with_expiry(access_token, Some(refresh_token), None)
    }

    /// Store a new session with an optional refresh token and expiry.
    ///
    /// If any write fails the stored session is cleared, so a new access
    /// token is never left next to the previous session's activity time.
    pub fn save_tokens_with_expiry(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        if let Err(e) = self.write_session(access_token, refresh_token, expires_at) {
            if let Err(clear_err) = self.clear_tokens() {
                tracing::error!(error = %clear_err, "Failed to clear partially written session");
            }
            tracing::warn!(error = %e, "Saving session tokens failed, session cleared");
            return Err(e);
        }

        tracing::info!(has_refresh = refresh_token.is_some(), "Session tokens saved");
        Ok(())
    }

    fn write_session(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.prefs.put_string(keys::AUTH_TOKEN, access_token)?;
        match refresh_token {
            Some(refresh) => self.prefs.put_string(keys::REFRESH_TOKEN, refresh)?,
            None => self.prefs.remove(keys::REFRESH_TOKEN)?,
        }
        match expires_at {
            Some(at) => self
                .prefs
                .put_i64(keys::TOKEN_EXPIRES_AT, at.timestamp_millis())?,
            None => self.prefs.remove(keys::TOKEN_EXPIRES_AT)?,
        }
        self.update_activity()
    }

    /// Record user activity now.
    pub fn update_activity(&self) -> Result<()> {
        let now = self.clock.now().timestamp_millis();
        self.prefs.put_i64(keys::LAST_AUTH_TIME, now)?;
        Ok(())
    }

    /// Whether a session exists and has seen activity within the timeout.
    ///
    /// Storage errors make the session invalid.
    #[must_use]
    pub fn is_session_valid(&self) -> bool {
        match self.check_session() {
            Ok(()) => true,
            Err(AuthError::NotAuthenticated | AuthError::SessionExpired) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Session state unreadable, treating as invalid");
                false
            }
        }
    }

    /// Like [`JwtTokenManager::is_session_valid`], but says why a session is not valid.
    pub fn check_session(&self) -> Result<()> {
        if self.access_token()?.is_none() {
            return Err(AuthError::NotAuthenticated);
        }
        let Some(last_activity) = self.last_activity()? else {
            return Err(AuthError::NotAuthenticated);
        };

        // A last-activity time in the future means the clock moved back.
        let idle = (self.clock.now() - last_activity)
            .to_std()
            .map_err(|_| AuthError::SessionExpired)?;
        if idle > self.timeout {
            return Err(AuthError::SessionExpired);
        }
        Ok(())
    }

    /// Stored access token.
    pub fn access_token(&self) -> Result<Option<String>> {
        Ok(self.prefs.get_string(keys::AUTH_TOKEN)?)
    }

    /// Stored refresh token.
    pub fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self.prefs.get_string(keys::REFRESH_TOKEN)?)
    }

    /// Full stored session, whether or not it is still valid.
    pub fn session(&self) -> Result<Option<SessionRecord>> {
        let Some(access_token) = self.access_token()? else {
            return Ok(None);
        };
        let Some(last_activity_at) = self.last_activity()? else {
            return Ok(None);
        };

        let expires_at = self
            .prefs
            .get_i64(keys::TOKEN_EXPIRES_AT)?
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

        Ok(Some(SessionRecord {
            access_token,
            refresh_token: self.refresh_token()?,
            expires_at,
            last_activity_at,
        }))
    }

    /// Delete every session field. The session is invalid immediately after.
    pub fn clear_tokens(&self) -> Result<()> {
        for key in [
            keys::AUTH_TOKEN,
            keys::REFRESH_TOKEN,
            keys::TOKEN_EXPIRES_AT,
            keys::LAST_AUTH_TIME,
        ] {
            self.prefs.remove(key)?;
        }
        tracing::debug!("Session tokens cleared");
        Ok(())
    }

    fn last_activity(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .prefs
            .get_i64(keys::LAST_AUTH_TIME)?
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()))
    }
}
