//! OAuth 2.0 authorization code flow with PKCE (RFC 7636).
//!
//! This module produces and checks the client-side material of the flow. The
//! HTTP calls to the token endpoint go through a [`TokenExchange`]
//! implementation supplied by the application.

use crate::error::{AuthError, Result};
use crate::jwt::JwtTokenManager;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use releaseflow_vault::{keys, SecurePreferences};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;
use url::Url;

const CODE_VERIFIER_BYTES: usize = 32;
const STATE_BYTES: usize = 16;

/// PKCE code challenge method.
pub const CODE_CHALLENGE_METHOD: &str = "S256";

/// A verifier and the challenge derived from it.
#[derive(Clone, PartialEq, Eq)]
pub struct PkceChallenge {
    /// Secret sent only with the token exchange
    pub code_verifier: String,
    /// SHA-256 of the verifier, sent with the authorization request
    pub code_challenge: String,
    /// Always [`CODE_CHALLENGE_METHOD`]
    pub method: &'static str,
}

impl fmt::Debug for PkceChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PkceChallenge")
            .field("code_verifier", &"[REDACTED]")
            .field("code_challenge", &self.code_challenge)
            .field("method", &self.method)
            .finish()
    }
}

/// Where to send the user to authorize, and the state to expect back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Full authorization URL
    pub url: String,
    /// CSRF state echoed back on the redirect
    pub state: String,
    /// Challenge embedded in `url`
    pub code_challenge: String,
}

/// Authorization code captured from the redirect.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationResponse {
    /// Single-use authorization code
    pub code: String,
    /// State echoed by the provider
    pub state: String,
}

impl fmt::Debug for AuthorizationResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationResponse")
            .field("code", &"[REDACTED]")
            .field("state", &self.state)
            .finish()
    }
}

/// Code-for-token request handed to a [`TokenExchange`].
#[derive(Clone, PartialEq, Eq)]
pub struct TokenExchangeRequest {
    /// Authorization code
    pub code: String,
    /// PKCE verifier matching the challenge sent earlier
    pub code_verifier: String,
}

impl fmt::Debug for TokenExchangeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenExchangeRequest")
            .field("code", &"[REDACTED]")
            .field("code_verifier", &"[REDACTED]")
            .finish()
    }
}

/// Token endpoint response (RFC 6749 §5.1).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token
    pub access_token: String,
    /// Refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Usually `Bearer`
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Network collaborator that talks to the provider's token endpoint.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Exchange an authorization code for tokens.
    async fn exchange_code(&self, request: TokenExchangeRequest) -> Result<TokenResponse>;

    /// Obtain a new access token from a refresh token.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse>;
}

/// PKCE authorization helper.
#[derive(Debug, Clone)]
pub struct OAuth2Manager {
    prefs: SecurePreferences,
    jwt: JwtTokenManager,
}

impl OAuth2Manager {
    /// Create a manager sharing storage with `jwt`.
    #[must_use]
    pub fn new(prefs: SecurePreferences, jwt: JwtTokenManager) -> Self {
        Self { prefs, jwt }
    }

    /// Token manager the completed session is stored through.
    #[must_use]
    pub fn jwt(&self) -> &JwtTokenManager {
        &self.jwt
    }

    /// 32 random bytes from the OS, base64url without padding (43 chars).
    #[must_use]
    pub fn generate_code_verifier() -> String {
        random_urlsafe(CODE_VERIFIER_BYTES)
    }

    /// S256 challenge for `verifier`.
    #[must_use]
    pub fn generate_code_challenge(verifier: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
    }

    /// Fresh verifier and its challenge.
    #[must_use]
    pub fn generate_pkce() -> PkceChallenge {
        let code_verifier = Self::generate_code_verifier();
        let code_challenge = Self::generate_code_challenge(&code_verifier);
        PkceChallenge {
            code_verifier,
            code_challenge,
            method: CODE_CHALLENGE_METHOD,
        }
    }

    /// Random CSRF state value.
    #[must_use]
    pub fn generate_state() -> String {
        random_urlsafe(STATE_BYTES)
    }

    /// Build the authorization URL and remember the pending verifier and state.
    ///
    /// The verifier is written to secure storage so the exchange can still
    /// complete if the process restarts while the user is at the provider.
    pub fn build_authorization_request(
        &self,
        authorization_endpoint: &str,
        client_id: &str,
        redirect_uri: &str,
        scope: &str,
        state: Option<&str>,
    ) -> Result<AuthorizationRequest> {
        let mut url = Url::parse(authorization_endpoint)
            .map_err(|e| AuthError::InvalidEndpoint(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AuthError::InvalidEndpoint(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }

        let pkce = Self::generate_pkce();
        let state = state.map_or_else(Self::generate_state, str::to_string);

        self.prefs
            .put_string(keys::OAUTH2_CODE_VERIFIER, &pkce.code_verifier)?;
        self.prefs.put_string(keys::OAUTH2_STATE, &state)?;

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", scope)
            .append_pair("state", &state)
            .append_pair("code_challenge", &pkce.code_challenge)
            .append_pair("code_challenge_method", pkce.method);

        tracing::debug!(host = url.host_str().unwrap_or_default(), "Authorization request built");

        Ok(AuthorizationRequest {
            url: url.into(),
            state,
            code_challenge: pkce.code_challenge,
        })
    }

    /// Check a redirect URI and extract the authorization code.
    ///
    /// The state is compared before anything else is read from the redirect.
    /// Without `expected_state` the stored pending state is used; if there is
    /// none the redirect is rejected.
    pub fn validate_authorization_response(
        &self,
        redirect: &str,
        expected_state: Option<&str>,
    ) -> Result<AuthorizationResponse> {
        let url = Url::parse(redirect).map_err(|e| AuthError::InvalidRedirect(e.to_string()))?;
        let param = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        };

        let expected = match expected_state {
            Some(state) => Some(state.to_string()),
            None => self.prefs.get_string(keys::OAUTH2_STATE)?,
        };
        let state = param("state");
        match (&expected, &state) {
            (Some(expected), Some(state)) if expected == state => {}
            _ => {
                tracing::warn!("OAuth state mismatch on redirect");
                return Err(AuthError::StateMismatch);
            }
        }

        if let Some(error) = param("error") {
            return Err(AuthError::Provider {
                error,
                description: param("error_description")
                    .unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        let code = param("code")
            .filter(|code| !code.trim().is_empty())
            .ok_or(AuthError::MissingAuthorizationCode)?;

        Ok(AuthorizationResponse {
            code,
            state: state.unwrap_or_default(),
        })
    }

    /// Exchange the code for tokens and store the new session.
    ///
    /// The response state must match the pending state, whoever built the
    /// response. Pending PKCE state is cleared only once the session is
    /// stored, so a failed exchange can be retried.
    pub async fn complete_authorization(
        &self,
        response: &AuthorizationResponse,
        exchange: &dyn TokenExchange,
    ) -> Result<()> {
        let code_verifier = self
            .prefs
            .get_string(keys::OAUTH2_CODE_VERIFIER)?
            .ok_or(AuthError::MissingCodeVerifier)?;
        if self.prefs.get_string(keys::OAUTH2_STATE)?.as_deref() != Some(response.state.as_str()) {
            tracing::warn!("OAuth state mismatch on code exchange");
            return Err(AuthError::StateMismatch);
        }

        let tokens = exchange
            .exchange_code(TokenExchangeRequest {
                code: response.code.clone(),
                code_verifier,
            })
            .await?;
        self.store_tokens(&tokens)?;
        self.clear_pending()?;

        tracing::info!(token_type = %tokens.token_type, "Authorization completed");
        Ok(())
    }

    /// Replace the stored access token using the stored refresh token.
    ///
    /// A provider that does not rotate refresh tokens keeps the old one.
    pub async fn refresh_session(&self, exchange: &dyn TokenExchange) -> Result<()> {
        let refresh_token = self
            .jwt
            .refresh_token()?
            .ok_or(AuthError::NotAuthenticated)?;

        let mut tokens = exchange.refresh(&refresh_token).await?;
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token);
        }
        self.store_tokens(&tokens)?;

        tracing::info!("Session refreshed");
        Ok(())
    }

    /// Remove the session and any pending authorization.
    pub fn clear_session(&self) -> Result<()> {
        self.clear_pending()?;
        self.jwt.clear_tokens()
    }

    fn store_tokens(&self, tokens: &TokenResponse) -> Result<()> {
        if tokens.access_token.is_empty() {
            return Err(AuthError::TokenExchange(
                "token endpoint returned an empty access token".to_string(),
            ));
        }
        let expires_at = match tokens.expires_in {
            Some(secs) => Some(
                chrono::Duration::from_std(Duration::from_secs(secs))
                    .ok()
                    .and_then(|lifetime| self.jwt.now().checked_add_signed(lifetime))
                    .ok_or_else(|| {
                        AuthError::TokenExchange(format!("expires_in out of range: {secs}"))
                    })?,
            ),
            None => None,
        };

        self.jwt.save_tokens_with_expiry(
            &tokens.access_token,
            tokens.refresh_token.as_deref(),
            expires_at,
        )
    }

    fn clear_pending(&self) -> Result<()> {
        self.prefs.remove(keys::OAUTH2_CODE_VERIFIER)?;
        self.prefs.remove(keys::OAUTH2_STATE)?;
        Ok(())
    }
}

fn random_urlsafe(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::jwt::tests::secure_prefs;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeExchange {
        requests: Mutex<Vec<TokenExchangeRequest>>,
        refreshes: Mutex<Vec<String>>,
        fail: bool,
        access_token: Option<String>,
        lifetime_secs: Option<u64>,
    }

    #[async_trait]
    impl TokenExchange for FakeExchange {
        async fn exchange_code(&self, request: TokenExchangeRequest) -> Result<TokenResponse> {
            self.requests.lock().expect("lock").push(request);
            if self.fail {
                return Err(AuthError::TokenExchange("503 from provider".to_string()));
            }
            Ok(TokenResponse {
                access_token: self.access_token.clone().unwrap_or_else(|| "h.p.s".to_string()),
                refresh_token: Some("refresh-1".to_string()),
                expires_in: Some(self.lifetime_secs.unwrap_or(3600)),
                token_type: "Bearer".to_string(),
            })
        }

        async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
            self.refreshes
                .lock()
                .expect("lock")
                .push(refresh_token.to_string());
            Ok(TokenResponse {
                access_token: "h.p2.s".to_string(),
                refresh_token: None,
                expires_in: None,
                token_type: "Bearer".to_string(),
            })
        }
    }

    fn manager() -> OAuth2Manager {
        let prefs = secure_prefs();
        let jwt = JwtTokenManager::new(
            prefs.clone(),
            Arc::new(ManualClock::default()),
            Duration::from_secs(1800),
        );
        OAuth2Manager::new(prefs, jwt)
    }

    #[test]
    fn test_code_verifier_shape() {
        let verifier = OAuth2Manager::generate_code_verifier();
        assert_eq!(verifier.len(), 43);
        assert!(verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_code_verifiers_are_unique() {
        let verifiers: HashSet<String> = (0..100)
            .map(|_| OAuth2Manager::generate_code_verifier())
            .collect();
        assert_eq!(verifiers.len(), 100);
    }

    #[test]
    fn test_code_challenge_rfc7636_vector() {
        // RFC 7636 Appendix B
        assert_eq!(
            OAuth2Manager::generate_code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_code_challenge_is_deterministic() {
        let pkce = OAuth2Manager::generate_pkce();
        assert_eq!(
            pkce.code_challenge,
            OAuth2Manager::generate_code_challenge(&pkce.code_verifier)
        );
        assert_ne!(
            OAuth2Manager::generate_code_challenge("verifier-a"),
            OAuth2Manager::generate_code_challenge("verifier-b")
        );
        assert_eq!(pkce.method, "S256");
        assert!(!format!("{pkce:?}").contains(&pkce.code_verifier));
    }

    #[test]
    fn test_build_authorization_request() {
        let m = manager();
        let request = m
            .build_authorization_request(
                "https://accounts.example.com/authorize",
                "releaseflow-mobile",
                "releaseflow://oauth/callback",
                "profile releases",
                Some("fixed-state"),
            )
            .expect("build");

        let url = Url::parse(&request.url).expect("valid url");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |k: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(get("client_id"), Some("releaseflow-mobile"));
        assert_eq!(get("redirect_uri"), Some("releaseflow://oauth/callback"));
        assert_eq!(get("scope"), Some("profile releases"));
        assert_eq!(get("state"), Some("fixed-state"));
        assert_eq!(get("code_challenge_method"), Some("S256"));
        assert_eq!(get("code_challenge"), Some(request.code_challenge.as_str()));

        let verifier = m
            .prefs
            .get_string(keys::OAUTH2_CODE_VERIFIER)
            .expect("read")
            .expect("verifier pending");
        assert_eq!(
            OAuth2Manager::generate_code_challenge(&verifier),
            request.code_challenge
        );
        assert!(!request.url.contains(&verifier));
    }

    #[test]
    fn test_build_authorization_request_generates_state() {
        let m = manager();
        let request = m
            .build_authorization_request("https://a.example/auth", "c", "app://cb", "s", None)
            .expect("build");
        assert!(!request.state.is_empty());
        assert_eq!(
            m.prefs.get_string(keys::OAUTH2_STATE).expect("read"),
            Some(request.state)
        );
    }

    #[test]
    fn test_build_authorization_request_rejects_bad_endpoint() {
        let m = manager();
        assert!(matches!(
            m.build_authorization_request("not a url", "c", "app://cb", "s", None),
            Err(AuthError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            m.build_authorization_request("javascript:alert(1)", "c", "app://cb", "s", None),
            Err(AuthError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_validate_response_uses_stored_state() {
        let m = manager();
        let request = m
            .build_authorization_request("https://a.example/auth", "c", "app://cb", "s", None)
            .expect("build");

        let redirect = format!("app://cb?code=abc123&state={}", request.state);
        let response = m
            .validate_authorization_response(&redirect, None)
            .expect("valid");
        assert_eq!(response.code, "abc123");
        assert_eq!(response.state, request.state);
    }

    #[test]
    fn test_state_mismatch_checked_before_error_and_code() {
        let m = manager();
        assert!(matches!(
            m.validate_authorization_response(
                "app://cb?error=access_denied&state=evil",
                Some("expected")
            ),
            Err(AuthError::StateMismatch)
        ));
        assert!(matches!(
            m.validate_authorization_response("app://cb?code=abc", Some("expected")),
            Err(AuthError::StateMismatch)
        ));
        // nothing pending and nothing supplied
        assert!(matches!(
            m.validate_authorization_response("app://cb?code=abc&state=x", None),
            Err(AuthError::StateMismatch)
        ));
    }

    #[test]
    fn test_provider_error_and_missing_code() {
        let m = manager();
        match m.validate_authorization_response(
            "app://cb?error=access_denied&error_description=User%20cancelled&state=s",
            Some("s"),
        ) {
            Err(AuthError::Provider { error, description }) => {
                assert_eq!(error, "access_denied");
                assert_eq!(description, "User cancelled");
            }
            other => panic!("expected provider error, got {other:?}"),
        }

        assert!(matches!(
            m.validate_authorization_response("app://cb?state=s&code=", Some("s")),
            Err(AuthError::MissingAuthorizationCode)
        ));
        assert!(matches!(
            m.validate_authorization_response("::", Some("s")),
            Err(AuthError::InvalidRedirect(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_authorization() {
        let m = manager();
        let request = m
            .build_authorization_request("https://a.example/auth", "c", "app://cb", "s", None)
            .expect("build");
        let verifier = m
            .prefs
            .get_string(keys::OAUTH2_CODE_VERIFIER)
            .expect("read")
            .expect("pending");

        let response = AuthorizationResponse {
            code: "abc".to_string(),
            state: request.state,
        };
        let exchange = FakeExchange::default();
        m.complete_authorization(&response, &exchange)
            .await
            .expect("complete");

        let sent = exchange.requests.lock().expect("lock");
        assert_eq!(sent[0].code, "abc");
        assert_eq!(sent[0].code_verifier, verifier);

        assert!(m.jwt().is_session_valid());
        let session = m.jwt().session().expect("read").expect("stored");
        assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
        assert!(session.expires_at.is_some());
        assert!(!m
            .prefs
            .contains(keys::OAUTH2_CODE_VERIFIER)
            .expect("read"));
        assert!(!m.prefs.contains(keys::OAUTH2_STATE).expect("read"));
    }

    #[tokio::test]
    async fn test_failed_exchange_keeps_pending_state() {
        let m = manager();
        m.build_authorization_request("https://a.example/auth", "c", "app://cb", "s", Some("st"))
            .expect("build");
        let response = AuthorizationResponse {
            code: "abc".to_string(),
            state: "st".to_string(),
        };
        let exchange = FakeExchange {
            fail: true,
            ..FakeExchange::default()
        };

        assert!(m.complete_authorization(&response, &exchange).await.is_err());
        assert!(m.prefs.contains(keys::OAUTH2_CODE_VERIFIER).expect("read"));
        assert!(!m.jwt().is_session_valid());
    }

    #[tokio::test]
    async fn test_empty_access_token_is_rejected() {
        let m = manager();
        m.build_authorization_request("https://a.example/auth", "c", "app://cb", "s", Some("st"))
            .expect("build");
        let response = AuthorizationResponse {
            code: "abc".to_string(),
            state: "st".to_string(),
        };
        let exchange = FakeExchange {
            access_token: Some(String::new()),
            ..FakeExchange::default()
        };
        assert!(matches!(
            m.complete_authorization(&response, &exchange).await,
            Err(AuthError::TokenExchange(_))
        ));
    }

    #[tokio::test]
    async fn test_unrepresentable_expiry_is_rejected() {
        let m = manager();
        m.build_authorization_request("https://a.example/auth", "c", "app://cb", "s", Some("st"))
            .expect("build");
        let response = AuthorizationResponse {
            code: "abc".to_string(),
            state: "st".to_string(),
        };

        for lifetime_secs in [10_000_000_000_000, u64::MAX] {
            let exchange = FakeExchange {
                lifetime_secs: Some(lifetime_secs),
                ..FakeExchange::default()
            };
            assert!(matches!(
                m.complete_authorization(&response, &exchange).await,
                Err(AuthError::TokenExchange(_))
            ));
        }
        assert!(!m.jwt().is_session_valid());
        assert!(m.prefs.contains(keys::OAUTH2_CODE_VERIFIER).expect("read"));
    }

    #[tokio::test]
    async fn test_complete_rejects_response_with_foreign_state() {
        let m = manager();
        m.build_authorization_request("https://a.example/auth", "c", "app://cb", "s", Some("st"))
            .expect("build");
        let response = AuthorizationResponse {
            code: "abc".to_string(),
            state: "forged".to_string(),
        };
        let exchange = FakeExchange::default();

        assert!(matches!(
            m.complete_authorization(&response, &exchange).await,
            Err(AuthError::StateMismatch)
        ));
        assert!(exchange.requests.lock().expect("lock").is_empty());
        assert!(!m.jwt().is_session_valid());
    }

    #[tokio::test]
    async fn test_complete_without_verifier() {
        let m = manager();
        let response = AuthorizationResponse {
            code: "abc".to_string(),
            state: "st".to_string(),
        };
        let exchange = FakeExchange::default();
        assert!(matches!(
            m.complete_authorization(&response, &exchange).await,
            Err(AuthError::MissingCodeVerifier)
        ));
        assert!(exchange.requests.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_refresh_session_keeps_refresh_token() {
        let m = manager();
        m.jwt().save_tokens("h.p.s", "refresh-1").expect("save");

        let exchange = FakeExchange::default();
        m.refresh_session(&exchange).await.expect("refresh");

        assert_eq!(exchange.refreshes.lock().expect("lock")[0], "refresh-1");
        assert_eq!(m.jwt().access_token().expect("read").as_deref(), Some("h.p2.s"));
        assert_eq!(
            m.jwt().refresh_token().expect("read").as_deref(),
            Some("refresh-1")
        );
    }

    #[tokio::test]
    async fn test_refresh_without_session() {
        let m = manager();
        assert!(matches!(
            m.refresh_session(&FakeExchange::default()).await,
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_clear_session() {
        let m = manager();
        m.build_authorization_request("https://a.example/auth", "c", "app://cb", "s", None)
            .expect("build");
        m.jwt().save_tokens("h.p.s", "r").expect("save");

        m.clear_session().expect("clear");
        assert!(!m.jwt().is_session_valid());
        assert!(!m.prefs.contains(keys::OAUTH2_STATE).expect("read"));
        assert!(!m.prefs.contains(keys::OAUTH2_CODE_VERIFIER).expect("read"));

        m.clear_session().expect("clear twice");
    }

    #[test]
    fn test_token_response_deserialize_defaults() {
        let tokens: TokenResponse =
            serde_json::from_str(r#"{"access_token":"h.p.s"}"#).expect("parse");
        assert_eq!(tokens.token_type, "Bearer");
        assert!(tokens.refresh_token.is_none());
        assert!(!format!("{tokens:?}").contains("h.p.s"));
    }
}
