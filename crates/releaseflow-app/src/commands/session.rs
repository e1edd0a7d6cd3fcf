//! Session and OAuth authorization commands.

use crate::error::CommandError;
use crate::state::AppState;
use releaseflow_auth::{AuthorizationRequest, TokenExchange};
use releaseflow_security::SecurityError;
use serde::Serialize;

/// Provider settings for an authorization attempt.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Authorization endpoint URL
    pub authorization_endpoint: String,
    /// OAuth client identifier
    pub client_id: String,
    /// Registered redirect URI
    pub redirect_uri: String,
    /// Space-separated scopes
    pub scope: String,
}

/// Non-secret view of the stored session.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    /// Whether the session is live
    pub authenticated: bool,
    /// Access token expiry, if the provider reported one
    pub expires_at: Option<String>,
    /// Last recorded activity
    pub last_activity_at: Option<String>,
}

/// Store tokens obtained outside the OAuth flow as the current session.
pub fn establish_session(
    state: &AppState,
    access_token: &str,
    refresh_token: &str,
) -> Result<(), CommandError> {
    Ok(state
        .security
        .establish_session(access_token, refresh_token)?)
}

/// Extend a live session. Fails if it has already expired.
pub fn record_activity(state: &AppState) -> Result<(), CommandError> {
    Ok(state.security.record_activity()?)
}

/// Describe the stored session without exposing its tokens.
pub fn session_info(state: &AppState) -> Result<SessionInfo, CommandError> {
    let session = state
        .security
        .jwt()
        .session()
        .map_err(SecurityError::from)?;
    Ok(SessionInfo {
        authenticated: state.security.is_authenticated(),
        expires_at: session
            .as_ref()
            .and_then(|s| s.expires_at)
            .map(|at| at.to_rfc3339()),
        last_activity_at: session.map(|s| s.last_activity_at.to_rfc3339()),
    })
}

/// End the session and drop any pending authorization.
pub fn logout(state: &AppState) -> Result<(), CommandError> {
    Ok(state.security.logout()?)
}

/// Start an authorization attempt. Returns the URL to open in a browser.
pub fn begin_authorization(
    state: &AppState,
    provider: &ProviderSettings,
) -> Result<AuthorizationRequest, CommandError> {
    state
        .security
        .oauth()
        .build_authorization_request(
            &provider.authorization_endpoint,
            &provider.client_id,
            &provider.redirect_uri,
            &provider.scope,
            None,
        )
        .map_err(|e| SecurityError::from(e).into())
}

/// Finish an authorization attempt from the provider's redirect.
pub async fn complete_authorization(
    state: &AppState,
    redirect: &str,
    exchange: &dyn TokenExchange,
) -> Result<(), CommandError> {
    let oauth = state.security.oauth();
    let result = match oauth.validate_authorization_response(redirect, None) {
        Ok(response) => oauth.complete_authorization(&response, exchange).await,
        Err(e) => Err(e),
    };

    state
        .security
        .logger()
        .log_authentication_attempt(result.is_ok(), "oauth2_pkce", None);
    result.map_err(|e| SecurityError::from(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use releaseflow_auth::{AuthError, TokenExchangeRequest, TokenResponse};
    use releaseflow_core::AppConfig;
    use tempfile::TempDir;

    #[derive(Debug)]
    struct StaticExchange;

    #[async_trait::async_trait]
    impl TokenExchange for StaticExchange {
        async fn exchange_code(
            &self,
            request: TokenExchangeRequest,
        ) -> releaseflow_auth::Result<TokenResponse> {
            if request.code != "good-code" {
                return Err(AuthError::TokenExchange("invalid_grant".to_string()));
            }
            Ok(TokenResponse {
                access_token: "h.p.s".to_string(),
                refresh_token: Some("r".to_string()),
                expires_in: Some(3600),
                token_type: "Bearer".to_string(),
            })
        }

        async fn refresh(&self, _refresh_token: &str) -> releaseflow_auth::Result<TokenResponse> {
            Err(AuthError::TokenExchange("not supported".to_string()))
        }
    }

    fn create_test_state() -> (AppState, TempDir) {
        let tmp = TempDir::new().expect("create temp dir");
        let state = AppState::new(&AppConfig::default(), tmp.path()).expect("state");
        (state, tmp)
    }

    fn provider() -> ProviderSettings {
        ProviderSettings {
            authorization_endpoint: "https://accounts.example.com/authorize".to_string(),
            client_id: "releaseflow".to_string(),
            redirect_uri: "releaseflow://callback".to_string(),
            scope: "openid".to_string(),
        }
    }

    #[test]
    fn test_session_commands() {
        let (state, _tmp) = create_test_state();

        let err = establish_session(&state, "not-a-jwt", "r").expect_err("malformed");
        assert_eq!(err.code, "MALFORMED_TOKEN");

        establish_session(&state, "h.p.s", "r").expect("establish");
        record_activity(&state).expect("activity");
        let info = session_info(&state).expect("info");
        assert!(info.authenticated);
        assert!(info.last_activity_at.is_some());

        logout(&state).expect("logout");
        assert!(!session_info(&state).expect("info").authenticated);
        assert_eq!(
            record_activity(&state).expect_err("no session").code,
            "NOT_AUTHENTICATED"
        );
    }

    #[tokio::test]
    async fn test_authorization_flow() {
        let (state, _tmp) = create_test_state();
        let request = begin_authorization(&state, &provider()).expect("begin");

        let redirect = format!("releaseflow://callback?code=good-code&state={}", request.state);
        complete_authorization(&state, &redirect, &StaticExchange)
            .await
            .expect("complete");

        let info = session_info(&state).expect("info");
        assert!(info.authenticated);
        assert!(info.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_forged_redirect_is_rejected_and_logged() {
        let (state, _tmp) = create_test_state();
        begin_authorization(&state, &provider()).expect("begin");

        let err = complete_authorization(
            &state,
            "releaseflow://callback?code=good-code&state=forged",
            &StaticExchange,
        )
        .await
        .expect_err("forged");
        assert_eq!(err.code, "STATE_MISMATCH");

        let attempts = state
            .security
            .logger()
            .entries_of_type(releaseflow_audit::SecurityEventType::Authentication);
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].details["success"], "false");
    }
}
