//! Authentication errors.

use releaseflow_vault::VaultError;
use thiserror::Error;

/// Errors raised by session and authorization operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token is not a three-segment JWT or its payload cannot be read
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Session has expired
    #[error("session expired")]
    SessionExpired,

    /// No session is stored
    #[error("not authenticated")]
    NotAuthenticated,

    /// Redirect `state` does not match the pending authorization
    #[error("invalid state parameter, possible CSRF attack")]
    StateMismatch,

    /// Identity provider returned an error on the redirect
    #[error("authorization failed: {error} - {description}")]
    Provider {
        /// OAuth error code
        error: String,
        /// Provider-supplied description
        description: String,
    },

    /// Redirect carried no authorization code
    #[error("no authorization code received")]
    MissingAuthorizationCode,

    /// No pending PKCE verifier to complete the exchange with
    #[error("code verifier not found")]
    MissingCodeVerifier,

    /// Authorization endpoint is not an http(s) URL
    #[error("invalid authorization endpoint: {0}")]
    InvalidEndpoint(String),

    /// Redirect URI could not be parsed
    #[error("invalid redirect: {0}")]
    InvalidRedirect(String),

    /// Token exchange collaborator failed
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// Secure storage failed
    #[error("secure storage error: {0}")]
    Vault(#[from] VaultError),
}

/// Result type for authentication operations
pub type Result<T> = std::result::Result<T, AuthError>;
