//! ReleaseFlow Auth - Session tokens and OAuth 2.0 authorization.
//!
//! [`JwtTokenManager`] stores the session in secure preferences and decides
//! whether it is still live from the last recorded activity.
//! [`OAuth2Manager`] runs the client side of the PKCE authorization code flow
//! and hands completed sessions to the token manager.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod clock;
pub mod error;
pub mod jwt;
pub mod oauth;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AuthError, Result};
pub use jwt::{JwtClaims, JwtTokenManager, SessionRecord};
pub use oauth::{
    AuthorizationRequest, AuthorizationResponse, OAuth2Manager, PkceChallenge, TokenExchange,
    TokenExchangeRequest, TokenResponse, CODE_CHALLENGE_METHOD,
};
