//! Bearer token validation contract

use async_trait::async_trait;
use thiserror::Error;

use super::principal::Principal;

/// Why a bearer token was rejected. Never shown to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token expired")]
    Expired,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token signature does not match any trusted key")]
    SignatureMismatch,

    #[error("Token issued by an untrusted issuer")]
    UnknownIssuer,

    #[error("Signing keys unavailable: {0}")]
    KeysUnavailable(String),
}

/// Turns a raw bearer token into a validated principal.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, raw_token: &str) -> Result<Principal, AuthError>;
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively; an empty token yields `None`.
pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
