//! Caller extraction for Axum handlers.
//!
//! Resolves the `Authorization: Bearer` header into a [`Principal`]. A missing header,
//! a non-bearer scheme and a token that fails validation all produce the anonymous
//! principal; the access policy then decides what that means for the endpoint.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use super::oidc::log_rejection;
use super::policy::{enforce, EndpointClass};
use super::principal::Principal;
use super::token_validator::{extract_bearer_token, TokenValidator};
use crate::shared::error::PlatformError;

/// Token validation capability shared by all handlers
#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<dyn TokenValidator>,
}

impl AuthState {
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self { validator }
    }

    /// Principal for an optional `Authorization` header value
    pub async fn resolve(&self, authorization: Option<&str>) -> Principal {
        let Some(token) = authorization.and_then(extract_bearer_token) else {
            return Principal::anonymous();
        };

        match self.validator.validate(token).await {
            Ok(principal) => principal,
            Err(err) => {
                log_rejection(&err);
                Principal::anonymous()
            }
        }
    }
}

/// The caller of the current request
#[derive(Debug, Clone)]
pub struct Caller(pub Principal);

impl Caller {
    /// Apply the policy for `class` to this caller.
    pub fn require(&self, class: EndpointClass) -> Result<&Principal, PlatformError> {
        enforce(class, &self.0)?;
        Ok(&self.0)
    }
}

impl<S> FromRequestParts<S> for Caller
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthState::from_ref(state);
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        Ok(Caller(auth.resolve(header).await))
    }
}
