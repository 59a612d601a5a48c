//! Authentication and authorization
//!
//! - `token_validator` - bearer token contract and errors
//! - `oidc` - JWKS-backed validator for the identity provider's tokens
//! - `policy` - static endpoint access table
//! - `middleware` - caller extraction for handlers

pub mod middleware;
pub mod oidc;
pub mod policy;
pub mod principal;
pub mod token_validator;

pub use middleware::{AuthState, Caller};
pub use oidc::{OidcTokenValidator, OidcValidatorConfig};
pub use policy::{authorize, enforce, AccessRule, Decision, EndpointClass, APPX_ADMIN_ROLE};
pub use principal::Principal;
pub use token_validator::{extract_bearer_token, AuthError, TokenValidator};
