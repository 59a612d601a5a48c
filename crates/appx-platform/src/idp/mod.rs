//! Identity Provider Adapters
//!
//! Provider-specific endpoint layout, claim shapes and admin API representations.

pub mod keycloak;

pub use keycloak::{KeycloakAccessClaims, KeycloakConfig};
