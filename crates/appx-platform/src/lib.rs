//! APPX Platform
//!
//! Thin backend in front of an OIDC identity provider:
//! - Bearer token validation against the provider's published keys
//! - Static role-based access policy per endpoint class
//! - Realm user directory merging interactive and service-account users
//! - Axum HTTP API wiring it together
//!
//! ## Module Organization
//!
//! - `auth` - principal, token validation, access policy, caller extraction
//! - `directory` - admin API client, aggregation, listing endpoint
//! - `idp` - identity provider endpoint layout and wire shapes
//! - `api` - routes, shared state and OpenAPI document
//! - `shared` - errors, common API types, health probes

pub mod api;
pub mod auth;
pub mod directory;
pub mod idp;
pub mod shared;

pub use api::{app, platform_router, ApiDoc, AppState};
pub use auth::{
    authorize, AuthError, Decision, EndpointClass, OidcTokenValidator, OidcValidatorConfig,
    Principal, TokenValidator, APPX_ADMIN_ROLE,
};
pub use directory::{
    AdminClientConfig, ClientDescriptor, DirectoryAggregator, DirectoryError, KeycloakAdminClient,
    UserRecord,
};
pub use shared::error::{PlatformError, Result};
pub use shared::health_api::HealthState;
