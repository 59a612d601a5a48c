//! Informational data endpoints, one per access class.

use crate::auth::{Caller, EndpointClass};
use crate::shared::api_common::ErrorResponse;
use crate::shared::error::Result;

pub const PUBLIC_DATA: &str = "This is public data";
pub const SECURED_DATA: &str = "This is secured data";
pub const ADMIN_DATA: &str = "This is admin data";

/// Public data, no token needed
#[utoipa::path(
    get,
    path = "/api/public/data",
    tag = "data",
    responses(
        (status = 200, description = "Public payload", body = String, content_type = "text/plain")
    )
)]
pub async fn public_data() -> &'static str {
    PUBLIC_DATA
}

/// Data for any authenticated caller
#[utoipa::path(
    get,
    path = "/api/secure/data",
    tag = "data",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Secured payload", body = String, content_type = "text/plain"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn secure_data(caller: Caller) -> Result<&'static str> {
    caller.require(EndpointClass::Secured)?;
    Ok(SECURED_DATA)
}

/// Data for callers holding the admin role
#[utoipa::path(
    get,
    path = "/api/admin/data",
    tag = "admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Admin payload", body = String, content_type = "text/plain"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token lacks the admin role", body = ErrorResponse)
    )
)]
pub async fn admin_data(caller: Caller) -> Result<&'static str> {
    caller.require(EndpointClass::Admin)?;
    Ok(ADMIN_DATA)
}
