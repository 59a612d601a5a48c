//! Admin user listing API

use std::sync::Arc;

use axum::{extract::State, Json};

use super::aggregator::DirectoryAggregator;
use super::entity::UserRecord;
use crate::auth::{Caller, EndpointClass};
use crate::shared::api_common::ErrorResponse;
use crate::shared::error::Result;

#[derive(Clone)]
pub struct DirectoryState {
    pub aggregator: Arc<DirectoryAggregator>,
}

/// List interactive and service-account users of the realm
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Aggregated user listing", body = [UserRecord]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token lacks the admin role", body = ErrorResponse),
        (status = 502, description = "Identity provider unavailable", body = ErrorResponse)
    )
)]
pub async fn list_users(
    caller: Caller,
    State(state): State<DirectoryState>,
) -> Result<Json<Vec<UserRecord>>> {
    caller.require(EndpointClass::Admin)?;
    let users = state.aggregator.list_all_users().await?;
    Ok(Json(users))
}
