//! HTTP API assembly
//!
//! Routes, shared handler state, OpenAPI document and the outer layers
//! (CORS, request tracing).

pub mod data;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::{AuthState, TokenValidator};
use crate::directory::{DirectoryAggregator, DirectoryState, UserRecord};
use crate::shared::api_common::ErrorResponse;
use crate::shared::health_api::{
    self, HealthResponse, HealthState, HealthStatus, SimpleHealthResponse,
};

/// State shared by all API handlers, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub directory: DirectoryState,
}

impl AppState {
    pub fn new(validator: Arc<dyn TokenValidator>, aggregator: Arc<DirectoryAggregator>) -> Self {
        Self {
            auth: AuthState::new(validator),
            directory: DirectoryState { aggregator },
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for DirectoryState {
    fn from_ref(state: &AppState) -> Self {
        state.directory.clone()
    }
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "APPX Backend",
        description = "Role-protected data endpoints and realm user directory"
    ),
    paths(
        data::public_data,
        data::secure_data,
        data::admin_data,
        crate::directory::api::list_users,
        health_api::health,
        health_api::liveness,
        health_api::readiness,
    ),
    components(schemas(
        UserRecord,
        ErrorResponse,
        HealthResponse,
        SimpleHealthResponse,
        HealthStatus
    )),
    modifiers(&BearerSecurity),
    tags(
        (name = "data", description = "Informational endpoints"),
        (name = "admin", description = "Endpoints requiring the APPX-Admin role"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Data and directory routes
pub fn platform_router(state: AppState) -> Router {
    Router::new()
        .route("/api/public/data", get(data::public_data))
        .route("/api/secure/data", get(data::secure_data))
        .route("/api/admin/data", get(data::admin_data))
        .route("/api/admin/users", get(crate::directory::api::list_users))
        .with_state(state)
}

/// CORS for the configured browser origins. Unparseable origins are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// The complete application: API routes, health probes, OpenAPI document and layers.
pub fn app(state: AppState, health: HealthState, cors_origins: &[String]) -> Router {
    Router::new()
        .merge(platform_router(state))
        .merge(health_api::health_router(health))
        .route("/api-doc/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}
