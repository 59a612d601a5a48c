//! Shared infrastructure: errors, common API types, health endpoints.

pub mod api_common;
pub mod error;
pub mod health_api;

pub use api_common::ErrorResponse;
pub use error::{PlatformError, Result};
pub use health_api::{health_router, HealthState};
