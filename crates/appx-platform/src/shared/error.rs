//! Platform Error Types

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::error;

use crate::directory::DirectoryError;
use crate::shared::api_common::ErrorResponse;

/// Errors surfaced by the HTTP layer.
///
/// The rendered body never says why a token was rejected or which role was missing,
/// and upstream failures are reported as a single opaque signal.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Access denied")]
    Forbidden,

    #[error("Identity provider unavailable: {message}")]
    UpstreamUnavailable { message: String },

    #[error("Identity provider returned an unexpected response: {message}")]
    UpstreamProtocol { message: String },
}

impl PlatformError {
    pub fn status(&self) -> StatusCode {
        match self {
            PlatformError::Unauthenticated => StatusCode::UNAUTHORIZED,
            PlatformError::Forbidden => StatusCode::FORBIDDEN,
            PlatformError::UpstreamUnavailable { .. } | PlatformError::UpstreamProtocol { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    fn public_body(&self) -> ErrorResponse {
        let (code, message) = match self {
            PlatformError::Unauthenticated => ("UNAUTHORIZED", "Authentication required"),
            PlatformError::Forbidden => ("FORBIDDEN", "Access denied"),
            PlatformError::UpstreamUnavailable { .. } | PlatformError::UpstreamProtocol { .. } => {
                ("UPSTREAM_ERROR", "Identity provider unavailable")
            }
        };
        ErrorResponse::new(code, message)
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

impl From<DirectoryError> for PlatformError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Unavailable(message) => PlatformError::UpstreamUnavailable { message },
            DirectoryError::Protocol(message) => PlatformError::UpstreamProtocol { message },
        }
    }
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let mut response = (status, Json(self.public_body())).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"appx\""),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(PlatformError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(PlatformError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            PlatformError::from(DirectoryError::Unavailable("down".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            PlatformError::from(DirectoryError::Protocol("bad json".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_upstream_detail_is_not_exposed() {
        let err = PlatformError::from(DirectoryError::Protocol("secret internal detail".into()));
        let body = err.public_body();
        assert_eq!(body.error, "UPSTREAM_ERROR");
        assert!(!body.message.contains("secret"));
    }

    #[test]
    fn test_unauthorized_carries_bearer_challenge() {
        let response = PlatformError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_some());

        let response = PlatformError::Forbidden.into_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
