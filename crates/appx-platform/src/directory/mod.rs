//! User directory: admin API client, aggregation and listing endpoint.

pub mod admin_client;
pub mod aggregator;
pub mod api;
pub mod entity;

use thiserror::Error;

pub use admin_client::{AdminClientConfig, AdminSession, KeycloakAdminClient};
pub use aggregator::DirectoryAggregator;
pub use api::DirectoryState;
pub use entity::{ClientDescriptor, UserRecord};

/// Aggregation failure. No partial listing accompanies either variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Unreachable, timed out, or rejected the request or the service credentials
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),

    /// Responded with a body that does not have the expected shape
    #[error("Identity provider protocol error: {0}")]
    Protocol(String),
}
