//! Directory entities

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::idp::keycloak::{ClientRepresentation, UserRepresentation};

/// A user in the aggregated listing, interactive or service account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct UserRecord {
    /// Provider-assigned id
    pub id: String,
    pub username: String,
    /// Serialized as `null` when the provider has no email
    pub email: Option<String>,
}

impl From<UserRepresentation> for UserRecord {
    fn from(user: UserRepresentation) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Registered client application, only used to decide service-account lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDescriptor {
    /// Provider-internal id, the key for service-account lookups
    pub id: String,
    pub client_id: String,
    pub service_accounts_enabled: bool,
}

impl From<ClientRepresentation> for ClientDescriptor {
    fn from(client: ClientRepresentation) -> Self {
        Self {
            id: client.id,
            client_id: client.client_id,
            service_accounts_enabled: client.service_accounts_enabled.unwrap_or(false),
        }
    }
}
