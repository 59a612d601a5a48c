//! Keycloak Adapter
//!
//! Endpoint layout, access token claims and admin API representations for the
//! Keycloak identity provider:
//! - OIDC discovery and token endpoints of a realm
//! - Realm role and client role extraction
//! - User and client representations returned by the admin REST API

use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;

/// Location of a Keycloak realm
#[derive(Debug, Clone)]
pub struct KeycloakConfig {
    /// Keycloak server URL (e.g., "https://keycloak.example.com")
    pub server_url: String,
    /// Keycloak realm name
    pub realm: String,
}

impl KeycloakConfig {
    pub fn new(server_url: impl Into<String>, realm: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            realm: realm.into(),
        }
    }

    fn base(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }

    /// Issuer of tokens minted by this realm
    pub fn issuer(&self) -> String {
        format!("{}/realms/{}", self.base(), self.realm)
    }

    pub fn token_url(&self) -> String {
        format!("{}/protocol/openid-connect/token", self.issuer())
    }

    /// Root of the realm's admin REST API
    pub fn admin_url(&self) -> String {
        format!("{}/admin/realms/{}", self.base(), self.realm)
    }

    pub fn users_url(&self) -> String {
        format!("{}/users", self.admin_url())
    }

    pub fn clients_url(&self) -> String {
        format!("{}/clients", self.admin_url())
    }

    /// `id` is the provider-internal client id, not the `clientId` name.
    pub fn service_account_user_url(&self, id: &str) -> String {
        format!("{}/clients/{}/service-account-user", self.admin_url(), id)
    }
}

/// Claims of a Keycloak access token that the resource server relies on
#[derive(Debug, Clone, Deserialize)]
pub struct KeycloakAccessClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub preferred_username: Option<String>,
    /// Realm access containing realm roles
    #[serde(default)]
    pub realm_access: Option<RealmAccess>,
    /// Client roles keyed by client id
    #[serde(default)]
    pub resource_access: HashMap<String, ClientAccess>,
    /// Flat roles claim added by a protocol mapper
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

impl KeycloakAccessClaims {
    /// Realm roles, the roles of `client_id` and any flat `roles` claim, merged.
    pub fn roles_for(&self, client_id: &str) -> BTreeSet<String> {
        let realm_roles = self.realm_access.iter().flat_map(|r| r.roles.iter());
        let client_roles = self
            .resource_access
            .get(client_id)
            .into_iter()
            .flat_map(|c| c.roles.iter());
        let flat_roles = self.roles.iter().flatten();

        realm_roles
            .chain(client_roles)
            .chain(flat_roles)
            .cloned()
            .collect()
    }
}

/// Keycloak realm access structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Keycloak client/resource access structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// OAuth2 token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// User as returned by the admin API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Client as returned by the admin API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRepresentation {
    pub id: String,
    pub client_id: String,
    #[serde(default)]
    pub service_accounts_enabled: Option<bool>,
}
