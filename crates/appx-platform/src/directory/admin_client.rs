//! Identity provider admin API client
//!
//! Authenticates with the client-credentials grant and reads users, clients and
//! service-account users of a single realm.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::DirectoryError;
use crate::idp::keycloak::{ClientRepresentation, KeycloakConfig, TokenResponse, UserRepresentation};

/// Admin API access settings
#[derive(Debug, Clone)]
pub struct AdminClientConfig {
    pub server_url: String,
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    /// Applied to every request to the identity provider
    pub request_timeout: Duration,
    pub user_page_size: u32,
}

impl AdminClientConfig {
    pub fn new(
        server_url: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            realm: realm.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            request_timeout: Duration::from_secs(5),
            user_page_size: 100,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_page_size(mut self, size: u32) -> Self {
        self.user_page_size = size.max(1);
        self
    }
}

pub struct KeycloakAdminClient {
    config: AdminClientConfig,
    keycloak: KeycloakConfig,
    http_client: reqwest::Client,
}

impl KeycloakAdminClient {
    pub fn new(config: AdminClientConfig, http_client: reqwest::Client) -> Self {
        let keycloak = KeycloakConfig::new(config.server_url.clone(), config.realm.clone());
        Self {
            config,
            keycloak,
            http_client,
        }
    }

    pub fn realm(&self) -> &str {
        &self.config.realm
    }

    /// Obtain a service token with the client-credentials grant.
    ///
    /// Each session is independent; tokens are not cached across sessions.
    pub async fn open_session(&self) -> Result<AdminSession<'_>, DirectoryError> {
        let url = self.keycloak.token_url();
        debug!(url = %url, client_id = %self.config.client_id, "Requesting admin service token");

        let request = self
            .http_client
            .post(&url)
            .timeout(self.config.request_timeout)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ]);

        let token: TokenResponse = read_json(request, "token").await?;
        Ok(AdminSession {
            client: self,
            access_token: token.access_token,
        })
    }
}

/// Admin API calls made with one service token
pub struct AdminSession<'a> {
    client: &'a KeycloakAdminClient,
    access_token: String,
}

impl AdminSession<'_> {
    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .http_client
            .get(url)
            .timeout(self.client.config.request_timeout)
            .bearer_auth(&self.access_token)
    }

    /// All interactive users of the realm, in provider order.
    pub async fn list_users(&self) -> Result<Vec<UserRepresentation>, DirectoryError> {
        let url = self.client.keycloak.users_url();
        let page_size = self.client.config.user_page_size;
        let mut users = Vec::new();
        let mut first: u32 = 0;

        loop {
            let request = self.get(&url).query(&[("first", first), ("max", page_size)]);
            let page: Vec<UserRepresentation> = read_json(request, "users").await?;
            let fetched = page.len();
            users.extend(page);

            if fetched < page_size as usize {
                break;
            }
            first += page_size;
        }

        Ok(users)
    }

    pub async fn list_clients(&self) -> Result<Vec<ClientRepresentation>, DirectoryError> {
        let request = self.get(&self.client.keycloak.clients_url());
        read_json(request, "clients").await
    }

    /// Synthetic user backing the service account of the client with internal id `id`.
    pub async fn service_account_user(
        &self,
        id: &str,
    ) -> Result<UserRepresentation, DirectoryError> {
        let request = self.get(&self.client.keycloak.service_account_user_url(id));
        read_json(request, "service-account-user").await
    }
}

/// Send a request and decode a JSON body.
///
/// Transport failures and non-success statuses are `Unavailable`; a body that does
/// not decode into `T` is `Protocol`.
async fn read_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    resource: &str,
) -> Result<T, DirectoryError> {
    let response = request
        .send()
        .await
        .map_err(|e| DirectoryError::Unavailable(format!("{} request failed: {}", resource, e)))?;

    let status = response.status();
    if !status.is_success() {
        warn!(resource = resource, status = status.as_u16(), "Identity provider rejected request");
        return Err(DirectoryError::Unavailable(format!(
            "{} request returned status {}",
            resource, status
        )));
    }

    let body = response.text().await.map_err(|e| {
        DirectoryError::Unavailable(format!("{} response not received: {}", resource, e))
    })?;

    serde_json::from_str(&body).map_err(|e| {
        DirectoryError::Protocol(format!("{} response could not be parsed: {}", resource, e))
    })
}
