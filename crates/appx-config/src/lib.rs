//! APPX Configuration System
//!
//! TOML-based configuration with environment variable override support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub identity_provider: IdentityProviderConfig,
    pub resource_server: ResourceServerConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Identity provider admin API access, used by the directory aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityProviderConfig {
    /// Base URL of the identity provider (e.g. "http://localhost:8080")
    pub server_url: String,
    pub realm: String,
    /// Client used for the client-credentials grant
    pub client_id: String,
    pub client_secret: String,
    /// Timeout applied to every call to the identity provider
    pub request_timeout_secs: u64,
    /// Page size used when listing realm users
    pub user_page_size: u32,
}

impl Default for IdentityProviderConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            realm: "appx-realm".to_string(),
            client_id: "appx-backend".to_string(),
            client_secret: String::new(),
            request_timeout_secs: 5,
            user_page_size: 100,
        }
    }
}

impl IdentityProviderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Bearer token validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceServerConfig {
    /// Expected `iss` claim. Empty means `{server_url}/realms/{realm}`.
    pub issuer_uri: String,
    /// Expected `aud` claim. Empty disables audience validation.
    pub audience: String,
    /// Client whose `resource_access` roles are merged into the principal.
    /// Empty means the identity provider `client_id`.
    pub roles_client_id: String,
    pub jwks_cache_ttl_secs: u64,
}

impl Default for ResourceServerConfig {
    fn default() -> Self {
        Self {
            issuer_uri: String::new(),
            audience: String::new(),
            roles_client_id: String::new(),
            jwks_cache_ttl_secs: 3600,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Issuer the token validator trusts
    pub fn issuer_uri(&self) -> String {
        if self.resource_server.issuer_uri.is_empty() {
            format!(
                "{}/realms/{}",
                self.identity_provider.server_url.trim_end_matches('/'),
                self.identity_provider.realm
            )
        } else {
            self.resource_server.issuer_uri.clone()
        }
    }

    pub fn audience(&self) -> Option<String> {
        match self.resource_server.audience.trim() {
            "" => None,
            aud => Some(aud.to_string()),
        }
    }

    pub fn roles_client_id(&self) -> String {
        if self.resource_server.roles_client_id.is_empty() {
            self.identity_provider.client_id.clone()
        } else {
            self.resource_server.roles_client_id.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let idp = &self.identity_provider;
        if idp.server_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "identity_provider.server_url is required".into(),
            ));
        }
        if idp.realm.trim().is_empty() {
            return Err(ConfigError::ValidationError("identity_provider.realm is required".into()));
        }
        if idp.client_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "identity_provider.client_id is required".into(),
            ));
        }
        if idp.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "identity_provider.request_timeout_secs must be greater than zero".into(),
            ));
        }
        if idp.user_page_size == 0 {
            return Err(ConfigError::ValidationError(
                "identity_provider.user_page_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# APPX Backend Configuration
# Environment variables (APPX_*) override these settings

[http]
host = "0.0.0.0"
port = 8081
cors_origins = ["http://localhost:3000"]

[identity_provider]
server_url = "http://localhost:8080"
realm = "appx-realm"
client_id = "appx-backend"
client_secret = ""
request_timeout_secs = 5
user_page_size = 100

[resource_server]
# Defaults to {server_url}/realms/{realm}
issuer_uri = ""
# Leave empty to skip audience validation
audience = ""
# Defaults to identity_provider.client_id
roles_client_id = ""
jwks_cache_ttl_secs = 3600
"#
        .to_string()
    }
}
