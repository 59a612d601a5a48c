//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "appx.toml",
    "./config/config.toml",
    "/etc/appx/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with a custom variable source.
    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file(&lookup) {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, &lookup);
        config.validate()?;

        Ok(config)
    }

    fn find_config_file<F>(&self, lookup: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
            warn!(?path, "Configured file not found, searching default locations");
        }

        if let Some(path) = lookup("APPX_CONFIG").map(PathBuf::from) {
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_overrides<F>(config: &mut AppConfig, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(val) = lookup("APPX_HTTP_HOST") {
        config.http.host = val;
    }
    if let Some(port) = lookup("APPX_HTTP_PORT").and_then(|v| v.parse().ok()) {
        config.http.port = port;
    }
    if let Some(val) = lookup("APPX_CORS_ORIGINS") {
        config.http.cors_origins = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    // Identity provider
    if let Some(val) = lookup("APPX_IDP_SERVER_URL") {
        config.identity_provider.server_url = val;
    }
    if let Some(val) = lookup("APPX_IDP_REALM") {
        config.identity_provider.realm = val;
    }
    if let Some(val) = lookup("APPX_IDP_CLIENT_ID") {
        config.identity_provider.client_id = val;
    }
    if let Some(val) = lookup("APPX_IDP_CLIENT_SECRET") {
        config.identity_provider.client_secret = val;
    }
    if let Some(secs) = lookup("APPX_IDP_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        config.identity_provider.request_timeout_secs = secs;
    }
    if let Some(size) = lookup("APPX_IDP_USER_PAGE_SIZE").and_then(|v| v.parse().ok()) {
        config.identity_provider.user_page_size = size;
    }

    // Resource server
    if let Some(val) = lookup("APPX_ISSUER_URI") {
        config.resource_server.issuer_uri = val;
    }
    if let Some(val) = lookup("APPX_AUDIENCE") {
        config.resource_server.audience = val;
    }
    if let Some(val) = lookup("APPX_ROLES_CLIENT_ID") {
        config.resource_server.roles_client_id = val;
    }
    if let Some(ttl) = lookup("APPX_JWKS_CACHE_TTL_SECS").and_then(|v| v.parse().ok()) {
        config.resource_server.jwks_cache_ttl_secs = ttl;
    }
}
