//! APPX Server
//!
//! Resource server in front of a Keycloak realm:
//! - Public, secured and admin data endpoints
//! - Aggregated realm user listing for admins
//! - Health probes and OpenAPI document
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `APPX_CONFIG` | - | Path to the TOML config file |
//! | `APPX_HTTP_PORT` | `8081` | HTTP API port |
//! | `APPX_IDP_SERVER_URL` | `http://localhost:8080` | Keycloak base URL |
//! | `APPX_IDP_REALM` | `appx-realm` | Realm name |
//! | `APPX_IDP_CLIENT_ID` | `appx-backend` | Service client for the admin API |
//! | `APPX_IDP_CLIENT_SECRET` | - | Service client secret |
//! | `APPX_ISSUER_URI` | `{server_url}/realms/{realm}` | Expected token issuer |
//! | `APPX_AUDIENCE` | - | Expected token audience, unchecked when unset |
//! | `LOG_FORMAT` | `text` | `json` or `text` |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

use appx_config::{AppConfig, ConfigLoader};
use appx_platform::{
    app, AdminClientConfig, AppState, DirectoryAggregator, HealthState, KeycloakAdminClient,
    OidcTokenValidator, OidcValidatorConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    appx_common::init_logging("appx-server");

    let config = ConfigLoader::new().load()?;
    if config.identity_provider.client_secret.is_empty() {
        warn!("No client secret configured; the user listing will fail until one is set");
    }

    info!(
        issuer = %config.issuer_uri(),
        realm = %config.identity_provider.realm,
        "Starting APPX Server"
    );

    let http_client = reqwest::Client::builder().build()?;
    let state = build_state(&config, http_client);
    let app = app(
        state,
        HealthState::new(env!("CARGO_PKG_VERSION")),
        &config.http.cors_origins,
    );

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("APPX Server shutdown complete");
    Ok(())
}

fn build_state(config: &AppConfig, http_client: reqwest::Client) -> AppState {
    let idp = &config.identity_provider;

    let validator_config = OidcValidatorConfig::new(config.issuer_uri(), config.roles_client_id())
        .with_audience(config.audience())
        .with_jwks_cache_ttl(Duration::from_secs(config.resource_server.jwks_cache_ttl_secs))
        .with_request_timeout(idp.request_timeout());
    let validator = OidcTokenValidator::new(validator_config, http_client.clone());

    let admin_config =
        AdminClientConfig::new(&idp.server_url, &idp.realm, &idp.client_id, &idp.client_secret)
            .with_request_timeout(idp.request_timeout())
            .with_user_page_size(idp.user_page_size);
    let aggregator = DirectoryAggregator::new(KeycloakAdminClient::new(admin_config, http_client));

    AppState::new(Arc::new(validator), Arc::new(aggregator))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
