//! OIDC bearer token validation
//!
//! Validates JWT access tokens against the signing keys the issuer publishes:
//! - Discovery via `{issuer}/.well-known/openid-configuration`
//! - JWKS cached for a configurable TTL
//! - One forced JWKS refresh when a token names an unknown key (key rotation)
//! - Signature, issuer, expiry and not-before checks; audience only when configured

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::principal::Principal;
use super::token_validator::{AuthError, TokenValidator};
use crate::idp::KeycloakAccessClaims;

const ACCEPTED_ALGORITHMS: &[Algorithm] = &[
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::ES256,
    Algorithm::ES384,
];

/// Token validation settings
#[derive(Debug, Clone)]
pub struct OidcValidatorConfig {
    /// Expected `iss` claim, also the discovery base
    pub issuer: String,
    /// Expected `aud` claim; `None` skips the audience check
    pub audience: Option<String>,
    /// Client whose `resource_access` roles are merged into the principal
    pub roles_client_id: String,
    pub jwks_cache_ttl: Duration,
    /// Forced refreshes closer together than this reuse the cached key set
    pub min_refresh_interval: Duration,
    /// Timeout for discovery and JWKS requests
    pub request_timeout: Duration,
}

impl OidcValidatorConfig {
    pub fn new(issuer: impl Into<String>, roles_client_id: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: None,
            roles_client_id: roles_client_id.into(),
            jwks_cache_ttl: Duration::from_secs(3600),
            min_refresh_interval: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_audience(mut self, audience: Option<String>) -> Self {
        self.audience = audience;
        self
    }

    pub fn with_jwks_cache_ttl(mut self, ttl: Duration) -> Self {
        self.jwks_cache_ttl = ttl;
        self
    }

    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct OidcDiscovery {
    jwks_uri: String,
}

/// JWKS (JSON Web Key Set)
#[derive(Debug, Clone, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kty: String,
    kid: Option<String>,
    #[serde(rename = "use")]
    key_use: Option<String>,
    n: Option<String>,
    e: Option<String>,
    x: Option<String>,
    y: Option<String>,
}

impl Jwk {
    fn is_signing_key(&self) -> bool {
        self.key_use.as_deref().map_or(true, |u| u == "sig")
    }

    fn decoding_key(&self) -> Result<DecodingKey, AuthError> {
        let missing = |part: &str| {
            AuthError::KeysUnavailable(format!("{} key missing '{}'", self.kty, part))
        };
        match self.kty.as_str() {
            "RSA" => {
                let n = self.n.as_deref().ok_or_else(|| missing("n"))?;
                let e = self.e.as_deref().ok_or_else(|| missing("e"))?;
                DecodingKey::from_rsa_components(n, e)
                    .map_err(|e| AuthError::KeysUnavailable(format!("invalid RSA key: {}", e)))
            }
            "EC" => {
                let x = self.x.as_deref().ok_or_else(|| missing("x"))?;
                let y = self.y.as_deref().ok_or_else(|| missing("y"))?;
                DecodingKey::from_ec_components(x, y)
                    .map_err(|e| AuthError::KeysUnavailable(format!("invalid EC key: {}", e)))
            }
            other => Err(AuthError::KeysUnavailable(format!("unsupported key type: {}", other))),
        }
    }
}

struct CachedJwks {
    jwks: Jwks,
    fetched_at: Instant,
}

/// OIDC validator with JWKS caching
pub struct OidcTokenValidator {
    config: OidcValidatorConfig,
    jwks_cache: RwLock<Option<CachedJwks>>,
    http_client: reqwest::Client,
}

impl OidcTokenValidator {
    pub fn new(config: OidcValidatorConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            jwks_cache: RwLock::new(None),
            http_client,
        }
    }

    async fn fetch_jwks(&self) -> Result<Jwks, AuthError> {
        let discovery_url = format!(
            "{}/.well-known/openid-configuration",
            self.config.issuer.trim_end_matches('/')
        );
        debug!(url = %discovery_url, "Fetching OIDC discovery document");
        let discovery: OidcDiscovery = self.get_json(&discovery_url).await?;

        debug!(jwks_uri = %discovery.jwks_uri, "Fetching JWKS");
        self.get_json(&discovery.jwks_uri).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, AuthError> {
        let response = self
            .http_client
            .get(url)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| AuthError::KeysUnavailable(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AuthError::KeysUnavailable(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| {
                AuthError::KeysUnavailable(format!("invalid response from {}: {}", url, e))
            })
    }

    /// Get JWKS, using cache if valid
    async fn get_jwks(&self) -> Result<Jwks, AuthError> {
        {
            let cache = self.jwks_cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.fetched_at.elapsed() < self.config.jwks_cache_ttl {
                    return Ok(cached.jwks.clone());
                }
            }
        }
        self.refresh_jwks().await
    }

    /// Replace the cached key set unless it was fetched moments ago.
    ///
    /// The network fetch runs without holding the cache lock; the write lock is only
    /// taken to swap in the result.
    async fn refresh_jwks(&self) -> Result<Jwks, AuthError> {
        let started = Instant::now();
        {
            let cache = self.jwks_cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.fetched_at.elapsed() < self.config.min_refresh_interval {
                    return Ok(cached.jwks.clone());
                }
            }
        }

        let jwks = self.fetch_jwks().await?;

        let mut cache = self.jwks_cache.write().await;
        if let Some(ref cached) = *cache {
            // a concurrent refresh finished while this one was in flight
            if cached.fetched_at >= started {
                return Ok(cached.jwks.clone());
            }
        }
        info!(keys = jwks.keys.len(), "JWKS cache refreshed");
        *cache = Some(CachedJwks {
            jwks: jwks.clone(),
            fetched_at: Instant::now(),
        });
        Ok(jwks)
    }

    fn find_key<'a>(jwks: &'a Jwks, kid: Option<&str>) -> Option<&'a Jwk> {
        match kid {
            Some(kid) => jwks.keys.iter().find(|k| k.kid.as_deref() == Some(kid)),
            None => jwks.keys.iter().find(|k| k.is_signing_key()),
        }
    }

    async fn resolve_key(&self, kid: Option<&str>) -> Result<DecodingKey, AuthError> {
        let jwks = self.get_jwks().await?;
        if let Some(jwk) = Self::find_key(&jwks, kid) {
            return jwk.decoding_key();
        }

        debug!(kid = ?kid, "Unknown signing key, refreshing JWKS");
        let jwks = self.refresh_jwks().await?;
        match Self::find_key(&jwks, kid) {
            Some(jwk) => jwk.decoding_key(),
            None => Err(AuthError::SignatureMismatch),
        }
    }

    fn validation_for(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        match &self.config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        validation
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature => AuthError::SignatureMismatch,
        ErrorKind::InvalidIssuer => AuthError::UnknownIssuer,
        _ => AuthError::Malformed(err.to_string()),
    }
}

#[async_trait]
impl TokenValidator for OidcTokenValidator {
    async fn validate(&self, raw_token: &str) -> Result<Principal, AuthError> {
        let header = decode_header(raw_token).map_err(|e| AuthError::Malformed(e.to_string()))?;
        if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
            return Err(AuthError::Malformed(format!("algorithm {:?} not accepted", header.alg)));
        }

        let key = self.resolve_key(header.kid.as_deref()).await?;
        let validation = self.validation_for(header.alg);
        let token_data = decode::<KeycloakAccessClaims>(raw_token, &key, &validation)
            .map_err(map_jwt_error)?;

        let claims = token_data.claims;
        let roles = claims.roles_for(&self.config.roles_client_id);
        debug!(sub = %claims.sub, roles = roles.len(), "Token validated");

        Ok(Principal {
            subject: claims.sub,
            username: claims.preferred_username,
            roles,
            authenticated: true,
        })
    }
}

/// Log why a token was rejected; the caller only ever sees a 401.
pub(crate) fn log_rejection(err: &AuthError) {
    match err {
        AuthError::KeysUnavailable(reason) => {
            warn!(reason = %reason, "Token rejected: signing keys unavailable")
        }
        other => debug!(reason = %other, "Token rejected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwk(kid: Option<&str>, key_use: Option<&str>) -> Jwk {
        Jwk {
            kty: "RSA".to_string(),
            kid: kid.map(String::from),
            key_use: key_use.map(String::from),
            n: Some("AQAB".to_string()),
            e: Some("AQAB".to_string()),
            x: None,
            y: None,
        }
    }

    #[test]
    fn test_find_key_by_kid() {
        let jwks = Jwks {
            keys: vec![jwk(Some("enc-key"), Some("enc")), jwk(Some("sig-key"), Some("sig"))],
        };
        let key = OidcTokenValidator::find_key(&jwks, Some("sig-key")).unwrap();
        assert_eq!(key.kid.as_deref(), Some("sig-key"));
        assert!(OidcTokenValidator::find_key(&jwks, Some("missing")).is_none());
    }

    #[test]
    fn test_find_key_without_kid_skips_encryption_keys() {
        let jwks = Jwks {
            keys: vec![jwk(Some("enc-key"), Some("enc")), jwk(Some("sig-key"), None)],
        };
        let key = OidcTokenValidator::find_key(&jwks, None).unwrap();
        assert_eq!(key.kid.as_deref(), Some("sig-key"));
    }

    #[test]
    fn test_unsupported_key_type() {
        let mut key = jwk(Some("k"), None);
        key.kty = "oct".to_string();
        assert!(matches!(key.decoding_key(), Err(AuthError::KeysUnavailable(_))));

        let mut key = jwk(Some("k"), None);
        key.n = None;
        assert!(matches!(key.decoding_key(), Err(AuthError::KeysUnavailable(_))));
    }

    #[test]
    fn test_jwt_error_mapping() {
        assert_eq!(map_jwt_error(ErrorKind::ExpiredSignature.into()), AuthError::Expired);
        assert_eq!(map_jwt_error(ErrorKind::InvalidSignature.into()), AuthError::SignatureMismatch);
        assert_eq!(map_jwt_error(ErrorKind::InvalidIssuer.into()), AuthError::UnknownIssuer);
        assert!(matches!(map_jwt_error(ErrorKind::InvalidToken.into()), AuthError::Malformed(_)));
        assert!(matches!(
            map_jwt_error(ErrorKind::InvalidAudience.into()),
            AuthError::Malformed(_)
        ));
    }

    #[test]
    fn test_validation_without_audience() {
        let validator = OidcTokenValidator::new(
            OidcValidatorConfig::new("https://kc.example.com/realms/appx-realm", "appx-backend"),
            reqwest::Client::new(),
        );
        let validation = validator.validation_for(Algorithm::RS256);
        assert!(!validation.validate_aud);
        assert!(validation.validate_exp);
        assert!(validation.validate_nbf);
    }
}
