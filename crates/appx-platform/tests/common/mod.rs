//! Shared fixtures: RSA signing keys and a mock Keycloak realm.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appx_platform::{
    AdminClientConfig, AppState, DirectoryAggregator, KeycloakAdminClient, OidcTokenValidator,
    OidcValidatorConfig,
};

pub const REALM: &str = "appx-realm";
pub const CLIENT_ID: &str = "appx-backend";
pub const CLIENT_SECRET: &str = "s3cret";
pub const ADMIN_ROLE: &str = "APPX-Admin";

pub const ADMIN_USER_ID: &str = "0b6d7a3e-admin";
pub const NORMAL_USER_ID: &str = "5f1c2d9a-normal";
pub const BACKEND_CLIENT_UUID: &str = "c-8841-backend";
pub const SERVICE_ACCOUNT_ID: &str = "9e2f0c11-sa";

/// RSA key pair published in the mock JWKS under `kid`
pub struct TestKey {
    pub kid: String,
    encoding: EncodingKey,
    n: String,
    e: String,
}

impl TestKey {
    fn generate(kid: &str) -> Self {
        let private = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("generate RSA key");
        let pem = private.to_pkcs1_pem(LineEnding::LF).expect("encode RSA key");
        let encoding = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("load RSA key");

        Self {
            kid: kid.to_string(),
            encoding,
            n: URL_SAFE_NO_PAD.encode(private.n().to_bytes_be()),
            e: URL_SAFE_NO_PAD.encode(private.e().to_bytes_be()),
        }
    }

    pub fn jwk(&self) -> Value {
        json!({
            "kty": "RSA",
            "kid": self.kid,
            "use": "sig",
            "alg": "RS256",
            "n": self.n,
            "e": self.e,
        })
    }

    pub fn sign(&self, claims: &Value) -> String {
        self.sign_as(&self.kid, claims)
    }

    /// Sign with this key but name `kid` in the header.
    pub fn sign_as(&self, kid: &str, claims: &Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        encode(&header, claims, &self.encoding).expect("sign token")
    }
}

pub fn primary_key() -> &'static TestKey {
    static KEY: OnceLock<TestKey> = OnceLock::new();
    KEY.get_or_init(|| TestKey::generate("key-1"))
}

pub fn rotated_key() -> &'static TestKey {
    static KEY: OnceLock<TestKey> = OnceLock::new();
    KEY.get_or_init(|| TestKey::generate("key-2"))
}

pub fn issuer(server: &MockServer) -> String {
    format!("{}/realms/{}", server.uri(), REALM)
}

/// Access token claims as Keycloak would mint them
pub fn claims(issuer: &str, sub: &str, username: &str, realm_roles: &[&str]) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "iss": issuer,
        "sub": sub,
        "aud": "account",
        "iat": now,
        "exp": now + 300,
        "preferred_username": username,
        "realm_access": { "roles": realm_roles },
        "resource_access": { "account": { "roles": ["view-profile"] } },
    })
}

pub fn admin_token(issuer: &str) -> String {
    primary_key().sign(&claims(issuer, ADMIN_USER_ID, "adminuser", &[ADMIN_ROLE, "offline_access"]))
}

pub fn user_token(issuer: &str) -> String {
    primary_key().sign(&claims(issuer, NORMAL_USER_ID, "normaluser", &["offline_access"]))
}

/// Discovery document and JWKS for the realm
pub async fn mount_oidc(server: &MockServer, keys: &[&TestKey]) {
    let issuer = issuer(server);
    Mock::given(method("GET"))
        .and(path(format!("/realms/{}/.well-known/openid-configuration", REALM)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": issuer,
            "jwks_uri": format!("{}/protocol/openid-connect/certs", issuer),
            "token_endpoint": format!("{}/protocol/openid-connect/token", issuer),
        })))
        .mount(server)
        .await;

    mount_jwks(server, keys).await;
}

pub async fn mount_jwks(server: &MockServer, keys: &[&TestKey]) {
    let jwks: Vec<Value> = keys.iter().map(|k| k.jwk()).collect();
    Mock::given(method("GET"))
        .and(path(format!("/realms/{}/protocol/openid-connect/certs", REALM)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": jwks })))
        .mount(server)
        .await;
}

pub fn token_path() -> String {
    format!("/realms/{}/protocol/openid-connect/token", REALM)
}

pub fn users_path() -> String {
    format!("/admin/realms/{}/users", REALM)
}

pub fn clients_path() -> String {
    format!("/admin/realms/{}/clients", REALM)
}

pub fn service_account_path(client_uuid: &str) -> String {
    format!("/admin/realms/{}/clients/{}/service-account-user", REALM, client_uuid)
}

pub async fn mount_service_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "service-token",
            "expires_in": 300,
            "token_type": "Bearer",
        })))
        .mount(server)
        .await;
}

/// Two interactive users, three clients of which only the backend has a service account.
pub async fn mount_directory(server: &MockServer) {
    mount_service_token(server).await;

    Mock::given(method("GET"))
        .and(path(users_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": ADMIN_USER_ID,
                "username": "adminuser",
                "email": "admin@example.com",
                "enabled": true
            },
            {
                "id": NORMAL_USER_ID,
                "username": "normaluser",
                "email": "user@example.com",
                "enabled": true
            },
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(clients_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "c-0001-account", "clientId": "account", "serviceAccountsEnabled": false },
            { "id": BACKEND_CLIENT_UUID, "clientId": CLIENT_ID, "serviceAccountsEnabled": true },
            { "id": "c-0002-admin-cli", "clientId": "admin-cli" },
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(service_account_path(BACKEND_CLIENT_UUID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": SERVICE_ACCOUNT_ID,
            "username": "service-account-appx-backend",
            "enabled": true,
        })))
        .mount(server)
        .await;
}

pub fn admin_config(server: &MockServer) -> AdminClientConfig {
    AdminClientConfig::new(server.uri(), REALM, CLIENT_ID, CLIENT_SECRET)
        .with_request_timeout(Duration::from_secs(2))
}

pub fn aggregator(server: &MockServer) -> DirectoryAggregator {
    DirectoryAggregator::new(KeycloakAdminClient::new(admin_config(server), reqwest::Client::new()))
}

pub fn validator_config(server: &MockServer) -> OidcValidatorConfig {
    OidcValidatorConfig::new(issuer(server), CLIENT_ID).with_request_timeout(Duration::from_secs(2))
}

pub fn validator(server: &MockServer) -> OidcTokenValidator {
    OidcTokenValidator::new(validator_config(server), reqwest::Client::new())
}

/// Application state backed entirely by the mock realm
pub fn app_state(server: &MockServer) -> AppState {
    AppState::new(Arc::new(validator(server)), Arc::new(aggregator(server)))
}
