//! Configuration loader tests: file discovery and environment overrides.

use std::collections::HashMap;
use std::io::Write;

use appx_config::{ConfigError, ConfigLoader};

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_load_from_explicit_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[http]
port = 9000

[identity_provider]
server_url = "http://keycloak:8080"
realm = "appx-realm"
client_id = "appx-backend"
client_secret = "from-file"
"#
    )
    .unwrap();

    let env = vars(&[]);
    let config = ConfigLoader::with_path(file.path())
        .load_with(|key| env.get(key).cloned())
        .unwrap();

    assert_eq!(config.http.port, 9000);
    assert_eq!(config.identity_provider.client_secret, "from-file");
    assert_eq!(config.issuer_uri(), "http://keycloak:8080/realms/appx-realm");
}

#[test]
fn test_env_overrides_file_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[identity_provider]
client_secret = "from-file"
request_timeout_secs = 5
"#
    )
    .unwrap();

    let env = vars(&[
        ("APPX_IDP_CLIENT_SECRET", "from-env"),
        ("APPX_IDP_TIMEOUT_SECS", "2"),
        ("APPX_HTTP_PORT", "not-a-number"),
        ("APPX_CORS_ORIGINS", "http://a.example, http://b.example,"),
        ("APPX_ISSUER_URI", "https://issuer.example.com/realms/appx-realm"),
    ]);
    let config = ConfigLoader::with_path(file.path())
        .load_with(|key| env.get(key).cloned())
        .unwrap();

    assert_eq!(config.identity_provider.client_secret, "from-env");
    assert_eq!(config.identity_provider.request_timeout_secs, 2);
    // Unparseable numbers keep the previous value
    assert_eq!(config.http.port, 8081);
    assert_eq!(
        config.http.cors_origins,
        vec!["http://a.example".to_string(), "http://b.example".to_string()]
    );
    assert_eq!(config.issuer_uri(), "https://issuer.example.com/realms/appx-realm");
}

#[test]
fn test_config_path_from_env_variable() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[identity_provider]\nrealm = \"env-located\"").unwrap();

    let env = vars(&[("APPX_CONFIG", file.path().to_str().unwrap())]);
    let config = ConfigLoader::new()
        .load_with(|key| env.get(key).cloned())
        .unwrap();

    assert_eq!(config.identity_provider.realm, "env-located");
}

#[test]
fn test_invalid_toml_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[identity_provider\nrealm = ").unwrap();

    let env = vars(&[]);
    let result = ConfigLoader::with_path(file.path()).load_with(|key| env.get(key).cloned());
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_override_failing_validation_is_rejected() {
    let env = vars(&[("APPX_IDP_REALM", "")]);
    let result = ConfigLoader::with_path("/nonexistent/appx.toml")
        .load_with(|key| env.get(key).cloned());
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}
