//! Integration tests for configuration loading and API key resolution
//!
//! Tests that manipulate NVIDIA_API_KEY are marked with #[serial] so they do
//! not race each other on the process environment.

use serial_test::serial;
use std::env;
use std::io::Write;
use termscope_common::config::{
    load_config, resolve_api_key, ConfigSource, GatewayConfig, API_KEY_ENV_VAR,
};
use termscope_common::Error;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp config");
    file
}

#[test]
fn test_load_config_from_explicit_file() {
    let file = write_config(
        r#"
[server]
port = 8080

[gateway]
temperature = 0.1
timeout_secs = 15

[sessions]
max_sessions = 50
idle_ttl_secs = 120
"#,
    );

    let (config, source) = load_config(Some(file.path())).unwrap();

    assert_eq!(source, ConfigSource::File(file.path().to_path_buf()));
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.gateway.timeout_secs, 15);
    assert_eq!(config.sessions.max_sessions, 50);
    assert_eq!(config.sessions.idle_ttl_secs, 120);
    // Untouched sections keep their defaults
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_explicit_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = load_config(Some(&missing)).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_malformed_file_is_error() {
    let file = write_config("[server\nport = ");

    let err = load_config(Some(file.path())).unwrap_err();
    assert!(matches!(err, Error::Toml(_)));
}

#[test]
#[serial]
fn test_api_key_from_environment_wins() {
    env::set_var(API_KEY_ENV_VAR, "env-key");
    let gateway = GatewayConfig {
        api_key: Some("toml-key".to_string()),
        ..GatewayConfig::default()
    };

    assert_eq!(resolve_api_key(&gateway).unwrap(), "env-key");

    env::remove_var(API_KEY_ENV_VAR);
}

#[test]
#[serial]
fn test_api_key_falls_back_to_toml() {
    env::remove_var(API_KEY_ENV_VAR);
    let gateway = GatewayConfig {
        api_key: Some("  toml-key  ".to_string()),
        ..GatewayConfig::default()
    };

    assert_eq!(resolve_api_key(&gateway).unwrap(), "toml-key");
}

#[test]
#[serial]
fn test_whitespace_env_key_is_ignored() {
    env::set_var(API_KEY_ENV_VAR, "   ");
    let gateway = GatewayConfig {
        api_key: Some("toml-key".to_string()),
        ..GatewayConfig::default()
    };

    assert_eq!(resolve_api_key(&gateway).unwrap(), "toml-key");

    env::remove_var(API_KEY_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_api_key_is_config_error() {
    env::remove_var(API_KEY_ENV_VAR);

    let err = resolve_api_key(&GatewayConfig::default()).unwrap_err();
    match err {
        Error::Config(msg) => assert!(msg.contains(API_KEY_ENV_VAR)),
        other => panic!("expected config error, got {other:?}"),
    }
}
