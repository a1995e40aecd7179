//! Integration tests for configuration validation

#![allow(clippy::expect_used)]

use pgo_protocol::config::{
    LoggingConfig, ProtocolConstants, SessionConfig, TransportConfig, DEFAULT_RPC_URL,
};
use pgo_protocol::error::ProtocolError;
use std::time::Duration;
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = SessionConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
}

#[test]
fn test_invalid_default_url() {
    let mut config = SessionConfig::default();
    config.transport.default_url = "not a url".to_string();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Invalid default RPC URL")));
}

#[test]
fn test_empty_default_url() {
    let mut config = SessionConfig::default();
    config.transport.default_url = String::new();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("cannot be empty")));
}

#[test]
fn test_relay_host_must_be_url() {
    let mut config = SessionConfig::default();
    config.transport.relay_host = Some("relay:8080".to_string());
    assert!(config
        .validate()
        .iter()
        .any(|e| e.contains("Invalid relay host")));

    config.transport.relay_host = Some("http://relay.internal:8080".to_string());
    assert!(config.validate().is_empty());
}

#[test]
fn test_request_timeout_bounds() {
    let mut config = SessionConfig::default();
    config.transport.request_timeout = Duration::from_millis(50);
    assert!(config.validate().iter().any(|e| e.contains("too short")));

    config.transport.request_timeout = Duration::from_secs(600);
    assert!(config.validate().iter().any(|e| e.contains("too long")));
}

#[test]
fn test_connect_timeout_exceeds_request_timeout() {
    let transport = TransportConfig {
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(10),
        ..Default::default()
    };

    let errors = transport.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Connect timeout cannot exceed request timeout")));
}

#[test]
fn test_settings_hash_must_be_hex() {
    let constants = ProtocolConstants {
        settings_hash: "xyz".to_string(),
        ..Default::default()
    };
    assert!(constants
        .validate()
        .iter()
        .any(|e| e.contains("Settings hash must be 40 hex characters")));
}

#[test]
fn test_cell_level_range() {
    let mut constants = ProtocolConstants {
        cell_level: 0,
        ..Default::default()
    };
    assert!(constants.validate().iter().any(|e| e.contains("Invalid cell level")));

    constants.cell_level = 31;
    assert!(constants.validate().iter().any(|e| e.contains("Invalid cell level")));

    constants.cell_level = 30;
    assert!(constants.validate().is_empty());
}

#[test]
fn test_excessive_cell_radius() {
    let constants = ProtocolConstants {
        cell_radius: 1_000,
        ..Default::default()
    };
    assert!(constants
        .validate()
        .iter()
        .any(|e| e.contains("Cell radius too large")));
}

#[test]
fn test_empty_app_name() {
    let logging = LoggingConfig {
        app_name: String::new(),
        log_level: Level::DEBUG,
        json_format: true,
    };
    assert!(logging
        .validate()
        .iter()
        .any(|e| e.contains("Application name cannot be empty")));
}

#[test]
fn test_multiple_errors_collected() {
    let mut config = SessionConfig::default();
    config.transport.user_agent = String::new();
    config.protocol.cell_level = 0;
    config.logging.app_name = String::new();

    let errors = config.validate();
    assert!(errors.len() >= 3, "Expected 3+ errors, got {:?}", errors);
}

#[test]
fn test_validate_strict_returns_config_error() {
    let config = SessionConfig::default_with_overrides(|c| {
        c.transport.user_agent = String::new();
    });
    match config.validate_strict() {
        Err(ProtocolError::ConfigError(msg)) => assert!(msg.contains("User agent")),
        other => panic!("Expected ConfigError, got {:?}", other),
    }
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let toml = r#"
        [transport]
        relay_host = "http://relay.internal:8080"
        request_timeout = 5000

        [protocol]
        cell_radius = 4
    "#;

    let config = SessionConfig::from_toml(toml).expect("parse");
    assert_eq!(
        config.transport.relay_host.as_deref(),
        Some("http://relay.internal:8080")
    );
    assert_eq!(config.transport.request_timeout, Duration::from_millis(5000));
    assert_eq!(config.transport.default_url, DEFAULT_RPC_URL);
    assert_eq!(config.protocol.cell_radius, 4);
    assert_eq!(config.protocol.cell_level, 15);
    assert_eq!(config.protocol.request_id, 8_145_806_132_888_207_460);
    assert!(config.validate().is_empty());
}

#[test]
fn test_example_config_parses_back() {
    let example = SessionConfig::example_config();
    let parsed = SessionConfig::from_toml(&example).expect("example config");
    assert_eq!(parsed.protocol, ProtocolConstants::default());
}

#[test]
fn test_malformed_toml_is_config_error() {
    let result = SessionConfig::from_toml("[transport\nrelay_host = ");
    assert!(matches!(result, Err(ProtocolError::ConfigError(_))));
}
