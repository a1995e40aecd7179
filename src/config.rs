//! # Configuration Management
//!
//! Centralized configuration for the session client.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()` / `from_toml()`
//! - Environment variables via `from_env()`
//! - Direct instantiation with defaults
//!
//! ## Protocol Constants
//! The backend fingerprints fixed envelope and signature fields. They live in
//! [`ProtocolConstants`] instead of process-wide globals so a test or a client
//! tracking a newer app version can change them per session.

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Bootstrap RPC endpoint used until the backend hands out a session URL
pub const DEFAULT_RPC_URL: &str = "https://pgorelease.nianticlabs.com/plfe/rpc";

/// User agent sent with every RPC call
pub const RPC_USER_AGENT: &str = "Niantic App";

/// Settings hash announced with DOWNLOAD_SETTINGS
pub const DOWNLOAD_SETTINGS_HASH: &str = "05daf51635c82611d1aac95c0b051d3ec088a930";

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SessionConfig {
    /// HTTP transport configuration
    #[serde(default)]
    pub transport: TransportConfig,

    /// Fixed protocol fields
    #[serde(default)]
    pub protocol: ProtocolConstants,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SessionConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("PGO_PROTOCOL_DEFAULT_URL") {
            config.transport.default_url = url;
        }

        if let Ok(relay) = std::env::var("PGO_PROTOCOL_RELAY_HOST") {
            config.transport.relay_host = Some(relay).filter(|r| !r.is_empty());
        }

        if let Ok(timeout) = std::env::var("PGO_PROTOCOL_REQUEST_TIMEOUT_MS") {
            let val = timeout.parse::<u64>().map_err(|e| {
                ProtocolError::ConfigError(format!("Invalid PGO_PROTOCOL_REQUEST_TIMEOUT_MS: {e}"))
            })?;
            config.transport.request_timeout = Duration::from_millis(val);
        }

        if let Ok(agent) = std::env::var("PGO_PROTOCOL_USER_AGENT") {
            config.transport.user_agent = agent;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.transport.validate());
        errors.extend(self.protocol.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// RPC endpoint used before the backend assigns one
    pub default_url: String,

    /// Relay base URL; required when calls carry a relay identifier
    #[serde(default)]
    pub relay_host: Option<String>,

    /// User agent sent with every call
    pub user_agent: String,

    /// Timeout for a whole call (connect, send, receive)
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,

    /// Timeout for establishing the TCP/TLS connection
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,

    /// Keep cookies between calls for the lifetime of the transport
    pub cookie_store: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            default_url: String::from(DEFAULT_RPC_URL),
            relay_host: None,
            user_agent: String::from(RPC_USER_AGENT),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            cookie_store: true,
        }
    }
}

impl TransportConfig {
    /// Validate transport configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.default_url.is_empty() {
            errors.push("Default RPC URL cannot be empty".to_string());
        } else if reqwest::Url::parse(&self.default_url).is_err() {
            errors.push(format!("Invalid default RPC URL: '{}'", self.default_url));
        }

        if let Some(ref relay) = self.relay_host {
            match reqwest::Url::parse(relay) {
                Ok(url) if url.host_str().is_some() => {}
                _ => errors.push(format!(
                    "Invalid relay host: '{relay}' (expected format: 'http://relay:8080')"
                )),
            }
        }

        if self.user_agent.is_empty() {
            errors.push("User agent cannot be empty".to_string());
        }

        if self.request_timeout.as_millis() < 100 {
            errors.push("Request timeout too short (minimum: 100ms)".to_string());
        } else if self.request_timeout.as_secs() > 300 {
            errors.push("Request timeout too long (maximum: 300s)".to_string());
        }

        if self.connect_timeout.as_millis() < 100 {
            errors.push("Connect timeout too short (minimum: 100ms)".to_string());
        } else if self.connect_timeout > self.request_timeout {
            errors.push("Connect timeout cannot exceed request timeout".to_string());
        }

        errors
    }
}

/// Fixed fields the backend expects in envelopes and signatures
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProtocolConstants {
    /// Request id stamped on every envelope
    pub request_id: u64,
    /// Envelope status marker
    pub envelope_status: i32,
    pub ms_since_last_location_fix: i64,
    /// Second field of the raw credential token
    pub auth_token_unknown2: i32,
    /// Seed for every signature hash chain
    pub hash_seed: u32,
    pub signature_unknown25: i64,
    /// Hash announced with DOWNLOAD_SETTINGS
    pub settings_hash: String,
    pub fix_altitude: f32,
    pub fix_provider_status: u64,
    pub fix_location_type: u64,
    pub sensor_magnetic_accuracy: i32,
    pub sensor_status: i32,
    /// Cell level used for map queries
    pub cell_level: u8,
    /// Neighbour cells walked on each side of the origin cell
    pub cell_radius: usize,
}

impl Default for ProtocolConstants {
    fn default() -> Self {
        Self {
            request_id: 8_145_806_132_888_207_460,
            envelope_status: 2,
            ms_since_last_location_fix: 989,
            auth_token_unknown2: 59,
            hash_seed: 0x6124_7FBF,
            signature_unknown25: -8_408_506_833_887_075_802,
            settings_hash: String::from(DOWNLOAD_SETTINGS_HASH),
            fix_altitude: 4.0,
            fix_provider_status: 3,
            fix_location_type: 1,
            sensor_magnetic_accuracy: 1,
            sensor_status: 3,
            cell_level: 15,
            cell_radius: 10,
        }
    }
}

impl ProtocolConstants {
    /// Validate protocol constants
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.settings_hash.len() != 40
            || !self.settings_hash.chars().all(|c| c.is_ascii_hexdigit())
        {
            errors.push(format!(
                "Settings hash must be 40 hex characters, got '{}'",
                self.settings_hash
            ));
        }

        if self.cell_level == 0 || self.cell_level > crate::core::cell::MAX_LEVEL {
            errors.push(format!(
                "Invalid cell level: {} (valid range: 1-30)",
                self.cell_level
            ));
        }

        if self.cell_radius > 100 {
            errors.push(format!(
                "Cell radius too large: {} (maximum: 100)",
                self.cell_radius
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("pgo-protocol"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
