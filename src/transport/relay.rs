//! Relay wrapper.
//!
//! A relay forwards the POST to the final host and answers with JSON:
//! `{"status": 200, "response": "<base64 body>", "headers": {...}}`.
//! Field names are matched case-insensitively as far as the two spellings relays
//! are known to emit (`status` / `Status`, ...).

use crate::error::{constants, ProtocolError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header carrying the relay identifier
pub const RELAY_ID_HEADER: &str = "Proxy-Id";

/// Header carrying the true destination
pub const FINAL_HOST_HEADER: &str = "Final-Host";

/// Relay response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayEnvelope {
    #[serde(alias = "Status")]
    pub status: i64,
    #[serde(alias = "Response")]
    pub response: String,
    #[serde(default, alias = "Headers", skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

impl RelayEnvelope {
    /// Wrap an upstream body the way a relay does
    pub fn wrap(status: i64, body: &[u8]) -> Self {
        Self {
            status,
            response: STANDARD.encode(body),
            headers: None,
        }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| ProtocolError::Transport(format!("{}: {e}", constants::ERR_DECODE_RELAY)))
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ProtocolError::Formatting(e.to_string()))
    }

    /// Upstream body, provided the upstream answered 200
    pub fn into_body(self) -> Result<Vec<u8>> {
        if self.status != 200 {
            return Err(ProtocolError::Transport(format!(
                "Status code was {}, expected 200",
                self.status
            )));
        }
        STANDARD
            .decode(self.response.as_bytes())
            .map_err(|e| ProtocolError::Transport(format!("{}: {e}", constants::ERR_DECODE_RELAY)))
    }
}

/// Decode a relay body down to the upstream bytes
pub fn unwrap(bytes: &[u8]) -> Result<Vec<u8>> {
    RelayEnvelope::from_json(bytes)?.into_body()
}
