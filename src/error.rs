//! # Error Types
//!
//! Error handling for the signed session protocol.
//!
//! Every failure a session call can produce is a [`ProtocolError`]. The core never
//! retries and never swallows an error; all retry/backoff policy belongs to the caller.
//!
//! ## Error Categories
//! - **Transport**: network failure, unexpected HTTP status, refused redirect
//! - **RelayDead**: the relay answered 400, callers may fail over to another relay
//! - **Formatting**: serialization or encryption failed locally (non-retryable)
//! - **Response**: a reply payload could not be decoded
//! - **Status**: the backend answered with a non-success status code
//! - **NoUrl**: the bootstrap call never supplied an API URL
//! - **ChallengeShown**: the backend requires out-of-band human verification
//!
//! ## Example Usage
//! ```rust
//! use pgo_protocol::error::{ProtocolError, StatusError};
//!
//! fn describe(err: &ProtocolError) -> &'static str {
//!     match err {
//!         ProtocolError::RelayDead => "switch relay",
//!         ProtocolError::ChallengeShown { .. } => "pause automation",
//!         ProtocolError::Status { kind: StatusError::InvalidAuthToken, .. } => "re-init",
//!         _ => "give up",
//!     }
//! }
//!
//! assert_eq!(describe(&ProtocolError::RelayDead), "switch relay");
//! ```

use crate::core::messages::ResponseEnvelope;
use std::fmt;
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Transport errors
    pub const ERR_BUILD_REQUEST: &str = "Unable to create the request";
    pub const ERR_READ_BODY: &str = "Could not read response body";
    pub const ERR_DECODE_RELAY: &str = "Could not decode relay response body";
    pub const ERR_REDIRECT_REFUSED: &str = "Did not follow redirect";
    pub const ERR_RELAY_NOT_CONFIGURED: &str = "Relay identifier given but no relay host configured";

    /// Formatting errors
    pub const ERR_SIGNATURE_ENCRYPT: &str = "Could not encrypt signature";
    pub const ERR_SESSION_HASH: &str = "Could not generate session hash";
    pub const ERR_INVALID_IV: &str = "Initialization vector has the wrong length";
}

/// Classified backend status code.
///
/// Produced by [`crate::protocol::status::classify`] for every status outside the
/// success family. `Unexpected` holds raw values the schema does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusError {
    Unknown,
    BadRequest,
    InvalidRequest,
    InvalidPlatformRequest,
    Redirect,
    SessionInvalidated,
    InvalidAuthToken,
    Unexpected(i32),
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusError::Unknown => f.write_str("unknown status"),
            StatusError::BadRequest => f.write_str("bad request"),
            StatusError::InvalidRequest => f.write_str("invalid request"),
            StatusError::InvalidPlatformRequest => f.write_str("invalid platform request"),
            StatusError::Redirect => f.write_str("redirect"),
            StatusError::SessionInvalidated => f.write_str("session invalidated"),
            StatusError::InvalidAuthToken => f.write_str("invalid auth token"),
            StatusError::Unexpected(code) => write!(f, "unexpected status {code}"),
        }
    }
}

// ProtocolError is the primary error type for all session operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("rpc/client: {0}")]
    Transport(String),

    #[error("Relay is dead")]
    RelayDead,

    #[error("Formatting error: {0}")]
    Formatting(String),

    #[error("Response error: {0}")]
    Response(#[from] prost::DecodeError),

    #[error("Status error: {kind}")]
    Status {
        kind: StatusError,
        envelope: Option<Box<ResponseEnvelope>>,
    },

    #[error("Bootstrap response carried no API URL")]
    NoUrl,

    #[error("Challenge shown, manual verification required")]
    ChallengeShown { url: String },

    #[error("Empty response: reply slot {index} requested, {len} returned")]
    EmptyResponse { index: usize, len: usize },

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Timeout occurred")]
    Timeout,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProtocolError {
    /// Status error without an attached envelope
    pub fn status(kind: StatusError) -> Self {
        ProtocolError::Status {
            kind,
            envelope: None,
        }
    }

    /// Partial envelope returned alongside a classified status, if any
    pub fn envelope(&self) -> Option<&ResponseEnvelope> {
        match self {
            ProtocolError::Status { envelope, .. } => envelope.as_deref(),
            _ => None,
        }
    }

    /// Classified status kind, if this is a status error
    pub fn status_kind(&self) -> Option<StatusError> {
        match self {
            ProtocolError::Status { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether a caller could reasonably try the same call again.
    ///
    /// Informational only. Nothing inside the crate acts on it.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProtocolError::Transport(_) | ProtocolError::RelayDead | ProtocolError::Timeout
        )
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_carries_envelope() {
        let envelope = ResponseEnvelope {
            api_url: "pgorelease.example/plfe/1".into(),
            ..Default::default()
        };
        let err = ProtocolError::Status {
            kind: StatusError::BadRequest,
            envelope: Some(Box::new(envelope)),
        };

        assert_eq!(err.status_kind(), Some(StatusError::BadRequest));
        assert_eq!(
            err.envelope().map(|e| e.api_url.as_str()),
            Some("pgorelease.example/plfe/1")
        );
        assert!(ProtocolError::status(StatusError::Redirect).envelope().is_none());
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(ProtocolError::RelayDead.is_retryable());
        assert!(ProtocolError::Transport("reset".into()).is_retryable());
        assert!(!ProtocolError::Formatting("x".into()).is_retryable());
        assert!(!ProtocolError::NoUrl.is_retryable());
        assert!(!ProtocolError::Cancelled.is_retryable());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ProtocolError::status(StatusError::Unexpected(77)).to_string(),
            "Status error: unexpected status 77"
        );
        assert_eq!(
            ProtocolError::EmptyResponse { index: 5, len: 2 }.to_string(),
            "Empty response: reply slot 5 requested, 2 returned"
        );
    }
}
