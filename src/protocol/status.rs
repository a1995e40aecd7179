//! Response status classification.
//!
//! Total over the status value space: codes the schema does not know classify as
//! [`StatusError::Unexpected`] instead of failing to decode or panicking.

use crate::core::messages::{ResponseEnvelope, StatusCode};
use crate::error::{ProtocolError, Result, StatusError};
use tracing::warn;

/// Map a raw envelope status to its error kind; `None` for the success family
pub fn classify(code: i32) -> Option<StatusError> {
    match StatusCode::try_from(code) {
        Ok(StatusCode::Ok) | Ok(StatusCode::OkRpcUrlInResponse) => None,
        Ok(StatusCode::Unknown) => Some(StatusError::Unknown),
        Ok(StatusCode::BadRequest) => Some(StatusError::BadRequest),
        Ok(StatusCode::InvalidRequest) => Some(StatusError::InvalidRequest),
        Ok(StatusCode::InvalidPlatformRequest) => Some(StatusError::InvalidPlatformRequest),
        Ok(StatusCode::Redirect) => Some(StatusError::Redirect),
        Ok(StatusCode::SessionInvalidated) => Some(StatusError::SessionInvalidated),
        Ok(StatusCode::InvalidAuthToken) => Some(StatusError::InvalidAuthToken),
        Err(_) => Some(StatusError::Unexpected(code)),
    }
}

/// Statuses a transport hands back as a normal reply
pub fn is_accepted(code: i32) -> bool {
    matches!(
        StatusCode::try_from(code),
        Ok(StatusCode::Ok | StatusCode::OkRpcUrlInResponse | StatusCode::Redirect)
    )
}

/// Transport-level check: pass accepted envelopes through, otherwise fail with the
/// classified status and keep the envelope attached for the caller.
pub fn accept(envelope: ResponseEnvelope) -> Result<ResponseEnvelope> {
    if is_accepted(envelope.status_code) {
        return Ok(envelope);
    }
    let kind = classify(envelope.status_code).unwrap_or(StatusError::Unknown);
    warn!(status = envelope.status_code, %kind, "backend rejected call");
    Err(ProtocolError::Status {
        kind,
        envelope: Some(Box::new(envelope)),
    })
}

/// Operation-level check after the reply slots were decoded
pub fn finish<T>(envelope: ResponseEnvelope, value: T) -> Result<T> {
    match classify(envelope.status_code) {
        None => Ok(value),
        Some(kind) => Err(ProtocolError::Status {
            kind,
            envelope: Some(Box::new(envelope)),
        }),
    }
}
