//! Request envelope construction and positional reply access.
//!
//! Envelopes are built fresh for every call from the location and credentials
//! current at call time; nothing here is cached between calls.

use crate::config::ProtocolConstants;
use crate::core::location::Location;
use crate::core::messages::{AuthInfo, AuthTicket, AuthToken, Request, RequestEnvelope, ResponseEnvelope};
use crate::error::{ProtocolError, Result};
use prost::Message;

/// What authenticates an envelope. A ticket always wins once one is held.
#[derive(Debug, Clone, Copy)]
pub enum Credentials<'a> {
    Ticket(&'a AuthTicket),
    Token { provider: &'a str, token: &'a str },
}

/// Build an unsigned envelope around `requests`
pub fn build(
    constants: &ProtocolConstants,
    location: &Location,
    credentials: Credentials<'_>,
    requests: Vec<Request>,
) -> RequestEnvelope {
    let mut envelope = RequestEnvelope {
        status_code: constants.envelope_status,
        request_id: constants.request_id,
        requests,
        platform_requests: Vec::new(),
        latitude: location.lat,
        longitude: location.lon,
        accuracy: location.accuracy as i32,
        auth_info: None,
        auth_ticket: None,
        ms_since_last_locationfix: constants.ms_since_last_location_fix,
    };

    match credentials {
        Credentials::Ticket(ticket) => envelope.auth_ticket = Some(ticket.clone()),
        Credentials::Token { provider, token } => {
            envelope.auth_info = Some(AuthInfo {
                provider: provider.to_string(),
                token: Some(AuthToken {
                    contents: token.to_string(),
                    unknown2: constants.auth_token_unknown2,
                }),
            })
        }
    }

    envelope
}

/// Raw reply bytes answering request `index` of the batch
pub fn reply_slot(envelope: &ResponseEnvelope, index: usize) -> Result<&[u8]> {
    envelope
        .returns
        .get(index)
        .map(Vec::as_slice)
        .ok_or(ProtocolError::EmptyResponse {
            index,
            len: envelope.returns.len(),
        })
}

/// Decode reply slot `index` as `T`
pub fn decode_slot<T: Message + Default>(envelope: &ResponseEnvelope, index: usize) -> Result<T> {
    let bytes = reply_slot(envelope, index)?;
    Ok(T::decode(bytes)?)
}
