//! HTTP envelope transport.
//!
//! One POST per call. Redirects are refused outright: the backend moving a call to
//! another host is a protocol event (REDIRECT status + api_url), never something
//! the HTTP layer should follow on its own.

use crate::config::TransportConfig;
use crate::core::messages::{RequestEnvelope, ResponseEnvelope};
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::status;
use crate::transport::relay::{self, FINAL_HOST_HEADER, RELAY_ID_HEADER};
use crate::transport::{CallContext, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use prost::Message;
use reqwest::header::{CONTENT_TYPE, HOST, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// reqwest-backed transport. Owns the connection pool and cookie jar.
pub struct HttpTransport {
    client: Client,
    relay_host: Option<Url>,
    user_agent: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let relay_host = config
            .relay_host
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| ProtocolError::ConfigError(format!("Invalid relay host: {e}")))?;

        let client = Client::builder()
            .redirect(Policy::custom(|attempt| {
                attempt.error(constants::ERR_REDIRECT_REFUSED)
            }))
            .cookie_store(config.cookie_store)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ProtocolError::Transport(format!("{}: {e}", constants::ERR_BUILD_REQUEST)))?;

        Ok(Self {
            client,
            relay_host,
            user_agent: config.user_agent.clone(),
            timeout: config.request_timeout,
        })
    }

    /// Build the outbound POST. With a relay identifier the request targets the
    /// relay, names the real endpoint in a header and overrides Host.
    pub fn build_request(
        &self,
        endpoint: &str,
        body: Vec<u8>,
        relay_id: Option<&str>,
    ) -> Result<reqwest::Request> {
        let builder = match relay_id {
            Some(id) => {
                let relay = self.relay_host.as_ref().ok_or_else(|| {
                    ProtocolError::Transport(constants::ERR_RELAY_NOT_CONFIGURED.into())
                })?;
                self.client
                    .post(relay.clone())
                    .header(RELAY_ID_HEADER, id)
                    .header(FINAL_HOST_HEADER, endpoint)
                    .header(HOST, host_header(relay))
            }
            None => self.client.post(endpoint),
        };

        builder
            .header(USER_AGENT, self.user_agent.as_str())
            .header(CONTENT_TYPE, "application/x-protobuf")
            .timeout(self.timeout)
            .body(body)
            .build()
            .map_err(|e| ProtocolError::Transport(format!("{}: {e}", constants::ERR_BUILD_REQUEST)))
    }

    async fn execute(&self, request: reqwest::Request, relayed: bool) -> Result<Bytes> {
        let response = self.client.execute(request).await.map_err(request_error)?;
        let status = response.status();

        if relayed && status == StatusCode::BAD_REQUEST {
            warn!("relay answered 400, treating it as dead");
            return Err(ProtocolError::RelayDead);
        }

        if status != StatusCode::OK {
            return Err(ProtocolError::Transport(format!(
                "Status code was {}, expected 200",
                status.as_u16()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| ProtocolError::Transport(format!("{}: {e}", constants::ERR_READ_BODY)))
    }
}

fn request_error(err: reqwest::Error) -> ProtocolError {
    if err.is_timeout() {
        ProtocolError::Timeout
    } else if err.is_redirect() {
        ProtocolError::Transport(constants::ERR_REDIRECT_REFUSED.into())
    } else {
        ProtocolError::Transport(format!("There was an error requesting the API: {err}"))
    }
}

/// `host[:port]` of the relay, as sent in the Host header
fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, ctx, envelope), fields(requests = envelope.requests.len()))]
    async fn send(
        &self,
        ctx: &CallContext,
        endpoint: &str,
        envelope: &RequestEnvelope,
        relay_id: Option<&str>,
    ) -> Result<ResponseEnvelope> {
        ctx.check()?;

        let request = self.build_request(endpoint, envelope.encode_to_vec(), relay_id)?;
        let body = ctx.run(self.execute(request, relay_id.is_some())).await?;

        let payload = match relay_id {
            Some(_) => Bytes::from(relay::unwrap(&body)?),
            None => body,
        };

        let response = ResponseEnvelope::decode(payload)?;
        debug!(
            status = response.status_code,
            returns = response.returns.len(),
            ticket = response.auth_ticket.is_some(),
            api_url = %response.api_url,
            "response envelope"
        );
        status::accept(response)
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn transport(relay: Option<&str>) -> HttpTransport {
        let config = TransportConfig {
            relay_host: relay.map(String::from),
            ..Default::default()
        };
        HttpTransport::new(&config).expect("transport")
    }

    #[test]
    fn test_direct_request_targets_endpoint() {
        let t = transport(None);
        let req = t
            .build_request("https://rpc.example/plfe/rpc", vec![1, 2], None)
            .expect("request");

        assert_eq!(req.method(), reqwest::Method::POST);
        assert_eq!(req.url().as_str(), "https://rpc.example/plfe/rpc");
        assert_eq!(req.headers()[USER_AGENT], "Niantic App");
        assert!(req.headers().get(RELAY_ID_HEADER).is_none());
        assert!(req.headers().get(FINAL_HOST_HEADER).is_none());
    }

    #[test]
    fn test_relayed_request_targets_relay() {
        let t = transport(Some("http://relay.internal:8080/"));
        let req = t
            .build_request("https://rpc.example/plfe/rpc", Vec::new(), Some("relay-7"))
            .expect("request");

        assert_eq!(req.url().host_str(), Some("relay.internal"));
        assert_eq!(req.headers()[RELAY_ID_HEADER], "relay-7");
        assert_eq!(req.headers()[FINAL_HOST_HEADER], "https://rpc.example/plfe/rpc");
        assert_eq!(req.headers()[HOST], "relay.internal:8080");
        assert_eq!(req.headers()[USER_AGENT], "Niantic App");
    }

    #[test]
    fn test_relay_id_without_relay_host_fails() {
        let t = transport(None);
        let result = t.build_request("https://rpc.example/rpc", Vec::new(), Some("r"));
        assert!(matches!(result, Err(ProtocolError::Transport(_))));
    }

    #[test]
    fn test_host_header_omits_default_port() {
        let url = Url::parse("https://relay.example/").expect("url");
        assert_eq!(host_header(&url), "relay.example");
    }
}
