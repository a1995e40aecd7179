//! # Envelope Transport
//!
//! Moves a request envelope to the backend and a response envelope back.
//!
//! ## Components
//! - **Transport**: the trait the session engine sends through
//! - **HttpTransport**: POST over HTTPS via reqwest, optional relay indirection
//! - **Relay**: JSON relay wrapper `{status, response(base64), headers}`
//! - **CallContext**: caller-owned cancellation token and deadline
//!
//! ## Contract
//! A transport returns the decoded envelope when its status is OK,
//! OK_RPC_URL_IN_RESPONSE or REDIRECT, and otherwise fails through
//! [`crate::protocol::status::accept`] with the envelope attached. It never retries.

pub mod http;
pub mod relay;

use crate::core::messages::{RequestEnvelope, ResponseEnvelope};
use crate::error::{ProtocolError, Result};
use async_trait::async_trait;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

pub use http::HttpTransport;
pub use relay::RelayEnvelope;

/// Sends envelopes to the backend
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `envelope` to `endpoint`, through the relay when `relay_id` is set
    async fn send(
        &self,
        ctx: &CallContext,
        endpoint: &str,
        envelope: &RequestEnvelope,
        relay_id: Option<&str>,
    ) -> Result<ResponseEnvelope>;

    /// Change the per-call timeout, if the transport has one
    fn set_timeout(&mut self, _timeout: Duration) {}
}

/// Caller-controlled cancellation for one or more calls.
///
/// Cloning shares the cancellation token, so cancelling any clone cancels all.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// Context with no deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::default().deadline(Instant::now() + timeout)
    }

    /// Context cancelled through an existing token
    pub fn with_token(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fail fast if the context is already done
    pub fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ProtocolError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ProtocolError::Timeout),
            _ => Ok(()),
        }
    }

    /// Drive `fut` until it completes or the context is cancelled or expires;
    /// the losing future is dropped, which aborts any in-flight I/O.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(ProtocolError::Cancelled),
                    _ = tokio::time::sleep_until(deadline.into()) => Err(ProtocolError::Timeout),
                    result = fut => result,
                }
            }
            None => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(ProtocolError::Cancelled),
                    result = fut => result,
                }
            }
        }
    }
}
