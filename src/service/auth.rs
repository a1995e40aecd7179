//! Authentication provider hook.
//!
//! The session engine never looks at how an access token is obtained. It calls
//! [`AuthProvider::login`] once per [`Session::init`](crate::service::session::Session::init)
//! and reads the provider name and token back when building the bootstrap envelope.

use crate::error::{ProtocolError, Result};
use crate::transport::CallContext;
use async_trait::async_trait;

/// Obtains an access token from an identity provider
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Run the provider's login flow and return the fresh access token
    async fn login(&mut self, ctx: &CallContext) -> Result<String>;

    /// Provider identifier sent to the backend (e.g. "ptc", "google")
    fn provider_string(&self) -> &str;

    /// Token from the last successful login, empty before one
    fn access_token(&self) -> &str;
}

/// Provider for a token obtained out of band
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    provider: String,
    token: String,
    logged_in: bool,
}

impl StaticTokenProvider {
    pub fn new(provider: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            token: token.into(),
            logged_in: false,
        }
    }
}

#[async_trait]
impl AuthProvider for StaticTokenProvider {
    async fn login(&mut self, ctx: &CallContext) -> Result<String> {
        ctx.check()?;
        if self.token.is_empty() {
            return Err(ProtocolError::Auth("no access token configured".into()));
        }
        self.logged_in = true;
        Ok(self.token.clone())
    }

    fn provider_string(&self) -> &str {
        &self.provider
    }

    fn access_token(&self) -> &str {
        if self.logged_in {
            &self.token
        } else {
            ""
        }
    }
}
