//! # pgo-protocol
//!
//! Client core for a signed RPC session protocol: protobuf envelopes posted over
//! HTTPS, authenticated first by a provider token and then by a server-issued
//! ticket, with an encrypted per-call signature attached once a ticket is held.
//!
//! ## Layers
//! - [`core`]: wire messages, location encoding, cell ids
//! - [`protocol`]: envelope building, signature assembly, status classification
//! - [`transport`]: HTTP and relay transport, call cancellation
//! - [`service`]: the session engine and its pluggable collaborators
//! - [`utils`]: hashing, crypto, clocks, logging setup
//!
//! ## Example
//! ```no_run
//! use pgo_protocol::core::location::Location;
//! use pgo_protocol::service::{Session, StaticTokenProvider};
//! use pgo_protocol::transport::CallContext;
//!
//! # async fn run() -> pgo_protocol::error::Result<()> {
//! let provider = StaticTokenProvider::new("ptc", "access-token");
//! let mut session = Session::builder(provider, Location::new(40.7, -74.0, 5.0)).build()?;
//!
//! let ctx = CallContext::new();
//! session.init(&ctx, None).await?;
//! let map = session.announce(&ctx, None).await?;
//! println!("{} cells", map.map_cells.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

pub use config::SessionConfig;
pub use error::{ProtocolError, Result, StatusError};
pub use service::Session;
