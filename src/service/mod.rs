//! # Session Service
//!
//! The caller-facing layer: an authenticated session and its collaborators.
//!
//! ## Components
//! - **Session**: init, signed calls and the high-level operations
//! - **Auth**: identity provider hook
//! - **Feed**: observer that receives every decoded reply

pub mod auth;
pub mod feed;
pub mod session;

pub use auth::{AuthProvider, StaticTokenProvider};
pub use feed::{ChannelFeed, FeedItem, FeedSink, NullFeed};
pub use session::{Session, SessionBuilder, TicketState};
