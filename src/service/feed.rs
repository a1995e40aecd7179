//! Feed sink for decoded replies.
//!
//! Every high-level operation pushes what it decoded before returning. Pushing is
//! fire-and-forget: a sink must not block and has no way to fail the call.

use crate::core::messages::{GetInventoryResponse, GetMapObjectsResponse, GetPlayerResponse};
use tokio::sync::mpsc;
use tracing::trace;

/// A decoded reply forwarded to the sink
#[derive(Debug, Clone, PartialEq)]
pub enum FeedItem {
    Player(GetPlayerResponse),
    Inventory(GetInventoryResponse),
    MapObjects(GetMapObjectsResponse),
}

/// Observer of decoded replies
pub trait FeedSink: Send + Sync {
    fn push(&self, item: FeedItem);
}

/// Drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFeed;

impl FeedSink for NullFeed {
    fn push(&self, _item: FeedItem) {}
}

/// Forwards items to an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelFeed {
    tx: mpsc::UnboundedSender<FeedItem>,
}

impl ChannelFeed {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FeedItem>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl FeedSink for ChannelFeed {
    fn push(&self, item: FeedItem) {
        if self.tx.send(item).is_err() {
            trace!("feed receiver dropped, discarding item");
        }
    }
}
