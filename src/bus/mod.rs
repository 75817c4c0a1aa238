//! In-process claim notification bus.
//!
//! Uses a tokio broadcast channel for fan-out within a single process. Each
//! subscriber has its own cursor into the shared buffer: a slow subscriber
//! skips what it missed, never blocks the publisher, and never delays the
//! other subscribers. There is no replay for late subscribers.

use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::model::ClaimBroadcast;

pub mod relay;

pub use relay::{ClaimRelay, RelayHandle};

/// Default number of events buffered for slow subscribers.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Live stream of committed claims for one subscriber.
pub type ClaimStream = BoxStream<'static, Arc<ClaimBroadcast>>;

/// Fan-out of committed claims to connected officer sessions.
#[derive(Clone)]
pub struct ClaimBus {
    sender: broadcast::Sender<Arc<ClaimBroadcast>>,
}

impl Default for ClaimBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ClaimBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Hand the event to every current subscriber.
    ///
    /// Never fails. Returns how many subscribers received it.
    #[tracing::instrument(name = "bus.publish", skip_all, fields(claim_id = event.id))]
    pub fn publish(&self, event: ClaimBroadcast) -> usize {
        match self.sender.send(Arc::new(event)) {
            Ok(receivers) => {
                debug!(receivers, "Claim published");
                receivers
            }
            Err(_) => {
                debug!("Claim published with no subscribers");
                0
            }
        }
    }

    /// Subscribe to claims published from now on.
    ///
    /// Dropping the stream unsubscribes immediately.
    pub fn subscribe(&self) -> ClaimStream {
        BroadcastStream::new(self.sender.subscribe())
            .filter_map(|item| async move {
                match item {
                    Ok(event) => Some(event),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!(skipped, "Subscriber lagged, claims skipped");
                        None
                    }
                }
            })
            .boxed()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
