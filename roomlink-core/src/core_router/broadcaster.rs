//! Event broadcasting
//!
//! Publish/subscribe surface for outward notifications. Held by composition
//! wherever notifications are emitted; subscribers receive each published
//! event at most once, in publish order.

use super::events::RemoteControlEvent;
use tokio::sync::broadcast;

/// Broadcaster for host notifications
#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<RemoteControlEvent>,
}

impl EventBroadcaster {
    /// Create a new broadcaster
    ///
    /// # Arguments
    /// * `capacity` - Channel capacity (number of events buffered per
    ///   subscriber before lagging)
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers
    ///
    /// # Returns
    /// Number of active subscribers that received the event
    pub fn emit(&self, event: RemoteControlEvent) -> usize {
        match self.tx.send(event) {
            Ok(count) => count,
            Err(_) => 0, // No active receivers
        }
    }

    /// Subscribe to notifications
    pub fn subscribe(&self) -> broadcast::Receiver<RemoteControlEvent> {
        self.tx.subscribe()
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
