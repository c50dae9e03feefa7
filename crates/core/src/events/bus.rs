use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::SyncEvent;

/// In-process event bus backed by `tokio::broadcast`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<SyncEvent>>,
}

impl EventBus {
    /// Create a new event bus. Slow subscribers lag once `capacity` events
    /// are queued; a zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Having no subscribers is not an error; the event is simply dropped.
    pub fn publish(&self, event: SyncEvent) -> usize {
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::trace!(delivered, "sync event published");
        delivered
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
