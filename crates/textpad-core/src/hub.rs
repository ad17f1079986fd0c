//! In-process event hub
//!
//! Fans tab lifecycle events out to every subscriber. Slow subscribers lag
//! and lose the oldest events instead of blocking the controller.

use tokio::sync::broadcast;

use textpad_tabs::{EventBus, TabEvent};

const DEFAULT_CAPACITY: usize = 256;

pub struct EventHub {
    sender: broadcast::Sender<TabEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TabEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for EventHub {
    fn publish(&self, event: TabEvent) {
        tracing::trace!(event = %event, "Publishing tab event");
        // No subscribers is fine
        let _ = self.sender.send(event);
    }
}
