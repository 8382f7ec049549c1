//! Event bus for boardcast using tokio::broadcast
//!
//! Fan-out of board changes to connected push subscribers. Best-effort,
//! at-most-once: no acknowledgment, no replay, FIFO per receiver.

use crate::normalize::CanonicalEvent;
use serde_json::{json, Value};
use tokio::sync::broadcast;

/// A broadcastable board change, one variant per push channel
#[derive(Debug, Clone)]
pub enum ProxyEvent {
    /// A card was created through the gateway (upstream response body)
    TaskCreated(Value),
    /// A card was updated through the gateway (upstream response body)
    TaskUpdated(Value),
    /// A card was archived through the gateway (`{"cardId": …}`)
    TaskDeleted(Value),
    /// A board was created through the gateway (upstream response body)
    BoardCreated(Value),
    /// Raw webhook delivery, rebroadcast unmodified
    WebhookReceived(Value),
    /// Canonical event normalized from a webhook action
    BoardChanged(CanonicalEvent),
}

impl ProxyEvent {
    /// Wire channel name, unchanged from the original client protocol
    pub fn channel(&self) -> &'static str {
        match self {
            ProxyEvent::TaskCreated(_) => "taskCreated",
            ProxyEvent::TaskUpdated(_) => "taskUpdated",
            ProxyEvent::TaskDeleted(_) => "taskDeleted",
            ProxyEvent::BoardCreated(_) => "boardCreated",
            ProxyEvent::WebhookReceived(_) => "webhookEvent",
            ProxyEvent::BoardChanged(_) => "trelloEvent",
        }
    }

    /// The JSON body pushed on the channel
    pub fn payload(&self) -> Value {
        match self {
            ProxyEvent::TaskCreated(body)
            | ProxyEvent::TaskUpdated(body)
            | ProxyEvent::TaskDeleted(body)
            | ProxyEvent::BoardCreated(body)
            | ProxyEvent::WebhookReceived(body) => body.clone(),
            ProxyEvent::BoardChanged(event) => {
                serde_json::to_value(event).unwrap_or_else(|_| json!(null))
            }
        }
    }
}

/// Event bus for broadcasting proxy events
///
/// Uses tokio::broadcast for multi-consumer support; the SSE layer turns
/// each receiver into one client stream.
pub struct EventBus {
    sender: broadcast::Sender<ProxyEvent>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create with default capacity (256 events)
    pub fn default_capacity() -> Self {
        Self::new(256)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: ProxyEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive events
    pub fn subscribe(&self) -> broadcast::Receiver<ProxyEvent> {
        self.sender.subscribe()
    }

    /// Get current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::default_capacity()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
