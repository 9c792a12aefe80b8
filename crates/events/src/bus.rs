//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`ClaimEvent`]s, shared
//! via `Arc<EventBus>` across the application. Publishing never blocks
//! and never fails: with no subscribers the event is simply dropped
//! (persistence subscribes at startup, so the durable log still sees it).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use aeroclaim_core::types::DbId;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Well-known event type names.
pub mod event_types {
    pub const CLAIM_SUBMITTED: &str = "claim.submitted";
    pub const CLAIM_EVALUATED: &str = "claim.evaluated";
    pub const CLAIM_STATUS_CHANGED: &str = "claim.status_changed";
    pub const CLAIM_REOPENED: &str = "claim.reopened";
    pub const CLAIM_COMPENSATION_OVERRIDDEN: &str = "claim.compensation_overridden";
    pub const CLAIM_ANONYMIZED: &str = "claim.anonymized";
}

// ---------------------------------------------------------------------------
// ClaimEvent
// ---------------------------------------------------------------------------

/// A domain event describing something that happened to a claim.
///
/// Constructed via [`ClaimEvent::new`] and enriched with
/// [`with_actor`](ClaimEvent::with_actor) and
/// [`with_payload`](ClaimEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimEvent {
    /// Dot-separated event name, e.g. `"claim.status_changed"`.
    pub event_type: String,

    /// The claim the event concerns.
    pub claim_id: DbId,

    /// Admin id or `"system"`; `None` for events with no actor.
    pub actor: Option<String>,

    /// Event-specific data (old/new status, amounts, reasons).
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ClaimEvent {
    /// Create a new event for a claim with an empty payload.
    pub fn new(event_type: impl Into<String>, claim_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            claim_id,
            actor: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the acting admin (or `"system"`).
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Set the JSON payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Convenience constructor for a status change.
    pub fn status_changed(claim_id: DbId, from: &str, to: &str, actor: &str) -> Self {
        Self::new(event_types::CLAIM_STATUS_CHANGED, claim_id)
            .with_actor(actor)
            .with_payload(serde_json::json!({
                "from_status": from,
                "to_status": to,
            }))
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so any number of subscribers can
/// independently receive every published [`ClaimEvent`].
pub struct EventBus {
    sender: broadcast::Sender<ClaimEvent>,
}

impl EventBus {
    /// Create a bus with the given channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ClaimEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received it. A send error
    /// only means there are no subscribers, which is not a fault.
    pub fn publish(&self, event: ClaimEvent) -> usize {
        let event_type = event.event_type.clone();
        match self.sender.send(event) {
            Ok(count) => {
                tracing::debug!(event_type = %event_type, subscribers = count, "Event published");
                count
            }
            Err(_) => {
                tracing::debug!(event_type = %event_type, "Event published with no subscribers");
                0
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(ClaimEvent::status_changed(7, "submitted", "pending_review", "admin-1"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, event_types::CLAIM_STATUS_CHANGED);
        assert_eq!(event.claim_id, 7);
        assert_eq!(event.actor.as_deref(), Some("admin-1"));
        assert_eq!(event.payload["to_status"], "pending_review");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(ClaimEvent::new(event_types::CLAIM_SUBMITTED, 1)), 0);
    }

    #[tokio::test]
    async fn multiple_subscribers_each_get_every_event() {
        let bus = EventBus::default();
        let mut rx_a = bus.subscribe();
        let mut rx_b = bus.subscribe();

        assert_eq!(bus.publish(ClaimEvent::new(event_types::CLAIM_EVALUATED, 3)), 2);

        assert_eq!(rx_a.recv().await.unwrap().claim_id, 3);
        assert_eq!(rx_b.recv().await.unwrap().claim_id, 3);
    }
}
