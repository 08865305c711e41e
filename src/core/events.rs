//! In-process notifications for confirmed writes
//!
//! The lifecycle controller publishes on the [`EventBus`] after the repository
//! confirms a status change. Screens subscribe and mark their cached lists
//! stale, so the next read re-fetches.
//!
//! ```text
//! BookingLifecycle ──▶ EventBus::publish() ──▶ broadcast channel
//!                                                     │
//!                                                     ▼
//!                                       ViewAggregator (stale flag)
//! ```

use crate::entities::BookingStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events about room bookings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BookingEvent {
    /// The backend confirmed a status change
    StatusChanged {
        booking_id: String,
        from: BookingStatus,
        to: BookingStatus,
    },
}

impl BookingEvent {
    pub fn booking_id(&self) -> &str {
        match self {
            BookingEvent::StatusChanged { booking_id, .. } => booking_id,
        }
    }

    pub fn action(&self) -> &str {
        match self {
            BookingEvent::StatusChanged { .. } => "status_changed",
        }
    }
}

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: BookingEvent,
}

impl EventEnvelope {
    pub fn new(event: BookingEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone; every clone publishes to the same subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// Receivers that fall more than `capacity` events behind observe
    /// `Lagged` on their next receive.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of receivers that will receive the event.
    pub fn publish(&self, event: BookingEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        // send() only fails when nobody is listening
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
