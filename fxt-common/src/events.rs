//! Session event types and EventBus
//!
//! The presentation layer subscribes to a session's bus to refresh status
//! badges without polling the registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::features::FeatureKey;
use crate::slots::SlotKey;
use crate::song::SectionName;

/// Events emitted by a [`DashboardSession`](crate::session::DashboardSession)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A file was stored in a slot
    StemRecorded {
        session_id: Uuid,
        slot: SlotKey,
        filename: String,
        size_bytes: u64,
        /// True when the slot already held a file
        replaced: bool,
        timestamp: DateTime<Utc>,
    },

    /// All uploads were discarded
    SessionReset {
        session_id: Uuid,
        /// Number of records removed
        cleared: usize,
        timestamp: DateTime<Utc>,
    },

    /// The artist edited the section list
    SongStructureChanged {
        session_id: Uuid,
        sections: Vec<SectionName>,
        timestamp: DateTime<Utc>,
    },

    /// The artist changed a feature's version count
    VersionCountChanged {
        session_id: Uuid,
        feature: FeatureKey,
        old_count: u8,
        new_count: u8,
        timestamp: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Session that produced the event
    pub fn session_id(&self) -> Uuid {
        match self {
            SessionEvent::StemRecorded { session_id, .. }
            | SessionEvent::SessionReset { session_id, .. }
            | SessionEvent::SongStructureChanged { session_id, .. }
            | SessionEvent::VersionCountChanged { session_id, .. } => *session_id,
        }
    }
}

/// Event distribution bus for one session
///
/// Wraps `tokio::sync::broadcast`:
/// - Publishing never blocks; slow subscribers lag instead
/// - Any number of subscribers
/// - Subscribers are cleaned up when dropped
///
/// # Examples
///
/// ```
/// use fxt_common::events::EventBus;
///
/// let bus = EventBus::new(100);
/// let _rx = bus.subscribe();
/// assert_eq!(bus.subscriber_count(), 1);
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    ///
    /// A zero capacity is raised to 1; the config layer rejects it earlier.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: SessionEvent,
    ) -> Result<usize, broadcast::error::SendError<SessionEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}
