//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application.
//! Handlers publish a [`BoardEvent`] after a mutation is persisted;
//! subscribers such as the API's event log consume it.

use boardwalk_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// BoardEvent
// ---------------------------------------------------------------------------

/// What happened to a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardEventKind {
    Created,
    Updated,
    Removed,
    MembersAdded,
    MembersRemoved,
    OwnershipTransferred,
    Archived,
    Unarchived,
}

impl BoardEventKind {
    /// Dot-separated event name, e.g. `"board.members_added"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardEventKind::Created => "board.created",
            BoardEventKind::Updated => "board.updated",
            BoardEventKind::Removed => "board.removed",
            BoardEventKind::MembersAdded => "board.members_added",
            BoardEventKind::MembersRemoved => "board.members_removed",
            BoardEventKind::OwnershipTransferred => "board.ownership_transferred",
            BoardEventKind::Archived => "board.archived",
            BoardEventKind::Unarchived => "board.unarchived",
        }
    }
}

/// A board mutation that has been persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardEvent {
    pub kind: BoardEventKind,
    pub board_id: DbId,
    /// Account that performed the mutation.
    pub actor: Option<DbId>,
    /// Event-specific data, e.g. the member ids that were added.
    pub payload: serde_json::Value,
    pub timestamp: Timestamp,
}

impl BoardEvent {
    pub fn new(kind: BoardEventKind, board_id: DbId) -> Self {
        Self {
            kind,
            board_id,
            actor: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_actor(mut self, actor: Option<DbId>) -> Self {
        self.actor = actor;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use boardwalk_events::bus::{BoardEvent, BoardEventKind, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(BoardEvent::new(BoardEventKind::Created, 1));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<BoardEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest messages are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: BoardEvent) {
        tracing::debug!(
            event = event.kind.as_str(),
            board_id = event.board_id,
            "Publishing board event"
        );
        // A send error only means there are no receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
