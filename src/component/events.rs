//! Control-plane and data-plane event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Capacity of every component's core event channel.
///
/// One slot holds the startup broadcast without waiting on the component.
pub const CORE_EVENT_BUFFER: usize = 1;

/// Lifecycle signal sent by the host to gateways and processors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreEvent {
    /// Every component has been constructed and wired into the router.
    ComponentsLoaded,
}

/// Data-plane message flowing from gateways through the router to processors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Identifier of the component that produced the event.
    pub source: String,
    pub kind: String,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(
        source: impl Into<String>,
        kind: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            source: source.into(),
            kind: kind.into(),
            payload,
            timestamp: Utc::now(),
        }
    }
}

/// Cloneable handle for enqueueing events onto a router.
#[derive(Debug, Clone)]
pub struct RouterHandle {
    tx: mpsc::Sender<Event>,
}

impl RouterHandle {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }

    /// Enqueue an event. Fails once the router has stopped.
    pub async fn enqueue(&self, event: Event) -> Result<(), mpsc::error::SendError<Event>> {
        self.tx.send(event).await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
