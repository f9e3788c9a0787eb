//! Event type definitions for the event bus.
//!
//! Events are grouped by category and are cloneable and serializable so
//! they can be logged or replayed.

use serde::{Deserialize, Serialize};

use crate::model::{LotId, SublotId};
use crate::notify::Notification;

/// Root event enum for all application events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// Drawing session lifecycle
    Drawing(DrawingEvent),
    /// Lot/sublot data changes confirmed by the store
    Data(DataEvent),
    /// Operator-facing notifications
    Notification(Notification),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Drawing(_) => EventCategory::Drawing,
            AppEvent::Data(_) => EventCategory::Data,
            AppEvent::Notification(_) => EventCategory::Notification,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Drawing(e) => e.description(),
            AppEvent::Data(e) => e.description(),
            AppEvent::Notification(n) => format!("[{}] {}", n.level, n.message),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Drawing,
    Data,
    Notification,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Drawing => write!(f, "Drawing"),
            EventCategory::Data => write!(f, "Data"),
            EventCategory::Notification => write!(f, "Notification"),
        }
    }
}

/// Drawing session events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawingEvent {
    /// A new session started capturing points.
    Started,
    /// The operator asked to save the captured polygon.
    CommitRequested {
        /// Number of captured vertices.
        vertices: usize,
    },
    /// The polygon was persisted on a lot.
    Committed {
        /// Lot that received the geometry.
        lot_id: LotId,
    },
    /// Persisting the polygon failed; the session is still awaiting commit.
    CommitFailed {
        /// Failure reason.
        reason: String,
    },
    /// The session was discarded without persisting.
    Cancelled,
}

impl DrawingEvent {
    pub fn description(&self) -> String {
        match self {
            DrawingEvent::Started => "Drawing started".to_string(),
            DrawingEvent::CommitRequested { vertices } => {
                format!("Commit requested with {} vertices", vertices)
            }
            DrawingEvent::Committed { lot_id } => format!("Polygon saved on lot {}", lot_id),
            DrawingEvent::CommitFailed { reason } => format!("Commit failed: {}", reason),
            DrawingEvent::Cancelled => "Drawing cancelled".to_string(),
        }
    }
}

/// Data events, published only after the store confirms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataEvent {
    /// Collections were re-pulled from the store.
    Refreshed {
        lots: usize,
        sublots: usize,
        crops: usize,
    },
    /// A lot was created.
    LotCreated { lot_id: LotId },
    /// A sublot was created.
    SublotCreated { sublot_id: SublotId },
    /// A lot's active flag changed.
    LotActiveChanged { lot_id: LotId, active: bool },
}

impl DataEvent {
    pub fn description(&self) -> String {
        match self {
            DataEvent::Refreshed {
                lots,
                sublots,
                crops,
            } => format!(
                "Refreshed {} lots, {} sublots, {} crops",
                lots, sublots, crops
            ),
            DataEvent::LotCreated { lot_id } => format!("Lot {} created", lot_id),
            DataEvent::SublotCreated { sublot_id } => format!("Sublot {} created", sublot_id),
            DataEvent::LotActiveChanged { lot_id, active } => {
                let state = if *active { "active" } else { "inactive" };
                format!("Lot {} is now {}", lot_id, state)
            }
        }
    }
}
