//! Error types for the drawing session.

use lotmap_core::{GeometryError, StoreError};
use thiserror::Error;

use crate::session::DrawingPhase;

/// Drawing session errors.
///
/// None of these end the session on their own: after a failure the
/// session stays in the phase it was in.
#[derive(Error, Debug, Clone)]
pub enum DrawingError {
    /// The operation is not valid in the current phase.
    #[error("Cannot {action} while {phase}")]
    InvalidTransition {
        /// Phase the session was in.
        phase: DrawingPhase,
        /// Operation that was attempted.
        action: &'static str,
    },

    /// Fewer than 3 points captured.
    #[error("At least 3 points are needed to save a polygon, got {have}")]
    NotEnoughPoints {
        /// Points captured so far.
        have: usize,
    },

    /// A previous commit has not finished yet.
    #[error("A commit is already in flight")]
    CommitInFlight,

    /// The captured ring failed the ring conformance check.
    #[error("Invalid polygon: {0}")]
    InvalidGeometry(#[from] GeometryError),

    /// The store rejected or failed the save.
    #[error("Failed to save polygon: {0}")]
    Persistence(#[from] StoreError),
}

/// Result type for drawing operations.
pub type DrawingResult<T> = std::result::Result<T, DrawingError>;
