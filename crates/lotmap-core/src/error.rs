//! Error handling for LotMap
//!
//! Provides error types for the layers owned by the core crate:
//! - Geometry errors (ring conformance at the persistence boundary)
//! - Store errors (failures reported by the lot/sublot/crop backend)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::model::{LotId, SublotId};

/// Geometry conformance error
///
/// Raised when a ring or polygon is about to be persisted and does not meet
/// the ring contract: at least three distinct vertices, finite coordinates,
/// and implicit closure (no duplicated closing vertex).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Fewer than three distinct vertices
    #[error("Ring needs at least 3 distinct vertices, got {distinct}")]
    TooFewVertices {
        /// Number of distinct vertices found.
        distinct: usize,
    },

    /// Last vertex repeats the first one
    #[error("Ring is explicitly closed: last vertex duplicates the first")]
    PreClosed,

    /// A coordinate is NaN or infinite
    #[error("Non-finite coordinate at vertex {index}")]
    NonFinite {
        /// Index of the offending vertex in the ring.
        index: usize,
    },

    /// Polygon carries no rings at all
    #[error("Polygon has no rings")]
    EmptyPolygon,
}

/// Store error type
///
/// Represents failures of the external lot/sublot/crop store.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// Lot does not exist in the store
    #[error("Lot {0} not found")]
    LotNotFound(LotId),

    /// Sublot does not exist in the store
    #[error("Sublot {0} not found")]
    SublotNotFound(SublotId),

    /// The backend refused the request
    #[error("Request rejected ({status}): {message}")]
    Rejected {
        /// Status code reported by the backend.
        status: u16,
        /// Message reported by the backend.
        message: String,
    },

    /// The backend could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Response payload could not be decoded
    #[error("Failed to decode store response: {0}")]
    Decode(String),

    /// Geometry was rejected before any request was issued
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    /// A new lot was created but attaching its geometry failed.
    ///
    /// The lot exists in the store; a retry must update it rather than
    /// create another one.
    #[error("Lot {lot_id} was created but its geometry was not saved: {source}")]
    GeometryNotSaved {
        lot_id: LotId,
        source: Box<StoreError>,
    },
}

impl StoreError {
    /// Check if this error came from the transport rather than the data
    pub fn is_unavailable(&self) -> bool {
        match self {
            StoreError::Unavailable(_) => true,
            StoreError::GeometryNotSaved { source, .. } => source.is_unavailable(),
            _ => false,
        }
    }

    /// Id of a lot that was created before the failure, if any.
    pub fn created_lot_id(&self) -> Option<LotId> {
        match self {
            StoreError::GeometryNotSaved { lot_id, .. } => Some(*lot_id),
            _ => None,
        }
    }
}

/// Main error type for LotMap core
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
