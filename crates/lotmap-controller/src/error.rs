//! Error types for the controller.

use lotmap_core::StoreError;
use lotmap_drawing::DrawingError;
use thiserror::Error;

/// Controller errors.
///
/// Every variant has already been reported through the notifier (or
/// logged) by the time it is returned.
#[derive(Error, Debug, Clone)]
pub enum ControllerError {
    /// A store call failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A drawing operation failed.
    #[error(transparent)]
    Drawing(#[from] DrawingError),
}

impl ControllerError {
    /// True when the failure came from the store, directly or through a
    /// drawing commit.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            ControllerError::Store(_) | ControllerError::Drawing(DrawingError::Persistence(_))
        )
    }
}

/// Result type for controller operations.
pub type ControllerResult<T> = std::result::Result<T, ControllerError>;
