//! Error types for canvas operations.

use thiserror::Error;

use crate::shape::ShapeId;

/// Precondition failures of canvas operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    /// A label must contain text
    #[error("Label text is empty")]
    EmptyLabel,

    /// There is no finalized shape to operate on
    #[error("No shapes on the canvas")]
    NoShapes,

    /// No shape with this handle exists
    #[error("Unknown shape {0}")]
    UnknownShape(ShapeId),

    /// No shadow copy is being dragged
    #[error("No copy in progress")]
    NoCopyInProgress,
}
