//! Crate-level error type.

use thiserror::Error;

use crate::canvas::CanvasError;
use crate::config::ConfigError;
use crate::format::FormatError;

/// Any error surfaced to the host.
#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error(transparent)]
    Canvas(#[from] CanvasError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Saving requires an open image
    #[error("No image is open")]
    NoImage,

    /// The label dialog was answered but no new shape is waiting for it
    #[error("No shape is waiting for a label")]
    NoPendingLabel,
}

pub type Result<T> = std::result::Result<T, AnnotateError>;
