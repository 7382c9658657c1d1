//! Application-wide constants.
//!
//! Defaults for the canvas configuration and the annotation file layout.

// ============================================================================
// Canvas Defaults
// ============================================================================

/// Hit-test radius in screen pixels.
pub const DEFAULT_EPSILON: f32 = 10.0;

/// Number of undo steps kept by the shape history.
pub const DEFAULT_NUM_BACKUPS: usize = 10;

/// Vertex marker diameter in screen pixels.
pub const DEFAULT_POINT_SIZE: f32 = 8.0;

/// Offset applied to duplicated shapes so they don't hide the originals.
pub const DUPLICATE_SHIFT: f32 = 2.0;

/// Widget pixels left free around the image by the fit zoom modes.
pub const FIT_MARGIN: f32 = 2.0;

// ============================================================================
// Annotation Files
// ============================================================================

/// Default directory annotation files are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "annotations";

/// Extension of annotation files.
pub const ANNOTATION_EXTENSION: &str = "json";

/// Depth reported when the image cannot be opened.
pub const UNKNOWN_DEPTH: i32 = -1;
