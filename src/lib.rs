//! annobox - rectangle annotation engine
//!
//! The interaction core of an image annotation tool: a canvas where the user
//! draws, selects, moves, copies and resizes labeled rectangles over an image,
//! with bounded movement, snapshot undo/redo and a per-image JSON file format.
//!
//! Rendering and dialogs belong to the host. The [`canvas::Canvas`] takes
//! pointer input in widget coordinates, queues [`canvas::CanvasEvent`]s and
//! paints into a display list; [`session::Session`] is a headless host that
//! keeps the label list in sync and reads and writes annotation files.

pub mod canvas;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod geometry;
pub mod history;
pub mod session;
pub mod shape;
pub mod style;

pub use canvas::{Canvas, CanvasError, CanvasEvent, Frame, Mode};
pub use config::AppConfig;
pub use error::{AnnotateError, Result};
pub use format::{AnnotationFile, FormatError};
pub use geometry::{Point, Rect, Size};
pub use session::Session;
pub use shape::{Shape, ShapeError, ShapeId};
pub use style::{Color, ShapeStyle};
