//! Annotation file format.
//!
//! Each image gets one JSON file listing its labeled rectangles. See
//! [`AnnotationFile`] for the layout.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use annobox::format::{AnnotationFile, annotation_path};
//!
//! let mut file = AnnotationFile::new(image, 640, 480, 3);
//! file.push_shape("cat", &shape)?;
//! file.save(&annotation_path(output_dir, image).unwrap_or_default())?;
//! ```

mod annotation_file;
mod error;

#[cfg(test)]
mod tests;

pub use annotation_file::{AnnotationFile, ImageSize, ObjectCoor, ObjectEntry, annotation_path};
pub use error::FormatError;
