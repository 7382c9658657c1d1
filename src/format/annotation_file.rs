//! Per-image annotation file.
//!
//! One JSON document per image:
//!
//! ```json
//! {
//! 	"image_filename": "cat.png",
//! 	"image_size": { "width": 640, "height": 480, "depth": 3 },
//! 	"image_path": "/data/images/",
//! 	"Object": [
//! 		{ "object_id": 0, "object_name": "cat",
//! 		  "object_coor": { "x1": 10, "y1": 20, "x2": 200, "y2": 180 } }
//! 	]
//! }
//! ```
//!
//! `x1,y1` is always the min corner and `x2,y2` the max corner, whatever the
//! direction the rectangle was drawn in. Files are written with tab indentation
//! and non-ASCII text kept as-is.

use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};

use super::FormatError;
use crate::constants::ANNOTATION_EXTENSION;
use crate::geometry::Point;
use crate::shape::Shape;

/// A complete annotation file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationFile {
    /// Image file name, without directory
    pub image_filename: String,
    pub image_size: ImageSize,
    /// Directory of the image, with a trailing separator
    pub image_path: String,
    #[serde(rename = "Object", default)]
    pub objects: Vec<ObjectEntry>,
}

/// Image dimensions and bytes per pixel (-1 when unknown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
    pub depth: i32,
}

/// One labeled rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub object_id: u32,
    pub object_name: String,
    pub object_coor: ObjectCoor,
}

/// Normalized rectangle corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectCoor {
    #[serde(serialize_with = "serialize_coord")]
    pub x1: f32,
    #[serde(serialize_with = "serialize_coord")]
    pub y1: f32,
    #[serde(serialize_with = "serialize_coord")]
    pub x2: f32,
    #[serde(serialize_with = "serialize_coord")]
    pub y2: f32,
}

/// Whole-pixel coordinates are written as JSON integers.
fn serialize_coord<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 1e9 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f32(*value)
    }
}

impl ObjectCoor {
    /// Build from two opposite corners given in any order.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self {
            x1: p1.x.min(p2.x),
            y1: p1.y.min(p2.y),
            x2: p1.x.max(p2.x),
            y2: p1.y.max(p2.y),
        }
    }

    fn validate(&self) -> Result<(), FormatError> {
        let values = [self.x1, self.y1, self.x2, self.y2];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(FormatError::invalid_coordinates(format!(
                "non-finite coordinate in {:?}",
                values
            )));
        }
        Ok(())
    }
}

impl AnnotationFile {
    /// Start an empty annotation for the image at `image`.
    pub fn new(image: &Path, width: u32, height: u32, depth: i32) -> Self {
        let image_filename = image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let image_path = image
            .parent()
            .map(|dir| dir.to_string_lossy().into_owned())
            .filter(|dir| !dir.is_empty())
            .map(|dir| {
                if dir.ends_with(std::path::MAIN_SEPARATOR) || dir.ends_with('/') {
                    dir
                } else {
                    format!("{}{}", dir, std::path::MAIN_SEPARATOR)
                }
            })
            .unwrap_or_default();
        Self {
            image_filename,
            image_size: ImageSize {
                width,
                height,
                depth,
            },
            image_path,
            objects: Vec::new(),
        }
    }

    /// Full path of the annotated image.
    pub fn image_file(&self) -> PathBuf {
        Path::new(&self.image_path).join(&self.image_filename)
    }

    /// Append a finished rectangle; object ids follow insertion order.
    pub fn push_shape(&mut self, name: &str, shape: &Shape) -> Result<(), FormatError> {
        let (min, max) = shape.corners().ok_or_else(|| {
            FormatError::invalid_shape(format!(
                "'{}' has {} points, expected 2",
                name,
                shape.len()
            ))
        })?;
        if shape.points().iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(FormatError::invalid_coordinates(format!(
                "'{}' has a non-finite point",
                name
            )));
        }
        let object_coor = ObjectCoor::from_corners(min, max);
        self.objects.push(ObjectEntry {
            object_id: self.objects.len() as u32,
            object_name: name.to_string(),
            object_coor,
        });
        Ok(())
    }

    /// Convert the objects into labeled shapes, in file order.
    pub fn to_shapes(&self) -> Result<Vec<Shape>, FormatError> {
        self.objects
            .iter()
            .map(|object| {
                let c = object.object_coor;
                c.validate()?;
                Ok(
                    Shape::rectangle(Point::new(c.x1, c.y1), Point::new(c.x2, c.y2))
                        .with_label(object.object_name.clone()),
                )
            })
            .collect()
    }

    /// Serialize with tab indentation.
    pub fn to_json(&self) -> Result<String, FormatError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        let file: Self = serde_json::from_str(json)?;
        for object in &file.objects {
            object.object_coor.validate()?;
        }
        Ok(file)
    }

    /// Read an annotation file.
    pub fn load(path: &Path) -> Result<Self, FormatError> {
        log::info!("Loading annotations from {:?}", path);
        if !path.exists() {
            return Err(FormatError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let json = std::fs::read_to_string(path)?;
        let file = Self::from_json(&json)?;
        log::info!(
            "Loaded {} object(s) for image '{}'",
            file.objects.len(),
            file.image_filename
        );
        Ok(file)
    }

    /// Write the file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), FormatError> {
        log::info!("Saving {} object(s) to {:?}", self.objects.len(), path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Default annotation path for an image: `<output_dir>/<image stem>.json`.
pub fn annotation_path(output_dir: &Path, image: &Path) -> Option<PathBuf> {
    let stem = image.file_stem()?.to_string_lossy();
    Some(output_dir.join(format!("{}.{}", stem, ANNOTATION_EXTENSION)))
}
