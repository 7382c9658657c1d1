//! Headless host session.
//!
//! A [`Session`] plays the part of the application window around a
//! [`Canvas`]: it opens images and annotation files, keeps the label list and
//! the label colors in sync with canvas notifications, answers the label
//! dialog and saves the result.
//!
//! The host forwards pointer input to [`Session::canvas_mut`] and calls
//! [`Session::handle_events`] afterwards.

mod label_list;

#[cfg(test)]
mod tests;

pub use label_list::{LabelItem, LabelList, UniqueLabels};

use std::path::{Path, PathBuf};

use crate::canvas::{Canvas, CanvasError, CanvasEvent};
use crate::config::AppConfig;
use crate::constants::UNKNOWN_DEPTH;
use crate::error::{AnnotateError, Result};
use crate::format::{AnnotationFile, FormatError, annotation_path};
use crate::geometry::Size;
use crate::shape::{Shape, ShapeId};
use crate::style::ShapeStyle;

/// The image being annotated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel
    pub depth: i32,
}

impl ImageInfo {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Read the size and depth of an image file.
pub fn read_image_info(path: &Path) -> std::result::Result<ImageInfo, FormatError> {
    if !path.is_file() {
        return Err(FormatError::image_not_found(path));
    }
    log::info!("🖼️ Loading image: {:?}", path);
    let image = image::open(path)?;
    Ok(ImageInfo {
        path: path.to_path_buf(),
        width: image.width(),
        height: image.height(),
        depth: i32::from(image.color().bytes_per_pixel()),
    })
}

/// Bytes per pixel of the image at `path`, or -1 if it cannot be read.
fn image_depth(path: &Path) -> i32 {
    match image::open(path) {
        Ok(image) => i32::from(image.color().bytes_per_pixel()),
        Err(e) => {
            log::warn!("Cannot read depth of {:?}: {}", path, e);
            UNKNOWN_DEPTH
        }
    }
}

/// Host-side state around one canvas.
#[derive(Debug)]
pub struct Session {
    canvas: Canvas,
    config: AppConfig,
    image: Option<ImageInfo>,
    labels: LabelList,
    unique_labels: UniqueLabels,
    /// Label given to the next new shape without asking
    next_label: Option<String>,
    /// Newest shape, waiting for the label dialog
    pending_label: Option<ShapeId>,
    /// Annotation file the current image was opened from; used by the next save
    default_save_path: Option<PathBuf>,
    output_dir: PathBuf,
    unsaved: bool,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        Self {
            canvas: Canvas::new(config.canvas, config.colors),
            output_dir: config.preferences.output_dir.clone(),
            config,
            image: None,
            labels: LabelList::new(),
            unique_labels: UniqueLabels::new(),
            next_label: None,
            pending_label: None,
            default_save_path: None,
            unsaved: false,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn image(&self) -> Option<&ImageInfo> {
        self.image.as_ref()
    }

    pub fn labels(&self) -> &LabelList {
        &self.labels
    }

    pub fn unique_labels(&self) -> &UniqueLabels {
        &self.unique_labels
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.output_dir = dir.into();
    }

    pub fn default_save_path(&self) -> Option<&Path> {
        self.default_save_path.as_deref()
    }

    /// Shape waiting for an answer from the label dialog.
    pub fn pending_label(&self) -> Option<ShapeId> {
        self.pending_label
    }

    pub fn next_label(&self) -> Option<&str> {
        self.next_label.as_deref()
    }

    /// True if shapes changed since the last open or save.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    fn style_for(&mut self, text: &str) -> ShapeStyle {
        let color = self.unique_labels.color_for(text);
        self.config.colors.with_label_color(color)
    }

    // ------------------------------------------------------------------------
    // Opening files
    // ------------------------------------------------------------------------

    /// Open an image with no annotations. On error nothing changes.
    pub fn open_image(&mut self, path: &Path) -> Result<()> {
        let info = read_image_info(path)?;
        self.install_image(info);
        Ok(())
    }

    fn install_image(&mut self, info: ImageInfo) {
        log::info!(
            "Opened {:?} ({}x{}, depth {})",
            info.path,
            info.width,
            info.height,
            info.depth
        );
        self.canvas.reset_state();
        self.canvas.load_pixmap(info.size(), true);
        self.canvas.take_events();
        self.labels.clear();
        self.pending_label = None;
        self.default_save_path = None;
        self.unsaved = false;
        self.image = Some(info);
    }

    /// Open an annotation file and the image it refers to.
    ///
    /// An empty `image_path` is resolved next to the annotation file. On
    /// error nothing changes.
    pub fn open_annotation(&mut self, path: &Path) -> Result<()> {
        let file = AnnotationFile::load(path)?;
        let shapes = file.to_shapes()?;
        let base_dir = if file.image_path.is_empty() {
            path.parent().map(Path::to_path_buf).unwrap_or_default()
        } else {
            PathBuf::from(&file.image_path)
        };
        let info = read_image_info(&base_dir.join(&file.image_filename))?;

        self.install_image(info);
        let shapes: Vec<Shape> = shapes
            .into_iter()
            .map(|shape| match shape.label.clone() {
                Some(label) => {
                    let style = self.style_for(&label);
                    shape.with_style(style)
                }
                None => shape,
            })
            .collect();
        self.canvas.load_shapes(shapes, true);
        self.rebuild_labels();

        self.default_save_path = Some(path.to_path_buf());
        self.output_dir = base_dir;
        log::info!(
            "Opened {} annotation(s) from {:?}",
            self.labels.len(),
            path
        );
        Ok(())
    }

    /// Rebuild the label list from the canvas, in z-order.
    fn rebuild_labels(&mut self) {
        self.labels.clear();
        let labeled: Vec<(ShapeId, String)> = self
            .canvas
            .shapes()
            .iter()
            .filter_map(|shape| shape.label.clone().map(|label| (shape.id(), label)))
            .collect();
        for (shape, text) in labeled {
            let color = self.unique_labels.color_for(&text);
            self.labels.push(LabelItem { text, shape, color });
        }
        let selected = self.canvas.selected_ids().to_vec();
        self.labels.select(&selected);
    }

    // ------------------------------------------------------------------------
    // Canvas notifications
    // ------------------------------------------------------------------------

    /// Drain canvas notifications and apply them to the label list.
    ///
    /// The events are returned so the host can react too (context menu,
    /// label dialog, status bar).
    pub fn handle_events(&mut self) -> Vec<CanvasEvent> {
        let events = self.canvas.take_events();
        for event in &events {
            match event {
                CanvasEvent::NewShape(id) => {
                    self.unsaved = true;
                    self.pending_label = Some(*id);
                    if let Some(text) = self.next_label.take() {
                        if let Err(e) = self.assign_label(Some(&text)) {
                            log::warn!("Cannot apply label '{}': {}", text, e);
                        }
                    }
                }
                CanvasEvent::SelectionChanged(ids) => self.labels.select(ids),
                CanvasEvent::ShapesDeleted(ids) => {
                    for id in ids {
                        self.labels.remove(*id);
                    }
                    if self.pending_label.is_some_and(|id| ids.contains(&id)) {
                        self.pending_label = None;
                    }
                    self.unsaved = true;
                }
                CanvasEvent::ShapesDuplicated(ids) => {
                    for id in ids {
                        let label = self.canvas.shape(*id).and_then(|s| s.label.clone());
                        if let Some(text) = label {
                            let color = self.unique_labels.color_for(&text);
                            self.labels.push(LabelItem {
                                text,
                                shape: *id,
                                color,
                            });
                        }
                    }
                    self.unsaved = true;
                }
                CanvasEvent::ShapesRestored => {
                    self.pending_label = None;
                    self.rebuild_labels();
                    self.unsaved = true;
                }
                CanvasEvent::ShapeMoved => self.unsaved = true,
                CanvasEvent::VertexSelected(_)
                | CanvasEvent::DrawingPolygon(_)
                | CanvasEvent::ContextMenuRequested { .. } => {}
            }
        }
        events
    }

    // ------------------------------------------------------------------------
    // Labels
    // ------------------------------------------------------------------------

    /// Outcome of the label dialog for the shape that is waiting for it.
    ///
    /// `Some(text)` labels and recolors it; `None` (cancel) removes it along
    /// with its undo step. Fails without touching anything when no shape is
    /// waiting, and drops a waiting shape that is no longer the newest one.
    pub fn assign_label(&mut self, text: Option<&str>) -> Result<Option<ShapeId>> {
        let id = self.pending_label.ok_or(AnnotateError::NoPendingLabel)?;
        if self.canvas.shapes().last().map(Shape::id) != Some(id) {
            self.pending_label = None;
            return Err(CanvasError::UnknownShape(id).into());
        }
        let Some(text) = text else {
            self.pending_label = None;
            if let Some(shape) = self.canvas.discard_last_shape() {
                log::debug!("Label dialog cancelled, dropped shape {}", shape.id());
            }
            return Ok(None);
        };
        if text.is_empty() {
            return Err(CanvasError::EmptyLabel.into());
        }

        let color = self.unique_labels.color_for(text);
        let style = self.config.colors.with_label_color(color);
        self.canvas.set_shape_style(id, style)?;
        self.canvas.set_last_label(text, None)?;
        self.pending_label = None;
        self.labels.push(LabelItem {
            text: text.to_string(),
            shape: id,
            color,
        });
        self.unsaved = true;
        Ok(Some(id))
    }

    /// Change the label of a shape; its color follows the new label.
    pub fn rename(&mut self, id: ShapeId, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(CanvasError::EmptyLabel.into());
        }
        if self.canvas.shape(id).is_none() {
            return Err(CanvasError::UnknownShape(id).into());
        }
        let color = self.unique_labels.color_for(text);
        let style = self.config.colors.with_label_color(color);
        self.canvas.set_shape_style(id, style)?;
        self.canvas.set_shape_label(id, text)?;
        if !self.labels.set_label(id, text, color) {
            self.labels.push(LabelItem {
                text: text.to_string(),
                shape: id,
                color,
            });
        }
        self.unsaved = true;
        Ok(())
    }

    /// Give the next drawn shape `text` without asking. `None` cancels.
    ///
    /// The label is used once; later shapes go through the dialog again.
    pub fn set_next_label(&mut self, text: Option<&str>) -> Result<()> {
        match text {
            Some("") => Err(CanvasError::EmptyLabel.into()),
            Some(text) => {
                self.unique_labels.color_for(text);
                self.next_label = Some(text.to_string());
                Ok(())
            }
            None => {
                self.next_label = None;
                Ok(())
            }
        }
    }

    /// Delete the selected shapes and their list rows.
    pub fn delete_selected(&mut self) -> Vec<Shape> {
        let deleted = self.canvas.delete_selected();
        for shape in &deleted {
            self.labels.remove(shape.id());
            if self.pending_label == Some(shape.id()) {
                self.pending_label = None;
            }
        }
        if !deleted.is_empty() {
            self.unsaved = true;
        }
        deleted
    }

    // ------------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------------

    /// Build the annotation file for the current state, in label-list order.
    pub fn to_annotation(&self) -> Result<AnnotationFile> {
        let info = self.image.as_ref().ok_or(AnnotateError::NoImage)?;
        let mut file = AnnotationFile::new(
            &info.path,
            info.width,
            info.height,
            image_depth(&info.path),
        );
        for item in self.labels.items() {
            match self.canvas.shape(item.shape) {
                Some(shape) => file.push_shape(&item.text, shape)?,
                None => log::warn!("Label '{}' has no shape {}", item.text, item.shape),
            }
        }
        Ok(file)
    }

    /// Write the annotation file and return where it went.
    ///
    /// Without an explicit path, the file the image was opened from is used
    /// once; after that the default is `<output_dir>/<image stem>.json`.
    pub fn save(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        let file = self.to_annotation()?;
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => match &self.default_save_path {
                Some(path) => path.clone(),
                None => {
                    let image = self.image.as_ref().ok_or(AnnotateError::NoImage)?;
                    annotation_path(&self.output_dir, &image.path)
                        .ok_or(AnnotateError::NoImage)?
                }
            },
        };
        file.save(&target)?;
        if path.is_none() {
            self.default_save_path = None;
        }
        self.unsaved = false;
        Ok(target)
    }
}
