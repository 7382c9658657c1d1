//! Shape canvas: the interaction engine.
//!
//! The canvas owns every shape in an ordered arena (z-order, topmost last)
//! and addresses them through stable [`ShapeId`] handles. It turns pointer
//! input into create/select/move/edit operations, keeps the undo history,
//! and queues [`CanvasEvent`]s that the host drains after each call.
//!
//! The canvas never draws anything itself; [`Canvas::paint`] produces a
//! display list in image coordinates plus the transform to apply.

mod error;
mod event;
mod hover;
mod paint;
mod pointer;
mod viewport;


pub use error::CanvasError;
pub use event::{CanvasEvent, CursorShape, Modifiers, PointerButton, PointerButtons};
pub use hover::HoverState;
pub use paint::{Frame, FrameItem, Layer};
pub use viewport::Viewport;

use std::collections::{BTreeMap, HashMap};

use crate::config::CanvasConfig;
use crate::geometry::{Point, Size};
use crate::history::{HistoryConfig, ShapeHistory, Snapshot};
use crate::shape::{Shape, ShapeId};
use crate::style::ShapeStyle;

/// Interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Drawing new shapes
    Create,
    /// Selecting, moving and resizing existing shapes
    #[default]
    Edit,
}

/// The shape canvas.
#[derive(Debug, Clone)]
pub struct Canvas {
    config: CanvasConfig,
    /// Style given to newly drawn shapes
    default_style: ShapeStyle,
    mode: Mode,

    shapes: Vec<Shape>,
    history: ShapeHistory,
    next_id: u64,

    /// Shape being drawn (one point)
    current: Option<Shape>,
    /// Rubber band from the first point of `current` to the pointer
    line: Shape,

    selected: Vec<ShapeId>,
    /// Shadow copies dragged with the right button
    selected_copy: Vec<Shape>,

    /// Drag anchor
    prev_point: Option<Point>,
    /// Last pointer position, used as the split point for edge insertion
    prev_move_point: Option<Point>,
    /// Selection bounding box corners relative to the drag anchor
    offsets: (Point, Point),

    viewport: Viewport,
    visible: HashMap<ShapeId, bool>,
    hide_background: bool,
    hiding: bool,

    hover: HoverState,
    moving_shape: bool,
    h_shape_is_selected: bool,

    cursor: CursorShape,
    tooltip: String,
    events: Vec<CanvasEvent>,
    dirty: bool,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default(), ShapeStyle::default())
    }
}

impl Canvas {
    pub fn new(config: CanvasConfig, default_style: ShapeStyle) -> Self {
        Self {
            config,
            default_style,
            mode: Mode::default(),
            shapes: Vec::new(),
            history: ShapeHistory::with_config(HistoryConfig {
                num_backups: config.num_backups,
            }),
            next_id: 1,
            current: None,
            line: Shape::new(),
            selected: Vec::new(),
            selected_copy: Vec::new(),
            prev_point: None,
            prev_move_point: None,
            offsets: (Point::ZERO, Point::ZERO),
            viewport: Viewport::default(),
            visible: HashMap::new(),
            hide_background: config.hide_background,
            hiding: false,
            hover: HoverState::default(),
            moving_shape: false,
            h_shape_is_selected: false,
            cursor: CursorShape::Default,
            tooltip: String::new(),
            events: Vec::new(),
            dirty: false,
        }
    }

    // ------------------------------------------------------------------------
    // Mode
    // ------------------------------------------------------------------------

    /// Switch between Edit (`true`) and Create (`false`) mode.
    ///
    /// Entering Create mode clears hover and selection.
    pub fn set_editing(&mut self, value: bool) {
        self.mode = if value { Mode::Edit } else { Mode::Create };
        if !value {
            self.un_highlight();
            self.deselect_shape();
        }
        log::debug!("Canvas mode: {:?}", self.mode);
    }

    pub fn editing(&self) -> bool {
        self.mode == Mode::Edit
    }

    pub fn drawing(&self) -> bool {
        self.mode == Mode::Create
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// All shapes in z-order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub(crate) fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| s.id == id)
    }

    /// Handles of the selected shapes, in selection order.
    pub fn selected_ids(&self) -> &[ShapeId] {
        &self.selected
    }

    pub fn selected_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.selected.iter().filter_map(|id| self.shape(*id))
    }

    /// The shadow copies of a right-button drag, if any.
    pub fn copy_shadow(&self) -> &[Shape] {
        &self.selected_copy
    }

    /// The shape currently being drawn.
    pub fn current(&self) -> Option<&Shape> {
        self.current.as_ref()
    }

    pub fn hover(&self) -> HoverState {
        self.hover
    }

    pub fn cursor(&self) -> CursorShape {
        self.cursor
    }

    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn history(&self) -> &ShapeHistory {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn image_size(&self) -> Size {
        self.viewport.image_size()
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.viewport.scale = scale;
        self.dirty = true;
    }

    pub fn set_widget_size(&mut self, width: f32, height: f32) {
        self.viewport.set_widget_size(width, height);
        self.dirty = true;
    }

    /// Zoom so the whole image fits the widget. Returns the new scale.
    pub fn zoom_fit_window(&mut self) -> Option<f32> {
        let scale = self.viewport.fit_window_scale()?;
        self.set_scale(scale);
        Some(scale)
    }

    /// Zoom so the image spans the widget width. Returns the new scale.
    pub fn zoom_fit_width(&mut self) -> Option<f32> {
        let scale = self.viewport.fit_width_scale()?;
        self.set_scale(scale);
        Some(scale)
    }

    /// Preferred widget size for the current image and scale.
    pub fn size_hint(&self) -> (f32, f32) {
        self.viewport.size_hint()
    }

    pub fn set_default_style(&mut self, style: ShapeStyle) {
        self.default_style = style;
    }

    // ------------------------------------------------------------------------
    // Events and repaint
    // ------------------------------------------------------------------------

    fn emit(&mut self, event: CanvasEvent) {
        log::trace!("Canvas event: {:?}", event);
        self.events.push(event);
    }

    /// Drain queued notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.events)
    }

    /// True if the canvas needs to be repainted.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn alloc_id(&mut self) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        id
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Replace the selection, keeping the shapes' `selected` flags in sync.
    fn set_selection(&mut self, ids: Vec<ShapeId>) {
        for shape in &mut self.shapes {
            shape.selected = false;
        }
        let mut selection = Vec::with_capacity(ids.len());
        for id in ids {
            if selection.contains(&id) {
                continue;
            }
            if let Some(shape) = self.shape_mut(id) {
                shape.selected = true;
                selection.push(id);
            }
        }
        log::debug!("Selection changed: {:?}", selection);
        self.selected = selection.clone();
        self.emit(CanvasEvent::SelectionChanged(selection));
        self.dirty = true;
    }

    /// Select the given shapes (e.g. from the host's label list).
    pub fn select_shapes(&mut self, ids: &[ShapeId]) {
        self.set_hiding(true);
        self.set_selection(ids.to_vec());
    }

    /// Clear the selection.
    pub fn deselect_shape(&mut self) {
        if !self.selected.is_empty() {
            self.set_hiding(false);
            self.set_selection(Vec::new());
            self.h_shape_is_selected = false;
        }
    }

    // ------------------------------------------------------------------------
    // Deletion
    // ------------------------------------------------------------------------

    fn forget(&mut self, id: ShapeId) {
        self.visible.remove(&id);
        if self.hover.shape == Some(id) {
            self.hover = HoverState::default();
        }
    }

    /// Remove the selected shapes and return them.
    pub fn delete_selected(&mut self) -> Vec<Shape> {
        if self.selected.is_empty() {
            return Vec::new();
        }
        let ids = std::mem::take(&mut self.selected);
        let mut deleted = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(index) = self.index_of(*id) {
                let mut shape = self.shapes.remove(index);
                shape.selected = false;
                deleted.push(shape);
            }
            self.forget(*id);
        }
        self.history.store(&self.shapes);
        self.h_shape_is_selected = false;
        self.set_hiding(false);
        log::debug!("Deleted {} shape(s)", deleted.len());
        self.emit(CanvasEvent::ShapesDeleted(ids));
        self.dirty = true;
        deleted
    }

    /// Remove one shape by handle.
    pub fn delete_shape(&mut self, id: ShapeId) -> Result<Shape, CanvasError> {
        let index = self.index_of(id).ok_or(CanvasError::UnknownShape(id))?;
        self.selected.retain(|s| *s != id);
        let mut shape = self.shapes.remove(index);
        shape.selected = false;
        self.forget(id);
        self.history.store(&self.shapes);
        self.emit(CanvasEvent::ShapesDeleted(vec![id]));
        self.dirty = true;
        Ok(shape)
    }

    // ------------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------------

    /// Close `shape`, append it and snapshot the collection.
    fn finalise(&mut self, mut shape: Shape) -> ShapeId {
        shape.close();
        shape.highlight_clear();
        let id = self.alloc_id();
        shape.id = id;
        self.shapes.push(shape);
        self.history.store(&self.shapes);
        self.current = None;
        self.line = Shape::new();
        self.set_hiding(false);
        log::debug!("✏️ Shape {} finalized", id);
        self.emit(CanvasEvent::NewShape(id));
        self.dirty = true;
        id
    }

    /// Attach the label dialog's answer to the newest shape.
    ///
    /// The snapshot taken when the shape was finalized is replaced, so the
    /// shape and its label form a single undo step.
    pub fn set_last_label(
        &mut self,
        text: &str,
        flags: Option<BTreeMap<String, bool>>,
    ) -> Result<ShapeId, CanvasError> {
        if text.is_empty() {
            return Err(CanvasError::EmptyLabel);
        }
        let shape = self.shapes.last_mut().ok_or(CanvasError::NoShapes)?;
        shape.label = Some(text.to_string());
        shape.flags = flags;
        let id = shape.id;
        self.history.replace_top(&self.shapes);
        log::debug!("Shape {} labeled '{}'", id, text);
        Ok(id)
    }

    /// Drop the newest shape after a cancelled label dialog.
    ///
    /// Its snapshot goes too, so history is as if it was never drawn.
    pub fn discard_last_shape(&mut self) -> Option<Shape> {
        let shape = self.shapes.pop()?;
        self.history.discard_top();
        self.selected.retain(|id| *id != shape.id);
        self.forget(shape.id);
        log::debug!("Discarded unlabeled shape {}", shape.id);
        self.dirty = true;
        Some(shape)
    }

    /// Reopen the newest shape for drawing, keeping its first point.
    pub fn undo_last_line(&mut self) -> Result<(), CanvasError> {
        let mut shape = self.shapes.pop().ok_or(CanvasError::NoShapes)?;
        self.history.discard_top();
        self.selected.retain(|id| *id != shape.id);
        self.forget(shape.id);
        shape.set_open();
        shape.selected = false;
        while shape.len() > 1 {
            shape.pop_point();
        }
        self.line = Shape::new();
        self.current = Some(shape);
        self.emit(CanvasEvent::DrawingPolygon(true));
        self.dirty = true;
        Ok(())
    }

    /// Remove the last point of the shape being drawn.
    pub fn undo_last_point(&mut self) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        if current.is_closed() {
            return;
        }
        current.pop_point();
        if current.is_empty() {
            self.current = None;
            self.line = Shape::new();
            self.emit(CanvasEvent::DrawingPolygon(false));
        } else if let Some(&last) = current.points().last() {
            self.line = Shape::start(last);
        }
        self.dirty = true;
    }

    // ------------------------------------------------------------------------
    // Bulk (re)initialization
    // ------------------------------------------------------------------------

    fn clear_interaction(&mut self) {
        self.current = None;
        self.line = Shape::new();
        self.selected.clear();
        self.selected_copy.clear();
        self.hover = HoverState::default();
        self.prev_point = None;
        self.prev_move_point = None;
        self.moving_shape = false;
        self.h_shape_is_selected = false;
        self.hiding = false;
    }

    /// Install a new image. With `clear_shapes`, the collection and history
    /// start over from an empty baseline.
    pub fn load_pixmap(&mut self, size: Size, clear_shapes: bool) {
        self.viewport.set_image_size(size);
        if clear_shapes {
            self.shapes.clear();
            self.visible.clear();
            self.clear_interaction();
            self.history.clear();
            self.history.store(&self.shapes);
        }
        log::debug!("Loaded image {}x{}", size.width, size.height);
        self.dirty = true;
    }

    /// Install shapes from a file or the host. Returns their handles.
    ///
    /// Shapes are given fresh handles. With `replace`, history restarts
    /// from the loaded state.
    pub fn load_shapes(&mut self, shapes: Vec<Shape>, replace: bool) -> Vec<ShapeId> {
        if replace {
            self.shapes.clear();
            self.visible.clear();
            self.selected.clear();
            self.history.clear();
        }
        let mut ids = Vec::with_capacity(shapes.len());
        for mut shape in shapes {
            shape.id = self.alloc_id();
            shape.selected = false;
            shape.highlight_clear();
            ids.push(shape.id);
            self.shapes.push(shape);
        }
        self.history.store(&self.shapes);
        self.current = None;
        self.line = Shape::new();
        self.hover = HoverState::default();
        log::debug!("Loaded {} shape(s)", ids.len());
        self.dirty = true;
        ids
    }

    /// Forget the image and history. Shapes stay until the next `load_pixmap`.
    pub fn reset_state(&mut self) {
        self.viewport.set_image_size(Size::default());
        self.clear_interaction();
        for shape in &mut self.shapes {
            shape.selected = false;
            shape.highlight_clear();
        }
        self.history.clear();
        self.cursor = CursorShape::Default;
        self.dirty = true;
    }

    // ------------------------------------------------------------------------
    // Undo / redo
    // ------------------------------------------------------------------------

    pub fn is_shape_restorable(&self) -> bool {
        self.history.is_restorable()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn install(&mut self, snapshot: Snapshot) {
        self.shapes = snapshot.clone();
        for shape in &mut self.shapes {
            shape.selected = false;
            shape.highlight_clear();
        }
        self.selected.clear();
        self.selected_copy.clear();
        self.hover = HoverState::default();
        self.h_shape_is_selected = false;
        self.moving_shape = false;
        self.hiding = false;
        let shapes = &self.shapes;
        self.visible
            .retain(|id, _| shapes.iter().any(|s| s.id == *id));
        self.history.push_restored(snapshot);
        self.emit(CanvasEvent::ShapesRestored);
        self.dirty = true;
    }

    /// Undo the last action. Does nothing when no earlier state exists.
    pub fn restore_shape(&mut self) {
        if let Some(snapshot) = self.history.restore() {
            self.install(snapshot);
        }
    }

    /// Redo the last undone action.
    pub fn redo_shape(&mut self) {
        if let Some(snapshot) = self.history.redo() {
            self.install(snapshot);
        }
    }

    // ------------------------------------------------------------------------
    // Shape properties
    // ------------------------------------------------------------------------

    /// Rename a shape; stored as its own undo step.
    pub fn set_shape_label(&mut self, id: ShapeId, text: &str) -> Result<(), CanvasError> {
        if text.is_empty() {
            return Err(CanvasError::EmptyLabel);
        }
        let shape = self.shape_mut(id).ok_or(CanvasError::UnknownShape(id))?;
        shape.label = Some(text.to_string());
        self.history.store(&self.shapes);
        self.dirty = true;
        Ok(())
    }

    pub fn set_shape_style(&mut self, id: ShapeId, style: ShapeStyle) -> Result<(), CanvasError> {
        let shape = self.shape_mut(id).ok_or(CanvasError::UnknownShape(id))?;
        shape.style = style;
        self.dirty = true;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Visibility
    // ------------------------------------------------------------------------

    pub fn set_shape_visible(&mut self, id: ShapeId, value: bool) {
        self.visible.insert(id, value);
        self.dirty = true;
    }

    pub fn is_visible(&self, id: ShapeId) -> bool {
        self.visible.get(&id).copied().unwrap_or(true)
    }

    /// Toggle the "hide unselected shapes while something is selected" mode.
    pub fn hide_background_shapes(&mut self, value: bool) {
        self.hide_background = value;
        if !self.selected.is_empty() {
            self.set_hiding(true);
            self.dirty = true;
        }
    }

    fn set_hiding(&mut self, enable: bool) {
        self.hiding = enable && self.hide_background;
    }

    /// True while unselected shapes are hidden.
    pub fn is_hiding(&self) -> bool {
        self.hiding
    }
}
