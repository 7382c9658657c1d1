//! Pointer handling: hover hit-testing, drawing, selection and dragging.

use super::{Canvas, CanvasError, CanvasEvent, CursorShape, HoverState, Modifiers, PointerButton, PointerButtons};
use crate::config::DoubleClick;
use crate::constants::DUPLICATE_SHIFT;
use crate::geometry::Point;
use crate::shape::{HighlightMode, MAX_POINTS, Shape, ShapeId};

impl Canvas {
    // ------------------------------------------------------------------------
    // Pointer events
    // ------------------------------------------------------------------------

    /// Pointer moved to `widget_pos` with `buttons` held.
    pub fn mouse_move(&mut self, widget_pos: Point, buttons: PointerButtons) {
        let pos = self.viewport.transform_pos(widget_pos);
        let size = self.viewport.image_size();
        self.prev_move_point = Some(pos);
        self.cursor = CursorShape::Default;
        self.dirty = true;

        if self.drawing() {
            self.cursor = CursorShape::Draw;
            let Some(current) = self.current.as_mut() else {
                return;
            };
            let pos = if size.contains(pos) {
                pos
            } else {
                size.intersection_point(pos)
            };
            if let Some(&first) = current.points().first() {
                self.line = Shape::rectangle(first, pos).with_style(self.default_style);
            }
            current.highlight_clear();
            return;
        }

        // Right drag previews a copy of the selection
        if buttons == PointerButtons::RIGHT {
            if !self.selected_copy.is_empty() && self.prev_point.is_some() {
                self.cursor = CursorShape::Move;
                if let Some(delta) = self.bounded_move_delta(pos) {
                    for shape in &mut self.selected_copy {
                        shape.move_by(delta);
                    }
                }
            } else if !self.selected.is_empty() {
                self.selected_copy = self.selected_shapes().cloned().collect();
                log::trace!("Copy shadow of {} shape(s)", self.selected_copy.len());
            }
            return;
        }

        // Left drag moves a vertex or the whole selection
        if buttons == PointerButtons::LEFT {
            let pos = if size.contains(pos) {
                pos
            } else {
                size.intersection_point(pos)
            };
            if let Some((id, index)) = self.hover.hovered_vertex() {
                self.bounded_move_vertex(id, index, pos);
                self.moving_shape = true;
            } else if !self.selected.is_empty() && self.prev_point.is_some() {
                self.cursor = CursorShape::Move;
                if let Some(delta) = self.bounded_move_delta(pos) {
                    for id in self.selected.clone() {
                        if let Some(shape) = self.shape_mut(id) {
                            shape.move_by(delta);
                        }
                    }
                }
                self.moving_shape = true;
            }
            return;
        }

        self.update_hover(pos);
    }

    /// Topmost-first hit test over the visible shapes.
    fn update_hover(&mut self, pos: Point) {
        let had_vertex = self.hover.vertex.is_some();
        self.tooltip = "Image".to_string();

        let epsilon = self.config.epsilon;
        let vertex_epsilon = epsilon / self.viewport.scale;
        let found = self
            .shapes
            .iter()
            .rev()
            .filter(|shape| self.is_visible(shape.id))
            .find_map(|shape| {
                if let Some(index) = shape.nearest_vertex(pos, vertex_epsilon) {
                    Some(HoverState::vertex(shape.id, index))
                } else if shape.contains_point(pos) {
                    // Edge tolerance is in image units, not divided by scale
                    Some(HoverState::shape(shape.id, shape.nearest_edge(pos, epsilon)))
                } else {
                    None
                }
            });

        match found {
            Some(hover) => {
                if let Some(shape) = self
                    .hover
                    .hovered_vertex()
                    .and_then(|(id, _)| self.shape_mut(id))
                {
                    shape.highlight_clear();
                }
                self.hover = hover;
                match hover.hovered_vertex() {
                    Some((id, index)) => {
                        if let Some(shape) = self.shape_mut(id) {
                            shape.highlight_vertex(index, HighlightMode::MoveVertex);
                        }
                        self.cursor = CursorShape::Point;
                        self.tooltip = "Click & drag to move point".to_string();
                    }
                    None => {
                        let label = hover
                            .shape
                            .and_then(|id| self.shape(id))
                            .and_then(|shape| shape.label.clone())
                            .unwrap_or_default();
                        self.cursor = CursorShape::Grab;
                        self.tooltip = format!("Click & drag to move shape {label}");
                    }
                }
            }
            None => self.un_highlight(),
        }

        let has_vertex = self.hover.vertex.is_some();
        if has_vertex != had_vertex {
            self.emit(CanvasEvent::VertexSelected(has_vertex));
        }
    }

    /// Pointer button pressed at `widget_pos`.
    pub fn mouse_press(&mut self, widget_pos: Point, button: PointerButton, modifiers: Modifiers) {
        let pos = self.viewport.transform_pos(widget_pos);
        let multi = modifiers.is_multi_select();
        match button {
            PointerButton::Left if self.drawing() => {
                if let Some(current) = self.current.take() {
                    self.commit_rubber_band(current, pos);
                } else if self.viewport.image_size().contains(pos) {
                    self.current = Some(Shape::start(pos).with_style(self.default_style));
                    self.line = Shape::new();
                    log::trace!("Started shape at ({}, {})", pos.x, pos.y);
                    self.emit(CanvasEvent::DrawingPolygon(true));
                }
            }
            PointerButton::Left => {
                if self.hover.hovered_edge().is_some() {
                    self.add_point_to_edge();
                }
                self.select_shape_point(pos, multi);
                self.prev_point = Some(pos);
            }
            PointerButton::Right if self.editing() => {
                let hovered_unselected = self
                    .hover
                    .shape
                    .is_some_and(|id| !self.selected.contains(&id));
                if self.selected.is_empty() || hovered_unselected {
                    self.select_shape_point(pos, multi);
                } else {
                    // Drag bounds must be relative to this anchor
                    self.calculate_offsets(pos);
                }
                self.prev_point = Some(pos);
            }
            _ => {}
        }
        self.dirty = true;
    }

    /// Finish the shape being drawn with the rubber-band corner.
    fn commit_rubber_band(&mut self, current: Shape, press: Point) {
        let Some(&first) = current.points().first() else {
            return;
        };
        let second = match self.line.points() {
            [_, second] => *second,
            // No move since the first press: use the press itself
            _ => self.viewport.image_size().intersection_point(press),
        };
        let mut shape = Shape::rectangle(first, second).with_style(current.style);
        shape.label = current.label;
        shape.group_id = current.group_id;
        shape.flags = current.flags;
        shape.other_data = current.other_data;
        self.finalise(shape);
    }

    /// Pointer button released at `widget_pos`.
    pub fn mouse_release(&mut self, widget_pos: Point, button: PointerButton) {
        match button {
            PointerButton::Right => {
                self.cursor = CursorShape::Default;
                let has_copy = !self.selected_copy.is_empty();
                self.emit(CanvasEvent::ContextMenuRequested {
                    position: widget_pos,
                    has_copy,
                });
            }
            PointerButton::Left if self.editing() => {
                // Click on an already selected shape without dragging narrows the selection
                if let Some(id) = self.hover.shape.filter(|_| self.h_shape_is_selected) {
                    if !self.moving_shape {
                        let narrowed: Vec<ShapeId> =
                            self.selected.iter().copied().filter(|s| *s != id).collect();
                        self.set_selection(narrowed);
                    }
                }
            }
            _ => {}
        }

        if self.moving_shape {
            if self.points_changed_since_snapshot() {
                self.history.store(&self.shapes);
                log::debug!("Shapes moved");
                self.emit(CanvasEvent::ShapeMoved);
            }
            self.moving_shape = false;
        }
        self.dirty = true;
    }

    /// Double-click closes a polygon of at least four points when configured.
    ///
    /// Rectangles finalize on their second press and never hold more than
    /// two points, so this only matters for shapes with a larger capacity.
    pub fn mouse_double_click(&mut self) {
        if self.config.double_click != DoubleClick::Close || !self.drawing() {
            return;
        }
        let Some(mut current) = self.current.take() else {
            return;
        };
        if current.len() > 3 {
            current.pop_point();
            self.finalise(current);
        } else {
            self.current = Some(current);
        }
    }

    /// Pointer left the widget.
    pub fn leave(&mut self) {
        let had_vertex = self.hover.vertex.is_some();
        self.un_highlight();
        self.cursor = CursorShape::Default;
        if had_vertex {
            self.emit(CanvasEvent::VertexSelected(false));
        }
    }

    pub(super) fn un_highlight(&mut self) {
        if let Some(id) = self.hover.shape {
            if let Some(shape) = self.shape_mut(id) {
                shape.highlight_clear();
            }
            self.dirty = true;
        }
        self.hover = HoverState::default();
    }

    // ------------------------------------------------------------------------
    // Selection by point
    // ------------------------------------------------------------------------

    fn select_shape_point(&mut self, point: Point, multi: bool) {
        if let Some((id, index)) = self.hover.hovered_vertex() {
            // Grabbing a vertex is not a shape selection
            if let Some(shape) = self.shape_mut(id) {
                shape.highlight_vertex(index, HighlightMode::MoveVertex);
            }
        } else {
            let hit = self
                .shapes
                .iter()
                .rev()
                .find(|shape| self.is_visible(shape.id) && shape.contains_point(point))
                .map(|shape| shape.id);
            if let Some(id) = hit {
                self.set_hiding(true);
                if self.selected.contains(&id) {
                    self.h_shape_is_selected = true;
                } else {
                    let mut selection = if multi {
                        self.selected.clone()
                    } else {
                        Vec::new()
                    };
                    selection.push(id);
                    self.set_selection(selection);
                    self.h_shape_is_selected = false;
                }
                self.calculate_offsets(point);
                return;
            }
        }
        self.deselect_shape();
    }

    /// Record the selection's bounding box relative to the drag anchor.
    fn calculate_offsets(&mut self, point: Point) {
        let size = self.viewport.image_size();
        let mut left = size.max_x();
        let mut right = 0.0_f32;
        let mut top = size.max_y();
        let mut bottom = 0.0_f32;
        for rect in self.selected_shapes().filter_map(Shape::bounding_rect) {
            left = left.min(rect.left());
            right = right.max(rect.right());
            top = top.min(rect.top());
            bottom = bottom.max(rect.bottom());
        }
        self.offsets = (
            Point::new(left - point.x, top - point.y),
            Point::new(right - point.x, bottom - point.y),
        );
    }

    // ------------------------------------------------------------------------
    // Bounded movement
    // ------------------------------------------------------------------------

    /// Translation from the drag anchor to `pos`, clamped so the selection's
    /// bounding box stays on the image. Advances the anchor when non-zero.
    fn bounded_move_delta(&mut self, pos: Point) -> Option<Point> {
        let size = self.viewport.image_size();
        if !size.contains(pos) {
            return None;
        }
        let prev = self.prev_point?;
        let (min_offset, max_offset) = self.offsets;
        let mut pos = pos;

        let o1 = pos + min_offset;
        if !size.contains(o1) {
            pos -= Point::new(o1.x.min(0.0), o1.y.min(0.0));
        }
        let o2 = pos + max_offset;
        if !size.contains(o2) {
            pos += Point::new(
                (size.max_x() - o2.x).min(0.0),
                (size.max_y() - o2.y).min(0.0),
            );
        }

        let delta = pos - prev;
        if delta.is_zero() {
            return None;
        }
        self.prev_point = Some(pos);
        Some(delta)
    }

    fn bounded_move_vertex(&mut self, id: ShapeId, index: usize, pos: Point) {
        let Some(shape) = self.shape_mut(id) else {
            return;
        };
        let Some(&point) = shape.points().get(index) else {
            return;
        };
        if let Err(e) = shape.move_vertex_by(index, pos - point) {
            log::warn!("Vertex move rejected on shape {}: {}", id, e);
        }
    }

    /// Insert a vertex on the hovered edge at the last pointer position.
    fn add_point_to_edge(&mut self) {
        let Some((id, index)) = self.hover.hovered_edge() else {
            return;
        };
        let Some(point) = self.prev_move_point else {
            return;
        };
        let Some(shape) = self.shape_mut(id) else {
            return;
        };
        if shape.len() >= MAX_POINTS {
            return;
        }
        match shape.insert_point(index, point) {
            Ok(()) => {
                shape.highlight_vertex(index, HighlightMode::MoveVertex);
                self.hover = HoverState::vertex(id, index);
                self.moving_shape = true;
            }
            Err(e) => log::debug!("Edge split skipped on shape {}: {}", id, e),
        }
    }

    // ------------------------------------------------------------------------
    // Copy / duplicate
    // ------------------------------------------------------------------------

    /// Answer to `ContextMenuRequested`: commit the dragged shadow either as
    /// new shapes (`copy`) or as the new position of the selection.
    ///
    /// Fails when no shadow matching the selection exists.
    pub fn end_move(&mut self, copy: bool) -> Result<(), CanvasError> {
        if self.selected.is_empty()
            || self.selected_copy.is_empty()
            || self.selected.len() != self.selected_copy.len()
        {
            return Err(CanvasError::NoCopyInProgress);
        }
        let copies = std::mem::take(&mut self.selected_copy);

        if copy {
            let mut new_ids = Vec::with_capacity(copies.len());
            for mut shape in copies {
                shape.id = self.alloc_id();
                shape.highlight_clear();
                new_ids.push(shape.id);
                self.shapes.push(shape);
            }
            self.history.store(&self.shapes);
            log::debug!("Copied {} shape(s)", new_ids.len());
            self.emit(CanvasEvent::ShapesDuplicated(new_ids.clone()));
            self.set_selection(new_ids);
        } else {
            for (id, moved) in self.selected.clone().into_iter().zip(copies) {
                let Some(shape) = self.shape_mut(id) else {
                    continue;
                };
                if let (Some(&from), Some(&to)) = (shape.points().first(), moved.points().first()) {
                    shape.move_by(to - from);
                }
            }
            self.history.store(&self.shapes);
            self.emit(CanvasEvent::ShapeMoved);
        }
        self.dirty = true;
        Ok(())
    }

    /// Context menu dismissed: drop the shadow.
    pub fn cancel_copy_move(&mut self) {
        if !self.selected_copy.is_empty() {
            self.selected_copy.clear();
            self.dirty = true;
        }
    }

    /// Nudge shapes by a couple of pixels, up-left if possible, else down-right.
    pub fn bounded_shift_shapes(&mut self, ids: &[ShapeId]) {
        let Some(point) = ids
            .first()
            .and_then(|id| self.shape(*id))
            .and_then(|shape| shape.points().first().copied())
        else {
            return;
        };
        let offset = Point::new(DUPLICATE_SHIFT, DUPLICATE_SHIFT);
        self.offsets = (Point::ZERO, Point::ZERO);
        self.prev_point = Some(point);
        let delta = self
            .bounded_move_delta(point - offset)
            .or_else(|| self.bounded_move_delta(point + offset));
        if let Some(delta) = delta {
            for id in ids {
                if let Some(shape) = self.shape_mut(*id) {
                    shape.move_by(delta);
                }
            }
        }
    }

    /// Copy the selection in place, shift the copies into view and select them.
    pub fn duplicate_selected(&mut self) -> Vec<ShapeId> {
        if self.selected.is_empty() {
            return Vec::new();
        }
        let copies: Vec<Shape> = self.selected_shapes().cloned().collect();
        let mut new_ids = Vec::with_capacity(copies.len());
        for mut shape in copies {
            shape.id = self.alloc_id();
            shape.highlight_clear();
            new_ids.push(shape.id);
            self.shapes.push(shape);
        }
        self.bounded_shift_shapes(&new_ids);
        self.history.store(&self.shapes);
        self.emit(CanvasEvent::ShapesDuplicated(new_ids.clone()));
        self.set_selection(new_ids.clone());
        new_ids
    }

    /// Compare the live shapes against the newest snapshot.
    fn points_changed_since_snapshot(&self) -> bool {
        match self.history.last() {
            None => true,
            Some(snapshot) => {
                snapshot.len() != self.shapes.len()
                    || self
                        .shapes
                        .iter()
                        .zip(snapshot)
                        .any(|(live, stored)| live.points() != stored.points())
            }
        }
    }
}
