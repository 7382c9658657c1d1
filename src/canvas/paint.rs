//! Display list produced for the renderer.
//!
//! Everything in a [`Frame`] is in image coordinates; the renderer applies
//! `scale` and then `translate` (the centering offset) once for the whole
//! frame, draws the image at the origin and then the items in order.

use super::Canvas;
use crate::geometry::{Point, Size};
use crate::shape::{MAX_POINTS, Shape, ShapeId, ShapePaint};

/// Which pass an item belongs to, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    /// Finished shapes
    Shape,
    /// The shape being drawn
    Current,
    /// Rubber band from the first corner to the pointer
    RubberBand,
    /// Copy preview of a right-button drag
    Shadow,
}

/// One shape to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameItem {
    pub shape: ShapeId,
    pub layer: Layer,
    pub paint: ShapePaint,
}

/// A complete frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub scale: f32,
    /// Centering offset in image units, applied after scaling
    pub translate: Point,
    /// Background image size (drawn at the origin)
    pub image: Size,
    pub items: Vec<FrameItem>,
}

impl Frame {
    /// Items of a single layer.
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &FrameItem> {
        self.items.iter().filter(move |item| item.layer == layer)
    }
}

impl Canvas {
    fn paint_shape(&self, shape: &Shape, layer: Layer, fill: bool) -> Option<FrameItem> {
        debug_assert!(
            (1..=MAX_POINTS).contains(&shape.len()),
            "shape {} has {} points",
            shape.id(),
            shape.len()
        );
        match shape.paint(self.viewport.scale, self.config.point_size, fill) {
            Ok(paint) => Some(FrameItem {
                shape: shape.id(),
                layer,
                paint,
            }),
            Err(e) => {
                log::warn!("Skipping shape {}: {}", shape.id(), e);
                None
            }
        }
    }

    /// Build the display list for the current state.
    pub fn paint(&self) -> Frame {
        let mut items = Vec::new();

        for shape in &self.shapes {
            if (shape.is_selected() || !self.hiding) && self.is_visible(shape.id()) {
                let fill = shape.is_selected() || self.hover.shape == Some(shape.id());
                items.extend(self.paint_shape(shape, Layer::Shape, fill));
            }
        }

        if let Some(current) = &self.current {
            items.extend(self.paint_shape(current, Layer::Current, false));
            if !self.line.is_empty() {
                items.extend(self.paint_shape(&self.line, Layer::RubberBand, false));
            }
        }

        for shape in &self.selected_copy {
            items.extend(self.paint_shape(shape, Layer::Shadow, false));
        }

        Frame {
            scale: self.viewport.scale,
            translate: self.viewport.offset_to_center(),
            image: self.viewport.image_size(),
            items,
        }
    }
}
