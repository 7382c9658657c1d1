//! Hover state, refreshed as a whole on every pointer move.

use crate::shape::ShapeId;

/// What is under the pointer.
///
/// `vertex` and `edge` are indices into the points of `shape`; neither is
/// set without a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoverState {
    pub shape: Option<ShapeId>,
    pub vertex: Option<usize>,
    pub edge: Option<usize>,
}

impl HoverState {
    pub fn vertex(shape: ShapeId, index: usize) -> Self {
        Self {
            shape: Some(shape),
            vertex: Some(index),
            edge: None,
        }
    }

    pub fn shape(shape: ShapeId, edge: Option<usize>) -> Self {
        Self {
            shape: Some(shape),
            vertex: None,
            edge,
        }
    }

    /// Hovered shape together with the hovered vertex, if both are set.
    pub fn hovered_vertex(&self) -> Option<(ShapeId, usize)> {
        self.shape.zip(self.vertex)
    }

    /// Hovered shape together with the hovered edge, if both are set.
    pub fn hovered_edge(&self) -> Option<(ShapeId, usize)> {
        self.shape.zip(self.edge)
    }

    pub fn is_empty(&self) -> bool {
        self.shape.is_none()
    }
}
