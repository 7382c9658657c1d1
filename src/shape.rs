//! A single annotated rectangle.
//!
//! A shape is defined by at most two points: one while it is being drawn,
//! two (opposite corners, in drawing order) once it is finished. Hit-testing
//! and rendering data are computed from those points on demand.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::geometry::{Point, Rect, distance_to_segment};
use crate::style::{Color, ShapeStyle};

/// Maximum number of points a rectangle can hold.
pub const MAX_POINTS: usize = 2;

/// Stable handle of a shape owned by the canvas.
///
/// Handles are never reused while the canvas lives, so a stale handle held
/// by the host simply fails to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ShapeId(pub(crate) u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised when an operation would break a shape's point invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("a rectangle holds at most {MAX_POINTS} points")]
    TooManyPoints,

    #[error("point index {index} out of range for a shape with {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot render a shape with {0} points")]
    InvalidPointCount(usize),
}

/// How a highlighted vertex is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightMode {
    /// The vertex is grabbed for dragging: enlarged 1.5x, square marker.
    MoveVertex,
    /// The pointer is near the vertex: enlarged 4x, round marker.
    #[default]
    NearVertex,
}

impl HighlightMode {
    /// Size multiplier and marker used for the highlighted vertex.
    pub fn settings(self) -> (f32, VertexMarker) {
        match self {
            HighlightMode::MoveVertex => (1.5, VertexMarker::Square),
            HighlightMode::NearVertex => (4.0, VertexMarker::Round),
        }
    }
}

/// Vertex marker geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexMarker {
    Square,
    #[default]
    Round,
}

/// A rectangle annotation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    pub(crate) id: ShapeId,
    points: Vec<Point>,
    /// Label text (None until the label dialog has been answered)
    pub label: Option<String>,
    pub group_id: Option<u32>,
    pub flags: Option<BTreeMap<String, bool>>,
    /// Free-form auxiliary data
    pub other_data: BTreeMap<String, Value>,
    closed: bool,
    pub(crate) selected: bool,
    highlight_index: Option<usize>,
    highlight_mode: HighlightMode,
    pub style: ShapeStyle,
}

impl Shape {
    /// Create an empty, open shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a finished rectangle from two opposite corners.
    pub fn rectangle(p1: Point, p2: Point) -> Self {
        Self {
            points: vec![p1, p2],
            closed: true,
            ..Self::default()
        }
    }

    /// Start drawing a shape at `point`.
    pub fn start(point: Point) -> Self {
        Self {
            points: vec![point],
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn highlight_index(&self) -> Option<usize> {
        self.highlight_index
    }

    pub fn highlight_mode(&self) -> HighlightMode {
        self.highlight_mode
    }

    // ------------------------------------------------------------------------
    // Point editing
    // ------------------------------------------------------------------------

    /// Append a point. A point equal to the first one closes the shape instead.
    pub fn add_point(&mut self, point: Point) -> Result<(), ShapeError> {
        if self.points.first() == Some(&point) {
            self.close();
            return Ok(());
        }
        if self.points.len() >= MAX_POINTS {
            return Err(ShapeError::TooManyPoints);
        }
        self.points.push(point);
        Ok(())
    }

    pub fn pop_point(&mut self) -> Option<Point> {
        self.points.pop()
    }

    pub fn insert_point(&mut self, index: usize, point: Point) -> Result<(), ShapeError> {
        let len = self.points.len();
        if index > len {
            return Err(ShapeError::IndexOutOfRange { index, len });
        }
        if len >= MAX_POINTS {
            return Err(ShapeError::TooManyPoints);
        }
        self.points.insert(index, point);
        Ok(())
    }

    pub fn remove_point(&mut self, index: usize) -> Result<Point, ShapeError> {
        let len = self.points.len();
        if index >= len {
            return Err(ShapeError::IndexOutOfRange { index, len });
        }
        Ok(self.points.remove(index))
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn set_open(&mut self) {
        self.closed = false;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // ------------------------------------------------------------------------
    // Hit-testing
    // ------------------------------------------------------------------------

    /// Index of the closest vertex within `epsilon`, first one wins on ties.
    pub fn nearest_vertex(&self, point: Point, epsilon: f32) -> Option<usize> {
        let mut min_distance = f32::INFINITY;
        let mut nearest = None;
        for (i, p) in self.points.iter().enumerate() {
            let distance = p.distance_to(point);
            if distance <= epsilon && distance < min_distance {
                min_distance = distance;
                nearest = Some(i);
            }
        }
        nearest
    }

    /// End index of the closest edge within `epsilon`.
    ///
    /// Edge `i` runs from point `i - 1` (wrapping to the last point) to point `i`.
    pub fn nearest_edge(&self, point: Point, epsilon: f32) -> Option<usize> {
        let len = self.points.len();
        let mut min_distance = f32::INFINITY;
        let mut nearest = None;
        for i in 0..len {
            let start = self.points[(i + len - 1) % len];
            let end = self.points[i];
            let distance = distance_to_segment(point, start, end);
            if distance <= epsilon && distance < min_distance {
                min_distance = distance;
                nearest = Some(i);
            }
        }
        nearest
    }

    /// Normalized (min, max) corners of a finished rectangle.
    pub fn corners(&self) -> Option<(Point, Point)> {
        match self.points.as_slice() {
            [a, b] => Some((
                Point::new(a.x.min(b.x), a.y.min(b.y)),
                Point::new(a.x.max(b.x), a.y.max(b.y)),
            )),
            _ => None,
        }
    }

    /// True if the point lies inside the rectangle, edges included.
    pub fn contains_point(&self, point: Point) -> bool {
        self.corners()
            .is_some_and(|(min, max)| Rect::from_corners(min, max).contains(point))
    }

    /// Bounding rectangle of all points; zero-sized for a single point.
    pub fn bounding_rect(&self) -> Option<Rect> {
        let (first, rest) = self.points.split_first()?;
        let start = Rect::new(first.x, first.y, 0.0, 0.0);
        Some(rest.iter().fold(start, |rect, p| {
            rect.union(&Rect::new(p.x, p.y, 0.0, 0.0))
        }))
    }

    // ------------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------------

    pub fn move_by(&mut self, offset: Point) {
        for p in &mut self.points {
            *p += offset;
        }
    }

    pub fn move_vertex_by(&mut self, index: usize, offset: Point) -> Result<(), ShapeError> {
        let len = self.points.len();
        let p = self
            .points
            .get_mut(index)
            .ok_or(ShapeError::IndexOutOfRange { index, len })?;
        *p += offset;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Highlight
    // ------------------------------------------------------------------------

    pub fn highlight_vertex(&mut self, index: usize, mode: HighlightMode) {
        self.highlight_index = Some(index);
        self.highlight_mode = mode;
    }

    pub fn highlight_clear(&mut self) {
        self.highlight_index = None;
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Compute what to draw for this shape at the given view scale.
    ///
    /// Sizes are in image units, so markers keep a constant on-screen size
    /// at any zoom level.
    pub fn paint(&self, scale: f32, point_size: f32, fill: bool) -> Result<ShapePaint, ShapeError> {
        let len = self.points.len();
        if !(1..=MAX_POINTS).contains(&len) {
            return Err(ShapeError::InvalidPointCount(len));
        }

        let outline = self.corners().map(|(min, max)| Rect::from_corners(min, max));
        let base = point_size / scale;
        let vertices = self
            .points
            .iter()
            .enumerate()
            .map(|(i, &center)| {
                if self.highlight_index == Some(i) {
                    let (multiplier, marker) = self.highlight_mode.settings();
                    VertexPaint {
                        center,
                        diameter: base * multiplier,
                        marker,
                    }
                } else {
                    VertexPaint {
                        center,
                        diameter: base,
                        marker: VertexMarker::Round,
                    }
                }
            })
            .collect();

        let line_color = if self.selected {
            self.style.select_line
        } else {
            self.style.line
        };
        let vertex_color = if self.highlight_index.is_some() {
            self.style.hvertex_fill
        } else {
            self.style.vertex_fill
        };
        let fill = fill.then(|| {
            if self.selected {
                self.style.select_fill
            } else {
                self.style.fill
            }
        });

        Ok(ShapePaint {
            outline,
            vertices,
            pen_width: (2.0 / scale).round().max(1.0),
            line_color,
            vertex_color,
            fill,
        })
    }
}

/// Rendering data for one shape, in image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePaint {
    /// Rectangle outline (None while only one point exists)
    pub outline: Option<Rect>,
    pub vertices: Vec<VertexPaint>,
    pub pen_width: f32,
    pub line_color: Color,
    pub vertex_color: Color,
    /// Interior fill, if the shape is drawn filled
    pub fill: Option<Color>,
}

/// A vertex marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexPaint {
    pub center: Point,
    pub diameter: f32,
    pub marker: VertexMarker,
}
