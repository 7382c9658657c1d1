//! Geometry primitives in image space.
//!
//! Points, rectangles and image bounds, plus the distance helpers used by
//! hit-testing (distance to a point, distance to a line segment).

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Neg, Sub, SubAssign};

// ============================================================================
// Point
// ============================================================================

/// A 2D point (or offset) in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// The origin, also used as the "no offset" value.
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length of this point treated as a vector.
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: Point) -> f32 {
        (*self - other).length()
    }

    /// Dot product of two vectors.
    pub fn dot(&self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 2D cross product.
    pub fn cross(&self, other: Point) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// True if both components are exactly zero.
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Round both components to the nearest whole pixel.
    pub fn round(&self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Div<f32> for Point {
    type Output = Point;

    fn div(self, rhs: f32) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

/// Distance from `point` to the segment `start`-`end`.
///
/// Points projecting before the start measure to `start`, points projecting
/// past the end measure to `end`, everything else gets the perpendicular
/// distance. A zero-length segment reports a distance of 0.
pub fn distance_to_segment(point: Point, start: Point, end: Point) -> f32 {
    if (point - start).dot(end - start) < 0.0 {
        return point.distance_to(start);
    }
    if (point - end).dot(start - end) < 0.0 {
        return point.distance_to(end);
    }
    let length = (end - start).length();
    if length == 0.0 {
        return 0.0;
    }
    (end - start).cross(start - point).abs() / length
}

// ============================================================================
// Rect
// ============================================================================

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge X coordinate
    pub x: f32,
    /// Top edge Y coordinate
    pub y: f32,
    /// Width of the rectangle
    pub width: f32,
    /// Height of the rectangle
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a normalized rectangle from two opposite corners given in any order.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let x = p1.x.min(p2.x);
        let y = p1.y.min(p2.y);
        let width = (p1.x - p2.x).abs();
        let height = (p1.y - p2.y).abs();
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if a point is inside the rectangle (edges included).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }
}

// ============================================================================
// Image bounds
// ============================================================================

/// Pixel dimensions of the loaded image.
///
/// Valid image coordinates run from 0 to `width - 1` and `height - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if no image is loaded (either dimension is zero).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Largest valid X coordinate.
    pub fn max_x(&self) -> f32 {
        self.width as f32 - 1.0
    }

    /// Largest valid Y coordinate.
    pub fn max_y(&self) -> f32 {
        self.height as f32 - 1.0
    }

    /// Check whether a point lies on the image.
    pub fn contains(&self, point: Point) -> bool {
        (0.0..=self.max_x()).contains(&point.x) && (0.0..=self.max_y()).contains(&point.y)
    }

    /// Clamp an out-of-image point onto the nearest image border.
    pub fn intersection_point(&self, point: Point) -> Point {
        let x = point.x.clamp(0.0, self.max_x().max(0.0));
        let y = point.y.clamp(0.0, self.max_y().max(0.0));
        Point::new(x, y)
    }
}
