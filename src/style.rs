//! Shape colors.
//!
//! Every shape carries its own [`ShapeStyle`]. New shapes take the canvas
//! default (from the configuration) and get recolored when a label is
//! assigned, using a color picked by the [`LabelPalette`].

use serde::{Deserialize, Serialize};

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Per-shape color set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeStyle {
    /// Outline of an unselected shape.
    pub line: Color,
    /// Fill of a hovered shape.
    pub fill: Color,
    /// Outline of a selected shape.
    pub select_line: Color,
    /// Fill of a selected shape.
    pub select_fill: Color,
    /// Vertex markers.
    pub vertex_fill: Color,
    /// Vertex markers while a vertex is highlighted.
    pub hvertex_fill: Color,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            line: Color::rgba(0, 255, 0, 128),
            fill: Color::rgba(0, 255, 0, 128),
            select_line: Color::rgba(255, 255, 255, 255),
            select_fill: Color::rgba(0, 255, 0, 155),
            vertex_fill: Color::rgba(0, 255, 0, 255),
            hvertex_fill: Color::rgba(255, 255, 255, 255),
        }
    }
}

impl ShapeStyle {
    /// Derive a style from a label color, keeping the selection/highlight colors.
    pub fn with_label_color(self, color: Color) -> Self {
        Self {
            line: color.with_alpha(128),
            fill: color.with_alpha(128),
            vertex_fill: color.with_alpha(255),
            select_fill: color.with_alpha(155),
            ..self
        }
    }
}

// ============================================================================
// Label palette
// ============================================================================

/// Golden angle in degrees; successive hues land far apart.
const GOLDEN_ANGLE: f32 = 137.5;

/// Hands out distinct label colors.
///
/// Colors are generated along the hue circle in golden-angle steps and a
/// color already in use is never handed out twice.
#[derive(Debug, Clone, Default)]
pub struct LabelPalette {
    next: u32,
    used: Vec<Color>,
}

impl LabelPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a color as taken (e.g. one loaded from an existing annotation).
    pub fn reserve(&mut self, color: Color) {
        if !self.used.contains(&color) {
            self.used.push(color);
        }
    }

    /// Next unused color.
    pub fn next_color(&mut self) -> Color {
        loop {
            let hue = (self.next as f32 * GOLDEN_ANGLE) % 360.0;
            self.next = self.next.wrapping_add(1);
            let color = hsv_to_color(hue, 0.7, 0.9);
            if !self.used.contains(&color) {
                self.used.push(color);
                return color;
            }
        }
    }

    pub fn clear(&mut self) {
        self.next = 0;
        self.used.clear();
    }
}

/// Convert HSV to an opaque color (h in degrees, s and v in 0-1).
fn hsv_to_color(h: f32, s: f32, v: f32) -> Color {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_u8 = |channel: f32| ((channel + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::rgb(to_u8(r), to_u8(g), to_u8(b))
}
