//! Mapping between widget coordinates and image coordinates.
//!
//! The image is drawn scaled by `scale` and, when the widget is larger than
//! the scaled image, centered inside it. Shapes always live in image space.

use crate::constants::FIT_MARGIN;
use crate::geometry::{Point, Size};

/// Zoom level and widget area of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f32,
    /// Widget area in screen pixels
    pub widget_width: f32,
    pub widget_height: f32,
    image: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            widget_width: 0.0,
            widget_height: 0.0,
            image: Size::default(),
        }
    }
}

impl Viewport {
    pub fn new(image: Size, scale: f32) -> Self {
        Self {
            scale,
            image,
            ..Self::default()
        }
    }

    pub fn image_size(&self) -> Size {
        self.image
    }

    pub fn set_image_size(&mut self, image: Size) {
        self.image = image;
    }

    pub fn set_widget_size(&mut self, width: f32, height: f32) {
        self.widget_width = width;
        self.widget_height = height;
    }

    /// Translation (in image units) that centers the scaled image in the widget.
    ///
    /// Truncated to whole units, and zero along an axis where the image does
    /// not fit.
    pub fn offset_to_center(&self) -> Point {
        let s = self.scale;
        let w = self.image.width as f32 * s;
        let h = self.image.height as f32 * s;
        let x = if self.widget_width > w {
            (self.widget_width - w) / (2.0 * s)
        } else {
            0.0
        };
        let y = if self.widget_height > h {
            (self.widget_height - h) / (2.0 * s)
        } else {
            0.0
        };
        Point::new(x.trunc(), y.trunc())
    }

    /// Convert a widget position to image coordinates, snapped to whole pixels.
    pub fn transform_pos(&self, widget_pos: Point) -> Point {
        (widget_pos / self.scale).round() - self.offset_to_center()
    }

    /// Convert an image position back to widget coordinates.
    pub fn to_widget(&self, image_pos: Point) -> Point {
        let offset = self.offset_to_center();
        Point::new(
            (image_pos.x + offset.x) * self.scale,
            (image_pos.y + offset.y) * self.scale,
        )
    }

    /// Scale that shows the whole image inside the widget.
    ///
    /// The limiting axis is the one whose aspect ratio is tighter. `None`
    /// without an image or when the widget is too small to leave a margin.
    pub fn fit_window_scale(&self) -> Option<f32> {
        if self.image.is_empty() {
            return None;
        }
        let w1 = self.widget_width - FIT_MARGIN;
        let h1 = self.widget_height - FIT_MARGIN;
        if w1 <= 0.0 || h1 <= 0.0 {
            return None;
        }
        let w2 = self.image.width as f32;
        let h2 = self.image.height as f32;
        if w2 / h2 >= w1 / h1 {
            Some(w1 / w2)
        } else {
            Some(h1 / h2)
        }
    }

    /// Scale that makes the image as wide as the widget.
    pub fn fit_width_scale(&self) -> Option<f32> {
        let w = self.widget_width - FIT_MARGIN;
        if self.image.is_empty() || w <= 0.0 {
            return None;
        }
        Some(w / self.image.width as f32)
    }

    /// Preferred widget size: the scaled image.
    pub fn size_hint(&self) -> (f32, f32) {
        (
            self.image.width as f32 * self.scale,
            self.image.height as f32 * self.scale,
        )
    }
}
