//! Label list and unique-label color table.

use crate::shape::ShapeId;
use crate::style::{Color, LabelPalette};

/// One row of the label list, pointing back at its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelItem {
    pub text: String,
    pub shape: ShapeId,
    pub color: Color,
}

/// Labeled shapes in list order (the order objects are saved in).
#[derive(Debug, Clone, Default)]
pub struct LabelList {
    items: Vec<LabelItem>,
    selected: Vec<ShapeId>,
}

impl LabelList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LabelItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: LabelItem) {
        self.items.push(item);
    }

    pub fn find(&self, shape: ShapeId) -> Option<&LabelItem> {
        self.items.iter().find(|item| item.shape == shape)
    }

    /// Update the row for `shape`. Returns false if there is none.
    pub fn set_label(&mut self, shape: ShapeId, text: &str, color: Color) -> bool {
        match self.items.iter_mut().find(|item| item.shape == shape) {
            Some(item) => {
                item.text = text.to_string();
                item.color = color;
                true
            }
            None => false,
        }
    }

    /// Drop the row for `shape`, if any.
    pub fn remove(&mut self, shape: ShapeId) -> Option<LabelItem> {
        self.selected.retain(|id| *id != shape);
        let index = self.items.iter().position(|item| item.shape == shape)?;
        Some(self.items.remove(index))
    }

    /// Mirror the canvas selection. Unknown handles are ignored.
    pub fn select(&mut self, shapes: &[ShapeId]) {
        self.selected = shapes
            .iter()
            .copied()
            .filter(|id| self.find(*id).is_some())
            .collect();
    }

    pub fn selected(&self) -> &[ShapeId] {
        &self.selected
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.selected.clear();
    }
}

/// Every label text seen so far, each with its own color.
///
/// Kept across images so a label keeps its color for the whole session.
#[derive(Debug, Clone, Default)]
pub struct UniqueLabels {
    labels: Vec<(String, Color)>,
    palette: LabelPalette,
}

impl UniqueLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color of `text`, registering it with a fresh color if it is new.
    pub fn color_for(&mut self, text: &str) -> Color {
        if let Some(color) = self.get(text) {
            return color;
        }
        let color = self.palette.next_color();
        log::debug!("New label '{}' colored {:?}", text, color);
        self.labels.push((text.to_string(), color));
        color
    }

    pub fn get(&self, text: &str) -> Option<Color> {
        self.labels
            .iter()
            .find(|(label, _)| label == text)
            .map(|(_, color)| *color)
    }

    pub fn contains(&self, text: &str) -> bool {
        self.get(text).is_some()
    }

    /// Label texts in the order they were first seen.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|(label, _)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
        self.palette.clear();
    }
}
