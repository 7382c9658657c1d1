//! Undo/redo history of the shape collection.
//!
//! Every user-visible action stores a deep copy of the whole collection.
//! The top of the undo stack always mirrors the live state, so undoing
//! means dropping the top snapshot and installing the one below it.

use crate::shape::Shape;

/// A deep copy of all shapes, in z-order.
pub type Snapshot = Vec<Shape>;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the shape history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Number of undo steps kept; the stack holds one extra entry for the live state
    pub num_backups: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { num_backups: 10 }
    }
}

// ============================================================================
// Shape History
// ============================================================================

/// Bounded snapshot stack with a redo side.
///
/// - `undo_stack`: snapshots, oldest first, never more than `num_backups + 1`
/// - `redo_stack`: snapshots dropped by [`ShapeHistory::restore`], most recent last
///
/// Storing a new snapshot clears the redo side.
#[derive(Debug, Clone, Default)]
pub struct ShapeHistory {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    config: HistoryConfig,
}

impl ShapeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    fn capacity(&self) -> usize {
        self.config.num_backups + 1
    }

    /// Push a snapshot of `shapes` for a new user action.
    pub fn store(&mut self, shapes: &[Shape]) {
        self.push(shapes.to_vec());
        self.redo_stack.clear();
        log::debug!("📝 History: stored snapshot ({} entries)", self.undo_stack.len());
    }

    /// Re-push a snapshot that was just installed by an undo or redo.
    ///
    /// Unlike [`store`](Self::store) this keeps the redo side intact.
    pub fn push_restored(&mut self, snapshot: Snapshot) {
        self.push(snapshot);
    }

    fn push(&mut self, snapshot: Snapshot) {
        let capacity = self.capacity();
        if self.undo_stack.len() >= capacity {
            let excess = self.undo_stack.len() + 1 - capacity;
            self.undo_stack.drain(..excess);
        }
        self.undo_stack.push(snapshot);
    }

    /// True when an undo step is available (at least two snapshots).
    pub fn is_restorable(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    /// Drop the live snapshot and return the previous one for installation.
    ///
    /// Returns None, changing nothing, when fewer than two snapshots exist.
    pub fn restore(&mut self) -> Option<Snapshot> {
        if !self.is_restorable() {
            return None;
        }
        let current = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        let previous = self.undo_stack.pop();
        log::debug!(
            "↩️ History: restored snapshot ({} left, {} redoable)",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        previous
    }

    /// Take the most recently undone snapshot back.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let snapshot = self.redo_stack.pop()?;
        log::debug!("↪️ History: redo ({} redoable)", self.redo_stack.len());
        Some(snapshot)
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Replace the live snapshot, e.g. after a label was attached to the newest shape.
    pub fn replace_top(&mut self, shapes: &[Shape]) {
        match self.undo_stack.last_mut() {
            Some(top) => *top = shapes.to_vec(),
            None => self.undo_stack.push(shapes.to_vec()),
        }
    }

    /// Remove the live snapshot without keeping it for redo.
    pub fn discard_top(&mut self) -> Option<Snapshot> {
        self.undo_stack.pop()
    }

    /// The live snapshot.
    pub fn last(&self) -> Option<&Snapshot> {
        self.undo_stack.last()
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn config(&self) -> HistoryConfig {
        self.config
    }
}
