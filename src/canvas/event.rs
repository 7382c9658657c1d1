//! Pointer input and change notifications exchanged with the host.

use crate::geometry::Point;
use crate::shape::ShapeId;

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Set of buttons held during a pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerButtons {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
}

impl PointerButtons {
    pub const NONE: PointerButtons = PointerButtons {
        left: false,
        right: false,
        middle: false,
    };
    pub const LEFT: PointerButtons = PointerButtons {
        left: true,
        ..Self::NONE
    };
    pub const RIGHT: PointerButtons = PointerButtons {
        right: true,
        ..Self::NONE
    };

    /// True if no button is held.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

impl From<PointerButton> for PointerButtons {
    fn from(button: PointerButton) -> Self {
        match button {
            PointerButton::Left => Self::LEFT,
            PointerButton::Right => Self::RIGHT,
            PointerButton::Middle => PointerButtons {
                middle: true,
                ..Self::NONE
            },
        }
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    /// Multi-selection is enabled by Ctrl held on its own.
    pub fn is_multi_select(&self) -> bool {
        *self == Self::CTRL
    }
}

/// Cursor the host should show over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Default,
    /// Pointing hand over a grabbable vertex
    Point,
    /// Cross while in create mode
    Draw,
    /// Closed hand while dragging
    Move,
    /// Open hand over a shape
    Grab,
}

/// Notifications queued by the canvas; drained with [`Canvas::take_events`](super::Canvas::take_events).
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// A shape was finalized and appended; the host should ask for its label.
    NewShape(ShapeId),
    /// The selection changed to the given shapes.
    SelectionChanged(Vec<ShapeId>),
    /// A drag that moved points finished.
    ShapeMoved,
    /// Vertex hover state changed.
    VertexSelected(bool),
    /// Drawing a shape started (true) or was abandoned (false).
    DrawingPolygon(bool),
    /// Right button released; the host shows a menu and answers with
    /// `end_move` or `cancel_copy_move`.
    ContextMenuRequested { position: Point, has_copy: bool },
    /// Shapes were removed; the host drops their handles.
    ShapesDeleted(Vec<ShapeId>),
    /// Copies of the selection were added under new handles.
    ShapesDuplicated(Vec<ShapeId>),
    /// An undo or redo replaced the whole collection.
    ShapesRestored,
}
