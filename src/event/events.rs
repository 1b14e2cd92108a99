use crate::canvas::DragMode;
use crate::geometry::{Point, Rect, Vec2};
use crate::shape::{Shape, ShapeId};

/// Tag used to key subscriptions on the [`EventBus`](super::EventBus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ShapeHover,
    SelectionChanged,
    SelectionRelocated,
    SelectionBand,
    BasicShapeAdd,
    DragModeChanged,
    ViewChanged,
}

/// Everything the engine tells the view layer.
#[derive(Debug, Clone)]
pub enum EditorEvent {
    /// The pointer entered (`on`) or left a shape.
    ShapeHover { shape: ShapeId, on: bool },
    /// Selection membership changed.
    SelectionChanged { selection: Vec<ShapeId> },
    /// Selected shapes moved, or the view scale/translate changed, so anything
    /// drawn around the selection has to be derived again.
    SelectionRelocated { selection: Vec<ShapeId> },
    /// Band selection: `Some` while the band is shown, `None` when it goes away.
    SelectionBand { bounds: Option<Rect> },
    /// A shape is being drawn. `temp` frames are previews, the final frame is
    /// the committed shape.
    BasicShapeAdd {
        shape: Shape,
        mouse_position: Point,
        temp: bool,
    },
    DragModeChanged { mode: DragMode },
    ViewChanged { scale: f64, translate: Vec2 },
}

impl EditorEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EditorEvent::ShapeHover { .. } => EventKind::ShapeHover,
            EditorEvent::SelectionChanged { .. } => EventKind::SelectionChanged,
            EditorEvent::SelectionRelocated { .. } => EventKind::SelectionRelocated,
            EditorEvent::SelectionBand { .. } => EventKind::SelectionBand,
            EditorEvent::BasicShapeAdd { .. } => EventKind::BasicShapeAdd,
            EditorEvent::DragModeChanged { .. } => EventKind::DragModeChanged,
            EditorEvent::ViewChanged { .. } => EventKind::ViewChanged,
        }
    }
}
