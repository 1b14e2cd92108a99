use crate::document::Document;
use crate::event::{EditorEvent, EventBus};
use crate::selection::SelectionModel;
use crate::shape::ShapeId;

/// What a command may touch while it runs or is undone.
#[derive(Debug)]
pub struct CommandContext<'a> {
    /// The document being edited
    pub document: &'a mut Document,
    /// The selection of that document
    pub selection: &'a SelectionModel<ShapeId>,
    /// The event bus for broadcasting changes
    pub event_bus: &'a EventBus,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        document: &'a mut Document,
        selection: &'a SelectionModel<ShapeId>,
        event_bus: &'a EventBus,
    ) -> Self {
        Self {
            document,
            selection,
            event_bus,
        }
    }

    /// Tells the view layer that `shapes` moved.
    pub fn publish_relocated(&self, shapes: &[ShapeId]) {
        self.event_bus.publish(&EditorEvent::SelectionRelocated {
            selection: shapes.to_vec(),
        });
    }
}
