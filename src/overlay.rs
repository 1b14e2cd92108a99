//! View-model of the overlay drawn above the shapes: hover highlight,
//! selection band and the preview of a shape being drawn.

use std::cell::RefCell;
use std::rc::Rc;

use crate::canvas::DragMode;
use crate::event::{EditorEvent, EventBus, EventKind, SubscriptionId};
use crate::geometry::{Point, Rect};
use crate::shape::{Shape, ShapeBounds, ShapeId};

/// A shape being drawn, with the pointer position it follows.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePreview {
    pub shape: Shape,
    pub mouse_position: Point,
}

impl ShapePreview {
    /// Size label shown next to the pointer, e.g. "120 x 80".
    pub fn size_label(&self) -> String {
        let bounds = self.shape.bounds();
        format!("{:.0} x {:.0}", bounds.width(), bounds.height())
    }
}

/// What the overlay currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayState {
    pub hovered: Option<ShapeId>,
    pub band: Option<Rect>,
    pub preview: Option<ShapePreview>,
    pub selection: Vec<ShapeId>,
    /// Set when the selection outline has to be derived again
    pub outline_dirty: bool,
}

impl OverlayState {
    /// Hover highlight to draw. A selected shape shows its outline instead.
    pub fn visible_hover(&self) -> Option<ShapeId> {
        self.hovered.filter(|id| !self.selection.contains(id))
    }

    /// Clears `outline_dirty`, returning its previous value.
    pub fn take_outline_dirty(&mut self) -> bool {
        std::mem::take(&mut self.outline_dirty)
    }

    fn apply(&mut self, event: &EditorEvent) {
        match event {
            EditorEvent::ShapeHover { shape, on } => {
                if *on {
                    self.hovered = Some(*shape);
                } else if self.hovered == Some(*shape) {
                    self.hovered = None;
                }
            }
            EditorEvent::SelectionChanged { selection } => {
                self.selection.clone_from(selection);
                self.outline_dirty = true;
            }
            EditorEvent::SelectionRelocated { .. } => self.outline_dirty = true,
            EditorEvent::SelectionBand { bounds } => self.band = *bounds,
            EditorEvent::BasicShapeAdd {
                shape,
                mouse_position,
                temp,
            } => {
                self.preview = temp.then(|| ShapePreview {
                    shape: shape.clone(),
                    mouse_position: *mouse_position,
                });
            }
            EditorEvent::DragModeChanged { mode } => {
                if *mode == DragMode::Selection {
                    self.preview = None;
                }
            }
            EditorEvent::ViewChanged { .. } => {}
        }
    }
}

const KINDS: [EventKind; 6] = [
    EventKind::ShapeHover,
    EventKind::SelectionChanged,
    EventKind::SelectionRelocated,
    EventKind::SelectionBand,
    EventKind::BasicShapeAdd,
    EventKind::DragModeChanged,
];

/// Bus consumer keeping an [`OverlayState`] up to date while attached.
#[derive(Debug)]
pub struct OverlayLayer {
    bus: Rc<EventBus>,
    state: Rc<RefCell<OverlayState>>,
    subscriptions: Vec<(EventKind, SubscriptionId)>,
}

impl OverlayLayer {
    pub fn new(bus: Rc<EventBus>) -> Self {
        Self {
            bus,
            state: Rc::new(RefCell::new(OverlayState::default())),
            subscriptions: Vec::new(),
        }
    }

    pub fn is_attached(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Subscribes to the bus. Returns `false` if already attached.
    pub fn attach(&mut self) -> bool {
        if self.is_attached() {
            return false;
        }
        for kind in KINDS {
            let state = Rc::clone(&self.state);
            let id = self
                .bus
                .subscribe(kind, move |event| state.borrow_mut().apply(event));
            self.subscriptions.push((kind, id));
        }
        true
    }

    /// Unsubscribes from the bus. Returns `false` if already detached.
    pub fn detach(&mut self) -> bool {
        if !self.is_attached() {
            return false;
        }
        for (kind, id) in self.subscriptions.drain(..) {
            self.bus.unsubscribe(kind, id);
        }
        true
    }

    pub fn state(&self) -> OverlayState {
        self.state.borrow().clone()
    }

    pub fn take_outline_dirty(&self) -> bool {
        self.state.borrow_mut().take_outline_dirty()
    }
}

impl Drop for OverlayLayer {
    fn drop(&mut self) {
        self.detach();
    }
}
