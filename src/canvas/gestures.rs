//! Pointer and key input of the canvas, routed to the two drag controllers:
//! one for the empty background (band selection, shape drawing) and one for
//! dragging shapes.

use egui::{Key, Modifiers, PointerButton};

use super::{CanvasContext, DragMode};
use crate::command::{AppendShape, RelocateShapes};
use crate::drag::{CancelAction, DragContext, DragHandler, DragSession, DragSupport};
use crate::event::EditorEvent;
use crate::geometry::{Point, Vec2};
use crate::shape::{Shape, ShapeId};

/// Input delivered by the host, positions in device space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerPressed {
        pos: Point,
        button: PointerButton,
        modifiers: Modifiers,
    },
    /// Pointer moved with no button held
    PointerMoved { pos: Point },
    /// Pointer moved with a button held
    PointerDragged { pos: Point },
    PointerReleased { pos: Point, button: PointerButton },
    KeyPressed { key: Key },
}

/// Drags that start on the empty canvas.
#[derive(Debug, Default)]
pub struct CanvasDragHandler;

impl DragHandler<CanvasContext> for CanvasDragHandler {
    fn on_drag_start(&mut self, _session: &DragSession, ctx: &mut CanvasContext) {
        if ctx.drag_mode() == DragMode::Selection {
            ctx.selection().clear();
        }
    }

    fn on_drag(&mut self, session: &DragSession, temp: bool, ctx: &mut CanvasContext) {
        let bounds = session.current_bounds();
        match ctx.drag_mode() {
            DragMode::Selection => {
                if temp {
                    ctx.show_band(Some(bounds));
                    ctx.select_in_band(bounds);
                } else {
                    ctx.show_band(None);
                }
            }
            DragMode::BasicShapeAdd => {
                let shape = Shape::new(ctx.basic_shape(), bounds);
                ctx.event_bus().publish(&EditorEvent::BasicShapeAdd {
                    shape: shape.clone(),
                    mouse_position: session.next(),
                    temp,
                });
                if temp {
                    return;
                }
                ctx.set_drag_mode(DragMode::Selection);
                let min = ctx.config().min_shape_size;
                if bounds.width() < min || bounds.height() < min {
                    log::debug!("Discarding {:.1} x {:.1} shape", bounds.width(), bounds.height());
                    return;
                }
                if let Err(err) = ctx.execute(Box::new(AppendShape::new(shape))) {
                    log::warn!("Shape not added: {err}");
                }
            }
        }
    }

    fn on_drag_cancel(&mut self, _session: &DragSession, ctx: &mut CanvasContext) -> CancelAction {
        match ctx.drag_mode() {
            DragMode::Selection => {
                ctx.show_band(None);
                ctx.selection().clear();
            }
            DragMode::BasicShapeAdd => ctx.set_drag_mode(DragMode::Selection),
        }
        CancelAction::End
    }
}

/// Drags that start on a shape. The shape under the press is set by
/// [`CanvasInput`] before the press is forwarded.
#[derive(Debug, Default)]
pub struct ShapeDragHandler {
    target: Option<ShapeId>,
}

impl ShapeDragHandler {
    pub fn target(&self) -> Option<ShapeId> {
        self.target
    }

    pub fn set_target(&mut self, target: ShapeId) {
        self.target = Some(target);
    }
}

impl DragHandler<CanvasContext> for ShapeDragHandler {
    fn on_drag_start(&mut self, session: &DragSession, ctx: &mut CanvasContext) {
        let Some(target) = self.target else {
            return;
        };
        if session.modifiers().shift {
            ctx.selection().toggle(target);
        } else if !ctx.selection().contains(&target) {
            ctx.selection().set([target]);
        }
    }

    fn on_drag(&mut self, session: &DragSession, temp: bool, ctx: &mut CanvasContext) {
        ctx.move_selection_live(session.current_delta());
        if temp {
            return;
        }
        self.target = None;
        let total = session.total_delta();
        if total == Vec2::ZERO || ctx.selection().is_empty() {
            return;
        }
        // Already applied frame by frame, only record it
        let shapes = ctx.selection().items();
        ctx.record(Box::new(RelocateShapes::new(shapes, total)));
    }

    fn on_drag_cancel(&mut self, session: &DragSession, ctx: &mut CanvasContext) -> CancelAction {
        ctx.move_selection_live(-session.total_delta());
        self.target = None;
        CancelAction::End
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Background,
    Shape,
}

/// Routes canvas input: a press on a shape (in selection mode) goes to the
/// shape controller, any other press to the background controller, and the
/// rest of the gesture follows the press.
#[derive(Debug)]
pub struct CanvasInput {
    background: DragSupport<CanvasDragHandler>,
    shapes: DragSupport<ShapeDragHandler>,
    active: Option<Route>,
}

impl Default for CanvasInput {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasInput {
    pub fn new() -> Self {
        Self {
            background: DragSupport::new(CanvasDragHandler),
            shapes: DragSupport::new(ShapeDragHandler::default()),
            active: None,
        }
    }

    pub fn attach(&mut self) -> bool {
        let background = self.background.attach();
        let shapes = self.shapes.attach();
        background || shapes
    }

    pub fn detach(&mut self) -> bool {
        self.active = None;
        let background = self.background.detach();
        let shapes = self.shapes.detach();
        background || shapes
    }

    pub fn is_attached(&self) -> bool {
        self.background.is_attached()
    }

    /// Whether a press-drag gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Feeds one event. Returns whether it was consumed.
    pub fn handle(&mut self, event: &InputEvent, ctx: &mut CanvasContext) -> bool {
        if !self.is_attached() {
            return false;
        }
        let consumed = match *event {
            InputEvent::PointerPressed { pos, button, .. } => {
                if button != PointerButton::Primary {
                    return false;
                }
                self.press(event, pos, ctx)
            }
            InputEvent::PointerMoved { pos } => {
                if self.active.is_some() {
                    return false;
                }
                ctx.pointer_moved(pos);
                true
            }
            InputEvent::KeyPressed { key: Key::Escape } if self.active.is_none() => ctx.cancel(),
            _ => match self.active {
                Some(Route::Background) => self.background.handle(event, ctx),
                Some(Route::Shape) => self.shapes.handle(event, ctx),
                None => false,
            },
        };
        self.settle();
        consumed
    }

    fn press(&mut self, event: &InputEvent, pos: Point, ctx: &mut CanvasContext) -> bool {
        // A second press without a release restarts the gesture
        self.background.abort();
        self.shapes.abort();

        let hit = match ctx.drag_mode() {
            DragMode::Selection => ctx.document().shape_at(ctx.to_model_space(pos)),
            DragMode::BasicShapeAdd => None,
        };
        match hit {
            Some(shape) => {
                self.shapes.handler_mut().set_target(shape);
                self.active = Some(Route::Shape);
                self.shapes.handle(event, ctx)
            }
            None => {
                self.active = Some(Route::Background);
                self.background.handle(event, ctx)
            }
        }
    }

    fn settle(&mut self) {
        let still_dragging = match self.active {
            Some(Route::Background) => self.background.is_dragging(),
            Some(Route::Shape) => self.shapes.is_dragging(),
            None => false,
        };
        if !still_dragging {
            self.active = None;
        }
    }
}
