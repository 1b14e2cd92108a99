//! Press/drag/release/cancel state machine over device-space pointer input.
//!
//! [`DragSupport`] converts every pointer position into model space before
//! handing it to a [`DragHandler`], so handlers only ever see zoom and pan
//! independent deltas.

use egui::{Key, Modifiers, PointerButton};

use crate::canvas::InputEvent;
use crate::geometry::{Point, Rect, Vec2, rect_spanning};
use crate::transform::CanvasTransform;

/// Anything that can map a device point into model space.
pub trait DragContext {
    fn to_model_space(&self, point: Point) -> Point;
}

impl DragContext for CanvasTransform {
    fn to_model_space(&self, point: Point) -> Point {
        CanvasTransform::to_model_space(self, point)
    }
}

/// One in-flight gesture. Positions are model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    start: Point,
    prev: Point,
    next: Point,
    modifiers: Modifiers,
}

impl DragSession {
    fn new(start: Point, modifiers: Modifiers) -> Self {
        Self {
            start,
            prev: start,
            next: start,
            modifiers,
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn prev(&self) -> Point {
        self.prev
    }

    pub fn next(&self) -> Point {
        self.next
    }

    /// Modifiers held when the gesture started.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Motion since the previous frame.
    pub fn current_delta(&self) -> Vec2 {
        self.next - self.prev
    }

    /// Motion since the press.
    pub fn total_delta(&self) -> Vec2 {
        self.next - self.start
    }

    /// Box spanning the press position and the current position.
    pub fn current_bounds(&self) -> Rect {
        rect_spanning(self.start, self.next)
    }
}

/// What to do with the session after an escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelAction {
    #[default]
    End,
    Ignore,
}

/// Callbacks of one concrete use of a drag gesture.
pub trait DragHandler<C: ?Sized> {
    fn on_drag_start(&mut self, _session: &DragSession, _ctx: &mut C) {}

    /// `temp` frames are live previews; the `temp == false` frame completes
    /// the gesture.
    fn on_drag(&mut self, session: &DragSession, temp: bool, ctx: &mut C);

    fn on_drag_cancel(&mut self, _session: &DragSession, _ctx: &mut C) -> CancelAction {
        CancelAction::End
    }
}

/// Drag gesture controller wrapping a handler.
#[derive(Debug)]
pub struct DragSupport<H> {
    handler: H,
    session: Option<DragSession>,
    attached: bool,
}

impl<H> DragSupport<H> {
    /// Creates an attached controller.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            session: None,
            attached: true,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Starts listening for input. Returns `false` if already attached.
    pub fn attach(&mut self) -> bool {
        !std::mem::replace(&mut self.attached, true)
    }

    /// Stops listening and drops any in-flight session without callbacks.
    /// Returns `false` if already detached.
    pub fn detach(&mut self) -> bool {
        self.abort();
        std::mem::replace(&mut self.attached, false)
    }

    /// Drops the in-flight session, if any, without callbacks.
    pub fn abort(&mut self) {
        self.session = None;
    }

    /// Feeds one input event through the state machine. Returns whether the
    /// event was consumed.
    pub fn handle<C>(&mut self, event: &InputEvent, ctx: &mut C) -> bool
    where
        C: DragContext + ?Sized,
        H: DragHandler<C>,
    {
        if !self.attached {
            return false;
        }
        match *event {
            InputEvent::PointerPressed {
                pos,
                button,
                modifiers,
            } => self.press(pos, button, modifiers, ctx),
            InputEvent::PointerDragged { pos } => self.drag(pos, ctx),
            InputEvent::PointerReleased { pos, button } => self.release(pos, button, ctx),
            InputEvent::KeyPressed { key } => self.key(key, ctx),
            InputEvent::PointerMoved { .. } => false,
        }
    }

    fn press<C>(&mut self, pos: Point, button: PointerButton, modifiers: Modifiers, ctx: &mut C) -> bool
    where
        C: DragContext + ?Sized,
        H: DragHandler<C>,
    {
        if button != PointerButton::Primary {
            return false;
        }
        let start = ctx.to_model_space(pos);
        log::debug!("Drag start at {start:?}");
        let session = DragSession::new(start, modifiers);
        self.handler.on_drag_start(&session, ctx);
        self.session = Some(session);
        true
    }

    fn drag<C>(&mut self, pos: Point, ctx: &mut C) -> bool
    where
        C: DragContext + ?Sized,
        H: DragHandler<C>,
    {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.next = ctx.to_model_space(pos);
        self.handler.on_drag(session, true, ctx);
        session.prev = session.next;
        true
    }

    fn release<C>(&mut self, pos: Point, button: PointerButton, ctx: &mut C) -> bool
    where
        C: DragContext + ?Sized,
        H: DragHandler<C>,
    {
        if button != PointerButton::Primary {
            return false;
        }
        let Some(mut session) = self.session.take() else {
            return false;
        };
        session.next = ctx.to_model_space(pos);
        log::debug!("Drag end, total delta {:?}", session.total_delta());
        self.handler.on_drag(&session, false, ctx);
        true
    }

    fn key<C>(&mut self, key: Key, ctx: &mut C) -> bool
    where
        C: DragContext + ?Sized,
        H: DragHandler<C>,
    {
        if key != Key::Escape {
            return false;
        }
        let Some(session) = self.session else {
            return false;
        };
        match self.handler.on_drag_cancel(&session, ctx) {
            CancelAction::End => {
                log::debug!("Drag cancelled");
                self.session = None;
            }
            CancelAction::Ignore => log::debug!("Drag cancel ignored"),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        started: usize,
        frames: Vec<(Vec2, Vec2, Rect, bool)>,
        cancels: usize,
        cancel_action: CancelAction,
    }

    impl DragHandler<CanvasTransform> for Recorder {
        fn on_drag_start(&mut self, _session: &DragSession, _ctx: &mut CanvasTransform) {
            self.started += 1;
        }

        fn on_drag(&mut self, session: &DragSession, temp: bool, _ctx: &mut CanvasTransform) {
            self.frames.push((
                session.current_delta(),
                session.total_delta(),
                session.current_bounds(),
                temp,
            ));
        }

        fn on_drag_cancel(&mut self, _session: &DragSession, _ctx: &mut CanvasTransform) -> CancelAction {
            self.cancels += 1;
            self.cancel_action
        }
    }

    fn press(x: f64, y: f64, button: PointerButton) -> InputEvent {
        InputEvent::PointerPressed {
            pos: Point::new(x, y),
            button,
            modifiers: Modifiers::NONE,
        }
    }

    fn dragged(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerDragged { pos: Point::new(x, y) }
    }

    fn released(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerReleased {
            pos: Point::new(x, y),
            button: PointerButton::Primary,
        }
    }

    fn escape() -> InputEvent {
        InputEvent::KeyPressed { key: Key::Escape }
    }

    #[test]
    fn deltas_are_incremental_and_total() {
        let mut ctx = CanvasTransform::new();
        let mut drag = DragSupport::new(Recorder::default());

        assert!(drag.handle(&press(10.0, 10.0, PointerButton::Primary), &mut ctx));
        assert!(drag.handle(&dragged(20.0, 15.0), &mut ctx));
        assert!(drag.handle(&released(25.0, 20.0), &mut ctx));

        let frames = &drag.handler().frames;
        assert_eq!(drag.handler().started, 1);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].0, Vec2::new(10.0, 5.0));
        assert!(frames[0].3);
        assert_eq!(frames[1].0, Vec2::new(5.0, 5.0));
        assert_eq!(frames[1].1, Vec2::new(15.0, 10.0));
        assert_eq!(frames[1].2, Rect::new(10.0, 10.0, 25.0, 20.0));
        assert!(!frames[1].3);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn bounds_are_normalized_for_reverse_drags() {
        let mut ctx = CanvasTransform::new();
        let mut drag = DragSupport::new(Recorder::default());
        drag.handle(&press(50.0, 40.0, PointerButton::Primary), &mut ctx);
        drag.handle(&dragged(20.0, 60.0), &mut ctx);
        assert_eq!(drag.handler().frames[0].2, Rect::new(20.0, 40.0, 50.0, 60.0));
    }

    #[test]
    fn ignores_secondary_button_and_stray_events() {
        let mut ctx = CanvasTransform::new();
        let mut drag = DragSupport::new(Recorder::default());

        assert!(!drag.handle(&press(0.0, 0.0, PointerButton::Secondary), &mut ctx));
        assert!(!drag.handle(&dragged(5.0, 5.0), &mut ctx));
        assert!(!drag.handle(&released(5.0, 5.0), &mut ctx));
        assert!(!drag.handle(&escape(), &mut ctx));
        assert_eq!(drag.handler().started, 0);
        assert!(drag.handler().frames.is_empty());
        assert_eq!(drag.handler().cancels, 0);
    }

    #[test]
    fn escape_ends_or_keeps_session() {
        let mut ctx = CanvasTransform::new();
        let mut drag = DragSupport::new(Recorder {
            cancel_action: CancelAction::Ignore,
            ..Recorder::default()
        });
        drag.handle(&press(0.0, 0.0, PointerButton::Primary), &mut ctx);
        assert!(drag.handle(&escape(), &mut ctx));
        assert!(drag.is_dragging());

        drag.handler_mut().cancel_action = CancelAction::End;
        assert!(drag.handle(&escape(), &mut ctx));
        assert!(!drag.is_dragging());
        assert_eq!(drag.handler().cancels, 2);
        // Release after cancel is not a completion
        assert!(!drag.handle(&released(1.0, 1.0), &mut ctx));
        assert!(drag.handler().frames.is_empty());
    }

    #[test]
    fn positions_are_mapped_to_model_space() {
        let mut ctx = CanvasTransform::new();
        ctx.set_bounds_in_parent(Rect::new(0.0, 0.0, 200.0, 200.0));
        ctx.set_scale(2.0);
        let mut drag = DragSupport::new(Recorder::default());

        drag.handle(&press(100.0, 100.0, PointerButton::Primary), &mut ctx);
        drag.handle(&dragged(120.0, 90.0), &mut ctx);
        assert_eq!(drag.session().map(|s| s.start()), Some(Point::new(100.0, 100.0)));
        assert_eq!(drag.handler().frames[0].0, Vec2::new(10.0, -5.0));
    }

    #[test]
    fn detach_drops_session_and_blocks_input() {
        let mut ctx = CanvasTransform::new();
        let mut drag = DragSupport::new(Recorder::default());
        drag.handle(&press(0.0, 0.0, PointerButton::Primary), &mut ctx);

        assert!(drag.detach());
        assert!(!drag.detach());
        assert!(!drag.is_dragging());
        assert!(!drag.handle(&press(0.0, 0.0, PointerButton::Primary), &mut ctx));

        assert!(drag.attach());
        assert!(!drag.attach());
        assert!(drag.handle(&press(0.0, 0.0, PointerButton::Primary), &mut ctx));
    }
}
