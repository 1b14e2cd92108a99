//! Composition root of one canvas: document, selection, history, view
//! transform and drag mode, wired to a shared [`EventBus`].

mod gestures;
mod outline;

use std::rc::Rc;

use serde::{Deserialize, Serialize};

pub use gestures::{CanvasDragHandler, CanvasInput, InputEvent, ShapeDragHandler};
pub use outline::{HandleKind, SelectionHandle, SelectionOutline};

use crate::command::{
    Alignment, AlignShapes, AppendShape, Command, CommandContext, CommandHistory, CommandResult,
    RelocateShapes, RemoveShapes, ResizeRelocateShape,
};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::drag::DragContext;
use crate::event::{EditorEvent, EventBus};
use crate::geometry::{Point, Rect, Vec2};
use crate::observable::{ListenerId, ObservableCell};
use crate::selection::SelectionModel;
use crate::shape::{Shape, ShapeBounds, ShapeId, ShapeKind};
use crate::transform::CanvasTransform;

/// What a background drag does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DragMode {
    /// Band selection
    #[default]
    Selection,
    /// Draw a new shape of the current basic shape kind
    BasicShapeAdd,
}

pub struct CanvasContext {
    event_bus: Rc<EventBus>,
    selection: SelectionModel<ShapeId>,
    history: CommandHistory,
    document: Document,
    transform: CanvasTransform,
    drag_mode: ObservableCell<DragMode>,
    basic_shape: ShapeKind,
    hovered: Option<ShapeId>,
    config: EditorConfig,
    selection_listener: ListenerId,
}

impl std::fmt::Debug for CanvasContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasContext")
            .field("shapes", &self.document.len())
            .field("selection", &self.selection.items())
            .field("scale", &self.transform.scale())
            .field("translate", &self.transform.translate())
            .field("drag_mode", &self.drag_mode.get())
            .field("undo_depth", &self.history.undo_depth())
            .finish()
    }
}

impl Default for CanvasContext {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Drop for CanvasContext {
    fn drop(&mut self) {
        self.selection.remove_listener(self.selection_listener);
    }
}

impl CanvasContext {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_event_bus(Rc::new(EventBus::new()), config)
    }

    /// Builds a canvas publishing on an existing bus.
    pub fn with_event_bus(event_bus: Rc<EventBus>, config: EditorConfig) -> Self {
        let selection = SelectionModel::new();
        let bus = Rc::clone(&event_bus);
        let selection_listener = selection.on_change(move |items: &[ShapeId]| {
            bus.publish(&EditorEvent::SelectionChanged {
                selection: items.to_vec(),
            });
        });
        Self {
            event_bus,
            selection,
            history: CommandHistory::with_max_undo_depth(config.max_undo_depth),
            document: Document::new(),
            transform: CanvasTransform::new(),
            drag_mode: ObservableCell::new(DragMode::Selection),
            basic_shape: config.default_shape,
            hovered: None,
            config,
            selection_listener,
        }
    }

    pub fn event_bus(&self) -> &Rc<EventBus> {
        &self.event_bus
    }

    pub fn selection(&self) -> &SelectionModel<ShapeId> {
        &self.selection
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut CommandHistory {
        &mut self.history
    }

    pub fn transform(&self) -> &CanvasTransform {
        &self.transform
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale()
    }

    pub fn translate(&self) -> Vec2 {
        self.transform.translate()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.history.set_max_undo_depth(config.max_undo_depth);
        self.config = config;
    }

    pub fn hovered(&self) -> Option<ShapeId> {
        self.hovered
    }

    /// Selected shapes in selection order.
    pub fn selected_shapes(&self) -> Vec<&Shape> {
        self.selection
            .items()
            .into_iter()
            .filter_map(|id| self.document.get(id))
            .collect()
    }

    // ---------------------------------------------------------------
    // Commands

    /// Runs a command and records it for undo.
    pub fn execute(&mut self, command: Box<dyn Command>) -> CommandResult {
        let (history, mut ctx) = self.split();
        history.execute(command, &mut ctx)
    }

    /// Records a command whose effect is already applied.
    pub fn record(&mut self, command: Box<dyn Command>) {
        self.history.add(command);
    }

    pub fn undo(&mut self) -> CommandResult<bool> {
        let (history, mut ctx) = self.split();
        history.undo(&mut ctx)
    }

    pub fn redo(&mut self) -> CommandResult<bool> {
        let (history, mut ctx) = self.split();
        history.redo(&mut ctx)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Whether [`align_selection`](Self::align_selection) has enough shapes.
    pub fn can_align(&self) -> bool {
        self.selection.len() >= AlignShapes::MIN_SHAPES
    }

    pub fn align_selection(&mut self, alignment: Alignment) -> CommandResult {
        let shapes = self.selection.items();
        self.execute(Box::new(AlignShapes::new(shapes, alignment)))
    }

    /// Appends a shape at model-space `bounds` and selects it.
    pub fn append_shape(&mut self, kind: ShapeKind, bounds: Rect) -> CommandResult<ShapeId> {
        let shape = Shape::new(kind, bounds);
        let id = shape.id();
        self.execute(Box::new(AppendShape::new(shape)))?;
        Ok(id)
    }

    /// Removes the selected shapes. Returns `Ok(false)` if nothing was selected.
    pub fn delete_selection(&mut self) -> CommandResult<bool> {
        if self.selection.is_empty() {
            return Ok(false);
        }
        let shapes = self.selection.items();
        self.execute(Box::new(RemoveShapes::new(shapes)))?;
        Ok(true)
    }

    /// The shape shown in the bounds panel: the first selected one, and only
    /// while exactly one shape is selected.
    pub fn single_selected(&self) -> Option<&Shape> {
        if self.selection.len() != 1 {
            return None;
        }
        self.selection.first().and_then(|id| self.document.get(id))
    }

    /// Gives the single selected shape new model-space bounds as one undoable
    /// step. Returns `Ok(false)` if not exactly one shape is selected or the
    /// bounds are unchanged.
    pub fn resize_relocate_selected(&mut self, bounds: Rect) -> CommandResult<bool> {
        let Some(shape) = self.single_selected() else {
            return Ok(false);
        };
        if shape.bounds() == bounds.abs() {
            return Ok(false);
        }
        let id = shape.id();
        self.execute(Box::new(ResizeRelocateShape::new(id, bounds)))?;
        Ok(true)
    }

    /// Moves the selection by `delta` as one undoable step.
    pub fn nudge_selection(&mut self, delta: Vec2) -> CommandResult<bool> {
        if self.selection.is_empty() || delta == Vec2::ZERO {
            return Ok(false);
        }
        let shapes = self.selection.items();
        self.execute(Box::new(RelocateShapes::new(shapes, delta)))?;
        Ok(true)
    }

    fn split(&mut self) -> (&mut CommandHistory, CommandContext<'_>) {
        (
            &mut self.history,
            CommandContext::new(&mut self.document, &self.selection, &self.event_bus),
        )
    }

    // ---------------------------------------------------------------
    // Transient, non-undoable changes driven by gestures

    /// Moves the selection without recording anything.
    pub(crate) fn move_selection_live(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        let selection = self.selection.items();
        for id in &selection {
            if let Some(shape) = self.document.get_mut(*id) {
                shape.translate(delta);
            }
        }
        self.event_bus
            .publish(&EditorEvent::SelectionRelocated { selection });
    }

    /// Shows (or with `None` hides) the selection band.
    pub(crate) fn show_band(&self, bounds: Option<Rect>) {
        self.event_bus.publish(&EditorEvent::SelectionBand { bounds });
    }

    /// Selects every shape intersecting the model-space `band`.
    pub fn select_in_band(&self, band: Rect) {
        self.selection.set(self.document.shapes_intersecting(band));
    }

    // ---------------------------------------------------------------
    // Drag mode

    pub fn drag_mode(&self) -> DragMode {
        self.drag_mode.get()
    }

    pub fn set_drag_mode(&mut self, mode: DragMode) {
        if self.drag_mode.set(mode) {
            log::info!("Drag mode: {mode:?}");
            self.event_bus.publish(&EditorEvent::DragModeChanged { mode });
        }
    }

    pub fn on_drag_mode_change(&self, listener: impl Fn(&DragMode) + 'static) -> ListenerId {
        self.drag_mode.subscribe(listener)
    }

    pub fn basic_shape(&self) -> ShapeKind {
        self.basic_shape
    }

    /// The next background drag draws a `kind` shape.
    pub fn begin_add_shape(&mut self, kind: ShapeKind) {
        self.basic_shape = kind;
        self.set_drag_mode(DragMode::BasicShapeAdd);
    }

    /// Escape with no gesture in progress: leaves add mode, or clears the
    /// selection. Returns whether anything changed.
    pub fn cancel(&mut self) -> bool {
        match self.drag_mode() {
            DragMode::BasicShapeAdd => {
                self.set_drag_mode(DragMode::Selection);
                true
            }
            DragMode::Selection => {
                let had_selection = !self.selection.is_empty();
                self.selection.clear();
                had_selection
            }
        }
    }

    // ---------------------------------------------------------------
    // Hover

    /// Topmost shape under a device-space point.
    pub fn shape_at(&self, device: Point) -> Option<ShapeId> {
        self.document.shape_at(self.transform.to_model_space(device))
    }

    /// Tracks the shape under the pointer and publishes hover changes.
    pub fn pointer_moved(&mut self, device: Point) {
        self.set_hovered(self.shape_at(device));
    }

    /// Hover set from outside the canvas, e.g. a shape list row. Publishes
    /// `ShapeHover` off for the old shape, then on for the new one.
    pub fn set_hovered(&mut self, hit: Option<ShapeId>) {
        if hit == self.hovered {
            return;
        }
        if let Some(old) = self.hovered.take() {
            self.event_bus
                .publish(&EditorEvent::ShapeHover { shape: old, on: false });
        }
        if let Some(new) = hit {
            self.hovered = Some(new);
            self.event_bus
                .publish(&EditorEvent::ShapeHover { shape: new, on: true });
        }
    }

    // ---------------------------------------------------------------
    // View

    /// Layout hook; the center of `bounds` is the zoom pivot.
    pub fn set_bounds_in_parent(&mut self, bounds: Rect) {
        self.transform.set_bounds_in_parent(bounds);
    }

    pub fn set_scale(&mut self, scale: f64) -> bool {
        let changed = self.transform.set_scale(scale);
        if changed {
            self.view_changed();
        }
        changed
    }

    pub fn set_translate(&mut self, translate: Vec2) -> bool {
        let changed = self.transform.set_translate(translate);
        if changed {
            self.view_changed();
        }
        changed
    }

    /// Multiplies the scale by `factor`. NaN and non-positive factors are
    /// ignored.
    pub fn zoom_by(&mut self, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            log::warn!("Ignoring zoom factor {factor}");
            return false;
        }
        self.set_scale(self.scale() * factor)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_by(self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_by(1.0 / self.config.zoom_step)
    }

    /// Wheel input in device pixels. With the zoom modifier held the vertical
    /// delta changes the scale, otherwise the view pans.
    pub fn scroll(&mut self, delta: Vec2, zoom_modifier: bool) -> bool {
        if zoom_modifier {
            self.set_scale(self.scale() + self.config.scroll_zoom_sensitivity * delta.y)
        } else {
            self.set_translate(self.translate() + delta)
        }
    }

    fn view_changed(&self) {
        log::debug!(
            "View: scale {:.2}, translate ({:.2} : {:.2})",
            self.scale(),
            self.translate().x,
            self.translate().y
        );
        self.event_bus.publish(&EditorEvent::ViewChanged {
            scale: self.scale(),
            translate: self.translate(),
        });
        // Outline sizes depend on the scale
        self.event_bus.publish(&EditorEvent::SelectionRelocated {
            selection: self.selection.items(),
        });
    }

    pub fn selection_outline(&self) -> Option<SelectionOutline> {
        SelectionOutline::derive(
            self.selected_shapes(),
            self.scale(),
            self.config.handle_size,
        )
    }
}

impl DragContext for CanvasContext {
    fn to_model_space(&self, point: Point) -> Point {
        self.transform.to_model_space(point)
    }
}
