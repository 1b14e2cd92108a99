use egui::{Align2, Color32, FontId, Key, Modifiers, PointerButton, Stroke};

use crate::binder::{ListSelection, SelectionBinder};
use crate::canvas::{CanvasContext, CanvasInput, DragMode, InputEvent, SelectionOutline};
use crate::command::Alignment;
use crate::config::EditorConfig;
use crate::geometry::{Point, Rect, Vec2};
use crate::overlay::{OverlayLayer, OverlayState};
use crate::selection::SelectionModel;
use crate::shape::{Shape, ShapeBounds, ShapeId, ShapeKind, ShapeStyle};

const HOVER_COLOR: Color32 = Color32::from_rgb(90, 160, 255);
const SELECTION_COLOR: Color32 = Color32::from_rgb(40, 120, 255);
const BAND_FILL: Color32 = Color32::from_rgba_premultiplied(40, 80, 160, 40);

type ShapeListBinder = SelectionBinder<ShapeId, ListSelection<ShapeId>, SelectionModel<ShapeId>>;

/// Desktop editor around one [`CanvasContext`].
pub struct SketchApp {
    canvas: CanvasContext,
    input: CanvasInput,
    overlay: OverlayLayer,
    shape_list: ListSelection<ShapeId>,
    binder: ShapeListBinder,
    outline: Option<SelectionOutline>,
    last_pointer: Option<Point>,
    /// Shape whose list row the pointer is over
    list_hover: Option<ShapeId>,
    /// X, Y, W, H of the bounds panel while a field is being dragged
    bounds_edit: Option<(ShapeId, [f64; 4])>,
    status: Option<String>,
}

impl SketchApp {
    /// Called once before the first frame. `config` overrides whatever was
    /// persisted by a previous run.
    pub fn new(cc: &eframe::CreationContext<'_>, config: Option<EditorConfig>) -> Self {
        let config = config
            .or_else(|| {
                cc.storage
                    .and_then(|storage| eframe::get_value::<EditorConfig>(storage, eframe::APP_KEY))
            })
            .unwrap_or_default();
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                log::warn!("Ignoring stored config: {err}");
                EditorConfig::default()
            }
        };
        Self::with_config(config)
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let canvas = CanvasContext::new(config);
        let mut overlay = OverlayLayer::new(canvas.event_bus().clone());
        overlay.attach();

        let shape_list = ListSelection::new();
        let mut binder = SelectionBinder::new(shape_list.clone(), canvas.selection().clone());
        binder.bind();

        Self {
            canvas,
            input: CanvasInput::new(),
            overlay,
            shape_list,
            binder,
            outline: None,
            last_pointer: None,
            list_hover: None,
            bounds_edit: None,
            status: None,
        }
    }

    fn report(&mut self, result: Result<(), crate::error::CommandError>) {
        match result {
            Ok(()) => self.status = None,
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            for kind in ShapeKind::ALL {
                let adding = self.canvas.drag_mode() == DragMode::BasicShapeAdd
                    && self.canvas.basic_shape() == kind;
                if ui.selectable_label(adding, kind.title()).clicked() {
                    self.canvas.begin_add_shape(kind);
                }
            }
            ui.separator();

            let can_align = self.canvas.can_align();
            for alignment in Alignment::ALL {
                if ui
                    .add_enabled(can_align, egui::Button::new(alignment.title()))
                    .clicked()
                {
                    let result = self.canvas.align_selection(alignment);
                    self.report(result);
                }
            }
            ui.separator();

            let undo = ui.add_enabled(self.canvas.can_undo(), egui::Button::new("Undo"));
            let undo = match self.canvas.history().undo_description() {
                Some(text) => undo.on_hover_text(text),
                None => undo,
            };
            if undo.clicked() {
                let result = self.canvas.undo().map(|_| ());
                self.report(result);
            }
            let redo = ui.add_enabled(self.canvas.can_redo(), egui::Button::new("Redo"));
            let redo = match self.canvas.history().redo_description() {
                Some(text) => redo.on_hover_text(text),
                None => redo,
            };
            if redo.clicked() {
                let result = self.canvas.redo().map(|_| ());
                self.report(result);
            }
            ui.separator();

            ui.menu_button(format!("{:.0}%", self.canvas.scale() * 100.0), |ui| {
                if ui.button("Zoom In").clicked() {
                    self.canvas.zoom_in();
                    ui.close_menu();
                }
                if ui.button("Zoom Out").clicked() {
                    self.canvas.zoom_out();
                    ui.close_menu();
                }
            });
        });
    }

    fn shape_list(&mut self, ui: &mut egui::Ui) {
        ui.heading("Shapes");
        let items: Vec<(ShapeId, String)> = self
            .canvas
            .document()
            .shapes()
            .iter()
            .map(|s| (s.id(), s.to_string()))
            .collect();
        let mut row_hover = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for (id, label) in items {
                let selected = self.shape_list.is_selected(&id);
                let response = ui.selectable_label(selected, label);
                if response.hovered() {
                    row_hover = Some(id);
                }
                if response.clicked() {
                    let modifiers = ui.input(|i| i.modifiers);
                    if modifiers.command || modifiers.shift {
                        if selected {
                            self.shape_list.deselect(&id);
                        } else {
                            self.shape_list.select(id);
                        }
                    } else {
                        self.shape_list.clear_selection();
                        self.shape_list.select(id);
                    }
                }
            }
        });

        // Rows highlight their shape on the canvas
        if row_hover != self.list_hover {
            self.list_hover = row_hover;
            self.canvas.set_hovered(row_hover);
        }
    }

    /// X/Y/W/H of the single selected shape. Disabled unless exactly one
    /// shape is selected.
    fn bounds_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Bounds");
        let shape = self.canvas.single_selected().map(|s| (s.id(), s.bounds()));
        let enabled = shape.is_some();
        let mut values = match (shape, self.bounds_edit) {
            (Some((id, _)), Some((edited, values))) if id == edited => values,
            (Some((_, b)), _) => [b.x0, b.y0, b.width(), b.height()],
            (None, _) => [0.0; 4],
        };

        let mut commit = false;
        let mut editing = false;
        egui::Grid::new("bounds_panel").num_columns(2).show(ui, |ui| {
            for (index, label) in ["X", "Y", "W", "H"].into_iter().enumerate() {
                let mut field = egui::DragValue::new(&mut values[index]).prefix(format!("{label} "));
                if index >= 2 {
                    field = field.range(0.0..=f64::MAX);
                }
                let response = ui.add_enabled(enabled, field);
                if response.dragged() {
                    editing = true;
                } else if response.drag_stopped() || response.changed() {
                    commit = true;
                }
                if index % 2 == 1 {
                    ui.end_row();
                }
            }
        });

        let Some((id, _)) = shape else {
            self.bounds_edit = None;
            return;
        };
        if commit {
            self.bounds_edit = None;
            let [x, y, w, h] = values;
            let result = self
                .canvas
                .resize_relocate_selected(Rect::new(x, y, x + w, y + h))
                .map(|_| ());
            self.report(result);
        } else if editing {
            self.bounds_edit = Some((id, values));
        }
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let translate = self.canvas.translate();
            ui.label(format!(
                "scale: {:.2}; translate: ({:.2} : {:.2})",
                self.canvas.scale(),
                translate.x,
                translate.y
            ));
            if let Some(status) = &self.status {
                ui.separator();
                ui.colored_label(Color32::LIGHT_RED, status);
            }
        });
    }

    fn canvas_ui(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let origin = response.rect.min;
        self.canvas.set_bounds_in_parent(Rect::new(
            0.0,
            0.0,
            f64::from(response.rect.width()),
            f64::from(response.rect.height()),
        ));

        self.handle_shortcuts(ui.ctx());
        self.handle_pointer(ui, &response);

        painter.rect_filled(response.rect, 0.0, ui.visuals().extreme_bg_color);
        for shape in self.canvas.document().shapes() {
            self.paint_shape(&painter, origin, shape, None);
        }
        self.paint_overlay(&painter, origin);
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (undo, redo, delete, nudge) = ctx.input_mut(|i| {
            let redo = i.consume_key(Modifiers::COMMAND | Modifiers::SHIFT, Key::Z);
            let undo = i.consume_key(Modifiers::COMMAND, Key::Z);
            let delete = i.key_pressed(Key::Delete) || i.key_pressed(Key::Backspace);
            let step = if i.modifiers.shift { 10.0 } else { 1.0 };
            let mut nudge = Vec2::ZERO;
            for (key, direction) in [
                (Key::ArrowLeft, Vec2::new(-1.0, 0.0)),
                (Key::ArrowRight, Vec2::new(1.0, 0.0)),
                (Key::ArrowUp, Vec2::new(0.0, -1.0)),
                (Key::ArrowDown, Vec2::new(0.0, 1.0)),
            ] {
                if i.key_pressed(key) {
                    nudge += direction * step;
                }
            }
            (undo, redo, delete, nudge)
        });

        if undo {
            let result = self.canvas.undo().map(|_| ());
            self.report(result);
        }
        if redo {
            let result = self.canvas.redo().map(|_| ());
            self.report(result);
        }
        if delete {
            let result = self.canvas.delete_selection().map(|_| ());
            self.report(result);
        }
        if nudge != Vec2::ZERO {
            let result = self.canvas.nudge_selection(nudge).map(|_| ());
            self.report(result);
        }
    }

    fn handle_pointer(&mut self, ui: &egui::Ui, response: &egui::Response) {
        let origin = response.rect.min;
        let to_device = |p: egui::Pos2| Point::new(f64::from(p.x - origin.x), f64::from(p.y - origin.y));
        let hovered = response.hovered();
        let dragging = self.input.is_dragging();

        let (events, scroll, zoom, alt) = ui.input(|i| {
            let mut events = Vec::new();
            let pos = i.pointer.interact_pos().map(to_device);
            if let Some(pos) = pos {
                if hovered && i.pointer.primary_pressed() {
                    events.push(InputEvent::PointerPressed {
                        pos,
                        button: PointerButton::Primary,
                        modifiers: i.modifiers,
                    });
                } else if dragging && i.pointer.primary_down() && Some(pos) != self.last_pointer {
                    events.push(InputEvent::PointerDragged { pos });
                }
                if i.pointer.primary_released() {
                    events.push(InputEvent::PointerReleased {
                        pos,
                        button: PointerButton::Primary,
                    });
                }
            }
            if let Some(pos) = i.pointer.hover_pos().map(to_device) {
                if hovered && !dragging && !i.pointer.any_down() && Some(pos) != self.last_pointer {
                    events.push(InputEvent::PointerMoved { pos });
                }
            }
            if i.key_pressed(Key::Escape) {
                events.push(InputEvent::KeyPressed { key: Key::Escape });
            }
            let scroll = if hovered { i.smooth_scroll_delta } else { egui::Vec2::ZERO };
            let zoom = if hovered { i.zoom_delta() } else { 1.0 };
            (events, scroll, zoom, i.modifiers.alt)
        });

        self.last_pointer = ui.input(|i| i.pointer.interact_pos()).map(to_device);
        for event in &events {
            self.input.handle(event, &mut self.canvas);
        }

        if zoom != 1.0 {
            self.canvas.zoom_by(f64::from(zoom));
        } else if scroll != egui::Vec2::ZERO {
            self.canvas
                .scroll(Vec2::new(f64::from(scroll.x), f64::from(scroll.y)), alt);
        }
    }

    fn device_rect(&self, origin: egui::Pos2, bounds: Rect) -> egui::Rect {
        let r = self.canvas.transform().rect_to_parent_space(bounds);
        egui::Rect::from_min_max(
            origin + egui::vec2(r.x0 as f32, r.y0 as f32),
            origin + egui::vec2(r.x1 as f32, r.y1 as f32),
        )
    }

    fn paint_shape(&self, painter: &egui::Painter, origin: egui::Pos2, shape: &Shape, outline: Option<Color32>) {
        let rect = self.device_rect(origin, shape.bounds());
        let ShapeStyle {
            fill,
            stroke,
            stroke_width,
        } = shape.style;
        let (fill, stroke) = match outline {
            Some(color) => (Color32::TRANSPARENT, Stroke::new(2.0, color)),
            None => (fill, Stroke::new(stroke_width, stroke)),
        };
        match shape.kind() {
            ShapeKind::Rectangle => {
                painter.rect(rect, 0.0, fill, stroke);
            }
            ShapeKind::Oval => {
                let radius = rect.size() / 2.0;
                painter.add(egui::Shape::ellipse_filled(rect.center(), radius, fill));
                painter.add(egui::Shape::ellipse_stroke(rect.center(), radius, stroke));
            }
        }
    }

    fn paint_overlay(&mut self, painter: &egui::Painter, origin: egui::Pos2) {
        if self.overlay.take_outline_dirty() {
            self.outline = self.canvas.selection_outline();
            self.shape_list.retain_items(&self.canvas.document().ids());
        }
        let OverlayState {
            band, preview, ..
        } = self.overlay.state();

        if let Some(id) = self.overlay.state().visible_hover() {
            if let Some(shape) = self.canvas.document().get(id) {
                self.paint_shape(painter, origin, shape, Some(HOVER_COLOR));
            }
        }

        if let Some(outline) = &self.outline {
            let thin = Stroke::new(1.0, SELECTION_COLOR);
            for (_, bounds) in &outline.shapes {
                painter.rect_stroke(self.device_rect(origin, *bounds), 0.0, thin);
            }
            painter.rect_stroke(self.device_rect(origin, outline.bounds), 0.0, thin);
            for handle in &outline.handles {
                painter.rect(self.device_rect(origin, handle.rect), 0.0, Color32::WHITE, thin);
            }
        }

        if let Some(band) = band {
            painter.rect(
                self.device_rect(origin, band),
                0.0,
                BAND_FILL,
                Stroke::new(1.0, SELECTION_COLOR),
            );
        }

        if let Some(preview) = preview {
            self.paint_shape(painter, origin, &preview.shape, None);
            let anchor = self.canvas.transform().to_parent_space(preview.mouse_position);
            painter.text(
                origin + egui::vec2(anchor.x as f32 + 5.0, anchor.y as f32 + 5.0),
                Align2::LEFT_TOP,
                preview.size_label(),
                FontId::proportional(12.0),
                painter.ctx().style().visuals.text_color(),
            );
        }
    }
}

impl eframe::App for SketchApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self.canvas.config());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.status_bar(ui));
        egui::SidePanel::left("shapes")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                self.bounds_panel(ui);
                ui.separator();
                self.shape_list(ui);
            });
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.canvas_ui(ui));
    }
}

impl Drop for SketchApp {
    fn drop(&mut self) {
        self.binder.unbind();
        self.input.detach();
    }
}
