use serde::{Deserialize, Serialize};

use super::{Command, CommandContext, CommandError, CommandResult};
use crate::document::Document;
use crate::geometry::{Point, Rect, Vec2, rect_union};
use crate::shape::{Shape, ShapeBounds, ShapeId};

/// Fails with [`CommandError::ShapeNotFound`] for the first id missing from
/// the document, so commands never apply half of their effect.
fn ensure_present(document: &Document, shapes: &[ShapeId]) -> CommandResult {
    match shapes.iter().find(|id| !document.contains(**id)) {
        Some(missing) => Err(CommandError::ShapeNotFound(*missing)),
        None => Ok(()),
    }
}

fn bounds_of(document: &Document, id: ShapeId) -> CommandResult<Rect> {
    document
        .get(id)
        .map(|shape| shape.bounds())
        .ok_or(CommandError::ShapeNotFound(id))
}

fn relocate(ctx: &mut CommandContext<'_>, id: ShapeId, origin: Point) -> CommandResult {
    let shape = ctx
        .document
        .get_mut(id)
        .ok_or(CommandError::ShapeNotFound(id))?;
    shape.relocate(origin);
    Ok(())
}

/// Adds a shape to the document and makes it the selection.
#[derive(Debug, Clone)]
pub struct AppendShape {
    shape: Shape,
}

impl AppendShape {
    pub fn new(shape: Shape) -> Self {
        Self { shape }
    }

    pub fn shape_id(&self) -> ShapeId {
        self.shape.id()
    }
}

impl Command for AppendShape {
    fn run(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        let id = self.shape.id();
        if ctx.document.contains(id) {
            return Err(CommandError::DuplicateShape(id));
        }
        ctx.document.add(self.shape.clone());
        ctx.selection.set([id]);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        let id = self.shape.id();
        let (_, shape) = ctx
            .document
            .remove(id)
            .ok_or(CommandError::ShapeNotFound(id))?;
        // Keep whatever happened to the shape while it was in the document
        self.shape = shape;
        ctx.selection.remove(&id);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Append {}", self.shape.name())
    }
}

/// Moves shapes by a fixed delta. Undo moves them back by the negated delta.
#[derive(Debug, Clone, PartialEq)]
pub struct RelocateShapes {
    shapes: Vec<ShapeId>,
    delta: Vec2,
}

impl RelocateShapes {
    pub fn new(shapes: Vec<ShapeId>, delta: Vec2) -> Self {
        Self { shapes, delta }
    }

    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    fn apply(&self, ctx: &mut CommandContext<'_>, delta: Vec2) -> CommandResult {
        ensure_present(ctx.document, &self.shapes)?;
        for id in &self.shapes {
            if let Some(shape) = ctx.document.get_mut(*id) {
                shape.translate(delta);
            }
        }
        ctx.publish_relocated(&self.shapes);
        Ok(())
    }
}

impl Command for RelocateShapes {
    fn run(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        self.apply(ctx, self.delta)
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        self.apply(ctx, -self.delta)
    }

    fn description(&self) -> String {
        match self.shapes.len() {
            1 => "Relocate shape".to_string(),
            n => format!("Relocate {n} shapes"),
        }
    }
}

/// Edge or center that [`AlignShapes`] lines shapes up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    CenterHorizontal,
    Right,
    Top,
    CenterVertical,
    Bottom,
}

impl Alignment {
    pub const ALL: [Alignment; 6] = [
        Alignment::Left,
        Alignment::CenterHorizontal,
        Alignment::Right,
        Alignment::Top,
        Alignment::CenterVertical,
        Alignment::Bottom,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Alignment::Left => "Align left",
            Alignment::CenterHorizontal => "Align center",
            Alignment::Right => "Align right",
            Alignment::Top => "Align top",
            Alignment::CenterVertical => "Align middle",
            Alignment::Bottom => "Align bottom",
        }
    }

    /// New top-left corner of `bounds` once aligned against `extent`, the
    /// union of all aligned shapes.
    fn target(&self, bounds: Rect, extent: Rect) -> Point {
        match self {
            Alignment::Left => Point::new(extent.x0, bounds.y0),
            Alignment::CenterHorizontal => {
                Point::new(extent.center().x - bounds.width() / 2.0, bounds.y0)
            }
            Alignment::Right => Point::new(extent.x1 - bounds.width(), bounds.y0),
            Alignment::Top => Point::new(bounds.x0, extent.y0),
            Alignment::CenterVertical => {
                Point::new(bounds.x0, extent.center().y - bounds.height() / 2.0)
            }
            Alignment::Bottom => Point::new(bounds.x0, extent.y1 - bounds.height()),
        }
    }
}

/// Lines up two or more shapes. Alignment is not invertible from the aligned
/// positions, so every run snapshots the original top-left corners.
#[derive(Debug, Clone)]
pub struct AlignShapes {
    shapes: Vec<ShapeId>,
    alignment: Alignment,
    old_positions: Vec<Point>,
}

impl AlignShapes {
    pub const MIN_SHAPES: usize = 2;

    pub fn new(shapes: Vec<ShapeId>, alignment: Alignment) -> Self {
        Self {
            shapes,
            alignment,
            old_positions: Vec::new(),
        }
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }
}

impl Command for AlignShapes {
    fn run(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        if self.shapes.len() < Self::MIN_SHAPES {
            return Err(CommandError::NotEnoughShapes {
                required: Self::MIN_SHAPES,
                actual: self.shapes.len(),
            });
        }
        let document = &*ctx.document;
        let bounds = self
            .shapes
            .iter()
            .map(|id| bounds_of(document, *id))
            .collect::<CommandResult<Vec<Rect>>>()?;
        let Some(extent) = rect_union(bounds.iter().copied()) else {
            return Ok(());
        };

        self.old_positions = bounds.iter().map(Rect::origin).collect();
        for (id, shape_bounds) in self.shapes.iter().zip(&bounds) {
            relocate(ctx, *id, self.alignment.target(*shape_bounds, extent))?;
        }
        ctx.publish_relocated(&self.shapes);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        ensure_present(ctx.document, &self.shapes)?;
        for (id, origin) in self.shapes.iter().zip(&self.old_positions) {
            relocate(ctx, *id, *origin)?;
        }
        ctx.publish_relocated(&self.shapes);
        Ok(())
    }

    fn description(&self) -> String {
        self.alignment.title().to_string()
    }
}

/// Moves and resizes one shape to exact bounds, as typed into the bounds
/// panel. The previous bounds are snapshot on every run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeRelocateShape {
    shape: ShapeId,
    bounds: Rect,
    old_bounds: Option<Rect>,
}

impl ResizeRelocateShape {
    pub fn new(shape: ShapeId, bounds: Rect) -> Self {
        Self {
            shape,
            bounds: bounds.abs(),
            old_bounds: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

impl Command for ResizeRelocateShape {
    fn run(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        let shape = ctx
            .document
            .get_mut(self.shape)
            .ok_or(CommandError::ShapeNotFound(self.shape))?;
        self.old_bounds = Some(shape.bounds());
        shape.relocate(self.bounds.origin());
        shape.resize(self.bounds.width(), self.bounds.height());
        ctx.publish_relocated(&[self.shape]);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        let Some(old_bounds) = self.old_bounds else {
            return Ok(());
        };
        let shape = ctx
            .document
            .get_mut(self.shape)
            .ok_or(CommandError::ShapeNotFound(self.shape))?;
        shape.set_bounds(old_bounds);
        ctx.publish_relocated(&[self.shape]);
        Ok(())
    }

    fn description(&self) -> String {
        "Resize shape".to_string()
    }
}

/// Deletes shapes from the document and the selection. Undo re-inserts them
/// at their original paint order positions and reselects those that were
/// selected.
#[derive(Debug, Clone)]
pub struct RemoveShapes {
    shapes: Vec<ShapeId>,
    removed: Vec<Removed>,
}

#[derive(Debug, Clone)]
struct Removed {
    index: usize,
    shape: Shape,
    selected: bool,
}

impl RemoveShapes {
    pub fn new(shapes: Vec<ShapeId>) -> Self {
        Self {
            shapes,
            removed: Vec::new(),
        }
    }
}

impl Command for RemoveShapes {
    fn run(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        ensure_present(ctx.document, &self.shapes)?;
        self.removed.clear();
        for id in &self.shapes {
            if let Some((index, shape)) = ctx.document.remove(*id) {
                let selected = ctx.selection.contains(id);
                self.removed.push(Removed {
                    index,
                    shape,
                    selected,
                });
            }
        }
        let remaining = ctx
            .selection
            .items()
            .into_iter()
            .filter(|id| !self.shapes.contains(id));
        ctx.selection.set(remaining);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult {
        // Reverse removal order so every recorded index is valid again
        for removed in self.removed.drain(..).rev() {
            let id = removed.shape.id();
            ctx.document.insert(removed.index, removed.shape);
            if removed.selected {
                ctx.selection.add(id);
            }
        }
        Ok(())
    }

    fn description(&self) -> String {
        match self.shapes.len() {
            1 => "Remove shape".to_string(),
            n => format!("Remove {n} shapes"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventBus;
    use crate::selection::SelectionModel;

    struct Fixture {
        document: Document,
        selection: SelectionModel<ShapeId>,
        bus: EventBus,
    }

    impl Fixture {
        fn new(shapes: &[Rect]) -> (Self, Vec<ShapeId>) {
            let mut document = Document::new();
            let ids = shapes
                .iter()
                .map(|r| {
                    let shape = Shape::rectangle(*r);
                    let id = shape.id();
                    document.add(shape);
                    id
                })
                .collect();
            let fixture = Self {
                document,
                selection: SelectionModel::new(),
                bus: EventBus::new(),
            };
            (fixture, ids)
        }

        fn ctx(&mut self) -> CommandContext<'_> {
            CommandContext::new(&mut self.document, &self.selection, &self.bus)
        }

        fn bounds(&self, id: ShapeId) -> Rect {
            self.document.get(id).map(|s| s.bounds()).unwrap()
        }
    }

    #[test]
    fn align_center_uses_union_center() {
        let (mut fx, ids) = Fixture::new(&[
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(90.0, 50.0, 110.0, 60.0),
        ]);
        let mut cmd = AlignShapes::new(ids.clone(), Alignment::CenterHorizontal);
        cmd.run(&mut fx.ctx()).unwrap();
        // union spans x 0..110, center 55
        assert_eq!(fx.bounds(ids[0]), Rect::new(50.0, 0.0, 60.0, 10.0));
        assert_eq!(fx.bounds(ids[1]), Rect::new(45.0, 50.0, 65.0, 60.0));
    }

    #[test]
    fn align_bottom_keeps_x() {
        let (mut fx, ids) = Fixture::new(&[
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(30.0, 20.0, 40.0, 45.0),
        ]);
        let mut cmd = AlignShapes::new(ids.clone(), Alignment::Bottom);
        cmd.run(&mut fx.ctx()).unwrap();
        assert_eq!(fx.bounds(ids[0]), Rect::new(0.0, 35.0, 10.0, 45.0));
        assert_eq!(fx.bounds(ids[1]), Rect::new(30.0, 20.0, 40.0, 45.0));
    }

    #[test]
    fn relocate_with_missing_shape_changes_nothing() {
        let (mut fx, ids) = Fixture::new(&[Rect::new(0.0, 0.0, 10.0, 10.0)]);
        let ghost = ShapeId::new();
        let mut cmd = RelocateShapes::new(vec![ids[0], ghost], Vec2::new(5.0, 5.0));
        assert_eq!(cmd.run(&mut fx.ctx()), Err(CommandError::ShapeNotFound(ghost)));
        assert_eq!(fx.bounds(ids[0]), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn append_rejects_duplicate_id() {
        let (mut fx, _) = Fixture::new(&[]);
        let shape = Shape::oval(Rect::new(0.0, 0.0, 5.0, 5.0));
        let mut first = AppendShape::new(shape.clone());
        let mut second = AppendShape::new(shape.clone());
        first.run(&mut fx.ctx()).unwrap();
        assert_eq!(
            second.run(&mut fx.ctx()),
            Err(CommandError::DuplicateShape(shape.id()))
        );
        assert_eq!(first.description(), "Append Oval");
    }

    #[test]
    fn resize_relocate_restores_old_bounds() {
        let (mut fx, ids) = Fixture::new(&[Rect::new(0.0, 0.0, 10.0, 10.0)]);
        let mut cmd = ResizeRelocateShape::new(ids[0], Rect::new(5.0, 6.0, 45.0, 26.0));

        cmd.run(&mut fx.ctx()).unwrap();
        assert_eq!(fx.bounds(ids[0]), Rect::new(5.0, 6.0, 45.0, 26.0));
        cmd.undo(&mut fx.ctx()).unwrap();
        assert_eq!(fx.bounds(ids[0]), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(cmd.description(), "Resize shape");
    }

    #[test]
    fn resize_relocate_missing_shape_fails() {
        let (mut fx, _) = Fixture::new(&[]);
        let ghost = ShapeId::new();
        let mut cmd = ResizeRelocateShape::new(ghost, Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(cmd.run(&mut fx.ctx()), Err(CommandError::ShapeNotFound(ghost)));
    }

    #[test]
    fn remove_restores_order_and_selection() {
        let (mut fx, ids) = Fixture::new(&[
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Rect::new(2.0, 0.0, 3.0, 1.0),
            Rect::new(4.0, 0.0, 5.0, 1.0),
        ]);
        fx.selection.set([ids[0], ids[1]]);
        let mut cmd = RemoveShapes::new(vec![ids[2], ids[0]]);

        cmd.run(&mut fx.ctx()).unwrap();
        assert_eq!(fx.document.ids(), vec![ids[1]]);
        assert_eq!(fx.selection.items(), vec![ids[1]]);

        cmd.undo(&mut fx.ctx()).unwrap();
        assert_eq!(fx.document.ids(), ids);
        assert!(fx.selection.contains(&ids[0]));
        assert!(!fx.selection.contains(&ids[2]));
    }
}
