use crate::geometry::{Point, Rect, rect_union};
use crate::shape::{ShapeBounds, ShapeId};

/// Position of a resize handle on the selection outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl HandleKind {
    pub const ALL: [HandleKind; 8] = [
        HandleKind::NorthWest,
        HandleKind::North,
        HandleKind::NorthEast,
        HandleKind::East,
        HandleKind::SouthEast,
        HandleKind::South,
        HandleKind::SouthWest,
        HandleKind::West,
    ];

    /// Point of `bounds` the handle is centered on.
    pub fn anchor(&self, bounds: Rect) -> Point {
        let center = bounds.center();
        match self {
            HandleKind::NorthWest => Point::new(bounds.x0, bounds.y0),
            HandleKind::North => Point::new(center.x, bounds.y0),
            HandleKind::NorthEast => Point::new(bounds.x1, bounds.y0),
            HandleKind::East => Point::new(bounds.x1, center.y),
            HandleKind::SouthEast => Point::new(bounds.x1, bounds.y1),
            HandleKind::South => Point::new(center.x, bounds.y1),
            HandleKind::SouthWest => Point::new(bounds.x0, bounds.y1),
            HandleKind::West => Point::new(bounds.x0, center.y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionHandle {
    pub kind: HandleKind,
    /// Model-space square around the anchor
    pub rect: Rect,
}

/// What the view draws around the selection, derived from the selected
/// shapes and the current zoom. Model space throughout; sizes are divided
/// by the scale so they stay constant on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOutline {
    pub bounds: Rect,
    pub shapes: Vec<(ShapeId, Rect)>,
    pub handles: Vec<SelectionHandle>,
    pub stroke_width: f64,
}

impl SelectionOutline {
    /// `None` when nothing is selected.
    pub fn derive<'a, S, I>(selected: I, scale: f64, handle_size: f64) -> Option<Self>
    where
        S: ShapeBounds + 'a,
        I: IntoIterator<Item = &'a S>,
    {
        let shapes: Vec<(ShapeId, Rect)> = selected.into_iter().map(|s| (s.id(), s.bounds())).collect();
        let bounds = rect_union(shapes.iter().map(|(_, r)| *r))?;
        let half = handle_size / scale / 2.0;
        let handles = HandleKind::ALL
            .iter()
            .map(|kind| {
                let anchor = kind.anchor(bounds);
                SelectionHandle {
                    kind: *kind,
                    rect: Rect::new(anchor.x - half, anchor.y - half, anchor.x + half, anchor.y + half),
                }
            })
            .collect();
        Some(Self {
            bounds,
            shapes,
            handles,
            stroke_width: 1.0 / scale,
        })
    }

    pub fn handle(&self, kind: HandleKind) -> Option<&SelectionHandle> {
        self.handles.iter().find(|h| h.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    #[test]
    fn handles_shrink_with_zoom() {
        let shapes = [
            Shape::rectangle(Rect::new(0.0, 0.0, 10.0, 10.0)),
            Shape::oval(Rect::new(20.0, 30.0, 40.0, 50.0)),
        ];
        let outline = SelectionOutline::derive(&shapes, 2.0, 8.0).unwrap();

        assert_eq!(outline.bounds, Rect::new(0.0, 0.0, 40.0, 50.0));
        assert_eq!(outline.shapes.len(), 2);
        assert_eq!(outline.handles.len(), 8);
        assert_eq!(outline.stroke_width, 0.5);
        let se = outline.handle(HandleKind::SouthEast).unwrap();
        assert_eq!(se.rect, Rect::new(38.0, 48.0, 42.0, 52.0));
        let n = outline.handle(HandleKind::North).unwrap();
        assert_eq!(n.rect.center(), Point::new(20.0, 0.0));
    }

    #[test]
    fn empty_selection_has_no_outline() {
        let none: [Shape; 0] = [];
        assert!(SelectionOutline::derive(&none, 1.0, 8.0).is_none());
    }
}
