use std::fmt;

use egui::Color32;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Point, Rect, Vec2};

/// Process-unique shape identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(Uuid);

impl ShapeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The basic shapes the canvas can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Oval,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 2] = [ShapeKind::Rectangle, ShapeKind::Oval];

    pub fn title(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Oval => "Oval",
        }
    }
}

/// Presentation-only attributes. The engine never reads these except to
/// compensate the stroke width for the current zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    pub fill: Color32,
    pub stroke: Color32,
    pub stroke_width: f32,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: Color32::DARK_GRAY,
            stroke: Color32::LIGHT_GRAY,
            stroke_width: 1.0,
        }
    }
}

impl ShapeStyle {
    /// Model-space stroke width that renders as `stroke_width` device pixels at `scale`.
    pub fn stroke_width_for_scale(&self, scale: f64) -> f64 {
        f64::from(self.stroke_width) / scale
    }
}

/// The narrow capability the editing engine needs from a shape.
pub trait ShapeBounds {
    fn id(&self) -> ShapeId;

    /// Bounds in canvas (model) coordinates.
    fn bounds(&self) -> Rect;

    fn set_bounds(&mut self, bounds: Rect);

    /// Moves the top-left corner to `origin`, keeping the size.
    fn relocate(&mut self, origin: Point) {
        let size = self.bounds().size();
        self.set_bounds(Rect::from_origin_size(origin, size));
    }

    fn translate(&mut self, delta: Vec2) {
        let moved = self.bounds() + delta;
        self.set_bounds(moved);
    }

    /// Resizes around the current top-left corner. Negative sizes clamp to zero.
    fn resize(&mut self, width: f64, height: f64) {
        let origin = self.bounds().origin();
        self.set_bounds(Rect::from_origin_size(origin, (width.max(0.0), height.max(0.0))));
    }
}

/// A shape on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    id: ShapeId,
    kind: ShapeKind,
    bounds: Rect,
    pub style: ShapeStyle,
}

impl Shape {
    pub fn new(kind: ShapeKind, bounds: Rect) -> Self {
        Self {
            id: ShapeId::new(),
            kind,
            bounds: bounds.abs(),
            style: ShapeStyle::default(),
        }
    }

    pub fn rectangle(bounds: Rect) -> Self {
        Self::new(ShapeKind::Rectangle, bounds)
    }

    pub fn oval(bounds: Rect) -> Self {
        Self::new(ShapeKind::Oval, bounds)
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.title()
    }
}

impl ShapeBounds for Shape {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds.abs();
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relocate_keeps_size() {
        let mut shape = Shape::rectangle(Rect::new(10.0, 10.0, 40.0, 30.0));
        shape.relocate(Point::new(0.0, 5.0));
        assert_eq!(shape.bounds(), Rect::new(0.0, 5.0, 30.0, 25.0));
    }

    #[test]
    fn translate_moves_both_corners() {
        let mut shape = Shape::oval(Rect::new(0.0, 0.0, 20.0, 10.0));
        shape.translate(Vec2::new(5.0, -2.5));
        assert_eq!(shape.bounds(), Rect::new(5.0, -2.5, 25.0, 7.5));
    }

    #[test]
    fn ids_are_unique() {
        let a = Shape::rectangle(Rect::ZERO);
        let b = Shape::rectangle(Rect::ZERO);
        assert_ne!(a.id(), b.id());
        assert!(a.to_string().starts_with("Rectangle : "));
    }

    #[test]
    fn stroke_width_compensates_zoom() {
        let style = ShapeStyle::default();
        assert_eq!(style.stroke_width_for_scale(2.0), 0.5);
    }
}
