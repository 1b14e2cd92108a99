//! Axis-aligned helpers on top of `kurbo`.
//!
//! Model space and device space both use `kurbo` types (f64). Bounds are
//! always normalized rectangles (`x0 <= x1`, `y0 <= y1`).

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Union of all rectangles, or `None` for an empty iterator.
pub fn rect_union<I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = Rect>,
{
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

/// Inclusive intersection test: rectangles that only touch on an edge intersect.
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Inclusive containment test for a point.
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Box spanning two corners, normalized per axis so drag direction does not matter.
pub fn rect_spanning(a: Point, b: Point) -> Rect {
    Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
}
