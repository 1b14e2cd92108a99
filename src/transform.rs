//! Mapping between model space (shape coordinates) and parent space (device
//! pixels of the canvas widget).

use crate::geometry::{Affine, Point, Rect, Vec2};

/// Scale and translate state of a canvas and the single transform derived
/// from them.
///
/// `transform = scale_matrix * translate_matrix`: a model point is first
/// translated, then scaled about the pivot chosen at the last zoom.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasTransform {
    scale: f64,
    scale_matrix: Affine,
    translate: Vec2,
    bounds_in_parent: Option<Rect>,
    transform: Affine,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasTransform {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            scale_matrix: Affine::IDENTITY,
            translate: Vec2::ZERO,
            bounds_in_parent: None,
            transform: Affine::IDENTITY,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> Vec2 {
        self.translate
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn bounds_in_parent(&self) -> Option<Rect> {
        self.bounds_in_parent
    }

    /// Layout hook. The center of these bounds is the zoom pivot.
    pub fn set_bounds_in_parent(&mut self, bounds: Rect) {
        self.bounds_in_parent = Some(bounds);
    }

    /// Sets the zoom, pivoted at the center of the canvas bounds so the
    /// visual center stays put.
    ///
    /// Non-positive or non-finite values are ignored, as is any zoom before
    /// the canvas has been laid out. Returns whether the scale changed.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            log::warn!("Ignoring invalid scale {scale}");
            return false;
        }
        let Some(bounds) = self.bounds_in_parent else {
            log::warn!("Ignoring zoom to {scale} before canvas layout");
            return false;
        };
        let pivot = bounds.center().to_vec2();
        self.scale = scale;
        self.scale_matrix =
            Affine::translate(pivot) * Affine::scale(scale) * Affine::translate(-pivot);
        self.recompute();
        true
    }

    /// Replaces the translate component. Non-finite values are ignored.
    pub fn set_translate(&mut self, translate: Vec2) -> bool {
        if !translate.is_finite() {
            log::warn!("Ignoring invalid translate {translate:?}");
            return false;
        }
        self.translate = translate;
        self.recompute();
        true
    }

    /// Maps a parent (device) point into model space.
    pub fn to_model_space(&self, point: Point) -> Point {
        self.transform.inverse() * point
    }

    pub fn to_parent_space(&self, point: Point) -> Point {
        self.transform * point
    }

    /// Bounding box in parent space of a model-space rectangle.
    pub fn rect_to_parent_space(&self, rect: Rect) -> Rect {
        self.transform.transform_rect_bbox(rect)
    }

    pub fn rect_to_model_space(&self, rect: Rect) -> Rect {
        self.transform.inverse().transform_rect_bbox(rect)
    }

    fn recompute(&mut self) {
        self.transform = self.scale_matrix * Affine::translate(self.translate);
    }
}
