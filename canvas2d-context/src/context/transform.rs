//! Transform operations for Canvas2dContext.
//!
//! Non-finite arguments leave the transform untouched.

use super::Canvas2dContext;
use crate::dirty::DirtyFlags;
use crate::matrix::Matrix2D;
use tiny_skia::Transform;

impl Canvas2dContext {
    fn set_ctm(&mut self, transform: Transform) {
        self.state.transform = transform;
        self.mark_dirty(DirtyFlags::TRANSFORM | DirtyFlags::LINE_WIDTH);
    }

    /// Translate the canvas.
    pub fn translate(&mut self, x: f32, y: f32) {
        log::debug!(target: "canvas", "translate {} {}", x, y);
        if x.is_finite() && y.is_finite() {
            self.set_ctm(self.state.transform.pre_translate(x, y));
        }
    }

    /// Rotate the canvas clockwise by `angle` radians.
    pub fn rotate(&mut self, angle: f32) {
        log::debug!(target: "canvas", "rotate {}", angle);
        if !angle.is_finite() {
            return;
        }
        let (sin, cos) = angle.sin_cos();
        let rotation = Transform::from_row(cos, sin, -sin, cos, 0.0, 0.0);
        self.set_ctm(self.state.transform.pre_concat(rotation));
    }

    /// Scale the canvas.
    pub fn scale(&mut self, x: f32, y: f32) {
        log::debug!(target: "canvas", "scale {} {}", x, y);
        if x.is_finite() && y.is_finite() {
            self.set_ctm(self.state.transform.pre_scale(x, y));
        }
    }

    /// Multiply the current transform by `matrix`.
    pub fn transform(&mut self, matrix: Matrix2D) {
        log::debug!(target: "canvas", "transform {:?}", matrix);
        if matrix.is_finite() {
            self.set_ctm(self.state.transform.pre_concat(matrix.into()));
        }
    }

    /// Replace the current transform.
    pub fn set_transform(&mut self, matrix: Matrix2D) {
        log::debug!(target: "canvas", "setTransform {:?}", matrix);
        if matrix.is_finite() {
            self.set_ctm(matrix.into());
        }
    }

    /// Reset the transform to identity.
    pub fn reset_transform(&mut self) {
        log::debug!(target: "canvas", "resetTransform");
        self.set_ctm(Transform::identity());
    }

    /// Get the current transformation matrix.
    pub fn get_transform(&self) -> Matrix2D {
        self.state.transform.into()
    }
}
