//! Path building operations for Canvas2dContext.
//!
//! Points are mapped through the current transform as they are added.

use super::Canvas2dContext;
use crate::geometry::{
    ArcParams, ArcToParams, CubicBezierParams, EllipseParams, QuadraticBezierParams, RectParams,
};
use crate::path::map_point;
use crate::style::CanvasFillRule;
use tiny_skia::PathBuilder;

fn all_finite(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite())
}

impl Canvas2dContext {
    /// Begin a new path.
    pub fn begin_path(&mut self) {
        log::debug!(target: "canvas", "beginPath");
        self.path.clear();
    }

    /// Transform a point by the current transformation matrix.
    pub(crate) fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        map_point(&self.state.transform, x, y)
    }

    /// Device-space position of the user-space origin, where a segment added
    /// to an empty path starts.
    fn origin(&self) -> (f32, f32) {
        self.transform_point(0.0, 0.0)
    }

    /// Move to a point without drawing.
    pub fn move_to(&mut self, x: f32, y: f32) {
        log::debug!(target: "canvas", "moveTo {} {}", x, y);
        if !all_finite(&[x, y]) {
            return;
        }
        let (tx, ty) = self.transform_point(x, y);
        self.path.move_to(tx, ty);
    }

    /// Draw a line to a point.
    pub fn line_to(&mut self, x: f32, y: f32) {
        log::debug!(target: "canvas", "lineTo {} {}", x, y);
        if !all_finite(&[x, y]) {
            return;
        }
        let origin = self.origin();
        let (tx, ty) = self.transform_point(x, y);
        self.path.ensure_subpath(origin);
        self.path.line_to(tx, ty);
    }

    /// Close the current subpath. No-op when there is no open subpath.
    pub fn close_path(&mut self) {
        log::debug!(target: "canvas", "closePath");
        self.path.close();
    }

    /// Add a cubic bezier curve.
    pub fn bezier_curve_to(&mut self, params: &CubicBezierParams) {
        log::debug!(target: "canvas", "bezierCurveTo {:?}", params);
        let CubicBezierParams {
            cp1x,
            cp1y,
            cp2x,
            cp2y,
            x,
            y,
        } = *params;
        if !all_finite(&[cp1x, cp1y, cp2x, cp2y, x, y]) {
            return;
        }
        let origin = self.origin();
        let (tcp1x, tcp1y) = self.transform_point(cp1x, cp1y);
        let (tcp2x, tcp2y) = self.transform_point(cp2x, cp2y);
        let (tx, ty) = self.transform_point(x, y);
        self.path.ensure_subpath(origin);
        self.path.cubic_to(tcp1x, tcp1y, tcp2x, tcp2y, tx, ty);
    }

    /// Add a quadratic bezier curve.
    pub fn quadratic_curve_to(&mut self, params: &QuadraticBezierParams) {
        log::debug!(target: "canvas", "quadraticCurveTo {:?}", params);
        let QuadraticBezierParams { cpx, cpy, x, y } = *params;
        if !all_finite(&[cpx, cpy, x, y]) {
            return;
        }
        let origin = self.origin();
        let (tcpx, tcpy) = self.transform_point(cpx, cpy);
        let (tx, ty) = self.transform_point(x, y);
        self.path.ensure_subpath(origin);
        self.path.quad_to(tcpx, tcpy, tx, ty);
    }

    /// Add a closed rectangle subpath. The current point becomes (x, y).
    pub fn rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "rect {} {} {} {}", params.x, params.y, params.width, params.height);
        let RectParams {
            x,
            y,
            width,
            height,
        } = *params;
        if !all_finite(&[x, y, width, height]) {
            return;
        }
        self.path.quad_polygon([
            self.transform_point(x, y),
            self.transform_point(x + width, y),
            self.transform_point(x + width, y + height),
            self.transform_point(x, y + height),
        ]);
    }

    /// Add a circular arc, connected by a line from the current point if there is one.
    pub fn arc(&mut self, params: &ArcParams) {
        log::debug!(target: "canvas", "arc {:?}", params);
        self.ellipse(&EllipseParams::from(params));
    }

    /// Add an elliptical arc, connected by a line from the current point if there is one.
    pub fn ellipse(&mut self, params: &EllipseParams) {
        let EllipseParams {
            x,
            y,
            radius_x,
            radius_y,
            rotation,
            start_angle,
            end_angle,
            ..
        } = *params;
        if !all_finite(&[x, y, radius_x, radius_y, rotation, start_angle, end_angle]) {
            return;
        }
        let mut builder = PathBuilder::new();
        crate::arc::ellipse(&mut builder, params, false);
        if let Some(path) = builder.finish() {
            self.path.append(&path, self.state.transform, true, false);
        }
    }

    /// Add an arcTo corner.
    ///
    /// Without a current point this is `move_to(x1, y1)`. Zero or negative
    /// radii and collinear control points produce a straight line to (x1, y1).
    pub fn arc_to(&mut self, params: &ArcToParams) {
        log::debug!(target: "canvas", "arcTo {:?}", params);
        let ArcToParams {
            x1,
            y1,
            x2,
            y2,
            radius,
        } = *params;
        if !all_finite(&[x1, y1, x2, y2, radius]) {
            return;
        }
        let Some((cx, cy)) = self.path.current_point() else {
            self.move_to(x1, y1);
            return;
        };

        let transform = self.state.transform;
        let Some(inverse) = transform.invert() else {
            // Everything collapses under a singular transform.
            let (tx, ty) = self.transform_point(x1, y1);
            self.path.line_to(tx, ty);
            return;
        };

        // The current point is in device space; the corner is built in user space
        let (x0, y0) = map_point(&inverse, cx, cy);
        let mut builder = PathBuilder::new();
        builder.move_to(x0, y0);
        crate::arc::arc_to(&mut builder, x0, y0, params);
        if let Some(path) = builder.finish() {
            self.path.append(&path, transform, false, true);
        }
    }

    /// Whether the user-space point is inside the current path (non-zero rule).
    pub fn is_point_in_path(&self, x: f32, y: f32) -> bool {
        self.is_point_in_path_with_rule(x, y, CanvasFillRule::NonZero)
    }

    pub fn is_point_in_path_with_rule(&self, x: f32, y: f32, fill_rule: CanvasFillRule) -> bool {
        if !all_finite(&[x, y]) {
            return false;
        }
        let (dx, dy) = self.transform_point(x, y);
        self.path.contains(dx, dy, fill_rule)
    }
}
