//! Arc geometry as cubic bezier segments.
//!
//! tiny-skia has no arc primitive, so arcs and ellipses are split into sweeps
//! of at most a quarter turn, each approximated by one cubic.

use crate::geometry::{ArcToParams, EllipseParams};
use std::f32::consts::{PI, TAU};
use tiny_skia::PathBuilder;

/// Signed sweep for an arc from `start` to `end`.
///
/// A request covering a full turn or more is clamped to exactly one turn;
/// anything smaller wraps into `(-TAU, TAU)` in the requested direction.
pub(crate) fn arc_sweep(start: f32, end: f32, anticlockwise: bool) -> f32 {
    if anticlockwise {
        if start - end >= TAU {
            -TAU
        } else {
            -(start - end).rem_euclid(TAU)
        }
    } else if end - start >= TAU {
        TAU
    } else {
        (end - start).rem_euclid(TAU)
    }
}

/// Append an elliptical arc to `path`.
///
/// The arc begins with `line_to` its start point when `connect` is set
/// (the builder already has a current point), otherwise with `move_to`.
/// Non-positive or non-finite radii add nothing.
pub fn ellipse(path: &mut PathBuilder, params: &EllipseParams, connect: bool) {
    let EllipseParams {
        x,
        y,
        radius_x,
        radius_y,
        rotation,
        start_angle,
        end_angle,
        anticlockwise,
    } = *params;
    if !(radius_x > 0.0 && radius_y > 0.0 && radius_x.is_finite() && radius_y.is_finite()) {
        return;
    }

    let sweep = arc_sweep(start_angle, end_angle, anticlockwise);
    let (cos_rot, sin_rot) = (rotation.cos(), rotation.sin());
    let point_at = |px: f32, py: f32| -> (f32, f32) {
        let tx = radius_x * px;
        let ty = radius_y * py;
        (x + tx * cos_rot - ty * sin_rot, y + tx * sin_rot + ty * cos_rot)
    };

    let (sx, sy) = point_at(start_angle.cos(), start_angle.sin());
    if connect {
        path.line_to(sx, sy);
    } else {
        path.move_to(sx, sy);
    }

    let num_segments = ((sweep.abs() / (PI / 2.0)).ceil() as usize).max(1);
    let step = sweep / num_segments as f32;
    for i in 0..num_segments {
        let a1 = start_angle + i as f32 * step;
        let a2 = a1 + step;
        // Control point distance for a cubic spanning (a2 - a1) on the unit circle
        let k = 4.0 / 3.0 * ((a2 - a1) / 4.0).tan();
        let (c1, s1) = (a1.cos(), a1.sin());
        let (c2, s2) = (a2.cos(), a2.sin());
        let (cp1x, cp1y) = point_at(c1 - k * s1, s1 + k * c1);
        let (cp2x, cp2y) = point_at(c2 + k * s2, s2 - k * c2);
        let (ex, ey) = point_at(c2, s2);
        path.cubic_to(cp1x, cp1y, cp2x, cp2y, ex, ey);
    }
}

/// Append an `arcTo` corner starting from the current point `(x0, y0)`.
///
/// Degenerate corners (zero radius, coincident or collinear points) become a
/// straight line to `(x1, y1)`.
pub fn arc_to(path: &mut PathBuilder, x0: f32, y0: f32, params: &ArcToParams) {
    let ArcToParams {
        x1,
        y1,
        x2,
        y2,
        radius,
    } = *params;
    if radius <= 0.0 {
        path.line_to(x1, y1);
        return;
    }

    let (v1x, v1y) = (x0 - x1, y0 - y1);
    let (v2x, v2y) = (x2 - x1, y2 - y1);
    let len1 = v1x.hypot(v1y);
    let len2 = v2x.hypot(v2y);
    if len1 < 1e-6 || len2 < 1e-6 {
        path.line_to(x1, y1);
        return;
    }
    let (v1x, v1y) = (v1x / len1, v1y / len1);
    let (v2x, v2y) = (v2x / len2, v2y / len2);

    let cross = v1x * v2y - v1y * v2x;
    if cross.abs() < 1e-6 {
        path.line_to(x1, y1);
        return;
    }
    let angle = cross.atan2(v1x * v2x + v1y * v2y);

    // Distance from the corner to both tangent points
    let seg_len = radius / (angle / 2.0).tan().abs();
    let (tx1, ty1) = (x1 + v1x * seg_len, y1 + v1y * seg_len);
    let (tx2, ty2) = (x1 + v2x * seg_len, y1 + v2y * seg_len);

    let sign = if cross < 0.0 { -1.0 } else { 1.0 };
    let cx = tx1 - v1y * sign * radius;
    let cy = ty1 + v1x * sign * radius;

    let start_angle = (ty1 - cy).atan2(tx1 - cx);
    let end_angle = (ty2 - cy).atan2(tx2 - cx);
    ellipse(
        path,
        &EllipseParams {
            x: cx,
            y: cy,
            radius_x: radius,
            radius_y: radius,
            rotation: 0.0,
            start_angle,
            end_angle,
            anticlockwise: cross > 0.0,
        },
        true,
    );
}
