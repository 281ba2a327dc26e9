//! The context's current path.
//!
//! Every coordinate stored here is already in device space: callers map user
//! coordinates through the CTM before appending, so changing the transform
//! later never moves existing segments.

use crate::style::CanvasFillRule;
use tiny_skia::{Path, PathBuilder, PathSegment, Transform};

/// Maximum distance from an edge at which a point still counts as inside.
const BOUNDARY_TOLERANCE: f32 = 1e-3;
/// Line segments used to flatten one curve for hit testing.
const CURVE_STEPS: usize = 16;

pub(crate) fn map_point(transform: &Transform, x: f32, y: f32) -> (f32, f32) {
    (
        transform.sx * x + transform.kx * y + transform.tx,
        transform.ky * x + transform.sy * y + transform.ty,
    )
}

/// Device-space path under construction.
#[derive(Debug, Clone)]
pub struct CanvasPath {
    builder: PathBuilder,
    current: Option<(f32, f32)>,
    subpath_start: (f32, f32),
}

impl Default for CanvasPath {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasPath {
    pub fn new() -> Self {
        Self {
            builder: PathBuilder::new(),
            current: None,
            subpath_start: (0.0, 0.0),
        }
    }

    /// Drop all subpaths.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn is_empty(&self) -> bool {
        self.builder.is_empty()
    }

    /// The last point added, if any.
    pub fn current_point(&self) -> Option<(f32, f32)> {
        self.current
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
        self.current = Some((x, y));
        self.subpath_start = (x, y);
    }

    /// Start a subpath at `origin` when there is no current point.
    pub fn ensure_subpath(&mut self, origin: (f32, f32)) {
        if self.current.is_none() {
            self.move_to(origin.0, origin.1);
        }
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
        self.current = Some((x, y));
    }

    pub fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
        self.current = Some((x, y));
    }

    pub fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
        self.current = Some((x, y));
    }

    /// Close the open subpath. No-op without a current point.
    pub fn close(&mut self) {
        if self.current.is_none() {
            return;
        }
        self.builder.close();
        self.current = Some(self.subpath_start);
    }

    /// Closed quadrilateral; the current point becomes the first corner.
    pub fn quad_polygon(&mut self, corners: [(f32, f32); 4]) {
        let [(x0, y0), (x1, y1), (x2, y2), (x3, y3)] = corners;
        self.move_to(x0, y0);
        self.line_to(x1, y1);
        self.line_to(x2, y2);
        self.line_to(x3, y3);
        self.close();
    }

    /// Append the segments of `path`, mapping each point through `transform`.
    ///
    /// With `connect_first_move`, the leading move becomes a line from the
    /// current point (arc semantics). With `skip_first_move`, the leading
    /// move is dropped when a current point exists (arcTo semantics).
    pub fn append(
        &mut self,
        path: &Path,
        transform: Transform,
        connect_first_move: bool,
        skip_first_move: bool,
    ) {
        let mut first_move = true;
        for segment in path.segments() {
            match segment {
                PathSegment::MoveTo(p) => {
                    let (x, y) = map_point(&transform, p.x, p.y);
                    let has_current = self.current.is_some();
                    if first_move && skip_first_move && has_current {
                        // already at this point
                    } else if first_move && connect_first_move && has_current {
                        self.line_to(x, y);
                    } else {
                        self.move_to(x, y);
                    }
                    first_move = false;
                }
                PathSegment::LineTo(p) => {
                    let (x, y) = map_point(&transform, p.x, p.y);
                    self.line_to(x, y);
                }
                PathSegment::QuadTo(c, p) => {
                    let (cx, cy) = map_point(&transform, c.x, c.y);
                    let (x, y) = map_point(&transform, p.x, p.y);
                    self.quad_to(cx, cy, x, y);
                }
                PathSegment::CubicTo(c1, c2, p) => {
                    let (c1x, c1y) = map_point(&transform, c1.x, c1.y);
                    let (c2x, c2y) = map_point(&transform, c2.x, c2.y);
                    let (x, y) = map_point(&transform, p.x, p.y);
                    self.cubic_to(c1x, c1y, c2x, c2y, x, y);
                }
                PathSegment::Close => self.close(),
            }
        }
    }

    /// Snapshot of the path for rasterization. `None` when there is nothing to draw.
    pub fn to_path(&self) -> Option<Path> {
        self.builder.clone().finish()
    }

    /// Whether the device-space point lies inside the path.
    pub fn contains(&self, x: f32, y: f32, fill_rule: CanvasFillRule) -> bool {
        self.to_path()
            .is_some_and(|path| path_contains(&path, x, y, fill_rule))
    }
}

/// Point-in-path test on a finished path.
///
/// Subpaths are implicitly closed and curves flattened. Points on an edge
/// count as inside.
pub fn path_contains(path: &Path, x: f32, y: f32, fill_rule: CanvasFillRule) -> bool {
    let mut edges = EdgeWalker::new(x, y);
    let mut last = (0.0, 0.0);
    for segment in path.segments() {
        match segment {
            PathSegment::MoveTo(p) => {
                edges.close_subpath();
                edges.start = (p.x, p.y);
                last = (p.x, p.y);
            }
            PathSegment::LineTo(p) => {
                edges.edge(last, (p.x, p.y));
                last = (p.x, p.y);
            }
            PathSegment::QuadTo(c, p) => {
                let (p0, c, p1) = (last, (c.x, c.y), (p.x, p.y));
                for i in 1..=CURVE_STEPS {
                    let t = i as f32 / CURVE_STEPS as f32;
                    let mt = 1.0 - t;
                    let next = (
                        mt * mt * p0.0 + 2.0 * mt * t * c.0 + t * t * p1.0,
                        mt * mt * p0.1 + 2.0 * mt * t * c.1 + t * t * p1.1,
                    );
                    edges.edge(last, next);
                    last = next;
                }
            }
            PathSegment::CubicTo(c1, c2, p) => {
                let (p0, c1, c2, p1) = (last, (c1.x, c1.y), (c2.x, c2.y), (p.x, p.y));
                for i in 1..=CURVE_STEPS {
                    let t = i as f32 / CURVE_STEPS as f32;
                    let mt = 1.0 - t;
                    let a = mt * mt * mt;
                    let b = 3.0 * mt * mt * t;
                    let c = 3.0 * mt * t * t;
                    let d = t * t * t;
                    let next = (
                        a * p0.0 + b * c1.0 + c * c2.0 + d * p1.0,
                        a * p0.1 + b * c1.1 + c * c2.1 + d * p1.1,
                    );
                    edges.edge(last, next);
                    last = next;
                }
            }
            PathSegment::Close => {
                edges.edge(last, edges.start);
                last = edges.start;
            }
        }
        edges.last = last;
    }
    edges.close_subpath();

    if edges.on_boundary {
        return true;
    }
    match fill_rule {
        CanvasFillRule::NonZero => edges.winding != 0,
        CanvasFillRule::EvenOdd => edges.winding % 2 != 0,
    }
}

/// Accumulates the winding number of edges around a test point.
struct EdgeWalker {
    px: f32,
    py: f32,
    start: (f32, f32),
    last: (f32, f32),
    winding: i32,
    on_boundary: bool,
}

impl EdgeWalker {
    fn new(px: f32, py: f32) -> Self {
        Self {
            px,
            py,
            start: (0.0, 0.0),
            last: (0.0, 0.0),
            winding: 0,
            on_boundary: false,
        }
    }

    /// Implicit closing edge of the subpath being left.
    fn close_subpath(&mut self) {
        if self.last != self.start {
            self.edge(self.last, self.start);
        }
        self.last = self.start;
    }

    fn edge(&mut self, a: (f32, f32), b: (f32, f32)) {
        if distance_to_segment(self.px, self.py, a, b) <= BOUNDARY_TOLERANCE {
            self.on_boundary = true;
        }
        // Signed area: > 0 when the point is left of a->b
        let is_left = (b.0 - a.0) * (self.py - a.1) - (self.px - a.0) * (b.1 - a.1);
        if a.1 <= self.py {
            if b.1 > self.py && is_left > 0.0 {
                self.winding += 1;
            }
        } else if b.1 <= self.py && is_left < 0.0 {
            self.winding -= 1;
        }
    }
}

fn distance_to_segment(px: f32, py: f32, a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 {
        (((px - a.0) * dx + (py - a.1) * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    (px - cx).hypot(py - cy)
}
