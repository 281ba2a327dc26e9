//! Gradient types for Canvas 2D operations.
//!
//! A `CanvasGradient` is a cheap handle: clones share the same stop list, so
//! stops added after the gradient was assigned as a style show up on the next
//! draw that uses it.

use crate::geometry::RadialGradientParams;
use crate::style::parse_color_or;
use std::cell::RefCell;
use std::rc::Rc;

/// A color stop in a gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    /// Offset position (0.0 to 1.0).
    pub offset: f64,
    /// Color at this stop.
    pub color: tiny_skia::Color,
}

/// Type of gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientType {
    /// Linear gradient from (x0, y0) to (x1, y1).
    Linear { x0: f32, y0: f32, x1: f32, y1: f32 },
    /// Radial gradient from inner circle to outer circle.
    Radial(RadialGradientParams),
}

#[derive(Debug)]
struct GradientData {
    gradient_type: GradientType,
    stops: Vec<GradientStop>,
}

/// Canvas gradient (linear or radial).
#[derive(Debug, Clone)]
pub struct CanvasGradient {
    inner: Rc<RefCell<GradientData>>,
}

impl PartialEq for CanvasGradient {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl CanvasGradient {
    fn with_type(gradient_type: GradientType) -> Self {
        Self {
            inner: Rc::new(RefCell::new(GradientData {
                gradient_type,
                stops: Vec::new(),
            })),
        }
    }

    /// Create a new linear gradient.
    pub fn new_linear(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::with_type(GradientType::Linear { x0, y0, x1, y1 })
    }

    /// Create a new radial gradient.
    pub fn new_radial(params: &RadialGradientParams) -> Self {
        Self::with_type(GradientType::Radial(*params))
    }

    /// Add a color stop from CSS color text.
    ///
    /// Offsets outside `0.0..=1.0` (or non-finite) are ignored; an unparseable
    /// color becomes opaque black.
    pub fn add_color_stop(&self, offset: f64, color: &str) {
        let color = parse_color_or(color, tiny_skia::Color::BLACK);
        self.add_color_stop_color(offset, color);
    }

    /// Add a color stop with an already resolved color.
    pub fn add_color_stop_color(&self, offset: f64, color: tiny_skia::Color) {
        if !offset.is_finite() || !(0.0..=1.0).contains(&offset) {
            log::debug!(target: "canvas", "addColorStop ignored offset {}", offset);
            return;
        }
        self.inner
            .borrow_mut()
            .stops
            .push(GradientStop { offset, color });
    }

    /// Gradient geometry.
    pub fn gradient_type(&self) -> GradientType {
        self.inner.borrow().gradient_type
    }

    /// Stops ordered by offset. Stops sharing an offset keep insertion order.
    pub fn sorted_stops(&self) -> Vec<GradientStop> {
        let mut stops = self.inner.borrow().stops.clone();
        stops.sort_by(|a, b| {
            a.offset
                .partial_cmp(&b.offset)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        stops
    }

    pub fn stop_count(&self) -> usize {
        self.inner.borrow().stops.len()
    }

    /// Build a shader for this gradient.
    ///
    /// `alpha` multiplies every stop (global alpha); `transform` maps gradient
    /// coordinates into device space. Returns `None` when there is nothing to
    /// paint.
    pub(crate) fn to_shader(
        &self,
        alpha: f32,
        transform: tiny_skia::Transform,
    ) -> Option<tiny_skia::Shader<'static>> {
        let apply_alpha = |mut color: tiny_skia::Color| {
            if alpha < 1.0 {
                color.set_alpha((color.alpha() * alpha).clamp(0.0, 1.0));
            }
            color
        };
        let sorted = self.sorted_stops();
        // tiny-skia's two-point conical gradient starts at radius 0, so a
        // nonzero inner radius is folded into the stop offsets. Exact for
        // concentric circles.
        let inner = match self.gradient_type() {
            GradientType::Radial(p) if p.r0 > 0.0 && p.r1 > p.r0 => p.r0 / p.r1,
            _ => 0.0,
        };
        let mut stops: Vec<tiny_skia::GradientStop> = sorted
            .iter()
            .map(|stop| {
                let offset = inner + stop.offset as f32 * (1.0 - inner);
                tiny_skia::GradientStop::new(offset, apply_alpha(stop.color))
            })
            .collect();
        if inner > 0.0 {
            if let Some(first) = sorted.first() {
                stops.insert(0, tiny_skia::GradientStop::new(0.0, apply_alpha(first.color)));
            }
        }

        match sorted.len() {
            0 => None,
            // tiny-skia needs two stops; a single stop paints a solid color
            1 => Some(tiny_skia::Shader::SolidColor(apply_alpha(sorted[0].color))),
            _ => match self.gradient_type() {
                GradientType::Linear { x0, y0, x1, y1 } => tiny_skia::LinearGradient::new(
                    tiny_skia::Point { x: x0, y: y0 },
                    tiny_skia::Point { x: x1, y: y1 },
                    stops,
                    tiny_skia::SpreadMode::Pad,
                    transform,
                ),
                GradientType::Radial(params) => tiny_skia::RadialGradient::new(
                    tiny_skia::Point {
                        x: params.x0,
                        y: params.y0,
                    },
                    tiny_skia::Point {
                        x: params.x1,
                        y: params.y1,
                    },
                    params.r1,
                    stops,
                    tiny_skia::SpreadMode::Pad,
                    transform,
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stops_sorted_on_read() {
        let g = CanvasGradient::new_linear(0.0, 0.0, 10.0, 0.0);
        g.add_color_stop(1.0, "blue");
        g.add_color_stop(0.0, "red");
        g.add_color_stop(0.5, "lime");
        let offsets: Vec<f64> = g.sorted_stops().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_invalid_offsets_ignored() {
        let g = CanvasGradient::new_linear(0.0, 0.0, 10.0, 0.0);
        g.add_color_stop(-0.1, "red");
        g.add_color_stop(1.5, "red");
        g.add_color_stop(f64::NAN, "red");
        assert_eq!(g.stop_count(), 0);
    }

    #[test]
    fn test_bad_color_falls_back_to_black() {
        let g = CanvasGradient::new_linear(0.0, 0.0, 10.0, 0.0);
        g.add_color_stop(0.3, "definitely-not-a-color");
        assert_eq!(g.sorted_stops()[0].color, tiny_skia::Color::BLACK);
    }

    #[test]
    fn test_clones_share_stops() {
        let g = CanvasGradient::new_linear(0.0, 0.0, 10.0, 0.0);
        let assigned = g.clone();
        g.add_color_stop(0.0, "red");
        assert_eq!(assigned.stop_count(), 1);
        assert_eq!(assigned, g);
        assert_ne!(CanvasGradient::new_linear(0.0, 0.0, 10.0, 0.0), g);
    }

    #[test]
    fn test_shader_requires_stops() {
        let g = CanvasGradient::new_linear(0.0, 0.0, 10.0, 0.0);
        assert!(g.to_shader(1.0, tiny_skia::Transform::identity()).is_none());
        g.add_color_stop(0.0, "red");
        assert!(g.to_shader(1.0, tiny_skia::Transform::identity()).is_some());
    }

    #[test]
    fn test_radial_inner_radius_starts_the_ramp() {
        let mut ctx = crate::context::tests::test_context(50, 50);
        let g = ctx.create_radial_gradient(&RadialGradientParams {
            x0: 25.0,
            y0: 25.0,
            r0: 10.0,
            x1: 25.0,
            y1: 25.0,
            r1: 20.0,
        });
        g.add_color_stop(0.0, "black");
        g.add_color_stop(1.0, "white");
        ctx.set_fill_style(&g);
        ctx.fill_rect(&crate::geometry::RectParams::new(0.0, 0.0, 50.0, 50.0));

        let inside = ctx.pixmap().pixel(30, 25).unwrap();
        assert!(inside.red() < 8, "inside inner circle: {}", inside.red());
        let middle = ctx.pixmap().pixel(40, 25).unwrap().red();
        assert!((110..=170).contains(&middle), "halfway: {middle}");
        let outside = ctx.pixmap().pixel(48, 25).unwrap().red();
        assert!(outside > 245, "outside outer circle: {outside}");
    }
}
