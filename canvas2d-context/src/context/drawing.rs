//! Fill, stroke, clip and rectangle operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::backend::SkiaRasterizer;
use crate::dirty::DirtyFlags;
use crate::drawing_state::ClipPath;
use crate::geometry::RectParams;
use crate::path::map_point;
use crate::style::CanvasFillRule;
use tiny_skia::{BlendMode, Mask, Paint, Path, PathBuilder, Pixmap, Transform};

impl Canvas2dContext {
    // --- Clipping ---

    /// Intersect the clip region with the current path using the non-zero winding rule.
    pub fn clip(&mut self) {
        self.clip_with_rule(CanvasFillRule::NonZero);
    }

    /// Intersect the clip region with the current path.
    ///
    /// The clip lives in the graphics state and is undone by `restore`.
    /// Clipping with an empty path clips everything.
    pub fn clip_with_rule(&mut self, fill_rule: CanvasFillRule) {
        log::debug!(target: "canvas", "clip {:?}", fill_rule);
        self.state.clip.push(ClipPath {
            path: self.path.to_path(),
            fill_rule,
        });
        self.mark_dirty(DirtyFlags::CLIP);
    }

    // --- Drawing operations ---

    /// Fill the current path using the non-zero winding rule.
    pub fn fill(&mut self) {
        self.fill_with_rule(CanvasFillRule::NonZero);
    }

    /// Fill the current path with the specified fill rule.
    pub fn fill_with_rule(&mut self, fill_rule: CanvasFillRule) {
        log::debug!(target: "canvas", "fill {:?}", fill_rule);
        if let Some(path) = self.path.to_path() {
            self.fill_device_path(&path, fill_rule);
        }
    }

    /// Stroke the current path.
    pub fn stroke(&mut self) {
        log::debug!(target: "canvas", "stroke");
        if let Some(path) = self.path.to_path() {
            self.stroke_device_path(&path);
        }
    }

    /// Fill a rectangle without touching the current path.
    pub fn fill_rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "fillRect {} {} {} {}", params.x, params.y, params.width, params.height);
        if let Some(path) = self.device_rect(params) {
            self.fill_device_path(&path, CanvasFillRule::NonZero);
        }
    }

    /// Stroke a rectangle without touching the current path.
    pub fn stroke_rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "strokeRect {} {} {} {}", params.x, params.y, params.width, params.height);
        if let Some(path) = self.device_rect(params) {
            self.stroke_device_path(&path);
        }
    }

    /// Set the pixels of a rectangle to transparent black.
    ///
    /// Ignores the composite operation, global alpha and shadow; the clip still applies.
    pub fn clear_rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "clearRect {} {} {} {}", params.x, params.y, params.width, params.height);
        let Some(path) = self.device_rect(params) else {
            return;
        };
        self.prepare_draw();
        let paint = Paint {
            blend_mode: BlendMode::Clear,
            ..Default::default()
        };
        self.pixmap.fill_path(
            &path,
            &paint,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            self.raster.clip_mask.as_ref(),
        );
        self.repaint.schedule_change();
    }

    // --- Shared raster helpers ---

    /// Device-space outline of a user-space rectangle.
    pub(crate) fn device_rect(&self, params: &RectParams) -> Option<Path> {
        let RectParams {
            x,
            y,
            width,
            height,
        } = *params;
        if ![x, y, width, height].iter().all(|v| v.is_finite()) {
            return None;
        }
        let t = &self.state.transform;
        let corners = [
            map_point(t, x, y),
            map_point(t, x + width, y),
            map_point(t, x + width, y + height),
            map_point(t, x, y + height),
        ];
        let mut pb = PathBuilder::new();
        pb.move_to(corners[0].0, corners[0].1);
        for (cx, cy) in &corners[1..] {
            pb.line_to(*cx, *cy);
        }
        pb.close();
        pb.finish()
    }

    pub(crate) fn fill_device_path(&mut self, path: &Path, fill_rule: CanvasFillRule) {
        if !self.prepare_draw() {
            return;
        }
        let Some(paint) = self.raster.fill_paint() else {
            return;
        };
        let rule = fill_rule.into();
        self.render_with_shadow(|pixmap, blend_mode, transform, mask| {
            let paint = Paint {
                blend_mode,
                ..paint.clone()
            };
            pixmap.fill_path(path, &paint, rule, transform, mask);
        });
    }

    pub(crate) fn stroke_device_path(&mut self, path: &Path) {
        if !self.prepare_draw() {
            return;
        }
        let Some(paint) = self.raster.stroke_paint() else {
            return;
        };
        if let Some(outline) = self.raster.transformed_stroke_outline(path) {
            self.render_with_shadow(|pixmap, blend_mode, transform, mask| {
                let paint = Paint {
                    blend_mode,
                    ..paint.clone()
                };
                pixmap.fill_path(&outline, &paint, tiny_skia::FillRule::Winding, transform, mask);
            });
            return;
        }
        let stroke = self.raster.stroke.clone();
        self.render_with_shadow(|pixmap, blend_mode, transform, mask| {
            let paint = Paint {
                blend_mode,
                ..paint.clone()
            };
            pixmap.stroke_path(path, &paint, &stroke, transform, mask);
        });
    }

    /// Run `draw` for the shadow (when one is active) and then for the real
    /// primitive, and report the surface change.
    ///
    /// `draw` receives the target pixmap, the blend mode to paint with, a
    /// device-space transform to apply on top of the geometry and the clip
    /// mask. The shadow pass paints source-over into the scratch buffer with
    /// no clip; the compositor applies the real blend mode and clip.
    pub(crate) fn render_with_shadow<F>(&mut self, draw: F)
    where
        F: Fn(&mut Pixmap, BlendMode, Transform, Option<&Mask>),
    {
        let SkiaRasterizer {
            shadow,
            clip_mask,
            blend_mode,
            ..
        } = &mut self.raster;
        let clip = clip_mask.as_ref();
        if shadow.is_active() {
            shadow.render(&mut self.pixmap, *blend_mode, clip, |scratch, offset| {
                draw(scratch, BlendMode::SourceOver, offset, None)
            });
        }
        draw(&mut self.pixmap, *blend_mode, Transform::identity(), clip);
        self.repaint.schedule_change();
    }
}

#[cfg(test)]
mod tests {
    use crate::context::tests::test_context;
    use crate::geometry::RectParams;
    use crate::style::CanvasFillRule;
    use rstest::rstest;

    fn alpha_at(ctx: &crate::Canvas2dContext, x: u32, y: u32) -> u8 {
        ctx.pixmap.pixel(x, y).unwrap().alpha()
    }

    #[test]
    fn test_fill_rect_pixels() {
        let mut ctx = test_context(100, 100);
        ctx.set_fill_style("#ff0000");
        ctx.fill_rect(&RectParams::new(10.0, 10.0, 50.0, 50.0));

        let p = ctx.pixmap.pixel(30, 30).unwrap();
        assert_eq!((p.red(), p.green(), p.blue(), p.alpha()), (255, 0, 0, 255));
        assert_eq!(alpha_at(&ctx, 5, 5), 0);
        assert!(ctx.path.is_empty(), "fill_rect leaves the path alone");
    }

    #[test]
    fn test_stroke_rect_pixels() {
        let mut ctx = test_context(100, 100);
        ctx.set_stroke_style("#0000ff");
        ctx.set_line_width(2.0);
        ctx.stroke_rect(&RectParams::new(20.0, 20.0, 60.0, 60.0));

        let edge = ctx.pixmap.pixel(50, 20).unwrap();
        assert!(edge.blue() > 100 && edge.alpha() > 0);
        assert_eq!(alpha_at(&ctx, 50, 50), 0);
    }

    #[test]
    fn test_clear_rect_ignores_composite_and_alpha() {
        let mut ctx = test_context(20, 20);
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 20.0, 20.0));
        ctx.set_global_alpha(0.1);
        ctx.set_global_composite_operation("destination-over");
        ctx.clear_rect(&RectParams::new(0.0, 0.0, 10.0, 20.0));
        assert_eq!(alpha_at(&ctx, 5, 5), 0);
        assert_eq!(alpha_at(&ctx, 15, 5), 255);
    }

    #[test]
    fn test_clear_rect_respects_clip() {
        let mut ctx = test_context(20, 20);
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 20.0, 20.0));
        ctx.begin_path();
        ctx.rect(&RectParams::new(0.0, 0.0, 10.0, 10.0));
        ctx.clip();
        ctx.clear_rect(&RectParams::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(alpha_at(&ctx, 5, 5), 0);
        assert_eq!(alpha_at(&ctx, 15, 15), 255);
    }

    #[test]
    fn test_clip_is_scoped_by_save_restore() {
        let mut ctx = test_context(20, 20);
        ctx.save();
        ctx.begin_path();
        ctx.rect(&RectParams::new(0.0, 0.0, 10.0, 10.0));
        ctx.clip();
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(alpha_at(&ctx, 15, 15), 0);
        ctx.restore();
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(alpha_at(&ctx, 15, 15), 255);
    }

    #[test]
    fn test_nested_clips_intersect() {
        let mut ctx = test_context(30, 30);
        ctx.begin_path();
        ctx.rect(&RectParams::new(0.0, 0.0, 20.0, 20.0));
        ctx.clip();
        ctx.begin_path();
        ctx.rect(&RectParams::new(10.0, 10.0, 20.0, 20.0));
        ctx.clip();
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 30.0, 30.0));
        assert_eq!(alpha_at(&ctx, 15, 15), 255);
        assert_eq!(alpha_at(&ctx, 5, 5), 0);
        assert_eq!(alpha_at(&ctx, 25, 25), 0);
    }

    #[test]
    fn test_clip_with_empty_path_clips_everything() {
        let mut ctx = test_context(10, 10);
        ctx.begin_path();
        ctx.clip();
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 10.0, 10.0));
        assert!(ctx.pixmap.data().iter().all(|&b| b == 0));
    }

    #[rstest]
    #[case(CanvasFillRule::NonZero, 255)]
    #[case(CanvasFillRule::EvenOdd, 0)]
    fn test_fill_rule_hole(#[case] rule: CanvasFillRule, #[case] center_alpha: u8) {
        let mut ctx = test_context(40, 40);
        ctx.begin_path();
        ctx.rect(&RectParams::new(0.0, 0.0, 40.0, 40.0));
        ctx.rect(&RectParams::new(10.0, 10.0, 20.0, 20.0));
        ctx.fill_with_rule(rule);
        assert_eq!(alpha_at(&ctx, 20, 20), center_alpha);
        assert_eq!(alpha_at(&ctx, 5, 5), 255);
    }

    #[test]
    fn test_empty_path_draws_nothing() {
        let mut ctx = test_context(10, 10);
        ctx.begin_path();
        ctx.fill();
        ctx.stroke();
        assert!(ctx.pixmap.data().iter().all(|&b| b == 0));
        assert!(!ctx.take_changed());
    }

    #[test]
    fn test_zero_global_alpha_changes_nothing() {
        let mut ctx = test_context(10, 10);
        ctx.set_global_alpha(0.0);
        ctx.set_shadow_color("black");
        ctx.set_shadow_offset_x(2.0);
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 10.0, 10.0));
        ctx.begin_path();
        ctx.move_to(0.0, 0.0);
        ctx.line_to(10.0, 10.0);
        ctx.stroke();
        assert!(ctx.pixmap.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_shadow_drawn_under_shape() {
        let mut ctx = test_context(40, 40);
        ctx.set_fill_style("#ff0000");
        ctx.set_shadow_color("#0000ff");
        ctx.set_shadow_offset_x(10.0);
        ctx.set_shadow_offset_y(10.0);
        ctx.fill_rect(&RectParams::new(5.0, 5.0, 10.0, 10.0));

        let shape = ctx.pixmap.pixel(10, 10).unwrap();
        assert_eq!((shape.red(), shape.blue()), (255, 0));
        let shadow = ctx.pixmap.pixel(22, 22).unwrap();
        assert_eq!((shadow.red(), shadow.blue(), shadow.alpha()), (0, 255, 255));
        assert_eq!(alpha_at(&ctx, 35, 35), 0);
    }

    #[test]
    fn test_shadow_offset_ignores_transform() {
        let mut ctx = test_context(60, 60);
        ctx.scale(2.0, 2.0);
        ctx.set_shadow_color("black");
        ctx.set_shadow_offset_x(10.0);
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 5.0, 5.0));
        // Shape covers device 0..10; the shadow sits 10 device pixels right.
        assert_eq!(alpha_at(&ctx, 15, 5), 255);
        assert_eq!(alpha_at(&ctx, 25, 5), 0);
    }

    #[test]
    fn test_blurred_shadow_is_soft() {
        let mut ctx = test_context(60, 60);
        ctx.set_shadow_color("black");
        ctx.set_shadow_blur(8.0);
        ctx.fill_rect(&RectParams::new(20.0, 20.0, 20.0, 20.0));
        let outside = alpha_at(&ctx, 18, 30);
        assert!(outside > 0 && outside < 255, "alpha {outside}");
        assert_eq!(alpha_at(&ctx, 2, 2), 0);
    }

    #[rstest]
    #[case(1e20)]
    #[case(f32::MAX)]
    fn test_huge_shadow_blur_still_draws(#[case] blur: f32) {
        let mut ctx = test_context(20, 20);
        ctx.set_shadow_color("black");
        ctx.set_shadow_blur(blur);
        assert_eq!(ctx.shadow_blur(), blur);
        ctx.set_fill_style("#ff0000");
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 5.0, 5.0));

        let p = ctx.pixmap.pixel(2, 2).unwrap();
        assert_eq!((p.red(), p.alpha()), (255, 255));
        let (w, h) = ctx.raster.shadow.scratch_size().unwrap();
        assert!(w <= 60 && h <= 60, "scratch {w}x{h}");
    }

    #[test]
    fn test_stroke_stretches_with_non_uniform_scale() {
        let mut ctx = test_context(60, 40);
        ctx.scale(4.0, 1.0);
        ctx.set_line_width(2.0);
        ctx.begin_path();
        ctx.move_to(0.0, 10.0);
        ctx.line_to(10.0, 10.0);
        ctx.move_to(5.0, 20.0);
        ctx.line_to(5.0, 38.0);
        ctx.stroke();
        // Horizontal line keeps its 2px height: device rows 9..11
        assert_eq!(alpha_at(&ctx, 20, 9), 255);
        assert_eq!(alpha_at(&ctx, 20, 10), 255);
        assert_eq!(alpha_at(&ctx, 20, 7), 0);
        // Vertical line is 8px wide: device columns 16..24
        assert_eq!(alpha_at(&ctx, 17, 30), 255);
        assert_eq!(alpha_at(&ctx, 22, 30), 255);
        assert_eq!(alpha_at(&ctx, 25, 30), 0);
    }

    #[test]
    fn test_stroke_width_follows_transform() {
        let mut ctx = test_context(40, 40);
        ctx.scale(4.0, 4.0);
        ctx.set_line_width(2.0);
        ctx.begin_path();
        ctx.move_to(0.0, 5.0);
        ctx.line_to(10.0, 5.0);
        ctx.stroke();
        // Device line: y = 20, width 8
        assert_eq!(alpha_at(&ctx, 20, 17), 255);
        assert_eq!(alpha_at(&ctx, 20, 12), 0);
    }
}
