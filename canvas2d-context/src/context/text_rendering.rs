//! Text rendering operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::text::{shape_text, text_x_offset, text_y_offset, TextMetrics};
use tiny_skia::{FillRule, Paint, Path, Transform};

impl Canvas2dContext {
    /// Measure text with the current font.
    pub fn measure_text(&mut self, text: &str) -> TextMetrics {
        shape_text(
            &mut self.font_system,
            text,
            &self.state.font,
            self.hinting_enabled,
        )
        .metrics
    }

    /// Fill text at the specified position.
    pub fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        log::debug!(target: "canvas", "fillText \"{}\" {} {}", text, x, y);
        self.render_text(text, x, y, None, true);
    }

    /// Fill text, squeezing it horizontally when it is wider than `max_width`.
    ///
    /// Nothing is drawn when `max_width` is not positive.
    pub fn fill_text_max_width(&mut self, text: &str, x: f32, y: f32, max_width: f32) {
        log::debug!(target: "canvas", "fillText \"{}\" {} {} max {}", text, x, y, max_width);
        self.render_text(text, x, y, Some(max_width), true);
    }

    /// Stroke text at the specified position.
    pub fn stroke_text(&mut self, text: &str, x: f32, y: f32) {
        log::debug!(target: "canvas", "strokeText \"{}\" {} {}", text, x, y);
        self.render_text(text, x, y, None, false);
    }

    pub fn stroke_text_max_width(&mut self, text: &str, x: f32, y: f32, max_width: f32) {
        log::debug!(target: "canvas", "strokeText \"{}\" {} {} max {}", text, x, y, max_width);
        self.render_text(text, x, y, Some(max_width), false);
    }

    fn render_text(&mut self, text: &str, x: f32, y: f32, max_width: Option<f32>, fill: bool) {
        if text.is_empty() || !x.is_finite() || !y.is_finite() {
            return;
        }
        if let Some(mw) = max_width {
            if mw.is_nan() || mw <= 0.0 {
                return;
            }
        }
        if !self.prepare_draw() {
            return;
        }

        let shaped = shape_text(
            &mut self.font_system,
            text,
            &self.raster.font,
            self.hinting_enabled,
        );
        let metrics = shaped.metrics;

        let scale_x = match max_width {
            Some(mw) if mw.is_finite() && metrics.width > mw => mw / metrics.width,
            _ => 1.0,
        };
        if scale_x < 0.001 {
            return;
        }

        // Alignment uses the unscaled width; the squeeze is applied around x.
        let base_x = x + text_x_offset(metrics.width, self.raster.text_align);
        let base_y = y + text_y_offset(metrics.ascent, metrics.descent, self.raster.text_baseline);
        let text_transform = if scale_x != 1.0 {
            Transform::from_translate(x, 0.0)
                .pre_scale(scale_x, 1.0)
                .pre_translate(-x, 0.0)
                .post_concat(self.raster.transform)
        } else {
            self.raster.transform
        };

        // Glyphs go to device space like every other path, so the paint's
        // shader transform and the device-space stroke width apply unchanged.
        let glyphs: Vec<Path> = shaped
            .outlines(&mut self.font_system, &mut self.swash_cache, (base_x, base_y))
            .into_iter()
            .filter_map(|glyph| {
                glyph
                    .path
                    .transform(Transform::from_translate(glyph.x, glyph.y).post_concat(text_transform))
            })
            .collect();
        if glyphs.is_empty() {
            return;
        }

        let paint = if fill {
            self.raster.fill_paint()
        } else {
            self.raster.stroke_paint()
        };
        let Some(paint) = paint else {
            return;
        };
        let stroke = self.raster.stroke.clone();
        self.render_with_shadow(|pixmap, blend_mode, transform, mask| {
            let paint = Paint {
                blend_mode,
                ..paint.clone()
            };
            for glyph in &glyphs {
                if fill {
                    pixmap.fill_path(glyph, &paint, FillRule::Winding, transform, mask);
                } else {
                    pixmap.stroke_path(glyph, &paint, &stroke, transform, mask);
                }
            }
        });
    }
}
