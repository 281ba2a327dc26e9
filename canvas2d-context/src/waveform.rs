//! Scrolling waveform drawing.
//!
//! One call scrolls the existing trace, paints the newest column block and
//! then strokes up to four line segments on top of it. Everything is drawn
//! aliased so adjacent columns meet without seams.

use crate::context::Canvas2dContext;
use crate::geometry::{RectParams, ScrollParams};
use crate::path::map_point;
use crate::style::parse_color_or;
use tiny_skia::{Color, FillRule, LineCap, PathBuilder, Rect, Stroke, Transform};

/// Maximum number of line segments drawn per waveform step.
pub const MAX_WAVEFORM_LINES: usize = 4;

/// One waveform segment in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformLine<'a> {
    /// CSS color; invalid colors draw black.
    pub color: &'a str,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// A complete waveform step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformParams<'a> {
    /// Region scrolled before anything is drawn.
    pub scroll: ScrollParams,
    /// Background block for the new column.
    pub block: RectParams,
    pub block_color: &'a str,
    /// Skip the block fill when false.
    pub draw_block: bool,
    /// Width shared by every line, in user units.
    pub line_width: f32,
    pub lines: &'a [WaveformLine<'a>],
}

impl Canvas2dContext {
    /// Draw one waveform step: scroll, block, then lines in order.
    ///
    /// Honors the transform, clip and global alpha. Shadows are not drawn.
    pub fn draw_waveform(&mut self, params: &WaveformParams) {
        log::debug!(target: "canvas", "drawWaveform {} lines", params.lines.len());
        let ScrollParams {
            sx,
            sy,
            sw,
            sh,
            dx,
            dy,
        } = params.scroll;
        self.move_canvas_image(sx, sy, sw, sh, dx, dy);

        if !self.prepare_draw() {
            return;
        }

        if params.draw_block {
            if let Some(block) = self.device_rect(&params.block) {
                let color = parse_color_or(params.block_color, Color::BLACK);
                let paint = self.raster.solid_paint(color, false);
                self.pixmap.fill_path(
                    &block,
                    &paint,
                    FillRule::Winding,
                    Transform::identity(),
                    self.raster.clip_mask.as_ref(),
                );
            }
        }

        if params.lines.len() > MAX_WAVEFORM_LINES {
            log::warn!(
                target: "canvas",
                "drawWaveform: {} lines given, drawing the first {}",
                params.lines.len(),
                MAX_WAVEFORM_LINES
            );
        }
        let width = if params.line_width.is_finite() && params.line_width > 0.0 {
            params.line_width * self.raster.transform_scale()
        } else {
            self.raster.stroke.width
        };
        for line in params.lines.iter().take(MAX_WAVEFORM_LINES) {
            self.draw_waveform_line(line, width);
        }
        self.repaint.schedule_change();
    }

    fn draw_waveform_line(&mut self, line: &WaveformLine, width: f32) {
        if ![line.x1, line.y1, line.x2, line.y2].iter().all(|v| v.is_finite()) {
            return;
        }
        let t = self.raster.transform;
        // Snap to pixel centers so one-pixel lines land on whole pixels
        let snap = |(x, y): (f32, f32)| (x.floor() + 0.5, y.floor() + 0.5);
        let (x1, y1) = snap(map_point(&t, line.x1, line.y1));
        let (x2, y2) = snap(map_point(&t, line.x2, line.y2));

        let color = parse_color_or(line.color, Color::BLACK);
        let paint = self.raster.solid_paint(color, false);
        let clip = self.raster.clip_mask.as_ref();

        if x1 == x2 && y1 == y2 {
            // Square-capped dot
            let half = width / 2.0;
            if let Some(rect) = Rect::from_xywh(x1 - half, y1 - half, width, width) {
                self.pixmap
                    .fill_rect(rect, &paint, Transform::identity(), clip);
            }
            return;
        }

        let mut pb = PathBuilder::new();
        pb.move_to(x1, y1);
        pb.line_to(x2, y2);
        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = Stroke {
            width,
            line_cap: LineCap::Square,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), clip);
    }
}
