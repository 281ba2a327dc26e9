//! Text shaping, measurement and glyph outlines via cosmic-text.

use crate::font_parser::ParsedFont;
use crate::style::{TextAlign, TextBaseline};
use cosmic_text::{Attrs, Buffer, CacheKeyFlags, Command, FontSystem, Metrics, Shaping, SwashCache};

/// Result of `measure_text`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    /// Advance width of the text in pixels.
    pub width: f32,
    /// Distance from the alphabetic baseline to the top of the line box.
    pub ascent: f32,
    /// Distance from the alphabetic baseline to the bottom of the line box.
    pub descent: f32,
}

/// A shaped single-line run of text.
pub(crate) struct ShapedText {
    buffer: Buffer,
    pub metrics: TextMetrics,
}

/// One glyph outline in font units flipped to y-down, placed at `(x, y)`
/// relative to the text origin.
pub(crate) struct GlyphOutline {
    pub path: tiny_skia::Path,
    pub x: f32,
    pub y: f32,
}

/// Shape `text` with `font`.
pub(crate) fn shape_text(
    font_system: &mut FontSystem,
    text: &str,
    font: &ParsedFont,
    hinting_enabled: bool,
) -> ShapedText {
    let metrics = Metrics::new(font.size_px, font.size_px * 1.2);
    let mut buffer = Buffer::new(font_system, metrics);

    let mut attrs = Attrs::new()
        .family(font.primary_family())
        .weight(font.weight)
        .style(font.style);
    if !hinting_enabled {
        attrs = attrs.cache_key_flags(CacheKeyFlags::DISABLE_HINTING);
    }

    buffer.set_text(font_system, text, &attrs, Shaping::Advanced, None);
    buffer.shape_until_scroll(font_system, false);

    let mut width: f32 = 0.0;
    let mut ascent: f32 = 0.0;
    let mut descent: f32 = 0.0;
    for run in buffer.layout_runs() {
        width = width.max(run.line_w);
        ascent = ascent.max(run.line_y - run.line_top);
        descent = descent.max((run.line_top + run.line_height) - run.line_y);
    }
    if ascent == 0.0 && descent == 0.0 {
        ascent = font.size_px * 0.8;
        descent = font.size_px * 0.2;
    }

    ShapedText {
        buffer,
        metrics: TextMetrics {
            width,
            ascent,
            descent,
        },
    }
}

impl ShapedText {
    /// Glyph outlines for the shaped text, positioned relative to `origin`.
    pub(crate) fn outlines(
        &self,
        font_system: &mut FontSystem,
        swash_cache: &mut SwashCache,
        origin: (f32, f32),
    ) -> Vec<GlyphOutline> {
        let mut outlines = Vec::new();
        for run in self.buffer.layout_runs() {
            for glyph in run.glyphs.iter() {
                let physical = glyph.physical(origin, 1.0);
                let Some(commands) = swash_cache.get_outline_commands(font_system, physical.cache_key)
                else {
                    continue;
                };

                // Font outlines are y-up
                let mut builder = tiny_skia::PathBuilder::new();
                for cmd in commands {
                    match cmd {
                        Command::MoveTo(p) => builder.move_to(p.x, -p.y),
                        Command::LineTo(p) => builder.line_to(p.x, -p.y),
                        Command::QuadTo(c, p) => builder.quad_to(c.x, -c.y, p.x, -p.y),
                        Command::CurveTo(c1, c2, p) => {
                            builder.cubic_to(c1.x, -c1.y, c2.x, -c2.y, p.x, -p.y)
                        }
                        Command::Close => builder.close(),
                    }
                }
                if let Some(path) = builder.finish() {
                    outlines.push(GlyphOutline {
                        path,
                        x: origin.0 + glyph.x + glyph.font_size * glyph.x_offset,
                        y: origin.1 + glyph.y - glyph.font_size * glyph.y_offset,
                    });
                }
            }
        }
        outlines
    }
}

/// Horizontal shift of the text origin for `align`.
pub fn text_x_offset(width: f32, align: TextAlign) -> f32 {
    match align {
        TextAlign::Left | TextAlign::Start => 0.0,
        TextAlign::Right | TextAlign::End => -width,
        TextAlign::Center => -width / 2.0,
    }
}

/// Vertical shift of the alphabetic baseline for `baseline`.
pub fn text_y_offset(ascent: f32, descent: f32, baseline: TextBaseline) -> f32 {
    match baseline {
        TextBaseline::Alphabetic => 0.0,
        TextBaseline::Top => ascent,
        TextBaseline::Hanging => ascent * 0.8,
        TextBaseline::Middle => ascent / 2.0 - descent / 2.0,
        TextBaseline::Bottom => -descent,
    }
}
