//! Rasterizer seam.
//!
//! [`RasterBackend`] is what the dirty-flag reconciler talks to. The
//! tiny-skia implementation, [`SkiaRasterizer`], keeps the derived objects a
//! draw needs (clip mask, stroke, resolved paints, shadow compositor) so they
//! are rebuilt only when their source attributes change.

use crate::drawing_state::{ClipPath, Pen};
use crate::font_parser::ParsedFont;
use crate::shadow::{ShadowCompositor, ShadowParams};
use crate::style::{CompositeOperation, FillStyle, TextAlign, TextBaseline};
use tiny_skia::{BlendMode, Mask, Paint, Path, Stroke, Transform};

/// Receives graphics state changes from the reconciler.
pub trait RasterBackend {
    fn apply_transform(&mut self, transform: Transform);
    fn apply_clip(&mut self, clip: &[ClipPath]);
    fn apply_pen(&mut self, pen: &Pen);
    fn apply_fill(&mut self, style: &FillStyle);
    fn apply_global_alpha(&mut self, alpha: f32);
    fn apply_shadow(&mut self, shadow: &ShadowParams);
    fn apply_font(&mut self, font: &ParsedFont);
    fn apply_text_layout(&mut self, align: TextAlign, baseline: TextBaseline);
    fn apply_composite(&mut self, op: CompositeOperation);
}

/// tiny-skia backed rasterizer state for one surface.
#[derive(Debug)]
pub struct SkiaRasterizer {
    width: u32,
    height: u32,
    pub(crate) transform: Transform,
    pub(crate) clip_mask: Option<Mask>,
    pub(crate) stroke: Stroke,
    /// Line width in user units, before the CTM scale.
    pen_width: f32,
    stroke_style: FillStyle,
    fill_style: FillStyle,
    pub(crate) global_alpha: f32,
    pub(crate) shadow: ShadowCompositor,
    pub(crate) font: ParsedFont,
    pub(crate) text_align: TextAlign,
    pub(crate) text_baseline: TextBaseline,
    pub(crate) blend_mode: BlendMode,
}

impl SkiaRasterizer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            transform: Transform::identity(),
            clip_mask: None,
            stroke: Stroke::default(),
            pen_width: 1.0,
            stroke_style: FillStyle::default(),
            fill_style: FillStyle::default(),
            global_alpha: 1.0,
            shadow: ShadowCompositor::default(),
            font: ParsedFont::default(),
            text_align: TextAlign::default(),
            text_baseline: TextBaseline::default(),
            blend_mode: BlendMode::SourceOver,
        }
    }

    /// Track a new surface size. The caller re-dirties the clip.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.clip_mask = None;
    }

    /// Paint for the current fill style, or `None` when it paints nothing.
    pub(crate) fn fill_paint(&self) -> Option<Paint<'static>> {
        self.paint_for(&self.fill_style)
    }

    /// Paint for the current stroke style, or `None` when it paints nothing.
    pub(crate) fn stroke_paint(&self) -> Option<Paint<'static>> {
        self.paint_for(&self.stroke_style)
    }

    /// Solid paint in `color`, honoring global alpha and the blend mode.
    pub(crate) fn solid_paint(&self, color: tiny_skia::Color, anti_alias: bool) -> Paint<'static> {
        let mut paint = Paint {
            anti_alias,
            blend_mode: self.blend_mode,
            ..Default::default()
        };
        paint.set_color(self.with_global_alpha(color));
        paint
    }

    fn with_global_alpha(&self, mut color: tiny_skia::Color) -> tiny_skia::Color {
        if self.global_alpha < 1.0 {
            color.set_alpha((color.alpha() * self.global_alpha).clamp(0.0, 1.0));
        }
        color
    }

    fn paint_for(&self, style: &FillStyle) -> Option<Paint<'static>> {
        match style {
            FillStyle::Color(color) => Some(self.solid_paint(*color, true)),
            FillStyle::Gradient(gradient) => {
                let shader = gradient.to_shader(self.global_alpha, self.transform)?;
                Some(Paint {
                    shader,
                    anti_alias: true,
                    blend_mode: self.blend_mode,
                    ..Default::default()
                })
            }
        }
    }

    /// Average axis scale of the CTM, used to size strokes in device space.
    pub(crate) fn transform_scale(&self) -> f32 {
        let t = &self.transform;
        ((t.sx * t.sx + t.ky * t.ky).sqrt() + (t.kx * t.kx + t.sy * t.sy).sqrt()) / 2.0
    }

    /// Device-space outline of a device-space `path` stroked with the
    /// user-space pen, so the pen stretches with the CTM.
    ///
    /// `None` when the CTM is a similarity (or singular); the device stroke
    /// in [`Self::stroke`] is exact then.
    pub(crate) fn transformed_stroke_outline(&self, path: &Path) -> Option<Path> {
        const EPS: f32 = 1e-6;
        let t = self.transform;
        let similarity = ((t.sx - t.sy).abs() <= EPS && (t.kx + t.ky).abs() <= EPS)
            || ((t.sx + t.sy).abs() <= EPS && (t.kx - t.ky).abs() <= EPS);
        if similarity {
            return None;
        }
        let user_path = path.clone().transform(t.invert()?)?;
        let stroke = Stroke {
            width: self.pen_width,
            ..self.stroke.clone()
        };
        let resolution = (t.sx * t.sx + t.ky * t.ky)
            .sqrt()
            .max((t.kx * t.kx + t.sy * t.sy).sqrt());
        user_path.stroke(&stroke, resolution.max(1.0))?.transform(t)
    }
}

/// Whether any clip entry came from an empty path.
fn clip_is_empty(clip: &[ClipPath]) -> bool {
    clip.iter().any(|c| c.path.is_none())
}

impl RasterBackend for SkiaRasterizer {
    fn apply_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn apply_clip(&mut self, clip: &[ClipPath]) {
        if clip.is_empty() {
            self.clip_mask = None;
            return;
        }
        let Some(mut mask) = Mask::new(self.width, self.height) else {
            self.clip_mask = None;
            return;
        };
        if !clip_is_empty(clip) {
            let mut entries = clip.iter().filter_map(|c| Some((c.path.as_ref()?, c.fill_rule)));
            if let Some((first, rule)) = entries.next() {
                mask.fill_path(first, rule.into(), true, Transform::identity());
            }
            for (path, rule) in entries {
                mask.intersect_path(path, rule.into(), true, Transform::identity());
            }
        }
        // An empty-path clip leaves the mask fully transparent.
        self.clip_mask = Some(mask);
    }

    fn apply_pen(&mut self, pen: &Pen) {
        self.stroke_style = pen.style.clone();
        self.pen_width = pen.width;
        self.stroke = Stroke {
            width: pen.width * self.transform_scale(),
            miter_limit: pen.miter_limit,
            line_cap: pen.cap.into(),
            line_join: pen.join.into(),
            dash: None,
        };
    }

    fn apply_fill(&mut self, style: &FillStyle) {
        self.fill_style = style.clone();
    }

    fn apply_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = alpha;
    }

    fn apply_shadow(&mut self, shadow: &ShadowParams) {
        self.shadow.configure(shadow);
    }

    fn apply_font(&mut self, font: &ParsedFont) {
        self.font = font.clone();
    }

    fn apply_text_layout(&mut self, align: TextAlign, baseline: TextBaseline) {
        self.text_align = align;
        self.text_baseline = baseline;
    }

    fn apply_composite(&mut self, op: CompositeOperation) {
        self.blend_mode = op.into();
    }
}
