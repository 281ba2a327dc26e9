//! Canvas 2D rendering context implementation.

mod drawing;
mod image_ops;
mod path_ops;
mod text_rendering;
mod transform;

use crate::backend::SkiaRasterizer;
use crate::config::FontConfig;
use crate::dirty::{reconcile, DirtyFlags};
use crate::drawing_state::DrawingState;
use crate::error::{Canvas2dError, Canvas2dResult};
use crate::font_parser::parse_font;
use crate::geometry::{CanvasColor, RadialGradientParams};
use crate::gradient::CanvasGradient;
use crate::image::ImageSource;
use crate::path::CanvasPath;
use crate::repaint::{RepaintScheduler, RepaintTracker};
use crate::style::{
    parse_color_or, CompositeOperation, FillStyle, LineCap, LineJoin, StyleValue, TextAlign,
    TextBaseline,
};
use cosmic_text::{FontSystem, SwashCache};
use std::str::FromStr;
use std::time::Duration;
use tiny_skia::{Pixmap, PixmapRef};

/// Maximum canvas dimension (same as Chrome).
pub const MAX_DIMENSION: u32 = 32767;

fn check_dimensions(width: u32, height: u32) -> Canvas2dResult<()> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(Canvas2dError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Options for creating a [`Canvas2dContext`].
pub struct Canvas2dContextBuilder {
    width: u32,
    height: u32,
    font_config: FontConfig,
    font_db: Option<fontdb::Database>,
    repaint_delay: Duration,
    repaint_scheduler: Option<Box<dyn RepaintScheduler>>,
}

impl Canvas2dContextBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            font_config: FontConfig::default(),
            font_db: None,
            repaint_delay: Duration::ZERO,
            repaint_scheduler: None,
        }
    }

    /// Fonts to load. Ignored for font discovery when [`font_db`](Self::font_db) is set.
    pub fn font_config(mut self, config: FontConfig) -> Self {
        self.font_config = config;
        self
    }

    /// Use an already built font database instead of scanning for fonts.
    pub fn font_db(mut self, db: fontdb::Database) -> Self {
        self.font_db = Some(db);
        self
    }

    /// Delay between the first change of a burst and the repaint notification.
    pub fn repaint_delay(mut self, delay: Duration) -> Self {
        self.repaint_delay = delay;
        self
    }

    pub fn repaint_scheduler(mut self, scheduler: Box<dyn RepaintScheduler>) -> Self {
        self.repaint_scheduler = Some(scheduler);
        self
    }

    pub fn build(self) -> Canvas2dResult<Canvas2dContext> {
        let Self {
            width,
            height,
            font_config,
            font_db,
            repaint_delay,
            repaint_scheduler,
        } = self;
        check_dimensions(width, height)?;

        let pixmap =
            Pixmap::new(width, height).ok_or(Canvas2dError::InvalidDimensions { width, height })?;
        let font_db = font_db.unwrap_or_else(|| font_config.to_fontdb());
        let font_system = FontSystem::new_with_locale_and_db("en".to_string(), font_db);

        log::debug!(target: "canvas", "new context {}x{}", width, height);
        Ok(Canvas2dContext {
            width,
            height,
            pixmap,
            font_system,
            swash_cache: SwashCache::new(),
            state: DrawingState::default(),
            state_stack: Vec::new(),
            dirty: DirtyFlags::all(),
            raster: SkiaRasterizer::new(width, height),
            path: CanvasPath::new(),
            repaint: RepaintTracker::new(repaint_delay, repaint_scheduler),
            hinting_enabled: font_config.hinting_enabled,
        })
    }
}

/// Canvas 2D rendering context.
pub struct Canvas2dContext {
    /// Width of the canvas in pixels.
    pub(crate) width: u32,
    /// Height of the canvas in pixels.
    pub(crate) height: u32,
    /// Pixel buffer.
    pub(crate) pixmap: Pixmap,
    /// Font system for text rendering.
    pub(crate) font_system: FontSystem,
    /// Swash cache for glyph outlines.
    pub(crate) swash_cache: SwashCache,
    /// Current drawing state.
    pub(crate) state: DrawingState,
    /// Stack of saved drawing states.
    state_stack: Vec<DrawingState>,
    /// State attributes not yet pushed into `raster`.
    pub(crate) dirty: DirtyFlags,
    pub(crate) raster: SkiaRasterizer,
    /// Current path, in device space.
    pub(crate) path: CanvasPath,
    pub(crate) repaint: RepaintTracker,
    /// Whether font hinting is enabled for text rendering.
    pub(crate) hinting_enabled: bool,
}

impl std::fmt::Debug for Canvas2dContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas2dContext")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("state", &self.state)
            .field("save_depth", &self.state_stack.len())
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl Canvas2dContext {
    /// Create a context with the default [`FontConfig`], which scans system fonts.
    pub fn new(width: u32, height: u32) -> Canvas2dResult<Self> {
        Canvas2dContextBuilder::new(width, height).build()
    }

    pub fn builder(width: u32, height: u32) -> Canvas2dContextBuilder {
        Canvas2dContextBuilder::new(width, height)
    }

    /// Get canvas width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get canvas height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The backing surface.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Replace the surface with a cleared one of the new size.
    ///
    /// Graphics state and the save stack are kept; the current path is dropped.
    pub fn set_size(&mut self, width: u32, height: u32) -> Canvas2dResult<()> {
        check_dimensions(width, height)?;
        let pixmap =
            Pixmap::new(width, height).ok_or(Canvas2dError::InvalidDimensions { width, height })?;
        log::debug!(target: "canvas", "setSize {}x{}", width, height);
        self.width = width;
        self.height = height;
        self.pixmap = pixmap;
        self.path.clear();
        self.raster.resize(width, height);
        self.mark_dirty(DirtyFlags::TRANSFORM | DirtyFlags::CLIP);
        self.repaint.schedule_change();
        Ok(())
    }

    /// The current graphics state.
    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    /// Number of states on the save stack.
    pub fn save_depth(&self) -> usize {
        self.state_stack.len()
    }

    /// Save the current drawing state.
    pub fn save(&mut self) {
        log::debug!(target: "canvas", "save");
        self.state_stack.push(self.state.clone());
    }

    /// Restore the previously saved drawing state. No-op on an empty stack.
    pub fn restore(&mut self) {
        log::debug!(target: "canvas", "restore");
        if let Some(state) = self.state_stack.pop() {
            self.state = state;
            self.mark_dirty(DirtyFlags::all());
        }
    }

    /// Reset the rendering context to its default state.
    ///
    /// This clears the canvas to transparent, resets all drawing state,
    /// empties the state stack and drops the current path.
    pub fn reset(&mut self) {
        log::debug!(target: "canvas", "reset");
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
        self.state = DrawingState::default();
        self.state_stack.clear();
        self.path.clear();
        self.mark_dirty(DirtyFlags::all());
        self.repaint.schedule_change();
    }

    pub(crate) fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
    }

    /// Push pending state into the rasterizer. Returns `false` when the draw
    /// cannot change any pixel.
    pub(crate) fn prepare_draw(&mut self) -> bool {
        reconcile(&mut self.dirty, &self.state, &mut self.raster);
        self.state.global_alpha > 0.0
    }

    // --- Style setters ---

    /// Set the fill style. Unparseable colors fall back to opaque black.
    pub fn set_fill_style(&mut self, style: impl Into<StyleValue>) {
        let style = style.into();
        log::debug!(target: "canvas", "fillStyle {:?}", style);
        self.state.fill_style = resolve_or_black(&style);
        self.mark_dirty(DirtyFlags::FILL_STYLE);
    }

    pub fn fill_style(&self) -> &FillStyle {
        &self.state.fill_style
    }

    /// Set the stroke style. Unparseable colors fall back to opaque black.
    pub fn set_stroke_style(&mut self, style: impl Into<StyleValue>) {
        let style = style.into();
        log::debug!(target: "canvas", "strokeStyle {:?}", style);
        self.state.stroke_style = resolve_or_black(&style);
        self.mark_dirty(DirtyFlags::STROKE_STYLE);
    }

    pub fn stroke_style(&self) -> &FillStyle {
        &self.state.stroke_style
    }

    /// Set the line width. Non-finite or non-positive values are ignored.
    pub fn set_line_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
            self.mark_dirty(DirtyFlags::LINE_WIDTH);
        }
    }

    pub fn line_width(&self) -> f32 {
        self.state.line_width
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
        self.mark_dirty(DirtyFlags::LINE_CAP);
    }

    /// Set the line cap from its CSS keyword. Returns false for unknown keywords.
    pub fn set_line_cap_str(&mut self, cap: &str) -> bool {
        parse_keyword(cap).map(|v| self.set_line_cap(v)).is_some()
    }

    pub fn line_cap(&self) -> LineCap {
        self.state.line_cap
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
        self.mark_dirty(DirtyFlags::LINE_JOIN);
    }

    pub fn set_line_join_str(&mut self, join: &str) -> bool {
        parse_keyword(join).map(|v| self.set_line_join(v)).is_some()
    }

    pub fn line_join(&self) -> LineJoin {
        self.state.line_join
    }

    /// Set the miter limit. Non-finite or non-positive values are ignored.
    pub fn set_miter_limit(&mut self, limit: f32) {
        if limit.is_finite() && limit > 0.0 {
            self.state.miter_limit = limit;
            self.mark_dirty(DirtyFlags::MITER_LIMIT);
        }
    }

    pub fn miter_limit(&self) -> f32 {
        self.state.miter_limit
    }

    /// Set the global alpha. Non-finite values or values outside [0, 1] are ignored.
    pub fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() && (0.0..=1.0).contains(&alpha) {
            self.state.global_alpha = alpha;
            self.mark_dirty(DirtyFlags::GLOBAL_ALPHA);
        }
    }

    pub fn global_alpha(&self) -> f32 {
        self.state.global_alpha
    }

    pub fn set_composite_operation(&mut self, op: CompositeOperation) {
        self.state.global_composite_operation = op;
        self.mark_dirty(DirtyFlags::COMPOSITE);
    }

    /// Set the composite operation from its CSS keyword.
    /// Returns false and keeps the previous mode for unknown keywords.
    pub fn set_global_composite_operation(&mut self, op: &str) -> bool {
        parse_keyword(op)
            .map(|v| self.set_composite_operation(v))
            .is_some()
    }

    pub fn global_composite_operation(&self) -> CompositeOperation {
        self.state.global_composite_operation
    }

    // --- Shadow ---

    pub fn set_shadow_offset_x(&mut self, offset: f32) {
        if offset.is_finite() {
            self.state.shadow.offset_x = offset;
            self.mark_dirty(DirtyFlags::SHADOW_OFFSET_X);
        }
    }

    pub fn shadow_offset_x(&self) -> f32 {
        self.state.shadow.offset_x
    }

    pub fn set_shadow_offset_y(&mut self, offset: f32) {
        if offset.is_finite() {
            self.state.shadow.offset_y = offset;
            self.mark_dirty(DirtyFlags::SHADOW_OFFSET_Y);
        }
    }

    pub fn shadow_offset_y(&self) -> f32 {
        self.state.shadow.offset_y
    }

    /// Set the shadow blur. Non-finite or negative values are ignored.
    pub fn set_shadow_blur(&mut self, blur: f32) {
        if blur.is_finite() && blur >= 0.0 {
            self.state.shadow.blur = blur;
            self.mark_dirty(DirtyFlags::SHADOW_BLUR);
        }
    }

    pub fn shadow_blur(&self) -> f32 {
        self.state.shadow.blur
    }

    /// Set the shadow color. Unparseable colors fall back to transparent black.
    pub fn set_shadow_color(&mut self, color: &str) {
        self.state.shadow.color = parse_color_or(color, tiny_skia::Color::TRANSPARENT);
        self.mark_dirty(DirtyFlags::SHADOW_COLOR);
    }

    pub fn shadow_color(&self) -> CanvasColor {
        self.state.shadow.color.into()
    }

    // --- Text state ---

    /// Set the font from a CSS font shorthand such as `"bold 12px serif"`.
    /// Returns false and keeps the previous font when the string is invalid.
    pub fn set_font(&mut self, font: &str) -> bool {
        match parse_font(font) {
            Ok(parsed) => {
                log::debug!(target: "canvas", "font {}", font);
                self.state.font = parsed;
                self.mark_dirty(DirtyFlags::FONT);
                true
            }
            Err(err) => {
                log::warn!(target: "canvas", "{}", err);
                false
            }
        }
    }

    /// The current font as a CSS shorthand.
    pub fn font(&self) -> String {
        self.state.font.to_css()
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.state.text_align = align;
        self.mark_dirty(DirtyFlags::TEXT_ALIGN);
    }

    pub fn set_text_align_str(&mut self, align: &str) -> bool {
        parse_keyword(align)
            .map(|v| self.set_text_align(v))
            .is_some()
    }

    pub fn text_align(&self) -> TextAlign {
        self.state.text_align
    }

    pub fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.text_baseline = baseline;
        self.mark_dirty(DirtyFlags::TEXT_BASELINE);
    }

    pub fn set_text_baseline_str(&mut self, baseline: &str) -> bool {
        parse_keyword(baseline)
            .map(|v| self.set_text_baseline(v))
            .is_some()
    }

    pub fn text_baseline(&self) -> TextBaseline {
        self.state.text_baseline
    }

    // --- Gradients ---

    /// Create a linear gradient.
    pub fn create_linear_gradient(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> CanvasGradient {
        CanvasGradient::new_linear(x0, y0, x1, y1)
    }

    /// Create a radial gradient.
    pub fn create_radial_gradient(&self, params: &RadialGradientParams) -> CanvasGradient {
        CanvasGradient::new_radial(params)
    }

    // --- Repaint notifications ---

    /// Host timer callback; true once per burst of surface changes.
    pub fn on_repaint_timer(&mut self) -> bool {
        self.repaint.on_repaint_timer()
    }

    /// Whether the surface changed since the last call.
    pub fn take_changed(&mut self) -> bool {
        self.repaint.take_changed()
    }

    pub fn set_repaint_scheduler(&mut self, scheduler: Option<Box<dyn RepaintScheduler>>) {
        self.repaint.set_scheduler(scheduler);
    }

    pub fn set_repaint_delay(&mut self, delay: Duration) {
        self.repaint.set_delay(delay);
    }
}

impl ImageSource for Canvas2dContext {
    fn pixmap_ref(&self) -> Option<PixmapRef<'_>> {
        Some(self.pixmap.as_ref())
    }
}

fn resolve_or_black(style: &StyleValue) -> FillStyle {
    style.resolve().unwrap_or_else(|| {
        log::warn!(target: "canvas", "invalid style {:?}; using black", style);
        FillStyle::default()
    })
}

fn parse_keyword<T: FromStr<Err = Canvas2dError>>(s: &str) -> Option<T> {
    match s.parse() {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!(target: "canvas", "{}", err);
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::RectParams;
    use crate::style::CanvasFillRule;

    /// A context without system fonts, which is fast to build.
    pub(crate) fn test_context(width: u32, height: u32) -> Canvas2dContext {
        Canvas2dContext::builder(width, height)
            .font_db(fontdb::Database::new())
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_context_defaults() {
        let ctx = test_context(200, 150);
        assert_eq!(ctx.width(), 200);
        assert_eq!(ctx.height(), 150);
        assert_eq!(ctx.line_width(), 1.0);
        assert_eq!(ctx.global_alpha(), 1.0);
        assert_eq!(ctx.miter_limit(), 10.0);
        assert_eq!(ctx.line_cap(), LineCap::Butt);
        assert_eq!(ctx.line_join(), LineJoin::Miter);
        assert_eq!(ctx.font(), "10px sans-serif");
        assert_eq!(ctx.text_align(), TextAlign::Start);
        assert_eq!(ctx.text_baseline(), TextBaseline::Alphabetic);
        assert_eq!(
            ctx.global_composite_operation(),
            CompositeOperation::SourceOver
        );
        assert_eq!(ctx.shadow_color(), CanvasColor::from_rgba8(0, 0, 0, 0));
        assert!(ctx.state.clip.is_empty());
        assert_eq!(ctx.save_depth(), 0);
        assert!(ctx.pixmap.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_invalid_dimensions() {
        for (w, h) in [(0, 100), (100, 0), (MAX_DIMENSION + 1, 10)] {
            assert!(matches!(
                Canvas2dContext::builder(w, h)
                    .font_db(fontdb::Database::new())
                    .build(),
                Err(Canvas2dError::InvalidDimensions { .. })
            ));
        }
    }

    #[test]
    fn test_line_width_ignore_invalid() {
        let mut ctx = test_context(100, 100);
        ctx.set_line_width(5.0);
        assert_eq!(ctx.line_width(), 5.0);
        for bad in [-1.0, 0.0, f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            ctx.set_line_width(bad);
            assert_eq!(ctx.line_width(), 5.0);
        }
    }

    #[test]
    fn test_global_alpha_ignore_invalid() {
        let mut ctx = test_context(100, 100);
        ctx.set_global_alpha(0.5);
        for bad in [2.0, -0.5, f32::NAN, f32::INFINITY] {
            ctx.set_global_alpha(bad);
            assert_eq!(ctx.global_alpha(), 0.5);
        }
        ctx.set_global_alpha(0.0);
        assert_eq!(ctx.global_alpha(), 0.0);
    }

    #[test]
    fn test_miter_limit_and_shadow_blur_ignore_invalid() {
        let mut ctx = test_context(100, 100);
        ctx.set_miter_limit(5.0);
        ctx.set_miter_limit(0.0);
        ctx.set_miter_limit(f32::NAN);
        assert_eq!(ctx.miter_limit(), 5.0);

        ctx.set_shadow_blur(4.0);
        ctx.set_shadow_blur(-1.0);
        ctx.set_shadow_blur(f32::INFINITY);
        assert_eq!(ctx.shadow_blur(), 4.0);
        ctx.set_shadow_blur(0.0);
        assert_eq!(ctx.shadow_blur(), 0.0);

        ctx.set_shadow_offset_x(3.0);
        ctx.set_shadow_offset_x(f32::NAN);
        assert_eq!(ctx.shadow_offset_x(), 3.0);
    }

    #[test]
    fn test_keyword_setters_keep_previous_value() {
        let mut ctx = test_context(10, 10);
        assert!(ctx.set_global_composite_operation("multiply"));
        assert!(!ctx.set_global_composite_operation("invalid-mode"));
        assert!(!ctx.set_global_composite_operation(""));
        assert_eq!(ctx.global_composite_operation().as_str(), "multiply");

        assert!(ctx.set_line_cap_str("round"));
        assert!(!ctx.set_line_cap_str("pointy"));
        assert_eq!(ctx.line_cap().as_str(), "round");

        assert!(ctx.set_line_join_str("bevel"));
        assert!(!ctx.set_line_join_str("Bevel "));
        assert_eq!(ctx.line_join().as_str(), "bevel");

        assert!(ctx.set_text_align_str("center"));
        assert!(!ctx.set_text_align_str("middle"));
        assert_eq!(ctx.text_align().as_str(), "center");

        assert!(ctx.set_text_baseline_str("hanging"));
        assert!(!ctx.set_text_baseline_str("ideographic-ish"));
        assert_eq!(ctx.text_baseline().as_str(), "hanging");

        assert!(ctx.set_font("bold 20px serif"));
        assert!(!ctx.set_font("not a font"));
        assert_eq!(ctx.font(), "bold 20px serif");
    }

    #[test]
    fn test_invalid_colors_fall_back() {
        let mut ctx = test_context(10, 10);
        ctx.set_fill_style("#00ff00");
        ctx.set_fill_style("no-such-color");
        assert_eq!(*ctx.fill_style(), FillStyle::Color(tiny_skia::Color::BLACK));

        ctx.set_shadow_color("red");
        assert_eq!(ctx.shadow_color(), CanvasColor::from_rgba8(255, 0, 0, 255));
        ctx.set_shadow_color("bogus");
        assert_eq!(ctx.shadow_color(), CanvasColor::from_rgba8(0, 0, 0, 0));
    }

    #[test]
    fn test_setters_mark_dirty_bits() {
        let mut ctx = test_context(10, 10);
        ctx.prepare_draw();
        assert!(ctx.dirty.is_empty());

        ctx.set_line_width(3.0);
        ctx.set_shadow_blur(2.0);
        assert_eq!(ctx.dirty, DirtyFlags::LINE_WIDTH | DirtyFlags::SHADOW_BLUR);

        // Rejected input leaves the bits alone
        ctx.prepare_draw();
        ctx.set_global_alpha(7.0);
        assert!(ctx.dirty.is_empty());
    }

    #[test]
    fn test_save_restore_roundtrip() {
        let mut ctx = test_context(100, 100);
        ctx.set_line_width(5.0);
        ctx.set_line_cap(LineCap::Round);
        ctx.set_global_alpha(0.7);
        ctx.set_shadow_color("blue");
        let saved = ctx.state().clone();
        ctx.save();

        ctx.set_line_width(10.0);
        ctx.set_line_cap(LineCap::Square);
        ctx.set_global_alpha(0.3);
        ctx.set_fill_style("red");
        ctx.translate(4.0, 4.0);
        ctx.prepare_draw();

        ctx.restore();
        assert_eq!(*ctx.state(), saved);
        assert_eq!(ctx.dirty, DirtyFlags::all());
    }

    #[test]
    fn test_restore_on_empty_stack_is_noop() {
        let mut ctx = test_context(10, 10);
        ctx.set_line_width(2.0);
        let before = ctx.state().clone();
        for _ in 0..5 {
            ctx.restore();
        }
        assert_eq!(*ctx.state(), before);
    }

    #[test]
    fn test_reset() {
        let mut ctx = test_context(100, 100);
        ctx.set_fill_style("#ff0000");
        ctx.set_line_width(5.0);
        ctx.translate(10.0, 10.0);
        ctx.save();
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 100.0, 100.0));
        ctx.begin_path();
        ctx.rect(&RectParams::new(0.0, 0.0, 20.0, 20.0));
        ctx.clip_with_rule(CanvasFillRule::EvenOdd);
        assert!(ctx.pixmap.data().iter().any(|&b| b != 0));

        ctx.reset();
        assert!(ctx.pixmap.data().iter().all(|&b| b == 0));
        assert_eq!(*ctx.state(), DrawingState::default());
        assert_eq!(ctx.save_depth(), 0);
        assert!(ctx.path.is_empty());
    }

    #[test]
    fn test_set_size_clears_surface() {
        let mut ctx = test_context(20, 20);
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 20.0, 20.0));
        ctx.set_size(30, 10).unwrap();
        assert_eq!((ctx.width(), ctx.height()), (30, 10));
        assert!(ctx.pixmap.data().iter().all(|&b| b == 0));
        assert!(ctx.set_size(0, 10).is_err());
        assert_eq!(ctx.width(), 30);

        ctx.fill_rect(&RectParams::new(0.0, 0.0, 30.0, 10.0));
        assert_eq!(ctx.pixmap.pixel(29, 9).unwrap().alpha(), 255);
    }

    #[test]
    fn test_draws_schedule_one_repaint() {
        let mut ctx = test_context(10, 10);
        assert!(!ctx.on_repaint_timer());
        ctx.fill_rect(&RectParams::new(0.0, 0.0, 5.0, 5.0));
        ctx.fill_rect(&RectParams::new(5.0, 5.0, 5.0, 5.0));
        assert!(ctx.on_repaint_timer());
        assert!(!ctx.on_repaint_timer());

        // State changes alone are not surface changes
        ctx.set_line_width(4.0);
        assert!(!ctx.take_changed());
    }
}
