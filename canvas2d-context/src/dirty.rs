//! Pending-state bookkeeping between the graphics state and the rasterizer.
//!
//! Setters only flip bits here. Right before a raster operation the context
//! calls [`reconcile`], which pushes each pending attribute into the backend
//! in a fixed order and clears its bit.

use crate::backend::RasterBackend;
use crate::drawing_state::DrawingState;

bitflags::bitflags! {
    /// Graphics state attributes that changed since the last reconcile.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DirtyFlags: u32 {
        const TRANSFORM = 1 << 0;
        const CLIP = 1 << 1;
        const STROKE_STYLE = 1 << 2;
        const LINE_WIDTH = 1 << 3;
        const LINE_CAP = 1 << 4;
        const LINE_JOIN = 1 << 5;
        const MITER_LIMIT = 1 << 6;
        const FILL_STYLE = 1 << 7;
        const GLOBAL_ALPHA = 1 << 8;
        const SHADOW_OFFSET_X = 1 << 9;
        const SHADOW_OFFSET_Y = 1 << 10;
        const SHADOW_BLUR = 1 << 11;
        const SHADOW_COLOR = 1 << 12;
        const FONT = 1 << 13;
        const TEXT_ALIGN = 1 << 14;
        const TEXT_BASELINE = 1 << 15;
        const COMPOSITE = 1 << 16;

        /// Everything that feeds the stroke pen.
        const PEN = Self::STROKE_STYLE.bits()
            | Self::LINE_WIDTH.bits()
            | Self::LINE_CAP.bits()
            | Self::LINE_JOIN.bits()
            | Self::MITER_LIMIT.bits();
        const SHADOW = Self::SHADOW_OFFSET_X.bits()
            | Self::SHADOW_OFFSET_Y.bits()
            | Self::SHADOW_BLUR.bits()
            | Self::SHADOW_COLOR.bits();
        const TEXT_LAYOUT = Self::TEXT_ALIGN.bits() | Self::TEXT_BASELINE.bits();
    }
}

/// Apply every pending attribute to `backend`, then clear `dirty`.
///
/// Order: transform, clip, pen, fill, global alpha, shadow, font, text layout,
/// composite. A transform change also refreshes the pen because the
/// device-space line width follows the CTM scale.
pub fn reconcile<B: RasterBackend + ?Sized>(
    dirty: &mut DirtyFlags,
    state: &DrawingState,
    backend: &mut B,
) {
    if dirty.is_empty() {
        return;
    }
    log::trace!(target: "canvas", "reconcile {:?}", dirty);

    if dirty.contains(DirtyFlags::TRANSFORM) {
        backend.apply_transform(state.transform);
        dirty.remove(DirtyFlags::TRANSFORM);
        dirty.insert(DirtyFlags::LINE_WIDTH);
    }
    if dirty.contains(DirtyFlags::CLIP) {
        backend.apply_clip(&state.clip);
        dirty.remove(DirtyFlags::CLIP);
    }
    if dirty.intersects(DirtyFlags::PEN) {
        backend.apply_pen(&state.pen());
        dirty.remove(DirtyFlags::PEN);
    }
    if dirty.contains(DirtyFlags::FILL_STYLE) {
        backend.apply_fill(&state.fill_style);
        dirty.remove(DirtyFlags::FILL_STYLE);
    }
    if dirty.contains(DirtyFlags::GLOBAL_ALPHA) {
        backend.apply_global_alpha(state.global_alpha);
        dirty.remove(DirtyFlags::GLOBAL_ALPHA);
    }
    if dirty.intersects(DirtyFlags::SHADOW) {
        backend.apply_shadow(&state.shadow);
        dirty.remove(DirtyFlags::SHADOW);
    }
    if dirty.contains(DirtyFlags::FONT) {
        backend.apply_font(&state.font);
        dirty.remove(DirtyFlags::FONT);
    }
    if dirty.intersects(DirtyFlags::TEXT_LAYOUT) {
        backend.apply_text_layout(state.text_align, state.text_baseline);
        dirty.remove(DirtyFlags::TEXT_LAYOUT);
    }
    if dirty.contains(DirtyFlags::COMPOSITE) {
        backend.apply_composite(state.global_composite_operation);
        dirty.remove(DirtyFlags::COMPOSITE);
    }
}
