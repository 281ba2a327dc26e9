//! Drawing state that can be saved and restored.

use crate::font_parser::ParsedFont;
use crate::shadow::ShadowParams;
use crate::style::{
    CanvasFillRule, CompositeOperation, FillStyle, LineCap, LineJoin, TextAlign, TextBaseline,
};
use tiny_skia::Transform;

/// One clip region in device space.
///
/// `path == None` is an empty clip path, which clips everything.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPath {
    pub path: Option<tiny_skia::Path>,
    pub fill_rule: CanvasFillRule,
}

/// Stroke attributes handed to the rasterizer as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    pub style: FillStyle,
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
}

/// Drawing state that can be saved and restored.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingState {
    /// Current fill style.
    pub fill_style: FillStyle,
    /// Current stroke style.
    pub stroke_style: FillStyle,
    /// Current line width.
    pub line_width: f32,
    /// Current line cap style.
    pub line_cap: LineCap,
    /// Current line join style.
    pub line_join: LineJoin,
    /// Current miter limit.
    pub miter_limit: f32,
    /// Current font specification.
    pub font: ParsedFont,
    /// Current text alignment.
    pub text_align: TextAlign,
    /// Current text baseline.
    pub text_baseline: TextBaseline,
    /// Current global alpha.
    pub global_alpha: f32,
    /// Current global composite operation.
    pub global_composite_operation: CompositeOperation,
    /// Current transform matrix.
    pub transform: Transform,
    /// Intersected clip regions; empty means unclipped.
    pub clip: Vec<ClipPath>,
    /// Shadow offset, blur and color.
    pub shadow: ShadowParams,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            fill_style: FillStyle::default(),
            stroke_style: FillStyle::default(),
            line_width: 1.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            miter_limit: 10.0,
            font: ParsedFont::default(),
            text_align: TextAlign::default(),
            text_baseline: TextBaseline::default(),
            global_alpha: 1.0,
            global_composite_operation: CompositeOperation::default(),
            transform: Transform::identity(),
            clip: Vec::new(),
            shadow: ShadowParams::default(),
        }
    }
}

impl DrawingState {
    pub fn pen(&self) -> Pen {
        Pen {
            style: self.stroke_style.clone(),
            width: self.line_width,
            cap: self.line_cap,
            join: self.line_join,
            miter_limit: self.miter_limit,
        }
    }
}
