//! Immediate-mode Canvas 2D drawing context on a tiny-skia surface.
//!
//! The context keeps a graphics state stack, builds device-space paths and
//! rasterizes fills, strokes, text and images into an RGBA pixmap. It uses:
//! - `tiny-skia` for 2D rasterization
//! - `cosmic-text` for text shaping, measurement and glyph outlines
//! - `fontdb` for font database management
//! - `image` for decoding image sources
//!
//! State changes are recorded as dirty bits and pushed to the rasterizer
//! lazily, right before the next draw. Shadows are composited from a blurred
//! scratch buffer, and every surface change raises a coalesced repaint
//! notification through [`RepaintTracker`].
//!
//! # Example
//!
//! ```rust,no_run
//! use canvas2d_context::{Canvas2dContext, RectParams};
//!
//! let mut ctx = Canvas2dContext::new(400, 300)?;
//! ctx.set_fill_style("#ff0000");
//! ctx.fill_rect(&RectParams::new(10.0, 10.0, 100.0, 50.0));
//! let png_data = ctx.to_png(None)?;
//! # Ok::<(), canvas2d_context::Canvas2dError>(())
//! ```

mod arc;
mod backend;
mod config;
mod context;
mod dirty;
mod drawing_state;
mod error;
mod font_parser;
mod geometry;
mod gradient;
mod image;
mod matrix;
mod path;
mod repaint;
mod shadow;
mod style;
mod text;
mod waveform;

// Re-export public API
pub use backend::{RasterBackend, SkiaRasterizer};
pub use config::{CustomFont, FontConfig, GenericFamilyMap};
pub use context::{Canvas2dContext, Canvas2dContextBuilder, MAX_DIMENSION};
pub use dirty::DirtyFlags;
pub use drawing_state::{ClipPath, DrawingState, Pen};
pub use error::{Canvas2dError, Canvas2dResult};
pub use font_parser::{parse_font, ParsedFont};
pub use geometry::{
    ArcParams, ArcToParams, CanvasColor, CubicBezierParams, DirtyRect, EllipseParams,
    ImageCropParams, ImageData, QuadraticBezierParams, RadialGradientParams, RectParams,
    ScrollParams,
};
pub use gradient::{CanvasGradient, GradientStop, GradientType};
pub use crate::image::{CanvasImage, ImageEvent, ImageSource};
pub use matrix::Matrix2D;
pub use repaint::{RepaintScheduler, RepaintTracker};
pub use shadow::ShadowParams;
pub use style::{
    parse_color, CanvasFillRule, CompositeOperation, FillStyle, LineCap, LineJoin, StyleValue,
    TextAlign, TextBaseline,
};
pub use text::TextMetrics;
pub use waveform::{WaveformLine, WaveformParams, MAX_WAVEFORM_LINES};
