//! Style types and keyword enums for Canvas 2D operations.
//!
//! Keyword attributes are parsed once at the API boundary into closed enums;
//! everything past the setters works with the typed values.

use crate::error::{Canvas2dError, Canvas2dResult};
use crate::geometry::CanvasColor;
use crate::gradient::CanvasGradient;
use std::fmt;
use std::str::FromStr;

/// Resolved paint for fill and stroke operations.
#[derive(Debug, Clone, PartialEq)]
pub enum FillStyle {
    /// Solid color fill.
    Color(tiny_skia::Color),
    /// Linear or radial gradient, shared with the caller's handle.
    Gradient(CanvasGradient),
}

impl Default for FillStyle {
    fn default() -> Self {
        FillStyle::Color(tiny_skia::Color::BLACK)
    }
}

/// Paint input accepted by the fill/stroke style setters.
#[derive(Debug, Clone)]
pub enum StyleValue {
    /// CSS color text such as `"red"`, `"#ff000080"` or `"rgba(0,0,255,0.5)"`.
    Color(String),
    /// A gradient handle.
    Gradient(CanvasGradient),
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Color(s.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        StyleValue::Color(s)
    }
}

impl From<&CanvasGradient> for StyleValue {
    fn from(gradient: &CanvasGradient) -> Self {
        StyleValue::Gradient(gradient.clone())
    }
}

impl From<CanvasGradient> for StyleValue {
    fn from(gradient: CanvasGradient) -> Self {
        StyleValue::Gradient(gradient)
    }
}

impl From<CanvasColor> for StyleValue {
    fn from(color: CanvasColor) -> Self {
        StyleValue::Color(color.to_css())
    }
}

impl StyleValue {
    /// Resolve into a paint. Unparseable colors yield `None`.
    pub(crate) fn resolve(&self) -> Option<FillStyle> {
        match self {
            StyleValue::Color(s) => parse_color(s).ok().map(FillStyle::Color),
            StyleValue::Gradient(g) => Some(FillStyle::Gradient(g.clone())),
        }
    }
}

/// Parse a CSS color string into a tiny_skia::Color.
pub fn parse_color(s: &str) -> Canvas2dResult<tiny_skia::Color> {
    let parsed = csscolorparser::parse(s.trim())
        .map_err(|e| Canvas2dError::ColorParseError(format!("{}: {}", s, e)))?;

    let [r, g, b, a] = parsed.to_array();
    tiny_skia::Color::from_rgba(r, g, b, a)
        .ok_or_else(|| Canvas2dError::ColorParseError(s.to_string()))
}

/// Parse a color, substituting `fallback` and logging when the text is invalid.
pub(crate) fn parse_color_or(s: &str, fallback: tiny_skia::Color) -> tiny_skia::Color {
    match parse_color(s) {
        Ok(color) => color,
        Err(err) => {
            log::warn!(target: "canvas", "{}; using fallback color", err);
            fallback
        }
    }
}

fn invalid_keyword(kind: &str, s: &str) -> Canvas2dError {
    Canvas2dError::InvalidArgument(format!("Invalid {}: '{}'", kind, s))
}

/// Line cap style for stroke operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Flat edge at the endpoint.
    #[default]
    Butt,
    /// Rounded edge extending past the endpoint.
    Round,
    /// Square edge extending past the endpoint.
    Square,
}

impl LineCap {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

impl FromStr for LineCap {
    type Err = Canvas2dError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "butt" => Ok(LineCap::Butt),
            "round" => Ok(LineCap::Round),
            "square" => Ok(LineCap::Square),
            _ => Err(invalid_keyword("line cap", s)),
        }
    }
}

impl From<LineCap> for tiny_skia::LineCap {
    fn from(cap: LineCap) -> Self {
        match cap {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Square => tiny_skia::LineCap::Square,
        }
    }
}

/// Line join style for stroke operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Sharp corner.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Beveled corner.
    Bevel,
}

impl LineJoin {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        }
    }
}

impl FromStr for LineJoin {
    type Err = Canvas2dError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "miter" => Ok(LineJoin::Miter),
            "round" => Ok(LineJoin::Round),
            "bevel" => Ok(LineJoin::Bevel),
            _ => Err(invalid_keyword("line join", s)),
        }
    }
}

impl From<LineJoin> for tiny_skia::LineJoin {
    fn from(join: LineJoin) -> Self {
        match join {
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        }
    }
}

/// Text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Align text to the start (left for LTR).
    #[default]
    Start,
    /// Align text to the end (right for LTR).
    End,
    /// Align text to the left of the anchor point.
    Left,
    /// Align text to the right of the anchor point.
    Right,
    /// Center text on the anchor point.
    Center,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Start => "start",
            TextAlign::End => "end",
            TextAlign::Left => "left",
            TextAlign::Right => "right",
            TextAlign::Center => "center",
        }
    }
}

impl FromStr for TextAlign {
    type Err = Canvas2dError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(TextAlign::Start),
            "end" => Ok(TextAlign::End),
            "left" => Ok(TextAlign::Left),
            "right" => Ok(TextAlign::Right),
            "center" => Ok(TextAlign::Center),
            _ => Err(invalid_keyword("text align", s)),
        }
    }
}

/// Text baseline for text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    /// Alphabetic baseline.
    #[default]
    Alphabetic,
    /// Top of the em square.
    Top,
    /// Middle of the em square.
    Middle,
    /// Bottom of the em square.
    Bottom,
    /// Hanging baseline.
    Hanging,
}

impl TextBaseline {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextBaseline::Alphabetic => "alphabetic",
            TextBaseline::Top => "top",
            TextBaseline::Middle => "middle",
            TextBaseline::Bottom => "bottom",
            TextBaseline::Hanging => "hanging",
        }
    }
}

impl FromStr for TextBaseline {
    type Err = Canvas2dError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alphabetic" => Ok(TextBaseline::Alphabetic),
            "top" => Ok(TextBaseline::Top),
            "middle" => Ok(TextBaseline::Middle),
            "bottom" => Ok(TextBaseline::Bottom),
            "hanging" => Ok(TextBaseline::Hanging),
            _ => Err(invalid_keyword("text baseline", s)),
        }
    }
}

/// Fill rule for path operations.
///
/// Determines how the interior of a path is calculated when filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasFillRule {
    /// Non-zero winding rule (default).
    #[default]
    NonZero,
    /// Even-odd rule.
    EvenOdd,
}

impl FromStr for CanvasFillRule {
    type Err = Canvas2dError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nonzero" => Ok(CanvasFillRule::NonZero),
            "evenodd" => Ok(CanvasFillRule::EvenOdd),
            _ => Err(invalid_keyword("fill rule", s)),
        }
    }
}

impl From<CanvasFillRule> for tiny_skia::FillRule {
    fn from(rule: CanvasFillRule) -> Self {
        match rule {
            CanvasFillRule::NonZero => tiny_skia::FillRule::Winding,
            CanvasFillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        }
    }
}

/// Compositing operator (`globalCompositeOperation`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeOperation {
    #[default]
    SourceOver,
    SourceIn,
    SourceOut,
    SourceAtop,
    DestinationOver,
    DestinationIn,
    DestinationOut,
    DestinationAtop,
    Lighter,
    Copy,
    Xor,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl CompositeOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositeOperation::SourceOver => "source-over",
            CompositeOperation::SourceIn => "source-in",
            CompositeOperation::SourceOut => "source-out",
            CompositeOperation::SourceAtop => "source-atop",
            CompositeOperation::DestinationOver => "destination-over",
            CompositeOperation::DestinationIn => "destination-in",
            CompositeOperation::DestinationOut => "destination-out",
            CompositeOperation::DestinationAtop => "destination-atop",
            CompositeOperation::Lighter => "lighter",
            CompositeOperation::Copy => "copy",
            CompositeOperation::Xor => "xor",
            CompositeOperation::Multiply => "multiply",
            CompositeOperation::Screen => "screen",
            CompositeOperation::Overlay => "overlay",
            CompositeOperation::Darken => "darken",
            CompositeOperation::Lighten => "lighten",
            CompositeOperation::ColorDodge => "color-dodge",
            CompositeOperation::ColorBurn => "color-burn",
            CompositeOperation::HardLight => "hard-light",
            CompositeOperation::SoftLight => "soft-light",
            CompositeOperation::Difference => "difference",
            CompositeOperation::Exclusion => "exclusion",
            CompositeOperation::Hue => "hue",
            CompositeOperation::Saturation => "saturation",
            CompositeOperation::Color => "color",
            CompositeOperation::Luminosity => "luminosity",
        }
    }
}

impl FromStr for CompositeOperation {
    type Err = Canvas2dError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "source-over" => CompositeOperation::SourceOver,
            "source-in" => CompositeOperation::SourceIn,
            "source-out" => CompositeOperation::SourceOut,
            "source-atop" => CompositeOperation::SourceAtop,
            "destination-over" => CompositeOperation::DestinationOver,
            "destination-in" => CompositeOperation::DestinationIn,
            "destination-out" => CompositeOperation::DestinationOut,
            "destination-atop" => CompositeOperation::DestinationAtop,
            "lighter" => CompositeOperation::Lighter,
            "copy" => CompositeOperation::Copy,
            "xor" => CompositeOperation::Xor,
            "multiply" => CompositeOperation::Multiply,
            "screen" => CompositeOperation::Screen,
            "overlay" => CompositeOperation::Overlay,
            "darken" => CompositeOperation::Darken,
            "lighten" => CompositeOperation::Lighten,
            "color-dodge" => CompositeOperation::ColorDodge,
            "color-burn" => CompositeOperation::ColorBurn,
            "hard-light" => CompositeOperation::HardLight,
            "soft-light" => CompositeOperation::SoftLight,
            "difference" => CompositeOperation::Difference,
            "exclusion" => CompositeOperation::Exclusion,
            "hue" => CompositeOperation::Hue,
            "saturation" => CompositeOperation::Saturation,
            "color" => CompositeOperation::Color,
            "luminosity" => CompositeOperation::Luminosity,
            _ => return Err(invalid_keyword("composite operation", s)),
        };
        Ok(op)
    }
}

impl From<CompositeOperation> for tiny_skia::BlendMode {
    fn from(op: CompositeOperation) -> Self {
        use tiny_skia::BlendMode;
        match op {
            CompositeOperation::SourceOver => BlendMode::SourceOver,
            CompositeOperation::SourceIn => BlendMode::SourceIn,
            CompositeOperation::SourceOut => BlendMode::SourceOut,
            CompositeOperation::SourceAtop => BlendMode::SourceAtop,
            CompositeOperation::DestinationOver => BlendMode::DestinationOver,
            CompositeOperation::DestinationIn => BlendMode::DestinationIn,
            CompositeOperation::DestinationOut => BlendMode::DestinationOut,
            CompositeOperation::DestinationAtop => BlendMode::DestinationAtop,
            CompositeOperation::Lighter => BlendMode::Plus,
            CompositeOperation::Copy => BlendMode::Source,
            CompositeOperation::Xor => BlendMode::Xor,
            CompositeOperation::Multiply => BlendMode::Multiply,
            CompositeOperation::Screen => BlendMode::Screen,
            CompositeOperation::Overlay => BlendMode::Overlay,
            CompositeOperation::Darken => BlendMode::Darken,
            CompositeOperation::Lighten => BlendMode::Lighten,
            CompositeOperation::ColorDodge => BlendMode::ColorDodge,
            CompositeOperation::ColorBurn => BlendMode::ColorBurn,
            CompositeOperation::HardLight => BlendMode::HardLight,
            CompositeOperation::SoftLight => BlendMode::SoftLight,
            CompositeOperation::Difference => BlendMode::Difference,
            CompositeOperation::Exclusion => BlendMode::Exclusion,
            CompositeOperation::Hue => BlendMode::Hue,
            CompositeOperation::Saturation => BlendMode::Saturation,
            CompositeOperation::Color => BlendMode::Color,
            CompositeOperation::Luminosity => BlendMode::Luminosity,
        }
    }
}

impl fmt::Display for CompositeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("red", [255, 0, 0, 255])]
    #[case("#00ff00", [0, 255, 0, 255])]
    #[case("#0000ff80", [0, 0, 255, 128])]
    #[case("  transparent ", [0, 0, 0, 0])]
    fn test_parse_color(#[case] input: &str, #[case] expected: [u8; 4]) {
        let c = parse_color(input).unwrap().to_color_u8();
        assert_eq!([c.red(), c.green(), c.blue(), c.alpha()], expected);
    }

    #[test]
    fn test_parse_color_invalid() {
        assert!(matches!(
            parse_color("not-a-color"),
            Err(Canvas2dError::ColorParseError(_))
        ));
        assert_eq!(
            parse_color_or("nope", tiny_skia::Color::TRANSPARENT),
            tiny_skia::Color::TRANSPARENT
        );
    }

    #[rstest]
    #[case("source-over", CompositeOperation::SourceOver)]
    #[case("lighter", CompositeOperation::Lighter)]
    #[case("copy", CompositeOperation::Copy)]
    #[case("color-dodge", CompositeOperation::ColorDodge)]
    #[case("luminosity", CompositeOperation::Luminosity)]
    fn test_composite_keywords(#[case] keyword: &str, #[case] op: CompositeOperation) {
        assert_eq!(keyword.parse::<CompositeOperation>().unwrap(), op);
        assert_eq!(op.as_str(), keyword);
    }

    #[test]
    fn test_keyword_round_trip_and_rejects() {
        for cap in [LineCap::Butt, LineCap::Round, LineCap::Square] {
            assert_eq!(cap.as_str().parse::<LineCap>().unwrap(), cap);
        }
        for align in [
            TextAlign::Start,
            TextAlign::End,
            TextAlign::Left,
            TextAlign::Right,
            TextAlign::Center,
        ] {
            assert_eq!(align.as_str().parse::<TextAlign>().unwrap(), align);
        }
        assert!("ideographic".parse::<TextBaseline>().is_err());
        assert!("Round".parse::<LineJoin>().is_err());
        assert!("plus-lighter".parse::<CompositeOperation>().is_err());
        assert_eq!(
            "evenodd".parse::<CanvasFillRule>().unwrap(),
            CanvasFillRule::EvenOdd
        );
    }

    #[test]
    fn test_style_value_resolve() {
        let style: StyleValue = "blue".into();
        assert_eq!(
            style.resolve(),
            Some(FillStyle::Color(tiny_skia::Color::from_rgba8(0, 0, 255, 255)))
        );
        assert_eq!(StyleValue::from("bogus").resolve(), None);
    }
}
