//! CSS font shorthand parsing.
//!
//! Accepts `[style] [variant] [weight] size[/line-height] family[, family]*`,
//! e.g. `"12px Arial"` or `"italic bold 14pt 'Times New Roman', serif"`.

use crate::error::{Canvas2dError, Canvas2dResult};
use cosmic_text::{Family, Style, Weight};

/// Parsed font specification from a CSS font string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFont {
    /// Font style (normal, italic, oblique).
    pub style: Style,
    /// Font weight (100-900 or keywords like bold).
    pub weight: Weight,
    /// Font size in pixels.
    pub size_px: f32,
    /// Font families in order of preference.
    pub families: Vec<String>,
}

impl Default for ParsedFont {
    fn default() -> Self {
        Self {
            style: Style::Normal,
            weight: Weight::NORMAL,
            size_px: 10.0,
            families: vec!["sans-serif".to_string()],
        }
    }
}

impl ParsedFont {
    /// Serialize back into a font shorthand, omitting normal style and weight.
    pub fn to_css(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        match self.style {
            Style::Italic => parts.push("italic".to_string()),
            Style::Oblique => parts.push("oblique".to_string()),
            Style::Normal => {}
        }
        if self.weight == Weight::BOLD {
            parts.push("bold".to_string());
        } else if self.weight != Weight::NORMAL {
            parts.push(self.weight.0.to_string());
        }
        parts.push(format!("{}px", self.size_px));
        let families: Vec<String> = self
            .families
            .iter()
            .map(|f| {
                if f.contains(' ') {
                    format!("\"{}\"", f)
                } else {
                    f.clone()
                }
            })
            .collect();
        parts.push(families.join(", "));
        parts.join(" ")
    }

    /// The preferred family as a cosmic-text family.
    pub(crate) fn primary_family(&self) -> Family<'_> {
        self.families
            .first()
            .map(|name| family_for(name))
            .unwrap_or(Family::SansSerif)
    }
}

/// Map a CSS family name onto a cosmic-text family, resolving generic names.
pub(crate) fn family_for(name: &str) -> Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "sans-serif" | "system-ui" => Family::SansSerif,
        "serif" => Family::Serif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name),
    }
}

/// Parse a CSS font shorthand.
pub fn parse_font(font_str: &str) -> Canvas2dResult<ParsedFont> {
    let mut result = ParsedFont::default();
    let mut remaining = font_str.trim();
    if remaining.is_empty() {
        return Err(Canvas2dError::FontParseError("empty font string".to_string()));
    }

    // Leading keywords, in any order, up to the size token
    loop {
        let token_end = remaining
            .find(char::is_whitespace)
            .unwrap_or(remaining.len());
        let token = &remaining[..token_end];
        if !apply_prefix_keyword(token, &mut result) {
            break;
        }
        remaining = remaining[token_end..].trim_start();
    }

    let (size, rest) = parse_font_size(remaining)?;
    result.size_px = size;
    remaining = rest;

    if let Some(rest) = remaining.strip_prefix('/') {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        remaining = &rest[end..];
    }

    let families = parse_font_families(remaining);
    if families.is_empty() {
        return Err(Canvas2dError::FontParseError(format!(
            "missing font family: {}",
            font_str
        )));
    }
    result.families = families;
    Ok(result)
}

/// Consume one style/variant/weight keyword. Returns false at the size token.
fn apply_prefix_keyword(token: &str, font: &mut ParsedFont) -> bool {
    match token {
        "italic" => font.style = Style::Italic,
        "oblique" => font.style = Style::Oblique,
        "normal" | "small-caps" => {}
        "bold" => font.weight = Weight::BOLD,
        "bolder" => font.weight = Weight::EXTRA_BOLD,
        "lighter" => font.weight = Weight::LIGHT,
        _ => match token.parse::<u16>() {
            Ok(w) if (100..=900).contains(&w) && w % 100 == 0 => font.weight = Weight(w),
            _ => return false,
        },
    }
    true
}

fn parse_font_size(s: &str) -> Canvas2dResult<(f32, &str)> {
    let num_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    if num_end == 0 {
        return Err(Canvas2dError::FontParseError(format!(
            "Expected font size, got: {}",
            s
        )));
    }

    let size: f32 = s[..num_end].parse().map_err(|_| {
        Canvas2dError::FontParseError(format!("Invalid font size number: {}", &s[..num_end]))
    })?;
    let rest = &s[num_end..];

    let (multiplier, unit_len) = if rest.starts_with("px") {
        (1.0, 2)
    } else if rest.starts_with("pt") {
        (4.0 / 3.0, 2)
    } else if rest.starts_with("rem") {
        (16.0, 3)
    } else if rest.starts_with("em") {
        (16.0, 2)
    } else if rest.starts_with('%') {
        (0.16, 1)
    } else {
        return Err(Canvas2dError::FontParseError(format!(
            "Missing font size unit: {}",
            s
        )));
    };

    let px = size * multiplier;
    if !px.is_finite() || px <= 0.0 {
        return Err(Canvas2dError::FontParseError(format!(
            "Font size must be positive: {}",
            s
        )));
    }
    Ok((px, &rest[unit_len..]))
}

fn parse_font_families(s: &str) -> Vec<String> {
    s.split(',')
        .map(|family| {
            family
                .trim()
                .trim_matches(|c| c == '"' || c == '\'')
                .trim()
                .to_string()
        })
        .filter(|family| !family.is_empty())
        .collect()
}
