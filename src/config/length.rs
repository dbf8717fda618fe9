//! Physical lengths and paper sizes
//!
//! Everything resolves to CSS pixels at 96 DPI.

use serde::{Deserialize, Serialize};
use std::fmt;

/// CSS pixels per inch
pub const PX_PER_IN: f32 = 96.0;

/// Millimetres per inch
const MM_PER_IN: f32 = 25.4;

/// Base font size of a page canvas, in pixels
pub const FONT_SIZE: f32 = 16.0;

/// Page dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn mm(width: f32, height: f32) -> Self {
        Self::new(width * PX_PER_IN / MM_PER_IN, height * PX_PER_IN / MM_PER_IN)
    }

    fn inches(width: f32, height: f32) -> Self {
        Self::new(width * PX_PER_IN, height * PX_PER_IN)
    }

    /// Swap width and height
    pub fn rotated(self) -> Self {
        Self::new(self.height, self.width)
    }

    /// Look up a named paper size
    pub fn named(name: &str) -> Option<Self> {
        let size = match name {
            "A5" => Self::mm(148.0, 210.0),
            "A4" => Self::mm(210.0, 297.0),
            "A3" => Self::mm(297.0, 420.0),
            "B5" => Self::mm(176.0, 250.0),
            "B4" => Self::mm(250.0, 353.0),
            "JIS-B5" => Self::mm(182.0, 257.0),
            "JIS-B4" => Self::mm(257.0, 364.0),
            "letter" => Self::inches(8.5, 11.0),
            "legal" => Self::inches(8.5, 14.0),
            "ledger" => Self::inches(11.0, 17.0),
            _ => return None,
        };
        Some(size)
    }
}

impl Default for Size {
    /// A4 portrait
    fn default() -> Self {
        Self::mm(210.0, 297.0)
    }
}

/// Parse a length such as `12mm` or `.4in` into pixels.
///
/// Returns `None` for an unknown unit suffix or an unparsable number.
pub fn parse_length(option: &str) -> Option<f32> {
    const UNITS: [(&str, f32); 6] = [
        ("px", 1.0),
        ("cm", PX_PER_IN / 2.54),
        ("mm", PX_PER_IN / MM_PER_IN),
        ("in", PX_PER_IN),
        ("pc", 16.0),
        ("pt", 4.0 / 3.0),
    ];

    let (number, factor) = UNITS
        .iter()
        .find_map(|(suffix, factor)| option.strip_suffix(*suffix).map(|n| (n, *factor)))?;
    parse_number(number).map(|n| n * factor)
}

/// Number parsing with JS `Number()` leniency for surrounding whitespace
/// and the empty string.
fn parse_number(text: &str) -> Option<f32> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }
    text.parse::<f32>().ok().filter(|n| !n.is_nan())
}

fn positive(value: Option<f32>) -> Option<f32> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Parse a paper size: a name (`A4`, `letter`, ...), optionally followed by
/// `landscape` or `portrait`, or a `<width> [<height>]` pair.
///
/// Invalid dimensions fall back to A4 independently.
pub fn parse_size(option: &str) -> Size {
    if let Some(rest) = option.strip_suffix(" landscape") {
        return parse_size(rest.trim()).rotated();
    }
    if let Some(rest) = option.strip_suffix(" portrait") {
        return parse_size(rest.trim());
    }
    if let Some(size) = Size::named(option) {
        return size;
    }

    let default = Size::default();
    let mut tokens = option.split_whitespace();
    let width = tokens.next().and_then(|t| positive(parse_length(t)));
    let height = tokens.next();

    match (width, height) {
        (Some(width), None) => Size::new(width, width),
        (Some(width), Some(height)) => Size::new(
            width,
            positive(parse_length(height)).unwrap_or(default.height),
        ),
        (None, height) => Size::new(
            default.width,
            height
                .and_then(|h| positive(parse_length(h)))
                .unwrap_or(default.height),
        ),
    }
}

/// A CSS length kept in its source form.
///
/// Margins and the binding offset are passed through as written; they are
/// only resolved to pixels where page geometry needs a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CssLength(String);

impl CssLength {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve to pixels. `em` is relative to `font_size`.
    pub fn to_px(&self, font_size: f32) -> Option<f32> {
        let value = self.0.trim();
        if let Some(number) = value.strip_suffix("rem").or_else(|| value.strip_suffix("em")) {
            return parse_number(number).map(|n| n * font_size);
        }
        if value == "0" {
            return Some(0.0);
        }
        parse_length(value).filter(|v| v.is_finite())
    }
}

impl fmt::Display for CssLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CssLength {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
