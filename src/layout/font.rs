//! Font metrics for width estimates

use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Metrics needed to estimate text extents without the host
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Line height in logical pixels
    pub line_height: f32,
    /// Width of ASCII characters (0-127)
    pub char_widths: Vec<f32>,
    /// Default width for non-ASCII characters
    pub default_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // 16px page font: 16 * 1.5 line height, half-em average advance
        let default_width = 8.0;
        Self {
            line_height: 24.0,
            char_widths: vec![default_width; 128],
            default_width,
        }
    }
}

impl FontMetrics {
    pub fn new(line_height: f32, char_widths: Vec<f32>, default_width: f32) -> Self {
        Self {
            line_height,
            char_widths,
            default_width,
        }
    }

    /// Get width of a character
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        self.default_width
    }

    /// Width of a string, summed per grapheme cluster
    pub fn text_width(&self, text: &str) -> f32 {
        text.graphemes(true)
            .map(|g| {
                if g.chars().all(char::is_control) {
                    0.0
                } else {
                    g.chars().next().map(|c| self.width(c)).unwrap_or(0.0)
                }
            })
            .sum()
    }

    /// Greedy wrap of `text` into lines no wider than `max_width`,
    /// breaking at line-break opportunities. Returns the width of each line.
    pub fn wrap_widths(&self, text: &str, max_width: f32) -> Vec<f32> {
        let mut widths = Vec::new();
        let mut line_start = 0;
        let mut last_fit: Option<usize> = None;

        for (offset, opportunity) in linebreaks(text) {
            let width = self.text_width(text[line_start..offset].trim_end());
            if width > max_width {
                if let Some(fit) = last_fit.take() {
                    widths.push(self.text_width(text[line_start..fit].trim_end()));
                    line_start = fit;
                }
            }
            // An unbreakable run wider than the line overflows it
            if opportunity == BreakOpportunity::Mandatory {
                widths.push(self.text_width(text[line_start..offset].trim_end()));
                line_start = offset;
                last_fit = None;
            } else {
                last_fit = Some(offset);
            }
        }

        if line_start < text.len() || widths.is_empty() {
            widths.push(self.text_width(text[line_start..].trim_end()));
        }
        widths
    }
}
