//! Resolve raw options into a validated page configuration

use crate::config::length::{parse_size, CssLength, Size, FONT_SIZE};
use crate::config::options::{number_to_level, OptionValue, RawOptions};
use std::time::Duration;

const DEFAULT_MARGIN: &str = ".4in";
const DEFAULT_BINDING: &str = "0px";
const DEFAULT_LEFT_HEADER_LEVEL: u32 = 0;
const DEFAULT_RIGHT_HEADER_LEVEL: u32 = 1;
const DEFAULT_RIGHT_LEVEL: u32 = 0;
const DEFAULT_BREAK_DELAY: Duration = Duration::from_millis(1000);
const DEFAULT_BREAK_NUM: u32 = 1;
const DEFAULT_DOT_GAP: f32 = 1.0;

/// Page margins in CSS shorthand order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Margin {
    pub top: CssLength,
    pub right: CssLength,
    pub bottom: CssLength,
    pub left: CssLength,
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(DEFAULT_MARGIN)
    }
}

impl Margin {
    pub fn uniform(value: &str) -> Self {
        Self {
            top: value.into(),
            right: value.into(),
            bottom: value.into(),
            left: value.into(),
        }
    }
}

/// Heading depth shown in the running header of left and right pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLevels {
    pub left: u32,
    pub right: u32,
}

impl Default for HeaderLevels {
    fn default() -> Self {
        Self {
            left: DEFAULT_LEFT_HEADER_LEVEL,
            right: DEFAULT_RIGHT_HEADER_LEVEL,
        }
    }
}

/// Headings at or above these depths start a new page (`break_level`)
/// or a new right-hand page (`right_level`).
///
/// `break_level >= right_level` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakLevels {
    right_level: u32,
    break_level: u32,
}

impl BreakLevels {
    pub fn new(right_level: u32, break_level: u32) -> Self {
        Self {
            right_level,
            break_level: break_level.max(right_level),
        }
    }

    pub fn right_level(&self) -> u32 {
        self.right_level
    }

    pub fn break_level(&self) -> u32 {
        self.break_level
    }
}

impl Default for BreakLevels {
    fn default() -> Self {
        Self::new(DEFAULT_RIGHT_LEVEL, DEFAULT_RIGHT_LEVEL)
    }
}

/// Validated configuration of the `page` unit
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub size: Size,
    pub margin: Margin,
    pub binding: CssLength,
    pub header_levels: HeaderLevels,
    pub levels: BreakLevels,
    /// Debounce before the first pagination run
    pub break_delay: Duration,
    /// Number of pagination runs
    pub break_num: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: Size::default(),
            margin: Margin::default(),
            binding: DEFAULT_BINDING.into(),
            header_levels: HeaderLevels::default(),
            levels: BreakLevels::default(),
            break_delay: DEFAULT_BREAK_DELAY,
            break_num: DEFAULT_BREAK_NUM,
        }
    }
}

impl PageConfig {
    /// Every option is resolved independently; invalid input never fails,
    /// it falls back to the default for that option.
    pub fn resolve(options: &RawOptions) -> Self {
        Self {
            size: options
                .get("size")
                .and_then(OptionValue::as_str)
                .map(parse_size)
                .unwrap_or_default(),
            margin: options
                .get("margin")
                .and_then(OptionValue::as_str)
                .map(parse_margin)
                .unwrap_or_default(),
            // The option name keeps its historical spelling.
            binding: parse_binding(options.get("binging")),
            header_levels: parse_header_levels(options.get("header-level")),
            levels: parse_break_levels(options.get("right-level"), options.get("break-level")),
            break_delay: parse_break_delay(options.get("break-delay")),
            break_num: parse_break_num(options.get("break-num")),
        }
    }

    /// Height of the main content region in pixels
    pub fn main_height(&self) -> f32 {
        let top = resolve_px(&self.margin.top, DEFAULT_MARGIN);
        let bottom = resolve_px(&self.margin.bottom, DEFAULT_MARGIN);
        (self.size.height - top - bottom).max(0.0)
    }

    /// Width of the main content region in pixels
    pub fn main_width(&self) -> f32 {
        let left = resolve_px(&self.margin.left, DEFAULT_MARGIN);
        let right = resolve_px(&self.margin.right, DEFAULT_MARGIN);
        let binding = resolve_px(&self.binding, DEFAULT_BINDING);
        (self.size.width - left - right - binding).max(0.0)
    }
}

/// Resolve a length to pixels, using `fallback` when it is not a plain length
pub(crate) fn resolve_px(length: &CssLength, fallback: &str) -> f32 {
    length
        .to_px(FONT_SIZE)
        .or_else(|| CssLength::from(fallback).to_px(FONT_SIZE))
        .unwrap_or(0.0)
}

/// CSS margin shorthand with 1 to 4 values
pub fn parse_margin(option: &str) -> Margin {
    let values: Vec<&str> = option.split_whitespace().take(4).collect();
    match values.as_slice() {
        [] => Margin::default(),
        [all] => Margin::uniform(all),
        [vertical, horizontal] => Margin {
            top: (*vertical).into(),
            right: (*horizontal).into(),
            bottom: (*vertical).into(),
            left: (*horizontal).into(),
        },
        [top, horizontal, bottom] => Margin {
            top: (*top).into(),
            right: (*horizontal).into(),
            bottom: (*bottom).into(),
            left: (*horizontal).into(),
        },
        [top, right, bottom, left, ..] => Margin {
            top: (*top).into(),
            right: (*right).into(),
            bottom: (*bottom).into(),
            left: (*left).into(),
        },
    }
}

fn parse_binding(option: Option<&OptionValue>) -> CssLength {
    match option {
        Some(OptionValue::Number(n)) => CssLength::new(format!("{}px", n)),
        Some(OptionValue::Str(s)) => CssLength::new(s.as_str()),
        _ => DEFAULT_BINDING.into(),
    }
}

fn parse_level_token(token: &str) -> Option<u32> {
    token.parse::<f64>().ok().and_then(number_to_level)
}

fn parse_header_levels(option: Option<&OptionValue>) -> HeaderLevels {
    let default = HeaderLevels::default();
    let text = match option {
        Some(OptionValue::Number(n)) => {
            return match number_to_level(*n) {
                Some(level) => HeaderLevels {
                    left: level,
                    right: level,
                },
                None => default,
            };
        }
        Some(OptionValue::Str(s)) => s,
        _ => return default,
    };

    let mut tokens = text.split_whitespace();
    let left = tokens.next().and_then(parse_level_token);
    let right = tokens.next();

    match (left, right) {
        (Some(left), None) => HeaderLevels { left, right: left },
        (Some(left), Some(right)) => HeaderLevels {
            left,
            right: parse_level_token(right).unwrap_or(default.right),
        },
        (None, right) => HeaderLevels {
            left: default.left,
            right: right.and_then(parse_level_token).unwrap_or(default.right),
        },
    }
}

fn parse_break_levels(right: Option<&OptionValue>, brk: Option<&OptionValue>) -> BreakLevels {
    let right_level = right
        .and_then(OptionValue::as_level)
        .unwrap_or(DEFAULT_RIGHT_LEVEL);
    let break_level = brk
        .and_then(OptionValue::as_level)
        .filter(|level| *level >= right_level)
        .unwrap_or(right_level);
    BreakLevels::new(right_level, break_level)
}

fn parse_break_delay(option: Option<&OptionValue>) -> Duration {
    option
        .and_then(OptionValue::as_number)
        .and_then(|n| Duration::try_from_secs_f64(n).ok())
        .unwrap_or(DEFAULT_BREAK_DELAY)
}

fn parse_break_num(option: Option<&OptionValue>) -> u32 {
    option
        .and_then(OptionValue::as_level)
        .filter(|n| *n >= 1)
        .unwrap_or(DEFAULT_BREAK_NUM)
}

/// Leader-dot spacing for the `contents` unit, in em.
///
/// The unit's own option wins over the last global `dot-gap` option.
pub fn parse_dot_gap(own: Option<&OptionValue>, global: Option<&OptionValue>) -> f32 {
    own.or(global)
        .and_then(OptionValue::as_number)
        .filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n as f32)
        .unwrap_or(DEFAULT_DOT_GAP)
}
