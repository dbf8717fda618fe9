//! Page options: lengths, paper sizes and the resolved configuration

mod length;
mod options;
mod resolve;

pub use length::{parse_length, parse_size, CssLength, Size, FONT_SIZE, PX_PER_IN};
pub use options::{OptionValue, RawOptions};
pub use resolve::{
    parse_dot_gap, parse_margin, BreakLevels, HeaderLevels, Margin, PageConfig,
};
pub(crate) use resolve::resolve_px;
