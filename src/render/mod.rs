//! Post-layout output: running headers, contents and print style

mod header;
mod style;
pub mod toc;

pub use header::{fill_headers, HeadingStack};
pub use style::{page_style_css, ARTICLE_SELECTOR};
pub use toc::{
    fill_contents, leader_dot_count, Contents, EntryGeometry, FontLeaderMetrics, LeaderMetrics,
    TocEntry,
};
