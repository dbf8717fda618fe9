//! Print stylesheet for the paged document

use crate::config::Size;

/// Selector of the article element hosting the rendered lines
pub const ARTICLE_SELECTOR: &str = "body>.lr-struct>main>article";

/// `@page` rule sizing printed sheets to the page canvas, plus a width cap
/// on the article so the on-screen flow matches the printed one.
///
/// Embedded (shadow root) documents leave print sizing to the embedding
/// page and get `None`.
pub fn page_style_css(size: Size, embedded: bool) -> Option<String> {
    if embedded {
        return None;
    }
    Some(format!(
        "@page {{\n    margin: 0;\n    size: {w}px {h}px;\n}}\n\n{sel} {{\n    max-width: {w}px;\n}}",
        w = size.width,
        h = size.height,
        sel = ARTICLE_SELECTOR,
    ))
}
