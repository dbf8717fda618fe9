//! Book Pager: book-style pagination of rendered documents
//!
//! This crate takes the rendered lines of a document and lays them out on
//! fixed-size pages:
//! - Page size, margins and binding from the `page` unit options
//! - Forced, level-driven and right-hand page breaks
//! - Splitting of oversized units at their break points
//! - Running headers and a table of contents with page numbers
//!
//! The host owns rendering and measurement; see [`layout::Measure`].

pub mod config;
pub mod document;
pub mod error;
pub mod layout;
pub mod render;
pub mod session;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmPager;

// Re-export primary types
pub use config::{PageConfig, RawOptions, Size};
pub use document::{DocumentContext, Element, IndexInfo, Node};
pub use error::BridgeError;
pub use layout::{paginate, Measure, Page, PageSide, Pagination, StackMeasure};
pub use session::{CompilerId, Environment, PagedDocument, Registration, Sessions};

/// Rectangle in page pixels, origin at the top left
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Orbit, Unit, BREAKABLE_CLASS, BREAK_CLASS, RIGHT_CLASS};
    use crate::render::toc::PAGE_CLASS;
    use crate::render::FontLeaderMetrics;

    /// 100px main region, 160px wide
    fn options(extra: &[(&str, f64)]) -> RawOptions {
        extra.iter().fold(
            RawOptions::new()
                .with("size", "200px 140px")
                .with("margin", "20px"),
            |options, (key, value)| options.with(*key, *value),
        )
    }

    fn unit_line(id: &str, extent: f32) -> Element {
        Element::new().with_child(Element::new().with_id(id).with_child(Node::text(id, extent)))
    }

    fn text_line(text: &str, extent: f32) -> Element {
        Element::new().with_child(Node::text(text, extent))
    }

    fn marker(right: bool) -> Element {
        let mut marker = Element::new().with_class(BREAK_CLASS);
        if right {
            marker = marker.with_class(RIGHT_CLASS);
        }
        Element::new().with_child(marker)
    }

    fn page_texts(pagination: &Pagination) -> Vec<String> {
        pagination
            .pages
            .iter()
            .map(|page| {
                page.main
                    .blocks
                    .iter()
                    .map(|block| block.element.plain_text())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_rect_edges() {
        let a = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(a.right(), 40.0);
        assert_eq!(a.bottom(), 60.0);
    }

    #[test]
    fn test_split_unit_concatenates_back() {
        let mut list = Element::new().with_id("list").with_class(BREAKABLE_CLASS);
        for i in 0..25 {
            list = list.with_child(Element::new().with_child(Node::text(format!("{} ", i), 10.0)));
        }
        let whole = Element::new().with_child(list);
        let context = DocumentContext::new(vec![IndexInfo {
            orbit: Orbit::Other("list".into()),
            unit: Unit::new("ul"),
            ..IndexInfo::heading("list", &[], "")
        }]);
        let config = PageConfig::resolve(&options(&[]));

        let result = paginate(&[whole.clone()], &config, &context, StackMeasure);
        assert_eq!(result.pages.len(), 3);

        let pieces: Vec<_> = result
            .pages
            .iter()
            .flat_map(|page| page.main.blocks.iter())
            .collect();
        assert_eq!(pieces.first().map(|p| p.slice.start), Some(0));
        assert_eq!(pieces.last().and_then(|p| p.slice.end), None);
        for pair in pieces.windows(2) {
            assert_eq!(pair[0].slice.end, Some(pair[1].slice.start));
        }
        let joined: String = pieces.iter().map(|p| p.element.plain_text()).collect();
        assert_eq!(joined, whole.plain_text());
    }

    #[test]
    fn test_repeated_runs_agree() {
        let context = DocumentContext::new(vec![
            IndexInfo::heading("a", &[1], "Alpha"),
            IndexInfo::heading("b", &[2], "Beta"),
        ]);
        let env = Environment::new(PageConfig::resolve(&options(&[("right-level", 1.0)])));
        let lines = vec![
            unit_line("a", 30.0),
            text_line("x", 80.0),
            marker(false),
            unit_line("b", 30.0),
        ];
        let first = env.paginate(&lines, &context, StackMeasure);
        let second = env.paginate(&lines, &context, StackMeasure);
        assert_eq!(first, second);
    }

    #[test]
    fn test_right_break_parity() {
        let context = DocumentContext::default();
        let config = PageConfig::resolve(&options(&[]));

        // Ends on page 1: the marker pads with a blank left page
        let odd = paginate(
            &[text_line("a", 10.0), marker(true), text_line("b", 10.0)],
            &config,
            &context,
            StackMeasure,
        );
        assert_eq!(page_texts(&odd), vec!["a", "", "b"]);

        // Ends on page 2: the next page is already a right-hand one
        let even = paginate(
            &[text_line("a", 10.0), marker(false), text_line("b", 10.0), marker(true), text_line("c", 10.0)],
            &config,
            &context,
            StackMeasure,
        );
        assert_eq!(page_texts(&even), vec!["a", "b", "c"]);
        assert_eq!(even.pages[2].side, PageSide::Right);
    }

    #[test]
    fn test_plain_break_before_right_heading_leaves_one_blank() {
        let context = DocumentContext::new(vec![IndexInfo::heading("h", &[1], "Head")]);
        let config = PageConfig::resolve(&options(&[("right-level", 1.0)]));
        let result = paginate(
            &[text_line("a", 10.0), marker(false), unit_line("h", 10.0)],
            &config,
            &context,
            StackMeasure,
        );
        assert_eq!(page_texts(&result), vec!["a", "", "h"]);
    }

    #[test]
    fn test_contents_across_pages() {
        let mut sessions = Sessions::new();
        let id = CompilerId(3);
        let options = options(&[("break-level", 1.0)]);
        assert_eq!(sessions.register(id, &options, true), Registration::Registered);

        let context = DocumentContext::new(vec![
            IndexInfo::heading("a", &[1], "Alpha"),
            IndexInfo::heading("b", &[2], "Beta"),
        ]);
        let toc = sessions.contents(id, &context, &RawOptions::new());
        let lines = vec![
            Element::new().with_child(toc),
            unit_line("a", 10.0),
            unit_line("b", 10.0),
        ];

        let env = sessions.get(id).unwrap();
        let document = env.run(&lines, &context, &StackMeasure, &FontLeaderMetrics::default());
        assert_eq!(document.pages.len(), 3);

        let mut labels = Vec::new();
        document.pages[0].main.blocks[0].element.walk(&mut |e| {
            if e.has_class(PAGE_CLASS) {
                labels.push(e.plain_text());
            }
        });
        assert_eq!(labels, vec!["2", "3"]);
        assert_eq!(document.pages[2].header.content, "Beta");
    }
}
