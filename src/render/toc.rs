//! Table of contents: eager entry rendering and post-layout leader dots

use crate::config::{parse_dot_gap, RawOptions, FONT_SIZE};
use crate::document::{DocumentContext, Element, IndexInfo, Node, BREAKABLE_CLASS};
use crate::layout::{FontMetrics, Pagination};
use crate::Rect;
use serde::{Deserialize, Serialize};

pub const CONTENTS_CLASS: &str = "contents";
pub const ENTRY_CLASS: &str = "toc-entry";
pub const INDEX_CLASS: &str = "toc-index";
pub const TEXT_CLASS: &str = "toc-content";
pub const TAIL_CLASS: &str = "toc-tail";
pub const PAGE_CLASS: &str = "toc-page";
pub const DOT_CLASS: &str = "toc-dot";

/// Attribute tying a contents block to its paged listener
pub const BLOCK_ATTR: &str = "data-contents";
/// Attribute naming the element an entry points at
pub const TARGET_ATTR: &str = "data-target";

/// Deepest heading listed in the contents
const MAX_DEPTH: usize = 3;

/// An entry in the table of contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading depth, 1-based
    pub level: u32,
    /// Dotted section number
    pub index: String,
    pub text: String,
    /// Id of the heading element
    pub target_id: String,
}

impl TocEntry {
    pub fn from_heading(info: &IndexInfo) -> Option<Self> {
        if !info.is_heading() || info.index.len() > MAX_DEPTH {
            return None;
        }
        Some(Self {
            level: info.level(),
            index: info.index_label().to_string(),
            text: info.unit.text(),
            target_id: info.id.clone(),
        })
    }

    /// Render with an empty page label; extent is estimated from `font`
    /// wrapping the entry text into `width`.
    pub fn render(&self, font: &FontMetrics, width: f32) -> Element {
        let index_width = index_width(font, &self.index);
        let lines = font
            .wrap_widths(&self.text, (width - index_width).max(0.0))
            .len();

        Element::new()
            .with_class(ENTRY_CLASS)
            .with_class(format!("level{}", self.level))
            .with_attr(TARGET_ATTR, self.target_id.as_str())
            .with_extent(lines as f32 * font.line_height)
            .with_child(
                Element::new()
                    .with_class(INDEX_CLASS)
                    .with_child(Node::text(self.index.as_str(), 0.0)),
            )
            .with_child(
                Element::new()
                    .with_class(TEXT_CLASS)
                    .with_child(Node::text(self.text.as_str(), 0.0)),
            )
            .with_child(
                Element::new().with_class(TAIL_CLASS).with_child(
                    Element::new()
                        .with_class(PAGE_CLASS)
                        .with_attr("href", format!("#{}", encode_uri_component(&self.target_id))),
                ),
            )
    }
}

/// One `contents` unit: its entries and leader spacing
#[derive(Debug, Clone, PartialEq)]
pub struct Contents {
    /// Leader dot width in em
    pub dot_gap: f32,
    pub entries: Vec<TocEntry>,
}

impl Contents {
    pub fn collect(context: &DocumentContext, options: &RawOptions) -> Self {
        let dot_gap = parse_dot_gap(
            options.get("dot-gap"),
            context.last_global_option("dot-gap", CONTENTS_CLASS),
        );
        Self {
            dot_gap,
            entries: context.headings().filter_map(TocEntry::from_heading).collect(),
        }
    }

    /// The contents block, breakable between entries
    pub fn render(&self, block: &str, font: &FontMetrics, width: f32) -> Element {
        self.entries.iter().fold(
            Element::new()
                .with_class(CONTENTS_CLASS)
                .with_class(BREAKABLE_CLASS)
                .with_attr(BLOCK_ATTR, block),
            |element, entry| element.with_child(entry.render(font, width)),
        )
    }
}

/// Post-layout geometry of one entry, in the coordinate space of the entry
#[derive(Debug, Clone, PartialEq)]
pub struct EntryGeometry {
    pub entry: Rect,
    /// The page label box
    pub label: Rect,
    /// Line boxes of the entry text
    pub text_lines: Vec<Rect>,
    /// Pixels to em at the entry's font size; non-finite when the entry
    /// is not rendered
    pub width_scale: f32,
}

/// Geometry source for leader dot fitting
pub trait LeaderMetrics {
    fn entry_geometry(&self, entry: &Element, width: f32) -> Option<EntryGeometry>;
}

/// Number of `dot_gap`-em dots fitting between the end of the entry text
/// and the page label.
///
/// Only text lines reaching down to the label's line push the start of the
/// leader to the right.
pub fn leader_dot_count(geometry: &EntryGeometry, dot_gap: f32) -> usize {
    if !geometry.width_scale.is_finite() || dot_gap <= 0.0 {
        return 0;
    }
    let mut left = geometry.entry.x;
    for line in &geometry.text_lines {
        if line.bottom() >= geometry.label.y && line.right() > left {
            left = line.right();
        }
    }
    let right = geometry.label.x;
    if right <= left {
        return 0;
    }
    ((right - left) * geometry.width_scale / dot_gap).floor() as usize
}

/// Estimates entry geometry from font metrics: index, then text wrapping
/// in the space left of a right-aligned label on the last line.
#[derive(Debug, Clone, Default)]
pub struct FontLeaderMetrics {
    pub font: FontMetrics,
}

impl FontLeaderMetrics {
    pub fn new(font: FontMetrics) -> Self {
        Self { font }
    }
}

impl LeaderMetrics for FontLeaderMetrics {
    fn entry_geometry(&self, entry: &Element, width: f32) -> Option<EntryGeometry> {
        let text_of = |class: &str| find_class(entry, class).map(|e| e.plain_text());
        let index = text_of(INDEX_CLASS).unwrap_or_default();
        let text = text_of(TEXT_CLASS)?;
        let label = text_of(PAGE_CLASS)?;

        let line_height = self.font.line_height;
        let text_left = index_width(&self.font, &index);
        let label_width = self.font.text_width(&label);
        let widths = self
            .font
            .wrap_widths(&text, (width - text_left - label_width).max(0.0));

        let text_lines: Vec<Rect> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| Rect::new(text_left, i as f32 * line_height, *w, line_height))
            .collect();
        let last_line = text_lines.len().saturating_sub(1) as f32;
        let half_leading = ((line_height - FONT_SIZE) / 2.0).max(0.0);

        Some(EntryGeometry {
            entry: Rect::new(0.0, 0.0, width, text_lines.len() as f32 * line_height),
            label: Rect::new(
                width - label_width,
                last_line * line_height + half_leading,
                label_width,
                FONT_SIZE,
            ),
            text_lines,
            width_scale: 1.0 / FONT_SIZE,
        })
    }
}

fn index_width(font: &FontMetrics, index: &str) -> f32 {
    if index.is_empty() {
        0.0
    } else {
        font.text_width(index) + font.width(' ')
    }
}

fn find_class<'e>(root: &'e Element, class: &str) -> Option<&'e Element> {
    let mut found = None;
    root.walk(&mut |e| {
        if found.is_none() && e.has_class(class) {
            found = Some(e);
        }
    });
    found
}

/// Resolve the page labels and leader dots of every entry of contents
/// block `block` placed on the pages. Returns the number of entries filled.
///
/// Entries whose target was never placed get an empty label.
pub fn fill_contents(
    pagination: &mut Pagination,
    block: &str,
    dot_gap: f32,
    metrics: &impl LeaderMetrics,
    width: f32,
) -> usize {
    let labels: Vec<String> = pagination.pages.iter().map(|p| p.label()).collect();
    let Pagination { pages, index } = pagination;
    let label_of = |id: &str| index.page_of(id).and_then(|p| labels.get(p)).cloned();

    let mut filled = 0;
    for page in pages.iter_mut() {
        for placed in page.main.blocks.iter_mut() {
            placed.element.walk_mut(&mut |element| {
                if element.has_class(CONTENTS_CLASS) && element.attr(BLOCK_ATTR) == Some(block) {
                    element.walk_mut(&mut |entry| {
                        if fill_entry(entry, &label_of, dot_gap, metrics, width) {
                            filled += 1;
                        }
                    });
                }
            });
        }
    }
    log::debug!("filled {} contents entries of block {}", filled, block);
    filled
}

fn fill_entry(
    entry: &mut Element,
    label_of: &impl Fn(&str) -> Option<String>,
    dot_gap: f32,
    metrics: &impl LeaderMetrics,
    width: f32,
) -> bool {
    if !entry.has_class(ENTRY_CLASS) {
        return false;
    }
    let Some(target) = entry.attr(TARGET_ATTR).map(str::to_string) else {
        return false;
    };
    let label = label_of(&target).unwrap_or_else(|| {
        log::warn!("contents entry for {} has no page", target);
        String::new()
    });

    entry.walk_mut(&mut |e| {
        if e.has_class(PAGE_CLASS) {
            e.children = vec![Node::text(label.as_str(), 0.0)];
        }
    });

    let dots = metrics
        .entry_geometry(entry, width)
        .map_or(0, |geometry| leader_dot_count(&geometry, dot_gap));

    entry.walk_mut(&mut |e| {
        if !e.has_class(TAIL_CLASS) {
            return;
        }
        e.children
            .retain(|c| !c.as_element().map_or(false, |d| d.has_class(DOT_CLASS)));
        let at = e
            .children
            .iter()
            .position(|c| c.as_element().map_or(false, |a| a.has_class(PAGE_CLASS)))
            .unwrap_or(e.children.len());
        let dot = Element::new()
            .with_class(DOT_CLASS)
            .with_attr("style", format!("width:{}em", dot_gap));
        let rest = e.children.split_off(at);
        e.children
            .extend(std::iter::repeat(Node::Element(dot)).take(dots));
        e.children.extend(rest);
    });
    true
}

/// Percent-encode like `encodeURIComponent`
fn encode_uri_component(value: &str) -> String {
    const KEEP: &[u8] = b"-_.!~*'()";
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || KEEP.contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::document::Orbit;
    use crate::layout::{paginate, StackMeasure};

    fn context() -> DocumentContext {
        DocumentContext::new(vec![
            IndexInfo::title("t", "Book"),
            IndexInfo::heading("intro", &[1], "Intro"),
            IndexInfo::heading("deep", &[1, 1, 1, 1], "Too deep"),
            IndexInfo::heading("a b", &[1, 2], "Spaced"),
            IndexInfo {
                orbit: Orbit::Other("figure".into()),
                ..IndexInfo::heading("fig", &[1], "Figure")
            },
        ])
    }

    #[test]
    fn test_collect_entries() {
        let contents = Contents::collect(&context(), &RawOptions::new());
        let targets: Vec<_> = contents.entries.iter().map(|e| e.target_id.as_str()).collect();
        assert_eq!(targets, vec!["intro", "a b"]);
        assert_eq!(contents.entries[1].index, "1.2");
        assert_eq!(contents.entries[1].level, 2);
        assert_eq!(contents.dot_gap, 1.0);
    }

    #[test]
    fn test_dot_gap_sources() {
        let mut context = context();
        context.add_global_options("contents", RawOptions::new().with("dot-gap", 3.0));
        context.add_global_options("contents", RawOptions::new().with("dot-gap", 2.0));
        assert_eq!(Contents::collect(&context, &RawOptions::new()).dot_gap, 2.0);

        let own = RawOptions::new().with("dot-gap", 0.5);
        assert_eq!(Contents::collect(&context, &own).dot_gap, 0.5);
    }

    #[test]
    fn test_render_entry() {
        let contents = Contents::collect(&context(), &RawOptions::new());
        let block = contents.render("0", &FontMetrics::default(), 200.0);
        assert!(block.has_class(BREAKABLE_CLASS));
        assert_eq!(block.break_points().len(), 2);

        let spaced = block.child_elements().nth(1).unwrap();
        assert!(spaced.has_class("level2"));
        assert_eq!(spaced.extent, 24.0);
        let anchor = find_class(spaced, PAGE_CLASS).unwrap();
        assert_eq!(anchor.attr("href"), Some("#a%20b"));
        assert_eq!(anchor.plain_text(), "");
    }

    #[test]
    fn test_leader_dot_count() {
        let geometry = EntryGeometry {
            entry: Rect::new(0.0, 0.0, 200.0, 48.0),
            label: Rect::new(192.0, 28.0, 8.0, 16.0),
            text_lines: vec![
                Rect::new(16.0, 0.0, 170.0, 24.0),
                Rect::new(16.0, 24.0, 40.0, 24.0),
            ],
            width_scale: 1.0 / 16.0,
        };
        // only the second line reaches the label: (192 - 56) / 16 = 8.5 em
        assert_eq!(leader_dot_count(&geometry, 1.0), 8);
        assert_eq!(leader_dot_count(&geometry, 2.0), 4);

        let unrendered = EntryGeometry {
            width_scale: f32::INFINITY,
            ..geometry.clone()
        };
        assert_eq!(leader_dot_count(&unrendered, 1.0), 0);

        let crowded = EntryGeometry {
            text_lines: vec![Rect::new(16.0, 24.0, 180.0, 24.0)],
            ..geometry
        };
        assert_eq!(leader_dot_count(&crowded, 1.0), 0);
    }

    #[test]
    fn test_font_geometry() {
        let metrics = FontLeaderMetrics::default();
        let entry = TocEntry {
            level: 1,
            index: "1".into(),
            text: "Intro".into(),
            target_id: "intro".into(),
        }
        .render(&metrics.font, 200.0);
        let mut entry = entry;
        entry.walk_mut(&mut |e| {
            if e.has_class(PAGE_CLASS) {
                e.children = vec![Node::text("3", 0.0)];
            }
        });

        let geometry = metrics.entry_geometry(&entry, 200.0).unwrap();
        assert_eq!(geometry.text_lines, vec![Rect::new(16.0, 0.0, 40.0, 24.0)]);
        assert_eq!(geometry.label, Rect::new(192.0, 4.0, 8.0, 16.0));
        // (192 - 56) / 16 = 8.5 em
        assert_eq!(leader_dot_count(&geometry, 1.0), 8);
    }

    #[test]
    fn test_fill_contents_after_pagination() {
        let context = context();
        let metrics = FontLeaderMetrics::default();
        let contents = Contents::collect(&context, &RawOptions::new());
        let heading = |id: &str| {
            Element::new().with_child(Element::new().with_id(id).with_child(Node::text(id, 10.0)))
        };
        let lines = vec![
            Element::new().with_child(contents.render("0", &metrics.font, 200.0)),
            heading("intro"),
            Element::new().with_child(Node::text("filler", 90.0)),
            heading("a b"),
        ];
        let config = PageConfig::resolve(
            &RawOptions::new()
                .with("size", "240px 140px")
                .with("margin", "20px"),
        );
        let mut pagination = paginate(&lines, &config, &context, StackMeasure);
        assert_eq!(pagination.pages.len(), 2);

        let filled = fill_contents(&mut pagination, "0", contents.dot_gap, &metrics, 200.0);
        assert_eq!(filled, 2);
        // a different block is left alone
        assert_eq!(fill_contents(&mut pagination, "1", 1.0, &metrics, 200.0), 0);

        let block = &pagination.pages[0].main.blocks[0].element;
        let labels: Vec<_> = {
            let mut labels = Vec::new();
            block.walk(&mut |e| {
                if e.has_class(PAGE_CLASS) {
                    labels.push(e.plain_text());
                }
            });
            labels
        };
        assert_eq!(labels, vec!["1", "2"]);

        let mut dots = 0;
        block.walk(&mut |e| dots += e.has_class(DOT_CLASS) as usize);
        assert!(dots > 0);

        // refilling replaces the dots instead of stacking them
        fill_contents(&mut pagination, "0", contents.dot_gap, &metrics, 200.0);
        let block = &pagination.pages[0].main.blocks[0].element;
        let mut again = 0;
        block.walk(&mut |e| again += e.has_class(DOT_CLASS) as usize);
        assert_eq!(again, dots);
    }

    #[test]
    fn test_unplaced_target_gets_empty_label() {
        let context = context();
        let metrics = FontLeaderMetrics::default();
        let contents = Contents::collect(&context, &RawOptions::new());
        let lines = vec![Element::new().with_child(contents.render("0", &metrics.font, 200.0))];
        let mut pagination =
            paginate(&lines, &PageConfig::default(), &context, StackMeasure);
        assert_eq!(fill_contents(&mut pagination, "0", 1.0, &metrics, 200.0), 2);

        let mut labels = Vec::new();
        pagination.pages[0].main.blocks[0].element.walk(&mut |e| {
            if e.has_class(PAGE_CLASS) {
                labels.push(e.plain_text());
            }
        });
        assert_eq!(labels, vec!["", ""]);
    }

    #[test]
    fn test_encode_uri_component() {
        assert_eq!(encode_uri_component("sec-1.2_(a)"), "sec-1.2_(a)");
        assert_eq!(encode_uri_component("a b/é"), "a%20b%2F%C3%A9");
    }
}
