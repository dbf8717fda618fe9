//! Which headings are anchored at which line

use crate::document::{DocumentContext, Element, IndexInfo};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Headings and titles bucketed by the line that renders them.
///
/// Built once per pagination run; a heading belongs to the first line whose
/// subtree carries its id.
#[derive(Debug, Default)]
pub struct HeadingIndex<'a> {
    by_line: Vec<SmallVec<[&'a IndexInfo; 1]>>,
}

impl<'a> HeadingIndex<'a> {
    pub fn build(lines: &[Element], context: &'a DocumentContext) -> Self {
        let mut line_of: FxHashMap<&str, usize> = FxHashMap::default();
        for (position, line) in lines.iter().enumerate() {
            for id in line.ids() {
                line_of.entry(id).or_insert(position);
            }
        }

        let mut by_line = vec![SmallVec::new(); lines.len()];
        for heading in context.headings() {
            if let Some(&position) = line_of.get(heading.id.as_str()) {
                by_line[position].push(heading);
            }
        }
        Self { by_line }
    }

    /// Headings anchored at `line`, in document order
    pub fn at(&self, line: usize) -> &[&'a IndexInfo] {
        self.by_line.get(line).map(|h| h.as_slice()).unwrap_or(&[])
    }

    /// Shallowest heading level anchored at `line`; `None` if the line
    /// anchors no heading and so never forces a break by itself.
    pub fn line_level(&self, line: usize) -> Option<u32> {
        self.at(line).iter().map(|info| info.level()).min()
    }
}
