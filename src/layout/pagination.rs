//! Derived indices over a finished page list

use crate::document::DocumentContext;
use crate::layout::page::Page;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Where each element and indexed unit ended up.
///
/// Positions are 0-based offsets into the page list, not page labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageIndex {
    /// Element id -> first page carrying it
    by_id: FxHashMap<String, usize>,
    /// Page of each indexed unit, aligned with `DocumentContext::infos`
    unit_page: Vec<Option<usize>>,
    /// Headings and titles starting on each page, as positions in
    /// `DocumentContext::infos`
    page_headings: Vec<Vec<usize>>,
}

impl PageIndex {
    pub fn build(pages: &[Page], context: &DocumentContext) -> Self {
        let mut by_id: FxHashMap<String, usize> = FxHashMap::default();
        for (position, page) in pages.iter().enumerate() {
            for block in &page.main.blocks {
                for id in block.element.ids() {
                    by_id.entry(id.to_string()).or_insert(position);
                }
            }
        }

        let unit_page: Vec<Option<usize>> = context
            .infos()
            .iter()
            .map(|info| by_id.get(info.id.as_str()).copied())
            .collect();

        let mut page_headings = vec![Vec::new(); pages.len()];
        for (i, info) in context.infos().iter().enumerate() {
            if !info.is_heading_or_title() {
                continue;
            }
            if let Some(position) = unit_page[i] {
                page_headings[position].push(i);
            }
        }

        Self {
            by_id,
            unit_page,
            page_headings,
        }
    }

    /// First page carrying the element `id`
    pub fn page_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Page of the `i`-th indexed unit
    pub fn unit_page(&self, i: usize) -> Option<usize> {
        self.unit_page.get(i).copied().flatten()
    }

    /// Number of indexed units covered by [`PageIndex::unit_page`]
    pub fn unit_count(&self) -> usize {
        self.unit_page.len()
    }

    /// Headings and titles that start on `page`
    pub fn headings_on(&self, page: usize) -> &[usize] {
        self.page_headings
            .get(page)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Result of one pagination run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pagination {
    pub pages: Vec<Page>,
    pub index: PageIndex,
}

impl Pagination {
    /// Displayed page number of the page carrying `id`
    pub fn label_of(&self, id: &str) -> Option<String> {
        let position = self.index.page_of(id)?;
        self.pages.get(position).map(Page::label)
    }
}
