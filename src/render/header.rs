//! Running headers

use crate::config::PageConfig;
use crate::document::{DocumentContext, IndexInfo};
use crate::layout::{PageHeader, PageSide, Pagination};

/// The heading currently in effect at each section level.
///
/// Level 0 holds the title. Pushing a heading clears every deeper level.
#[derive(Debug, Default)]
pub struct HeadingStack<'a> {
    slots: Vec<Option<&'a IndexInfo>>,
}

impl<'a> HeadingStack<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, info: &'a IndexInfo) {
        let level = info.level() as usize;
        if self.slots.len() <= level {
            self.slots.resize(level + 1, None);
        }
        self.slots.truncate(level + 1);
        self.slots[level] = Some(info);
    }

    pub fn get(&self, level: u32) -> Option<&'a IndexInfo> {
        self.slots.get(level as usize).copied().flatten()
    }
}

impl PageHeader {
    pub fn from_heading(info: &IndexInfo) -> Self {
        let index = if info.is_heading() {
            info.index_label().to_string()
        } else {
            String::new()
        };
        Self {
            index,
            content: info.unit.display_text(),
        }
    }
}

/// Fill every page's running header from the headings in effect on it.
///
/// Headings that start on a page are in effect on that same page.
pub fn fill_headers(pagination: &mut Pagination, config: &PageConfig, context: &DocumentContext) {
    let Pagination { pages, index } = pagination;
    let infos = context.infos();
    let mut stack = HeadingStack::new();

    for (position, page) in pages.iter_mut().enumerate() {
        for &i in index.headings_on(position) {
            if let Some(info) = infos.get(i) {
                stack.push(info);
            }
        }
        let level = match page.side {
            PageSide::Left => config.header_levels.left,
            PageSide::Right => config.header_levels.right,
        };
        page.header = match stack.get(level) {
            Some(info) => PageHeader::from_heading(info),
            None => {
                log::trace!("page {} has no level {} heading for its header", page.index, level);
                PageHeader::default()
            }
        };
    }
}
