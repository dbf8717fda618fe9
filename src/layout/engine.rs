//! Pagination engine: cuts a flat list of rendered lines into pages

use crate::config::PageConfig;
use crate::document::{DocumentContext, Element, Node, NodePath, BREAK_CLASS, RIGHT_CLASS};
use crate::layout::heading_index::HeadingIndex;
use crate::layout::measure::Measure;
use crate::layout::page::{LineSlice, Page};
use crate::layout::pagination::{PageIndex, Pagination};

/// Outcome of trying to place the rest of an atomic line on the current page
enum Placement {
    /// The remaining content is on the page
    Done,
    /// Continue from this segment on a new page
    Continue(usize),
}

/// One pagination run over a document.
///
/// The engine is single-use: every run starts from an empty page list and
/// rebuilds everything.
pub struct PaginationEngine<'a, M: Measure> {
    config: &'a PageConfig,
    context: &'a DocumentContext,
    measure: M,
    pages: Vec<Page>,
    /// Creation order of the current page
    sequence: usize,
    /// Displayed number of the current page
    front: u32,
    /// Current page has received visible content
    non_empty: bool,
    splits: usize,
}

impl<'a, M: Measure> PaginationEngine<'a, M> {
    pub fn new(config: &'a PageConfig, context: &'a DocumentContext, measure: M) -> Self {
        Self {
            config,
            context,
            measure,
            pages: Vec::new(),
            sequence: 0,
            front: 0,
            non_empty: false,
            splits: 0,
        }
    }

    /// Paginate `lines` and compute the derived page indices
    pub fn run(mut self, lines: &[Element]) -> Pagination {
        let headings = HeadingIndex::build(lines, self.context);
        self.new_page();

        for (position, line) in lines.iter().enumerate() {
            let level = headings.line_level(position);
            self.apply_breaks(line, level);

            if self.is_atomic(line) {
                self.place_atomic(position, line);
            } else {
                self.place_aggregate(position, line);
            }
        }

        log::debug!(
            "paginated {} lines into {} pages ({} interior splits)",
            lines.len(),
            self.pages.len(),
            self.splits
        );

        let index = PageIndex::build(&self.pages, self.context);
        Pagination {
            pages: self.pages,
            index,
        }
    }

    fn fits(&self, extent: f32) -> bool {
        self.pages.last().map_or(false, |page| page.main.fits(extent))
    }

    fn new_page(&mut self) {
        self.sequence += 1;
        self.front = self.front.saturating_add(1);
        self.pages
            .push(Page::create(self.sequence, self.front, self.config));
        self.non_empty = false;
    }

    /// Forced breaks from break markers, then level-triggered breaks
    fn apply_breaks(&mut self, line: &Element, level: Option<u32>) {
        let Some(first) = line.child_elements().next() else {
            return;
        };
        let levels = self.config.levels;
        let at_most = |limit: u32| level.map_or(false, |l| l <= limit);

        if first.has_class(BREAK_CLASS) {
            let wants_right = at_most(levels.right_level()) || first.has_class(RIGHT_CLASS);
            if wants_right && self.sequence % 2 == 1 {
                log::trace!("blank page {} before right-hand break", self.sequence + 1);
                self.new_page();
            }
            let target = first
                .id
                .as_deref()
                .and_then(|id| self.context.index_info(id))
                .and_then(|info| info.unit.break_target());
            if let Some(target) = target {
                self.front = target - 1;
            }
            self.new_page();
        } else if at_most(levels.break_level()) {
            if self.non_empty {
                self.new_page();
            }
            if at_most(levels.right_level()) && self.sequence % 2 == 0 {
                log::trace!("blank page {} before right-hand heading", self.sequence);
                self.new_page();
            }
        }
    }

    /// A line that wraps exactly one indexed unit is split at its break
    /// points instead of moving wholesale
    fn is_atomic(&self, line: &Element) -> bool {
        let [Node::Element(only)] = line.children.as_slice() else {
            return false;
        };
        only.id
            .as_deref()
            .map_or(false, |id| self.context.index_info(id).is_some())
    }

    fn commit(&mut self, slice: LineSlice, element: Element, extent: f32) {
        if extent > 0.0 && !element.is_empty() {
            self.non_empty = true;
        }
        if let Some(page) = self.pages.last_mut() {
            page.main.push(slice, element, extent);
        }
    }

    /// Aggregate lines move wholesale
    fn place_aggregate(&mut self, position: usize, line: &Element) {
        let extent = self.measure.block_extent(line);
        if self.non_empty && !self.fits(extent) {
            self.new_page();
        }
        self.commit(LineSlice::whole(position), line.clone(), extent);
    }

    fn place_atomic(&mut self, position: usize, line: &Element) {
        let points = line.break_points();
        let mut start = 0;
        while let Placement::Continue(next) = self.place_from(position, line, &points, start) {
            start = next;
            self.new_page();
        }
    }

    /// Place as much of `line` from segment `start` as fits on the current page
    fn place_from(
        &mut self,
        position: usize,
        line: &Element,
        points: &[NodePath],
        start: usize,
    ) -> Placement {
        let tail = line.clipped(start, None, points);
        let extent = self.measure.block_extent(&tail);
        let slice = LineSlice {
            line: position,
            start,
            end: None,
        };
        if self.fits(extent) {
            self.commit(slice, tail, extent);
            return Placement::Done;
        }

        if let Some((end, prefix, prefix_extent)) = self.largest_fitting_prefix(line, points, start) {
            self.splits += 1;
            log::trace!("line {} split at segment {} of {}", position, end, points.len());
            self.commit(
                LineSlice {
                    end: Some(end),
                    ..slice
                },
                prefix,
                prefix_extent,
            );
            return Placement::Continue(end);
        }

        if self.non_empty {
            return Placement::Continue(start);
        }

        log::warn!(
            "line {} overflows an empty page and has no break point left; placing it whole",
            position
        );
        self.commit(slice, tail, extent);
        Placement::Done
    }

    /// Binary search for the largest `end` in `(start, points.len()]` such
    /// that segments `[start, end)` fit. Assumes prefix extents grow with
    /// `end`.
    fn largest_fitting_prefix(
        &self,
        line: &Element,
        points: &[NodePath],
        start: usize,
    ) -> Option<(usize, Element, f32)> {
        let mut best: Option<(usize, Element, f32)> = None;
        let (mut lo, mut hi) = (start + 1, points.len());
        while lo <= hi {
            let mid = lo + (hi - lo) / 2;
            let prefix = line.clipped(start, Some(mid), points);
            let extent = self.measure.block_extent(&prefix);
            if self.fits(extent) {
                best = Some((mid, prefix, extent));
                lo = mid + 1;
            } else {
                hi = mid - 1;
            }
        }
        best
    }
}

/// Paginate `lines` in one run
pub fn paginate<M: Measure>(
    lines: &[Element],
    config: &PageConfig,
    context: &DocumentContext,
    measure: M,
) -> Pagination {
    PaginationEngine::new(config, context, measure).run(lines)
}
