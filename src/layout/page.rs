//! Page containers

use crate::config::{resolve_px, CssLength, PageConfig, Size};
use crate::document::Element;
use serde::Serialize;

/// Tolerance for accumulated float error in fit tests
const FIT_EPSILON: f32 = 0.01;

/// Which side of a spread a page lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSide {
    /// Verso: even sequence index
    Left,
    /// Recto: odd sequence index
    Right,
}

impl PageSide {
    pub fn of(sequence: usize) -> Self {
        if sequence % 2 == 0 {
            PageSide::Left
        } else {
            PageSide::Right
        }
    }
}

/// Running header of one page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageHeader {
    /// Dotted section number, empty for titles
    pub index: String,
    pub content: String,
}

/// Which slice of a source line a placed block holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineSlice {
    /// Position of the source line
    pub line: usize,
    /// First break-point segment
    pub start: usize,
    /// End segment (exclusive); `None` runs to the end of the line
    pub end: Option<usize>,
}

impl LineSlice {
    pub fn whole(line: usize) -> Self {
        Self {
            line,
            start: 0,
            end: None,
        }
    }

}

/// A block committed to a page's main region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedBlock {
    pub slice: LineSlice,
    pub element: Element,
    pub extent: f32,
}

/// Main content region: a fixed-height block flow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainRegion {
    pub height: f32,
    pub used: f32,
    pub blocks: Vec<PlacedBlock>,
}

impl MainRegion {
    fn new(height: f32) -> Self {
        Self {
            height,
            used: 0.0,
            blocks: Vec::new(),
        }
    }

    /// Would a block of `extent` end above the bottom of the region
    pub fn fits(&self, extent: f32) -> bool {
        self.used + extent <= self.height + FIT_EPSILON
    }

    pub fn push(&mut self, slice: LineSlice, element: Element, extent: f32) {
        self.used += extent;
        self.blocks.push(PlacedBlock {
            slice,
            element,
            extent,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// True if content runs past the bottom of the region
    pub fn overflows(&self) -> bool {
        !self.fits(0.0)
    }
}

/// One page: header, main region and footer on a fixed canvas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// Creation order, starting at 1
    pub index: usize,
    /// Displayed page number
    pub front_index: u32,
    pub side: PageSide,
    pub size: Size,
    pub margin_top: CssLength,
    pub margin_bottom: CssLength,
    /// Left margin as laid out, after mirroring for the binding
    pub margin_left: CssLength,
    pub margin_right: CssLength,
    /// Horizontal offset of the main region in pixels
    pub content_left: f32,
    pub header: PageHeader,
    pub main: MainRegion,
}

impl Page {
    /// Build an empty page.
    ///
    /// Left pages take the configured right margin on the outside and the
    /// left margin plus binding on the spine side; right pages mirror that.
    pub fn create(index: usize, front_index: u32, config: &PageConfig) -> Self {
        let side = PageSide::of(index);
        let outer = config.margin.right.clone();
        let inner = CssLength::new(format!(
            "calc({} + {})",
            config.margin.left, config.binding
        ));
        let outer_px = resolve_px(&config.margin.right, "0px");
        let inner_px = resolve_px(&config.margin.left, "0px") + resolve_px(&config.binding, "0px");
        let (margin_left, margin_right, content_left) = match side {
            PageSide::Left => (outer, inner, outer_px),
            PageSide::Right => (inner, outer, inner_px),
        };

        Self {
            index,
            front_index,
            side,
            size: config.size,
            margin_top: config.margin.top.clone(),
            margin_bottom: config.margin.bottom.clone(),
            margin_left,
            margin_right,
            content_left,
            header: PageHeader::default(),
            main: MainRegion::new(config.main_height()),
        }
    }

    /// Visible page label shown in the footer
    pub fn label(&self) -> String {
        self.front_index.to_string()
    }
}
