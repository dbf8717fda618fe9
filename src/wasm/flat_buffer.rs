//! Flat buffer protocol for the page map
//!
//! The host keeps its rendered lines; it only needs to know which slice of
//! which line lands on which page, plus page furniture. That fits in flat
//! arrays JS can read straight out of linear memory.
//!
//! ## u32 Buffer Layout:
//! ```text
//! Header:
//! [0]     MAGIC (0x42504752 = "BPGR" for validation)
//! [1]     SCHEMA_VERSION (protocol version, currently 1)
//! [2]     run (pagination run counter)
//! [3]     page_count
//! [4]     text_buffer_len
//! [5]     flags: bit0=adjust, bit1=embedded style suppressed
//! [6]     u32_unit_offset (index where the unit table starts, 0 if empty)
//! [7]     unit_count
//! [8..]   page data...
//!
//! Per-page:
//!   [sequence_index, front_index, side, block_count,
//!    header_index_offset, header_index_len, header_index_utf16_offset, header_index_utf16_len,
//!    header_content_offset, header_content_len, header_content_utf16_offset, header_content_utf16_len]
//!   side: 0=left, 1=right
//!   per-block: [line, start, end]  (end = NO_END when the slice runs to the line's end)
//!
//! At u32_unit_offset:
//!   Per-unit: [page position] (NO_PAGE when never placed), unit_count times
//! ```
//!
//! ## f32 Buffer Layout:
//! ```text
//! Per-page: [width, height, main_height, main_used, content_left]
//! Per-block: [extent]
//! ```

use crate::layout::{Page, PageSide, PlacedBlock};
use crate::session::PagedDocument;

/// Magic number for format validation: "BPGR" (Book PaGeR)
pub const MAGIC: u32 = 0x42504752;

/// Schema version for protocol compatibility checking
pub const SCHEMA_VERSION: u32 = 1;

/// Header size in u32 elements
pub const HEADER_SIZE: usize = 8;

pub const FLAG_ADJUST: u32 = 0b01;
pub const FLAG_NO_STYLE: u32 = 0b10;

/// Marker for "slice runs to the end of the line"
pub const NO_END: u32 = u32::MAX;

/// Marker for "unit was never placed"
pub const NO_PAGE: u32 = u32::MAX;

/// u32 values per page record, before its blocks
pub const U32_PER_PAGE: usize = 12;

/// [line, start, end]
pub const U32_PER_BLOCK: usize = 3;

/// [width, height, main_height, main_used, content_left]
pub const F32_PER_PAGE: usize = 5;

/// [extent]
pub const F32_PER_BLOCK: usize = 1;

/// Page map buffer for zero-copy WASM transfer
#[derive(Debug)]
pub struct PageMapBuffer {
    /// Integer data (indices, counts, offsets)
    pub u32_data: Vec<u32>,
    /// Float data (dimensions, extents)
    pub f32_data: Vec<f32>,
    /// UTF-8 text of page headers
    pub text_data: Vec<u8>,

    // Unit table, written in finalize() so its offset is always past the pages
    pending_units: Vec<u32>,

    // Cumulative UTF-16 offset for JS substring decoding
    utf16_text_offset: usize,
}

impl Default for PageMapBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageMapBuffer {
    pub fn new() -> Self {
        Self {
            u32_data: Vec::with_capacity(256),
            f32_data: Vec::with_capacity(256),
            text_data: Vec::with_capacity(1024),
            pending_units: Vec::new(),
            utf16_text_offset: 0,
        }
    }

    pub fn clear(&mut self) {
        self.u32_data.clear();
        self.f32_data.clear();
        self.text_data.clear();
        self.pending_units.clear();
        self.utf16_text_offset = 0;
    }

    /// Pre-allocate so JS-held pointers stay valid while the buffer is
    /// written. Existing capacity is reused when large enough.
    pub fn prepare(&mut self, u32_needed: usize, f32_needed: usize, text_needed: usize) {
        let u32_target = u32_needed + 32;
        let f32_target = f32_needed + 32;
        let text_target = text_needed + 256;

        if self.u32_data.capacity() < u32_target {
            self.u32_data = Vec::with_capacity(u32_target);
        } else {
            self.u32_data.clear();
        }
        if self.f32_data.capacity() < f32_target {
            self.f32_data = Vec::with_capacity(f32_target);
        } else {
            self.f32_data.clear();
        }
        if self.text_data.capacity() < text_target {
            self.text_data = Vec::with_capacity(text_target);
        } else {
            self.text_data.clear();
        }
        self.pending_units.clear();
        self.utf16_text_offset = 0;
    }

    pub fn write_header(&mut self, run: u32, page_count: u32, flags: u32) {
        self.u32_data.push(MAGIC); // [0]
        self.u32_data.push(SCHEMA_VERSION); // [1]
        self.u32_data.push(run); // [2]
        self.u32_data.push(page_count); // [3]
        self.u32_data.push(0); // [4] text_buffer_len (placeholder)
        self.u32_data.push(flags); // [5]
        self.u32_data.push(0); // [6] u32_unit_offset (placeholder)
        self.u32_data.push(0); // [7] unit_count (placeholder)
    }

    /// Write a page record, returns the index where its block count goes
    pub fn begin_page(&mut self, page: &Page) -> usize {
        self.u32_data.push(page.index as u32);
        self.u32_data.push(page.front_index);
        self.u32_data.push(match page.side {
            PageSide::Left => 0,
            PageSide::Right => 1,
        });
        let block_count_idx = self.u32_data.len();
        self.u32_data.push(0);

        let index = self.push_text(&page.header.index);
        self.u32_data.extend_from_slice(&index);
        let content = self.push_text(&page.header.content);
        self.u32_data.extend_from_slice(&content);

        self.f32_data.push(page.size.width);
        self.f32_data.push(page.size.height);
        self.f32_data.push(page.main.height);
        self.f32_data.push(page.main.used);
        self.f32_data.push(page.content_left);

        block_count_idx
    }

    pub fn set_block_count(&mut self, idx: usize, count: u32) {
        if idx < self.u32_data.len() {
            self.u32_data[idx] = count;
        }
    }

    pub fn write_block(&mut self, block: &PlacedBlock) {
        self.u32_data.push(block.slice.line as u32);
        self.u32_data.push(block.slice.start as u32);
        self.u32_data.push(block.slice.end.map_or(NO_END, |end| end as u32));
        self.f32_data.push(block.extent);
    }

    /// Set the unit table (written in finalize())
    pub fn write_unit_pages(&mut self, pages: impl IntoIterator<Item = Option<usize>>) {
        self.pending_units = pages
            .into_iter()
            .map(|page| page.map_or(NO_PAGE, |p| p as u32))
            .collect();
    }

    /// Write the unit table and synchronize the header.
    /// Must be called after all pages are written.
    pub fn finalize(&mut self) {
        if self.u32_data.len() < HEADER_SIZE {
            return;
        }
        if self.pending_units.is_empty() {
            self.u32_data[6] = 0;
            self.u32_data[7] = 0;
        } else {
            self.u32_data[6] = self.u32_data.len() as u32;
            self.u32_data[7] = self.pending_units.len() as u32;
            self.u32_data.extend_from_slice(&self.pending_units);
        }
        self.u32_data[4] = self.text_data.len() as u32;
    }

    /// Encode a finished document
    pub fn from_document(document: &PagedDocument, run: u32) -> Self {
        let mut buffer = Self::new();
        buffer.encode(document, run);
        buffer
    }

    /// Re-encode into this buffer, reusing its allocations
    pub fn encode(&mut self, document: &PagedDocument, run: u32) {
        let blocks: usize = document.pages.iter().map(|p| p.main.blocks.len()).sum();
        let units = document.index.unit_count();
        let text: usize = document
            .pages
            .iter()
            .map(|p| p.header.index.len() + p.header.content.len())
            .sum();
        self.prepare(
            HEADER_SIZE + document.pages.len() * U32_PER_PAGE + blocks * U32_PER_BLOCK + units,
            document.pages.len() * F32_PER_PAGE + blocks * F32_PER_BLOCK,
            text,
        );

        let mut flags = 0;
        if document.adjust {
            flags |= FLAG_ADJUST;
        }
        if document.style.is_none() {
            flags |= FLAG_NO_STYLE;
        }
        self.write_header(run, document.pages.len() as u32, flags);

        for page in &document.pages {
            let idx = self.begin_page(page);
            for block in &page.main.blocks {
                self.write_block(block);
            }
            self.set_block_count(idx, page.main.blocks.len() as u32);
        }
        self.write_unit_pages((0..units).map(|i| document.index.unit_page(i)));
        self.finalize();
    }

    /// Append `text`, returning [offset, len, utf16_offset, utf16_len]
    fn push_text(&mut self, text: &str) -> [u32; 4] {
        let offset = self.text_data.len() as u32;
        self.text_data.extend_from_slice(text.as_bytes());
        let utf16_offset = self.utf16_text_offset as u32;
        let utf16_len = text.encode_utf16().count();
        self.utf16_text_offset += utf16_len;
        [offset, text.len() as u32, utf16_offset, utf16_len as u32]
    }

    // Accessors for WASM
    // u32 rather than usize: wasm32 linear memory uses u32 offsets

    pub fn u32_ptr(&self) -> u32 {
        self.u32_data.as_ptr() as u32
    }

    pub fn u32_len(&self) -> u32 {
        self.u32_data.len() as u32
    }

    pub fn f32_ptr(&self) -> u32 {
        self.f32_data.as_ptr() as u32
    }

    pub fn f32_len(&self) -> u32 {
        self.f32_data.len() as u32
    }

    pub fn text_ptr(&self) -> u32 {
        self.text_data.as_ptr() as u32
    }

    pub fn text_len(&self) -> u32 {
        self.text_data.len() as u32
    }
}
