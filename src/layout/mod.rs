//! Pagination of rendered lines into fixed-size pages

mod engine;
pub mod font;
mod heading_index;
mod measure;
mod page;
mod pagination;

pub use engine::{paginate, PaginationEngine};
pub use font::FontMetrics;
pub use heading_index::HeadingIndex;
pub use measure::{Measure, StackMeasure};
pub use page::{LineSlice, MainRegion, Page, PageHeader, PageSide, PlacedBlock};
pub use pagination::{PageIndex, Pagination};
