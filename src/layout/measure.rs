//! Geometry adapter between the engine and the host's layout

use crate::document::{Element, Node};

/// Block-flow measurement of detached rendered content.
///
/// The engine asks for a fresh measurement every time it clips a line, so
/// implementations must not cache by element identity.
pub trait Measure {
    /// Vertical extent `element` occupies when appended to a main region
    fn block_extent(&self, element: &Element) -> f32;
}

/// Stacks extents: an element occupies its own extent plus the extents of
/// all its children.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackMeasure;

impl StackMeasure {
    fn node_extent(node: &Node) -> f32 {
        match node {
            Node::Text(run) => run.extent,
            Node::Element(element) => Self::element_extent(element),
        }
    }

    fn element_extent(element: &Element) -> f32 {
        element.extent + element.children.iter().map(Self::node_extent).sum::<f32>()
    }
}

impl Measure for StackMeasure {
    fn block_extent(&self, element: &Element) -> f32 {
        Self::element_extent(element)
    }
}

impl<M: Measure + ?Sized> Measure for &M {
    fn block_extent(&self, element: &Element) -> f32 {
        (**self).block_extent(element)
    }
}
