//! Rendered node tree
//!
//! A line is the root [`Element`] of one top-level rendered block. Leaves
//! carry the box extent the host measured for them, so the tree can be
//! re-measured after clipping without going back to the host.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Class marking an element whose element children are break points
pub const BREAKABLE_CLASS: &str = "breakable";

/// Class of an explicit page-break marker
pub const BREAK_CLASS: &str = "break";

/// Class forcing a page-break marker onto a right-hand page
pub const RIGHT_CLASS: &str = "right";

/// Child-index path from a line root to one of its descendants
pub type NodePath = SmallVec<[usize; 4]>;

/// A rendered node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Element(Element),
    Text(TextRun),
}

/// A text leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    /// Block extent contributed by this leaf
    #[serde(default)]
    pub extent: f32,
}

/// A rendered element
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Element {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub classes: SmallVec<[String; 2]>,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub attrs: SmallVec<[(String, String); 1]>,
    /// Own block extent (padding, borders, replaced content)
    #[serde(default)]
    pub extent: f32,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    pub fn text(text: impl Into<String>, extent: f32) -> Self {
        Node::Text(TextRun {
            text: text.into(),
            extent,
        })
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(run) => out.push_str(&run.text),
            Node::Element(e) => e.children.iter().for_each(|c| c.collect_text(out)),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_extent(mut self, extent: f32) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Element children, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// True if this element has no child nodes at all
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Concatenated text content
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// Visit this element and every descendant element in document order
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        visit(self);
        for child in self.child_elements() {
            child.walk(visit);
        }
    }

    /// Mutable variant of [`Element::walk`]
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Element)) {
        visit(self);
        for child in self.children.iter_mut().filter_map(Node::as_element_mut) {
            child.walk_mut(visit);
        }
    }

    /// Ids of this element and its descendants, in document order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.walk(&mut |e| {
            if let Some(id) = e.id.as_deref() {
                ids.push(id);
            }
        });
        ids
    }

    pub fn contains_id(&self, id: &str) -> bool {
        let mut found = false;
        self.walk(&mut |e| found |= e.id.as_deref() == Some(id));
        found
    }

    /// Paths of the break points below this element, in document order.
    ///
    /// A break point is an element child of an element with the
    /// `breakable` class.
    pub fn break_points(&self) -> Vec<NodePath> {
        fn visit(element: &Element, path: &mut NodePath, out: &mut Vec<NodePath>) {
            let breakable = element.has_class(BREAKABLE_CLASS);
            for (i, child) in element.children.iter().enumerate() {
                let Node::Element(child) = child else {
                    continue;
                };
                path.push(i);
                if breakable {
                    out.push(path.clone());
                }
                visit(child, path, out);
                path.pop();
            }
        }

        let mut out = Vec::new();
        visit(self, &mut NodePath::new(), &mut out);
        out
    }

    /// Keep only the content between break points `start` and `end`.
    ///
    /// Segment `i` ends with break point `i - 1` (zero-based), so the kept
    /// range drops everything up to and including break point `start - 1`
    /// and everything after break point `end - 1`. `start == 0` keeps the
    /// head, `end == None` keeps the tail. Ancestors of the boundary points
    /// are kept as (clipped) containers.
    pub fn clip(&mut self, start: usize, end: Option<usize>, points: &[NodePath]) {
        let after = start.checked_sub(1).and_then(|i| points.get(i));
        let through = end.and_then(|e| e.checked_sub(1)).and_then(|i| points.get(i));
        if after.is_none() && through.is_none() {
            return;
        }
        splice(
            &mut self.children,
            after.map(|p| p.as_slice()),
            through.map(|p| p.as_slice()),
        );
    }

    /// Clone of this element clipped to `[start, end)`
    pub fn clipped(&self, start: usize, end: Option<usize>, points: &[NodePath]) -> Element {
        let mut copy = self.clone();
        copy.clip(start, end, points);
        copy
    }
}

/// Detach everything up to and including `after`, and everything past
/// `through`, from `children`. Both paths are relative to `children`.
fn splice(children: &mut Vec<Node>, after: Option<&[usize]>, through: Option<&[usize]>) {
    let lo = after.and_then(|p| p.split_first());
    let hi = through.and_then(|p| p.split_first());

    if let Some((&index, rest)) = hi {
        children.truncate(index + 1);
        if !rest.is_empty() {
            let inner_after = match lo {
                Some((&lo_index, lo_rest)) if lo_index == index && !lo_rest.is_empty() => {
                    Some(lo_rest)
                }
                _ => None,
            };
            if let Some(Node::Element(child)) = children.get_mut(index) {
                splice(&mut child.children, inner_after, Some(rest));
            }
        }
    }

    if let Some((&index, rest)) = lo {
        if rest.is_empty() {
            let upto = (index + 1).min(children.len());
            children.drain(..upto);
            return;
        }
        let hi_same = matches!(hi, Some((&hi_index, hi_rest)) if hi_index == index && !hi_rest.is_empty());
        if !hi_same {
            if let Some(Node::Element(child)) = children.get_mut(index) {
                splice(&mut child.children, Some(rest), None);
            }
        }
        children.drain(..index.min(children.len()));
    }
}
