//! Document side of the host contract: rendered lines and the unit index

mod node;
mod unit;

pub use node::{
    Element, Node, NodePath, TextRun, BREAKABLE_CLASS, BREAK_CLASS, RIGHT_CLASS,
};
pub use unit::{IndexInfo, IndexLabel, IndexPath, Orbit, Unit};

use crate::config::{OptionValue, RawOptions};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Everything the compiler knows about one document.
///
/// Owned by the host; pagination only reads it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "DocumentSource")]
pub struct DocumentContext {
    /// All indexed units in document order
    infos: Vec<IndexInfo>,
    /// Rendered element id -> position in `infos`
    by_id: FxHashMap<String, usize>,
    /// Global options per unit tag, in declaration order
    global_options: FxHashMap<String, Vec<RawOptions>>,
    /// Rendering inside an embedding host (shadow root)
    embedded: bool,
}

/// Wire form of a [`DocumentContext`]
#[derive(Debug, Default, Deserialize)]
struct DocumentSource {
    #[serde(default)]
    infos: Vec<IndexInfo>,
    #[serde(default)]
    global_options: FxHashMap<String, Vec<RawOptions>>,
    #[serde(default)]
    embedded: bool,
}

impl From<DocumentSource> for DocumentContext {
    fn from(source: DocumentSource) -> Self {
        let mut context = DocumentContext::new(source.infos);
        context.global_options = source.global_options;
        context.embedded = source.embedded;
        context
    }
}

impl Serialize for DocumentContext {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("DocumentContext", 3)?;
        state.serialize_field("infos", &self.infos)?;
        state.serialize_field("global_options", &self.global_options)?;
        state.serialize_field("embedded", &self.embedded)?;
        state.end()
    }
}

impl DocumentContext {
    pub fn new(infos: Vec<IndexInfo>) -> Self {
        let by_id = infos
            .iter()
            .enumerate()
            .map(|(i, info)| (info.id.clone(), i))
            .collect();
        Self {
            infos,
            by_id,
            global_options: FxHashMap::default(),
            embedded: false,
        }
    }

    pub fn embedded(mut self, embedded: bool) -> Self {
        self.embedded = embedded;
        self
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// Register global options declared for units with `tag`
    pub fn add_global_options(&mut self, tag: impl Into<String>, options: RawOptions) {
        self.global_options.entry(tag.into()).or_default().push(options);
    }

    /// Last global value of `key` declared for `tag`
    pub fn last_global_option(&self, key: &str, tag: &str) -> Option<&OptionValue> {
        self.global_options
            .get(tag)?
            .iter()
            .rev()
            .find_map(|options| options.get(key))
    }

    pub fn infos(&self) -> &[IndexInfo] {
        &self.infos
    }

    /// Index record behind a rendered element id
    pub fn index_info(&self, id: &str) -> Option<&IndexInfo> {
        self.by_id.get(id).and_then(|&i| self.infos.get(i))
    }

    /// Headings and titles, in document order
    pub fn headings(&self) -> impl Iterator<Item = &IndexInfo> {
        self.infos.iter().filter(|info| info.is_heading_or_title())
    }
}
