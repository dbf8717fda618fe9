//! Semantic units tracked by the document compiler

use crate::config::{OptionValue, RawOptions};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Section numbering path, e.g. `[2, 1, 3]`
pub type IndexPath = SmallVec<[u32; 4]>;

/// What kind of indexed entity a unit is
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Orbit {
    Heading,
    /// Footnotes, figures, equations...
    Other(String),
}

impl From<String> for Orbit {
    fn from(value: String) -> Self {
        if value == "heading" {
            Orbit::Heading
        } else {
            Orbit::Other(value)
        }
    }
}

impl From<Orbit> for String {
    fn from(orbit: Orbit) -> Self {
        match orbit {
            Orbit::Heading => "heading".to_string(),
            Orbit::Other(name) => name,
        }
    }
}

/// The source unit behind an index record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub tag: String,
    #[serde(default)]
    pub options: RawOptions,
    /// Plain-text rendering of each child line
    #[serde(default)]
    pub lines: Vec<String>,
}

impl Unit {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn with_option(mut self, key: &str, value: impl Into<OptionValue>) -> Self {
        self.options.set(key, value);
        self
    }

    /// The text a header or contents entry shows for this unit.
    ///
    /// A string `abbr` option is used verbatim; a fragment `abbr` and the
    /// unit's own children both contribute their first non-empty line.
    pub fn display_text(&self) -> String {
        match self.options.get("abbr") {
            Some(OptionValue::Str(abbr)) => abbr.clone(),
            Some(OptionValue::Fragment(lines)) => first_non_empty(lines),
            _ => self.text(),
        }
    }

    /// First non-empty line of the unit's own children
    pub fn text(&self) -> String {
        first_non_empty(&self.lines)
    }

    /// Target front page number of a `break` unit
    pub fn break_target(&self) -> Option<u32> {
        if self.tag != "break" {
            return None;
        }
        self.options
            .get("index")
            .and_then(OptionValue::as_level)
            .filter(|index| *index >= 1)
    }
}

fn first_non_empty(lines: &[String]) -> String {
    lines
        .iter()
        .find(|line| !line.is_empty())
        .cloned()
        .unwrap_or_default()
}

/// An indexed unit: a heading, title, footnote, ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    /// Id of the rendered element
    pub id: String,
    pub index: IndexPath,
    pub orbit: Orbit,
    pub unit: Unit,
}

impl IndexInfo {
    pub fn heading(id: impl Into<String>, index: &[u32], text: &str) -> Self {
        Self {
            id: id.into(),
            index: IndexPath::from_slice(index),
            orbit: Orbit::Heading,
            unit: Unit::new(format!("h{}", index.len())).with_line(text),
        }
    }

    pub fn title(id: impl Into<String>, text: &str) -> Self {
        Self {
            id: id.into(),
            index: IndexPath::new(),
            orbit: Orbit::Other("title".to_string()),
            unit: Unit::new("title").with_line(text),
        }
    }

    /// Section depth; titles and other non-headings sit at level 0
    pub fn level(&self) -> u32 {
        match self.orbit {
            Orbit::Heading => self.index.len() as u32,
            Orbit::Other(_) => 0,
        }
    }

    pub fn is_heading(&self) -> bool {
        self.orbit == Orbit::Heading
    }

    /// Headings and titles drive breaks and running headers
    pub fn is_heading_or_title(&self) -> bool {
        self.is_heading() || self.unit.tag == "title"
    }

    /// Dotted numbering, e.g. `2.1.3`
    pub fn index_label(&self) -> IndexLabel<'_> {
        IndexLabel(&self.index)
    }
}

/// Display adapter for an [`IndexPath`]
pub struct IndexLabel<'a>(&'a [u32]);

impl fmt::Display for IndexLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, n) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", n)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(IndexInfo::heading("a", &[2, 1], "x").level(), 2);
        assert_eq!(IndexInfo::title("t", "Book").level(), 0);
        assert!(IndexInfo::title("t", "Book").is_heading_or_title());

        let figure = IndexInfo {
            orbit: Orbit::Other("figure".into()),
            unit: Unit::new("figure"),
            ..IndexInfo::heading("f", &[1], "")
        };
        assert!(!figure.is_heading_or_title());
    }

    #[test]
    fn test_display_text() {
        let plain = Unit::new("h1").with_line("").with_line("Intro");
        assert_eq!(plain.display_text(), "Intro");

        let abbr = plain.clone().with_option("abbr", "Short");
        assert_eq!(abbr.display_text(), "Short");

        let fragment = plain.with_option(
            "abbr",
            OptionValue::Fragment(vec![String::new(), "Frag".into()]),
        );
        assert_eq!(fragment.display_text(), "Frag");
    }

    #[test]
    fn test_break_target() {
        let brk = Unit::new("break").with_option("index", 5.0);
        assert_eq!(brk.break_target(), Some(5));
        assert_eq!(Unit::new("break").with_option("index", 0.0).break_target(), None);
        assert_eq!(Unit::new("p").with_option("index", 5.0).break_target(), None);
    }

    #[test]
    fn test_index_label_and_orbit_json() {
        let info = IndexInfo::heading("a", &[2, 1, 3], "x");
        assert_eq!(info.index_label().to_string(), "2.1.3");

        let json = serde_json::to_string(&info.orbit).unwrap();
        assert_eq!(json, "\"heading\"");
        let orbit: Orbit = serde_json::from_str("\"footnote\"").unwrap();
        assert_eq!(orbit, Orbit::Other("footnote".into()));
    }
}
