//! Core data types for the structurer.
//!
//! Layout primitives come in from the external extractor; divisions, content
//! units and paragraphs are produced by the pipeline stages and live for one
//! extraction run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::numbering::NormalizedNumber;
use crate::validation::QualityRecord;

/// One positioned line produced by the page-layout extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutLine {
    /// Line text.
    pub text: String,

    /// Horizontal start of the line, in points.
    pub x: f32,

    /// Vertical position of the line on its page, in points (grows downwards).
    pub y: f32,

    /// 1-based page number.
    pub page: u32,

    #[serde(default)]
    pub is_bold: bool,

    #[serde(default)]
    pub is_italic: bool,
}

impl LayoutLine {
    /// Create a new regular-weight line.
    #[must_use]
    pub fn new(text: impl Into<String>, x: f32, y: f32, page: u32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            page,
            is_bold: false,
            is_italic: false,
        }
    }

    /// Mark the line as bold.
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.is_bold = true;
        self
    }

    /// Copy of this line carrying different text (same geometry).
    #[must_use]
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}

/// Outline (table of contents) entry from the layout source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub title_text: String,
    pub page: u32,
}

/// Everything the layout source yields for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    #[serde(default)]
    pub lines: Vec<LayoutLine>,

    #[serde(default)]
    pub outline: Vec<OutlineEntry>,
}

impl LayoutDocument {
    /// Create a document from lines only.
    #[must_use]
    pub fn from_lines(lines: Vec<LayoutLine>) -> Self {
        Self {
            lines,
            outline: Vec::new(),
        }
    }
}

/// Position in document order: page, then offset in the filtered line stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub page: u32,
    pub offset: usize,
}

impl Position {
    #[must_use]
    pub fn new(page: u32, offset: usize) -> Self {
        Self { page, offset }
    }
}

/// Kinds of structural divisions, shallowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivisionKind {
    Title,
    Chapter,
    Section,
}

impl DivisionKind {
    /// All kinds, shallowest first.
    pub const ALL: [DivisionKind; 3] = [Self::Title, Self::Chapter, Self::Section];

    /// Nesting depth (0 = title).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Title => 0,
            Self::Chapter => 1,
            Self::Section => 2,
        }
    }

    /// Get the string value used in output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Chapter => "chapter",
            Self::Section => "section",
        }
    }
}

/// A structural grouping node (title, chapter, section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub kind: DivisionKind,

    /// Number as written in the header ("PRIMERO", "IV", "3").
    pub number: String,

    /// Integer value of `number`, 0 when unknown.
    pub ordinal_value: u32,

    /// Header text as it appeared ("CAPÍTULO IV").
    pub display_name: String,

    /// Human-readable name, usually found on the line after the header.
    pub name: Option<String>,

    /// Index in the tree's declaration order; doubles as the reference key.
    pub declared_order: usize,

    /// `declared_order` of the parent division.
    pub parent_ref: Option<usize>,

    pub position: Position,

    /// True for implicit preliminary titles and sole chapters.
    pub synthetic: bool,
}

/// Kind of content unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    #[serde(rename = "article")]
    Article,
    #[serde(rename = "rule")]
    Rule,
    /// Placeholder for a confirmed numbering gap.
    #[serde(rename = "non-existent")]
    NonExistent,
}

impl UnitKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Rule => "rule",
            Self::NonExistent => "non-existent",
        }
    }

    /// Parse a configured content-unit kind label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "article" | "articulo" | "artículo" => Some(Self::Article),
            "rule" | "regla" => Some(Self::Rule),
            _ => None,
        }
    }
}

/// Trailing citation noting when and how a provision was amended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReformAnnotation {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Kind of paragraph inside a content unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphKind {
    Text,
    /// Roman-numeral fraction ("I.", "II.").
    Fraction,
    /// Lettered sub-item ("a)", "b)").
    SubItem,
    /// Numbered item ("1.", "2.").
    NumberedItem,
}

impl ParagraphKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Fraction => "fraction",
            Self::SubItem => "sub_item",
            Self::NumberedItem => "numbered_item",
        }
    }
}

/// A node inside a content unit's body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Emission order inside the unit; doubles as the reference key.
    pub order: usize,
    pub kind: ParagraphKind,
    /// Marker without punctuation ("IV", "b", "3").
    pub identifier: Option<String>,
    pub content: String,
    pub x_position: f32,
    /// `order` of the parent paragraph.
    pub parent_paragraph_ref: Option<usize>,
}

/// An atomic legal provision (article or rule).
#[derive(Debug, Clone, PartialEq)]
pub struct ContentUnit {
    pub kind: UnitKind,

    /// Canonical number; unique within a document.
    pub raw_number: String,

    pub base_number: u32,

    /// Dotted prefix for hierarchical numbering.
    pub number_prefix: Option<String>,

    /// Combined letter and Latin suffix.
    pub suffix: Option<String>,

    pub ordinal_marker: bool,

    /// Heading captured on the header line, if the document type has one.
    pub heading: Option<String>,

    pub body_text: String,

    /// Positioned lines backing `body_text`, used for paragraph resolution.
    pub body_lines: Vec<LayoutLine>,

    pub trailing_annotations: Vec<ReformAnnotation>,

    pub is_transitional: bool,

    pub page: u32,

    pub position: Position,

    pub declared_order: usize,

    /// `declared_order` of the owning division; set by the assignment resolver.
    pub division_ref: Option<usize>,

    pub paragraphs: Vec<Paragraph>,

    pub quality: QualityRecord,
}

impl ContentUnit {
    /// Create a unit from a normalized number. Body and bookkeeping start empty.
    #[must_use]
    pub fn new(kind: UnitKind, number: &NormalizedNumber, is_transitional: bool, position: Position) -> Self {
        let canonical = number.canonical();
        let raw_number = if is_transitional {
            format!("T-{canonical}")
        } else {
            canonical
        };
        Self {
            kind,
            raw_number,
            base_number: number.base,
            number_prefix: number.prefix.clone(),
            suffix: number.suffix(),
            ordinal_marker: number.ordinal_marker,
            heading: None,
            body_text: String::new(),
            body_lines: Vec::new(),
            trailing_annotations: Vec::new(),
            is_transitional,
            page: position.page,
            position,
            declared_order: 0,
            division_ref: None,
            paragraphs: Vec::new(),
            quality: QualityRecord::default(),
        }
    }

    /// Create a placeholder for a confirmed numbering gap.
    #[must_use]
    pub fn placeholder(number: &NormalizedNumber, label: &str, division_ref: usize, position: Position) -> Self {
        let mut unit = Self::new(UnitKind::NonExistent, number, false, position);
        unit.body_text = format!(
            "{label} {} does not appear in the source document.",
            unit.raw_number
        );
        unit.division_ref = Some(division_ref);
        unit
    }

    /// Whether this unit takes part in numbering checks.
    #[must_use]
    pub fn is_sequenced(&self) -> bool {
        !self.is_transitional && self.kind != UnitKind::NonExistent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numbering::normalize_number;

    #[test]
    fn test_layout_line_deserialize_defaults() {
        let line: LayoutLine =
            serde_json::from_str(r#"{"text":"Artículo 1.","x":85.0,"y":120.5,"page":1}"#).unwrap();
        assert_eq!(line.text, "Artículo 1.");
        assert!(!line.is_bold);
        assert!(!line.is_italic);
    }

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 40) < Position::new(2, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
    }

    #[test]
    fn test_division_kind_depth_order() {
        assert!(DivisionKind::Title < DivisionKind::Chapter);
        assert_eq!(DivisionKind::Section.depth(), 2);
        assert_eq!(serde_json::to_string(&DivisionKind::Chapter).unwrap(), "\"chapter\"");
    }

    #[test]
    fn test_unit_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&UnitKind::NonExistent).unwrap(),
            "\"non-existent\""
        );
        assert_eq!(UnitKind::from_label("Artículo"), Some(UnitKind::Article));
        assert_eq!(UnitKind::from_label("regla"), Some(UnitKind::Rule));
        assert_eq!(UnitKind::from_label("chapter"), None);
    }

    #[test]
    fn test_content_unit_new() {
        let number = normalize_number("84-E").unwrap();
        let unit = ContentUnit::new(UnitKind::Article, &number, false, Position::new(3, 10));
        assert_eq!(unit.raw_number, "84-E");
        assert_eq!(unit.base_number, 84);
        assert_eq!(unit.suffix.as_deref(), Some("E"));
        assert_eq!(unit.page, 3);
        assert!(unit.division_ref.is_none());
    }

    #[test]
    fn test_transitional_unit_gets_prefix() {
        let number = normalize_number("Primero").unwrap();
        let unit = ContentUnit::new(UnitKind::Article, &number, true, Position::default());
        assert_eq!(unit.raw_number, "T-PRIMERO");
        assert!(!unit.is_sequenced());
    }

    #[test]
    fn test_placeholder() {
        let unit = ContentUnit::placeholder(
            &NormalizedNumber::plain(3),
            "Article",
            2,
            Position::new(1, 5),
        );
        assert_eq!(unit.kind, UnitKind::NonExistent);
        assert_eq!(unit.division_ref, Some(2));
        assert!(unit.body_text.contains("Article 3"));
        assert!(!unit.is_sequenced());
    }
}
