//! Serialized shapes of the structure, content and quality outputs.
//!
//! The structure and content halves join on `division_order`/`order`; content
//! and quality join on the normalized unit number.

use serde::{Deserialize, Serialize};

use crate::gaps::PossibleParseError;
use crate::pipeline::StructuredDocument;
use crate::types::{
    ContentUnit, Division, DivisionKind, Paragraph, ParagraphKind, ReformAnnotation, UnitKind,
};
use crate::validation::{
    ProblemKind, QualityIssue, QualityStatus, Resolution, Severity, ValidationState,
};

/// One division in the structure tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureEntry {
    pub kind: DivisionKind,
    pub number: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_order: Option<usize>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub synthetic: bool,
}

impl From<&Division> for StructureEntry {
    fn from(division: &Division) -> Self {
        Self {
            kind: division.kind,
            number: division.number.clone(),
            display_name: division.display_name.clone(),
            name: division.name.clone(),
            order: division.declared_order,
            parent_order: division.parent_ref,
            synthetic: division.synthetic,
        }
    }
}

/// One paragraph of a content unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphEntry {
    pub order: usize,
    pub kind: ParagraphKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_order: Option<usize>,
}

impl From<&Paragraph> for ParagraphEntry {
    fn from(paragraph: &Paragraph) -> Self {
        Self {
            order: paragraph.order,
            kind: paragraph.kind,
            identifier: paragraph.identifier.clone(),
            content: paragraph.content.clone(),
            parent_order: paragraph.parent_paragraph_ref,
        }
    }
}

/// One content unit with its paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub number: String,
    pub kind: UnitKind,
    pub order: usize,
    pub page: u32,
    /// Order of the owning division in the structure output.
    pub division_order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub transitional: bool,
    /// Explanation carried by placeholder units instead of paragraphs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<ReformAnnotation>,
    #[serde(default)]
    pub paragraphs: Vec<ParagraphEntry>,
}

impl ContentEntry {
    fn from_unit(unit: &ContentUnit) -> Self {
        let text = (unit.kind == UnitKind::NonExistent).then(|| unit.body_text.clone());
        Self {
            number: unit.raw_number.clone(),
            kind: unit.kind,
            order: unit.declared_order,
            page: unit.page,
            // Assignment is verified before output; 0 only for a detached unit.
            division_order: unit.division_ref.unwrap_or_default(),
            heading: unit.heading.clone(),
            transitional: unit.is_transitional,
            text,
            annotations: unit.trailing_annotations.clone(),
            paragraphs: unit.paragraphs.iter().map(ParagraphEntry::from).collect(),
        }
    }
}

/// One recorded problem and its resolution attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueEntry {
    pub kind: ProblemKind,
    pub description: String,
    pub severity: Severity,
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolutions: Vec<Resolution>,
}

impl From<&QualityIssue> for IssueEntry {
    fn from(issue: &QualityIssue) -> Self {
        Self {
            kind: issue.problem.kind,
            description: issue.problem.description.clone(),
            severity: issue.problem.severity,
            resolved: issue.resolved(),
            resolutions: issue.resolutions.clone(),
        }
    }
}

/// Quality record of one content unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityEntry {
    pub number: String,
    pub status: QualityStatus,
    pub state: ValidationState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<IssueEntry>,
}

impl From<&ContentUnit> for QualityEntry {
    fn from(unit: &ContentUnit) -> Self {
        Self {
            number: unit.raw_number.clone(),
            status: unit.quality.status,
            state: unit.quality.state,
            issues: unit.quality.issues.iter().map(IssueEntry::from).collect(),
        }
    }
}

/// The full serialized result for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOutput {
    pub doc_type: String,
    pub structure: Vec<StructureEntry>,
    pub content: Vec<ContentEntry>,
    pub quality: Vec<QualityEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub possible_parse_errors: Vec<PossibleParseError>,
}

impl DocumentOutput {
    /// Flatten a processed document into its output entries.
    #[must_use]
    pub fn from_document(document: &StructuredDocument) -> Self {
        Self {
            doc_type: document.doc_type.clone(),
            structure: document
                .tree
                .divisions()
                .iter()
                .map(StructureEntry::from)
                .collect(),
            content: document.units.iter().map(ContentEntry::from_unit).collect(),
            quality: document.units.iter().map(QualityEntry::from).collect(),
            possible_parse_errors: document.possible_parse_errors.clone(),
        }
    }

    /// Quality entry for a unit number.
    #[must_use]
    pub fn quality_for(&self, number: &str) -> Option<&QualityEntry> {
        self.quality.iter().find(|q| q.number == number)
    }

    /// Structure entry owning a content entry.
    #[must_use]
    pub fn division_of(&self, entry: &ContentEntry) -> Option<&StructureEntry> {
        self.structure.iter().find(|s| s.order == entry.division_order)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
