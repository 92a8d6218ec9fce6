//! Extraction sources the validator can re-query.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::doctype::DocumentTypeSpec;
use crate::layout::join_lines;
use crate::segment::Segmenter;
use crate::types::{ContentUnit, LayoutLine, ReformAnnotation};

/// Which extraction produced a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Primary,
    AlternateLayout,
    PlainText,
}

impl SourceKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::AlternateLayout => "alternate_layout",
            Self::PlainText => "plain_text",
        }
    }
}

/// One content unit as a source extracted it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawUnit {
    /// Canonical number, including the transitional prefix.
    pub number: String,
    pub heading: Option<String>,
    pub body_text: String,
    pub body_lines: Vec<LayoutLine>,
    pub annotations: Vec<ReformAnnotation>,
}

impl RawUnit {
    /// Replace the body lines and rebuild the text from them.
    pub fn set_lines(&mut self, lines: Vec<LayoutLine>) {
        self.body_text = join_lines(&lines);
        self.body_lines = lines;
    }

    /// Cut the body at a byte offset into `body_text`.
    ///
    /// Lines after the offset are dropped; a line containing it keeps its
    /// leading part only.
    pub fn truncate_at(&mut self, offset: usize) {
        let mut kept = Vec::new();
        let mut start = 0;
        for line in &self.body_lines {
            let end = start + line.text.len();
            if end <= offset {
                kept.push(line.clone());
            } else {
                let head = line.text.get(..offset.saturating_sub(start)).unwrap_or("").trim_end();
                if !head.is_empty() {
                    kept.push(line.with_text(head));
                }
                break;
            }
            // Joined with one newline
            start = end + 1;
        }
        self.set_lines(kept);
    }
}

impl From<&ContentUnit> for RawUnit {
    fn from(unit: &ContentUnit) -> Self {
        Self {
            number: unit.raw_number.clone(),
            heading: unit.heading.clone(),
            body_text: unit.body_text.clone(),
            body_lines: unit.body_lines.clone(),
            annotations: unit.trailing_annotations.clone(),
        }
    }
}

/// Units of one extraction, keyed by canonical number.
pub type UnitIndex = BTreeMap<String, RawUnit>;

/// A source of content units the validator can consult.
#[derive(Debug, Clone)]
pub enum ExtractionSource {
    /// Snapshot of the primary segmentation.
    Primary(UnitIndex),
    /// A second layout extraction of the same document.
    AlternateLayout(UnitIndex),
    /// A plain-text rendering of the same document.
    PlainText(UnitIndex),
}

impl ExtractionSource {
    /// Snapshot the primary units.
    #[must_use]
    pub fn primary(units: &[ContentUnit]) -> Self {
        Self::Primary(index(units))
    }

    /// Segment an alternate layout line stream.
    #[must_use]
    pub fn alternate_layout(spec: &DocumentTypeSpec, lines: &[LayoutLine]) -> Self {
        let units = Segmenter::new(spec).segment_layout(lines);
        tracing::debug!(units = units.len(), "Alternate layout source segmented");
        Self::AlternateLayout(index(&units))
    }

    /// Segment a plain-text rendering.
    #[must_use]
    pub fn plain_text(spec: &DocumentTypeSpec, text: &str) -> Self {
        let units = Segmenter::new(spec).segment_plain_text(text);
        tracing::debug!(units = units.len(), "Plain text source segmented");
        Self::PlainText(index(&units))
    }

    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Primary(_) => SourceKind::Primary,
            Self::AlternateLayout(_) => SourceKind::AlternateLayout,
            Self::PlainText(_) => SourceKind::PlainText,
        }
    }

    fn units(&self) -> &UnitIndex {
        match self {
            Self::Primary(units) | Self::AlternateLayout(units) | Self::PlainText(units) => units,
        }
    }

    /// Fetch a unit by canonical number.
    #[must_use]
    pub fn fetch_unit(&self, number: &str) -> Option<RawUnit> {
        self.units().get(number).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units().is_empty()
    }
}

fn index(units: &[ContentUnit]) -> UnitIndex {
    units
        .iter()
        .map(|u| (u.raw_number.clone(), RawUnit::from(u)))
        .collect()
}
