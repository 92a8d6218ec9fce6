//! End-to-end processing of one document.
//!
//! Stages run synchronously, each consuming the full output of the previous
//! one: noise filter, division tree, segmentation, assignment, paragraph
//! resolution, validation, gap detection.

use crate::assignment::{assign_divisions, verify_assigned};
use crate::divisions::{DivisionTree, DivisionTreeBuilder};
use crate::doctype::DocumentTypeSpec;
use crate::error::Result;
use crate::gaps::{detect_gaps, PossibleParseError};
use crate::layout::prepare_lines;
use crate::paragraphs::ParagraphResolver;
use crate::segment::Segmenter;
use crate::types::{ContentUnit, LayoutDocument, LayoutLine, UnitKind};
use crate::validation::{ExtractionSource, QualityStatus, ValidationSummary, Validator};

/// Secondary extractions of the same document, consulted by the validator.
#[derive(Debug, Clone, Default)]
pub struct AlternateInputs {
    /// Lines from a second layout extractor.
    pub alternate_layout: Option<Vec<LayoutLine>>,

    /// Plain-text rendering of the document.
    pub plain_text: Option<String>,
}

/// Result of processing one document.
#[derive(Debug, Clone)]
pub struct StructuredDocument {
    /// Document type code.
    pub doc_type: String,
    pub tree: DivisionTree,
    /// Content units in document order, placeholders included.
    pub units: Vec<ContentUnit>,
    pub possible_parse_errors: Vec<PossibleParseError>,
    pub summary: ValidationSummary,
}

impl StructuredDocument {
    /// Number of units left unresolved after reconciliation.
    #[must_use]
    pub fn unresolved_count(&self) -> usize {
        self.units
            .iter()
            .filter(|u| u.quality.status == QualityStatus::Unresolved)
            .count()
    }

    /// Number of placeholder units.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.units
            .iter()
            .filter(|u| u.kind == UnitKind::NonExistent)
            .count()
    }

    /// Look up a unit by canonical number.
    #[must_use]
    pub fn unit(&self, number: &str) -> Option<&ContentUnit> {
        self.units.iter().find(|u| u.raw_number == number)
    }
}

/// Process a document with the given type.
///
/// Fails when a unit cannot be assigned to a division or a paragraph forest
/// is invalid; quality problems never fail the run.
pub fn process_document(
    spec: &DocumentTypeSpec,
    document: &LayoutDocument,
    alternates: &AlternateInputs,
) -> Result<StructuredDocument> {
    tracing::info!(
        doc_type = %spec.code,
        lines = document.lines.len(),
        outline = document.outline.len(),
        "Processing document"
    );

    let lines = prepare_lines(spec, &document.lines);
    let scan = DivisionTreeBuilder::new(spec).build(&lines);

    let segmenter = Segmenter::new(spec).with_outline(&document.outline);
    let mut units = segmenter.segment(&lines, &scan.consumed);

    assign_divisions(&scan.tree, &mut units)?;
    verify_assigned(&scan.tree, &units)?;

    let resolver = ParagraphResolver::new(&spec.thresholds);
    for unit in &mut units {
        resolver.resolve_unit(unit)?;
    }

    let mut sources = vec![ExtractionSource::primary(&units)];
    if let Some(alternate) = &alternates.alternate_layout {
        sources.push(ExtractionSource::alternate_layout(spec, alternate));
    }
    if let Some(text) = &alternates.plain_text {
        sources.push(ExtractionSource::plain_text(spec, text));
    }

    Validator::new(spec, &sources)
        .with_allowed_numbers(segmenter.outline_numbers())
        .validate(&mut units)?;

    // Gap detection may clear numbering warnings, so count afterwards
    let (units, report) = detect_gaps(spec, units);
    verify_assigned(&scan.tree, &units)?;
    let summary = ValidationSummary::tally(&units);

    let document = StructuredDocument {
        doc_type: spec.code.clone(),
        tree: scan.tree,
        units,
        possible_parse_errors: report.possible_parse_errors,
        summary,
    };
    tracing::info!(
        divisions = document.tree.len(),
        units = document.units.len(),
        placeholders = document.placeholder_count(),
        unresolved = document.unresolved_count(),
        "Document processed"
    );
    Ok(document)
}
