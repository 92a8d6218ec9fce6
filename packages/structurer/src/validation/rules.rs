//! Ordered correction rules for the second pass.

use super::checks::{annotation_overflow, header_overflow, CheckContext};
use super::sources::RawUnit;
use super::types::ProblemKind;
use crate::segment::parse_annotation;

/// Trait for correction heuristics.
///
/// Rules run in a fixed order on a candidate re-extracted from a source. Each
/// rule addresses one problem kind; the validator records a resolution for
/// every rule it tries.
pub trait CorrectionRule: Send + Sync {
    /// Name recorded as the resolution method.
    fn name(&self) -> &'static str;

    /// The problem kind this rule can fix.
    fn addresses(&self) -> ProblemKind;

    /// Whether the rule's precondition holds for the candidate.
    fn can_apply(&self, candidate: &RawUnit, context: &CheckContext<'_>) -> bool;

    /// Transform the candidate in place.
    fn apply(&self, candidate: &mut RawUnit, context: &CheckContext<'_>);

    /// The text this rule corrects, as recorded in the resolution.
    fn corrected_text(&self, candidate: &RawUnit) -> Option<String> {
        Some(candidate.body_text.clone())
    }
}

/// Cut the body at the first header of another unit captured by accident.
pub struct HeaderOverflowRule;

impl CorrectionRule for HeaderOverflowRule {
    fn name(&self) -> &'static str {
        "truncate_header_overflow"
    }

    fn addresses(&self) -> ProblemKind {
        ProblemKind::ContentOverflow
    }

    fn can_apply(&self, candidate: &RawUnit, context: &CheckContext<'_>) -> bool {
        header_overflow(context, &candidate.number, &candidate.body_text).is_some()
    }

    fn apply(&self, candidate: &mut RawUnit, context: &CheckContext<'_>) {
        if let Some((offset, number)) = header_overflow(context, &candidate.number, &candidate.body_text) {
            tracing::debug!(unit = %candidate.number, overflow = %number, "Truncating header overflow");
            candidate.truncate_at(offset);
        }
    }
}

/// Cut the body after a unit-level annotation; what follows belongs to the
/// next unit. The annotation itself moves to the trailing annotations.
pub struct AnnotationOverflowRule;

impl CorrectionRule for AnnotationOverflowRule {
    fn name(&self) -> &'static str {
        "truncate_annotation_overflow"
    }

    fn addresses(&self) -> ProblemKind {
        ProblemKind::ContentOverflow
    }

    fn can_apply(&self, candidate: &RawUnit, context: &CheckContext<'_>) -> bool {
        annotation_overflow(context.spec, &candidate.body_lines).is_some()
    }

    fn apply(&self, candidate: &mut RawUnit, context: &CheckContext<'_>) {
        let Some(index) = annotation_overflow(context.spec, &candidate.body_lines) else {
            return;
        };
        let mut lines = candidate.body_lines.clone();
        let dropped = lines.split_off(index);
        if let Some(annotation) = dropped.first() {
            candidate.annotations.push(parse_annotation(&annotation.text));
        }
        tracing::debug!(
            unit = %candidate.number,
            dropped = dropped.len().saturating_sub(1),
            "Truncating annotation overflow"
        );
        candidate.set_lines(lines);
    }
}

/// Replace a boilerplate heading with a synthesized default.
pub struct BoilerplateTitleRule;

impl CorrectionRule for BoilerplateTitleRule {
    fn name(&self) -> &'static str {
        "replace_boilerplate_title"
    }

    fn addresses(&self) -> ProblemKind {
        ProblemKind::TitleCorruption
    }

    fn can_apply(&self, candidate: &RawUnit, context: &CheckContext<'_>) -> bool {
        candidate
            .heading
            .as_deref()
            .is_some_and(|h| context.spec.is_boilerplate(h))
    }

    fn apply(&self, candidate: &mut RawUnit, context: &CheckContext<'_>) {
        candidate.heading = Some(default_title(&context.spec.unit_label, &candidate.number));
    }

    fn corrected_text(&self, candidate: &RawUnit) -> Option<String> {
        candidate.heading.clone()
    }
}

/// Title used when the real one is unusable ("Rule 2.1.4").
#[must_use]
pub fn default_title(label: &str, number: &str) -> String {
    format!("{label} {number}")
}

/// The rule battery in priority order.
#[must_use]
pub fn default_rules() -> Vec<Box<dyn CorrectionRule>> {
    vec![
        Box::new(HeaderOverflowRule),
        Box::new(AnnotationOverflowRule),
        Box::new(BoilerplateTitleRule),
    ]
}
