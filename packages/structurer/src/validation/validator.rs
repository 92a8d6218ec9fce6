//! Two-pass validation with multi-source reconciliation.

use std::collections::{BTreeMap, BTreeSet};

use super::checks::{
    check_numbering, citation_problems, paragraph_problems, text_problems, CheckContext,
};
use super::rules::{default_rules, CorrectionRule};
use super::sources::{ExtractionSource, RawUnit};
use super::types::{Problem, ProblemKind, QualityStatus, Resolution, ValidationState};
use crate::doctype::DocumentTypeSpec;
use crate::error::Result;
use crate::paragraphs::{verify_forest, ParagraphResolver};
use crate::types::{ContentUnit, Paragraph, UnitKind};

/// Method name recorded when a clean re-extraction fixed a problem on its own.
pub const REFETCH_METHOD: &str = "refetch";

/// Count of units per final status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub ok: usize,
    pub corrected: usize,
    pub unresolved: usize,
}

impl ValidationSummary {
    /// Count the statuses of real units; placeholders are left out.
    #[must_use]
    pub fn tally(units: &[ContentUnit]) -> Self {
        let mut summary = Self::default();
        for unit in units.iter().filter(|u| u.kind != UnitKind::NonExistent) {
            match unit.quality.status {
                QualityStatus::Ok => summary.ok += 1,
                QualityStatus::Corrected => summary.corrected += 1,
                QualityStatus::Unresolved => summary.unresolved += 1,
            }
        }
        summary
    }
}

/// Validates content units and reconciles flagged ones against other sources.
pub struct Validator<'a> {
    spec: &'a DocumentTypeSpec,
    sources: &'a [ExtractionSource],
    rules: Vec<Box<dyn CorrectionRule>>,
    allowed_numbers: Option<&'a BTreeSet<String>>,
}

impl<'a> Validator<'a> {
    /// Create a validator consulting `sources` in order.
    #[must_use]
    pub fn new(spec: &'a DocumentTypeSpec, sources: &'a [ExtractionSource]) -> Self {
        Self {
            spec,
            sources,
            rules: default_rules(),
            allowed_numbers: None,
        }
    }

    /// Restrict overflow detection to headers with these numbers.
    #[must_use]
    pub fn with_allowed_numbers(mut self, numbers: Option<&'a BTreeSet<String>>) -> Self {
        self.allowed_numbers = numbers;
        self
    }

    /// Replace the correction rule battery.
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<Box<dyn CorrectionRule>>) -> Self {
        self.rules = rules;
        self
    }

    fn context(&self) -> CheckContext<'a> {
        CheckContext::new(self.spec).with_allowed_numbers(self.allowed_numbers)
    }

    /// Run both passes over every unit and set its quality record.
    ///
    /// Units are never dropped; a failed correction leaves them unresolved.
    /// Fails only when a corrected body yields an invalid paragraph forest.
    pub fn validate(&self, units: &mut [ContentUnit]) -> Result<ValidationSummary> {
        let mut numbering: BTreeMap<usize, Vec<Problem>> = BTreeMap::new();
        for (index, problem) in check_numbering(units) {
            numbering.entry(index).or_default().push(problem);
        }

        for (index, unit) in units.iter_mut().enumerate() {
            if unit.kind == UnitKind::NonExistent {
                continue;
            }

            let mut problems = numbering.remove(&index).unwrap_or_default();
            problems.extend(self.first_pass(unit));
            unit.quality.state = if problems.is_empty() {
                ValidationState::FirstPassOk
            } else {
                ValidationState::FirstPassFlagged
            };
            for problem in problems {
                tracing::debug!(
                    unit = %unit.raw_number,
                    kind = problem.kind.as_str(),
                    severity = problem.severity.as_str(),
                    "{}",
                    problem.description
                );
                unit.quality.add_problem(problem);
            }

            if !unit.quality.open_errors().is_empty() {
                self.second_pass(unit)?;
            }
            finish(unit);
        }

        let summary = ValidationSummary::tally(units);

        tracing::info!(
            ok = summary.ok,
            corrected = summary.corrected,
            unresolved = summary.unresolved,
            "Validation complete"
        );
        Ok(summary)
    }

    /// Unit-level first-pass checks (numbering needs all units and runs separately).
    #[must_use]
    pub fn first_pass(&self, unit: &ContentUnit) -> Vec<Problem> {
        let mut problems = text_problems(&self.context(), &RawUnit::from(unit));
        problems.extend(paragraph_problems(&unit.paragraphs));
        problems.extend(citation_problems(self.spec, &unit.body_text));
        problems
    }

    /// Re-extract the unit from each source until one candidate is clean.
    fn second_pass(&self, unit: &mut ContentUnit) -> Result<()> {
        unit.quality.state = ValidationState::SecondPassAttempted;
        let context = self.context();
        let resolver = ParagraphResolver::new(&self.spec.thresholds);

        for source in self.sources {
            let open = unit.quality.open_errors();
            if open.is_empty() {
                break;
            }
            let source_used = source.kind();

            let Some(mut candidate) = source.fetch_unit(&unit.raw_number) else {
                tracing::debug!(
                    unit = %unit.raw_number,
                    source = source_used.as_str(),
                    "Unit not found in source"
                );
                for problem_ref in open {
                    unit.quality.add_resolution(Resolution {
                        problem_ref,
                        success: false,
                        corrected_text: None,
                        source_used,
                        method: REFETCH_METHOD.to_string(),
                    });
                }
                continue;
            };

            // (problem, rule, applied) in rule order
            let mut attempts: Vec<(usize, &dyn CorrectionRule, bool)> = Vec::new();
            for rule in &self.rules {
                let claimed: Vec<usize> = attempts.iter().map(|(p, _, _)| *p).collect();
                let of_kind: Vec<usize> = open
                    .iter()
                    .copied()
                    .filter(|i| unit.quality.issues[*i].problem.kind == rule.addresses())
                    .collect();
                let Some(problem_ref) = of_kind
                    .iter()
                    .copied()
                    .find(|i| !claimed.contains(i))
                    .or_else(|| of_kind.first().copied())
                else {
                    continue;
                };
                let applied = rule.can_apply(&candidate, &context);
                if applied {
                    rule.apply(&mut candidate, &context);
                }
                attempts.push((problem_ref, rule.as_ref(), applied));
            }

            let paragraphs = resolver.resolve(&candidate.body_lines);
            let mut remaining = text_problems(&context, &candidate);
            remaining.extend(paragraph_problems(&paragraphs));
            let remaining_errors: BTreeSet<ProblemKind> = remaining
                .iter()
                .filter(|p| p.is_error())
                .map(|p| p.kind)
                .collect();
            let adopted = remaining_errors.is_empty();

            for (problem_ref, rule, applied) in &attempts {
                unit.quality.add_resolution(Resolution {
                    problem_ref: *problem_ref,
                    success: adopted && *applied,
                    corrected_text: if *applied {
                        rule.corrected_text(&candidate)
                    } else {
                        None
                    },
                    source_used,
                    method: rule.name().to_string(),
                });
            }
            for problem_ref in open {
                let fixed_by_rule = attempts.iter().any(|(p, _, applied)| *p == problem_ref && *applied);
                if !fixed_by_rule {
                    unit.quality.add_resolution(Resolution {
                        problem_ref,
                        success: adopted,
                        corrected_text: adopted.then(|| candidate.body_text.clone()),
                        source_used,
                        method: REFETCH_METHOD.to_string(),
                    });
                }
            }

            tracing::debug!(
                unit = %unit.raw_number,
                source = source_used.as_str(),
                adopted,
                remaining = remaining_errors.len(),
                "Second pass attempt"
            );
            if adopted {
                adopt(unit, candidate, paragraphs)?;
                break;
            }
        }
        Ok(())
    }
}

/// Replace the unit's text with a clean candidate.
fn adopt(unit: &mut ContentUnit, candidate: RawUnit, paragraphs: Vec<Paragraph>) -> Result<()> {
    verify_forest(&unit.raw_number, &paragraphs)?;
    unit.heading = candidate.heading;
    unit.body_text = candidate.body_text;
    unit.body_lines = candidate.body_lines;
    if !candidate.annotations.is_empty() {
        unit.trailing_annotations = candidate.annotations;
    }
    unit.paragraphs = paragraphs;
    Ok(())
}

/// Settle the final state and status of a unit.
fn finish(unit: &mut ContentUnit) {
    let open = unit.quality.open_errors().len();
    if open > 0 {
        unit.quality.add_problem(Problem::warning(
            ProblemKind::UnresolvedQuality,
            "unit",
            format!("{open} error(s) remain after the second pass; manual review required"),
        ));
        unit.quality.state = ValidationState::Unresolved;
        tracing::warn!(unit = %unit.raw_number, errors = open, "Content unit unresolved");
    } else if unit.quality.state == ValidationState::SecondPassAttempted {
        unit.quality.state = ValidationState::Resolved;
    }
    unit.quality.finalize();
}
