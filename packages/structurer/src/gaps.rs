//! Numbering gap detection and placeholder units.
//!
//! Missing numbers inside a division's observed range become placeholder
//! units, unless the number occurs in the corpus text. Then it is more
//! likely a missed header than a real gap, and it is reported instead.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::doctype::DocumentTypeSpec;
use crate::numbering::NormalizedNumber;
use crate::types::ContentUnit;
use crate::validation::{Problem, ProblemKind, Resolution, SourceKind, ValidationState};

/// Method recorded on placeholder resolutions.
pub const PLACEHOLDER_METHOD: &str = "placeholder";

/// A missing number that was found in the corpus text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PossibleParseError {
    pub number: String,
    pub division_order: usize,
    pub description: String,
}

/// Outcome of gap detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapReport {
    /// Canonical numbers of created placeholders.
    pub placeholders: Vec<String>,
    pub possible_parse_errors: Vec<PossibleParseError>,
}

/// Widest jump that is still filled with placeholders.
///
/// Larger jumps come from misread numbers, not repealed runs.
pub const MAX_GAP_SPAN: u32 = 500;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NUMBER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)*").expect("valid regex"));

/// Fill numbering gaps with placeholder units.
///
/// Returns the units with placeholders inserted after their predecessor and
/// declaration order renumbered. When every number of a jump occurs in the
/// text, the unit after the jump loses its numbering warning: the numbers
/// are reported as possible parse errors instead.
#[must_use]
pub fn detect_gaps(
    spec: &DocumentTypeSpec,
    mut units: Vec<ContentUnit>,
) -> (Vec<ContentUnit>, GapReport) {
    let corpus = units
        .iter()
        .map(|u| u.body_text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let tokens = corpus_tokens(&corpus);
    let existing: HashSet<String> = units.iter().map(|u| u.raw_number.clone()).collect();

    let mut groups: BTreeMap<(usize, Option<String>), Vec<usize>> = BTreeMap::new();
    for (index, unit) in units.iter().enumerate() {
        if let (true, Some(division)) = (unit.is_sequenced(), unit.division_ref) {
            groups
                .entry((division, unit.number_prefix.clone()))
                .or_default()
                .push(index);
        }
    }

    let mut report = GapReport::default();
    // Placeholders keyed by the index of the unit they follow
    let mut anchored: BTreeMap<usize, Vec<ContentUnit>> = BTreeMap::new();
    // Units following a jump, split by whether the jump got placeholders
    let mut explained: BTreeSet<usize> = BTreeSet::new();
    let mut filled_after: BTreeSet<usize> = BTreeSet::new();

    for ((division, prefix), members) in &groups {
        let observed: BTreeSet<u32> = members.iter().map(|i| units[*i].base_number).collect();
        let observed: Vec<u32> = observed.into_iter().collect();

        for pair in observed.windows(2) {
            let (low, high) = (pair[0], pair[1]);
            let span = high - low - 1;
            if span == 0 {
                continue;
            }
            if span > MAX_GAP_SPAN {
                tracing::warn!(
                    from = low,
                    to = high,
                    division,
                    "Numbering jump too wide for placeholders"
                );
                continue;
            }

            // Predecessor in declaration order, not by number
            let Some(&anchor) = members
                .iter()
                .rev()
                .find(|i| units[**i].base_number <= low)
            else {
                continue;
            };
            let mut filled = false;
            let mut in_text = false;

            for missing in (low + 1)..high {
                let number = NormalizedNumber::plain(missing).with_prefix(prefix.clone());
                let canonical = number.canonical();
                if existing.contains(&canonical) {
                    tracing::debug!(
                        number = %canonical,
                        division,
                        "Missing number exists in another division, not a gap"
                    );
                    continue;
                }

                if tokens.contains(&canonical) {
                    tracing::warn!(
                        number = %canonical,
                        division,
                        "Missing number occurs in the text, possible parse error"
                    );
                    report.possible_parse_errors.push(PossibleParseError {
                        number: canonical.clone(),
                        division_order: *division,
                        description: format!(
                            "{} {canonical} is missing from the sequence but occurs in the text",
                            spec.unit_label
                        ),
                    });
                    in_text = true;
                    continue;
                }

                tracing::warn!(number = %canonical, division, "Creating placeholder for numbering gap");
                let mut placeholder = ContentUnit::placeholder(
                    &number,
                    &spec.unit_label,
                    *division,
                    units[anchor].position,
                );
                let problem_ref = placeholder.quality.add_problem(Problem::warning(
                    ProblemKind::NumberingGap,
                    "numbering",
                    format!("{} {canonical} is missing from the source document", spec.unit_label),
                ));
                placeholder.quality.add_resolution(Resolution {
                    problem_ref,
                    success: true,
                    corrected_text: Some(placeholder.body_text.clone()),
                    source_used: SourceKind::Primary,
                    method: PLACEHOLDER_METHOD.to_string(),
                });
                placeholder.quality.finalize();
                report.placeholders.push(canonical);
                anchored.entry(anchor).or_default().push(placeholder);
                filled = true;
            }

            let successors = members
                .windows(2)
                .filter(|w| units[w[0]].base_number <= low && units[w[1]].base_number >= high)
                .map(|w| w[1]);
            if filled {
                filled_after.extend(successors);
            } else if in_text {
                explained.extend(successors);
            }
        }
    }

    for &index in explained.difference(&filled_after) {
        let unit = &mut units[index];
        if unit.quality.remove_issues(ProblemKind::NumberingGap) == 0 {
            continue;
        }
        if unit.quality.issues.is_empty()
            && unit.quality.state == ValidationState::FirstPassFlagged
        {
            unit.quality.state = ValidationState::FirstPassOk;
        }
        unit.quality.finalize();
        tracing::debug!(unit = %unit.raw_number, "Numbering warning replaced by possible parse error");
    }

    let mut result = Vec::with_capacity(units.len() + report.placeholders.len());
    for (index, unit) in units.into_iter().enumerate() {
        result.push(unit);
        if let Some(mut placeholders) = anchored.remove(&index) {
            placeholders.sort_by_key(|p| p.base_number);
            result.extend(placeholders);
        }
    }
    for (order, unit) in result.iter_mut().enumerate() {
        unit.declared_order = order;
    }

    tracing::info!(
        placeholders = report.placeholders.len(),
        possible_parse_errors = report.possible_parse_errors.len(),
        "Gap detection complete"
    );
    (result, report)
}

/// Every number in the text, with each dotted run also split into its parts.
///
/// "2.1.3" yields "2.1.3", "2.1", "1.3", "2", "1" and "3", so a lookup
/// matches only whole digit runs.
fn corpus_tokens(corpus: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    for found in NUMBER_TOKEN.find_iter(corpus) {
        let parts: Vec<&str> = found.as_str().split('.').collect();
        for start in 0..parts.len() {
            for end in start + 1..=parts.len() {
                tokens.insert(parts[start..end].join("."));
            }
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctype::law_config;
    use crate::types::{Position, UnitKind};
    use crate::validation::QualityStatus;

    fn spec() -> DocumentTypeSpec {
        DocumentTypeSpec::compile(&law_config()).unwrap()
    }

    fn unit(n: u32, division: usize, body: &str) -> ContentUnit {
        let mut unit = ContentUnit::new(
            UnitKind::Article,
            &NormalizedNumber::plain(n),
            false,
            Position::new(1, n as usize),
        );
        unit.division_ref = Some(division);
        unit.body_text = body.to_string();
        unit
    }

    #[test]
    fn test_placeholder_created_for_real_gap() {
        let units = vec![
            unit(1, 0, "Uno."),
            unit(2, 0, "Dos."),
            unit(4, 0, "Cuatro."),
            unit(5, 0, "Cinco."),
        ];
        let (units, report) = detect_gaps(&spec(), units);
        assert_eq!(report.placeholders, vec!["3".to_string()]);
        assert!(report.possible_parse_errors.is_empty());

        let numbers: Vec<&str> = units.iter().map(|u| u.raw_number.as_str()).collect();
        assert_eq!(numbers, vec!["1", "2", "3", "4", "5"]);
        let placeholder = &units[2];
        assert_eq!(placeholder.kind, UnitKind::NonExistent);
        assert_eq!(placeholder.division_ref, Some(0));
        assert_eq!(placeholder.declared_order, 2);
        assert_eq!(placeholder.quality.status, QualityStatus::Corrected);
    }

    #[test]
    fn test_gap_suppressed_when_number_occurs_in_text() {
        let units = vec![
            unit(1, 0, "Uno."),
            unit(2, 0, "Dos. Artículo 3.- Tres."),
            unit(4, 0, "Cuatro."),
            unit(5, 0, "Cinco."),
        ];
        let (units, report) = detect_gaps(&spec(), units);
        assert!(report.placeholders.is_empty());
        assert_eq!(report.possible_parse_errors.len(), 1);
        assert_eq!(report.possible_parse_errors[0].number, "3");
        assert_eq!(units.len(), 4);
    }

    #[test]
    fn test_number_in_text_clears_numbering_warning() {
        let mut after = unit(4, 0, "Cuatro.");
        after.quality.add_problem(Problem::warning(
            ProblemKind::NumberingGap,
            "numbering",
            "Numbering jumps from 2 to 4; 1 number(s) missing",
        ));
        after.quality.state = ValidationState::FirstPassFlagged;
        after.quality.finalize();
        assert_eq!(after.quality.status, QualityStatus::Corrected);

        let units = vec![
            unit(1, 0, "Uno."),
            unit(2, 0, "Véase el artículo 3."),
            after,
            unit(5, 0, "Cinco."),
        ];
        let (units, report) = detect_gaps(&spec(), units);
        assert_eq!(report.possible_parse_errors.len(), 1);

        let four = &units[2];
        assert_eq!(four.raw_number, "4");
        assert!(!four.quality.has_problem(ProblemKind::NumberingGap));
        assert_eq!(four.quality.status, QualityStatus::Ok);
        assert_eq!(four.quality.state, ValidationState::FirstPassOk);
    }

    #[test]
    fn test_numbering_warning_kept_when_placeholder_created() {
        let mut after = unit(5, 0, "Cinco.");
        after.quality.add_problem(Problem::warning(
            ProblemKind::NumberingGap,
            "numbering",
            "Numbering jumps from 2 to 5; 2 number(s) missing",
        ));
        after.quality.finalize();

        let units = vec![unit(1, 0, "Uno."), unit(2, 0, "Véase el 3."), after];
        let (units, report) = detect_gaps(&spec(), units);
        assert_eq!(report.placeholders, vec!["4".to_string()]);
        assert_eq!(report.possible_parse_errors[0].number, "3");
        let five = units.iter().find(|u| u.raw_number == "5").unwrap();
        assert!(five.quality.has_problem(ProblemKind::NumberingGap));
        assert_eq!(five.quality.status, QualityStatus::Corrected);
    }

    #[test]
    fn test_digit_bounded_tokens() {
        assert!(corpus_tokens("en el 3 de mayo").contains("3"));
        assert!(!corpus_tokens("en el año 2013").contains("3"));
        assert!(!corpus_tokens("el 31 de mayo").contains("3"));
        assert!(corpus_tokens("3").contains("3"));

        let dotted = corpus_tokens("apartado 2.1.3 y 10");
        assert!(dotted.contains("2.1.3"));
        assert!(dotted.contains("1.3"));
        assert!(dotted.contains("3"));
        assert!(dotted.contains("10"));
        assert!(!dotted.contains("1.0"));
    }

    #[test]
    fn test_wide_jump_gets_no_placeholders() {
        let units = vec![unit(1, 0, "Uno."), unit(20_000, 0, "Veinte mil.")];
        let (units, report) = detect_gaps(&spec(), units);
        assert!(report.placeholders.is_empty());
        assert_eq!(units.len(), 2);

        let units = vec![unit(u32::MAX, 0, "Texto."), unit(1, 0, "Otro.")];
        let (units, report) = detect_gaps(&spec(), units);
        assert!(report.placeholders.is_empty());
        assert_eq!(units.len(), 2);
    }

    #[test]
    fn test_jump_at_span_limit_is_filled() {
        let body = "Sin referencias.";
        let units = vec![unit(1, 0, body), unit(MAX_GAP_SPAN + 2, 0, body)];
        let (units, report) = detect_gaps(&spec(), units);
        assert_eq!(report.placeholders.len(), MAX_GAP_SPAN as usize);
        assert_eq!(units.len(), MAX_GAP_SPAN as usize + 2);
        assert_eq!(units.last().unwrap().base_number, MAX_GAP_SPAN + 2);
    }

    #[test]
    fn test_gaps_are_per_division() {
        let units = vec![unit(1, 0, "Uno."), unit(3, 1, "Tres.")];
        let (_, report) = detect_gaps(&spec(), units);
        assert!(report.placeholders.is_empty());
    }

    #[test]
    fn test_transitional_units_ignored() {
        let mut transitional = unit(9, 0, "Nueve.");
        transitional.is_transitional = true;
        let units = vec![unit(1, 0, "Uno."), transitional, unit(2, 0, "Dos.")];
        let (units, report) = detect_gaps(&spec(), units);
        assert!(report.placeholders.is_empty());
        assert_eq!(units.len(), 3);
    }
}
