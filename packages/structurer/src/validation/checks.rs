//! First-pass checks. Pure functions over units, no source access.

use std::collections::{BTreeMap, BTreeSet};

use super::sources::RawUnit;
use super::types::{Problem, ProblemKind};
use crate::doctype::DocumentTypeSpec;
use crate::types::{ContentUnit, LayoutLine, Paragraph, ParagraphKind};

/// Characters that close a complete body.
const TERMINAL_CHARS: [char; 8] = ['.', ';', '!', '?', ')', '»', '”', '"'];

/// What the text checks need to know about the document.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub spec: &'a DocumentTypeSpec,

    /// Numbers a header may carry; `None` accepts any.
    pub allowed_numbers: Option<&'a BTreeSet<String>>,
}

impl<'a> CheckContext<'a> {
    #[must_use]
    pub fn new(spec: &'a DocumentTypeSpec) -> Self {
        Self {
            spec,
            allowed_numbers: None,
        }
    }

    #[must_use]
    pub fn with_allowed_numbers(mut self, numbers: Option<&'a BTreeSet<String>>) -> Self {
        self.allowed_numbers = numbers;
        self
    }
}

/// Check that numbers are consecutive within each division.
///
/// Returns `(unit index, problem)` pairs. Units are grouped by division and
/// dotted prefix; transitional units and placeholders are skipped.
#[must_use]
pub fn check_numbering(units: &[ContentUnit]) -> Vec<(usize, Problem)> {
    let mut groups: BTreeMap<(Option<usize>, Option<&str>), Vec<usize>> = BTreeMap::new();
    for (index, unit) in units.iter().enumerate() {
        if unit.is_sequenced() {
            groups
                .entry((unit.division_ref, unit.number_prefix.as_deref()))
                .or_default()
                .push(index);
        }
    }

    let mut problems = Vec::new();
    for members in groups.values() {
        for pair in members.windows(2) {
            let (prev, cur) = (&units[pair[0]], &units[pair[1]]);
            if cur.base_number == prev.base_number
                || prev.base_number.checked_add(1) == Some(cur.base_number)
            {
                continue;
            }
            let description = if cur.base_number > prev.base_number {
                format!(
                    "Numbering jumps from {} to {}; {} number(s) missing",
                    prev.raw_number,
                    cur.raw_number,
                    u64::from(cur.base_number) - u64::from(prev.base_number) - 1
                )
            } else {
                format!(
                    "Numbering goes back from {} to {}",
                    prev.raw_number, cur.raw_number
                )
            };
            problems.push((
                pair[1],
                Problem::warning(ProblemKind::NumberingGap, "numbering", description),
            ));
        }
    }
    problems.sort_by_key(|(index, _)| *index);
    problems
}

/// First header in the text that belongs to a different unit.
///
/// Returns the byte offset of the header and its canonical number.
#[must_use]
pub fn header_overflow(ctx: &CheckContext<'_>, own_number: &str, text: &str) -> Option<(usize, String)> {
    let own = own_number.trim_start_matches("T-");
    ctx.spec
        .find_embedded_unit_headers(text)
        .into_iter()
        .map(|(offset, m)| (offset, m.number.canonical()))
        .find(|(_, number)| {
            number != own && ctx.allowed_numbers.map_or(true, |allowed| allowed.contains(number))
        })
}

/// Index of a unit-level annotation followed by more body text.
#[must_use]
pub fn annotation_overflow(spec: &DocumentTypeSpec, lines: &[LayoutLine]) -> Option<usize> {
    lines.iter().enumerate().find_map(|(index, line)| {
        let followed = lines[index + 1..].iter().any(|l| !spec.is_annotation(&l.text));
        (followed && spec.is_unit_annotation(&line.text)).then_some(index)
    })
}

/// Whether the body ends in terminal punctuation or a recognized citation.
#[must_use]
pub fn ends_complete(spec: &DocumentTypeSpec, text: &str) -> bool {
    let text = text.trim_end();
    text.ends_with(TERMINAL_CHARS) || spec.ends_with_citation(text)
}

/// Text-level checks shared by the first pass and candidate re-checks.
#[must_use]
pub fn text_problems(ctx: &CheckContext<'_>, raw: &RawUnit) -> Vec<Problem> {
    let mut problems = Vec::new();

    if raw.body_text.trim().is_empty() {
        problems.push(Problem::error(
            ProblemKind::TruncatedText,
            "body",
            "Body text is empty",
        ));
    } else if !ends_complete(ctx.spec, &raw.body_text) {
        let text = raw.body_text.trim_end();
        let tail_start = text.char_indices().rev().nth(39).map_or(0, |(i, _)| i);
        problems.push(Problem::error(
            ProblemKind::TruncatedText,
            "body",
            format!("Body ends without terminal punctuation: '...{}'", &text[tail_start..]),
        ));
    }

    if let Some((_, number)) = header_overflow(ctx, &raw.number, &raw.body_text) {
        problems.push(Problem::error(
            ProblemKind::ContentOverflow,
            "body",
            format!("Body contains the header of unit {number}"),
        ));
    }

    if let Some(index) = annotation_overflow(ctx.spec, &raw.body_lines) {
        problems.push(Problem::error(
            ProblemKind::ContentOverflow,
            "body",
            format!(
                "Unit-level annotation on body line {} is followed by more text",
                index + 1
            ),
        ));
    }

    if let Some(heading) = &raw.heading {
        if ctx.spec.is_boilerplate(heading) {
            problems.push(Problem::error(
                ProblemKind::TitleCorruption,
                "heading",
                format!("Heading '{heading}' matches footer boilerplate"),
            ));
        }
    }

    problems
}

/// Check that paragraph groups are well formed.
#[must_use]
pub fn paragraph_problems(paragraphs: &[Paragraph]) -> Vec<Problem> {
    let mut problems = Vec::new();
    for (index, paragraph) in paragraphs.iter().enumerate() {
        if let Some(parent) = paragraph.parent_paragraph_ref {
            if parent >= paragraph.order || parent >= paragraphs.len() {
                problems.push(Problem::error(
                    ProblemKind::DanglingGroup,
                    format!("paragraph {}", paragraph.order),
                    format!("Paragraph {} references missing parent {parent}", paragraph.order),
                ));
            }
        }

        let Some(next) = paragraphs.get(index + 1) else {
            continue;
        };
        let opens_group = paragraph.content.trim_end().ends_with(':');
        let has_items = next.kind != ParagraphKind::Text
            || paragraphs
                .iter()
                .any(|p| p.parent_paragraph_ref == Some(paragraph.order));
        if opens_group && !has_items {
            problems.push(Problem::warning(
                ProblemKind::DanglingGroup,
                format!("paragraph {}", paragraph.order),
                format!("Paragraph {} opens a group with no items", paragraph.order),
            ));
        }
    }
    problems
}

/// Check cited document codes against the known vocabulary.
#[must_use]
pub fn citation_problems(spec: &DocumentTypeSpec, text: &str) -> Vec<Problem> {
    if spec.known_document_codes.is_empty() {
        return Vec::new();
    }
    let unknown: BTreeSet<String> = spec
        .cited_codes(text)
        .into_iter()
        .filter(|code| !spec.known_document_codes.contains(code))
        .collect();
    unknown
        .into_iter()
        .map(|code| {
            Problem::warning(
                ProblemKind::UnknownCitation,
                "body",
                format!("Citation refers to unknown document code '{code}'"),
            )
        })
        .collect()
}
