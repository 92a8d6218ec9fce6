//! Splits a line stream into content units.

use std::collections::{BTreeSet, HashSet};

use super::annotations::split_trailing_annotations;
use crate::divisions::DivisionTreeBuilder;
use crate::doctype::{DocumentTypeSpec, UnitHeaderMatch};
use crate::layout::{join_lines, prepare_lines};
use crate::types::{ContentUnit, LayoutLine, OutlineEntry, Position};

/// Content unit segmenter for one document type.
pub struct Segmenter<'a> {
    spec: &'a DocumentTypeSpec,

    /// Canonical numbers listed in the document outline, when authoritative.
    outline_numbers: Option<BTreeSet<String>>,
}

impl<'a> Segmenter<'a> {
    #[must_use]
    pub fn new(spec: &'a DocumentTypeSpec) -> Self {
        Self {
            spec,
            outline_numbers: None,
        }
    }

    /// Only accept header matches whose number appears in the outline.
    ///
    /// An outline without any recognizable unit entries is ignored.
    #[must_use]
    pub fn with_outline(mut self, outline: &[OutlineEntry]) -> Self {
        self.outline_numbers = outline_numbers(self.spec, outline);
        self
    }

    /// Numbers taken from the outline, if it is authoritative.
    #[must_use]
    pub fn outline_numbers(&self) -> Option<&BTreeSet<String>> {
        self.outline_numbers.as_ref()
    }

    /// Segment prepared lines.
    ///
    /// Lines in `consumed` belong to division headers; they end the current
    /// unit and are never part of a body.
    #[must_use]
    pub fn segment(&self, lines: &[LayoutLine], consumed: &BTreeSet<usize>) -> Vec<ContentUnit> {
        let mut units = Vec::new();
        let mut current: Option<ContentUnit> = None;
        let mut transitional = false;
        let mut preamble = 0usize;

        for (index, line) in lines.iter().enumerate() {
            if consumed.contains(&index) {
                self.finish(current.take(), &mut units);
                continue;
            }

            if self.spec.is_transitional_heading(&line.text) {
                self.finish(current.take(), &mut units);
                if !transitional {
                    tracing::debug!(page = line.page, "Entering transitional provisions");
                }
                transitional = true;
                continue;
            }

            if let Some(header) = self.accepted_header(&line.text, transitional) {
                self.finish(current.take(), &mut units);
                current = Some(self.open_unit(line, index, header, transitional));
                continue;
            }

            match current.as_mut() {
                Some(unit) => unit.body_lines.push(line.clone()),
                None => preamble += 1,
            }
        }
        self.finish(current.take(), &mut units);

        if preamble > 0 {
            tracing::debug!(lines = preamble, "Skipped lines before the first content unit");
        }

        let units = deduplicate(units);
        tracing::info!(
            units = units.len(),
            transitional = units.iter().filter(|u| u.is_transitional).count(),
            "Content units segmented"
        );
        units
    }

    /// Segment a raw line stream: prepare lines, find division headers, split.
    #[must_use]
    pub fn segment_layout(&self, lines: &[LayoutLine]) -> Vec<ContentUnit> {
        let prepared = prepare_lines(self.spec, lines);
        let scan = DivisionTreeBuilder::new(self.spec).build(&prepared);
        self.segment(&prepared, &scan.consumed)
    }

    /// Segment plain text using the same header patterns.
    ///
    /// Lines get x = 0 and one point of vertical spacing each, so paragraph
    /// resolution relies on markers and word wrapping alone.
    #[must_use]
    pub fn segment_plain_text(&self, text: &str) -> Vec<ContentUnit> {
        let lines: Vec<LayoutLine> = text
            .lines()
            .enumerate()
            .map(|(i, t)| plain_text_line(t, i))
            .collect();
        self.segment_layout(&lines)
    }

    fn accepted_header(&self, text: &str, transitional: bool) -> Option<UnitHeaderMatch> {
        let header = self.spec.match_unit_header(text)?;
        if transitional {
            return Some(header);
        }
        match &self.outline_numbers {
            Some(numbers) if !numbers.contains(&header.number.canonical()) => {
                tracing::trace!(
                    number = %header.number,
                    "Header not in outline, keeping line as body text"
                );
                None
            }
            _ => Some(header),
        }
    }

    fn open_unit(
        &self,
        line: &LayoutLine,
        index: usize,
        header: UnitHeaderMatch,
        transitional: bool,
    ) -> ContentUnit {
        let position = Position::new(line.page, index);
        let mut unit = ContentUnit::new(self.spec.unit_kind, &header.number, transitional, position);
        unit.heading = header.heading;
        let rest = line.text.get(header.body_start..).unwrap_or("").trim();
        if !rest.is_empty() {
            unit.body_lines.push(line.with_text(rest));
        }
        unit
    }

    fn finish(&self, unit: Option<ContentUnit>, units: &mut Vec<ContentUnit>) {
        let Some(mut unit) = unit else {
            return;
        };
        unit.trailing_annotations = split_trailing_annotations(self.spec, &mut unit.body_lines);
        unit.body_text = join_lines(&unit.body_lines);
        tracing::debug!(
            number = %unit.raw_number,
            page = unit.page,
            lines = unit.body_lines.len(),
            annotations = unit.trailing_annotations.len(),
            "Content unit closed"
        );
        units.push(unit);
    }
}

/// Canonical unit numbers listed in an outline.
///
/// `None` when the outline names no recognizable unit, in which case header
/// patterns alone decide.
#[must_use]
pub fn outline_numbers(spec: &DocumentTypeSpec, outline: &[OutlineEntry]) -> Option<BTreeSet<String>> {
    let numbers: BTreeSet<String> = outline
        .iter()
        .filter_map(|entry| spec.match_unit_header(entry.title_text.trim()))
        .map(|m| m.number.canonical())
        .collect();
    if numbers.is_empty() {
        if !outline.is_empty() {
            tracing::debug!(
                entries = outline.len(),
                "Outline has no unit entries, using header patterns only"
            );
        }
        return None;
    }
    tracing::debug!(numbers = numbers.len(), "Using outline as authoritative");
    Some(numbers)
}

/// Keep the first unit per canonical number and assign declaration order.
fn deduplicate(units: Vec<ContentUnit>) -> Vec<ContentUnit> {
    let mut seen = HashSet::new();
    let mut kept: Vec<ContentUnit> = Vec::with_capacity(units.len());
    for unit in units {
        if seen.insert(unit.raw_number.clone()) {
            kept.push(unit);
        } else {
            tracing::debug!(
                number = %unit.raw_number,
                page = unit.page,
                "Dropping duplicate content unit header"
            );
        }
    }
    for (order, unit) in kept.iter_mut().enumerate() {
        unit.declared_order = order;
    }
    kept
}

fn plain_text_line(text: &str, index: usize) -> LayoutLine {
    #[allow(clippy::cast_precision_loss)]
    let y = index as f32;
    LayoutLine::new(text, 0.0, y, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctype::{law_config, rules_config};

    fn law() -> DocumentTypeSpec {
        DocumentTypeSpec::compile(&law_config()).unwrap()
    }

    fn lines(texts: &[&str]) -> Vec<LayoutLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| LayoutLine::new(*t, 85.0, 100.0 + 12.0 * i as f32, 1))
            .collect()
    }

    #[test]
    fn test_segments_bodies_between_headers() {
        let spec = law();
        let units = Segmenter::new(&spec).segment(
            &lines(&[
                "Artículo 1o.- Esta Ley es de orden público.",
                "Se aplica en todo el territorio.",
                "Artículo 2o.- Son sujetos los contribuyentes.",
            ]),
            &BTreeSet::new(),
        );
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].raw_number, "1o");
        assert_eq!(
            units[0].body_text,
            "Esta Ley es de orden público.\nSe aplica en todo el territorio."
        );
        assert_eq!(units[1].declared_order, 1);
        assert_eq!(units[1].position, Position::new(1, 2));
    }

    #[test]
    fn test_annotation_stays_with_its_unit() {
        let spec = law();
        let units = Segmenter::new(&spec).segment(
            &lines(&[
                "Article 84-E. The taxpayer shall keep records.",
                "Artículo adicionado DOF 09-12-2013",
                "Article 85. Records are kept for five years.",
            ]),
            &BTreeSet::new(),
        );
        assert_eq!(units[0].raw_number, "84-E");
        assert_eq!(units[0].body_text, "The taxpayer shall keep records.");
        assert_eq!(units[0].trailing_annotations.len(), 1);
        assert_eq!(units[1].body_text, "Records are kept for five years.");
        assert!(units[1].trailing_annotations.is_empty());
    }

    #[test]
    fn test_duplicate_header_keeps_first() {
        let spec = law();
        let units = Segmenter::new(&spec).segment(
            &lines(&[
                "Artículo 4o A.- Primer texto.",
                "Artículo 4o-A.- Texto duplicado.",
                "Artículo 5.- Otro.",
            ]),
            &BTreeSet::new(),
        );
        let numbers: Vec<&str> = units.iter().map(|u| u.raw_number.as_str()).collect();
        assert_eq!(numbers, vec!["4o-A", "5"]);
        assert_eq!(units[0].body_text, "Primer texto.");
        assert_eq!(units[1].declared_order, 1);
    }

    #[test]
    fn test_division_lines_end_a_unit() {
        let spec = law();
        let units = Segmenter::new(&spec).segment(
            &lines(&[
                "Artículo 1.- Texto uno.",
                "CAPÍTULO II",
                "De las obligaciones",
                "Artículo 2.- Texto dos.",
            ]),
            &BTreeSet::from([1, 2]),
        );
        assert_eq!(units[0].body_text, "Texto uno.");
        assert_eq!(units[1].body_text, "Texto dos.");
    }

    #[test]
    fn test_transitional_units_are_prefixed() {
        let spec = law();
        let units = Segmenter::new(&spec).segment(
            &lines(&[
                "Artículo 1.- Texto.",
                "TRANSITORIOS",
                "Artículo Primero.- La presente Ley entrará en vigor.",
                "Artículo 1.- Se abroga la ley anterior.",
            ]),
            &BTreeSet::new(),
        );
        let numbers: Vec<&str> = units.iter().map(|u| u.raw_number.as_str()).collect();
        assert_eq!(numbers, vec!["1", "T-PRIMERO", "T-1"]);
        assert!(units[2].is_transitional);
    }

    #[test]
    fn test_outline_rejects_unlisted_headers() {
        let spec = law();
        let outline = vec![
            OutlineEntry {
                title_text: "Artículo 1.- ".to_string(),
                page: 1,
            },
            OutlineEntry {
                title_text: "Artículo 2.- ".to_string(),
                page: 1,
            },
        ];
        let units = Segmenter::new(&spec).with_outline(&outline).segment(
            &lines(&[
                "Artículo 1.- Se estará a lo dispuesto en el",
                "Artículo 27.- del Código.",
                "Artículo 2.- Texto.",
            ]),
            &BTreeSet::new(),
        );
        assert_eq!(units.len(), 2);
        assert!(units[0].body_text.contains("Artículo 27.- del Código."));
    }

    #[test]
    fn test_rules_heading_captured() {
        let spec = DocumentTypeSpec::compile(&rules_config()).unwrap();
        let units = Segmenter::new(&spec).segment(
            &lines(&["Regla 2.1.4. Cálculo de intereses", "Los intereses se calculan."]),
            &BTreeSet::new(),
        );
        assert_eq!(units[0].raw_number, "2.1.4");
        assert_eq!(units[0].heading.as_deref(), Some("Cálculo de intereses"));
        assert_eq!(units[0].number_prefix.as_deref(), Some("2.1"));
        assert_eq!(units[0].body_text, "Los intereses se calculan.");
    }

    #[test]
    fn test_segment_plain_text() {
        let spec = law();
        let text = "CAPÍTULO I\nDisposiciones\nArtículo 1.- Uno.\n\nArtículo 2.- Dos.\n  3  \n";
        let units = Segmenter::new(&spec).segment_plain_text(text);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].body_text, "Uno.");
        assert_eq!(units[1].body_text, "Dos.");
        assert_eq!(units[1].body_lines[0].x, 0.0);
    }
}
