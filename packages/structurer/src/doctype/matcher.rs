//! Structural pattern matching against a compiled document type.

use std::sync::LazyLock;

use regex::Regex;

use crate::numbering::{normalize_number, NormalizedNumber};
use crate::types::DivisionKind;

use super::spec::DocumentTypeSpec;

/// Sentence break after which a header may start mid-line.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.;:]\s+").expect("valid regex"));

/// A division header found on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisionMatch {
    pub kind: DivisionKind,
    pub number: String,
    /// Name given on the header line itself, if any.
    pub name: Option<String>,
    /// Header text without the name ("CAPÍTULO IV").
    pub display_name: String,
}

/// A content unit header found at the start of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitHeaderMatch {
    pub number: NormalizedNumber,
    /// Number as written.
    pub raw: String,
    pub heading: Option<String>,
    /// Byte offset in the line where the body text starts.
    pub body_start: usize,
}

impl DocumentTypeSpec {
    /// Match a line against the division patterns, deepest kind first.
    #[must_use]
    pub fn match_division(&self, text: &str) -> Option<DivisionMatch> {
        for (kind, pattern) in &self.division_patterns {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let Some(number) = caps.name("number") else {
                continue;
            };
            let name = caps
                .name("name")
                .map(|m| m.as_str().trim().to_string())
                .filter(|n| !n.is_empty());
            let header_end = caps.name("name").map_or(text.len(), |m| m.start());
            let display_name = text[..header_end]
                .trim()
                .trim_end_matches(['.', '-', '–', ':'])
                .trim()
                .to_string();
            return Some(DivisionMatch {
                kind: *kind,
                number: number.as_str().to_string(),
                name,
                display_name,
            });
        }
        None
    }

    /// Match a line against the content unit header pattern.
    ///
    /// A match whose number cannot be normalized is treated as no match.
    #[must_use]
    pub fn match_unit_header(&self, text: &str) -> Option<UnitHeaderMatch> {
        let caps = self.unit_pattern.captures(text)?;
        let whole = caps.get(0)?;
        if whole.start() != 0 && !text[..whole.start()].trim().is_empty() {
            return None;
        }
        let raw = caps.name("number")?.as_str();
        let Some(number) = normalize_number(raw) else {
            tracing::trace!(raw = %raw, "Header matched but number did not normalize");
            return None;
        };
        let heading = caps
            .name("heading")
            .map(|m| m.as_str().trim().to_string())
            .filter(|h| !h.is_empty());
        Some(UnitHeaderMatch {
            number,
            raw: raw.trim().to_string(),
            heading,
            body_start: whole.end(),
        })
    }

    /// Find unit headers at line starts in a block of text.
    ///
    /// Returns `(line_start_offset, match)` pairs in text order.
    #[must_use]
    pub fn find_unit_headers(&self, text: &str) -> Vec<(usize, UnitHeaderMatch)> {
        let mut found = Vec::new();
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            let content = line.trim_end_matches(['\n', '\r']);
            if let Some(m) = self.match_unit_header(content) {
                found.push((offset, m));
            }
            offset += line.len();
        }
        found
    }

    /// Find unit headers at line starts or right after a sentence break.
    ///
    /// Catches headers that the extractor glued onto the previous line.
    /// Offsets are relative to `text`.
    #[must_use]
    pub fn find_embedded_unit_headers(&self, text: &str) -> Vec<(usize, UnitHeaderMatch)> {
        let mut found = Vec::new();
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            let content = line.trim_end_matches(['\n', '\r']);
            let starts = std::iter::once(0).chain(SENTENCE_BREAK.find_iter(content).map(|m| m.end()));
            for start in starts {
                if let Some(m) = self.match_unit_header(&content[start..]) {
                    found.push((offset + start, m));
                }
            }
            offset += line.len();
        }
        found
    }

    /// Whether the line is a division or content unit header.
    #[must_use]
    pub fn is_structural(&self, text: &str) -> bool {
        self.match_division(text).is_some() || self.match_unit_header(text).is_some()
    }

    /// Whether the line is page furniture to drop.
    #[must_use]
    pub fn is_noise(&self, text: &str) -> bool {
        self.noise_patterns.iter().any(|p| p.is_match(text))
    }

    /// Whether the line is a reform annotation.
    #[must_use]
    pub fn is_annotation(&self, text: &str) -> bool {
        self.annotation_pattern.is_match(text)
    }

    /// Whether the line is an annotation amending a whole content unit.
    #[must_use]
    pub fn is_unit_annotation(&self, text: &str) -> bool {
        self.is_annotation(text)
            && self
                .unit_annotation_pattern
                .as_ref()
                .is_some_and(|p| p.is_match(text))
    }

    /// Whether the line opens the transitional provisions.
    #[must_use]
    pub fn is_transitional_heading(&self, text: &str) -> bool {
        self.transitional_pattern
            .as_ref()
            .is_some_and(|p| p.is_match(text))
    }

    /// Whether the text is footer or publisher boilerplate.
    #[must_use]
    pub fn is_boilerplate(&self, text: &str) -> bool {
        self.boilerplate_patterns.iter().any(|p| p.is_match(text))
    }

    /// Whether the text ends in a recognized citation instead of punctuation.
    #[must_use]
    pub fn ends_with_citation(&self, text: &str) -> bool {
        self.terminal_patterns.iter().any(|p| p.is_match(text))
    }

    /// Document codes cited in the text, in order of appearance.
    #[must_use]
    pub fn cited_codes(&self, text: &str) -> Vec<String> {
        let Some(pattern) = &self.citation_pattern else {
            return Vec::new();
        };
        pattern
            .captures_iter(text)
            .filter_map(|caps| caps.name("code").map(|m| m.as_str().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctype::builtin::{law_config, rules_config};

    fn law() -> DocumentTypeSpec {
        DocumentTypeSpec::compile(&law_config()).unwrap()
    }

    #[test]
    fn test_match_division_kinds() {
        let spec = law();
        let m = spec.match_division("TÍTULO SEGUNDO").unwrap();
        assert_eq!(m.kind, DivisionKind::Title);
        assert_eq!(m.number, "SEGUNDO");
        assert_eq!(m.display_name, "TÍTULO SEGUNDO");

        let m = spec.match_division("SECCIÓN III De los pagos").unwrap();
        assert_eq!(m.kind, DivisionKind::Section);
        assert_eq!(m.name.as_deref(), Some("De los pagos"));
        assert_eq!(m.display_name, "SECCIÓN III");
    }

    #[test]
    fn test_match_division_none_for_prose() {
        let spec = law();
        assert!(spec.match_division("El título de propiedad").is_none());
    }

    #[test]
    fn test_match_unit_header() {
        let spec = law();
        let line = "Artículo 4o A.- Los contribuyentes";
        let m = spec.match_unit_header(line).unwrap();
        assert_eq!(m.number.canonical(), "4o-A");
        assert_eq!(m.raw, "4o A");
        assert_eq!(&line[m.body_start..], "Los contribuyentes");
    }

    #[test]
    fn test_match_unit_header_with_heading() {
        let spec = DocumentTypeSpec::compile(&rules_config()).unwrap();
        let m = spec.match_unit_header("Regla 2.1.4. Cálculo de intereses").unwrap();
        assert_eq!(m.number.canonical(), "2.1.4");
        assert_eq!(m.heading.as_deref(), Some("Cálculo de intereses"));
    }

    #[test]
    fn test_find_unit_headers_in_text() {
        let spec = law();
        let text = "Article 1. First.\nmore text\nArticle 2. Second.\n";
        let found = spec.find_unit_headers(text);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, 0);
        assert_eq!(&text[found[1].0..found[1].0 + 10], "Article 2.");
    }

    #[test]
    fn test_find_embedded_unit_headers() {
        let spec = law();
        let text = "los contribuyentes. Artículo 85.- Los registros\nArtículo 86.- Otro";
        let found = spec.find_embedded_unit_headers(text);
        let numbers: Vec<String> = found.iter().map(|(_, m)| m.number.canonical()).collect();
        assert_eq!(numbers, vec!["85".to_string(), "86".to_string()]);
        assert!(text[found[0].0..].starts_with("Artículo 85.- Los"));
    }

    #[test]
    fn test_unit_annotation() {
        let spec = law();
        assert!(spec.is_unit_annotation("Artículo reformado DOF 12-06-2015"));
        assert!(!spec.is_unit_annotation("Párrafo reformado DOF 12-06-2015"));
        assert!(!spec.is_unit_annotation("Artículo reformado en su oportunidad"));
    }

    #[test]
    fn test_noise_and_annotations() {
        let spec = law();
        assert!(spec.is_noise("  12 "));
        assert!(spec.is_noise("Página 3 de 120"));
        assert!(!spec.is_noise("I. Los ingresos"));
        assert!(spec.is_annotation("Artículo reformado DOF 12-06-2015"));
        assert!(spec.is_annotation("Párrafo adicionado DOF 09/12/2019"));
        assert!(!spec.is_annotation("El artículo fue reformado."));
    }

    #[test]
    fn test_transitional_and_boilerplate() {
        let spec = law();
        assert!(spec.is_transitional_heading("TRANSITORIOS"));
        assert!(spec.is_transitional_heading("ARTÍCULOS TRANSITORIOS"));
        assert!(!spec.is_transitional_heading("Disposiciones transitorias de la ley"));
        assert!(spec.is_boilerplate("Página 7 de 80"));
        assert!(spec.is_boilerplate("DIARIO OFICIAL DE LA FEDERACIÓN"));
        assert!(!spec.is_boilerplate("Cálculo de intereses"));
    }

    #[test]
    fn test_terminal_citation() {
        let spec = law();
        assert!(spec.ends_with_citation("Párrafo reformado DOF 12-06-2015"));
        assert!(spec.ends_with_citation("(Se deroga)"));
        assert!(!spec.ends_with_citation("los contribuyentes que"));
    }

    #[test]
    fn test_cited_codes() {
        let spec = law();
        let codes = spec.cited_codes("conforme al artículo 27 del CFF y el artículo 5 de la LXYZ.");
        assert_eq!(codes, vec!["CFF".to_string(), "LXYZ".to_string()]);
    }
}
