//! Built-in document types.

use std::collections::BTreeMap;

use crate::config::{LayoutThresholds, DEFAULT_MIN_NAME_LENGTH};
use crate::types::DivisionKind;

use super::spec::DocumentTypeConfig;

/// Number alternatives shared by division headers: Roman, digits, ordinal word.
const DIVISION_NUMBER: &str = r"(?P<number>[IVXLCDM]+|\d+|[A-ZÁÉÍÓÚ]+)\b\.?";

/// Optional name after a division number on the same line.
const DIVISION_NAME: &str = r"(?:(?:\s*[-–:.]\s*|\s+)(?P<name>\S.*?))?\s*$";

/// Latin multiplicative suffixes.
const LATIN: &str = r"(?i:bis|ter|qu[áa]ter|quinquies|sexies|septies|octies|nonies|decies)";

/// Spanish ordinal words used by transitional articles.
const ORDINAL_WORDS: &str =
    r"(?i:primero|segundo|tercero|cuarto|quinto|sexto|s[ée]ptimo|octavo|noveno|d[ée]cimo|[úu]nico)";

/// Legislative-change keyword opening an annotation.
const CHANGE_KEYWORD: &str =
    r"(?:reformad[oa]s?|adicionad[oa]s?|derogad[oa]s?|amended|added|repealed)\b";

fn division_pattern(keywords: &str) -> String {
    format!(r"^\s*(?:{keywords})\s+{DIVISION_NUMBER}{DIVISION_NAME}")
}

fn annotation_pattern() -> String {
    format!(r"(?i)\b{CHANGE_KEYWORD}.*\b\d{{1,2}}[-/]\d{{1,2}}[-/]\d{{4}}\b")
}

fn common_noise() -> Vec<String> {
    vec![
        r"^\s*\d{1,4}\s*$".to_string(),
        r"^\s*(?i:p[áa]gina|page)\s+\d+(?:\s+(?i:de|of)\s+\d+)?\s*$".to_string(),
        r"(?i)^\s*c[áa]mara de diputados del h\. congreso de la uni[óo]n\s*$".to_string(),
        r"(?i)^\s*secretar[íi]a general\s*$".to_string(),
        r"(?i)^\s*secretar[íi]a de servicios parlamentarios\s*$".to_string(),
        r"(?i)^\s*[úu]ltima reforma (?:publicada )?dof \d{1,2}[-/]\d{1,2}[-/]\d{4}\s*$".to_string(),
    ]
}

fn common_boilerplate() -> Vec<String> {
    vec![
        r"(?i)^\s*(?:p[áa]gina|page)\s+\d+".to_string(),
        r"(?i)diario oficial".to_string(),
        r"(?i)c[áa]mara de diputados".to_string(),
        r"(?i)secretar[íi]a general".to_string(),
        r"^\s*[\d\s./-]*$".to_string(),
    ]
}

fn common_terminal() -> Vec<String> {
    vec![
        r"(?:DOF|D\.O\.F\.)\s+\d{1,2}[-/]\d{1,2}[-/]\d{4}\s*$".to_string(),
        r"(?i)\(?(?:se deroga|derogad[oa]|repealed)\)?\.?\s*$".to_string(),
    ]
}

fn division_patterns() -> BTreeMap<DivisionKind, String> {
    BTreeMap::from([
        (DivisionKind::Title, division_pattern("T[ÍI]TULO|TITLE")),
        (DivisionKind::Chapter, division_pattern("CAP[ÍI]TULO|CHAPTER")),
        (DivisionKind::Section, division_pattern("SECCI[ÓO]N|SECTION")),
    ])
}

/// Statutes numbered by article: title → chapter → section → article.
#[must_use]
pub fn law_config() -> DocumentTypeConfig {
    DocumentTypeConfig {
        code: "LAW".to_string(),
        description: "Statute organized in titles, chapters and sections of articles".to_string(),
        content_unit_kind: "article".to_string(),
        content_unit_label: "Article".to_string(),
        permitted_division_kinds: vec![
            DivisionKind::Title,
            DivisionKind::Chapter,
            DivisionKind::Section,
        ],
        division_patterns: division_patterns(),
        content_unit_pattern: format!(
            r"^\s*(?:Art[íi]culo|ART[ÍI]CULO|Article|ARTICLE)\s+(?P<number>\d+\s*[oº°]?(?:\s*[-–]?\s*[A-Z]\b)?(?:\s*[-–]?\s*{LATIN}\b)?|{ORDINAL_WORDS})\s*(?:\.\s*[-–]|\.|[-–:])\s*"
        ),
        noise_patterns: common_noise(),
        annotation_pattern: annotation_pattern(),
        unit_annotation_pattern: Some(format!(
            r"(?i)^\s*(?:art[íi]culo|article)\s+{CHANGE_KEYWORD}"
        )),
        transitional_pattern: Some(
            r"^\s*(?:ART[ÍI]CULOS?\s+)?(?:TRANSITORIOS?|TRANSITIONAL(?: PROVISIONS)?)\s*$".to_string(),
        ),
        citation_pattern: Some(
            r"(?i:art[íi]culos?|articles?)\s+[\dA-Za-z°º,\s-]{1,40}?\s+(?:de la|del|of the)\s+(?P<code>[A-Z]{2,8})\b".to_string(),
        ),
        known_document_codes: ["CPEUM", "CFF", "LISR", "LIVA", "LIEPS", "LFT", "LFD", "LA", "RCFF", "RLISR"]
            .into_iter()
            .map(String::from)
            .collect(),
        boilerplate_patterns: common_boilerplate(),
        terminal_patterns: common_terminal(),
        thresholds: LayoutThresholds::default(),
        min_name_length: DEFAULT_MIN_NAME_LENGTH,
    }
}

/// Administrative rule sets with dotted rule numbers and a heading per rule.
#[must_use]
pub fn rules_config() -> DocumentTypeConfig {
    DocumentTypeConfig {
        code: "RULES".to_string(),
        description: "Rule set with dotted rule numbers and a heading per rule".to_string(),
        content_unit_kind: "rule".to_string(),
        content_unit_label: "Rule".to_string(),
        permitted_division_kinds: vec![
            DivisionKind::Title,
            DivisionKind::Chapter,
            DivisionKind::Section,
        ],
        division_patterns: division_patterns(),
        content_unit_pattern: r"^\s*(?:Regla|REGLA|Rule|RULE)\s+(?P<number>\d+(?:\.\d+)*)\.(?:\s+(?P<heading>\S.*?))?\s*$".to_string(),
        noise_patterns: common_noise(),
        annotation_pattern: annotation_pattern(),
        unit_annotation_pattern: Some(format!(r"(?i)^\s*(?:regla|rule)\s+{CHANGE_KEYWORD}")),
        transitional_pattern: Some(r"^\s*(?:TRANSITORIOS?|TRANSITIONAL(?: PROVISIONS)?)\s*$".to_string()),
        citation_pattern: None,
        known_document_codes: Vec::new(),
        boilerplate_patterns: common_boilerplate(),
        terminal_patterns: common_terminal(),
        thresholds: LayoutThresholds::default(),
        min_name_length: DEFAULT_MIN_NAME_LENGTH,
    }
}
