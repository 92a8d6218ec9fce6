//! Document type configuration and its compiled form.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{validate_document_code, LayoutThresholds, DEFAULT_MIN_NAME_LENGTH};
use crate::error::{Result, StructurerError};
use crate::types::{DivisionKind, UnitKind};

/// Declarative, serializable description of one document type.
///
/// Patterns are plain strings here; [`DocumentTypeSpec::compile`] turns them
/// into regexes once so that dispatch at run time is a lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTypeConfig {
    /// Registry key (e.g. "LAW").
    pub code: String,

    #[serde(default)]
    pub description: String,

    /// Kind of content unit ("article" or "rule").
    pub content_unit_kind: String,

    /// Word used for the unit in synthesized text ("Article").
    pub content_unit_label: String,

    /// Permitted division kinds, shallowest first.
    pub permitted_division_kinds: Vec<DivisionKind>,

    /// Header pattern per division kind. Needs a `number` group, may have `name`.
    pub division_patterns: BTreeMap<DivisionKind, String>,

    /// Content unit header pattern. Needs a `number` group, may have `heading`.
    pub content_unit_pattern: String,

    /// Lines to drop before any stage runs (page numbers, running headers).
    #[serde(default)]
    pub noise_patterns: Vec<String>,

    /// Reform annotation pattern (date plus legislative-change keyword).
    pub annotation_pattern: String,

    /// Annotation that amends a whole content unit rather than one paragraph.
    #[serde(default)]
    pub unit_annotation_pattern: Option<String>,

    /// Heading that opens the transitional provisions.
    #[serde(default)]
    pub transitional_pattern: Option<String>,

    /// Cross-document citation pattern. Needs a `code` group.
    #[serde(default)]
    pub citation_pattern: Option<String>,

    /// Document codes a citation may refer to.
    #[serde(default)]
    pub known_document_codes: Vec<String>,

    /// Footer and boilerplate text that must never be used as a heading.
    #[serde(default)]
    pub boilerplate_patterns: Vec<String>,

    /// Endings that count as a complete body even without terminal punctuation.
    #[serde(default)]
    pub terminal_patterns: Vec<String>,

    #[serde(default)]
    pub thresholds: LayoutThresholds,

    #[serde(default = "default_min_name_length")]
    pub min_name_length: usize,
}

fn default_min_name_length() -> usize {
    DEFAULT_MIN_NAME_LENGTH
}

/// Compiled document type: patterns per role, ready for matching.
#[derive(Debug, Clone)]
pub struct DocumentTypeSpec {
    pub code: String,
    pub description: String,
    pub unit_kind: UnitKind,
    pub unit_label: String,
    pub permitted_kinds: Vec<DivisionKind>,
    pub division_patterns: Vec<(DivisionKind, Regex)>,
    pub unit_pattern: Regex,
    pub noise_patterns: Vec<Regex>,
    pub annotation_pattern: Regex,
    pub unit_annotation_pattern: Option<Regex>,
    pub transitional_pattern: Option<Regex>,
    pub citation_pattern: Option<Regex>,
    pub known_document_codes: Vec<String>,
    pub boilerplate_patterns: Vec<Regex>,
    pub terminal_patterns: Vec<Regex>,
    pub thresholds: LayoutThresholds,
    pub min_name_length: usize,
}

impl DocumentTypeSpec {
    /// Compile a configuration, validating its shape.
    pub fn compile(config: &DocumentTypeConfig) -> Result<Self> {
        validate_document_code(&config.code)?;

        let unit_kind = UnitKind::from_label(&config.content_unit_kind).ok_or_else(|| {
            StructurerError::InvalidConfig(format!(
                "{}: unknown content unit kind '{}'",
                config.code, config.content_unit_kind
            ))
        })?;

        if config.permitted_division_kinds.is_empty() {
            return Err(StructurerError::InvalidConfig(format!(
                "{}: no permitted division kinds",
                config.code
            )));
        }

        let mut permitted_kinds = config.permitted_division_kinds.clone();
        permitted_kinds.sort();
        permitted_kinds.dedup();

        for kind in config.division_patterns.keys() {
            if !permitted_kinds.contains(kind) {
                return Err(StructurerError::InvalidConfig(format!(
                    "{}: pattern given for non-permitted division kind '{}'",
                    config.code,
                    kind.as_str()
                )));
            }
        }

        // Most specific (deepest) first
        let mut division_patterns = Vec::new();
        for kind in permitted_kinds.iter().rev() {
            let pattern = config.division_patterns.get(kind).ok_or_else(|| {
                StructurerError::InvalidConfig(format!(
                    "{}: missing pattern for division kind '{}'",
                    config.code,
                    kind.as_str()
                ))
            })?;
            let regex = compile_pattern(&format!("{} division", kind.as_str()), pattern)?;
            require_group(&config.code, &regex, "number")?;
            division_patterns.push((*kind, regex));
        }

        let unit_pattern = compile_pattern("content unit", &config.content_unit_pattern)?;
        require_group(&config.code, &unit_pattern, "number")?;

        let citation_pattern = config
            .citation_pattern
            .as_deref()
            .map(|p| compile_pattern("citation", p))
            .transpose()?;
        if let Some(regex) = &citation_pattern {
            require_group(&config.code, regex, "code")?;
        }

        Ok(Self {
            code: config.code.clone(),
            description: config.description.clone(),
            unit_kind,
            unit_label: config.content_unit_label.clone(),
            permitted_kinds,
            division_patterns,
            unit_pattern,
            noise_patterns: compile_all("noise", &config.noise_patterns)?,
            annotation_pattern: compile_pattern("annotation", &config.annotation_pattern)?,
            unit_annotation_pattern: config
                .unit_annotation_pattern
                .as_deref()
                .map(|p| compile_pattern("unit annotation", p))
                .transpose()?,
            transitional_pattern: config
                .transitional_pattern
                .as_deref()
                .map(|p| compile_pattern("transitional", p))
                .transpose()?,
            citation_pattern,
            known_document_codes: config.known_document_codes.clone(),
            boilerplate_patterns: compile_all("boilerplate", &config.boilerplate_patterns)?,
            terminal_patterns: compile_all("terminal", &config.terminal_patterns)?,
            thresholds: config.thresholds,
            min_name_length: config.min_name_length,
        })
    }

    /// Whether a division kind is permitted in this document type.
    #[must_use]
    pub fn permits(&self, kind: DivisionKind) -> bool {
        self.permitted_kinds.contains(&kind)
    }

    /// The nearest permitted kind shallower than `kind`.
    #[must_use]
    pub fn parent_kind(&self, kind: DivisionKind) -> Option<DivisionKind> {
        self.permitted_kinds
            .iter()
            .rev()
            .find(|k| k.depth() < kind.depth())
            .copied()
    }

    /// The shallowest permitted kind.
    #[must_use]
    pub fn root_kind(&self) -> Option<DivisionKind> {
        self.permitted_kinds.first().copied()
    }
}

fn compile_pattern(role: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| StructurerError::InvalidPattern {
        role: role.to_string(),
        pattern: pattern.to_string(),
        source,
    })
}

fn compile_all(role: &str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| compile_pattern(role, p)).collect()
}

fn require_group(code: &str, regex: &Regex, group: &str) -> Result<()> {
    if regex.capture_names().flatten().any(|name| name == group) {
        Ok(())
    } else {
        Err(StructurerError::InvalidConfig(format!(
            "{code}: pattern '{}' has no '{group}' group",
            regex.as_str()
        )))
    }
}
