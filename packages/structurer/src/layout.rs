//! Layout line preparation shared by every stage.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::doctype::DocumentTypeSpec;
use crate::types::LayoutLine;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalize line text: NFC, collapsed whitespace, trimmed.
///
/// PDF extractors often emit decomposed accents ("I" + U+0301), which would
/// otherwise slip past patterns written with precomposed characters.
#[must_use]
pub fn normalize_line_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    WHITESPACE_RUN.replace_all(composed.trim(), " ").into_owned()
}

/// Normalize every line and drop empty lines and page furniture.
#[must_use]
pub fn prepare_lines(spec: &DocumentTypeSpec, lines: &[LayoutLine]) -> Vec<LayoutLine> {
    let mut dropped = 0usize;
    let prepared: Vec<LayoutLine> = lines
        .iter()
        .filter_map(|line| {
            let text = normalize_line_text(&line.text);
            if text.is_empty() || spec.is_noise(&text) {
                dropped += 1;
                return None;
            }
            Some(line.with_text(text))
        })
        .collect();

    tracing::debug!(
        kept = prepared.len(),
        dropped,
        "Prepared layout lines"
    );
    prepared
}

/// Join line texts with newlines.
#[must_use]
pub fn join_lines(lines: &[LayoutLine]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
