//! Leading identifier markers of paragraph fragments.

use std::sync::LazyLock;

use regex::Regex;

use crate::numbering::roman_value;
use crate::types::ParagraphKind;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static FRACTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<id>[IVXLCDM]+)\.(?:\s+|$)").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SUB_ITEM_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<id>[a-zñ]{1,2})\)(?:\s+|$)").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NUMBERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<id>\d{1,3})\.(?:\s+|$)").expect("valid regex"));

/// Lines that continue the previous one: lower-case start, punctuation, or a
/// bare figure that is not a numbered marker.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WRAP_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:\p{Ll}|[,;:.)\]»"'”’%]|\d+(?:[^.\d]|$))"#).expect("valid regex")
});

/// A recognized leading marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub kind: ParagraphKind,
    /// Marker without punctuation ("IV", "b", "3").
    pub identifier: String,
    /// Byte length of the marker including trailing whitespace.
    pub len: usize,
}

/// Detect a marker at the start of a line, in priority order.
///
/// Numbered markers above `numbered_item_max` are treated as figures.
#[must_use]
pub fn detect_marker(text: &str, numbered_item_max: u32) -> Option<Marker> {
    let text = text.trim_start();

    if let Some(caps) = FRACTION_MARKER.captures(text) {
        let id = &caps["id"];
        if roman_value(id).is_some() {
            return Some(marker(ParagraphKind::Fraction, id, caps.get(0)?.end()));
        }
    }

    if let Some(caps) = SUB_ITEM_MARKER.captures(text) {
        return Some(marker(ParagraphKind::SubItem, &caps["id"], caps.get(0)?.end()));
    }

    if let Some(caps) = NUMBERED_MARKER.captures(text) {
        let id = &caps["id"];
        let value: u32 = id.parse().ok()?;
        if (1..=numbered_item_max).contains(&value) {
            return Some(marker(ParagraphKind::NumberedItem, id, caps.get(0)?.end()));
        }
    }

    None
}

/// Whether a line visually continues the previous line.
#[must_use]
pub fn is_wrap(text: &str) -> bool {
    WRAP_START.is_match(text.trim_start())
}

fn marker(kind: ParagraphKind, id: &str, len: usize) -> Marker {
    Marker {
        kind,
        identifier: id.to_string(),
        len,
    }
}
