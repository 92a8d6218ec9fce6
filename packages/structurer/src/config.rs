//! Configuration constants and validation functions for the structurer.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::{Result, StructurerError};

/// Default document type used when the caller does not name one.
pub const DEFAULT_DOCUMENT_TYPE: &str = "LAW";

/// Vertical gap (in points) at or above which a line starts a new fragment.
///
/// Roughly 1.5x the line height of a 9pt body font.
pub const DEFAULT_VERTICAL_GAP_THRESHOLD: f32 = 14.0;

/// Width (in points) of one indentation bucket.
pub const DEFAULT_INDENT_GRID: f32 = 10.0;

/// Minimum horizontal offset (in points) that counts as extra indentation.
pub const DEFAULT_INDENT_TOLERANCE: f32 = 2.0;

/// Largest value accepted as a numbered-item marker.
///
/// Anything bigger is almost always an amount or a year at line start.
pub const DEFAULT_NUMBERED_ITEM_MAX: u32 = 50;

/// Minimum number of characters for a line to count as a division name.
pub const DEFAULT_MIN_NAME_LENGTH: usize = 4;

/// Document type code pattern.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DOCUMENT_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_-]{1,31}$").expect("valid regex"));

/// Layout calibration for one document family.
///
/// These values are tuned per source layout, not derived from a model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutThresholds {
    /// Vertical gap that separates paragraphs.
    pub vertical_gap_threshold: f32,

    /// Width of one indentation bucket.
    pub indent_grid: f32,

    /// Minimum offset that counts as extra indentation.
    pub indent_tolerance: f32,

    /// Cap for numbered-item markers.
    pub numbered_item_max: u32,
}

impl Default for LayoutThresholds {
    fn default() -> Self {
        Self {
            vertical_gap_threshold: DEFAULT_VERTICAL_GAP_THRESHOLD,
            indent_grid: DEFAULT_INDENT_GRID,
            indent_tolerance: DEFAULT_INDENT_TOLERANCE,
            numbered_item_max: DEFAULT_NUMBERED_ITEM_MAX,
        }
    }
}

impl LayoutThresholds {
    /// Round an x position to its indentation bucket.
    #[must_use]
    pub fn bucket(&self, x: f32) -> i32 {
        let grid = if self.indent_grid > 0.0 {
            self.indent_grid
        } else {
            DEFAULT_INDENT_GRID
        };
        #[allow(clippy::cast_possible_truncation)]
        let bucket = (x / grid).round() as i32;
        bucket
    }
}

/// Validate a document type code.
///
/// # Examples
/// ```
/// use regelrecht_structurer::config::validate_document_code;
///
/// assert!(validate_document_code("LAW").is_ok());
/// assert!(validate_document_code("RULES-2024").is_ok());
/// assert!(validate_document_code("law").is_err());
/// ```
pub fn validate_document_code(code: &str) -> Result<()> {
    if DOCUMENT_CODE_PATTERN.is_match(code) {
        Ok(())
    } else {
        Err(StructurerError::InvalidDocumentCode(code.to_string()))
    }
}
