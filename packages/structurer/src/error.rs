//! Error types for the structurer.
//!
//! Only conditions that abort a document end up here. Problems that leave a
//! content unit usable (numbering gaps, overflowing text, corrupted headings)
//! are recorded as [`crate::validation::Problem`] values in the quality report.

use thiserror::Error;

/// Main error type for the structurer library.
#[derive(Debug, Error)]
pub enum StructurerError {
    /// A configured pattern failed to compile.
    #[error("Invalid {role} pattern '{pattern}': {source}")]
    InvalidPattern {
        role: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// No document type registered under this code.
    #[error("Unknown document type: '{0}'")]
    UnknownDocumentType(String),

    /// Document type code has the wrong shape.
    #[error("Invalid document type code: '{0}'. Expected uppercase letters, digits, '-' or '_' (e.g., LAW)")]
    InvalidDocumentCode(String),

    /// Document type configuration is structurally invalid.
    #[error("Invalid document type configuration: {0}")]
    InvalidConfig(String),

    /// A content unit could not be mapped to any division.
    #[error("Content unit {unit} could not be assigned to a division")]
    AssignmentFailure { unit: String },

    /// A paragraph points at itself or at a later paragraph.
    #[error("Paragraph {paragraph} of content unit {unit} has a cyclic or forward parent reference")]
    CyclicParagraph { unit: String, paragraph: usize },

    /// Output files on disk do not belong together.
    #[error("Inconsistent output: {0}")]
    InconsistentOutput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Result type alias for structurer operations.
pub type Result<T> = std::result::Result<T, StructurerError>;
