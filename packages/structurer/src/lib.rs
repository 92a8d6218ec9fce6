//! RegelRecht Structurer - Rebuild legal document structure from layout lines.
//!
//! Takes the positioned lines a PDF layout extractor produces for a statute or
//! rule set and reconstructs its hierarchy: titles, chapters and sections,
//! the articles or rules inside them, and the paragraph tree inside each unit.
//! Every unit carries a quality record; suspect text is re-checked against
//! alternate extractions before it is reported as unresolved.
//!
//! # Example
//!
//! ```
//! use regelrecht_structurer::{create_default_registry, normalize_number};
//!
//! let registry = create_default_registry().unwrap();
//! assert!(registry.get("LAW").is_ok());
//! assert_eq!(normalize_number("4o A").unwrap().canonical(), "4o-A");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Calibration constants and validation
//! - [`types`]: Layout inputs, divisions, content units, paragraphs
//! - [`error`]: Error types and Result alias
//! - [`doctype`]: Per-document-type patterns and the registry
//! - [`numbering`]: Unit number normalization
//! - [`layout`]: Line normalization and noise filtering
//! - [`divisions`]: Division tree builder
//! - [`segment`]: Content unit segmentation
//! - [`assignment`]: Division assignment
//! - [`paragraphs`]: Paragraph hierarchy from indentation
//! - [`validation`]: Two-pass multi-source validation
//! - [`gaps`]: Numbering gaps and placeholders
//! - [`pipeline`]: End-to-end processing
//! - [`output`]: Structure, content and quality files
//! - [`cli`]: Command-line interface

pub mod assignment;
pub mod cli;
pub mod config;
pub mod divisions;
pub mod doctype;
pub mod error;
pub mod gaps;
pub mod layout;
pub mod numbering;
pub mod output;
pub mod paragraphs;
pub mod pipeline;
pub mod segment;
pub mod types;
pub mod validation;

// Re-export main functions
pub use pipeline::{process_document, AlternateInputs, StructuredDocument};

// Re-export commonly used items
pub use config::{validate_document_code, LayoutThresholds};
pub use doctype::{create_default_registry, DocumentTypeConfig, DocumentTypeRegistry, DocumentTypeSpec};
pub use error::{Result, StructurerError};
pub use numbering::{normalize_number, NormalizedNumber};
pub use output::{load_output, save_output, DocumentOutput, OutputFormat};
pub use types::{
    ContentUnit, Division, DivisionKind, LayoutDocument, LayoutLine, OutlineEntry, Paragraph,
    ParagraphKind, UnitKind,
};
