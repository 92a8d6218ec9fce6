//! Multi-source reconciliation.
//!
//! Each content unit moves through `unchecked → first_pass_ok |
//! first_pass_flagged → second_pass_attempted → resolved | unresolved`.
//! The first pass is pure; the second pass re-extracts flagged units from
//! alternate [`ExtractionSource`]s and applies ordered [`CorrectionRule`]s,
//! recording every attempt in the unit's [`QualityRecord`].

mod checks;
mod rules;
mod sources;
mod types;
mod validator;

pub use checks::{
    annotation_overflow, check_numbering, citation_problems, ends_complete, header_overflow,
    paragraph_problems, text_problems, CheckContext,
};
pub use rules::{
    default_rules, default_title, AnnotationOverflowRule, BoilerplateTitleRule, CorrectionRule,
    HeaderOverflowRule,
};
pub use sources::{ExtractionSource, RawUnit, SourceKind, UnitIndex};
pub use types::{
    Problem, ProblemKind, QualityIssue, QualityRecord, QualityStatus, Resolution, Severity,
    ValidationState,
};
pub use validator::{ValidationSummary, Validator, REFETCH_METHOD};
