//! Per-document-type configuration and structural pattern matching.
//!
//! Each document type is a tagged configuration table holding compiled
//! patterns per role (division headers, content unit headers, noise,
//! annotations). Dispatch is a registry lookup by document code.

mod builtin;
mod matcher;
mod registry;
mod spec;

pub use builtin::{law_config, rules_config};
pub use matcher::{DivisionMatch, UnitHeaderMatch};
pub use registry::{create_default_registry, DocumentTypeFile, DocumentTypeRegistry};
pub use spec::{DocumentTypeConfig, DocumentTypeSpec};
