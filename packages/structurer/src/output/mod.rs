//! Serialized output: structure tree, content list and quality report.

mod entries;
mod writer;

pub use entries::{
    ContentEntry, DocumentOutput, IssueEntry, ParagraphEntry, QualityEntry, StructureEntry,
};
pub use writer::{
    generate_json, generate_yaml, load_output, output_paths, save_output, OutputFormat,
};
