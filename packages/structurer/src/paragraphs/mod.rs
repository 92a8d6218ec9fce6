//! Paragraph hierarchy resolution.
//!
//! Sub-paragraph boundaries come from layout, not markup: lines are merged
//! into fragments by indentation and vertical spacing, typed by their leading
//! marker, and nested by indentation bucket. A parent is always emitted
//! before its child, so the result is a forest.

mod consolidate;
mod markers;
mod resolver;

pub use consolidate::{consolidate, Fragment};
pub use markers::{detect_marker, is_wrap, Marker};
pub use resolver::{verify_forest, ParagraphResolver};
