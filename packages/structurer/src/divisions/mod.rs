//! Division tree construction.
//!
//! Division headers are matched line by line in document order. Parentage
//! comes from declaration order and the permitted nesting of the document
//! type, tracked in an explicit [`TraversalContext`].

mod builder;
mod context;
mod tree;

pub use builder::{
    DivisionScan, DivisionTreeBuilder, PRELIMINARY_DISPLAY_NAME, SOLE_CHAPTER_DISPLAY_NAME,
};
pub use context::TraversalContext;
pub use tree::DivisionTree;
