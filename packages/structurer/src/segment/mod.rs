//! Content unit segmentation.
//!
//! Unit header matches delimit bodies; trailing reform annotations are split
//! off so they never reach paragraph resolution.

mod annotations;
mod segmenter;

pub use annotations::{parse_annotation, split_trailing_annotations};
pub use segmenter::{outline_numbers, Segmenter};
