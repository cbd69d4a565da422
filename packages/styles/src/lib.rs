//! Inline style ranges for Obojobo text
//!
//! Every line of text in a draft carries a list of [`StyleRange`]s. This crate
//! holds the range arithmetic (comparison, removal, normalization) and the
//! [`StyledText`] wrapper that keeps ranges in step with edits.

pub mod chunk_style_list;
pub mod style_range;
pub mod style_type;
pub mod styled_text;
pub mod utf16;

pub use chunk_style_list::{ChunkStyleList, StyleComparisons};
pub use style_range::{RangeComparison, StyleRange};
pub use style_type::StyleType;
pub use styled_text::{Marks, StyledText, TextRun};
