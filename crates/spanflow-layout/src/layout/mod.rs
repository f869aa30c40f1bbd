//! Span layout engine
//!
//! Turns an ordered sequence of inline objects into lines of positioned
//! segments, with floats reserved along the block's edges.
//!
//! # Pipeline
//!
//! ```text
//! ObjectList → segment_units → layout_inline → align_lines → LayoutResult
//!                                   ↕
//!                              FloatContext
//! ```
//!
//! # Module Structure
//!
//! - [`box_model`] - Points, sizes and rectangles
//! - [`segment`] - Splitting text runs into words, whitespace and newlines
//! - [`float`] - Float reservation and the bands left beside them
//! - [`inline`] - Greedy line breaking
//! - [`line`] - Lines, segments and placed floats
//! - [`align`] - Left, right, center and justified alignment

pub mod align;
pub mod box_model;
pub mod float;
pub mod inline;
pub mod line;
pub mod segment;

// Re-exports for convenience
pub use align::{Alignment, align_lines};
pub use box_model::{Point, Rect, Size};
pub use float::{FloatContext, FloatSide};
pub use inline::layout_inline;
pub use line::{BreakReason, LayoutResult, Line, LineSegment, PlacedFloat, SegmentKind};
pub use segment::{TextUnit, UnitKind, segment_units};
