//! Span layout engine for mixed text, images and embedded components.
//!
//! # Scope
//!
//! This crate implements:
//! - **Inline object model** ([`object`])
//!   - Text runs sharing one text buffer, images, components
//!   - Inline or floated to the left or right edge
//!
//! - **Measurement boundary** ([`measure`])
//!   - [`TextMeasurer`], [`ObjectSizer`] and [`ComponentHost`] traits
//!   - [`ApproximateMetrics`] for font-less layout and tests
//!
//! - **Flow engine** ([`layout`])
//!   - Greedy line breaking at word boundaries, explicit newlines
//!   - Float reservation with content flowing beside floats
//!   - Left, right, center and justified alignment
//!
//! - **Queries** ([`query`], [`SpanLayout`])
//!   - Hit-testing to a text offset, rectangles by id
//!   - Preferred size, first and last baseline
//!   - Selection and caret geometry
//!
//! - **Painting** ([`paint`])
//!   - Drawing through a caller-supplied [`RenderSurface`]
//!   - Ellipsis truncation against a clip rectangle
//!
//! # Not Implemented
//!
//! - Bidirectional text and complex shaping
//! - Hyphenation and mid-word breaking
//! - Rasterization (the caller's surface draws)
//!
//! # Example
//!
//! ```
//! use spanflow_layout::{ApproximateMetrics, ColorValue, Size, SpanLayout};
//!
//! let mut metrics = ApproximateMetrics::new();
//! let font = metrics.add_font(16.0);
//!
//! let mut block = SpanLayout::new(metrics);
//! block.add_text("hello world", font, ColorValue::WHITE, 1);
//! block.layout(f32::INFINITY).unwrap();
//! assert_eq!(block.find_preferred_size().unwrap(), Size::new(88.0, 20.0));
//! ```

/// The span layout block and its state machine.
pub mod block;
/// RGBA colors.
pub mod color;
/// Measurement and layout errors.
pub mod error;
/// Line breaking, floats and alignment.
pub mod layout;
/// Text measurement and object sizing traits.
pub mod measure;
/// Inline objects and their handles.
pub mod object;
/// Drawing through a render surface.
pub mod paint;
/// Hit-testing and geometry queries.
pub mod query;
/// Selection and caret state.
pub mod selection;

pub use block::SpanLayout;
pub use color::ColorValue;
pub use error::{LayoutError, MeasureError};
pub use layout::{
    Alignment, BreakReason, FloatSide, LayoutResult, Line, LineSegment, PlacedFloat, Point, Rect,
    SegmentKind, Size,
};
pub use measure::{
    ApproximateMetrics, ComponentHost, FontMetrics, LayoutEnvironment, ObjectSizer, TextExtent,
    TextMeasurer,
};
pub use object::{ComponentId, FontId, ImageId, NO_ID};
pub use paint::{DisplayCommand, DisplayList, RenderSurface};
pub use query::{HitTestKind, HitTestResult};
