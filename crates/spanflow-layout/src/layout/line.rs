//! Output of the flow engine: lines, positioned segments and placed floats.
//!
//! All coordinates are relative to the block origin. The whole result is
//! rebuilt by every layout pass.

use std::ops::Range;

use serde::Serialize;

use super::box_model::{Rect, Size};
use super::float::FloatSide;
use crate::color::ColorValue;
use crate::object::{ComponentId, FontId, ImageId};

/// Why a line ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BreakReason {
    /// The next unit did not fit.
    Wrap,
    /// An explicit newline in the text.
    Newline,
    /// The object sequence ran out.
    End,
}

/// Content of a positioned segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SegmentKind {
    /// A word or whitespace run from a text object.
    Text {
        /// Font the text is drawn with.
        font: FontId,
        /// Text color.
        color: ColorValue,
        /// Byte range into the combined text.
        range: Range<usize>,
        /// Whether the range is a whitespace run.
        whitespace: bool,
    },
    /// An inline image.
    Image {
        /// Image handle.
        image: ImageId,
    },
    /// An inline component.
    Component {
        /// Component handle.
        component: ComponentId,
    },
}

/// The placed form of (part of) an inline object on one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSegment {
    /// Index of the originating object.
    pub object: usize,
    /// Id copied from the originating object.
    pub id: i32,
    /// What the segment shows.
    pub kind: SegmentKind,
    /// Left edge, relative to the block origin.
    pub x: f32,
    /// Advance width.
    pub width: f32,
    /// Height above the line's baseline.
    pub ascender: f32,
    /// Depth below the line's baseline.
    pub descender: f32,
    /// Baseline shift of images and components (0 for text).
    pub baseline_offset: f32,
    /// Line-leading whitespace dropped by a wrap; it has no width.
    pub collapsed: bool,
}

impl LineSegment {
    /// Whether this is a whitespace text segment.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self.kind, SegmentKind::Text { whitespace: true, .. })
    }

    /// Text range for text segments.
    #[must_use]
    pub fn text_range(&self) -> Option<Range<usize>> {
        match &self.kind {
            SegmentKind::Text { range, .. } => Some(range.clone()),
            _ => None,
        }
    }

    /// Rectangle of the segment on `line`.
    #[must_use]
    pub fn rect(&self, line: &Line) -> Rect {
        Rect::new(
            self.x,
            line.baseline() - self.ascender,
            self.width,
            self.ascender + self.descender,
        )
    }
}

/// One line produced by the flow engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    /// Top edge, relative to the block origin.
    pub top: f32,
    /// `ascender + descender`.
    pub height: f32,
    /// Largest ascender over the segments (baseline is `top + ascender`).
    pub ascender: f32,
    /// Largest descender over the segments.
    pub descender: f32,
    /// Content width, including interior whitespace but not trailing
    /// whitespace.
    pub width: f32,
    /// Left edge of the band the line was broken against.
    pub left: f32,
    /// Width of that band (block width minus floats beside the line).
    pub available: f32,
    /// Why the line ended.
    pub break_reason: BreakReason,
    /// Byte range of the combined text the line covers, not counting the
    /// newline that ended it.
    pub text: Range<usize>,
    /// Segments in document order.
    pub segments: Vec<LineSegment>,
}

impl Line {
    /// Y coordinate of the baseline.
    #[must_use]
    pub fn baseline(&self) -> f32 {
        self.top + self.ascender
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Rectangle of the line's content. Hanging trailing whitespace is not
    /// included. Empty lines give a zero-width rectangle at the band's left
    /// edge.
    #[must_use]
    pub fn rect(&self) -> Rect {
        let start = self
            .segments
            .iter()
            .find(|s| !s.collapsed)
            .map_or(self.left, |s| s.x);
        Rect::new(start, self.top, self.width, self.height)
    }
}

/// A float reserved during layout, kept for drawing and queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedFloat {
    /// Index of the originating object.
    pub object: usize,
    /// Id copied from the originating object.
    pub id: i32,
    /// Edge the float was pulled to.
    pub side: FloatSide,
    /// Image or component content (never text).
    pub kind: SegmentKind,
    /// Final rectangle, relative to the block origin.
    pub rect: Rect,
}

/// Everything one layout pass produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutResult {
    /// Lines in document order.
    pub lines: Vec<Line>,
    /// Floats in placement order.
    pub floats: Vec<PlacedFloat>,
    /// Width the lines need without wrapping further: widest line plus the
    /// floats beside it.
    pub natural_width: f32,
    /// Height down to the lower of the last line and the lowest float.
    pub height: f32,
}

impl LayoutResult {
    /// Natural size of the content.
    #[must_use]
    pub const fn natural_size(&self) -> Size {
        Size::new(self.natural_width, self.height)
    }

    /// Whether the pass produced neither lines nor floats.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.floats.is_empty()
    }
}
