//! Geometry queries over a finished layout.
//!
//! Everything here reads a [`LayoutResult`] and never changes it. Positions
//! are in block-local coordinates; [`SpanLayout`](crate::SpanLayout) does the
//! translation by the block position.

use std::ops::Range;

use serde::Serialize;
use strum_macros::Display;

use crate::error::LayoutError;
use crate::layout::box_model::{Point, Rect};
use crate::layout::line::{LayoutResult, Line, LineSegment, SegmentKind};
use crate::measure::TextMeasurer;
use crate::object::{NO_ID, ObjectList};

/// Where a hit-test point landed relative to the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum HitTestKind {
    /// The block has no lines and no floats.
    NoObjectsAvailable,
    /// Above the first line.
    OutsideTop,
    /// Below the last line.
    OutsideBottom,
    /// Left of the content of the line at that height.
    OutsideLeft,
    /// Right of the content of the line at that height.
    OutsideRight,
    /// On a segment or a float.
    Inside,
}

/// Answer of [`hit_test`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HitTestResult {
    /// Where the point landed.
    pub kind: HitTestKind,
    /// Id of the object hit, or of the nearest one on the line; [`NO_ID`]
    /// when there is none.
    pub object_id: i32,
    /// Byte offset into the combined text nearest to the point.
    pub offset: usize,
}

impl HitTestResult {
    const fn new(kind: HitTestKind, object_id: i32, offset: usize) -> Self {
        Self {
            kind,
            object_id,
            offset,
        }
    }
}

/// Union of every line and float rectangle. Empty layouts give an empty
/// rectangle at the origin.
#[must_use]
pub fn content_rect(result: &LayoutResult) -> Rect {
    result
        .lines
        .iter()
        .map(Line::rect)
        .chain(result.floats.iter().map(|f| f.rect))
        .reduce(|a, b| a.union(&b))
        .unwrap_or_default()
}

/// One rectangle per line touched by objects with `id`, then one per float
/// with `id`, in document order.
#[must_use]
pub fn rects_by_id(result: &LayoutResult, id: i32) -> Vec<Rect> {
    let mut rects: Vec<Rect> = result
        .lines
        .iter()
        .filter_map(|line| {
            line.segments
                .iter()
                .filter(|s| s.id == id && !s.collapsed)
                .map(|s| s.rect(line))
                .reduce(|a, b| a.union(&b))
        })
        .collect();
    rects.extend(result.floats.iter().filter(|f| f.id == id).map(|f| f.rect));
    rects
}

/// Find what lies under `point`.
///
/// # Errors
///
/// Returns [`LayoutError::Measure`] if resolving the character offset inside
/// a text segment fails.
pub fn hit_test<T: TextMeasurer + ?Sized>(
    result: &LayoutResult,
    objects: &ObjectList,
    measurer: &T,
    point: Point,
) -> Result<HitTestResult, LayoutError> {
    let text = objects.combined_text();
    if result.is_empty() {
        return Ok(HitTestResult::new(HitTestKind::NoObjectsAvailable, NO_ID, 0));
    }

    if let Some(float) = result.floats.iter().find(|f| f.rect.contains(point)) {
        return Ok(HitTestResult::new(
            HitTestKind::Inside,
            float.id,
            objects.text_offset_of(float.object),
        ));
    }

    let (Some(first), Some(last)) = (result.lines.first(), result.lines.last()) else {
        let kind = if point.y < 0.0 {
            HitTestKind::OutsideTop
        } else {
            HitTestKind::OutsideBottom
        };
        return Ok(HitTestResult::new(kind, NO_ID, 0));
    };
    if point.y < first.top {
        return Ok(HitTestResult::new(HitTestKind::OutsideTop, NO_ID, 0));
    }
    if point.y >= last.bottom() {
        return Ok(HitTestResult::new(
            HitTestKind::OutsideBottom,
            NO_ID,
            text.len(),
        ));
    }

    // Lines pushed below floats leave gaps; a point in a gap belongs to the
    // line after it.
    let line = result
        .lines
        .iter()
        .find(|l| point.y < l.bottom())
        .unwrap_or(last);
    let visible: Vec<&LineSegment> = line.segments.iter().filter(|s| !s.collapsed).collect();

    let (Some(leftmost), Some(rightmost)) = (visible.first(), visible.last()) else {
        let kind = if point.x < line.left {
            HitTestKind::OutsideLeft
        } else {
            HitTestKind::OutsideRight
        };
        return Ok(HitTestResult::new(kind, NO_ID, line.text.start));
    };
    if point.x < leftmost.x {
        return Ok(HitTestResult::new(
            HitTestKind::OutsideLeft,
            leftmost.id,
            line.text.start,
        ));
    }
    let right_edge = visible
        .iter()
        .map(|s| s.x + s.width)
        .fold(f32::NEG_INFINITY, f32::max);
    if point.x >= right_edge {
        return Ok(HitTestResult::new(
            HitTestKind::OutsideRight,
            rightmost.id,
            line.text.end,
        ));
    }

    let segment = visible
        .iter()
        .find(|s| point.x < s.x + s.width)
        .unwrap_or(rightmost);
    let offset = match &segment.kind {
        SegmentKind::Text { font, range, .. } => {
            let local = measurer
                .offset_at_x(*font, &text[range.clone()], point.x - segment.x)
                .map_err(|e| LayoutError::measure(segment.object, e))?;
            range.start + local
        }
        SegmentKind::Image { .. } | SegmentKind::Component { .. } => {
            objects.text_offset_of(segment.object)
        }
    };
    Ok(HitTestResult::new(HitTestKind::Inside, segment.id, offset))
}

/// X coordinate of text `offset` within `segment`, clamped to the segment.
///
/// Offsets strictly inside the segment are measured; the ends map to the
/// segment edges, so widened justify gaps stay fully covered.
///
/// # Errors
///
/// Returns [`LayoutError::Measure`] if measuring the prefix fails.
pub fn offset_x<T: TextMeasurer + ?Sized>(
    segment: &LineSegment,
    text: &str,
    offset: usize,
    measurer: &T,
) -> Result<f32, LayoutError> {
    let SegmentKind::Text { font, range, .. } = &segment.kind else {
        return Ok(segment.x);
    };
    if offset <= range.start {
        return Ok(segment.x);
    }
    if offset >= range.end {
        return Ok(segment.x + segment.width);
    }
    let prefix = measurer
        .measure(*font, &text[range.start..offset])
        .map_err(|e| LayoutError::measure(segment.object, e))?;
    Ok(segment.x + prefix.width.min(segment.width))
}

/// Horizontal extent `(x0, x1)` of the part of `segment` inside `selected`,
/// or `None` if they do not overlap.
///
/// # Errors
///
/// Returns [`LayoutError::Measure`] if measuring fails.
pub fn selected_span<T: TextMeasurer + ?Sized>(
    segment: &LineSegment,
    text: &str,
    selected: &Range<usize>,
    measurer: &T,
) -> Result<Option<(f32, f32)>, LayoutError> {
    let Some(range) = segment.text_range() else {
        return Ok(None);
    };
    if segment.collapsed || selected.end <= range.start || selected.start >= range.end {
        return Ok(None);
    }
    let x0 = offset_x(segment, text, selected.start, measurer)?;
    let x1 = offset_x(segment, text, selected.end, measurer)?;
    Ok(Some((x0, x1)))
}

/// One rectangle per line covering the selected text on that line.
///
/// # Errors
///
/// Returns [`LayoutError::Measure`] if measuring fails.
pub fn selection_rects<T: TextMeasurer + ?Sized>(
    result: &LayoutResult,
    text: &str,
    selected: &Range<usize>,
    measurer: &T,
) -> Result<Vec<Rect>, LayoutError> {
    let mut rects = Vec::new();
    if selected.is_empty() {
        return Ok(rects);
    }
    for line in &result.lines {
        let mut span: Option<(f32, f32)> = None;
        for segment in &line.segments {
            if let Some((x0, x1)) = selected_span(segment, text, selected, measurer)? {
                span = Some(span.map_or((x0, x1), |(a, b)| (a.min(x0), b.max(x1))));
            }
        }
        if let Some((x0, x1)) = span {
            rects.push(Rect::new(x0, line.top, x1 - x0, line.height));
        }
    }
    Ok(rects)
}

/// Caret rectangle for text offset `pos`.
///
/// The caret is 1px wide, or as wide as the character after it in
/// overwrite mode. `None` if there are no lines.
///
/// # Errors
///
/// Returns [`LayoutError::Measure`] if measuring fails.
pub fn cursor_rect<T: TextMeasurer + ?Sized>(
    result: &LayoutResult,
    text: &str,
    pos: usize,
    overwrite: bool,
    measurer: &T,
) -> Result<Option<Rect>, LayoutError> {
    // At a wrap boundary the caret goes to the start of the later line.
    let Some(line) = result
        .lines
        .iter()
        .rev()
        .find(|l| l.text.start <= pos)
        .or_else(|| result.lines.first())
    else {
        return Ok(None);
    };

    let mut x = line
        .segments
        .iter()
        .find(|s| !s.collapsed)
        .map_or(line.left, |s| s.x);
    let mut width = 1.0;
    for segment in &line.segments {
        let SegmentKind::Text { font, range, .. } = &segment.kind else {
            continue;
        };
        if range.start > pos {
            break;
        }
        x = offset_x(segment, text, pos, measurer)?;
        if overwrite
            && pos < range.end
            && let Some(ch) = text[pos..].chars().next()
        {
            width = measurer
                .measure(*font, &text[pos..pos + ch.len_utf8()])
                .map_err(|e| LayoutError::measure(segment.object, e))?
                .width;
        }
    }
    Ok(Some(Rect::new(x, line.top, width, line.height)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorValue;
    use crate::layout::inline::layout_inline;
    use crate::measure::ApproximateMetrics;

    /// 8px per character, 20px lines.
    fn laid_out(text: &str, width: f32) -> (ApproximateMetrics, ObjectList, LayoutResult) {
        let mut metrics = ApproximateMetrics::new();
        let font = metrics.add_font(16.0);
        let mut objects = ObjectList::new();
        objects.push_text(text, font, ColorValue::BLACK, 1);
        let result = layout_inline(&objects, width, &metrics).unwrap();
        (metrics, objects, result)
    }

    #[test]
    fn test_hit_inside_resolves_offset() {
        let (metrics, objects, result) = laid_out("hello world", 500.0);
        let hit = hit_test(&result, &objects, &metrics, Point::new(13.0, 5.0)).unwrap();
        assert_eq!(hit, HitTestResult::new(HitTestKind::Inside, 1, 2));

        // Second word: "world" starts at x=48, byte 6.
        let hit = hit_test(&result, &objects, &metrics, Point::new(62.0, 5.0)).unwrap();
        assert_eq!(hit.offset, 6 + 2);
    }

    #[test]
    fn test_hit_outside_left_and_right() {
        let (metrics, objects, result) = laid_out("ab cd", 24.0);
        // Second line is "cd", bytes 3..5.
        let right = hit_test(&result, &objects, &metrics, Point::new(100.0, 25.0)).unwrap();
        assert_eq!(right.kind, HitTestKind::OutsideRight);
        assert_eq!(right.offset, 5);
        let left = hit_test(&result, &objects, &metrics, Point::new(-1.0, 25.0)).unwrap();
        assert_eq!(left.kind, HitTestKind::OutsideLeft);
        assert_eq!(left.offset, 3);
    }

    #[test]
    fn test_selection_rects_one_per_line() {
        let (metrics, objects, result) = laid_out("aaa bbb ccc", 60.0);
        // Select "bb ccc" (bytes 5..11): the end of line 1 and all of line 2.
        let rects = selection_rects(&result, objects.combined_text(), &(5..11), &metrics).unwrap();
        assert_eq!(
            rects,
            vec![Rect::new(40.0, 0.0, 16.0, 20.0), Rect::new(0.0, 20.0, 24.0, 20.0)]
        );
    }

    #[test]
    fn test_cursor_rect_follows_line() {
        let (metrics, objects, result) = laid_out("aaa bbb ccc", 60.0);
        let text = objects.combined_text();
        let bar = cursor_rect(&result, text, 9, false, &metrics).unwrap();
        assert_eq!(bar, Some(Rect::new(8.0, 20.0, 1.0, 20.0)));
        let block = cursor_rect(&result, text, 1, true, &metrics).unwrap();
        assert_eq!(block, Some(Rect::new(8.0, 0.0, 8.0, 20.0)));
        let end = cursor_rect(&result, text, 11, false, &metrics).unwrap();
        assert_eq!(end, Some(Rect::new(24.0, 20.0, 1.0, 20.0)));
    }

    #[test]
    fn test_rects_by_id_unknown_is_empty() {
        let (_, _, result) = laid_out("abc", 100.0);
        assert!(rects_by_id(&result, 42).is_empty());
        assert_eq!(rects_by_id(&result, 1), vec![Rect::new(0.0, 0.0, 24.0, 20.0)]);
    }
}
