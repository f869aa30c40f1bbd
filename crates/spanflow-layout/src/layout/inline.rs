//! Line breaking and inline flow.
//!
//! The flow engine walks the object sequence once, in document order:
//!
//! 1. Text runs are split into words, whitespace runs and newlines
//!    ([`segment_units`]).
//! 2. Words, inline images and inline components are atomic: if one does
//!    not fit beside what is already on the line, the line is finished and
//!    the unit starts the next one. A unit that does not fit on an empty
//!    line is placed anyway (no hyphenation, no mid-word breaks).
//! 3. Whitespace that fits stays on its line as trailing whitespace and
//!    does not count towards the line's width. Whitespace that would lead a
//!    line opened by a wrap is kept as a collapsed, zero-width segment.
//! 4. Floats are reserved beside the current line when they fit, otherwise
//!    they are deferred to the top of the next line.
//!
//! Segment positions are accumulated relative to the line start and shifted
//! by the float-reduced band's left edge when the line is finished.

use log::debug;
#[cfg(feature = "layout-trace")]
use log::trace;
use spanflow_common::warning::warn_once;

use super::box_model::Size;
use super::float::{FloatContext, FloatSide};
use super::line::{BreakReason, LayoutResult, Line, LineSegment, PlacedFloat, SegmentKind};
use super::segment::{TextUnit, UnitKind, segment_units};
use crate::color::ColorValue;
use crate::error::LayoutError;
use crate::measure::LayoutEnvironment;
use crate::object::{FontId, InlineObject, ObjectKind, ObjectList};

/// Lay out `objects` into lines no wider than `max_width`.
///
/// `max_width` may be `f32::INFINITY` for an unwrapped layout. Negative or
/// NaN widths are clamped to 0.
///
/// # Errors
///
/// Returns [`LayoutError::Measure`] if a measurement collaborator fails.
pub fn layout_inline<E: LayoutEnvironment + ?Sized>(
    objects: &ObjectList,
    max_width: f32,
    env: &E,
) -> Result<LayoutResult, LayoutError> {
    let max_width = clamp_max_width(max_width);
    if objects.is_empty() {
        return Ok(LayoutResult::default());
    }

    let mut flow = InlineLayout::new(env, max_width);
    let text = objects.combined_text();

    for (index, object) in objects.objects().iter().enumerate() {
        match (&object.kind, object.float) {
            (ObjectKind::Text { range, font, color }, _) => {
                let style = TextStyle {
                    object: index,
                    id: object.id,
                    font: *font,
                    color: *color,
                };
                for unit in segment_units(text, range.clone()) {
                    flow.add_text_unit(&style, &unit, &text[unit.range.clone()])?;
                }
            }
            (_, Some(side)) => flow.add_float(index, object, side)?,
            (_, None) => flow.add_atomic(index, object)?,
        }
    }

    Ok(flow.finish())
}

/// Negative and NaN widths clamp to 0; infinity means "do not wrap".
fn clamp_max_width(max_width: f32) -> f32 {
    if max_width >= 0.0 {
        max_width
    } else {
        let _ = warn_once("flow", &format!("max_width {max_width} clamped to 0"));
        0.0
    }
}

/// Per-run attributes copied onto every segment of a text run.
struct TextStyle {
    object: usize,
    id: i32,
    font: FontId,
    color: ColorValue,
}

/// A float that did not fit beside the line it appeared on.
struct PendingFloat {
    object: usize,
    id: i32,
    side: FloatSide,
    kind: SegmentKind,
    size: Size,
}

/// The line currently being filled.
#[derive(Default)]
struct LineBuilder {
    segments: Vec<LineSegment>,
    /// Pen position relative to the line start, including hanging whitespace.
    x: f32,
    /// Pen position after the last non-whitespace unit.
    content_width: f32,
    ascender: f32,
    descender: f32,
}

impl LineBuilder {
    fn has_content(&self) -> bool {
        self.segments.iter().any(|s| !s.collapsed)
    }

    fn height(&self) -> f32 {
        self.ascender + self.descender
    }

    fn grow(&mut self, ascender: f32, descender: f32) {
        self.ascender = self.ascender.max(ascender);
        self.descender = self.descender.max(descender);
    }
}

/// Breaking state for one pass.
struct InlineLayout<'a, E: ?Sized> {
    env: &'a E,
    max_width: f32,
    floats: FloatContext,
    placed_floats: Vec<PlacedFloat>,
    pending_floats: Vec<PendingFloat>,
    lines: Vec<Line>,
    current: LineBuilder,
    /// Top of the current line.
    current_y: f32,
    /// The current line was opened by a wrap (not by a newline or the start).
    wrapped: bool,
    /// Vertical metrics of the last font looked up, with half-leading applied.
    font_memo: Option<(FontId, (f32, f32))>,
    /// Metrics a blank line gets: those of the newline that opened it.
    blank_line_metrics: Option<(f32, f32)>,
    /// Text offset where the current line starts.
    line_text_start: usize,
    /// Text offset just past the last unit consumed.
    text_pos: usize,
    natural_width: f32,
}

impl<'a, E: LayoutEnvironment + ?Sized> InlineLayout<'a, E> {
    fn new(env: &'a E, max_width: f32) -> Self {
        Self {
            env,
            max_width,
            floats: FloatContext::new(max_width),
            placed_floats: Vec::new(),
            pending_floats: Vec::new(),
            lines: Vec::new(),
            current: LineBuilder::default(),
            current_y: 0.0,
            wrapped: false,
            font_memo: None,
            blank_line_metrics: None,
            line_text_start: 0,
            text_pos: 0,
            natural_width: 0.0,
        }
    }

    /// Ascender and descender of a text segment in `font`.
    ///
    /// Consecutive segments usually share a font, so the last lookup is
    /// memoized.
    fn text_metrics(&mut self, object: usize, font: FontId) -> Result<(f32, f32), LayoutError> {
        if let Some((memo_font, metrics)) = self.font_memo
            && memo_font == font
        {
            return Ok(metrics);
        }
        let fm = self
            .env
            .font_metrics(font)
            .map_err(|e| LayoutError::measure(object, e))?;
        let half_leading = fm.half_leading();
        let metrics = (fm.ascender + half_leading, fm.descender + half_leading);
        self.font_memo = Some((font, metrics));
        Ok(metrics)
    }

    fn add_text_unit(
        &mut self,
        style: &TextStyle,
        unit: &TextUnit,
        text: &str,
    ) -> Result<(), LayoutError> {
        let (ascender, descender) = self.text_metrics(style.object, style.font)?;

        if unit.kind == UnitKind::Newline {
            if !self.current.has_content() {
                self.current.grow(ascender, descender);
            }
            self.finish_line(BreakReason::Newline);
            self.wrapped = false;
            self.blank_line_metrics = Some((ascender, descender));
            self.text_pos = unit.range.end;
            self.line_text_start = unit.range.end;
            return Ok(());
        }

        let width = self
            .env
            .measure(style.font, text)
            .map_err(|e| LayoutError::measure(style.object, e))?
            .width;
        let whitespace = unit.kind == UnitKind::Whitespace;
        let mut segment = LineSegment {
            object: style.object,
            id: style.id,
            kind: SegmentKind::Text {
                font: style.font,
                color: style.color,
                range: unit.range.clone(),
                whitespace,
            },
            x: 0.0,
            width,
            ascender,
            descender,
            baseline_offset: 0.0,
            collapsed: false,
        };

        if whitespace {
            if self.current.has_content() && !self.fits(width, ascender + descender) {
                self.finish_line(BreakReason::Wrap);
                self.wrapped = true;
            }
            if self.wrapped && !self.current.has_content() {
                // Leading whitespace of a wrapped line takes no space but is
                // kept so the text stays contiguous.
                segment.width = 0.0;
                segment.collapsed = true;
                segment.x = self.current.x;
                self.current.segments.push(segment);
            } else {
                segment.x = self.current.x;
                self.current.x += width;
                self.current.grow(ascender, descender);
                self.current.segments.push(segment);
                self.blank_line_metrics = None;
            }
            self.text_pos = unit.range.end;
            return Ok(());
        }

        self.place_atomic(segment);
        self.text_pos = unit.range.end;
        Ok(())
    }

    /// Inline (non-floating) image or component.
    fn add_atomic(&mut self, index: usize, object: &InlineObject) -> Result<(), LayoutError> {
        let (kind, size, baseline_offset) = self.measure_object(index, object)?;
        self.place_atomic(LineSegment {
            object: index,
            id: object.id,
            kind,
            x: 0.0,
            width: size.width,
            ascender: size.height - baseline_offset,
            descender: baseline_offset,
            baseline_offset,
            collapsed: false,
        });
        Ok(())
    }

    /// Whether a unit of the given size fits after the current pen position.
    fn fits(&self, width: f32, height: f32) -> bool {
        let band_height = self.current.height().max(height);
        let (_, available) = self.floats.available_width_at(self.current_y, band_height);
        self.current.x + width <= available
    }

    /// Place a word, image or component, wrapping first if it does not fit.
    fn place_atomic(&mut self, mut segment: LineSegment) {
        let height = segment.ascender + segment.descender;
        loop {
            if self.fits(segment.width, height) {
                break;
            }
            if self.current.has_content() {
                self.finish_line(BreakReason::Wrap);
                self.wrapped = true;
                continue;
            }
            // Empty line narrowed by floats: drop below the next float
            // bottom and try again before forcing the unit in.
            let band_height = self.current.height().max(height);
            if !self.floats.is_empty() && self.floats.has_floats_at(self.current_y, band_height) {
                let next_y = self.floats.next_float_bottom_after(self.current_y);
                if next_y > self.current_y {
                    self.current_y = next_y;
                    continue;
                }
            }
            debug!(
                "object #{} ({} px) is wider than its line at y={}",
                segment.object, segment.width, self.current_y
            );
            break;
        }

        segment.x = self.current.x;
        self.current.x += segment.width;
        self.current.content_width = self.current.x;
        self.current.grow(segment.ascender, segment.descender);
        self.current.segments.push(segment);
        self.blank_line_metrics = None;
    }

    fn add_float(
        &mut self,
        index: usize,
        object: &InlineObject,
        side: FloatSide,
    ) -> Result<(), LayoutError> {
        let (kind, size, _) = self.measure_object(index, object)?;
        let pending = PendingFloat {
            object: index,
            id: object.id,
            side,
            kind,
            size,
        };

        let band_height = self.current.height().max(size.height);
        let (_, available) = self.floats.available_width_at(self.current_y, band_height);
        // Trailing whitespace hangs, so only the content counts here.
        if !self.current.has_content() || self.current.content_width + size.width <= available {
            self.reserve_float(pending);
        } else {
            #[cfg(feature = "layout-trace")]
            trace!("[FLOW] float #{index} deferred to the next line");
            self.pending_floats.push(pending);
        }
        Ok(())
    }

    fn reserve_float(&mut self, float: PendingFloat) {
        let rect = self.floats.place_float(
            float.side,
            float.size.width,
            float.size.height,
            self.current_y,
        );
        #[cfg(feature = "layout-trace")]
        trace!("[FLOW] float #{} reserved at {rect:?}", float.object);
        self.placed_floats.push(PlacedFloat {
            object: float.object,
            id: float.id,
            side: float.side,
            kind: float.kind,
            rect,
        });
    }

    fn measure_object(
        &self,
        index: usize,
        object: &InlineObject,
    ) -> Result<(SegmentKind, Size, f32), LayoutError> {
        let measured = match &object.kind {
            ObjectKind::Image {
                image,
                baseline_offset,
            } => self
                .env
                .image_size(*image)
                .map(|size| (SegmentKind::Image { image: *image }, size, *baseline_offset)),
            ObjectKind::Component {
                component,
                baseline_offset,
            } => self.env.component_size(*component).map(|size| {
                (
                    SegmentKind::Component {
                        component: *component,
                    },
                    size,
                    *baseline_offset,
                )
            }),
            ObjectKind::Text { .. } => unreachable!("text runs are split into units"),
        };
        measured.map_err(|e| LayoutError::measure(index, e))
    }

    /// Close the current line, advance the pen below it and place any floats
    /// that were waiting for a new line.
    fn finish_line(&mut self, reason: BreakReason) {
        let mut current = std::mem::take(&mut self.current);
        let height = current.height();
        let (left, available) = self.floats.available_width_at(self.current_y, height);
        let right_inset = self.floats.right_inset_at(self.current_y, height);

        for segment in &mut current.segments {
            segment.x += left;
        }

        self.natural_width = self
            .natural_width
            .max(left + current.content_width + right_inset);

        #[cfg(feature = "layout-trace")]
        trace!(
            "[FLOW] line {} top={} height={height} width={} band=({left}, {available}) {reason:?}",
            self.lines.len(),
            self.current_y,
            current.content_width
        );

        self.lines.push(Line {
            top: self.current_y,
            height,
            ascender: current.ascender,
            descender: current.descender,
            width: current.content_width,
            left,
            available,
            break_reason: reason,
            text: self.line_text_start..self.text_pos,
            segments: current.segments,
        });
        self.current_y += height;
        self.line_text_start = self.text_pos;

        for float in std::mem::take(&mut self.pending_floats) {
            self.reserve_float(float);
        }
    }

    /// Whitespace that wrapped after the last word of the block opens no
    /// line of its own: its collapsed segments move to the end of the last
    /// finished line, which becomes the block's last line.
    fn hang_trailing_whitespace(&mut self) {
        let Some(last) = self.lines.last_mut() else {
            return;
        };
        let end = last
            .segments
            .last()
            .map_or(last.left, |s| s.x + s.width);
        for mut segment in std::mem::take(&mut self.current.segments) {
            segment.x = end;
            last.segments.push(segment);
        }
        last.text.end = self.text_pos;
        last.break_reason = BreakReason::End;
        self.line_text_start = self.text_pos;
    }

    fn finish(mut self) -> LayoutResult {
        if self.wrapped && !self.current.has_content() && !self.lines.is_empty() {
            self.hang_trailing_whitespace();
        } else {
            // The open line is kept even when empty, so trailing newlines
            // produce a blank last line.
            if !self.current.has_content()
                && let Some((ascender, descender)) = self.blank_line_metrics
            {
                self.current.grow(ascender, descender);
            }
            self.finish_line(BreakReason::End);
        }

        let float_width = self
            .placed_floats
            .iter()
            .map(|f| match f.side {
                FloatSide::Left => f.rect.right(),
                FloatSide::Right => f.rect.width,
            })
            .fold(0.0_f32, f32::max);

        let natural_width = self.natural_width.max(float_width);

        // Without a right edge, right floats hug the natural width instead.
        if !self.max_width.is_finite() {
            for float in &mut self.placed_floats {
                if float.side == FloatSide::Right {
                    float.rect.x = (natural_width - float.rect.width).max(0.0);
                }
            }
        }

        debug!(
            "laid out {} lines and {} floats at max_width {}",
            self.lines.len(),
            self.placed_floats.len(),
            self.max_width
        );

        LayoutResult {
            natural_width,
            height: self.current_y.max(self.floats.max_float_bottom()),
            lines: self.lines,
            floats: self.placed_floats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::ApproximateMetrics;
    use crate::object::NO_ID;

    /// 16px font: 8px per character, ascender 14, descender 6 (with leading).
    fn setup() -> (ApproximateMetrics, FontId) {
        let mut metrics = ApproximateMetrics::new();
        let font = metrics.add_font(16.0);
        (metrics, font)
    }

    fn line_texts<'t>(text: &'t str, result: &LayoutResult) -> Vec<Vec<&'t str>> {
        result
            .lines
            .iter()
            .map(|line| {
                line.segments
                    .iter()
                    .filter(|s| !s.collapsed)
                    .filter_map(LineSegment::text_range)
                    .map(|r| &text[r])
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_words_wrap_at_max_width() {
        let (metrics, font) = setup();
        let mut objects = ObjectList::new();
        objects.push_text("aaa bbb ccc", font, ColorValue::BLACK, NO_ID);

        // "aaa bbb" is 56px; "aaa bbb ccc" would be 88px.
        let result = layout_inline(&objects, 60.0, &metrics).unwrap();
        assert_eq!(
            line_texts(objects.combined_text(), &result),
            vec![vec!["aaa", " ", "bbb"], vec!["ccc"]]
        );
        assert!(result.lines[1].segments[0].collapsed);
        assert_eq!(result.lines[0].width, 56.0);
        assert_eq!(result.lines[0].break_reason, BreakReason::Wrap);
        assert_eq!(result.lines[1].top, 20.0);
    }

    #[test]
    fn test_explicit_newlines_make_blank_lines() {
        let (metrics, font) = setup();
        let mut objects = ObjectList::new();
        objects.push_text("a\n\nb\n", font, ColorValue::BLACK, NO_ID);

        let result = layout_inline(&objects, 500.0, &metrics).unwrap();
        assert_eq!(result.lines.len(), 4);
        assert!(result.lines.iter().all(|l| l.height == 20.0));
        assert_eq!(result.lines[1].segments.len(), 0);
        assert_eq!(result.lines[3].break_reason, BreakReason::End);
        assert_eq!(result.height, 80.0);
    }

    #[test]
    fn test_oversized_word_is_forced_alone() {
        let (metrics, font) = setup();
        let mut objects = ObjectList::new();
        objects.push_text("a verylongword b", font, ColorValue::BLACK, NO_ID);

        let result = layout_inline(&objects, 30.0, &metrics).unwrap();
        assert_eq!(
            line_texts(objects.combined_text(), &result),
            vec![vec!["a", " "], vec!["verylongword"], vec!["b"]]
        );
    }

    #[test]
    fn test_wrapped_leading_whitespace_collapses() {
        let (metrics, font) = setup();
        let mut objects = ObjectList::new();
        objects.push_text("aaa", font, ColorValue::BLACK, NO_ID);
        objects.push_text(" ", font, ColorValue::BLACK, NO_ID);
        objects.push_text("bbb", font, ColorValue::BLACK, NO_ID);

        // The space still fits on line 1; nothing collapses here.
        let result = layout_inline(&objects, 32.0, &metrics).unwrap();
        assert_eq!(result.lines.len(), 2);
        assert!(result.lines.iter().flat_map(|l| &l.segments).all(|s| !s.collapsed));

        // Two spaces that overflow: the run leads line 2 without width.
        let mut objects = ObjectList::new();
        objects.push_text("aaa bbb", font, ColorValue::BLACK, NO_ID);
        objects.push_text("  ccc", font, ColorValue::BLACK, NO_ID);
        let result = layout_inline(&objects, 60.0, &metrics).unwrap();
        assert_eq!(result.lines.len(), 2);
        let second = &result.lines[1];
        assert!(second.segments[0].collapsed);
        assert_eq!(second.segments[0].width, 0.0);
        assert_eq!(second.width, 24.0);
        assert_eq!(second.segments[1].x, 0.0);
    }

    #[test]
    fn test_lines_record_their_text_range() {
        let (metrics, font) = setup();
        let mut objects = ObjectList::new();
        objects.push_text("aaa bbb ccc\nd", font, ColorValue::BLACK, NO_ID);

        let result = layout_inline(&objects, 60.0, &metrics).unwrap();
        let ranges: Vec<_> = result.lines.iter().map(|l| l.text.clone()).collect();
        // The wrapped space belongs to the second line; the newline to none.
        assert_eq!(ranges, vec![0..7, 7..11, 12..13]);
    }

    #[test]
    fn test_negative_width_clamps_to_zero() {
        let (metrics, font) = setup();
        let mut objects = ObjectList::new();
        objects.push_text("a b", font, ColorValue::BLACK, NO_ID);
        let clamped = layout_inline(&objects, -10.0, &metrics).unwrap();
        let zero = layout_inline(&objects, 0.0, &metrics).unwrap();
        assert_eq!(clamped, zero);
        assert_eq!(zero.lines.len(), 2);
    }

    #[test]
    fn test_inline_image_uses_baseline_offset() {
        let (mut metrics, font) = setup();
        let image = metrics.add_image(Size::new(10.0, 30.0));
        let mut objects = ObjectList::new();
        objects.push_text("a", font, ColorValue::BLACK, NO_ID);
        objects.push_image(image, 5.0, None, 3);

        let result = layout_inline(&objects, 500.0, &metrics).unwrap();
        let line = &result.lines[0];
        assert_eq!(line.ascender, 25.0);
        assert_eq!(line.descender, 6.0);
        assert_eq!(line.height, 31.0);
        let image_seg = &line.segments[1];
        assert_eq!(image_seg.x, 8.0);
        assert_eq!(image_seg.rect(line).y, 0.0);
    }

    #[test]
    fn test_unknown_font_names_object() {
        let (metrics, _) = setup();
        let mut objects = ObjectList::new();
        objects.push_text("ok", FontId(9), ColorValue::BLACK, NO_ID);
        let err = layout_inline(&objects, 100.0, &metrics).unwrap_err();
        assert_eq!(
            err,
            LayoutError::measure(0, crate::error::MeasureError::UnknownFont(FontId(9)))
        );
    }

    #[test]
    fn test_empty_object_list_has_no_lines() {
        let (metrics, _) = setup();
        let result = layout_inline(&ObjectList::new(), 100.0, &metrics).unwrap();
        assert!(result.is_empty());
    }
}
