//! Painter - turns finished lines into drawing calls.
//!
//! Painting order (back to front):
//! 1. Floated images
//! 2. Per line: selection background, then segments in document order
//! 3. The caret
//!
//! Components are not drawn; their host places them through
//! [`Painter::place_components`].

use std::ops::Range;

use log::debug;

use super::RenderSurface;
use crate::color::ColorValue;
use crate::error::LayoutError;
use crate::layout::box_model::{Point, Rect};
use crate::layout::line::{LayoutResult, Line, LineSegment, SegmentKind};
use crate::measure::{ComponentHost, TextMeasurer};
use crate::object::{FontId, ObjectList};
use crate::query::{cursor_rect, offset_x, selection_rects};
use crate::selection::{Cursor, Selection};

/// Text appended to lines cut short by [`Painter::paint_ellipsis`].
pub const ELLIPSIS: &str = "\u{2026}";

/// Painter over one finished layout.
pub struct Painter<'a> {
    objects: &'a ObjectList,
    result: &'a LayoutResult,
    origin: Point,
    selection: &'a Selection,
    cursor: &'a Cursor,
}

impl<'a> Painter<'a> {
    /// Create a painter for `result`, drawn with its origin at `origin`.
    #[must_use]
    pub const fn new(
        objects: &'a ObjectList,
        result: &'a LayoutResult,
        origin: Point,
        selection: &'a Selection,
        cursor: &'a Cursor,
    ) -> Self {
        Self {
            objects,
            result,
            origin,
            selection,
            cursor,
        }
    }

    fn text(&self) -> &'a str {
        self.objects.combined_text()
    }

    /// Paint every line, the floats, the selection and the caret.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if splitting text at the selection
    /// bounds needs a measurement that fails.
    pub fn paint<S, T>(&self, surface: &mut S, measurer: &T) -> Result<(), LayoutError>
    where
        S: RenderSurface + ?Sized,
        T: TextMeasurer + ?Sized,
    {
        self.paint_floats(surface, None);

        let selected = self.selection.range();
        for rect in selection_rects(self.result, self.text(), &selected, measurer)? {
            surface.fill_rect(rect.translate(self.origin), self.selection.background);
        }

        for line in &self.result.lines {
            for segment in &line.segments {
                self.paint_segment(surface, measurer, line, segment, &selected)?;
            }
        }

        if self.cursor.visible
            && let Some(rect) = cursor_rect(
                self.result,
                self.text(),
                self.cursor.pos(),
                self.cursor.overwrite,
                measurer,
            )?
        {
            surface.fill_rect(rect.translate(self.origin), self.cursor.color);
        }
        Ok(())
    }

    /// Paint the lines that fall inside `content_rect`, cutting lines that
    /// cross its right edge and ending them with [`ELLIPSIS`].
    ///
    /// `content_rect` is in the same coordinates as the block position.
    /// Selection and caret are not drawn.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if re-measuring a truncated segment
    /// fails.
    pub fn paint_ellipsis<S, T>(
        &self,
        surface: &mut S,
        measurer: &T,
        content_rect: Rect,
    ) -> Result<(), LayoutError>
    where
        S: RenderSurface + ?Sized,
        T: TextMeasurer + ?Sized,
    {
        let clip = content_rect.translate(Point::new(-self.origin.x, -self.origin.y));
        self.paint_floats(surface, Some(&clip));

        let no_selection = 0..0;
        for line in &self.result.lines {
            if line.bottom() <= clip.y || line.top >= clip.bottom() {
                continue;
            }
            if line.rect().right() <= clip.right() {
                for segment in &line.segments {
                    self.paint_segment(surface, measurer, line, segment, &no_selection)?;
                }
                continue;
            }
            self.paint_truncated_line(surface, measurer, line, clip.right())?;
        }
        Ok(())
    }

    /// Tell every component, inline or floated, its final rectangle.
    pub fn place_components<H: ComponentHost + ?Sized>(&self, host: &mut H) {
        for line in &self.result.lines {
            for segment in &line.segments {
                if let SegmentKind::Component { component } = segment.kind {
                    host.set_geometry(component, segment.rect(line).translate(self.origin));
                }
            }
        }
        for float in &self.result.floats {
            if let SegmentKind::Component { component } = float.kind {
                host.set_geometry(component, float.rect.translate(self.origin));
            }
        }
    }

    fn paint_floats<S: RenderSurface + ?Sized>(&self, surface: &mut S, clip: Option<&Rect>) {
        for float in &self.result.floats {
            let SegmentKind::Image { image } = float.kind else {
                continue;
            };
            if let Some(clip) = clip
                && (float.rect.bottom() <= clip.y || float.rect.y >= clip.bottom())
            {
                continue;
            }
            surface.draw_image(image, float.rect.translate(self.origin));
        }
    }

    fn paint_segment<S, T>(
        &self,
        surface: &mut S,
        measurer: &T,
        line: &Line,
        segment: &LineSegment,
        selected: &Range<usize>,
    ) -> Result<(), LayoutError>
    where
        S: RenderSurface + ?Sized,
        T: TextMeasurer + ?Sized,
    {
        match &segment.kind {
            SegmentKind::Text {
                font,
                color,
                range,
                whitespace,
            } => {
                if *whitespace || segment.collapsed {
                    return Ok(());
                }
                // Up to three pieces: before, inside and after the selection.
                let cut_start = selected.start.clamp(range.start, range.end);
                let cut_end = selected.end.clamp(cut_start, range.end);
                let pieces = [
                    (range.start..cut_start, *color),
                    (cut_start..cut_end, self.selection.foreground),
                    (cut_end..range.end, *color),
                ];
                for (piece, piece_color) in pieces {
                    if piece.is_empty() {
                        continue;
                    }
                    let x = offset_x(segment, self.text(), piece.start, measurer)?;
                    self.draw_text_at(surface, line, x, &self.text()[piece], *font, piece_color);
                }
            }
            SegmentKind::Image { image } => {
                surface.draw_image(*image, segment.rect(line).translate(self.origin));
            }
            SegmentKind::Component { .. } => {}
        }
        Ok(())
    }

    /// Paint `line` up to `right_edge`, ending it with [`ELLIPSIS`].
    ///
    /// Starting at the segment that crosses the edge and walking back, each
    /// segment is offered as the cut point: text loses trailing characters
    /// until what is left plus the ellipsis fits, whitespace and atomic
    /// segments are replaced by the ellipsis outright. Segments before the
    /// cut are drawn as they are. If not even the bare ellipsis fits at the
    /// start of the line, nothing is drawn.
    fn paint_truncated_line<S, T>(
        &self,
        surface: &mut S,
        measurer: &T,
        line: &Line,
        right_edge: f32,
    ) -> Result<(), LayoutError>
    where
        S: RenderSurface + ?Sized,
        T: TextMeasurer + ?Sized,
    {
        let visible: Vec<&LineSegment> = line.segments.iter().filter(|s| !s.collapsed).collect();
        let Some(crossing) = visible
            .iter()
            .position(|s| s.x + s.width > right_edge)
        else {
            return Ok(());
        };

        for cut in (0..=crossing).rev() {
            let segment = visible[cut];
            let Some(font) = Self::ellipsis_font(&visible, cut) else {
                continue;
            };
            let ellipsis_width = measurer
                .measure(font, ELLIPSIS)
                .map_err(|e| LayoutError::measure(segment.object, e))?
                .width;

            let mut prefix = "";
            if let SegmentKind::Text {
                range,
                whitespace: false,
                ..
            } = &segment.kind
            {
                prefix = &self.text()[range.clone()];
                while !prefix.is_empty() {
                    let width = measurer
                        .measure(font, prefix)
                        .map_err(|e| LayoutError::measure(segment.object, e))?
                        .width;
                    if segment.x + width + ellipsis_width <= right_edge {
                        break;
                    }
                    let end = prefix.char_indices().next_back().map_or(0, |(i, _)| i);
                    prefix = &prefix[..end];
                }
            }
            if prefix.is_empty() && segment.x + ellipsis_width > right_edge {
                continue;
            }

            let no_selection = 0..0;
            for earlier in &visible[..cut] {
                self.paint_segment(surface, measurer, line, earlier, &no_selection)?;
            }
            let color = match &segment.kind {
                SegmentKind::Text { color, .. } => *color,
                _ => Self::last_text_color(line, segment),
            };
            let kept = format!("{prefix}{ELLIPSIS}");
            self.draw_text_at(surface, line, segment.x, &kept, font, color);
            return Ok(());
        }
        debug!("line at y={} has no room for an ellipsis", line.top);
        Ok(())
    }

    /// Font for an ellipsis cutting `visible` at `cut`: the nearest text
    /// font at or before the cut, else the first one after it.
    fn ellipsis_font(visible: &[&LineSegment], cut: usize) -> Option<FontId> {
        let font_of = |s: &&LineSegment| match &s.kind {
            SegmentKind::Text { font, .. } => Some(*font),
            _ => None,
        };
        visible[..=cut]
            .iter()
            .rev()
            .find_map(font_of)
            .or_else(|| visible[cut + 1..].iter().find_map(font_of))
    }

    /// Color of the last text segment before `segment` on `line`.
    fn last_text_color(line: &Line, segment: &LineSegment) -> ColorValue {
        line.segments
            .iter()
            .take_while(|s| s.x < segment.x)
            .filter_map(|s| match &s.kind {
                SegmentKind::Text { color, .. } => Some(*color),
                _ => None,
            })
            .last()
            .unwrap_or(ColorValue::BLACK)
    }

    fn draw_text_at<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        line: &Line,
        x: f32,
        text: &str,
        font: FontId,
        color: ColorValue,
    ) {
        let position = Point::new(x + self.origin.x, line.baseline() + self.origin.y);
        surface.draw_text(position, text, font, color);
    }
}
