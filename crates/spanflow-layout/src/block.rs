//! The span layout block: object list, cached layout, selection and caret.
//!
//! A [`SpanLayout`] is either dirty (objects or alignment changed since the
//! last pass) or laid out. Geometry queries on a dirty block first re-run
//! layout with the last width passed to [`SpanLayout::layout`], so they all
//! return `Result`.

use std::ops::Range;

use log::debug;

use crate::color::ColorValue;
use crate::error::LayoutError;
use crate::layout::align::{Alignment, align_lines};
use crate::layout::box_model::{Point, Rect, Size};
use crate::layout::float::FloatSide;
use crate::layout::inline::layout_inline;
use crate::layout::line::LayoutResult;
use crate::measure::{ComponentHost, LayoutEnvironment};
use crate::object::{ComponentId, FontId, ImageId, ObjectList};
use crate::paint::{Painter, RenderSurface};
use crate::query::{self, HitTestResult};
use crate::selection::{Cursor, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayoutState {
    Dirty,
    LaidOut,
}

/// A block of inline objects laid out into lines.
///
/// `M` supplies text measurement and object sizes; pass a reference
/// (`&registry`) to keep ownership with the caller.
#[derive(Debug)]
pub struct SpanLayout<M> {
    env: M,
    objects: ObjectList,
    alignment: Alignment,
    position: Point,
    max_width: f32,
    state: LayoutState,
    result: LayoutResult,
    selection: Selection,
    cursor: Cursor,
}

impl<M: LayoutEnvironment> SpanLayout<M> {
    /// Create an empty block measuring through `env`.
    #[must_use]
    pub fn new(env: M) -> Self {
        Self {
            env,
            objects: ObjectList::new(),
            alignment: Alignment::default(),
            position: Point::default(),
            max_width: f32::INFINITY,
            state: LayoutState::Dirty,
            result: LayoutResult::default(),
            selection: Selection::default(),
            cursor: Cursor::default(),
        }
    }

    /// The measurement environment.
    #[must_use]
    pub const fn env(&self) -> &M {
        &self.env
    }

    /// Mutable access to the measurement environment. Marks the block dirty,
    /// since sizes may change.
    pub const fn env_mut(&mut self) -> &mut M {
        self.state = LayoutState::Dirty;
        &mut self.env
    }

    /// Remove every object and reset the caret and selection.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.selection.reset();
        self.cursor.reset();
        self.state = LayoutState::Dirty;
    }

    /// Append a run of text.
    pub fn add_text(&mut self, text: &str, font: FontId, color: ColorValue, id: i32) {
        self.objects.push_text(text, font, color, id);
        self.state = LayoutState::Dirty;
    }

    /// Append an inline image whose bottom sits `baseline_offset` below the
    /// baseline.
    pub fn add_image(&mut self, image: ImageId, baseline_offset: f32, id: i32) {
        self.objects.push_image(image, baseline_offset, None, id);
        self.state = LayoutState::Dirty;
    }

    /// Append an inline component whose bottom sits `baseline_offset` below
    /// the baseline.
    pub fn add_component(&mut self, component: ComponentId, baseline_offset: f32, id: i32) {
        self.objects.push_component(component, baseline_offset, None, id);
        self.state = LayoutState::Dirty;
    }

    /// Append an image floated to `side`.
    pub fn add_floating_image(&mut self, image: ImageId, side: FloatSide, id: i32) {
        self.objects.push_image(image, 0.0, Some(side), id);
        self.state = LayoutState::Dirty;
    }

    /// Append a component floated to `side`.
    pub fn add_floating_component(&mut self, component: ComponentId, side: FloatSide, id: i32) {
        self.objects.push_component(component, 0.0, Some(side), id);
        self.state = LayoutState::Dirty;
    }

    /// Set the horizontal alignment of lines.
    pub const fn set_align(&mut self, alignment: Alignment) {
        self.alignment = alignment;
        self.state = LayoutState::Dirty;
    }

    /// Current alignment.
    #[must_use]
    pub const fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Move the block. Geometry is kept; queries and drawing translate by
    /// the new position.
    pub const fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Top-left corner of the block.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Whether objects or alignment changed since the last layout pass.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state == LayoutState::Dirty
    }

    /// The objects in document order.
    #[must_use]
    pub const fn objects(&self) -> &ObjectList {
        &self.objects
    }

    /// Concatenated text of every text run.
    #[must_use]
    pub fn combined_text(&self) -> &str {
        self.objects.combined_text()
    }

    /// Break the objects into lines no wider than `max_width` and align them.
    ///
    /// Pass `f32::INFINITY` for an unwrapped layout.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if a measurement fails; the block
    /// then stays dirty.
    pub fn layout(&mut self, max_width: f32) -> Result<(), LayoutError> {
        self.max_width = max_width;
        let mut result = layout_inline(&self.objects, max_width, &self.env)?;
        align_lines(&mut result, self.alignment, self.objects.combined_text());
        debug!(
            "span layout: {} objects, {} lines, {}x{}",
            self.objects.len(),
            result.lines.len(),
            result.natural_width,
            result.height
        );
        self.result = result;
        self.state = LayoutState::LaidOut;
        Ok(())
    }

    fn ensure_layout(&mut self) -> Result<(), LayoutError> {
        if self.state == LayoutState::Dirty {
            self.layout(self.max_width)?;
        }
        Ok(())
    }

    /// The current layout, re-running it first if the block is dirty.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if the re-run fails.
    pub fn layout_result(&mut self) -> Result<&LayoutResult, LayoutError> {
        self.ensure_layout()?;
        Ok(&self.result)
    }

    /// Bounding rectangle of all lines and floats, at the block position.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if a pending re-layout fails.
    pub fn rect(&mut self) -> Result<Rect, LayoutError> {
        self.ensure_layout()?;
        Ok(query::content_rect(&self.result).translate(self.position))
    }

    /// Size of [`SpanLayout::rect`].
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if a pending re-layout fails.
    pub fn size(&mut self) -> Result<Size, LayoutError> {
        Ok(self.rect()?.size())
    }

    /// Rectangles covered by objects with `id`: one per line they touch,
    /// then one per float. Empty if no object has that id.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if a pending re-layout fails.
    pub fn rect_by_id(&mut self, id: i32) -> Result<Vec<Rect>, LayoutError> {
        self.ensure_layout()?;
        Ok(query::rects_by_id(&self.result, id)
            .into_iter()
            .map(|rect| rect.translate(self.position))
            .collect())
    }

    /// What lies under `point` (in the same coordinates as the position).
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if layout or offset resolution fails.
    pub fn hit_test(&mut self, point: Point) -> Result<HitTestResult, LayoutError> {
        self.ensure_layout()?;
        let local = Point::new(point.x - self.position.x, point.y - self.position.y);
        query::hit_test(&self.result, &self.objects, &self.env, local)
    }

    /// Size the content needs without wrapping. The stored layout and the
    /// dirty state are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if a measurement fails.
    pub fn find_preferred_size(&self) -> Result<Size, LayoutError> {
        Ok(layout_inline(&self.objects, f32::INFINITY, &self.env)?.natural_size())
    }

    /// Ascender of the first line, or 0 without lines.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if a pending re-layout fails.
    pub fn first_baseline_offset(&mut self) -> Result<f32, LayoutError> {
        self.ensure_layout()?;
        Ok(self.result.lines.first().map_or(0.0, |line| line.ascender))
    }

    /// Ascender of the last line, or 0 without lines.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if a pending re-layout fails.
    pub fn last_baseline_offset(&mut self) -> Result<f32, LayoutError> {
        self.ensure_layout()?;
        Ok(self.result.lines.last().map_or(0.0, |line| line.ascender))
    }

    /// Select `start..end` (byte offsets, clamped and ordered).
    pub fn set_selection_range(&mut self, start: usize, end: usize) {
        self.selection
            .set_range(self.objects.combined_text(), start, end);
    }

    /// Selected byte range.
    #[must_use]
    pub const fn selection_range(&self) -> Range<usize> {
        self.selection.range()
    }

    /// Colors for selected text and the fill behind it.
    pub const fn set_selection_colors(&mut self, foreground: ColorValue, background: ColorValue) {
        self.selection.foreground = foreground;
        self.selection.background = background;
    }

    /// Draw the caret.
    pub const fn show_cursor(&mut self) {
        self.cursor.visible = true;
    }

    /// Stop drawing the caret.
    pub const fn hide_cursor(&mut self) {
        self.cursor.visible = false;
    }

    /// Move the caret (byte offset, clamped).
    pub fn set_cursor_pos(&mut self, pos: usize) {
        self.cursor.set_pos(self.objects.combined_text(), pos);
    }

    /// Byte offset of the caret.
    #[must_use]
    pub const fn cursor_pos(&self) -> usize {
        self.cursor.pos()
    }

    /// Switch between the bar caret and the overwrite block caret.
    pub const fn set_cursor_overwrite_mode(&mut self, overwrite: bool) {
        self.cursor.overwrite = overwrite;
    }

    /// Caret color.
    pub const fn set_cursor_color(&mut self, color: ColorValue) {
        self.cursor.color = color;
    }

    /// One rectangle per line covering the selection.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if layout or measuring fails.
    pub fn selection_rects(&mut self) -> Result<Vec<Rect>, LayoutError> {
        self.ensure_layout()?;
        let rects = query::selection_rects(
            &self.result,
            self.objects.combined_text(),
            &self.selection.range(),
            &self.env,
        )?;
        Ok(rects
            .into_iter()
            .map(|rect| rect.translate(self.position))
            .collect())
    }

    /// Caret rectangle, or `None` while the caret is hidden or there are no
    /// lines.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if layout or measuring fails.
    pub fn cursor_rect(&mut self) -> Result<Option<Rect>, LayoutError> {
        if !self.cursor.visible {
            return Ok(None);
        }
        self.ensure_layout()?;
        let rect = query::cursor_rect(
            &self.result,
            self.objects.combined_text(),
            self.cursor.pos(),
            self.cursor.overwrite,
            &self.env,
        )?;
        Ok(rect.map(|rect| rect.translate(self.position)))
    }

    fn painter(&self) -> Painter<'_> {
        Painter::new(
            &self.objects,
            &self.result,
            self.position,
            &self.selection,
            &self.cursor,
        )
    }

    /// Draw the block onto `surface`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if layout or measuring fails.
    pub fn draw_layout<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<(), LayoutError> {
        self.ensure_layout()?;
        self.painter().paint(surface, &self.env)
    }

    /// Draw the lines inside `content_rect`, ending lines that cross its
    /// right edge with an ellipsis.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if layout or measuring fails.
    pub fn draw_layout_ellipsis<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        content_rect: Rect,
    ) -> Result<(), LayoutError> {
        self.ensure_layout()?;
        self.painter()
            .paint_ellipsis(surface, &self.env, content_rect)
    }

    /// Tell every component its final rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Measure`] if a pending re-layout fails.
    pub fn set_component_geometry<H: ComponentHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<(), LayoutError> {
        self.ensure_layout()?;
        self.painter().place_components(host);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::ApproximateMetrics;
    use crate::object::NO_ID;

    fn block() -> (SpanLayout<ApproximateMetrics>, FontId) {
        let mut metrics = ApproximateMetrics::new();
        let font = metrics.add_font(16.0);
        (SpanLayout::new(metrics), font)
    }

    #[test]
    fn test_mutators_mark_dirty() {
        let (mut block, font) = block();
        block.add_text("abc", font, ColorValue::BLACK, NO_ID);
        assert!(block.is_dirty());
        block.layout(100.0).unwrap();
        assert!(!block.is_dirty());

        block.set_position(Point::new(5.0, 5.0));
        block.set_cursor_pos(2);
        block.set_selection_range(0, 1);
        assert!(!block.is_dirty());

        block.set_align(Alignment::Right);
        assert!(block.is_dirty());
    }

    #[test]
    fn test_queries_relayout_with_last_width() {
        let (mut block, font) = block();
        block.add_text("aaa bbb", font, ColorValue::BLACK, NO_ID);
        block.layout(30.0).unwrap();
        block.add_text(" ccc", font, ColorValue::BLACK, NO_ID);
        // Re-laid out at 30px: three lines.
        assert_eq!(block.rect_by_id(NO_ID).unwrap().len(), 3);
        assert!(!block.is_dirty());
    }

    #[test]
    fn test_preferred_size_keeps_state() {
        let (mut block, font) = block();
        block.add_text("aaa bbb", font, ColorValue::BLACK, NO_ID);
        block.layout(30.0).unwrap();
        block.add_text("!", font, ColorValue::BLACK, NO_ID);

        assert_eq!(block.find_preferred_size().unwrap(), Size::new(64.0, 20.0));
        assert!(block.is_dirty());
    }

    #[test]
    fn test_position_translates_queries() {
        let (mut block, font) = block();
        block.add_text("ab", font, ColorValue::BLACK, 4);
        block.set_position(Point::new(10.0, 100.0));
        assert_eq!(block.rect().unwrap(), Rect::new(10.0, 100.0, 16.0, 20.0));
        let hit = block.hit_test(Point::new(12.0, 105.0)).unwrap();
        assert_eq!(hit.object_id, 4);
    }

    #[test]
    fn test_clear_resets_cursor_and_selection() {
        let (mut block, font) = block();
        block.add_text("hello", font, ColorValue::BLACK, NO_ID);
        block.set_cursor_pos(3);
        block.set_selection_range(1, 4);
        block.clear();
        assert_eq!(block.cursor_pos(), 0);
        assert_eq!(block.selection_range(), 0..0);
        assert_eq!(block.combined_text(), "");
    }

    #[test]
    fn test_hidden_cursor_has_no_rect() {
        let (mut block, font) = block();
        block.add_text("hi", font, ColorValue::BLACK, NO_ID);
        assert_eq!(block.cursor_rect().unwrap(), None);
        block.show_cursor();
        block.set_cursor_pos(1);
        assert_eq!(
            block.cursor_rect().unwrap(),
            Some(Rect::new(8.0, 0.0, 1.0, 20.0))
        );
    }
}
