//! Selection and caret state.
//!
//! Both are plain state: setting them never affects line geometry. Offsets
//! are byte offsets into the combined text, always kept on a character
//! boundary inside `[0, len]`.

use std::ops::Range;

use serde::Serialize;

use crate::color::ColorValue;

/// Default selection background.
pub const DEFAULT_SELECTION_BACKGROUND: ColorValue = ColorValue::rgb(51, 153, 255);

/// Clamp `offset` into `text` and move it back to the nearest character
/// boundary.
#[must_use]
pub fn clamp_offset(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Selected range and the colors it is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    start: usize,
    end: usize,
    /// Text color inside the selection.
    pub foreground: ColorValue,
    /// Fill behind the selected text.
    pub background: ColorValue,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            foreground: ColorValue::WHITE,
            background: DEFAULT_SELECTION_BACKGROUND,
        }
    }
}

impl Selection {
    /// Set the selected range. Out-of-range offsets clamp and the ends are
    /// put in order.
    pub fn set_range(&mut self, text: &str, start: usize, end: usize) {
        let start = clamp_offset(text, start);
        let end = clamp_offset(text, end);
        self.start = start.min(end);
        self.end = start.max(end);
    }

    /// Selected byte range, `start <= end`.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Whether nothing is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Drop the selection, keeping the colors.
    pub const fn reset(&mut self) {
        self.start = 0;
        self.end = 0;
    }
}

/// Caret position, visibility and style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cursor {
    pos: usize,
    /// Whether the caret is drawn.
    pub visible: bool,
    /// Overwrite mode draws a block over the next character instead of a bar.
    pub overwrite: bool,
    /// Caret color.
    pub color: ColorValue,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            pos: 0,
            visible: false,
            overwrite: false,
            color: ColorValue::BLACK,
        }
    }
}

impl Cursor {
    /// Move the caret, clamping into the text.
    pub fn set_pos(&mut self, text: &str, pos: usize) {
        self.pos = clamp_offset(text, pos);
    }

    /// Byte offset of the caret.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Put the caret back at the start.
    pub const fn reset(&mut self) {
        self.pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_offset_stays_on_char_boundary() {
        assert_eq!(clamp_offset("abc", 10), 3);
        // "é" occupies bytes 1..3.
        assert_eq!(clamp_offset("aéb", 2), 1);
        assert_eq!(clamp_offset("", 4), 0);
    }

    #[test]
    fn test_selection_orders_and_clamps() {
        let mut selection = Selection::default();
        selection.set_range("hello", 9, 2);
        assert_eq!(selection.range(), 2..5);
        assert!(!selection.is_empty());
        selection.reset();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_cursor_clamps() {
        let mut cursor = Cursor::default();
        cursor.set_pos("hi", 100);
        assert_eq!(cursor.pos(), 2);
        assert!(!cursor.visible);
    }
}
