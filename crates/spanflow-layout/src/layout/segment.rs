//! Splitting text runs into breakable units.
//!
//! A unit is the smallest piece the flow engine places: a word (maximal run
//! of non-whitespace), a whitespace run, or an explicit newline. Units are
//! classified by character class only; no fonts are consulted here.

use std::ops::Range;

/// Kind of breakable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Maximal run of non-whitespace characters. Never split.
    Word,
    /// Maximal run of whitespace other than line breaks.
    Whitespace,
    /// `\n`, `\r\n` or a lone `\r`. Always ends the current line.
    Newline,
}

/// One breakable unit of a text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    /// What the unit is.
    pub kind: UnitKind,
    /// Byte range into the combined text.
    pub range: Range<usize>,
}

fn is_line_break(ch: char) -> bool {
    ch == '\n' || ch == '\r'
}

fn class_of(ch: char) -> UnitKind {
    if is_line_break(ch) {
        UnitKind::Newline
    } else if ch.is_whitespace() {
        UnitKind::Whitespace
    } else {
        UnitKind::Word
    }
}

/// Split `text[range]` into units. Ranges in the result are absolute
/// offsets into `text`.
#[must_use]
pub fn segment_units(text: &str, range: Range<usize>) -> Vec<TextUnit> {
    let base = range.start;
    let slice = &text[range];
    let mut units = Vec::new();
    let mut chars = slice.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        let kind = class_of(ch);
        let mut end = start + ch.len_utf8();

        match kind {
            UnitKind::Newline => {
                // \r\n is a single break.
                if ch == '\r' && chars.next_if(|&(_, next)| next == '\n').is_some() {
                    end += 1;
                }
            }
            UnitKind::Word | UnitKind::Whitespace => {
                while let Some((idx, next)) = chars.next_if(|&(_, next)| class_of(next) == kind) {
                    end = idx + next.len_utf8();
                }
            }
        }

        units.push(TextUnit {
            kind,
            range: base + start..base + end,
        });
    }

    units
}
