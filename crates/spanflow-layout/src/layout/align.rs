//! Horizontal alignment of finished lines.
//!
//! Runs after breaking: the lines are already fixed, alignment only moves
//! segments sideways inside each line's band (and, for justify, widens the
//! gaps between words).

use serde::Serialize;
use strum_macros::{Display, EnumString};

use super::line::{BreakReason, LayoutResult, Line};

/// Horizontal alignment of lines within the block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Alignment {
    /// Lines start at the left edge of their band.
    #[default]
    Left,
    /// Lines end at the right edge of their band.
    Right,
    /// Lines are centered in their band.
    Center,
    /// Lines fill their band by widening word gaps. Paragraph-final lines
    /// stay left-aligned.
    Justify,
}

/// Apply `alignment` to every line of `result`.
///
/// `text` is the combined text the segments' ranges point into; justify
/// uses it to weight whitespace runs by their character count.
pub fn align_lines(result: &mut LayoutResult, alignment: Alignment, text: &str) {
    if alignment == Alignment::Left {
        return;
    }
    let last = result.lines.len().saturating_sub(1);
    for (index, line) in result.lines.iter_mut().enumerate() {
        let free = line.available - line.width;
        if !free.is_finite() || free <= 0.0 {
            continue;
        }
        match alignment {
            Alignment::Left => {}
            Alignment::Right => shift(line, free),
            Alignment::Center => shift(line, free / 2.0),
            Alignment::Justify => {
                if index != last && line.break_reason != BreakReason::Newline {
                    justify(line, free, text);
                }
            }
        }
    }
}

fn shift(line: &mut Line, dx: f32) {
    for segment in &mut line.segments {
        segment.x += dx;
    }
}

/// Spread `free` over the whitespace segments that have a word after them
/// on the same line.
#[allow(clippy::cast_precision_loss)]
fn justify(line: &mut Line, free: f32, text: &str) {
    let Some(last_content) = line
        .segments
        .iter()
        .rposition(|s| !s.is_whitespace() && !s.collapsed)
    else {
        return;
    };

    let weights: Vec<usize> = line
        .segments
        .iter()
        .enumerate()
        .map(|(i, s)| match s.text_range() {
            Some(range) if i < last_content && s.is_whitespace() && !s.collapsed => {
                text[range].chars().count()
            }
            _ => 0,
        })
        .collect();
    let total: usize = weights.iter().sum();
    if total == 0 {
        return;
    }

    let mut dx = 0.0;
    for (segment, weight) in line.segments.iter_mut().zip(weights) {
        segment.x += dx;
        if weight > 0 {
            let extra = free * weight as f32 / total as f32;
            segment.width += extra;
            dx += extra;
        }
    }
    line.width += free;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorValue;
    use crate::layout::inline::layout_inline;
    use crate::measure::ApproximateMetrics;
    use crate::object::{NO_ID, ObjectList};

    fn laid_out(text: &str, width: f32) -> (ObjectList, LayoutResult) {
        let mut metrics = ApproximateMetrics::new();
        let font = metrics.add_font(16.0);
        let mut objects = ObjectList::new();
        objects.push_text(text, font, ColorValue::BLACK, NO_ID);
        let result = layout_inline(&objects, width, &metrics).unwrap();
        (objects, result)
    }

    #[test]
    fn test_right_and_center_shift_segments() {
        let (objects, mut result) = laid_out("ab", 100.0);
        align_lines(&mut result, Alignment::Right, objects.combined_text());
        assert_eq!(result.lines[0].segments[0].x, 84.0);

        let (objects, mut result) = laid_out("ab", 100.0);
        align_lines(&mut result, Alignment::Center, objects.combined_text());
        assert_eq!(result.lines[0].segments[0].x, 42.0);
    }

    #[test]
    fn test_justify_fills_all_but_last_line() {
        // "aa bb" (40px) then "cc" on the last line.
        let (objects, mut result) = laid_out("aa bb cc", 50.0);
        assert_eq!(result.lines.len(), 2);
        align_lines(&mut result, Alignment::Justify, objects.combined_text());

        let first = &result.lines[0];
        assert_eq!(first.width, 50.0);
        assert_eq!(first.segments[1].width, 18.0);
        assert_eq!(first.segments[2].x, 34.0);
        assert_eq!(result.lines[1].segments[0].x, 0.0);
    }

    #[test]
    fn test_justify_weights_gaps_by_length() {
        // Gaps of one and two spaces.
        let (objects, mut result) = laid_out("a b  c\nd", 80.0);
        // The first line ends at the newline, so justify leaves it alone.
        align_lines(&mut result, Alignment::Justify, objects.combined_text());
        assert_eq!(result.lines[0].width, 48.0);

        let (objects, mut result) = laid_out("a b  c d", 50.0);
        align_lines(&mut result, Alignment::Justify, objects.combined_text());
        let first = &result.lines[0];
        // "a b  c" is 48px wide in a 50px band.
        assert_eq!(first.width, 50.0);
        let gaps: Vec<f32> = first
            .segments
            .iter()
            .filter(|s| s.is_whitespace() && !s.collapsed)
            .map(|s| s.width)
            .take(2)
            .collect();
        let one = 8.0 + 2.0 / 3.0;
        let two = 16.0 + 4.0 / 3.0;
        assert!((gaps[0] - one).abs() < 1e-4);
        assert!((gaps[1] - two).abs() < 1e-4);
    }

    #[test]
    fn test_alignment_parses_from_str() {
        assert_eq!("Justify".parse::<Alignment>().ok(), Some(Alignment::Justify));
        assert_eq!(Alignment::Center.to_string(), "center");
        assert_eq!(Alignment::default(), Alignment::Left);
    }
}
