//! Property tests for the line breaker.

use quickcheck_macros::quickcheck;
use spanflow_layout::{ApproximateMetrics, ColorValue, LayoutResult, NO_ID, SpanLayout};

/// Helper: turn arbitrary bytes into text made of short words, spaces and
/// newlines.
fn text_from(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| match b % 7 {
            0 => 'a',
            1 => 'b',
            2 => 'c',
            3 => 'd',
            4 | 5 => ' ',
            _ => '\n',
        })
        .collect()
}

/// Helper: lay out `text` in a 16px font at `width`.
fn layout(text: &str, width: f32) -> LayoutResult {
    let mut metrics = ApproximateMetrics::new();
    let font = metrics.add_font(16.0);
    let mut block = SpanLayout::new(metrics);
    block.add_text(text, font, ColorValue::BLACK, NO_ID);
    block.layout(width).unwrap();
    block.layout_result().unwrap().clone()
}

#[quickcheck]
fn prop_layout_is_idempotent(bytes: Vec<u8>, width: u16) -> bool {
    let text = text_from(&bytes);
    let width = f32::from(width % 400);

    let mut metrics = ApproximateMetrics::new();
    let font = metrics.add_font(16.0);
    let mut block = SpanLayout::new(metrics);
    block.add_text(&text, font, ColorValue::BLACK, NO_ID);
    block.layout(width).unwrap();
    let first = block.layout_result().unwrap().clone();
    block.layout(width).unwrap();
    first == *block.layout_result().unwrap()
}

#[quickcheck]
fn prop_lines_respect_width(bytes: Vec<u8>, width: u16) -> bool {
    let text = text_from(&bytes);
    let width = f32::from(width % 400);
    let result = layout(&text, width);

    result.lines.iter().all(|line| {
        let words = line
            .segments
            .iter()
            .filter(|s| !s.is_whitespace() && !s.collapsed)
            .count();
        // Only a single oversized word may overflow.
        line.width <= width || words == 1
    })
}

#[quickcheck]
fn prop_segments_preserve_text_order(bytes: Vec<u8>, width: u16) -> bool {
    let text = text_from(&bytes);
    let width = f32::from(width % 400);
    let result = layout(&text, width);

    let rebuilt: String = result
        .lines
        .iter()
        .flat_map(|line| &line.segments)
        .filter_map(|s| s.text_range())
        .map(|range| &text[range])
        .collect();
    rebuilt == text.replace('\n', "")
}

#[quickcheck]
fn prop_wider_never_needs_more_lines(bytes: Vec<u8>, a: u16, b: u16) -> bool {
    let text = text_from(&bytes);
    let narrow = f32::from(a.min(b) % 400);
    let wide = f32::from(a.max(b) % 400).max(narrow);

    layout(&text, narrow).lines.len() >= layout(&text, wide).lines.len()
}
