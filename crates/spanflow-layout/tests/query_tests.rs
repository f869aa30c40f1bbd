//! Integration tests for hit-testing, rectangle lookup and block metrics.

use spanflow_layout::{
    Alignment, ApproximateMetrics, ColorValue, FloatSide, FontId, HitTestKind, NO_ID, Point, Rect,
    Size, SpanLayout,
};

/// Helper: a 16px font (8px per character, 20px lines) and a block over it.
fn block_with_font() -> (SpanLayout<ApproximateMetrics>, FontId) {
    let mut metrics = ApproximateMetrics::new();
    let font = metrics.add_font(16.0);
    (SpanLayout::new(metrics), font)
}

#[test]
fn test_preferred_size_round_trip() {
    let (mut block, font) = block_with_font();
    block.add_text("hello world", font, ColorValue::WHITE, 1);
    block.layout(1.0e6).unwrap();

    // 11 characters at 8px, one line of ascender + descender.
    assert_eq!(block.find_preferred_size().unwrap(), Size::new(88.0, 20.0));
    assert_eq!(block.size().unwrap(), Size::new(88.0, 20.0));
}

#[test]
fn test_preferred_size_ignores_current_width() {
    let (mut block, font) = block_with_font();
    block.add_text("aaa bbb ccc", font, ColorValue::BLACK, NO_ID);
    block.layout(30.0).unwrap();

    assert_eq!(block.layout_result().unwrap().lines.len(), 3);
    assert_eq!(block.find_preferred_size().unwrap(), Size::new(88.0, 20.0));
    // The stored layout is untouched.
    assert_eq!(block.layout_result().unwrap().lines.len(), 3);
}

#[test]
fn test_preferred_size_includes_floats() {
    let (mut block, font) = block_with_font();
    let image = block.env_mut().add_image(Size::new(30.0, 50.0));
    block.add_floating_image(image, FloatSide::Right, NO_ID);
    block.add_text("abc", font, ColorValue::BLACK, NO_ID);

    assert_eq!(block.find_preferred_size().unwrap(), Size::new(54.0, 50.0));
    // Never laid out with a width: the float sits at the natural right edge.
    assert_eq!(block.rect_by_id(NO_ID).unwrap()[1], Rect::new(24.0, 0.0, 30.0, 50.0));
}

#[test]
fn test_rect_by_id_one_rect_per_wrapped_line() {
    let (mut block, font) = block_with_font();
    block.add_text("aaa bbb ccc", font, ColorValue::BLACK, 7);
    block.layout(30.0).unwrap();

    assert_eq!(
        block.rect_by_id(7).unwrap(),
        vec![
            Rect::new(0.0, 0.0, 24.0, 20.0),
            Rect::new(0.0, 20.0, 24.0, 20.0),
            Rect::new(0.0, 40.0, 24.0, 20.0),
        ]
    );
    assert!(block.rect_by_id(8).unwrap().is_empty());
}

#[test]
fn test_rect_by_id_covers_only_matching_runs() {
    let (mut block, font) = block_with_font();
    block.add_text("ab ", font, ColorValue::BLACK, 1);
    block.add_text("cd", font, ColorValue::BLACK, 2);
    block.layout(1000.0).unwrap();

    assert_eq!(block.rect_by_id(2).unwrap(), vec![Rect::new(24.0, 0.0, 16.0, 20.0)]);
}

#[test]
fn test_rect_by_id_finds_floats() {
    let (mut block, font) = block_with_font();
    let image = block.env_mut().add_image(Size::new(10.0, 10.0));
    block.add_text("x", font, ColorValue::BLACK, NO_ID);
    block.add_floating_image(image, FloatSide::Right, 3);
    block.layout(100.0).unwrap();

    assert_eq!(block.rect_by_id(3).unwrap(), vec![Rect::new(90.0, 0.0, 10.0, 10.0)]);
}

#[test]
fn test_hit_test_above_and_below() {
    let (mut block, font) = block_with_font();
    block.add_text("ab", font, ColorValue::WHITE, NO_ID);
    block.layout(100.0).unwrap();

    let above = block.hit_test(Point::new(4.0, -1.0)).unwrap();
    assert_eq!(above.kind, HitTestKind::OutsideTop);
    let below = block.hit_test(Point::new(4.0, 20.0)).unwrap();
    assert_eq!(below.kind, HitTestKind::OutsideBottom);
    assert_eq!(below.offset, 2);
}

#[test]
fn test_hit_test_on_empty_block() {
    let (mut block, _) = block_with_font();
    let hit = block.hit_test(Point::new(0.0, 0.0)).unwrap();
    assert_eq!(hit.kind, HitTestKind::NoObjectsAvailable);
    assert_eq!(hit.object_id, NO_ID);
}

#[test]
fn test_hit_test_inside_second_line() {
    let (mut block, font) = block_with_font();
    block.add_text("aaa ", font, ColorValue::BLACK, 1);
    block.add_text("bbb", font, ColorValue::BLACK, 2);
    block.layout(30.0).unwrap();

    // "bbb" wraps to the second line; x=17 is nearest the boundary after "bb".
    let hit = block.hit_test(Point::new(17.0, 30.0)).unwrap();
    assert_eq!(hit.kind, HitTestKind::Inside);
    assert_eq!(hit.object_id, 2);
    assert_eq!(hit.offset, 6);
}

#[test]
fn test_hit_test_on_float() {
    let (mut block, font) = block_with_font();
    let image = block.env_mut().add_image(Size::new(20.0, 20.0));
    block.add_text("ab", font, ColorValue::BLACK, 1);
    block.add_floating_image(image, FloatSide::Left, 9);
    block.layout(100.0).unwrap();

    let hit = block.hit_test(Point::new(5.0, 5.0)).unwrap();
    assert_eq!(hit.kind, HitTestKind::Inside);
    assert_eq!(hit.object_id, 9);
    assert_eq!(hit.offset, 2);
}

#[test]
fn test_baseline_offsets() {
    let mut metrics = ApproximateMetrics::new();
    let small = metrics.add_font(16.0);
    let large = metrics.add_font(32.0);
    let mut block = SpanLayout::new(metrics);

    assert_eq!(block.first_baseline_offset().unwrap(), 0.0);
    assert_eq!(block.last_baseline_offset().unwrap(), 0.0);

    block.add_text("a\n", small, ColorValue::BLACK, NO_ID);
    block.add_text("B", large, ColorValue::BLACK, NO_ID);
    block.layout(100.0).unwrap();
    assert_eq!(block.first_baseline_offset().unwrap(), 14.0);
    assert_eq!(block.last_baseline_offset().unwrap(), 28.0);
}

#[test]
fn test_justify_leaves_last_line_alone() {
    let (mut block, font) = block_with_font();
    block.set_align(Alignment::Justify);
    block.add_text("aa bb cc dd", font, ColorValue::BLACK, NO_ID);
    block.layout(50.0).unwrap();

    let result = block.layout_result().unwrap();
    assert_eq!(result.lines.len(), 2);
    assert_eq!(result.lines[0].width, 50.0);
    // Last line keeps its natural width and position.
    assert_eq!(result.lines[1].width, 40.0);
    assert_eq!(result.lines[1].segments[0].x, 0.0);
    assert_eq!(result.lines[1].segments[2].x, 24.0);
}

#[test]
fn test_right_alignment_moves_rect() {
    let (mut block, font) = block_with_font();
    block.set_align(Alignment::Right);
    block.add_text("ab", font, ColorValue::BLACK, NO_ID);
    block.layout(100.0).unwrap();

    assert_eq!(block.rect().unwrap(), Rect::new(84.0, 0.0, 16.0, 20.0));
}

#[test]
fn test_selection_and_cursor_clamp() {
    let (mut block, font) = block_with_font();
    block.add_text("hello", font, ColorValue::BLACK, NO_ID);
    block.set_selection_range(4, 99);
    assert_eq!(block.selection_range(), 4..5);
    block.set_cursor_pos(99);
    assert_eq!(block.cursor_pos(), 5);
}

#[test]
fn test_selection_rects_follow_position() {
    let (mut block, font) = block_with_font();
    block.add_text("hello", font, ColorValue::BLACK, NO_ID);
    block.set_position(Point::new(100.0, 50.0));
    block.set_selection_range(1, 3);

    assert_eq!(
        block.selection_rects().unwrap(),
        vec![Rect::new(108.0, 50.0, 16.0, 20.0)]
    );
}
