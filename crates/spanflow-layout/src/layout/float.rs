//! Float placement.
//!
//! A float is an image or component pulled to the left or right edge of the
//! block. Inline content flows beside it: every line whose vertical band
//! overlaps a float is shortened by the float's width on that side.
//!
//! The [`FloatContext`] only lives for one layout pass. The rectangles it
//! hands out are copied into the layout result; the context itself is
//! dropped when breaking finishes.

use serde::Serialize;
use strum_macros::{Display, EnumString};

use super::box_model::Rect;

/// Which edge a float is pulled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FloatSide {
    /// Pulled to the left edge; content flows on its right.
    Left,
    /// Pulled to the right edge; content flows on its left.
    Right,
}

/// A float reserved during the current pass.
#[derive(Debug, Clone, Copy)]
struct ReservedFloat {
    rect: Rect,
}

impl ReservedFloat {
    fn overlaps_band(&self, top: f32, bottom: f32) -> bool {
        self.rect.y < bottom && self.rect.bottom() > top
    }
}

/// Tracks the floats reserved so far in one layout pass.
#[derive(Debug)]
pub struct FloatContext {
    left_floats: Vec<ReservedFloat>,
    right_floats: Vec<ReservedFloat>,
    containing_width: f32,
}

impl FloatContext {
    /// Create a float context for a block of the given width.
    ///
    /// `containing_width` may be infinite (preferred-size passes).
    #[must_use]
    pub const fn new(containing_width: f32) -> Self {
        Self {
            left_floats: Vec::new(),
            right_floats: Vec::new(),
            containing_width,
        }
    }

    /// Returns true if no float has been reserved.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.left_floats.is_empty() && self.right_floats.is_empty()
    }

    /// Lowest bottom edge over all reserved floats (0 if none).
    #[must_use]
    pub fn max_float_bottom(&self) -> f32 {
        self.all()
            .map(|f| f.rect.bottom())
            .fold(0.0_f32, f32::max)
    }

    /// Whether any float overlaps the band `[y, y + height)`.
    ///
    /// A zero-height band is treated as the horizontal line at `y`.
    #[must_use]
    pub fn has_floats_at(&self, y: f32, height: f32) -> bool {
        let bottom = band_bottom(y, height);
        self.all().any(|f| f.overlaps_band(y, bottom))
    }

    /// Reserve a float of the given size at or below `current_y`.
    ///
    /// The float is placed as high as possible: if the band at `current_y`
    /// is too narrow because of earlier floats, the candidate position moves
    /// down to the next float bottom until it fits. A float wider than the
    /// whole block is placed at the first position with no other floats
    /// beside it and overflows.
    pub fn place_float(
        &mut self,
        side: FloatSide,
        box_width: f32,
        box_height: f32,
        current_y: f32,
    ) -> Rect {
        let mut y = current_y.max(0.0);

        loop {
            let (left_offset, avail_width) = self.available_width_at(y, box_height);
            let fits = box_width <= avail_width || !self.has_floats_at(y, box_height);
            let next_y = self.next_float_bottom_after(y);

            if fits || next_y <= y {
                let x = match side {
                    FloatSide::Left => left_offset,
                    FloatSide::Right => (left_offset + avail_width - box_width).max(0.0),
                };
                let rect = Rect::new(x, y, box_width, box_height);
                let reserved = ReservedFloat { rect };
                match side {
                    FloatSide::Left => self.left_floats.push(reserved),
                    FloatSide::Right => self.right_floats.push(reserved),
                }
                return rect;
            }

            y = next_y;
        }
    }

    /// `(left_offset, available_width)` for content in the band
    /// `[y, y + height)`, accounting for floats on both sides.
    #[must_use]
    pub fn available_width_at(&self, y: f32, height: f32) -> (f32, f32) {
        let bottom = band_bottom(y, height);

        let left_edge = self
            .left_floats
            .iter()
            .filter(|f| f.overlaps_band(y, bottom))
            .map(|f| f.rect.right())
            .fold(0.0_f32, f32::max);

        let right_edge = self
            .right_floats
            .iter()
            .filter(|f| f.overlaps_band(y, bottom))
            .map(|f| f.rect.x)
            .fold(self.containing_width, f32::min);

        (left_edge, (right_edge - left_edge).max(0.0))
    }

    /// Width taken from the right edge by floats in the band.
    ///
    /// With an unbounded containing width the right floats have no edge to
    /// hug, so their widths are summed instead.
    #[must_use]
    pub fn right_inset_at(&self, y: f32, height: f32) -> f32 {
        let bottom = band_bottom(y, height);
        let active = self
            .right_floats
            .iter()
            .filter(|f| f.overlaps_band(y, bottom));
        if self.containing_width.is_finite() {
            active
                .map(|f| self.containing_width - f.rect.x)
                .fold(0.0_f32, f32::max)
        } else {
            active.map(|f| f.rect.width).sum()
        }
    }

    /// Smallest float bottom edge strictly greater than `y`, or `y` itself
    /// if there is none.
    #[must_use]
    pub fn next_float_bottom_after(&self, y: f32) -> f32 {
        self.all()
            .map(|f| f.rect.bottom())
            .filter(|bottom| *bottom > y)
            .fold(None, |next: Option<f32>, bottom| {
                Some(next.map_or(bottom, |n| n.min(bottom)))
            })
            .unwrap_or(y)
    }

    fn all(&self) -> impl Iterator<Item = &ReservedFloat> {
        self.left_floats.iter().chain(self.right_floats.iter())
    }
}

/// Bottom of a band, widening zero-height bands so that a float starting
/// exactly at `y` still counts.
fn band_bottom(y: f32, height: f32) -> f32 {
    if height > 0.0 { y + height } else { y + f32::EPSILON.max(y.abs() * f32::EPSILON) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_float_shortens_band() {
        let mut ctx = FloatContext::new(100.0);
        let rect = ctx.place_float(FloatSide::Left, 30.0, 20.0, 0.0);
        assert_eq!(rect, Rect::new(0.0, 0.0, 30.0, 20.0));
        assert_eq!(ctx.available_width_at(0.0, 10.0), (30.0, 70.0));
        // Below the float the full width is back.
        assert_eq!(ctx.available_width_at(20.0, 10.0), (0.0, 100.0));
    }

    #[test]
    fn test_right_float_hugs_right_edge() {
        let mut ctx = FloatContext::new(100.0);
        let rect = ctx.place_float(FloatSide::Right, 25.0, 10.0, 5.0);
        assert_eq!(rect, Rect::new(75.0, 5.0, 25.0, 10.0));
        assert_eq!(ctx.available_width_at(5.0, 1.0), (0.0, 75.0));
        assert_eq!(ctx.right_inset_at(5.0, 1.0), 25.0);
    }

    #[test]
    fn test_float_moves_below_when_band_is_full() {
        let mut ctx = FloatContext::new(100.0);
        let _ = ctx.place_float(FloatSide::Left, 80.0, 20.0, 0.0);
        let second = ctx.place_float(FloatSide::Right, 40.0, 10.0, 0.0);
        assert_eq!(second.y, 20.0);
        assert_eq!(second.x, 60.0);
    }

    #[test]
    fn test_oversized_float_overflows_at_top() {
        let mut ctx = FloatContext::new(50.0);
        let rect = ctx.place_float(FloatSide::Left, 80.0, 10.0, 0.0);
        assert_eq!(rect, Rect::new(0.0, 0.0, 80.0, 10.0));
        assert_eq!(ctx.max_float_bottom(), 10.0);
    }

    #[test]
    fn test_side_parses_case_insensitively() {
        assert_eq!("LEFT".parse::<FloatSide>().ok(), Some(FloatSide::Left));
        assert_eq!(FloatSide::Right.to_string(), "right");
    }
}
