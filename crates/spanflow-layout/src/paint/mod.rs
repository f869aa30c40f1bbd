//! Painting
//!
//! The layout engine never rasterizes. Painting walks the finished lines and
//! issues drawing calls on a [`RenderSurface`] supplied by the caller.
//!
//! # Architecture
//!
//! ```text
//! Objects → Layout → Paint → Render
//!                      ↓
//!               RenderSurface (DisplayList, a rasterizer, ...)
//! ```

mod display_list;
mod painter;

pub use display_list::{DisplayCommand, DisplayList};
pub use painter::{ELLIPSIS, Painter};

use crate::color::ColorValue;
use crate::layout::box_model::{Point, Rect};
use crate::object::{FontId, ImageId};

/// Drawing backend driven by [`Painter`].
pub trait RenderSurface {
    /// Draw `text` in `font` with its baseline origin at `position`.
    fn draw_text(&mut self, position: Point, text: &str, font: FontId, color: ColorValue);

    /// Draw `image` scaled into `rect`.
    fn draw_image(&mut self, image: ImageId, rect: Rect);

    /// Fill `rect` with a solid color.
    fn fill_rect(&mut self, rect: Rect, color: ColorValue);
}

impl<S: RenderSurface + ?Sized> RenderSurface for &mut S {
    fn draw_text(&mut self, position: Point, text: &str, font: FontId, color: ColorValue) {
        (**self).draw_text(position, text, font, color);
    }

    fn draw_image(&mut self, image: ImageId, rect: Rect) {
        (**self).draw_image(image, rect);
    }

    fn fill_rect(&mut self, rect: Rect, color: ColorValue) {
        (**self).fill_rect(rect, color);
    }
}
