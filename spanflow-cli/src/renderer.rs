//! Software render surface for PNG output.
//!
//! Rasterizes the drawing calls the layout engine issues into an RGBA pixel
//! buffer, using fontdue for glyphs.
//!
//! # Architecture
//!
//! ```text
//! Objects → Layout → Paint → Render
//!                      ↓        ↓
//!              RenderSurface → Pixels
//! ```
//!
//! The renderer knows nothing about lines or floats. It only executes the
//! calls it receives (fill rectangles, draw text, draw images).

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use fontdue::Font;
use image::{ImageBuffer, Rgba, RgbaImage};
use spanflow_common::image::LoadedImage;
use spanflow_layout::{ColorValue, FontId, ImageId, Point, Rect, RenderSurface};

/// Software renderer that draws into a pixel buffer.
pub struct Renderer<'a> {
    /// RGBA pixel buffer
    buffer: RgbaImage,
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Font for text rendering (None skips text)
    font: Option<&'a Font>,
    /// Pixel size of each registered font handle
    font_sizes: HashMap<FontId, f32>,
    /// Decoded images keyed by handle. Used for `draw_image` calls.
    images: HashMap<ImageId, LoadedImage>,
}

impl<'a> Renderer<'a> {
    /// Create a renderer with a white background.
    #[must_use]
    pub fn new(
        width: u32,
        height: u32,
        font: Option<&'a Font>,
        font_sizes: HashMap<FontId, f32>,
        images: HashMap<ImageId, LoadedImage>,
    ) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        if font.is_none() {
            log::warn!("no outline font available, text will not be rendered");
        }
        Self {
            buffer,
            width,
            height,
            font,
            font_sizes,
            images,
        }
    }

    /// The pixel buffer drawn so far.
    #[must_use]
    pub const fn buffer(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Write the buffer to `path`; the format follows the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be saved to the given path.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.buffer
            .save(path)
            .with_context(|| format!("failed to save image to '{}'", path.display()))
    }

    /// Blend `color` at `alpha` coverage onto the pixel at `(px, py)`,
    /// ignoring coordinates outside the buffer.
    #[allow(clippy::cast_sign_loss)]
    fn blend_pixel(&mut self, px: i32, py: i32, color: Rgba<u8>, alpha: u8) {
        if px < 0 || py < 0 || px as u32 >= self.width || py as u32 >= self.height {
            return;
        }
        let (px, py) = (px as u32, py as u32);
        if alpha == 255 {
            self.buffer.put_pixel(px, py, color);
        } else {
            let bg = *self.buffer.get_pixel(px, py);
            self.buffer.put_pixel(px, py, alpha_blend(color, bg, alpha));
        }
    }
}

impl RenderSurface for Renderer<'_> {
    /// Rasterize `text` with its baseline at `position.y`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    fn draw_text(&mut self, position: Point, text: &str, font: FontId, color: ColorValue) {
        let (Some(outline), Some(&font_size)) = (self.font, self.font_sizes.get(&font)) else {
            return;
        };
        let rgba = Rgba([color.r, color.g, color.b, 255]);
        let mut pen_x = position.x;

        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let (metrics, bitmap) = outline.rasterize(ch, font_size);

            // fontdue offsets are relative to the baseline, positive up.
            let glyph_x = pen_x as i32 + metrics.xmin;
            let glyph_y = position.y as i32 - metrics.ymin - metrics.height as i32;

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let coverage = bitmap[gy * metrics.width + gx];
                    if coverage == 0 {
                        continue;
                    }
                    let alpha = (u16::from(coverage) * u16::from(color.a) / 255) as u8;
                    self.blend_pixel(glyph_x + gx as i32, glyph_y + gy as i32, rgba, alpha);
                }
            }

            pen_x += metrics.advance_width;
        }
    }

    /// Draw an image scaled to the destination rectangle.
    ///
    /// Uses nearest-neighbor sampling, then alpha-blends onto the buffer.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    fn draw_image(&mut self, image: ImageId, rect: Rect) {
        let Some(img) = self.images.get(&image) else {
            return;
        };

        let dest_x = rect.x as i32;
        let dest_y = rect.y as i32;
        let dest_w = rect.width as u32;
        let dest_h = rect.height as u32;
        let src_w = img.width();
        let src_h = img.height();

        if src_w == 0 || src_h == 0 || dest_w == 0 || dest_h == 0 {
            return;
        }

        let mut samples = Vec::with_capacity((dest_w * dest_h) as usize);
        for dy in 0..dest_h {
            for dx in 0..dest_w {
                // Nearest-neighbor sampling
                let sx = ((u64::from(dx) * u64::from(src_w)) / u64::from(dest_w))
                    .min(u64::from(src_w) - 1) as u32;
                let sy = ((u64::from(dy) * u64::from(src_h)) / u64::from(dest_h))
                    .min(u64::from(src_h) - 1) as u32;
                if let Some([r, g, b, a]) = img.pixel(sx, sy)
                    && a > 0
                {
                    samples.push((dx as i32, dy as i32, Rgba([r, g, b, 255]), a));
                }
            }
        }
        for (dx, dy, color, alpha) in samples {
            self.blend_pixel(dest_x + dx, dest_y + dy, color, alpha);
        }
    }

    /// Fill a rectangle with the given color.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    fn fill_rect(&mut self, rect: Rect, color: ColorValue) {
        let rgba = Rgba([color.r, color.g, color.b, 255]);
        let x = rect.x as i32;
        let y = rect.y as i32;
        let width = rect.width.ceil() as u32;
        let height = rect.height.ceil() as u32;

        for dy in 0..height {
            for dx in 0..width {
                self.blend_pixel(x + dx as i32, y + dy as i32, rgba, color.a);
            }
        }
    }
}

/// Alpha blend a foreground color onto a background color.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn alpha_blend(fg: Rgba<u8>, bg: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    let a = f32::from(alpha) / 255.0;
    let inv_a = 1.0 - a;

    Rgba([
        f32::from(fg[0]).mul_add(a, f32::from(bg[0]) * inv_a) as u8,
        f32::from(fg[1]).mul_add(a, f32::from(bg[1]) * inv_a) as u8,
        f32::from(fg[2]).mul_add(a, f32::from(bg[2]) * inv_a) as u8,
        255,
    ])
}
