//! Measurement collaborators.
//!
//! The flow engine never touches glyphs directly. It asks a [`TextMeasurer`]
//! for advance widths and vertical font metrics, and an [`ObjectSizer`] for
//! the size of images and components. After layout, components learn their
//! final rectangle through a [`ComponentHost`].
//!
//! Implementations are expected to be pure and fast; any caching (glyph
//! atlases, shaping caches) is the implementor's business.

use serde::Serialize;

use crate::error::MeasureError;
use crate::layout::box_model::{Rect, Size};
use crate::object::{ComponentId, FontId, ImageId};

/// Vertical metrics of a font.
///
/// Both `ascender` and `descender` are non-negative distances from the
/// baseline. `line_height` is the distance between consecutive baselines the
/// font asks for; any excess over `ascender + descender` is split evenly
/// above and below (half-leading).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FontMetrics {
    /// Height above the baseline.
    pub ascender: f32,
    /// Depth below the baseline.
    pub descender: f32,
    /// Preferred distance between baselines.
    pub line_height: f32,
}

impl FontMetrics {
    /// Half of the leading, added above the ascender and below the descender.
    #[must_use]
    pub fn half_leading(&self) -> f32 {
        ((self.line_height - self.ascender - self.descender) / 2.0).max(0.0)
    }
}

/// Result of measuring a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextExtent {
    /// Advance width.
    pub width: f32,
    /// Height above the baseline.
    pub ascender: f32,
    /// Depth below the baseline.
    pub descender: f32,
}

/// Font service: text measurement and reverse hit mapping.
pub trait TextMeasurer {
    /// Measure `text` set in `font`.
    ///
    /// # Errors
    ///
    /// Returns a [`MeasureError`] if the font is unknown or a glyph is
    /// missing and the measurer has no fallback.
    fn measure(&self, font: FontId, text: &str) -> Result<TextExtent, MeasureError>;

    /// Vertical metrics of `font`.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::UnknownFont`] if the font is not registered.
    fn font_metrics(&self, font: FontId) -> Result<FontMetrics, MeasureError>;

    /// Byte offset into `text` of the character boundary nearest to `x`,
    /// measured from the start of `text`.
    ///
    /// The provided implementation measures successively longer prefixes
    /// until it passes `x`. Measurers with direct glyph-position lookup
    /// should override it.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`TextMeasurer::measure`].
    fn offset_at_x(&self, font: FontId, text: &str, x: f32) -> Result<usize, MeasureError> {
        if x <= 0.0 {
            return Ok(0);
        }
        let mut prev_offset = 0;
        let mut prev_width = 0.0;
        for (idx, ch) in text.char_indices() {
            let end = idx + ch.len_utf8();
            let width = self.measure(font, &text[..end])?.width;
            if width >= x {
                // Ties go to the earlier boundary.
                return Ok(if x - prev_width <= width - x {
                    prev_offset
                } else {
                    end
                });
            }
            prev_offset = end;
            prev_width = width;
        }
        Ok(text.len())
    }
}

/// Image and component service: intrinsic sizes.
pub trait ObjectSizer {
    /// Size of an image.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::UnknownImage`] if the image is not registered.
    fn image_size(&self, image: ImageId) -> Result<Size, MeasureError>;

    /// Size of a component.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::UnknownComponent`] if the component is not
    /// registered.
    fn component_size(&self, component: ComponentId) -> Result<Size, MeasureError>;
}

/// Receiver of final component placements.
pub trait ComponentHost {
    /// Tell `component` where it was placed.
    fn set_geometry(&mut self, component: ComponentId, rect: Rect);
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, font: FontId, text: &str) -> Result<TextExtent, MeasureError> {
        (**self).measure(font, text)
    }

    fn font_metrics(&self, font: FontId) -> Result<FontMetrics, MeasureError> {
        (**self).font_metrics(font)
    }

    fn offset_at_x(&self, font: FontId, text: &str, x: f32) -> Result<usize, MeasureError> {
        (**self).offset_at_x(font, text, x)
    }
}

impl<T: ObjectSizer + ?Sized> ObjectSizer for &T {
    fn image_size(&self, image: ImageId) -> Result<Size, MeasureError> {
        (**self).image_size(image)
    }

    fn component_size(&self, component: ComponentId) -> Result<Size, MeasureError> {
        (**self).component_size(component)
    }
}

/// Everything the flow engine consults while laying out a block.
pub trait LayoutEnvironment: TextMeasurer + ObjectSizer {}

impl<T: TextMeasurer + ObjectSizer + ?Sized> LayoutEnvironment for T {}

/// Approximate metrics using fixed ratios of the font size.
///
/// Without access to font data, every character advances by half the font
/// size, the ascent is three quarters of it and the descent one quarter,
/// with a line height of 1.25em. All ratios are exact in binary, so layouts
/// built on these metrics are reproducible to the bit.
///
/// Image and component sizes come from tables filled by the caller. Used as
/// a fallback when no font is available, and in tests.
#[derive(Debug, Clone, Default)]
pub struct ApproximateMetrics {
    font_sizes: Vec<f32>,
    image_sizes: Vec<Size>,
    component_sizes: Vec<Size>,
}

impl ApproximateMetrics {
    /// Advance width of every character, as a fraction of the font size.
    pub const CHAR_WIDTH_RATIO: f32 = 0.5;
    /// Ascent as a fraction of the font size.
    pub const ASCENT_RATIO: f32 = 0.75;
    /// Descent as a fraction of the font size.
    pub const DESCENT_RATIO: f32 = 0.25;
    /// Line height as a fraction of the font size.
    pub const LINE_HEIGHT_RATIO: f32 = 1.25;

    /// Create metrics with no fonts, images or components.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            font_sizes: Vec::new(),
            image_sizes: Vec::new(),
            component_sizes: Vec::new(),
        }
    }

    /// Register a font of the given pixel size.
    pub fn add_font(&mut self, font_size: f32) -> FontId {
        self.font_sizes.push(font_size);
        FontId(next_handle(self.font_sizes.len()))
    }

    /// Register an image with an intrinsic size.
    pub fn add_image(&mut self, size: Size) -> ImageId {
        self.image_sizes.push(size);
        ImageId(next_handle(self.image_sizes.len()))
    }

    /// Register a component with an intrinsic size.
    pub fn add_component(&mut self, size: Size) -> ComponentId {
        self.component_sizes.push(size);
        ComponentId(next_handle(self.component_sizes.len()))
    }

    fn font_size(&self, font: FontId) -> Result<f32, MeasureError> {
        self.font_sizes
            .get(font.0 as usize)
            .copied()
            .ok_or(MeasureError::UnknownFont(font))
    }
}

/// Handle for the entry just pushed onto a table of `len` entries.
fn next_handle(len: usize) -> u32 {
    u32::try_from(len - 1).unwrap_or(u32::MAX)
}

impl TextMeasurer for ApproximateMetrics {
    #[allow(clippy::cast_precision_loss)]
    fn measure(&self, font: FontId, text: &str) -> Result<TextExtent, MeasureError> {
        let font_size = self.font_size(font)?;
        // Control characters have no advance.
        let chars = text.chars().filter(|ch| !ch.is_control() || *ch == '\t').count();
        Ok(TextExtent {
            width: chars as f32 * font_size * Self::CHAR_WIDTH_RATIO,
            ascender: font_size * Self::ASCENT_RATIO,
            descender: font_size * Self::DESCENT_RATIO,
        })
    }

    fn font_metrics(&self, font: FontId) -> Result<FontMetrics, MeasureError> {
        let font_size = self.font_size(font)?;
        Ok(FontMetrics {
            ascender: font_size * Self::ASCENT_RATIO,
            descender: font_size * Self::DESCENT_RATIO,
            line_height: font_size * Self::LINE_HEIGHT_RATIO,
        })
    }
}

impl ObjectSizer for ApproximateMetrics {
    fn image_size(&self, image: ImageId) -> Result<Size, MeasureError> {
        self.image_sizes
            .get(image.0 as usize)
            .copied()
            .ok_or(MeasureError::UnknownImage(image))
    }

    fn component_size(&self, component: ComponentId) -> Result<Size, MeasureError> {
        self.component_sizes
            .get(component.0 as usize)
            .copied()
            .ok_or(MeasureError::UnknownComponent(component))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approximate_widths_are_exact() {
        let mut metrics = ApproximateMetrics::new();
        let font = metrics.add_font(16.0);
        let extent = metrics.measure(font, "hello").unwrap();
        assert_eq!(extent.width, 40.0);
        let fm = metrics.font_metrics(font).unwrap();
        assert_eq!((fm.ascender, fm.descender, fm.line_height), (12.0, 4.0, 20.0));
        assert_eq!(fm.half_leading(), 2.0);
    }

    #[test]
    fn test_unknown_handles_fail() {
        let metrics = ApproximateMetrics::new();
        assert_eq!(
            metrics.measure(FontId(3), "x"),
            Err(MeasureError::UnknownFont(FontId(3)))
        );
        assert_eq!(
            metrics.image_size(ImageId(0)),
            Err(MeasureError::UnknownImage(ImageId(0)))
        );
    }

    #[test]
    fn test_offset_at_x_picks_nearest_boundary() {
        let mut metrics = ApproximateMetrics::new();
        let font = metrics.add_font(20.0); // 10px per char
        assert_eq!(metrics.offset_at_x(font, "abcd", -5.0).unwrap(), 0);
        assert_eq!(metrics.offset_at_x(font, "abcd", 4.0).unwrap(), 0);
        assert_eq!(metrics.offset_at_x(font, "abcd", 6.0).unwrap(), 1);
        assert_eq!(metrics.offset_at_x(font, "abcd", 31.0).unwrap(), 3);
        assert_eq!(metrics.offset_at_x(font, "abcd", 100.0).unwrap(), 4);
    }

    #[test]
    fn test_offset_at_x_respects_multibyte_chars() {
        let mut metrics = ApproximateMetrics::new();
        let font = metrics.add_font(20.0);
        // "é" is two bytes; the boundary after it is byte 2.
        assert_eq!(metrics.offset_at_x(font, "éa", 8.0).unwrap(), 2);
    }
}
