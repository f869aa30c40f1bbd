//! Text measurement backed by fontdue.
//!
//! Vertical metrics come from the font's horizontal line metrics (ascent,
//! descent and line gap); advance widths are summed per character the same
//! way [`crate::renderer::Renderer`] advances its pen.

use std::path::Path;

use fontdue::{Font, FontSettings};
use spanflow_layout::{
    ApproximateMetrics, ComponentId, FontId, FontMetrics, ImageId, LayoutEnvironment,
    MeasureError, ObjectSizer, Size, TextExtent, TextMeasurer,
};

/// Common system font paths to search for a default font.
pub const FONT_SEARCH_PATHS: &[&str] = &[
    // macOS
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/SFNS.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    // Windows
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// Load the first font in `paths` that exists and parses.
pub fn load_font_from_paths<P: AsRef<Path>>(paths: &[P]) -> Option<Font> {
    for path in paths {
        if let Ok(data) = std::fs::read(path)
            && let Ok(font) = Font::from_bytes(data, FontSettings::default())
        {
            log::info!("loaded font: {}", path.as_ref().display());
            return Some(font);
        }
    }
    None
}

/// A measurement environment the CLI can register fonts and images with.
pub trait FontRegistry: LayoutEnvironment {
    /// Register the font at `font_size` pixels.
    fn add_font(&mut self, font_size: f32) -> FontId;

    /// Register an image with its intrinsic size.
    fn add_image(&mut self, size: Size) -> ImageId;

    /// Font used to rasterize text, if glyph outlines are available.
    fn raster_font(&self) -> Option<&Font>;
}

impl FontRegistry for ApproximateMetrics {
    fn add_font(&mut self, font_size: f32) -> FontId {
        Self::add_font(self, font_size)
    }

    fn add_image(&mut self, size: Size) -> ImageId {
        Self::add_image(self, size)
    }

    fn raster_font(&self) -> Option<&Font> {
        None
    }
}

/// Font metrics implementation backed by fontdue's per-glyph metrics.
///
/// One outline font serves every registered size; a [`FontId`] indexes the
/// registered pixel sizes. Uses `Font::metrics()` rather than
/// `Font::rasterize()` so measuring never generates bitmaps.
pub struct FontdueMetrics {
    font: Font,
    font_sizes: Vec<f32>,
    image_sizes: Vec<Size>,
    /// Fail on characters the font has no glyph for instead of measuring
    /// the font's fallback glyph.
    strict: bool,
}

impl FontdueMetrics {
    /// Create metrics over `font`.
    #[must_use]
    pub const fn new(font: Font, strict: bool) -> Self {
        Self {
            font,
            font_sizes: Vec::new(),
            image_sizes: Vec::new(),
            strict,
        }
    }

    fn font_size(&self, font: FontId) -> Result<f32, MeasureError> {
        self.font_sizes
            .get(font.0 as usize)
            .copied()
            .ok_or(MeasureError::UnknownFont(font))
    }

    fn vertical_metrics(&self, font_size: f32) -> FontMetrics {
        // Fonts without a hhea table fall back to fixed ratios.
        self.font.horizontal_line_metrics(font_size).map_or_else(
            || FontMetrics {
                ascender: font_size * ApproximateMetrics::ASCENT_RATIO,
                descender: font_size * ApproximateMetrics::DESCENT_RATIO,
                line_height: font_size * ApproximateMetrics::LINE_HEIGHT_RATIO,
            },
            |line| FontMetrics {
                ascender: line.ascent,
                descender: -line.descent,
                line_height: line.new_line_size,
            },
        )
    }
}

fn handle(len: usize) -> u32 {
    u32::try_from(len - 1).unwrap_or(u32::MAX)
}

impl FontRegistry for FontdueMetrics {
    fn add_font(&mut self, font_size: f32) -> FontId {
        self.font_sizes.push(font_size);
        FontId(handle(self.font_sizes.len()))
    }

    fn add_image(&mut self, size: Size) -> ImageId {
        self.image_sizes.push(size);
        ImageId(handle(self.image_sizes.len()))
    }

    fn raster_font(&self) -> Option<&Font> {
        Some(&self.font)
    }
}

impl TextMeasurer for FontdueMetrics {
    fn measure(&self, font: FontId, text: &str) -> Result<TextExtent, MeasureError> {
        let font_size = self.font_size(font)?;
        let mut width = 0.0;
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            if self.strict && self.font.lookup_glyph_index(ch) == 0 {
                return Err(MeasureError::MissingGlyph { font, ch });
            }
            width += self.font.metrics(ch, font_size).advance_width;
        }
        let metrics = self.vertical_metrics(font_size);
        Ok(TextExtent {
            width,
            ascender: metrics.ascender,
            descender: metrics.descender,
        })
    }

    fn font_metrics(&self, font: FontId) -> Result<FontMetrics, MeasureError> {
        Ok(self.vertical_metrics(self.font_size(font)?))
    }
}

impl ObjectSizer for FontdueMetrics {
    fn image_size(&self, image: ImageId) -> Result<Size, MeasureError> {
        self.image_sizes
            .get(image.0 as usize)
            .copied()
            .ok_or(MeasureError::UnknownImage(image))
    }

    fn component_size(&self, component: ComponentId) -> Result<Size, MeasureError> {
        Err(MeasureError::UnknownComponent(component))
    }
}
