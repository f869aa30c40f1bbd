//! Decoded image data shared between image loaders and render surfaces.

/// Decoded RGBA image.
///
/// The layout engine only ever sees an image's size; render surfaces use the
/// pixels.
#[derive(Clone)]
pub struct LoadedImage {
    /// Intrinsic width of the image in pixels.
    width: u32,
    /// Intrinsic height of the image in pixels.
    height: u32,
    /// Raw RGBA pixel data (width * height * 4 bytes).
    rgba_data: Vec<u8>,
}

impl LoadedImage {
    /// Create a new `LoadedImage` from decoded RGBA pixel data.
    ///
    /// Returns `None` when `rgba_data` is not exactly `width * height * 4`
    /// bytes long.
    #[must_use]
    pub fn new(width: u32, height: u32, rgba_data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (rgba_data.len() == expected).then_some(Self {
            width,
            height,
            rgba_data,
        })
    }

    /// Intrinsic width of the image in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Intrinsic height of the image in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Intrinsic dimensions as `(width, height)` in `f32`, for layout.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn dimensions_f32(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    /// RGBA components of the pixel at `(x, y)`, or `None` outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.rgba_data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_short_buffer() {
        assert!(LoadedImage::new(2, 2, vec![0; 15]).is_none());
        assert!(LoadedImage::new(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn test_pixel_lookup() {
        let mut data = vec![0; 8];
        data[4..8].copy_from_slice(&[1, 2, 3, 4]);
        let img = LoadedImage::new(2, 1, data).unwrap();
        assert_eq!(img.pixel(1, 0), Some([1, 2, 3, 4]));
        assert_eq!(img.pixel(2, 0), None);
        assert_eq!(img.dimensions_f32(), (2.0, 1.0));
    }
}
