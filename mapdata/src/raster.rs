use std::path::Path;

use crate::color::Color;
use crate::error::MapError;

/// A decoded map bitmap: row-major pixels, top row first.
#[derive(Debug, Clone)]
pub struct MapRaster {
    width: u32,
    height: u32,
    channels: u32,
    data: Vec<u8>,
}

impl MapRaster {
    /// Decode a map image from disk. The result is always tightly packed RGB.
    ///
    /// A file that cannot be opened or decoded is fatal for whoever is
    /// building a catalog from it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let image = image::open(path)?.to_rgb8();
        let (width, height) = image.dimensions();
        log::debug!("Decoded map raster: {}x{}", width, height);
        Self::from_raw(width, height, 3, image.into_raw())
    }

    /// Wrap an already-decoded pixel buffer.
    ///
    /// The buffer must hold `width * height * channels` bytes with at least
    /// three channels per pixel. Dimensions are validated here once, so the
    /// scan loops can index without per-pixel bounds juggling.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: u32,
        data: Vec<u8>,
    ) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::InvalidRaster(format!(
                "empty image ({width}x{height})"
            )));
        }
        if channels < 3 {
            return Err(MapError::InvalidRaster(format!(
                "{channels} channels per pixel, need at least 3"
            )));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(MapError::InvalidRaster(format!(
                "buffer holds {} bytes, expected {}",
                data.len(),
                expected
            )));
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Color of the pixel at a row-major index.
    ///
    /// `index` must be below [`len`](Self::len); construction already
    /// guaranteed the backing buffer covers every pixel.
    pub fn color_at(&self, index: usize) -> Color {
        let base = index * self.channels as usize;
        Color::new(self.data[base], self.data[base + 1], self.data[base + 2])
    }
}
