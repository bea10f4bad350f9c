//! Fixed-size color raster written by the field evaluator.

use crate::color::Srgb;
use crate::error::EngineError;
use crate::field::checked_len;

/// A `width * height` row-major grid of [`Srgb`] pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Srgb>,
}

impl ImageBuffer {
    /// Creates a black image. Zero or overflowing dimensions are rejected.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![Srgb::BLACK; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[Srgb] {
        &self.pixels
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn get(&self, x: usize, y: usize) -> Option<Srgb> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Writes `(x, y)`. Out-of-range writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, color: Srgb) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// One row as a mutable slice.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row_mut(&mut self, y: usize) -> &mut [Srgb] {
        let start = y * self.width;
        &mut self.pixels[start..start + self.width]
    }
}
