//! CPU-side PNG output.
//!
//! Feature-gated behind `png` (default on) so that embedders can depend on
//! the registry without pulling in the `image` crate. The pixel conversion
//! itself lives in [`crate::pixel`].

use quadfield_core::{ColorMap, EngineError, Field, ImageBuffer};
use std::path::Path;

use crate::pixel::{field_to_rgba, image_to_rgba};

/// Writes a field as a PNG image, mapping values through `palette`.
///
/// Returns `EngineError::InvalidDimensions` if the field dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png<M: ColorMap + ?Sized>(
    field: &Field,
    palette: &M,
    path: &Path,
) -> Result<(), EngineError> {
    save_rgba(field.width(), field.height(), field_to_rgba(field, palette), path)
}

/// Writes an already colored image as a PNG.
pub fn write_image_png(image: &ImageBuffer, path: &Path) -> Result<(), EngineError> {
    save_rgba(image.width(), image.height(), image_to_rgba(image), path)
}

fn save_rgba(width: usize, height: usize, rgba: Vec<u8>, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(width).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(height).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadfield_core::{Palette, Srgb};

    #[test]
    fn write_png_round_trip() {
        let mut field = Field::new(16, 16).unwrap();
        field.set(3, 4, 0.7);
        let palette = Palette::from_name("ocean").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.png");

        write_png(&field, &palette, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 16);
        let [r, g, b] = palette.color(0.7).to_rgb8();
        assert_eq!(img.get_pixel(3, 4).0, [r, g, b, 255]);
    }

    #[test]
    fn write_image_png_keeps_colors() {
        let mut image = ImageBuffer::new(4, 3).unwrap();
        image.set(2, 1, Srgb::new(0.0, 1.0, 0.0));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");

        write_image_png(&image, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!((img.width(), img.height()), (4, 3));
        assert_eq!(img.get_pixel(2, 1).0, [0, 255, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let image = ImageBuffer::new(2, 2).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        assert!(matches!(write_image_png(&image, &path), Err(EngineError::Io(_))));
    }
}
