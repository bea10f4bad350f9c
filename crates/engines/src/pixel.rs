//! Pixel buffer conversion to tightly packed RGBA8.
//!
//! Always available (no feature gate) so that callers without the `png`
//! feature can still hand frames to their own presentation layer.

use quadfield_core::{ColorMap, Field, ImageBuffer, Srgb};

/// Maps field values through a color map to an RGBA8 buffer of
/// `width * height * 4` bytes, alpha always 255.
pub fn field_to_rgba<M: ColorMap + ?Sized>(field: &Field, palette: &M) -> Vec<u8> {
    field
        .data()
        .iter()
        .flat_map(|&t| rgba(palette.color(t)))
        .collect()
}

/// Packs an already colored image as RGBA8.
pub fn image_to_rgba(image: &ImageBuffer) -> Vec<u8> {
    image.pixels().iter().flat_map(|&c| rgba(c)).collect()
}

fn rgba(c: Srgb) -> [u8; 4] {
    let [r, g, b] = c.to_rgb8();
    [r, g, b, 255]
}
