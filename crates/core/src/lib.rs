#![deny(unsafe_code)]
//! Core types and traits for quadfield.
//!
//! Provides the `Engine` trait, the scalar `Field` raster, the `ImageBuffer`
//! render target, color types (`Srgb`, `OkLch`), palette mappers (`Palette`,
//! `PaletteLut`, `PaletteCycle` behind the `ColorMap` trait), the `Viewport`
//! coordinate mapper, the `Xorshift64` PRNG, `Seed`, and parameter helpers.

pub mod color;
pub mod engine;
pub mod error;
pub mod field;
pub mod image;
pub mod palette;
pub mod params;
pub mod prng;
pub mod seed;
pub mod viewport;

pub use color::{OkLch, Srgb};
pub use engine::Engine;
pub use error::EngineError;
pub use field::Field;
pub use image::ImageBuffer;
pub use palette::{ColorMap, Palette, PaletteCycle, PaletteLut};
pub use prng::Xorshift64;
pub use seed::Seed;
pub use viewport::{GridBounds, Viewport};
