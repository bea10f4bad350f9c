#![deny(unsafe_code)]
//! Engine registry: maps engine names to implementations and provides CPU-side
//! snapshot rendering.
//!
//! The three registered engines share one implementation,
//! [`quadfield_orbit::Orbits`], instantiated under different numeric
//! policies for the per-pixel arithmetic.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use quadfield_core::{ColorMap, Engine, EngineError, Field, ImageBuffer};
use quadfield_orbit::{Fixed16, Orbits};
use serde_json::Value;

/// All available engine names.
const ENGINE_NAMES: &[&str] = &["orbits", "orbits-f32", "orbits-fixed"];

/// Every registered engine, dispatched by name.
///
/// Use [`EngineKind::from_name`] for string-based construction (CLI, seeds).
pub enum EngineKind {
    /// Double precision cache arithmetic.
    Orbits(Orbits<f64>),
    /// Single precision cache arithmetic.
    OrbitsF32(Orbits<f32>),
    /// Q8.8 fixed-point cache arithmetic.
    OrbitsFixed(Orbits<Fixed16>),
}

impl EngineKind {
    /// Constructs an engine by name.
    ///
    /// Returns `EngineError::UnknownEngine` if the name is not recognized.
    pub fn from_name(
        name: &str,
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<Self, EngineError> {
        match name {
            "orbits" => Ok(EngineKind::Orbits(Orbits::from_json(
                width, height, seed, params,
            )?)),
            "orbits-f32" => Ok(EngineKind::OrbitsF32(Orbits::from_json(
                width, height, seed, params,
            )?)),
            "orbits-fixed" => Ok(EngineKind::OrbitsFixed(Orbits::from_json(
                width, height, seed, params,
            )?)),
            _ => Err(EngineError::UnknownEngine(name.to_string())),
        }
    }

    /// Returns a slice of all recognized engine names.
    pub fn list_engines() -> &'static [&'static str] {
        ENGINE_NAMES
    }

    /// Renders the current state into `image` through `palette`.
    pub fn render_image<M: ColorMap + ?Sized>(
        &mut self,
        palette: &M,
        image: &mut ImageBuffer,
    ) -> Result<(), EngineError> {
        match self {
            EngineKind::Orbits(e) => e.render_image(palette, image),
            EngineKind::OrbitsF32(e) => e.render_image(palette, image),
            EngineKind::OrbitsFixed(e) => e.render_image(palette, image),
        }
    }
}

impl Engine for EngineKind {
    fn step(&mut self) -> Result<(), EngineError> {
        match self {
            EngineKind::Orbits(e) => e.step(),
            EngineKind::OrbitsF32(e) => e.step(),
            EngineKind::OrbitsFixed(e) => e.step(),
        }
    }

    fn field(&self) -> &Field {
        match self {
            EngineKind::Orbits(e) => e.field(),
            EngineKind::OrbitsF32(e) => e.field(),
            EngineKind::OrbitsFixed(e) => e.field(),
        }
    }

    fn randomize(&mut self) {
        match self {
            EngineKind::Orbits(e) => e.randomize(),
            EngineKind::OrbitsF32(e) => e.randomize(),
            EngineKind::OrbitsFixed(e) => e.randomize(),
        }
    }

    fn set_paused(&mut self, paused: bool) {
        match self {
            EngineKind::Orbits(e) => e.set_paused(paused),
            EngineKind::OrbitsF32(e) => e.set_paused(paused),
            EngineKind::OrbitsFixed(e) => e.set_paused(paused),
        }
    }

    fn params(&self) -> Value {
        match self {
            EngineKind::Orbits(e) => e.params(),
            EngineKind::OrbitsF32(e) => e.params(),
            EngineKind::OrbitsFixed(e) => e.params(),
        }
    }

    fn param_schema(&self) -> Value {
        match self {
            EngineKind::Orbits(e) => e.param_schema(),
            EngineKind::OrbitsF32(e) => e.param_schema(),
            EngineKind::OrbitsFixed(e) => e.param_schema(),
        }
    }
}
