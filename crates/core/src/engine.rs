//! The `Engine` trait driven once per frame by an outer loop.
//!
//! The trait is object-safe so engines can be used as `dyn Engine` for runtime
//! switching between numeric policies or scenes.

use crate::error::EngineError;
use crate::field::Field;
use serde_json::Value;

/// A frame-stepped generator of a normalized scalar [`Field`].
///
/// A driving loop calls [`step`](Engine::step) once per frame and then reads
/// [`field`](Engine::field), mapping it to pixels through a palette. User
/// commands reach the engine through [`randomize`](Engine::randomize) and
/// [`set_paused`](Engine::set_paused).
pub trait Engine {
    /// Advance the simulation by one tick and refresh [`field`](Engine::field).
    fn step(&mut self) -> Result<(), EngineError>;

    /// The most recently rendered field, values in [0, 1].
    fn field(&self) -> &Field;

    /// Re-draw every random parameter of the simulation.
    fn randomize(&mut self);

    /// Freeze or resume the simulation. Rendering continues while paused.
    fn set_paused(&mut self, paused: bool);

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;
}
