//! Reproducible description of a rendered animation frame.
//!
//! A [`Seed`] captures everything needed to recreate a frame: engine name,
//! raster dimensions, parameters, PRNG seed, and the number of ticks run
//! before the snapshot.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Two identical `Seed` values fed to the same binary produce bit-identical
/// output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub engine: String,
    pub width: usize,
    pub height: usize,
    pub params: serde_json::Value,
    pub seed: u64,
    pub steps: usize,
}

impl Seed {
    /// Creates a Seed with empty params (`{}`) and zero steps.
    pub fn new(engine: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            engine: engine.to_string(),
            width,
            height,
            params: serde_json::Value::Object(serde_json::Map::new()),
            seed,
            steps: 0,
        }
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Validates non-zero dimensions, no `width * height` overflow, and an
    /// object-valued `params`.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(EngineError::InvalidDimensions)?;
        if !self.params.is_object() {
            return Err(EngineError::InvalidParam {
                name: "params".into(),
                reason: "expected a JSON object".into(),
            });
        }
        Ok(())
    }
}
