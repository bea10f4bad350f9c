//! Error types for the quadfield core.

use thiserror::Error;

/// Errors produced by engine construction, configuration and output.
///
/// The per-pixel evaluation path never returns these; they only surface at
/// the boundaries (building an ensemble, sizing a render target, parsing
/// parameters, writing a snapshot).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero (or their product overflowed).
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A render target did not match the grid it was asked to hold.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// No engine is registered under this name.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// A parameter was present but its value is not accepted.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A palette could not be constructed from the given colors or size.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// A coupling group referenced an emitter that does not exist.
    #[error("invalid coupling group: {0}")]
    InvalidGroup(String),

    /// An ensemble was requested with no emitters.
    #[error("ensemble must contain at least one emitter")]
    EmptyEnsemble,

    /// Writing output failed.
    #[error("i/o error: {0}")]
    Io(String),
}
