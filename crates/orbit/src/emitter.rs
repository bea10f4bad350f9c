//! Quadratic field emitters.
//!
//! An [`Emitter`] contributes the shifted quadratic form
//!
//! ```text
//! f(X, Y) = (bXX (X - x)^2 + bYY (Y - y)^2 + bXY (X - x)(Y - y)) / size^2 + offset
//! ```
//!
//! to every pixel. Expanding it in the absolute grid coordinates gives
//!
//! ```text
//! f = polyX X + polyXX X^2  +  polyY Y + polyYY Y^2 + polyC  +  polyXY XY
//!     \___ column cache ___/   \_______ row partial _______/   \ cross /
//! ```
//!
//! so a frame needs one column pass, one scalar per row, and a single
//! multiply-add per pixel.

use crate::numeric::Scalar;
use glam::DVec2;
use quadfield_core::Xorshift64;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Bound applied to every emitter evaluation.
pub const EVAL_LIMIT: f64 = 1.05;
/// Largest velocity change a single coupling call may apply per axis.
pub const MAX_ACCEL: f64 = 0.001;
/// Numerator scale of the coupling impulse.
pub const UPDATE_RATE: f64 = 0.001;
/// Cap on the squared axis delta in the coupling denominator.
pub const DELTA_SQUASH_CAP: f64 = 5.0;
/// Limit on the angular velocity of the shape orientation.
pub const MAX_ANGULAR_RATE: f64 = 0.05;
/// Smallest size `reset` can draw. Sizes at or below zero are invalid.
pub const MIN_SIZE: f64 = 0.5;

const POSITION_SPAN: f64 = 0.5;
const VELOCITY_SPAN: f64 = 0.05;
const SHAPE_SPAN: f64 = 1.0;
const SIZE_RANGE: f64 = 0.2;
const RESET_OFFSET: f64 = -1.0;
const ANGLE_JITTER_SPAN: f64 = 0.05;

/// Arena index of an emitter inside its ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmitterId(pub usize);

impl EmitterId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Optional transform applied to an emitter's raw value before clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShapeTransform {
    #[default]
    None,
    /// Sign-preserving square root: `sign(v) * sqrt(|v|)`.
    SquareRoot,
}

impl ShapeTransform {
    pub const CHOICES: &'static [(&'static str, ShapeTransform)] =
        &[("none", ShapeTransform::None), ("sqrt", ShapeTransform::SquareRoot)];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeTransform::None => "none",
            ShapeTransform::SquareRoot => "sqrt",
        }
    }

    #[inline]
    pub fn apply(self, v: f64) -> f64 {
        match self {
            ShapeTransform::None => v,
            ShapeTransform::SquareRoot => v.signum() * v.abs().sqrt(),
        }
    }
}

/// The independent parameters of an emitter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmitterParams {
    pub position: DVec2,
    pub velocity: DVec2,
    pub b_xx: f64,
    pub b_yy: f64,
    pub b_xy: f64,
    pub angle: f64,
    pub d_angle: f64,
    pub offset: f64,
    pub size: f64,
}

impl Default for EmitterParams {
    /// A unit circle at the origin: `X^2 + Y^2 - 1`.
    fn default() -> Self {
        Self {
            position: DVec2::ZERO,
            velocity: DVec2::ZERO,
            b_xx: 1.0,
            b_yy: 1.0,
            b_xy: 0.0,
            angle: std::f64::consts::FRAC_PI_2,
            d_angle: 0.0,
            offset: -1.0,
            size: 1.0,
        }
    }
}

/// Monomial coefficients of the expanded quadratic form.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coefficients {
    pub x: f64,
    pub y: f64,
    pub xx: f64,
    pub yy: f64,
    pub xy: f64,
    pub c: f64,
}

impl Coefficients {
    /// Expands `params` into absolute-coordinate monomials.
    pub fn from_params(p: &EmitterParams) -> Self {
        let (x, y) = (p.position.x, p.position.y);
        let inv_size2 = 1.0 / (p.size * p.size);
        Self {
            x: (-2.0 * p.b_xx * x - p.b_xy * y) * inv_size2,
            y: (-2.0 * p.b_yy * y - p.b_xy * x) * inv_size2,
            xx: p.b_xx * inv_size2,
            yy: p.b_yy * inv_size2,
            xy: p.b_xy * inv_size2,
            c: (x * x * p.b_xx + y * y * p.b_yy + x * y * p.b_xy) * inv_size2 + p.offset,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Poly<S> {
    x: S,
    y: S,
    xx: S,
    yy: S,
    xy: S,
    c: S,
}

impl<S: Scalar> From<Coefficients> for Poly<S> {
    fn from(k: Coefficients) -> Self {
        Self {
            x: S::from_f64(k.x),
            y: S::from_f64(k.y),
            xx: S::from_f64(k.xx),
            yy: S::from_f64(k.yy),
            xy: S::from_f64(k.xy),
            c: S::from_f64(k.c),
        }
    }
}

/// One quadratic contributor with its separable evaluation cache.
///
/// Every mutator recomputes the coefficients before returning, so the cached
/// polynomial is never stale with respect to the parameters. The column and
/// row caches are scratch space owned by the evaluator's current pass.
#[derive(Debug, Clone)]
pub struct Emitter<S: Scalar = f64> {
    id: EmitterId,
    params: EmitterParams,
    coefficients: Coefficients,
    poly: Poly<S>,
    column_cache: Vec<S>,
    row_partial: S,
}

impl<S: Scalar> Emitter<S> {
    /// Creates an emitter with parameters drawn from `rng`.
    pub fn new(id: EmitterId, rng: &mut Xorshift64) -> Self {
        let mut emitter = Self::with_params(id, EmitterParams::default());
        emitter.reset(rng);
        emitter
    }

    /// Creates an emitter with explicit parameters.
    pub fn with_params(id: EmitterId, params: EmitterParams) -> Self {
        let mut emitter = Self {
            id,
            params,
            coefficients: Coefficients::default(),
            poly: Poly::default(),
            column_cache: Vec::new(),
            row_partial: S::default(),
        };
        emitter.recompute_coefficients();
        emitter
    }

    pub fn id(&self) -> EmitterId {
        self.id
    }

    pub fn params(&self) -> &EmitterParams {
        &self.params
    }

    pub fn position(&self) -> DVec2 {
        self.params.position
    }

    pub fn velocity(&self) -> DVec2 {
        self.params.velocity
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    /// Replaces all parameters and recomputes the coefficients.
    pub fn set_params(&mut self, params: EmitterParams) {
        self.params = params;
        self.recompute_coefficients();
    }

    /// Draws fresh parameters: position within ±0.25, velocity within
    /// ±0.025, `bXX`/`bYY` in [0.5, 1.5), a random orientation with no spin,
    /// offset -1, and size in [0.5, 0.7).
    pub fn reset(&mut self, rng: &mut Xorshift64) {
        let p = &mut self.params;
        p.position = DVec2::new(rng.next_centered(POSITION_SPAN), rng.next_centered(POSITION_SPAN));
        p.velocity = DVec2::new(rng.next_centered(VELOCITY_SPAN), rng.next_centered(VELOCITY_SPAN));
        p.b_xx = rng.next_centered(SHAPE_SPAN) + 1.0;
        p.b_yy = rng.next_centered(SHAPE_SPAN) + 1.0;
        p.angle = rng.next_range(0.0, TAU);
        p.d_angle = 0.0;
        p.b_xy = p.angle.cos();
        p.offset = RESET_OFFSET;
        p.size = MIN_SIZE + rng.next_range(0.0, SIZE_RANGE);
        self.recompute_coefficients();

        let p = &self.params;
        tracing::debug!(
            id = self.id.0,
            x = p.position.x,
            y = p.position.y,
            dx = p.velocity.x,
            dy = p.velocity.y,
            b_xx = p.b_xx,
            b_yy = p.b_yy,
            b_xy = p.b_xy,
            size = p.size,
            offset = p.offset,
            "emitter reset"
        );
    }

    /// Re-derives the polynomial coefficients from the current parameters.
    pub fn recompute_coefficients(&mut self) {
        debug_assert!(self.params.size > 0.0, "emitter size must stay positive");
        self.coefficients = Coefficients::from_params(&self.params);
        self.poly = self.coefficients.into();
    }

    /// Sizes the column cache for a grid `width` columns wide.
    pub fn resize_columns(&mut self, width: usize) {
        self.column_cache.resize(width, S::default());
    }

    /// Caches the x-only terms for column `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is beyond the width given to [`resize_columns`](Self::resize_columns).
    #[inline]
    pub fn update_column_cache(&mut self, index: usize, x: S, xx: S) {
        self.column_cache[index] = x * self.poly.x + xx * self.poly.xx;
    }

    /// Caches the y-only terms (and the constant) for the current row.
    #[inline]
    pub fn update_row_partial(&mut self, y: S, yy: S) {
        self.row_partial = y * self.poly.y + yy * self.poly.yy + self.poly.c;
    }

    /// Value at column `index` of the current row, where `xy` is `X * Y`.
    ///
    /// Result lies in [-[`EVAL_LIMIT`], [`EVAL_LIMIT`]].
    #[inline]
    pub fn evaluate(&self, index: usize, xy: S, transform: ShapeTransform) -> f64 {
        let raw = self.column_cache[index] + self.row_partial + xy * self.poly.xy;
        transform.apply(raw.to_f64()).clamp(-EVAL_LIMIT, EVAL_LIMIT)
    }

    /// Uncached closed form at world `(x, y)`, unclamped.
    pub fn direct(&self, x: f64, y: f64) -> f64 {
        let p = &self.params;
        let d = DVec2::new(x, y) - p.position;
        (p.b_xx * d.x * d.x + p.b_yy * d.y * d.y + p.b_xy * d.x * d.y) / (p.size * p.size)
            + p.offset
    }

    /// Nudges the velocity toward `target`, scaled by `weight`.
    ///
    /// Per axis the change is `clip(weight * UPDATE_RATE / squashed, ±MAX_ACCEL)`
    /// where `squashed = sign(delta) * min(DELTA_SQUASH_CAP, delta^2)`.
    pub fn apply_coupling(&mut self, target: DVec2, weight: f64) {
        let delta = target - self.params.position;
        self.params.velocity += DVec2::new(
            coupling_impulse(delta.x, weight),
            coupling_impulse(delta.y, weight),
        );
    }

    /// Integrates one tick: moves by the velocity, random-walks the
    /// orientation, and recomputes the coefficients.
    pub fn advance(&mut self, rng: &mut Xorshift64) {
        let p = &mut self.params;
        p.position += p.velocity;
        p.d_angle = (p.d_angle + rng.next_centered(ANGLE_JITTER_SPAN))
            .clamp(-MAX_ANGULAR_RATE, MAX_ANGULAR_RATE);
        p.angle += p.d_angle;
        p.b_xy = p.angle.cos();
        self.recompute_coefficients();
    }
}

/// One axis of the coupling rule. `0 / 0` contributes nothing.
fn coupling_impulse(delta: f64, weight: f64) -> f64 {
    let sign = if delta > 0.0 { 1.0 } else { -1.0 };
    let squashed = (delta * delta).min(DELTA_SQUASH_CAP) * sign;
    let impulse = weight * UPDATE_RATE / squashed;
    if impulse.is_nan() {
        0.0
    } else {
        impulse.clamp(-MAX_ACCEL, MAX_ACCEL)
    }
}
