//! Numeric policies for the per-pixel cache arithmetic.
//!
//! The evaluator's hot loop only adds and multiplies cached terms, so it is
//! generic over [`Scalar`]. Coefficients are always derived in `f64` and
//! converted once per tick; the policy decides the precision of everything
//! evaluated per column, per row and per pixel.

use std::fmt::Debug;
use std::ops::{Add, Mul};

/// Arithmetic type used for cached polynomial terms.
pub trait Scalar:
    Copy
    + Debug
    + Default
    + PartialEq
    + Add<Output = Self>
    + Mul<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Short name reported in engine params.
    const NAME: &'static str;

    fn from_f64(v: f64) -> Self;

    fn to_f64(self) -> f64;
}

impl Scalar for f64 {
    const NAME: &'static str = "f64";

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

impl Scalar for f32 {
    const NAME: &'static str = "f32";

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// Signed Q8.8 fixed point: an `i16` holding `value * 256`.
///
/// Range is roughly [-128, 128) with a resolution of 1/256. Conversion from
/// `f64` truncates toward zero and saturates at the range limits. Addition
/// wraps and multiplication widens to `i32` before rescaling, so results are
/// bit-identical on every platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed16(i16);

impl Fixed16 {
    pub const FRAC_BITS: u32 = 8;
    pub const ONE: Fixed16 = Fixed16(1 << Self::FRAC_BITS);

    pub const fn from_raw(raw: i16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i16 {
        self.0
    }
}

impl Add for Fixed16 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl Mul for Fixed16 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let wide = self.0 as i32 * rhs.0 as i32;
        Self((wide / (1 << Self::FRAC_BITS)) as i16)
    }
}

impl Scalar for Fixed16 {
    const NAME: &'static str = "fixed16";

    #[inline]
    fn from_f64(v: f64) -> Self {
        Self((v * (1 << Self::FRAC_BITS) as f64) as i16)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self.0 as f64 / (1 << Self::FRAC_BITS) as f64
    }
}
