//! Full-frame rasterization of an emitter ensemble.
//!
//! A frame runs in two phases. The column pass fills every emitter's
//! x-only cache across the grid width. The row pass then computes one
//! y-only partial per emitter per row, and per pixel combines the emitters'
//! values with a single cross-term multiply each. The column pass finishes
//! before any row is evaluated since every row reads the whole column cache.

use crate::emitter::{Emitter, ShapeTransform};
use crate::numeric::Scalar;
use quadfield_core::{ColorMap, EngineError, Field, GridBounds, ImageBuffer};

/// How per-emitter values combine into one pixel value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CombinationMode {
    /// Product of all values. Any emitter crossing zero cuts a sharp edge.
    #[default]
    Multiplicative,
    /// Sum of all values.
    Additive,
}

impl CombinationMode {
    pub const CHOICES: &'static [(&'static str, CombinationMode)] = &[
        ("multiplicative", CombinationMode::Multiplicative),
        ("additive", CombinationMode::Additive),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CombinationMode::Multiplicative => "multiplicative",
            CombinationMode::Additive => "additive",
        }
    }

    #[inline]
    fn combine(self, values: impl Iterator<Item = f64>) -> f64 {
        match self {
            CombinationMode::Multiplicative => values.product(),
            CombinationMode::Additive => values.sum(),
        }
    }
}

/// Rasterizer for a slice of emitters under numeric policy `S`.
///
/// Holds the per-frame scratch (column coordinates and one row of output)
/// so steady-state rendering does not allocate.
#[derive(Debug, Clone, Default)]
pub struct FieldEvaluator<S: Scalar = f64> {
    combination: CombinationMode,
    transform: ShapeTransform,
    columns: Vec<S>,
    row: Vec<f64>,
}

impl<S: Scalar> FieldEvaluator<S> {
    pub fn new(combination: CombinationMode, transform: ShapeTransform) -> Self {
        Self {
            combination,
            transform,
            columns: Vec::new(),
            row: Vec::new(),
        }
    }

    pub fn combination(&self) -> CombinationMode {
        self.combination
    }

    pub fn transform(&self) -> ShapeTransform {
        self.transform
    }

    /// Renders the grid into `image`, mapping each value through `palette`.
    ///
    /// `image` must be exactly `bounds.width x bounds.height`.
    pub fn render_frame<M: ColorMap + ?Sized>(
        &mut self,
        emitters: &mut [Emitter<S>],
        bounds: &GridBounds,
        palette: &M,
        image: &mut ImageBuffer,
    ) -> Result<(), EngineError> {
        check_target(bounds, image.width(), image.height())?;
        self.rasterize(emitters, bounds, |i, values| {
            for (pixel, &v) in image.row_mut(i).iter_mut().zip(values) {
                *pixel = palette.color(v);
            }
        });
        Ok(())
    }

    /// Renders the normalized value of every pixel into `field`.
    ///
    /// `field` must be exactly `bounds.width x bounds.height`.
    pub fn render_values(
        &mut self,
        emitters: &mut [Emitter<S>],
        bounds: &GridBounds,
        field: &mut Field,
    ) -> Result<(), EngineError> {
        check_target(bounds, field.width(), field.height())?;
        self.rasterize(emitters, bounds, |i, values| {
            field.row_mut(i).copy_from_slice(values);
        });
        Ok(())
    }

    /// Runs both passes, handing each finished row of values in [0, 1] to `sink`.
    fn rasterize(
        &mut self,
        emitters: &mut [Emitter<S>],
        bounds: &GridBounds,
        mut sink: impl FnMut(usize, &[f64]),
    ) {
        let _span = tracing::debug_span!(
            "render_frame",
            width = bounds.width,
            height = bounds.height,
            emitters = emitters.len()
        )
        .entered();

        self.columns.clear();
        for emitter in emitters.iter_mut() {
            emitter.resize_columns(bounds.width);
        }
        for j in 0..bounds.width {
            let x = S::from_f64(bounds.x_at(j));
            let xx = x * x;
            for emitter in emitters.iter_mut() {
                emitter.update_column_cache(j, x, xx);
            }
            self.columns.push(x);
        }

        self.row.resize(bounds.width, 0.0);
        for i in 0..bounds.height {
            let y = S::from_f64(bounds.y_at(i));
            let yy = y * y;
            for emitter in emitters.iter_mut() {
                emitter.update_row_partial(y, yy);
            }
            for (j, &x) in self.columns.iter().enumerate() {
                let xy = x * y;
                let v = self
                    .combination
                    .combine(emitters.iter().map(|e| e.evaluate(j, xy, self.transform)));
                self.row[j] = v.clamp(0.0, 1.0);
            }
            sink(i, &self.row);
        }
    }
}

fn check_target(bounds: &GridBounds, width: usize, height: usize) -> Result<(), EngineError> {
    if bounds.width != width || bounds.height != height {
        return Err(EngineError::DimensionMismatch {
            lhs_w: bounds.width,
            lhs_h: bounds.height,
            rhs_w: width,
            rhs_h: height,
        });
    }
    Ok(())
}
