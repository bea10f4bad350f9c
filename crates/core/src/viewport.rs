//! Pixel-to-world coordinate mapping.
//!
//! A [`Viewport`] is a world-space window (center and extent). The evaluator
//! never maps individual pixels; it consumes the affine [`GridBounds`] the
//! viewport produces for a given raster size.

use crate::error::EngineError;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Default world-space extent on both axes.
pub const DEFAULT_SCALE: f64 = 5.0;
/// Scale multiplier applied by [`Viewport::zoom_at`].
pub const ZOOM_FACTOR: f64 = 0.8;

/// World-space sampling grid: pixel `(j, i)` sits at
/// `(x_begin + j * x_step, y_begin + i * y_step)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridBounds {
    pub x_begin: f64,
    pub x_step: f64,
    pub width: usize,
    pub y_begin: f64,
    pub y_step: f64,
    pub height: usize,
}

impl GridBounds {
    /// World x of column `j`.
    pub fn x_at(&self, j: usize) -> f64 {
        self.x_begin + j as f64 * self.x_step
    }

    /// World y of row `i`.
    pub fn y_at(&self, i: usize) -> f64 {
        self.y_begin + i as f64 * self.y_step
    }
}

/// World-space window centered on `center` spanning `scale` units per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: DVec2,
    pub scale: DVec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: DVec2::ZERO,
            scale: DVec2::splat(DEFAULT_SCALE),
        }
    }
}

impl Viewport {
    pub fn new(center: DVec2, scale: DVec2) -> Self {
        Self { center, scale }
    }

    /// Restores the default window (origin, 5 x 5).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// World coordinate of pixel `(px, py)` on a `width x height` raster.
    pub fn image_to_world(&self, px: f64, py: f64, width: usize, height: usize) -> DVec2 {
        let frac = DVec2::new(px / width as f64, py / height as f64);
        (frac - 0.5) * self.scale + self.center
    }

    /// Sampling grid for a `width x height` raster.
    pub fn grid(&self, width: usize, height: usize) -> Result<GridBounds, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let begin = self.center - 0.5 * self.scale;
        Ok(GridBounds {
            x_begin: begin.x,
            x_step: self.scale.x / width as f64,
            width,
            y_begin: begin.y,
            y_step: self.scale.y / height as f64,
            height,
        })
    }

    /// Recenters on pixel `(px, py)` (clamped to the raster) and zooms in by
    /// [`ZOOM_FACTOR`].
    pub fn zoom_at(&mut self, px: f64, py: f64, width: usize, height: usize) {
        let max_x = width.saturating_sub(1) as f64;
        let max_y = height.saturating_sub(1) as f64;
        let px = px.clamp(0.0, max_x);
        let py = py.clamp(0.0, max_y);
        self.center = self.image_to_world(px, py, width, height);
        self.scale *= ZOOM_FACTOR;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_viewport_spans_minus_2_5_to_2_5() {
        let g = Viewport::default().grid(100, 50).unwrap();
        assert!((g.x_begin + 2.5).abs() < 1e-12);
        assert!((g.y_begin + 2.5).abs() < 1e-12);
        assert!((g.x_step - 0.05).abs() < 1e-12);
        assert!((g.y_step - 0.1).abs() < 1e-12);
        assert!((g.x_at(100) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn grid_agrees_with_image_to_world() {
        let v = Viewport::new(DVec2::new(1.0, -0.5), DVec2::new(3.0, 2.0));
        let g = v.grid(64, 32).unwrap();
        for (j, i) in [(0, 0), (10, 5), (63, 31)] {
            let w = v.image_to_world(j as f64, i as f64, 64, 32);
            assert!((w.x - g.x_at(j)).abs() < 1e-12);
            assert!((w.y - g.y_at(i)).abs() < 1e-12);
        }
    }

    #[test]
    fn grid_rejects_zero_dimensions() {
        assert!(Viewport::default().grid(0, 10).is_err());
    }

    #[test]
    fn zoom_at_recenters_and_shrinks() {
        let mut v = Viewport::default();
        v.zoom_at(75.0, 25.0, 100, 100);
        assert!((v.center.x - 1.25).abs() < 1e-12);
        assert!((v.center.y + 1.25).abs() < 1e-12);
        assert!((v.scale.x - 4.0).abs() < 1e-12);
    }

    #[test]
    fn zoom_at_clamps_pixel_to_raster() {
        let mut v = Viewport::default();
        v.zoom_at(-50.0, 1e9, 10, 10);
        assert!((v.center.x + 2.5).abs() < 1e-12);
        assert!((v.center.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn reset_restores_default() {
        let mut v = Viewport::default();
        v.zoom_at(1.0, 1.0, 4, 4);
        v.reset();
        assert_eq!(v, Viewport::default());
    }
}
