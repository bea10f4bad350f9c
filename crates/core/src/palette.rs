//! Palette mappers: normalized scalar in [0, 1] to [`Srgb`].
//!
//! Two implementations of [`ColorMap`]:
//! - [`Palette`]: OKLCh color stops sampled by perceptual interpolation,
//!   clamped at both ends.
//! - [`PaletteLut`]: a fixed power-of-two lookup table indexed by
//!   `floor(t * SIZE) & (SIZE - 1)`. The mask makes the ramp repeat, so
//!   `t = 1.0` lands on entry 0 again.

use crate::color::{oklch_to_srgb, srgb_to_oklch, OkLch, Srgb};
use crate::error::EngineError;

/// Maps a normalized scalar to a color.
pub trait ColorMap {
    fn color(&self, t: f64) -> Srgb;
}

/// Default number of entries in a [`PaletteLut`].
pub const DEFAULT_LUT_SIZE: usize = 256;

const BUILTIN_NAMES: &[&str] = &["ocean", "neon", "earth", "monochrome", "vapor", "fire"];
const RAMP_NAMES: &[&str] = &["glow", "ember"];

/// A palette of colors stored in OKLCh, sampled by interpolation.
///
/// Colors are evenly spaced along `t`: `sample(0.0)` is the first stop,
/// `sample(1.0)` the last.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<OkLch>,
}

impl Palette {
    /// Creates a palette from OKLCh stops. Requires at least one color.
    pub fn new(colors: Vec<OkLch>) -> Result<Self, EngineError> {
        if colors.is_empty() {
            return Err(EngineError::InvalidPalette(
                "palette requires at least 1 color".to_string(),
            ));
        }
        Ok(Self { colors })
    }

    /// Creates a palette from `"#rrggbb"` strings.
    pub fn from_hex(hexes: &[&str]) -> Result<Self, EngineError> {
        let colors = hexes
            .iter()
            .map(|h| Srgb::from_hex(h).map(srgb_to_oklch))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    /// Looks up a built-in palette by name.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        let hexes: &[&str] = match name {
            "ocean" => &["#001f3f", "#003366", "#005f73", "#0a9396", "#94d2bd"],
            "neon" => &["#ff00ff", "#00ff41", "#ffff00", "#ff0080", "#00ffff"],
            "earth" => &["#5c4033", "#8b6914", "#6b8e23", "#daa520", "#d2b48c"],
            "monochrome" => &["#000000", "#404040", "#808080", "#c0c0c0", "#ffffff"],
            "vapor" => &["#7b2d8e", "#c77dff", "#ff9ebb", "#80ced6", "#a0e7e5"],
            "fire" => &["#800000", "#cc0000", "#ff4500", "#ff8c00", "#ffd700"],
            other => {
                return Err(EngineError::InvalidPalette(format!(
                    "unknown palette '{other}'"
                )))
            }
        };
        Self::from_hex(hexes)
    }

    /// Names accepted by [`Palette::from_name`].
    pub fn list_names() -> &'static [&'static str] {
        BUILTIN_NAMES
    }

    /// Number of color stops.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false for a constructed palette.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Samples at `t`, clamped to [0, 1] (NaN reads as 0).
    ///
    /// Hue takes the shortest arc between neighbouring stops.
    pub fn sample(&self, t: f64) -> Srgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let n = self.colors.len();
        if n == 1 {
            return oklch_to_srgb(self.colors[0]);
        }

        let scaled = t * (n - 1) as f64;
        let idx = (scaled as usize).min(n - 2);
        let frac = scaled - idx as f64;
        let (c0, c1) = (self.colors[idx], self.colors[idx + 1]);

        oklch_to_srgb(OkLch {
            l: c0.l + frac * (c1.l - c0.l),
            c: c0.c + frac * (c1.c - c0.c),
            h: interpolate_hue(c0.h, c1.h, frac),
        })
    }
}

impl ColorMap for Palette {
    fn color(&self, t: f64) -> Srgb {
        self.sample(t)
    }
}

/// Interpolates hue using shortest-arc logic, handling wraparound at 360.
fn interpolate_hue(h0: f64, h1: f64, t: f64) -> f64 {
    let delta = match h1 - h0 {
        d if d > 180.0 => d - 360.0,
        d if d < -180.0 => d + 360.0,
        d => d,
    };
    (h0 + t * delta).rem_euclid(360.0)
}

/// A fixed-size, power-of-two color table.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteLut {
    entries: Vec<Srgb>,
    mask: usize,
}

impl PaletteLut {
    /// Builds a table by evaluating `ramp(i / size)` for every entry.
    ///
    /// `size` must be a non-zero power of two.
    pub fn from_fn(size: usize, ramp: impl Fn(f64) -> Srgb) -> Result<Self, EngineError> {
        if size == 0 || !size.is_power_of_two() {
            return Err(EngineError::InvalidPalette(format!(
                "lookup table size must be a power of two, got {size}"
            )));
        }
        let entries = (0..size).map(|i| ramp(i as f64 / size as f64)).collect();
        Ok(Self {
            entries,
            mask: size - 1,
        })
    }

    /// Bakes a [`Palette`] into a table.
    pub fn from_palette(palette: &Palette, size: usize) -> Result<Self, EngineError> {
        Self::from_fn(size, |t| palette.sample(t))
    }

    /// Looks up a built-in Gaussian ramp (`glow`, `ember`).
    ///
    /// Entry 0 is black, so zero and the wrap at `t = 1` render as background.
    pub fn from_name(name: &str, size: usize) -> Result<Self, EngineError> {
        let mut lut = match name {
            "glow" => Self::from_fn(size, |t| {
                Srgb::new(bump(t, 0.3, 20.0), bump(t, 0.6, 20.0), bump(t, 0.7, 20.0))
            }),
            "ember" => Self::from_fn(size, |t| {
                Srgb::new(bump(t, 0.8, 10.0), bump(t, 0.5, 10.0), bump(t, 0.4, 5.0))
            }),
            other => Err(EngineError::InvalidPalette(format!(
                "unknown ramp '{other}'"
            ))),
        }?;
        lut.entries[0] = Srgb::BLACK;
        Ok(lut)
    }

    /// Names accepted by [`PaletteLut::from_name`].
    pub fn list_names() -> &'static [&'static str] {
        RAMP_NAMES
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed table.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Table index for `t`: `floor(t * SIZE) & (SIZE - 1)`. NaN maps to 0.
    pub fn index_of(&self, t: f64) -> usize {
        if t.is_nan() {
            return 0;
        }
        // Saturating float-to-int cast keeps negative inputs at 0.
        ((t * self.entries.len() as f64) as usize) & self.mask
    }

    pub fn entry(&self, index: usize) -> Srgb {
        self.entries[index & self.mask]
    }
}

impl ColorMap for PaletteLut {
    fn color(&self, t: f64) -> Srgb {
        self.entries[self.index_of(t)]
    }
}

/// `exp(-(t - center)^2 * sharpness)`
fn bump(t: f64, center: f64, sharpness: f64) -> f64 {
    let d = t - center;
    (-d * d * sharpness).exp()
}

/// Cycles through a fixed list of lookup tables.
#[derive(Debug, Clone)]
pub struct PaletteCycle {
    tables: Vec<PaletteLut>,
    current: usize,
}

impl PaletteCycle {
    /// Requires at least one table.
    pub fn new(tables: Vec<PaletteLut>) -> Result<Self, EngineError> {
        if tables.is_empty() {
            return Err(EngineError::InvalidPalette(
                "palette cycle requires at least 1 table".to_string(),
            ));
        }
        Ok(Self { tables, current: 0 })
    }

    /// The built-in Gaussian ramps in [`PaletteLut::list_names`] order.
    pub fn ramps(size: usize) -> Result<Self, EngineError> {
        let tables = RAMP_NAMES
            .iter()
            .map(|name| PaletteLut::from_name(name, size))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(tables)
    }

    /// Advances to the next table, wrapping after the last.
    pub fn next_palette(&mut self) {
        self.current = (self.current + 1) % self.tables.len();
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &PaletteLut {
        &self.tables[self.current]
    }
}

impl ColorMap for PaletteCycle {
    fn color(&self, t: f64) -> Srgb {
        self.current().color(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-5;

    fn approx_eq(a: Srgb, b: Srgb) -> bool {
        (a.r - b.r).abs() < EPSILON && (a.g - b.g).abs() < EPSILON && (a.b - b.b).abs() < EPSILON
    }

    #[test]
    fn new_with_empty_vec_returns_error() {
        assert!(Palette::new(vec![]).is_err());
    }

    #[test]
    fn sample_endpoints_return_first_and_last_stops() {
        let p = Palette::from_hex(&["#000000", "#ffffff"]).unwrap();
        assert!(approx_eq(p.sample(0.0), Srgb::new(0.0, 0.0, 0.0)));
        assert!(approx_eq(p.sample(1.0), Srgb::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn sample_clamps_out_of_range_and_nan() {
        let p = Palette::from_name("fire").unwrap();
        assert_eq!(p.sample(-3.0), p.sample(0.0));
        assert_eq!(p.sample(7.0), p.sample(1.0));
        assert_eq!(p.sample(f64::NAN), p.sample(0.0));
    }

    #[test]
    fn hue_wraparound_takes_shortest_arc() {
        let h = interpolate_hue(350.0, 10.0, 0.5);
        assert!(h < 1e-9 || (h - 360.0).abs() < 1e-9, "hue = {h}");
        assert!((interpolate_hue(10.0, 350.0, 0.25) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn every_builtin_name_resolves() {
        for name in Palette::list_names() {
            let p = Palette::from_name(name).unwrap();
            assert!(p.len() >= 2, "{name} has {} stops", p.len());
        }
        assert!(Palette::from_name("plaid").is_err());
    }

    #[test]
    fn lut_rejects_non_power_of_two_sizes() {
        assert!(PaletteLut::from_name("glow", 0).is_err());
        assert!(PaletteLut::from_name("glow", 100).is_err());
        assert!(PaletteLut::from_name("glow", 128).is_ok());
    }

    #[test]
    fn lut_index_zero_for_zero_and_wraps_at_one() {
        let lut = PaletteLut::from_name("glow", DEFAULT_LUT_SIZE).unwrap();
        assert_eq!(lut.index_of(0.0), 0);
        assert_eq!(lut.index_of(1.0), 0);
        assert_eq!(lut.index_of(0.5), 128);
        assert_eq!(lut.index_of(0.999), 255);
        assert_eq!(lut.index_of(f64::NAN), 0);
    }

    #[test]
    fn ramp_background_entry_is_black() {
        for name in PaletteLut::list_names() {
            let lut = PaletteLut::from_name(name, DEFAULT_LUT_SIZE).unwrap();
            assert_eq!(lut.entry(0), Srgb::BLACK, "{name}");
            assert_eq!(lut.color(0.0), Srgb::BLACK, "{name}");
            assert_eq!(lut.color(1.0), Srgb::BLACK, "{name}");
            assert_ne!(lut.entry(1), Srgb::BLACK, "{name}");
        }
    }

    #[test]
    fn lut_color_matches_entry_at_index() {
        let lut = PaletteLut::from_name("ember", 64).unwrap();
        assert_eq!(lut.color(0.25), lut.entry(16));
    }

    #[test]
    fn glow_ramp_peaks_red_near_0_3() {
        let lut = PaletteLut::from_name("glow", DEFAULT_LUT_SIZE).unwrap();
        let peak = lut.entry(lut.index_of(0.3));
        assert!(peak.r > 0.99, "red at 0.3 = {}", peak.r);
        assert!(peak.b < peak.r);
    }

    #[test]
    fn lut_from_palette_samples_at_entry_positions() {
        let p = Palette::from_name("monochrome").unwrap();
        let lut = PaletteLut::from_palette(&p, 4).unwrap();
        assert_eq!(lut.len(), 4);
        assert!(approx_eq(lut.entry(2), p.sample(0.5)));
    }

    #[test]
    fn palette_cycle_wraps_around() {
        let mut cycle = PaletteCycle::ramps(32).unwrap();
        assert_eq!(cycle.current_index(), 0);
        cycle.next_palette();
        assert_eq!(cycle.current_index(), 1);
        cycle.next_palette();
        assert_eq!(cycle.current_index(), 0);
        assert!(PaletteCycle::new(vec![]).is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn lut_index_always_in_table(t in -10.0_f64..10.0, shift in 0_u32..10) {
                let size = 1usize << shift;
                let lut = PaletteLut::from_fn(size, |_| Srgb::BLACK).unwrap();
                prop_assert!(lut.index_of(t) < size);
            }

            #[test]
            fn sample_always_in_gamut(t in -2.0_f64..2.0) {
                let c = Palette::from_name("vapor").unwrap().sample(t);
                for ch in [c.r, c.g, c.b] {
                    prop_assert!((0.0..=1.0).contains(&ch));
                }
            }
        }
    }
}
