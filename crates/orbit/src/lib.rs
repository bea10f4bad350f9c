#![deny(unsafe_code)]
//! Quadratic emitter field engine.
//!
//! A handful of [`Emitter`]s each define a quadratic bowl over the plane.
//! The [`FieldEvaluator`] superposes them into a brightness value per pixel
//! using separable row/column caches, and the [`Ensemble`] moves them every
//! tick with a bounded coupling rule that keeps them loosely orbiting each
//! other and an attractor.
//!
//! [`Orbits`] wires these together behind the [`Engine`] trait, generic over
//! the numeric policy used by the per-pixel arithmetic.

pub mod emitter;
pub mod ensemble;
pub mod evaluator;
pub mod numeric;

pub use emitter::{Coefficients, Emitter, EmitterId, EmitterParams, ShapeTransform};
pub use ensemble::{CouplingGroup, Ensemble, GroupKind};
pub use evaluator::{CombinationMode, FieldEvaluator};
pub use numeric::{Fixed16, Scalar};

use glam::DVec2;
use quadfield_core::params::{param_choice, param_f64, param_usize};
use quadfield_core::viewport::DEFAULT_SCALE;
use quadfield_core::{ColorMap, Engine, EngineError, Field, ImageBuffer, Viewport};
use serde_json::{json, Value};

const DEFAULT_EMITTERS: usize = 3;
/// Every pixel evaluates every emitter, so the count stays small.
pub const MAX_EMITTERS: usize = 16;
const DEFAULT_ANCHOR: f64 = -1.0;

/// Coupling arrangement of a freshly built ensemble.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SceneKind {
    /// All emitters attract each other and the origin.
    #[default]
    Orbiting,
    /// Every emitter is pulled toward one fixed anchor.
    Anchored,
}

impl SceneKind {
    pub const CHOICES: &'static [(&'static str, SceneKind)] = &[
        ("orbiting", SceneKind::Orbiting),
        ("anchored", SceneKind::Anchored),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SceneKind::Orbiting => "orbiting",
            SceneKind::Anchored => "anchored",
        }
    }
}

/// Tunable settings of the [`Orbits`] engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitsConfig {
    /// Number of emitters, in `1..=MAX_EMITTERS`.
    pub emitters: usize,
    pub combination: CombinationMode,
    pub transform: ShapeTransform,
    pub scene: SceneKind,
    /// Attractor of the anchored scene.
    pub anchor: DVec2,
    pub viewport: Viewport,
}

impl Default for OrbitsConfig {
    fn default() -> Self {
        Self {
            emitters: DEFAULT_EMITTERS,
            combination: CombinationMode::default(),
            transform: ShapeTransform::default(),
            scene: SceneKind::default(),
            anchor: DVec2::splat(DEFAULT_ANCHOR),
            viewport: Viewport::default(),
        }
    }
}

impl OrbitsConfig {
    /// Reads the config from a JSON object.
    ///
    /// Numeric keys fall back to their defaults when missing. Unknown
    /// `combination`, `transform` or `scene` names, an `emitters` count
    /// outside `1..=MAX_EMITTERS` and a non-positive `scale` are rejected with
    /// `EngineError::InvalidParam`.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        let emitters = param_usize(params, "emitters", DEFAULT_EMITTERS);
        if !(1..=MAX_EMITTERS).contains(&emitters) {
            return Err(EngineError::InvalidParam {
                name: "emitters".to_owned(),
                reason: format!("expected 1 to {MAX_EMITTERS}, got {emitters}"),
            });
        }
        let scale = param_f64(params, "scale", DEFAULT_SCALE);
        if !(scale.is_finite() && scale > 0.0) {
            return Err(EngineError::InvalidParam {
                name: "scale".to_owned(),
                reason: format!("must be a positive number, got {scale}"),
            });
        }
        Ok(Self {
            emitters,
            combination: param_choice(
                params,
                "combination",
                CombinationMode::CHOICES,
                CombinationMode::default(),
            )?,
            transform: param_choice(
                params,
                "transform",
                ShapeTransform::CHOICES,
                ShapeTransform::default(),
            )?,
            scene: param_choice(params, "scene", SceneKind::CHOICES, SceneKind::default())?,
            anchor: DVec2::new(
                param_f64(params, "anchor_x", DEFAULT_ANCHOR),
                param_f64(params, "anchor_y", DEFAULT_ANCHOR),
            ),
            viewport: Viewport::new(
                DVec2::new(
                    param_f64(params, "center_x", 0.0),
                    param_f64(params, "center_y", 0.0),
                ),
                DVec2::splat(scale),
            ),
        })
    }
}

/// Emitter field engine: an [`Ensemble`] rendered through a [`FieldEvaluator`].
///
/// Each [`step`](Engine::step) advances the dynamics and then re-renders the
/// normalized field, matching a driving loop of step then draw.
#[derive(Debug, Clone)]
pub struct Orbits<S: Scalar = f64> {
    ensemble: Ensemble<S>,
    evaluator: FieldEvaluator<S>,
    viewport: Viewport,
    field: Field,
    config: OrbitsConfig,
}

impl<S: Scalar> Orbits<S> {
    /// Creates the engine and renders the initial field.
    ///
    /// Returns `EngineError::InvalidDimensions` if width or height is zero.
    pub fn new(
        width: usize,
        height: usize,
        seed: u64,
        config: OrbitsConfig,
    ) -> Result<Self, EngineError> {
        let field = Field::new(width, height)?;
        let ensemble = match config.scene {
            SceneKind::Orbiting => Ensemble::orbiting(config.emitters, seed)?,
            SceneKind::Anchored => Ensemble::anchored(config.emitters, config.anchor, seed)?,
        };
        tracing::debug!(
            width,
            height,
            seed,
            numeric = S::NAME,
            emitters = config.emitters,
            scene = config.scene.as_str(),
            "orbits engine created"
        );
        let mut engine = Self {
            ensemble,
            evaluator: FieldEvaluator::new(config.combination, config.transform),
            viewport: config.viewport,
            field,
            config,
        };
        engine.render()?;
        Ok(engine)
    }

    /// Creates the engine from a JSON params object.
    pub fn from_json(
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<Self, EngineError> {
        Self::new(width, height, seed, OrbitsConfig::from_json(params)?)
    }

    /// Re-renders the field from the current emitter state.
    pub fn render(&mut self) -> Result<(), EngineError> {
        let bounds = self.viewport.grid(self.field.width(), self.field.height())?;
        self.evaluator
            .render_values(self.ensemble.emitters_mut(), &bounds, &mut self.field)
    }

    /// Renders the current state straight into `image` through `palette`.
    ///
    /// The viewport is sampled at the image's own resolution, which need
    /// not match the field.
    pub fn render_image<M: ColorMap + ?Sized>(
        &mut self,
        palette: &M,
        image: &mut ImageBuffer,
    ) -> Result<(), EngineError> {
        let bounds = self.viewport.grid(image.width(), image.height())?;
        self.evaluator
            .render_frame(self.ensemble.emitters_mut(), &bounds, palette, image)
    }

    pub fn ensemble(&self) -> &Ensemble<S> {
        &self.ensemble
    }

    pub fn ensemble_mut(&mut self) -> &mut Ensemble<S> {
        &mut self.ensemble
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Mutable viewport for pan and zoom. Takes effect on the next render.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn config(&self) -> &OrbitsConfig {
        &self.config
    }
}

impl<S: Scalar> Engine for Orbits<S> {
    fn step(&mut self) -> Result<(), EngineError> {
        self.ensemble.step();
        self.render()
    }

    fn field(&self) -> &Field {
        &self.field
    }

    /// Re-draws every emitter and re-renders, so [`field`](Engine::field)
    /// shows the new state before the next step.
    fn randomize(&mut self) {
        self.ensemble.randomize_all();
        if let Err(err) = self.render() {
            tracing::warn!(%err, "render after randomize failed");
        }
    }

    fn set_paused(&mut self, paused: bool) {
        self.ensemble.set_paused(paused);
    }

    fn params(&self) -> Value {
        json!({
            "emitters": self.ensemble.len(),
            "combination": self.config.combination.as_str(),
            "transform": self.config.transform.as_str(),
            "scene": self.config.scene.as_str(),
            "anchor_x": self.config.anchor.x,
            "anchor_y": self.config.anchor.y,
            "center_x": self.viewport.center.x,
            "center_y": self.viewport.center.y,
            "scale": self.viewport.scale.x,
            "numeric": S::NAME,
            "paused": self.ensemble.is_paused(),
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "emitters": {
                "type": "integer",
                "default": DEFAULT_EMITTERS,
                "min": 1,
                "max": MAX_EMITTERS,
                "description": "Number of quadratic emitters"
            },
            "combination": {
                "type": "string",
                "default": CombinationMode::default().as_str(),
                "options": ["multiplicative", "additive"],
                "description": "How emitter values combine per pixel"
            },
            "transform": {
                "type": "string",
                "default": ShapeTransform::default().as_str(),
                "options": ["none", "sqrt"],
                "description": "Per-emitter shaping applied before clamping"
            },
            "scene": {
                "type": "string",
                "default": SceneKind::default().as_str(),
                "options": ["orbiting", "anchored"],
                "description": "Coupling arrangement of the emitters"
            },
            "anchor_x": {
                "type": "number",
                "default": DEFAULT_ANCHOR,
                "description": "Anchored scene attractor, x"
            },
            "anchor_y": {
                "type": "number",
                "default": DEFAULT_ANCHOR,
                "description": "Anchored scene attractor, y"
            },
            "center_x": {
                "type": "number",
                "default": 0.0,
                "description": "Viewport center, x"
            },
            "center_y": {
                "type": "number",
                "default": 0.0,
                "description": "Viewport center, y"
            },
            "scale": {
                "type": "number",
                "default": DEFAULT_SCALE,
                "min": 0.0,
                "description": "Viewport width and height in world units"
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadfield_core::PaletteLut;

    fn orbits(width: usize, height: usize, seed: u64) -> Orbits {
        Orbits::new(width, height, seed, OrbitsConfig::default()).unwrap()
    }

    // ---- Construction ----

    #[test]
    fn new_renders_initial_field() {
        let engine = orbits(32, 24, 42);
        assert_eq!(engine.field().width(), 32);
        assert_eq!(engine.field().height(), 24);
        assert_eq!(engine.ensemble().len(), DEFAULT_EMITTERS);
        assert!(engine.field().data().iter().any(|&v| v > 0.0));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            Orbits::<f64>::new(0, 10, 1, OrbitsConfig::default()),
            Err(EngineError::InvalidDimensions)
        ));
        assert!(Orbits::<f64>::new(10, 0, 1, OrbitsConfig::default()).is_err());
    }

    #[test]
    fn from_json_reads_every_key() {
        let params = json!({
            "emitters": 5,
            "combination": "additive",
            "transform": "sqrt",
            "scene": "anchored",
            "anchor_x": 0.5,
            "anchor_y": 0.25,
            "center_x": 1.0,
            "center_y": -1.0,
            "scale": 2.0,
        });
        let config = OrbitsConfig::from_json(&params).unwrap();
        assert_eq!(config.emitters, 5);
        assert_eq!(config.combination, CombinationMode::Additive);
        assert_eq!(config.transform, ShapeTransform::SquareRoot);
        assert_eq!(config.scene, SceneKind::Anchored);
        assert_eq!(config.anchor, DVec2::new(0.5, 0.25));
        assert_eq!(config.viewport.center, DVec2::new(1.0, -1.0));
        assert_eq!(config.viewport.scale, DVec2::splat(2.0));
    }

    #[test]
    fn from_json_defaults_on_empty_object() {
        assert_eq!(OrbitsConfig::from_json(&json!({})).unwrap(), OrbitsConfig::default());
    }

    #[test]
    fn from_json_rejects_bad_values() {
        for params in [
            json!({"emitters": 0}),
            json!({"emitters": MAX_EMITTERS + 1}),
            json!({"emitters": 1_000_000}),
            json!({"combination": "max"}),
            json!({"transform": "cube"}),
            json!({"scene": 3}),
            json!({"scale": -1.0}),
        ] {
            assert!(
                matches!(OrbitsConfig::from_json(&params), Err(EngineError::InvalidParam { .. })),
                "{params}"
            );
        }
    }

    #[test]
    fn anchored_scene_builds_one_anchored_group() {
        let config = OrbitsConfig {
            scene: SceneKind::Anchored,
            ..OrbitsConfig::default()
        };
        let engine = Orbits::<f64>::new(8, 8, 3, config).unwrap();
        let groups = engine.ensemble().groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind, GroupKind::Anchored);
        assert_eq!(groups[0].attractor, DVec2::splat(DEFAULT_ANCHOR));
    }

    // ---- Engine behavior ----

    #[test]
    fn step_changes_field() {
        let mut engine = orbits(32, 32, 42);
        let before = engine.field().clone();
        for _ in 0..10 {
            engine.step().unwrap();
        }
        assert_ne!(&before, engine.field());
    }

    #[test]
    fn paused_step_keeps_field() {
        let mut engine = orbits(32, 32, 42);
        engine.set_paused(true);
        let before = engine.field().clone();
        engine.step().unwrap();
        assert_eq!(&before, engine.field());
        assert_eq!(engine.params()["paused"], true);
    }

    #[test]
    fn same_seed_same_frames() {
        let mut a = orbits(24, 24, 9);
        let mut b = orbits(24, 24, 9);
        for _ in 0..20 {
            a.step().unwrap();
            b.step().unwrap();
        }
        assert_eq!(a.field(), b.field());
    }

    #[test]
    fn randomize_moves_emitters() {
        let mut engine = orbits(16, 16, 5);
        let positions = |e: &Orbits| -> Vec<DVec2> {
            e.ensemble().emitters().iter().map(Emitter::position).collect()
        };
        let before = positions(&engine);
        engine.randomize();
        let after = positions(&engine);
        assert_ne!(before, after);
    }

    #[test]
    fn randomize_refreshes_field_immediately() {
        let mut engine = orbits(24, 24, 5);
        let before = engine.field().clone();
        engine.randomize();
        let shown = engine.field().clone();
        assert_ne!(before, shown);
        engine.render().unwrap();
        assert_eq!(&shown, engine.field());
    }

    #[test]
    fn viewport_change_applies_on_next_render() {
        let mut engine = orbits(16, 16, 11);
        let before = engine.field().clone();
        engine.viewport_mut().zoom_at(2.0, 2.0, 16, 16);
        engine.render().unwrap();
        assert_ne!(&before, engine.field());
    }

    #[test]
    fn render_image_matches_field_through_lut() {
        let mut engine = orbits(20, 10, 42);
        let lut = PaletteLut::from_name("glow", 256).unwrap();
        let mut image = ImageBuffer::new(20, 10).unwrap();
        engine.render_image(&lut, &mut image).unwrap();
        for (x, y, v) in engine.field().iter() {
            assert_eq!(image.get(x, y), Some(lut.color(v)));
        }
    }

    #[test]
    fn params_report_numeric_policy() {
        let engine = Orbits::<Fixed16>::new(8, 8, 1, OrbitsConfig::default()).unwrap();
        assert_eq!(engine.params()["numeric"], "fixed16");
        let engine = Orbits::<f32>::new(8, 8, 1, OrbitsConfig::default()).unwrap();
        assert_eq!(engine.params()["numeric"], "f32");
    }

    #[test]
    fn schema_covers_every_param() {
        let engine = orbits(8, 8, 1);
        let schema = engine.param_schema();
        let params = engine.params();
        for key in schema.as_object().unwrap().keys() {
            assert!(params.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn params_round_trip_through_from_json() {
        let config = OrbitsConfig {
            emitters: 4,
            combination: CombinationMode::Additive,
            scene: SceneKind::Anchored,
            ..OrbitsConfig::default()
        };
        let engine = Orbits::<f64>::new(8, 8, 1, config).unwrap();
        assert_eq!(OrbitsConfig::from_json(&engine.params()).unwrap(), config);
    }

    #[test]
    fn usable_as_trait_object() {
        let mut engines: Vec<Box<dyn Engine>> = vec![
            Box::new(orbits(8, 8, 1)),
            Box::new(Orbits::<f32>::new(8, 8, 1, OrbitsConfig::default()).unwrap()),
            Box::new(Orbits::<Fixed16>::new(8, 8, 1, OrbitsConfig::default()).unwrap()),
        ];
        for engine in &mut engines {
            engine.step().unwrap();
            assert!(engine.field().data().iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }
}
