//! The emitter arena and its per-tick dynamics.
//!
//! Emitters live in one `Vec` addressed by [`EmitterId`]. Motion comes from
//! [`CouplingGroup`]s, each a subset of emitters plus a fixed attractor
//! point. A tick applies every group's coupling to velocities first and only
//! then integrates positions, so the outcome does not depend on the order in
//! which emitters or groups are visited.

use crate::emitter::{Emitter, EmitterId, EmitterParams};
use crate::numeric::Scalar;
use glam::DVec2;
use quadfield_core::{EngineError, Xorshift64};

/// Weight of the pull between two members of an orbiting group.
pub const MUTUAL_WEIGHT: f64 = 1.0;
/// Weight of the pull toward an orbiting group's attractor, applied once per partner.
pub const ATTRACTOR_WEIGHT: f64 = 2.0;
/// Weight of the pull toward an anchored group's attractor.
pub const ANCHOR_WEIGHT: f64 = 1.0;

/// How a group's members are coupled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Every member is pulled toward every other member and, once per
    /// partner, toward the attractor. A lone member feels nothing.
    Orbiting,
    /// Every member is pulled toward the attractor only.
    Anchored,
}

/// A set of emitters sharing an attractor and coupling rule.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingGroup {
    pub members: Vec<EmitterId>,
    pub attractor: DVec2,
    pub kind: GroupKind,
}

impl CouplingGroup {
    pub fn orbiting(members: Vec<EmitterId>, attractor: DVec2) -> Self {
        Self {
            members,
            attractor,
            kind: GroupKind::Orbiting,
        }
    }

    pub fn anchored(members: Vec<EmitterId>, attractor: DVec2) -> Self {
        Self {
            members,
            attractor,
            kind: GroupKind::Anchored,
        }
    }

    /// Accumulates this group's coupling into member velocities.
    ///
    /// Only velocities change here, so every read of a partner's position
    /// sees its pre-tick value.
    fn apply<S: Scalar>(&self, emitters: &mut [Emitter<S>]) {
        match self.kind {
            GroupKind::Orbiting => {
                for &a in &self.members {
                    for &b in &self.members {
                        if a == b {
                            continue;
                        }
                        let partner = emitters[b.index()].position();
                        let emitter = &mut emitters[a.index()];
                        emitter.apply_coupling(partner, MUTUAL_WEIGHT);
                        emitter.apply_coupling(self.attractor, ATTRACTOR_WEIGHT);
                    }
                }
            }
            GroupKind::Anchored => {
                for &a in &self.members {
                    emitters[a.index()].apply_coupling(self.attractor, ANCHOR_WEIGHT);
                }
            }
        }
    }

    fn validate(&self, count: usize) -> Result<(), EngineError> {
        for (i, id) in self.members.iter().enumerate() {
            if id.index() >= count {
                return Err(EngineError::InvalidGroup(format!(
                    "member {} out of range for {count} emitters",
                    id.index()
                )));
            }
            if self.members[..i].contains(id) {
                return Err(EngineError::InvalidGroup(format!(
                    "member {} listed twice",
                    id.index()
                )));
            }
        }
        Ok(())
    }
}

/// Fixed-size population of emitters, their coupling groups, and the pause flag.
#[derive(Debug, Clone)]
pub struct Ensemble<S: Scalar = f64> {
    emitters: Vec<Emitter<S>>,
    groups: Vec<CouplingGroup>,
    paused: bool,
    rng: Xorshift64,
}

impl<S: Scalar> Ensemble<S> {
    /// Creates `count` randomized emitters coupled by `groups`.
    ///
    /// Returns `EngineError::EmptyEnsemble` for `count == 0` and
    /// `EngineError::InvalidGroup` for out-of-range or repeated members.
    pub fn new(count: usize, groups: Vec<CouplingGroup>, seed: u64) -> Result<Self, EngineError> {
        if count == 0 {
            return Err(EngineError::EmptyEnsemble);
        }
        let mut rng = Xorshift64::new(seed);
        let emitters = (0..count)
            .map(|i| Emitter::new(EmitterId(i), &mut rng))
            .collect();
        Self::assemble(emitters, groups, rng)
    }

    /// Creates emitters with explicit parameters, in order.
    ///
    /// The seed drives the orientation random walk and later resets.
    pub fn from_params(
        params: &[EmitterParams],
        groups: Vec<CouplingGroup>,
        seed: u64,
    ) -> Result<Self, EngineError> {
        if params.is_empty() {
            return Err(EngineError::EmptyEnsemble);
        }
        let emitters = params
            .iter()
            .enumerate()
            .map(|(i, p)| Emitter::with_params(EmitterId(i), *p))
            .collect();
        Self::assemble(emitters, groups, Xorshift64::new(seed))
    }

    /// `count` emitters orbiting each other and the origin.
    pub fn orbiting(count: usize, seed: u64) -> Result<Self, EngineError> {
        let members = (0..count).map(EmitterId).collect();
        Self::new(count, vec![CouplingGroup::orbiting(members, DVec2::ZERO)], seed)
    }

    /// `count` emitters each pulled toward `anchor`.
    pub fn anchored(count: usize, anchor: DVec2, seed: u64) -> Result<Self, EngineError> {
        let members = (0..count).map(EmitterId).collect();
        Self::new(count, vec![CouplingGroup::anchored(members, anchor)], seed)
    }

    fn assemble(
        emitters: Vec<Emitter<S>>,
        groups: Vec<CouplingGroup>,
        rng: Xorshift64,
    ) -> Result<Self, EngineError> {
        for group in &groups {
            group.validate(emitters.len())?;
        }
        Ok(Self {
            emitters,
            groups,
            paused: false,
            rng,
        })
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    /// Always false: an ensemble holds at least one emitter.
    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    pub fn emitters(&self) -> &[Emitter<S>] {
        &self.emitters
    }

    /// Mutable access for the evaluator's caches and explicit placement.
    pub fn emitters_mut(&mut self) -> &mut [Emitter<S>] {
        &mut self.emitters
    }

    pub fn emitter(&self, id: EmitterId) -> Option<&Emitter<S>> {
        self.emitters.get(id.index())
    }

    pub fn groups(&self) -> &[CouplingGroup] {
        &self.groups
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Advances every emitter by one tick. Does nothing while paused.
    pub fn step(&mut self) {
        if self.paused {
            tracing::trace!("ensemble paused, step skipped");
            return;
        }
        for group in &self.groups {
            group.apply(&mut self.emitters);
        }
        for emitter in &mut self.emitters {
            emitter.advance(&mut self.rng);
        }
        tracing::trace!(emitters = self.emitters.len(), "ensemble stepped");
    }

    /// Re-draws every emitter's parameters.
    pub fn randomize_all(&mut self) {
        tracing::debug!(emitters = self.emitters.len(), "randomizing ensemble");
        for emitter in &mut self.emitters {
            emitter.reset(&mut self.rng);
        }
    }
}
