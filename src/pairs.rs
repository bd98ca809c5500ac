//! The per-timestep enumeration of interacting particle pairs.
//!
//! An [`InteractionList`] is rebuilt every timestep by the host's neighbor
//! search and handed to this crate read-only. It fixes the geometry, the
//! per-pair noise, and the Newton's-third-law ownership convention for the
//! whole implicit solve: every operator application inside one solve sees the
//! exact same pairs, separations, and random draws. If the noise were redrawn
//! between applications the solver would be inverting a different operator
//! each iteration and could not converge.
//!
//! Particles are addressed by their stable global `tag`, which indexes the
//! `3 × N` state vectors. Tags are the host's mapping from storage slots to
//! vector blocks and must stay fixed for the duration of one timestep.

use glam::DVec3;

/// One interacting pair, frozen for the duration of a timestep.
#[derive(Debug, Clone, PartialEq)]
pub struct PairInteraction {
    /// Global tag of the first particle.
    pub tag_i: usize,
    /// Global tag of the second particle.
    pub tag_j: usize,
    /// Particle type of the first particle, an index into the coefficient table.
    pub type_i: usize,
    /// Particle type of the second particle.
    pub type_j: usize,
    /// Separation vector `x_i − x_j` at list-build time.
    pub delta: DVec3,
    /// Exclusion/scaling factor from bonded special-interaction rules
    /// (1 for an ordinary pair, 0 for a fully excluded one).
    pub scale: f64,
    /// Zero-mean unit-variance random draw for this pair, generated once per
    /// timestep by the host's RNG collaborator.
    pub noise: f64,
    /// Whether this process applies the Newton's-third-law reaction to
    /// `tag_j`. The neighbor-list collaborator sets this so that every pair
    /// is counted exactly once across the whole process group.
    pub reaction: bool,
}

impl PairInteraction {
    /// Scalar separation `‖x_i − x_j‖`.
    #[inline]
    pub fn separation(&self) -> f64 {
        self.delta.length()
    }
}

/// All interacting pairs for one timestep, plus the owned-particle count that
/// fixes the state-vector length.
#[derive(Debug, Clone)]
pub struct InteractionList {
    n_owned: usize,
    pairs: Vec<PairInteraction>,
}

impl InteractionList {
    /// Creates an empty list for a system of `n_owned` owned particles.
    pub fn new(n_owned: usize) -> Self {
        Self {
            n_owned,
            pairs: Vec::new(),
        }
    }

    /// Creates an empty list with room for `capacity` pairs.
    pub fn with_capacity(n_owned: usize, capacity: usize) -> Self {
        Self {
            n_owned,
            pairs: Vec::with_capacity(capacity),
        }
    }

    /// Appends one pair. Both tags must refer to owned particles: the state
    /// vectors this crate consumes and produces only cover owned blocks.
    pub fn push(&mut self, pair: PairInteraction) {
        debug_assert!(
            pair.tag_i < self.n_owned && pair.tag_j < self.n_owned,
            "pair ({}, {}) references a tag outside the {} owned particles",
            pair.tag_i,
            pair.tag_j,
            self.n_owned,
        );
        self.pairs.push(pair);
    }

    /// The pairs, in host-supplied order. Contributions commute up to
    /// floating-point rounding, so no particular order is required.
    #[inline]
    pub fn pairs(&self) -> &[PairInteraction] {
        &self.pairs
    }

    /// Number of owned particles.
    #[inline]
    pub fn num_owned(&self) -> usize {
        self.n_owned
    }

    /// Length of the state vectors this list defines: `3 × N`.
    #[inline]
    pub fn dof(&self) -> usize {
        3 * self.n_owned
    }

    /// Number of pairs in the list.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the list holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Drops all pairs but keeps the allocation, for reuse across timesteps.
    pub fn clear(&mut self) {
        self.pairs.clear();
    }
}
