//! Per-type-pair interaction coefficients.
//!
//! Each ordered pair of particle types carries a conservative strength `a0`,
//! a friction strength `gamma`, an interaction cutoff `cut`, and the random
//! force amplitude `sigma` derived from the fluctuation–dissipation relation
//!
//! ```text
//!     sigma² = 2 · k_B T · gamma
//! ```
//!
//! so that the random and dissipative forces thermostat the system to the
//! target temperature. The table is symmetric by construction: setting
//! `(i, j)` also sets `(j, i)`.
//!
//! Coefficients are configuration, not per-step state. They must be complete
//! before the first solve and are read-only for the duration of a run;
//! validation therefore happens here, at set time, never inside the operator
//! hot loop.

use crate::error::{ThermostatError, ThermostatErrorKind};

/// Coefficients for one (type, type) pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairCoefficients {
    /// Conservative (soft repulsion) strength.
    pub a0: f64,
    /// Friction strength.
    pub gamma: f64,
    /// Random force amplitude, `sqrt(2 · k_B T · gamma)`.
    pub sigma: f64,
    /// Interaction cutoff distance.
    pub cut: f64,
}

/// Symmetric table of [`PairCoefficients`] for all type pairs.
#[derive(Debug, Clone)]
pub struct CoefficientTable {
    ntypes: usize,
    kb_t: f64,
    entries: Vec<PairCoefficients>,
    set: Vec<bool>,
}

impl CoefficientTable {
    /// Creates an empty table for `ntypes` particle types at thermal energy
    /// `kb_t` (Boltzmann constant times target temperature, in simulation
    /// units). All pairs start unset and must be filled via
    /// [`set_pair`](Self::set_pair) before use.
    pub fn new(ntypes: usize, kb_t: f64) -> Self {
        Self {
            ntypes,
            kb_t,
            entries: vec![PairCoefficients::default(); ntypes * ntypes],
            set: vec![false; ntypes * ntypes],
        }
    }

    /// Number of particle types the table covers.
    pub fn ntypes(&self) -> usize {
        self.ntypes
    }

    /// Thermal energy the random force amplitudes were derived for.
    pub fn kb_t(&self) -> f64 {
        self.kb_t
    }

    /// Sets the coefficients for the type pair `(i, j)` and its mirror
    /// `(j, i)`, deriving `sigma` from the fluctuation–dissipation relation.
    ///
    /// # Errors
    ///
    /// Returns [`ThermostatError`] if either type index is out of range, if
    /// `a0` or `gamma` is negative or non-finite, or if `cut` is not strictly
    /// positive.
    pub fn set_pair(
        &mut self,
        i: usize,
        j: usize,
        a0: f64,
        gamma: f64,
        cut: f64,
    ) -> Result<(), ThermostatError> {
        let reject = |reason: &str| {
            Err(ThermostatErrorKind::CoefficientRange {
                i,
                j,
                reason: reason.to_string(),
            }
            .into())
        };

        if i >= self.ntypes || j >= self.ntypes {
            return reject("type index exceeds the table size");
        }
        if !a0.is_finite() || a0 < 0.0 {
            return reject("conservative strength a0 must be finite and non-negative");
        }
        if !gamma.is_finite() || gamma < 0.0 {
            return reject("friction strength gamma must be finite and non-negative");
        }
        if !cut.is_finite() || cut <= 0.0 {
            return reject("cutoff must be finite and positive");
        }

        let sigma = (2.0 * self.kb_t * gamma).sqrt();
        if !sigma.is_finite() {
            return reject("derived random amplitude sigma is not finite");
        }

        let coeffs = PairCoefficients {
            a0,
            gamma,
            sigma,
            cut,
        };
        let (ij, ji) = (self.idx(i, j), self.idx(j, i));
        self.entries[ij] = coeffs;
        self.entries[ji] = coeffs;
        self.set[ij] = true;
        self.set[ji] = true;
        Ok(())
    }

    /// Returns the coefficients for the type pair `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if either type index is out of range. Type indices come from
    /// the host's interaction list, so a mismatch is a wiring bug, not a
    /// runtime condition.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> &PairCoefficients {
        assert!(
            i < self.ntypes && j < self.ntypes,
            "type pair ({i}, {j}) out of range for a {n}-type table",
            n = self.ntypes,
        );
        &self.entries[self.idx(i, j)]
    }

    /// Whether every type pair has been assigned coefficients.
    pub fn is_complete(&self) -> bool {
        self.set.iter().all(|&s| s)
    }

    /// Errors unless every type pair has been assigned coefficients. Intended
    /// to be called once at configuration time, before the first solve.
    pub fn require_complete(&self) -> Result<(), ThermostatError> {
        for i in 0..self.ntypes {
            for j in i..self.ntypes {
                if !self.set[self.idx(i, j)] {
                    return Err(ThermostatErrorKind::CoefficientRange {
                        i,
                        j,
                        reason: "pair coefficients were never set".to_string(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn idx(&self, i: usize, j: usize) -> usize {
        i * self.ntypes + j
    }
}
