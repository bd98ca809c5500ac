//! Matrix-free evaluation of the implicit friction coupling operator.
//!
//! The implicit-midpoint discretization of the pairwise drag force leads to
//! the linear system `(I − (dt/2)·Γ)·x = b`, where the friction matrix `Γ`
//! couples every interacting pair through the projection of their relative
//! velocity onto the pair axis:
//!
//! ```text
//!     (Γ v)_i = Σ_j −γ_ij · w_ij² · (e_ij · (v_i − v_j)) · e_ij
//! ```
//!
//! with `w_ij = 1 − r_ij / r_c` the usual soft weight and `e_ij` the unit
//! separation vector. [`ImplicitFrictionOperator`] evaluates the full
//! `I − (dt/2)·Γ` action in a single sweep over the pair list, which is all
//! the Krylov solver needs.
//!
//! The pair contributions are antisymmetric under `i ↔ j` and the
//! coefficients are type-symmetric, so the represented matrix is symmetric,
//! which is the property the Lanczos recurrence relies on.

use faer::{Mat, MatRef};
use glam::DVec3;

use crate::{coefficients::CoefficientTable, matrix::LinearOperator, pairs::InteractionList};

/// Separations below this are treated as coincident particles and skipped.
/// Soft DPD potentials allow particles to sit on top of each other; such a
/// pair has no defined axis and contributes nothing.
pub const DISTANCE_EPSILON: f64 = 1.0e-10;

/// The `I − (dt/2)·Γ` operator for the current timestep.
///
/// Borrows the pair list and coefficient table; owns nothing. Positions are
/// frozen while the implicit solve runs, so one value of this type is valid
/// for exactly one timestep and every application inside that timestep sees
/// the identical coupling matrix.
#[derive(Debug, Clone, Copy)]
pub struct ImplicitFrictionOperator<'a> {
    pairs: &'a InteractionList,
    coefficients: &'a CoefficientTable,
    dt: f64,
}

impl<'a> ImplicitFrictionOperator<'a> {
    /// Builds the operator for one timestep of size `dt`.
    pub fn new(pairs: &'a InteractionList, coefficients: &'a CoefficientTable, dt: f64) -> Self {
        debug_assert!(dt.is_finite() && dt > 0.0, "timestep must be positive");
        Self {
            pairs,
            coefficients,
            dt,
        }
    }

    /// The timestep the operator was built for.
    pub fn dt(&self) -> f64 {
        self.dt
    }
}

impl LinearOperator for ImplicitFrictionOperator<'_> {
    fn nrows(&self) -> usize {
        self.pairs.dof()
    }

    fn ncols(&self) -> usize {
        self.pairs.dof()
    }

    fn apply(&self, input: MatRef<'_, f64>) -> Mat<f64> {
        assert_eq!(
            input.nrows(),
            self.pairs.dof(),
            "Dimension mismatch: operator acts on {} rows but the input has {}.",
            self.pairs.dof(),
            input.nrows(),
        );
        assert_eq!(input.ncols(), 1, "the operator acts on column vectors");

        // Identity term: output starts as a copy of the input, so the pair
        // sweep below only has to accumulate the −(dt/2)·Γ part.
        let mut output = input.to_owned();

        let pre = -self.dt / 2.0;
        for pair in self.pairs.pairs() {
            let r = pair.separation();
            if r < DISTANCE_EPSILON {
                continue;
            }
            let coeffs = self.coefficients.get(pair.type_i, pair.type_j);
            if r >= coeffs.cut {
                continue;
            }

            let w = 1.0 - r / coeffs.cut;
            let e = pair.delta / r;

            let i = 3 * pair.tag_i;
            let j = 3 * pair.tag_j;
            let dv = DVec3::new(
                input[(i, 0)] - input[(j, 0)],
                input[(i + 1, 0)] - input[(j + 1, 0)],
                input[(i + 2, 0)] - input[(j + 2, 0)],
            );

            let contrib = e * (pre * pair.scale * -coeffs.gamma * w * w * e.dot(dv));

            output[(i, 0)] += contrib.x;
            output[(i + 1, 0)] += contrib.y;
            output[(i + 2, 0)] += contrib.z;

            // The reaction half is applied only where this process owns the
            // pair; the list builder guarantees each pair reacts exactly once
            // across the whole process group.
            if pair.reaction {
                output[(j, 0)] -= contrib.x;
                output[(j + 1, 0)] -= contrib.y;
                output[(j + 2, 0)] -= contrib.z;
            }
        }

        output
    }
}
