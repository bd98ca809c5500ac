//! The three-term Lanczos recurrence.
//!
//! For a symmetric operator `A` and a unit starting vector `v₁`, each step
//! computes
//!
//! ```text
//!     r   = A·v_k − α_k·v_k − β_{k−1}·v_{k−1}
//!     α_k = v_kᵀ · A·v_k
//!     β_k = ‖r‖
//!     v_{k+1} = r / β_k
//! ```
//!
//! Symmetry makes explicit orthogonalization against the earlier basis
//! vectors unnecessary: the recurrence touches only the previous two. The
//! stepper below holds exactly those two vectors; the caller decides whether
//! to also store the full basis (the solver does, since it reconstructs a
//! Ritz iterate every step and the subspace is capped small).
//!
//! A `β_k` at the breakdown tolerance means the Krylov subspace is invariant
//! under the operator: the projected problem is exact and normalizing `r`
//! would divide by zero. The stepper reports the step and then refuses to
//! advance further.

use faer::{prelude::*, Mat, MatRef};

use super::{dot, BREAKDOWN_TOLERANCE};
use crate::matrix::LinearOperator;

/// The scalar output of one recurrence step.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LanczosStep {
    /// Diagonal coefficient `α_k`.
    pub alpha: f64,
    /// Off-diagonal coefficient `β_k` (the residual norm after
    /// orthogonalization).
    pub beta: f64,
}

/// Stateful driver of the recurrence: seeded with a normalized right-hand
/// side, advanced strictly one step per [`next_step`](Self::next_step) call,
/// done when the step budget is exhausted or the recurrence breaks down.
pub(crate) struct LanczosIteration<'a, O: LinearOperator> {
    operator: &'a O,
    /// `v_{k−1}`; meaningless until two steps have run.
    v_prev: Mat<f64>,
    /// `v_k`, the vector the next step will apply the operator to.
    v_curr: Mat<f64>,
    beta_prev: f64,
    steps: usize,
    max_steps: usize,
    exhausted: bool,
}

impl<'a, O: LinearOperator> LanczosIteration<'a, O> {
    /// Seeds the recurrence with `b / b_norm`. The caller guarantees
    /// `b_norm = ‖b‖ > 0`; a zero right-hand side never reaches the
    /// recurrence.
    pub fn new(operator: &'a O, b: MatRef<'_, f64>, max_steps: usize, b_norm: f64) -> Self {
        debug_assert!(b_norm > 0.0, "the starting vector must be nonzero");
        let v_curr = &b.to_owned() * Scale(b_norm.recip());
        Self {
            operator,
            v_prev: Mat::zeros(b.nrows(), 1),
            v_curr,
            beta_prev: 0.0,
            steps: 0,
            max_steps,
            exhausted: false,
        }
    }

    /// The current basis vector `v_k`. The solver copies this into its basis
    /// matrix before advancing the recurrence.
    pub fn v_curr(&self) -> MatRef<'_, f64> {
        self.v_curr.as_ref()
    }

    /// Advances the recurrence by one step, returning `(α_k, β_k)`, or `None`
    /// once the budget is spent or a breakdown ended the basis growth.
    pub fn next_step(&mut self) -> Option<LanczosStep> {
        if self.exhausted || self.steps >= self.max_steps {
            return None;
        }

        let applied = self.operator.apply(self.v_curr.as_ref());
        let alpha = dot(self.v_curr.as_ref(), applied.as_ref());

        let scaled_curr = &self.v_curr * Scale(alpha);
        let mut residual = &applied - &scaled_curr;
        if self.steps > 0 {
            let scaled_prev = &self.v_prev * Scale(self.beta_prev);
            residual = &residual - &scaled_prev;
        }

        let beta = residual.norm_l2();
        self.steps += 1;

        if beta > BREAKDOWN_TOLERANCE {
            std::mem::swap(&mut self.v_prev, &mut self.v_curr);
            self.v_curr = &residual * Scale(beta.recip());
            self.beta_prev = beta;
        } else {
            // Invariant subspace: v_{k+1} does not exist.
            self.exhausted = true;
        }

        Some(LanczosStep { alpha, beta })
    }
}
