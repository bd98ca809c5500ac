//! Fixed-budget Krylov approximation of the operator's inverse action.
//!
//! One call to [`KrylovSolver::approximate_inverse_action`] runs the
//! symmetric Lanczos recurrence against a [`LinearOperator`], growing an
//! orthonormal basis `V_k` one vector per iteration up to a small cap, and at
//! *every* iteration solves the projected tridiagonal system directly to form
//! the current Ritz iterate
//!
//! ```text
//!     x_k = ‖b‖ · V_k · T_k⁻¹ · e₁
//! ```
//!
//! Rebuilding and refactorizing `T_k` each pass would be wasteful for a large
//! subspace, but the subspace is capped small (ten by default) as an explicit
//! invariant, and the per-iteration resolve is what makes the
//! successive-iterate convergence measurement possible.
//!
//! This is a *fixed-budget* solver: when the budget runs out, the last
//! iterate is returned as the best available approximation, with no residual
//! guarantee. The [`SolveReport`] says which way the loop ended. With
//! [`KrylovConfig::fixed_budget`] set, the solver also ignores the
//! convergence tolerance and always spends the whole budget, reproducing
//! bit-for-bit the behavior of runs that were tuned that way; the default is
//! to stop as soon as successive iterates agree to within the tolerance.

use std::time::Instant;

use faer::{linalg::matmul::matmul, prelude::*, Accum, Mat, MatRef, Par};

use crate::{
    algorithms::{
        assemble_tridiagonal, lanczos::LanczosIteration, LanczosDecomposition,
        BREAKDOWN_TOLERANCE,
    },
    error::{ThermostatError, ThermostatErrorKind},
    matrix::LinearOperator,
    utils::perf::PerfCounters,
};

/// Tuning knobs for the implicit solve, validated once at solver construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KrylovConfig {
    /// Hard cap on the Krylov subspace size (and so on the number of operator
    /// applications per solve).
    pub max_subspace: usize,
    /// Convergence tolerance on the norm of the difference between successive
    /// iterates.
    pub tol: f64,
    /// When set, the convergence tolerance is only logged and the solver
    /// always spends its full subspace budget (except on exact breakdown).
    /// Useful when bit-for-bit reproducibility across runs matters more than
    /// the saved operator applications.
    pub fixed_budget: bool,
}

impl Default for KrylovConfig {
    fn default() -> Self {
        Self {
            max_subspace: 10,
            tol: 1.0e-5,
            fixed_budget: false,
        }
    }
}

impl KrylovConfig {
    fn validate(&self) -> Result<(), ThermostatError> {
        if self.max_subspace == 0 {
            return Err(
                ThermostatErrorKind::InvalidConfig("max_subspace must be at least 1".into()).into(),
            );
        }
        if !self.tol.is_finite() || self.tol <= 0.0 {
            return Err(ThermostatErrorKind::InvalidConfig(
                "tol must be finite and positive".into(),
            )
            .into());
        }
        Ok(())
    }
}

/// How a solve's iteration loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Successive iterates agreed to within the tolerance (also reported for
    /// a zero right-hand side, which is answered without iterating).
    Converged,
    /// An off-diagonal coefficient vanished: the Krylov subspace is invariant
    /// and the current iterate is exact up to rounding.
    InvariantSubspace,
    /// The subspace cap was reached; the last iterate is a best-effort
    /// approximation.
    BudgetExhausted,
}

/// Diagnostics for one solve.
#[derive(Debug, Clone)]
pub struct SolveReport {
    /// Lanczos steps taken (equal to the number of operator applications).
    pub steps: usize,
    /// Norm of the difference between the last two iterates, if at least two
    /// were formed.
    pub last_delta: Option<f64>,
    /// Which way the loop ended.
    pub termination: Termination,
}

/// The approximate inverse action together with its diagnostics.
#[derive(Debug)]
pub struct Solution {
    /// The approximate solution of `A·x = b`.
    pub x: Mat<f64>,
    /// Per-solve diagnostics.
    pub report: SolveReport,
}

/// Driver for the implicit solve. Owns its configuration and cumulative
/// timing counters; the basis and projection of an in-flight solve live only
/// on the call stack.
#[derive(Debug)]
pub struct KrylovSolver {
    config: KrylovConfig,
    counters: PerfCounters,
}

impl KrylovSolver {
    /// Creates a solver, rejecting invalid configuration up front so that no
    /// bad value is discovered mid-solve.
    pub fn new(config: KrylovConfig) -> Result<Self, ThermostatError> {
        config.validate()?;
        Ok(Self {
            config,
            counters: PerfCounters::default(),
        })
    }

    /// The configuration the solver was built with.
    pub fn config(&self) -> &KrylovConfig {
        &self.config
    }

    /// Cumulative timing and call counters across all solves by this value.
    pub fn counters(&self) -> &PerfCounters {
        &self.counters
    }

    /// Resets the cumulative counters.
    pub fn reset_counters(&mut self) {
        self.counters = PerfCounters::default();
    }

    /// Approximates `x ≈ A⁻¹·b` for the symmetric operator `A`.
    ///
    /// The operator, pair list, and coefficients are read-only for the whole
    /// call: every one of the up-to-`max_subspace` applications sees the
    /// identical matrix.
    ///
    /// # Errors
    ///
    /// [`ThermostatError`] on a right-hand side whose length does not match
    /// the operator, or if every projected solve produced non-finite values
    /// (a pathological friction configuration).
    pub fn approximate_inverse_action<O: LinearOperator>(
        &mut self,
        operator: &O,
        rhs: MatRef<'_, f64>,
    ) -> Result<Solution, ThermostatError> {
        let n = operator.nrows();
        if rhs.nrows() != n || rhs.ncols() != 1 {
            return Err(ThermostatErrorKind::DimensionMismatch {
                operator_rows: n,
                vector_rows: rhs.nrows(),
            }
            .into());
        }

        let norm = rhs.norm_l2();
        if norm == 0.0 {
            // Nothing to invert against; the exact answer is free.
            return Ok(Solution {
                x: Mat::zeros(n, 1),
                report: SolveReport {
                    steps: 0,
                    last_delta: None,
                    termination: Termination::Converged,
                },
            });
        }

        let k_max = self.config.max_subspace;
        let mut basis = Mat::<f64>::zeros(n, k_max);
        let mut decomposition = LanczosDecomposition {
            alphas: Vec::with_capacity(k_max),
            betas: Vec::with_capacity(k_max.saturating_sub(1)),
            steps_taken: 0,
            b_norm: norm,
        };

        let mut iteration = LanczosIteration::new(operator, rhs, k_max, norm);
        let mut x_prev: Option<Mat<f64>> = None;
        let mut last_delta = None;
        let mut termination = Termination::BudgetExhausted;

        for k in 1..=k_max {
            basis.col_mut(k - 1).copy_from(iteration.v_curr().col(0));

            let operator_start = Instant::now();
            let Some(step) = iteration.next_step() else {
                break;
            };
            self.counters.time_operator += operator_start.elapsed();
            self.counters.applies += 1;
            decomposition.alphas.push(step.alpha);
            decomposition.steps_taken += 1;

            // Direct resolve of the projected system: T_k · y = e₁.
            let projection_start = Instant::now();
            let t_k = assemble_tridiagonal(&decomposition.alphas, &decomposition.betas);
            let mut e1 = Mat::<f64>::zeros(k, 1);
            e1[(0, 0)] = 1.0;
            let y = t_k.as_ref().partial_piv_lu().solve(&e1);
            self.counters.time_projection += projection_start.elapsed();

            if is_finite(y.as_ref()) {
                // Map the projected solution back through the basis and undo
                // the initial normalization: x_k = ‖b‖ · V_k · y.
                let y_scaled = &y * Scale(decomposition.b_norm);
                let mut x_k = Mat::<f64>::zeros(n, 1);
                matmul(
                    x_k.as_mut(),
                    Accum::Replace,
                    basis.as_ref().get(.., 0..k),
                    y_scaled.as_ref(),
                    1.0,
                    Par::Seq,
                );

                let delta = x_prev
                    .as_ref()
                    .map(|prev| (&x_k - prev).norm_l2());
                x_prev = Some(x_k);

                if let Some(delta) = delta {
                    last_delta = Some(delta);
                    log::debug!("lanczos subspace {k}: successive-iterate delta {delta:.3e}");
                    if delta < self.config.tol && !self.config.fixed_budget {
                        termination = Termination::Converged;
                        break;
                    }
                }
            } else {
                // Near-singular projection: keep the previous iterate rather
                // than propagating non-finite values into the trajectory.
                log::warn!(
                    "projected tridiagonal solve at subspace {k} produced non-finite values; \
                     iterate not updated"
                );
            }

            if step.beta <= BREAKDOWN_TOLERANCE {
                termination = Termination::InvariantSubspace;
                break;
            }
            if k < k_max {
                decomposition.betas.push(step.beta);
            }
        }

        self.counters.solves += 1;

        let x = x_prev.ok_or(ThermostatErrorKind::ProjectionSingular)?;
        Ok(Solution {
            x,
            report: SolveReport {
                steps: decomposition.steps_taken,
                last_delta,
                termination,
            },
        })
    }
}

fn is_finite(v: MatRef<'_, f64>) -> bool {
    (0..v.nrows()).all(|i| v[(i, 0)].is_finite())
}
