//! Implicit pairwise-friction thermostat core for particle simulations.
//!
//! This crate implements the linear-algebra machinery behind a stochastic
//! thermostat whose dissipative (friction) forces are integrated *implicitly*:
//! the drag term is evaluated at the end-of-step velocity, which turns the
//! per-timestep update into a linear solve against the operator
//!
//! ```text
//!     A = I − (dt/2)·Γ
//! ```
//!
//! where `Γ` is the pairwise friction coupling matrix defined by the current
//! neighbor structure of the particle system. `Γ` is sparse, symmetric, and
//! changes every timestep as particles move, so it is never assembled. Instead
//! the crate provides:
//!
//! - [`ImplicitFrictionOperator`]: evaluates `A·v` directly from a list of
//!   interacting particle pairs and per-type coefficients, one pair at a time.
//! - [`KrylovSolver`]: approximates `A⁻¹·b` with a small fixed number of
//!   symmetric Lanczos iterations, solving the projected tridiagonal system
//!   directly at every step and mapping the Ritz iterate back to particle
//!   space.
//!
//! Both sides meet at the [`LinearOperator`] trait, so the solver is equally
//! happy driving an explicit dense matrix (useful for validation) or the
//! matrix-free pair operator (the production path).
//!
//! Everything the operator needs (pair list, coefficients, per-pair noise,
//! the timestep) is supplied by the surrounding simulation each step.
//! Neighbor search, domain decomposition, random-number generation, and
//! trajectory integration are deliberately outside this crate.
//!
//! ## Example
//!
//! Solve the implicit friction system for two interacting particles and check
//! that applying the operator to the solution recovers the right-hand side:
//!
//! ```rust
//! use dpd_implicit::{
//!     CoefficientTable, ImplicitFrictionOperator, InteractionList, KrylovConfig, KrylovSolver,
//!     LinearOperator, PairInteraction,
//! };
//! use faer::Mat;
//! use glam::DVec3;
//!
//! // One particle type with Groot-Warren style coefficients, k_B T = 1.
//! let mut table = CoefficientTable::new(1, 1.0);
//! table.set_pair(0, 0, 25.0, 4.5, 1.0)?;
//!
//! // Two particles half a cutoff apart along x.
//! let mut pairs = InteractionList::new(2);
//! pairs.push(PairInteraction {
//!     tag_i: 0,
//!     tag_j: 1,
//!     type_i: 0,
//!     type_j: 0,
//!     delta: DVec3::new(0.5, 0.0, 0.0),
//!     scale: 1.0,
//!     noise: 0.3,
//!     reaction: true,
//! });
//!
//! let operator = ImplicitFrictionOperator::new(&pairs, &table, 0.01);
//! let rhs = Mat::from_fn(6, 1, |i, _| (i + 1) as f64);
//!
//! let mut solver = KrylovSolver::new(KrylovConfig::default())?;
//! let solution = solver.approximate_inverse_action(&operator, rhs.as_ref())?;
//!
//! // Round trip: A · (A⁻¹ b) ≈ b.
//! let residual = (&operator.apply(solution.x.as_ref()) - &rhs).norm_l2();
//! assert!(residual < 1e-10);
//! # Ok::<(), dpd_implicit::ThermostatError>(())
//! ```

pub mod algorithms;
pub mod coefficients;
pub mod error;
pub mod forces;
pub mod matrix;
pub mod operator;
pub mod pairs;
pub mod solver;
pub mod utils;

// The types a host simulation touches every timestep.
pub use coefficients::{CoefficientTable, PairCoefficients};
pub use error::ThermostatError;
pub use matrix::LinearOperator;
pub use operator::ImplicitFrictionOperator;
pub use pairs::{InteractionList, PairInteraction};
pub use solver::{KrylovConfig, KrylovSolver, SolveReport, Solution, Termination};
