//! Integration suite for the mathematical contract of the pair operator and
//! the Krylov solver.
//!
//! # Test Methodology
//!
//! The operator's contract is algebraic (linearity, self-adjointness, known
//! closed forms for single pairs), so each property is checked directly on
//! small seeded systems where the expected answer can be computed by hand or
//! by an independent dense factorization. The solver is validated the same
//! way an iterative method is always validated: against a ground truth that
//! does not go through the code under test (a direct LU solve of an explicit
//! matrix, or re-applying the operator to the returned iterate).
//!
//! All randomness is seeded, so every test is deterministic.

use anyhow::{ensure, Result};
use dpd_implicit::{
    forces::timestep_rhs,
    utils::sampling::{reference_table, sample_fluid},
    CoefficientTable, ImplicitFrictionOperator, InteractionList, KrylovConfig, KrylovSolver,
    LinearOperator, PairInteraction, Termination,
};
use faer::{prelude::*, Mat};
use glam::DVec3;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Tolerance for identities that hold up to floating-point rounding only
/// (linearity, symmetry, closed forms).
const EXACT_TOLERANCE: f64 = 1e-12;

/// Real inner product of two column vectors.
fn dot(a: &Mat<f64>, b: &Mat<f64>) -> f64 {
    (a.as_ref().transpose() * b.as_ref())[(0, 0)]
}

/// A reproducible random column vector with entries in (-1, 1).
fn random_vector(n: usize, seed: u64) -> Mat<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Mat::from_fn(n, 1, |_, _| rng.random::<f64>() * 2.0 - 1.0)
}

/// A dense fluid where essentially everything interacts with everything.
fn dense_fluid(n: usize, seed: u64) -> (dpd_implicit::utils::sampling::SampleFluid, CoefficientTable)
{
    let fluid = sample_fluid(n, 1.8, 1.0, seed);
    (fluid, reference_table(1.0))
}

#[test]
fn operator_is_linear() -> Result<()> {
    let (fluid, table) = dense_fluid(8, 17);
    let operator = ImplicitFrictionOperator::new(&fluid.pairs, &table, 0.02);
    let n = fluid.pairs.dof();

    let a = random_vector(n, 1);
    let b = random_vector(n, 2);
    let (s, t) = (1.7, -0.4);

    let combined = &(&a * Scale(s)) + &(&b * Scale(t));
    let lhs = operator.apply(combined.as_ref());
    let rhs = &(&operator.apply(a.as_ref()) * Scale(s)) + &(&operator.apply(b.as_ref()) * Scale(t));

    let deviation = (&lhs - &rhs).norm_l2();
    ensure!(
        deviation < EXACT_TOLERANCE,
        "linearity deviation too large: {deviation}"
    );
    Ok(())
}

#[test]
fn operator_is_self_adjoint() -> Result<()> {
    let (fluid, table) = dense_fluid(8, 23);
    let operator = ImplicitFrictionOperator::new(&fluid.pairs, &table, 0.02);
    let n = fluid.pairs.dof();

    let a = random_vector(n, 3);
    let b = random_vector(n, 4);

    let forward = dot(&operator.apply(a.as_ref()), &b);
    let adjoint = dot(&a, &operator.apply(b.as_ref()));
    ensure!(
        (forward - adjoint).abs() < EXACT_TOLERANCE,
        "self-adjointness violated: {forward} vs {adjoint}"
    );
    Ok(())
}

#[test]
fn empty_list_recovers_the_identity() {
    let table = reference_table(1.0);
    let list = InteractionList::new(5);
    let operator = ImplicitFrictionOperator::new(&list, &table, 0.02);

    let v = random_vector(15, 5);
    assert_eq!(operator.apply(v.as_ref()), v);
}

#[test]
fn zero_rhs_maps_to_the_zero_solution() -> Result<()> {
    let (fluid, table) = dense_fluid(6, 29);
    let operator = ImplicitFrictionOperator::new(&fluid.pairs, &table, 0.02);

    let mut solver = KrylovSolver::new(KrylovConfig::default())?;
    let zero = Mat::<f64>::zeros(fluid.pairs.dof(), 1);
    let solution = solver.approximate_inverse_action(&operator, zero.as_ref())?;

    ensure!(solution.x == zero, "zero rhs must return the zero vector");
    ensure!(solution.report.steps == 0, "no iterations should be spent");
    Ok(())
}

#[test]
fn single_pair_matches_the_closed_form() -> Result<()> {
    // One pair along x: r = 0.6, cutoff 1, gamma 4.5, dt 0.02.
    // With a unit relative velocity along the axis,
    //     contribution = (dt/2) · gamma · w² = 0.01 · 4.5 · 0.16 = 0.0072.
    let mut table = CoefficientTable::new(1, 1.0);
    table.set_pair(0, 0, 25.0, 4.5, 1.0)?;

    let mut list = InteractionList::new(2);
    list.push(PairInteraction {
        tag_i: 0,
        tag_j: 1,
        type_i: 0,
        type_j: 0,
        delta: DVec3::new(0.6, 0.0, 0.0),
        scale: 1.0,
        noise: 0.0,
        reaction: true,
    });
    let operator = ImplicitFrictionOperator::new(&list, &table, 0.02);

    let mut input = Mat::<f64>::zeros(6, 1);
    input[(0, 0)] = 1.0;
    let output = operator.apply(input.as_ref());

    ensure!((output[(0, 0)] - 1.0072).abs() < EXACT_TOLERANCE);
    ensure!((output[(3, 0)] + 0.0072).abs() < EXACT_TOLERANCE);
    // Nothing leaks into the transverse components.
    for row in [1, 2, 4, 5] {
        ensure!(output[(row, 0)] == 0.0, "row {row} should be untouched");
    }
    Ok(())
}

#[test]
fn iterate_deltas_shrink_and_cross_the_tolerance() -> Result<()> {
    // Four particles, all pairwise within cutoff: a well-conditioned system
    // the solver must finish well before the default budget.
    let mut table = CoefficientTable::new(1, 1.0);
    table.set_pair(0, 0, 25.0, 4.5, 1.0)?;

    let positions = [
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(0.55, 0.0, 0.0),
        DVec3::new(0.2, 0.5, 0.0),
        DVec3::new(0.3, 0.2, 0.45),
    ];
    let mut rng = StdRng::seed_from_u64(97);
    let pairs = dpd_implicit::utils::sampling::all_pairs_within(&positions, 1.0, &mut rng);
    ensure!(pairs.len() == 6, "all four particles must interact");

    let dt = 0.05;
    let operator = ImplicitFrictionOperator::new(&pairs, &table, dt);
    let velocities: Vec<DVec3> = (0..4)
        .map(|_| {
            DVec3::new(
                rng.random::<f64>() - 0.5,
                rng.random::<f64>() - 0.5,
                rng.random::<f64>() - 0.5,
            )
        })
        .collect();
    let rhs = timestep_rhs(&pairs, &table, &velocities, dt);

    // Sweep the budget with fixed_budget to read off the delta at each k.
    let mut deltas = Vec::new();
    for k in 2..=8 {
        let mut solver = KrylovSolver::new(KrylovConfig {
            max_subspace: k,
            tol: 1.0e-5,
            fixed_budget: true,
        })?;
        let solution = solver.approximate_inverse_action(&operator, rhs.as_ref())?;
        let delta = solution
            .report
            .last_delta
            .expect("two iterates exist for k >= 2");
        ensure!(delta.is_finite());
        deltas.push(delta);
    }
    ensure!(
        deltas.last().unwrap() < deltas.first().unwrap(),
        "iterate deltas must decrease over the sweep: {deltas:?}"
    );
    ensure!(
        *deltas.last().unwrap() < 1.0e-6,
        "deltas must drop well below the tolerance: {deltas:?}"
    );

    // The adaptive solver must converge before exhausting the default budget.
    let mut solver = KrylovSolver::new(KrylovConfig::default())?;
    let solution = solver.approximate_inverse_action(&operator, rhs.as_ref())?;
    ensure!(
        solution.report.termination == Termination::Converged,
        "expected convergence, got {:?}",
        solution.report
    );
    ensure!(solution.report.steps < 10);
    Ok(())
}

#[test]
fn coincident_pair_is_a_silent_no_op() -> Result<()> {
    let mut table = CoefficientTable::new(1, 1.0);
    table.set_pair(0, 0, 25.0, 4.5, 1.0)?;

    // One degenerate pair right on top of each other, one healthy pair.
    let mut list = InteractionList::new(3);
    list.push(PairInteraction {
        tag_i: 0,
        tag_j: 1,
        type_i: 0,
        type_j: 0,
        delta: DVec3::new(1.0e-12, 0.0, 0.0),
        scale: 1.0,
        noise: 0.0,
        reaction: true,
    });
    list.push(PairInteraction {
        tag_i: 1,
        tag_j: 2,
        type_i: 0,
        type_j: 0,
        delta: DVec3::new(0.4, 0.1, 0.0),
        scale: 1.0,
        noise: 0.0,
        reaction: true,
    });
    let operator = ImplicitFrictionOperator::new(&list, &table, 0.02);

    let v = random_vector(9, 31);
    let out = operator.apply(v.as_ref());
    for row in 0..9 {
        ensure!(out[(row, 0)].is_finite(), "row {row} is not finite");
    }
    // The degenerate pair must not touch particle 0 at all.
    for row in 0..3 {
        ensure!(out[(row, 0)] == v[(row, 0)]);
    }
    Ok(())
}

#[test]
fn solver_round_trips_through_the_operator() -> Result<()> {
    let fluid = sample_fluid(32, 2.5, 1.0, 41);
    let table = reference_table(1.0);
    let dt = 0.02;
    let operator = ImplicitFrictionOperator::new(&fluid.pairs, &table, dt);
    let rhs = timestep_rhs(&fluid.pairs, &table, &fluid.velocities, dt);

    let mut solver = KrylovSolver::new(KrylovConfig::default())?;
    let solution = solver.approximate_inverse_action(&operator, rhs.as_ref())?;

    let round_trip = operator.apply(solution.x.as_ref());
    let rel_residual = (&round_trip - &rhs).norm_l2() / rhs.norm_l2();
    ensure!(
        rel_residual < 1.0e-3,
        "round-trip residual too large: {rel_residual}"
    );
    Ok(())
}

#[test]
fn solver_matches_a_direct_dense_factorization() -> Result<()> {
    // Discrete 1-D Laplacian: symmetric positive definite, 8 distinct
    // eigenvalues, so an 8-step Krylov solve is exact up to rounding.
    let n = 8;
    let a = Mat::from_fn(n, n, |i, j| {
        if i == j {
            2.0
        } else if i.abs_diff(j) == 1 {
            -1.0
        } else {
            0.0
        }
    });
    let rhs = random_vector(n, 43);

    let mut solver = KrylovSolver::new(KrylovConfig {
        max_subspace: n,
        tol: 1.0e-13,
        fixed_budget: false,
    })?;
    let solution = solver.approximate_inverse_action(&a, rhs.as_ref())?;

    let direct = a.as_ref().partial_piv_lu().solve(&rhs);
    let rel_err = (&solution.x - &direct).norm_l2() / direct.norm_l2();
    ensure!(rel_err < 1.0e-8, "error vs direct solve: {rel_err}");
    Ok(())
}
