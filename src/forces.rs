//! Explicit conservative and random pairwise forces, and the right-hand side
//! of the implicit solve.
//!
//! The implicit step only treats the *friction* part of the thermostat
//! through the linear solve; the conservative repulsion and the random kicks
//! are evaluated explicitly, once per timestep, from the same frozen pair
//! list:
//!
//! ```text
//!     F_ij = [ a0·w  +  σ·w·ξ_ij / √dt ] · scale · e_ij
//! ```
//!
//! with `ξ_ij` the pair's frozen unit-variance draw. The right-hand side the
//! solver inverts against is then assembled from those forces and the current
//! velocities:
//!
//! ```text
//!     b = (dt²/2)·F + dt·v
//! ```
//!
//! Hosts with their own force pipeline can build `b` themselves and skip this
//! module entirely; the solver takes any right-hand side.

use faer::Mat;
use glam::DVec3;

use crate::{
    coefficients::CoefficientTable, operator::DISTANCE_EPSILON, pairs::InteractionList,
};

/// Accumulates the explicit conservative + random pairwise forces over the
/// list, returning a `3 × N` force vector indexed by global tag.
///
/// Degenerate (coincident) pairs and pairs at or beyond their type cutoff
/// contribute nothing, exactly as in the friction operator.
pub fn pairwise_forces(pairs: &InteractionList, coefficients: &CoefficientTable, dt: f64) -> Mat<f64> {
    let mut forces = Mat::<f64>::zeros(pairs.dof(), 1);
    let dt_inv_sqrt = dt.sqrt().recip();

    for pair in pairs.pairs() {
        let r = pair.separation();
        if r < DISTANCE_EPSILON {
            continue;
        }
        let coeffs = coefficients.get(pair.type_i, pair.type_j);
        if r >= coeffs.cut {
            continue;
        }

        let w = 1.0 - r / coeffs.cut;
        let magnitude = coeffs.a0 * w + coeffs.sigma * w * pair.noise * dt_inv_sqrt;
        let force = (pair.delta / r) * (magnitude * pair.scale);

        let i = 3 * pair.tag_i;
        let j = 3 * pair.tag_j;
        forces[(i, 0)] += force.x;
        forces[(i + 1, 0)] += force.y;
        forces[(i + 2, 0)] += force.z;
        if pair.reaction {
            forces[(j, 0)] -= force.x;
            forces[(j + 1, 0)] -= force.y;
            forces[(j + 2, 0)] -= force.z;
        }
    }

    forces
}

/// Builds the right-hand side of the implicit solve, `(dt²/2)·F + dt·v`, from
/// the explicit pairwise forces and the current velocities.
///
/// `velocities` is indexed by global tag and must cover every owned particle.
pub fn timestep_rhs(
    pairs: &InteractionList,
    coefficients: &CoefficientTable,
    velocities: &[DVec3],
    dt: f64,
) -> Mat<f64> {
    assert_eq!(
        velocities.len(),
        pairs.num_owned(),
        "velocity array covers {} particles but the list owns {}",
        velocities.len(),
        pairs.num_owned(),
    );

    let mut rhs = pairwise_forces(pairs, coefficients, dt);
    let half_dt_sq = dt * dt / 2.0;
    for (tag, v) in velocities.iter().enumerate() {
        let row = 3 * tag;
        rhs[(row, 0)] = rhs[(row, 0)] * half_dt_sq + dt * v.x;
        rhs[(row + 1, 0)] = rhs[(row + 1, 0)] * half_dt_sq + dt * v.y;
        rhs[(row + 2, 0)] = rhs[(row + 2, 0)] * half_dt_sq + dt * v.z;
    }
    rhs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairs::PairInteraction;

    fn table() -> CoefficientTable {
        let mut table = CoefficientTable::new(1, 1.0);
        table.set_pair(0, 0, 25.0, 4.5, 1.0).unwrap();
        table
    }

    fn list_with_noise(noise: f64) -> InteractionList {
        let mut list = InteractionList::new(2);
        list.push(PairInteraction {
            tag_i: 0,
            tag_j: 1,
            type_i: 0,
            type_j: 0,
            delta: DVec3::new(0.5, 0.0, 0.0),
            scale: 1.0,
            noise,
            reaction: true,
        });
        list
    }

    #[test]
    fn conservative_force_matches_closed_form() {
        let table = table();
        let list = list_with_noise(0.0);
        let forces = pairwise_forces(&list, &table, 0.04);

        // w = 0.5, magnitude = a0·w = 12.5, directed along +x on particle 0.
        assert!((forces[(0, 0)] - 12.5).abs() < 1e-12);
        assert!((forces[(3, 0)] + 12.5).abs() < 1e-12);
        for row in [1, 2, 4, 5] {
            assert_eq!(forces[(row, 0)], 0.0);
        }
    }

    #[test]
    fn random_force_scales_with_inverse_sqrt_dt() {
        let table = table();
        let list = list_with_noise(1.0);
        let dt = 0.04;
        let forces = pairwise_forces(&list, &table, dt);

        let w = 0.5;
        let sigma = table.get(0, 0).sigma;
        let expected = 25.0 * w + sigma * w / dt.sqrt();
        assert!((forces[(0, 0)] - expected).abs() < 1e-12);
    }

    #[test]
    fn rhs_combines_forces_and_velocities() {
        let table = table();
        let list = list_with_noise(0.0);
        let dt = 0.04;
        let velocities = [DVec3::new(0.0, 2.0, 0.0), DVec3::new(1.0, 0.0, -1.0)];
        let rhs = timestep_rhs(&list, &table, &velocities, dt);

        let half_dt_sq = dt * dt / 2.0;
        assert!((rhs[(0, 0)] - 12.5 * half_dt_sq).abs() < 1e-12);
        // Each velocity component enters its own row.
        assert!((rhs[(1, 0)] - dt * 2.0).abs() < 1e-15);
        assert!((rhs[(3, 0)] - (-12.5 * half_dt_sq + dt)).abs() < 1e-12);
        assert!((rhs[(5, 0)] + dt).abs() < 1e-15);
    }
}
