//! Seeded synthetic DPD fluids for the experiment binaries and tests.
//!
//! Production neighbor search, ghost exchange, and RNG streams belong to the
//! host simulation; what lives here is the minimum needed to exercise the
//! operator and solver standalone: uniformly random positions in a cubic box,
//! thermal (Gaussian) velocities, and a quadratic-time enumeration of all
//! pairs within the cutoff. Fixed seeds keep every experiment and test
//! deterministic.
//!
//! Coefficient defaults follow the common reduced-unit DPD parameterization
//! (`a0 = 25`, `gamma = 4.5`, `r_c = 1`, `k_B T = 1`).

use glam::DVec3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::{
    coefficients::CoefficientTable,
    pairs::{InteractionList, PairInteraction},
};

/// A self-contained synthetic system: positions, velocities, and the frozen
/// pair list for one timestep.
#[derive(Debug, Clone)]
pub struct SampleFluid {
    pub positions: Vec<DVec3>,
    pub velocities: Vec<DVec3>,
    pub pairs: InteractionList,
}

/// Builds a single-type coefficient table with the standard reduced-unit
/// parameters and the given cutoff.
pub fn reference_table(cutoff: f64) -> CoefficientTable {
    let mut table = CoefficientTable::new(1, 1.0);
    table
        .set_pair(0, 0, 25.0, 4.5, cutoff)
        .expect("reference coefficients are in range");
    table
}

/// Generates `n` particles uniformly in a cube of side `box_len`, with unit
/// thermal velocities, and enumerates every pair within `cutoff`.
///
/// All pairs carry scale 1, a fresh standard-normal noise draw, and the
/// reaction flag set: a single-process system owns every pair it sees.
pub fn sample_fluid(n: usize, box_len: f64, cutoff: f64, seed: u64) -> SampleFluid {
    let mut rng = StdRng::seed_from_u64(seed);

    let positions: Vec<DVec3> = (0..n)
        .map(|_| {
            DVec3::new(
                rng.random::<f64>() * box_len,
                rng.random::<f64>() * box_len,
                rng.random::<f64>() * box_len,
            )
        })
        .collect();

    let velocities: Vec<DVec3> = (0..n)
        .map(|_| {
            DVec3::new(
                rng.sample(StandardNormal),
                rng.sample(StandardNormal),
                rng.sample(StandardNormal),
            )
        })
        .collect();

    let pairs = all_pairs_within(&positions, cutoff, &mut rng);

    SampleFluid {
        positions,
        velocities,
        pairs,
    }
}

/// Reference all-pairs enumeration: every unordered pair with separation
/// strictly below `cutoff`, each with its own frozen noise draw.
///
/// Quadratic in the particle count, which is fine at experiment scale; a real
/// host brings its own cell or Verlet list.
pub fn all_pairs_within(
    positions: &[DVec3],
    cutoff: f64,
    rng: &mut impl Rng,
) -> InteractionList {
    let mut list = InteractionList::new(positions.len());
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let delta = positions[i] - positions[j];
            if delta.length() < cutoff {
                list.push(PairInteraction {
                    tag_i: i,
                    tag_j: j,
                    type_i: 0,
                    type_j: 0,
                    delta,
                    scale: 1.0,
                    noise: rng.sample(StandardNormal),
                    reaction: true,
                });
            }
        }
    }
    list
}
