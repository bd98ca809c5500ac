//! Supporting utilities for the solver and the experiment binaries.
//!
//! - **`perf`**: cumulative timing counters for the two hot phases of a solve
//!   (operator applications and projected resolves), plus a Linux peak-RSS
//!   probe used by the experiment runners.
//!
//! - **`sampling`**: seeded synthetic DPD fluids (uniform box positions,
//!   thermal velocities, and an all-pairs-within-cutoff enumeration) so the
//!   binaries and the integration tests can exercise the operator and solver
//!   without a host simulation attached.

pub mod perf;
pub mod sampling;
