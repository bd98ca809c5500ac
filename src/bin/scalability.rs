//! Experiment runner: cost of the implicit solve as the system grows.
//!
//! Sweeps the particle count at fixed density (the box grows with the cube
//! root of `n`), timing the matrix-free operator application and the full
//! inverse-action solve at each size, and recording the peak resident set
//! size as a proxy for the memory cost of the stored Krylov basis.

use anyhow::Result;
use clap::Parser;
use dpd_implicit::{
    forces::timestep_rhs,
    utils::{
        perf::peak_rss_kb,
        sampling::{reference_table, sample_fluid},
    },
    ImplicitFrictionOperator, KrylovConfig, KrylovSolver, LinearOperator,
};
use serde::Serialize;
use std::{path::PathBuf, time::Instant};

/// Command-line arguments for the scalability experiment.
#[derive(Parser, Debug)]
#[clap(
    name = "scalability-runner",
    about = "Times operator applications and full solves across system sizes."
)]
struct ScalabilityArgs {
    /// Smallest particle count to test.
    #[clap(long, default_value_t = 100)]
    n_min: usize,

    /// Largest particle count to test.
    #[clap(long, default_value_t = 1600)]
    n_max: usize,

    /// Number density used to size the box for each `n`.
    #[clap(long, default_value_t = 3.0)]
    density: f64,

    /// Interaction cutoff.
    #[clap(long, default_value_t = 1.0)]
    cutoff: f64,

    /// Timestep size.
    #[clap(long, default_value_t = 0.02)]
    dt: f64,

    /// Krylov subspace cap.
    #[clap(long, default_value_t = 10)]
    k: usize,

    /// RNG seed.
    #[clap(long, default_value_t = 42)]
    seed: u64,

    /// Repetitions of the bare operator application per size.
    #[clap(long, default_value_t = 50)]
    apply_reps: usize,

    /// Path to the output CSV file.
    #[clap(long, value_name = "PATH")]
    output: PathBuf,
}

/// One row of the scalability sweep.
#[derive(Debug, Serialize)]
struct ScalabilityRecord {
    /// Particle count.
    n: usize,
    /// Interacting pairs at this size.
    pairs: usize,
    /// Mean wall time of one operator application, in microseconds.
    apply_time_us: f64,
    /// Wall time of one full inverse-action solve, in microseconds.
    solve_time_us: u128,
    /// Steps the solve took.
    solve_steps: usize,
    /// Peak resident set size after this run, in kilobytes.
    peak_rss_kb: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    let args = ScalabilityArgs::parse();

    let mut records = Vec::new();
    let mut n = args.n_min;
    while n <= args.n_max {
        // Fixed density: box side grows with the cube root of n.
        let box_len = (n as f64 / args.density).cbrt();
        let fluid = sample_fluid(n, box_len, args.cutoff, args.seed);
        let table = reference_table(args.cutoff);
        let operator = ImplicitFrictionOperator::new(&fluid.pairs, &table, args.dt);
        let rhs = timestep_rhs(&fluid.pairs, &table, &fluid.velocities, args.dt);

        let apply_start = Instant::now();
        for _ in 0..args.apply_reps {
            std::hint::black_box(operator.apply(rhs.as_ref()));
        }
        let apply_time_us =
            apply_start.elapsed().as_micros() as f64 / args.apply_reps.max(1) as f64;

        let mut solver = KrylovSolver::new(KrylovConfig {
            max_subspace: args.k,
            ..KrylovConfig::default()
        })?;
        let solve_start = Instant::now();
        let solution = solver.approximate_inverse_action(&operator, rhs.as_ref())?;
        let solve_time_us = solve_start.elapsed().as_micros();

        records.push(ScalabilityRecord {
            n,
            pairs: fluid.pairs.len(),
            apply_time_us,
            solve_time_us,
            solve_steps: solution.report.steps,
            peak_rss_kb: peak_rss_kb(),
        });
        log::info!(
            "n = {n:>6}: {} pairs, apply {apply_time_us:.1} us, solve {solve_time_us} us",
            fluid.pairs.len(),
        );

        n *= 2;
    }

    let mut writer = csv::Writer::from_path(&args.output)?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    log::info!("wrote {} rows to {}", records.len(), args.output.display());
    Ok(())
}
