//! Timing counters and memory measurement.
//!
//! The counters break a run's cost into its two hot phases, matrix-vector
//! products versus the small projected solves. They live on the solver value
//! rather than in globals, so concurrent solvers do not share state and a
//! host can reset them between phases.

use std::time::Duration;

/// Cumulative cost breakdown across the lifetime of one [`KrylovSolver`]
/// value.
///
/// [`KrylovSolver`]: crate::solver::KrylovSolver
#[derive(Debug, Clone, Default)]
pub struct PerfCounters {
    /// Total wall time spent inside operator applications.
    pub time_operator: Duration,
    /// Total wall time spent assembling and solving projected systems.
    pub time_projection: Duration,
    /// Number of operator applications.
    pub applies: u64,
    /// Number of completed inverse-action calls.
    pub solves: u64,
}

/// Reads the peak resident set size (VmPeak) of this process, in kilobytes.
///
/// Linux-only; the experiment runners use it to report the memory cost of
/// storing the Krylov basis at different system sizes. Returns 0 when the
/// value cannot be read.
#[cfg(target_os = "linux")]
pub fn peak_rss_kb() -> u64 {
    let Ok(status) = std::fs::read_to_string("/proc/self/status") else {
        return 0;
    };
    status
        .lines()
        .find_map(|line| line.strip_prefix("VmPeak:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// Fallback for non-Linux platforms: warns once and reports 0.
#[cfg(not(target_os = "linux"))]
pub fn peak_rss_kb() -> u64 {
    use std::sync::Once;
    static WARN_ONCE: Once = Once::new();
    WARN_ONCE.call_once(|| {
        log::warn!("peak RSS measurement is only supported on Linux; reporting 0");
    });
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_counters_are_zero() {
        let counters = PerfCounters::default();
        assert_eq!(counters.applies, 0);
        assert_eq!(counters.solves, 0);
        assert_eq!(counters.time_operator, Duration::ZERO);
        assert_eq!(counters.time_projection, Duration::ZERO);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn peak_rss_is_positive_on_linux() {
        assert!(peak_rss_kb() > 0);
    }
}
