//! Error types for the thermostat core.
//!
//! The numerical kernels themselves are deliberately error-free: degenerate
//! geometry is skipped pair-by-pair and Lanczos breakdown is an early-exit
//! condition, not a failure. What remains are configuration mistakes that
//! should be caught before any solve runs, plus the one pathological case
//! where the projected system never yields a finite iterate.
//!
//! The public type is an opaque [`ThermostatError`] wrapping a private kind
//! enum, built with [`thiserror`]. This keeps the set of failure modes an
//! internal detail while callers still get precise `Display` messages.

use thiserror::Error;

/// An error produced while configuring or driving the implicit solve.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct ThermostatError(#[from] ThermostatErrorKind);

/// Private enum containing the distinct kinds of errors.
#[derive(Error, Debug, PartialEq)]
pub(crate) enum ThermostatErrorKind {
    /// A solver configuration value was rejected before the first iteration.
    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),

    /// The right-hand side does not match the operator's particle count.
    #[error(
        "Dimension mismatch: operator acts on {operator_rows} rows but the right-hand side has {vector_rows}."
    )]
    DimensionMismatch {
        operator_rows: usize,
        vector_rows: usize,
    },

    /// A per-type-pair coefficient was out of its physical range.
    #[error("Coefficient out of range for type pair ({i}, {j}): {reason}")]
    CoefficientRange { i: usize, j: usize, reason: String },

    /// Every projected tridiagonal solve produced non-finite values, so no
    /// iterate could be returned. This indicates a pathological friction
    /// configuration rather than an expected numerical edge case.
    #[error("The projected tridiagonal system is singular: no finite Lanczos iterate was produced.")]
    ProjectionSingular,
}

// Compare through the inner kind, mirroring its derived `PartialEq`.
impl PartialEq for ThermostatError {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_message() {
        let error = ThermostatError(ThermostatErrorKind::InvalidConfig(
            "max_subspace must be at least 1".to_string(),
        ));
        assert_eq!(
            error.to_string(),
            "Invalid solver configuration: max_subspace must be at least 1"
        );
    }

    #[test]
    fn dimension_mismatch_message() {
        let error = ThermostatError(ThermostatErrorKind::DimensionMismatch {
            operator_rows: 300,
            vector_rows: 297,
        });
        assert_eq!(
            error.to_string(),
            "Dimension mismatch: operator acts on 300 rows but the right-hand side has 297."
        );
    }

    #[test]
    fn coefficient_range_message() {
        let error = ThermostatError(ThermostatErrorKind::CoefficientRange {
            i: 0,
            j: 1,
            reason: "cutoff must be positive".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "Coefficient out of range for type pair (0, 1): cutoff must be positive"
        );
    }

    #[test]
    fn projection_singular_message() {
        let error = ThermostatError(ThermostatErrorKind::ProjectionSingular);
        assert_eq!(
            error.to_string(),
            "The projected tridiagonal system is singular: no finite Lanczos iterate was produced."
        );
    }
}
