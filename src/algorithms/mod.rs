//! Building blocks of the symmetric Lanczos process.
//!
//! The solver in [`crate::solver`] drives the three-term recurrence
//! implemented in [`lanczos`] and consumes the scalar by-products defined
//! here: the `alpha`/`beta` sequences that determine the projected
//! tridiagonal matrix `T_k`, and the helper that assembles `T_k` explicitly
//! for the per-iteration direct resolve. `T_k` never grows past the
//! configured subspace cap, so the assembly and factorization stay cheap even
//! though they run every iteration.

pub mod lanczos;

use faer::Mat;

/// Off-diagonal coefficients at or below this magnitude are treated as exact
/// breakdown: the Krylov subspace has become invariant under the operator and
/// the next basis vector would be a normalized zero vector.
pub(crate) const BREAKDOWN_TOLERANCE: f64 = 1.0e-12;

/// The scalar result of a completed Lanczos pass.
///
/// `alphas` and `betas` are the diagonal and off-diagonal of the symmetric
/// tridiagonal projection of the operator onto the Krylov subspace:
///
/// ```text
///     T_k = | α_1 β_1  0  ... |
///           | β_1 α_2 β_2 ... |
///           |  0  β_2 α_3 ... |
///           | ... ... ... ... |
/// ```
#[derive(Debug, Clone)]
pub struct LanczosDecomposition {
    /// Diagonal entries of `T_k`, one per completed step.
    pub alphas: Vec<f64>,
    /// Off-diagonal entries of `T_k`; always one shorter than `alphas`.
    pub betas: Vec<f64>,
    /// Number of steps actually taken before the budget or breakdown ended
    /// the recurrence.
    pub steps_taken: usize,
    /// Norm of the starting vector, needed to scale the projected solution
    /// back to the original right-hand side.
    pub b_norm: f64,
}

/// Assembles the dense `k × k` symmetric tridiagonal matrix from the Lanczos
/// coefficients. `k` is bounded by the subspace cap, so a dense matrix is the
/// right representation for the direct solve that follows.
pub fn assemble_tridiagonal(alphas: &[f64], betas: &[f64]) -> Mat<f64> {
    let steps = alphas.len();
    if steps == 0 {
        return Mat::zeros(0, 0);
    }
    let mut t_k = Mat::zeros(steps, steps);
    for (i, &alpha) in alphas.iter().enumerate() {
        t_k[(i, i)] = alpha;
    }
    for (i, &beta) in betas.iter().enumerate().take(steps - 1) {
        t_k[(i, i + 1)] = beta;
        t_k[(i + 1, i)] = beta;
    }
    t_k
}

/// Real inner product of two column vectors.
#[inline]
pub(crate) fn dot(a: faer::MatRef<'_, f64>, b: faer::MatRef<'_, f64>) -> f64 {
    debug_assert_eq!(a.nrows(), b.nrows());
    (a.transpose() * b)[(0, 0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tridiagonal_assembly_places_coefficients() {
        let t = assemble_tridiagonal(&[2.0, 3.0, 4.0], &[0.5, 0.25]);
        assert_eq!(t.nrows(), 3);
        assert_eq!(t[(0, 0)], 2.0);
        assert_eq!(t[(1, 1)], 3.0);
        assert_eq!(t[(2, 2)], 4.0);
        assert_eq!(t[(0, 1)], 0.5);
        assert_eq!(t[(1, 0)], 0.5);
        assert_eq!(t[(1, 2)], 0.25);
        assert_eq!(t[(2, 1)], 0.25);
        assert_eq!(t[(0, 2)], 0.0);
    }

    #[test]
    fn empty_coefficients_give_an_empty_matrix() {
        let t = assemble_tridiagonal(&[], &[]);
        assert_eq!(t.nrows(), 0);
        assert_eq!(t.ncols(), 0);
    }

    #[test]
    fn dot_is_the_real_inner_product() {
        let a = Mat::from_fn(3, 1, |i, _| (i + 1) as f64);
        let b = Mat::from_fn(3, 1, |i, _| 2.0 * (i as f64) - 1.0);
        // 1·(−1) + 2·1 + 3·3 = 10
        assert!((dot(a.as_ref(), b.as_ref()) - 10.0).abs() < 1e-15);
    }
}
