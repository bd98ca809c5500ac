//! The matrix-free linear-operator seam between the pair operator and the
//! Krylov solver.
//!
//! The Lanczos process never needs matrix elements, only the action of the
//! matrix on a vector. Formalizing that action as a trait keeps the solver
//! decoupled from where the operator comes from: in production it is the
//! [`ImplicitFrictionOperator`](crate::operator::ImplicitFrictionOperator),
//! whose matrix is implicitly defined by the live neighbor list and would be
//! far too large (and too short-lived) to assemble; in tests it is a small
//! explicit [`faer::Mat`] whose inverse action can be computed directly for
//! comparison.
//!
//! The trait is specialized to `f64`: every quantity in the friction model is
//! a double-precision real, and the solver relies on the operator being
//! self-adjoint in the ordinary real inner product.

use faer::{prelude::Reborrow, Mat, MatMut, MatRef};

/// A real linear operator defined by its action on a vector.
///
/// Implementations must be *linear* and, for use with the Lanczos solver,
/// *symmetric*: `dot(A·a, b) == dot(a, A·b)` for all `a`, `b`. The solver has
/// no way to verify this; a non-symmetric operator silently degrades the
/// three-term recurrence.
pub trait LinearOperator {
    /// Number of rows of the operator.
    fn nrows(&self) -> usize;

    /// Number of columns of the operator.
    fn ncols(&self) -> usize;

    /// Applies the operator to the column vector `rhs`, returning `A · rhs`.
    ///
    /// # Panics
    ///
    /// Implementations panic when `rhs` has the wrong number of rows; the
    /// solver validates dimensions before its first application.
    fn apply(&self, rhs: MatRef<'_, f64>) -> Mat<f64>;
}

/// Dense-matrix view as an operator. This is the implementation the solver is
/// validated against: a small explicit symmetric matrix whose inverse action
/// is available through a direct factorization.
impl LinearOperator for MatRef<'_, f64> {
    #[inline]
    fn nrows(&self) -> usize {
        MatRef::nrows(self)
    }

    #[inline]
    fn ncols(&self) -> usize {
        MatRef::ncols(self)
    }

    #[inline]
    fn apply(&self, rhs: MatRef<'_, f64>) -> Mat<f64> {
        assert_eq!(
            MatRef::ncols(self),
            rhs.nrows(),
            "Dimension mismatch: operator columns ({}) do not match vector rows ({}).",
            MatRef::ncols(self),
            rhs.nrows(),
        );
        self * rhs
    }
}

impl LinearOperator for MatMut<'_, f64> {
    #[inline]
    fn nrows(&self) -> usize {
        self.rb().nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.rb().ncols()
    }

    #[inline]
    fn apply(&self, rhs: MatRef<'_, f64>) -> Mat<f64> {
        self.rb().apply(rhs)
    }
}

impl LinearOperator for Mat<f64> {
    #[inline]
    fn nrows(&self) -> usize {
        self.as_ref().nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.as_ref().ncols()
    }

    #[inline]
    fn apply(&self, rhs: MatRef<'_, f64>) -> Mat<f64> {
        self.as_ref().apply(rhs)
    }
}
