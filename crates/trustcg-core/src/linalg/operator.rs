//! Linear operator capability.
//!
//! The solvers only need the action `y = H x` of the (approximate) Hessian.
//! Dense matrices, diagonal matrices and matrix-free closures all provide it.

use crate::core::{
    error::{KrylovError, Result},
    types::{DMatrix, DVector, Scalar},
};
use std::fmt::Debug;

/// Applies a linear operator `H` to a vector.
///
/// The operator may be symmetric positive definite, semidefinite or
/// indefinite. Implementations write the product into `y`, which is
/// commensurate with `x`.
pub trait LinearOperator<V>: Debug {
    /// Computes `y = H x`.
    fn apply(&self, x: &V, y: &mut V) -> Result<()>;

    /// Returns the name of this operator.
    fn name(&self) -> &str {
        "Generic Operator"
    }
}

impl<T: Scalar> LinearOperator<DVector<T>> for DMatrix<T> {
    fn apply(&self, x: &DVector<T>, y: &mut DVector<T>) -> Result<()> {
        if self.ncols() != x.len() || self.nrows() != y.len() {
            return Err(KrylovError::dimension_mismatch(
                format!("{}x{}", self.nrows(), self.ncols()),
                format!("x: {}, y: {}", x.len(), y.len()),
            ));
        }
        y.gemv(T::one(), self, x, T::zero());
        Ok(())
    }

    fn name(&self) -> &str {
        "Dense Matrix"
    }
}

/// Diagonal operator `H = diag(d)`.
#[derive(Debug, Clone)]
pub struct DiagonalOperator<T: Scalar> {
    diagonal: DVector<T>,
}

impl<T: Scalar> DiagonalOperator<T> {
    /// Creates a diagonal operator from its diagonal entries.
    pub fn new(diagonal: DVector<T>) -> Self {
        Self { diagonal }
    }

    /// Creates a diagonal operator from a slice of entries.
    pub fn from_slice(diagonal: &[T]) -> Self {
        Self::new(DVector::from_column_slice(diagonal))
    }

    /// Returns the diagonal entries.
    pub fn diagonal(&self) -> &DVector<T> {
        &self.diagonal
    }
}

impl<T: Scalar> LinearOperator<DVector<T>> for DiagonalOperator<T> {
    fn apply(&self, x: &DVector<T>, y: &mut DVector<T>) -> Result<()> {
        if x.len() != self.diagonal.len() || y.len() != self.diagonal.len() {
            return Err(KrylovError::dimension_mismatch(
                self.diagonal.len(),
                format!("x: {}, y: {}", x.len(), y.len()),
            ));
        }
        for ((yi, &di), &xi) in y.iter_mut().zip(self.diagonal.iter()).zip(x.iter()) {
            *yi = di * xi;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Diagonal"
    }
}

/// Matrix-free operator defined by a closure.
///
/// The closure receives `x` and writes `H x` into its second argument.
pub struct FnOperator<F> {
    apply_fn: F,
}

impl<F> FnOperator<F> {
    /// Wraps a closure as a linear operator.
    pub fn new(apply_fn: F) -> Self {
        Self { apply_fn }
    }
}

impl<F> Debug for FnOperator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnOperator")
            .field("apply_fn", &"<closure>")
            .finish()
    }
}

impl<V, F> LinearOperator<V> for FnOperator<F>
where
    F: Fn(&V, &mut V) -> Result<()>,
{
    fn apply(&self, x: &V, y: &mut V) -> Result<()> {
        (self.apply_fn)(x, y)
    }

    fn name(&self) -> &str {
        "Matrix-free"
    }
}
