//! Vector algebra capability consumed by the Krylov solvers.
//!
//! Solvers never touch vector storage directly: every dot product, update and
//! norm goes through a [`VectorSpace`]. This keeps the recurrences independent
//! of how (or where) the vectors live, so a distributed or GPU-backed vector
//! type only has to provide this trait.

use crate::core::{
    error::{KrylovError, Result},
    types::{DVector, Scalar},
};
use num_traits::Float;
use std::fmt::Debug;
use std::marker::PhantomData;

/// Vector norms available from a [`VectorSpace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NormKind {
    /// Euclidean norm `sqrt(sum x_i^2)`
    Two,
    /// Maximum absolute entry
    Infinity,
}

/// Operations on the vector type of a linear problem.
///
/// All operations are fallible so that implementations can report
/// incommensurate vectors instead of panicking.
pub trait VectorSpace<T>: Debug
where
    T: Scalar,
{
    /// The vector type of this space.
    type Vector: Clone + Debug;

    /// Number of entries of `x`.
    fn dimension(&self, x: &Self::Vector) -> usize;

    /// Allocates a zero vector commensurate with `x`.
    fn zeros_like(&self, x: &Self::Vector) -> Self::Vector;

    /// Copies `src` into `dst`.
    fn copy(&self, src: &Self::Vector, dst: &mut Self::Vector) -> Result<()>;

    /// Sets every entry of `x` to zero.
    fn set_zero(&self, x: &mut Self::Vector);

    /// Computes `x^T y`.
    fn dot(&self, x: &Self::Vector, y: &Self::Vector) -> Result<T>;

    /// Computes `y = y + alpha * x`.
    fn axpy(&self, alpha: T, x: &Self::Vector, y: &mut Self::Vector) -> Result<()>;

    /// Computes `y = x + alpha * y`.
    fn aypx(&self, alpha: T, x: &Self::Vector, y: &mut Self::Vector) -> Result<()>;

    /// Computes `y = alpha * x + beta * y`.
    fn axpby(&self, alpha: T, x: &Self::Vector, beta: T, y: &mut Self::Vector) -> Result<()>;

    /// Computes the requested norm of `x`.
    fn norm(&self, x: &Self::Vector, kind: NormKind) -> Result<T>;
}

/// The Euclidean space of dense nalgebra vectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanSpace<T> {
    _phantom: PhantomData<T>,
}

impl<T: Scalar> EuclideanSpace<T> {
    /// Creates the Euclidean vector space.
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }

    fn check_same_len(x: &DVector<T>, y: &DVector<T>) -> Result<()> {
        if x.len() != y.len() {
            return Err(KrylovError::dimension_mismatch(x.len(), y.len()));
        }
        Ok(())
    }
}

impl<T: Scalar> VectorSpace<T> for EuclideanSpace<T> {
    type Vector = DVector<T>;

    fn dimension(&self, x: &DVector<T>) -> usize {
        x.len()
    }

    fn zeros_like(&self, x: &DVector<T>) -> DVector<T> {
        DVector::zeros(x.len())
    }

    fn copy(&self, src: &DVector<T>, dst: &mut DVector<T>) -> Result<()> {
        Self::check_same_len(src, dst)?;
        dst.copy_from(src);
        Ok(())
    }

    fn set_zero(&self, x: &mut DVector<T>) {
        x.fill(T::zero());
    }

    fn dot(&self, x: &DVector<T>, y: &DVector<T>) -> Result<T> {
        Self::check_same_len(x, y)?;
        Ok(x.dot(y))
    }

    fn axpy(&self, alpha: T, x: &DVector<T>, y: &mut DVector<T>) -> Result<()> {
        Self::check_same_len(x, y)?;
        y.axpy(alpha, x, T::one());
        Ok(())
    }

    fn aypx(&self, alpha: T, x: &DVector<T>, y: &mut DVector<T>) -> Result<()> {
        Self::check_same_len(x, y)?;
        y.axpy(T::one(), x, alpha);
        Ok(())
    }

    fn axpby(&self, alpha: T, x: &DVector<T>, beta: T, y: &mut DVector<T>) -> Result<()> {
        Self::check_same_len(x, y)?;
        y.axpy(alpha, x, beta);
        Ok(())
    }

    fn norm(&self, x: &DVector<T>, kind: NormKind) -> Result<T> {
        let value = match kind {
            NormKind::Two => <T as Float>::sqrt(x.dot(x)),
            NormKind::Infinity => {
                let mut max = T::zero();
                for &xi in x.iter() {
                    if <T as Float>::is_nan(xi) {
                        return Ok(xi);
                    }
                    max = <T as Float>::max(max, <T as Float>::abs(xi));
                }
                max
            }
        };
        Ok(value)
    }
}
