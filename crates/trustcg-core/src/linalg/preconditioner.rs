//! Preconditioning capability for Krylov solvers.
//!
//! A preconditioner applies an approximate inverse `M^{-1}` of a symmetric
//! positive (semi)definite matrix. Solvers detect indefinite or non-finite
//! preconditioners on the fly, so implementations are not required to verify
//! definiteness themselves.

use crate::core::{
    error::{KrylovError, Result},
    types::{DMatrix, DVector, Scalar},
};
use std::fmt::Debug;

/// Preconditioner trait: `z = M^{-1} r`.
pub trait Preconditioner<V>: Debug {
    /// Applies the preconditioner to `r`, writing the result into `z`.
    fn apply(&self, r: &V, z: &mut V) -> Result<()>;

    /// Returns the name of this preconditioner.
    fn name(&self) -> &str {
        "Generic Preconditioner"
    }
}

/// Identity preconditioner (no preconditioning).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPreconditioner;

impl<T: Scalar> Preconditioner<DVector<T>> for IdentityPreconditioner {
    fn apply(&self, r: &DVector<T>, z: &mut DVector<T>) -> Result<()> {
        if r.len() != z.len() {
            return Err(KrylovError::dimension_mismatch(r.len(), z.len()));
        }
        z.copy_from(r);
        Ok(())
    }

    fn name(&self) -> &str {
        "Identity"
    }
}

/// Jacobi (diagonal) preconditioner.
///
/// Stores the inverse of the operator diagonal and scales each residual
/// component by it.
#[derive(Debug, Clone)]
pub struct JacobiPreconditioner<T: Scalar> {
    inverse_diagonal: DVector<T>,
}

impl<T: Scalar> JacobiPreconditioner<T> {
    /// Creates a Jacobi preconditioner from the operator diagonal.
    ///
    /// Returns `InvalidArgument` if any diagonal entry is zero or not finite.
    pub fn from_diagonal(diagonal: &DVector<T>) -> Result<Self> {
        let mut inverse_diagonal = diagonal.clone();
        for (i, d) in inverse_diagonal.iter_mut().enumerate() {
            if *d == T::zero() || Scalar::is_nan_or_inf(*d) {
                return Err(KrylovError::invalid_argument(
                    format!("diagonal[{}]", i),
                    *d,
                    "Jacobi preconditioner requires finite nonzero diagonal entries",
                ));
            }
            *d = T::one() / *d;
        }
        Ok(Self { inverse_diagonal })
    }

    /// Creates a Jacobi preconditioner from the diagonal of a dense matrix.
    pub fn from_matrix(matrix: &DMatrix<T>) -> Result<Self> {
        if !matrix.is_square() {
            return Err(KrylovError::dimension_mismatch(
                "square matrix",
                format!("{}x{}", matrix.nrows(), matrix.ncols()),
            ));
        }
        Self::from_diagonal(&matrix.diagonal())
    }

    /// Returns the stored inverse diagonal.
    pub fn inverse_diagonal(&self) -> &DVector<T> {
        &self.inverse_diagonal
    }
}

impl<T: Scalar> Preconditioner<DVector<T>> for JacobiPreconditioner<T> {
    fn apply(&self, r: &DVector<T>, z: &mut DVector<T>) -> Result<()> {
        let n = self.inverse_diagonal.len();
        if r.len() != n || z.len() != n {
            return Err(KrylovError::dimension_mismatch(
                n,
                format!("r: {}, z: {}", r.len(), z.len()),
            ));
        }
        for ((zi, &ri), &di) in z.iter_mut().zip(r.iter()).zip(self.inverse_diagonal.iter()) {
            *zi = di * ri;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Jacobi"
    }
}

/// Preconditioner defined by a closure writing `M^{-1} r` into `z`.
pub struct FnPreconditioner<F> {
    apply_fn: F,
}

impl<F> FnPreconditioner<F> {
    /// Wraps a closure as a preconditioner.
    pub fn new(apply_fn: F) -> Self {
        Self { apply_fn }
    }
}

impl<F> Debug for FnPreconditioner<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnPreconditioner")
            .field("apply_fn", &"<closure>")
            .finish()
    }
}

impl<V, F> Preconditioner<V> for FnPreconditioner<F>
where
    F: Fn(&V, &mut V) -> Result<()>,
{
    fn apply(&self, r: &V, z: &mut V) -> Result<()> {
        (self.apply_fn)(r, z)
    }

    fn name(&self) -> &str {
        "User-defined"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_preconditioner() -> Result<()> {
        let r = DVector::from_vec(vec![1.0, -2.0, 3.0]);
        let mut z = DVector::zeros(3);

        IdentityPreconditioner.apply(&r, &mut z)?;
        assert_eq!(z, r);
        assert_eq!(
            Preconditioner::<DVector<f64>>::name(&IdentityPreconditioner),
            "Identity"
        );
        Ok(())
    }

    #[test]
    fn test_jacobi_preconditioner() -> Result<()> {
        let matrix = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 2.0]);
        let pc = JacobiPreconditioner::from_matrix(&matrix)?;
        assert_eq!(pc.inverse_diagonal(), &DVector::from_vec(vec![0.25, 0.5]));

        let r = DVector::from_vec(vec![2.0, 2.0]);
        let mut z = DVector::zeros(2);
        pc.apply(&r, &mut z)?;
        assert_eq!(z, DVector::from_vec(vec![0.5, 1.0]));
        Ok(())
    }

    #[test]
    fn test_jacobi_rejects_zero_diagonal() {
        let diagonal = DVector::from_vec(vec![1.0, 0.0]);
        let err = JacobiPreconditioner::from_diagonal(&diagonal).unwrap_err();
        assert!(matches!(err, KrylovError::InvalidArgument { .. }));
        assert!(err.to_string().contains("diagonal[1]"));
    }

    #[test]
    fn test_jacobi_rejects_rectangular_matrix() {
        let matrix = DMatrix::<f64>::zeros(2, 3);
        assert!(JacobiPreconditioner::from_matrix(&matrix).is_err());
    }

    #[test]
    fn test_fn_preconditioner() -> Result<()> {
        let negate = FnPreconditioner::new(|r: &DVector<f64>, z: &mut DVector<f64>| {
            z.copy_from(&(-r));
            Ok(())
        });
        let r = DVector::from_vec(vec![1.0, 2.0]);
        let mut z = DVector::zeros(2);

        negate.apply(&r, &mut z)?;
        assert_eq!(z, DVector::from_vec(vec![-1.0, -2.0]));
        Ok(())
    }
}
