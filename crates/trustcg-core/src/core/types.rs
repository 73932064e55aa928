//! Type definitions and aliases for trust-region Krylov solvers.
//!
//! This module provides the scalar trait shared by every solver component,
//! the nalgebra aliases used by the Euclidean implementations, and default
//! numerical constants.

use nalgebra::{Dyn, OMatrix, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used by the solvers (f32 or f64).
///
/// This trait combines all the numeric traits required by the Krylov
/// recurrences and the convergence tests.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Default relative residual tolerance.
    const DEFAULT_RTOL: Self;

    /// Default absolute residual tolerance.
    const DEFAULT_ATOL: Self;

    /// Default divergence tolerance (relative growth of the residual).
    const DEFAULT_DTOL: Self;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails. Use `try_from_f64` for a non-panicking version.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Try to convert from f64.
    ///
    /// Returns None if the conversion fails.
    fn try_from_f64(v: f64) -> Option<Self> {
        <Self as FromPrimitive>::from_f64(v)
    }

    /// Convert to f64 (for logging/display).
    ///
    /// Non-representable values map to NaN.
    fn to_f64(self) -> f64 {
        num_traits::cast(self).unwrap_or(f64::NAN)
    }

    /// Convert from usize (for iteration counts).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_usize(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).expect("Failed to convert from usize")
    }

    /// Returns true if the value is NaN or infinite.
    fn is_nan_or_inf(self) -> bool {
        !<Self as Float>::is_finite(self)
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const DEFAULT_RTOL: Self = 1e-5;
    const DEFAULT_ATOL: Self = 1e-30;
    const DEFAULT_DTOL: Self = 1e5;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const DEFAULT_RTOL: Self = 1e-5;
    const DEFAULT_ATOL: Self = 1e-50;
    const DEFAULT_DTOL: Self = 1e5;
}

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = OVector<T, Dyn>;

/// Numerical constants for different precision levels.
pub mod constants {
    use super::Scalar;

    /// Get machine epsilon for the given scalar type.
    pub fn epsilon<T: Scalar>() -> T {
        T::EPSILON
    }

    /// Get the default relative tolerance.
    pub fn relative_tolerance<T: Scalar>() -> T {
        T::DEFAULT_RTOL
    }

    /// Get the default absolute tolerance.
    pub fn absolute_tolerance<T: Scalar>() -> T {
        T::DEFAULT_ATOL
    }

    /// Get the default divergence tolerance.
    pub fn divergence_tolerance<T: Scalar>() -> T {
        T::DEFAULT_DTOL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_constants() {
        assert_eq!(<f64 as Scalar>::EPSILON, f64::EPSILON);
        assert_eq!(constants::relative_tolerance::<f64>(), 1e-5);
        assert_eq!(constants::divergence_tolerance::<f32>(), 1e5);
        assert!(constants::absolute_tolerance::<f32>() > 0.0);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(<f64 as Scalar>::from_f64(0.5), 0.5);
        assert_eq!(<f32 as Scalar>::from_usize(3), 3.0);
        assert_eq!(Scalar::to_f64(2.5_f32), 2.5);
        assert!(<f64 as Scalar>::try_from_f64(1.0).is_some());
    }

    #[test]
    fn test_nan_or_inf() {
        assert!(Scalar::is_nan_or_inf(f64::NAN));
        assert!(Scalar::is_nan_or_inf(f64::INFINITY));
        assert!(Scalar::is_nan_or_inf(f32::NEG_INFINITY));
        assert!(!Scalar::is_nan_or_inf(1.0_f64));
    }
}
