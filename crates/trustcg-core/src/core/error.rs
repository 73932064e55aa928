//! Error types for trust-region Krylov solvers.
//!
//! Only precondition violations and collaborator failures are reported as
//! errors. Numerical degeneracy discovered while iterating (indefinite
//! operators, bad preconditioners, breakdown) is reported through the
//! solver's termination reason instead.

use thiserror::Error;

/// Errors that can occur while configuring or running a solver.
#[derive(Debug, Clone, Error)]
pub enum KrylovError {
    /// A configuration parameter is outside its admissible range.
    #[error("Invalid argument `{parameter}` = {value}: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter
        parameter: String,
        /// Value that was rejected
        value: String,
        /// Description of the admissible range
        reason: String,
    },

    /// The right-hand side contains NaN or infinite entries.
    ///
    /// Detected once, before the first iteration, from `rhs^T rhs`.
    #[error("Right-hand side is not finite: r^T r = {value}")]
    NonFiniteRightHandSide {
        /// The offending dot product
        value: f64,
    },

    /// Dimension mismatch between vectors or operators.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// An operator, preconditioner or vector collaborator failed.
    #[error("Operator failure: {reason}")]
    OperatorFailure {
        /// Description of the failure
        reason: String,
    },

    /// Numerical instability detected outside the solver recurrences.
    #[error("Numerical instability detected: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },
}

impl KrylovError {
    /// Create an InvalidArgument error.
    pub fn invalid_argument<S1, S2, S3>(parameter: S1, value: S2, reason: S3) -> Self
    where
        S1: Into<String>,
        S2: std::fmt::Display,
        S3: Into<String>,
    {
        Self::InvalidArgument {
            parameter: parameter.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a NonFiniteRightHandSide error.
    pub fn non_finite_rhs(value: f64) -> Self {
        Self::NonFiniteRightHandSide { value }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an OperatorFailure error.
    pub fn operator_failure<S: Into<String>>(reason: S) -> Self {
        Self::OperatorFailure {
            reason: reason.into(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Returns true for errors caused by invalid configuration or input.
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::NonFiniteRightHandSide { .. }
        )
    }
}

/// Result type alias for solver operations.
pub type Result<T> = std::result::Result<T, KrylovError>;
