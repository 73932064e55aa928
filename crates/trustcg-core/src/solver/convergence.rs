//! Convergence tests for Krylov iterations.
//!
//! A convergence test is invoked once per iteration with the current residual
//! norm and decides whether the iteration continues. The thresholds belong to
//! the test, not to the solver that calls it.

use crate::core::{
    error::{KrylovError, Result},
    types::Scalar,
};
use std::fmt::{self, Debug, Display};

/// Reason a convergence test declared success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvergenceReason {
    /// `||r|| <= rtol * ||r_0||`
    RelativeTolerance,
    /// `||r|| < atol`
    AbsoluteTolerance,
    /// The step became too small relative to the current iterate
    StepTooSmallRelativeToIterate,
}

/// Reason a convergence test declared failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DivergenceReason {
    /// `||r|| >= dtol * ||r_0||`
    DivergenceTolerance,
    /// The residual norm is NaN or infinite
    NanOrInf,
}

/// Outcome of a single convergence test evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvergenceVerdict {
    /// Keep iterating
    Iterating,
    /// Stop: the iteration converged
    Converged(ConvergenceReason),
    /// Stop: the iteration diverged
    Diverged(DivergenceReason),
}

impl ConvergenceVerdict {
    /// Returns true if the verdict asks the solver to stop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Iterating)
    }
}

impl Display for ConvergenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RelativeTolerance => write!(f, "relative tolerance"),
            Self::AbsoluteTolerance => write!(f, "absolute tolerance"),
            Self::StepTooSmallRelativeToIterate => write!(f, "step too small"),
        }
    }
}

impl Display for DivergenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivergenceTolerance => write!(f, "divergence tolerance"),
            Self::NanOrInf => write!(f, "NaN or Inf residual"),
        }
    }
}

/// Pluggable per-iteration convergence predicate.
pub trait ConvergenceTest<T: Scalar>: Debug {
    /// Evaluates the test for `iteration` with the given residual norm.
    ///
    /// Iteration 0 is the initial residual and always precedes the others.
    fn evaluate(&mut self, iteration: usize, residual_norm: T) -> ConvergenceVerdict;
}

/// Residual tolerances used by [`DefaultConvergenceTest`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerances<T> {
    /// Relative tolerance on the initial residual norm
    pub rtol: T,
    /// Absolute tolerance on the residual norm
    pub atol: T,
    /// Divergence tolerance (relative residual growth)
    pub dtol: T,
}

impl<T: Scalar> Default for Tolerances<T> {
    fn default() -> Self {
        Self {
            rtol: T::DEFAULT_RTOL,
            atol: T::DEFAULT_ATOL,
            dtol: T::DEFAULT_DTOL,
        }
    }
}

impl<T: Scalar> Tolerances<T> {
    /// Creates the default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the relative tolerance.
    pub fn with_rtol(mut self, rtol: T) -> Self {
        self.rtol = rtol;
        self
    }

    /// Sets the absolute tolerance.
    pub fn with_atol(mut self, atol: T) -> Self {
        self.atol = atol;
        self
    }

    /// Sets the divergence tolerance.
    pub fn with_dtol(mut self, dtol: T) -> Self {
        self.dtol = dtol;
        self
    }

    /// Checks that every tolerance is a non-negative number.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("rtol", self.rtol), ("atol", self.atol), ("dtol", self.dtol)] {
            if <T as num_traits::Float>::is_nan(value) || value < T::zero() {
                return Err(KrylovError::invalid_argument(
                    name,
                    value,
                    "tolerance must be a non-negative number",
                ));
            }
        }
        Ok(())
    }
}

/// Default residual-based convergence test.
///
/// At iteration 0 the initial residual norm is recorded and the target
/// `max(rtol * ||r_0||, atol)` is fixed; the test never stops at iteration 0.
/// Afterwards a non-finite residual diverges, a residual at or below the
/// target converges, and a residual grown beyond `dtol * ||r_0||` diverges.
#[derive(Debug, Clone)]
pub struct DefaultConvergenceTest<T: Scalar> {
    tolerances: Tolerances<T>,
    initial_residual_norm: T,
    target: T,
}

impl<T: Scalar> DefaultConvergenceTest<T> {
    /// Creates the test after validating the tolerances.
    pub fn new(tolerances: Tolerances<T>) -> Result<Self> {
        tolerances.validate()?;
        Ok(Self {
            tolerances,
            initial_residual_norm: T::zero(),
            target: tolerances.atol,
        })
    }

    /// Returns the configured tolerances.
    pub fn tolerances(&self) -> &Tolerances<T> {
        &self.tolerances
    }

    /// Residual norm recorded at iteration 0 of the current solve.
    pub fn initial_residual_norm(&self) -> T {
        self.initial_residual_norm
    }
}

impl<T: Scalar> Default for DefaultConvergenceTest<T> {
    fn default() -> Self {
        let tolerances = Tolerances::default();
        Self {
            tolerances,
            initial_residual_norm: T::zero(),
            target: tolerances.atol,
        }
    }
}

impl<T: Scalar> ConvergenceTest<T> for DefaultConvergenceTest<T> {
    fn evaluate(&mut self, iteration: usize, residual_norm: T) -> ConvergenceVerdict {
        let Tolerances { rtol, atol, dtol } = self.tolerances;

        if iteration == 0 {
            self.initial_residual_norm = residual_norm;
            self.target = <T as num_traits::Float>::max(rtol * residual_norm, atol);
            return ConvergenceVerdict::Iterating;
        }

        if Scalar::is_nan_or_inf(residual_norm) {
            log::debug!(
                "residual norm is {} at iteration {}, declaring divergence",
                residual_norm,
                iteration
            );
            ConvergenceVerdict::Diverged(DivergenceReason::NanOrInf)
        } else if residual_norm <= self.target {
            if residual_norm < atol {
                log::debug!(
                    "converged: residual norm {:e} below absolute tolerance {:e} at iteration {}",
                    Scalar::to_f64(residual_norm),
                    Scalar::to_f64(atol),
                    iteration
                );
                ConvergenceVerdict::Converged(ConvergenceReason::AbsoluteTolerance)
            } else {
                log::debug!(
                    "converged: residual norm {:e} below {:e} * initial norm {:e} at iteration {}",
                    Scalar::to_f64(residual_norm),
                    Scalar::to_f64(rtol),
                    Scalar::to_f64(self.initial_residual_norm),
                    iteration
                );
                ConvergenceVerdict::Converged(ConvergenceReason::RelativeTolerance)
            }
        } else if residual_norm >= dtol * self.initial_residual_norm {
            log::debug!(
                "diverging: initial norm {:e}, residual norm {:e} at iteration {}",
                Scalar::to_f64(self.initial_residual_norm),
                Scalar::to_f64(residual_norm),
                iteration
            );
            ConvergenceVerdict::Diverged(DivergenceReason::DivergenceTolerance)
        } else {
            ConvergenceVerdict::Iterating
        }
    }
}

/// Convergence test that never stops the iteration.
///
/// Leaves termination to the solver's own logic and iteration cap.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipConvergenceTest;

impl<T: Scalar> ConvergenceTest<T> for SkipConvergenceTest {
    fn evaluate(&mut self, _iteration: usize, _residual_norm: T) -> ConvergenceVerdict {
        ConvergenceVerdict::Iterating
    }
}

/// Convergence test defined by a closure.
pub struct FnConvergenceTest<F> {
    evaluate_fn: F,
}

impl<F> FnConvergenceTest<F> {
    /// Wraps a closure as a convergence test.
    pub fn new(evaluate_fn: F) -> Self {
        Self { evaluate_fn }
    }
}

impl<F> Debug for FnConvergenceTest<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnConvergenceTest")
            .field("evaluate_fn", &"<closure>")
            .finish()
    }
}

impl<T, F> ConvergenceTest<T> for FnConvergenceTest<F>
where
    T: Scalar,
    F: FnMut(usize, T) -> ConvergenceVerdict,
{
    fn evaluate(&mut self, iteration: usize, residual_norm: T) -> ConvergenceVerdict {
        (self.evaluate_fn)(iteration, residual_norm)
    }
}
