//! Iterative solver interface shared by the Krylov methods.
//!
//! Every method in the family consumes the same collaborators (a
//! [`VectorSpace`], a [`LinearOperator`], a [`Preconditioner`] and a
//! [`ConvergenceTest`]) and reports a [`SolveResult`] carrying a structured
//! [`TerminationReason`].

use std::fmt::{self, Debug, Display};
use std::str::FromStr;
use trustcg_core::{
    core::{
        error::{KrylovError, Result},
        types::Scalar,
    },
    linalg::{LinearOperator, Preconditioner, VectorSpace},
    solver::{ConvergenceReason, ConvergenceTest, DivergenceReason},
};

/// Residual norm fed to the convergence test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NormType {
    /// `||M^{-1} r||`
    Preconditioned,
    /// `||r||`
    #[default]
    Unpreconditioned,
    /// `sqrt(r^T M^{-1} r)`
    Natural,
}

impl NormType {
    /// Option-string name of this norm type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preconditioned => "preconditioned",
            Self::Unpreconditioned => "unpreconditioned",
            Self::Natural => "natural",
        }
    }
}

impl Display for NormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormType {
    type Err = KrylovError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preconditioned" => Ok(Self::Preconditioned),
            "unpreconditioned" => Ok(Self::Unpreconditioned),
            "natural" => Ok(Self::Natural),
            other => Err(KrylovError::invalid_argument(
                "norm_type",
                other,
                "expected `preconditioned`, `unpreconditioned` or `natural`",
            )),
        }
    }
}

/// Why a solve stopped.
///
/// Every reason is terminal. `NegativeCurvature`, `ConstrainedStep` and
/// convergence-test success are the expected outcomes of a trust-region
/// inner solve; the others flag numerical degeneracy the caller should react
/// to (for example by shrinking the radius).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationReason {
    /// A direction with `p^T H p <= 0` was found
    NegativeCurvature,
    /// The step was truncated at the trust-region boundary
    ConstrainedStep,
    /// The convergence test declared success
    Converged(ConvergenceReason),
    /// The convergence test declared divergence
    Diverged(DivergenceReason),
    /// The preconditioner produced NaN or an infinite value
    BadPreconditioner,
    /// The preconditioner is indefinite (`r^T M^{-1} r < 0`)
    IndefinitePreconditioner,
    /// The operator produced NaN or an infinite value
    BadOperator,
    /// The CG recurrence coefficient vanished
    Breakdown,
    /// The iteration cap was reached
    IterationLimit,
}

impl TerminationReason {
    /// Returns true for the successful outcomes of the method.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::NegativeCurvature | Self::ConstrainedStep | Self::Converged(_)
        )
    }

    /// Short, stable name used in logs and monitors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NegativeCurvature => "negative curvature",
            Self::ConstrainedStep => "constrained step",
            Self::Converged(ConvergenceReason::RelativeTolerance) => "converged (rtol)",
            Self::Converged(ConvergenceReason::AbsoluteTolerance) => "converged (atol)",
            Self::Converged(ConvergenceReason::StepTooSmallRelativeToIterate) => {
                "converged (step tolerance)"
            }
            Self::Diverged(DivergenceReason::DivergenceTolerance) => "diverged (dtol)",
            Self::Diverged(DivergenceReason::NanOrInf) => "diverged (NaN or Inf)",
            Self::BadPreconditioner => "bad preconditioner",
            Self::IndefinitePreconditioner => "indefinite preconditioner",
            Self::BadOperator => "bad operator",
            Self::Breakdown => "breakdown",
            Self::IterationLimit => "iteration limit",
        }
    }
}

impl Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a single solve.
#[derive(Debug, Clone)]
pub struct SolveResult<T, V>
where
    T: Scalar,
{
    /// The computed step `d`
    pub step: V,

    /// Why the solve stopped
    pub termination_reason: TerminationReason,

    /// Number of completed iterations
    pub iterations: usize,

    /// Last residual norm fed to the convergence test, if any
    pub residual_norm: Option<T>,

    /// Norm of the step, as tracked by the solver
    pub step_norm: T,

    /// Value of the quadratic model at the step
    pub objective_value: T,

    /// True if the termination reason is a successful outcome
    pub converged: bool,
}

/// Interface for Krylov methods.
///
/// The methods are generic over the collaborators so that each solve is
/// statically dispatched; the trait itself only fixes the scalar type.
pub trait IterativeSolver<T>: Debug
where
    T: Scalar,
{
    /// Returns a human-readable name identifying the method.
    fn name(&self) -> &str;

    /// Solves the linear (sub)problem defined by `operator` and `rhs`.
    ///
    /// # Errors
    ///
    /// Returns errors for invalid configuration, a non-finite right-hand side
    /// and collaborator failures. Numerical degeneracy found while iterating
    /// is reported through [`SolveResult::termination_reason`].
    fn solve<S, A, P, C>(
        &mut self,
        space: &S,
        rhs: &S::Vector,
        operator: &A,
        preconditioner: &P,
        convergence_test: &mut C,
        max_iterations: usize,
    ) -> Result<SolveResult<T, S::Vector>>
    where
        S: VectorSpace<T>,
        A: LinearOperator<S::Vector> + ?Sized,
        P: Preconditioner<S::Vector> + ?Sized,
        C: ConvergenceTest<T> + ?Sized;
}
