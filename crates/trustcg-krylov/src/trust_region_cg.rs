//! Trust-region constrained preconditioned Conjugate Gradient.
//!
//! Uses preconditioned CG to compute an approximate minimizer of the
//! quadratic model
//!
//! ```text
//! q(s) = g^T s + 0.5 s^T H s    subject to    ||s|| <= delta
//! ```
//!
//! where `g` is the gradient (the solver receives `rhs = -g`), `H` the Hessian
//! approximation, `delta` the trust-region radius, and `M` the symmetric
//! positive definite preconditioner.
//!
//! # Algorithm Overview
//!
//! This is the Steihaug–Toint truncated CG method as implemented by Nash's
//! trust-region solver:
//! 1. Check the right-hand side and the preconditioner once, falling back to
//!    the gradient step intersected with the trust region if `M` is not usable
//! 2. Take at least one CG step, even if the residual already looks converged
//! 3. Stop exactly on the boundary when the next full step would leave the
//!    trust region, or when negative curvature appears on the first step
//! 4. Stop at the current iterate on later negative curvature, indefinite
//!    preconditioner, breakdown or the iteration cap
//!
//! A radius of zero means "unconstrained".
//!
//! # References
//!
//! - Steihaug, "The Conjugate Gradient Method and Trust Regions in Large
//!   Scale Optimization" (1983)
//! - Toint, "Towards an Efficient Sparsity Exploiting Newton Method for
//!   Minimization" (1981)
//! - Conn et al., "Trust Region Methods" (2000)

use crate::solver::{IterativeSolver, NormType, SolveResult, TerminationReason};
use num_traits::Float;
use std::fmt::{self, Display};
use std::str::FromStr;
use trustcg_core::{
    core::{
        error::{KrylovError, Result},
        types::Scalar,
    },
    linalg::{LinearOperator, NormKind, Preconditioner, VectorSpace},
    solver::{ConvergenceTest, ConvergenceVerdict, SolverMonitor},
};

/// Inner product used to track the norm of the accumulated step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DirectionNorm {
    /// `M`-norm, updated by recurrence from the CG scalars
    Preconditioned,
    /// Euclidean norm, recomputed from the vectors every iteration
    #[default]
    Unpreconditioned,
}

impl DirectionNorm {
    /// Option-string name of this direction norm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preconditioned => "preconditioned",
            Self::Unpreconditioned => "unpreconditioned",
        }
    }
}

impl Display for DirectionNorm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirectionNorm {
    type Err = KrylovError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preconditioned" => Ok(Self::Preconditioned),
            "unpreconditioned" => Ok(Self::Unpreconditioned),
            other => Err(KrylovError::invalid_argument(
                "direction_norm",
                other,
                "expected `preconditioned` or `unpreconditioned`",
            )),
        }
    }
}

/// Configuration for the trust-region CG solver.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrustRegionCGConfig<T: Scalar> {
    /// Trust-region radius; zero means unconstrained
    pub radius: T,
    /// Norm used to track the step length against the radius
    pub direction_norm: DirectionNorm,
    /// Residual norm fed to the convergence test
    pub norm_type: NormType,
    /// Whether to keep every residual norm of the last solve
    pub record_residual_history: bool,
}

impl<T: Scalar> Default for TrustRegionCGConfig<T> {
    fn default() -> Self {
        Self {
            radius: T::zero(),
            direction_norm: DirectionNorm::default(),
            norm_type: NormType::default(),
            record_residual_history: false,
        }
    }
}

impl<T: Scalar> TrustRegionCGConfig<T> {
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the trust-region radius.
    pub fn with_radius(mut self, radius: T) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the direction norm.
    pub fn with_direction_norm(mut self, direction_norm: DirectionNorm) -> Self {
        self.direction_norm = direction_norm;
        self
    }

    /// Sets the residual norm type.
    pub fn with_norm_type(mut self, norm_type: NormType) -> Self {
        self.norm_type = norm_type;
        self
    }

    /// Enables residual history recording.
    pub fn with_residual_history(mut self) -> Self {
        self.record_residual_history = true;
        self
    }

    /// Checks that the configuration is admissible.
    pub fn validate(&self) -> Result<()> {
        check_radius(self.radius)
    }
}

fn check_radius<T: Scalar>(radius: T) -> Result<()> {
    if <T as Float>::is_nan(radius) || radius < T::zero() {
        return Err(KrylovError::invalid_argument(
            "radius",
            radius,
            "trust-region radius must be non-negative",
        ));
    }
    Ok(())
}

/// Scratch vectors owned by a single solve.
#[derive(Debug)]
struct CgWorkspace<V> {
    /// r
    residual: V,
    /// z = M^{-1} r
    preconditioned: V,
    /// p
    direction: V,
    /// H p, also used as scratch by the gradient fallback
    operator_product: V,
}

impl<V: Clone> CgWorkspace<V> {
    fn new<T, S>(space: &S, like: &V) -> Self
    where
        T: Scalar,
        S: VectorSpace<T, Vector = V>,
    {
        let zero = space.zeros_like(like);
        Self {
            residual: zero.clone(),
            preconditioned: zero.clone(),
            direction: zero.clone(),
            operator_product: zero,
        }
    }
}

/// Trust-region constrained preconditioned CG solver.
///
/// The instance holds the configuration and the outputs of the last solve;
/// it may be reused for any number of solves. A solve must not be started
/// while another one on the same instance is in flight.
#[derive(Debug)]
pub struct TrustRegionCG<T: Scalar> {
    config: TrustRegionCGConfig<T>,
    step_norm: T,
    objective_value: T,
    iterations: usize,
    termination_reason: Option<TerminationReason>,
    residual_norm: Option<T>,
    residual_history: Vec<T>,
    monitors: Vec<Box<dyn SolverMonitor<T>>>,
}

impl<T: Scalar> TrustRegionCG<T> {
    /// Creates a solver with the given configuration.
    pub fn new(config: TrustRegionCGConfig<T>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            step_norm: T::zero(),
            objective_value: T::zero(),
            iterations: 0,
            termination_reason: None,
            residual_norm: None,
            residual_history: Vec::new(),
            monitors: Vec::new(),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TrustRegionCGConfig<T> {
        &self.config
    }

    /// Returns the method name.
    pub fn name(&self) -> &str {
        "Trust-Region CG"
    }

    /// Sets the trust-region radius.
    ///
    /// Fails with `InvalidArgument` for a negative or NaN radius, in which
    /// case the stored radius is left unchanged.
    pub fn set_radius(&mut self, radius: T) -> Result<()> {
        check_radius(radius)?;
        self.config.radius = radius;
        Ok(())
    }

    /// Returns the trust-region radius.
    pub fn radius(&self) -> T {
        self.config.radius
    }

    /// Sets the norm used to track the step length.
    pub fn set_direction_norm(&mut self, direction_norm: DirectionNorm) {
        self.config.direction_norm = direction_norm;
    }

    /// Sets the residual norm fed to the convergence test.
    pub fn set_norm_type(&mut self, norm_type: NormType) {
        self.config.norm_type = norm_type;
    }

    /// Attaches a monitor notified of every residual and the termination.
    pub fn add_monitor(&mut self, monitor: Box<dyn SolverMonitor<T>>) {
        self.monitors.push(monitor);
    }

    /// Norm of the step computed by the last solve.
    pub fn step_norm(&self) -> T {
        self.step_norm
    }

    /// Value of the quadratic model at the step computed by the last solve.
    pub fn objective_value(&self) -> T {
        self.objective_value
    }

    /// Number of iterations of the last solve.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Termination reason of the last solve, `None` before any solve.
    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.termination_reason
    }

    /// Residual norms of the last solve, if recording is enabled.
    pub fn residual_history(&self) -> &[T] {
        &self.residual_history
    }

    fn reset(&mut self) {
        self.step_norm = T::zero();
        self.objective_value = T::zero();
        self.iterations = 0;
        self.termination_reason = None;
        self.residual_norm = None;
        self.residual_history.clear();
    }

    fn record_residual(&mut self, iteration: usize, residual_norm: T) {
        self.residual_norm = Some(residual_norm);
        if self.config.record_residual_history {
            self.residual_history.push(residual_norm);
        }
        for monitor in self.monitors.iter_mut() {
            monitor.on_residual(iteration, residual_norm);
        }
    }

    fn finish<V>(&mut self, reason: TerminationReason, step: V) -> SolveResult<T, V> {
        self.termination_reason = Some(reason);
        for monitor in self.monitors.iter_mut() {
            monitor.on_termination(reason.name(), self.iterations);
        }

        SolveResult {
            step,
            termination_reason: reason,
            iterations: self.iterations,
            residual_norm: self.residual_norm,
            step_norm: self.step_norm,
            objective_value: self.objective_value,
            converged: reason.is_success(),
        }
    }

    /// Residual norm of the configured type.
    ///
    /// `rr_sqrt` short-circuits the unpreconditioned norm when `r^T r` is
    /// already known.
    fn residual_norm_of<S>(
        &self,
        space: &S,
        workspace: &CgWorkspace<S::Vector>,
        rz: T,
        rr_sqrt: Option<T>,
    ) -> Result<T>
    where
        S: VectorSpace<T>,
    {
        match self.config.norm_type {
            NormType::Preconditioned => space.norm(&workspace.preconditioned, NormKind::Two),
            NormType::Unpreconditioned => match rr_sqrt {
                Some(norm) => Ok(norm),
                None => space.norm(&workspace.residual, NormKind::Two),
            },
            NormType::Natural => Ok(<T as Float>::sqrt(rz)),
        }
    }

    /// Takes the gradient step `d = tau * rhs` intersected with the trust
    /// region and recomputes the objective from scratch.
    ///
    /// Does nothing for an unconstrained radius.
    fn gradient_fallback<S, A>(
        &mut self,
        space: &S,
        rhs: &S::Vector,
        operator: &A,
        rr: T,
        step: &mut S::Vector,
        scratch: &mut S::Vector,
    ) -> Result<()>
    where
        S: VectorSpace<T>,
        A: LinearOperator<S::Vector> + ?Sized,
    {
        let radius = self.config.radius;
        if radius == T::zero() {
            return Ok(());
        }

        let r2 = radius * radius;
        let tau = if r2 >= rr {
            self.step_norm = <T as Float>::sqrt(rr);
            T::one()
        } else {
            self.step_norm = radius;
            <T as Float>::sqrt(r2 / rr)
        };
        space.axpy(tau, rhs, step)?;

        // q(d) = -rhs^T d + 0.5 d^T H d = -d^T (rhs - 0.5 H d)
        operator.apply(step, scratch)?;
        space.aypx(<T as Scalar>::from_f64(-0.5), rhs, scratch)?;
        self.objective_value = -space.dot(step, scratch)?;
        self.iterations += 1;
        Ok(())
    }

    /// Solves the trust-region subproblem for `rhs = -gradient`.
    ///
    /// At most `min(max_iterations, dim(rhs))` iterations are performed, and
    /// always at least one CG step once the preconditioner has been checked.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the configured radius is negative
    /// - `NonFiniteRightHandSide` if `rhs^T rhs` is NaN or infinite
    /// - any error raised by the collaborators
    pub fn solve<S, A, P, C>(
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
        C: ConvergenceTest<T> + ?Sized,
    {
        self.config.validate()?;

        let radius = self.config.radius;
        let constrained = radius > T::zero();
        let r2 = radius * radius;
        let half = <T as Scalar>::from_f64(0.5);
        let two = <T as Scalar>::from_f64(2.0);

        let max_cg_iterations = max_iterations.min(space.dimension(rhs));
        self.reset();

        let mut step = space.zeros_like(rhs);
        let mut work = CgWorkspace::new::<T, S>(space, rhs);

        // r = -grad
        space.copy(rhs, &mut work.residual)?;
        let rr = space.dot(&work.residual, &work.residual)?;
        if Scalar::is_nan_or_inf(rr) {
            return Err(KrylovError::non_finite_rhs(Scalar::to_f64(rr)));
        }

        // z = M^{-1} r
        preconditioner.apply(&work.residual, &mut work.preconditioned)?;
        let mut rz = space.dot(&work.residual, &work.preconditioned)?;
        if Scalar::is_nan_or_inf(rz) {
            log::debug!("trust-region CG: bad preconditioner: rz={}", rz);
            self.gradient_fallback(
                space,
                rhs,
                operator,
                rr,
                &mut step,
                &mut work.operator_product,
            )?;
            return Ok(self.finish(TerminationReason::BadPreconditioner, step));
        }
        if rz < T::zero() {
            // No direction yet and the M-norm is meaningless: use the gradient.
            log::debug!("trust-region CG: indefinite preconditioner: rz={}", rz);
            self.gradient_fallback(
                space,
                rhs,
                operator,
                rr,
                &mut step,
                &mut work.operator_product,
            )?;
            return Ok(self.finish(TerminationReason::IndefinitePreconditioner, step));
        }

        // The initial verdict is only recorded: at least one step is always taken.
        let norm_r = self.residual_norm_of(space, &work, rz, Some(<T as Float>::sqrt(rr)))?;
        self.record_residual(0, norm_r);
        let initial_verdict = convergence_test.evaluate(0, norm_r);
        log::trace!(
            "trust-region CG: initial residual norm {} ({:?})",
            norm_r,
            initial_verdict
        );

        // p = z, Hp = H p
        space.copy(&work.preconditioned, &mut work.direction)?;
        operator.apply(&work.direction, &mut work.operator_product)?;
        self.iterations += 1;

        let mut kappa = space.dot(&work.direction, &work.operator_product)?;
        if Scalar::is_nan_or_inf(kappa) {
            log::debug!("trust-region CG: bad operator: kappa={}", kappa);
            self.gradient_fallback(
                space,
                rhs,
                operator,
                rr,
                &mut step,
                &mut work.operator_product,
            )?;
            return Ok(self.finish(TerminationReason::BadOperator, step));
        }

        let mut dmp = T::zero(); // d^T M p
        let mut norm_d = T::zero();
        let mut norm_p = match self.config.direction_norm {
            DirectionNorm::Preconditioned => rz,
            DirectionNorm::Unpreconditioned => space.dot(&work.direction, &work.direction)?,
        };

        if kappa <= T::zero() {
            // d is still zero, so a direction has to be followed.
            log::debug!("trust-region CG: negative curvature: kappa={}", kappa);
            if constrained && norm_p > T::zero() {
                let tau = <T as Float>::sqrt(r2 / norm_p);
                self.step_norm = radius;
                space.axpy(tau, &work.direction, &mut step)?;
                self.objective_value = self.objective_value + tau * (half * tau * kappa - rz);
            } else if constrained {
                self.gradient_fallback(
                    space,
                    rhs,
                    operator,
                    rr,
                    &mut step,
                    &mut work.operator_product,
                )?;
            }
            return Ok(self.finish(TerminationReason::NegativeCurvature, step));
        }

        let reason = loop {
            // kappa > 0 here, checked before entering and at the end of each pass.
            let alpha = rz / kappa;
            let norm_dp1 = norm_d + alpha * (two * dmp + alpha * norm_p);
            log::trace!(
                "trust-region CG: its={} alpha={} kappa={} |d+|^2={}",
                self.iterations,
                alpha,
                kappa,
                norm_dp1
            );

            if constrained && norm_dp1 >= r2 {
                log::debug!("trust-region CG: constrained step: radius={}", radius);
                if norm_p > T::zero() {
                    // Positive root of ||d + tau p||^2 = radius^2.
                    let tau = (<T as Float>::sqrt(dmp * dmp + norm_p * (r2 - norm_d)) - dmp)
                        / norm_p;
                    self.step_norm = radius;
                    space.axpy(tau, &work.direction, &mut step)?;
                    self.objective_value = self.objective_value + tau * (half * tau * kappa - rz);
                }
                break TerminationReason::ConstrainedStep;
            }

            // d = d + alpha p, r = r - alpha H p, z = M^{-1} r
            space.axpy(alpha, &work.direction, &mut step)?;
            space.axpy(-alpha, &work.operator_product, &mut work.residual)?;
            preconditioner.apply(&work.residual, &mut work.preconditioned)?;

            norm_d = match self.config.direction_norm {
                DirectionNorm::Preconditioned => norm_dp1,
                DirectionNorm::Unpreconditioned => space.dot(&step, &step)?,
            };
            self.step_norm = <T as Float>::sqrt(norm_d);
            self.objective_value = self.objective_value - half * alpha * rz;

            let rz_prev = rz;
            rz = space.dot(&work.residual, &work.preconditioned)?;
            if rz < T::zero() {
                // d already satisfies the trust-region constraint, keep it.
                log::debug!("trust-region CG: cg indefinite preconditioner: rz={}", rz);
                break TerminationReason::IndefinitePreconditioner;
            }

            let norm_r = self.residual_norm_of(space, &work, rz, None)?;
            self.record_residual(self.iterations, norm_r);
            match convergence_test.evaluate(self.iterations, norm_r) {
                ConvergenceVerdict::Iterating => {}
                ConvergenceVerdict::Converged(why) => {
                    log::debug!(
                        "trust-region CG: truncated step: rnorm={}, radius={}",
                        norm_r,
                        radius
                    );
                    break TerminationReason::Converged(why);
                }
                ConvergenceVerdict::Diverged(why) => {
                    log::debug!("trust-region CG: convergence test diverged: {}", why);
                    break TerminationReason::Diverged(why);
                }
            }

            let beta = rz / rz_prev;
            log::trace!("trust-region CG: its={} rz={} beta={}", self.iterations, rz, beta);
            // rz = 0 with z != 0 gives beta = 0/0 under an indefinite preconditioner.
            if Scalar::is_nan_or_inf(beta) || <T as Float>::abs(beta) <= T::zero() {
                log::debug!("trust-region CG: breakdown: beta={}", beta);
                break TerminationReason::Breakdown;
            }

            if self.iterations >= max_cg_iterations {
                log::debug!("trust-region CG: iterlim: its={}", self.iterations);
                break TerminationReason::IterationLimit;
            }

            // p = z + beta p
            space.aypx(beta, &work.preconditioned, &mut work.direction)?;
            match self.config.direction_norm {
                DirectionNorm::Preconditioned => {
                    dmp = beta * (dmp + alpha * norm_p);
                    norm_p = beta * (rz_prev + beta * norm_p);
                }
                DirectionNorm::Unpreconditioned => {
                    dmp = space.dot(&step, &work.direction)?;
                    norm_p = space.dot(&work.direction, &work.direction)?;
                }
            }

            operator.apply(&work.direction, &mut work.operator_product)?;
            kappa = space.dot(&work.direction, &work.operator_product)?;
            self.iterations += 1;

            if Scalar::is_nan_or_inf(kappa) {
                // p is unusable but d is still the last accepted iterate.
                log::debug!("trust-region CG: bad operator: kappa={}", kappa);
                break TerminationReason::BadOperator;
            }
            if kappa <= T::zero() {
                // Stop at the base: d is feasible and the best point so far.
                log::debug!("trust-region CG: negative curvature: kappa={}", kappa);
                break TerminationReason::NegativeCurvature;
            }
        };

        Ok(self.finish(reason, step))
    }
}

impl<T: Scalar> IterativeSolver<T> for TrustRegionCG<T> {
    fn name(&self) -> &str {
        "Trust-Region CG"
    }

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
        C: ConvergenceTest<T> + ?Sized,
    {
        self.solve(
            space,
            rhs,
            operator,
            preconditioner,
            convergence_test,
            max_iterations,
        )
    }
}
