//! Trust-region Krylov solvers.
//!
//! This crate provides the trust-region constrained preconditioned Conjugate
//! Gradient method used as the inner solver of trust-region optimization and
//! Newton trust-region nonlinear solvers.
//!
//! # Example
//!
//! ```
//! use trustcg_core::prelude::*;
//! use trustcg_krylov::prelude::*;
//!
//! # fn main() -> trustcg_core::Result<()> {
//! let space = EuclideanSpace::<f64>::new();
//! let hessian = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
//! let rhs = DVector::from_vec(vec![1.0, 2.0]);
//!
//! let mut solver = TrustRegionCG::new(TrustRegionCGConfig::new().with_radius(0.1))?;
//! let result = solver.solve(
//!     &space,
//!     &rhs,
//!     &hessian,
//!     &IdentityPreconditioner,
//!     &mut DefaultConvergenceTest::default(),
//!     100,
//! )?;
//!
//! assert_eq!(result.termination_reason, TerminationReason::ConstrainedStep);
//! assert!((result.step.norm() - 0.1).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```

pub mod solver;
pub mod trust_region_cg;

pub use solver::{IterativeSolver, NormType, SolveResult, TerminationReason};
pub use trust_region_cg::{DirectionNorm, TrustRegionCG, TrustRegionCGConfig};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::solver::{IterativeSolver, NormType, SolveResult, TerminationReason};
    pub use crate::trust_region_cg::{DirectionNorm, TrustRegionCG, TrustRegionCGConfig};
}
