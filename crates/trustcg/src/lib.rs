//! Trust-region preconditioned Conjugate Gradient.
//!
//! `trustcg` bundles the core traits ([`trustcg_core`]) and the Krylov solvers
//! ([`trustcg_krylov`]) behind a single dependency.
//!
//! # Quick Start
//!
//! ```
//! use trustcg::prelude::*;
//!
//! # fn main() -> trustcg::Result<()> {
//! // Minimize g^T s + 0.5 s^T H s inside ||s|| <= 1 with g = -rhs.
//! let space = EuclideanSpace::<f64>::new();
//! let hessian = DMatrix::from_diagonal(&DVector::from_vec(vec![-1.0, 2.0]));
//! let rhs = DVector::from_vec(vec![1.0, 1.0]);
//!
//! let mut solver = TrustRegionCG::new(TrustRegionCGConfig::new().with_radius(1.0))?;
//! let result = solver.solve(
//!     &space,
//!     &rhs,
//!     &hessian,
//!     &IdentityPreconditioner,
//!     &mut DefaultConvergenceTest::default(),
//!     50,
//! )?;
//!
//! assert!(result.converged);
//! assert!(result.step.norm() <= 1.0 + 1e-12);
//! assert!(result.objective_value < 0.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `serde`: serialization of configurations and termination reasons

pub use trustcg_core::{core, linalg, solver as convergence};
pub use trustcg_core::{KrylovError, Result, Scalar};
pub use trustcg_krylov::{solver, trust_region_cg};
pub use trustcg_krylov::{
    DirectionNorm, IterativeSolver, NormType, SolveResult, TerminationReason, TrustRegionCG,
    TrustRegionCGConfig,
};

/// Re-export of nalgebra for building operators and vectors.
pub use nalgebra;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use trustcg_core::prelude::*;
    pub use trustcg_krylov::prelude::*;
}
