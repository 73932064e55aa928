//! Core traits and types for trust-region Krylov solvers.
//!
//! This crate provides the capabilities an iterative solver consumes from its
//! collaborators: vector algebra, operator and preconditioner application, and
//! a per-iteration convergence test. Solvers themselves live in
//! `trustcg-krylov`.
//!
//! # Modules
//!
//! - [`core`]: Scalar trait, type aliases and error types
//! - [`linalg`]: Vector spaces, linear operators and preconditioners
//! - [`solver`]: Convergence tests and solver monitors

pub mod core;
pub mod linalg;
pub mod solver;

// Re-export commonly used items at the crate root
pub use crate::core::error::{KrylovError, Result};
pub use crate::core::types::Scalar;

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use trustcg_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::error::{KrylovError, Result};
    pub use crate::core::types::{constants, DMatrix, DVector, Scalar};
    pub use crate::linalg::{
        DiagonalOperator, EuclideanSpace, FnOperator, FnPreconditioner, IdentityPreconditioner,
        JacobiPreconditioner, LinearOperator, NormKind, Preconditioner, VectorSpace,
    };
    pub use crate::solver::{
        ConvergenceReason, ConvergenceTest, ConvergenceVerdict, DefaultConvergenceTest,
        DivergenceReason, FnConvergenceTest, HistoryMonitor, LogMonitor, SkipConvergenceTest,
        SolverMonitor, Tolerances,
    };
}
