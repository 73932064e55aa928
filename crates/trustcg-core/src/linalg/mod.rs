//! Linear-algebra capabilities consumed by the solvers.

pub mod operator;
pub mod preconditioner;
pub mod vector_space;

pub use operator::{DiagonalOperator, FnOperator, LinearOperator};
pub use preconditioner::{
    FnPreconditioner, IdentityPreconditioner, JacobiPreconditioner, Preconditioner,
};
pub use vector_space::{EuclideanSpace, NormKind, VectorSpace};
