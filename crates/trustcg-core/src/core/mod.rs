//! Core traits and types shared by the solvers.

pub mod error;
pub mod types;

// Re-export core types
pub use error::*;
pub use types::*;
