//! Convergence control and monitoring shared by the solvers.

pub mod convergence;
pub mod monitor;

pub use convergence::{
    ConvergenceReason, ConvergenceTest, ConvergenceVerdict, DefaultConvergenceTest,
    DivergenceReason, FnConvergenceTest, SkipConvergenceTest, Tolerances,
};
pub use monitor::{HistoryMonitor, LogMonitor, SolverMonitor};
