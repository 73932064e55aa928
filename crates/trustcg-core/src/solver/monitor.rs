//! Monitoring support for Krylov solvers.
//!
//! Monitors observe the residual norms a solver feeds to its convergence test
//! and the final termination. They cannot influence the iteration.

use crate::core::types::Scalar;
use std::fmt::Debug;

/// Trait for solver monitors.
pub trait SolverMonitor<T: Scalar>: Debug {
    /// Called every time a residual norm is computed, iteration 0 included.
    fn on_residual(&mut self, iteration: usize, residual_norm: T) {
        let _ = (iteration, residual_norm);
    }

    /// Called once when the solver terminates.
    fn on_termination(&mut self, reason: &str, iterations: usize) {
        let _ = (reason, iterations);
    }
}

/// A monitor that writes progress through the `log` facade.
#[derive(Debug, Clone)]
pub struct LogMonitor {
    log_every: usize,
}

impl LogMonitor {
    /// Create a monitor logging every `log_every` iterations.
    pub fn new(log_every: usize) -> Self {
        Self {
            log_every: log_every.max(1),
        }
    }
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<T: Scalar> SolverMonitor<T> for LogMonitor {
    fn on_residual(&mut self, iteration: usize, residual_norm: T) {
        if iteration % self.log_every == 0 {
            log::info!(
                "{:4} residual norm {:.12e}",
                iteration,
                Scalar::to_f64(residual_norm)
            );
        }
    }

    fn on_termination(&mut self, reason: &str, iterations: usize) {
        log::info!("solve terminated after {} iterations: {}", iterations, reason);
    }
}

/// A monitor that stores every residual norm it observes.
#[derive(Debug, Clone, Default)]
pub struct HistoryMonitor<T> {
    residuals: Vec<(usize, T)>,
    termination: Option<(String, usize)>,
}

impl<T: Scalar> HistoryMonitor<T> {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            residuals: Vec::new(),
            termination: None,
        }
    }

    /// Recorded `(iteration, residual_norm)` pairs.
    pub fn residuals(&self) -> &[(usize, T)] {
        &self.residuals
    }

    /// Recorded termination reason and iteration count.
    pub fn termination(&self) -> Option<(&str, usize)> {
        self.termination
            .as_ref()
            .map(|(reason, iterations)| (reason.as_str(), *iterations))
    }
}

impl<T: Scalar> SolverMonitor<T> for HistoryMonitor<T> {
    fn on_residual(&mut self, iteration: usize, residual_norm: T) {
        self.residuals.push((iteration, residual_norm));
    }

    fn on_termination(&mut self, reason: &str, iterations: usize) {
        self.termination = Some((reason.to_string(), iterations));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_monitor() {
        let mut monitor = HistoryMonitor::<f64>::new();
        monitor.on_residual(0, 1.0);
        monitor.on_residual(1, 0.5);
        monitor.on_termination("breakdown", 1);

        assert_eq!(monitor.residuals(), &[(0, 1.0), (1, 0.5)]);
        assert_eq!(monitor.termination(), Some(("breakdown", 1)));
    }

    #[test]
    fn test_log_monitor_clamps_interval() {
        let mut monitor = LogMonitor::new(0);
        SolverMonitor::<f64>::on_residual(&mut monitor, 3, 1.0);
        SolverMonitor::<f64>::on_termination(&mut monitor, "converged", 3);
    }
}
