use crate::physics::ScalarProblem;
use num_dual::first_derivative;
use std::io::{self, Write};
use thiserror::Error;

pub struct NewtonSolver {
    pub tolerance: f64,
    pub max_iterations: u32,
    /// Maximum step size to prevent large jumps (None = no limit)
    pub max_step: Option<f64>,
}

impl Default for NewtonSolver {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
            max_step: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("residual or derivative became non-finite")]
    NonFinite,
    #[error("no sign change found while bracketing the root")]
    BracketFailed,
    #[error("root search failed to converge")]
    NonConvergence,
}

pub struct SolverResult {
    pub root: f64,
    pub iterations: u32,
    pub final_residual: f64,
    /// Per-iteration |residual|, for post-run inspection.
    pub history: Vec<(u32, f64)>,
}

impl NewtonSolver {
    /// Newton iteration with the derivative taken from the dual part of the
    /// residual evaluated at `x + eps`. The step criterion keeps iterating
    /// past the residual tolerance until the update stalls at machine
    /// precision, so downstream quantities reconstructed from the root (for
    /// instance carrier densities behind an exponential) keep full accuracy.
    pub fn solve<M>(
        &self,
        model: &M,
        initial_guess: f64,
        logging: bool,
    ) -> Result<SolverResult, SolverError>
    where
        M: ScalarProblem,
    {
        let mut x = initial_guess;
        let mut history: Vec<(u32, f64)> = Vec::new();

        if logging {
            println!("    Iter |   Residual  |        Root");
        }

        for i in 0..self.max_iterations {
            let (residual, derivative) = first_derivative(|t| model.residual(t), x);

            if !residual.is_finite() || !derivative.is_finite() {
                return Err(SolverError::NonFinite);
            }

            log_iteration(i, residual, x, logging);
            history.push((i, residual.abs()));

            if residual == 0.0 {
                return Ok(SolverResult {
                    root: x,
                    iterations: i,
                    final_residual: 0.0,
                    history,
                });
            }

            let mut step = -residual / derivative;
            if let Some(max_step) = self.max_step {
                if step.abs() > max_step {
                    step = max_step.copysign(step);
                }
            }

            // Update stalled: x is resolved to machine precision.
            if step.abs() <= f64::EPSILON * (1.0 + x.abs()) {
                return if residual.abs() < self.tolerance {
                    Ok(SolverResult {
                        root: x,
                        iterations: i,
                        final_residual: residual.abs(),
                        history,
                    })
                } else {
                    Err(SolverError::NonConvergence)
                };
            }

            x += step;
        }

        Err(SolverError::NonConvergence)
    }
}

pub(crate) fn log_iteration(i: u32, residual: f64, x: f64, logging: bool) {
    if !logging {
        return;
    }
    println!("{i:>8} | {:>11.4e} | {x:>11.6e}", residual);
    io::stdout().flush().ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_dual::DualNum;

    struct Quadratic;

    impl ScalarProblem for Quadratic {
        // x^2 - 2 = 0
        fn residual<T: DualNum<f64> + Copy>(&self, x: T) -> T {
            x * x - 2.0
        }
    }

    struct Stiff;

    impl ScalarProblem for Stiff {
        // e^x - 1e6 = 0, root at ln(1e6) ~ 13.8; unclamped Newton from 0
        // would first step to ~1e6 and overflow the exponential.
        fn residual<T: DualNum<f64> + Copy>(&self, x: T) -> T {
            x.exp() - 1e6
        }
    }

    #[test]
    fn finds_quadratic_root() {
        let solver = NewtonSolver::default();
        let result = solver.solve(&Quadratic, 1.0, false).expect("solved");
        assert!((result.root - 2.0_f64.sqrt()).abs() < 1e-14);
        assert!(result.final_residual < 1e-10);
    }

    #[test]
    fn step_clamp_prevents_overflow() {
        // Residual floor is ~1 ulp of 1e6, so the tolerance must sit above it.
        let solver = NewtonSolver {
            tolerance: 1e-6,
            max_step: Some(5.0),
            ..NewtonSolver::default()
        };
        let result = solver.solve(&Stiff, 0.0, false).expect("solved");
        assert!((result.root - 1e6_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn reports_nonconvergence() {
        // No real root.
        struct NoRoot;
        impl ScalarProblem for NoRoot {
            fn residual<T: DualNum<f64> + Copy>(&self, x: T) -> T {
                x * x + 1.0
            }
        }
        let solver = NewtonSolver {
            max_iterations: 20,
            ..NewtonSolver::default()
        };
        assert!(matches!(
            solver.solve(&NoRoot, 0.5, false),
            Err(SolverError::NonConvergence)
        ));
    }
}
