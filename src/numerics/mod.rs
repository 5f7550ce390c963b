pub mod bisection;
pub mod newton;

pub enum Tolerance {
    Absolute(f64),
    Relative(f64),
    Combined(f64, f64),
}

/// Convergence criteria for iterative solvers
pub enum ConvergenceCriteria {
    Residual,
    Update,
    Both,
}

pub struct Convergence {
    pub criteria: ConvergenceCriteria,
    pub tolerance: Tolerance,
}

impl Default for Convergence {
    fn default() -> Self {
        Self {
            criteria: ConvergenceCriteria::Residual,
            tolerance: Tolerance::Absolute(1e-12),
        }
    }
}

impl Convergence {
    pub fn check_tolerance(&self, value: f64, initial: f64) -> bool {
        match self.tolerance {
            Tolerance::Absolute(tol) => value < tol,
            Tolerance::Relative(tol) => value / initial < tol,
            Tolerance::Combined(abs_tol, rel_tol) => {
                value < abs_tol || (value / initial) < rel_tol
            }
        }
    }

    pub fn check_convergence(
        &self,
        residual: f64,
        update: f64,
        initial_residual: f64,
        initial_update: f64,
    ) -> bool {
        match self.criteria {
            ConvergenceCriteria::Residual => self.check_tolerance(residual, initial_residual),
            ConvergenceCriteria::Update => self.check_tolerance(update, initial_update),
            ConvergenceCriteria::Both => {
                self.check_tolerance(residual, initial_residual)
                    && self.check_tolerance(update, initial_update)
            }
        }
    }
}
