use crate::numerics::newton::{log_iteration, SolverError, SolverResult};
use crate::numerics::Convergence;
use crate::physics::ScalarProblem;

/// Derivative-free root finder: expands a bracket outward from a seed until
/// the residual changes sign, then bisects. Robust against residuals with no
/// usable derivative (tabulated trap distributions, kinked charge terms).
pub struct BracketSolver {
    pub convergence: Convergence,
    pub max_iterations: u32,
    /// Half-width of the first bracket tried around the seed.
    pub initial_width: f64,
    /// Number of doublings of the bracket half-width before giving up.
    pub max_expansions: u32,
}

impl Default for BracketSolver {
    fn default() -> Self {
        Self {
            convergence: Convergence::default(),
            max_iterations: 200,
            initial_width: 0.25,
            max_expansions: 6,
        }
    }
}

impl BracketSolver {
    pub fn solve<M>(
        &self,
        model: &M,
        seed: f64,
        logging: bool,
    ) -> Result<SolverResult, SolverError>
    where
        M: ScalarProblem,
    {
        let (mut a, mut b, mut fa, fb) = self.bracket(model, seed)?;

        let initial_residual = fa.abs().max(fb.abs());
        let initial_width = b - a;
        let mut history: Vec<(u32, f64)> = Vec::new();

        if logging {
            println!("Bracket [{a:.6e}, {b:.6e}]");
            println!("    Iter |   Residual  |         Mid");
        }

        for i in 0..self.max_iterations {
            let mid = 0.5 * (a + b);
            let fm: f64 = model.residual(mid);
            if !fm.is_finite() {
                return Err(SolverError::NonFinite);
            }

            log_iteration(i, fm, mid, logging);
            history.push((i, fm.abs()));

            if fm == 0.0 {
                return Ok(SolverResult {
                    root: mid,
                    iterations: i,
                    final_residual: 0.0,
                    history,
                });
            }

            if fm.is_sign_positive() == fa.is_sign_positive() {
                a = mid;
                fa = fm;
            } else {
                b = mid;
            }

            let width = b - a;
            let collapsed = width <= f64::EPSILON * a.abs().max(b.abs()).max(1.0);
            if collapsed
                || self
                    .convergence
                    .check_convergence(fm.abs(), width, initial_residual, initial_width)
            {
                return Ok(SolverResult {
                    root: 0.5 * (a + b),
                    iterations: i,
                    final_residual: fm.abs(),
                    history,
                });
            }
        }

        Err(SolverError::NonConvergence)
    }

    /// Grow a symmetric interval around `seed` until the residual changes
    /// sign across it.
    fn bracket<M>(&self, model: &M, seed: f64) -> Result<(f64, f64, f64, f64), SolverError>
    where
        M: ScalarProblem,
    {
        let mut width = self.initial_width;

        for _ in 0..=self.max_expansions {
            let (a, b) = (seed - width, seed + width);
            let fa: f64 = model.residual(a);
            let fb: f64 = model.residual(b);
            if !fa.is_finite() || !fb.is_finite() {
                return Err(SolverError::NonFinite);
            }
            if fa.is_sign_positive() != fb.is_sign_positive() {
                return Ok((a, b, fa, fb));
            }
            width *= 2.0;
        }

        Err(SolverError::BracketFailed)
    }
}
