pub mod params;
pub mod quasi_fermi;
pub mod recombination;
pub mod surface;

use crate::numerics::newton::SolverError;
use num_dual::DualNum;
use thiserror::Error;

/// Doping character of a silicon sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DopingType {
    NType,
    PType,
}

#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("physically impossible state: {0}")]
    Domain(String),
    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Defines the contract for any scalar root problem to be solved.
///
/// The residual is generic over the scalar type so the same expression serves
/// plain `f64` evaluation (bracketing solvers) and dual-number evaluation
/// (Newton, which reads the derivative off the dual part).
pub trait ScalarProblem {
    /// Residual whose root is the sought solution.
    fn residual<T: DualNum<f64> + Copy>(&self, x: T) -> T;
}
