//! Batch solving across an injection/doping grid.
//!
//! Every grid point is independent (the solvers share nothing mutable), so
//! the sweep is embarrassingly parallel and runs on the rayon pool. A point
//! that fails keeps its error in place instead of aborting the sweep.

use crate::physics::params::SiliconParams;
use crate::physics::quasi_fermi::{from_injection, from_voltage};
use crate::physics::recombination::surface_recombination_rate;
use crate::physics::surface::{solve_surface_potential, SurfaceChargeInputs, TrapDistribution};
use crate::physics::{DopingType, PhysicsError};
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub doping_type: DopingType,
    /// [cm^-2]
    pub fixed_charge_density: f64,
    pub traps: Option<TrapDistribution>,
    /// Midgap trap density for the recombination stage [cm^-2].
    pub trap_density: f64,
    /// [cm^2]
    pub sigma_n: f64,
    /// [cm^2]
    pub sigma_p: f64,
    pub gate_voltage: f64,
    /// [m]
    pub oxide_thickness: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            doping_type: DopingType::NType,
            fixed_charge_density: 1e12,
            traps: None,
            trap_density: 1e10,
            sigma_n: 1e-15,
            sigma_p: 1e-15,
            gate_voltage: 0.0,
            oxide_thickness: 10e-9,
        }
    }
}

/// Converged results for one grid point.
#[derive(Debug, Clone, Copy)]
pub struct SweepRecord {
    pub delta_n: f64,
    pub doping: f64,
    pub photovoltage: f64,
    /// Relative defect of the injection -> voltage -> injection round trip.
    pub round_trip_defect: f64,
    pub psi_s: f64,
    pub charge_residual: f64,
    pub recombination_rate: f64,
}

fn solve_point(
    delta_n: f64,
    doping: f64,
    config: &SweepConfig,
    params: &SiliconParams,
) -> Result<SweepRecord, PhysicsError> {
    let injected = from_injection(delta_n, config.doping_type, doping, params)?;
    let echoed = from_voltage(injected.v, config.doping_type, doping, params)?;
    let round_trip_defect = ((echoed.delta_n - delta_n) / delta_n).abs();

    let inputs = SurfaceChargeInputs {
        fixed_charge_density: config.fixed_charge_density,
        carriers: echoed,
        gate_voltage: config.gate_voltage,
        oxide_thickness: config.oxide_thickness,
        traps: config.traps.clone(),
    };
    let potential = solve_surface_potential(&inputs, params)?;

    let surface = echoed.at_surface(potential.psi_s, params);
    let recombination_rate = surface_recombination_rate(
        &surface,
        config.trap_density,
        config.sigma_n,
        config.sigma_p,
        params,
    )?;

    Ok(SweepRecord {
        delta_n,
        doping,
        photovoltage: injected.v,
        round_trip_defect,
        psi_s: potential.psi_s,
        charge_residual: potential.residual,
        recombination_rate,
    })
}

/// Run the full pipeline over the cartesian product of injection levels and
/// doping concentrations.
pub fn run_sweep(
    delta_n_values: &[f64],
    doping_values: &[f64],
    config: &SweepConfig,
    params: &SiliconParams,
) -> Vec<Result<SweepRecord, PhysicsError>> {
    let points: Vec<(f64, f64)> = doping_values
        .iter()
        .flat_map(|&doping| delta_n_values.iter().map(move |&dn| (dn, doping)))
        .collect();

    points
        .par_iter()
        .map(|&(delta_n, doping)| solve_point(delta_n, doping, config, params))
        .collect()
}
