//! Charge balance at the oxide-covered silicon surface.
//!
//! Three contributions meet at the interface: the band-bending response of
//! the silicon bulk, the fixed charge trapped in the oxide, and charge held
//! in interface traps. The surface potential is the root of their sum.
//!
//! Sign convention: positive `psi_s` accumulates holes at the surface,
//! negative `psi_s` accumulates electrons.

use crate::numerics::bisection::BracketSolver;
use crate::numerics::newton::NewtonSolver;
use crate::numerics::{Convergence, ConvergenceCriteria, Tolerance};
use crate::physics::params::{SiliconParams, CM2_TO_M2};
use crate::physics::quasi_fermi::CarrierState;
use crate::physics::{DopingType, PhysicsError, ScalarProblem};
use num_dual::DualNum;

/// Everything the surface potential solve consumes.
///
/// `gate_voltage` and `oxide_thickness` are carried for the gated extension
/// of the model but do not enter the present charge balance; the balance is
/// between the silicon, the fixed oxide charge and the interface traps only.
#[derive(Debug, Clone)]
pub struct SurfaceChargeInputs {
    /// Fixed oxide-interface charge density [cm^-2].
    pub fixed_charge_density: f64,
    pub carriers: CarrierState,
    pub gate_voltage: f64,
    /// [m]
    pub oxide_thickness: f64,
    pub traps: Option<TrapDistribution>,
}

#[derive(Debug, Clone, Copy)]
pub struct SurfacePotentialResult {
    /// [V]
    pub psi_s: f64,
    /// Total charge at the root [C/m^2]; ~0 at convergence.
    pub residual: f64,
    pub iterations: u32,
}

/// Dimensionless band-bending function of the bulk charge.
///
/// N-type branch follows the photovoltage derivation directly; the p-type
/// branch is its mirror, with the electron and hole quasi-Fermi terms
/// exchanged and the doping term taken with acceptor sign.
fn band_bending<T: DualNum<f64> + Copy>(
    psi_s: T,
    carriers: &CarrierState,
    params: &SiliconParams,
) -> T {
    let vt = params.v_t;
    let x = psi_s * (1.0 / vt);
    let up = carriers.phi_p / vt;
    let un = carriers.phi_n / vt;
    let doping_term = x * (carriers.doping / params.ni);

    match carriers.doping_type {
        DopingType::NType => {
            (x + up).exp() - up.exp() - (-x - un).exp() + (-un).exp() - doping_term
        }
        DopingType::PType => {
            (x - un).exp() - (-un).exp() - (-x + up).exp() + up.exp() + doping_term
        }
    }
}

/// Bulk silicon charge at the surface [C/m^2].
pub fn bulk_silicon_charge(psi_s: f64, carriers: &CarrierState, params: &SiliconParams) -> f64 {
    band_bending(psi_s, carriers, params) * params.bulk_charge_prefactor()
}

/// Fixed oxide charge [C/m^2] from an areal density in cm^-2. Constant in
/// `psi_s`: its derivative contributes nothing to any Newton step.
pub fn fixed_oxide_charge(nf: f64, params: &SiliconParams) -> f64 {
    params.q * nf * CM2_TO_M2
}

/// Tabulated interface-trap distribution across the gap.
///
/// Energies in eV relative to midgap, densities in cm^-2 eV^-1. Traps are
/// treated as acceptor-like: occupation beyond the flat-band reference adds
/// negative charge.
#[derive(Debug, Clone)]
pub struct TrapDistribution {
    energies: Vec<f64>,
    densities: Vec<f64>,
}

impl TrapDistribution {
    pub fn new(energies: Vec<f64>, densities: Vec<f64>) -> Result<Self, PhysicsError> {
        if energies.len() != densities.len() || energies.len() < 2 {
            return Err(PhysicsError::InvalidArgument(
                "trap distribution needs matching energy/density tables with at least two samples",
            ));
        }
        if energies.windows(2).any(|w| w[1] <= w[0]) {
            return Err(PhysicsError::InvalidArgument(
                "trap energies must be strictly ascending",
            ));
        }
        if densities.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(PhysicsError::InvalidArgument(
                "trap densities must be finite and non-negative",
            ));
        }
        Ok(Self { energies, densities })
    }

    /// Fermi-Dirac occupation of a trap level when the surface bands are
    /// bent by `psi_s`.
    fn occupation<T: DualNum<f64> + Copy>(energy: f64, psi_s: T, vt: f64) -> T {
        let arg = (-psi_s + energy) * (1.0 / vt);
        T::one() / (arg.exp() + 1.0)
    }

    /// Charge held by the distribution [C/m^2], relative to the flat-band
    /// occupation so that `psi_s = 0` carries none.
    pub fn charge<T: DualNum<f64> + Copy>(&self, psi_s: T, params: &SiliconParams) -> T {
        let vt = params.v_t;
        let mut filled = T::zero();

        for i in 0..self.energies.len() - 1 {
            let (e0, e1) = (self.energies[i], self.energies[i + 1]);
            // Same expression as the shifted occupation so that psi_s = 0
            // cancels exactly.
            let reference0 = Self::occupation(e0, 0.0_f64, vt);
            let reference1 = Self::occupation(e1, 0.0_f64, vt);
            let g0 = (Self::occupation(e0, psi_s, vt) - reference0) * self.densities[i];
            let g1 = (Self::occupation(e1, psi_s, vt) - reference1) * self.densities[i + 1];
            filled = filled + (g0 + g1) * (0.5 * (e1 - e0));
        }

        filled * (-params.q * CM2_TO_M2)
    }
}

/// Interface-trap charge [C/m^2]; zero when no distribution is supplied.
pub fn interface_trap_charge<T: DualNum<f64> + Copy>(
    psi_s: T,
    traps: Option<&TrapDistribution>,
    params: &SiliconParams,
) -> T {
    match traps {
        Some(distribution) => distribution.charge(psi_s, params),
        None => T::zero(),
    }
}

/// Total interface charge as a function of surface potential.
pub struct ChargeBalanceProblem<'a> {
    inputs: &'a SurfaceChargeInputs,
    params: &'a SiliconParams,
    fixed: f64,
}

impl<'a> ChargeBalanceProblem<'a> {
    pub fn new(inputs: &'a SurfaceChargeInputs, params: &'a SiliconParams) -> Self {
        let fixed = fixed_oxide_charge(inputs.fixed_charge_density, params);
        Self {
            inputs,
            params,
            fixed,
        }
    }
}

impl ScalarProblem for ChargeBalanceProblem<'_> {
    fn residual<T: DualNum<f64> + Copy>(&self, psi_s: T) -> T {
        let bulk = band_bending(psi_s, &self.inputs.carriers, self.params)
            * self.params.bulk_charge_prefactor();
        let trapped = interface_trap_charge(psi_s, self.inputs.traps.as_ref(), self.params);
        bulk + trapped + self.fixed
    }
}

/// Default search seed, a few tenths of a volt into depletion.
const DEFAULT_SEED: f64 = 0.5;

fn validate_inputs(inputs: &SurfaceChargeInputs) -> Result<(), PhysicsError> {
    if !inputs.fixed_charge_density.is_finite() {
        return Err(PhysicsError::InvalidArgument(
            "fixed charge density must be finite",
        ));
    }
    if !inputs.gate_voltage.is_finite() || !inputs.oxide_thickness.is_finite() {
        return Err(PhysicsError::InvalidArgument(
            "gate voltage and oxide thickness must be finite",
        ));
    }
    Ok(())
}

/// Surface potential balancing the total interface charge.
pub fn solve_surface_potential(
    inputs: &SurfaceChargeInputs,
    params: &SiliconParams,
) -> Result<SurfacePotentialResult, PhysicsError> {
    solve_surface_potential_seeded(inputs, params, DEFAULT_SEED)
}

/// Same solve from an explicit seed, for callers probing solution stability.
pub fn solve_surface_potential_seeded(
    inputs: &SurfaceChargeInputs,
    params: &SiliconParams,
    seed: f64,
) -> Result<SurfacePotentialResult, PhysicsError> {
    validate_inputs(inputs)?;

    let problem = ChargeBalanceProblem::new(inputs, params);
    let solver = BracketSolver {
        convergence: Convergence {
            criteria: ConvergenceCriteria::Residual,
            tolerance: Tolerance::Absolute(1e-12),
        },
        ..BracketSolver::default()
    };
    let result = solver.solve(&problem, seed, false)?;

    Ok(SurfacePotentialResult {
        psi_s: result.root,
        residual: result.final_residual,
        iterations: result.iterations,
    })
}

/// Newton alternative to the bracketing solve, with the derivative of the
/// full balance (trap term included) supplied by dual numbers. Used to
/// cross-check the bracketing result.
pub fn solve_surface_potential_newton(
    inputs: &SurfaceChargeInputs,
    params: &SiliconParams,
    seed: f64,
) -> Result<SurfacePotentialResult, PhysicsError> {
    validate_inputs(inputs)?;

    let problem = ChargeBalanceProblem::new(inputs, params);
    let solver = NewtonSolver {
        tolerance: 1e-12,
        max_iterations: 200,
        max_step: Some(0.5),
    };
    let result = solver.solve(&problem, seed, false)?;

    Ok(SurfacePotentialResult {
        psi_s: result.root,
        residual: result.final_residual,
        iterations: result.iterations,
    })
}
