//! Quasi-Fermi level determination for a doped silicon sample under carrier
//! injection or a known photovoltage.
//!
//! The two entry points are analytic inverses of each other:
//! [`from_injection`] is closed-form, [`from_voltage`] recovers the same
//! state from the photovoltage by solving bulk charge neutrality. Their
//! round trip is the correctness anchor for everything downstream.

use crate::numerics::newton::NewtonSolver;
use crate::physics::params::SiliconParams;
use crate::physics::{DopingType, PhysicsError, ScalarProblem};
use num_dual::DualNum;

/// Carrier populations and quasi-Fermi potentials of a bulk sample.
///
/// Concentrations in cm⁻³, potentials in volts. Immutable value record;
/// `v == phi_p - phi_n` holds by construction.
#[derive(Clone, Copy, Debug)]
pub struct CarrierState {
    pub n0: f64,
    pub p0: f64,
    pub n: f64,
    pub p: f64,
    pub phi_n: f64,
    pub phi_p: f64,
    /// Photovoltage, phi_p - phi_n.
    pub v: f64,
    /// Excess carrier density above equilibrium.
    pub delta_n: f64,
    pub doping_type: DopingType,
    pub doping: f64,
}

impl CarrierState {
    /// Carrier populations at the surface for a given band bending.
    ///
    /// Quasi-Fermi potentials stay flat through the surface region, so only
    /// the concentrations shift: holes pile up under positive `psi_s`,
    /// electrons under negative. The n*p product is preserved.
    pub fn at_surface(&self, psi_s: f64, params: &SiliconParams) -> CarrierState {
        let x = psi_s / params.v_t;
        CarrierState {
            n: self.n * (-x).exp(),
            p: self.p * x.exp(),
            ..*self
        }
    }
}

/// Equilibrium populations from charge neutrality: majority - minority =
/// doping with the mass-action product held at ni². Solving the quadratic
/// exactly (instead of the usual majority ≈ doping shortcut) keeps the
/// injected state on the same neutrality manifold [`from_voltage`] solves
/// on, which is what makes the two entry points exact inverses.
fn equilibrium_concentrations(
    doping_type: DopingType,
    doping: f64,
    params: &SiliconParams,
) -> (f64, f64) {
    let ni = params.ni;
    let majority = 0.5 * (doping + (doping * doping + 4.0 * ni * ni).sqrt());
    let minority = ni * ni / majority;
    match doping_type {
        DopingType::NType => (majority, minority),
        DopingType::PType => (minority, majority),
    }
}

fn validate_doping(doping: f64, delta_or_v: f64) -> Result<(), PhysicsError> {
    if !doping.is_finite() || doping <= 0.0 {
        return Err(PhysicsError::InvalidArgument(
            "doping concentration must be positive and finite",
        ));
    }
    if !delta_or_v.is_finite() {
        return Err(PhysicsError::InvalidArgument(
            "injection level / photovoltage must be finite",
        ));
    }
    Ok(())
}

/// Quasi-Fermi state from an injected carrier density.
///
/// Equal-injection assumption: `delta_n` is added to both populations.
/// Extraction (`delta_n < 0`) is accepted down to the point where a
/// population would vanish.
pub fn from_injection(
    delta_n: f64,
    doping_type: DopingType,
    doping: f64,
    params: &SiliconParams,
) -> Result<CarrierState, PhysicsError> {
    validate_doping(doping, delta_n)?;

    let (n0, p0) = equilibrium_concentrations(doping_type, doping, params);
    let n = n0 + delta_n;
    let p = p0 + delta_n;
    if n <= 0.0 || p <= 0.0 {
        return Err(PhysicsError::Domain(format!(
            "injection level {delta_n:e} cm^-3 depletes the sample (n0 = {n0:e}, p0 = {p0:e})"
        )));
    }

    let phi_n = -params.v_t * (n / params.ni).ln();
    let phi_p = params.v_t * (p / params.ni).ln();

    Ok(CarrierState {
        n0,
        p0,
        n,
        p,
        phi_n,
        phi_p,
        v: phi_p - phi_n,
        delta_n,
        doping_type,
        doping,
    })
}

/// Bulk charge neutrality `p - n + Nd - Na = 0`, written in the normalized
/// electron quasi-Fermi potential `x = phi_n / V_T` at a fixed photovoltage,
/// and scaled by the doping so the residual is O(1).
struct NeutralityProblem {
    /// Photovoltage in thermal-voltage units.
    v_norm: f64,
    ni_over_doping: f64,
    /// +1 for donors, -1 for acceptors.
    doping_sign: f64,
}

impl ScalarProblem for NeutralityProblem {
    fn residual<T: DualNum<f64> + Copy>(&self, x: T) -> T {
        let p = (x + self.v_norm).exp();
        let n = (-x).exp();
        (p - n) * self.ni_over_doping + self.doping_sign
    }
}

/// Quasi-Fermi state from a known photovoltage.
///
/// Newton from the charge-neutral reference point `phi_n = 0`; the step clamp
/// keeps the exponentials of the neutrality residual in range while the
/// iterate walks over to the root.
pub fn from_voltage(
    v: f64,
    doping_type: DopingType,
    doping: f64,
    params: &SiliconParams,
) -> Result<CarrierState, PhysicsError> {
    validate_doping(doping, v)?;

    let problem = NeutralityProblem {
        v_norm: v / params.v_t,
        ni_over_doping: params.ni / doping,
        doping_sign: match doping_type {
            DopingType::NType => 1.0,
            DopingType::PType => -1.0,
        },
    };

    let solver = NewtonSolver {
        tolerance: 1e-9,
        max_iterations: 100,
        max_step: Some(5.0),
    };
    let result = solver.solve(&problem, 0.0, false)?;

    let x = result.root;
    let phi_n = x * params.v_t;
    let phi_p = phi_n + v;
    let n = params.ni * (-x).exp();
    let p = params.ni * (x + v / params.v_t).exp();

    let (n0, p0) = equilibrium_concentrations(doping_type, doping, params);
    // Symmetric-perturbation estimate of the excess density.
    let delta_n = ((p - p0) + (n - n0)) / 2.0;

    Ok(CarrierState {
        n0,
        p0,
        n,
        p,
        phi_n,
        phi_p,
        v,
        delta_n,
        doping_type,
        doping,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injection_splits_quasi_fermi_levels() {
        let params = SiliconParams::silicon_300k();
        let state = from_injection(1e13, DopingType::NType, 1e15, &params).expect("state");
        assert!(state.v > 0.0);
        assert!((state.v - (state.phi_p - state.phi_n)).abs() < 1e-15);
        assert!((state.n - state.n0 - 1e13).abs() / state.n < 1e-15);
        // The exact-neutrality equilibrium sits a minority concentration
        // above the doping.
        assert!((state.n0 - 1e15) / 1e15 < 1e-9 && state.n0 > 1e15);
    }

    #[test]
    fn np_product_follows_photovoltage() {
        // n*p = ni^2 * exp(V / V_T) holds independently of doping.
        let params = SiliconParams::silicon_300k();
        let state = from_injection(1e14, DopingType::PType, 1e16, &params).expect("state");
        let np = state.n * state.p;
        let expected = params.ni * params.ni * (state.v / params.v_t).exp();
        assert!((np - expected).abs() / expected < 1e-10);
    }

    #[test]
    fn surface_evaluation_preserves_np_product() {
        let params = SiliconParams::silicon_300k();
        let state = from_injection(1e12, DopingType::NType, 1e15, &params).expect("state");
        let surface = state.at_surface(-0.3, &params);
        assert!((surface.n * surface.p - state.n * state.p).abs() / (state.n * state.p) < 1e-12);
        assert!(surface.p < state.p);
        assert!(surface.n > state.n);
    }
}
