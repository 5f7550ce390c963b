//! Steady-state surface recombination through a midgap trap level,
//! simplified Shockley-Read-Hall form.

use crate::physics::params::SiliconParams;
use crate::physics::quasi_fermi::CarrierState;
use crate::physics::PhysicsError;

/// Recombination rate [cm^-2 s^-1] for a midgap trap of areal density `dit`
/// [cm^-2] with capture cross sections `sigma_n`, `sigma_p` [cm^2].
///
/// The SRH auxiliary concentrations collapse to `n1 = p1 = ni` for a trap
/// level exactly at midgap. The carrier state is taken as already
/// surface-evaluated (see [`CarrierState::at_surface`]); at equilibrium
/// (`n = p = ni`) the rate is identically zero.
pub fn surface_recombination_rate(
    carriers: &CarrierState,
    dit: f64,
    sigma_n: f64,
    sigma_p: f64,
    params: &SiliconParams,
) -> Result<f64, PhysicsError> {
    if !dit.is_finite() || dit < 0.0 {
        return Err(PhysicsError::InvalidArgument(
            "trap density must be finite and non-negative",
        ));
    }

    let (ns, ps, ni) = (carriers.n, carriers.p, params.ni);
    if !(sigma_n > 0.0) || !(sigma_p > 0.0) || !(ns > 0.0) || !(ps > 0.0) {
        return Err(PhysicsError::Domain(format!(
            "recombination denominator requires positive sigma_n ({sigma_n:e}), \
             sigma_p ({sigma_p:e}), n ({ns:e}) and p ({ps:e})"
        )));
    }

    let driving = ns * ps - ni * ni;
    let denominator = (ns + ni) / sigma_p + (ps + ni) / sigma_n;

    Ok(driving * dit / denominator)
}
