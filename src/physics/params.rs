/// Concentrations cross the API in cm⁻³ / cm⁻² (the convention of the surface
/// photovoltage literature); everything coulombic is evaluated in SI. These
/// factors are the only places the two systems meet.
pub const CM3_TO_M3: f64 = 1e6;
pub const CM2_TO_M2: f64 = 1e4;

/// Physical constants and derived scales for a silicon sample.
///
/// Built once and passed explicitly into every solver, so tests can run with
/// alternate temperatures without touching global state.
#[derive(Debug, Clone)]
pub struct SiliconParams {
    pub kb: f64,     // [J/K] Boltzmann constant
    pub t: f64,      // [K] Temperature
    pub q: f64,      // [C] Elementary charge
    pub ni: f64,     // [cm^-3] Intrinsic carrier concentration
    pub eps0: f64,   // [F/m] Vacuum permittivity
    pub eps_si: f64, // Relative permittivity of silicon
    pub eps_ox: f64, // Relative permittivity of the oxide

    // Derived scales
    pub v_t: f64,    // [V] Thermal voltage kT/q
    pub l_diff: f64, // [cm] Intrinsic diffusion length sqrt(D*tau)

    // Transport parameters behind l_diff
    pub d_n: f64,   // [cm^2/s] Electron diffusion coefficient
    pub tau_n: f64, // [s] Bulk minority-carrier lifetime
}

impl SiliconParams {
    /// Silicon at room temperature, the reference material of this crate.
    pub fn silicon_300k() -> Self {
        Self::at_temperature(300.0)
    }

    /// Silicon at an arbitrary temperature. Only the thermal voltage is
    /// re-derived; `ni` stays the supplied 300 K value and must be overridden
    /// through [`Self::with_intrinsic_concentration`] when the temperature
    /// departs far enough from 300 K for it to matter.
    pub fn at_temperature(t: f64) -> Self {
        let kb = 1.380649e-23;
        let q = 1.602176634e-19;
        let v_t = kb * t / q;
        let d_n: f64 = 35.0;
        let tau_n: f64 = 1e-7;

        Self {
            kb,
            t,
            q,
            ni: 9.65e9,
            eps0: 8.854e-12,
            eps_si: 11.68,
            eps_ox: 3.9,
            v_t,
            l_diff: (d_n * tau_n).sqrt(),
            d_n,
            tau_n,
        }
    }

    pub fn with_intrinsic_concentration(mut self, ni: f64) -> Self {
        self.ni = ni;
        self
    }

    /// Prefactor of the bulk silicon charge, sqrt(2 q kT ni eps0 eps_si) with
    /// `ni` taken to m⁻³. Multiplied by the dimensionless band-bending
    /// function it yields a charge density in C/m².
    pub fn bulk_charge_prefactor(&self) -> f64 {
        (2.0 * self.q * self.kb * self.t * (self.ni * CM3_TO_M3) * self.eps0 * self.eps_si).sqrt()
    }

    pub fn log_scales(&self) {
        println!("--- Material Scales ---");
        println!("Thermal voltage (V_T):  {:.4} V", self.v_t);
        println!("Intrinsic conc. (n_i):  {:.2e} cm^-3", self.ni);
        println!("Diffusion length (L_D): {:.4e} cm", self.l_diff);
        println!("Charge prefactor:       {:.4e} C/m^2", self.bulk_charge_prefactor());
        println!("-----------------------\n");
    }
}
