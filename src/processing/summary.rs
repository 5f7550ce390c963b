use crate::physics::params::SiliconParams;
use crate::physics::quasi_fermi::CarrierState;
use nalgebra::DVector;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Collected results of one surface-physics scenario, written to a text
/// report and echoed to the console.
pub struct ScenarioSummary {
    // Material scales
    pub v_t: f64,
    pub l_diff: f64,
    pub charge_prefactor: f64,

    // Carrier state
    pub doping: f64,
    pub n0: f64,
    pub p0: f64,
    pub n: f64,
    pub p: f64,
    pub phi_n: f64,
    pub phi_p: f64,
    pub photovoltage: f64,
    pub delta_n: f64,

    // Cross-validation
    pub round_trip_defect: Option<f64>,

    // Surface potential solves
    pub bracket_iterations: Option<u32>,
    pub bracket_residual: Option<f64>,
    pub psi_bracket: Option<f64>,
    pub newton_iterations: Option<u32>,
    pub newton_residual: Option<f64>,
    pub psi_newton: Option<f64>,
    pub max_psi_diff: Option<f64>,
    pub mean_psi_diff: Option<f64>,

    pub recombination_rate: Option<f64>,
}

impl ScenarioSummary {
    pub fn from_scenario(params: &SiliconParams, carriers: &CarrierState) -> Self {
        Self {
            v_t: params.v_t,
            l_diff: params.l_diff,
            charge_prefactor: params.bulk_charge_prefactor(),
            doping: carriers.doping,
            n0: carriers.n0,
            p0: carriers.p0,
            n: carriers.n,
            p: carriers.p,
            phi_n: carriers.phi_n,
            phi_p: carriers.phi_p,
            photovoltage: carriers.v,
            delta_n: carriers.delta_n,
            round_trip_defect: None,
            bracket_iterations: None,
            bracket_residual: None,
            psi_bracket: None,
            newton_iterations: None,
            newton_residual: None,
            psi_newton: None,
            max_psi_diff: None,
            mean_psi_diff: None,
            recombination_rate: None,
        }
    }

    pub fn add_round_trip_defect(&mut self, defect: f64) {
        self.round_trip_defect = Some(defect);
    }

    pub fn add_bracket_info(&mut self, psi_s: f64, iterations: u32, residual: f64) {
        self.psi_bracket = Some(psi_s);
        self.bracket_iterations = Some(iterations);
        self.bracket_residual = Some(residual);
    }

    pub fn add_newton_info(&mut self, psi_s: f64, iterations: u32, residual: f64) {
        self.psi_newton = Some(psi_s);
        self.newton_iterations = Some(iterations);
        self.newton_residual = Some(residual);
    }

    /// Compare the surface potentials produced by the two solvers over a
    /// sweep, point by point.
    pub fn add_solver_comparison(&mut self, bracket: &DVector<f64>, newton: &DVector<f64>) {
        let diffs: Vec<f64> = bracket
            .iter()
            .zip(newton.iter())
            .map(|(b, n)| (b - n).abs())
            .collect();
        self.max_psi_diff = Some(diffs.iter().cloned().fold(0.0, f64::max));
        self.mean_psi_diff = Some(diffs.iter().sum::<f64>() / diffs.len().max(1) as f64);
    }

    pub fn set_recombination_rate(&mut self, rate: f64) {
        self.recombination_rate = Some(rate);
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;

        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file, "SILICON SURFACE SCENARIO SUMMARY")?;
        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file)?;

        writeln!(file, "MATERIAL SCALES")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Thermal voltage:     {:.6e} V", self.v_t)?;
        writeln!(file, "Diffusion length:    {:.6e} cm", self.l_diff)?;
        writeln!(file, "Charge prefactor:    {:.6e} C/m²", self.charge_prefactor)?;
        writeln!(file)?;

        writeln!(file, "CARRIER STATE")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Doping:              {:.2e} cm⁻³", self.doping)?;
        writeln!(file, "Equilibrium:         n0 = {:.4e}, p0 = {:.4e} cm⁻³", self.n0, self.p0)?;
        writeln!(file, "Perturbed:           n  = {:.4e}, p  = {:.4e} cm⁻³", self.n, self.p)?;
        writeln!(file, "Quasi-Fermi:         φn = {:.6} V, φp = {:.6} V", self.phi_n, self.phi_p)?;
        writeln!(file, "Photovoltage:        {:.6} V", self.photovoltage)?;
        writeln!(file, "Excess density:      {:.4e} cm⁻³", self.delta_n)?;
        if let Some(defect) = self.round_trip_defect {
            writeln!(file, "Round-trip defect:   {:.3e} (relative)", defect)?;
        }
        writeln!(file)?;

        if self.psi_bracket.is_some() || self.psi_newton.is_some() {
            writeln!(file, "SURFACE POTENTIAL")?;
            writeln!(file, "{}", "-".repeat(60))?;
            if let (Some(psi), Some(iter), Some(res)) = (
                self.psi_bracket,
                self.bracket_iterations,
                self.bracket_residual,
            ) {
                writeln!(file, "Bracketing solver:")?;
                writeln!(file, "  ψs:                {:.6} V", psi)?;
                writeln!(file, "  Iterations:        {}", iter)?;
                writeln!(file, "  Final residual:    {:.6e} C/m²", res)?;
            }
            if let (Some(psi), Some(iter), Some(res)) = (
                self.psi_newton,
                self.newton_iterations,
                self.newton_residual,
            ) {
                writeln!(file, "Newton solver:")?;
                writeln!(file, "  ψs:                {:.6} V", psi)?;
                writeln!(file, "  Iterations:        {}", iter)?;
                writeln!(file, "  Final residual:    {:.6e} C/m²", res)?;
            }
            writeln!(file)?;
        }

        if let (Some(max_diff), Some(mean_diff)) = (self.max_psi_diff, self.mean_psi_diff) {
            writeln!(file, "SOLVER COMPARISON (sweep)")?;
            writeln!(file, "{}", "-".repeat(60))?;
            writeln!(file, "Max ψs difference:   {:.6e} V", max_diff)?;
            writeln!(file, "Mean ψs difference:  {:.6e} V", mean_diff)?;
            writeln!(file)?;
        }

        if let Some(rate) = self.recombination_rate {
            writeln!(file, "SURFACE RECOMBINATION")?;
            writeln!(file, "{}", "-".repeat(60))?;
            writeln!(file, "Us:                  {:.6e} cm⁻² s⁻¹", rate)?;
            writeln!(file)?;
        }

        writeln!(file, "{}", "=".repeat(60))?;

        Ok(())
    }

    pub fn print_to_console(&self) {
        println!("\n{}", "=".repeat(60));
        println!("SCENARIO SUMMARY");
        println!("{}", "=".repeat(60));
        println!("Photovoltage:  {:.4} V", self.photovoltage);
        println!("Excess Δn:     {:.3e} cm⁻³", self.delta_n);
        if let Some(defect) = self.round_trip_defect {
            println!("Round trip:    {:.3e}", defect);
        }
        if let (Some(b), Some(n)) = (self.psi_bracket, self.psi_newton) {
            println!("ψs:            bracket={:.6} V, newton={:.6} V", b, n);
        }
        if let Some(max_diff) = self.max_psi_diff {
            println!("Max ψs diff:   {:.3e} V", max_diff);
        }
        if let Some(rate) = self.recombination_rate {
            println!("Us:            {:.3e} cm⁻² s⁻¹", rate);
        }
        println!("{}\n", "=".repeat(60));
    }
}
