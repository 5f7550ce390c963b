use nalgebra::DVector;
use silsurf::numerics::bisection::BracketSolver;
use silsurf::physics::params::SiliconParams;
use silsurf::physics::quasi_fermi::{from_injection, from_voltage};
use silsurf::physics::recombination::surface_recombination_rate;
use silsurf::physics::surface::{
    solve_surface_potential_newton, ChargeBalanceProblem, SurfaceChargeInputs,
};
use silsurf::physics::DopingType;
use silsurf::processing::csv_writer;
use silsurf::processing::summary::ScenarioSummary;
use silsurf::sweep::{run_sweep, SweepConfig};
use std::fs;

fn main() {
    fs::create_dir_all("output/main").expect("Failed to create output directory");

    let params = SiliconParams::silicon_300k();
    params.log_scales();

    // Representative scenario: n-type wafer under 0.3 V photovoltage with
    // 1e12 cm^-2 of fixed oxide charge.
    let doping = 1e15;
    let carriers =
        from_voltage(0.3, DopingType::NType, doping, &params).expect("quasi-Fermi solve failed");

    // Cross-validate against the closed-form inverse.
    let echoed = from_injection(carriers.delta_n, DopingType::NType, doping, &params)
        .expect("injection state failed");
    let round_trip_defect = ((echoed.v - carriers.v) / carriers.v).abs();
    println!(
        "Round trip: V = {:.6} V reproduced to {:.3e} (Δn = {:.4e} cm⁻³)\n",
        carriers.v, round_trip_defect, carriers.delta_n
    );

    let mut summary = ScenarioSummary::from_scenario(&params, &carriers);
    summary.add_round_trip_defect(round_trip_defect);

    let inputs = SurfaceChargeInputs {
        fixed_charge_density: 1e12,
        carriers,
        gate_voltage: 0.0,
        oxide_thickness: 10e-9,
        traps: None,
    };

    // Bracketing solve, with per-iteration logging and history output.
    println!("Running bracketing surface-potential solver...");
    let problem = ChargeBalanceProblem::new(&inputs, &params);
    let bracket_solver = BracketSolver::default();
    match bracket_solver.solve(&problem, 0.5, true) {
        Ok(result) => {
            println!("Bracketing solver finished successfully.\n");
            summary.add_bracket_info(result.root, result.iterations, result.final_residual);
            csv_writer::write_history("output/main/solver_history.csv", &result.history)
                .expect("Failed to write solver history");
        }
        Err(e) => eprintln!("Bracketing solver failed: {}", e),
    }

    // Newton cross-check through the dual-number derivative.
    println!("Running Newton surface-potential solver...");
    match solve_surface_potential_newton(&inputs, &params, 0.5) {
        Ok(result) => {
            println!("Newton solver finished successfully.\n");
            summary.add_newton_info(result.psi_s, result.iterations, result.residual);
        }
        Err(e) => eprintln!("Newton solver failed: {}", e),
    }

    if let Some(psi_s) = summary.psi_bracket {
        let surface = carriers.at_surface(psi_s, &params);
        let rate = surface_recombination_rate(&surface, 1e10, 1e-15, 1e-15, &params)
            .expect("recombination rate failed");
        summary.set_recombination_rate(rate);
    }

    run_demo_sweep(&params, &mut summary);

    summary
        .write_to_file("output/main/scenario_summary.txt")
        .expect("Failed to write summary");
    summary.print_to_console();

    println!("Summary saved to output/main/scenario_summary.txt");
}

fn run_demo_sweep(params: &SiliconParams, summary: &mut ScenarioSummary) {
    let delta_n_values: Vec<f64> = (11..=15).map(|e| 10f64.powi(e)).collect();
    let doping_values = vec![1e14, 1e15, 1e16];
    let config = SweepConfig::default();

    println!(
        "Sweeping {} injection levels x {} doping levels...",
        delta_n_values.len(),
        doping_values.len()
    );
    let records = run_sweep(&delta_n_values, &doping_values, &config, params);

    let mut delta_n = Vec::new();
    let mut doping = Vec::new();
    let mut photovoltage = Vec::new();
    let mut psi_bracket = Vec::new();
    let mut recombination = Vec::new();
    let mut psi_newton = Vec::new();

    for record in records.iter().filter_map(|r| r.as_ref().ok()) {
        delta_n.push(record.delta_n);
        doping.push(record.doping);
        photovoltage.push(record.photovoltage);
        psi_bracket.push(record.psi_s);
        recombination.push(record.recombination_rate);
    }
    let failures = records.iter().filter(|r| r.is_err()).count();
    if failures > 0 {
        eprintln!("{failures} sweep points failed to converge");
    }

    // Re-solve each converged point with Newton for the comparison column.
    for (&dn, &dop) in delta_n.iter().zip(doping.iter()) {
        let carriers = from_voltage(
            from_injection(dn, config.doping_type, dop, params)
                .expect("sweep state")
                .v,
            config.doping_type,
            dop,
            params,
        )
        .expect("sweep state");
        let inputs = SurfaceChargeInputs {
            fixed_charge_density: config.fixed_charge_density,
            carriers,
            gate_voltage: config.gate_voltage,
            oxide_thickness: config.oxide_thickness,
            traps: None,
        };
        let newton = solve_surface_potential_newton(&inputs, params, 0.5).expect("newton solve");
        psi_newton.push(newton.psi_s);
    }

    summary.add_solver_comparison(
        &DVector::from_vec(psi_bracket.clone()),
        &DVector::from_vec(psi_newton.clone()),
    );

    csv_writer::write_columns(
        "output/main/sweep.csv",
        &[
            ("delta_n", delta_n),
            ("doping", doping),
            ("photovoltage", photovoltage),
            ("psi_s", psi_bracket),
            ("psi_s_newton", psi_newton),
            ("recombination", recombination),
        ],
    )
    .expect("Failed to write sweep");
    println!("Sweep saved to output/main/sweep.csv\n");
}
