use silsurf::physics::params::SiliconParams;
use silsurf::physics::quasi_fermi::{from_injection, from_voltage, CarrierState};
use silsurf::physics::{DopingType, PhysicsError};

fn rel_err(a: f64, b: f64) -> f64 {
    (a - b).abs() / a.abs().max(b.abs()).max(f64::MIN_POSITIVE)
}

fn assert_states_close(reference: &CarrierState, echoed: &CarrierState, tol: f64) {
    assert!(rel_err(reference.n0, echoed.n0) < tol, "n0 mismatch");
    assert!(rel_err(reference.p0, echoed.p0) < tol, "p0 mismatch");
    assert!(rel_err(reference.n, echoed.n) < tol, "n mismatch");
    assert!(rel_err(reference.p, echoed.p) < tol, "p mismatch");
    assert!(
        (reference.phi_n - echoed.phi_n).abs() < tol,
        "phi_n mismatch: {} vs {}",
        reference.phi_n,
        echoed.phi_n
    );
    assert!(
        (reference.phi_p - echoed.phi_p).abs() < tol,
        "phi_p mismatch"
    );
    assert!(rel_err(reference.v, echoed.v) < tol, "V mismatch");
    assert!(
        rel_err(reference.delta_n, echoed.delta_n) < tol,
        "delta_n mismatch: {:e} vs {:e}",
        reference.delta_n,
        echoed.delta_n
    );
}

#[test]
fn round_trip_reproduces_injection_state() {
    let params = SiliconParams::silicon_300k();

    for doping_type in [DopingType::NType, DopingType::PType] {
        for exp_doping in 14..=18 {
            let doping = 10f64.powi(exp_doping);
            for exp_dn in [10, 12, 14, 15, 17] {
                let delta_n = 10f64.powi(exp_dn);

                let injected =
                    from_injection(delta_n, doping_type, doping, &params).expect("injection");
                let echoed =
                    from_voltage(injected.v, doping_type, doping, &params).expect("voltage");

                assert_states_close(&injected, &echoed, 1e-6);
            }
        }
    }
}

#[test]
fn equilibrium_satisfies_charge_neutrality() {
    // p0 - n0 + (Nd - Na) = 0: the equilibrium comes from the exact
    // neutrality quadratic, so only rounding is left.
    let params = SiliconParams::silicon_300k();

    for exp_doping in 14..=18 {
        let doping = 10f64.powi(exp_doping);

        let n_state = from_injection(1e10, DopingType::NType, doping, &params).expect("state");
        let defect = (n_state.p0 - n_state.n0 + doping) / doping;
        assert!(defect.abs() < 1e-12, "n-type defect {defect:e}");

        let p_state = from_injection(1e10, DopingType::PType, doping, &params).expect("state");
        let defect = (p_state.p0 - p_state.n0 - doping) / doping;
        assert!(defect.abs() < 1e-12, "p-type defect {defect:e}");
    }
}

#[test]
fn solved_state_satisfies_charge_neutrality() {
    let params = SiliconParams::silicon_300k();
    for (doping_type, sign) in [(DopingType::NType, 1.0), (DopingType::PType, -1.0)] {
        let state = from_voltage(0.35, doping_type, 1e15, &params).expect("state");
        let residual = (state.p - state.n + sign * 1e15) / 1e15;
        assert!(residual.abs() < 1e-9, "neutrality residual {residual:e}");
    }
}

#[test]
fn photovoltage_grows_monotonically_with_injection() {
    let params = SiliconParams::silicon_300k();
    for doping_type in [DopingType::NType, DopingType::PType] {
        let mut previous = 0.0;
        for exp_dn in 10..=17 {
            let state = from_injection(10f64.powi(exp_dn), doping_type, 1e15, &params)
                .expect("state");
            assert!(
                state.v > previous,
                "V not increasing at dn = 1e{exp_dn} ({} <= {previous})",
                state.v
            );
            previous = state.v;
        }
    }
}

#[test]
fn photovoltage_vanishes_without_injection() {
    let params = SiliconParams::silicon_300k();
    let state = from_injection(1e-3, DopingType::NType, 1e15, &params).expect("state");
    assert!(state.v.abs() < 1e-6, "V = {} for vanishing injection", state.v);

    // And it keeps shrinking with the injection level.
    let smaller = from_injection(1e-4, DopingType::NType, 1e15, &params).expect("state");
    assert!(smaller.v < state.v);
}

#[test]
fn extraction_below_equilibrium_is_a_domain_error() {
    let params = SiliconParams::silicon_300k();
    // n-type with N = 1e15: min(n0, p0) = p0 ~ 9.3e4
    let result = from_injection(-1e6, DopingType::NType, 1e15, &params);
    assert!(matches!(result, Err(PhysicsError::Domain(_))));

    // Just above the boundary it must still work.
    let state = from_injection(-9e4, DopingType::NType, 1e15, &params).expect("state");
    assert!(state.p > 0.0);
    assert!(state.v < 0.0);
}

#[test]
fn nonpositive_doping_is_rejected() {
    let params = SiliconParams::silicon_300k();
    assert!(matches!(
        from_injection(1e12, DopingType::NType, 0.0, &params),
        Err(PhysicsError::InvalidArgument(_))
    ));
    assert!(matches!(
        from_voltage(0.3, DopingType::PType, -1e15, &params),
        Err(PhysicsError::InvalidArgument(_))
    ));
    assert!(matches!(
        from_voltage(f64::NAN, DopingType::NType, 1e15, &params),
        Err(PhysicsError::InvalidArgument(_))
    ));
}
