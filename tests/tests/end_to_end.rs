//! End-to-end scenario tests: whole-stack behaviours checked against
//! closed-form optics results or finite-difference cross-checks, rather
//! than unit-level checks of a single function.

use abeles_core::derivatives::pre_post::PrePost;
use abeles_core::derivatives::thickness_derivative;
use abeles_core::dispersion::ConstantDispersion;
use abeles_core::dispersion::Dispersion;
use abeles_core::matrix::{admittance, amplitude_rt, compose, cos_theta, ellipsometry, Layer, Polarization};
use abeles_core::{Complex, Pchip, Wvls};

#[test]
fn quarter_wave_index_matched_coating_gives_zero_reflectance() {
    let n0 = 1.0;
    let ns = 1.52;
    let n1 = (n0 * ns).sqrt();
    let lambda = 550.0;
    let d = lambda / (4.0 * n1);

    let wvls = Wvls::linspace(lambda, lambda, 1);
    let incident = ConstantDispersion::new(n0, 0.0).to_n(wvls.clone());
    let film = ConstantDispersion::new(n1, 0.0).to_n(wvls.clone());
    let substrate = ConstantDispersion::new(ns, 0.0).to_n(wvls.clone());

    let eta0 = admittance(incident.values()[0], cos_theta(incident.values()[0], Complex::ZERO), Polarization::S);
    let etas = admittance(substrate.values()[0], cos_theta(substrate.values()[0], Complex::ZERO), Polarization::S);
    let layers = vec![Layer { n: &film, d }];
    let m = compose(&layers, 0, lambda, Complex::ZERO, Polarization::S);
    let (r, _t) = amplitude_rt(m, eta0, etas);

    assert!(r.norm_sqr() < 1e-6, "R = {}", r.norm_sqr());
}

#[test]
fn lossless_high_low_bragg_stack_conserves_energy_at_every_wavelength() {
    let wvls = Wvls::linspace(400.0, 700.0, 61);
    let incident = ConstantDispersion::new(1.0, 0.0).to_n(wvls.clone());
    let substrate = ConstantDispersion::new(1.52, 0.0).to_n(wvls.clone());
    let high = ConstantDispersion::new(2.35, 0.0).to_n(wvls.clone());
    let low = ConstantDispersion::new(1.45, 0.0).to_n(wvls.clone());

    let design_lambda = 550.0;
    let d_high = design_lambda / (4.0 * 2.35);
    let d_low = design_lambda / (4.0 * 1.45);

    let mut layers = Vec::new();
    for _ in 0..6 {
        layers.push(Layer { n: &high, d: d_high });
        layers.push(Layer { n: &low, d: d_low });
    }

    let stack = abeles_core::matrix::Stack {
        wvls: wvls.clone(),
        incident: &incident,
        layers,
        substrate: &substrate,
        angle_deg: 0.0,
        polarization: Polarization::S,
    };
    let result = stack.evaluate();

    for i in 0..wvls.len() {
        let sum = result.reflectance[i] + result.transmittance[i] + result.absorptance[i];
        assert!((sum - 1.0).abs() < 1e-8, "at i={i}: R+T+A={sum}");
    }

    // Near the design wavelength the Bragg stack should reflect strongly.
    let mid = wvls.len() / 2;
    assert!(result.reflectance[mid] > 0.9, "R at design lambda = {}", result.reflectance[mid]);
}

#[test]
fn absorbing_film_splits_power_between_reflection_transmission_and_absorption() {
    let lambda = 550.0;
    let wvls = Wvls::linspace(lambda, lambda, 1);
    let incident = ConstantDispersion::new(1.0, 0.0).to_n(wvls.clone());
    let substrate = ConstantDispersion::new(1.52, 0.0).to_n(wvls.clone());
    let film = ConstantDispersion::new(2.0, 0.3).to_n(wvls.clone());

    let eta0 = admittance(incident.values()[0], cos_theta(incident.values()[0], Complex::ZERO), Polarization::S);
    let etas = admittance(substrate.values()[0], cos_theta(substrate.values()[0], Complex::ZERO), Polarization::S);
    let layers = vec![Layer { n: &film, d: 80.0 }];
    let m = compose(&layers, 0, lambda, Complex::ZERO, Polarization::S);
    let (r, t) = amplitude_rt(m, eta0, etas);
    let (rr, tt, aa) = abeles_core::power_rta(r, t, eta0, etas);

    assert!((rr + tt + aa - 1.0).abs() < 1e-8, "R+T+A={}", rr + tt + aa);
    assert!(aa > 0.01, "absorbing film should show measurable absorption, A={aa}");
}

#[test]
fn ellipsometry_on_bare_glass_matches_fresnel_closed_form() {
    let angle_deg = 60.0_f64;
    let n0 = 1.0;
    let ns = 1.52;
    let lambda = 550.0;

    let sin_t0 = angle_deg.to_radians().sin();
    let sin2_theta0 = Complex::from(sin_t0 * sin_t0);

    let n0c = Complex::from(n0);
    let nsc = Complex::from(ns);
    let ct0 = cos_theta(n0c, sin2_theta0);
    let cts = cos_theta(nsc, sin2_theta0);

    // Closed-form Fresnel amplitude coefficients at a bare interface.
    let eta0_s = admittance(n0c, ct0, Polarization::S);
    let etas_s = admittance(nsc, cts, Polarization::S);
    let r_s_expected = (eta0_s - etas_s) / (eta0_s + etas_s);

    let eta0_p = admittance(n0c, ct0, Polarization::P);
    let etas_p = admittance(nsc, cts, Polarization::P);
    let r_p_expected = (eta0_p - etas_p) / (eta0_p + etas_p);

    let wvls = Wvls::linspace(lambda, lambda, 1);
    let incident = ConstantDispersion::new(n0, 0.0).to_n(wvls.clone());
    let substrate = ConstantDispersion::new(ns, 0.0).to_n(wvls.clone());
    let layers: Vec<Layer<'_>> = vec![];

    let m_s = compose(&layers, 0, lambda, sin2_theta0, Polarization::S);
    let (r_s, _) = amplitude_rt(m_s, admittance(incident.values()[0], ct0, Polarization::S), admittance(substrate.values()[0], cts, Polarization::S));
    let m_p = compose(&layers, 0, lambda, sin2_theta0, Polarization::P);
    let (r_p, _) = amplitude_rt(m_p, admittance(incident.values()[0], ct0, Polarization::P), admittance(substrate.values()[0], cts, Polarization::P));

    assert!((r_s.re - r_s_expected.re).abs() < 1e-9);
    assert!((r_p.re - r_p_expected.re).abs() < 1e-9);

    let (psi, _delta) = ellipsometry(r_p, r_s);
    let expected_psi = (r_p.abs() / r_s.abs()).atan().to_degrees();
    assert!((psi - expected_psi).abs() < 1e-6);
}

#[test]
fn pchip_monotone_limiter_prevents_overshoot_on_a_flat_then_rising_profile() {
    // The classic Fritsch-Carlson torture case: a flat region followed by a
    // step. A naive cubic spline overshoots past the flat knots; PCHIP must
    // not.
    let x = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
    let y = vec![1.0, 1.0, 1.0, 2.0, 10.0, 10.0];
    let mut p = Pchip::new(x, y).unwrap();

    let mut t = 0.0;
    while t <= 2.0 {
        let v = p.evaluate(t).unwrap();
        assert!((v - 1.0).abs() < 1e-6, "overshoot on flat region at t={t}: {v}");
        t += 0.05;
    }

    let mut t = 4.0;
    while t <= 5.0 {
        let v = p.evaluate(t).unwrap();
        assert!((v - 10.0).abs() < 1e-6, "overshoot on flat region at t={t}: {v}");
        t += 0.05;
    }
}

#[test]
fn analytic_thickness_derivative_matches_finite_difference_on_a_three_layer_stack() {
    let lambda = 550.0;
    let wvls = Wvls::linspace(lambda, lambda, 1);
    let incident = ConstantDispersion::new(1.0, 0.0).to_n(wvls.clone());
    let substrate = ConstantDispersion::new(1.52, 0.0).to_n(wvls.clone());
    let n_a = ConstantDispersion::new(2.1, 0.0).to_n(wvls.clone());
    let n_b = ConstantDispersion::new(1.45, 0.0).to_n(wvls.clone());
    let n_c = ConstantDispersion::new(1.9, 0.0).to_n(wvls.clone());

    let eta0 = admittance(incident.values()[0], cos_theta(incident.values()[0], Complex::ZERO), Polarization::S);
    let etas = admittance(substrate.values()[0], cos_theta(substrate.values()[0], Complex::ZERO), Polarization::S);

    let d_mid = 90.0;
    let reflectance_with_mid_thickness = |d: f64| {
        let layers = vec![
            Layer { n: &n_a, d: 60.0 },
            Layer { n: &n_b, d },
            Layer { n: &n_c, d: 75.0 },
        ];
        let m = compose(&layers, 0, lambda, Complex::ZERO, Polarization::S);
        let (r, _t) = amplitude_rt(m, eta0, etas);
        r.norm_sqr()
    };

    let layers = vec![
        Layer { n: &n_a, d: 60.0 },
        Layer { n: &n_b, d: d_mid },
        Layer { n: &n_c, d: 75.0 },
    ];
    let pp = PrePost::build(&layers, 0, lambda, Complex::ZERO, Polarization::S);
    let m = compose(&layers, 0, lambda, Complex::ZERO, Polarization::S);
    let (r, t) = amplitude_rt(m, eta0, etas);

    let deriv = thickness_derivative(pp.pre[1], pp.post[1], &layers[1], 0, lambda, Complex::ZERO, Polarization::S, eta0, etas, r, t);

    let h = 1e-3;
    let numeric = (reflectance_with_mid_thickness(d_mid + h) - reflectance_with_mid_thickness(d_mid - h)) / (2.0 * h);

    assert!(
        (deriv.d_reflectance - numeric).abs() < 1e-4,
        "analytic={} numeric={}",
        deriv.d_reflectance,
        numeric
    );
}
