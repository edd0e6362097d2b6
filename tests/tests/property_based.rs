//! Property-based tests over `abeles-core`'s PCHIP, transfer-matrix and
//! derivative machinery.

use abeles_core::dispersion::{ConstantDispersion, Dispersion};
use abeles_core::matrix::{admittance, amplitude_rt, amplitude_rt_reverse, compose, cos_theta, Layer, Polarization};
use abeles_core::{Complex, Pchip, Wvls};
use proptest::prelude::*;

fn sorted_distinct_f64s(n: usize, lo: f64, hi: f64) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(lo..hi, n).prop_map(move |mut v| {
        v.sort_by(|a, b| a.partial_cmp(b).unwrap());
        v.dedup_by(|a, b| (*a - *b).abs() < 1e-6);
        while v.len() < 2 {
            v.push(v.last().copied().unwrap_or(lo) + 1.0);
        }
        v
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn pchip_passes_through_every_data_point(
        x in sorted_distinct_f64s(6, 0.0, 100.0),
        y in prop::collection::vec(-10.0..10.0_f64, 6),
    ) {
        let y = y.into_iter().take(x.len()).collect::<Vec<_>>();
        let mut p = Pchip::new(x.clone(), y.clone()).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            let got = p.evaluate(*xi).unwrap();
            prop_assert!((got - yi).abs() < 1e-8);
        }
    }

    #[test]
    fn pchip_monotone_input_stays_monotone_between_knots(
        x in sorted_distinct_f64s(8, 0.0, 50.0),
        seed in 0u64..1000,
    ) {
        // Build strictly increasing y from the seed so the profile is
        // genuinely monotone.
        let mut y = Vec::with_capacity(x.len());
        let mut acc = (seed % 7) as f64;
        for i in 0..x.len() {
            acc += 1.0 + ((seed as f64 + i as f64) % 3.0);
            y.push(acc);
        }
        let mut p = Pchip::new(x.clone(), y).unwrap();
        let (lo, hi) = p.domain();
        let steps = 50;
        let mut prev = p.evaluate(lo).unwrap();
        for k in 1..=steps {
            let xq = lo + (hi - lo) * k as f64 / steps as f64;
            let v = p.evaluate(xq).unwrap();
            prop_assert!(v >= prev - 1e-6);
            prev = v;
        }
    }

    #[test]
    fn pchip_inverse_roundtrips_forward_evaluation(
        x in sorted_distinct_f64s(5, 0.0, 20.0),
        seed in 0u64..1000,
    ) {
        let mut y = Vec::with_capacity(x.len());
        let mut acc = (seed % 5) as f64;
        for i in 0..x.len() {
            acc += 1.0 + ((seed as f64 + i as f64) % 2.0);
            y.push(acc);
        }
        let mut p = Pchip::new(x.clone(), y).unwrap();
        let (lo, hi) = p.domain();
        for k in 1..5 {
            let xq = lo + (hi - lo) * k as f64 / 5.0;
            let yq = p.evaluate(xq).unwrap();
            let back = p.evaluate_inverse(yq).unwrap();
            prop_assert!((back - xq).abs() < 1e-4);
        }
    }

    #[test]
    fn lossless_stack_conserves_energy(
        n_film in 1.2..2.4_f64,
        d_film in 10.0..500.0_f64,
        n_sub in 1.1..2.2_f64,
        lambda in 380.0..780.0_f64,
    ) {
        let wvls = Wvls::linspace(lambda, lambda, 1);
        let incident = ConstantDispersion::new(1.0, 0.0).to_n(wvls.clone());
        let film = ConstantDispersion::new(n_film, 0.0).to_n(wvls.clone());
        let substrate = ConstantDispersion::new(n_sub, 0.0).to_n(wvls.clone());

        let eta0 = admittance(incident.values()[0], cos_theta(incident.values()[0], Complex::ZERO), Polarization::S);
        let etas = admittance(substrate.values()[0], cos_theta(substrate.values()[0], Complex::ZERO), Polarization::S);
        let layers = vec![Layer { n: &film, d: d_film }];
        let m = compose(&layers, 0, lambda, Complex::ZERO, Polarization::S);
        let (r, t) = amplitude_rt(m, eta0, etas);
        let (rr, tt, _aa) = abeles_core::power_rta(r, t, eta0, etas);
        prop_assert!((rr + tt - 1.0).abs() < 1e-8, "R+T={}", rr + tt);
    }

    #[test]
    fn forward_and_reverse_reflectance_match_for_lossless_symmetric_media(
        n_film in 1.2..2.4_f64,
        d_film in 10.0..500.0_f64,
        n_bound in 1.1..2.2_f64,
        lambda in 380.0..780.0_f64,
    ) {
        // With identical media on both sides, forward and reverse
        // reflectance must agree by the stack's left-right symmetry.
        let wvls = Wvls::linspace(lambda, lambda, 1);
        let bound = ConstantDispersion::new(n_bound, 0.0).to_n(wvls.clone());
        let film = ConstantDispersion::new(n_film, 0.0).to_n(wvls.clone());

        let eta = admittance(bound.values()[0], cos_theta(bound.values()[0], Complex::ZERO), Polarization::S);
        let layers = vec![Layer { n: &film, d: d_film }];
        let m = compose(&layers, 0, lambda, Complex::ZERO, Polarization::S);
        let (r_fwd, _t_fwd) = amplitude_rt(m, eta, eta);
        let (r_rev, _t_rev) = amplitude_rt_reverse(m, eta, eta);
        prop_assert!((r_fwd.norm_sqr() - r_rev.norm_sqr()).abs() < 1e-8);
    }

    #[test]
    fn dispersion_index_is_finite_across_visible_range(
        a in 1.2..2.0_f64,
        b in 0.0..0.02_f64,
        lambda in 380.0..780.0_f64,
    ) {
        let model = abeles_core::CauchyDispersion::new(a, b, 0.0);
        let idx = model.index(lambda);
        prop_assert!(idx.is_finite());
        prop_assert!(idx.re > 0.0);
    }
}
