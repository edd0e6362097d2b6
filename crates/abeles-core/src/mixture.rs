//! Mixture dispersion: a material whose index varies with a composition
//! coordinate `x` (e.g. an alloy fraction or a graded-index deposition
//! level), interpolated across `M` [`DispersionModel`]s pinned at fixed `x`
//! nodes.
//!
//! Builds on [`DispersionModel`]'s tagged-sum dispatch by holding a *profile*
//! of such models along `x` instead of a single fixed one. Evaluating `n(x)`
//! at a wavelength requires fitting a
//! PCHIP over the `M` nodes' index at that wavelength; since callers
//! typically sweep a `Wvls` grid in order (one composition fixed, wavelength
//! advancing), this module caches the two most recently built per-wavelength
//! profiles ("centre" and "other") so that re-requesting the wavelength
//! just left behind is an O(1) swap rather than an O(M) refit.
//!
//! Refinement usually wants to drive a mixture by "the index at a reference
//! wavelength" rather than the raw composition fraction, so [`Mixture::set_n`]
//! and [`Mixture::set_dn`] invert the reference-wavelength profile for `x`
//! first and fill the whole grid (or its chain-rule derivative) from there —
//! see [`Mixture::invert_x`].

use crate::complex_ior::{Complex, N};
use crate::dispersion::{Dispersion, DispersionModel};
use crate::error::{AbelesError, Result};
use crate::pchip::Pchip;
use crate::wavelength::Wvls;

/// A fitted `n(x)`/`k(x)` profile at one fixed wavelength.
struct Profile {
    lambda_nm: f64,
    n_of_x: Pchip,
    k_of_x: Pchip,
}

/// A material whose complex index is a function of both wavelength and a
/// scalar composition coordinate `x`.
pub struct Mixture {
    x_nodes: Vec<f64>,
    models: Vec<DispersionModel>,
    centre: Option<Profile>,
    other: Option<Profile>,
}

impl Mixture {
    /// Build a mixture from `M >= 1` dispersion models pinned at strictly
    /// increasing composition nodes `x_nodes`. `M == 1` is a legal
    /// degenerate case (a "mixture" of one constituent): the constant-mixture
    /// fast path in [`Self::index_at`] skips profile fitting entirely.
    pub fn new(x_nodes: Vec<f64>, models: Vec<DispersionModel>) -> Result<Self> {
        if x_nodes.len() != models.len() || x_nodes.is_empty() {
            return Err(AbelesError::OutOfDomain {
                x: x_nodes.len() as f64,
                lo: 1.0,
                hi: f64::INFINITY,
            });
        }
        for w in x_nodes.windows(2) {
            if !(w[1] > w[0]) {
                return Err(AbelesError::NonMonotonic {
                    context: "Mixture composition nodes must be strictly increasing",
                });
            }
        }
        Ok(Self {
            x_nodes,
            models,
            centre: None,
            other: None,
        })
    }

    /// True when this mixture has a single constituent and no composition
    /// interpolation is possible or needed.
    pub fn is_constant(&self) -> bool {
        self.models.len() == 1
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.x_nodes[0], self.x_nodes[self.x_nodes.len() - 1])
    }

    fn fit_profile(&self, lambda_nm: f64) -> Result<Profile> {
        let mut n_vals = Vec::with_capacity(self.models.len());
        let mut k_vals = Vec::with_capacity(self.models.len());
        for m in &self.models {
            let ni = m.index(lambda_nm);
            n_vals.push(ni.re);
            k_vals.push(-ni.im);
        }
        let n_of_x = Pchip::new(self.x_nodes.clone(), n_vals)?;
        let k_of_x = Pchip::new(self.x_nodes.clone(), k_vals)?;
        Ok(Profile { lambda_nm, n_of_x, k_of_x })
    }

    /// Make sure a profile for `lambda_nm` is in `centre`, rotating `other`
    /// into `centre` when it already matches (the O(1) path), or building a
    /// fresh one and demoting the stale `centre` into `other` otherwise.
    fn ensure_centre(&mut self, lambda_nm: f64) -> Result<()> {
        if let Some(c) = &self.centre {
            if c.lambda_nm == lambda_nm {
                return Ok(());
            }
        }
        if let Some(o) = &self.other {
            if o.lambda_nm == lambda_nm {
                std::mem::swap(&mut self.centre, &mut self.other);
                return Ok(());
            }
        }
        let fresh = self.fit_profile(lambda_nm)?;
        self.other = self.centre.take();
        self.centre = Some(fresh);
        Ok(())
    }

    /// Explicitly move the cache's centre to `lambda_nm`, reusing `other` in
    /// O(1) if it already holds that wavelength's profile. Exposed so a
    /// caller sweeping a `Wvls` grid can pre-warm the rotation instead of
    /// relying on the implicit call inside `index_at`/`set_dN`.
    pub fn change_index_wvl(&mut self, lambda_nm: f64) -> Result<()> {
        self.ensure_centre(lambda_nm)
    }

    /// Evaluate the complex index at composition `x` and wavelength
    /// `lambda_nm`.
    pub fn index_at(&mut self, lambda_nm: f64, x: f64) -> Result<Complex> {
        if self.models.len() == 1 {
            return Ok(self.models[0].index(lambda_nm));
        }
        self.ensure_centre(lambda_nm)?;
        let centre = self.centre.as_mut().unwrap();
        let n = centre.n_of_x.evaluate(x)?;
        let k = centre.k_of_x.evaluate(x)?;
        // The per-wavelength k(x) PCHIP can dip a hair below zero between
        // nodes; clamp rather than let a mixture read as having gain.
        Ok(Complex::from_nk(n, k.max(0.0)))
    }

    /// `dN/dx` at composition `x` and wavelength `lambda_nm`, used by the
    /// derivative machinery when a parameter is a mixture fraction rather
    /// than a thickness.
    pub fn dindex_at(&mut self, lambda_nm: f64, x: f64) -> Result<Complex> {
        if self.models.len() == 1 {
            return Ok(Complex::ZERO);
        }
        self.ensure_centre(lambda_nm)?;
        let centre = self.centre.as_mut().unwrap();
        let dn = centre.n_of_x.evaluate_derivative(x)?;
        let dk = centre.k_of_x.evaluate_derivative(x)?;
        Ok(Complex::new(dn, -dk))
    }

    /// The range of real index achievable at `lambda_nm` across the full
    /// composition range (the nodes' extremes, since the PCHIP profile does
    /// not overshoot monotone input and the nodes bracket non-monotone
    /// input).
    pub fn index_range_at(&mut self, lambda_nm: f64) -> Result<(f64, f64)> {
        self.ensure_centre(lambda_nm)?;
        let centre = self.centre.as_ref().unwrap();
        let ys = centre.n_of_x.y();
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for &y in ys {
            lo = lo.min(y);
            hi = hi.max(y);
        }
        Ok((lo, hi))
    }

    /// Whether `n(x)` is monotone at `lambda_nm` (so that inverting the
    /// profile — finding the composition that yields a target index — is
    /// well-posed).
    pub fn monotonicity_at(&mut self, lambda_nm: f64) -> Result<bool> {
        self.ensure_centre(lambda_nm)?;
        let centre = self.centre.as_ref().unwrap();
        let ys = centre.n_of_x.y();
        let rising = ys.windows(2).all(|w| w[1] >= w[0]);
        let falling = ys.windows(2).all(|w| w[1] <= w[0]);
        Ok(rising || falling)
    }

    /// Fill `out` across the whole grid at a fixed composition `x`. Assumes
    /// `out`'s wavelengths are ascending, the common case, so the
    /// centre/other rotation amortises to one refit per wavelength instead
    /// of per `(wavelength, x)` pair.
    pub fn set_n_by_x(&mut self, wvls: &Wvls, x: f64, out: &mut N) -> Result<()> {
        for (i, &lambda) in wvls.values().iter().enumerate() {
            out[i] = self.index_at(lambda, x)?;
        }
        Ok(())
    }

    /// Fill `out` with `dN/dx` across the whole grid at a fixed composition.
    pub fn set_dn_by_x(&mut self, wvls: &Wvls, x: f64, out: &mut N) -> Result<()> {
        for (i, &lambda) in wvls.values().iter().enumerate() {
            out[i] = self.dindex_at(lambda, x)?;
        }
        Ok(())
    }

    /// Invert the composition profile: find the `x` whose real index equals
    /// `n_ref` at `lambda_ref_nm`. This is how a layer's free parameter is
    /// usually expressed during refinement — "the index at the design
    /// wavelength" rather than the underlying composition fraction — so the
    /// whole-grid index and derivative are both exposed in terms of it.
    pub fn invert_x(&mut self, lambda_ref_nm: f64, n_ref: f64) -> Result<f64> {
        if self.models.len() == 1 {
            return Ok(self.x_nodes[0]);
        }
        self.ensure_centre(lambda_ref_nm)?;
        let centre = self.centre.as_mut().unwrap();
        centre.n_of_x.evaluate_inverse(n_ref)
    }

    /// Fill `out` across the whole grid at the composition whose real index
    /// equals `n_ref` at the reference wavelength `lambda_ref_nm`.
    pub fn set_n(&mut self, wvls: &Wvls, lambda_ref_nm: f64, n_ref: f64, out: &mut N) -> Result<()> {
        let x = self.invert_x(lambda_ref_nm, n_ref)?;
        self.set_n_by_x(wvls, x, out)
    }

    /// Fill `out` with `dN/d(n_ref)` across the whole grid: the chain-rule
    /// derivative of the composition-indexed index with respect to a
    /// perturbation of the reference-wavelength real index,
    /// `(dn/dx)/(dn_ref/dx)` per wavelength. A wavelength whose interpolated
    /// `k` has drifted non-physical (negative, i.e. gain) gets a zeroed
    /// derivative rather than an unstable one.
    pub fn set_dn(&mut self, wvls: &Wvls, lambda_ref_nm: f64, n_ref: f64, out: &mut N) -> Result<()> {
        if self.models.len() == 1 {
            for i in 0..wvls.values().len() {
                out[i] = Complex::ZERO;
            }
            return Ok(());
        }
        let x = self.invert_x(lambda_ref_nm, n_ref)?;
        self.ensure_centre(lambda_ref_nm)?;
        let dn_ref = self.centre.as_mut().unwrap().n_of_x.evaluate_derivative(x)?;
        for (i, &lambda) in wvls.values().iter().enumerate() {
            self.ensure_centre(lambda)?;
            let centre = self.centre.as_mut().unwrap();
            let dn = centre.n_of_x.evaluate_derivative(x)?;
            let dk = centre.k_of_x.evaluate_derivative(x)?;
            let k = centre.k_of_x.evaluate(x)?;
            let dk = if k < 0.0 { 0.0 } else { dk };
            out[i] = Complex::new(dn / dn_ref, -dk / dn_ref);
        }
        Ok(())
    }

    /// Fill one graded-index level of `out` (index `level` of `levels`,
    /// evenly spaced across this mixture's composition range) — the
    /// discretisation a `NMixture::prepare_graded` caller needs to populate
    /// its per-level containers.
    pub fn set_n_graded(&mut self, wvls: &Wvls, level: usize, levels: usize, out: &mut N) -> Result<()> {
        let levels = levels.max(1);
        let (lo, hi) = self.x_range();
        let frac = if levels == 1 {
            0.0
        } else {
            level.min(levels - 1) as f64 / (levels - 1) as f64
        };
        let x = lo + frac * (hi - lo);
        self.set_n_by_x(wvls, x, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispersion::ConstantDispersion;

    fn two_node_mixture() -> Mixture {
        Mixture::new(
            vec![0.0, 1.0],
            vec![
                DispersionModel::Constant(ConstantDispersion::new(1.4, 0.0)),
                DispersionModel::Constant(ConstantDispersion::new(2.0, 0.0)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn index_at_endpoints_matches_constituents() {
        let mut m = two_node_mixture();
        let lo = m.index_at(550.0, 0.0).unwrap();
        let hi = m.index_at(550.0, 1.0).unwrap();
        assert!((lo.re - 1.4).abs() < 1e-9);
        assert!((hi.re - 2.0).abs() < 1e-9);
    }

    #[test]
    fn index_at_midpoint_is_between_constituents() {
        let mut m = two_node_mixture();
        let mid = m.index_at(550.0, 0.5).unwrap();
        assert!(mid.re > 1.4 && mid.re < 2.0);
    }

    #[test]
    fn single_constituent_is_constant_fast_path() {
        let m = Mixture::new(vec![0.0], vec![DispersionModel::Constant(ConstantDispersion::new(1.5, 0.0))]).unwrap();
        assert!(m.is_constant());
    }

    #[test]
    fn change_index_wvl_rotation_is_consistent_with_direct_evaluation() {
        let mut m = two_node_mixture();
        let a = m.index_at(500.0, 0.3).unwrap();
        m.change_index_wvl(600.0).unwrap();
        m.change_index_wvl(500.0).unwrap(); // rotates back via `other`
        let b = m.index_at(500.0, 0.3).unwrap();
        assert!((a.re - b.re).abs() < 1e-12);
    }

    #[test]
    fn monotone_two_node_profile_reports_monotone() {
        let mut m = two_node_mixture();
        assert!(m.monotonicity_at(550.0).unwrap());
    }

    #[test]
    fn set_n_by_x_fills_whole_grid() {
        let wvls = Wvls::linspace(400.0, 700.0, 8);
        let mut m = two_node_mixture();
        let mut out = N::new(wvls.clone());
        m.set_n_by_x(&wvls, 0.25, &mut out).unwrap();
        for v in out.values() {
            assert!((v.re - 1.55).abs() < 1e-9);
        }
    }

    #[test]
    fn graded_levels_span_the_composition_range() {
        let wvls = Wvls::linspace(400.0, 700.0, 4);
        let mut m = two_node_mixture();
        let mut lo = N::new(wvls.clone());
        let mut hi = N::new(wvls.clone());
        m.set_n_graded(&wvls, 0, 5, &mut lo).unwrap();
        m.set_n_graded(&wvls, 4, 5, &mut hi).unwrap();
        assert!((lo.values()[0].re - 1.4).abs() < 1e-9);
        assert!((hi.values()[0].re - 2.0).abs() < 1e-9);
    }

    #[test]
    fn invert_x_recovers_the_composition_that_produced_the_reference_index() {
        let mut m = two_node_mixture();
        let x = m.invert_x(550.0, 1.7).unwrap();
        let back = m.index_at(550.0, x).unwrap();
        assert!((back.re - 1.7).abs() < 1e-9);
    }

    #[test]
    fn set_n_matches_set_n_by_x_at_the_inverted_composition() {
        let wvls = Wvls::linspace(400.0, 700.0, 6);
        let mut m = two_node_mixture();
        let x = m.invert_x(550.0, 1.7).unwrap();
        let mut by_x = N::new(wvls.clone());
        m.set_n_by_x(&wvls, x, &mut by_x).unwrap();
        let mut by_ref = N::new(wvls.clone());
        m.set_n(&wvls, 550.0, 1.7, &mut by_ref).unwrap();
        for (a, b) in by_x.values().iter().zip(by_ref.values()) {
            assert!((a.re - b.re).abs() < 1e-9);
        }
    }

    #[test]
    fn set_dn_at_the_reference_wavelength_is_unity() {
        // d(n_ref)/d(n_ref) at the defining wavelength is 1 by construction.
        let wvls = Wvls::linspace(550.0, 550.0, 1);
        let mut m = two_node_mixture();
        let mut out = N::new(wvls.clone());
        m.set_dn(&wvls, 550.0, 1.7, &mut out).unwrap();
        assert!((out.values()[0].re - 1.0).abs() < 1e-9);
    }

    #[test]
    fn single_constituent_set_dn_is_zero() {
        let wvls = Wvls::linspace(400.0, 700.0, 4);
        let mut m = Mixture::new(vec![0.0], vec![DispersionModel::Constant(ConstantDispersion::new(1.5, 0.0))]).unwrap();
        let mut out = N::new(wvls.clone());
        m.set_dn(&wvls, 550.0, 1.5, &mut out).unwrap();
        for v in out.values() {
            assert_eq!(v.re, 0.0);
            assert_eq!(v.im, 0.0);
        }
    }
}
