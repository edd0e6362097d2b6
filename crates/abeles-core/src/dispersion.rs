//! Dispersion models: how a material's complex index varies with wavelength.
//!
//! Each model computes full complex `N(lambda) = n - i*k` over an arbitrary
//! [`Wvls`] grid, with an Urbach absorption tail covering the case a
//! real-valued, RGB-sampling glass model would otherwise ignore: real
//! glasses have negligible `k` in the visible, but these stacks include
//! absorbing films, so `k` is first-class throughout.

use std::rc::Rc;

use crate::complex_ior::{Complex, N};
use crate::error::Result;
use crate::pchip::Pchip;
use crate::wavelength::Wvls;

/// Named reference wavelengths, in nanometres, used by Abbe-number and
/// chromatic-aberration helpers.
pub mod wavelengths {
    /// Fraunhofer C line (hydrogen, red).
    pub const C_LINE: f64 = 656.3;
    /// Fraunhofer d line (helium, yellow) — the Abbe-number reference.
    pub const D_LINE: f64 = 587.6;
    /// Fraunhofer F line (hydrogen, blue).
    pub const F_LINE: f64 = 486.1;
    pub const RED: f64 = 700.0;
    pub const GREEN: f64 = 546.1;
    pub const BLUE: f64 = 435.8;
    pub const SODIUM_D: f64 = 589.3;
}

/// An Urbach absorption tail: `k(lambda) = Ak * exp(12400*exponent*(1/(10000*
/// wvl_micron) - 1/edge))`, with `wvl_micron = lambda_nm/1000`. `edge` and the
/// `1/(10000*wvl_micron)` term share units (an absorption-edge energy scale),
/// so `edge` is supplied in the same raw units as that ratio, not nanometres.
/// Shared by the Cauchy and Sellmeier variants, which are otherwise
/// real-index-only models.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UrbachTail {
    pub ak: f64,
    pub exponent: f64,
    pub edge: f64,
}

impl UrbachTail {
    pub fn k(&self, lambda_nm: f64) -> f64 {
        if self.edge == 0.0 {
            return 0.0;
        }
        let wvl_micron = lambda_nm / 1000.0;
        self.ak * (12400.0 * self.exponent * (1.0 / (10000.0 * wvl_micron) - 1.0 / self.edge)).exp()
    }
}

/// Shared behaviour of every dispersion model: produce a complex index at a
/// single wavelength, and fill a whole [`N`] container.
pub trait Dispersion {
    /// Complex index at `lambda_nm` (nanometres).
    fn index(&self, lambda_nm: f64) -> Complex;

    /// Fill every entry of `out` from its own wavelength grid.
    fn fill(&self, out: &mut N) {
        let wvls = out.wvls().clone();
        for (i, &lambda) in wvls.values().iter().enumerate() {
            out[i] = self.index(lambda);
        }
    }

    /// Build a fresh [`N`] over `wvls`.
    fn to_n(&self, wvls: Rc<Wvls>) -> N {
        let mut out = N::new(wvls);
        self.fill(&mut out);
        out
    }

    /// Real index at the Fraunhofer d line.
    fn n_d(&self) -> f64 {
        self.index(wavelengths::D_LINE).re
    }

    /// Abbe number `V_d = (n_d - 1) / (n_F - n_C)`, the standard measure of
    /// chromatic dispersion strength (teacher's
    /// `glass_physics/dispersion.rs::abbe_number`).
    fn abbe_number(&self) -> f64 {
        let n_d = self.index(wavelengths::D_LINE).re;
        let n_f = self.index(wavelengths::F_LINE).re;
        let n_c = self.index(wavelengths::C_LINE).re;
        (n_d - 1.0) / (n_f - n_c)
    }

    /// Relative index spread across the visible range, a crude proxy for how
    /// visible chromatic aberration a lens of this material will exhibit
    /// (teacher's `chromatic_aberration_strength`).
    fn chromatic_aberration_strength(&self) -> f64 {
        let n_r = self.index(wavelengths::RED).re;
        let n_b = self.index(wavelengths::BLUE).re;
        (n_b - n_r).abs() / self.n_d()
    }
}

/// Wavelength-independent index, `n - i*k` constant.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstantDispersion {
    pub n: f64,
    pub k: f64,
}

impl ConstantDispersion {
    pub fn new(n: f64, k: f64) -> Self {
        Self { n, k }
    }
}

impl Dispersion for ConstantDispersion {
    fn index(&self, _lambda_nm: f64) -> Complex {
        Complex::from_nk(self.n, self.k)
    }
}

/// Tabulated `(lambda, n, k)` samples, PCHIP-interpolated in between.
#[derive(Debug, Clone)]
pub struct TableDispersion {
    n_curve: Pchip,
    k_curve: Pchip,
}

impl TableDispersion {
    pub fn new(lambda_nm: Vec<f64>, n: Vec<f64>, k: Vec<f64>) -> Result<Self> {
        let n_curve = Pchip::new(lambda_nm.clone(), n)?;
        let k_curve = Pchip::new(lambda_nm, k)?;
        Ok(Self { n_curve, k_curve })
    }
}

impl Dispersion for TableDispersion {
    fn index(&self, lambda_nm: f64) -> Complex {
        // Interior mutability isn't worth it here: evaluation only mutates
        // the interpolant's lazily-built tangent cache, so a local clone is
        // cheap relative to the coefficient fit it would otherwise redo.
        let mut n_curve = self.n_curve.clone();
        let mut k_curve = self.k_curve.clone();
        n_curve.allow_extrapolation = true;
        k_curve.allow_extrapolation = true;
        let n = n_curve.evaluate(lambda_nm).unwrap_or(1.0);
        let k = k_curve.evaluate(lambda_nm).unwrap_or(0.0);
        // The PCHIP is shape-preserving but not sign-preserving at table
        // edges; a near-zero k column can still interpolate a hair below
        // zero, which would read as gain rather than absorption.
        Complex::from_nk(n, k.max(0.0))
    }
}

/// Two-term Cauchy equation, `n(lambda) = A + B/lambda^2 + C/lambda^4`
/// (lambda in micrometres), plus an optional Urbach `k` tail.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CauchyDispersion {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub urbach: Option<UrbachTail>,
}

impl CauchyDispersion {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c, urbach: None }
    }

    /// A dispersionless (single-IOR) Cauchy model, for callers who only have
    /// a catalogue `n_d` and want the Cauchy evaluation path anyway.
    pub fn constant(n: f64) -> Self {
        Self::new(n, 0.0, 0.0)
    }

    /// Fit `A` against a measured `n_d`, keeping `B`/`C` fixed.
    pub fn from_ior(n_d: f64, b: f64, c: f64) -> Self {
        let lambda_um = wavelengths::D_LINE / 1000.0;
        let a = n_d - b / lambda_um.powi(2) - c / lambda_um.powi(4);
        Self::new(a, b, c)
    }

    pub fn with_urbach(mut self, tail: UrbachTail) -> Self {
        self.urbach = Some(tail);
        self
    }

    pub fn crown_glass() -> Self {
        Self::new(1.5220, 0.00459, 0.0)
    }

    pub fn flint_glass() -> Self {
        Self::new(1.6200, 0.00980, 0.0)
    }

    pub fn fused_silica() -> Self {
        Self::new(1.4580, 0.00354, 0.0)
    }

    pub fn water() -> Self {
        Self::new(1.3199, 0.00382, 0.0)
    }

    pub fn diamond() -> Self {
        Self::new(2.3782, 0.01497, 0.0)
    }

    pub fn polycarbonate() -> Self {
        Self::new(1.5707, 0.00839, 0.0)
    }

    pub fn pmma() -> Self {
        Self::new(1.4862, 0.00419, 0.0)
    }
}

impl Dispersion for CauchyDispersion {
    fn index(&self, lambda_nm: f64) -> Complex {
        let lambda_um = lambda_nm / 1000.0;
        let l2 = lambda_um * lambda_um;
        let n = self.a + self.b / l2 + self.c / (l2 * l2);
        let k = self.urbach.map(|u| u.k(lambda_nm)).unwrap_or(0.0);
        Complex::from_nk(n, k)
    }
}

/// Three-term Sellmeier equation, `n(lambda)^2 = 1 + sum_i B_i*lambda^2 /
/// (lambda^2 - C_i)` (lambda in micrometres), plus an optional Urbach `k`
/// tail.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SellmeierDispersion {
    pub b1: f64,
    pub c1: f64,
    pub b2: f64,
    pub c2: f64,
    pub b3: f64,
    pub c3: f64,
    pub urbach: Option<UrbachTail>,
}

impl SellmeierDispersion {
    pub fn new(b1: f64, c1: f64, b2: f64, c2: f64, b3: f64, c3: f64) -> Self {
        Self {
            b1,
            c1,
            b2,
            c2,
            b3,
            c3,
            urbach: None,
        }
    }

    pub fn with_urbach(mut self, tail: UrbachTail) -> Self {
        self.urbach = Some(tail);
        self
    }

    pub fn fused_silica() -> Self {
        Self::new(0.6961663, 0.0684043_f64.powi(2), 0.4079426, 0.1162414_f64.powi(2), 0.8974794, 9.896161_f64.powi(2))
    }

    pub fn bk7() -> Self {
        Self::new(1.03961212, 0.00600069867, 0.231792344, 0.0200179144, 1.01046945, 103.560653)
    }

    pub fn sf11() -> Self {
        Self::new(1.73759695, 0.013188707, 0.313747346, 0.0623068142, 1.89878101, 155.23629)
    }

    pub fn sapphire() -> Self {
        Self::new(1.4313493, 0.0726631_f64.powi(2), 0.65054713, 0.1193242_f64.powi(2), 5.3414021, 18.028251_f64.powi(2))
    }

    pub fn diamond() -> Self {
        Self::new(4.3356, 0.1060_f64.powi(2), 0.3306, 0.1750_f64.powi(2), 0.0, 1.0)
    }
}

impl Dispersion for SellmeierDispersion {
    fn index(&self, lambda_nm: f64) -> Complex {
        let lambda_um = lambda_nm / 1000.0;
        let l2 = lambda_um * lambda_um;
        let n2 = 1.0
            + self.b1 * l2 / (l2 - self.c1)
            + self.b2 * l2 / (l2 - self.c2)
            + self.b3 * l2 / (l2 - self.c3);
        let n = n2.max(0.0).sqrt();
        let k = self.urbach.map(|u| u.k(lambda_nm)).unwrap_or(0.0);
        Complex::from_nk(n, k)
    }
}

/// Tagged-sum dispatch over the four variants (teacher's
/// `glass_physics/dispersion.rs::DispersionModel` enum pattern), so callers
/// can store a heterogeneous list of per-layer materials without boxing.
#[derive(Debug, Clone)]
pub enum DispersionModel {
    Constant(ConstantDispersion),
    Table(TableDispersion),
    Cauchy(CauchyDispersion),
    Sellmeier(SellmeierDispersion),
}

impl Dispersion for DispersionModel {
    fn index(&self, lambda_nm: f64) -> Complex {
        match self {
            Self::Constant(m) => m.index(lambda_nm),
            Self::Table(m) => m.index(lambda_nm),
            Self::Cauchy(m) => m.index(lambda_nm),
            Self::Sellmeier(m) => m.index(lambda_nm),
        }
    }
}
