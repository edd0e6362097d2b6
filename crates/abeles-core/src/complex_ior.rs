//! Complex arithmetic and the per-wavelength index containers.
//!
//! Hand-rolled rather than pulled from a crate, so the hot evaluation path
//! stays dependency-free. Fixes the `N = n - i*k` convention with `k >= 0`,
//! and uses an exact (not epsilon-gated) `Re == 0.0` branch check on complex
//! square roots.

use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;

use crate::wavelength::Wvls;

/// A complex double, `re + im*i`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };
    pub const ONE: Complex = Complex { re: 1.0, im: 0.0 };
    pub const I: Complex = Complex { re: 0.0, im: 1.0 };

    #[inline]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Build `n - i*k` for an absorbing medium (`k >= 0`).
    #[inline]
    pub fn from_nk(n: f64, k: f64) -> Self {
        Self::new(n, -k)
    }

    #[inline]
    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    #[inline]
    pub fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    #[inline]
    pub fn abs(self) -> f64 {
        self.norm_sqr().sqrt()
    }

    #[inline]
    pub fn arg(self) -> f64 {
        self.im.atan2(self.re)
    }

    #[inline]
    pub fn scale(self, k: f64) -> Self {
        Self::new(self.re * k, self.im * k)
    }

    #[inline]
    pub fn inv(self) -> Self {
        let d = self.norm_sqr();
        Self::new(self.re / d, -self.im / d)
    }

    /// Principal branch square root (`Re(result) >= 0`).
    #[inline]
    pub fn sqrt(self) -> Self {
        if self.re == 0.0 && self.im == 0.0 {
            return Self::ZERO;
        }
        let r = self.abs().sqrt();
        let theta = self.arg() / 2.0;
        Self::new(r * theta.cos(), r * theta.sin())
    }

    /// `exp(self)`.
    #[inline]
    pub fn exp(self) -> Self {
        let r = self.re.exp();
        Self::new(r * self.im.cos(), r * self.im.sin())
    }

    /// Complex cosine, via `cos(a+bi) = cos(a)cosh(b) - i*sin(a)sinh(b)`.
    #[inline]
    pub fn cos(self) -> Self {
        Self::new(
            self.re.cos() * self.im.cosh(),
            -self.re.sin() * self.im.sinh(),
        )
    }

    /// Complex sine, via `sin(a+bi) = sin(a)cosh(b) + i*cos(a)sinh(b)`.
    #[inline]
    pub fn sin(self) -> Self {
        Self::new(
            self.re.sin() * self.im.cosh(),
            self.re.cos() * self.im.sinh(),
        )
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }
}

impl Add for Complex {
    type Output = Complex;
    #[inline]
    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Complex;
    #[inline]
    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Complex;
    #[inline]
    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Div for Complex {
    type Output = Complex;
    #[inline]
    fn div(self, rhs: Complex) -> Complex {
        self * rhs.inv()
    }
}

impl Neg for Complex {
    type Output = Complex;
    #[inline]
    fn neg(self) -> Complex {
        Complex::new(-self.re, -self.im)
    }
}

impl From<f64> for Complex {
    fn from(re: f64) -> Self {
        Complex::new(re, 0.0)
    }
}

impl Mul<f64> for Complex {
    type Output = Complex;
    #[inline]
    fn mul(self, rhs: f64) -> Complex {
        self.scale(rhs)
    }
}

/// Floors the imaginary part of a layer phase before evaluating `cos`/`sin`
/// of it, so a deeply absorbing layer cannot overflow `cosh`/`sinh`.
#[inline]
pub fn clamp_phase(phi: Complex) -> Complex {
    Complex::new(phi.re, phi.im.max(-100.0))
}

/// Complex index of refraction per wavelength, `N = n - i*k`.
///
/// Borrows the wavelength grid by `Rc` (see `wavelength.rs`); every `set_*`
/// routine overwrites the full length, so callers must size `wvls` once and
/// reuse the container rather than reallocate per call.
#[derive(Debug, Clone)]
pub struct N {
    wvls: Rc<Wvls>,
    n: Vec<Complex>,
}

impl N {
    pub fn new(wvls: Rc<Wvls>) -> Self {
        let len = wvls.len();
        Self {
            wvls,
            n: vec![Complex::ZERO; len],
        }
    }

    pub fn wvls(&self) -> &Rc<Wvls> {
        &self.wvls
    }

    pub fn len(&self) -> usize {
        self.n.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n.is_empty()
    }

    pub fn values(&self) -> &[Complex] {
        &self.n
    }

    pub fn values_mut(&mut self) -> &mut [Complex] {
        &mut self.n
    }
}

impl std::ops::Index<usize> for N {
    type Output = Complex;
    fn index(&self, i: usize) -> &Complex {
        &self.n[i]
    }
}

impl std::ops::IndexMut<usize> for N {
    fn index_mut(&mut self, i: usize) -> &mut Complex {
        &mut self.n[i]
    }
}

/// `NMixture` packages a base index, its derivative with respect to the
/// reference real index, and the optional graded-index quantisation levels.
pub struct NMixture {
    pub base: N,
    pub dn: N,
    pub graded: Option<Vec<N>>,
}

impl NMixture {
    pub fn new(wvls: Rc<Wvls>) -> Self {
        Self {
            base: N::new(wvls.clone()),
            dn: N::new(wvls),
            graded: None,
        }
    }

    /// Attach `levels` graded-index containers sharing the same grid,
    /// releasing any previously attached array.
    pub fn prepare_graded(&mut self, levels: usize) {
        let wvls = self.base.wvls().clone();
        self.graded = Some((0..levels).map(|_| N::new(wvls.clone())).collect());
    }

    pub fn graded_level(&self, level: usize) -> Option<&N> {
        self.graded.as_ref().and_then(|g| g.get(level))
    }

    pub fn graded_level_mut(&mut self, level: usize) -> Option<&mut N> {
        self.graded.as_mut().and_then(|g| g.get_mut(level))
    }
}

/// `(N0 sin theta0)^2` per wavelength, shared across every layer's cos(theta).
#[derive(Debug, Clone)]
pub struct Sin2 {
    wvls: Rc<Wvls>,
    val: Vec<Complex>,
}

impl Sin2 {
    pub fn new(wvls: Rc<Wvls>) -> Self {
        let len = wvls.len();
        Self {
            wvls,
            val: vec![Complex::ZERO; len],
        }
    }

    pub fn wvls(&self) -> &Rc<Wvls> {
        &self.wvls
    }

    pub fn len(&self) -> usize {
        self.val.len()
    }

    pub fn values(&self) -> &[Complex] {
        &self.val
    }

    /// Set `(N0 sin theta0)^2` for every wavelength given the incidence
    /// medium's index and the angle of incidence in degrees.
    pub fn set(&mut self, medium: &N, angle_deg: f64) {
        let sin_theta0 = angle_deg.to_radians().sin();
        let sin2_theta0 = sin_theta0 * sin_theta0;
        for (out, &n0) in self.val.iter_mut().zip(medium.values()) {
            *out = (n0 * n0).scale(sin2_theta0);
        }
    }
}
