//! Monotone piecewise cubic Hermite interpolation (PCHIP).
//!
//! Derivative assignment follows Hyman (1983); inverse evaluation follows the
//! bounds-secured Newton iteration of Press, Teukolsky, Vetterling & Flannery,
//! *Numerical Recipes*, §9.4 (falling back to bisection whenever a Newton step
//! would leave the bracket). No direct teacher counterpart exists for this
//! module; it is written fresh in the doc-comment and test-placement style
//! `glass_physics/dispersion.rs` uses (formula in the doc block, then impl,
//! then an inline `mod tests`).

use crate::error::{AbelesError, Result};

/// A monotone cubic Hermite interpolant over a fixed set of `(x, y)` pairs.
///
/// Construction only validates and stores the data; the cubic segment
/// coefficients are built lazily on first evaluation (`prepare`), so a
/// `Pchip` that is constructed but never evaluated pays no derivative-fitting
/// cost.
#[derive(Debug, Clone)]
pub struct Pchip {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Tangent at each knot, assigned by `prepare`.
    d: Vec<f64>,
    prepared: bool,
    /// If true, `evaluate`/`evaluate_derivative` clamp to the nearest
    /// endpoint instead of returning `OutOfDomain`.
    pub allow_extrapolation: bool,
}

impl Pchip {
    /// Build an interpolant over `x` (strictly increasing, length >= 2) and
    /// matching `y`. Returns `OutOfDomain` if `x` is not strictly increasing
    /// or the two slices differ in length.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() || x.len() < 2 {
            return Err(AbelesError::OutOfDomain {
                x: x.len() as f64,
                lo: 2.0,
                hi: f64::INFINITY,
            });
        }
        for w in x.windows(2) {
            if !(w[1] > w[0]) {
                return Err(AbelesError::NonMonotonic {
                    context: "Pchip abscissae must be strictly increasing",
                });
            }
        }
        let n = x.len();
        Ok(Self {
            x,
            y,
            d: vec![0.0; n],
            prepared: false,
            allow_extrapolation: false,
        })
    }

    /// Discard the cached tangents, forcing the next evaluation to rebuild
    /// them. Useful when `y` values are overwritten in place by a caller that
    /// owns the backing storage (e.g. a mixture re-fitting a cached profile).
    pub fn reset(&mut self) {
        self.prepared = false;
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Mutable access to `y`, paired with `reset` by the caller once done.
    pub fn y_mut(&mut self) -> &mut [f64] {
        &mut self.y
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    fn prepare(&mut self) {
        if self.prepared {
            return;
        }
        let n = self.x.len();
        let mut delta = vec![0.0; n - 1];
        for i in 0..n - 1 {
            delta[i] = (self.y[i + 1] - self.y[i]) / (self.x[i + 1] - self.x[i]);
        }

        if n == 2 {
            self.d[0] = delta[0];
            self.d[1] = delta[0];
            self.prepared = true;
            return;
        }

        for i in 0..n {
            self.d[i] = hyman_tangent(&self.x, &delta, i);
        }
        self.prepared = true;
    }

    /// Locate the segment index `i` such that `x in [knot[i], knot[i+1]]`,
    /// via binary search. `hint` is tried first so repeated evaluation over a
    /// slowly-moving `x` (e.g. scanning a spectrum) avoids the full search.
    fn locate(&self, xq: f64, hint: Option<usize>) -> usize {
        let n = self.x.len();
        if let Some(h) = hint {
            if h < n - 1 && self.x[h] <= xq && xq <= self.x[h + 1] {
                return h;
            }
        }
        match self
            .x
            .binary_search_by(|probe| probe.partial_cmp(&xq).unwrap())
        {
            Ok(i) => i.min(n - 2),
            Err(0) => 0,
            Err(i) if i >= n => n - 2,
            Err(i) => i - 1,
        }
    }

    fn segment_coeffs(&self, i: usize) -> (f64, f64, f64, f64, f64) {
        let h = self.x[i + 1] - self.x[i];
        let y0 = self.y[i];
        let y1 = self.y[i + 1];
        let d0 = self.d[i];
        let d1 = self.d[i + 1];
        let c0 = y0;
        let c1 = d0;
        let c2 = (3.0 * (y1 - y0) / h - 2.0 * d0 - d1) / h;
        let c3 = (d0 + d1 - 2.0 * (y1 - y0) / h) / (h * h);
        (c0, c1, c2, c3, h)
    }

    fn clamp_to_domain(&self, xq: f64) -> Result<f64> {
        let (lo, hi) = self.domain();
        if xq < lo || xq > hi {
            if self.allow_extrapolation {
                Ok(xq.clamp(lo, hi))
            } else {
                Err(AbelesError::OutOfDomain { x: xq, lo, hi })
            }
        } else {
            Ok(xq)
        }
    }

    /// Evaluate `y(xq)`.
    pub fn evaluate(&mut self, xq: f64) -> Result<f64> {
        self.evaluate_with_hint(xq, None).map(|(y, _)| y)
    }

    /// Evaluate `y(xq)`, returning the segment index used so the caller can
    /// pass it back as `hint` on the next call.
    pub fn evaluate_with_hint(&mut self, xq: f64, hint: Option<usize>) -> Result<(f64, usize)> {
        self.prepare();
        let xq = self.clamp_to_domain(xq)?;
        let i = self.locate(xq, hint);
        let (c0, c1, c2, c3, _h) = self.segment_coeffs(i);
        let t = xq - self.x[i];
        Ok((c0 + t * (c1 + t * (c2 + t * c3)), i))
    }

    /// Evaluate `dy/dx` at `xq`.
    pub fn evaluate_derivative(&mut self, xq: f64) -> Result<f64> {
        self.prepare();
        let xq = self.clamp_to_domain(xq)?;
        let i = self.locate(xq, None);
        let (_c0, c1, c2, c3, _h) = self.segment_coeffs(i);
        let t = xq - self.x[i];
        Ok(c1 + t * (2.0 * c2 + t * 3.0 * c3))
    }

    /// Invert the interpolant: find `xq` such that `y(xq) == yq`, on a
    /// segment located by scanning `y` for the bracketing knot pair. The
    /// interpolant must be monotone on that segment; non-monotone data
    /// returns `NonMonotonic`. Uses Newton's method with a bisection
    /// fallback whenever a step would leave the current bracket (Numerical
    /// Recipes §9.4's `rtsafe`).
    pub fn evaluate_inverse(&mut self, yq: f64) -> Result<f64> {
        self.prepare();
        let n = self.x.len();

        let mut seg = None;
        for i in 0..n - 1 {
            let (lo, hi) = (self.y[i], self.y[i + 1]);
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            if yq >= lo && yq <= hi {
                seg = Some(i);
                break;
            }
        }
        let i = seg.ok_or(AbelesError::OutOfDomain {
            x: yq,
            lo: self.y[0],
            hi: self.y[n - 1],
        })?;

        let (c0, c1, c2, c3, h) = self.segment_coeffs(i);
        let f = |t: f64| c0 + t * (c1 + t * (c2 + t * c3)) - yq;
        let fp = |t: f64| c1 + t * (2.0 * c2 + t * 3.0 * c3);

        if !monotone_on_segment(self.y[i], self.y[i + 1], c1, c2, c3, h) {
            return Err(AbelesError::NonMonotonic {
                context: "Pchip segment is not monotone, inverse is ill-defined",
            });
        }

        let (mut lo, mut hi) = if self.y[i] <= self.y[i + 1] {
            (0.0, h)
        } else {
            (h, 0.0)
        };
        let (mut t_lo, mut t_hi) = (lo.min(hi), lo.max(hi));
        let mut t = 0.5 * (t_lo + t_hi);

        for _ in 0..100 {
            let ft = f(t);
            if ft.abs() < 1e-12 {
                break;
            }
            if ft < 0.0 {
                lo = t;
            } else {
                hi = t;
            }
            t_lo = lo.min(hi);
            t_hi = lo.max(hi);

            let fpt = fp(t);
            let newton = if fpt.abs() > 1e-300 { t - ft / fpt } else { t_hi + 1.0 };
            t = if newton > t_lo && newton < t_hi {
                newton
            } else {
                0.5 * (t_lo + t_hi)
            };
        }

        Ok(self.x[i] + t)
    }
}

/// Hyman (1983) tangent assignment at knot `i`: the three-point finite
/// difference, limited so the piecewise cubic cannot overshoot and create a
/// spurious local extremum between knots.
fn hyman_tangent(x: &[f64], delta: &[f64], i: usize) -> f64 {
    let n = x.len();
    if i == 0 {
        return end_tangent(x[1] - x[0], x[2] - x[1], delta[0], delta[1]);
    }
    if i == n - 1 {
        return end_tangent(
            x[n - 1] - x[n - 2],
            x[n - 2] - x[n - 3],
            delta[n - 2],
            delta[n - 3],
        );
    }

    let d0 = delta[i - 1];
    let d1 = delta[i];
    if d0 * d1 <= 0.0 {
        return 0.0;
    }
    let h0 = x[i] - x[i - 1];
    let h1 = x[i + 1] - x[i];
    let w0 = 2.0 * h1 + h0;
    let w1 = h1 + 2.0 * h0;
    let raw = (w0 + w1) / (w0 / d0 + w1 / d1);

    let limit = 3.0 * d0.abs().min(d1.abs());
    if raw.abs() > limit {
        limit * raw.signum()
    } else {
        raw
    }
}

/// Non-centred three-point derivative estimate used at the two endpoints,
/// limited to preserve monotonicity against the adjacent interior secant.
fn end_tangent(h0: f64, h1: f64, d0: f64, d1: f64) -> f64 {
    let raw = ((2.0 * h0 + h1) * d0 - h0 * d1) / (h0 + h1);
    if raw * d0 <= 0.0 {
        0.0
    } else if d0 * d1 <= 0.0 && raw.abs() > 3.0 * d0.abs() {
        3.0 * d0
    } else {
        raw
    }
}

/// A cubic `c0 + c1 t + c2 t^2 + c3 t^3` on `t in [0, h]` is monotone iff its
/// derivative does not change sign on the interval (checked by sampling the
/// derivative's roots, since it is at most quadratic).
fn monotone_on_segment(y0: f64, y1: f64, c1: f64, c2: f64, c3: f64, h: f64) -> bool {
    if y0 == y1 {
        return c1 == 0.0 && c2 == 0.0 && c3 == 0.0;
    }
    let rising = y1 > y0;
    let fp = |t: f64| c1 + t * (2.0 * c2 + t * 3.0 * c3);
    let samples = 9;
    for k in 0..=samples {
        let t = h * k as f64 / samples as f64;
        let v = fp(t);
        if rising && v < -1e-9 {
            return false;
        }
        if !rising && v > 1e-9 {
            return false;
        }
    }
    true
}
