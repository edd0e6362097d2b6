//! The transfer-matrix (Abelès) engine: per-layer characteristic matrices,
//! stack composition, amplitude and power quantities, phase/group-delay,
//! admittance, field amplitude, ellipsometry and the reflection-circle
//! diagram.
//!
//! Extends the single-layer Airy formula
//! (`delta = 4*pi*n_film*d*cos(theta')/lambda`) to an arbitrary `N`-layer
//! stack via the standard 2x2 characteristic-matrix product, adding a
//! divided-difference fit for group delay/dispersion and a backside
//! incoherent correction for a thick, non-coherent substrate.

use std::rc::Rc;

use crate::complex_ior::{clamp_phase, Complex, Sin2, N};
use crate::wavelength::Wvls;

/// Which linear polarization a stack is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarization {
    S,
    P,
}

/// A 2x2 complex characteristic matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CMatrix {
    pub m11: Complex,
    pub m12: Complex,
    pub m21: Complex,
    pub m22: Complex,
}

impl CMatrix {
    pub const IDENTITY: CMatrix = CMatrix {
        m11: Complex::ONE,
        m12: Complex::ZERO,
        m21: Complex::ZERO,
        m22: Complex::ONE,
    };

    #[inline]
    pub fn mul(self, rhs: CMatrix) -> CMatrix {
        CMatrix {
            m11: self.m11 * rhs.m11 + self.m12 * rhs.m21,
            m12: self.m11 * rhs.m12 + self.m12 * rhs.m22,
            m21: self.m21 * rhs.m11 + self.m22 * rhs.m21,
            m22: self.m21 * rhs.m12 + self.m22 * rhs.m22,
        }
    }

    /// Apply to the column vector `[1, eta]^T`, returning `(B, C)`.
    #[inline]
    pub fn apply_bc(self, eta: Complex) -> (Complex, Complex) {
        (self.m11 + self.m12 * eta, self.m21 + self.m22 * eta)
    }
}

/// The s-polarization "reduced index" `N_s = sqrt(N^2 - sin2theta0)`, with
/// the branch selection: when the principal root lands exactly on the
/// imaginary axis (`Re(N_s) == 0`), both `N_s` and the paired `N_p` are
/// negated so the wave stays outgoing/decaying rather than incoming/growing
/// at grazing or total-internal-reflection angles.
#[inline]
pub fn n_s(n: Complex, sin2_theta0: Complex) -> Complex {
    let ns = (n * n - sin2_theta0).sqrt();
    if ns.re == 0.0 {
        -ns
    } else {
        ns
    }
}

/// The p-polarization "reduced index" `N_p = N^2 / N_s`, given the already
/// branch-corrected `N_s`.
#[inline]
pub fn n_p(n: Complex, ns: Complex) -> Complex {
    (n * n) / ns
}

/// `cos(theta)` inside a layer of index `n`, given the conserved
/// `(N0 sin theta0)^2` at this wavelength: `cos(theta) = N_s/N`, with `N_s`
/// the branch-corrected reduced index ([`n_s`]).
#[inline]
pub fn cos_theta(n: Complex, sin2_theta0: Complex) -> Complex {
    n_s(n, sin2_theta0) / n
}

/// The admittance of a medium of index `n` at angle `cos_theta`, per
/// polarization: `eta_s = n*cos(theta)`, `eta_p = n/cos(theta)`.
#[inline]
pub fn admittance(n: Complex, cos_theta: Complex, pol: Polarization) -> Complex {
    match pol {
        Polarization::S => n * cos_theta,
        Polarization::P => n / cos_theta,
    }
}

/// The characteristic matrix of one layer of index `n`, physical thickness
/// `d` (nanometres), at `lambda_nm`, given the conserved `(N0 sin
/// theta0)^2`. The layer phase's imaginary part is clamped per spec so a
/// strongly absorbing layer cannot overflow `cosh`/`sinh`.
pub fn layer_matrix(n: Complex, d: f64, lambda_nm: f64, sin2_theta0: Complex, pol: Polarization) -> CMatrix {
    let ct = cos_theta(n, sin2_theta0);
    let eta = admittance(n, ct, pol);
    let phi = clamp_phase((n * ct).scale(2.0 * std::f64::consts::PI * d / lambda_nm));
    let cos_phi = phi.cos();
    let sin_phi = phi.sin();
    CMatrix {
        m11: cos_phi,
        m12: Complex::I * sin_phi / eta,
        m21: Complex::I * eta * sin_phi,
        m22: cos_phi,
    }
}

/// One layer's index profile and thickness, ready to be composed into a
/// stack at a given wavelength index.
pub struct Layer<'a> {
    pub n: &'a N,
    pub d: f64,
}

/// Compose layer matrices (in incidence-to-substrate order) for wavelength
/// index `i`.
pub fn compose(layers: &[Layer<'_>], i: usize, lambda_nm: f64, sin2_theta0: Complex, pol: Polarization) -> CMatrix {
    let mut m = CMatrix::IDENTITY;
    for layer in layers {
        m = m.mul(layer_matrix(layer.n[i], layer.d, lambda_nm, sin2_theta0, pol));
    }
    m
}

/// Amplitude reflection and transmission coefficients given the composed
/// stack matrix and the incidence/substrate admittances.
pub fn amplitude_rt(m: CMatrix, eta0: Complex, etas: Complex) -> (Complex, Complex) {
    let (b, c) = m.apply_bc(etas);
    let r = (eta0 * b - c) / (eta0 * b + c);
    let t = (eta0 * Complex::from(2.0)) / (eta0 * b + c);
    (r, t)
}

/// Reverse-direction amplitude coefficients (light incident from the
/// substrate side), obtained by persymmetry: swapping the admittances and
/// traversing the layer stack in reverse order composes to `m22, m12, m21,
/// m11` transposed in the right way for `apply_bc`, which is equivalent to
/// swapping `eta0`/`etas` against the same `m` transposed.
pub fn amplitude_rt_reverse(m: CMatrix, eta0: Complex, etas: Complex) -> (Complex, Complex) {
    let m_rev = CMatrix {
        m11: m.m22,
        m12: m.m12,
        m21: m.m21,
        m22: m.m11,
    };
    amplitude_rt(m_rev, etas, eta0)
}

/// Power reflectance, transmittance and absorptance from amplitude
/// coefficients, for a lossless incidence medium (`Im(eta0) == 0`).
pub fn power_rta(r: Complex, t: Complex, eta0: Complex, etas: Complex) -> (f64, f64, f64) {
    let rr = r.norm_sqr();
    let tt = (etas.re / eta0.re) * t.norm_sqr();
    let aa = (1.0 - rr - tt).max(0.0);
    (rr, tt, aa)
}

/// Incoherent correction for a substrate backside reflection: combine the
/// coherent front-surface power quantities (forward and reverse) with the
/// back surface's own power reflectance/transmittance through an infinite
/// incoherent multiple-reflection sum inside the substrate, weighted by the
/// one-pass absorption `exp(4*Im(k*N_s*thickness))` the substrate slab
/// imposes each round trip. `r_front`/`t_front` are the stack's own forward
/// power R/T; `r_front_reverse`/`t_front_reverse` are the same stack's
/// reverse-direction power R/T (substrate side incident); `r_back`/`t_back`
/// are the bare back-surface (substrate/exit medium) power R/T.
#[allow(clippy::too_many_arguments)]
pub fn backside_incoherent(
    r_front: f64,
    t_front: f64,
    r_front_reverse: f64,
    t_front_reverse: f64,
    r_back: f64,
    t_back: f64,
    n_substrate: Complex,
    thickness_nm: f64,
    lambda_nm: f64,
    sin2_theta0: Complex,
) -> (f64, f64) {
    let ns_s = n_s(n_substrate, sin2_theta0);
    let beta_imag = ns_s.scale(2.0 * std::f64::consts::PI * thickness_nm / lambda_nm).im;
    let exp_4_beta_imag = (4.0 * beta_imag).exp();

    let r_total = r_front + (t_front * t_front_reverse * r_back * exp_4_beta_imag) / (1.0 - r_front_reverse * r_back * exp_4_beta_imag);
    let t_total = (t_front * t_back * (2.0 * beta_imag).exp()) / (1.0 - r_back * r_front_reverse * exp_4_beta_imag);
    (r_total, t_total)
}

/// Admittance of the stack as seen from the incidence medium, `Y = C/B`.
pub fn stack_admittance(m: CMatrix, etas: Complex) -> Complex {
    let (b, c) = m.apply_bc(etas);
    c / b
}

/// Phase on reflection/transmission, `arg(r)`/`arg(t)`, in radians.
pub fn phase_rt(r: Complex, t: Complex) -> (f64, f64) {
    (r.arg(), t.arg())
}

/// Electric field amplitude at the front surface relative to the exit
/// medium: `|M[0] + M[1]*N_q|`, where `M` is the already-composed stack
/// matrix and `N_q` is the exit medium's reduced index (`N_s` for
/// s-polarization, `N_p` for p-polarization), the same quantity a standing-
/// wave-intensity or durability calculation evaluates per wavelength.
pub fn field_amplitude(m: CMatrix, n_exit: Complex, sin2_theta0: Complex, pol: Polarization) -> f64 {
    let ns = n_s(n_exit, sin2_theta0);
    let nq = match pol {
        Polarization::S => ns,
        Polarization::P => n_p(n_exit, ns),
    };
    (m.m11 + m.m12 * nq).abs()
}

/// Unwrap a phase series so consecutive samples never jump by more than
/// `pi`, the standard treatment before differencing an `atan2`-valued
/// series for group delay.
pub fn unwrap_phase(phases: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phases.len());
    if phases.is_empty() {
        return out;
    }
    out.push(phases[0]);
    for i in 1..phases.len() {
        let mut d = phases[i] - phases[i - 1];
        while d > std::f64::consts::PI {
            d -= 2.0 * std::f64::consts::PI;
        }
        while d < -std::f64::consts::PI {
            d += 2.0 * std::f64::consts::PI;
        }
        out.push(out[i - 1] + d);
    }
    out
}

const SPEED_OF_LIGHT_NM_PER_FS: f64 = 299.792458;

#[inline]
fn angular_frequency(lambda_nm: f64) -> f64 {
    2.0 * std::f64::consts::PI * SPEED_OF_LIGHT_NM_PER_FS / lambda_nm
}

/// Group delay (in femtoseconds) at each wavelength, `GD = -d(phase)/d(omega)`,
/// by a centred finite difference against neighbouring grid points (falling
/// back to a one-sided difference at the two ends). `unwrap` controls
/// whether the phase series is unwrapped before differencing.
pub fn group_delay(wvls: &Wvls, phase: &[f64], unwrap: bool) -> Vec<f64> {
    let phase = if unwrap { unwrap_phase(phase) } else { phase.to_vec() };
    let n = phase.len();
    let omega: Vec<f64> = wvls.values().iter().map(|&l| angular_frequency(l)).collect();
    let mut gd = vec![0.0; n];
    for i in 0..n {
        let (lo, hi) = if i == 0 {
            (0, 1.min(n - 1))
        } else if i == n - 1 {
            (n - 2, n - 1)
        } else {
            (i - 1, i + 1)
        };
        if omega[hi] == omega[lo] {
            gd[i] = 0.0;
        } else {
            gd[i] = -(phase[hi] - phase[lo]) / (omega[hi] - omega[lo]);
        }
    }
    gd
}

/// Group delay dispersion (fs^2), `GDD = d(GD)/d(omega)`, fit by a Newton
/// divided-difference quadratic through three consecutive samples of phase
/// (Press et al.-style local polynomial fit rather than differencing `GD`
/// twice, which would amplify noise).
pub fn group_delay_dispersion(wvls: &Wvls, phase: &[f64], unwrap: bool) -> Vec<f64> {
    let phase = if unwrap { unwrap_phase(phase) } else { phase.to_vec() };
    let n = phase.len();
    let omega: Vec<f64> = wvls.values().iter().map(|&l| angular_frequency(l)).collect();
    let mut gdd = vec![0.0; n];
    if n < 3 {
        return gdd;
    }
    for i in 0..n {
        let (a, b, c) = if i == 0 {
            (0, 1, 2)
        } else if i == n - 1 {
            (n - 3, n - 2, n - 1)
        } else {
            (i - 1, i, i + 1)
        };
        let (x0, x1, x2) = (omega[a], omega[b], omega[c]);
        let (y0, y1, y2) = (phase[a], phase[b], phase[c]);
        let d01 = (y1 - y0) / (x1 - x0);
        let d12 = (y2 - y1) / (x2 - x1);
        let d012 = (d12 - d01) / (x2 - x0);
        // second derivative of the interpolating quadratic is 2*d012
        gdd[i] = 2.0 * d012;
    }
    gdd
}

/// Fallback ellipsometric angles used when both `r_p` and `r_s` vanish
/// (normal incidence on an index-matched or perfectly absorbing stack,
/// where `rho = r_p/r_s` is `0/0`): kept as a literal constant per the
/// documented Open Question rather than derived from a limiting argument.
pub const DEGENERATE_PSI_DEG: f64 = 45.0;
pub const DEGENERATE_DELTA_DEG: f64 = 180.0;

/// Ellipsometric `(Psi, Delta)` in degrees from the coherent `r_p`/`r_s`.
pub fn ellipsometry(r_p: Complex, r_s: Complex) -> (f64, f64) {
    if r_p.norm_sqr() == 0.0 && r_s.norm_sqr() == 0.0 {
        return (DEGENERATE_PSI_DEG, DEGENERATE_DELTA_DEG);
    }
    let rho = r_p / r_s;
    let psi = rho.abs().atan().to_degrees();
    let mut delta = rho.arg().to_degrees();
    if delta < 0.0 {
        delta += 360.0;
    }
    (psi, delta)
}

/// Ellipsometric `(Psi, Delta)` including an incoherent substrate backside
/// reflection (Yang, *Appl. Opt.* 1995): the coherent front-side amplitude
/// coefficients (forward and reverse) are combined with the bare back
/// surface's amplitude reflectances through the same incoherent multiple-
/// reflection sum `backside_incoherent` uses for power, separately for each
/// polarization's own norm and for the cross (`p`/`s` mixed) term, then
/// folded into `Psi`/`Delta` via `atan2`/`acos` rather than a direct ratio
/// of complex numbers (the mixed term's phase does not factor out).
#[allow(clippy::too_many_arguments)]
pub fn ellipsometry_backside(
    r_p_front: Complex,
    t_p_front: Complex,
    r_s_front: Complex,
    t_s_front: Complex,
    r_p_front_reverse: Complex,
    t_p_front_reverse: Complex,
    r_s_front_reverse: Complex,
    t_s_front_reverse: Complex,
    r_p_back: Complex,
    r_s_back: Complex,
    n_substrate: Complex,
    thickness_nm: f64,
    lambda_nm: f64,
    sin2_theta0: Complex,
) -> (f64, f64) {
    let ns_s = n_s(n_substrate, sin2_theta0);
    let beta_imag = ns_s.scale(2.0 * std::f64::consts::PI * thickness_nm / lambda_nm).im;
    let exp_m4 = Complex::from((-4.0 * beta_imag.abs()).exp());

    let norm_r_p_front = r_p_front.norm_sqr();
    let norm_t_p_front = t_p_front.norm_sqr();
    let norm_r_s_front = r_s_front.norm_sqr();
    let norm_t_s_front = t_s_front.norm_sqr();
    let norm_r_p_front_reverse = r_p_front_reverse.norm_sqr();
    let norm_t_p_front_reverse = t_p_front_reverse.norm_sqr();
    let norm_r_s_front_reverse = r_s_front_reverse.norm_sqr();
    let norm_t_s_front_reverse = t_s_front_reverse.norm_sqr();
    let norm_r_p_back = r_p_back.norm_sqr();
    let norm_r_s_back = r_s_back.norm_sqr();

    let norm_r_mixed_front = -r_p_front * r_s_front.conj();
    let norm_t_mixed_front = t_p_front * t_s_front.conj();
    let norm_r_mixed_reverse = -r_p_front_reverse * r_s_front_reverse.conj();
    let norm_t_mixed_reverse = t_p_front_reverse * t_s_front_reverse.conj();
    let norm_r_mixed_back = -r_p_back * r_s_back.conj();

    if norm_r_p_front == 0.0 && norm_r_s_front == 0.0 {
        return (DEGENERATE_PSI_DEG, DEGENERATE_DELTA_DEG);
    }

    let ri_p = norm_t_p_front * norm_t_p_front_reverse * norm_r_p_back * exp_m4.re
        / (1.0 - norm_r_p_front_reverse * norm_r_p_back * exp_m4.re);
    let ri_s = norm_t_s_front * norm_t_s_front_reverse * norm_r_s_back * exp_m4.re
        / (1.0 - norm_r_s_front_reverse * norm_r_s_back * exp_m4.re);
    let bi_2 = (norm_t_mixed_front * norm_t_mixed_reverse * norm_r_mixed_back * exp_m4
        / (Complex::ONE - norm_r_mixed_reverse * norm_r_mixed_back * exp_m4))
        .re;

    let sqrt_p = (norm_r_p_front + ri_p).max(0.0).sqrt();
    let sqrt_s = (norm_r_s_front + ri_s).max(0.0).sqrt();
    let psi = if sqrt_p == 0.0 && sqrt_s == 0.0 {
        DEGENERATE_PSI_DEG
    } else {
        sqrt_p.atan2(sqrt_s).to_degrees()
    };

    let cos_delta = ((norm_r_mixed_front.re + bi_2) / ((norm_r_p_front + ri_p) * (norm_r_s_front + ri_s)).sqrt()).clamp(-1.0, 1.0);
    let delta = cos_delta.acos().to_degrees();
    (psi, delta)
}

/// The reflection-circle diagram: amplitude reflectance `r(d)` as layer
/// thickness `d` sweeps `[0, lambda_nm / (2*n.re)]`, tracing the circle (or
/// spiral, if the layer absorbs) a single top layer's growth describes in
/// the complex `r` plane.
pub fn reflection_circle(n_layer: Complex, lambda_nm: f64, sin2_theta0: Complex, eta0: Complex, etas: Complex, pol: Polarization, steps: usize) -> Vec<Complex> {
    let steps = steps.max(2);
    let d_max = lambda_nm / (2.0 * n_layer.re.max(1e-9));
    (0..steps)
        .map(|k| {
            let d = d_max * k as f64 / (steps - 1) as f64;
            let m = layer_matrix(n_layer, d, lambda_nm, sin2_theta0, pol);
            let (r, _t) = amplitude_rt(m, eta0, etas);
            r
        })
        .collect()
}

/// A full stack: incidence medium, an ordered list of layers, and a
/// substrate, all borrowing `N` containers already filled over a shared
/// [`Wvls`] grid.
pub struct Stack<'a> {
    pub wvls: Rc<Wvls>,
    pub incident: &'a N,
    pub layers: Vec<Layer<'a>>,
    pub substrate: &'a N,
    pub angle_deg: f64,
    pub polarization: Polarization,
}

/// Per-wavelength results of evaluating a [`Stack`].
pub struct StackResult {
    pub r: Vec<Complex>,
    pub t: Vec<Complex>,
    pub reflectance: Vec<f64>,
    pub transmittance: Vec<f64>,
    pub absorptance: Vec<f64>,
    pub phase_r: Vec<f64>,
    pub phase_t: Vec<f64>,
    pub field_amplitude: Vec<f64>,
}

impl<'a> Stack<'a> {
    pub fn evaluate(&self) -> StackResult {
        let n = self.wvls.len();
        let mut sin2 = Sin2::new(self.wvls.clone());
        sin2.set(self.incident, self.angle_deg);

        let mut r = Vec::with_capacity(n);
        let mut t = Vec::with_capacity(n);
        let mut reflectance = Vec::with_capacity(n);
        let mut transmittance = Vec::with_capacity(n);
        let mut absorptance = Vec::with_capacity(n);
        let mut phase_r = Vec::with_capacity(n);
        let mut phase_t = Vec::with_capacity(n);
        let mut field_amp = Vec::with_capacity(n);

        for i in 0..n {
            let lambda = self.wvls[i];
            let s2 = sin2.values()[i];
            let n0 = self.incident[i];
            let ns = self.substrate[i];
            let ct0 = cos_theta(n0, s2);
            let cts = cos_theta(ns, s2);
            let eta0 = admittance(n0, ct0, self.polarization);
            let etas = admittance(ns, cts, self.polarization);

            let m = compose(&self.layers, i, lambda, s2, self.polarization);
            let (ri, ti) = amplitude_rt(m, eta0, etas);
            let (rr, tt, aa) = power_rta(ri, ti, eta0, etas);
            let (pr, pt) = phase_rt(ri, ti);

            r.push(ri);
            t.push(ti);
            reflectance.push(rr);
            transmittance.push(tt);
            absorptance.push(aa);
            phase_r.push(pr);
            phase_t.push(pt);
            field_amp.push(field_amplitude(m, ns, s2, self.polarization));
        }

        StackResult {
            r,
            t,
            reflectance,
            transmittance,
            absorptance,
            phase_r,
            phase_t,
            field_amplitude: field_amp,
        }
    }

    pub fn group_delay(&self, result: &StackResult, unwrap: bool) -> Vec<f64> {
        group_delay(&self.wvls, &result.phase_r, unwrap)
    }

    pub fn group_delay_dispersion(&self, result: &StackResult, unwrap: bool) -> Vec<f64> {
        group_delay_dispersion(&self.wvls, &result.phase_r, unwrap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex_ior::N;

    fn filled(wvls: &Rc<Wvls>, value: Complex) -> N {
        let mut n = N::new(wvls.clone());
        for v in n.values_mut() {
            *v = value;
        }
        n
    }

    #[test]
    fn lossless_single_layer_conserves_energy() {
        let wvls = Wvls::linspace(500.0, 500.0, 2);
        let incident = filled(&wvls, Complex::from(1.0));
        let film = filled(&wvls, Complex::from(1.45));
        let substrate = filled(&wvls, Complex::from(1.52));
        let stack = Stack {
            wvls: wvls.clone(),
            incident: &incident,
            layers: vec![Layer { n: &film, d: 100.0 }],
            substrate: &substrate,
            angle_deg: 0.0,
            polarization: Polarization::S,
        };
        let result = stack.evaluate();
        for i in 0..result.reflectance.len() {
            let sum = result.reflectance[i] + result.transmittance[i] + result.absorptance[i];
            assert!((sum - 1.0).abs() < 1e-9, "R+T+A={sum}");
        }
    }

    #[test]
    fn quarter_wave_on_glass_matches_bare_fresnel_trend() {
        let wvls = Wvls::linspace(550.0, 550.0, 1);
        let incident = filled(&wvls, Complex::from(1.0));
        let substrate = filled(&wvls, Complex::from(1.52));
        let bare = Stack {
            wvls: wvls.clone(),
            incident: &incident,
            layers: vec![],
            substrate: &substrate,
            angle_deg: 0.0,
            polarization: Polarization::S,
        };
        let r = bare.evaluate();
        let expected = ((1.52 - 1.0) / (1.52 + 1.0)).powi(2);
        assert!((r.reflectance[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn normal_incidence_s_and_p_admittance_agree() {
        let n = Complex::from(1.5);
        let s2 = Complex::ZERO;
        let ct = cos_theta(n, s2);
        assert!((ct.re - 1.0).abs() < 1e-12);
        let eta_s = admittance(n, ct, Polarization::S);
        let eta_p = admittance(n, ct, Polarization::P);
        assert!((eta_s.re - eta_p.re).abs() < 1e-12);
    }

    #[test]
    fn degenerate_rho_falls_back_to_literal_constants() {
        let (psi, delta) = ellipsometry(Complex::ZERO, Complex::ZERO);
        assert_eq!(psi, DEGENERATE_PSI_DEG);
        assert_eq!(delta, DEGENERATE_DELTA_DEG);
    }

    #[test]
    fn reflection_circle_starts_at_bare_substrate_reflectance() {
        let n0 = Complex::from(1.0);
        let ns = Complex::from(1.52);
        let points = reflection_circle(Complex::from(1.45), 550.0, Complex::ZERO, n0, ns, Polarization::S, 8);
        let r0 = points[0];
        let expected = (ns - n0) / (ns + n0);
        assert!((r0.re - expected.re).abs() < 1e-9);
    }

    #[test]
    fn unwrap_phase_removes_artificial_2pi_jump() {
        let phases = vec![3.0, -3.1, -3.0];
        let unwrapped = unwrap_phase(&phases);
        assert!((unwrapped[1] - unwrapped[0]).abs() < std::f64::consts::PI);
    }

    #[test]
    fn n_s_flips_branch_past_the_critical_angle() {
        // n^2 - sin2theta0 = 1 - 2 = -1: the principal root sits exactly on
        // the imaginary axis (evanescent wave), which must trigger the
        // branch flip rather than return the principal root unchanged.
        let ns = n_s(Complex::from(1.0), Complex::from(2.0));
        assert!(ns.re.abs() < 1e-12, "ns={ns:?}");
        assert!(ns.im < 0.0, "branch-corrected N_s should be -i, got {ns:?}");
    }

    #[test]
    fn field_amplitude_matches_manual_formula_for_a_single_layer() {
        let lambda = 550.0;
        let n1 = Complex::from(2.1);
        let ns = Complex::from(1.52);
        let sin2 = Complex::ZERO;
        let m = layer_matrix(n1, 80.0, lambda, sin2, Polarization::S);
        let got = field_amplitude(m, ns, sin2, Polarization::S);
        let expected = (m.m11 + m.m12 * n_s(ns, sin2)).abs();
        assert!((got - expected).abs() < 1e-12);
        assert!(got > 0.0);
    }
}
