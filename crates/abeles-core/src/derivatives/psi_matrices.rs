//! Psi matrices: analytic first derivatives of `r`, `t`, `R`, `T`, `A` and
//! the reflection/transmission phases with respect to a single layer's
//! thickness, built from the pre/post matrices of [`super::pre_post`].
//! Paired, per module, with a numerical central-difference check in
//! `mod tests`.

use crate::complex_ior::{clamp_phase, Complex};
use crate::matrix::{admittance, cos_theta, n_p, n_s, CMatrix, Layer, Polarization};

/// The rotation-shaped characteristic matrix for a bare phase `phi` against
/// reduced index `n_q` (`eta_s = N_s`/`eta_p = N_p`), i.e. [`crate::matrix::layer_matrix`]'s
/// body without the thickness-scaling step — shared by the needle and step
/// kernels, which build `phi`/`delta_phi` themselves rather than from a
/// layer's own thickness.
pub(crate) fn phase_matrix(phi: Complex, n_q: Complex) -> CMatrix {
    let phi = clamp_phase(phi);
    let cos_phi = phi.cos();
    let sin_phi = phi.sin();
    CMatrix {
        m11: cos_phi,
        m12: Complex::I * sin_phi / n_q,
        m21: Complex::I * n_q * sin_phi,
        m22: cos_phi,
    }
}

/// The derivative-shaped matrix `d/dphi` of [`phase_matrix`] at fixed `n_q`
/// — shared by the needle and step kernels.
pub(crate) fn dphase_matrix(phi: Complex, n_q: Complex) -> CMatrix {
    let phi = clamp_phase(phi);
    let cos_phi = phi.cos();
    let sin_phi = phi.sin();
    CMatrix {
        m11: -sin_phi,
        m12: Complex::I * cos_phi / n_q,
        m21: Complex::I * n_q * cos_phi,
        m22: -sin_phi,
    }
}

/// The analytic derivative of a layer's characteristic matrix with respect
/// to its thickness `d`, holding wavelength, index and angle fixed.
pub fn dlayer_matrix_dd(n: Complex, d: f64, lambda_nm: f64, sin2_theta0: Complex, pol: Polarization) -> CMatrix {
    let ct = cos_theta(n, sin2_theta0);
    let eta = admittance(n, ct, pol);
    let k = (n * ct).scale(2.0 * std::f64::consts::PI / lambda_nm);
    let phi = clamp_phase(k.scale(d));
    let cos_phi = phi.cos();
    let sin_phi = phi.sin();
    CMatrix {
        m11: -sin_phi * k,
        m12: Complex::I * cos_phi * k / eta,
        m21: Complex::I * eta * cos_phi * k,
        m22: -sin_phi * k,
    }
}

/// Per-layer amplitude and power derivatives with respect to that layer's
/// thickness.
#[derive(Debug, Clone, Copy)]
pub struct ThicknessDerivative {
    pub dr: Complex,
    pub dt: Complex,
    pub d_reflectance: f64,
    pub d_transmittance: f64,
    pub d_absorptance: f64,
    pub d_phase_r: f64,
    pub d_phase_t: f64,
}

/// The analytic derivative of a layer's characteristic matrix with respect
/// to its (complex) index `n`, holding thickness, wavelength and angle
/// fixed. Used by `derivatives::step` rather than `thickness_derivative`.
pub fn dlayer_matrix_dn(n: Complex, d: f64, lambda_nm: f64, sin2_theta0: Complex, pol: Polarization) -> CMatrix {
    let ct = cos_theta(n, sin2_theta0);
    let eta = admittance(n, ct, pol);
    let dct_dn = sin2_theta0 / ((n * n * n) * ct);
    let d_ncos_dn = ct + n * dct_dn;
    let deta_dn = match pol {
        Polarization::S => d_ncos_dn,
        Polarization::P => Complex::ONE / ct - n * dct_dn / (ct * ct),
    };
    let dphi_dn = d_ncos_dn.scale(2.0 * std::f64::consts::PI * d / lambda_nm);
    let phi = clamp_phase((n * ct).scale(2.0 * std::f64::consts::PI * d / lambda_nm));
    let cos_phi = phi.cos();
    let sin_phi = phi.sin();

    let m11 = -sin_phi * dphi_dn;
    let m12 = (Complex::I * cos_phi / eta) * dphi_dn + (-Complex::I * sin_phi / (eta * eta)) * deta_dn;
    let m21 = (Complex::I * eta * cos_phi) * dphi_dn + (Complex::I * sin_phi) * deta_dn;
    let m22 = -sin_phi * dphi_dn;
    CMatrix { m11, m12, m21, m22 }
}

/// The analytic derivative of a layer's characteristic matrix with respect
/// to its index, holding the layer's *optical* thickness constant at a
/// reference wavelength rather than holding its physical thickness `d`
/// constant: as the index at `n_ref`/`sin2_theta0_ref` changes, the physical
/// thickness is implicitly compensated (`dd_dn_ref`) to keep `n_ref * d`
/// (projected onto the reference angle) fixed, and that compensation is
/// folded into every wavelength's phase derivative through the chain rule.
/// Used for refinement runs that vary a layer's material while preserving
/// its design wavelength's optical thickness, as opposed to
/// [`dlayer_matrix_dn`]'s plain whole-layer index derivative.
#[allow(clippy::too_many_arguments)]
pub fn dlayer_matrix_dn_constant_ot(
    n: Complex,
    dn: Complex,
    thickness: f64,
    lambda_nm: f64,
    sin2_theta0: Complex,
    pol: Polarization,
    n_ref: Complex,
    sin2_theta0_ref: Complex,
) -> CMatrix {
    let ns_ref = n_s(n_ref, sin2_theta0_ref);
    let norm_ns_ref = ns_ref.norm_sqr();
    let n_ref_re = n_ref.re;
    let k_ref = -n_ref.im;
    let dd_dn_ref = -thickness / norm_ns_ref * (n_ref_re - (ns_ref.im / ns_ref.re) * k_ref);

    let k = 2.0 * std::f64::consts::PI / lambda_nm;
    let ns = n_s(n, sin2_theta0);
    let np = n_p(n, ns);
    let d_ns = n / ns;
    let d_np = d_ns * (Complex::from(2.0) - d_ns * d_ns);
    let dphi_dn = d_ns.scale(k * thickness);
    let dphi_dd = ns.scale(k);
    let dphi_dn_ref = dphi_dn * dn + dphi_dd.scale(dd_dn_ref);

    let phi = clamp_phase(ns.scale(k * thickness));
    let cos_phi = phi.cos();
    let sin_phi = phi.sin();

    let (n_q, d_nq) = match pol {
        Polarization::S => (ns, d_ns),
        Polarization::P => (np, d_np),
    };
    let j_sin_nq_dn_ref = Complex::I * sin_phi * d_nq * dn;
    let j_cos_phi_dphi_dn_ref = Complex::I * cos_phi * dphi_dn_ref;

    CMatrix {
        m11: -sin_phi * dphi_dn_ref,
        m12: j_cos_phi_dphi_dn_ref / n_q - j_sin_nq_dn_ref / (n_q * n_q),
        m21: n_q * j_cos_phi_dphi_dn_ref + j_sin_nq_dn_ref,
        m22: -sin_phi * dphi_dn_ref,
    }
}

/// Derive [`ThicknessDerivative`]'s amplitude/power/phase quotient-rule
/// results from an already-composed `dM = pre * dM_layer * post` and the
/// stack's evaluated `r`/`t`. Shared by [`thickness_derivative`] and by the
/// needle/step kernels, which only differ in how `dM` is built.
pub(crate) fn derivative_from_dm(dm: CMatrix, eta0: Complex, etas: Complex, r: Complex, t: Complex) -> ThicknessDerivative {
    let db = dm.m11 + dm.m12 * etas;
    let dc = dm.m21 + dm.m22 * etas;
    let d_den = eta0 * db + dc;
    let den = (eta0 * Complex::from(2.0)) / t;

    let num = eta0 * db - dc;
    let dr = (num * den - (r * den) * d_den) / (den * den);
    let dt = -(t * d_den) / den;

    let d_reflectance = 2.0 * (r.conj() * dr).re;
    let d_transmittance = (etas.re / eta0.re) * 2.0 * (t.conj() * dt).re;
    let d_absorptance = -(d_reflectance + d_transmittance);

    let d_phase_r = if r.norm_sqr() > 0.0 { (dr / r).im } else { 0.0 };
    let d_phase_t = if t.norm_sqr() > 0.0 { (dt / t).im } else { 0.0 };

    ThicknessDerivative {
        dr,
        dt,
        d_reflectance,
        d_transmittance,
        d_absorptance,
        d_phase_r,
        d_phase_t,
    }
}

/// Compute [`ThicknessDerivative`] for layer `j` at wavelength index `i`,
/// given its pre/post matrices, the incidence/substrate admittances, and the
/// stack's amplitude coefficients `r`/`t` at this wavelength. `D = eta0*B +
/// C` is recovered from `t = 2*eta0/D` rather than recomputed from `m`,
/// since the caller already evaluated `t`.
#[allow(clippy::too_many_arguments)]
pub fn thickness_derivative(
    pre: CMatrix,
    post: CMatrix,
    layer: &Layer<'_>,
    i: usize,
    lambda_nm: f64,
    sin2_theta0: Complex,
    pol: Polarization,
    eta0: Complex,
    etas: Complex,
    r: Complex,
    t: Complex,
) -> ThicknessDerivative {
    let dm_layer = dlayer_matrix_dd(layer.n[i], layer.d, lambda_nm, sin2_theta0, pol);
    let dm = pre.mul(dm_layer).mul(post);
    derivative_from_dm(dm, eta0, etas, r, t)
}

/// [`thickness_derivative`]'s counterpart for an index change that holds
/// layer `j`'s optical thickness fixed at a reference wavelength
/// (`n_ref`/`sin2_theta0_ref`), using [`dlayer_matrix_dn_constant_ot`]
/// instead of a plain thickness derivative.
#[allow(clippy::too_many_arguments)]
pub fn index_derivative_constant_ot(
    pre: CMatrix,
    post: CMatrix,
    layer: &Layer<'_>,
    i: usize,
    lambda_nm: f64,
    sin2_theta0: Complex,
    pol: Polarization,
    eta0: Complex,
    etas: Complex,
    r: Complex,
    t: Complex,
    dn: Complex,
    n_ref: Complex,
    sin2_theta0_ref: Complex,
) -> ThicknessDerivative {
    let dm_layer = dlayer_matrix_dn_constant_ot(layer.n[i], dn, layer.d, lambda_nm, sin2_theta0, pol, n_ref, sin2_theta0_ref);
    let dm = pre.mul(dm_layer).mul(post);
    derivative_from_dm(dm, eta0, etas, r, t)
}
