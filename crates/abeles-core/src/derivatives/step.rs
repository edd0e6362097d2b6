//! Step derivative: sensitivity of the stack's response to an infinitesimal
//! index perturbation of an *existing* layer at a specific interior
//! position, as opposed to the needle kernel's infinitesimal-thickness
//! insertion. Used for graded-index profile refinement, where the free
//! parameter is a layer's index at a given depth rather than a new layer's
//! thickness (Larouche, *Appl. Opt.* 2006).
//!
//! The position-dependent phase term carries an explicit minus sign,
//! `k*delta_thickness = -k*(2*position - thickness)`, preserved literally
//! rather than "corrected" to match the needle kernel's `+k*(2*position -
//! thickness)`: the two kernels are not the same perturbation (a thickness
//! insertion versus an index change smeared over the whole layer) and the
//! sign difference is load-bearing, not an inconsistency.

use crate::complex_ior::Complex;
use crate::matrix::{n_p, n_s, CMatrix, Layer, Polarization};

use super::psi_matrices::{derivative_from_dm, dphase_matrix, phase_matrix, ThicknessDerivative};

/// `dMi/d(index)` for an index perturbation `dn` at physical `position`
/// (nanometres from the layer's own start) inside a layer of index `n` and
/// thickness `thickness`, both in nanometres.
#[allow(clippy::too_many_arguments)]
pub fn dmi_step(n: Complex, dn: Complex, thickness: f64, position: f64, lambda_nm: f64, sin2_theta0: Complex, pol: Polarization) -> CMatrix {
    let k = 2.0 * std::f64::consts::PI / lambda_nm;
    let ns = n_s(n, sin2_theta0);
    let np = n_p(n, ns);
    let d_ns = n / ns;
    let d_np = d_ns * (Complex::from(2.0) - d_ns * d_ns);
    let (nq, d_nq) = match pol {
        Polarization::S => (ns, d_ns),
        Polarization::P => (np, d_np),
    };
    let inv_nq = Complex::ONE / nq;

    let phi = ns.scale(k * thickness);
    let cos_phi = phi.cos();
    let dm_phi = dphase_matrix(phi, nq);

    let k_delta_thickness = -k * (2.0 * position - thickness);
    let delta_phi = ns.scale(k_delta_thickness);
    let d_delta_phi = d_ns.scale(k_delta_thickness);
    let m_delta = phase_matrix(delta_phi, nq);

    CMatrix {
        m11: ((dm_phi.m11 * d_delta_phi + inv_nq * (m_delta.m11 - cos_phi) * d_nq).scale(0.5)) * dn,
        m12: ((dm_phi.m12 * d_delta_phi - inv_nq * m_delta.m12 * d_nq).scale(0.5)) * dn,
        m21: ((dm_phi.m21 * d_delta_phi + inv_nq * m_delta.m21 * d_nq).scale(0.5)) * dn,
        m22: ((dm_phi.m22 * d_delta_phi - inv_nq * (m_delta.m22 - cos_phi) * d_nq).scale(0.5)) * dn,
    }
}

/// Sensitivity of the stack's response to an infinitesimal index change `dn`
/// at `position` inside layer `j`, given its pre/post matrices from
/// [`super::pre_post::PrePost`].
#[allow(clippy::too_many_arguments)]
pub fn index_derivative(
    pre: CMatrix,
    post: CMatrix,
    layer: &Layer<'_>,
    i: usize,
    position: f64,
    dn: Complex,
    lambda_nm: f64,
    sin2_theta0: Complex,
    pol: Polarization,
    eta0: Complex,
    etas: Complex,
    r: Complex,
    t: Complex,
) -> ThicknessDerivative {
    let dm_layer = dmi_step(layer.n[i], dn, layer.d, position, lambda_nm, sin2_theta0, pol);
    let dm = pre.mul(dm_layer).mul(post);
    derivative_from_dm(dm, eta0, etas, r, t)
}
