//! Needle derivative: the sensitivity of the stack's response to inserting
//! an infinitesimally thin "needle" of a candidate material at an arbitrary
//! position inside an existing layer (Larouche & Povinelli, *Appl. Opt.*
//! 2005); the core tool for refinement-free thin-film synthesis, deciding
//! where a new layer would do the most good before committing to its
//! thickness.
//!
//! The needle's own perturbation matrix `dMi` mixes the *existing* layer's
//! phase `phi = k*N_s*thickness` with a position-dependent term `delta_phi =
//! k*N_s*(2*position - thickness)`, weighted by `sum_ratio`/`diff_ratio`
//! between the host and needle materials' reduced indices. Both `phi` and
//! `delta_phi` are built from the *s*-branch reduced index `N_s` alone, even
//! when constructing the p-polarization output matrix — a literal quirk of
//! the closed form, not an oversight. Candidate positions share the same
//! `pre`/`post` array built once per stack evaluation, so ranking every
//! position costs one pass over already-computed matrices.

use crate::complex_ior::Complex;
use crate::matrix::{n_p, n_s, CMatrix, Layer, Polarization};

use super::psi_matrices::{derivative_from_dm, dphase_matrix, ThicknessDerivative};

/// `dMi/d(needle)` for a needle of material `n_needle` inserted at physical
/// `position` (nanometres from the layer's own start) inside a host layer of
/// index `n` and thickness `thickness`, both in nanometres.
#[allow(clippy::too_many_arguments)]
pub fn dmi_needle(n: Complex, n_needle: Complex, thickness: f64, position: f64, lambda_nm: f64, sin2_theta0: Complex, pol: Polarization) -> CMatrix {
    let k = 2.0 * std::f64::consts::PI / lambda_nm;
    let ns = n_s(n, sin2_theta0);
    let nn_s = n_s(n_needle, sin2_theta0);
    let nq = match pol {
        Polarization::S => ns,
        Polarization::P => n_p(n, ns),
    };
    let nnq = match pol {
        Polarization::S => nn_s,
        Polarization::P => n_p(n_needle, nn_s),
    };

    let phi = ns.scale(k * thickness);
    let d_phi = nn_s.scale(k);
    let sum_ratio = (nq / nnq + nnq / nq).scale(0.5);
    let diff_ratio = (nq / nnq - nnq / nq).scale(0.5);

    let dm_phi = dphase_matrix(phi, nq);
    let delta_phi = ns.scale(k * (2.0 * position - thickness));
    let dm_delta_phi = dphase_matrix(delta_phi, nq);

    CMatrix {
        m11: (sum_ratio * dm_phi.m11 + diff_ratio * dm_delta_phi.m11) * d_phi,
        m12: (sum_ratio * dm_phi.m12 + diff_ratio * dm_delta_phi.m12) * d_phi,
        m21: (sum_ratio * dm_phi.m21 - diff_ratio * dm_delta_phi.m21) * d_phi,
        m22: (sum_ratio * dm_phi.m22 - diff_ratio * dm_delta_phi.m22) * d_phi,
    }
}

/// Sensitivity of the stack's response to inserting a needle of index
/// `n_needle` at `position` inside layer `j` (index `n`, thickness
/// `thickness`), given that layer's `pre`/`post` matrices from
/// [`super::pre_post::PrePost`].
#[allow(clippy::too_many_arguments)]
pub fn needle_derivative(
    pre: CMatrix,
    post: CMatrix,
    n: Complex,
    n_needle: Complex,
    thickness: f64,
    position: f64,
    lambda_nm: f64,
    sin2_theta0: Complex,
    pol: Polarization,
    eta0: Complex,
    etas: Complex,
    r: Complex,
    t: Complex,
) -> ThicknessDerivative {
    let dm_needle = dmi_needle(n, n_needle, thickness, position, lambda_nm, sin2_theta0, pol);
    let dm = pre.mul(dm_needle).mul(post);
    derivative_from_dm(dm, eta0, etas, r, t)
}

/// Needle sensitivity profile across `positions_per_layer` evenly spaced
/// interior candidate positions of every layer, ranked by `|d_reflectance|`
/// descending — the quantity a synthesis loop consults to pick where to try
/// inserting a new layer next.
#[allow(clippy::too_many_arguments)]
pub fn rank_needle_positions(
    layers: &[Layer<'_>],
    pre: &[CMatrix],
    post: &[CMatrix],
    n_needle: Complex,
    i: usize,
    lambda_nm: f64,
    sin2_theta0: Complex,
    pol: Polarization,
    eta0: Complex,
    etas: Complex,
    r: Complex,
    t: Complex,
    positions_per_layer: usize,
) -> Vec<(usize, f64, ThicknessDerivative)> {
    let positions_per_layer = positions_per_layer.max(1);
    let mut ranked = Vec::with_capacity(layers.len() * positions_per_layer);
    for (j, layer) in layers.iter().enumerate() {
        let n = layer.n[i];
        for step in 0..positions_per_layer {
            let frac = (step as f64 + 0.5) / positions_per_layer as f64;
            let position = frac * layer.d;
            let d = needle_derivative(pre[j], post[j], n, n_needle, layer.d, position, lambda_nm, sin2_theta0, pol, eta0, etas, r, t);
            ranked.push((j, position, d));
        }
    }
    ranked.sort_by(|a, b| b.2.d_reflectance.abs().partial_cmp(&a.2.d_reflectance.abs()).unwrap());
    ranked
}
