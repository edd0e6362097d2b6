//! Monitoring matrices: the running stack matrix as a single layer grows
//! during deposition, used to predict the optical-monitoring signal (e.g.
//! reflectance) a real-time deposition controller would see slice by slice,
//! before the layer reaches its final thickness.
//!
//! Homogeneous and graded-index layers need genuinely different update
//! rules, not the same one applied twice. A homogeneous layer's matrix at
//! any partial thickness can be built directly with [`layer_matrix`] (phase
//! composes additively for a fixed index, so `M(d1)*M(d2) == M(d1+d2)`),
//! so each monitored slice only needs one multiply against the fixed
//! `prefix` — the matrix of whatever was already deposited below it.
//! A graded-index layer's slices each carry a different index, so there is
//! no closed form for an arbitrary partial thickness: every slice's own
//! small matrix has to be folded into the running product left by the slice
//! before it, seeded by that same `prefix`.

use crate::complex_ior::Complex;
use crate::matrix::{amplitude_rt, layer_matrix, CMatrix, Polarization};

/// The stack matrix after each monitored slice, `cumulative[0]` being
/// `prefix` itself (before anything of the monitored layer has been
/// deposited).
pub struct MonitoringMatrices {
    pub cumulative: Vec<CMatrix>,
}

impl MonitoringMatrices {
    /// Homogeneous-layer monitoring trace: `slices` evenly spaced thickness
    /// fractions of a single material of index `n` and final thickness
    /// `d_total`, each multiplied once against `prefix` (everything
    /// deposited before this layer started).
    #[allow(clippy::too_many_arguments)]
    pub fn build_homogeneous(n: Complex, d_total: f64, slices: usize, lambda_nm: f64, sin2_theta0: Complex, pol: Polarization, prefix: CMatrix) -> Self {
        let slices = slices.max(1);
        let mut cumulative = Vec::with_capacity(slices + 1);
        cumulative.push(prefix);
        for slice in 1..=slices {
            let d = d_total * slice as f64 / slices as f64;
            let m = layer_matrix(n, d, lambda_nm, sin2_theta0, pol);
            cumulative.push(m.mul(prefix));
        }
        Self { cumulative }
    }

    /// Graded-index layer monitoring trace: `profile.len()` homogeneous
    /// sub-slices of total thickness `d_total` (the standard discretisation
    /// of a continuous index profile), each slice's own matrix folded into
    /// the running product left by the slice before it, seeded by `prefix`.
    pub fn build_graded(profile: &[Complex], d_total: f64, lambda_nm: f64, sin2_theta0: Complex, pol: Polarization, prefix: CMatrix) -> Self {
        let slices = profile.len().max(1);
        let d_slice = d_total / slices as f64;
        let mut cumulative = Vec::with_capacity(slices + 1);
        cumulative.push(prefix);
        let mut running = prefix;
        for &n in profile {
            running = layer_matrix(n, d_slice, lambda_nm, sin2_theta0, pol).mul(running);
            cumulative.push(running);
        }
        Self { cumulative }
    }

    /// Predicted reflectance at each deposition step, given the incidence
    /// and substrate-so-far admittances (for in-situ monitoring the
    /// "substrate" is usually just the medium above the still-growing
    /// layer, i.e. air, since nothing has been deposited on top of it yet).
    pub fn reflectance_trace(&self, eta0: Complex, etas_above: Complex) -> Vec<f64> {
        self.cumulative
            .iter()
            .map(|&m| {
                let (r, _t) = amplitude_rt(m, eta0, etas_above);
                r.norm_sqr()
            })
            .collect()
    }
}
