//! Pre/post matrices: the cumulative layer-matrix products on either side of
//! each layer, built once in `O(L)` and reused by every per-layer derivative.

use crate::complex_ior::Complex;
use crate::matrix::{layer_matrix, CMatrix, Layer, Polarization};

/// `pre[j]` is the product of layer matrices `0..j` (exclusive), `post[j]`
/// is the product of layer matrices `j+1..L` (exclusive). `pre[0]` and
/// `post[L-1]` are both the identity.
pub struct PrePost {
    pub pre: Vec<CMatrix>,
    pub post: Vec<CMatrix>,
}

impl PrePost {
    pub fn build(layers: &[Layer<'_>], i: usize, lambda_nm: f64, sin2_theta0: Complex, pol: Polarization) -> Self {
        let l = layers.len();
        let mats: Vec<CMatrix> = layers
            .iter()
            .map(|layer| layer_matrix(layer.n[i], layer.d, lambda_nm, sin2_theta0, pol))
            .collect();

        let mut pre = vec![CMatrix::IDENTITY; l];
        for j in 1..l {
            pre[j] = pre[j - 1].mul(mats[j - 1]);
        }

        let mut post = vec![CMatrix::IDENTITY; l];
        for j in (0..l.saturating_sub(1)).rev() {
            post[j] = mats[j + 1].mul(post[j + 1]);
        }

        Self { pre, post }
    }
}
