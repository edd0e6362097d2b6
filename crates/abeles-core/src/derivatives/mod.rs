//! First-order derivative machinery for the transfer-matrix engine: pre/post
//! matrices, the psi-matrix quotient-rule derivatives they feed, and the
//! needle/step/monitoring kernels built on top of them.

pub mod monitoring;
pub mod needle;
pub mod pre_post;
pub mod psi_matrices;
pub mod step;

pub use pre_post::PrePost;
pub use psi_matrices::{index_derivative_constant_ot, thickness_derivative, ThicknessDerivative};
