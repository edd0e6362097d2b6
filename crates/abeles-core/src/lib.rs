//! Transfer-matrix (Abelès) spectral engine for planar multilayer thin-film
//! stacks.
//!
//! Given a stack of layers, each a complex refractive index over a shared
//! wavelength grid plus a physical thickness, this crate computes amplitude
//! reflection/transmission (`r`, `t`), the derived power quantities
//! (`R`/`T`/`A`), phase on reflection/transmission and its group delay and
//! dispersion, ellipsometric `(Psi, Delta)`, stack admittance, field
//! amplitude at each interface, the reflection-circle diagram, and
//! first-order analytic derivatives of all of the above with respect to a
//! layer's thickness or index — including the needle and step sensitivity
//! kernels used by thin-film synthesis tools.
//!
//! No I/O, no logging, no concurrency: construct the material and stack
//! types, call [`matrix::Stack::evaluate`], and consume the arrays.

#![deny(unsafe_code)]

pub mod complex_ior;
pub mod derivatives;
pub mod dispersion;
pub mod error;
pub mod matrix;
pub mod mixture;
pub mod pchip;
pub mod wavelength;

pub use complex_ior::{Complex, Sin2, N};
pub use derivatives::{thickness_derivative, PrePost, ThicknessDerivative};
pub use dispersion::{CauchyDispersion, ConstantDispersion, Dispersion, DispersionModel, SellmeierDispersion, TableDispersion};
pub use error::{AbelesError, Result};
pub use matrix::{
    amplitude_rt, amplitude_rt_reverse, backside_incoherent, compose, ellipsometry, ellipsometry_backside, field_amplitude,
    group_delay, group_delay_dispersion, layer_matrix, n_p, n_s, power_rta, reflection_circle, stack_admittance, CMatrix, Layer,
    Polarization, Stack, StackResult,
};
pub use mixture::Mixture;
pub use pchip::Pchip;
pub use wavelength::Wvls;
