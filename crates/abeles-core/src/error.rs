//! Error taxonomy for the transfer-matrix engine.
//!
//! Only three kinds of failure occur in the core: allocation failure, PCHIP
//! domain failure, and mixture-inversion non-monotonicity.
//! Numerical degeneracies (atan2(0,0), r_p = r_s = 0) are defined values
//! elsewhere, not errors.

use std::fmt;

/// The error type for every fallible operation in this crate.
#[derive(Debug, Clone, PartialEq)]
pub enum AbelesError {
    /// Allocation of internal scratch (e.g. a mixture's per-wavelength PCHIP
    /// array) failed or was refused.
    OutOfMemory,

    /// A PCHIP was asked to evaluate or locate an `x` outside its abscissa
    /// range while `allow_extrapolation` is `false`.
    OutOfDomain {
        /// The value that fell outside the interpolant's domain.
        x: f64,
        /// Domain lower bound.
        lo: f64,
        /// Domain upper bound.
        hi: f64,
    },

    /// Inverse evaluation (PCHIP inverse, or mixture `set_N`/`set_dN`) was
    /// requested against data that is not monotone on the located interval.
    NonMonotonic {
        /// Human-readable description of which profile failed monotonicity.
        context: &'static str,
    },
}

impl fmt::Display for AbelesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "allocation failed while building interpolation scratch"),
            Self::OutOfDomain { x, lo, hi } => {
                write!(f, "value {x} outside interpolation domain [{lo}, {hi}]")
            }
            Self::NonMonotonic { context } => {
                write!(f, "non-monotonic profile, inversion undefined: {context}")
            }
        }
    }
}

impl std::error::Error for AbelesError {}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AbelesError>;
