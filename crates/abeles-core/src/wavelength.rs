//! Shared wavelength grid.
//!
//! Every wavelength-parameterised container in this crate borrows the same
//! [`Wvls`] by reference-counted handle rather than copying it: materials,
//! matrices, spectra and derivative containers are all built against one
//! evaluation's grid (see DESIGN.md's Open Question on the sharing model).

use std::rc::Rc;

/// An ordered sequence of wavelengths, in nanometres, shared by every
/// container built against a single evaluation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wvls {
    values: Vec<f64>,
}

impl Wvls {
    /// Build a wavelength grid. Every entry must be strictly positive;
    /// non-finite or non-positive entries are dropped to `1.0` rather than
    /// panicking, since a malformed grid is a caller bug the numerics should
    /// not crash on mid-evaluation.
    pub fn new(values: Vec<f64>) -> Rc<Self> {
        let values = values
            .into_iter()
            .map(|w| if w.is_finite() && w > 0.0 { w } else { 1.0 })
            .collect();
        Rc::new(Self { values })
    }

    /// Build a uniformly-spaced grid `[start, end]` with `count` points
    /// (`count >= 2`).
    pub fn linspace(start: f64, end: f64, count: usize) -> Rc<Self> {
        let count = count.max(2);
        let step = (end - start) / (count - 1) as f64;
        Self::new((0..count).map(|i| start + i as f64 * step).collect())
    }

    /// Number of wavelengths in the grid.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the grid holds no wavelengths.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the wavelengths in nanometres.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The wavelength at `i`.
    pub fn get(&self, i: usize) -> f64 {
        self.values[i]
    }
}

impl std::ops::Index<usize> for Wvls {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.values[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_endpoints() {
        let w = Wvls::linspace(400.0, 800.0, 101);
        assert_eq!(w.len(), 101);
        assert!((w[0] - 400.0).abs() < 1e-9);
        assert!((w[100] - 800.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_entries_are_sanitised() {
        let w = Wvls::new(vec![550.0, -10.0, f64::NAN, 0.0]);
        assert_eq!(w.values(), &[550.0, 1.0, 1.0, 1.0]);
    }
}
