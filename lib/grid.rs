//! One-dimensional plane-wave grid defining the representation of all states.
//!
//! States are stored in the *weighted* DVR: the coefficient at a grid point is
//! the value of the function there, multiplied by the square root of the
//! quadrature weight. Inner products and norms then reduce to plain sums over
//! coefficients, and no quadrature weights appear anywhere in the propagation
//! code.

use std::f64::consts::TAU;
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::{ PropError, PropResult },
    utils::fft_freq,
};

/// Equidistant grid over `[xmin, xmax)` whose underlying basis consists of
/// plane waves.
///
/// Grids are immutable and are shared between states through
/// [`Arc`][std::sync::Arc]s. Two grids compare equal if all of their defining
/// parameters are equal.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    xmin: f64,
    xmax: f64,
    dx: f64,
    // DVR points
    x: nd::Array1<f64>,
    // FBR points (wave vectors) in FFT order
    k: nd::Array1<f64>,
}

impl Grid {
    /// Create a new grid with `n` points spanning `[xmin, xmax)`.
    pub fn new(xmin: f64, xmax: f64, n: usize) -> PropResult<Self> {
        if !(xmin < xmax) || n == 0 {
            return Err(PropError::BadGrid(xmin, xmax, n));
        }
        let dx = (xmax - xmin) / n as f64;
        let x: nd::Array1<f64>
            = (0..n).map(|j| xmin + j as f64 * dx).collect();
        let k: nd::Array1<f64> = fft_freq(n, dx) * TAU;
        Ok(Self { xmin, xmax, dx, x, k })
    }

    /// Number of grid points.
    pub fn size(&self) -> usize { self.x.len() }

    /// Grid spacing.
    pub fn dx(&self) -> f64 { self.dx }

    /// Lower (inclusive) and upper (exclusive) grid boundaries.
    pub fn bounds(&self) -> (f64, f64) { (self.xmin, self.xmax) }

    /// Get a reference to the DVR points.
    pub fn points(&self) -> &nd::Array1<f64> { &self.x }

    /// Get a reference to the wave vectors of the plane-wave basis, in FFT
    /// order.
    pub fn wave_vectors(&self) -> &nd::Array1<f64> { &self.k }

    /// Largest absolute wave vector representable on the grid.
    pub fn k_max(&self) -> f64 { std::f64::consts::PI / self.dx }

    /// Square root of the quadrature weight that converts DVR values to
    /// weighted-DVR coefficients.
    pub fn sqrt_weight(&self) -> f64 { self.dx.sqrt() }

    /// Convert raw function values at the grid points to weighted-DVR
    /// coefficients.
    pub fn to_weighted_dvr<S>(&self, values: &nd::ArrayBase<S, nd::Ix1>)
        -> nd::Array1<C64>
    where S: nd::Data<Elem = C64>
    {
        let w = self.sqrt_weight();
        values.mapv(|v| v * w)
    }

    /// Convert weighted-DVR coefficients back to raw function values at the
    /// grid points.
    pub fn to_dvr<S>(&self, coeffs: &nd::ArrayBase<S, nd::Ix1>)
        -> nd::Array1<C64>
    where S: nd::Data<Elem = C64>
    {
        let w = self.sqrt_weight();
        coeffs.mapv(|c| c / w)
    }
}
