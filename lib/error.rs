//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! Note that numerical divergence of the polynomial solvers (caused by a
//! spectral bound that is too tight) is *not* represented here: it cannot be
//! distinguished from legitimate high-order contributions and has to be
//! diagnosed by the caller, e.g. by monitoring [`State::trace`] across steps.
//!
//! [anyhow]: https://crates.io/crates/anyhow
//! [`State::trace`]: crate::state::State::trace

use std::sync::Arc;
use thiserror::Error;
use crate::{ grid::Grid, state::Kind };

/// Returned when two objects that must share a grid and a representation do
/// not.
#[derive(Debug, Error)]
pub enum MismatchError {
    /// Two states, or a state and an operator, are defined on different
    /// grids.
    #[error("objects are defined on different grids; got {0} and {1} points")]
    Grid(usize, usize),

    /// A wave function was combined with a density operator.
    #[error("cannot combine a {0} with a {1}")]
    Kind(Kind, Kind),

    /// A coefficient array does not have the shape required by its grid.
    #[error("coefficient array has shape {0:?}, but the grid requires {1:?}")]
    Data(Vec<usize>, Vec<usize>),
}

impl MismatchError {
    pub(crate) fn check_grids(a: &Arc<Grid>, b: &Arc<Grid>)
        -> Result<(), Self>
    {
        (Arc::ptr_eq(a, b) || a == b).then_some(())
            .ok_or(Self::Grid(a.size(), b.size()))
    }

    pub(crate) fn check_kinds(a: Kind, b: Kind) -> Result<(), Self> {
        (a == b).then_some(()).ok_or(Self::Kind(a, b))
    }

    pub(crate) fn check_shape(got: &[usize], expected: &[usize])
        -> Result<(), Self>
    {
        (got == expected).then_some(())
            .ok_or_else(|| Self::Data(got.to_vec(), expected.to_vec()))
    }
}

/// Returned from everything that builds, combines, or propagates states.
#[derive(Debug, Error)]
pub enum PropError {
    /// [`MismatchError`]
    #[error("shape mismatch: {0}")]
    ShapeMismatch(#[from] MismatchError),

    /// Returned when a generator cannot be used in the requested way, e.g. a
    /// time-dependent generator passed to a fixed-step polynomial solver, or
    /// a wave function-only expression applied to a density operator.
    #[error("unsupported generator: {0}")]
    UnsupportedGeneratorKind(String),

    /// Returned when a non-positive or non-finite time step is encountered.
    #[error("time step must be finite and greater than 0; got {0}")]
    BadTimestep(f64),

    /// Returned when a spectral bound is empty, reversed, or not finite.
    #[error("spectral bound must be finite with lower < upper; got ({0}, {1})")]
    BadSpectrum(f64, f64),

    /// Returned when a non-positive truncation cutoff is encountered.
    #[error("cutoff must be greater than 0; got {0}")]
    BadCutoff(f64),

    /// Returned when a non-positive tolerance is encountered.
    #[error("tolerances must be greater than 0; got rtol = {0}, atol = {1}")]
    BadTolerance(f64, f64),

    /// Returned when a maximum expansion order of less than 2 is requested.
    #[error("maximum expansion order must be at least 2; got {0}")]
    BadMaxOrder(usize),

    /// Returned when a non-positive `maxiters` value is encountered.
    #[error("maxiters must be greater than 0; got {0}")]
    BadMaxiters(usize),

    /// Returned when grid parameters do not describe a non-empty grid.
    #[error("grid requires xmin < xmax and at least one point; got ({0}, {1}, {2})")]
    BadGrid(f64, f64, usize),

    /// Returned when a non-positive particle mass is encountered.
    #[error("particle mass must be greater than 0; got {0}")]
    BadMass(f64),

    /// Returned when a non-positive width is encountered.
    #[error("width must be greater than 0; got {0}")]
    BadWidth(f64),

    /// Returned when a sum is built from zero terms.
    #[error("a sum requires at least one term")]
    EmptySum,

    /// Returned when a state with zero norm would have to be normalized.
    #[error("state has zero norm")]
    ZeroNorm,

    /// Returned when the Chebychev series does not drop below the cutoff
    /// within the maximum number of terms.
    #[error("expansion did not reach cutoff {cutoff:e} within {max_order} terms")]
    ComputationLimitExceeded {
        /// Maximum number of terms that were allowed.
        max_order: usize,
        /// The cutoff that was not reached.
        cutoff: f64,
    },

    /// Returned when the adaptive integrator needs more substeps than allowed
    /// to complete a nominal step.
    #[error("ode error bound could not be satisfied within {max_substeps} substeps (t = {t})")]
    OdeStepLimit {
        /// Time at which the integrator gave up.
        t: f64,
        /// Maximum number of substeps per nominal step.
        max_substeps: usize,
    },

    /// Returned when the adaptive substep size becomes too small to advance
    /// the time coordinate.
    #[error("ode step size {h:e} underflowed at t = {t}")]
    OdeStepUnderflow {
        /// Time at which the integrator gave up.
        t: f64,
        /// Rejected substep size.
        h: f64,
    },

    /// [`LinalgError`][ndarray_linalg::error::LinalgError].
    #[cfg(feature = "linalg")]
    #[error("linalg error: {0}")]
    Linalg(#[from] ndarray_linalg::error::LinalgError),
}

impl PropError {
    pub(crate) fn check_timestep(dt: f64) -> Result<(), Self> {
        (dt > 0.0 && dt.is_finite()).then_some(()).ok_or(Self::BadTimestep(dt))
    }

    pub(crate) fn check_spectrum(spectrum: (f64, f64)) -> Result<(), Self> {
        (spectrum.0 < spectrum.1 && spectrum.0.is_finite() && spectrum.1.is_finite())
            .then_some(())
            .ok_or(Self::BadSpectrum(spectrum.0, spectrum.1))
    }

    pub(crate) fn check_cutoff(cutoff: f64) -> Result<(), Self> {
        (cutoff > 0.0).then_some(()).ok_or(Self::BadCutoff(cutoff))
    }

    pub(crate) fn check_tolerance(rtol: f64, atol: f64) -> Result<(), Self> {
        (rtol > 0.0 && atol > 0.0).then_some(())
            .ok_or(Self::BadTolerance(rtol, atol))
    }

    pub(crate) fn check_max_order(max_order: usize) -> Result<(), Self> {
        (max_order >= 2).then_some(()).ok_or(Self::BadMaxOrder(max_order))
    }

    pub(crate) fn check_maxiters(maxiters: usize) -> Result<(), Self> {
        (maxiters != 0).then_some(()).ok_or(Self::BadMaxiters(maxiters))
    }

    pub(crate) fn check_mass(mass: f64) -> Result<(), Self> {
        (mass > 0.0).then_some(()).ok_or(Self::BadMass(mass))
    }

    pub(crate) fn check_width(width: f64) -> Result<(), Self> {
        (width > 0.0).then_some(()).ok_or(Self::BadWidth(width))
    }

    pub(crate) fn time_dependent(what: &str) -> Self {
        Self::UnsupportedGeneratorKind(
            format!("{what} requires a time-independent generator"))
    }

    pub(crate) fn wrong_kind(what: &str, kind: Kind) -> Self {
        Self::UnsupportedGeneratorKind(
            format!("{what} cannot be applied to a {kind}"))
    }
}

pub type PropResult<T> = Result<T, PropError>;
