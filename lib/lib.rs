//! Provides the time-propagation core for one-dimensional quantum systems:
//! wave functions and density operators on a plane-wave grid, evolved either
//! by adaptive Runge-Kutta integration or by polynomial (Chebychev) expansion
//! of the propagator in real and imaginary time.
//!
//! Provides implementations for the following numerical routines:
//! - Real time:
//!     - Adaptive Dormand-Prince 5(4) integration for arbitrary, possibly
//!       time-dependent generators
//!     - Chebychev expansion of the propagator for time-independent
//!       generators with known spectral bounds
//! - Imaginary time:
//!     - Chebychev expansion of `exp(-H dt)` for relaxation to ground and
//!       thermal states
//! - Auxiliary:
//!     - Spectral bounds by shifted power iteration
//!     - Bessel function sequences by backward recurrence
//!     - Dense diagonalization (feature `linalg`)
//!
//! Every solver implements [`Solver`][solver::Solver], so they can be swapped
//! freely:
//! ```ignore
//! let grid = Arc::new(Grid::new(-10.0, 10.0, 128)?);
//! let h = hamiltonian(&grid, 1.0, |x| 0.5 * x * x)?;
//! let eq = SchroedingerEquation::new(&h);
//! let solver = ChebychevSolver::new(&eq, 0.1, (0.0, 250.0))?;
//! let psi0 = product_wave_function(&grid, gaussian(1.0, 0.0, 1.0)?, true)?;
//! for item in solver.propagate(psi0, 0.0, 100) {
//!     let (t, psi) = item?;
//!     log_state(&psi, t);
//! }
//! ```
//!
//! Logging goes through [`tracing`]; no subscriber is installed.
//!
//! See [`docs`] for theoretical background.

pub mod error;
pub mod grid;
pub mod state;
pub mod builder;
pub mod operator;
pub mod expression;
pub mod solver;
pub mod odesolver;
pub mod chebychev;
pub mod special;
pub mod spectrum;
pub mod observables;
pub mod pulse;
#[cfg(feature = "linalg")]
pub mod tise;
pub mod utils;

pub mod docs;

/// Default relative tolerance of the adaptive integrator.
pub const DEF_RTOL: f64 = 1e-6;
/// Default absolute tolerance of the adaptive integrator.
pub const DEF_ATOL: f64 = 1e-6;
/// Default maximum number of substeps per nominal step of the adaptive
/// integrator.
pub const DEF_MAX_SUBSTEPS: usize = 100_000;
/// Default truncation cutoff of the polynomial solvers.
pub const DEF_CUTOFF: f64 = 1e-12;
/// Default maximum expansion order of the polynomial solvers.
pub const DEF_MAX_ORDER: usize = 10_000;
/// Default maximum number of power iterations.
pub const DEF_MAXITERS: usize = 1000;
/// Default convergence threshold of power iterations.
pub const DEF_EPSILON: f64 = 1e-10;
