//! Adaptive Runge-Kutta integration for arbitrary generators.
//!
//! This is the general-purpose fallback: it works for any spectrum and for
//! explicitly time-dependent generators, at the price of many more generator
//! evaluations than the polynomial solvers need for the same accuracy.
//!
//! The integrator is the Dormand-Prince 5(4) embedded pair. Each elementary
//! step of the [`Solver`] interface is subdivided into as many substeps as
//! needed to keep the local error estimate below the tolerances; substeps
//! always land exactly on the end of the elementary step.

use num_complex::Complex64 as C64;
use tracing::{ debug, trace };
use crate::{
    DEF_ATOL,
    DEF_MAX_SUBSTEPS,
    DEF_RTOL,
    error::{ PropError, PropResult },
    expression::Generator,
    solver::Solver,
    state::State,
};

// Dormand-Prince tableau
const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
const A2: [f64; 1] = [1.0 / 5.0];
const A3: [f64; 2] = [3.0 / 40.0, 9.0 / 40.0];
const A4: [f64; 3] = [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0];
const A5: [f64; 4] = [
    19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0,
];
const A6: [f64; 5] = [
    9017.0 / 3168.0, -355.0 / 33.0, 46732.0 / 5247.0, 49.0 / 176.0,
    -5103.0 / 18656.0,
];
// fifth-order weights; also the last row of the tableau (FSAL)
const B: [f64; 6] = [
    35.0 / 384.0, 0.0, 500.0 / 1113.0, 125.0 / 192.0, -2187.0 / 6784.0,
    11.0 / 84.0,
];
// difference between fifth- and fourth-order weights
const E: [f64; 7] = [
    71.0 / 57600.0, 0.0, -71.0 / 16695.0, 71.0 / 1920.0, -17253.0 / 339200.0,
    22.0 / 525.0, -1.0 / 40.0,
];

// step size controller
const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;

/// Tolerances and limits for [`OdeSolver`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OdeConfig {
    /// Relative tolerance (default: [`DEF_RTOL`]).
    pub rtol: f64,
    /// Absolute tolerance (default: [`DEF_ATOL`]).
    pub atol: f64,
    /// Maximum number of substeps, accepted or rejected, per elementary step
    /// (default: [`DEF_MAX_SUBSTEPS`]).
    pub max_substeps: usize,
    /// Size of the first substep of every elementary step; estimated from the
    /// generator if `None` (default).
    pub first_step: Option<f64>,
}

impl Default for OdeConfig {
    fn default() -> Self {
        Self {
            rtol: DEF_RTOL,
            atol: DEF_ATOL,
            max_substeps: DEF_MAX_SUBSTEPS,
            first_step: None,
        }
    }
}

impl OdeConfig {
    /// Set the relative tolerance.
    pub fn with_rtol(mut self, rtol: f64) -> Self {
        self.rtol = rtol;
        self
    }

    /// Set the absolute tolerance.
    pub fn with_atol(mut self, atol: f64) -> Self {
        self.atol = atol;
        self
    }

    /// Set both tolerances at once.
    pub fn with_tolerance(self, tol: f64) -> Self {
        self.with_rtol(tol).with_atol(tol)
    }

    /// Set the maximum number of substeps per elementary step.
    pub fn with_max_substeps(mut self, max_substeps: usize) -> Self {
        self.max_substeps = max_substeps;
        self
    }

    /// Set the size of the first substep.
    pub fn with_first_step(mut self, first_step: f64) -> Self {
        self.first_step = Some(first_step);
        self
    }

    fn check(&self) -> PropResult<()> {
        PropError::check_tolerance(self.rtol, self.atol)?;
        PropError::check_maxiters(self.max_substeps)?;
        if let Some(h) = self.first_step { PropError::check_timestep(h)?; }
        Ok(())
    }
}

// `h * sum_j w_j k_j`, skipping zero weights; `w_0` must not be zero
fn weighted_sum(h: f64, weights: &[f64], ks: &[State]) -> PropResult<State> {
    let first = ks[0].scaled(C64::from(h * weights[0]));
    weights.iter().zip(ks).skip(1)
        .filter(|(w, _)| **w != 0.0)
        .try_fold(first, |acc, (w, k)| {
            State::lincomb(C64::from(1.0), &acc, C64::from(h * w), k)
        })
}

// `base + h * sum_j w_j k_j`
fn stage(base: &State, h: f64, weights: &[f64], ks: &[State])
    -> PropResult<State>
{
    base.checked_add(&weighted_sum(h, weights, ks)?)
}

/// Adaptive Dormand-Prince 5(4) integrator.
pub struct OdeSolver<G>
where G: Generator
{
    generator: G,
    dt: f64,
    config: OdeConfig,
}

impl<G> OdeSolver<G>
where G: Generator
{
    /// Create a new solver with default tolerances.
    pub fn new(generator: G, dt: f64) -> PropResult<Self> {
        Self::with_config(generator, dt, OdeConfig::default())
    }

    /// Create a new solver with explicit tolerances and limits.
    pub fn with_config(generator: G, dt: f64, config: OdeConfig)
        -> PropResult<Self>
    {
        PropError::check_timestep(dt)?;
        config.check()?;
        debug!(
            dt,
            rtol = config.rtol,
            atol = config.atol,
            time_dependent = generator.is_time_dependent(),
            "set up adaptive integrator"
        );
        Ok(Self { generator, dt, config })
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &OdeConfig { &self.config }

    // RMS norm of `err` scaled by the mixed tolerance
    fn error_norm(&self, err: &State, y: &State, y_new: &State) -> f64 {
        let OdeConfig { rtol, atol, .. } = self.config;
        let (sum, count)
            = err.coefficients().zip(y.coefficients()).zip(y_new.coefficients())
            .fold((0.0, 0_usize), |(acc, n), ((e, a), b)| {
                let scale = atol + rtol * a.norm().max(b.norm());
                (acc + (e.norm() / scale).powi(2), n + 1)
            });
        (sum / count.max(1) as f64).sqrt()
    }

    // RMS norm of `v` scaled by the tolerance at `y`
    fn scaled_norm(&self, v: &State, y: &State) -> f64 {
        let OdeConfig { rtol, atol, .. } = self.config;
        let (sum, count)
            = v.coefficients().zip(y.coefficients())
            .fold((0.0, 0_usize), |(acc, n), (vk, yk)| {
                let scale = atol + rtol * yk.norm();
                (acc + (vk.norm() / scale).powi(2), n + 1)
            });
        (sum / count.max(1) as f64).sqrt()
    }

    // initial substep estimate, following Hairer, Norsett & Wanner, "Solving
    // Ordinary Differential Equations I", sec. II.4
    fn initial_substep(&self, y: &State, f0: &State, t: f64)
        -> PropResult<f64>
    {
        let d0 = self.scaled_norm(y, y);
        let d1 = self.scaled_norm(f0, y);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 { 1e-6 } else { 0.01 * d0 / d1 };
        let h0 = h0.min(self.dt);
        let y1 = State::lincomb(C64::from(1.0), y, C64::from(h0), f0)?;
        let f1 = self.generator.apply(&y1, t + h0)?;
        let d2 = self.scaled_norm(&f1.checked_sub(f0)?, y) / h0;
        let dmax = d1.max(d2);
        let h1
            = if dmax <= 1e-15 {
                (h0 * 1e-3).max(1e-6)
            } else {
                (0.01 / dmax).powf(0.2)
            };
        Ok((100.0 * h0).min(h1).min(self.dt))
    }

    // one attempted substep from `(t, y)` with derivative `k1`; returns the
    // fifth-order solution, its derivative, and the scaled error
    fn try_substep(&self, y: &State, k1: &State, t: f64, h: f64)
        -> PropResult<(State, State, f64)>
    {
        let mut ks: Vec<State> = Vec::with_capacity(7);
        ks.push(k1.clone());
        let rows: [&[f64]; 5] = [&A2, &A3, &A4, &A5, &A6];
        for (i, row) in rows.iter().enumerate() {
            let yi = stage(y, h, row, &ks)?;
            ks.push(self.generator.apply(&yi, t + C[i + 1] * h)?);
        }
        let y_new = stage(y, h, &B, &ks)?;
        let k7 = self.generator.apply(&y_new, t + h)?;
        let err
            = State::lincomb(
                C64::from(1.0), &weighted_sum(h, &E[..6], &ks)?,
                C64::from(h * E[6]), &k7,
            )?;
        let err_norm = self.error_norm(&err, y, &y_new);
        Ok((y_new, k7, err_norm))
    }
}

impl<G> Solver for OdeSolver<G>
where G: Generator
{
    fn dt(&self) -> f64 { self.dt }

    fn step(&self, state: &State, t: f64) -> PropResult<State> {
        let t_end = t + self.dt;
        let mut t_cur = t;
        let mut y = state.clone();
        let mut k1 = self.generator.apply(&y, t_cur)?;
        let mut h
            = match self.config.first_step {
                Some(h) => h.min(self.dt),
                None => self.initial_substep(&y, &k1, t_cur)?,
            };
        let mut substeps: usize = 0;
        let mut rejected: usize = 0;
        while t_cur < t_end {
            if substeps >= self.config.max_substeps {
                return Err(PropError::OdeStepLimit {
                    t: t_cur,
                    max_substeps: self.config.max_substeps,
                });
            }
            let remaining = t_end - t_cur;
            let last = h >= remaining;
            let h_try = if last { remaining } else { h };
            if h_try <= 10.0 * f64::EPSILON * t_cur.abs().max(self.dt) {
                return Err(PropError::OdeStepUnderflow { t: t_cur, h: h_try });
            }
            substeps += 1;
            let (y_new, k_new, err) = self.try_substep(&y, &k1, t_cur, h_try)?;
            if err <= 1.0 {
                t_cur = if last { t_end } else { t_cur + h_try };
                y = y_new;
                k1 = k_new;
                let factor
                    = if err == 0.0 {
                        MAX_FACTOR
                    } else {
                        (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
                    };
                // do not let the clipped final substep shrink the next step
                h = h.max(h_try) * factor;
            } else {
                rejected += 1;
                trace!(t = t_cur, h = h_try, err, "rejected substep");
                h = h_try * (SAFETY * err.powf(-0.2)).max(MIN_FACTOR);
            }
        }
        trace!(t, substeps, rejected, "completed elementary step");
        Ok(y)
    }
}
