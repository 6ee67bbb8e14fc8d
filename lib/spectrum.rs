//! Estimates of spectral bounds by power iteration.
//!
//! The polynomial solvers need an interval that contains the whole spectrum of
//! the Hamiltonian (or Liouvillian). For Hermitian maps, shifted power
//! iteration gives both ends: with `s` the magnitude of the dominant
//! eigenvalue of `A`,
//! ```text
//! E_max = dom(A + s) - s
//! E_min = dom(A - s) + s
//! ```
//! where `dom` denotes the dominant eigenvalue estimated from the Rayleigh
//! quotient, and `s` is estimated from the growth of the norm. The estimates
//! always lie *inside* the true spectrum and approach it from there, so they
//! should be [widened][widen] by a few percent before use.

use num_complex::Complex64 as C64;
use tracing::{ debug, warn };
use crate::{
    DEF_EPSILON,
    DEF_MAXITERS,
    error::{ PropError, PropResult },
    expression::Generator,
    operator::Operator,
    state::State,
};

/// Iteration parameters for [`power_iteration`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PowerConfig {
    /// Maximum number of applications of the map (default: [`DEF_MAXITERS`]).
    pub maxiters: usize,
    /// Relative change of the eigenvalue estimate below which the iteration
    /// stops (default: [`DEF_EPSILON`]).
    pub epsilon: f64,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self { maxiters: DEF_MAXITERS, epsilon: DEF_EPSILON }
    }
}

impl PowerConfig {
    /// Set the maximum number of iterations.
    pub fn with_maxiters(mut self, maxiters: usize) -> Self {
        self.maxiters = maxiters;
        self
    }

    /// Set the convergence threshold.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }
}

fn unit(state: &State) -> PropResult<State> {
    let norm = state.norm();
    if norm == 0.0 { return Err(PropError::ZeroNorm); }
    Ok(state.scaled(C64::from(norm.recip())))
}

/// Estimate the dominant eigenvalue of a Hermitian map by power iteration,
/// starting from `start`.
///
/// The start vector must overlap with the dominant eigenvector; a
/// [random state][crate::builder::random_wave_function] is the usual choice.
/// If the estimate has not converged after `config.maxiters` iterations, the
/// last estimate is returned and a warning is logged.
pub fn power_iteration<F>(apply: F, start: &State, config: PowerConfig)
    -> PropResult<f64>
where F: Fn(&State) -> PropResult<State>
{
    PropError::check_maxiters(config.maxiters)?;
    let mut v = unit(start)?;
    let mut lambda = f64::NAN;
    for k in 0..config.maxiters {
        let w = apply(&v)?;
        let lambda_new = v.dot(&w)?.re;
        if (lambda_new - lambda).abs() <= config.epsilon * lambda_new.abs() {
            debug!(iters = k + 1, lambda = lambda_new, "power iteration converged");
            return Ok(lambda_new);
        }
        lambda = lambda_new;
        match unit(&w) {
            Ok(w) => { v = w; },
            // start vector lies in the kernel
            Err(PropError::ZeroNorm) => return Ok(0.0),
            Err(err) => return Err(err),
        }
    }
    warn!(
        maxiters = config.maxiters,
        lambda,
        "power iteration did not converge"
    );
    Ok(lambda)
}

// magnitude of the dominant eigenvalue from the growth of the norm; unlike the
// Rayleigh quotient, this converges if +s and -s are both eigenvalues
fn dominant_magnitude<F>(apply: F, start: &State, config: PowerConfig)
    -> PropResult<f64>
where F: Fn(&State) -> PropResult<State>
{
    let mut v = unit(start)?;
    let mut s = 0.0;
    for k in 0..config.maxiters {
        let w = apply(&v)?;
        let s_new = w.norm();
        if s_new == 0.0 { return Ok(0.0); }
        if (s_new - s).abs() <= config.epsilon * s_new {
            debug!(iters = k + 1, shift = s_new, "dominant magnitude converged");
            return Ok(s_new);
        }
        s = s_new;
        v = w.scaled(C64::from(s_new.recip()));
    }
    warn!(
        maxiters = config.maxiters,
        shift = s,
        "dominant magnitude did not converge"
    );
    Ok(s)
}

/// Estimate the lowest and highest eigenvalues of a Hermitian map.
pub fn spectral_bounds<F>(apply: F, start: &State, config: PowerConfig)
    -> PropResult<(f64, f64)>
where F: Fn(&State) -> PropResult<State>
{
    PropError::check_maxiters(config.maxiters)?;
    let shift = dominant_magnitude(&apply, start, config)?;
    let shifted = |sign: f64| {
        let apply = &apply;
        move |v: &State| -> PropResult<State> {
            State::lincomb(C64::from(1.0), &apply(v)?, C64::from(sign * shift), v)
        }
    };
    let upper = power_iteration(shifted(1.0), start, config)? - shift;
    let lower = power_iteration(shifted(-1.0), start, config)? + shift;
    debug!(lower, upper, "estimated spectral bounds");
    Ok((lower, upper))
}

/// Estimate the spectral bounds of a time-independent operator, applied from
/// the left.
pub fn operator_spectrum<O>(op: &O, start: &State, config: PowerConfig)
    -> PropResult<(f64, f64)>
where O: Operator + ?Sized
{
    if op.is_time_dependent() {
        return Err(PropError::time_dependent("spectral estimation"));
    }
    spectral_bounds(|v| op.apply(v, 0.0), start, config)
}

/// Estimate the spectral bounds of a time-independent generator of the form
/// `-i A` with `A` Hermitian, returning the bounds of `A`.
///
/// For a [`CommutatorLiouvillian`][crate::expression::CommutatorLiouvillian],
/// `start` has to be a density operator, and the result approximates
/// `[-dE, dE]`.
pub fn generator_spectrum<G>(generator: &G, start: &State, config: PowerConfig)
    -> PropResult<(f64, f64)>
where G: Generator + ?Sized
{
    if generator.is_time_dependent() {
        return Err(PropError::time_dependent("spectral estimation"));
    }
    spectral_bounds(
        |v| Ok(generator.apply(v, 0.0)?.scaled(C64::i())),
        start,
        config,
    )
}

/// Widen `bounds` by `fraction` of their width on both sides.
pub fn widen(bounds: (f64, f64), fraction: f64) -> (f64, f64) {
    let margin = fraction * (bounds.1 - bounds.0).abs();
    (bounds.0 - margin, bounds.1 + margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use approx::assert_relative_eq;
    use rand::{ rngs::StdRng, SeedableRng };
    use crate::{
        builder::{ pure_density, random_wave_function },
        expression::{ CommutatorLiouvillian, SchroedingerEquation },
        grid::Grid,
        operator::{ Potential, TimeDependentOperator },
    };

    fn grid() -> Arc<Grid> { Arc::new(Grid::new(-4.0, 4.0, 16).unwrap()) }

    #[test]
    fn diagonal_operator_bounds() {
        let grid = grid();
        let pot = Potential::new(&grid, |x| x);
        let mut rng = StdRng::seed_from_u64(10546);
        let start = random_wave_function(&grid, &mut rng, 1.0).unwrap();
        let (lo, hi) = operator_spectrum(&pot, &start, PowerConfig::default()).unwrap();
        let (xmin, xmax) = (grid.points()[0], grid.points()[grid.size() - 1]);
        assert!(lo >= xmin - 1e-9 && hi <= xmax + 1e-9);
        assert_relative_eq!(lo, xmin, epsilon = 1e-2);
        assert_relative_eq!(hi, xmax, epsilon = 1e-2);
    }

    #[test]
    fn generator_bounds_match_operator_bounds() {
        let grid = grid();
        let pot = Potential::new(&grid, |x| x * x);
        let mut rng = StdRng::seed_from_u64(10546);
        let start = random_wave_function(&grid, &mut rng, 1.0).unwrap();
        let config = PowerConfig::default();
        let from_op = operator_spectrum(&pot, &start, config).unwrap();
        let from_gen
            = generator_spectrum(&SchroedingerEquation::new(&pot), &start, config)
            .unwrap();
        assert_relative_eq!(from_op.0, from_gen.0, epsilon = 1e-8);
        assert_relative_eq!(from_op.1, from_gen.1, epsilon = 1e-8);

        let liouvillian = CommutatorLiouvillian::new(&pot);
        let rho = pure_density(&start).unwrap();
        let (lo, hi) = generator_spectrum(&liouvillian, &rho, config).unwrap();
        let width = 16.0;
        assert!(lo >= -width - 1e-9 && hi <= width + 1e-9);
        assert_relative_eq!(hi, -lo, epsilon = 1e-2);
    }

    #[test]
    fn rejects_bad_input() {
        let grid = grid();
        let pot = Potential::new(&grid, |x| x);
        let zero = crate::builder::zero_wave_function(&grid);
        assert!(matches!(
            operator_spectrum(&pot, &zero, PowerConfig::default()),
            Err(PropError::ZeroNorm)
        ));
        let mut rng = StdRng::seed_from_u64(1);
        let start = random_wave_function(&grid, &mut rng, 1.0).unwrap();
        assert!(matches!(
            operator_spectrum(&pot, &start, PowerConfig::default().with_maxiters(0)),
            Err(PropError::BadMaxiters(0))
        ));
        let field = TimeDependentOperator::new(Potential::new(&grid, |x| x), |t| t);
        assert!(matches!(
            operator_spectrum(&field, &start, PowerConfig::default()),
            Err(PropError::UnsupportedGeneratorKind(_))
        ));
    }

    #[test]
    fn exhausted_iterations_still_give_interior_estimates() {
        let grid = grid();
        let pot = Potential::new(&grid, |x| x);
        let mut rng = StdRng::seed_from_u64(10546);
        let start = random_wave_function(&grid, &mut rng, 1.0).unwrap();
        let config = PowerConfig::default().with_maxiters(2);
        let shift = dominant_magnitude(|v| pot.apply(v, 0.0), &start, config).unwrap();
        assert!(shift > 0.0 && shift <= 4.0);
        let (lo, hi) = operator_spectrum(&pot, &start, config).unwrap();
        let (xmin, xmax) = (grid.points()[0], grid.points()[grid.size() - 1]);
        assert!(lo.is_finite() && hi.is_finite());
        assert!(lo >= xmin - 1e-9 && hi <= xmax + 1e-9);
    }

    #[test]
    fn widening() {
        let (lo, hi) = widen((-1.0, 3.0), 0.1);
        assert_relative_eq!(lo, -1.4);
        assert_relative_eq!(hi, 3.4);
    }
}
