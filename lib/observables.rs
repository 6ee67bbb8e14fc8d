//! Expectation values and helpers for monitoring a propagation.

use num_complex::Complex64 as C64;
use tracing::{ debug, info };
use crate::{
    error::{ PropError, PropResult },
    operator::{ Operator, Potential, Projection },
    solver::Solver,
    state::State,
};

/// Expectation value of `op` at time `t`: `<psi|O|psi>` for wave functions
/// and `Tr(O rho)` for density operators.
///
/// The state is not normalized first.
pub fn expectation_value<O>(op: &O, state: &State, t: f64) -> PropResult<C64>
where O: Operator + ?Sized
{
    let o_state = op.apply(state, t)?;
    match o_state.as_density_operator() {
        Some(o_rho) => Ok(o_rho.diag().sum()),
        None => state.dot(&o_state),
    }
}

/// Expectation value and variance of a Hermitian operator, usually the
/// Hamiltonian, for a normalized state.
pub fn energy_and_variance<O>(op: &O, state: &State, t: f64)
    -> PropResult<(f64, f64)>
where O: Operator + ?Sized
{
    let o_state = op.apply(state, t)?;
    let oo_state = op.apply(&o_state, t)?;
    let (mean, square)
        = match (o_state.as_density_operator(), oo_state.as_density_operator()) {
            (Some(o_rho), Some(oo_rho)) => {
                (o_rho.diag().sum().re, oo_rho.diag().sum().re)
            },
            _ => (state.dot(&o_state)?.re, o_state.norm_sqr()),
        };
    Ok((mean, square - mean.powi(2)))
}

/// Population of the wave function `target` in `state`: `|<target|psi>|^2`
/// for wave functions and `<target|rho|target>` for density operators.
///
/// The target is normalized first, the state is not. Fails if the target is
/// not a wave function or lives on a different grid.
pub fn population(state: &State, target: &State) -> PropResult<f64> {
    let projector = Projection::new(target)?;
    Ok(expectation_value(&projector, state, 0.0)?.re)
}

/// Mean position and its standard deviation for a normalized state.
pub fn position_moments(state: &State) -> PropResult<(f64, f64)> {
    let x = Potential::new(state.grid(), |x| x);
    let (mean, var) = energy_and_variance(&x, state, 0.0)?;
    Ok((mean, var.max(0.0).sqrt()))
}

/// Log the time, trace, and position of a state.
///
/// A drifting trace is the only sign that a polynomial solver was set up
/// with spectral bounds that do not contain the spectrum.
pub fn log_state(state: &State, t: f64) {
    let trace = state.trace();
    match state.normalized().and_then(|s| position_moments(&s)) {
        Ok((x, dx)) => info!(t, trace, x, dx, "state"),
        Err(_) => info!(t, trace, "state"),
    }
}

/// Convergence record of a relaxation run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RelaxationStep {
    /// Number of steps taken.
    pub step: usize,
    /// Energy expectation value after the step.
    pub energy: f64,
    /// Energy variance after the step.
    pub variance: f64,
}

/// Drives a relaxation solver: renormalizes the state after every step and
/// tracks the energy and its variance until the variance drops below a
/// threshold.
///
/// Renormalization keeps the imaginary-time decay from underflowing, and the
/// energy variance vanishes exactly for eigenstates.
pub struct RelaxationMonitor<'a, S, O>
where
    S: Solver + ?Sized,
    O: Operator + ?Sized,
{
    solver: &'a S,
    hamiltonian: &'a O,
    threshold: f64,
    max_steps: usize,
}

impl<'a, S, O> RelaxationMonitor<'a, S, O>
where
    S: Solver + ?Sized,
    O: Operator + ?Sized,
{
    /// Create a new monitor.
    ///
    /// `threshold` is the energy variance below which the state is considered
    /// converged; at most `max_steps` steps are taken.
    pub fn new(
        solver: &'a S,
        hamiltonian: &'a O,
        threshold: f64,
        max_steps: usize,
    ) -> PropResult<Self>
    {
        PropError::check_tolerance(threshold, threshold)?;
        PropError::check_maxiters(max_steps)?;
        Ok(Self { solver, hamiltonian, threshold, max_steps })
    }

    /// Relax `state`, returning the final normalized state and the history of
    /// energies and variances, one entry per step.
    ///
    /// If the variance never drops below the threshold, the state after
    /// `max_steps` steps is returned; check the last history entry.
    pub fn relax(&self, state: &State)
        -> PropResult<(State, Vec<RelaxationStep>)>
    {
        let mut current = state.normalized()?;
        let mut history: Vec<RelaxationStep> = Vec::new();
        let dt = self.solver.dt();
        for step in 1..=self.max_steps {
            let t = (step - 1) as f64 * dt;
            current = self.solver.step(&current, t)?.normalized()?;
            let (energy, variance)
                = energy_and_variance(self.hamiltonian, &current, t + dt)?;
            debug!(step, energy, variance, "relaxation");
            history.push(RelaxationStep { step, energy, variance });
            if variance.abs() < self.threshold {
                info!(step, energy, "relaxation converged");
                break;
            }
        }
        Ok((current, history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use approx::assert_abs_diff_eq;
    use crate::{
        builder::{ gaussian, product_wave_function, pure_density },
        grid::Grid,
        operator::{ hamiltonian, KineticEnergy },
    };

    fn grid() -> Arc<Grid> { Arc::new(Grid::new(-10.0, 10.0, 128).unwrap()) }

    #[test]
    fn population_of_eigenstates() {
        let grid = grid();
        let h = hamiltonian(&grid, 1.0, |x| 0.5 * x * x).unwrap();
        // ground and first excited states of the oscillator
        let ground
            = product_wave_function(&grid, gaussian(0.0, 0.0, 1.0).unwrap(), true)
            .unwrap();
        let excited
            = product_wave_function(
                &grid, |x| C64::from(x * (-x * x / 2.0).exp()), true)
            .unwrap();
        let (e0, var0) = energy_and_variance(&h, &ground, 0.0).unwrap();
        assert_abs_diff_eq!(e0, 0.5, epsilon = 1e-10);
        assert_abs_diff_eq!(var0, 0.0, epsilon = 1e-10);

        assert_abs_diff_eq!(population(&ground, &ground).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(population(&excited, &ground).unwrap(), 0.0, epsilon = 1e-12);
        // the target is normalized, the state is not
        let doubled = ground.scaled(C64::from(2.0));
        assert_abs_diff_eq!(population(&ground, &doubled).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(population(&doubled, &ground).unwrap(), 4.0, epsilon = 1e-12);

        let mix
            = State::lincomb(C64::from(0.6), &ground, C64::new(0.0, 0.8), &excited)
            .unwrap();
        assert_abs_diff_eq!(population(&mix, &ground).unwrap(), 0.36, epsilon = 1e-12);
        let rho = pure_density(&mix).unwrap();
        assert_abs_diff_eq!(population(&rho, &excited).unwrap(), 0.64, epsilon = 1e-12);

        assert!(matches!(
            population(&mix, &rho),
            Err(PropError::UnsupportedGeneratorKind(_))
        ));
        let other = Arc::new(Grid::new(-10.0, 10.0, 64).unwrap());
        let elsewhere
            = product_wave_function(&other, gaussian(0.0, 0.0, 1.0).unwrap(), true)
            .unwrap();
        assert!(population(&mix, &elsewhere).is_err());
    }

    #[test]
    fn wave_function_and_density_agree() {
        let grid = grid();
        let h = hamiltonian(&grid, 1.0, |x| 0.5 * x * x).unwrap();
        let psi
            = product_wave_function(&grid, gaussian(1.0, 0.5, 1.2).unwrap(), true)
            .unwrap();
        let rho = pure_density(&psi).unwrap();
        let e_psi = expectation_value(&h, &psi, 0.0).unwrap();
        let e_rho = expectation_value(&h, &rho, 0.0).unwrap();
        assert_abs_diff_eq!(e_psi.re, e_rho.re, epsilon = 1e-12);
        assert_abs_diff_eq!(e_psi.im, 0.0, epsilon = 1e-12);

        let (m_psi, v_psi) = energy_and_variance(&h, &psi, 0.0).unwrap();
        let (m_rho, v_rho) = energy_and_variance(&h, &rho, 0.0).unwrap();
        assert_abs_diff_eq!(m_psi, m_rho, epsilon = 1e-12);
        assert_abs_diff_eq!(v_psi, v_rho, epsilon = 1e-10);
    }

    #[test]
    fn gaussian_moments() {
        // |psi|^2 has rms width rms / sqrt(2); kinetic energy (p0^2 + 1 / 2 rms^2) / 2m
        let grid = grid();
        let (x0, p0, rms) = (0.7, 1.5, 1.1);
        let psi
            = product_wave_function(&grid, gaussian(x0, p0, rms).unwrap(), true)
            .unwrap();
        let (mean, width) = position_moments(&psi).unwrap();
        assert_abs_diff_eq!(mean, x0, epsilon = 1e-10);
        assert_abs_diff_eq!(width, rms / 2.0_f64.sqrt(), epsilon = 1e-10);

        let kin = KineticEnergy::new(&grid, 2.0).unwrap();
        let e_kin = expectation_value(&kin, &psi, 0.0).unwrap().re;
        let expected = (p0.powi(2) + 0.5 / rms.powi(2)) / 4.0;
        assert_abs_diff_eq!(e_kin, expected, epsilon = 1e-8);
    }

    #[test]
    fn monitor_rejects_bad_parameters() {
        let grid = grid();
        let h = hamiltonian(&grid, 1.0, |x| 0.5 * x * x).unwrap();
        let solver
            = crate::chebychev::RelaxationSolver::new(&h, 0.1, (0.0, 200.0)).unwrap();
        assert!(RelaxationMonitor::new(&solver, &h, 0.0, 10).is_err());
        assert!(RelaxationMonitor::new(&solver, &h, 1e-8, 0).is_err());
    }
}
