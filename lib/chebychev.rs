//! Polynomial propagators based on a Chebychev expansion of the time
//! evolution operator.
//!
//! Both solvers map the spectrum `[E_min, E_max]` of the Hamiltonian onto
//! `[-1, 1]` with the affine transformation
//! ```text
//! H_norm = (2 / dE) (H - E_min - dE / 2),    dE = E_max - E_min
//! ```
//! and expand the propagator for a fixed time step `dt` in Chebychev
//! polynomials of `H_norm`, with `alpha = dE dt / 2`:
//! ```text
//! exp(-i H dt) = exp(-i (E_min + dE / 2) dt) sum_n a_n (-i)^n T_n(H_norm),   a_n = (2 - d_n0) J_n(alpha)
//! exp(-H dt)   = exp(-E_min dt)              sum_n a_n (-1)^n T_n(H_norm),   a_n = (2 - d_n0) exp(-alpha) I_n(alpha)
//! ```
//! The phase factors are folded into the recursion for the terms
//! `phi_n = (-i)^n T_n(H_norm) psi` (resp. `(-1)^n T_n(H_norm) psi`), so that
//! every term costs a single application of the generator:
//! ```text
//! phi_0 = psi,    phi_1 = X psi,    phi_n = 2 X phi_{n-1} +/- phi_{n-2}
//! ```
//! with `X = -i H_norm` and a `+` for real time, `X = -H_norm` and a `-` for
//! imaginary time.
//!
//! The real-time coefficients decay super-exponentially once `n > alpha`, and
//! the series is cut after the first order `N > max(2, alpha)` whose
//! coefficient drops below the configured cutoff. The scaled imaginary-time
//! coefficients decrease monotonically, with a Gaussian tail reaching the
//! cutoff around `sqrt(2 alpha ln(1 / cutoff))`; there, the first order
//! `N > 2` below the cutoff is the last one summed. Either way, the error is
//! bounded independently of the input state (see [`truncation_bound`]). For this bound to hold, the supplied
//! spectral range must actually contain the spectrum: if it does not, the
//! polynomials grow instead of oscillate and the propagation diverges
//! silently. Monitor the [trace][State::trace] to catch this.
//!
//! The bound is only approximate at very high orders, where the Bessel
//! function values themselves lose precision. As a rule of thumb, keep
//! `alpha` above ~40 for efficiency and below ~150 to avoid floating-point
//! trouble.

use num_complex::Complex64 as C64;
use tracing::{ debug, warn };
use crate::{
    DEF_CUTOFF,
    DEF_MAX_ORDER,
    error::{ PropError, PropResult },
    expression::Generator,
    operator::Operator,
    solver::Solver,
    special::{ bessel_i_scaled_sequence, bessel_j_sequence, truncation_bound },
    state::State,
};

// above this, high-order terms are prone to floating-point blow-up
const ALPHA_WARN: f64 = 150.0;

// initial number of orders searched past alpha
const SEARCH_MARGIN: usize = 32;

// orders past the truncation summed up for the error estimate
const TAIL_LEN: usize = 40;

/// Truncation parameters of the polynomial solvers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ChebychevConfig {
    /// Smallest coefficient that is still summed; roughly the error per step
    /// (default: [`DEF_CUTOFF`]).
    pub cutoff: f64,
    /// Largest expansion order that is searched for the cutoff (default:
    /// [`DEF_MAX_ORDER`]).
    pub max_order: usize,
}

impl Default for ChebychevConfig {
    fn default() -> Self {
        Self { cutoff: DEF_CUTOFF, max_order: DEF_MAX_ORDER }
    }
}

impl ChebychevConfig {
    /// Set the cutoff.
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Set the maximum expansion order.
    pub fn with_max_order(mut self, max_order: usize) -> Self {
        self.max_order = max_order;
        self
    }

    fn check(&self) -> PropResult<()> {
        PropError::check_cutoff(self.cutoff)?;
        PropError::check_max_order(self.max_order)?;
        Ok(())
    }
}

// coefficients a_0 = s_0, a_n = 2 s_n from a raw Bessel sequence
fn expansion_coefficients(seq: &[f64]) -> Vec<f64> {
    seq.iter().enumerate()
        .map(|(n, s)| if n == 0 { *s } else { 2.0 * s })
        .collect()
}

// sign of phi_{n-2} in the recursion
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Recursion {
    RealTime,
    ImaginaryTime,
}

impl Recursion {
    fn sequence(self, alpha: f64, nmax: usize) -> Vec<f64> {
        match self {
            Self::RealTime => bessel_j_sequence(alpha, nmax),
            Self::ImaginaryTime => bessel_i_scaled_sequence(alpha, nmax),
        }
    }

    // lowest order at which the series may be cut
    //
    // J_n(alpha) oscillates for n < alpha, so an accidental near-zero there
    // must not end the series; the scaled I_n decrease monotonically
    fn min_order(self, alpha: f64) -> usize {
        match self {
            Self::RealTime => alpha.max(2.0).floor() as usize + 1,
            Self::ImaginaryTime => 3,
        }
    }

    // order around which the coefficients reach `cutoff`, to start the search
    fn estimated_order(self, alpha: f64, cutoff: f64) -> usize {
        match self {
            Self::RealTime => alpha.ceil() as usize,
            Self::ImaginaryTime
                => (2.0 * alpha * cutoff.recip().ln().max(0.0)).sqrt().ceil() as usize,
        }
    }

    // largest alpha for which the cutoff can be reached within `max_order`
    fn max_alpha(self, max_order: usize) -> f64 {
        match self {
            Self::RealTime => max_order as f64,
            Self::ImaginaryTime => (max_order as f64).powi(2),
        }
    }

    fn sign(self) -> f64 {
        match self {
            Self::RealTime => 1.0,
            Self::ImaginaryTime => -1.0,
        }
    }
}

// everything derived once from the spectrum, time step, and cutoff
#[derive(Clone, Debug)]
struct Expansion {
    spec_min: f64,
    spec_range: f64,
    alpha: f64,
    cutoff: f64,
    coeffs: Vec<f64>,
    tail: f64,
    recursion: Recursion,
}

impl Expansion {
    fn new(
        spectrum: (f64, f64),
        dt: f64,
        config: ChebychevConfig,
        recursion: Recursion,
    ) -> PropResult<Self>
    {
        PropError::check_timestep(dt)?;
        PropError::check_spectrum(spectrum)?;
        config.check()?;
        let spec_range = spectrum.1 - spectrum.0;
        let alpha = spec_range * dt / 2.0;
        if alpha > ALPHA_WARN {
            warn!(
                alpha,
                "large expansion parameter; high-order terms may lose precision"
            );
        }
        let (coeffs, tail) = Self::truncate(alpha, config, recursion)?;
        Ok(Self {
            spec_min: spectrum.0,
            spec_range,
            alpha,
            cutoff: config.cutoff,
            coeffs,
            tail,
            recursion,
        })
    }

    // find the last order N to sum and the sum of |a_n| for n > N
    fn truncate(alpha: f64, config: ChebychevConfig, recursion: Recursion)
        -> PropResult<(Vec<f64>, f64)>
    {
        let ChebychevConfig { cutoff, max_order } = config;
        let limit_exceeded = PropError::ComputationLimitExceeded { max_order, cutoff };
        if !alpha.is_finite() || alpha >= recursion.max_alpha(max_order) {
            return Err(limit_exceeded);
        }
        let min_order = recursion.min_order(alpha);
        if min_order > max_order { return Err(limit_exceeded); }
        let start = recursion.estimated_order(alpha, cutoff);
        let mut margin = SEARCH_MARGIN;
        loop {
            let nmax = start.saturating_add(margin).max(min_order).min(max_order);
            let coeffs = expansion_coefficients(&recursion.sequence(alpha, nmax));
            let found
                = (min_order..=nmax).find(|n| coeffs[*n].abs() < cutoff);
            if let Some(order) = found {
                let tail_coeffs
                    = expansion_coefficients(
                        &recursion.sequence(alpha, order + TAIL_LEN));
                let tail: f64
                    = tail_coeffs.iter().skip(order + 1).map(|a| a.abs()).sum();
                let mut coeffs = coeffs;
                coeffs.truncate(order + 1);
                return Ok((coeffs, tail));
            }
            if nmax == max_order { return Err(limit_exceeded); }
            margin *= 2;
        }
    }

    fn order(&self) -> usize { self.coeffs.len() - 1 }

    // sum_n a_n phi_n with phi_n = 2 X phi_{n-1} + sign phi_{n-2}
    fn sum<F>(&self, state: &State, apply_x: F) -> PropResult<State>
    where F: Fn(&State) -> PropResult<State>
    {
        let one = C64::from(1.0);
        let two = C64::from(2.0);
        let sign = C64::from(self.recursion.sign());
        let mut phi_prev = state.clone();
        let mut phi = apply_x(state)?;
        let mut acc
            = State::lincomb(
                self.coeffs[0].into(), &phi_prev, self.coeffs[1].into(), &phi)?;
        for a in self.coeffs.iter().skip(2) {
            let phi_next
                = State::lincomb(two, &apply_x(&phi)?, sign, &phi_prev)?;
            acc = State::lincomb(one, &acc, C64::from(*a), &phi_next)?;
            phi_prev = phi;
            phi = phi_next;
        }
        Ok(acc)
    }
}

/// Real-time propagator for time-independent generators with a real
/// spectrum.
///
/// The generator is expected in the form `L = -i A` with `A` Hermitian, e.g. a
/// [`SchroedingerEquation`][crate::expression::SchroedingerEquation] or a
/// [`CommutatorLiouvillian`][crate::expression::CommutatorLiouvillian]; the
/// spectral bounds refer to `A`. For a commutator Liouvillian, these are
/// `[-dE, dE]` if `dE` is the spectral range of the Hamiltonian.
pub struct ChebychevSolver<G>
where G: Generator
{
    generator: G,
    dt: f64,
    expansion: Expansion,
    prefactor: C64,
}

impl<G> ChebychevSolver<G>
where G: Generator
{
    /// Create a new solver with the default cutoff.
    pub fn new(generator: G, dt: f64, spectrum: (f64, f64))
        -> PropResult<Self>
    {
        Self::with_config(generator, dt, spectrum, ChebychevConfig::default())
    }

    /// Create a new solver.
    ///
    /// Fails if the generator is time-dependent, if `dt` or the cutoff are
    /// not positive, if the spectral bounds are not increasing, or if the
    /// series does not reach the cutoff within the maximum order.
    pub fn with_config(
        generator: G,
        dt: f64,
        spectrum: (f64, f64),
        config: ChebychevConfig,
    ) -> PropResult<Self>
    {
        if generator.is_time_dependent() {
            return Err(PropError::time_dependent("Chebychev propagation"));
        }
        let expansion
            = Expansion::new(spectrum, dt, config, Recursion::RealTime)?;
        let prefactor
            = C64::cis(-(expansion.spec_min + expansion.spec_range / 2.0) * dt);
        debug!(
            dt,
            alpha = expansion.alpha,
            order = expansion.order(),
            error_bound = expansion.tail,
            "set up Chebychev solver"
        );
        Ok(Self { generator, dt, expansion, prefactor })
    }

    /// Last order included in the expansion.
    pub fn order(&self) -> usize { self.expansion.order() }

    /// Dimensionless expansion parameter `dE dt / 2`.
    pub fn alpha(&self) -> f64 { self.expansion.alpha }

    /// Truncation cutoff.
    pub fn cutoff(&self) -> f64 { self.expansion.cutoff }

    /// Expansion coefficients `a_0, ..., a_N`.
    pub fn coefficients(&self) -> &[f64] { &self.expansion.coeffs }

    /// Estimated error of a single step on a normalized state: the sum of the
    /// magnitudes of all omitted coefficients.
    pub fn error_bound(&self) -> f64 { self.expansion.tail }

    /// Analytic upper bound on [`Self::error_bound`].
    pub fn truncation_bound(&self) -> f64 {
        truncation_bound(self.expansion.alpha, self.order())
    }

    // X = -i H_norm, given L = -i H
    fn apply_normalized(&self, state: &State, t: f64) -> PropResult<State> {
        let Expansion { spec_min, spec_range, .. } = self.expansion;
        let l_state = self.generator.apply(state, t)?;
        State::lincomb(
            C64::from(2.0 / spec_range), &l_state,
            C64::new(0.0, 2.0 * spec_min / spec_range + 1.0), state,
        )
    }
}

impl<G> Solver for ChebychevSolver<G>
where G: Generator
{
    fn dt(&self) -> f64 { self.dt }

    fn step(&self, state: &State, t: f64) -> PropResult<State> {
        let sum = self.expansion.sum(state, |s| self.apply_normalized(s, t))?;
        Ok(sum.scaled(self.prefactor))
    }
}

/// Imaginary-time propagator `exp(-H dt)` for relaxation to ground and
/// thermal states.
///
/// The operator is applied from the left only, which is the meaningful
/// action in imaginary time for wave functions and density operators alike,
/// so a single solver serves both kinds with the same spectral bounds (those
/// of `H`).
///
/// The output is not renormalized; all components decay with their energies.
/// Normalize between steps, e.g. with the help of a
/// [`RelaxationMonitor`][crate::observables::RelaxationMonitor], to avoid
/// underflow.
pub struct RelaxationSolver<O>
where O: Operator
{
    op: O,
    dt: f64,
    expansion: Expansion,
    prefactor: f64,
}

impl<O> RelaxationSolver<O>
where O: Operator
{
    /// Create a new solver with the default cutoff.
    pub fn new(op: O, dt: f64, spectrum: (f64, f64)) -> PropResult<Self> {
        Self::with_config(op, dt, spectrum, ChebychevConfig::default())
    }

    /// Create a new solver.
    ///
    /// The cutoff applies to the exponentially scaled coefficients, i.e.
    /// relative to the weight of the lowest energy in the spectrum.
    pub fn with_config(
        op: O,
        dt: f64,
        spectrum: (f64, f64),
        config: ChebychevConfig,
    ) -> PropResult<Self>
    {
        if op.is_time_dependent() {
            return Err(PropError::time_dependent("relaxation"));
        }
        let expansion
            = Expansion::new(spectrum, dt, config, Recursion::ImaginaryTime)?;
        let prefactor = (-expansion.spec_min * dt).exp();
        debug!(
            dt,
            alpha = expansion.alpha,
            order = expansion.order(),
            error_bound = expansion.tail,
            "set up relaxation solver"
        );
        Ok(Self { op, dt, expansion, prefactor })
    }

    /// Last order included in the expansion.
    pub fn order(&self) -> usize { self.expansion.order() }

    /// Dimensionless expansion parameter `dE dt / 2`.
    pub fn alpha(&self) -> f64 { self.expansion.alpha }

    /// Truncation cutoff.
    pub fn cutoff(&self) -> f64 { self.expansion.cutoff }

    /// Exponentially scaled expansion coefficients `a_0, ..., a_N`.
    pub fn coefficients(&self) -> &[f64] { &self.expansion.coeffs }

    /// Estimated error of a single step relative to the slowest-decaying
    /// component: the sum of all omitted scaled coefficients.
    pub fn error_bound(&self) -> f64 { self.expansion.tail }

    /// Get a reference to the operator.
    pub fn operator(&self) -> &O { &self.op }

    // X = -H_norm
    fn apply_normalized(&self, state: &State, t: f64) -> PropResult<State> {
        let Expansion { spec_min, spec_range, .. } = self.expansion;
        let h_state = self.op.apply(state, t)?;
        State::lincomb(
            C64::from(-2.0 / spec_range), &h_state,
            C64::from(2.0 * spec_min / spec_range + 1.0), state,
        )
    }
}

impl<O> Solver for RelaxationSolver<O>
where O: Operator
{
    fn dt(&self) -> f64 { self.dt }

    fn step(&self, state: &State, t: f64) -> PropResult<State> {
        let sum = self.expansion.sum(state, |s| self.apply_normalized(s, t))?;
        Ok(sum.scaled(self.prefactor.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use ndarray as nd;
    use approx::{ assert_abs_diff_eq, assert_relative_eq };
    use crate::{
        builder::{ gaussian, product_wave_function, pure_density },
        expression::{ CommutatorLiouvillian, SchroedingerEquation },
        grid::Grid,
        operator::{ Constant, Potential, TimeDependentOperator },
    };

    fn grid() -> Arc<Grid> { Arc::new(Grid::new(1.0, 10.0, 6).unwrap()) }

    fn psi0(grid: &Arc<Grid>) -> State {
        product_wave_function(grid, gaussian(5.0, 1.0, 2.0).unwrap(), true)
            .unwrap()
    }

    #[test]
    fn rejects_bad_parameters() {
        let grid = grid();
        let eq = SchroedingerEquation::new(Potential::new(&grid, |x| x));
        assert!(matches!(
            ChebychevSolver::new(&eq, 0.0, (0.0, 1.0)),
            Err(PropError::BadTimestep(_))
        ));
        assert!(matches!(
            ChebychevSolver::new(&eq, 1.0, (1.0, 1.0)),
            Err(PropError::BadSpectrum(..))
        ));
        let config = ChebychevConfig::default().with_cutoff(0.0);
        assert!(matches!(
            ChebychevSolver::with_config(&eq, 1.0, (0.0, 1.0), config),
            Err(PropError::BadCutoff(_))
        ));

        let field = TimeDependentOperator::new(Potential::new(&grid, |x| x), |t| t);
        assert!(matches!(
            ChebychevSolver::new(SchroedingerEquation::new(&field), 1.0, (0.0, 1.0)),
            Err(PropError::UnsupportedGeneratorKind(_))
        ));
        assert!(matches!(
            RelaxationSolver::new(&field, 1.0, (0.0, 1.0)),
            Err(PropError::UnsupportedGeneratorKind(_))
        ));
    }

    #[test]
    fn order_of_expansion() {
        let grid = grid();
        let eq = SchroedingerEquation::new(Potential::new(&grid, |x| x));
        let solver = ChebychevSolver::new(&eq, 10.0, (1.0, 10.0)).unwrap();
        assert_relative_eq!(solver.alpha(), 45.0);
        let order = solver.order();
        assert!(order > 45);
        let a = solver.coefficients();
        assert_eq!(a.len(), order + 1);
        assert!(a[order].abs() < 1e-12);
        // the term before the cutoff is past the oscillatory region and above it
        assert!(a[order - 1].abs() >= 1e-12);
        assert!(solver.error_bound() < 1e-12);
        assert!(solver.error_bound() <= solver.truncation_bound());
    }

    #[test]
    fn small_alpha_still_uses_three_terms() {
        let grid = grid();
        let eq = SchroedingerEquation::new(Potential::new(&grid, |x| x));
        let config = ChebychevConfig::default().with_cutoff(1.0);
        let solver
            = ChebychevSolver::with_config(&eq, 1e-3, (1.0, 10.0), config).unwrap();
        assert_eq!(solver.order(), 3);
    }

    #[test]
    fn computation_limit() {
        let grid = grid();
        let eq = SchroedingerEquation::new(Potential::new(&grid, |x| x));
        let config = ChebychevConfig::default().with_max_order(20);
        assert!(matches!(
            ChebychevSolver::with_config(&eq, 10.0, (1.0, 10.0), config),
            Err(PropError::ComputationLimitExceeded { max_order: 20, .. })
        ));
    }

    #[test]
    fn huge_or_non_finite_parameters_fail_loudly() {
        let grid = grid();
        let pot = Potential::new(&grid, |x| x);
        let eq = SchroedingerEquation::new(&pot);
        assert!(matches!(
            ChebychevSolver::new(&eq, 1.0, (0.0, 1e20)),
            Err(PropError::ComputationLimitExceeded { .. })
        ));
        assert!(matches!(
            RelaxationSolver::new(&pot, 1.0, (0.0, 1e20)),
            Err(PropError::ComputationLimitExceeded { .. })
        ));
        assert!(matches!(
            ChebychevSolver::new(&eq, 1.0, (0.0, f64::INFINITY)),
            Err(PropError::BadSpectrum(..))
        ));
        assert!(matches!(
            RelaxationSolver::new(&pot, 1.0, (f64::NEG_INFINITY, 0.0)),
            Err(PropError::BadSpectrum(..))
        ));
        assert!(matches!(
            ChebychevSolver::new(&eq, f64::INFINITY, (0.0, 1.0)),
            Err(PropError::BadTimestep(_))
        ));
        assert!(matches!(
            RelaxationSolver::new(&pot, f64::NAN, (0.0, 1.0)),
            Err(PropError::BadTimestep(_))
        ));
        // the spectral range overflows
        assert!(matches!(
            ChebychevSolver::new(&eq, 1.0, (-f64::MAX, f64::MAX)),
            Err(PropError::ComputationLimitExceeded { .. })
        ));
        // past the precision threshold and beyond the order limit
        let config = ChebychevConfig::default().with_max_order(150);
        assert!(matches!(
            ChebychevSolver::with_config(&eq, 100.0, (0.0, 4.0), config),
            Err(PropError::ComputationLimitExceeded { max_order: 150, .. })
        ));
    }

    #[test]
    fn relaxation_stops_at_first_coefficient_below_cutoff() {
        let grid = grid();
        let pot = Potential::new(&grid, |x| x);
        let solver = RelaxationSolver::new(&pot, 2.0, (0.0, 200.0)).unwrap();
        assert_relative_eq!(solver.alpha(), 200.0);
        let first_below
            = bessel_i_scaled_sequence(200.0, 400).iter().enumerate()
            .skip(3)
            .find(|(_, i)| 2.0 * *i < solver.cutoff())
            .map(|(n, _)| n)
            .unwrap();
        assert_eq!(solver.order(), first_below);
        assert!(solver.order() < 200);
        let a = solver.coefficients();
        assert!(a[solver.order()] < 1e-12);
        assert!(a[solver.order() - 1] >= 1e-12);

        // converges well within the order limit although alpha exceeds it
        let solver = RelaxationSolver::new(&pot, 120.0, (0.0, 200.0)).unwrap();
        assert_relative_eq!(solver.alpha(), 12000.0);
        assert!(solver.order() < 1000);
        assert!(solver.error_bound() < 1e-10);
    }

    #[test]
    fn potential_propagation_is_exact_phase() {
        let grid = grid();
        let pot = Potential::new(&grid, |x| x);
        let eq = SchroedingerEquation::new(&pot);
        let solver = ChebychevSolver::new(&eq, 10.0, (1.0, 10.0)).unwrap();
        let psi = psi0(&grid);
        let result = solver.step(&psi, 0.0).unwrap();
        let expected = psi.transform(
            |c| nd::Zip::from(c).and(grid.points())
                .map_collect(|ck, x| *ck * C64::cis(-x * 10.0)),
            |r| r.to_owned(),
        );
        assert_abs_diff_eq!(result.distance(&expected).unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn density_matches_pure_state() {
        let grid = grid();
        let pot = Potential::new(&grid, |x| x);
        let wf_solver
            = ChebychevSolver::new(SchroedingerEquation::new(&pot), 5.0, (1.0, 10.0))
            .unwrap();
        let rho_solver
            = ChebychevSolver::new(CommutatorLiouvillian::new(&pot), 5.0, (-9.0, 9.0))
            .unwrap();
        let psi = psi0(&grid);
        let rho = pure_density(&psi).unwrap();
        let psi_t = wf_solver.step(&psi, 0.0).unwrap();
        let rho_t = rho_solver.step(&rho, 0.0).unwrap();
        let expected = pure_density(&psi_t).unwrap();
        assert_abs_diff_eq!(rho_t.distance(&expected).unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn relaxation_is_exact_decay() {
        let grid = grid();
        let pot = Potential::new(&grid, |x| x);
        let solver = RelaxationSolver::new(&pot, 0.5, (1.0, 10.0)).unwrap();
        let psi = psi0(&grid);
        let result = solver.step(&psi, 0.0).unwrap();
        let expected = psi.transform(
            |c| nd::Zip::from(c).and(grid.points())
                .map_collect(|ck, x| *ck * (-x * 0.5).exp()),
            |r| r.to_owned(),
        );
        assert_abs_diff_eq!(result.distance(&expected).unwrap(), 0.0, epsilon = 1e-10);

        let rho = pure_density(&psi).unwrap();
        let rho_t = solver.step(&rho, 0.0).unwrap();
        // exp(-V dt) rho, applied from the left only
        let expected
            = crate::builder::direct_product(&expected, &psi).unwrap();
        assert_abs_diff_eq!(rho_t.distance(&expected).unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn relaxation_of_unit_density_over_several_steps() {
        let grid = grid();
        let pot = Potential::new(&grid, |x| x);
        let solver = RelaxationSolver::new(&pot, 0.5, (0.9, 11.0)).unwrap();
        let (t, rho)
            = solver.propagate(crate::builder::unit_density(&grid), 0.0, 3)
            .last_state()
            .unwrap();
        assert_relative_eq!(t, 1.5);
        let expected = State::density_operator(
            grid.clone(),
            nd::Array2::from_diag(&grid.points().mapv(|x| C64::from((-x * t).exp()))),
        ).unwrap();
        assert_abs_diff_eq!(rho.distance(&expected).unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn constant_generator_with_tight_bounds() {
        let grid = grid();
        let eq = SchroedingerEquation::new(Constant::new(&grid, 2.0));
        let solver = ChebychevSolver::new(&eq, 3.0, (1.5, 2.5)).unwrap();
        let psi = psi0(&grid);
        let result = solver.step(&psi, 0.0).unwrap();
        let expected = psi.scaled(C64::cis(-6.0));
        assert_abs_diff_eq!(result.distance(&expected).unwrap(), 0.0, epsilon = 1e-11);
    }
}
