//! Generators: the right-hand sides of the equations of motion.
//!
//! Every equation handled by the solvers has the form `dX/dt = L(X, t)`, with
//! the time derivative alone on the left-hand side. For the Schrödinger
//! equation this means the imaginary unit moves to the right, so that
//! [`SchroedingerEquation`] evaluates `-i H psi` rather than `H psi`.

use std::sync::Arc;
use num_complex::Complex64 as C64;
use crate::{
    error::{ MismatchError, PropError, PropResult },
    grid::Grid,
    operator::Operator,
    state::{ Kind, State },
};

/// The right-hand side `L(X, t)` of an equation of motion `dX/dt = L(X, t)`.
pub trait Generator {
    /// Evaluate `L(state, t)`.
    ///
    /// The result lives on the same grid and has the same [`Kind`] as
    /// `state`.
    fn apply(&self, state: &State, t: f64) -> PropResult<State>;

    /// Return `true` if the generator explicitly depends on time.
    fn is_time_dependent(&self) -> bool;
}

impl<G> Generator for &G
where G: Generator + ?Sized
{
    fn apply(&self, state: &State, t: f64) -> PropResult<State> {
        (**self).apply(state, t)
    }

    fn is_time_dependent(&self) -> bool { (**self).is_time_dependent() }
}

impl<G> Generator for Box<G>
where G: Generator + ?Sized
{
    fn apply(&self, state: &State, t: f64) -> PropResult<State> {
        (**self).apply(state, t)
    }

    fn is_time_dependent(&self) -> bool { (**self).is_time_dependent() }
}

fn check_input(grid: &Arc<Grid>, state: &State, what: &str, kind: Kind)
    -> PropResult<()>
{
    MismatchError::check_grids(grid, state.grid())?;
    (state.kind() == kind).then_some(())
        .ok_or_else(|| PropError::wrong_kind(what, state.kind()))
}

const MINUS_I: C64 = C64 { re: 0.0, im: -1.0 };

/// Schrödinger equation `d psi/dt = -i H psi` for wave functions.
#[derive(Clone, Debug)]
pub struct SchroedingerEquation<O>
where O: Operator
{
    hamiltonian: O,
}

impl<O> SchroedingerEquation<O>
where O: Operator
{
    /// Wrap a Hamiltonian.
    pub fn new(hamiltonian: O) -> Self { Self { hamiltonian } }

    /// Get a reference to the wrapped Hamiltonian.
    pub fn hamiltonian(&self) -> &O { &self.hamiltonian }
}

impl<O> Generator for SchroedingerEquation<O>
where O: Operator
{
    fn apply(&self, state: &State, t: f64) -> PropResult<State> {
        check_input(
            self.hamiltonian.grid(), state,
            "the Schroedinger equation", Kind::WaveFunction,
        )?;
        Ok(state.transform(
            |psi| self.hamiltonian.apply_to_wave_function(psi, t) * MINUS_I,
            |rho| rho.to_owned(),
        ))
    }

    fn is_time_dependent(&self) -> bool {
        self.hamiltonian.is_time_dependent()
    }
}

/// Liouville-von Neumann equation `d rho/dt = -i [H, rho]` for density
/// operators.
///
/// Note that the spectrum of the commutator spans `[-dE, dE]` if the spectrum
/// of `H` has width `dE`.
#[derive(Clone, Debug)]
pub struct CommutatorLiouvillian<O>
where O: Operator
{
    op: O,
}

impl<O> CommutatorLiouvillian<O>
where O: Operator
{
    /// Wrap an operator, usually a Hamiltonian.
    pub fn new(op: O) -> Self { Self { op } }
}

impl<O> Generator for CommutatorLiouvillian<O>
where O: Operator
{
    fn apply(&self, state: &State, t: f64) -> PropResult<State> {
        check_input(
            self.op.grid(), state,
            "a commutator Liouvillian", Kind::DensityOperator,
        )?;
        Ok(state.transform(
            |psi| psi.to_owned(),
            |rho| {
                let mut comm = self.op.apply_from_left(rho, t);
                comm -= &self.op.apply_from_right(rho, t);
                comm * MINUS_I
            },
        ))
    }

    fn is_time_dependent(&self) -> bool { self.op.is_time_dependent() }
}

/// Side from which a [`OneSidedLiouvillian`] acts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// `L(rho) = O rho`
    Left,
    /// `L(rho) = rho O`
    Right,
}

/// Plain multiplication of a density operator with an operator from one side,
/// without any factor of `-i`.
///
/// This occurs in open quantum systems and in the imaginary-time relaxation
/// of density operators.
#[derive(Clone, Debug)]
pub struct OneSidedLiouvillian<O>
where O: Operator
{
    op: O,
    side: Side,
}

impl<O> OneSidedLiouvillian<O>
where O: Operator
{
    /// Wrap an operator.
    pub fn new(op: O, side: Side) -> Self { Self { op, side } }
}

impl<O> Generator for OneSidedLiouvillian<O>
where O: Operator
{
    fn apply(&self, state: &State, t: f64) -> PropResult<State> {
        check_input(
            self.op.grid(), state,
            "a one-sided Liouvillian", Kind::DensityOperator,
        )?;
        match self.side {
            Side::Left => self.op.apply(state, t),
            Side::Right => self.op.apply_right(state, t),
        }
    }

    fn is_time_dependent(&self) -> bool { self.op.is_time_dependent() }
}

/// Sum of generators, e.g. a coherent part plus a dissipative one.
pub struct ExpressionSum {
    terms: Vec<Box<dyn Generator>>,
}

impl ExpressionSum {
    /// Create a new sum; fails if `terms` is empty.
    pub fn new(terms: Vec<Box<dyn Generator>>) -> PropResult<Self> {
        if terms.is_empty() { return Err(PropError::EmptySum); }
        Ok(Self { terms })
    }
}

impl Generator for ExpressionSum {
    fn apply(&self, state: &State, t: f64) -> PropResult<State> {
        let mut terms = self.terms.iter();
        // non-empty by construction
        let mut acc
            = match terms.next() {
                Some(first) => first.apply(state, t)?,
                None => return Err(PropError::EmptySum),
            };
        for term in terms {
            acc = acc.checked_add(&term.apply(state, t)?)?;
        }
        Ok(acc)
    }

    fn is_time_dependent(&self) -> bool {
        self.terms.iter().any(|term| term.is_time_dependent())
    }
}
