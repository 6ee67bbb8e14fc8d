//! Direct diagonalization of operators on small grids.
//!
//! An alternative to imaginary-time relaxation when all eigenstates are
//! wanted and the dense matrix of the operator fits in memory.

use ndarray as nd;
use ndarray_linalg::{ self as la, EighInto };
use crate::{
    error::PropResult,
    operator::Operator,
    state::State,
};

/// A single eigenpair.
#[derive(Clone, Debug)]
pub struct Solution {
    /// Eigenvalue.
    pub energy: f64,
    /// Normalized eigenstate, with arbitrary global phase.
    pub state: State,
}

/// Compute all eigenvalues and eigenstates of a Hermitian operator at time
/// `t`, sorted by ascending eigenvalue.
pub fn diagonalize<O>(op: &O, t: f64) -> PropResult<Vec<Solution>>
where O: Operator + ?Sized
{
    let grid = op.grid();
    let (energies, states) = op.to_matrix(t).eigh_into(la::UPLO::Lower)?;
    let solutions: Vec<Solution>
        = energies.iter().zip(states.axis_iter(nd::Axis(1)))
        .map(|(e, v)| Solution {
            energy: *e,
            state: State::from_wave_unchecked(grid.clone(), v.to_owned()),
        })
        .collect();
    Ok(solutions)
}
