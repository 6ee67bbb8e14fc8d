//! Linear operators acting on wave functions and density operators.
//!
//! Operators are the building blocks of Hamiltonians. On their own they do not
//! describe an equation of motion; see [`expression`][crate::expression] for
//! the generators that wrap them.
//!
//! Density operators are stored with the ket index along the first axis and
//! the bra index along the second, so that applying an operator from the
//! left acts on axis 0 and applying it from the right acts on axis 1.

use std::sync::Arc;
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::{ MismatchError, PropError, PropResult },
    grid::Grid,
    state::State,
    utils::{ fft_axis_inplace, ifft_axis_inplace },
};

// multiply the i-th lane of `a` along `axis` by `values[i]`
fn scale_lanes(a: &mut nd::Array2<C64>, axis: usize, values: &nd::Array1<f64>) {
    a.axis_iter_mut(nd::Axis(axis)).zip(values)
        .for_each(|(mut lane, v)| { lane.mapv_inplace(|z| z * *v); });
}

/// A linear operator on the Hilbert space spanned by a [`Grid`].
///
/// Implementors supply the raw actions on coefficient arrays; shapes are
/// guaranteed to match the grid by the provided [`apply`][Self::apply]
/// methods.
pub trait Operator {
    /// The grid on which the operator is defined.
    fn grid(&self) -> &Arc<Grid>;

    /// Return `true` if the operator explicitly depends on time.
    fn is_time_dependent(&self) -> bool { false }

    /// Compute `O psi`.
    fn apply_to_wave_function(&self, psi: &nd::Array1<C64>, t: f64)
        -> nd::Array1<C64>;

    /// Compute `O rho`.
    fn apply_from_left(&self, rho: &nd::Array2<C64>, t: f64)
        -> nd::Array2<C64>;

    /// Compute `rho O`.
    fn apply_from_right(&self, rho: &nd::Array2<C64>, t: f64)
        -> nd::Array2<C64>;

    /// Apply the operator to a state from the left.
    fn apply(&self, state: &State, t: f64) -> PropResult<State> {
        MismatchError::check_grids(self.grid(), state.grid())?;
        Ok(state.transform(
            |psi| self.apply_to_wave_function(psi, t),
            |rho| self.apply_from_left(rho, t),
        ))
    }

    /// Apply the operator to a density operator from the right.
    fn apply_right(&self, state: &State, t: f64) -> PropResult<State> {
        MismatchError::check_grids(self.grid(), state.grid())?;
        let rho
            = state.as_density_operator()
            .ok_or_else(|| PropError::wrong_kind("right-multiplication", state.kind()))?;
        Ok(State::from_density_unchecked(
            state.grid().clone(), self.apply_from_right(rho, t)))
    }

    /// Dense matrix of the operator in the weighted DVR at time `t`.
    fn to_matrix(&self, t: f64) -> nd::Array2<C64> {
        let n = self.grid().size();
        self.apply_from_left(&nd::Array2::eye(n), t)
    }
}

impl<O> Operator for &O
where O: Operator + ?Sized
{
    fn grid(&self) -> &Arc<Grid> { (**self).grid() }

    fn is_time_dependent(&self) -> bool { (**self).is_time_dependent() }

    fn apply_to_wave_function(&self, psi: &nd::Array1<C64>, t: f64)
        -> nd::Array1<C64>
    {
        (**self).apply_to_wave_function(psi, t)
    }

    fn apply_from_left(&self, rho: &nd::Array2<C64>, t: f64)
        -> nd::Array2<C64>
    {
        (**self).apply_from_left(rho, t)
    }

    fn apply_from_right(&self, rho: &nd::Array2<C64>, t: f64)
        -> nd::Array2<C64>
    {
        (**self).apply_from_right(rho, t)
    }
}

impl<O> Operator for Box<O>
where O: Operator + ?Sized
{
    fn grid(&self) -> &Arc<Grid> { (**self).grid() }

    fn is_time_dependent(&self) -> bool { (**self).is_time_dependent() }

    fn apply_to_wave_function(&self, psi: &nd::Array1<C64>, t: f64)
        -> nd::Array1<C64>
    {
        (**self).apply_to_wave_function(psi, t)
    }

    fn apply_from_left(&self, rho: &nd::Array2<C64>, t: f64)
        -> nd::Array2<C64>
    {
        (**self).apply_from_left(rho, t)
    }

    fn apply_from_right(&self, rho: &nd::Array2<C64>, t: f64)
        -> nd::Array2<C64>
    {
        (**self).apply_from_right(rho, t)
    }
}

/// Real potential, diagonal in the DVR.
#[derive(Clone, Debug)]
pub struct Potential {
    grid: Arc<Grid>,
    values: nd::Array1<f64>,
}

impl Potential {
    /// Sample `f` at the grid points.
    pub fn new<F>(grid: &Arc<Grid>, f: F) -> Self
    where F: Fn(f64) -> f64
    {
        Self { grid: grid.clone(), values: grid.points().mapv(f) }
    }

    /// Like [`Self::new`], but with every value above `cutoff` set to
    /// `cutoff`.
    ///
    /// Clipping very large potential values shrinks the spectral range of the
    /// Hamiltonian, and thereby the cost of polynomial propagation.
    pub fn with_cutoff<F>(grid: &Arc<Grid>, f: F, cutoff: f64) -> Self
    where F: Fn(f64) -> f64
    {
        let mut pot = Self::new(grid, f);
        pot.values.mapv_inplace(|v| v.min(cutoff));
        pot
    }

    /// Get a reference to the potential values at the grid points.
    pub fn values(&self) -> &nd::Array1<f64> { &self.values }
}

impl Operator for Potential {
    fn grid(&self) -> &Arc<Grid> { &self.grid }

    fn apply_to_wave_function(&self, psi: &nd::Array1<C64>, _t: f64)
        -> nd::Array1<C64>
    {
        nd::Zip::from(psi).and(&self.values).map_collect(|c, v| *c * *v)
    }

    fn apply_from_left(&self, rho: &nd::Array2<C64>, _t: f64)
        -> nd::Array2<C64>
    {
        let mut res = rho.to_owned();
        scale_lanes(&mut res, 0, &self.values);
        res
    }

    fn apply_from_right(&self, rho: &nd::Array2<C64>, _t: f64)
        -> nd::Array2<C64>
    {
        let mut res = rho.to_owned();
        scale_lanes(&mut res, 1, &self.values);
        res
    }
}

/// Cartesian kinetic energy `-1/2m d^2/dx^2`, evaluated in the plane-wave
/// basis through FFTs.
#[derive(Clone, Debug)]
pub struct KineticEnergy {
    grid: Arc<Grid>,
    mass: f64,
    // k^2 / 2m in FFT order
    values: nd::Array1<f64>,
}

impl KineticEnergy {
    /// Create a new kinetic energy operator for a particle of mass `mass`.
    pub fn new(grid: &Arc<Grid>, mass: f64) -> PropResult<Self> {
        Self::with_cutoff(grid, mass, None)
    }

    /// Like [`Self::new`], but truncate all kinetic energies above `cutoff`
    /// to `cutoff`.
    pub fn with_cutoff(grid: &Arc<Grid>, mass: f64, cutoff: Option<f64>)
        -> PropResult<Self>
    {
        PropError::check_mass(mass)?;
        let values: nd::Array1<f64>
            = grid.wave_vectors()
            .mapv(|k| {
                let e = k.powi(2) / (2.0 * mass);
                cutoff.map(|ec| e.min(ec)).unwrap_or(e)
            });
        Ok(Self { grid: grid.clone(), mass, values })
    }

    /// Particle mass.
    pub fn mass(&self) -> f64 { self.mass }

    /// Largest kinetic energy representable on the grid.
    pub fn max_energy(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

impl Operator for KineticEnergy {
    fn grid(&self) -> &Arc<Grid> { &self.grid }

    fn apply_to_wave_function(&self, psi: &nd::Array1<C64>, _t: f64)
        -> nd::Array1<C64>
    {
        let mut f = psi.to_owned();
        fft_axis_inplace(&mut f, 0);
        f.iter_mut().zip(&self.values).for_each(|(fk, vk)| { *fk *= *vk; });
        ifft_axis_inplace(&mut f, 0);
        f
    }

    fn apply_from_left(&self, rho: &nd::Array2<C64>, _t: f64)
        -> nd::Array2<C64>
    {
        let mut f = rho.to_owned();
        fft_axis_inplace(&mut f, 0);
        scale_lanes(&mut f, 0, &self.values);
        ifft_axis_inplace(&mut f, 0);
        f
    }

    // row vectors transform with the inverse FFT first
    fn apply_from_right(&self, rho: &nd::Array2<C64>, _t: f64)
        -> nd::Array2<C64>
    {
        let mut f = rho.to_owned();
        ifft_axis_inplace(&mut f, 1);
        scale_lanes(&mut f, 1, &self.values);
        fft_axis_inplace(&mut f, 1);
        f
    }
}

/// Constant energy shift, i.e. a multiple of the identity.
#[derive(Clone, Debug)]
pub struct Constant {
    grid: Arc<Grid>,
    value: f64,
}

impl Constant {
    /// Create a new constant operator.
    pub fn new(grid: &Arc<Grid>, value: f64) -> Self {
        Self { grid: grid.clone(), value }
    }
}

impl Operator for Constant {
    fn grid(&self) -> &Arc<Grid> { &self.grid }

    fn apply_to_wave_function(&self, psi: &nd::Array1<C64>, _t: f64)
        -> nd::Array1<C64>
    {
        psi * self.value
    }

    fn apply_from_left(&self, rho: &nd::Array2<C64>, _t: f64)
        -> nd::Array2<C64>
    {
        rho * self.value
    }

    fn apply_from_right(&self, rho: &nd::Array2<C64>, _t: f64)
        -> nd::Array2<C64>
    {
        rho * self.value
    }
}

/// Projector `|psi><psi|` onto a normalized wave function.
#[derive(Clone, Debug)]
pub struct Projection {
    grid: Arc<Grid>,
    ket: nd::Array1<C64>,
}

impl Projection {
    /// Create a projector onto `state`, which need not be normalized.
    pub fn new(state: &State) -> PropResult<Self> {
        let psi = state.normalized()?;
        let ket
            = psi.as_wave_function()
            .ok_or_else(|| PropError::wrong_kind("projection", state.kind()))?
            .to_owned();
        Ok(Self { grid: state.grid().clone(), ket })
    }
}

impl Operator for Projection {
    fn grid(&self) -> &Arc<Grid> { &self.grid }

    fn apply_to_wave_function(&self, psi: &nd::Array1<C64>, _t: f64)
        -> nd::Array1<C64>
    {
        let overlap: C64
            = self.ket.iter().zip(psi).map(|(k, p)| k.conj() * p).sum();
        self.ket.mapv(|k| k * overlap)
    }

    fn apply_from_left(&self, rho: &nd::Array2<C64>, _t: f64)
        -> nd::Array2<C64>
    {
        // <psi| rho as a row vector
        let bra_rho: nd::Array1<C64> = self.ket.mapv(|k| k.conj()).dot(rho);
        nd::Array2::from_shape_fn(
            rho.raw_dim(), |(i, j)| self.ket[i] * bra_rho[j])
    }

    fn apply_from_right(&self, rho: &nd::Array2<C64>, _t: f64)
        -> nd::Array2<C64>
    {
        // rho |psi> as a column vector
        let rho_ket: nd::Array1<C64> = rho.dot(&self.ket);
        nd::Array2::from_shape_fn(
            rho.raw_dim(), |(i, j)| rho_ket[i] * self.ket[j].conj())
    }
}

/// An operator multiplied by a real function of time, e.g. a dipole coupling
/// to a laser field.
pub struct TimeDependentOperator<O, F>
where
    O: Operator,
    F: Fn(f64) -> f64,
{
    op: O,
    f: F,
}

impl<O, F> TimeDependentOperator<O, F>
where
    O: Operator,
    F: Fn(f64) -> f64,
{
    /// Create a new time-dependent operator `f(t) op`.
    pub fn new(op: O, f: F) -> Self { Self { op, f } }
}

impl<O, F> Operator for TimeDependentOperator<O, F>
where
    O: Operator,
    F: Fn(f64) -> f64,
{
    fn grid(&self) -> &Arc<Grid> { self.op.grid() }

    fn is_time_dependent(&self) -> bool { true }

    fn apply_to_wave_function(&self, psi: &nd::Array1<C64>, t: f64)
        -> nd::Array1<C64>
    {
        self.op.apply_to_wave_function(psi, t) * (self.f)(t)
    }

    fn apply_from_left(&self, rho: &nd::Array2<C64>, t: f64)
        -> nd::Array2<C64>
    {
        self.op.apply_from_left(rho, t) * (self.f)(t)
    }

    fn apply_from_right(&self, rho: &nd::Array2<C64>, t: f64)
        -> nd::Array2<C64>
    {
        self.op.apply_from_right(rho, t) * (self.f)(t)
    }
}

/// Sum of operators on a common grid.
pub struct OperatorSum {
    ops: Vec<Box<dyn Operator>>,
}

impl OperatorSum {
    /// Create a new sum.
    ///
    /// Fails if `ops` is empty or the operators are defined on different
    /// grids.
    pub fn new(ops: Vec<Box<dyn Operator>>) -> PropResult<Self> {
        let first = ops.first().ok_or(PropError::EmptySum)?;
        for op in ops.iter().skip(1) {
            MismatchError::check_grids(first.grid(), op.grid())?;
        }
        Ok(Self { ops })
    }

    /// Number of terms in the sum.
    pub fn len(&self) -> usize { self.ops.len() }

    /// Always `false`; sums cannot be empty.
    pub fn is_empty(&self) -> bool { self.ops.is_empty() }
}

impl Operator for OperatorSum {
    fn grid(&self) -> &Arc<Grid> { self.ops[0].grid() }

    fn is_time_dependent(&self) -> bool {
        self.ops.iter().any(|op| op.is_time_dependent())
    }

    fn apply_to_wave_function(&self, psi: &nd::Array1<C64>, t: f64)
        -> nd::Array1<C64>
    {
        let mut acc: nd::Array1<C64> = nd::Array1::zeros(psi.raw_dim());
        self.ops.iter()
            .for_each(|op| { acc += &op.apply_to_wave_function(psi, t); });
        acc
    }

    fn apply_from_left(&self, rho: &nd::Array2<C64>, t: f64)
        -> nd::Array2<C64>
    {
        let mut acc: nd::Array2<C64> = nd::Array2::zeros(rho.raw_dim());
        self.ops.iter()
            .for_each(|op| { acc += &op.apply_from_left(rho, t); });
        acc
    }

    fn apply_from_right(&self, rho: &nd::Array2<C64>, t: f64)
        -> nd::Array2<C64>
    {
        let mut acc: nd::Array2<C64> = nd::Array2::zeros(rho.raw_dim());
        self.ops.iter()
            .for_each(|op| { acc += &op.apply_from_right(rho, t); });
        acc
    }
}

/// Hamiltonian `T + V` of a particle of mass `mass` in the potential `v`.
pub fn hamiltonian<F>(grid: &Arc<Grid>, mass: f64, v: F)
    -> PropResult<OperatorSum>
where F: Fn(f64) -> f64
{
    let ops: Vec<Box<dyn Operator>> = vec![
        Box::new(KineticEnergy::new(grid, mass)?),
        Box::new(Potential::new(grid, v)),
    ];
    OperatorSum::new(ops)
}
