//! Immutable wave functions and density operators.
//!
//! A [`State`] bundles a coefficient array with the [`Grid`] that defines its
//! representation. States never change after construction: every arithmetic
//! operation returns a new state, so a state can be handed to any number of
//! solvers or kept around for later comparison without defensive copies.
//!
//! Propagators treat states purely as vectors, through [`State::lincomb`],
//! [`State::scaled`] and friends, and never branch on their [`Kind`]. Only
//! operators and expressions need to know whether they act on a wave function
//! or a density operator.

use std::{ fmt, ops::{ Mul, Neg }, sync::Arc };
use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::Zero;
use crate::{
    error::{ MismatchError, PropError, PropResult },
    grid::Grid,
    utils::{ fft_axis_inplace, ifft_axis_inplace },
};

/// The two flavors of quantum states.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Rank-1 coefficient array over the grid.
    WaveFunction,
    /// Rank-2 coefficient array (ket index first, bra index second).
    DensityOperator,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaveFunction => write!(f, "wave function"),
            Self::DensityOperator => write!(f, "density operator"),
        }
    }
}

#[derive(Clone, Debug)]
enum Data {
    Wave(nd::Array1<C64>),
    Density(nd::Array2<C64>),
}

// a * u + b * v, elementwise
fn combine<D>(a: C64, u: &nd::Array<C64, D>, b: C64, v: &nd::Array<C64, D>)
    -> nd::Array<C64, D>
where D: nd::Dimension
{
    nd::Zip::from(u).and(v).map_collect(|ui, vi| a * *ui + b * *vi)
}

/// A wave function or density operator in the weighted DVR of a grid.
#[derive(Clone, Debug)]
pub struct State {
    grid: Arc<Grid>,
    data: Data,
}

impl State {
    /// Create a wave function from weighted-DVR coefficients.
    pub fn wave_function(grid: Arc<Grid>, data: nd::Array1<C64>)
        -> PropResult<Self>
    {
        MismatchError::check_shape(data.shape(), &[grid.size()])?;
        Ok(Self { grid, data: Data::Wave(data) })
    }

    /// Create a density operator from weighted-DVR coefficients.
    ///
    /// The first index is the ket index, the second the bra index.
    pub fn density_operator(grid: Arc<Grid>, data: nd::Array2<C64>)
        -> PropResult<Self>
    {
        let n = grid.size();
        MismatchError::check_shape(data.shape(), &[n, n])?;
        Ok(Self { grid, data: Data::Density(data) })
    }

    // callers guarantee that the shape matches the grid
    pub(crate) fn from_wave_unchecked(grid: Arc<Grid>, data: nd::Array1<C64>)
        -> Self
    {
        Self { grid, data: Data::Wave(data) }
    }

    pub(crate) fn from_density_unchecked(
        grid: Arc<Grid>,
        data: nd::Array2<C64>,
    ) -> Self
    {
        Self { grid, data: Data::Density(data) }
    }

    // apply `fw` or `fd` to the coefficients, depending on the kind; the
    // closures must preserve the shape
    pub(crate) fn transform<FW, FD>(&self, fw: FW, fd: FD) -> Self
    where
        FW: FnOnce(&nd::Array1<C64>) -> nd::Array1<C64>,
        FD: FnOnce(&nd::Array2<C64>) -> nd::Array2<C64>,
    {
        let data
            = match &self.data {
                Data::Wave(psi) => Data::Wave(fw(psi)),
                Data::Density(rho) => Data::Density(fd(rho)),
            };
        Self { grid: self.grid.clone(), data }
    }

    /// Get a reference to the underlying grid.
    pub fn grid(&self) -> &Arc<Grid> { &self.grid }

    /// Return whether `self` is a wave function or a density operator.
    pub fn kind(&self) -> Kind {
        match &self.data {
            Data::Wave(_) => Kind::WaveFunction,
            Data::Density(_) => Kind::DensityOperator,
        }
    }

    /// Return `true` if `self` is a wave function.
    pub fn is_wave_function(&self) -> bool {
        self.kind() == Kind::WaveFunction
    }

    /// Return `true` if `self` is a density operator.
    pub fn is_density_operator(&self) -> bool {
        self.kind() == Kind::DensityOperator
    }

    /// Get the coefficients if `self` is a wave function.
    pub fn as_wave_function(&self) -> Option<&nd::Array1<C64>> {
        match &self.data {
            Data::Wave(psi) => Some(psi),
            Data::Density(_) => None,
        }
    }

    /// Get the coefficients if `self` is a density operator.
    pub fn as_density_operator(&self) -> Option<&nd::Array2<C64>> {
        match &self.data {
            Data::Wave(_) => None,
            Data::Density(rho) => Some(rho),
        }
    }

    /// Shape of the coefficient array.
    pub fn shape(&self) -> &[usize] {
        match &self.data {
            Data::Wave(psi) => psi.shape(),
            Data::Density(rho) => rho.shape(),
        }
    }

    /// Iterate over all coefficients in logical order, regardless of kind.
    pub fn coefficients(&self) -> Box<dyn Iterator<Item = &C64> + '_> {
        match &self.data {
            Data::Wave(psi) => Box::new(psi.iter()),
            Data::Density(rho) => Box::new(rho.iter()),
        }
    }

    /// Return an error if `self` and `other` cannot be combined.
    pub fn check_compatible(&self, other: &Self) -> PropResult<()> {
        MismatchError::check_grids(&self.grid, &other.grid)?;
        MismatchError::check_kinds(self.kind(), other.kind())?;
        Ok(())
    }

    /// Trace of the state.
    ///
    /// For wave functions this is the squared norm, for density operators the
    /// sum over the (absolute values of the) diagonal elements. Under
    /// unitary time evolution, the trace is conserved for both.
    pub fn trace(&self) -> f64 {
        match &self.data {
            Data::Wave(psi) => psi.iter().map(|c| c.norm_sqr()).sum(),
            Data::Density(rho) => rho.diag().iter().map(|c| c.norm()).sum(),
        }
    }

    /// Sum of the squared magnitudes of all coefficients.
    ///
    /// This coincides with [`Self::trace`] for wave functions; for density
    /// operators it is the purity (squared Hilbert-Schmidt norm).
    pub fn norm_sqr(&self) -> f64 {
        self.coefficients().map(|c| c.norm_sqr()).sum()
    }

    /// Square root of [`Self::norm_sqr`].
    pub fn norm(&self) -> f64 { self.norm_sqr().sqrt() }

    /// Inner product `<self|other>`; the Hilbert-Schmidt product
    /// `Tr(self† other)` for density operators.
    pub fn dot(&self, other: &Self) -> PropResult<C64> {
        self.check_compatible(other)?;
        let res: C64
            = self.coefficients().zip(other.coefficients())
            .fold(C64::zero(), |acc, (a, b)| acc + a.conj() * b);
        Ok(res)
    }

    /// Compute the linear combination `a * x + b * y`.
    pub fn lincomb(a: C64, x: &Self, b: C64, y: &Self) -> PropResult<Self> {
        MismatchError::check_grids(&x.grid, &y.grid)?;
        let data
            = match (&x.data, &y.data) {
                (Data::Wave(u), Data::Wave(v)) => Data::Wave(combine(a, u, b, v)),
                (Data::Density(u), Data::Density(v)) => {
                    Data::Density(combine(a, u, b, v))
                },
                _ => {
                    return Err(MismatchError::Kind(x.kind(), y.kind()).into());
                },
            };
        Ok(Self { grid: x.grid.clone(), data })
    }

    /// Add two states.
    pub fn checked_add(&self, other: &Self) -> PropResult<Self> {
        Self::lincomb(C64::new(1.0, 0.0), self, C64::new(1.0, 0.0), other)
    }

    /// Subtract `other` from `self`.
    pub fn checked_sub(&self, other: &Self) -> PropResult<Self> {
        Self::lincomb(C64::new(1.0, 0.0), self, C64::new(-1.0, 0.0), other)
    }

    /// Return a copy of `self` with every coefficient transformed by `f`.
    pub fn map<F>(&self, mut f: F) -> Self
    where F: FnMut(C64) -> C64
    {
        let data
            = match &self.data {
                Data::Wave(psi) => Data::Wave(psi.mapv(&mut f)),
                Data::Density(rho) => Data::Density(rho.mapv(&mut f)),
            };
        Self { grid: self.grid.clone(), data }
    }

    /// Multiply by a scalar.
    pub fn scaled(&self, a: C64) -> Self { self.map(|c| a * c) }

    /// Norm of the difference between two states.
    pub fn distance(&self, other: &Self) -> PropResult<f64> {
        Ok(self.checked_sub(other)?.norm())
    }

    /// Return a copy of `self` with unit trace.
    ///
    /// Wave functions are divided by the square root of the trace, density
    /// operators by the trace itself.
    pub fn normalized(&self) -> PropResult<Self> {
        let tr = self.trace();
        if tr == 0.0 { return Err(PropError::ZeroNorm); }
        match self.kind() {
            Kind::WaveFunction => Ok(self.scaled(tr.sqrt().recip().into())),
            Kind::DensityOperator => Ok(self.scaled(tr.recip().into())),
        }
    }

    /// Probability density at the DVR points.
    ///
    /// For density operators this is the absolute value of the diagonal,
    /// converted from the weighted DVR.
    pub fn dvr_density(&self) -> nd::Array1<f64> {
        let w = self.grid.dx();
        match &self.data {
            Data::Wave(psi) => psi.mapv(|c| c.norm_sqr() / w),
            Data::Density(rho) => rho.diag().mapv(|c| c.norm() / w),
        }
    }

    /// Probability density in the plane-wave basis, ordered like
    /// [`Grid::wave_vectors`].
    ///
    /// The transformation is unitary, so the density sums to the trace.
    pub fn fbr_density(&self) -> nd::Array1<f64> {
        match &self.data {
            Data::Wave(psi) => {
                let n = psi.len() as f64;
                let mut phi = psi.clone();
                fft_axis_inplace(&mut phi, 0);
                phi.mapv(|c| c.norm_sqr() / n)
            },
            Data::Density(rho) => {
                // FFT / sqrt(n) on the ket side and n IFFT / sqrt(n) on the
                // bra side; the factors cancel
                let mut rho_k = rho.clone();
                fft_axis_inplace(&mut rho_k, 0);
                ifft_axis_inplace(&mut rho_k, 1);
                rho_k.diag().mapv(|c| c.norm())
            },
        }
    }
}

impl Mul<C64> for &State {
    type Output = State;

    fn mul(self, a: C64) -> State { self.scaled(a) }
}

impl Mul<C64> for State {
    type Output = State;

    fn mul(self, a: C64) -> State { &self * a }
}

impl Mul<f64> for &State {
    type Output = State;

    fn mul(self, a: f64) -> State { self.scaled(a.into()) }
}

impl Mul<f64> for State {
    type Output = State;

    fn mul(self, a: f64) -> State { &self * a }
}

impl Mul<&State> for C64 {
    type Output = State;

    fn mul(self, state: &State) -> State { state.scaled(self) }
}

impl Mul<&State> for f64 {
    type Output = State;

    fn mul(self, state: &State) -> State { state.scaled(self.into()) }
}

impl Neg for &State {
    type Output = State;

    fn neg(self) -> State { self.map(|c| -c) }
}

impl Neg for State {
    type Output = State;

    fn neg(self) -> State { -&self }
}
