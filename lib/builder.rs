//! Functions to assemble wave functions and density operators.
//!
//! Profile functions like [`gaussian`] return raw function values in the DVR;
//! [`product_wave_function`] samples them on a grid and converts them to the
//! weighted DVR.

use std::sync::Arc;
use ndarray as nd;
use num_complex::Complex64 as C64;
use rand::Rng;
use crate::{
    error::{ MismatchError, PropError, PropResult },
    grid::Grid,
    state::{ Kind, State },
};

/// Sample `f` at the grid points and return the corresponding wave function.
///
/// If `normalize` is `true` and the resulting state has non-zero norm, it is
/// normalized to unit trace.
pub fn product_wave_function<F>(grid: &Arc<Grid>, f: F, normalize: bool)
    -> PropResult<State>
where F: Fn(f64) -> C64
{
    let values: nd::Array1<C64> = grid.points().mapv(f);
    let psi = State::wave_function(grid.clone(), grid.to_weighted_dvr(&values))?;
    if normalize && psi.trace() > 0.0 {
        psi.normalized()
    } else {
        Ok(psi)
    }
}

/// Gaussian profile `exp(-(x - x0)^2 / 2 rms^2 + i p0 (x - x0))`.
pub fn gaussian(x0: f64, p0: f64, rms: f64)
    -> PropResult<impl Fn(f64) -> C64>
{
    PropError::check_width(rms)?;
    Ok(move |x: f64| {
        let s = x - x0;
        C64::new(-s.powi(2) / (2.0 * rms.powi(2)), p0 * s).exp()
    })
}

/// Like [`gaussian`], but with the width given as a full width at half
/// maximum.
pub fn gaussian_fwhm(x0: f64, p0: f64, fwhm: f64)
    -> PropResult<impl Fn(f64) -> C64>
{
    PropError::check_width(fwhm)?;
    gaussian(x0, p0, fwhm / (8.0 * std::f64::consts::LN_2).sqrt())
}

/// Plane wave profile `exp(i k x)`.
pub fn plane_wave(k: f64) -> impl Fn(f64) -> C64 {
    move |x: f64| C64::new(0.0, k * x).exp()
}

/// Generate a random wave function whose DVR values are real and uniformly
/// distributed in `[-max_value, max_value)`.
///
/// Seed the generator yourself to get reproducible states; recycling one
/// generator for several states keeps everything tied to a single seed.
pub fn random_wave_function<R>(grid: &Arc<Grid>, rng: &mut R, max_value: f64)
    -> PropResult<State>
where R: Rng + ?Sized
{
    PropError::check_width(max_value)?;
    let values: nd::Array1<C64>
        = (0..grid.size())
        .map(|_| C64::from(max_value * (2.0 * rng.gen::<f64>() - 1.0)))
        .collect();
    State::wave_function(grid.clone(), grid.to_weighted_dvr(&values))
}

/// Wave function with all coefficients equal to zero.
pub fn zero_wave_function(grid: &Arc<Grid>) -> State {
    State::from_wave_unchecked(grid.clone(), nd::Array1::zeros(grid.size()))
}

/// Identity operator on the grid, i.e. the unnormalized density of infinite
/// temperature.
pub fn unit_density(grid: &Arc<Grid>) -> State {
    State::from_density_unchecked(grid.clone(), nd::Array2::eye(grid.size()))
}

/// Form the operator `|ket><bra|`.
pub fn direct_product(ket: &State, bra: &State) -> PropResult<State> {
    MismatchError::check_grids(ket.grid(), bra.grid())?;
    let (k, b)
        = match (ket.as_wave_function(), bra.as_wave_function()) {
            (Some(k), Some(b)) => (k, b),
            _ => {
                return Err(PropError::wrong_kind(
                    "direct product", Kind::DensityOperator));
            },
        };
    let rho: nd::Array2<C64>
        = nd::Array2::from_shape_fn(
            (k.len(), b.len()), |(i, j)| k[i] * b[j].conj());
    Ok(State::from_density_unchecked(ket.grid().clone(), rho))
}

/// Form the pure-state density operator `|psi><psi|`.
pub fn pure_density(psi: &State) -> PropResult<State> {
    direct_product(psi, psi)
}

/// Gram-Schmidt orthonormalization of a set of linearly independent wave
/// functions.
///
/// The output spans the same subspace as the input. Linearly dependent inputs
/// are not detected and produce garbage.
pub fn orthonormalize(states: &[State]) -> PropResult<Vec<State>> {
    let mut res: Vec<State> = Vec::with_capacity(states.len());
    for state in states.iter() {
        if !state.is_wave_function() {
            return Err(PropError::wrong_kind("orthonormalization", state.kind()));
        }
        let mut v = state.normalized()?;
        for b in res.iter() {
            let overlap = b.dot(&v)?;
            v = State::lincomb(C64::from(1.0), &v, -overlap, b)?;
        }
        res.push(v.normalized()?);
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{ assert_abs_diff_eq, assert_relative_eq };
    use rand::{ rngs::StdRng, SeedableRng };

    fn grid() -> Arc<Grid> { Arc::new(Grid::new(-10.0, 10.0, 64).unwrap()) }

    #[test]
    fn gaussian_is_normalized_and_centered() {
        let grid = grid();
        let psi
            = product_wave_function(&grid, gaussian(1.0, 0.0, 1.0).unwrap(), true)
            .unwrap();
        assert_relative_eq!(psi.trace(), 1.0, epsilon = 1e-12);
        let density = psi.dvr_density();
        let mean: f64
            = density.iter().zip(grid.points())
            .map(|(rho, x)| rho * x * grid.dx())
            .sum();
        assert_abs_diff_eq!(mean, 1.0, epsilon = 1e-8);
    }

    #[test]
    fn rejects_bad_widths() {
        assert!(matches!(gaussian(0.0, 0.0, 0.0), Err(PropError::BadWidth(_))));
        assert!(matches!(gaussian_fwhm(0.0, 0.0, -1.0), Err(PropError::BadWidth(_))));
        let mut rng = StdRng::seed_from_u64(10546);
        assert!(random_wave_function(&grid(), &mut rng, 0.0).is_err());
    }

    #[test]
    fn random_states_are_real_and_bounded() {
        let grid = grid();
        let mut rng = StdRng::seed_from_u64(10546);
        let psi = random_wave_function(&grid, &mut rng, 2.0).unwrap();
        let values = grid.to_dvr(psi.as_wave_function().unwrap());
        assert!(values.iter().all(|v| v.im == 0.0 && v.re.abs() <= 2.0));

        let mut rng2 = StdRng::seed_from_u64(10546);
        let psi2 = random_wave_function(&grid, &mut rng2, 2.0).unwrap();
        assert_eq!(psi.distance(&psi2).unwrap(), 0.0);
    }

    #[test]
    fn pure_density_has_wave_function_trace() {
        let grid = grid();
        let psi
            = product_wave_function(&grid, gaussian(0.0, 1.5, 2.0).unwrap(), true)
            .unwrap();
        let rho = pure_density(&psi).unwrap();
        assert_relative_eq!(rho.trace(), 1.0, epsilon = 1e-12);
        // a pure state has unit purity
        assert_relative_eq!(rho.norm_sqr(), 1.0, epsilon = 1e-12);
        assert!(pure_density(&rho).is_err());
    }

    #[test]
    fn unit_density_trace_is_grid_size() {
        let grid = grid();
        assert_relative_eq!(unit_density(&grid).trace(), 64.0);
        assert_eq!(zero_wave_function(&grid).trace(), 0.0);
    }

    #[test]
    fn orthonormalized_states_are_orthonormal() {
        let grid = grid();
        let mut rng = StdRng::seed_from_u64(42);
        let states: Vec<State>
            = (0..4)
            .map(|_| random_wave_function(&grid, &mut rng, 1.0).unwrap())
            .collect();
        let basis = orthonormalize(&states).unwrap();
        assert_eq!(basis.len(), 4);
        for (i, a) in basis.iter().enumerate() {
            for (j, b) in basis.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(a.dot(b).unwrap().norm(), expected, epsilon = 1e-10);
            }
        }
        assert!(orthonormalize(&[]).unwrap().is_empty());
    }
}
