use std::{ f64::consts::PI, sync::Arc };
use approx::assert_abs_diff_eq;
use ndarray as nd;
use num_complex::Complex64 as C64;
use rand::{ rngs::StdRng, SeedableRng };
use tprop::{
    builder::{ gaussian, product_wave_function, pure_density, random_wave_function },
    chebychev::{ ChebychevConfig, ChebychevSolver },
    expression::{ CommutatorLiouvillian, SchroedingerEquation },
    grid::Grid,
    observables::{ energy_and_variance, position_moments },
    odesolver::{ OdeConfig, OdeSolver },
    operator::{ hamiltonian, KineticEnergy, Potential },
    solver::Solver,
    state::State,
};

fn linear_potential_grid() -> Arc<Grid> {
    Arc::new(Grid::new(1.0, 10.0, 12).unwrap())
}

// psi0 * exp(-i x t) on the DVR points
fn phase_evolved(psi0: &State, t: f64) -> State {
    let grid = psi0.grid().clone();
    let data: nd::Array1<C64>
        = psi0.as_wave_function().unwrap().iter().zip(grid.points())
        .map(|(c, x)| *c * C64::cis(-x * t))
        .collect();
    State::wave_function(grid, data).unwrap()
}

fn padded_bounds(grid: &Grid) -> (f64, f64) {
    let x = grid.points();
    let (lo, hi) = (x[0], x[x.len() - 1]);
    (lo - 0.1 * lo.abs(), hi + 0.1 * hi.abs())
}

#[test]
fn free_particle_conserves_trace() {
    const CUTOFF: f64 = 1e-12;
    let grid = Arc::new(Grid::new(-20.0, 20.0, 64).unwrap());
    let kin = KineticEnergy::new(&grid, 1.0).unwrap();
    let eq = SchroedingerEquation::new(&kin);
    let config = ChebychevConfig::default().with_cutoff(CUTOFF);
    let solver
        = ChebychevSolver::with_config(&eq, 1.0, (0.0, kin.max_energy()), config)
        .unwrap();
    let psi0
        = product_wave_function(&grid, gaussian(0.0, 1.0, 2.0).unwrap(), true)
        .unwrap();
    let tr0 = psi0.trace();
    for item in solver.propagate(psi0, 0.0, 2000) {
        let (_, psi) = item.unwrap();
        assert!((psi.trace() - tr0).abs() < 10.0 * CUTOFF);
    }
}

#[test]
fn linear_potential_matches_exact_phase() {
    let grid = linear_potential_grid();
    let pot = Potential::new(&grid, |x| x);
    let eq = SchroedingerEquation::new(&pot);
    let dt = 5.0;
    let solver = ChebychevSolver::new(&eq, dt, padded_bounds(&grid)).unwrap();
    let mut rng = StdRng::seed_from_u64(10546);
    let psi0 = random_wave_function(&grid, &mut rng, 1.0).unwrap();
    let mut psi = psi0.clone();
    for step in 0..5 {
        psi = solver.step(&psi, step as f64 * dt).unwrap();
        let expected = phase_evolved(&psi0, (step + 1) as f64 * dt);
        assert_abs_diff_eq!(psi.distance(&expected).unwrap(), 0.0, epsilon = 1e-8);
    }
}

#[test]
fn density_operator_follows_wave_function() {
    let grid = linear_potential_grid();
    let pot = Potential::new(&grid, |x| x);
    let dt = 5.0;
    let bounds = padded_bounds(&grid);
    let psi_solver
        = ChebychevSolver::new(SchroedingerEquation::new(&pot), dt, bounds)
        .unwrap();
    // the commutator spans [-dE, dE]
    let width = 1.1 * (bounds.1 - bounds.0);
    let rho_solver
        = ChebychevSolver::new(CommutatorLiouvillian::new(&pot), dt, (-width, width))
        .unwrap();
    let mut rng = StdRng::seed_from_u64(10546);
    let mut psi = random_wave_function(&grid, &mut rng, 1.0).unwrap();
    let mut rho = pure_density(&psi).unwrap();
    for _ in 0..5 {
        psi = psi_solver.step(&psi, 0.0).unwrap();
        rho = rho_solver.step(&rho, 0.0).unwrap();
        let expected = pure_density(&psi).unwrap();
        assert_abs_diff_eq!(rho.distance(&expected).unwrap(), 0.0, epsilon = 1e-8);
    }
}

#[test]
fn spectral_range_scaling() {
    // doubling the range and halving the step keeps alpha fixed
    let grid = Arc::new(Grid::new(-10.0, 10.0, 64).unwrap());
    let h = hamiltonian(&grid, 1.0, |x| 0.5 * x * x).unwrap();
    let eq = SchroedingerEquation::new(&h);
    let e_max = KineticEnergy::new(&grid, 1.0).unwrap().max_energy() + 50.0;
    let dt = 0.4;
    let narrow = ChebychevSolver::new(&eq, dt, (0.0, e_max)).unwrap();
    let wide
        = ChebychevSolver::new(&eq, dt / 2.0, (-e_max / 2.0, 1.5 * e_max))
        .unwrap();
    assert_abs_diff_eq!(narrow.alpha(), wide.alpha(), epsilon = 1e-12);

    let psi0
        = product_wave_function(&grid, gaussian(1.5, 0.5, 1.0).unwrap(), true)
        .unwrap();
    let (_, psi_narrow) = narrow.propagate(psi0.clone(), 0.0, 3).last_state().unwrap();
    let (_, psi_wide) = wide.propagate(psi0, 0.0, 6).last_state().unwrap();
    assert_abs_diff_eq!(psi_narrow.distance(&psi_wide).unwrap(), 0.0, epsilon = 1e-10);
}

#[test]
fn smaller_cutoff_never_hurts() {
    let grid = linear_potential_grid();
    let pot = Potential::new(&grid, |x| x);
    let eq = SchroedingerEquation::new(&pot);
    let dt = 10.0;
    let mut rng = StdRng::seed_from_u64(10546);
    let psi0 = random_wave_function(&grid, &mut rng, 1.0).unwrap().normalized().unwrap();
    let expected = phase_evolved(&psi0, dt);

    let mut last_order = 0;
    let mut last_error = f64::INFINITY;
    for cutoff in [1e-6, 1e-8, 1e-10, 1e-12] {
        let config = ChebychevConfig::default().with_cutoff(cutoff);
        let solver
            = ChebychevSolver::with_config(&eq, dt, padded_bounds(&grid), config)
            .unwrap();
        let error = solver.step(&psi0, 0.0).unwrap().distance(&expected).unwrap();
        assert!(solver.order() >= last_order);
        assert!(error <= last_error + 1e-14);
        assert!(error <= solver.error_bound() + 1e-13);
        last_order = solver.order();
        last_error = error;
    }
}

#[test]
fn too_narrow_bounds_show_up_in_trace() {
    let grid = linear_potential_grid();
    let pot = Potential::new(&grid, |x| x);
    let eq = SchroedingerEquation::new(&pot);
    // the potential reaches up to 9.25
    let solver = ChebychevSolver::new(&eq, 1.0, (1.0, 5.0)).unwrap();
    let mut rng = StdRng::seed_from_u64(10546);
    let psi0 = random_wave_function(&grid, &mut rng, 1.0).unwrap();
    let tr0 = psi0.trace();
    let drifted
        = solver.propagate(psi0, 0.0, 5)
        .map(|item| item.unwrap().1.trace())
        .any(|tr| !((tr - tr0).abs() / tr0 <= 0.01));
    assert!(drifted);
}

#[test]
fn runge_kutta_and_chebychev_agree_on_coherent_state() {
    const X0: f64 = 2.0;
    let grid = Arc::new(Grid::new(-10.0, 10.0, 64).unwrap());
    let h = hamiltonian(&grid, 1.0, |x| 0.5 * x * x).unwrap();
    let eq = SchroedingerEquation::new(&h);
    let e_max = KineticEnergy::new(&grid, 1.0).unwrap().max_energy() + 50.0;
    let dt = PI / 4.0;
    let cheby = ChebychevSolver::new(&eq, dt, (0.0, e_max)).unwrap();
    let ode
        = OdeSolver::with_config(&eq, dt, OdeConfig::default().with_tolerance(1e-10))
        .unwrap();

    let psi0
        = product_wave_function(&grid, gaussian(X0, 0.0, 1.0).unwrap(), true)
        .unwrap();
    let (e0, _) = energy_and_variance(&h, &psi0, 0.0).unwrap();
    assert_abs_diff_eq!(e0, 0.5 + 0.5 * X0.powi(2), epsilon = 1e-10);

    let runs = cheby.propagate(psi0.clone(), 0.0, 8).zip(ode.propagate(psi0, 0.0, 8));
    for (item_c, item_o) in runs {
        let (t, psi_c) = item_c.unwrap();
        let (t_o, psi_o) = item_o.unwrap();
        assert_abs_diff_eq!(t, t_o, epsilon = 1e-12);
        let (x_c, _) = position_moments(&psi_c).unwrap();
        let (x_o, _) = position_moments(&psi_o).unwrap();
        assert_abs_diff_eq!(x_c, X0 * t.cos(), epsilon = 1e-8);
        assert_abs_diff_eq!(x_o, X0 * t.cos(), epsilon = 1e-6);
        let (e_c, _) = energy_and_variance(&h, &psi_c, t).unwrap();
        let (e_o, _) = energy_and_variance(&h, &psi_o, t).unwrap();
        assert_abs_diff_eq!(e_c, e0, epsilon = 1e-9);
        assert_abs_diff_eq!(e_o, e0, epsilon = 1e-6);
    }
}
