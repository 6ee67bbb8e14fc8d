use std::{ f64::consts::PI, sync::Arc };
use tprop::{
    builder::{ gaussian, product_wave_function },
    chebychev::ChebychevSolver,
    expression::SchroedingerEquation,
    grid::Grid,
    observables::{ energy_and_variance, position_moments },
    odesolver::{ OdeConfig, OdeSolver },
    operator::{ hamiltonian, KineticEnergy },
    solver::Solver,
};

// propagate a displaced ground state (coherent state) of the harmonic
// oscillator over two periods with both solvers, comparing against the
// classical trajectory x0 cos(t)

fn main() -> anyhow::Result<()> {
    const MASS: f64 = 1.0;
    const X0: f64 = 2.5; // initial displacement
    const STEPS_PER_PERIOD: usize = 20;

    let grid = Arc::new(Grid::new(-12.0, 12.0, 128)?);
    let h = hamiltonian(&grid, MASS, |x| 0.5 * x * x)?;
    let eq = SchroedingerEquation::new(&h);

    // V <= 72 on the grid; generous upper bound
    let e_max = KineticEnergy::new(&grid, MASS)?.max_energy() + 72.0;
    let period = 2.0 * PI;
    let dt = period / STEPS_PER_PERIOD as f64;

    let cheby = ChebychevSolver::new(&eq, dt, (0.0, 1.05 * e_max))?;
    let ode = OdeSolver::with_config(
        &eq, dt, OdeConfig::default().with_tolerance(1e-10))?;
    println!(
        "chebychev: alpha = {:.2}, order = {}, error bound = {:.2e}",
        cheby.alpha(), cheby.order(), cheby.error_bound(),
    );

    let psi0 = product_wave_function(&grid, gaussian(X0, 0.0, 1.0)?, true)?;
    let (e0, _) = energy_and_variance(&h, &psi0, 0.0)?;
    println!("expected energy: {:.6}", 0.5 + 0.5 * X0.powi(2));
    println!("computed energy: {:.6}", e0);

    println!(
        "{:>8} {:>12} {:>12} {:>12} {:>14}",
        "t", "<x> exact", "<x> cheby", "<x> ode", "trace cheby",
    );
    let num_steps = 2 * STEPS_PER_PERIOD;
    let cheby_run = cheby.propagate(psi0.clone(), 0.0, num_steps);
    let ode_run = ode.propagate(psi0, 0.0, num_steps);
    for (item_c, item_o) in cheby_run.zip(ode_run) {
        let (t, psi_c) = item_c?;
        let (_, psi_o) = item_o?;
        let (x_c, _) = position_moments(&psi_c)?;
        let (x_o, _) = position_moments(&psi_o)?;
        println!(
            "{:8.4} {:12.6} {:12.6} {:12.6} {:14.10}",
            t, X0 * t.cos(), x_c, x_o, psi_c.trace(),
        );
    }
    Ok(())
}
