use std::sync::Arc;
use rand::{ rngs::StdRng, SeedableRng };
use tprop::{
    builder::{ random_wave_function, unit_density },
    chebychev::RelaxationSolver,
    grid::Grid,
    observables::{ energy_and_variance, RelaxationMonitor },
    operator::hamiltonian,
    solver::Solver,
    spectrum::{ operator_spectrum, widen, PowerConfig },
};

// relax a random state to the ground state of a quartic double well, then
// compute the thermal density operator at a few temperatures

fn main() -> anyhow::Result<()> {
    const MASS: f64 = 1.0;
    const DT: f64 = 0.5;

    let grid = Arc::new(Grid::new(-6.0, 6.0, 96)?);
    let h = hamiltonian(&grid, MASS, |x| 0.25 * x.powi(4) - 2.0 * x.powi(2))?;

    let mut rng = StdRng::seed_from_u64(10546);
    let psi0 = random_wave_function(&grid, &mut rng, 1.0)?;
    let spectrum = widen(operator_spectrum(&h, &psi0, PowerConfig::default())?, 0.05);
    println!("spectral bounds: ({:.3}, {:.3})", spectrum.0, spectrum.1);

    let solver = RelaxationSolver::new(&h, DT, spectrum)?;
    println!("relaxation: alpha = {:.2}, order = {}", solver.alpha(), solver.order());

    let monitor = RelaxationMonitor::new(&solver, &h, 1e-10, 500)?;
    let (ground, history) = monitor.relax(&psi0)?;
    for step in history.iter().step_by(5) {
        println!(
            "step {:4}: E = {:.10}, var(E) = {:.3e}",
            step.step, step.energy, step.variance,
        );
    }
    let (e0, var) = energy_and_variance(&h, &ground, 0.0)?;
    println!("ground state: E = {:.10} (var = {:.3e})", e0, var);

    // rho(beta) = exp(-beta H) / Z
    let mut rho = unit_density(&grid);
    for k in 1..=8 {
        rho = solver.step(&rho, 0.0)?.normalized()?;
        let beta = k as f64 * DT;
        let (e, _) = energy_and_variance(&h, &rho, 0.0)?;
        println!("beta = {:.1}: <E> = {:.6}", beta, e);
    }
    Ok(())
}
