//! Command-line driver: read a parameter file, build the island model, run
//! the Chebyshev solver and write the spin-polarized LDOS to disk.

use std::process;
use std::time::Instant;

use kpmtb::{
    ChebyshevSolver, Parameters, Result, build_island_model, cut_coordinates, grid_coordinates,
    output,
};

const OUTPUT_FILE: &str = "spin_polarized_ldos.dat";

fn run(parameter_file: &str) -> Result<()> {
    let start = Instant::now();

    let parameters = Parameters::from_file(parameter_file)?;
    let model = build_island_model(&parameters.island())?;
    let hamiltonian = model.finalize()?;
    println!(
        "model: {}x{} lattice, dimension {}, {} stored elements",
        parameters.size_x,
        parameters.size_y,
        hamiltonian.dim(),
        hamiltonian.nnz()
    );

    let solver = ChebyshevSolver::new(&hamiltonian, parameters.solver())?;
    solver.verify_scale_factor()?;

    let coordinates = if parameters.cut1d {
        // The cut x = [0, size_x - 1] at y = size_y / 2.
        cut_coordinates(parameters.size_x, parameters.size_y)
    } else {
        grid_coordinates(parameters.size_x, parameters.size_y)
    };
    let ldos = solver.calculate_spin_polarized_ldos(model.basis(), &coordinates)?;
    output::write_spin_polarized_ldos(&ldos, OUTPUT_FILE)?;
    println!(
        "wrote {} sites to {} in {:.3} seconds",
        ldos.sites.len(),
        OUTPUT_FILE,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let parameter_file = match args.as_slice() {
        [] => "parameters.yaml",
        [path] => path.as_str(),
        _ => {
            eprintln!("usage: kpmtb [parameter-file]");
            process::exit(1);
        }
    };
    if let Err(e) = run(parameter_file) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
