#![allow(warnings)]
//! Spin-polarized local density of states of a chiral topological
//! superconducting island, computed with the kernel polynomial method.
//!
//! The crate is organized around two pieces:
//!
//! 1: [`model::LatticeModel`] assembles a Bogoliubov-de Gennes Hamiltonian
//! over a finite 2D lattice from individually declared coupling terms and
//! finalizes it into an immutable sparse matrix, checking Hermiticity.
//!
//! 2: [`chebyshev::ChebyshevSolver`] expands the Green's function of that
//! matrix in Chebyshev polynomials and reconstructs Jackson-kernel-damped,
//! windowed spectral densities without ever diagonalizing.
//!
//! [`island::build_island_model`] declares the concrete physical model: a
//! magnetic island inside a host superconductor with Rashba spin-orbit
//! interaction, s- and p-wave pairing and a smooth Zeeman wall.

pub mod basis;
pub mod chebyshev;
pub mod error;
pub mod io;
pub mod island;
pub mod model;
pub mod output;
pub mod sparse;

pub use basis::{BasisSet, Boundary, SiteIndex, SpinChannel, SpinSector};
pub use chebyshev::{ChebyshevSolver, SolverConfig, SpinPolarizedLdos};
pub use error::{KpmError, Result};
pub use io::Parameters;
pub use island::{IslandParams, build_island_model};
pub use model::{CouplingTerm, LatticeModel};
pub use sparse::SparseHamiltonian;

/// The coordinates of the 1D cut `x = 0..size_x` at `y = size_y / 2`.
pub fn cut_coordinates(size_x: usize, size_y: usize) -> Vec<(usize, usize)> {
    (0..size_x).map(|x| (x, size_y / 2)).collect()
}

/// The coordinates of the full 2D surface, row-major.
pub fn grid_coordinates(size_x: usize, size_y: usize) -> Vec<(usize, usize)> {
    let mut coordinates = Vec::with_capacity(size_x * size_y);
    for x in 0..size_x {
        for y in 0..size_y {
            coordinates.push((x, y));
        }
    }
    coordinates
}
