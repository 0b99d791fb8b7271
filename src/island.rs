//! The chiral topological superconductor island model.
//!
//! A magnetic island of radius `radius` sits at the center of a 2D host
//! superconductor with Rashba spin-orbit interaction. The Zeeman strength
//! follows a smooth arctangent profile across the island edge, so the
//! topological region is bounded by a wall of width `boundary_width` rather
//! than a hard step. All couplings are declared in the doubled BdG basis
//! with explicit Hermitian-conjugate completion.

use crate::basis::{BasisSet, Boundary, SiteIndex, SpinSector};
use crate::error::Result;
use crate::model::LatticeModel;
use num_complex::Complex;
use std::f64::consts::PI;

/// Physical and geometric parameters of the island model.
#[derive(Clone, Copy, Debug)]
pub struct IslandParams {
    pub size_x: usize,
    pub size_y: usize,
    /// Radius of the magnetic island, in lattice constants.
    pub radius: f64,
    /// Width of the smooth Zeeman wall at the island edge.
    pub boundary_width: f64,
    /// Chemical potential.
    pub mu: Complex<f64>,
    /// Nearest-neighbor hopping.
    pub t: Complex<f64>,
    /// On-site s-wave pairing amplitude.
    pub delta_s: Complex<f64>,
    /// Nearest-neighbor p-wave pairing amplitude.
    pub delta_p: Complex<f64>,
    /// Rashba spin-orbit strength.
    pub alpha: Complex<f64>,
    /// Peak Zeeman strength at the island center.
    pub v_z: Complex<f64>,
    pub boundary: Boundary,
}

impl IslandParams {
    /// The Zeeman strength at site `(x, y)`:
    /// $V_z \left(\pi/2 - \arctan\frac{r - R}{w}\right) / \pi$ with $r$
    /// measured from the lattice center. Approaches $V_z$ deep inside the
    /// island and 0 far outside.
    pub fn magnetization(&self, x: usize, y: usize) -> Complex<f64> {
        let rx = x as isize - (self.size_x / 2) as isize;
        let ry = y as isize - (self.size_y / 2) as isize;
        let r = ((rx * rx + ry * ry) as f64).sqrt();
        self.v_z * ((PI / 2.0 - ((r - self.radius) / self.boundary_width).atan()) / PI)
    }
}

/// Build the island Hamiltonian, one coupling term at a time.
///
/// Per site and particle-sector spin the model receives: the chemical
/// potential, the local Zeeman term, nearest-neighbor hopping along both
/// bond directions, the Rashba terms (spin-flipping, with different phase
/// structure on x- and y-bonds), the p-wave pairing on both bond directions
/// and the on-site s-wave pairing. Hole-sector copies carry the BdG sign
/// flips. Bonds past the lattice edge follow the configured boundary policy.
pub fn build_island_model(params: &IslandParams) -> Result<LatticeModel> {
    let li = Complex::<f64>::i();
    let basis = BasisSet::new(params.size_x, params.size_y);
    let mut model = LatticeModel::new(basis);

    let IslandParams {
        mu,
        t,
        delta_s,
        delta_p,
        alpha,
        boundary,
        ..
    } = *params;

    for x in 0..params.size_x {
        for y in 0..params.size_y {
            let magnetization = params.magnetization(x, y);
            for spin in [SpinSector::Up, SpinSector::Down] {
                let particle = SiteIndex::new(x, y, spin);
                let hole = SiteIndex::new(x, y, spin.conjugate());
                // 2(s - 1/2): -1 for spin up, +1 for spin down.
                let sign = spin.spin_sign();

                // Chemical potential, with the hole-sector sign flip.
                model.add_coupling(-mu, particle, particle)?;
                model.add_coupling(mu, hole, hole)?;

                // Zeeman term from the island's magnetization profile.
                model.add_coupling(magnetization * sign, particle, particle)?;
                model.add_coupling(-magnetization * sign, hole, hole)?;

                // x-bond: hopping, Rashba and p-wave pairing.
                if let Some(px) = basis.neighbor(particle, 1, 0, boundary) {
                    let hx = SiteIndex::new(px.x, px.y, px.sector.conjugate());
                    model.add_coupling_hc(-t, px, particle)?;
                    model.add_coupling_hc(t, hx, hole)?;

                    let flip_px = SiteIndex::new(px.x, px.y, px.sector.flipped());
                    let flip_hx = SiteIndex::new(px.x, px.y, hx.sector.flipped());
                    model.add_coupling_hc(alpha * sign, flip_px, particle)?;
                    model.add_coupling_hc(-alpha * sign, flip_hx, hole)?;

                    model.add_coupling_hc(-delta_p * sign, hx, particle)?;
                    model.add_coupling_hc(delta_p * sign, px, hole)?;
                }

                // y-bond: the Rashba and p-wave terms pick up the chiral
                // factor i instead of the spin sign.
                if let Some(py) = basis.neighbor(particle, 0, 1, boundary) {
                    let hy = SiteIndex::new(py.x, py.y, py.sector.conjugate());
                    model.add_coupling_hc(-t, py, particle)?;
                    model.add_coupling_hc(t, hy, hole)?;

                    let flip_py = SiteIndex::new(py.x, py.y, py.sector.flipped());
                    let flip_hy = SiteIndex::new(py.x, py.y, hy.sector.flipped());
                    model.add_coupling_hc(-li * alpha, flip_py, particle)?;
                    model.add_coupling_hc(-li * alpha, flip_hy, hole)?;

                    model.add_coupling_hc(li * delta_p, hy, particle)?;
                    model.add_coupling_hc(li * delta_p, py, hole)?;
                }

                // On-site s-wave pairing couples opposite spins across the
                // particle-hole boundary.
                let swave_dest = SiteIndex::new(x, y, spin.flipped().conjugate());
                model.add_coupling_hc(delta_s * sign, swave_dest, particle)?;
            }
        }
    }
    Ok(model)
}
