//! Kernel-polynomial (Chebyshev) expansion of the lattice Green's function.
//!
//! Instead of diagonalizing the Hamiltonian, the spectral density at a basis
//! index is reconstructed from the moments
//! $\mu_k = \bra{i} T_k(H/a) \ket{j}$ of the rescaled Hamiltonian, where
//! $T_k$ is the k-th Chebyshev polynomial. The scale factor $a$ must be
//! chosen by the caller so that the full spectrum of $H/a$ fits in
//! $[-1, 1]$; in practice one over-estimates the bandwidth. Truncating the
//! expansion at order $M$ produces Gibbs ringing, which the Jackson kernel
//! damps at the cost of an energy resolution $\sim \pi a / M$.

use crate::basis::{BasisSet, SiteIndex, SpinChannel, SpinSector};
use crate::error::{KpmError, Result};
use crate::sparse::SparseHamiltonian;
use ndarray::Array1;
use num_complex::Complex;
use rayon::prelude::*;
use std::f64::consts::PI;

/// Solver configuration: expansion order, spectral rescaling and the energy
/// window the densities are evaluated on.
#[derive(Clone, Copy, Debug)]
pub struct SolverConfig {
    /// Number of Chebyshev moments $M$.
    pub num_coefficients: usize,
    /// Half-width $a$ of the rescaled spectrum; all eigenvalues of $H/a$
    /// must lie in $[-1, 1]$.
    pub scale_factor: f64,
    /// Lower edge of the evaluation window.
    pub lower_bound: f64,
    /// Upper edge of the evaluation window.
    pub upper_bound: f64,
    /// Number of energy samples across the window.
    pub energy_resolution: usize,
}

/// The spin-polarized LDOS of one lattice site: one density curve per
/// physical spin channel, sampled on the shared energy grid.
#[derive(Clone, Debug)]
pub struct SiteLdos {
    pub x: usize,
    pub y: usize,
    pub up: Array1<f64>,
    pub down: Array1<f64>,
}

impl SiteLdos {
    pub fn channel(&self, channel: SpinChannel) -> &Array1<f64> {
        match channel {
            SpinChannel::Up => &self.up,
            SpinChannel::Down => &self.down,
        }
    }
}

/// The spin-polarized LDOS over a set of lattice coordinates.
///
/// `energies` is ascending; `sites` preserves the request order.
#[derive(Clone, Debug)]
pub struct SpinPolarizedLdos {
    pub energies: Array1<f64>,
    pub sites: Vec<SiteLdos>,
}

/// The Chebyshev spectral solver. Borrows the finalized Hamiltonian
/// read-only, so several solvers may share one matrix.
pub struct ChebyshevSolver<'a> {
    hamiltonian: &'a SparseHamiltonian,
    config: SolverConfig,
    /// Jackson damping coefficients $g_k$, fixed by the expansion order.
    kernel: Vec<f64>,
}

impl<'a> ChebyshevSolver<'a> {
    pub fn new(hamiltonian: &'a SparseHamiltonian, config: SolverConfig) -> Result<Self> {
        if config.num_coefficients == 0 {
            return Err(KpmError::Configuration(
                "the expansion order must be positive".to_string(),
            ));
        }
        if config.energy_resolution == 0 {
            return Err(KpmError::Configuration(
                "the energy resolution must be positive".to_string(),
            ));
        }
        if !(config.scale_factor > 0.0) {
            return Err(KpmError::Configuration(format!(
                "the scale factor must be positive, got {}",
                config.scale_factor
            )));
        }
        if config.lower_bound >= config.upper_bound
            || config.lower_bound < -config.scale_factor
            || config.upper_bound > config.scale_factor
        {
            return Err(KpmError::Configuration(format!(
                "the energy window [{}, {}] must be an ascending range inside [-{}, {}]",
                config.lower_bound, config.upper_bound, config.scale_factor, config.scale_factor
            )));
        }
        let kernel = jackson_kernel(config.num_coefficients);
        Ok(ChebyshevSolver {
            hamiltonian,
            config,
            kernel,
        })
    }

    #[inline(always)]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The ascending energy grid the densities are sampled on.
    pub fn energies(&self) -> Array1<f64> {
        Array1::linspace(
            self.config.lower_bound,
            self.config.upper_bound,
            self.config.energy_resolution,
        )
    }

    /// Check the caller-supplied scale factor against a power-iteration
    /// bound on the spectral radius. An under-estimated scale factor aliases
    /// spectral weight back into the window, silently corrupting every
    /// density, so callers are encouraged to run this once per model.
    pub fn verify_scale_factor(&self) -> Result<()> {
        let bound = self.hamiltonian.spectral_bound(64);
        if bound > self.config.scale_factor {
            return Err(KpmError::ScaleFactorTooSmall {
                bound,
                scale_factor: self.config.scale_factor,
            });
        }
        Ok(())
    }

    /// The projected Chebyshev moments $\mu_k = \bra{dest} T_k(H/a)
    /// \ket{source}$ for $k = 0..M$.
    ///
    /// Runs the three-term recurrence $T_{k} = 2 (H/a) T_{k-1} - T_{k-2}$,
    /// one sparse matrix-vector product per order. Only the two most recent
    /// vectors are kept alive; the projections are accumulated on the fly.
    pub fn moments_projected(&self, dest: usize, source: usize) -> Result<Vec<Complex<f64>>> {
        let dim = self.hamiltonian.dim();
        for index in [dest, source] {
            if index >= dim {
                return Err(KpmError::IndexOutOfRange { index, dim });
            }
        }
        let order = self.config.num_coefficients;
        let inv_scale = Complex::new(1.0 / self.config.scale_factor, 0.0);

        let mut mu = Vec::with_capacity(order);
        let mut prev = Array1::<Complex<f64>>::zeros(dim);
        prev[source] = Complex::new(1.0, 0.0);
        mu.push(prev[dest]);
        if order == 1 {
            return Ok(mu);
        }
        let mut cur = self.hamiltonian.matvec(&prev).mapv(|z| z * inv_scale);
        mu.push(cur[dest]);
        for _ in 2..order {
            let mut next = self.hamiltonian.matvec(&cur).mapv(|z| z * 2.0 * inv_scale);
            next -= &prev;
            mu.push(next[dest]);
            prev = cur;
            cur = next;
        }
        Ok(mu)
    }

    /// The on-diagonal moments $\mu_k = \bra{i} T_k(H/a) \ket{i}$ used for
    /// the LDOS.
    pub fn moments(&self, source: usize) -> Result<Vec<Complex<f64>>> {
        self.moments_projected(source, source)
    }

    /// Reconstruct the kernel-damped spectral density on the configured
    /// energy window from a set of projected moments.
    ///
    /// $\rho(E) = \frac{1}{\pi a \sqrt{1 - x^2}} \left( g_0 \mu_0
    /// + 2 \sum_{k\ge 1} g_k \mu_k \cos(k \arccos x) \right)$, $x = E/a$.
    /// Truncation can produce small negative artifacts near the spectral
    /// edges; those are clamped to zero. Moments beyond the configured
    /// expansion order are ignored, so a longer moment sequence reconstructs
    /// exactly as its truncation would.
    pub fn reconstruct_density(&self, moments: &[Complex<f64>]) -> Array1<f64> {
        let energies = self.energies();
        let scale = self.config.scale_factor;
        energies.mapv(|energy| {
            let x = energy / scale;
            if x * x >= 1.0 - 1e-12 {
                return 0.0;
            }
            let theta = x.acos();
            let mut sum = self.kernel[0] * moments[0].re;
            for (k, mu) in moments.iter().enumerate().take(self.kernel.len()).skip(1) {
                sum += 2.0 * self.kernel[k] * mu.re * (k as f64 * theta).cos();
            }
            let density = sum / (PI * scale * (1.0 - x * x).sqrt());
            density.max(0.0)
        })
    }

    /// The spin-polarized LDOS over the requested lattice coordinates.
    ///
    /// For every coordinate the on-diagonal density of each of the four BdG
    /// sectors is reconstructed (one moment recursion per sector) and the
    /// particle/hole partners are summed into the two physical spin
    /// channels. Sites are independent and processed in parallel.
    pub fn calculate_spin_polarized_ldos(
        &self,
        basis: &BasisSet,
        coordinates: &[(usize, usize)],
    ) -> Result<SpinPolarizedLdos> {
        if basis.dim() != self.hamiltonian.dim() {
            return Err(KpmError::Configuration(format!(
                "basis dimension {} does not match the Hamiltonian dimension {}",
                basis.dim(),
                self.hamiltonian.dim()
            )));
        }
        let sites: Vec<SiteLdos> = coordinates
            .par_iter()
            .map(|&(x, y)| -> Result<SiteLdos> {
                let mut up = Array1::<f64>::zeros(self.config.energy_resolution);
                let mut down = Array1::<f64>::zeros(self.config.energy_resolution);
                for sector in SpinSector::ALL {
                    let index = basis.index(SiteIndex::new(x, y, sector))?;
                    let moments = self.moments(index)?;
                    let density = self.reconstruct_density(&moments);
                    match sector.spin_channel() {
                        SpinChannel::Up => up += &density,
                        SpinChannel::Down => down += &density,
                    }
                }
                Ok(SiteLdos { x, y, up, down })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SpinPolarizedLdos {
            energies: self.energies(),
            sites,
        })
    }
}

/// The Jackson damping coefficients $g_k$ for an order-$M$ expansion.
///
/// $g_k = \frac{(M - k + 1)\cos\frac{\pi k}{M+1}
/// + \sin\frac{\pi k}{M+1}\cot\frac{\pi}{M+1}}{M + 1}$
pub fn jackson_kernel(order: usize) -> Vec<f64> {
    let m = order as f64;
    let q = PI / (m + 1.0);
    (0..order)
        .map(|k| {
            let k = k as f64;
            ((m - k + 1.0) * (q * k).cos() + (q * k).sin() / q.tan()) / (m + 1.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An open tight-binding chain, hopping t = 1, as a bare sparse matrix.
    fn chain(n: usize) -> SparseHamiltonian {
        let t = Complex::new(-1.0, 0.0);
        let mut triplets = Vec::new();
        for i in 0..n - 1 {
            triplets.push((i, i + 1, t));
            triplets.push((i + 1, i, t));
        }
        SparseHamiltonian::from_triplets(n, triplets)
    }

    fn config(order: usize, scale: f64, resolution: usize) -> SolverConfig {
        SolverConfig {
            num_coefficients: order,
            scale_factor: scale,
            lower_bound: -scale,
            upper_bound: scale,
            energy_resolution: resolution,
        }
    }

    fn trapezoid(energies: &Array1<f64>, density: &Array1<f64>) -> f64 {
        let mut total = 0.0;
        for i in 1..energies.len() {
            total += 0.5 * (density[i] + density[i - 1]) * (energies[i] - energies[i - 1]);
        }
        total
    }

    #[test]
    fn jackson_kernel_shape() {
        let g = jackson_kernel(128);
        assert!((g[0] - 1.0).abs() < 1e-3);
        // Damping decreases monotonically with k and stays positive.
        for k in 1..g.len() {
            assert!(g[k] > 0.0);
            assert!(g[k] < g[k - 1]);
        }
    }

    #[test]
    fn rejects_bad_configuration() {
        let h = chain(4);
        for bad in [
            config(0, 3.0, 100),
            config(64, 3.0, 0),
            config(64, -1.0, 100),
            SolverConfig {
                lower_bound: -5.0,
                ..config(64, 3.0, 100)
            },
            SolverConfig {
                lower_bound: 1.0,
                upper_bound: -1.0,
                ..config(64, 3.0, 100)
            },
        ] {
            assert!(matches!(
                ChebyshevSolver::new(&h, bad),
                Err(KpmError::Configuration(_))
            ));
        }
    }

    #[test]
    fn rejects_out_of_range_source() {
        let h = chain(4);
        let solver = ChebyshevSolver::new(&h, config(32, 3.0, 50)).unwrap();
        assert!(matches!(
            solver.moments(4),
            Err(KpmError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            solver.moments_projected(0, 17),
            Err(KpmError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn single_level_peak_and_normalization() {
        // One level at E = 0.5; the reconstruction must peak there and carry
        // unit spectral weight.
        let h = SparseHamiltonian::from_triplets(1, vec![(0, 0, Complex::new(0.5, 0.0))]);
        let solver = ChebyshevSolver::new(&h, config(256, 2.0, 801)).unwrap();
        let moments = solver.moments(0).unwrap();
        let density = solver.reconstruct_density(&moments);
        let energies = solver.energies();

        let peak = density
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0;
        assert!((energies[peak] - 0.5).abs() < 0.05);

        let weight = trapezoid(&energies, &density);
        assert!((weight - 1.0).abs() < 0.02, "weight = {}", weight);

        for &rho in density.iter() {
            assert!(rho >= 0.0);
        }
    }

    #[test]
    fn density_is_nonnegative_on_a_chain() {
        let h = chain(32);
        let solver = ChebyshevSolver::new(&h, config(128, 3.0, 400)).unwrap();
        for site in [0, 15, 31] {
            let density = solver.reconstruct_density(&solver.moments(site).unwrap());
            for &rho in density.iter() {
                assert!(rho >= 0.0);
            }
        }
    }

    #[test]
    fn expansion_converges_with_order() {
        // Deviation from a high-order reference must shrink as M grows.
        let h = chain(64);
        let reference = {
            let solver = ChebyshevSolver::new(&h, config(64, 3.0, 300)).unwrap();
            solver.reconstruct_density(&solver.moments(32).unwrap())
        };
        let mut deviations = Vec::new();
        for order in [8, 16, 32] {
            let solver = ChebyshevSolver::new(&h, config(order, 3.0, 300)).unwrap();
            let density = solver.reconstruct_density(&solver.moments(32).unwrap());
            let dev = (&density - &reference).mapv(|d| d * d).sum().sqrt();
            deviations.push(dev);
        }
        assert!(deviations[1] < deviations[0]);
        assert!(deviations[2] < deviations[1]);
    }

    #[test]
    fn surplus_moments_are_ignored() {
        // Moments from a higher-order run reconstruct exactly as their
        // truncation to the configured order would.
        let h = chain(16);
        let low = ChebyshevSolver::new(&h, config(24, 3.0, 200)).unwrap();
        let high = ChebyshevSolver::new(&h, config(96, 3.0, 200)).unwrap();
        let long_moments = high.moments(8).unwrap();
        let from_surplus = low.reconstruct_density(&long_moments);
        let from_truncated = low.reconstruct_density(&long_moments[..24]);
        for (a, b) in from_surplus.iter().zip(from_truncated.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn scale_factor_verification() {
        let h = chain(32);
        // Bandwidth of the chain is just under 4; a = 1 is clearly too small.
        let solver = ChebyshevSolver::new(&h, config(32, 1.0, 50)).unwrap();
        assert!(matches!(
            solver.verify_scale_factor(),
            Err(KpmError::ScaleFactorTooSmall { .. })
        ));
        let solver = ChebyshevSolver::new(&h, config(32, 3.0, 50)).unwrap();
        solver.verify_scale_factor().unwrap();
    }
}
