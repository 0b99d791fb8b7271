//! Imperative assembly of the lattice Hamiltonian.
//!
//! Coupling terms are declared one matrix element at a time, optionally with
//! automatic Hermitian-conjugate completion, and accumulated in a keyed map.
//! `finalize` checks the physical invariants (real on-site energies,
//! Hermiticity of the off-diagonal couplings) before emitting the immutable
//! sparse matrix the solver works on.

use crate::basis::{BasisSet, SiteIndex};
use crate::error::{KpmError, Result};
use crate::sparse::SparseHamiltonian;
use num_complex::Complex;
use num_traits::Zero;
use std::collections::HashMap;

/// One matrix element `H[dest][src] += amplitude`.
#[derive(Clone, Copy, Debug)]
pub struct CouplingTerm {
    pub amplitude: Complex<f64>,
    pub dest: SiteIndex,
    pub src: SiteIndex,
}

/// Tolerance for the finalize-time Hermiticity and reality checks.
const HERMITICITY_TOLERANCE: f64 = 1e-10;

/// A BdG lattice model under construction.
#[derive(Clone, Debug)]
pub struct LatticeModel {
    basis: BasisSet,
    terms: HashMap<(usize, usize), Complex<f64>>,
}

impl LatticeModel {
    pub fn new(basis: BasisSet) -> LatticeModel {
        LatticeModel {
            basis,
            terms: HashMap::new(),
        }
    }

    #[inline(always)]
    pub fn basis(&self) -> &BasisSet {
        &self.basis
    }

    /// Accumulate one coupling term. Both coordinates must lie inside the
    /// lattice bounds.
    pub fn add_coupling(
        &mut self,
        amplitude: Complex<f64>,
        dest: SiteIndex,
        src: SiteIndex,
    ) -> Result<()> {
        let d = self.basis.index(dest)?;
        let s = self.basis.index(src)?;
        *self.terms.entry((d, s)).or_insert(Complex::zero()) += amplitude;
        Ok(())
    }

    /// Accumulate a coupling term together with its Hermitian conjugate
    /// (conjugated amplitude, swapped endpoints). The standard way to declare
    /// a hopping bond once.
    pub fn add_coupling_hc(
        &mut self,
        amplitude: Complex<f64>,
        dest: SiteIndex,
        src: SiteIndex,
    ) -> Result<()> {
        self.add_coupling(amplitude, dest, src)?;
        self.add_coupling(amplitude.conj(), src, dest)
    }

    pub fn add_term(&mut self, term: &CouplingTerm) -> Result<()> {
        self.add_coupling(term.amplitude, term.dest, term.src)
    }

    /// The number of distinct `(dest, src)` index pairs accumulated so far.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Check the accumulated terms and emit the immutable sparse matrix.
    ///
    /// Non-consuming, so a second call without further additions returns an
    /// equivalent Hamiltonian.
    pub fn finalize(&self) -> Result<SparseHamiltonian> {
        for (&(d, s), &amp) in self.terms.iter() {
            if d == s {
                if amp.im.abs() > HERMITICITY_TOLERANCE {
                    return Err(KpmError::OnsiteMustBeReal(amp));
                }
            } else {
                let partner = self
                    .terms
                    .get(&(s, d))
                    .copied()
                    .unwrap_or(Complex::zero());
                if (partner - amp.conj()).norm() > HERMITICITY_TOLERANCE {
                    return Err(KpmError::NotHermitian { dest: d, src: s });
                }
            }
        }
        Ok(SparseHamiltonian::from_triplets(
            self.basis.dim(),
            self.terms.iter().map(|(&(d, s), &amp)| (d, s, amp)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::SpinSector;

    fn site(x: usize, y: usize, sector: SpinSector) -> SiteIndex {
        SiteIndex::new(x, y, sector)
    }

    #[test]
    fn hc_completion_gives_hermitian_matrix() {
        let basis = BasisSet::new(2, 1);
        let mut model = LatticeModel::new(basis);
        let t = Complex::new(-1.0, 0.3);
        model
            .add_coupling_hc(t, site(1, 0, SpinSector::Up), site(0, 0, SpinSector::Up))
            .unwrap();
        let h = model.finalize().unwrap();
        let a = basis.index(site(1, 0, SpinSector::Up)).unwrap();
        let b = basis.index(site(0, 0, SpinSector::Up)).unwrap();
        assert_eq!(h.get(a, b).unwrap(), t);
        assert_eq!(h.get(b, a).unwrap(), t.conj());
    }

    #[test]
    fn repeated_terms_accumulate() {
        let basis = BasisSet::new(1, 1);
        let mut model = LatticeModel::new(basis);
        let s = site(0, 0, SpinSector::Up);
        model.add_coupling(Complex::new(1.0, 0.0), s, s).unwrap();
        model
            .add_term(&CouplingTerm {
                amplitude: Complex::new(0.5, 0.0),
                dest: s,
                src: s,
            })
            .unwrap();
        let h = model.finalize().unwrap();
        let n = basis.index(s).unwrap();
        assert_eq!(h.get(n, n).unwrap(), Complex::new(1.5, 0.0));
    }

    #[test]
    fn complex_onsite_is_rejected() {
        let basis = BasisSet::new(1, 1);
        let mut model = LatticeModel::new(basis);
        let s = site(0, 0, SpinSector::Down);
        model.add_coupling(Complex::new(0.0, 0.2), s, s).unwrap();
        assert!(matches!(
            model.finalize(),
            Err(KpmError::OnsiteMustBeReal(_))
        ));
    }

    #[test]
    fn missing_conjugate_is_rejected() {
        let basis = BasisSet::new(2, 1);
        let mut model = LatticeModel::new(basis);
        model
            .add_coupling(
                Complex::new(0.7, 0.1),
                site(1, 0, SpinSector::Up),
                site(0, 0, SpinSector::Up),
            )
            .unwrap();
        assert!(matches!(
            model.finalize(),
            Err(KpmError::NotHermitian { .. })
        ));
    }

    #[test]
    fn out_of_bounds_coupling_is_rejected() {
        let basis = BasisSet::new(2, 2);
        let mut model = LatticeModel::new(basis);
        let err = model.add_coupling(
            Complex::new(1.0, 0.0),
            site(2, 0, SpinSector::Up),
            site(0, 0, SpinSector::Up),
        );
        assert!(matches!(err, Err(KpmError::OutOfBounds { .. })));
        assert_eq!(model.term_count(), 0);
    }

    #[test]
    fn finalize_is_idempotent() {
        let basis = BasisSet::new(2, 2);
        let mut model = LatticeModel::new(basis);
        model
            .add_coupling_hc(
                Complex::new(-1.0, 0.0),
                site(1, 0, SpinSector::Up),
                site(0, 0, SpinSector::Up),
            )
            .unwrap();
        let h1 = model.finalize().unwrap();
        let h2 = model.finalize().unwrap();
        assert_eq!(h1.nnz(), h2.nnz());
        for (row, col, amp) in h1.iter() {
            assert_eq!(h2.get(row, col).unwrap(), amp);
        }
    }
}
