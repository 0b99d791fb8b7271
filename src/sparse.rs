//! Compressed sparse row storage of the finalized BdG Hamiltonian.
//!
//! The matrix is immutable after construction; the Chebyshev recursion only
//! ever needs the matrix-vector product, so that is the one operation tuned
//! here (row-parallel over rayon).

use crate::error::{KpmError, Result};
use ndarray::Array1;
use num_complex::Complex;
use num_traits::Zero;
use rayon::prelude::*;

/// The finalized Hamiltonian in compressed sparse row form.
///
/// Repeated-index accumulation is resolved before construction; entries with
/// negligible magnitude are dropped so that `nnz` reflects the true coupling
/// structure of the model.
#[derive(Clone, Debug)]
pub struct SparseHamiltonian {
    dim: usize,
    row_ptr: Vec<usize>,
    col_ind: Vec<usize>,
    values: Vec<Complex<f64>>,
}

/// Entries below this magnitude are not stored.
const DROP_TOLERANCE: f64 = 1e-12;

impl SparseHamiltonian {
    /// Assemble CSR storage from accumulated `(row, col) -> amplitude`
    /// triplets. The caller (the model's `finalize`) has already verified
    /// Hermiticity.
    pub(crate) fn from_triplets(
        dim: usize,
        triplets: impl IntoIterator<Item = (usize, usize, Complex<f64>)>,
    ) -> SparseHamiltonian {
        let mut rows: Vec<Vec<(usize, Complex<f64>)>> = vec![Vec::new(); dim];
        for (row, col, amp) in triplets {
            rows[row].push((col, amp));
        }
        let mut row_ptr = Vec::with_capacity(dim + 1);
        let mut col_ind = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for mut row in rows {
            row.sort_by_key(|&(col, _)| col);
            let mut entries = row.into_iter().peekable();
            while let Some((col, mut amp)) = entries.next() {
                while let Some(&(next_col, next_amp)) = entries.peek() {
                    if next_col != col {
                        break;
                    }
                    amp += next_amp;
                    entries.next();
                }
                if amp.norm() > DROP_TOLERANCE {
                    col_ind.push(col);
                    values.push(amp);
                }
            }
            row_ptr.push(col_ind.len());
        }
        SparseHamiltonian {
            dim,
            row_ptr,
            col_ind,
            values,
        }
    }

    #[inline(always)]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The number of stored matrix elements.
    #[inline(always)]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Element access for tests and consistency checks; O(log nnz(row)).
    pub fn get(&self, row: usize, col: usize) -> Result<Complex<f64>> {
        if row >= self.dim {
            return Err(KpmError::IndexOutOfRange {
                index: row,
                dim: self.dim,
            });
        }
        if col >= self.dim {
            return Err(KpmError::IndexOutOfRange {
                index: col,
                dim: self.dim,
            });
        }
        let cols = &self.col_ind[self.row_ptr[row]..self.row_ptr[row + 1]];
        Ok(match cols.binary_search(&col) {
            Ok(k) => self.values[self.row_ptr[row] + k],
            Err(_) => Complex::zero(),
        })
    }

    /// Iterate over all stored `(row, col, amplitude)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Complex<f64>)> + '_ {
        (0..self.dim).flat_map(move |row| {
            (self.row_ptr[row]..self.row_ptr[row + 1])
                .map(move |k| (row, self.col_ind[k], self.values[k]))
        })
    }

    /// `y = H x`, the inner kernel of the Chebyshev recursion.
    pub fn matvec(&self, x: &Array1<Complex<f64>>) -> Array1<Complex<f64>> {
        let y: Vec<Complex<f64>> = (0..self.dim)
            .into_par_iter()
            .map(|row| {
                let mut acc = Complex::zero();
                for k in self.row_ptr[row]..self.row_ptr[row + 1] {
                    acc += self.values[k] * x[self.col_ind[k]];
                }
                acc
            })
            .collect();
        Array1::from_vec(y)
    }

    /// A power-iteration estimate of the spectral radius, used to verify a
    /// caller-supplied scale factor. The start vector is deterministic so
    /// repeated runs agree.
    pub fn spectral_bound(&self, iterations: usize) -> f64 {
        if self.dim == 0 || self.nnz() == 0 {
            return 0.0;
        }
        let mut v = Array1::from_shape_fn(self.dim, |i| {
            Complex::new(1.0 + (i % 7) as f64, ((i % 3) as f64) - 1.0)
        });
        let norm = v.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
        v.mapv_inplace(|z| z / norm);
        let mut bound = 0.0;
        for _ in 0..iterations {
            let w = self.matvec(&v);
            let norm = w.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
            if norm == 0.0 {
                return 0.0;
            }
            bound = norm;
            v = w.mapv(|z| z / norm);
        }
        bound
    }
}
