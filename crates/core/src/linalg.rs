//! Convolution matrices and minimum-norm least squares

use crate::{buffer::Complex, CoreError, Result};
use nalgebra::{DMatrix, DVector, Dyn, SVD};
use tracing::debug;

/// Full convolution matrix of `kernel` with `columns` columns.
///
/// The result has `kernel.len() + columns - 1` rows and satisfies
/// `A * v == convolve(kernel, v)` for any `v` of length `columns`,
/// i.e. `A[i, j] = kernel[i - j]` where that index exists and zero
/// elsewhere.
pub fn convolution_matrix(kernel: &[Complex], columns: usize) -> DMatrix<Complex> {
    let rows = (kernel.len() + columns).saturating_sub(1);

    DMatrix::from_fn(rows, columns, |i, j| {
        i.checked_sub(j)
            .and_then(|k| kernel.get(k).copied())
            .unwrap_or_default()
    })
}

/// Least-squares solver for a fixed over-determined system matrix
///
/// The SVD is computed once; every [`solve`](Self::solve) discards
/// singular values below the relative cutoff and returns the
/// minimum-norm solution, so rank-deficient systems still solve.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    svd: SVD<Complex, Dyn, Dyn>,
    rows: usize,
    cols: usize,
    cutoff: f64,
}

impl LeastSquares {
    /// Decompose `matrix` for repeated solves
    pub fn new(matrix: DMatrix<Complex>) -> Result<Self> {
        let (rows, cols) = matrix.shape();
        if rows == 0 || cols == 0 {
            return Err(CoreError::LinAlg {
                msg: format!("cannot solve against an empty {}x{} matrix", rows, cols),
            });
        }

        let svd = SVD::new(matrix, true, true);

        // Same relative cutoff as LAPACK gelsd with rcond = eps * max(M, N)
        let largest = svd.singular_values.iter().copied().fold(0.0, f64::max);
        let cutoff = largest * rows.max(cols) as f64 * f64::EPSILON;

        let solver = Self { svd, rows, cols, cutoff };
        let rank = solver.rank();
        if rank < rows.min(cols) {
            debug!(rows, cols, rank, "rank-deficient system, using minimum-norm solution");
        }

        Ok(solver)
    }

    /// Number of equations
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of unknowns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Numerical rank under the solver's cutoff
    pub fn rank(&self) -> usize {
        self.svd
            .singular_values
            .iter()
            .filter(|&&value| value > self.cutoff)
            .count()
    }

    /// Solve `A * x = rhs` in the least-squares sense
    pub fn solve(&self, rhs: &[Complex]) -> Result<Vec<Complex>> {
        if rhs.len() != self.rows {
            return Err(CoreError::BufferSizeMismatch {
                expected: self.rows,
                actual: rhs.len(),
            });
        }

        let b = DVector::from_column_slice(rhs);
        let x = self
            .svd
            .solve(&b, self.cutoff)
            .map_err(|msg| CoreError::LinAlg { msg: msg.to_string() })?;

        Ok(x.iter().copied().collect())
    }
}
