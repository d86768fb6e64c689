//! Sparse matrix operations.
//!
//! Uses CSR (Compressed Sparse Row) format for the global stiffness matrix.
//! Element contributions are collected as (row, col, value) triplets and
//! summed on conversion.

use nalgebra::Matrix6;
use nalgebra_sparse::coo::CooMatrix;
use nalgebra_sparse::csr::CsrMatrix as NalgebraCsr;

/// Compressed Sparse Row matrix.
pub type CsrMatrix = NalgebraCsr<f64>;

/// Builder for assembling a sparse matrix from triplets (COO format).
///
/// Accumulates (row, col, value) triplets and converts to CSR when complete.
pub struct TripletMatrix {
    n_rows: usize,
    n_cols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
}

impl TripletMatrix {
    /// Create a new triplet matrix builder.
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self::with_capacity(n_rows, n_cols, 0)
    }

    /// Create with estimated capacity.
    pub fn with_capacity(n_rows: usize, n_cols: usize, nnz_estimate: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            rows: Vec::with_capacity(nnz_estimate),
            cols: Vec::with_capacity(nnz_estimate),
            values: Vec::with_capacity(nnz_estimate),
        }
    }

    fn push(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.n_rows, "Row index out of bounds");
        debug_assert!(col < self.n_cols, "Column index out of bounds");
        self.rows.push(row);
        self.cols.push(col);
        self.values.push(value);
    }

    /// Add a value at (row, col). Duplicates are summed during conversion.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.push(row, col, value);
        }
    }

    /// Add a dense 6x6 element matrix at the given global DOF indices.
    ///
    /// This is the core operation for finite element assembly.
    pub fn add_submatrix(&mut self, dof_indices: &[usize; 6], submatrix: &Matrix6<f64>) {
        for (i, &row) in dof_indices.iter().enumerate() {
            for (j, &col) in dof_indices.iter().enumerate() {
                self.add(row, col, submatrix[(i, j)]);
            }
        }
    }

    /// Store an explicit (possibly zero) entry on every diagonal position.
    ///
    /// Constraint application rewrites diagonal entries in place, so each one
    /// must exist in the sparsity pattern even for DOFs no element touches.
    pub fn add_structural_diagonal(&mut self) {
        for i in 0..self.n_rows.min(self.n_cols) {
            self.push(i, i, 0.0);
        }
    }

    /// Number of stored triplets.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Convert to CSR format, summing duplicate entries.
    pub fn to_csr(self) -> CsrMatrix {
        // Every index was bounds-checked on insertion, so this cannot fail.
        let mut coo = CooMatrix::new(self.n_rows, self.n_cols);
        for ((row, col), value) in self.rows.into_iter().zip(self.cols).zip(self.values) {
            coo.push(row, col, value);
        }
        CsrMatrix::from(&coo)
    }
}

/// Diagonal of a square CSR matrix; absent entries read as zero.
pub fn diagonal(matrix: &CsrMatrix) -> Vec<f64> {
    let mut diag = vec![0.0; matrix.nrows()];
    for (i, row) in matrix.row_iter().enumerate() {
        for (&col, &value) in row.col_indices().iter().zip(row.values()) {
            if col == i {
                diag[i] += value;
            }
        }
    }
    diag
}

/// Sparse matrix-vector product y = A * x.
pub fn mul_vec(matrix: &CsrMatrix, x: &[f64]) -> Vec<f64> {
    debug_assert_eq!(matrix.ncols(), x.len());
    matrix
        .row_iter()
        .map(|row| {
            row.col_indices()
                .iter()
                .zip(row.values())
                .map(|(&col, &value)| value * x[col])
                .sum()
        })
        .collect()
}
