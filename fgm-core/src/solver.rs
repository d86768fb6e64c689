//! Linear system solvers.
//!
//! Provides direct solvers for the constrained system Ku = f.
//!
//! # Solver Backends
//!
//! - [`FaerCholeskySolver`]: Sparse Cholesky factorization using the faer library.
//!   Stiffness matrices are symmetric positive definite once constraints are
//!   applied, so this is the default for anything but tiny systems.
//! - [`DenseLuSolver`]: nalgebra dense LU, for small systems and cross-checks.
//!
//! Both backends solve the equilibrated system `S K S y = S f` (with
//! `S = diag(1/sqrt(K_ii))`) and share one singularity check: a fixed sample
//! right-hand side is solved alongside `f`, and the ratio of input to output
//! magnitude estimates the reciprocal condition number. Below
//! [`MIN_RECIPROCAL_CONDITION`] the system is reported as
//! [`Error::SingularSystem`]; a failed solve is never turned into a zero or
//! arbitrary displacement field.

use crate::error::{Error, Result};
use crate::sparse::{diagonal, CsrMatrix};
use faer::linalg::cholesky::llt::factor::LltError;
use faer::prelude::*;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};
use faer::sparse::linalg::LltError as SparseLltError;
use faer::sparse::{SparseColMat, SymbolicSparseColMat};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Smallest accepted reciprocal condition estimate of the equilibrated matrix.
///
/// Unrestrained rigid-body modes leave round-off sized pivots (around 1e-16)
/// after equilibration; well-posed meshes stay many orders above this.
pub const MIN_RECIPROCAL_CONDITION: f64 = 1e-12;

/// Linear solver interface.
pub trait Solver {
    /// Solve A X = B for every column of `rhs` with a single factorization.
    ///
    /// Backends report factorization breakdown (zero or non-positive pivot)
    /// as [`Error::SingularSystem`].
    fn solve_block(&self, matrix: &CsrMatrix, rhs: &DMatrix<f64>) -> Result<DMatrix<f64>>;

    /// Solver name for diagnostics.
    fn name(&self) -> &str;

    /// Solve the linear system Ax = b.
    ///
    /// # Arguments
    ///
    /// * `matrix` - System matrix (K), symmetric with a positive diagonal
    /// * `rhs` - Right-hand side vector (f)
    ///
    /// # Returns
    ///
    /// Solution vector (u)
    ///
    /// # Errors
    ///
    /// [`Error::SingularSystem`] when a diagonal entry is not positive, the
    /// factorization breaks down, or the equilibrated matrix is numerically
    /// singular.
    fn solve(&self, matrix: &CsrMatrix, rhs: &[f64]) -> Result<Vec<f64>> {
        let n = check_dimensions(matrix, rhs)?;
        if n == 0 {
            return Ok(vec![]);
        }

        let (scaled, scale) = equilibrate(matrix)?;
        let sample = sample_rhs(n);
        let block = DMatrix::from_fn(n, 2, |i, j| match j {
            0 => rhs[i] * scale[i],
            _ => sample[i],
        });

        let x = self.solve_block(&scaled, &block)?;
        let rcond = reciprocal_condition_estimate(&block, &x);
        if rcond.is_nan() || rcond < MIN_RECIPROCAL_CONDITION {
            return Err(Error::SingularSystem(format!(
                "equilibrated matrix is numerically singular (reciprocal condition estimate {:.1e})",
                rcond
            )));
        }

        Ok((0..n).map(|i| x[(i, 0)] * scale[i]).collect())
    }

    /// Solve and report timing and problem size.
    fn solve_with_stats(&self, matrix: &CsrMatrix, rhs: &[f64]) -> Result<(Vec<f64>, SolveStats)> {
        let start = Instant::now();
        let solution = self.solve(matrix, rhs)?;
        let stats = SolveStats {
            solver: self.name().to_string(),
            n_dofs: matrix.nrows(),
            nnz: matrix.nnz(),
            time_seconds: start.elapsed().as_secs_f64(),
        };
        Ok((solution, stats))
    }
}

/// Solver selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    /// Sparse Cholesky (faer).
    Cholesky,
    /// Dense LU (nalgebra).
    DenseLu,
    /// Dense LU up to `dense_threshold` DOFs, sparse Cholesky above.
    #[default]
    Auto,
}

/// Solver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// Solver backend to use.
    pub solver: SolverKind,
    /// Problem size up to which `Auto` picks the dense solver.
    pub dense_threshold: usize,
    /// Convergence tolerance, reserved for an iterative solver.
    pub tolerance: f64,
    /// Iteration cap, reserved for an iterative solver.
    pub max_iterations: usize,
    /// Contact penalty coefficient, reserved.
    pub penalty_coefficient: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            solver: SolverKind::Auto,
            dense_threshold: 200,
            tolerance: 1e-6,
            max_iterations: 500,
            penalty_coefficient: 1e9,
        }
    }
}

/// Solution statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveStats {
    /// Solver name used.
    pub solver: String,
    /// Number of equations.
    pub n_dofs: usize,
    /// Stored non-zeros of the system matrix.
    pub nnz: usize,
    /// Wall-clock time of the factorization and solve in seconds.
    pub time_seconds: f64,
}

fn check_dimensions(matrix: &CsrMatrix, rhs: &[f64]) -> Result<usize> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(Error::Solver("Matrix must be square".into()));
    }
    if n != rhs.len() {
        return Err(Error::Solver("RHS size mismatch".into()));
    }
    Ok(n)
}

/// Symmetric diagonal scaling to a unit diagonal.
///
/// Returns the scaled matrix and the factors `s_i = 1 / sqrt(A_ii)`.
fn equilibrate(matrix: &CsrMatrix) -> Result<(CsrMatrix, Vec<f64>)> {
    let diag = diagonal(matrix);
    if let Some(i) = diag.iter().position(|d| !(d.is_finite() && *d > 0.0)) {
        return Err(Error::SingularSystem(format!(
            "diagonal entry {} is {:e}, not positive",
            i, diag[i]
        )));
    }
    let scale: Vec<f64> = diag.iter().map(|d| 1.0 / d.sqrt()).collect();

    let mut scaled = matrix.clone();
    let (row_offsets, col_indices, values) = scaled.csr_data_mut();
    for row in 0..scale.len() {
        for idx in row_offsets[row]..row_offsets[row + 1] {
            values[idx] *= scale[row] * scale[col_indices[idx]];
        }
    }
    Ok((scaled, scale))
}

/// Deterministic right-hand side with entries of mixed sign in [-1, 1].
///
/// Generic enough to have a component along any near-null vector.
fn sample_rhs(n: usize) -> Vec<f64> {
    (0..n as u64)
        .map(|i| {
            let h = (i + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
            let u = (h >> 11) as f64 / (1u64 << 53) as f64;
            2.0 * u - 1.0
        })
        .collect()
}

/// Smallest `|b_j|_inf / |x_j|_inf` over the non-zero columns.
///
/// Bounded below by the reciprocal of `|A^-1|_inf`, so a near-null
/// direction shows up as a tiny value. Non-finite solutions give NaN.
fn reciprocal_condition_estimate(rhs: &DMatrix<f64>, x: &DMatrix<f64>) -> f64 {
    if x.iter().any(|v| !v.is_finite()) {
        return f64::NAN;
    }
    (0..rhs.ncols())
        .filter_map(|j| {
            let b = rhs.column(j).amax();
            (b > 0.0).then(|| b / x.column(j).amax())
        })
        .fold(f64::INFINITY, f64::min)
}

/// Direct solver using nalgebra dense LU factorization.
///
/// Converts the matrix to dense storage, so only suitable for small systems.
#[derive(Debug, Default)]
pub struct DenseLuSolver;

impl DenseLuSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for DenseLuSolver {
    fn solve_block(&self, matrix: &CsrMatrix, rhs: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        DMatrix::from(matrix)
            .lu()
            .solve(rhs)
            .ok_or_else(|| Error::SingularSystem("LU factorization hit a zero pivot".into()))
    }

    fn name(&self) -> &str {
        "nalgebra dense LU"
    }
}

/// Convert nalgebra-sparse CSR matrix to faer SparseColMat (CSC format).
///
/// Stiffness matrices are symmetric, so reading the CSR arrays column-wise is
/// valid. The explicit transposition below keeps the conversion correct for
/// any square matrix.
fn csr_to_faer_csc(csr: &CsrMatrix) -> SparseColMat<usize, f64> {
    let nrows = csr.nrows();
    let ncols = csr.ncols();

    let row_offsets = csr.row_offsets();
    let col_indices = csr.col_indices();
    let values = csr.values();

    // Count entries per column
    let mut col_offsets = vec![0usize; ncols + 1];
    for &col in col_indices {
        col_offsets[col + 1] += 1;
    }
    for i in 0..ncols {
        col_offsets[i + 1] += col_offsets[i];
    }

    // Scatter rows into columns; rows are visited in order, so row indices
    // end up sorted within each column.
    let nnz = values.len();
    let mut csc_row_indices = vec![0usize; nnz];
    let mut csc_values = vec![0.0f64; nnz];
    let mut col_positions = col_offsets[..ncols].to_vec();

    for row in 0..nrows {
        for idx in row_offsets[row]..row_offsets[row + 1] {
            let col = col_indices[idx];
            let pos = col_positions[col];
            csc_row_indices[pos] = row;
            csc_values[pos] = values[idx];
            col_positions[col] += 1;
        }
    }

    // SAFETY: column offsets are monotone, row indices are in bounds and
    // sorted within each column, and the CSR input has no duplicates.
    unsafe {
        SparseColMat::new(
            SymbolicSparseColMat::new_unchecked(nrows, ncols, col_offsets, None, csc_row_indices),
            csc_values,
        )
    }
}

/// Sparse Cholesky solver using the faer library.
///
/// Uses faer's sparse LLᵀ factorization of the lower triangle.
///
/// # Example
///
/// ```ignore
/// let solver = FaerCholeskySolver::new();
/// let solution = solver.solve(&stiffness_matrix, &force_vector)?;
/// ```
#[derive(Debug, Default)]
pub struct FaerCholeskySolver;

impl FaerCholeskySolver {
    /// Create a new sparse Cholesky solver.
    pub fn new() -> Self {
        Self
    }
}

impl Solver for FaerCholeskySolver {
    fn solve_block(&self, matrix: &CsrMatrix, rhs: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let n = matrix.nrows();
        let csc = csr_to_faer_csc(matrix);
        let csc_ref = csc.as_ref();

        let symbolic = SymbolicLlt::try_new(csc_ref.symbolic(), faer::Side::Lower)
            .map_err(|_| Error::Solver("Symbolic Cholesky analysis failed".into()))?;

        let llt = Llt::try_new_with_symbolic(symbolic, csc_ref, faer::Side::Lower).map_err(
            |e| match e {
                SparseLltError::Generic(err) => {
                    Error::Solver(format!("Sparse Cholesky error: {:?}", err))
                }
                SparseLltError::Numeric(LltError::NonPositivePivot { index }) => {
                    Error::SingularSystem(format!(
                        "stiffness matrix is not positive definite at pivot {}",
                        index
                    ))
                }
            },
        )?;

        let mut x = faer::Mat::from_fn(n, rhs.ncols(), |i, j| rhs[(i, j)]);
        llt.solve_in_place(x.as_mut());

        Ok(DMatrix::from_fn(n, rhs.ncols(), |i, j| x[(i, j)]))
    }

    fn name(&self) -> &str {
        "faer Sparse Cholesky (LLᵀ)"
    }
}

/// Select solver based on configuration and problem size.
pub fn select_solver(params: &SolverParams, n_dofs: usize) -> Box<dyn Solver> {
    match params.solver {
        SolverKind::Cholesky => Box::new(FaerCholeskySolver::new()),
        SolverKind::DenseLu => Box::new(DenseLuSolver::new()),
        SolverKind::Auto if n_dofs <= params.dense_threshold => Box::new(DenseLuSolver::new()),
        SolverKind::Auto => Box::new(FaerCholeskySolver::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::TripletMatrix;
    use approx::assert_relative_eq;

    fn spd_2x2() -> CsrMatrix {
        // [4 2; 2 3]
        let mut triplet = TripletMatrix::new(2, 2);
        triplet.add(0, 0, 4.0);
        triplet.add(0, 1, 2.0);
        triplet.add(1, 0, 2.0);
        triplet.add(1, 1, 3.0);
        triplet.to_csr()
    }

    fn solvers() -> Vec<Box<dyn Solver>> {
        vec![Box::new(DenseLuSolver::new()), Box::new(FaerCholeskySolver::new())]
    }

    #[test]
    fn test_simple_spd() {
        // Solution: x = 0.25, y = 1.5
        for solver in solvers() {
            let solution = solver.solve(&spd_2x2(), &[4.0, 5.0]).unwrap();
            assert_relative_eq!(solution[0], 0.25, epsilon = 1e-10);
            assert_relative_eq!(solution[1], 1.5, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_3x3_spd() {
        // A = [4 2 0; 2 5 2; 0 2 3], b = [2; 8; 5]
        // Solution: x = [-3/16, 11/8, 3/4]
        let mut triplet = TripletMatrix::new(3, 3);
        triplet.add(0, 0, 4.0);
        triplet.add(0, 1, 2.0);
        triplet.add(1, 0, 2.0);
        triplet.add(1, 1, 5.0);
        triplet.add(1, 2, 2.0);
        triplet.add(2, 1, 2.0);
        triplet.add(2, 2, 3.0);
        let matrix = triplet.to_csr();

        let expected = [-0.1875, 1.375, 0.75];
        for solver in solvers() {
            let solution = solver.solve(&matrix, &[2.0, 8.0, 5.0]).unwrap();
            for i in 0..3 {
                assert_relative_eq!(solution[i], expected[i], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_empty_system() {
        let matrix = TripletMatrix::new(0, 0).to_csr();
        for solver in solvers() {
            assert!(solver.solve(&matrix, &[]).unwrap().is_empty());
        }
    }

    #[test]
    fn test_rhs_mismatch() {
        for solver in solvers() {
            let result = solver.solve(&spd_2x2(), &[1.0, 2.0, 3.0]);
            assert!(matches!(result, Err(Error::Solver(_))));
        }
    }

    #[test]
    fn test_cholesky_not_positive_definite() {
        // Eigenvalues are 3 and -1
        let mut triplet = TripletMatrix::new(2, 2);
        triplet.add(0, 0, 1.0);
        triplet.add(0, 1, 2.0);
        triplet.add(1, 0, 2.0);
        triplet.add(1, 1, 1.0);

        let result = FaerCholeskySolver::new().solve(&triplet.to_csr(), &[1.0, 1.0]);
        assert!(matches!(result, Err(Error::SingularSystem(_))));
    }

    #[test]
    fn test_zero_row_is_singular() {
        let mut triplet = TripletMatrix::new(3, 3);
        triplet.add(0, 0, 2.0);
        triplet.add(1, 1, 2.0);
        triplet.add_structural_diagonal();
        let matrix = triplet.to_csr();

        for solver in solvers() {
            let result = solver.solve(&matrix, &[1.0, 1.0, 1.0]);
            assert!(
                matches!(result, Err(Error::SingularSystem(_))),
                "{} accepted a singular matrix",
                solver.name()
            );
        }
    }

    #[test]
    fn test_nearly_singular_is_rejected() {
        // [1 1; 1 1+1e-15] factors with positive pivots but is singular to
        // working precision.
        let mut triplet = TripletMatrix::new(2, 2);
        triplet.add(0, 0, 1.0);
        triplet.add(0, 1, 1.0);
        triplet.add(1, 0, 1.0);
        triplet.add(1, 1, 1.0 + 1e-15);
        let matrix = triplet.to_csr();

        for solver in solvers() {
            let result = solver.solve(&matrix, &[1.0, 0.0]);
            assert!(
                matches!(result, Err(Error::SingularSystem(_))),
                "{} accepted a nearly singular matrix: {:?}",
                solver.name(),
                result
            );
        }
    }

    #[test]
    fn test_badly_scaled_rows_are_accepted() {
        // Stiffness-sized block next to a unit identity row.
        let mut triplet = TripletMatrix::new(3, 3);
        triplet.add(0, 0, 4.0e16);
        triplet.add(0, 1, 2.0e16);
        triplet.add(1, 0, 2.0e16);
        triplet.add(1, 1, 3.0e16);
        triplet.add(2, 2, 1.0);
        let matrix = triplet.to_csr();

        for solver in solvers() {
            let solution = solver.solve(&matrix, &[4.0, 5.0, 0.0]).unwrap();
            assert_relative_eq!(solution[0], 0.25e-16, max_relative = 1e-10);
            assert_relative_eq!(solution[1], 1.5e-16, max_relative = 1e-10);
            assert_eq!(solution[2], 0.0);
        }
    }

    #[test]
    fn test_non_positive_diagonal_is_singular() {
        let mut triplet = TripletMatrix::new(2, 2);
        triplet.add(0, 0, 1.0);
        triplet.add(1, 1, -1.0);
        let matrix = triplet.to_csr();

        for solver in solvers() {
            let result = solver.solve(&matrix, &[1.0, 1.0]);
            assert!(matches!(result, Err(Error::SingularSystem(_))));
        }
    }

    #[test]
    fn test_fea_like_banded_matrix() {
        let mut triplet = TripletMatrix::new(6, 6);
        for i in 0..6 {
            triplet.add(i, i, 4.0);
        }
        for i in 0..5 {
            triplet.add(i, i + 1, -1.0);
            triplet.add(i + 1, i, -1.0);
        }
        let matrix = triplet.to_csr();
        let rhs = vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0];

        let dense_solution = DenseLuSolver::new().solve(&matrix, &rhs).unwrap();
        let sparse_solution = FaerCholeskySolver::new().solve(&matrix, &rhs).unwrap();
        for (a, b) in dense_solution.iter().zip(&sparse_solution) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }

        let residual: f64 = crate::sparse::mul_vec(&matrix, &sparse_solution)
            .iter()
            .zip(&rhs)
            .map(|(ax, b)| (ax - b).powi(2))
            .sum::<f64>()
            .sqrt();
        assert!(residual < 1e-10, "Residual too large: {}", residual);
    }

    #[test]
    fn test_solve_with_stats() {
        let (solution, stats) = FaerCholeskySolver::new()
            .solve_with_stats(&spd_2x2(), &[4.0, 5.0])
            .unwrap();
        assert_relative_eq!(solution[1], 1.5, epsilon = 1e-10);
        assert_eq!(stats.n_dofs, 2);
        assert_eq!(stats.nnz, 4);
        assert!(stats.time_seconds >= 0.0);
        assert!(stats.solver.contains("Cholesky"));
    }

    #[test]
    fn test_select_solver() {
        let params = SolverParams::default();
        assert_eq!(select_solver(&params, 100).name(), "nalgebra dense LU");
        assert_eq!(select_solver(&params, 1000).name(), "faer Sparse Cholesky (LLᵀ)");

        let params = SolverParams {
            solver: SolverKind::Cholesky,
            ..Default::default()
        };
        assert_eq!(select_solver(&params, 10).name(), "faer Sparse Cholesky (LLᵀ)");
    }
}
