//! Global stiffness assembly and constraint application.
//!
//! Element stiffness matrices are scattered into a triplet builder and
//! converted to CSR once. Degenerate triangles are skipped and reported.
//! Dirichlet constraints are then applied in place by row/column elimination
//! with identity substitution.

use crate::boundary::FixedDofs;
use crate::element::Tri3;
use crate::error::{Error, Result};
use crate::material::Material;
use crate::mesh::Mesh;
use crate::sparse::{CsrMatrix, TripletMatrix};
use log::{debug, warn};

/// Assembled global stiffness, before constraints.
pub struct AssembledSystem {
    /// Global stiffness matrix (2N x 2N).
    pub stiffness: CsrMatrix,
    /// Number of DOFs in the system.
    pub n_dofs: usize,
    /// Indices of elements skipped as degenerate, in mesh order.
    pub degenerate_elements: Vec<usize>,
}

/// Assemble the global stiffness matrix.
///
/// # Arguments
///
/// * `mesh` - Triangle mesh
/// * `materials` - One material sample per node
///
/// # Errors
///
/// Returns [`Error::Mesh`] when the material array does not match the node count.
pub fn assemble(mesh: &Mesh, materials: &[Material]) -> Result<AssembledSystem> {
    if materials.len() != mesh.n_nodes() {
        return Err(Error::Mesh(format!(
            "{} material samples for {} nodes",
            materials.len(),
            mesh.n_nodes()
        )));
    }

    let n_dofs = mesh.n_dofs();

    // 36 entries per element plus the structural diagonal
    let nnz_estimate = 36 * mesh.n_elements() + n_dofs;
    let mut triplet = TripletMatrix::with_capacity(n_dofs, n_dofs, nnz_estimate);
    let mut degenerate_elements = Vec::new();

    for (elem_idx, connectivity) in mesh.elements().iter().enumerate() {
        let coords = connectivity.map(|n| mesh.nodes()[n]);
        if Tri3::is_degenerate(&coords) {
            debug!("skipping degenerate element {} {:?}", elem_idx, connectivity);
            degenerate_elements.push(elem_idx);
            continue;
        }

        let element_materials = connectivity.map(|n| materials[n]);
        let ke = Tri3::stiffness(&coords, &element_materials);

        // Local order [u1, v1, u2, v2, u3, v3] maps to the same interleaved
        // global layout.
        let dofs = mesh
            .element_dofs(elem_idx)
            .ok_or_else(|| Error::Mesh(format!("element {} vanished", elem_idx)))?;
        triplet.add_submatrix(&dofs, &ke);
    }

    if !degenerate_elements.is_empty() {
        warn!(
            "{} of {} elements are degenerate and were excluded from assembly",
            degenerate_elements.len(),
            mesh.n_elements()
        );
    }

    triplet.add_structural_diagonal();
    let stiffness = triplet.to_csr();
    debug!(
        "assembled {} x {} stiffness with {} non-zeros",
        n_dofs,
        n_dofs,
        stiffness.nnz()
    );

    Ok(AssembledSystem {
        stiffness,
        n_dofs,
        degenerate_elements,
    })
}

/// Apply homogeneous Dirichlet constraints in place.
///
/// For every fixed DOF `d`: row `d` and column `d` are zeroed, `K[d][d] = 1`
/// and `F[d] = 0`. Symmetry is preserved and re-applying the same set is a
/// no-op.
///
/// # Errors
///
/// [`Error::Solver`] if a fixed DOF is out of range or has no diagonal
/// entry in the sparsity pattern.
pub fn apply_dirichlet(matrix: &mut CsrMatrix, rhs: &mut [f64], fixed: &FixedDofs) -> Result<()> {
    let n = matrix.nrows();
    if rhs.len() != n {
        return Err(Error::Solver(format!(
            "RHS length {} does not match matrix size {}",
            rhs.len(),
            n
        )));
    }

    let mut is_fixed = vec![false; n];
    for &dof in fixed {
        if dof >= n {
            return Err(Error::Solver(format!(
                "fixed DOF {} out of range for {} DOFs",
                dof, n
            )));
        }
        is_fixed[dof] = true;
        rhs[dof] = 0.0;
    }

    let mut has_diagonal = vec![false; n];
    let (row_offsets, col_indices, values) = matrix.csr_data_mut();
    for row in 0..n {
        for idx in row_offsets[row]..row_offsets[row + 1] {
            let col = col_indices[idx];
            if is_fixed[row] || is_fixed[col] {
                values[idx] = if row == col { 1.0 } else { 0.0 };
            }
            if row == col {
                has_diagonal[row] = true;
            }
        }
    }

    if let Some(dof) = fixed.iter().copied().find(|&d| !has_diagonal[d]) {
        return Err(Error::Solver(format!(
            "fixed DOF {} has no diagonal entry in the stiffness pattern",
            dof
        )));
    }

    Ok(())
}
