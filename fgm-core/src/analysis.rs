//! Static contact analysis.
//!
//! Ties the pipeline together: material field, boundary classification and
//! load distribution, sparse assembly, constrained direct solve and stress
//! recovery. A single pass with no iteration; nothing is retained between
//! calls.

use crate::assembly::{apply_dirichlet, assemble};
use crate::boundary::{self, LoadCase, LoadWarning};
use crate::config::Params;
use crate::error::{Error, Result};
use crate::gradient;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::solver::{select_solver, SolveStats, SolverParams};
use crate::sparse::diagonal;
use crate::stress::{recover_stresses, StressField};
use crate::types::{dof_x, dof_y, Point2, DOFS_PER_NODE};
use log::{debug, info};
use serde::Serialize;

/// Result of one contact solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    /// Nodal displacements, interleaved `[u_x0, u_y0, u_x1, ...]`.
    pub displacements: Vec<f64>,
    /// Constant stress per element, in mesh order.
    pub stresses: StressField,
    /// Applied nodal forces, same layout as the displacements.
    pub forces: Vec<f64>,
    /// Nodes that carried indenter load.
    pub contact_nodes: Vec<usize>,
    /// Elements excluded from assembly because their area vanished.
    pub degenerate_elements: Vec<usize>,
    /// Recoverable problems found while setting up the load case.
    pub warnings: Vec<LoadWarning>,
    /// Linear solver statistics.
    pub stats: SolveStats,
}

impl Solution {
    /// Number of nodes in the solved mesh.
    pub fn n_nodes(&self) -> usize {
        self.displacements.len() / DOFS_PER_NODE
    }

    /// Displacement `[u_x, u_y]` of a node.
    pub fn node_displacement(&self, node: usize) -> Option<[f64; 2]> {
        if node >= self.n_nodes() {
            return None;
        }
        Some([
            self.displacements[dof_x(node)],
            self.displacements[dof_y(node)],
        ])
    }

    /// Largest nodal displacement magnitude.
    pub fn max_displacement(&self) -> f64 {
        self.displacements
            .chunks_exact(DOFS_PER_NODE)
            .map(|u| u[0].hypot(u[1]))
            .fold(0.0, f64::max)
    }

    /// Node coordinates displaced by `scale` times the solution.
    pub fn deformed_nodes(&self, mesh: &Mesh, scale: f64) -> Vec<Point2> {
        mesh.nodes()
            .iter()
            .zip(self.displacements.chunks_exact(DOFS_PER_NODE))
            .map(|(p, u)| p + Point2::new(u[0], u[1]) * scale)
            .collect()
    }

    /// Sum of the applied y-forces. Equals `-normal_force` when contact was found.
    pub fn applied_force_sum(&self) -> f64 {
        self.forces.iter().skip(1).step_by(DOFS_PER_NODE).sum()
    }

    /// Whether any node received indenter load.
    pub fn has_contact(&self) -> bool {
        !self.contact_nodes.is_empty()
    }
}

/// Assemble, constrain and solve one load case.
///
/// # Arguments
///
/// * `mesh` - Triangle mesh
/// * `materials` - One material sample per node
/// * `load_case` - Fixed DOFs and nodal forces
/// * `params` - Solver selection
///
/// # Errors
///
/// [`Error::SingularSystem`] if the fixed set is empty, a free DOF has no
/// stiffness (a node no element touches), the supports leave a rigid-body
/// mode free (see [`crate::solver::MIN_RECIPROCAL_CONDITION`]), or the
/// solution is not finite.
pub fn solve(
    mesh: &Mesh,
    materials: &[Material],
    load_case: &LoadCase,
    params: &SolverParams,
) -> Result<Solution> {
    let n_dofs = mesh.n_dofs();
    if load_case.forces.len() != n_dofs {
        return Err(Error::Solver(format!(
            "force vector has {} entries, mesh has {} DOFs",
            load_case.forces.len(),
            n_dofs
        )));
    }
    if let Some(dof) = load_case.forces.iter().position(|f| !f.is_finite()) {
        return Err(Error::Solver(format!("force on DOF {} is not finite", dof)));
    }
    if load_case.fixed_dofs.is_empty() {
        return Err(Error::SingularSystem(
            "no constrained DOFs; rigid-body motion is unrestrained".into(),
        ));
    }

    let mut system = assemble(mesh, materials)?;

    let diag = diagonal(&system.stiffness);
    if let Some(dof) =
        (0..n_dofs).find(|d| !load_case.fixed_dofs.contains(d) && !(diag[*d] > 0.0))
    {
        return Err(Error::SingularSystem(format!(
            "free DOF {} of node {} has no stiffness",
            dof,
            dof / DOFS_PER_NODE
        )));
    }

    let mut rhs = load_case.forces.clone();
    apply_dirichlet(&mut system.stiffness, &mut rhs, &load_case.fixed_dofs)?;

    let solver = select_solver(params, n_dofs);
    debug!("solving {} DOFs with {}", n_dofs, solver.name());
    let (displacements, stats) = solver.solve_with_stats(&system.stiffness, &rhs)?;

    if let Some(dof) = displacements.iter().position(|u| !u.is_finite()) {
        return Err(Error::SingularSystem(format!(
            "displacement of DOF {} is not finite",
            dof
        )));
    }

    let stresses = recover_stresses(mesh, materials, &displacements)?;

    Ok(Solution {
        displacements,
        stresses,
        forces: load_case.forces.clone(),
        contact_nodes: load_case.contact_nodes.clone(),
        degenerate_elements: system.degenerate_elements,
        warnings: load_case.warnings.clone(),
        stats,
    })
}

/// Run the full contact pipeline on a mesh.
///
/// Validates `params`, evaluates the graded material at every node, builds the
/// boundary conditions and indenter load, and solves.
pub fn run(mesh: &Mesh, params: &Params) -> Result<Solution> {
    params.validate()?;
    info!(
        "contact analysis: {} nodes, {} elements",
        mesh.n_nodes(),
        mesh.n_elements()
    );

    let materials = gradient::evaluate(mesh.nodes(), &params.material, &params.geometry);
    let load_case = boundary::assemble(mesh.nodes(), &params.geometry, &params.contact);
    info!(
        "{} fixed DOFs, {} contact nodes",
        load_case.fixed_dofs.len(),
        load_case.contact_nodes.len()
    );

    let solution = solve(mesh, &materials, &load_case, &params.solver)?;
    info!(
        "solved with {} in {:.3}s: max displacement {:.4e} m, max von Mises {:.4e} Pa",
        solution.stats.solver,
        solution.stats.time_seconds,
        solution.max_displacement(),
        solution.stresses.max_von_mises()
    );
    Ok(solution)
}
