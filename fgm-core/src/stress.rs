//! Stress recovery from displacement solution.
//!
//! After solving Ku = f for displacements, this module computes element stresses.
//! The stress recovery pipeline:
//! 1. Loop through all elements in mesh order
//! 2. Extract element nodal displacements from global solution
//! 3. Compute strain: ε = B * u_e (strain-displacement relation)
//! 4. Compute stress: σ = D * ε (constitutive relation, node-averaged material)
//!
//! The constant strain triangle has a single stress state per element. Nodal
//! values for contour output come from [`StressField::nodal_average`].

use crate::element::Tri3;
use crate::error::{Error, Result};
use crate::material::Material;
use crate::mesh::Mesh;
use crate::types::{StressComponent, StressSample};
use serde::{Deserialize, Serialize};

/// Stress recovery results for the entire mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StressField {
    /// Element stresses indexed by element ID.
    pub stresses: Vec<StressSample>,
}

impl StressField {
    /// Number of elements with stress data.
    pub fn n_elements(&self) -> usize {
        self.stresses.len()
    }

    /// Maximum von Mises stress across all elements.
    pub fn max_von_mises(&self) -> f64 {
        self.stresses
            .iter()
            .map(StressSample::von_mises)
            .fold(0.0, f64::max)
    }

    /// Most compressive value of a component and the element holding it.
    pub fn min_component(&self, component: StressComponent) -> Option<(usize, f64)> {
        self.stresses
            .iter()
            .map(|s| s.component(component))
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Average element values onto the nodes.
    ///
    /// Each node receives the unweighted mean of the elements that reference
    /// it. Nodes not referenced by any element get zero.
    pub fn nodal_average(&self, mesh: &Mesh, component: StressComponent) -> Vec<f64> {
        let mut sum = vec![0.0; mesh.n_nodes()];
        let mut count = vec![0usize; mesh.n_nodes()];

        for (connectivity, stress) in mesh.elements().iter().zip(&self.stresses) {
            let value = stress.component(component);
            for &node in connectivity {
                sum[node] += value;
                count[node] += 1;
            }
        }

        sum.iter()
            .zip(&count)
            .map(|(&s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
            .collect()
    }
}

/// Recover stresses from displacement solution.
///
/// This is the main entry point for stress recovery. Given a mesh, the nodal
/// material samples and the solved displacement vector, it computes the
/// constant stress of every element. Degenerate elements get zero stress.
///
/// # Arguments
///
/// * `mesh` - The finite element mesh
/// * `materials` - One material sample per node
/// * `displacements` - Global displacement vector from solver (n_nodes * 2)
///
/// # Example
///
/// ```ignore
/// let displacements = solver.solve(&stiffness, &forces)?;
/// let field = recover_stresses(&mesh, &materials, &displacements)?;
/// println!("Max von Mises: {} Pa", field.max_von_mises());
/// ```
pub fn recover_stresses(
    mesh: &Mesh,
    materials: &[Material],
    displacements: &[f64],
) -> Result<StressField> {
    if displacements.len() != mesh.n_dofs() {
        return Err(Error::Solver(format!(
            "displacement vector has {} entries, mesh has {} DOFs",
            displacements.len(),
            mesh.n_dofs()
        )));
    }
    if materials.len() != mesh.n_nodes() {
        return Err(Error::Mesh(format!(
            "{} material samples for {} nodes",
            materials.len(),
            mesh.n_nodes()
        )));
    }

    let stresses = mesh
        .elements()
        .iter()
        .map(|connectivity| {
            let coords = connectivity.map(|n| mesh.nodes()[n]);
            let element_materials = connectivity.map(|n| materials[n]);
            let mut u_e = [0.0; 6];
            for (local, &node) in connectivity.iter().enumerate() {
                u_e[2 * local] = displacements[2 * node];
                u_e[2 * local + 1] = displacements[2 * node + 1];
            }
            Tri3::stress(&coords, &element_materials, &u_e)
        })
        .collect();

    Ok(StressField { stresses })
}
