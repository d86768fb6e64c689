//! Boundary constraints and indenter loading.
//!
//! Edge constraints come from an ordered rule list where the first matching
//! rule wins, so a node receives at most one edge constraint:
//!
//! | order | edge   | test    | fixed DOFs |
//! |-------|--------|---------|------------|
//! | 1     | bottom | `y ≈ 0` | x, y       |
//! | 2     | left   | `x ≈ 0` | x          |
//! | 3     | right  | `x ≈ W` | x          |
//!
//! Keeping the bottom rule first clamps both bottom corners fully instead of
//! leaving them on rollers. Contact detection on the top surface runs
//! independently of the edge rules. DOFs 0 and 1 are always fixed as well.

use crate::config::{ContactParams, GeometryParams};
use crate::types::{dof_x, dof_y, Point2, DOFS_PER_NODE};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Absolute tolerance on coordinate comparisons.
pub const GEOMETRY_TOLERANCE: f64 = 1e-6;

/// Sorted, deduplicated set of constrained global DOFs.
pub type FixedDofs = BTreeSet<usize>;

/// Which displacement components an edge rule fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Both u_x and u_y fixed.
    Clamped,
    /// Only u_x fixed.
    RollerX,
}

impl Constraint {
    fn dofs(self, node: usize) -> impl Iterator<Item = usize> {
        let y = match self {
            Constraint::Clamped => Some(dof_y(node)),
            Constraint::RollerX => None,
        };
        std::iter::once(dof_x(node)).chain(y)
    }
}

/// Straight domain edge used by a rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edge {
    /// Horizontal line `y = value`.
    Horizontal(f64),
    /// Vertical line `x = value`.
    Vertical(f64),
}

impl Edge {
    fn contains(self, p: &Point2, tol: f64) -> bool {
        match self {
            Edge::Horizontal(y) => (p[1] - y).abs() <= tol,
            Edge::Vertical(x) => (p[0] - x).abs() <= tol,
        }
    }
}

/// One entry of the ordered edge rule list.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRule {
    pub name: &'static str,
    pub edge: Edge,
    pub constraint: Constraint,
}

/// Edge rules for the indentation block, in precedence order.
pub fn edge_rules(geometry: &GeometryParams) -> Vec<BoundaryRule> {
    vec![
        BoundaryRule {
            name: "bottom",
            edge: Edge::Horizontal(0.0),
            constraint: Constraint::Clamped,
        },
        BoundaryRule {
            name: "left",
            edge: Edge::Vertical(0.0),
            constraint: Constraint::RollerX,
        },
        BoundaryRule {
            name: "right",
            edge: Edge::Vertical(geometry.width),
            constraint: Constraint::RollerX,
        },
    ]
}

/// First rule matching `p`, if any.
pub fn classify<'a>(rules: &'a [BoundaryRule], p: &Point2, tol: f64) -> Option<&'a BoundaryRule> {
    rules.iter().find(|rule| rule.edge.contains(p, tol))
}

/// Non-fatal conditions found while building the load case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoadWarning {
    /// No top-surface node fell inside the contact region; no force was applied.
    NoContactNodes { region: [f64; 2] },
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadWarning::NoContactNodes { region } => write!(
                f,
                "no contact nodes found in region [{}, {}]; force vector is zero",
                region[0], region[1]
            ),
        }
    }
}

/// Constraints and external loads for one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadCase {
    /// Constrained DOFs (sorted, deduplicated).
    pub fixed_dofs: FixedDofs,
    /// Global force vector, length 2N.
    pub forces: Vec<f64>,
    /// Nodes that received a share of the indenter force.
    pub contact_nodes: Vec<usize>,
    /// Recoverable problems the caller must be able to see.
    pub warnings: Vec<LoadWarning>,
}

impl LoadCase {
    /// Whether any node carries indenter load.
    pub fn has_contact(&self) -> bool {
        !self.contact_nodes.is_empty()
    }

    /// Sum of the y-components of the force vector.
    pub fn total_vertical_force(&self) -> f64 {
        self.forces.iter().skip(1).step_by(2).sum()
    }
}

/// Classify boundary nodes and distribute the indenter force.
///
/// The normal force is split evenly over the contact nodes and applied in -y
/// (into the body).
pub fn assemble(nodes: &[Point2], geometry: &GeometryParams, contact: &ContactParams) -> LoadCase {
    let tol = GEOMETRY_TOLERANCE;
    let rules = edge_rules(geometry);
    let top = Edge::Horizontal(geometry.total_height());
    let [start, end] = contact.region(geometry);

    let mut fixed_dofs = FixedDofs::new();
    let mut contact_nodes = Vec::new();

    for (i, p) in nodes.iter().enumerate() {
        if let Some(rule) = classify(&rules, p, tol) {
            fixed_dofs.extend(rule.constraint.dofs(i));
        }

        if top.contains(p, tol) && (start - tol..=end + tol).contains(&p[0]) {
            contact_nodes.push(i);
        }
    }

    // Reference node pin against residual rigid-body translation.
    fixed_dofs.insert(0);
    fixed_dofs.insert(1);

    let mut forces = vec![0.0; DOFS_PER_NODE * nodes.len()];
    let mut warnings = Vec::new();
    if contact_nodes.is_empty() {
        warn!(
            "no contact nodes detected in contact region [{}, {}]",
            start, end
        );
        warnings.push(LoadWarning::NoContactNodes { region: [start, end] });
    } else {
        let per_node = contact.normal_force / contact_nodes.len() as f64;
        for &node in &contact_nodes {
            forces[dof_y(node)] = -per_node;
        }
    }

    debug!(
        "boundary: {} fixed DOFs, {} contact nodes",
        fixed_dofs.len(),
        contact_nodes.len()
    );

    LoadCase {
        fixed_dofs,
        forces,
        contact_nodes,
        warnings,
    }
}
