//! Mesh data structure.
//!
//! Stores nodal coordinates and triangle connectivity as handed over by a
//! mesher. Connectivity is validated on insertion so that bad indices fail
//! here instead of surfacing later as a linear-algebra failure.

use crate::config::{GeometryParams, MeshParams};
use crate::element::{DOFS_PER_ELEMENT, NODES_PER_ELEMENT};
use crate::error::{Error, Result};
use crate::types::{dof_x, dof_y, Point2, DOFS_PER_NODE};

/// Node indices of a 3-node triangle (0-based, CW or CCW).
pub type Triangle = [usize; NODES_PER_ELEMENT];

/// Triangular finite element mesh in the x-y plane.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Nodal coordinates.
    nodes: Vec<Point2>,
    /// Element connectivity.
    elements: Vec<Triangle>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(n_nodes: usize, n_elements: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(n_nodes),
            elements: Vec::with_capacity(n_elements),
        }
    }

    /// Build a mesh from raw mesher output.
    ///
    /// # Errors
    ///
    /// [`Error::NodeIndexOutOfBounds`] for the first element that references
    /// a missing node.
    pub fn from_arrays(nodes: Vec<Point2>, elements: Vec<Triangle>) -> Result<Self> {
        let mut mesh = Self {
            nodes,
            elements: Vec::with_capacity(elements.len()),
        };
        for element in elements {
            mesh.add_element(element)?;
        }
        Ok(mesh)
    }

    /// Add a node to the mesh, returning its index.
    pub fn add_node(&mut self, point: Point2) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(point);
        idx
    }

    /// Add multiple nodes at once.
    pub fn add_nodes(&mut self, points: impl IntoIterator<Item = Point2>) {
        self.nodes.extend(points);
    }

    /// Add a triangle to the mesh, returning its index.
    pub fn add_element(&mut self, nodes: Triangle) -> Result<usize> {
        let idx = self.elements.len();
        for &node in &nodes {
            if node >= self.nodes.len() {
                return Err(Error::NodeIndexOutOfBounds {
                    element: idx,
                    node,
                    n_nodes: self.nodes.len(),
                });
            }
        }
        self.elements.push(nodes);
        Ok(idx)
    }

    /// Number of nodes in the mesh.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of elements in the mesh.
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// Number of global degrees of freedom (2 per node).
    pub fn n_dofs(&self) -> usize {
        DOFS_PER_NODE * self.nodes.len()
    }

    /// Get nodal coordinates.
    pub fn nodes(&self) -> &[Point2] {
        &self.nodes
    }

    /// Get a specific node's coordinates.
    pub fn node(&self, idx: usize) -> Option<&Point2> {
        self.nodes.get(idx)
    }

    /// Get element connectivity.
    pub fn elements(&self) -> &[Triangle] {
        &self.elements
    }

    /// Get coordinates for an element's nodes.
    pub fn element_coords(&self, elem_idx: usize) -> Option<[Point2; NODES_PER_ELEMENT]> {
        let elem = self.elements.get(elem_idx)?;
        Some(elem.map(|i| self.nodes[i]))
    }

    /// Global DOFs of an element, ordered [u1, v1, u2, v2, u3, v3].
    pub fn element_dofs(&self, elem_idx: usize) -> Option<[usize; DOFS_PER_ELEMENT]> {
        let [a, b, c] = *self.elements.get(elem_idx)?;
        Some([dof_x(a), dof_y(a), dof_x(b), dof_y(b), dof_x(c), dof_y(c)])
    }

    /// Compute mesh bounding box.
    pub fn bounds(&self) -> Option<(Point2, Point2)> {
        let first = *self.nodes.first()?;
        let (mut min, mut max) = (first, first);
        for node in &self.nodes[1..] {
            for i in 0..2 {
                min[i] = min[i].min(node[i]);
                max[i] = max[i].max(node[i]);
            }
        }
        Some((min, max))
    }

    /// Structured triangulation of the substrate + FGM block.
    ///
    /// Nodes are numbered row by row from the origin, so node 0 is the
    /// bottom-left corner. The substrate and the coating get their own row
    /// spacing and one node row lies exactly on `y = substrate_thickness`.
    /// Every rectangular cell is split into two counter-clockwise triangles
    /// along its rising diagonal.
    pub fn layered_grid(geometry: &GeometryParams, params: &MeshParams) -> Self {
        let nx = params.num_elements_x;
        let ny_sub = params.num_elements_y_substrate;
        let ny_fgm = params.num_elements_y_fgm;

        let xs: Vec<f64> = (0..=nx)
            .map(|i| geometry.width * i as f64 / nx as f64)
            .collect();
        let ys: Vec<f64> = (0..=ny_sub)
            .map(|j| geometry.substrate_thickness * j as f64 / ny_sub as f64)
            .chain((1..=ny_fgm).map(|j| {
                geometry.substrate_thickness + geometry.fgm_thickness * j as f64 / ny_fgm as f64
            }))
            .collect();

        let row = nx + 1;
        let n_cells = nx * (ys.len() - 1);
        let mut mesh = Self::with_capacity(row * ys.len(), 2 * n_cells);
        for &y in &ys {
            mesh.add_nodes(xs.iter().map(|&x| Point2::new(x, y)));
        }
        for j in 0..ys.len() - 1 {
            for i in 0..nx {
                let n00 = j * row + i;
                let n10 = n00 + 1;
                let n01 = n00 + row;
                let n11 = n01 + 1;
                mesh.elements.push([n00, n10, n11]);
                mesh.elements.push([n00, n11, n01]);
            }
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_node(Point2::new(0.0, 0.0));
        mesh.add_node(Point2::new(1.0, 0.0));
        mesh.add_node(Point2::new(0.0, 1.0));
        mesh.add_element([0, 1, 2]).unwrap();
        mesh
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = unit_triangle_mesh();
        assert_eq!(mesh.n_nodes(), 3);
        assert_eq!(mesh.n_elements(), 1);
        assert_eq!(mesh.n_dofs(), 6);
        assert_eq!(mesh.element_dofs(0), Some([0, 1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_invalid_node_index() {
        let mut mesh = Mesh::new();
        mesh.add_node(Point2::new(0.0, 0.0));

        let result = mesh.add_element([0, 1, 2]);
        assert!(matches!(
            result,
            Err(Error::NodeIndexOutOfBounds { element: 0, node: 1, n_nodes: 1 })
        ));
        assert_eq!(mesh.n_elements(), 0);
    }

    #[test]
    fn test_from_arrays_reports_offending_element() {
        let nodes = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        let result = Mesh::from_arrays(nodes, vec![[0, 1, 2], [2, 1, 9]]);
        assert!(matches!(
            result,
            Err(Error::NodeIndexOutOfBounds { element: 1, node: 9, n_nodes: 3 })
        ));
    }

    #[test]
    fn test_element_dofs_are_interleaved() {
        let mut mesh = unit_triangle_mesh();
        mesh.add_node(Point2::new(1.0, 1.0));
        mesh.add_element([1, 3, 2]).unwrap();
        assert_eq!(mesh.element_dofs(1), Some([2, 3, 6, 7, 4, 5]));
        assert_eq!(mesh.element_dofs(2), None);
    }

    #[test]
    fn test_bounds() {
        let mut mesh = Mesh::new();
        mesh.add_node(Point2::new(-1.0, -2.0));
        mesh.add_node(Point2::new(1.0, 2.0));
        mesh.add_node(Point2::new(0.0, 0.0));

        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Point2::new(-1.0, -2.0));
        assert_eq!(max, Point2::new(1.0, 2.0));
        assert!(Mesh::new().bounds().is_none());
    }

    #[test]
    fn test_layered_grid_layout() {
        let geometry = GeometryParams::default();
        let params = MeshParams {
            num_elements_x: 4,
            num_elements_y_fgm: 2,
            num_elements_y_substrate: 3,
        };
        let mesh = Mesh::layered_grid(&geometry, &params);

        assert_eq!(mesh.n_nodes(), 5 * 6);
        assert_eq!(mesh.n_elements(), 2 * 4 * 5);
        assert_eq!(mesh.node(0), Some(&Point2::new(0.0, 0.0)));

        // Row 3 is the interface, row 5 the top surface.
        assert_eq!(mesh.node(3 * 5).unwrap()[1], geometry.substrate_thickness);
        assert_eq!(mesh.node(5 * 5 + 4).unwrap(), &Point2::new(2.0, geometry.total_height()));

        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Point2::new(0.0, 0.0));
        assert_eq!(max, Point2::new(geometry.width, geometry.total_height()));
    }

    #[test]
    fn test_layered_grid_is_counter_clockwise() {
        let mesh = Mesh::layered_grid(
            &GeometryParams::default(),
            &MeshParams {
                num_elements_x: 3,
                num_elements_y_fgm: 1,
                num_elements_y_substrate: 2,
            },
        );
        for e in 0..mesh.n_elements() {
            let [p1, p2, p3] = mesh.element_coords(e).unwrap();
            let cross = (p2 - p1).perp(&(p3 - p1));
            assert!(cross > 0.0, "element {} is not counter-clockwise", e);
        }
    }
}
