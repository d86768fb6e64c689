//! 3-node plane stress triangle (Constant Strain Triangle, CST).
//!
//! # Coordinate System
//!
//! Nodes have (x, y) coordinates and 2 DOFs each: (u, v) displacements.
//! Element vectors and matrices are ordered [u1, v1, u2, v2, u3, v3].
//!
//! # Material
//!
//! Each node carries its own (E, ν) sample. The element uses the arithmetic
//! mean of the three samples, which is a first-order approximation for graded
//! materials.
//!
//! # Degenerate Elements
//!
//! Triangles with area below [`DEGENERATE_AREA`] produce a zero stiffness
//! matrix and zero stress. They are excluded from assembly, never fatal.

use crate::material::Material;
use crate::types::{Point2, StressSample};
use nalgebra::{Matrix6, SMatrix, Vector3, Vector6};

/// Area below which a triangle is treated as degenerate.
pub const DEGENERATE_AREA: f64 = 1e-6;

/// Strain-displacement matrix: [ε_xx, ε_yy, γ_xy] = B * u_e.
pub type BMatrix = SMatrix<f64, 3, 6>;

/// 3-node triangular plane stress element.
///
/// The simplest 2D element with:
/// - 3 nodes at vertices
/// - 2 DOFs per node (u, v displacements)
/// - Constant strain/stress within element
///
/// # Limitations
///
/// - Low accuracy - requires fine meshes
/// - Poor performance in bending-dominated problems
#[derive(Debug, Clone, Copy, Default)]
pub struct Tri3;

impl Tri3 {
    /// Signed area, positive for counter-clockwise node order.
    pub fn signed_area(coords: &[Point2; 3]) -> f64 {
        let [p1, p2, p3] = coords;
        0.5 * (p1[0] * (p2[1] - p3[1]) + p2[0] * (p3[1] - p1[1]) + p3[0] * (p1[1] - p2[1]))
    }

    /// Area of the triangle.
    pub fn area(coords: &[Point2; 3]) -> f64 {
        Self::signed_area(coords).abs()
    }

    /// Whether the triangle is too small to contribute.
    pub fn is_degenerate(coords: &[Point2; 3]) -> bool {
        !(Self::area(coords) >= DEGENERATE_AREA)
    }

    /// Element material: mean of the nodal samples.
    pub fn material(materials: &[Material; 3]) -> Material {
        Material::average(materials)
    }

    /// Compute the B-matrix (strain-displacement) for constant strain.
    ///
    /// Returns `None` for a degenerate triangle.
    pub fn b_matrix(coords: &[Point2; 3]) -> Option<BMatrix> {
        if Self::is_degenerate(coords) {
            return None;
        }

        let [p1, p2, p3] = coords;
        let (x1, y1) = (p1[0], p1[1]);
        let (x2, y2) = (p2[0], p2[1]);
        let (x3, y3) = (p3[0], p3[1]);

        // Shape function gradients (cyclic):
        // b_i = y_{i+1} - y_{i+2},  c_i = x_{i+2} - x_{i+1}
        let b = [y2 - y3, y3 - y1, y1 - y2];
        let c = [x3 - x2, x1 - x3, x2 - x1];

        // Signed 2A keeps strains correct for clockwise node order.
        let inv_2a = 1.0 / (2.0 * Self::signed_area(coords));

        let mut bm = BMatrix::zeros();
        for i in 0..3 {
            let col = 2 * i;
            bm[(0, col)] = b[i] * inv_2a; // ε_xx = ∂u/∂x
            bm[(1, col + 1)] = c[i] * inv_2a; // ε_yy = ∂v/∂y
            bm[(2, col)] = c[i] * inv_2a; // γ_xy = ∂u/∂y + ∂v/∂x
            bm[(2, col + 1)] = b[i] * inv_2a;
        }

        Some(bm)
    }

    /// Element stiffness matrix K_e = A * Bᵀ * D * B.
    ///
    /// Zero for a degenerate triangle.
    pub fn stiffness(coords: &[Point2; 3], materials: &[Material; 3]) -> Matrix6<f64> {
        let Some(b) = Self::b_matrix(coords) else {
            return Matrix6::zeros();
        };
        let d = Self::material(materials).constitutive_plane_stress();
        b.transpose() * (d * b) * Self::area(coords)
    }

    /// Engineering strain [ε_xx, ε_yy, γ_xy] for element displacements.
    pub fn strain(coords: &[Point2; 3], displacements: &[f64; 6]) -> Vector3<f64> {
        match Self::b_matrix(coords) {
            Some(b) => b * Vector6::from_row_slice(displacements),
            None => Vector3::zeros(),
        }
    }

    /// Element stress σ = D * B * u_e.
    ///
    /// Zero for a degenerate triangle.
    pub fn stress(
        coords: &[Point2; 3],
        materials: &[Material; 3],
        displacements: &[f64; 6],
    ) -> StressSample {
        if Self::is_degenerate(coords) {
            return StressSample::zero();
        }
        let d = Self::material(materials).constitutive_plane_stress();
        StressSample::from_voigt(&(d * Self::strain(coords, displacements)))
    }
}
