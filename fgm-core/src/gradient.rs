//! Material gradient through the coating.
//!
//! The substrate is homogeneous. Inside the FGM layer the shear modulus decays
//! exponentially with depth from the top surface:
//!
//! ```text
//! G(y) = G_surface * exp(β * (y - (H_substrate + H_FGM)))
//! ```
//!
//! With `β = -ln(G_substrate / G_surface) / H_FGM` the profile meets the
//! substrate modulus exactly at the interface. Poisson's ratio is uniform, and
//! E = 2G(1 + ν) everywhere.

use crate::config::{GeometryParams, MaterialParams};
use crate::material::Material;
use crate::types::Point2;

/// Gradient constant β that makes G continuous at `y = H_substrate`.
pub fn compute_inhomogeneity_constant(material: &MaterialParams, geometry: &GeometryParams) -> f64 {
    let gamma = material.shear_modulus_substrate / material.shear_modulus_surface;
    -gamma.ln() / geometry.fgm_thickness
}

/// Evaluates per-node elastic properties for a substrate + FGM stack.
#[derive(Debug, Clone, Copy)]
pub struct GradedField {
    shear_modulus_surface: f64,
    shear_modulus_substrate: f64,
    poisson_ratio: f64,
    beta: f64,
    interface_y: f64,
    surface_y: f64,
}

impl GradedField {
    /// Build the field, deriving β when the configuration leaves it unset.
    pub fn new(material: &MaterialParams, geometry: &GeometryParams) -> Self {
        Self {
            shear_modulus_surface: material.shear_modulus_surface,
            shear_modulus_substrate: material.shear_modulus_substrate,
            poisson_ratio: material.poisson_ratio,
            beta: material.inhomogeneity(geometry),
            interface_y: geometry.substrate_thickness,
            surface_y: geometry.total_height(),
        }
    }

    /// Gradient constant in use.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Whether height `y` lies in the substrate. The interface row belongs to
    /// the FGM layer.
    pub fn in_substrate(&self, y: f64) -> bool {
        y < self.interface_y
    }

    /// Exponential FGM profile evaluated at `y`, regardless of region.
    pub fn fgm_shear_modulus(&self, y: f64) -> f64 {
        self.shear_modulus_surface * (self.beta * (y - self.surface_y)).exp()
    }

    /// Shear modulus at height `y`.
    pub fn shear_modulus_at(&self, y: f64) -> f64 {
        if self.in_substrate(y) {
            self.shear_modulus_substrate
        } else {
            self.fgm_shear_modulus(y)
        }
    }

    /// Material sample at point `p`.
    pub fn sample(&self, p: &Point2) -> Material {
        Material::from_shear_modulus(self.shear_modulus_at(p[1]), self.poisson_ratio)
    }

    /// Material sample for every node, in node order.
    pub fn evaluate(&self, nodes: &[Point2]) -> Vec<Material> {
        nodes.iter().map(|p| self.sample(p)).collect()
    }
}

/// Per-node material properties for the given node coordinates.
pub fn evaluate(
    nodes: &[Point2],
    material: &MaterialParams,
    geometry: &GeometryParams,
) -> Vec<Material> {
    GradedField::new(material, geometry).evaluate(nodes)
}
