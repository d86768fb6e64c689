//! Problem configuration.
//!
//! Each pipeline stage takes its own immutable parameter struct. All structs
//! deserialize with serde and default every missing field to the reference
//! indentation setup (2 m wide block, 0.1 m FGM coating on a 0.5 m substrate,
//! 0.2 m flat indenter pressed with 1 MN).

use crate::error::{Error, Result};
use crate::gradient::compute_inhomogeneity_constant;
use serde::{Deserialize, Serialize};

pub use crate::solver::{SolverKind, SolverParams};

/// Domain geometry.
///
/// The substrate occupies `0 <= y < substrate_thickness`, the FGM layer sits on
/// top of it up to `total_height()`. The domain spans `0 <= x <= width`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryParams {
    /// Width of the domain W (m).
    pub width: f64,
    /// Thickness of the FGM layer H_FGM (m).
    pub fgm_thickness: f64,
    /// Thickness of the homogeneous substrate H_substrate (m).
    pub substrate_thickness: f64,
    /// Width of the flat indenter (m).
    pub indenter_width: f64,
}

impl GeometryParams {
    /// y-coordinate of the loaded top surface.
    pub fn total_height(&self) -> f64 {
        self.substrate_thickness + self.fgm_thickness
    }

    /// Contact interval of an indenter centered on the top surface.
    pub fn centered_contact_region(&self) -> [f64; 2] {
        let mid = self.width / 2.0;
        let half = self.indenter_width / 2.0;
        [mid - half, mid + half]
    }
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            width: 2.0,
            fgm_thickness: 0.1,
            substrate_thickness: 0.5,
            indenter_width: 0.2,
        }
    }
}

/// Elastic properties of the coating and substrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialParams {
    /// Shear modulus at the top of the FGM layer (Pa).
    pub shear_modulus_surface: f64,
    /// Shear modulus of the substrate (Pa).
    pub shear_modulus_substrate: f64,
    /// Poisson's ratio, constant across the domain.
    pub poisson_ratio: f64,
    /// Exponential gradient constant β (1/m). Derived from the two moduli
    /// when absent.
    pub inhomogeneity_constant: Option<f64>,
}

impl MaterialParams {
    /// Gradient constant to use: the configured one, or the value that makes
    /// the shear modulus continuous at the substrate interface.
    pub fn inhomogeneity(&self, geometry: &GeometryParams) -> f64 {
        self.inhomogeneity_constant
            .unwrap_or_else(|| compute_inhomogeneity_constant(self, geometry))
    }
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            shear_modulus_surface: 80e9,
            shear_modulus_substrate: 15e9,
            poisson_ratio: 0.3,
            inhomogeneity_constant: None,
        }
    }
}

/// Indenter loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactParams {
    /// Total normal force pressed into the top surface (N).
    pub normal_force: f64,
    /// Coulomb friction coefficient. Not used by the frictionless load model.
    pub friction_coefficient: f64,
    /// x-interval `[start, end]` of the contact patch. Centered on the
    /// indenter when absent.
    pub contact_region: Option<[f64; 2]>,
}

impl ContactParams {
    /// Contact interval on the top surface.
    pub fn region(&self, geometry: &GeometryParams) -> [f64; 2] {
        self.contact_region
            .unwrap_or_else(|| geometry.centered_contact_region())
    }
}

impl Default for ContactParams {
    fn default() -> Self {
        Self {
            normal_force: 1e6,
            friction_coefficient: 0.3,
            contact_region: None,
        }
    }
}

/// Resolution of the structured layered grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshParams {
    /// Number of cells along the width.
    pub num_elements_x: usize,
    /// Number of cell rows inside the FGM layer.
    pub num_elements_y_fgm: usize,
    /// Number of cell rows inside the substrate.
    pub num_elements_y_substrate: usize,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            num_elements_x: 100,
            num_elements_y_fgm: 10,
            num_elements_y_substrate: 50,
        }
    }
}

/// Complete problem definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub geometry: GeometryParams,
    pub material: MaterialParams,
    pub contact: ContactParams,
    pub mesh: MeshParams,
    pub solver: SolverParams,
}

fn require(cond: bool, msg: impl FnOnce() -> String) -> Result<()> {
    if cond {
        Ok(())
    } else {
        Err(Error::InvalidConfig(msg()))
    }
}

impl Params {
    /// Check physical and geometric consistency.
    pub fn validate(&self) -> Result<()> {
        let g = &self.geometry;
        require(g.width > 0.0, || format!("width must be positive, got {}", g.width))?;
        require(g.fgm_thickness > 0.0, || {
            format!("FGM thickness must be positive, got {}", g.fgm_thickness)
        })?;
        require(g.substrate_thickness > 0.0, || {
            format!(
                "substrate thickness must be positive, got {}",
                g.substrate_thickness
            )
        })?;
        require(g.indenter_width >= 0.0, || {
            format!("indenter width must be non-negative, got {}", g.indenter_width)
        })?;

        let m = &self.material;
        require(m.shear_modulus_surface > 0.0, || {
            "surface shear modulus must be positive".into()
        })?;
        require(m.shear_modulus_substrate > 0.0, || {
            "substrate shear modulus must be positive".into()
        })?;
        require((0.0..0.5).contains(&m.poisson_ratio), || {
            format!("Poisson's ratio must be in [0, 0.5), got {}", m.poisson_ratio)
        })?;
        if let Some(beta) = m.inhomogeneity_constant {
            require(beta.is_finite(), || "inhomogeneity constant must be finite".into())?;
        }

        let c = &self.contact;
        require(c.normal_force.is_finite(), || "normal force must be finite".into())?;
        let [start, end] = c.region(g);
        require(start <= end, || {
            format!("contact region start {} exceeds end {}", start, end)
        })?;

        let mesh = &self.mesh;
        require(
            mesh.num_elements_x > 0
                && mesh.num_elements_y_fgm > 0
                && mesh.num_elements_y_substrate > 0,
            || format!("mesh cell counts must be positive, got {:?}", mesh),
        )?;

        Ok(())
    }
}
