//! Material property definitions.
//!
//! Isotropic linear elastic samples, one per mesh node. Elements average the
//! samples of their three nodes before building the constitutive matrix.

use crate::error::{Error, Result};
use crate::types::ConstitutiveMatrix;
use serde::{Deserialize, Serialize};

/// Local elastic properties at a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Young's modulus (Pa).
    pub youngs_modulus: f64,
    /// Poisson's ratio (dimensionless).
    pub poissons_ratio: f64,
}

impl Material {
    /// Create a new isotropic linear elastic material.
    ///
    /// # Arguments
    ///
    /// * `youngs_modulus` - Young's modulus E (Pa)
    /// * `poissons_ratio` - Poisson's ratio ν (dimensionless, 0 ≤ ν < 0.5)
    ///
    /// # Errors
    ///
    /// Returns error if material properties are physically invalid.
    pub fn new(youngs_modulus: f64, poissons_ratio: f64) -> Result<Self> {
        if !(youngs_modulus > 0.0) || !youngs_modulus.is_finite() {
            return Err(Error::InvalidMaterial(
                "Young's modulus must be positive".into(),
            ));
        }
        if !(0.0..0.5).contains(&poissons_ratio) {
            return Err(Error::InvalidMaterial(
                "Poisson's ratio must be in range [0, 0.5)".into(),
            ));
        }
        Ok(Self {
            youngs_modulus,
            poissons_ratio,
        })
    }

    /// Material with shear modulus `g`: E = 2G(1 + ν).
    pub fn from_shear_modulus(shear_modulus: f64, poissons_ratio: f64) -> Self {
        Self {
            youngs_modulus: 2.0 * shear_modulus * (1.0 + poissons_ratio),
            poissons_ratio,
        }
    }

    /// Shear modulus G = E / (2(1 + ν)).
    pub fn shear_modulus(&self) -> f64 {
        self.youngs_modulus / (2.0 * (1.0 + self.poissons_ratio))
    }

    /// Arithmetic mean of E and ν over a set of samples.
    ///
    /// First-order mixing: adequate while properties vary little across one
    /// element.
    pub fn average(samples: &[Material]) -> Self {
        let n = samples.len().max(1) as f64;
        let (e, nu) = samples.iter().fold((0.0, 0.0), |(e, nu), m| {
            (e + m.youngs_modulus, nu + m.poissons_ratio)
        });
        Self {
            youngs_modulus: e / n,
            poissons_ratio: nu / n,
        }
    }

    /// Plane stress constitutive matrix.
    ///
    /// Returns a 3x3 matrix for [σ_xx, σ_yy, τ_xy] = D * [ε_xx, ε_yy, γ_xy].
    pub fn constitutive_plane_stress(&self) -> ConstitutiveMatrix {
        let e = self.youngs_modulus;
        let nu = self.poissons_ratio;

        let factor = e / (1.0 - nu * nu);

        ConstitutiveMatrix::new(
            factor,         factor * nu, 0.0,
            factor * nu,    factor,      0.0,
            0.0,            0.0,         factor * (1.0 - nu) / 2.0,
        )
    }
}
