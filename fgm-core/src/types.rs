//! Core data types for the 2D solver.
//!
//! This module defines fundamental types used throughout the crate:
//! - Geometric primitives (points in the x-y plane)
//! - In-plane stress samples
//! - Degree of freedom numbering

use nalgebra::{Matrix3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// A point in the x-y plane.
pub type Point2 = Vector2<f64>;

/// Plane stress constitutive matrix in Voigt notation.
///
/// Maps [ε_xx, ε_yy, γ_xy] to [σ_xx, σ_yy, τ_xy].
pub type ConstitutiveMatrix = Matrix3<f64>;

/// Degrees of freedom per node (u_x, u_y).
pub const DOFS_PER_NODE: usize = 2;

/// Global DOF index of the x-displacement of `node`.
#[inline]
pub fn dof_x(node: usize) -> usize {
    DOFS_PER_NODE * node
}

/// Global DOF index of the y-displacement of `node`.
#[inline]
pub fn dof_y(node: usize) -> usize {
    DOFS_PER_NODE * node + 1
}

/// In-plane stress component selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressComponent {
    SigmaXx,
    SigmaYy,
    TauXy,
}

/// Constant stress state of a plane element.
///
/// Components are ordered as: [σ_xx, σ_yy, τ_xy]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StressSample {
    pub sigma_xx: f64,
    pub sigma_yy: f64,
    pub tau_xy: f64,
}

impl StressSample {
    /// Create a stress sample from its three components.
    pub fn new(sigma_xx: f64, sigma_yy: f64, tau_xy: f64) -> Self {
        Self {
            sigma_xx,
            sigma_yy,
            tau_xy,
        }
    }

    /// Zero stress state.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build from a Voigt vector [σ_xx, σ_yy, τ_xy].
    pub fn from_voigt(v: &Vector3<f64>) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    /// Voigt vector [σ_xx, σ_yy, τ_xy].
    pub fn to_voigt(&self) -> Vector3<f64> {
        Vector3::new(self.sigma_xx, self.sigma_yy, self.tau_xy)
    }

    /// Select a single component.
    pub fn component(&self, component: StressComponent) -> f64 {
        match component {
            StressComponent::SigmaXx => self.sigma_xx,
            StressComponent::SigmaYy => self.sigma_yy,
            StressComponent::TauXy => self.tau_xy,
        }
    }

    /// Von Mises equivalent stress for a plane stress state (σ_zz = 0).
    pub fn von_mises(&self) -> f64 {
        let sx = self.sigma_xx;
        let sy = self.sigma_yy;
        let t = self.tau_xy;
        (sx * sx - sx * sy + sy * sy + 3.0 * t * t).sqrt()
    }
}
