//! FGM Core - contact analysis of functionally graded coatings
//!
//! Linear finite element solver for a flat indenter pressed into an
//! exponentially graded coating on a homogeneous substrate:
//! - Exponential shear-modulus gradient through the coating
//! - Constant strain triangles in plane stress
//! - Sparse matrix assembly (CSR format)
//! - Direct sparse and dense linear solvers
//!
//! # Architecture
//!
//! Data flows strictly forward through these stages:
//!
//! - [`gradient`]: Node position to local [`Material`]
//! - [`boundary`]: Fixed DOFs, contact nodes and the indenter load
//! - [`element`]: [`Tri3`] stiffness and stress recovery
//! - [`assembly`]: Global stiffness and Dirichlet constraints
//! - [`Solver`] trait: Linear system solution strategies
//! - [`analysis`]: The whole pipeline, returning a [`Solution`]
//!
//! # Example
//!
//! ```ignore
//! use fgm_core::{analysis, Mesh, Params};
//!
//! let params = Params::default();
//! let mesh = Mesh::layered_grid(&params.geometry, &params.mesh);
//! let solution = analysis::run(&mesh, &params)?;
//! println!("max von Mises: {:.3e} Pa", solution.stresses.max_von_mises());
//! ```

pub mod types;
pub mod config;
pub mod material;
pub mod gradient;
pub mod boundary;
pub mod element;
pub mod mesh;
pub mod sparse;
pub mod assembly;
pub mod solver;
pub mod stress;
pub mod analysis;
pub mod error;

pub use types::{Point2, StressComponent, StressSample};
pub use config::{ContactParams, GeometryParams, MaterialParams, MeshParams, Params};
pub use material::Material;
pub use boundary::{LoadCase, LoadWarning};
pub use element::Tri3;
pub use mesh::Mesh;
pub use sparse::CsrMatrix;
pub use solver::{Solver, SolverKind, SolverParams};
pub use stress::StressField;
pub use analysis::{run, solve, Solution};
pub use error::{Error, Result};
