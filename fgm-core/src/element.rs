//! Finite element formulations.
//!
//! The solver uses a single element type, the 3-node constant strain
//! triangle in plane stress ([`Tri3`]). Material properties are sampled per
//! node and averaged over the element.
//!
//! # Submodules
//!
//! - [`tri3`] - Constant Strain Triangle stiffness and stress recovery

pub mod tri3;

pub use tri3::{Tri3, DEGENERATE_AREA};

/// Nodes per element.
pub const NODES_PER_ELEMENT: usize = 3;

/// Degrees of freedom per element.
pub const DOFS_PER_ELEMENT: usize = 6;
