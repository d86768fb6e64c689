//! Error types for the FGM contact solver.

use thiserror::Error;

/// Result type alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up or solving a contact problem.
///
/// Recoverable conditions (degenerate elements, an empty contact set) are not
/// errors; they are reported as data on the solution.
#[derive(Error, Debug)]
pub enum Error {
    /// Mesh-related errors.
    #[error("mesh error: {0}")]
    Mesh(String),

    /// Element connectivity refers to a node that does not exist.
    #[error("element {element} references node {node}, but the mesh has {n_nodes} nodes")]
    NodeIndexOutOfBounds {
        element: usize,
        node: usize,
        n_nodes: usize,
    },

    /// Invalid material properties.
    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    /// Invalid configuration parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Solver errors (dimension mismatch, backend failure).
    #[error("solver error: {0}")]
    Solver(String),

    /// The constrained stiffness matrix is not invertible.
    #[error("singular system: {0}")]
    SingularSystem(String),
}
