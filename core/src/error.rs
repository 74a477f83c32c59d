use std::time::Duration;

use thiserror::Error;

use crate::periodic_table::ElementType;

/// Errors produced while building molecules, evaluating energies or optimizing geometries.
///
/// Optimizers that run out of iterations do not return an error. They report
/// `converged: false` in their outcome instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The molecule violates a structural or electronic invariant.
    #[error("invalid molecule: {0}")]
    InvalidMolecule(String),

    #[error("atom index {index} is out of range for a molecule with {n_atoms} atoms")]
    AtomIndexOutOfRange { index: usize, n_atoms: usize },

    #[error("unknown element symbol `{0}`")]
    UnknownElement(String),

    #[error("unknown basis set `{0}`")]
    UnknownBasisSet(String),

    #[error("failed to parse basis set: {0}")]
    BasisSetParse(String),

    #[error("basis set has no functions for element {0:?}")]
    MissingBasis(ElementType),

    /// The geometry cannot be described by the basis, e.g. two atoms on top of each other.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("self consistent field iteration did not converge after {iterations} iterations")]
    ScfNotConverged { iterations: usize },

    #[error("energy evaluation exceeded its time limit of {0:?}")]
    Timeout(Duration),

    #[error("determinant space of {determinants} determinants exceeds the limit of {limit}")]
    DeterminantSpaceTooLarge { determinants: usize, limit: usize },

    #[error("energy evaluation produced a non-finite value")]
    NonFiniteEnergy,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
