//! Error taxonomy for the sorting engine.
//!
//! Every failure here is either a precondition violation detected before any
//! state is created, or an internal invariant break in the assignment solver.
//! Neither is retried.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SortError {
    #[error("feature set is empty")]
    EmptyFeatureSet,

    #[error("label count mismatch: expected {expected}, got {actual}")]
    LabelCountMismatch { expected: usize, actual: usize },

    #[error("vector {row} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("vector {row} contains a non-finite value")]
    NonFiniteValue { row: usize },

    #[error("{n_vectors} vectors cannot be split into sites of {site_size}")]
    SiteSizeMismatch { n_vectors: usize, site_size: usize },

    #[error("grid {height}x{width} cannot hold exactly {sites} sites")]
    GridShapeMismatch {
        height: usize,
        width: usize,
        sites: usize,
    },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("assignment problem {rows}x{cols} has no perfect matching")]
    AssignmentInfeasible { rows: usize, cols: usize },
}

/// Result type for sorting operations
pub type SortResult<T> = Result<T, SortError>;
