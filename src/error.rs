//! Error types for polytri.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face is degenerate: it repeats a vertex, two of its boundary
    /// vertices project to the same point, or its points are collinear so
    /// no normal can be estimated.
    #[error("face {face} is degenerate (duplicate vertices or zero area)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// The boundary of a face crosses itself.
    #[error("face {face} has a self-intersecting boundary")]
    SelfIntersectingFace {
        /// The face index.
        face: usize,
    },

    /// An edge has more than two incident faces, or the same directed edge
    /// is used twice.
    #[error("edge ({v0}, {v1}) has more than two incident faces")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// Internal consistency check failed while rebuilding a face.
    ///
    /// This points at a triangulation or projection inconsistency rather
    /// than bad input, and is never skipped by a failure policy.
    #[error("invariant violated while triangulating face {face}: {details}")]
    InvariantViolation {
        /// The face index.
        face: usize,
        /// What was inconsistent.
        details: String,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// The mesh index type cannot address another element.
    #[error("{element} index space exhausted ({capacity} slots)")]
    IndexOverflow {
        /// Kind of element being added.
        element: &'static str,
        /// Number of addressable elements of the index type.
        capacity: usize,
    },

    /// Invalid mesh state for the requested operation.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create an invariant violation error for a face.
    pub fn invariant(face: usize, details: impl Into<String>) -> Self {
        MeshError::InvariantViolation {
            face,
            details: details.into(),
        }
    }

    /// Whether a failure policy may skip the face that produced this error.
    ///
    /// Only input degeneracies are recoverable; invariant violations and
    /// I/O errors always abort.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MeshError::DegenerateFace { .. } | MeshError::SelfIntersectingFace { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(MeshError::DegenerateFace { face: 3 }.is_recoverable());
        assert!(MeshError::SelfIntersectingFace { face: 3 }.is_recoverable());
        assert!(!MeshError::invariant(3, "missing slot").is_recoverable());
        assert!(!MeshError::EmptyMesh.is_recoverable());
    }

    #[test]
    fn test_display() {
        let err = MeshError::invariant(7, "face slot 2 is empty");
        assert_eq!(
            err.to_string(),
            "invariant violated while triangulating face 7: face slot 2 is empty"
        );
    }
}
