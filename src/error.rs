//! Error types for prism.
//!
//! This module defines all error types used throughout the library.
//!
//! Numeric edge cases (degenerate one-rings, near-zero vectors, cosines that
//! drift outside `[-1, 1]`) are guarded locally inside the algorithms and are
//! never surfaced as errors; only structural misuse of the API (invalid mesh
//! input, an impossible sampling request) produces a [`MeshError`].

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

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// Two faces share the same directed edge (non-manifold or
    /// inconsistently wound input).
    #[error("directed edge ({v0}, {v1}) appears in more than one face")]
    NonManifoldEdge {
        /// Origin vertex of the duplicated directed edge.
        v0: usize,
        /// Destination vertex of the duplicated directed edge.
        v1: usize,
    },

    /// A sampling request asked for more vertices than the mesh has.
    #[error("requested {requested} samples but mesh has only {available} vertices")]
    SampleCountExceedsVertices {
        /// Number of samples requested.
        requested: usize,
        /// Number of vertices available.
        available: usize,
    },

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
}
