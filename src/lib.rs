//! # prism
//!
//! A connectivity-aware triangle-mesh processing library: half-edge meshes
//! with discrete curvature estimation, RANSAC-style geometric-primitive
//! detection, Laplacian consolidation, uniform vertex sampling, and an
//! explicit sharded task runner.
//!
//! ## Features
//!
//! - **Half-edge meshes**: arena-backed connectivity with full one-ring and
//!   face traversal, built from plain face-vertex lists
//! - **Curvature**: Gaussian (angle deficit) and mean (cotangent Laplacian)
//!   curvature per vertex
//! - **Primitive detection**: plane / sphere / cylinder / cone hypotheses
//!   scored by consensus over vertex positions and normals
//! - **Consolidation**: Laplacian averaging passes
//! - **Sampling**: deterministic farthest-point vertex sampling
//! - **Task runner**: fixed-size thread pool with sharded, disjoint-write
//!   batches
//!
//! ## Example
//!
//! ```
//! use prism::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//!
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//! let gaussian = prism::algo::curvature::gaussian_curvature(&mesh);
//! assert_eq!(gaussian.len(), mesh.num_vertices());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod detect;
pub mod error;
pub mod mesh;
pub mod task;

pub use error::{MeshError, Result};

// Re-export nalgebra since it appears throughout the public API.
pub use nalgebra;

/// Commonly used types and functions.
pub mod prelude {
    pub use crate::algo::Progress;
    pub use crate::detect::{
        detect_primitives, select_at_vertex, DetectionParams, PrimitiveKind, Shape,
        ShapeCandidate,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_triangles, to_face_vertex, BoundaryKind, HalfEdgeMesh, VertexId,
    };
    pub use crate::task::{Shard, TaskPool};
}
