//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation and related types
//! for representing and traversing triangle meshes.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], which represents a triangle mesh
//! using a half-edge (doubly-connected edge list) data structure with arena
//! storage: vertices, half-edges, and faces live in dense vectors and refer
//! to each other through integer handles ([`VertexId`], [`HalfEdgeId`],
//! [`FaceId`]). The mesh alone owns the arenas and frees them atomically.
//!
//! # Construction
//!
//! Meshes are constructed from face-vertex lists as produced by an external
//! importer or scan pipeline:
//!
//! ```
//! use prism::mesh::build_from_triangles;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//! ```

mod builder;
mod halfedge;
mod index;

pub use builder::{build_from_triangles, to_face_vertex};
pub use halfedge::{
    BoundaryKind, Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter,
};
pub use index::{FaceId, HalfEdgeId, VertexId};
