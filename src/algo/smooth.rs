//! Mesh consolidation by Laplacian averaging.
//!
//! [`simple_smooth`] runs one unweighted Laplacian pass: every vertex is
//! replaced by the centroid of its one-ring neighbors. Positions are read
//! from a snapshot taken before the pass, so the result does not depend on
//! vertex order. Repeated passes shrink the mesh; callers wanting stronger
//! smoothing loop the single pass themselves.
//!
//! The pass moves positions only. Cached normals, face areas, and the
//! bounding box go stale; callers refresh them with the mesh's `update_*`
//! methods when they need them again.

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::mesh::{HalfEdgeMesh, VertexId};

/// Run one unweighted Laplacian averaging pass over all vertices.
///
/// Each vertex moves to the centroid of its one-ring neighbors; an isolated
/// vertex (no neighbors) stays put. A vertex already at its ring centroid is
/// a fixed point of the pass.
///
/// # Example
///
/// ```
/// use prism::algo::smooth::simple_smooth;
/// use prism::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
///     Point3::new(0.5, 0.5, 0.8),
/// ];
/// let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
/// let mut mesh = build_from_triangles(&vertices, &faces).unwrap();
/// simple_smooth(&mut mesh);
/// ```
pub fn simple_smooth(mesh: &mut HalfEdgeMesh) {
    let num_vertices = mesh.num_vertices();

    // Snapshot-read, then write: the borrow inside the map is immutable, so
    // every vertex sees pre-pass positions.
    let new_positions: Vec<Point3<f64>> = {
        let mesh_ref = &*mesh;
        (0..num_vertices)
            .into_par_iter()
            .map(|i| ring_centroid(mesh_ref, VertexId::new(i)))
            .collect()
    };

    for (i, pos) in new_positions.into_iter().enumerate() {
        mesh.set_position(VertexId::new(i), pos);
    }
}

fn ring_centroid(mesh: &HalfEdgeMesh, v: VertexId) -> Point3<f64> {
    let mut sum = Vector3::zeros();
    let mut count = 0usize;

    for neighbor in mesh.vertex_neighbors(v) {
        sum += mesh.position(neighbor).coords;
        count += 1;
    }

    if count == 0 {
        return *mesh.position(v);
    }

    Point3::from(sum / count as f64)
}
