//! Per-vertex normal deviation.
//!
//! The deviation at a vertex is the mean angle between its normal and the
//! normals of its one-ring neighbors. Flat regions score near zero; creases
//! and noise score high, which makes the measure a cheap feature indicator
//! for visualization and for steering detection seeds away from flat areas.
//!
//! Vertex normals are read as stored, so the mesh needs current
//! `update_normals` state (a freshly built mesh does).

use crate::mesh::{HalfEdgeMesh, VertexId};
use crate::task::TaskPool;

/// Compute the mean one-ring normal angle for every vertex.
///
/// A vertex with no neighbors gets `0`.
pub fn normal_deviation(mesh: &HalfEdgeMesh) -> Vec<f64> {
    (0..mesh.num_vertices())
        .map(|idx| vertex_deviation(mesh, VertexId::new(idx)))
        .collect()
}

/// Compute normal deviation with the vertex range sharded across a
/// [`TaskPool`].
///
/// Produces output identical to [`normal_deviation`] for any pool size.
pub fn normal_deviation_pooled(mesh: &HalfEdgeMesh, pool: &TaskPool) -> Vec<f64> {
    let mut out = vec![0.0; mesh.num_vertices()];
    pool.run_on_slice(&mut out, |_, base, chunk| {
        for (i, slot) in chunk.iter_mut().enumerate() {
            *slot = vertex_deviation(mesh, VertexId::new(base + i));
        }
    });
    out
}

fn vertex_deviation(mesh: &HalfEdgeMesh, v: VertexId) -> f64 {
    let n = mesh.normal(v);
    let mut angle_sum = 0.0;
    let mut count = 0usize;

    for neighbor in mesh.vertex_neighbors(v) {
        let n_j = mesh.normal(neighbor);
        let cos_angle = n.dot(n_j).clamp(-1.0, 1.0);
        angle_sum += cos_angle.acos();
        count += 1;
    }

    if count == 0 {
        return 0.0;
    }
    angle_sum / count as f64
}
