//! Per-vertex gradient of a scalar field.
//!
//! [`scale_gradient`] differentiates a per-vertex scalar field over the
//! surface: the field is linear within each triangle, so every face has a
//! constant in-plane gradient, and each vertex averages the gradients of its
//! incident faces. Feature-indicator fields (curvature, normal deviation)
//! run through this to find where they change fastest.

use nalgebra::Vector3;

use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, HalfEdgeMesh, VertexId};

/// Compute the per-vertex surface gradient of a scalar field.
///
/// `field` holds one value per vertex, indexed by vertex id. Each vertex
/// gets the mean of its incident faces' in-plane gradients; a vertex with no
/// incident faces, and any degenerate face, contributes zero.
///
/// # Errors
///
/// [`MeshError::InvalidParameter`] when `field.len()` does not match the
/// vertex count.
pub fn scale_gradient(mesh: &HalfEdgeMesh, field: &[f64]) -> Result<Vec<Vector3<f64>>> {
    if field.len() != mesh.num_vertices() {
        return Err(MeshError::invalid_param(
            "field",
            field.len(),
            "length must match the vertex count",
        ));
    }

    let face_gradients: Vec<Vector3<f64>> = mesh
        .face_ids()
        .map(|f| face_gradient(mesh, f, field))
        .collect();

    let mut out = vec![Vector3::zeros(); mesh.num_vertices()];
    for (idx, slot) in out.iter_mut().enumerate() {
        let mut sum = Vector3::zeros();
        let mut count = 0usize;
        for f in mesh.vertex_faces(VertexId::new(idx)) {
            sum += face_gradients[f.index()];
            count += 1;
        }
        if count > 0 {
            *slot = sum / count as f64;
        }
    }

    Ok(out)
}

/// Constant gradient of the linear interpolant over one triangle.
fn face_gradient(mesh: &HalfEdgeMesh, f: FaceId, field: &[f64]) -> Vector3<f64> {
    let [v0, v1, v2] = mesh.face_triangle(f);
    let [p0, p1, p2] = mesh.face_positions(f);

    let n = (p1 - p0).cross(&(p2 - p0));
    let double_area = n.norm();
    if double_area < 1e-12 {
        return Vector3::zeros();
    }
    let n = n / double_area;

    // Each value is weighted by the rotated opposite edge.
    let g = n.cross(&(p2 - p1)) * field[v0.index()]
        + n.cross(&(p0 - p2)) * field[v1.index()]
        + n.cross(&(p1 - p0)) * field[v2.index()];
    g / double_area
}
