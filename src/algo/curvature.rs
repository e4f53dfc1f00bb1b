//! Discrete curvature estimation on meshes.
//!
//! This module computes per-vertex discrete curvature from the half-edge
//! connectivity:
//!
//! - **Gaussian curvature**: the angle deficit `2π − Σθ` of the one-ring,
//!   using each incident face exactly once.
//! - **Mean curvature**: the magnitude of the cotangent-weighted Laplacian,
//!   normalized by the one-ring face-area sum and signed against the vertex
//!   normal. Boundary vertices are defined to have mean curvature `0`.
//!
//! Both functions are read-only with respect to topology and positions and
//! return a result vector indexed densely by vertex id. The mean-curvature
//! formula reads cached face areas and vertex normals, so the mesh must have
//! current [`HalfEdgeMesh::update_face_areas`] and
//! [`HalfEdgeMesh::update_normals`] state (a freshly built mesh does).
//!
//! The default entry points shard the per-vertex loop across rayon; the
//! `_sequential` variants run single-threaded and produce identical output.

use std::f64::consts::PI;

use rayon::prelude::*;

use crate::mesh::{BoundaryKind, HalfEdgeMesh, VertexId};

/// Floor for sines in the cotangent weights; keeps degenerate angles from
/// blowing up the weight sum.
const SIN_EPSILON: f64 = 1e-5;

/// Compute Gaussian curvature (angle deficit) for all vertices.
///
/// For each vertex the angles subtended at its position by consecutive
/// one-ring neighbors are summed over the incident faces, skipping the null
/// face at a boundary; the result is `2π − Σθ`. A perfectly flat interior
/// patch yields `0`.
///
/// # Example
///
/// ```
/// use prism::algo::curvature::gaussian_curvature;
/// use prism::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// let curv = gaussian_curvature(&mesh);
/// assert_eq!(curv.len(), 3);
/// ```
pub fn gaussian_curvature(mesh: &HalfEdgeMesh) -> Vec<f64> {
    (0..mesh.num_vertices())
        .into_par_iter()
        .map(|idx| vertex_angle_deficit(mesh, VertexId::new(idx)))
        .collect()
}

/// Compute Gaussian curvature for all vertices (sequential version).
pub fn gaussian_curvature_sequential(mesh: &HalfEdgeMesh) -> Vec<f64> {
    (0..mesh.num_vertices())
        .map(|idx| vertex_angle_deficit(mesh, VertexId::new(idx)))
        .collect()
}

fn vertex_angle_deficit(mesh: &HalfEdgeMesh, v: VertexId) -> f64 {
    let p = *mesh.position(v);
    let mut angle_sum = 0.0;

    for he in mesh.vertex_halfedges(v) {
        if !mesh.face_of(he).is_valid() {
            continue;
        }
        // The angle at p in this face lies between the directions to the
        // edge's destination and to the following neighbor.
        let p1 = mesh.position(mesh.dest(he));
        let p2 = mesh.position(mesh.dest(mesh.next(he)));

        let d1 = p1 - p;
        let d2 = p2 - p;
        let n1 = d1.norm();
        let n2 = d2.norm();
        if n1 < 1e-12 || n2 < 1e-12 {
            continue;
        }

        let cos_angle = (d1.dot(&d2) / (n1 * n2)).clamp(-1.0, 1.0);
        angle_sum += cos_angle.acos();
    }

    2.0 * PI - angle_sum
}

/// Compute mean curvature for all vertices.
///
/// Interior vertices get the magnitude of the cotangent-weighted Laplacian
/// divided by the one-ring face-area sum, negated when the mean-curvature
/// vector points against the vertex normal. Vertices flagged
/// [`BoundaryKind::Boundary`] are short-circuited to `0`.
pub fn mean_curvature(mesh: &HalfEdgeMesh) -> Vec<f64> {
    (0..mesh.num_vertices())
        .into_par_iter()
        .map(|idx| vertex_mean_curvature(mesh, VertexId::new(idx)))
        .collect()
}

/// Compute mean curvature for all vertices (sequential version).
pub fn mean_curvature_sequential(mesh: &HalfEdgeMesh) -> Vec<f64> {
    (0..mesh.num_vertices())
        .map(|idx| vertex_mean_curvature(mesh, VertexId::new(idx)))
        .collect()
}

fn vertex_mean_curvature(mesh: &HalfEdgeMesh, v: VertexId) -> f64 {
    let vert = mesh.vertex(v);
    if vert.boundary == BoundaryKind::Boundary {
        return 0.0;
    }

    let p = vert.position;
    let mut weighted_sum = nalgebra::Vector3::zeros();
    let mut weight_total = 0.0;
    let mut area_sum = 0.0;

    for he in mesh.vertex_halfedges(v) {
        let f = mesh.face_of(he);
        if f.is_valid() {
            area_sum += mesh.face(f).area;
        }

        let p_j = *mesh.position(mesh.dest(he));

        // Cotangent of the angle opposite edge (v, j) in the face of `he`
        // plus the one in the twin's face.
        let mut w = 0.0;
        if f.is_valid() {
            let p_opp = mesh.position(mesh.dest(mesh.next(he)));
            w += cotangent_at(p_opp, &p_j, &p);
        }
        let twin = mesh.twin(he);
        if mesh.face_of(twin).is_valid() {
            let p_opp = mesh.position(mesh.dest(mesh.next(twin)));
            w += cotangent_at(p_opp, &p, &p_j);
        }

        weight_total += w;
        weighted_sum += p_j.coords * w;
    }

    if weight_total.abs() < 1e-12 || area_sum < 1e-12 {
        return 0.0;
    }

    let avg = weighted_sum / weight_total;
    let h_vector = p.coords - avg;
    let mut uh = h_vector.norm() / area_sum;
    if h_vector.dot(&vert.normal) < 0.0 {
        uh = -uh;
    }
    uh
}

/// Cotangent of the angle at `apex` in the triangle (apex, b, c), from
/// normalized directions with the sine floored at [`SIN_EPSILON`].
fn cotangent_at(
    apex: &nalgebra::Point3<f64>,
    b: &nalgebra::Point3<f64>,
    c: &nalgebra::Point3<f64>,
) -> f64 {
    let mut d0 = b - apex;
    let mut d1 = c - apex;
    let n0 = d0.norm();
    let n1 = d1.norm();
    if n0 < 1e-12 || n1 < 1e-12 {
        return 0.0;
    }
    d0 /= n0;
    d1 /= n1;

    let cos_v = d0.dot(&d1).clamp(-1.0, 1.0);
    let sin_v = (1.0 - cos_v * cos_v).sqrt().max(SIN_EPSILON);
    cos_v / sin_v
}
