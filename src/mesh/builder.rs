//! Mesh construction utilities.
//!
//! This module builds half-edge meshes from face-vertex lists, the form in
//! which an external importer or scanner pipeline hands geometry to the core.
//! The builder links twins, materializes boundary half-edges into loops, sets
//! boundary flags, and computes the initial normals, face areas, and bounding
//! box so a freshly built mesh is ready for the algorithms.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, HalfEdgeId, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and triangle faces.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices
///
/// # Returns
/// A half-edge mesh with boundary flags, normals, face areas, and bounding
/// box already computed, or an error if the input is invalid.
///
/// # Example
/// ```
/// use prism::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    // Validate vertex indices
    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        // Check for degenerate faces
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());

    // Add vertices
    let vertex_ids: Vec<VertexId> = vertices.iter().map(|&pos| mesh.add_vertex(pos)).collect();

    // Map from directed edge (v0, v1) to half-edge ID
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId> = HashMap::new();

    // First pass: create all half-edges and faces
    for face in faces {
        let v0 = face[0];
        let v1 = face[1];
        let v2 = face[2];

        let he0 = HalfEdgeId::new(mesh.num_halfedges());
        let he1 = HalfEdgeId::new(mesh.num_halfedges() + 1);
        let he2 = HalfEdgeId::new(mesh.num_halfedges() + 2);

        for _ in 0..3 {
            mesh.halfedges.push(super::halfedge::HalfEdge::new());
        }

        let face_id = FaceId::new(mesh.num_faces());
        mesh.faces.push(super::halfedge::Face::new(he0));

        // Half-edge connectivity within the face (counter-clockwise)
        {
            let he = mesh.halfedge_mut(he0);
            he.origin = vertex_ids[v0];
            he.next = he1;
            he.prev = he2;
            he.face = face_id;
        }
        {
            let he = mesh.halfedge_mut(he1);
            he.origin = vertex_ids[v1];
            he.next = he2;
            he.prev = he0;
            he.face = face_id;
        }
        {
            let he = mesh.halfedge_mut(he2);
            he.origin = vertex_ids[v2];
            he.next = he0;
            he.prev = he1;
            he.face = face_id;
        }

        // Set vertex half-edges (overwritten for shared vertices)
        mesh.vertex_mut(vertex_ids[v0]).halfedge = he0;
        mesh.vertex_mut(vertex_ids[v1]).halfedge = he1;
        mesh.vertex_mut(vertex_ids[v2]).halfedge = he2;

        // Record edges for twin linking. A directed edge may appear in at
        // most one face; a second occurrence would evict the first half-edge
        // and leave it without a twin.
        for (a, b, he) in [(v0, v1, he0), (v1, v2, he1), (v2, v0, he2)] {
            if edge_map.insert((a, b), he).is_some() {
                return Err(MeshError::NonManifoldEdge { v0: a, v1: b });
            }
        }
    }

    // Second pass: link twins, creating boundary half-edges for unmatched edges
    for (&(v0, v1), &he) in &edge_map {
        if let Some(&twin) = edge_map.get(&(v1, v0)) {
            mesh.halfedge_mut(he).twin = twin;
        } else {
            let boundary_he = HalfEdgeId::new(mesh.num_halfedges());
            mesh.halfedges.push(super::halfedge::HalfEdge::new());

            mesh.halfedge_mut(he).twin = boundary_he;
            {
                let bhe = mesh.halfedge_mut(boundary_he);
                bhe.origin = vertex_ids[v1];
                bhe.twin = he;
                // Face stays invalid (boundary)
            }
        }
    }

    // Third pass: link boundary half-edges into loops
    link_boundary_loops(&mut mesh);

    // Fourth pass: ensure boundary vertices point to boundary half-edges, so
    // the one-ring walk covers the full ring before it wraps
    fix_boundary_vertex_halfedges(&mut mesh);

    // Derived data for a freshly imported mesh
    mesh.update_boundary_flags();
    mesh.update_normals();
    mesh.update_face_areas();
    mesh.update_bounding_box();

    Ok(mesh)
}

/// Link boundary half-edges into proper loops.
fn link_boundary_loops(mesh: &mut HalfEdgeMesh) {
    let boundary_hes: Vec<HalfEdgeId> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    // Group by origin vertex for quick lookup
    let mut outgoing: HashMap<usize, HalfEdgeId> = HashMap::new();
    for he in &boundary_hes {
        let origin = mesh.origin(*he).index();
        outgoing.insert(origin, *he);
    }

    // The next boundary half-edge starts where this one ends
    for &he in &boundary_hes {
        let dest = mesh.dest(he).index();
        if let Some(&next_he) = outgoing.get(&dest) {
            mesh.halfedge_mut(he).next = next_he;
            mesh.halfedge_mut(next_he).prev = he;
        }
    }
}

/// Ensure boundary vertices point to a boundary half-edge.
fn fix_boundary_vertex_halfedges(mesh: &mut HalfEdgeMesh) {
    for vid in mesh.vertex_ids().collect::<Vec<_>>() {
        let start_he = mesh.vertex(vid).halfedge;
        if !start_he.is_valid() {
            continue;
        }

        // Walk around the vertex with the same twin -> next step the
        // traversal iterator uses
        let mut he = start_he;
        loop {
            if mesh.is_boundary_halfedge(he) {
                mesh.vertex_mut(vid).halfedge = he;
                break;
            }
            he = mesh.next(mesh.twin(he));
            if he == start_he {
                break;
            }
        }
    }
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Returns (vertices, faces) tuple.
pub fn to_face_vertex(mesh: &HalfEdgeMesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let vertices: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();

    let faces: Vec<[usize; 3]> = mesh
        .face_ids()
        .map(|f| {
            let [v0, v1, v2] = mesh.face_triangle(f);
            [v0.index(), v1.index(), v2.index()]
        })
        .collect();

    (vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::BoundaryKind;

    fn single_triangle() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2]];
        (vertices, faces)
    }

    fn two_triangles() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        // Two triangles sharing an edge
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3]];
        (vertices, faces)
    }

    #[test]
    fn test_single_triangle() {
        let (vertices, faces) = single_triangle();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 1);
        // 3 interior half-edges + 3 boundary half-edges
        assert_eq!(mesh.num_halfedges(), 6);
        assert!(mesh.is_valid());

        // All vertices should be flagged boundary
        for (_, v) in mesh.vertices() {
            assert_eq!(v.boundary, BoundaryKind::Boundary);
        }
    }

    #[test]
    fn test_two_triangles() {
        let (vertices, faces) = two_triangles();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        // 6 interior half-edges + 4 boundary half-edges
        assert_eq!(mesh.num_halfedges(), 10);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_closed_mesh_all_interior() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_halfedges(), 12);
        for (_, v) in mesh.vertices() {
            assert_eq!(v.boundary, BoundaryKind::Interior);
        }
    }

    #[test]
    fn test_roundtrip() {
        let (vertices, faces) = two_triangles();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        let (out_verts, out_faces) = to_face_vertex(&mesh);

        assert_eq!(vertices.len(), out_verts.len());
        assert_eq!(faces.len(), out_faces.len());

        for (v_in, v_out) in vertices.iter().zip(out_verts.iter()) {
            assert!((v_in - v_out).norm() < 1e-10);
        }
    }

    #[test]
    fn test_invalid_vertex_index() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let faces = vec![[0, 1, 2]]; // Indices 1 and 2 are invalid

        let result = build_from_triangles(&vertices, &faces);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { face: 0, vertex: 1 })
        ));
    }

    #[test]
    fn test_degenerate_face() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let faces = vec![[0, 0, 2]]; // Degenerate: v0 == v1

        let result = build_from_triangles(&vertices, &faces);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));
    }

    #[test]
    fn test_nonmanifold_directed_edge_rejected() {
        // Faces [0, 1, 2] and [0, 1, 3] both contain directed edge (0, 1);
        // accepting the second would leave the first half-edge twinless and
        // break every one-ring walk through it.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [0, 1, 3]];

        let result = build_from_triangles(&vertices, &faces);
        assert!(matches!(
            result,
            Err(MeshError::NonManifoldEdge { v0: 0, v1: 1 })
        ));
    }

    #[test]
    fn test_empty_faces() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let result = build_from_triangles(&vertices, &[]);
        assert!(matches!(result, Err(MeshError::EmptyMesh)));
    }
}
