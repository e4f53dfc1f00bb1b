//! Uniform vertex sampling.
//!
//! Farthest-point sampling over vertex positions: starting from vertex 0,
//! each round picks the vertex farthest from the set chosen so far. The
//! selection is fully deterministic, so downstream randomized consumers
//! (detection seeding) stay reproducible.

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, VertexId};

/// Pick `count` vertices spread evenly over the mesh.
///
/// Returns exactly `count` distinct vertex ids. `count == 0` yields an empty
/// vector; asking for more samples than the mesh has vertices is an error.
///
/// # Errors
///
/// [`MeshError::SampleCountExceedsVertices`] when
/// `count > mesh.num_vertices()`.
pub fn uniform_vertex_sampling(mesh: &HalfEdgeMesh, count: usize) -> Result<Vec<VertexId>> {
    let num_vertices = mesh.num_vertices();
    if count > num_vertices {
        return Err(MeshError::SampleCountExceedsVertices {
            requested: count,
            available: num_vertices,
        });
    }
    if count == 0 {
        return Ok(Vec::new());
    }

    let mut samples = Vec::with_capacity(count);
    // min_dist[i] tracks each vertex's squared distance to the closest
    // sample picked so far; picked vertices leave the farthest scan so
    // coincident positions cannot be selected twice.
    let mut min_dist = vec![f64::INFINITY; num_vertices];
    let mut picked = vec![false; num_vertices];

    let mut current = VertexId::new(0);
    picked[0] = true;
    samples.push(current);

    while samples.len() < count {
        let p = *mesh.position(current);

        let mut farthest = None;
        let mut farthest_dist = -1.0f64;
        for i in 0..num_vertices {
            if picked[i] {
                continue;
            }
            let d = (mesh.position(VertexId::new(i)) - p).norm_squared();
            if d < min_dist[i] {
                min_dist[i] = d;
            }
            if min_dist[i] > farthest_dist {
                farthest_dist = min_dist[i];
                farthest = Some(i);
            }
        }

        // count <= num_vertices, so an unpicked vertex always remains.
        let Some(next) = farthest else { break };
        picked[next] = true;
        current = VertexId::new(next);
        samples.push(current);
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;
    use nalgebra::Point3;

    fn tetrahedron() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_returns_exact_count_distinct() {
        let mesh = tetrahedron();
        for count in 0..=4 {
            let samples = uniform_vertex_sampling(&mesh, count).unwrap();
            assert_eq!(samples.len(), count);

            let mut ids: Vec<usize> = samples.iter().map(|v| v.index()).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), count, "samples must be distinct");
            assert!(ids.iter().all(|&i| i < mesh.num_vertices()));
        }
    }

    #[test]
    fn test_count_exceeding_vertices_is_error() {
        let mesh = tetrahedron();
        let result = uniform_vertex_sampling(&mesh, 5);
        assert!(matches!(
            result,
            Err(MeshError::SampleCountExceedsVertices {
                requested: 5,
                available: 4
            })
        ));
    }

    #[test]
    fn test_deterministic() {
        let mesh = tetrahedron();
        let a = uniform_vertex_sampling(&mesh, 3).unwrap();
        let b = uniform_vertex_sampling(&mesh, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_coincident_positions_still_distinct() {
        // Every vertex at the same position: distance gives no signal, but
        // the returned ids must still be distinct.
        let p = Point3::new(1.0, 1.0, 1.0);
        let vertices = vec![p, p, p, p];
        let faces = vec![[0, 1, 2], [2, 1, 3]];
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        let samples = uniform_vertex_sampling(&mesh, 3).unwrap();
        let mut ids: Vec<usize> = samples.iter().map(|v| v.index()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_second_sample_is_farthest_from_first() {
        // Vertices strung along a line; the farthest from vertex 0 is the
        // last one.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 3], [1, 2, 3]];
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        let samples = uniform_vertex_sampling(&mesh, 2).unwrap();
        assert_eq!(samples[0], VertexId::new(0));
        assert_eq!(samples[1], VertexId::new(3));
    }
}
