//! Geometric primitive detection.
//!
//! A RANSAC-style pipeline that explains mesh regions with analytic
//! primitives (plane, sphere, cylinder, cone):
//!
//! 1. **Generate** — seed vertices are spread over the mesh by farthest-point
//!    sampling plus seeded random picks; each seed proposes one candidate of
//!    each shape kind fitted from its one-ring samples.
//! 2. **Consensus** — every candidate is scored by counting the vertices
//!    within both the distance and the normal-angle tolerance.
//! 3. **Select** — the best candidate wins (score, then smaller footprint,
//!    then kind; fully deterministic).
//! 4. **Refine** — a winning cylinder is rectified from its full support set
//!    before labels are committed.
//!
//! [`detect_primitives`] runs rounds of this pipeline greedily over the
//! still-unlabeled vertices; [`select_at_vertex`] answers the interactive
//! "what primitive is here" query for a single picked vertex. All randomness
//! flows from the explicit seed in [`DetectionParams`], so runs are
//! reproducible.

mod candidate;

pub use candidate::{PrimitiveKind, Shape, ShapeCandidate};

use nalgebra::Vector3;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::algo::sampling::uniform_vertex_sampling;
use crate::algo::Progress;
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, VertexId};

/// Tuning parameters for primitive detection.
#[derive(Debug, Clone)]
pub struct DetectionParams {
    /// Maximum point-to-surface distance for a support vertex.
    pub distance_tolerance: f64,
    /// Maximum angle (radians) between a vertex normal and the shape normal
    /// at its projection.
    pub angle_tolerance: f64,
    /// Minimum support size for a candidate to be accepted.
    pub min_support: usize,
    /// Maximum number of greedy labeling rounds.
    pub max_iterations: usize,
    /// Number of seed vertices per round.
    pub seed_count: usize,
    /// Seed for the candidate-generation RNG.
    pub seed: u64,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            distance_tolerance: 0.01,
            angle_tolerance: 0.175, // ~10 degrees
            min_support: 20,
            max_iterations: 8,
            seed_count: 32,
            seed: 0x5EED,
        }
    }
}

impl DetectionParams {
    /// Create parameters with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the support distance tolerance.
    pub fn with_distance_tolerance(mut self, tolerance: f64) -> Self {
        self.distance_tolerance = tolerance;
        self
    }

    /// Set the support normal-angle tolerance, in radians.
    pub fn with_angle_tolerance(mut self, tolerance: f64) -> Self {
        self.angle_tolerance = tolerance;
        self
    }

    /// Set the minimum support size.
    pub fn with_min_support(mut self, min_support: usize) -> Self {
        self.min_support = min_support;
        self
    }

    /// Set the labeling round budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the number of seeds per round.
    pub fn with_seed_count(mut self, seed_count: usize) -> Self {
        self.seed_count = seed_count;
        self
    }

    /// Set the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.distance_tolerance > 0.0) {
            return Err(MeshError::invalid_param(
                "distance_tolerance",
                self.distance_tolerance,
                "must be positive",
            ));
        }
        if !(self.angle_tolerance > 0.0) {
            return Err(MeshError::invalid_param(
                "angle_tolerance",
                self.angle_tolerance,
                "must be positive",
            ));
        }
        if self.min_support == 0 {
            return Err(MeshError::invalid_param(
                "min_support",
                self.min_support,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Greedily label mesh vertices with the primitives that explain them.
///
/// Runs up to `max_iterations` rounds; each round fits candidates at seed
/// vertices, scores them over the still-unlabeled vertices, and commits the
/// winner's support if it reaches `min_support`. Vertices no candidate
/// explains stay `None`; an all-`None` result is a valid outcome, not an
/// error.
pub fn detect_primitives(
    mesh: &HalfEdgeMesh,
    params: &DetectionParams,
) -> Result<Vec<Option<PrimitiveKind>>> {
    detect_primitives_with_progress(mesh, params, &Progress::none())
}

/// [`detect_primitives`] with per-round progress reporting.
pub fn detect_primitives_with_progress(
    mesh: &HalfEdgeMesh,
    params: &DetectionParams,
    progress: &Progress,
) -> Result<Vec<Option<PrimitiveKind>>> {
    params.validate()?;

    let num_vertices = mesh.num_vertices();
    let mut labels: Vec<Option<PrimitiveKind>> = vec![None; num_vertices];
    let mut eligible = vec![true; num_vertices];
    let mut rng = StdRng::seed_from_u64(params.seed);

    for round in 0..params.max_iterations {
        progress.report(round, params.max_iterations, "primitive detection");

        let seeds = pick_seeds(mesh, params, &eligible, &mut rng)?;
        if seeds.is_empty() {
            break;
        }

        let mut best: Option<ShapeCandidate> = None;
        for &seed in &seeds {
            for shape in generate_candidates(mesh, seed, &mut rng) {
                let candidate = ShapeCandidate::evaluate(shape, mesh, params, &eligible);
                if best.as_ref().map_or(true, |b| candidate.beats(b)) {
                    best = Some(candidate);
                }
            }
        }

        let Some(winner) = best else { break };
        if winner.support.len() < params.min_support {
            break;
        }

        // Refine, then re-score so the committed support matches the final
        // shape.
        let refined = winner.shape.rectify(mesh, &winner.support);
        let refined = ShapeCandidate::evaluate(refined, mesh, params, &eligible);
        if refined.support.len() < params.min_support {
            continue;
        }

        let kind = refined.shape.kind();
        for &v in &refined.support {
            labels[v.index()] = Some(kind);
            eligible[v.index()] = false;
        }
    }

    progress.report(
        params.max_iterations,
        params.max_iterations,
        "primitive detection",
    );
    Ok(labels)
}

/// Find the best primitive explaining the region around one picked vertex.
///
/// Candidates are generated only from `seed`; scoring runs over the whole
/// mesh. Returns `Ok(None)` when nothing reaches `min_support`.
pub fn select_at_vertex(
    mesh: &HalfEdgeMesh,
    seed: VertexId,
    params: &DetectionParams,
) -> Result<Option<ShapeCandidate>> {
    params.validate()?;
    if seed.index() >= mesh.num_vertices() {
        return Err(MeshError::invalid_param(
            "seed",
            seed.index(),
            "vertex id out of range",
        ));
    }

    let eligible = vec![true; mesh.num_vertices()];
    let mut rng = StdRng::seed_from_u64(params.seed);

    let mut best: Option<ShapeCandidate> = None;
    for shape in generate_candidates(mesh, seed, &mut rng) {
        let candidate = ShapeCandidate::evaluate(shape, mesh, params, &eligible);
        if best.as_ref().map_or(true, |b| candidate.beats(b)) {
            best = Some(candidate);
        }
    }

    let Some(winner) = best else {
        return Ok(None);
    };
    if winner.support.len() < params.min_support {
        return Ok(None);
    }

    let refined = winner.shape.rectify(mesh, &winner.support);
    let refined = ShapeCandidate::evaluate(refined, mesh, params, &eligible);
    if refined.support.len() < params.min_support {
        return Ok(None);
    }
    Ok(Some(refined))
}

/// Write a per-vertex color for each detection label.
///
/// Labeled vertices get a fixed color per primitive kind; unlabeled vertices
/// get light gray. Purely a data write-back; display is the caller's concern.
pub fn colorize_labels(mesh: &mut HalfEdgeMesh, labels: &[Option<PrimitiveKind>]) {
    const UNLABELED: Vector3<f64> = Vector3::new(0.86, 0.86, 0.86);

    for idx in 0..mesh.num_vertices().min(labels.len()) {
        let color = match labels[idx] {
            Some(PrimitiveKind::Plane) => Vector3::new(0.85, 0.35, 0.35),
            Some(PrimitiveKind::Sphere) => Vector3::new(0.35, 0.65, 0.35),
            Some(PrimitiveKind::Cylinder) => Vector3::new(0.35, 0.45, 0.85),
            Some(PrimitiveKind::Cone) => Vector3::new(0.85, 0.75, 0.30),
            None => UNLABELED,
        };
        mesh.set_color(VertexId::new(idx), color);
    }
}

/// Seed vertices for one round: farthest-point samples filtered to the
/// eligible set, topped up with random eligible picks.
fn pick_seeds(
    mesh: &HalfEdgeMesh,
    params: &DetectionParams,
    eligible: &[bool],
    rng: &mut StdRng,
) -> Result<Vec<VertexId>> {
    let want = params.seed_count.min(mesh.num_vertices());
    if want == 0 {
        return Ok(Vec::new());
    }

    let mut seeds: Vec<VertexId> = uniform_vertex_sampling(mesh, want)?
        .into_iter()
        .filter(|v| eligible[v.index()])
        .collect();

    let remaining: Vec<VertexId> = eligible
        .iter()
        .enumerate()
        .filter(|&(i, &e)| e && !seeds.contains(&VertexId::new(i)))
        .map(|(i, _)| VertexId::new(i))
        .collect();

    for v in remaining.choose_multiple(rng, want.saturating_sub(seeds.len())) {
        seeds.push(*v);
    }
    Ok(seeds)
}

/// Fit one candidate of each kind from a seed vertex's one-ring.
fn generate_candidates(mesh: &HalfEdgeMesh, seed: VertexId, rng: &mut StdRng) -> Vec<Shape> {
    let neighbors: Vec<VertexId> = mesh.vertex_neighbors(seed).collect();
    let mut shapes = Vec::with_capacity(4);

    let p = *mesh.position(seed);
    let n = *mesh.normal(seed);

    // Plane from the full ring.
    let mut ring_points = vec![p];
    ring_points.extend(neighbors.iter().map(|&v| *mesh.position(v)));
    if let Some(plane) = Shape::plane_from_points(&ring_points) {
        shapes.push(plane);
    }

    // Sphere and cylinder each need one more oriented point.
    if let Some(&j) = neighbors.choose(rng) {
        let pj = mesh.position(j);
        let nj = mesh.normal(j);
        if let Some(sphere) = Shape::sphere_from_two(&p, &n, pj, nj) {
            shapes.push(sphere);
        }
        if let Some(cylinder) = Shape::cylinder_from_two(&p, &n, pj, nj) {
            shapes.push(cylinder);
        }
    }

    // Cone needs two more.
    if neighbors.len() >= 2 {
        let picks: Vec<VertexId> = neighbors.choose_multiple(rng, 2).copied().collect();
        let points = [p, *mesh.position(picks[0]), *mesh.position(picks[1])];
        let normals = [n, *mesh.normal(picks[0]), *mesh.normal(picks[1])];
        if let Some(cone) = Shape::cone_from_three(&points, &normals) {
            shapes.push(cone);
        }
    }

    shapes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use std::collections::HashMap;

    /// Unit icosphere: subdivided icosahedron with vertices projected onto
    /// the unit sphere.
    fn create_icosphere(subdivisions: usize) -> HalfEdgeMesh {
        let phi = (1.0 + 5.0f64.sqrt()) / 2.0;
        let mut vertices: Vec<Point3<f64>> = vec![
            Point3::new(-1.0, phi, 0.0),
            Point3::new(1.0, phi, 0.0),
            Point3::new(-1.0, -phi, 0.0),
            Point3::new(1.0, -phi, 0.0),
            Point3::new(0.0, -1.0, phi),
            Point3::new(0.0, 1.0, phi),
            Point3::new(0.0, -1.0, -phi),
            Point3::new(0.0, 1.0, -phi),
            Point3::new(phi, 0.0, -1.0),
            Point3::new(phi, 0.0, 1.0),
            Point3::new(-phi, 0.0, -1.0),
            Point3::new(-phi, 0.0, 1.0),
        ];
        for v in &mut vertices {
            *v = Point3::from(v.coords.normalize());
        }

        let mut faces: Vec<[usize; 3]> = vec![
            [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
            [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
            [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
            [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
        ];

        for _ in 0..subdivisions {
            let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
            let mut new_faces = Vec::with_capacity(faces.len() * 4);

            for face in &faces {
                let mut mids = [0usize; 3];
                for k in 0..3 {
                    let a = face[k];
                    let b = face[(k + 1) % 3];
                    let key = (a.min(b), a.max(b));
                    mids[k] = *midpoints.entry(key).or_insert_with(|| {
                        let mid = (vertices[a].coords + vertices[b].coords) * 0.5;
                        vertices.push(Point3::from(mid.normalize()));
                        vertices.len() - 1
                    });
                }
                new_faces.push([face[0], mids[0], mids[2]]);
                new_faces.push([face[1], mids[1], mids[0]]);
                new_faces.push([face[2], mids[2], mids[1]]);
                new_faces.push([mids[0], mids[1], mids[2]]);
            }
            faces = new_faces;
        }

        build_from_triangles(&vertices, &faces).unwrap()
    }

    fn sphere_params() -> DetectionParams {
        DetectionParams::new()
            .with_distance_tolerance(0.05)
            .with_angle_tolerance(0.35)
            .with_min_support(50)
            .with_max_iterations(4)
            .with_seed_count(8)
            .with_seed(42)
    }

    #[test]
    fn test_icosphere_detected_as_sphere() {
        let mesh = create_icosphere(2);
        assert_eq!(mesh.num_vertices(), 162);

        let labels = detect_primitives(&mesh, &sphere_params()).unwrap();
        let sphere_count = labels
            .iter()
            .filter(|l| **l == Some(PrimitiveKind::Sphere))
            .count();
        assert!(
            sphere_count > mesh.num_vertices() * 4 / 5,
            "expected most vertices labeled sphere, got {}/{}",
            sphere_count,
            mesh.num_vertices()
        );
    }

    #[test]
    fn test_select_at_vertex_recovers_unit_sphere() {
        let mesh = create_icosphere(2);
        let candidate = select_at_vertex(&mesh, VertexId::new(0), &sphere_params())
            .unwrap()
            .expect("sphere should reach min_support");

        let Shape::Sphere { center, radius } = candidate.shape else {
            panic!("expected a sphere, got {:?}", candidate.shape);
        };
        assert_relative_eq!(radius, 1.0, epsilon = 0.1);
        assert!(center.coords.norm() < 0.1, "center {:?}", center);
        assert!(candidate.support.len() >= 50);
    }

    #[test]
    fn test_detection_is_reproducible() {
        let mesh = create_icosphere(1);
        let params = sphere_params().with_min_support(20);
        let a = detect_primitives(&mesh, &params).unwrap();
        let b = detect_primitives(&mesh, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_consensus_yields_all_none() {
        // Tolerances so tight nothing can reach the support floor.
        let mesh = create_icosphere(1);
        let params = DetectionParams::new()
            .with_distance_tolerance(1e-12)
            .with_angle_tolerance(1e-12)
            .with_min_support(1000)
            .with_seed(7);

        let labels = detect_primitives(&mesh, &params).unwrap();
        assert!(labels.iter().all(Option::is_none));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mesh = create_icosphere(1);
        let params = DetectionParams::new().with_distance_tolerance(-1.0);
        assert!(matches!(
            detect_primitives(&mesh, &params),
            Err(MeshError::InvalidParameter { .. })
        ));

        let params = DetectionParams::new().with_min_support(0);
        assert!(matches!(
            select_at_vertex(&mesh, VertexId::new(0), &params),
            Err(MeshError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_select_at_out_of_range_vertex() {
        let mesh = create_icosphere(1);
        let result = select_at_vertex(&mesh, VertexId::new(100_000), &sphere_params());
        assert!(matches!(result, Err(MeshError::InvalidParameter { .. })));
    }

    #[test]
    fn test_flat_grid_detected_as_plane() {
        let n = 8;
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64 * 0.1, j as f64 * 0.1, 0.0));
            }
        }
        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                faces.push([v00, v00 + 1, v00 + n + 2]);
                faces.push([v00, v00 + n + 2, v00 + n + 1]);
            }
        }
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        let params = DetectionParams::new()
            .with_distance_tolerance(0.01)
            .with_angle_tolerance(0.2)
            .with_min_support(40)
            .with_seed(3);
        let labels = detect_primitives(&mesh, &params).unwrap();
        let plane_count = labels
            .iter()
            .filter(|l| **l == Some(PrimitiveKind::Plane))
            .count();
        assert_eq!(plane_count, mesh.num_vertices());
    }

    #[test]
    fn test_colorize_labels() {
        let mut mesh = create_icosphere(1);
        let mut labels = vec![None; mesh.num_vertices()];
        labels[0] = Some(PrimitiveKind::Sphere);

        colorize_labels(&mut mesh, &labels);

        let colored = mesh.vertex(VertexId::new(0)).color;
        let gray = mesh.vertex(VertexId::new(1)).color;
        assert_ne!(colored, gray);
        assert_relative_eq!(gray.x, 0.86);
    }

    #[test]
    fn test_progress_reported() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let mesh = create_icosphere(1);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let progress = Progress::new(move |_, _, _| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        detect_primitives_with_progress(&mesh, &sphere_params(), &progress).unwrap();
        assert!(calls.load(Ordering::SeqCst) >= 2);
    }
}
