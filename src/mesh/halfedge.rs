//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list) representation
//! for triangle meshes acquired from scans or files. The structure enables O(1)
//! adjacency queries and is the foundation for every algorithm in this crate.
//!
//! # Structure
//!
//! - Each edge is split into two **half-edges** pointing in opposite directions
//! - Each half-edge knows its **twin** (opposite half-edge), **next** (next half-edge
//!   around the face), **origin vertex**, and **incident face**
//! - Each vertex stores one outgoing half-edge
//! - Each face stores one half-edge on its boundary
//!
//! # Boundary Handling
//!
//! Boundary half-edges (on mesh boundaries) have an invalid face ID and are
//! linked into boundary loops via their `next` pointers, so the one-ring walk
//! `twin -> next` terminates after visiting every outgoing half-edge of a
//! vertex, boundary or not. Vertices carry an explicit [`BoundaryKind`] flag
//! set by [`HalfEdgeMesh::update_boundary_flags`].
//!
//! # Derived data
//!
//! Face areas, vertex normals, and the bounding box are cached, not live:
//! after any position edit the caller must invoke [`HalfEdgeMesh::update_face_areas`],
//! [`HalfEdgeMesh::update_normals`], or [`HalfEdgeMesh::update_bounding_box`]
//! itself. Nothing in the mesh invalidates them automatically.

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, HalfEdgeId, VertexId};

/// Whether a vertex lies on the mesh boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryKind {
    /// The vertex is surrounded by faces on all sides.
    #[default]
    Interior,
    /// The vertex touches at least one boundary edge.
    Boundary,
}

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// The vertex normal (area-weighted face-normal average).
    /// Valid only after [`HalfEdgeMesh::update_normals`].
    pub normal: Vector3<f64>,

    /// A per-vertex color. Purely an output channel for scalar fields and
    /// primitive labels; the core never reads it back.
    pub color: Vector3<f64>,

    /// Boundary classification, set by [`HalfEdgeMesh::update_boundary_flags`].
    pub boundary: BoundaryKind,

    /// One outgoing half-edge from this vertex.
    /// For boundary vertices, this is guaranteed to be a boundary half-edge.
    pub halfedge: HalfEdgeId,
}

impl Vertex {
    /// Create a new vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            color: Vector3::new(0.86, 0.86, 0.86),
            boundary: BoundaryKind::Interior,
            halfedge: HalfEdgeId::invalid(),
        }
    }

    /// Create a new vertex from coordinates.
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// The vertex this half-edge originates from.
    pub origin: VertexId,

    /// The opposite half-edge (pointing in the reverse direction).
    pub twin: HalfEdgeId,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId,

    /// The previous half-edge around the face (clockwise).
    pub prev: HalfEdgeId,

    /// The face this half-edge belongs to.
    /// Invalid for boundary half-edges.
    pub face: FaceId,
}

impl HalfEdge {
    /// Create a new uninitialized half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl Default for HalfEdge {
    fn default() -> Self {
        Self::new()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId,

    /// Cached triangle area. Valid only after [`HalfEdgeMesh::update_face_areas`].
    pub area: f64,
}

impl Face {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeId) -> Self {
        Self {
            halfedge,
            area: 0.0,
        }
    }
}

impl Default for Face {
    fn default() -> Self {
        Self::new(HalfEdgeId::invalid())
    }
}

/// A half-edge mesh data structure for triangle meshes.
///
/// The mesh owns its vertices, half-edges, and faces in arena vectors;
/// cross-references between elements are integer handles into those arenas,
/// and dropping the mesh frees everything at once.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    /// All vertices in the mesh.
    pub(crate) vertices: Vec<Vertex>,

    /// All half-edges in the mesh.
    pub(crate) halfedges: Vec<HalfEdge>,

    /// All faces in the mesh.
    pub(crate) faces: Vec<Face>,

    /// Cached axis-aligned bounding box (min, max).
    /// Valid only after [`HalfEdgeMesh::update_bounding_box`].
    pub(crate) bbox: Option<(Point3<f64>, Point3<f64>)>,
}

impl HalfEdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // Each triangle has 3 half-edges; boundary edges add a few more.
        let num_halfedges = num_faces * 3 + num_faces / 2;

        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
            bbox: None,
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by ID.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id.index()]
    }

    /// Get a mutable half-edge by ID.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId) -> &mut HalfEdge {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get a mutable face by ID.
    #[inline]
    pub fn face_mut(&mut self, id: FaceId) -> &mut Face {
        &mut self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    ///
    /// Cached face areas, normals, and the bounding box become stale; call
    /// the corresponding `update_*` methods when done editing.
    #[inline]
    pub fn set_position(&mut self, v: VertexId, pos: Point3<f64>) {
        self.vertex_mut(v).position = pos;
    }

    /// Get the normal of a vertex.
    #[inline]
    pub fn normal(&self, v: VertexId) -> &Vector3<f64> {
        &self.vertex(v).normal
    }

    /// Set the color of a vertex.
    #[inline]
    pub fn set_color(&mut self, v: VertexId, color: Vector3<f64>) {
        self.vertex_mut(v).color = color;
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId) -> VertexId {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId) -> VertexId {
        self.origin(self.twin(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        self.halfedge(he).face
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the boundary by walking its one-ring.
    ///
    /// This recomputes from topology; [`Vertex::boundary`] holds the cached
    /// flag set by [`HalfEdgeMesh::update_boundary_flags`].
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        let start = self.vertex(v).halfedge;
        if !start.is_valid() {
            return true; // Isolated vertex
        }

        let mut he = start;
        loop {
            if self.is_boundary_halfedge(he) {
                return true;
            }
            he = self.next(self.twin(he));
            if he == start {
                break;
            }
        }
        false
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all vertices with their IDs.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all half-edges with their IDs.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdge)> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .map(|(i, he)| (HalfEdgeId::new(i), he))
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over all faces with their IDs.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, f)| (FaceId::new(i), f))
    }

    /// Iterate over half-edges around a vertex (outgoing half-edges).
    ///
    /// This is the shared one-ring walk used by curvature, normal deviation,
    /// smoothing, and detection alike: starting at the vertex's stored
    /// half-edge, repeatedly step `twin -> next` until the start recurs.
    pub fn vertex_halfedges(&self, v: VertexId) -> VertexHalfEdgeIter<'_> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over vertices adjacent to a vertex.
    pub fn vertex_neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_halfedges(v).map(|he| self.dest(he))
    }

    /// Iterate over faces adjacent to a vertex, skipping the null face at a
    /// boundary.
    pub fn vertex_faces(&self, v: VertexId) -> impl Iterator<Item = FaceId> + '_ {
        self.vertex_halfedges(v).filter_map(|he| {
            let f = self.face_of(he);
            if f.is_valid() {
                Some(f)
            } else {
                None
            }
        })
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId) -> FaceHalfEdgeIter<'_> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Get the three vertices of a triangular face.
    pub fn face_triangle(&self, f: FaceId) -> [VertexId; 3] {
        let he0 = self.face(f).halfedge;
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [self.origin(he0), self.origin(he1), self.origin(he2)]
    }

    /// Get the positions of the three vertices of a triangular face.
    pub fn face_positions(&self, f: FaceId) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    // ==================== Geometry ====================

    /// Compute the normal of a face.
    ///
    /// Returns zero for a degenerate face instead of dividing by zero.
    pub fn face_normal(&self, f: FaceId) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        let n = (p1 - p0).cross(&(p2 - p0));
        let len = n.norm();
        if len > 1e-12 {
            n / len
        } else {
            Vector3::zeros()
        }
    }

    /// Compute the area of a face (always from positions; see [`Face::area`]
    /// for the cached value).
    pub fn face_area(&self, f: FaceId) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Compute the valence (degree) of a vertex.
    pub fn valence(&self, v: VertexId) -> usize {
        self.vertex_halfedges(v).count()
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    // ==================== Derived-data updates ====================

    /// Recompute and cache every face's area. O(F).
    pub fn update_face_areas(&mut self) {
        for i in 0..self.faces.len() {
            let area = self.face_area(FaceId::new(i));
            self.faces[i].area = area;
        }
    }

    /// Recompute every vertex normal as the area-weighted average of incident
    /// face normals. O(F).
    pub fn update_normals(&mut self) {
        let mut normals = vec![Vector3::zeros(); self.vertices.len()];

        for fid in 0..self.faces.len() {
            let [v0, v1, v2] = self.face_triangle(FaceId::new(fid));
            let p0 = self.vertices[v0.index()].position;
            let p1 = self.vertices[v1.index()].position;
            let p2 = self.vertices[v2.index()].position;

            // Unnormalized cross product carries the area weight.
            let face_normal = (p1 - p0).cross(&(p2 - p0));
            normals[v0.index()] += face_normal;
            normals[v1.index()] += face_normal;
            normals[v2.index()] += face_normal;
        }

        for (vert, n) in self.vertices.iter_mut().zip(normals) {
            let len = n.norm();
            vert.normal = if len > 1e-12 { n / len } else { Vector3::zeros() };
        }
    }

    /// Recompute the cached bounding box by scanning all vertex positions. O(V).
    pub fn update_bounding_box(&mut self) {
        if self.vertices.is_empty() {
            self.bbox = None;
            return;
        }

        let mut min = self.vertices[0].position;
        let mut max = self.vertices[0].position;
        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }
        self.bbox = Some((min, max));
    }

    /// Get the cached bounding box, if [`HalfEdgeMesh::update_bounding_box`]
    /// has been called.
    #[inline]
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        self.bbox
    }

    /// Recompute every vertex's [`BoundaryKind`] flag from topology. O(V + E).
    pub fn update_boundary_flags(&mut self) {
        let flags: Vec<BoundaryKind> = self
            .vertex_ids()
            .map(|v| {
                if self.is_boundary_vertex(v) {
                    BoundaryKind::Boundary
                } else {
                    BoundaryKind::Interior
                }
            })
            .collect();
        for (vert, flag) in self.vertices.iter_mut().zip(flags) {
            vert.boundary = flag;
        }
    }

    // ==================== Construction ====================

    /// Add a new vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    // ==================== Validation ====================

    /// Check if the mesh is valid (all connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        // Check vertices
        for (vid, v) in self.vertices() {
            if v.halfedge.is_valid() {
                let he = self.halfedge(v.halfedge);
                if he.origin != vid {
                    return false;
                }
            }
        }

        // Check half-edges
        for (heid, he) in self.halfedges() {
            // Twin involution
            if he.twin.is_valid() {
                let twin = self.halfedge(he.twin);
                if twin.twin != heid {
                    return false;
                }
            }

            // Next/prev consistency
            if he.next.is_valid() && self.halfedge(he.next).prev != heid {
                return false;
            }
            if he.prev.is_valid() && self.halfedge(he.prev).next != heid {
                return false;
            }
        }

        // Check faces
        for (_fid, f) in self.faces() {
            if !f.halfedge.is_valid() {
                return false;
            }
        }

        true
    }
}

/// Iterator over half-edges around a vertex.
pub struct VertexHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    done: bool,
}

impl<'a> VertexHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, v: VertexId) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a> Iterator for VertexHalfEdgeIter<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // Move to next outgoing half-edge: twin -> next.
        // If he goes v -> w, then twin(he) goes w -> v, and next(twin(he))
        // originates at v again.
        self.current = self.mesh.next(self.mesh.twin(self.current));

        if self.current == self.start || !self.current.is_valid() {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    done: bool,
}

impl<'a> FaceHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, f: FaceId) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a> Iterator for FaceHalfEdgeIter<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}
