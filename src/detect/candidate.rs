//! Primitive shapes, minimal-set fits, and consensus scoring.
//!
//! A [`Shape`] is one of four analytic primitives. Each variant answers two
//! queries: the distance from a point to the surface, and the surface normal
//! at the point's projection. Those two queries are all the consensus test
//! needs, so detection treats shapes uniformly through the tagged enum.
//!
//! The `from_*` constructors are the minimal-set fits used for candidate
//! generation. They return `None` for configurations the fit cannot resolve
//! (parallel normals, apex systems without a unique solution, negative
//! radii); generation simply moves on to the next seed.

use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};

use crate::mesh::{HalfEdgeMesh, VertexId};

use super::DetectionParams;

const EPSILON: f64 = 1e-10;

/// The kind of primitive a vertex was assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimitiveKind {
    /// Flat plane.
    Plane,
    /// Sphere.
    Sphere,
    /// Infinite circular cylinder.
    Cylinder,
    /// Infinite circular cone.
    Cone,
}

/// An analytic primitive hypothesis.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A plane through `center` with unit `normal`.
    Plane {
        /// A point on the plane.
        center: Point3<f64>,
        /// Unit plane normal.
        normal: Vector3<f64>,
    },
    /// A sphere.
    Sphere {
        /// Sphere center.
        center: Point3<f64>,
        /// Sphere radius, positive.
        radius: f64,
    },
    /// An infinite circular cylinder.
    Cylinder {
        /// A point on the axis.
        center: Point3<f64>,
        /// Unit axis direction.
        axis: Vector3<f64>,
        /// Cylinder radius, positive.
        radius: f64,
    },
    /// An infinite circular cone.
    Cone {
        /// Cone apex.
        apex: Point3<f64>,
        /// Unit axis direction, pointing into the cone.
        axis: Vector3<f64>,
        /// Half-angle between axis and surface, in `(0, π/2)`.
        half_angle: f64,
    },
}

impl Shape {
    /// Which primitive kind this shape is.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Shape::Plane { .. } => PrimitiveKind::Plane,
            Shape::Sphere { .. } => PrimitiveKind::Sphere,
            Shape::Cylinder { .. } => PrimitiveKind::Cylinder,
            Shape::Cone { .. } => PrimitiveKind::Cone,
        }
    }

    /// Unsigned distance from `p` to the shape surface.
    pub fn distance(&self, p: &Point3<f64>) -> f64 {
        match self {
            Shape::Plane { center, normal } => (p - center).dot(normal).abs(),
            Shape::Sphere { center, radius } => ((p - center).norm() - radius).abs(),
            Shape::Cylinder {
                center,
                axis,
                radius,
            } => {
                let w = p - center;
                let radial = w - axis * w.dot(axis);
                (radial.norm() - radius).abs()
            }
            Shape::Cone {
                apex,
                axis,
                half_angle,
            } => {
                let w = p - apex;
                let along = w.dot(axis);
                let radial = (w - axis * along).norm();
                // Signed distance to the lateral surface in the axial
                // half-space; the apex itself is on the surface.
                (radial * half_angle.cos() - along * half_angle.sin()).abs()
            }
        }
    }

    /// Unit surface normal at the projection of `p` onto the shape.
    ///
    /// Orientation is a convention (outward for sphere/cylinder/cone, the
    /// stored side for a plane); consensus compares via `|cos|`, so either
    /// side matches.
    pub fn normal_at(&self, p: &Point3<f64>) -> Vector3<f64> {
        match self {
            Shape::Plane { normal, .. } => *normal,
            Shape::Sphere { center, .. } => {
                let d = p - center;
                let n = d.norm();
                if n < EPSILON {
                    Vector3::z()
                } else {
                    d / n
                }
            }
            Shape::Cylinder { center, axis, .. } => {
                let w = p - center;
                let radial = w - axis * w.dot(axis);
                let n = radial.norm();
                if n < EPSILON {
                    orthonormal_to(axis)
                } else {
                    radial / n
                }
            }
            Shape::Cone {
                apex,
                axis,
                half_angle,
            } => {
                let w = p - apex;
                let radial = w - axis * w.dot(axis);
                let n = radial.norm();
                let radial_dir = if n < EPSILON {
                    orthonormal_to(axis)
                } else {
                    radial / n
                };
                radial_dir * half_angle.cos() - axis * half_angle.sin()
            }
        }
    }

    /// Size proxy used to break score ties: the smaller footprint wins.
    ///
    /// A plane is the simplest explanation and gets `0`; curved shapes rank
    /// by radius or opening angle.
    pub fn footprint(&self) -> f64 {
        match self {
            Shape::Plane { .. } => 0.0,
            Shape::Sphere { radius, .. } => *radius,
            Shape::Cylinder { radius, .. } => *radius,
            Shape::Cone { half_angle, .. } => *half_angle,
        }
    }

    /// Fit a plane to a point set: centroid plus the smallest-eigenvector
    /// normal of the covariance matrix.
    ///
    /// Needs at least three points that are not collinear.
    pub fn plane_from_points(points: &[Point3<f64>]) -> Option<Shape> {
        if points.len() < 3 {
            return None;
        }

        let centroid = points
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords)
            / points.len() as f64;

        let mut cov = Matrix3::zeros();
        for p in points {
            let d = p.coords - centroid;
            cov += d * d.transpose();
        }

        let normal = smallest_eigenvector(&cov)?;
        Some(Shape::Plane {
            center: Point3::from(centroid),
            normal,
        })
    }

    /// Fit a sphere to two oriented points.
    ///
    /// The shared radius solves `(p0 − p1)·(n0 − n1) = r |n0 − n1|²`; each
    /// sample then proposes a center `p_i − r n_i`, and the fit takes their
    /// midpoint. Fails when the normals are near-parallel or the radius
    /// comes out non-positive.
    pub fn sphere_from_two(
        p0: &Point3<f64>,
        n0: &Vector3<f64>,
        p1: &Point3<f64>,
        n1: &Vector3<f64>,
    ) -> Option<Shape> {
        let dn = n0 - n1;
        let dn_sq = dn.norm_squared();
        if dn_sq < EPSILON {
            return None;
        }

        let radius = (p0 - p1).dot(&dn) / dn_sq;
        if !radius.is_finite() || radius <= EPSILON {
            return None;
        }

        let c0 = p0.coords - n0 * radius;
        let c1 = p1.coords - n1 * radius;
        Some(Shape::Sphere {
            center: Point3::from((c0 + c1) * 0.5),
            radius,
        })
    }

    /// Fit a cylinder to two oriented points.
    ///
    /// The axis is `n0 × n1`; both samples are projected into the plane
    /// orthogonal to the axis, where the lines `p_i + t n_i` meet at the
    /// axis point. Radius is the mean projected distance to that point.
    pub fn cylinder_from_two(
        p0: &Point3<f64>,
        n0: &Vector3<f64>,
        p1: &Point3<f64>,
        n1: &Vector3<f64>,
    ) -> Option<Shape> {
        let axis = n0.cross(n1);
        let axis_norm = axis.norm();
        if axis_norm < EPSILON {
            return None;
        }
        let axis = axis / axis_norm;

        // Work in the plane orthogonal to the axis.
        let project = |v: &Vector3<f64>| v - axis * v.dot(&axis);
        let q0 = project(&p0.coords);
        let q1 = project(&p1.coords);
        let m0 = project(n0);
        let m1 = project(n1);

        // Intersect q0 + t m0 with q1 + s m1 by solving in the 2D subspace.
        let u = orthonormal_to(&axis);
        let v = axis.cross(&u);
        let to_2d = |w: &Vector3<f64>| (w.dot(&u), w.dot(&v));
        let (a0x, a0y) = to_2d(&q0);
        let (a1x, a1y) = to_2d(&q1);
        let (d0x, d0y) = to_2d(&m0);
        let (d1x, d1y) = to_2d(&m1);

        let det = d0x * (-d1y) - (-d1x) * d0y;
        if det.abs() < EPSILON {
            return None;
        }
        let bx = a1x - a0x;
        let by = a1y - a0y;
        let t = (bx * (-d1y) - (-d1x) * by) / det;

        let center_2d = (a0x + t * d0x, a0y + t * d0y);
        let center = u * center_2d.0 + v * center_2d.1;

        let r0 = (q0 - center).norm();
        let r1 = (q1 - center).norm();
        let radius = (r0 + r1) * 0.5;
        if radius <= EPSILON || !radius.is_finite() {
            return None;
        }

        Some(Shape::Cylinder {
            center: Point3::from(center),
            axis,
            radius,
        })
    }

    /// Fit a cone to three oriented points.
    ///
    /// The apex lies on all three tangent planes `n_i · x = n_i · p_i`; the
    /// axis is the mean direction from the apex to the samples, and the
    /// half-angle the mean angle between axis and those directions.
    pub fn cone_from_three(
        points: &[Point3<f64>; 3],
        normals: &[Vector3<f64>; 3],
    ) -> Option<Shape> {
        let m = Matrix3::from_rows(&[
            normals[0].transpose(),
            normals[1].transpose(),
            normals[2].transpose(),
        ]);
        let rhs = Vector3::new(
            normals[0].dot(&points[0].coords),
            normals[1].dot(&points[1].coords),
            normals[2].dot(&points[2].coords),
        );

        let apex_coords = m.lu().solve(&rhs)?;
        let apex = Point3::from(apex_coords);

        let mut dirs = [Vector3::zeros(); 3];
        let mut mean_dir = Vector3::zeros();
        for (i, p) in points.iter().enumerate() {
            let d = p - apex;
            let n = d.norm();
            if n < EPSILON {
                return None;
            }
            dirs[i] = d / n;
            mean_dir += dirs[i];
        }

        // The axis makes the same angle with every surface normal
        // (n_i · axis = −sin(half-angle)), so it is orthogonal to both
        // normal differences. The mean apex-to-sample direction fixes the
        // sign and serves as fallback for near-degenerate differences.
        let axis = {
            let cross = (normals[0] - normals[1]).cross(&(normals[0] - normals[2]));
            let n = cross.norm();
            if n >= EPSILON {
                if cross.dot(&mean_dir) >= 0.0 {
                    cross / n
                } else {
                    -cross / n
                }
            } else {
                let n = mean_dir.norm();
                if n < EPSILON {
                    return None;
                }
                mean_dir / n
            }
        };

        let mut half_angle = 0.0;
        for dir in &dirs {
            half_angle += axis.dot(dir).clamp(-1.0, 1.0).acos();
        }
        half_angle /= 3.0;

        if half_angle <= EPSILON || half_angle >= std::f64::consts::FRAC_PI_2 {
            return None;
        }

        Some(Shape::Cone {
            apex,
            axis,
            half_angle,
        })
    }

    /// Re-estimate a cylinder from its support set.
    ///
    /// The axis is re-fit as the smallest eigenvector of the support-normal
    /// covariance (support normals of a cylinder span the plane orthogonal
    /// to its axis), then center and radius are re-derived from the support
    /// positions. Other shape kinds are returned unchanged.
    pub fn rectify(self, mesh: &HalfEdgeMesh, support: &[VertexId]) -> Shape {
        if !matches!(self, Shape::Cylinder { .. }) || support.len() < 3 {
            return self;
        }

        let mut cov = Matrix3::zeros();
        for &v in support {
            let n = mesh.normal(v);
            cov += n * n.transpose();
        }
        let Some(new_axis) = smallest_eigenvector(&cov) else {
            return self;
        };

        // Centroid of support gives a stable axis point; radius is the mean
        // radial distance from the new axis.
        let centroid = support
            .iter()
            .fold(Vector3::zeros(), |acc, &v| acc + mesh.position(v).coords)
            / support.len() as f64;

        let mut radial_sum = 0.0;
        for &v in support {
            let w = mesh.position(v).coords - centroid;
            let radial = w - new_axis * w.dot(&new_axis);
            radial_sum += radial.norm();
        }
        let new_radius = radial_sum / support.len() as f64;
        if new_radius <= EPSILON || !new_radius.is_finite() {
            return self;
        }

        Shape::Cylinder {
            center: Point3::from(centroid),
            axis: new_axis,
            radius: new_radius,
        }
    }
}

/// A scored shape hypothesis with its supporting vertex set.
#[derive(Debug, Clone)]
pub struct ShapeCandidate {
    /// The fitted primitive.
    pub shape: Shape,
    /// Vertices within both tolerances of the shape.
    pub support: Vec<VertexId>,
    /// Consensus score; currently the support size.
    pub score: f64,
}

impl ShapeCandidate {
    /// Score `shape` against every vertex for which `eligible` is true.
    ///
    /// A vertex supports the shape when its distance to the surface is
    /// within `distance_tolerance` and its normal is within
    /// `angle_tolerance` of the surface normal at its projection (either
    /// orientation).
    pub fn evaluate(
        shape: Shape,
        mesh: &HalfEdgeMesh,
        params: &DetectionParams,
        eligible: &[bool],
    ) -> ShapeCandidate {
        let cos_tolerance = params.angle_tolerance.cos();
        let mut support = Vec::new();

        for (idx, flag) in eligible.iter().enumerate() {
            if !flag {
                continue;
            }
            let v = VertexId::new(idx);
            let p = mesh.position(v);
            if shape.distance(p) > params.distance_tolerance {
                continue;
            }
            let alignment = mesh.normal(v).dot(&shape.normal_at(p)).abs();
            if alignment < cos_tolerance {
                continue;
            }
            support.push(v);
        }

        let score = support.len() as f64;
        ShapeCandidate {
            shape,
            support,
            score,
        }
    }

    /// Deterministic ordering: higher score first, then smaller footprint,
    /// then primitive kind.
    pub fn beats(&self, other: &ShapeCandidate) -> bool {
        if self.score != other.score {
            return self.score > other.score;
        }
        let (a, b) = (self.shape.footprint(), other.shape.footprint());
        if a != b {
            return a < b;
        }
        self.shape.kind() < other.shape.kind()
    }
}

/// Smallest-eigenvalue unit eigenvector of a symmetric matrix.
fn smallest_eigenvector(m: &Matrix3<f64>) -> Option<Vector3<f64>> {
    let eigen = SymmetricEigen::new(*m);
    let mut min_idx = 0;
    for i in 1..3 {
        if eigen.eigenvalues[i] < eigen.eigenvalues[min_idx] {
            min_idx = i;
        }
    }
    let v = eigen.eigenvectors.column(min_idx).into_owned();
    let n = v.norm();
    if n < EPSILON {
        return None;
    }
    Some(v / n)
}

/// Any unit vector orthogonal to `v` (assumed unit length).
fn orthonormal_to(v: &Vector3<f64>) -> Vector3<f64> {
    let candidate = if v.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = v.cross(&candidate);
    u / u.norm()
}
