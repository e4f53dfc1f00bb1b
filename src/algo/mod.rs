//! Mesh processing algorithms.
//!
//! Geometry passes that read or rewrite the mesh in place:
//!
//! - [`curvature`]: discrete Gaussian and mean curvature
//! - [`deviation`]: per-vertex normal deviation
//! - [`gradient`]: per-vertex surface gradient of a scalar field
//! - [`smooth`]: Laplacian consolidation
//! - [`sampling`]: uniform (farthest-point) vertex sampling
//!
//! Long-running passes accept a [`Progress`] callback for observability.

pub mod curvature;
pub mod deviation;
pub mod gradient;
pub mod progress;
pub mod sampling;
pub mod smooth;

pub use progress::Progress;
