//! Index types for mesh elements.
//!
//! This module provides type-safe index wrappers for vertices, half-edges,
//! and faces. Indices are dense `u32` values assigned in insertion order, so
//! they double as direct offsets into per-element result vectors (curvature
//! lists, label lists, and so on). The all-ones bit pattern is reserved as an
//! invalid/null sentinel, used for the missing face of boundary half-edges.

use std::fmt::{self, Debug};

/// Sentinel value representing an invalid/null index.
const INVALID: u32 = u32::MAX;

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId(u32);

/// A type-safe half-edge index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId(u32);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId(u32);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index < INVALID as usize, "index {} too large", index);
                Self(index as u32)
            }

            /// Create an invalid/null index.
            #[inline]
            pub fn invalid() -> Self {
                Self(INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != INVALID
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(FaceId, "F");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id() {
        let v = VertexId::new(42);
        assert_eq!(v.index(), 42);
        assert!(v.is_valid());

        let invalid = VertexId::invalid();
        assert!(!invalid.is_valid());
    }

    #[test]
    fn test_type_safety() {
        // These are different types and cannot be mixed
        let v = VertexId::new(0);
        let he = HalfEdgeId::new(0);
        let f = FaceId::new(0);

        // All have the same raw value but are distinct types
        assert_eq!(v.index(), he.index());
        assert_eq!(he.index(), f.index());
    }

    #[test]
    fn test_debug_format() {
        let v = VertexId::new(42);
        assert_eq!(format!("{:?}", v), "V(42)");

        let invalid = VertexId::invalid();
        assert_eq!(format!("{:?}", invalid), "V(INVALID)");
    }
}
