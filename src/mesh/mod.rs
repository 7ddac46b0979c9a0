//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation for polygon
//! meshes, together with the primitive mutations the triangulation
//! algorithms are built on.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], a half-edge (doubly-connected edge
//! list) structure whose faces may have any number of sides. Elements live in
//! arenas and are addressed by typed indices:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//! - [`EdgeId`] - Identifies a full edge (a pair of twin half-edges)
//!
//! These indices are generic over the underlying integer type
//! ([`MeshIndex`]), so you can choose `u16`, `u32`, or `u64`.
//!
//! # Primitives
//!
//! - [`HalfEdgeMesh::cut_face`] removes a face and leaves a hole bounded by
//!   the same half-edges
//! - [`HalfEdgeMesh::fill_hole`] creates a face from a border cycle
//! - [`HalfEdgeMesh::add_edge`], [`HalfEdgeMesh::set_next`] and
//!   [`HalfEdgeMesh::set_target`] wire new connectivity
//!
//! # Construction
//!
//! ```
//! use polytri::mesh::{HalfEdgeMesh, build_from_polygons};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces = vec![vec![0, 1, 2, 3]];
//!
//! let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
//! assert!(mesh.is_valid());
//! ```

mod builder;
mod halfedge;
mod index;
mod point_map;

pub(crate) use halfedge::newell_vector;

pub use builder::{
    build_from_polygons, build_from_quads, build_from_triangles, to_polygons, to_triangles,
};
pub use halfedge::{CycleIter, Face, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter};
pub use index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
pub use point_map::{FnPointMap, VertexPointMap};
