//! # polytri
//!
//! In-place triangulation of polygonal faces on a half-edge surface mesh.
//!
//! Every face with more than three sides is replaced by triangles that reuse
//! the face's boundary half-edges, so the rest of the mesh keeps its
//! connectivity. Each face is projected onto a plane, triangulated with a
//! constrained Delaunay triangulation, and the cells inside the polygon are
//! stitched back into the mesh.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe indices
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Non-convex and non-planar faces**: any face whose projection is simple
//! - **Constrained Delaunay triangulation**: usable on its own in [`cdt`]
//! - **File formats**: OBJ and PLY keep polygons, STL for triangle output
//!
//! ## Quick Start
//!
//! ```no_run
//! use polytri::prelude::*;
//!
//! let mut mesh: HalfEdgeMesh = polytri::io::load("model.obj").unwrap();
//! let report = triangulate_mesh(&mut mesh, &TriangulateOptions::default()).unwrap();
//! println!("{} triangles created", report.triangles_created);
//! polytri::io::save(&mesh, "output.obj").unwrap();
//! ```
//!
//! ## Triangulating With Custom Positions
//!
//! Positions are read through a [`VertexPointMap`](mesh::VertexPointMap), so
//! a face can be triangulated against a different embedding than the one
//! stored in the mesh:
//!
//! ```
//! use polytri::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh: HalfEdgeMesh = build_from_polygons(&vertices, &[vec![0, 1, 2, 3]]).unwrap();
//!
//! let lifted: Vec<Point3<f64>> = vertices.iter().map(|p| Point3::new(p.x, p.y, 0.1 * p.x)).collect();
//! let report = triangulate_faces(
//!     &mut mesh,
//!     &lifted,
//!     &NewellKernel::default(),
//!     &TriangulateOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(report.faces_triangulated, 1);
//! assert_eq!(mesh.num_faces(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod cdt;
pub mod error;
pub mod io;
pub mod kernel;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use polytri::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::triangulate::{
        triangulate_faces, triangulate_mesh, FailurePolicy, TriangulateOptions,
        TriangulationReport,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::kernel::{Kernel, NewellKernel};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, build_from_triangles, to_polygons, to_triangles,
        EdgeId, Face, FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh, MeshIndex, Vertex, VertexId,
        VertexPointMap,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
