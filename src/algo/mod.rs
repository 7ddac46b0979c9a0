//! Mesh processing algorithms.
//!
//! - **Triangulation**: replacing polygonal faces by triangles that reuse
//!   the original boundary half-edges
//!
//! Long-running passes report through [`Progress`].

pub mod progress;
pub mod triangulate;

pub use progress::Progress;
