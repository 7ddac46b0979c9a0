//! Read-only vertex position lookups.
//!
//! Algorithms that only need positions take a [`VertexPointMap`] instead of
//! reading the mesh, so positions can come from the mesh itself, a separate
//! buffer, or a closure.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::HalfEdgeMesh;
use super::index::{MeshIndex, VertexId};

/// A mapping from vertex identity to a 3D position.
pub trait VertexPointMap<I: MeshIndex = u32> {
    /// Position of `v`, or `None` if the map has no entry for it.
    fn point(&self, v: VertexId<I>) -> Option<Point3<f64>>;
}

impl<I: MeshIndex> VertexPointMap<I> for [Point3<f64>] {
    fn point(&self, v: VertexId<I>) -> Option<Point3<f64>> {
        self.get(v.index()).copied()
    }
}

impl<I: MeshIndex> VertexPointMap<I> for Vec<Point3<f64>> {
    fn point(&self, v: VertexId<I>) -> Option<Point3<f64>> {
        self.get(v.index()).copied()
    }
}

impl<I: MeshIndex> VertexPointMap<I> for HashMap<VertexId<I>, Point3<f64>> {
    fn point(&self, v: VertexId<I>) -> Option<Point3<f64>> {
        self.get(&v).copied()
    }
}

impl<I: MeshIndex> VertexPointMap<I> for HalfEdgeMesh<I> {
    fn point(&self, v: VertexId<I>) -> Option<Point3<f64>> {
        self.vertices.get(v.index()).map(|vertex| vertex.position)
    }
}

/// Adapts a closure into a [`VertexPointMap`].
///
/// ```
/// use polytri::mesh::{FnPointMap, VertexId, VertexPointMap};
/// use nalgebra::Point3;
///
/// let lifted = FnPointMap(|v: VertexId| Point3::new(v.index() as f64, 0.0, 1.0));
/// assert_eq!(lifted.point(VertexId::new(2)), Some(Point3::new(2.0, 0.0, 1.0)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnPointMap<F>(pub F);

impl<I: MeshIndex, F> VertexPointMap<I> for FnPointMap<F>
where
    F: Fn(VertexId<I>) -> Point3<f64>,
{
    fn point(&self, v: VertexId<I>) -> Option<Point3<f64>> {
        Some((self.0)(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_map() {
        let points = vec![Point3::new(1.0, 2.0, 3.0)];
        let v: VertexId = VertexId::new(0);
        assert_eq!(points.point(v), Some(Point3::new(1.0, 2.0, 3.0)));
        assert_eq!(points.as_slice().point(VertexId::<u32>::new(1)), None);
    }

    #[test]
    fn test_hash_map() {
        let mut points: HashMap<VertexId, Point3<f64>> = HashMap::new();
        points.insert(VertexId::new(4), Point3::new(0.0, 1.0, 0.0));
        assert_eq!(points.point(VertexId::new(4)), Some(Point3::new(0.0, 1.0, 0.0)));
        assert_eq!(points.point(VertexId::new(5)), None);
    }

    #[test]
    fn test_mesh_positions() {
        let mut mesh = HalfEdgeMesh::<u32>::new();
        let v = mesh.add_vertex(Point3::new(3.0, 2.0, 1.0)).unwrap();
        assert_eq!(mesh.point(v), Some(Point3::new(3.0, 2.0, 1.0)));
    }
}
