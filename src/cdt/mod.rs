//! Planar constrained Delaunay triangulation.
//!
//! This module triangulates the convex hull of a 2D point set while forcing
//! a set of constrained edges to appear unsplit. It is the engine behind
//! polygon face triangulation, but has no knowledge of meshes: vertices and
//! faces carry generic user data (`V` and `F`).
//!
//! # Structure
//!
//! Faces are stored counter-clockwise with three vertices and three
//! neighbors; `neighbor(f, i)` is the face across the edge opposite
//! `vertex(f, i)`. An extra **infinite vertex** closes the triangulation:
//! every convex hull edge is shared with an infinite face, so the unbounded
//! region outside the hull is represented explicitly and can be walked like
//! any other face.
//!
//! # Usage
//!
//! ```
//! use polytri::cdt::TriangulationBuilder;
//! use nalgebra::Point2;
//!
//! let mut builder: TriangulationBuilder = TriangulationBuilder::new();
//! let a = builder.insert(Point2::new(0.0, 0.0));
//! let b = builder.insert(Point2::new(2.0, 0.0));
//! let c = builder.insert(Point2::new(2.0, 2.0));
//! let d = builder.insert(Point2::new(0.0, 2.0));
//! builder.insert_constraint(a, c);
//!
//! let cdt = builder.build::<()>().unwrap();
//! assert_eq!(cdt.finite_faces().count(), 2);
//! assert!(cdt.is_constrained_edge(a, c));
//! assert!(!cdt.is_constrained_edge(b, d));
//! ```
//!
//! Points are inserted with Bowyer-Watson on the unconstrained Delaunay
//! triangulation, then each constraint is recovered by removing the faces it
//! crosses and retriangulating the two pseudo-polygons on either side
//! (Anglada 1997).

mod constraint;
mod insert;
pub mod predicates;

use std::collections::HashMap;
use std::fmt;

use nalgebra::Point2;
use thiserror::Error;

/// Errors raised while building a triangulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CdtError {
    /// Fewer than three distinct points, or all points collinear.
    #[error("points are collinear or too few to triangulate")]
    Degenerate,

    /// A constraint crosses an existing constraint.
    #[error("constraint ({0:?}, {1:?}) crosses an existing constraint")]
    IntersectingConstraints(VertexHandle, VertexHandle),

    /// The triangulation was found in an inconsistent state.
    #[error("triangulation is inconsistent: {0}")]
    Inconsistent(&'static str),
}

/// Handle to a triangulation vertex.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VertexHandle(usize);

/// Handle to a triangulation face.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FaceHandle(usize);

impl VertexHandle {
    /// The infinite vertex shared by all unbounded faces.
    pub const INFINITE: VertexHandle = VertexHandle(0);

    /// Raw index of this handle.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    /// Whether this is the infinite vertex.
    #[inline]
    pub fn is_infinite(self) -> bool {
        self == Self::INFINITE
    }
}

impl FaceHandle {
    const NONE: FaceHandle = FaceHandle(usize::MAX);

    /// Raw index of this handle.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for VertexHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            write!(f, "TV(inf)")
        } else {
            write!(f, "TV({})", self.0)
        }
    }
}

impl fmt::Debug for FaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TF({})", self.0)
    }
}

/// Index of the vertex following `i` counter-clockwise.
#[inline]
pub fn ccw(i: usize) -> usize {
    (i + 1) % 3
}

/// Index of the vertex following `i` clockwise.
#[inline]
pub fn cw(i: usize) -> usize {
    (i + 2) % 3
}

/// A triangulation vertex.
#[derive(Debug, Clone)]
pub struct TriVertex<V> {
    /// Planar position. Meaningless for the infinite vertex.
    pub point: Point2<f64>,
    /// User data.
    pub info: V,
    face: FaceHandle,
}

/// A triangulation face.
#[derive(Debug, Clone)]
pub struct TriFace<F> {
    vertices: [VertexHandle; 3],
    neighbors: [FaceHandle; 3],
    constrained: [bool; 3],
    /// User data.
    pub info: F,
}

/// Collects points and constraints, then builds a
/// [`ConstrainedTriangulation`].
///
/// Inserting a point equal to an existing one returns the existing handle.
#[derive(Debug, Clone)]
pub struct TriangulationBuilder<V = ()> {
    vertices: Vec<TriVertex<V>>,
    lookup: HashMap<(u64, u64), VertexHandle>,
    constraints: Vec<(VertexHandle, VertexHandle)>,
}

impl<V: Default> Default for TriangulationBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Default> TriangulationBuilder<V> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            vertices: vec![TriVertex {
                point: Point2::origin(),
                info: V::default(),
                face: FaceHandle::NONE,
            }],
            lookup: HashMap::new(),
            constraints: Vec::new(),
        }
    }

    /// Insert a point, returning its vertex handle.
    ///
    /// If a vertex already exists at exactly this position its handle is
    /// returned and no new vertex is created.
    pub fn insert(&mut self, point: Point2<f64>) -> VertexHandle {
        // +0.0 so that -0.0 and 0.0 share a key.
        let key = ((point.x + 0.0).to_bits(), (point.y + 0.0).to_bits());
        if let Some(&vh) = self.lookup.get(&key) {
            return vh;
        }
        let vh = VertexHandle(self.vertices.len());
        self.vertices.push(TriVertex {
            point,
            info: V::default(),
            face: FaceHandle::NONE,
        });
        self.lookup.insert(key, vh);
        vh
    }
}

impl<V> TriangulationBuilder<V> {
    /// Record a constrained edge between two inserted vertices.
    ///
    /// Constraints from a vertex to itself are ignored.
    pub fn insert_constraint(&mut self, a: VertexHandle, b: VertexHandle) {
        if a != b {
            self.constraints.push((a, b));
        }
    }

    /// Mutable access to the user data of a vertex.
    pub fn info_mut(&mut self, v: VertexHandle) -> &mut V {
        &mut self.vertices[v.0].info
    }

    /// Number of finite vertices inserted so far.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() - 1
    }

    /// Triangulate the inserted points and recover all constraints.
    pub fn build<F: Default>(self) -> Result<ConstrainedTriangulation<V, F>, CdtError> {
        let mut cdt = ConstrainedTriangulation {
            vertices: self.vertices,
            faces: Vec::new(),
        };
        cdt.insert_all_points()?;
        for (a, b) in self.constraints {
            cdt.insert_constraint(a, b)?;
        }
        Ok(cdt)
    }
}

/// A constrained triangulation of the convex hull of a point set.
#[derive(Debug, Clone)]
pub struct ConstrainedTriangulation<V = (), F = ()> {
    vertices: Vec<TriVertex<V>>,
    faces: Vec<TriFace<F>>,
}

impl<V, F> ConstrainedTriangulation<V, F> {
    // ==================== Vertices ====================

    /// Number of finite vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() - 1
    }

    /// Iterate over finite vertex handles.
    pub fn finite_vertices(&self) -> impl Iterator<Item = VertexHandle> + '_ {
        (1..self.vertices.len()).map(VertexHandle)
    }

    /// Position of a finite vertex.
    #[inline]
    pub fn point(&self, v: VertexHandle) -> &Point2<f64> {
        &self.vertices[v.0].point
    }

    /// User data of a vertex.
    #[inline]
    pub fn vertex_info(&self, v: VertexHandle) -> &V {
        &self.vertices[v.0].info
    }

    /// Some face incident to `v`.
    #[inline]
    pub fn incident_face(&self, v: VertexHandle) -> FaceHandle {
        self.vertices[v.0].face
    }

    /// All faces incident to `v`, in counter-clockwise order.
    pub fn incident_faces(&self, v: VertexHandle) -> Vec<FaceHandle> {
        let start = self.incident_face(v);
        let mut result = Vec::new();
        if start == FaceHandle::NONE {
            return result;
        }
        let mut f = start;
        loop {
            result.push(f);
            let Some(i) = self.index_of(f, v) else {
                break;
            };
            f = self.neighbor(f, cw(i));
            if f == start || result.len() > self.faces.len() {
                break;
            }
        }
        result
    }

    // ==================== Faces ====================

    /// Total number of faces, including infinite ones.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Iterate over all face handles, including infinite faces.
    pub fn all_faces(&self) -> impl Iterator<Item = FaceHandle> + '_ {
        (0..self.faces.len()).map(FaceHandle)
    }

    /// Iterate over faces with three finite vertices.
    pub fn finite_faces(&self) -> impl Iterator<Item = FaceHandle> + '_ {
        self.all_faces().filter(move |&f| !self.is_infinite(f))
    }

    /// A face incident to the infinite vertex.
    pub fn infinite_face(&self) -> FaceHandle {
        self.vertices[VertexHandle::INFINITE.0].face
    }

    /// Whether a face is incident to the infinite vertex.
    #[inline]
    pub fn is_infinite(&self, f: FaceHandle) -> bool {
        self.faces[f.0].vertices.contains(&VertexHandle::INFINITE)
    }

    /// Vertex `i` of face `f`.
    #[inline]
    pub fn vertex(&self, f: FaceHandle, i: usize) -> VertexHandle {
        self.faces[f.0].vertices[i]
    }

    /// The three vertices of a face, counter-clockwise.
    #[inline]
    pub fn face_vertices(&self, f: FaceHandle) -> [VertexHandle; 3] {
        self.faces[f.0].vertices
    }

    /// Face across the edge opposite vertex `i` of `f`.
    #[inline]
    pub fn neighbor(&self, f: FaceHandle, i: usize) -> FaceHandle {
        self.faces[f.0].neighbors[i]
    }

    /// Position of `v` in face `f`.
    #[inline]
    pub fn index_of(&self, f: FaceHandle, v: VertexHandle) -> Option<usize> {
        self.faces[f.0].vertices.iter().position(|&w| w == v)
    }

    /// Index, in the neighbor across edge `i` of `f`, of the edge shared
    /// with `f`.
    ///
    /// Found by vertex rather than by back-pointer, so it is well defined
    /// even when both sides of `f` face the same neighbor.
    #[inline]
    pub fn mirror_index(&self, f: FaceHandle, i: usize) -> usize {
        let g = self.neighbor(f, i);
        let v = self.vertex(f, cw(i));
        // The shared edge runs (ccw(i), cw(i)) in f and reversed in g, so
        // the vertex at cw(i) in f sits at ccw(j) in g.
        self.index_of(g, v).map(cw).unwrap_or(0)
    }

    /// Whether the edge opposite vertex `i` of `f` is constrained.
    #[inline]
    pub fn is_constrained(&self, f: FaceHandle, i: usize) -> bool {
        self.faces[f.0].constrained[i]
    }

    /// Whether the edge `(a, b)` exists and is constrained.
    pub fn is_constrained_edge(&self, a: VertexHandle, b: VertexHandle) -> bool {
        self.find_edge(a, b)
            .map(|(f, i)| self.is_constrained(f, i))
            .unwrap_or(false)
    }

    /// User data of a face.
    #[inline]
    pub fn face_info(&self, f: FaceHandle) -> &F {
        &self.faces[f.0].info
    }

    /// Mutable user data of a face.
    #[inline]
    pub fn face_info_mut(&mut self, f: FaceHandle) -> &mut F {
        &mut self.faces[f.0].info
    }

    // ==================== Edges ====================

    /// Find the edge `(a, b)`: a face containing it and the index of the
    /// vertex opposite it.
    pub fn find_edge(&self, a: VertexHandle, b: VertexHandle) -> Option<(FaceHandle, usize)> {
        if a == b || self.vertices[a.0].face == FaceHandle::NONE {
            return None;
        }
        self.incident_faces(a).into_iter().find_map(|f| {
            let i = self.index_of(f, a)?;
            if self.vertex(f, ccw(i)) == b {
                Some((f, cw(i)))
            } else if self.vertex(f, cw(i)) == b {
                Some((f, ccw(i)))
            } else {
                None
            }
        })
    }

    /// Iterate over edges between two finite vertices, each reported once
    /// as `(face, index of opposite vertex)`.
    pub fn finite_edges(&self) -> impl Iterator<Item = (FaceHandle, usize)> + '_ {
        self.all_faces().flat_map(move |f| {
            (0..3).filter_map(move |i| {
                let g = self.neighbor(f, i);
                let finite = !self.vertex(f, ccw(i)).is_infinite()
                    && !self.vertex(f, cw(i)).is_infinite();
                (finite && f < g).then_some((f, i))
            })
        })
    }

    /// Check adjacency symmetry, orientation of finite faces and the
    /// consistency of constraint flags across shared edges.
    pub fn is_valid(&self) -> bool {
        for f in self.all_faces() {
            let face = &self.faces[f.0];
            for i in 0..3 {
                let g = face.neighbors[i];
                if g.0 >= self.faces.len() {
                    return false;
                }
                let Some(j) = self.faces[g.0].neighbors.iter().position(|&h| h == f) else {
                    return false;
                };
                let other = &self.faces[g.0];
                // Shared edge appears reversed in the neighbor.
                if other.vertices[ccw(j)] != face.vertices[cw(i)]
                    || other.vertices[cw(j)] != face.vertices[ccw(i)]
                {
                    return false;
                }
                if other.constrained[j] != face.constrained[i] {
                    return false;
                }
            }
            if !self.is_infinite(f) {
                let [a, b, c] = face.vertices;
                if predicates::orient2d(self.point(a), self.point(b), self.point(c)) <= 0.0 {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdt::predicates::incircle;

    fn build(points: &[(f64, f64)], constraints: &[(usize, usize)]) -> ConstrainedTriangulation {
        let mut builder: TriangulationBuilder = TriangulationBuilder::new();
        let handles: Vec<VertexHandle> = points
            .iter()
            .map(|&(x, y)| builder.insert(Point2::new(x, y)))
            .collect();
        for &(a, b) in constraints {
            builder.insert_constraint(handles[a], handles[b]);
        }
        builder.build().unwrap()
    }

    /// Unconstrained edges must be locally Delaunay.
    fn assert_constrained_delaunay(cdt: &ConstrainedTriangulation) {
        for (f, i) in cdt.finite_edges() {
            let g = cdt.neighbor(f, i);
            if cdt.is_constrained(f, i) || cdt.is_infinite(f) || cdt.is_infinite(g) {
                continue;
            }
            let [a, b, c] = cdt.face_vertices(f);
            let d = cdt.vertex(g, cdt.mirror_index(f, i));
            let det = incircle(cdt.point(a), cdt.point(b), cdt.point(c), cdt.point(d));
            assert!(det <= 1e-9, "edge of {:?} is not Delaunay ({})", f, det);
        }
    }

    #[test]
    fn test_single_triangle() {
        let cdt = build(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)], &[]);
        assert_eq!(cdt.num_vertices(), 3);
        assert_eq!(cdt.finite_faces().count(), 1);
        // One finite face plus one infinite face per hull edge.
        assert_eq!(cdt.num_faces(), 4);
        assert_eq!(cdt.finite_edges().count(), 3);
        assert!(cdt.is_valid());
        assert!(cdt.is_infinite(cdt.infinite_face()));
    }

    #[test]
    fn test_clockwise_input_is_reoriented() {
        let cdt = build(&[(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)], &[]);
        assert!(cdt.is_valid());
        assert_eq!(cdt.finite_faces().count(), 1);
    }

    #[test]
    fn test_duplicate_points_share_vertex() {
        let mut builder: TriangulationBuilder = TriangulationBuilder::new();
        let a = builder.insert(Point2::new(1.0, 2.0));
        let b = builder.insert(Point2::new(1.0, 2.0));
        assert_eq!(a, b);
        let c = builder.insert(Point2::new(0.0, -0.0));
        let d = builder.insert(Point2::new(-0.0, 0.0));
        assert_eq!(c, d);
        assert_eq!(builder.num_vertices(), 2);
    }

    #[test]
    fn test_collinear_fails() {
        let mut builder: TriangulationBuilder = TriangulationBuilder::new();
        for i in 0..5 {
            builder.insert(Point2::new(i as f64, 2.0 * i as f64));
        }
        assert_eq!(builder.build::<()>().unwrap_err(), CdtError::Degenerate);

        let mut builder: TriangulationBuilder = TriangulationBuilder::new();
        builder.insert(Point2::new(0.0, 0.0));
        builder.insert(Point2::new(1.0, 0.0));
        assert_eq!(builder.build::<()>().unwrap_err(), CdtError::Degenerate);
    }

    #[test]
    fn test_collinear_prefix_then_apex() {
        // Several collinear points before the first point off the line.
        let cdt = build(
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (-1.0, 0.0), (1.5, 2.0)],
            &[],
        );
        assert!(cdt.is_valid());
        // Fan from the apex over the 5 collinear points.
        assert_eq!(cdt.finite_faces().count(), 4);
    }

    #[test]
    fn test_grid_is_delaunay() {
        let mut points = Vec::new();
        for j in 0..5 {
            for i in 0..5 {
                // Perturb to avoid cocircular ties.
                let x = i as f64 + 0.013 * ((i * 7 + j * 3) % 5) as f64;
                let y = j as f64 + 0.011 * ((i * 2 + j * 5) % 7) as f64;
                points.push((x, y));
            }
        }
        let cdt = build(&points, &[]);
        assert!(cdt.is_valid());
        assert_eq!(cdt.num_vertices(), 25);
        assert_constrained_delaunay(&cdt);

        // Euler: F = 2V - h - 2 finite faces for h hull vertices.
        let hull = cdt.incident_faces(VertexHandle::INFINITE).len();
        assert_eq!(cdt.finite_faces().count(), 2 * 25 - hull - 2);
    }

    #[test]
    fn test_existing_edge_constraint() {
        let cdt = build(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)], &[(0, 1)]);
        let (f, i) = cdt.find_edge(VertexHandle(1), VertexHandle(2)).unwrap();
        assert!(cdt.is_constrained(f, i));
        let g = cdt.neighbor(f, i);
        assert!(cdt.is_constrained(g, cdt.mirror_index(f, i)));
        assert!(cdt.is_valid());
    }

    #[test]
    fn test_constraint_forces_non_delaunay_edge() {
        // A wide, flat quad: the Delaunay diagonal is 1-3, force 0-2.
        let points = [(0.0, 0.0), (4.0, -1.0), (8.0, 0.0), (4.0, 1.0)];
        let free = build(&points, &[]);
        assert!(free.find_edge(VertexHandle(2), VertexHandle(4)).is_some());
        assert!(free.find_edge(VertexHandle(1), VertexHandle(3)).is_none());

        let cdt = build(&points, &[(0, 2)]);
        assert!(cdt.is_valid());
        assert!(cdt.is_constrained_edge(VertexHandle(1), VertexHandle(3)));
        assert!(cdt.find_edge(VertexHandle(2), VertexHandle(4)).is_none());
    }

    #[test]
    fn test_long_constraint_crossing_many_edges() {
        // Zig-zag points above and below the x axis, constraint along it.
        let mut points = vec![(0.0, 0.0), (10.0, 0.0)];
        for i in 1..10 {
            let y = if i % 2 == 0 { 0.3 } else { -0.3 };
            points.push((i as f64, y));
            points.push((i as f64 + 0.5, -y));
        }
        let cdt = build(&points, &[(0, 1)]);
        assert!(cdt.is_valid());
        assert!(cdt.is_constrained_edge(VertexHandle(1), VertexHandle(2)));
        assert_constrained_delaunay(&cdt);
    }

    #[test]
    fn test_constraint_through_vertex_is_split() {
        let points = [(0.0, 0.0), (2.0, 0.0), (1.0, 0.0), (1.0, 1.0), (1.0, -1.0)];
        let cdt = build(&points, &[(0, 1)]);
        assert!(cdt.is_valid());
        assert!(cdt.is_constrained_edge(VertexHandle(1), VertexHandle(3)));
        assert!(cdt.is_constrained_edge(VertexHandle(3), VertexHandle(2)));
        assert!(cdt.find_edge(VertexHandle(1), VertexHandle(2)).is_none());
    }

    #[test]
    fn test_crossing_constraints_fail() {
        let mut builder: TriangulationBuilder = TriangulationBuilder::new();
        let a = builder.insert(Point2::new(0.0, 0.0));
        let b = builder.insert(Point2::new(2.0, 2.0));
        let c = builder.insert(Point2::new(2.0, 0.0));
        let d = builder.insert(Point2::new(0.0, 2.0));
        builder.insert_constraint(a, b);
        builder.insert_constraint(c, d);
        assert!(matches!(
            builder.build::<()>(),
            Err(CdtError::IntersectingConstraints(_, _))
        ));
    }

    #[test]
    fn test_incident_faces_of_interior_vertex() {
        let cdt = build(
            &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (1.0, 1.1)],
            &[],
        );
        let center = VertexHandle(5);
        let around = cdt.incident_faces(center);
        assert_eq!(around.len(), 4);
        assert!(around.iter().all(|&f| !cdt.is_infinite(f)));

        let start = cdt.incident_face(center);
        assert_eq!(around[0], start);
        assert!(cdt.index_of(start, center).is_some());
        for v in cdt.finite_vertices() {
            assert!(cdt.index_of(cdt.incident_face(v), v).is_some());
        }
    }
}
