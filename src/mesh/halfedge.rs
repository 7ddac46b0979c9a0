//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list)
//! representation for polygon meshes. Faces may have any number of sides.
//!
//! # Structure
//!
//! - Each edge is split into two **half-edges** pointing in opposite
//!   directions, stored next to each other (`2k`, `2k + 1`)
//! - Each half-edge knows its **twin**, **next**, **prev**, **target vertex**
//!   and incident **face**
//! - Each vertex stores one incoming half-edge (one whose target it is)
//! - Each face stores one half-edge on its boundary
//!
//! # Border Handling
//!
//! Border half-edges (on mesh boundaries or around holes) have an invalid
//! face ID. Their `next` pointers link them into loops, so a hole left by
//! [`HalfEdgeMesh::cut_face`] is itself a traversable cycle.
//!
//! # Removed Faces
//!
//! Removing a face leaves a tombstone in the face arena; the slot is reused
//! by the next [`HalfEdgeMesh::fill_hole`]. Arenas never shrink, so ids held
//! across a sequence of cut/fill operations stay meaningful.

use nalgebra::{Point3, Vector3};

use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One incoming half-edge (targeting this vertex).
    /// For boundary vertices this is a border half-edge when one exists.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new isolated vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge points to.
    pub target: VertexId<I>,

    /// The opposite half-edge.
    pub twin: HalfEdgeId<I>,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to. Invalid for border half-edges.
    pub face: FaceId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unlinked half-edge.
    pub fn new() -> Self {
        Self {
            target: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
        }
    }

    /// Check if this half-edge is a border half-edge (has no face).
    #[inline]
    pub fn is_border(&self) -> bool {
        !self.face.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge on the boundary of this face. Invalid for removed slots.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face with the given boundary half-edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self { halfedge }
    }

    /// Whether this slot holds a live face.
    #[inline]
    pub fn is_live(&self) -> bool {
        self.halfedge.is_valid()
    }
}

/// A half-edge mesh for polygon meshes.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) faces: Vec<Face<I>>,
    /// Removed face slots, reused by `add_face`.
    pub(crate) free_faces: Vec<FaceId<I>>,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: Vec::new(),
            free_faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_edges: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_edges * 2),
            faces: Vec::with_capacity(num_faces),
            free_faces: Vec::new(),
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

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.halfedges.len() / 2
    }

    /// Get the number of live faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len() - self.free_faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by ID.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get a mutable half-edge by ID.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Check whether a face ID refers to a live face.
    #[inline]
    pub fn is_live_face(&self, id: FaceId<I>) -> bool {
        id.is_valid() && id.index() < self.faces.len() && self.faces[id.index()].is_live()
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the vertex a half-edge points to.
    #[inline]
    pub fn target(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).target
    }

    /// Get the vertex a half-edge starts from.
    #[inline]
    pub fn source(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.target(self.twin(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Check if a half-edge is a border half-edge.
    #[inline]
    pub fn is_border_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_border()
    }

    /// Check if an edge (given by one of its half-edges) is on the boundary.
    #[inline]
    pub fn is_boundary_edge(&self, he: HalfEdgeId<I>) -> bool {
        self.is_border_halfedge(he) || self.is_border_halfedge(self.twin(he))
    }

    /// Check if a vertex is on the boundary.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        if !self.vertex(v).halfedge.is_valid() {
            return true; // Isolated vertex
        }
        self.vertex_halfedges(v)
            .any(|he| self.is_border_halfedge(he) || self.is_border_halfedge(self.twin(he)))
    }

    /// Number of sides of a face.
    pub fn face_degree(&self, f: FaceId<I>) -> usize {
        self.face_halfedges(f).count()
    }

    /// Whether every live face is a triangle.
    pub fn is_triangle_mesh(&self) -> bool {
        self.face_ids().all(|f| self.face_degree(f) == 3)
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all vertices with their IDs.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId<I>, &Vertex<I>)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all half-edges with their IDs.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeId<I>, &HalfEdge<I>)> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .map(|(i, he)| (HalfEdgeId::new(i), he))
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        (0..self.num_edges()).map(EdgeId::new)
    }

    /// Iterate over the IDs of live faces.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_live())
            .map(|(i, _)| FaceId::new(i))
    }

    /// Iterate over half-edges pointing into a vertex.
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over half-edges around a face, starting at its stored half-edge.
    pub fn face_halfedges(&self, f: FaceId<I>) -> CycleIter<'_, I> {
        CycleIter::new(self, self.face(f).halfedge)
    }

    /// Iterate over the `next` cycle starting at any half-edge.
    ///
    /// Works for border loops as well as faces.
    pub fn cycle(&self, start: HalfEdgeId<I>) -> CycleIter<'_, I> {
        CycleIter::new(self, start)
    }

    /// Iterate over the vertices of a face, in boundary order.
    ///
    /// Yields the target of each boundary half-edge.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.target(he))
    }

    /// Positions of the vertices of a face, in boundary order.
    pub fn face_positions(&self, f: FaceId<I>) -> Vec<Point3<f64>> {
        self.face_vertices(f).map(|v| *self.position(v)).collect()
    }

    // ==================== Geometry ====================

    /// Newell normal of a face (unnormalized; its length is twice the area
    /// of a planar face).
    pub fn face_newell_vector(&self, f: FaceId<I>) -> Vector3<f64> {
        newell_vector(&self.face_positions(f))
    }

    /// Unit normal of a face. Zero for degenerate faces.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        self.face_newell_vector(f)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Area of a face (exact for planar faces).
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        0.5 * self.face_newell_vector(f).norm()
    }

    /// Centroid of the vertices of a face.
    pub fn face_centroid(&self, f: FaceId<I>) -> Point3<f64> {
        let positions = self.face_positions(f);
        let sum: Vector3<f64> = positions.iter().map(|p| p.coords).sum();
        Point3::from(sum / positions.len().max(1) as f64)
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let (mut min, mut max) = (first, first);

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    // ==================== Construction ====================

    /// Check that `edges` new edges and `faces` new faces can be added
    /// without running out of indices. Removed face slots count as free.
    pub fn ensure_capacity(&self, edges: usize, faces: usize) -> Result<()> {
        check_capacity::<I>("half-edge", self.halfedges.len(), 2 * edges)?;
        let new_faces = faces.saturating_sub(self.free_faces.len());
        check_capacity::<I>("face", self.faces.len(), new_faces)
    }

    /// Add a new isolated vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> Result<VertexId<I>> {
        check_capacity::<I>("vertex", self.vertices.len(), 1)?;
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        Ok(id)
    }

    /// Add a new edge and return its first half-edge.
    ///
    /// The two half-edges are twins of each other and otherwise unlinked:
    /// no target, no face, no next/prev.
    pub fn add_edge(&mut self) -> Result<HalfEdgeId<I>> {
        self.ensure_capacity(1, 0)?;
        let h = HalfEdgeId::new(self.halfedges.len());
        let t = HalfEdgeId::new(self.halfedges.len() + 1);
        self.halfedges.push(HalfEdge {
            twin: t,
            ..HalfEdge::new()
        });
        self.halfedges.push(HalfEdge {
            twin: h,
            ..HalfEdge::new()
        });
        Ok(h)
    }

    /// Set the target vertex of a half-edge.
    #[inline]
    pub fn set_target(&mut self, he: HalfEdgeId<I>, v: VertexId<I>) {
        self.halfedge_mut(he).target = v;
    }

    /// Link `h` to `next`, keeping `prev` consistent.
    #[inline]
    pub fn set_next(&mut self, h: HalfEdgeId<I>, next: HalfEdgeId<I>) {
        self.halfedge_mut(h).next = next;
        self.halfedge_mut(next).prev = h;
    }

    /// Set the face of a half-edge.
    #[inline]
    pub fn set_face(&mut self, he: HalfEdgeId<I>, f: FaceId<I>) {
        self.halfedge_mut(he).face = f;
    }

    /// Set the stored incoming half-edge of a vertex.
    #[inline]
    pub fn set_vertex_halfedge(&mut self, v: VertexId<I>, he: HalfEdgeId<I>) {
        self.vertex_mut(v).halfedge = he;
    }

    /// Add a face record pointing at `halfedge`, reusing a removed slot if
    /// one is available. Does not touch the half-edges.
    pub fn add_face(&mut self, halfedge: HalfEdgeId<I>) -> Result<FaceId<I>> {
        if let Some(f) = self.free_faces.pop() {
            self.faces[f.index()] = Face::new(halfedge);
            Ok(f)
        } else {
            check_capacity::<I>("face", self.faces.len(), 1)?;
            let f = FaceId::new(self.faces.len());
            self.faces.push(Face::new(halfedge));
            Ok(f)
        }
    }

    /// Remove a face record. Does not touch the half-edges.
    pub fn remove_face(&mut self, f: FaceId<I>) {
        debug_assert!(self.is_live_face(f), "removing dead face {:?}", f);
        self.faces[f.index()] = Face::new(HalfEdgeId::invalid());
        self.free_faces.push(f);
    }

    // ==================== Euler Primitives ====================

    /// Remove the face incident to `h`, leaving a hole.
    ///
    /// Every half-edge of the face becomes a border half-edge; the `next`
    /// cycle is kept, so the hole is bounded by exactly the same half-edges.
    pub fn cut_face(&mut self, h: HalfEdgeId<I>) -> Result<FaceId<I>> {
        let f = self.face_of(h);
        if !f.is_valid() {
            return Err(MeshError::InvalidState(format!(
                "cannot cut face at border half-edge {:?}",
                h
            )));
        }

        let cycle: Vec<HalfEdgeId<I>> = self.cycle(h).collect();
        for he in cycle {
            self.set_face(he, FaceId::invalid());
            // Boundary vertices should point to a border half-edge.
            let v = self.target(he);
            self.set_vertex_halfedge(v, he);
        }
        self.remove_face(f);
        Ok(f)
    }

    /// Create a new face bounded by the border cycle through `h`.
    ///
    /// The `next` links of the cycle must already be set; every half-edge of
    /// the cycle must be a border half-edge.
    pub fn fill_hole(&mut self, h: HalfEdgeId<I>) -> Result<FaceId<I>> {
        let mut cycle = Vec::new();
        let mut he = h;
        loop {
            if !self.is_border_halfedge(he) {
                return Err(MeshError::InvalidState(format!(
                    "cannot fill hole: half-edge {:?} already has face {:?}",
                    he,
                    self.face_of(he)
                )));
            }
            cycle.push(he);
            he = self.next(he);
            if he == h {
                break;
            }
            if !he.is_valid() || cycle.len() > self.halfedges.len() {
                return Err(MeshError::InvalidState(format!(
                    "cannot fill hole: cycle through {:?} does not close",
                    h
                )));
            }
        }

        let f = self.add_face(h)?;
        for he in cycle {
            self.set_face(he, f);
        }
        self.refresh_vertex_halfedges(f);
        Ok(f)
    }

    /// Re-point vertices of a face that no longer have an incoming border
    /// half-edge at one of the face's half-edges.
    fn refresh_vertex_halfedges(&mut self, f: FaceId<I>) {
        let cycle: Vec<HalfEdgeId<I>> = self.face_halfedges(f).collect();
        for he in cycle {
            let v = self.target(he);
            let current = self.vertex(v).halfedge;
            let stale = !current.is_valid() || self.target(current) != v;
            if stale || !self.is_border_halfedge(current) {
                let border = self.vertex_halfedges(v).find(|&h| self.is_border_halfedge(h));
                self.set_vertex_halfedge(v, border.unwrap_or(he));
            }
        }
    }

    // ==================== Validation ====================

    /// Check connectivity and report the first inconsistency found.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(MeshError::InvalidState(msg));

        for (vid, v) in self.vertices() {
            if v.halfedge.is_valid() && self.target(v.halfedge) != vid {
                return fail(format!("{:?} points at {:?} which targets elsewhere", vid, v.halfedge));
            }
        }

        for (heid, he) in self.halfedges() {
            if !he.twin.is_valid() || self.twin(he.twin) != heid {
                return fail(format!("{:?} has inconsistent twin", heid));
            }
            if he.twin.edge() != heid.edge() {
                return fail(format!("{:?} twin is not in the same edge slot", heid));
            }
            if !he.target.is_valid() || he.target == self.target(he.twin) {
                return fail(format!("{:?} has missing or looped target", heid));
            }
            if !he.next.is_valid() || !he.prev.is_valid() {
                return fail(format!("{:?} is not linked into a cycle", heid));
            }
            if self.prev(he.next) != heid || self.next(he.prev) != heid {
                return fail(format!("{:?} has inconsistent next/prev", heid));
            }
            if self.source(he.next) != he.target {
                return fail(format!("{:?} next does not start at its target", heid));
            }
            if self.face_of(he.next) != he.face {
                return fail(format!("{:?} next belongs to another face", heid));
            }
            if he.face.is_valid() && !self.is_live_face(he.face) {
                return fail(format!("{:?} references removed face {:?}", heid, he.face));
            }
        }

        for f in self.face_ids() {
            let start = self.face(f).halfedge;
            if self.face_of(start) != f {
                return fail(format!("{:?} boundary half-edge belongs elsewhere", f));
            }
            if self.face_degree(f) < 3 {
                return fail(format!("{:?} has fewer than three sides", f));
            }
        }

        Ok(())
    }

    /// Check if the mesh is valid (all connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Newell's method: sum of cross products of consecutive positions.
/// Fail if `count` elements appended to `len` existing ones would need an
/// index above `I::MAX`.
fn check_capacity<I: MeshIndex>(element: &'static str, len: usize, count: usize) -> Result<()> {
    if count == 0 {
        return Ok(());
    }
    let fits = len
        .checked_add(count - 1)
        .and_then(I::try_from_usize)
        .is_some();
    if fits {
        Ok(())
    } else {
        Err(MeshError::IndexOverflow {
            element,
            capacity: I::MAX.to_usize().saturating_add(1),
        })
    }
}

pub(crate) fn newell_vector(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let p = &points[i];
        let q = &points[(i + 1) % n];
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }
    normal
}

/// Iterator over half-edges pointing into a vertex.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    remaining: usize,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            remaining: if start.is_valid() { mesh.num_halfedges() } else { 0 },
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let result = self.current;

        // `next(he)` leaves the vertex; its twin comes back in.
        let next = self.mesh.next(self.current);
        self.current = if next.is_valid() {
            self.mesh.twin(next)
        } else {
            self.start
        };

        if self.current == self.start {
            self.remaining = 0;
        }

        Some(result)
    }
}

/// Iterator over a `next` cycle of half-edges.
pub struct CycleIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    remaining: usize,
}

impl<'a, I: MeshIndex> CycleIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, start: HalfEdgeId<I>) -> Self {
        Self {
            mesh,
            start,
            current: start,
            // Bound the walk so a broken cycle cannot loop forever.
            remaining: if start.is_valid() { mesh.num_halfedges() } else { 0 },
        }
    }
}

impl<'a, I: MeshIndex> Iterator for CycleIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || !self.current.is_valid() {
            return None;
        }
        self.remaining -= 1;

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.remaining = 0;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;

    fn unit_square() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_polygons(&vertices, &[vec![0, 1, 2, 3]]).unwrap()
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
        assert!(mesh.bounding_box().is_none());
    }

    #[test]
    fn test_add_edge_pairs_twins() {
        let mut mesh = HalfEdgeMesh::<u32>::new();
        let h = mesh.add_edge().unwrap();
        let t = mesh.twin(h);
        assert_eq!(h.index(), 0);
        assert_eq!(t.index(), 1);
        assert_eq!(mesh.twin(t), h);
        assert_eq!(h.edge(), t.edge());
        assert_eq!(mesh.num_edges(), 1);
    }

    #[test]
    fn test_index_space_exhaustion() {
        // u16 addresses half-edges 0..=65533; 65535 is the null index.
        let mut mesh = HalfEdgeMesh::<u16>::new();
        for _ in 0..32767 {
            mesh.add_edge().unwrap();
        }
        assert_eq!(mesh.num_halfedges(), 65534);
        assert!(mesh.ensure_capacity(0, 3).is_ok());

        let err = mesh.add_edge().unwrap_err();
        assert!(matches!(
            err,
            MeshError::IndexOverflow { element: "half-edge", capacity: 65535 }
        ));
        assert_eq!(mesh.num_halfedges(), 65534);
    }

    #[test]
    fn test_square_geometry() {
        let mesh = unit_square();
        let f = FaceId::new(0);
        assert_eq!(mesh.face_degree(f), 4);
        assert!((mesh.face_area(f) - 1.0).abs() < 1e-12);
        assert!((mesh.face_normal(f) - Vector3::z()).norm() < 1e-12);

        let c = mesh.face_centroid(f);
        assert!((c - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
        assert!(!mesh.is_triangle_mesh());
    }

    #[test]
    fn test_cut_and_fill_roundtrip() {
        let mut mesh = unit_square();
        let f = FaceId::new(0);
        let h = mesh.face(f).halfedge;
        let before: Vec<_> = mesh.cycle(h).collect();

        let removed = mesh.cut_face(h).unwrap();
        assert_eq!(removed, f);
        assert_eq!(mesh.num_faces(), 0);
        assert!(before.iter().all(|&he| mesh.is_border_halfedge(he)));
        assert_eq!(mesh.cycle(h).collect::<Vec<_>>(), before);

        let refilled = mesh.fill_hole(h).unwrap();
        // The removed slot is reused.
        assert_eq!(refilled, f);
        assert_eq!(mesh.num_faces(), 1);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_cut_border_halfedge_fails() {
        let mut mesh = unit_square();
        let h = mesh.face(FaceId::new(0)).halfedge;
        let border = mesh.twin(h);
        assert!(mesh.cut_face(border).is_err());
    }

    #[test]
    fn test_fill_non_border_fails() {
        let mut mesh = unit_square();
        let h = mesh.face(FaceId::new(0)).halfedge;
        assert!(mesh.fill_hole(h).is_err());
    }

    #[test]
    fn test_vertex_halfedges_target_vertex() {
        let mesh = unit_square();
        for v in mesh.vertex_ids() {
            let incoming: Vec<_> = mesh.vertex_halfedges(v).collect();
            assert_eq!(incoming.len(), 2);
            assert!(incoming.iter().all(|&he| mesh.target(he) == v));
            assert!(mesh.is_boundary_vertex(v));
        }
    }
}
