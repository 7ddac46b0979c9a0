//! Incremental point insertion (Bowyer-Watson) and cavity retriangulation.

use std::collections::{HashMap, HashSet, VecDeque};

use log::trace;

use super::predicates::{incircle, orient2d, strictly_between};
use super::{ccw, cw, CdtError, ConstrainedTriangulation, FaceHandle, TriFace, VertexHandle};

type EdgeKey = (VertexHandle, VertexHandle);

impl<V, F: Default> ConstrainedTriangulation<V, F> {
    /// Triangulate every vertex collected by the builder.
    ///
    /// The first non-collinear triple seeds one finite face and three
    /// infinite faces; the remaining points are inserted one by one.
    pub(super) fn insert_all_points(&mut self) -> Result<(), CdtError> {
        let n = self.vertices.len();
        if n < 4 {
            return Err(CdtError::Degenerate);
        }

        let a = VertexHandle(1);
        let b = VertexHandle(2);
        let c = (3..n)
            .map(VertexHandle)
            .find(|&c| orient2d(self.point(a), self.point(b), self.point(c)) != 0.0)
            .ok_or(CdtError::Degenerate)?;
        let (a, b) = if orient2d(self.point(a), self.point(b), self.point(c)) > 0.0 {
            (a, b)
        } else {
            (b, a)
        };

        trace!("seeding triangulation with {:?} {:?} {:?}", a, b, c);
        let inf = VertexHandle::INFINITE;
        self.retriangulate(&[], &[[a, b, c], [inf, c, b], [inf, a, c], [inf, b, a]])?;

        for v in (1..n).map(VertexHandle) {
            if v != a && v != b && v != c {
                self.insert_point(v)?;
            }
        }
        Ok(())
    }

    /// Insert one vertex: remove every face whose circumcircle contains it
    /// and fan the cavity boundary to the new vertex.
    fn insert_point(&mut self, v: VertexHandle) -> Result<(), CdtError> {
        let seed = self
            .locate(v)
            .ok_or(CdtError::Inconsistent("point is not inside any face"))?;

        let mut cavity = vec![seed];
        let mut in_cavity = HashSet::from([seed]);
        let mut queue = VecDeque::from([seed]);
        while let Some(f) = queue.pop_front() {
            for i in 0..3 {
                let g = self.neighbor(f, i);
                if !in_cavity.contains(&g) && self.in_conflict(g, v) {
                    in_cavity.insert(g);
                    cavity.push(g);
                    queue.push_back(g);
                }
            }
        }

        let mut triangles = Vec::with_capacity(cavity.len() + 2);
        for &f in &cavity {
            for i in 0..3 {
                if !in_cavity.contains(&self.neighbor(f, i)) {
                    triangles.push([v, self.vertex(f, ccw(i)), self.vertex(f, cw(i))]);
                }
            }
        }

        self.retriangulate(&cavity, &triangles)?;
        Ok(())
    }

    /// A face containing `v`, or an infinite face it can see if `v` is
    /// outside the convex hull.
    fn locate(&self, v: VertexHandle) -> Option<FaceHandle> {
        let p = self.point(v);
        self.finite_faces()
            .find(|&f| {
                let [a, b, c] = self.face_vertices(f);
                let (a, b, c) = (self.point(a), self.point(b), self.point(c));
                orient2d(a, b, p) >= 0.0 && orient2d(b, c, p) >= 0.0 && orient2d(c, a, p) >= 0.0
            })
            .or_else(|| {
                self.all_faces()
                    .find(|&f| self.is_infinite(f) && self.in_conflict(f, v))
            })
    }

    /// Whether `v` lies in the circumcircle of `f`.
    ///
    /// For an infinite face the "circumcircle" is the open half-plane beyond
    /// its hull edge, plus the open hull edge itself.
    fn in_conflict(&self, f: FaceHandle, v: VertexHandle) -> bool {
        let p = self.point(v);
        match self.index_of(f, VertexHandle::INFINITE) {
            Some(k) => {
                let a = self.point(self.vertex(f, ccw(k)));
                let b = self.point(self.vertex(f, cw(k)));
                let o = orient2d(a, b, p);
                o > 0.0 || (o == 0.0 && strictly_between(a, b, p))
            }
            None => {
                let [a, b, c] = self.face_vertices(f);
                incircle(self.point(a), self.point(b), self.point(c), p) > 0.0
            }
        }
    }

    /// Replace the faces `removed` by `triangles`, which must tile the same
    /// region.
    ///
    /// Adjacency across the region boundary is rebuilt by matching directed
    /// edges, and constraint flags on boundary edges survive. Removed slots
    /// are reused before new ones are appended.
    pub(super) fn retriangulate(
        &mut self,
        removed: &[FaceHandle],
        triangles: &[[VertexHandle; 3]],
    ) -> Result<Vec<FaceHandle>, CdtError> {
        if triangles.len() < removed.len() {
            return Err(CdtError::Inconsistent(
                "retriangulation has fewer faces than the cavity",
            ));
        }

        let gone: HashSet<FaceHandle> = removed.iter().copied().collect();
        let mut boundary: HashMap<EdgeKey, (FaceHandle, usize, bool)> = HashMap::new();
        for &f in removed {
            for i in 0..3 {
                let g = self.neighbor(f, i);
                if !gone.contains(&g) {
                    let key = (self.vertex(f, ccw(i)), self.vertex(f, cw(i)));
                    boundary.insert(key, (g, self.mirror_index(f, i), self.is_constrained(f, i)));
                }
            }
        }

        let mut handles = Vec::with_capacity(triangles.len());
        for (k, &vertices) in triangles.iter().enumerate() {
            let face = TriFace {
                vertices,
                neighbors: [FaceHandle::NONE; 3],
                constrained: [false; 3],
                info: F::default(),
            };
            let f = match removed.get(k) {
                Some(&f) => {
                    self.faces[f.0] = face;
                    f
                }
                None => {
                    self.faces.push(face);
                    FaceHandle(self.faces.len() - 1)
                }
            };
            for v in vertices {
                self.vertices[v.0].face = f;
            }
            handles.push(f);
        }

        let mut open: HashMap<EdgeKey, (FaceHandle, usize)> = HashMap::new();
        for &f in &handles {
            for i in 0..3 {
                let u = self.vertex(f, ccw(i));
                let w = self.vertex(f, cw(i));
                if let Some((g, j, constrained)) = boundary.remove(&(u, w)) {
                    self.faces[f.0].neighbors[i] = g;
                    self.faces[f.0].constrained[i] = constrained;
                    self.faces[g.0].neighbors[j] = f;
                } else if let Some((g, j)) = open.remove(&(w, u)) {
                    self.faces[f.0].neighbors[i] = g;
                    self.faces[g.0].neighbors[j] = f;
                } else {
                    open.insert((u, w), (f, i));
                }
            }
        }

        if !open.is_empty() || !boundary.is_empty() {
            return Err(CdtError::Inconsistent(
                "retriangulation does not close the cavity",
            ));
        }
        Ok(handles)
    }
}
