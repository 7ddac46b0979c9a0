//! Constraint recovery.
//!
//! A missing constrained edge `(a, b)` is recovered by walking from `a`
//! toward `b`, collecting the faces the segment crosses together with the
//! vertices on its left and right, then retriangulating the two
//! pseudo-polygons on either side of the new edge.

use log::trace;

use super::predicates::{incircle, orient2d};
use super::{ccw, cw, CdtError, ConstrainedTriangulation, FaceHandle, VertexHandle};

/// Outcome of walking a constraint segment through the triangulation.
enum Trace {
    /// The segment passes through this vertex and must be split there.
    Through(VertexHandle),
    /// The segment crosses these faces, which are bounded on the left and
    /// right by the given vertex chains, ordered from `a` toward `b`.
    Crossing {
        faces: Vec<FaceHandle>,
        left: Vec<VertexHandle>,
        right: Vec<VertexHandle>,
    },
}

impl<V, F: Default> ConstrainedTriangulation<V, F> {
    /// Force the segment `(a, b)` into the triangulation.
    ///
    /// A segment through existing vertices is split into subsegments, each
    /// of which is marked constrained.
    pub(super) fn insert_constraint(
        &mut self,
        a: VertexHandle,
        b: VertexHandle,
    ) -> Result<(), CdtError> {
        let finite = |v: VertexHandle| !v.is_infinite() && v.0 < self.vertices.len();
        if !finite(a) || !finite(b) {
            return Err(CdtError::Inconsistent(
                "constraint endpoint is not a finite vertex",
            ));
        }

        let mut pending = vec![(a, b)];
        while let Some((a, b)) = pending.pop() {
            if a == b {
                continue;
            }
            if let Some((f, i)) = self.find_edge(a, b) {
                self.set_constrained(f, i);
                continue;
            }

            match self.trace(a, b)? {
                Trace::Through(c) => {
                    trace!("constraint {:?}-{:?} split at {:?}", a, b, c);
                    pending.push((c, b));
                    pending.push((a, c));
                }
                Trace::Crossing { faces, left, right } => {
                    trace!(
                        "constraint {:?}-{:?} crosses {} faces",
                        a,
                        b,
                        faces.len()
                    );
                    let mut triangles = Vec::with_capacity(faces.len());
                    let left: Vec<VertexHandle> = left.into_iter().rev().collect();
                    self.fill_pseudo_polygon(a, b, &left, &mut triangles);
                    self.fill_pseudo_polygon(b, a, &right, &mut triangles);
                    self.retriangulate(&faces, &triangles)?;

                    let (f, i) = self
                        .find_edge(a, b)
                        .ok_or(CdtError::Inconsistent("recovered constraint edge is missing"))?;
                    self.set_constrained(f, i);
                }
            }
        }
        Ok(())
    }

    fn set_constrained(&mut self, f: FaceHandle, i: usize) {
        let g = self.neighbor(f, i);
        let j = self.mirror_index(f, i);
        self.faces[f.0].constrained[i] = true;
        self.faces[g.0].constrained[j] = true;
    }

    /// Walk the segment `(a, b)` face by face.
    fn trace(&self, a: VertexHandle, b: VertexHandle) -> Result<Trace, CdtError> {
        let pa = *self.point(a);
        let pb = *self.point(b);
        let ahead = |v: VertexHandle| (*self.point(v) - pa).dot(&(pb - pa)) > 0.0;

        // Find the face around `a` whose opposite edge the segment leaves
        // through: `u` strictly right of the segment, `w` strictly left.
        let mut start = None;
        for f in self.incident_faces(a) {
            if self.is_infinite(f) {
                continue;
            }
            let Some(i) = self.index_of(f, a) else {
                continue;
            };
            let u = self.vertex(f, ccw(i));
            let w = self.vertex(f, cw(i));
            let ou = orient2d(&pa, &pb, self.point(u));
            let ow = orient2d(&pa, &pb, self.point(w));
            if ou == 0.0 && ahead(u) {
                return Ok(Trace::Through(u));
            }
            if ow == 0.0 && ahead(w) {
                return Ok(Trace::Through(w));
            }
            if ou < 0.0 && ow > 0.0 {
                start = Some((f, i, u, w));
                break;
            }
        }
        let (mut f, mut i, mut u, mut w) = start.ok_or(CdtError::Inconsistent(
            "constraint does not leave its start vertex",
        ))?;

        let mut faces = vec![f];
        let mut left = vec![w];
        let mut right = vec![u];
        loop {
            if self.is_constrained(f, i) {
                return Err(CdtError::IntersectingConstraints(a, b));
            }
            let g = self.neighbor(f, i);
            if self.is_infinite(g) {
                return Err(CdtError::Inconsistent("constraint leaves the convex hull"));
            }
            let s = self.vertex(g, self.mirror_index(f, i));
            faces.push(g);
            if s == b {
                break;
            }

            let os = orient2d(&pa, &pb, self.point(s));
            if os == 0.0 {
                return Ok(Trace::Through(s));
            }
            let (keep, next) = if os > 0.0 {
                left.push(s);
                let keep = u;
                w = s;
                (keep, w)
            } else {
                right.push(s);
                let keep = w;
                u = s;
                (keep, u)
            };
            // The next crossed edge joins `keep` and the new vertex, so it is
            // opposite the third vertex of `g`.
            i = (0..3)
                .find(|&k| {
                    let x = self.vertex(g, k);
                    x != keep && x != next
                })
                .ok_or(CdtError::Inconsistent("walked into a degenerate face"))?;
            f = g;
        }

        Ok(Trace::Crossing { faces, left, right })
    }

    /// Triangulate the pseudo-polygon `s, t, chain...` (counter-clockwise)
    /// choosing, for each base edge, the chain vertex whose circumcircle
    /// with the base contains no other chain vertex.
    fn fill_pseudo_polygon(
        &self,
        s: VertexHandle,
        t: VertexHandle,
        chain: &[VertexHandle],
        out: &mut Vec<[VertexHandle; 3]>,
    ) {
        if chain.is_empty() {
            return;
        }
        let (ps, pt) = (self.point(s), self.point(t));
        let mut k = 0;
        for (m, &d) in chain.iter().enumerate().skip(1) {
            if incircle(ps, pt, self.point(chain[k]), self.point(d)) > 0.0 {
                k = m;
            }
        }
        let c = chain[k];
        out.push([s, t, c]);
        self.fill_pseudo_polygon(c, t, &chain[..k], out);
        self.fill_pseudo_polygon(s, c, &chain[k + 1..], out);
    }
}
