//! Splicing the interior cells of a planar triangulation back into the mesh.
//!
//! Stitching runs in two phases. [`plan`] decides, for every side of every
//! interior cell, which mesh half-edge it becomes: the original boundary
//! half-edge for constrained sides, or one side of a new diagonal edge. The
//! plan is checked completely before [`apply`] touches the mesh, so a face
//! that cannot be stitched is left exactly as it was.

use std::collections::HashSet;

use crate::cdt::{ccw, cw, FaceHandle};
use crate::error::{MeshError, Result};
use crate::mesh::{EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

use super::planar::PlanarTriangulation;

/// Planned mesh half-edge for one side of a triangulation cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Slot<I: MeshIndex> {
    /// An original boundary half-edge of the face.
    Boundary(HalfEdgeId<I>),
    /// One side of the `index`-th new diagonal: side 0 is the first
    /// half-edge of the edge, side 1 its twin.
    Diagonal { index: usize, side: usize },
}

/// A validated stitching plan for one face.
#[derive(Debug, Clone)]
pub(super) struct StitchPlan<I: MeshIndex> {
    face: FaceId<I>,
    /// Targets of the two half-edges of each new diagonal.
    diagonals: Vec<[VertexId<I>; 2]>,
    /// Half-edge slots of each new triangle, in cycle order.
    triangles: Vec<[Slot<I>; 3]>,
}

impl<I: MeshIndex> StitchPlan<I> {
    /// Number of triangles the face becomes.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Number of new diagonal edges.
    pub fn num_diagonals(&self) -> usize {
        self.diagonals.len()
    }
}

/// Assign mesh half-edges to the sides of all interior cells and check that
/// they close into triangles using every boundary half-edge exactly once.
pub(super) fn plan<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    face: FaceId<I>,
    cdt: &mut PlanarTriangulation<I>,
) -> Result<StitchPlan<I>> {
    let mut diagonals = Vec::new();
    let edges: Vec<(FaceHandle, usize)> = cdt.finite_edges().collect();
    for (f, i) in edges {
        let g = cdt.neighbor(f, i);
        let j = cdt.mirror_index(f, i);
        // Within `f` the edge runs from the target of `hb` to that of `ha`.
        let ha = *cdt.vertex_info(cdt.vertex(f, cw(i)));
        let hb = *cdt.vertex_info(cdt.vertex(f, ccw(i)));
        let f_exterior = cdt.face_info(f).exterior;
        let g_exterior = cdt.face_info(g).exterior;

        if cdt.is_constrained(f, i) {
            if !f_exterior {
                cdt.face_info_mut(f).slots[i] = Some(Slot::Boundary(ha));
            }
            if !g_exterior {
                cdt.face_info_mut(g).slots[j] = Some(Slot::Boundary(hb));
            }
        } else if !(f_exterior && g_exterior) {
            let index = diagonals.len();
            diagonals.push([mesh.target(ha), mesh.target(hb)]);
            cdt.face_info_mut(f).slots[i] = Some(Slot::Diagonal { index, side: 0 });
            cdt.face_info_mut(g).slots[j] = Some(Slot::Diagonal { index, side: 1 });
        }
    }

    let ends = |slot: Slot<I>| -> (VertexId<I>, VertexId<I>) {
        match slot {
            Slot::Boundary(h) => (mesh.source(h), mesh.target(h)),
            Slot::Diagonal { index, side } => {
                let [t0, t1] = diagonals[index];
                if side == 0 {
                    (t1, t0)
                } else {
                    (t0, t1)
                }
            }
        }
    };

    let boundary_len = mesh.face_degree(face);
    let mut used = HashSet::with_capacity(boundary_len);
    let mut triangles = Vec::new();
    for f in cdt.finite_faces() {
        let cell = cdt.face_info(f);
        if cell.exterior {
            continue;
        }
        let [Some(s0), Some(s1), Some(s2)] = cell.slots else {
            return Err(MeshError::invariant(
                face.index(),
                format!("triangulation cell {:?} is missing a half-edge", f),
            ));
        };
        let slots = [s0, s1, s2];
        for k in 0..3 {
            let (source, target) = ends(slots[k]);
            if source == target {
                return Err(MeshError::invariant(
                    face.index(),
                    format!("cell {:?} has a side that starts and ends at {:?}", f, source),
                ));
            }
            if target != ends(slots[(k + 1) % 3]).0 {
                return Err(MeshError::invariant(
                    face.index(),
                    format!("half-edges of cell {:?} do not form a cycle", f),
                ));
            }
            if let Slot::Boundary(h) = slots[k] {
                if mesh.face_of(h) != face || !used.insert(h) {
                    return Err(MeshError::invariant(
                        face.index(),
                        format!("boundary half-edge {:?} is used more than once", h),
                    ));
                }
            }
        }
        triangles.push(slots);
    }

    if used.len() != boundary_len {
        return Err(MeshError::invariant(
            face.index(),
            format!(
                "{} of {} boundary half-edges are covered by triangles",
                used.len(),
                boundary_len
            ),
        ));
    }

    // The face's own slot is freed by the cut and reused by one triangle.
    mesh.ensure_capacity(diagonals.len(), triangles.len().saturating_sub(1))?;

    Ok(StitchPlan {
        face,
        diagonals,
        triangles,
    })
}

/// Replace the face by the planned triangles.
///
/// Returns the new faces and new diagonal edges.
pub(super) fn apply<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    plan: StitchPlan<I>,
) -> Result<(Vec<FaceId<I>>, Vec<EdgeId<I>>)> {
    let start = mesh.face(plan.face).halfedge;
    mesh.cut_face(start)?;

    let mut created = Vec::with_capacity(plan.diagonals.len());
    for &[t0, t1] in &plan.diagonals {
        let h = mesh.add_edge()?;
        let twin = mesh.twin(h);
        mesh.set_target(h, t0);
        mesh.set_target(twin, t1);
        created.push(h);
    }

    let resolve = |mesh: &HalfEdgeMesh<I>, slot: Slot<I>| match slot {
        Slot::Boundary(h) => h,
        Slot::Diagonal { index, side: 0 } => created[index],
        Slot::Diagonal { index, .. } => mesh.twin(created[index]),
    };

    let mut faces = Vec::with_capacity(plan.triangles.len());
    for &slots in &plan.triangles {
        let e0 = resolve(mesh, slots[0]);
        let e1 = resolve(mesh, slots[1]);
        let e2 = resolve(mesh, slots[2]);
        mesh.set_next(e0, e1);
        mesh.set_next(e1, e2);
        mesh.set_next(e2, e0);
        faces.push(mesh.fill_hole(e0)?);
    }

    let edges = created.iter().map(|h| h.edge()).collect();
    Ok((faces, edges))
}
