//! Projection of one polygonal face into a planar constrained triangulation.

use crate::cdt::{CdtError, ConstrainedTriangulation, TriangulationBuilder};
use crate::error::{MeshError, Result};
use crate::kernel::Kernel;
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexPointMap};

use super::stitch::Slot;

/// Per-face state of the planar triangulation.
#[derive(Debug, Clone, Copy)]
pub(super) struct Cell<I: MeshIndex> {
    /// Outside the polygon.
    pub exterior: bool,
    /// Planned mesh half-edge for the edge opposite each vertex.
    pub slots: [Option<Slot<I>>; 3],
}

impl<I: MeshIndex> Default for Cell<I> {
    fn default() -> Self {
        Self {
            exterior: false,
            slots: [None; 3],
        }
    }
}

/// Triangulation of one face: vertices are tagged with the boundary
/// half-edge whose target they are.
pub(super) type PlanarTriangulation<I> = ConstrainedTriangulation<HalfEdgeId<I>, Cell<I>>;

/// Build the constrained triangulation of `face`'s boundary loop, projected
/// onto the plane orthogonal to its estimated normal.
pub(super) fn project_face<I, P, K>(
    mesh: &HalfEdgeMesh<I>,
    face: FaceId<I>,
    points: &P,
    kernel: &K,
) -> Result<PlanarTriangulation<I>>
where
    I: MeshIndex,
    P: VertexPointMap<I> + ?Sized,
    K: Kernel + ?Sized,
{
    let boundary: Vec<HalfEdgeId<I>> = mesh.face_halfedges(face).collect();
    let positions = boundary
        .iter()
        .map(|&h| {
            let v = mesh.target(h);
            points.point(v).ok_or(MeshError::InvalidVertexIndex {
                face: face.index(),
                vertex: v.index(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let normal = kernel
        .estimate_normal(&positions)
        .ok_or(MeshError::DegenerateFace { face: face.index() })?;

    let mut builder = TriangulationBuilder::new();
    let mut first = None;
    let mut previous = None;
    for (&h, p) in boundary.iter().zip(&positions) {
        let vh = builder.insert(kernel.project(p, &normal));
        // Later half-edges at a shared position win.
        *builder.info_mut(vh) = h;
        if let Some(prev) = previous {
            builder.insert_constraint(prev, vh);
        }
        first.get_or_insert(vh);
        previous = Some(vh);
    }
    // Boundary vertices sharing a projected position collapse into one
    // triangulation vertex; such a face cannot be rebuilt from its boundary.
    if builder.num_vertices() < boundary.len() {
        return Err(MeshError::DegenerateFace { face: face.index() });
    }
    if let (Some(last), Some(first)) = (previous, first) {
        builder.insert_constraint(last, first);
    }

    builder.build().map_err(|err| match err {
        CdtError::Degenerate => MeshError::DegenerateFace { face: face.index() },
        CdtError::IntersectingConstraints(_, _) => {
            MeshError::SelfIntersectingFace { face: face.index() }
        }
        CdtError::Inconsistent(details) => MeshError::invariant(face.index(), details),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::NewellKernel;
    use crate::mesh::build_from_polygons;
    use nalgebra::Point3;

    #[test]
    fn test_vertices_tagged_with_incoming_halfedges() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &[vec![0, 1, 2, 3]]).unwrap();
        let face = FaceId::new(0);
        let cdt = project_face(&mesh, face, &vertices, &NewellKernel::default()).unwrap();

        assert_eq!(cdt.num_vertices(), 4);
        for v in cdt.finite_vertices() {
            let h = *cdt.vertex_info(v);
            assert_eq!(mesh.face_of(h), face);
            // Projection along +Z is the identity.
            let p = mesh.position(mesh.target(h));
            assert!((cdt.point(v).x - p.x).abs() < 1e-12);
            assert!((cdt.point(v).y - p.y).abs() < 1e-12);
        }
        let constrained = cdt
            .finite_edges()
            .filter(|&(f, i)| cdt.is_constrained(f, i))
            .count();
        assert_eq!(constrained, 4);
    }

    #[test]
    fn test_bowtie_is_self_intersecting() {
        // Lobes of different size so the Newell normal does not cancel out.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 3.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &[vec![0, 1, 2, 3]]).unwrap();
        let err = project_face(&mesh, FaceId::new(0), &vertices, &NewellKernel::default())
            .unwrap_err();
        assert!(matches!(err, MeshError::SelfIntersectingFace { face: 0 }));
    }

    #[test]
    fn test_missing_point_is_reported() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &[vec![0, 1, 2, 3]]).unwrap();
        let err = project_face(&mesh, FaceId::new(0), &vertices[..2], &NewellKernel::default())
            .unwrap_err();
        assert!(matches!(err, MeshError::InvalidVertexIndex { face: 0, .. }));
    }

    #[test]
    fn test_coincident_vertices_are_degenerate() {
        // Vertices 1 and 3 are distinct but share a position.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let mesh: HalfEdgeMesh =
            build_from_polygons(&vertices, &[vec![0, 1, 2, 3, 4]]).unwrap();
        let err = project_face(&mesh, FaceId::new(0), &vertices, &NewellKernel::default())
            .unwrap_err();
        assert!(matches!(err, MeshError::DegenerateFace { face: 0 }));
        assert!(err.is_recoverable());
    }
}
