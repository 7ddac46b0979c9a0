//! Triangulation of polygonal faces.
//!
//! Every face with more than three sides is replaced, in place, by triangles
//! that reuse the face's own boundary half-edges. Only the diagonals are new
//! edges, so faces around a triangulated polygon keep their half-edges,
//! twins and targets untouched.
//!
//! # Algorithm
//!
//! Each selected face is processed independently:
//!
//! 1. **Project**: estimate a normal for the boundary loop and project its
//!    vertices onto the orthogonal plane.
//! 2. **Triangulate**: build a constrained Delaunay triangulation of the
//!    projected points with the boundary edges as constraints. It covers
//!    the convex hull, not just the polygon.
//! 3. **Classify**: flood-fill from the unbounded face across unconstrained
//!    edges; every cell reached is outside the polygon.
//! 4. **Stitch**: map each interior cell to a mesh triangle, plan one new
//!    edge per interior diagonal, validate the plan, then cut the face and
//!    fill the hole with the triangles.
//!
//! A convex `n`-gon becomes `n - 2` triangles joined by `n - 3` diagonals.
//! Non-convex polygons are handled as long as their projection is simple;
//! non-planar polygons are handled as long as their projection along the
//! average normal does not fold over.
//!
//! # Failures
//!
//! A face whose points are collinear or whose boundary vertices coincide in
//! the projection ([`MeshError::DegenerateFace`]), or whose projected
//! boundary crosses itself ([`MeshError::SelfIntersectingFace`])
//! aborts the pass by default; with [`FailurePolicy::Skip`] it is left as is
//! and recorded in the report. [`MeshError::InvariantViolation`] always
//! aborts. In every case the failing face is left untouched.
//!
//! # Example
//!
//! ```
//! use polytri::prelude::*;
//! use polytri::algo::triangulate::{triangulate_mesh, TriangulateOptions};
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
//! let report = triangulate_mesh(&mut mesh, &TriangulateOptions::default()).unwrap();
//! assert_eq!(report.triangles_created, 2);
//! assert!(mesh.is_triangle_mesh());
//! ```

mod classify;
mod planar;
mod stitch;

use log::{debug, warn};
use nalgebra::Point3;
use rayon::prelude::*;

use crate::error::{MeshError, Result};
use crate::kernel::{Kernel, NewellKernel};
use crate::mesh::{EdgeId, FaceId, HalfEdgeMesh, MeshIndex, VertexPointMap};

use super::Progress;

/// What to do when a face cannot be triangulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failing face and return its error.
    #[default]
    Abort,
    /// Leave degenerate or self-intersecting faces as they are and continue.
    ///
    /// Invariant violations still abort.
    Skip,
}

/// Options for polygon triangulation.
#[derive(Debug, Clone)]
pub struct TriangulateOptions {
    /// Failure policy (default: [`FailurePolicy::Abort`]).
    pub policy: FailurePolicy,

    /// Whether to select faces in parallel (default: true).
    pub parallel: bool,
}

impl Default for TriangulateOptions {
    fn default() -> Self {
        Self {
            policy: FailurePolicy::Abort,
            parallel: true,
        }
    }
}

impl TriangulateOptions {
    /// Set the failure policy.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Skip faces that cannot be triangulated instead of failing.
    pub fn skip_failures(mut self) -> Self {
        self.policy = FailurePolicy::Skip;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Result of triangulating a single face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceTriangulation<I: MeshIndex = u32> {
    /// The face that was triangulated. Its slot is reused by one of the
    /// triangles.
    pub face: FaceId<I>,
    /// Faces covering the original face.
    pub triangles: Vec<FaceId<I>>,
    /// New edges created for polygon diagonals.
    pub diagonals: Vec<EdgeId<I>>,
}

/// Summary of a triangulation pass.
#[derive(Debug)]
pub struct TriangulationReport<I: MeshIndex = u32> {
    /// Number of polygonal faces replaced by triangles.
    pub faces_triangulated: usize,
    /// Number of triangles created.
    pub triangles_created: usize,
    /// Number of diagonal edges created.
    pub diagonals_created: usize,
    /// Faces left untouched under [`FailurePolicy::Skip`], with the reason.
    pub skipped: Vec<(FaceId<I>, MeshError)>,
}

impl<I: MeshIndex> Default for TriangulationReport<I> {
    fn default() -> Self {
        Self {
            faces_triangulated: 0,
            triangles_created: 0,
            diagonals_created: 0,
            skipped: Vec::new(),
        }
    }
}

impl<I: MeshIndex> TriangulationReport<I> {
    /// Whether every selected face was triangulated.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Live faces with more than three sides, in face order.
///
/// This is the worklist of a triangulation pass; it is captured before any
/// face is modified.
pub fn select_faces<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, parallel: bool) -> Vec<FaceId<I>> {
    let faces: Vec<FaceId<I>> = mesh.face_ids().collect();
    if parallel {
        faces
            .into_par_iter()
            .filter(|&f| mesh.face_degree(f) > 3)
            .collect()
    } else {
        faces
            .into_iter()
            .filter(|&f| mesh.face_degree(f) > 3)
            .collect()
    }
}

/// Triangulate every face of `mesh` with more than three sides.
///
/// Positions come from `points`; `kernel` estimates face normals and
/// projects positions to the plane.
pub fn triangulate_faces<I, P, K>(
    mesh: &mut HalfEdgeMesh<I>,
    points: &P,
    kernel: &K,
    options: &TriangulateOptions,
) -> Result<TriangulationReport<I>>
where
    I: MeshIndex,
    P: VertexPointMap<I> + ?Sized,
    K: Kernel + ?Sized,
{
    triangulate_faces_internal(mesh, points, kernel, options, None)
}

/// Triangulate polygonal faces with progress reporting.
///
/// See [`triangulate_faces`] for details.
pub fn triangulate_faces_with_progress<I, P, K>(
    mesh: &mut HalfEdgeMesh<I>,
    points: &P,
    kernel: &K,
    options: &TriangulateOptions,
    progress: &Progress,
) -> Result<TriangulationReport<I>>
where
    I: MeshIndex,
    P: VertexPointMap<I> + ?Sized,
    K: Kernel + ?Sized,
{
    triangulate_faces_internal(mesh, points, kernel, options, Some(progress))
}

/// Triangulate polygonal faces using the mesh's own positions and the
/// default [`NewellKernel`].
pub fn triangulate_mesh<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &TriangulateOptions,
) -> Result<TriangulationReport<I>> {
    let points: Vec<Point3<f64>> = mesh.vertices().map(|(_, v)| v.position).collect();
    triangulate_faces(mesh, &points, &NewellKernel::default(), options)
}

fn triangulate_faces_internal<I, P, K>(
    mesh: &mut HalfEdgeMesh<I>,
    points: &P,
    kernel: &K,
    options: &TriangulateOptions,
    progress: Option<&Progress>,
) -> Result<TriangulationReport<I>>
where
    I: MeshIndex,
    P: VertexPointMap<I> + ?Sized,
    K: Kernel + ?Sized,
{
    let worklist = select_faces(mesh, options.parallel);
    let total = worklist.len();
    debug!("triangulating {} polygonal faces", total);

    let mut report = TriangulationReport::default();
    for (step, face) in worklist.into_iter().enumerate() {
        if let Some(p) = progress {
            p.report(step, total, "Triangulating faces");
        }

        match triangulate_face(mesh, face, points, kernel) {
            Ok(result) => {
                report.faces_triangulated += 1;
                report.triangles_created += result.triangles.len();
                report.diagonals_created += result.diagonals.len();
            }
            Err(err) if err.is_recoverable() && options.policy == FailurePolicy::Skip => {
                warn!("skipping face {:?}: {}", face, err);
                report.skipped.push((face, err));
            }
            Err(err) => return Err(err),
        }
    }

    if let Some(p) = progress {
        p.report(total, total, "Triangulating faces");
    }
    debug!(
        "triangulated {} faces into {} triangles ({} skipped)",
        report.faces_triangulated,
        report.triangles_created,
        report.skipped.len()
    );
    Ok(report)
}

/// Triangulate a single face.
///
/// Faces with three or fewer sides are returned unchanged. On error the mesh
/// is not modified.
pub fn triangulate_face<I, P, K>(
    mesh: &mut HalfEdgeMesh<I>,
    face: FaceId<I>,
    points: &P,
    kernel: &K,
) -> Result<FaceTriangulation<I>>
where
    I: MeshIndex,
    P: VertexPointMap<I> + ?Sized,
    K: Kernel + ?Sized,
{
    if !mesh.is_live_face(face) {
        return Err(MeshError::InvalidState(format!(
            "{:?} is not a live face",
            face
        )));
    }
    if mesh.face_degree(face) <= 3 {
        return Ok(FaceTriangulation {
            face,
            triangles: vec![face],
            diagonals: Vec::new(),
        });
    }

    let mut cdt = planar::project_face(mesh, face, points, kernel)?;
    let interior = classify::mark_exterior(&mut cdt);
    let plan = stitch::plan(mesh, face, &mut cdt)?;
    debug!(
        "face {:?}: {} sides, {} interior cells, {} diagonals",
        face,
        mesh.face_degree(face),
        interior,
        plan.num_diagonals()
    );
    debug_assert_eq!(plan.num_triangles(), interior);

    let (triangles, diagonals) = stitch::apply(mesh, plan)?;
    Ok(FaceTriangulation {
        face,
        triangles,
        diagonals,
    })
}
