//! Inside/outside classification of a face's planar triangulation.

use std::collections::VecDeque;

use crate::mesh::MeshIndex;

use super::planar::PlanarTriangulation;

/// Flood-fill from the unbounded face across unconstrained edges, marking
/// every reached cell exterior. Returns the number of interior cells.
pub(super) fn mark_exterior<I: MeshIndex>(cdt: &mut PlanarTriangulation<I>) -> usize {
    let faces: Vec<_> = cdt.all_faces().collect();
    for &f in &faces {
        cdt.face_info_mut(f).exterior = false;
    }

    let mut queue = VecDeque::from([cdt.infinite_face()]);
    while let Some(f) = queue.pop_front() {
        if cdt.face_info(f).exterior {
            continue;
        }
        cdt.face_info_mut(f).exterior = true;
        for i in 0..3 {
            if !cdt.is_constrained(f, i) {
                queue.push_back(cdt.neighbor(f, i));
            }
        }
    }

    faces
        .into_iter()
        .filter(|&f| !cdt.face_info(f).exterior)
        .count()
}
