//! Mesh construction utilities.
//!
//! This module provides functions for building half-edge meshes from
//! face-vertex lists as found in mesh file formats, and for converting
//! meshes back.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::HalfEdgeMesh;
use super::index::{HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and polygonal faces.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of faces, each a counter-clockwise list of vertex indices
///
/// # Returns
/// A half-edge mesh, or an error if a face is out of range, repeats a
/// vertex, has fewer than three sides, or reuses a directed edge.
///
/// # Example
/// ```
/// use polytri::mesh::{build_from_polygons, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3]];
///
/// let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_faces(), 1);
/// assert_eq!(mesh.num_edges(), 4);
/// ```
pub fn build_from_polygons<I: MeshIndex, F: AsRef<[usize]>>(
    vertices: &[Point3<f64>],
    faces: &[F],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let mut num_corners = 0;
    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        if face.len() < 3 {
            return Err(MeshError::DegenerateFace { face: fi });
        }
        for (k, &vi) in face.iter().enumerate() {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
            if face[..k].contains(&vi) {
                return Err(MeshError::DegenerateFace { face: fi });
            }
        }
        num_corners += face.len();
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), num_corners, faces.len());

    let vertex_ids = vertices
        .iter()
        .map(|&p| mesh.add_vertex(p))
        .collect::<Result<Vec<VertexId<I>>>>()?;

    // Directed edge (source, target) -> half-edge
    let mut directed: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::with_capacity(num_corners);

    for face in faces {
        let face = face.as_ref();
        let n = face.len();

        // Half-edge i runs from face[i] to face[i + 1].
        let mut cycle = Vec::with_capacity(n);
        for i in 0..n {
            let (a, b) = (face[i], face[(i + 1) % n]);
            if directed.contains_key(&(a, b)) {
                return Err(MeshError::NonManifoldEdge { v0: a, v1: b });
            }
            let he = match directed.get(&(b, a)) {
                Some(&opposite) => mesh.twin(opposite),
                None => {
                    let he = mesh.add_edge()?;
                    mesh.set_target(he, vertex_ids[b]);
                    mesh.set_target(mesh.twin(he), vertex_ids[a]);
                    he
                }
            };
            directed.insert((a, b), he);
            cycle.push(he);
        }

        let face_id = mesh.add_face(cycle[0])?;
        for i in 0..n {
            mesh.set_next(cycle[i], cycle[(i + 1) % n]);
            mesh.set_face(cycle[i], face_id);
            mesh.set_vertex_halfedge(vertex_ids[face[(i + 1) % n]], cycle[i]);
        }
    }

    link_border_loops(&mut mesh);
    fix_boundary_vertex_halfedges(&mut mesh);

    Ok(mesh)
}

/// Build a half-edge mesh from vertices and triangle faces.
///
/// # Example
/// ```
/// use polytri::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_halfedges(), 6);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Build a half-edge mesh from vertices and quad faces.
pub fn build_from_quads<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 4]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Link border half-edges into loops.
///
/// The border half-edge following `h` is the border half-edge leaving the
/// target of `h`.
fn link_border_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    let border: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_border_halfedge(he))
        .collect();

    let mut outgoing: HashMap<VertexId<I>, HalfEdgeId<I>> = HashMap::with_capacity(border.len());
    for &he in &border {
        outgoing.insert(mesh.source(he), he);
    }

    for &he in &border {
        if let Some(&next) = outgoing.get(&mesh.target(he)) {
            mesh.set_next(he, next);
        }
    }
}

/// Ensure boundary vertices point to a border half-edge.
fn fix_boundary_vertex_halfedges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    for (he, data) in mesh.halfedges.iter().enumerate() {
        if data.is_border() {
            mesh.vertices[data.target.index()].halfedge = HalfEdgeId::new(he);
        }
    }
}

/// Convert a half-edge mesh to a polygon face-vertex representation.
///
/// Removed face slots are skipped. Each face starts at the source of its
/// stored half-edge, so a mesh built by [`build_from_polygons`] gives back
/// its input faces unchanged.
pub fn to_polygons<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let vertices: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();

    let faces: Vec<Vec<usize>> = mesh
        .face_ids()
        .map(|f| {
            let mut face: Vec<usize> = mesh.face_vertices(f).map(|v| v.index()).collect();
            face.rotate_right(1);
            face
        })
        .collect();

    (vertices, faces)
}

/// Convert a triangle mesh to a face-vertex representation.
///
/// Fails with [`MeshError::InvalidState`] if a face is not a triangle.
pub fn to_triangles<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
) -> Result<(Vec<Point3<f64>>, Vec<[usize; 3]>)> {
    let (vertices, polygons) = to_polygons(mesh);

    let faces = polygons
        .iter()
        .map(|p| match p.as_slice() {
            &[a, b, c] => Ok([a, b, c]),
            other => Err(MeshError::InvalidState(format!(
                "expected a triangle mesh, found a face with {} sides",
                other.len()
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((vertices, faces))
}
