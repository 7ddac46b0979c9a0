//! STL (stereolithography) format support.
//!
//! STL stores independent triangles, so loading welds vertices at identical
//! positions and saving requires a triangle mesh (triangulate first).

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, to_triangles, HalfEdgeMesh, MeshIndex};

/// Load a mesh from an STL file.
///
/// Automatically detects binary vs ASCII format.
///
/// # Example
///
/// ```no_run
/// use polytri::io::stl;
/// use polytri::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    read(&mut file).map_err(|e| match e {
        MeshError::LoadError { message, .. } => MeshError::LoadError {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Read STL data.
pub fn read<R: Read + Seek, I: MeshIndex>(reader: &mut R) -> Result<HalfEdgeMesh<I>> {
    let stl = stl_io::read_stl(reader).map_err(|e| MeshError::LoadError {
        path: Default::default(),
        message: e.to_string(),
    })?;

    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut welded: HashMap<[u32; 3], usize> = HashMap::new();
    let mut index_of = |v: &stl_io::Vertex| {
        // `+ 0.0` folds -0.0 into 0.0
        let key = [
            (v[0] + 0.0).to_bits(),
            (v[1] + 0.0).to_bits(),
            (v[2] + 0.0).to_bits(),
        ];
        *welded.entry(key).or_insert_with(|| {
            vertices.push(Point3::new(v[0] as f64, v[1] as f64, v[2] as f64));
            vertices.len() - 1
        })
    };

    let mut faces: Vec<[usize; 3]> = Vec::with_capacity(stl.faces.len());
    for tri in &stl.faces {
        let i0 = index_of(&stl.vertices[tri.vertices[0]]);
        let i1 = index_of(&stl.vertices[tri.vertices[1]]);
        let i2 = index_of(&stl.vertices[tri.vertices[2]]);

        // Skip degenerate triangles
        if i0 != i1 && i1 != i2 && i0 != i2 {
            faces.push([i0, i1, i2]);
        }
    }

    if faces.is_empty() {
        return Err(MeshError::LoadError {
            path: Default::default(),
            message: "STL data contains no valid triangles".to_string(),
        });
    }

    build_from_triangles(&vertices, &faces)
}

/// Save a triangle mesh to a binary STL file.
///
/// Fails with [`MeshError::InvalidState`] if the mesh has a face with more
/// than three sides.
///
/// # Example
///
/// ```no_run
/// use polytri::io::stl;
/// use polytri::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// stl::save(&mesh, "output.stl").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    // Check before creating the file.
    let triangles = stl_triangles(mesh)?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    writer.flush()?;
    Ok(())
}

/// Write a triangle mesh as binary STL.
pub fn write<W: Write, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, writer: &mut W) -> Result<()> {
    let triangles = stl_triangles(mesh)?;
    stl_io::write_stl(writer, triangles.iter())?;
    Ok(())
}

fn stl_triangles<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Result<Vec<stl_io::Triangle>> {
    let (vertices, faces) = to_triangles(mesh)?;

    let triangles = faces
        .iter()
        .map(|f| {
            let p0 = &vertices[f[0]];
            let p1 = &vertices[f[1]];
            let p2 = &vertices[f[2]];

            let n = (p1 - p0)
                .cross(&(p2 - p0))
                .try_normalize(0.0)
                .unwrap_or_else(nalgebra::Vector3::zeros);

            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [
                    stl_io::Vertex::new([p0.x as f32, p0.y as f32, p0.z as f32]),
                    stl_io::Vertex::new([p1.x as f32, p1.y as f32, p1.z as f32]),
                    stl_io::Vertex::new([p2.x as f32, p2.y as f32, p2.z as f32]),
                ],
            }
        })
        .collect();

    Ok(triangles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;
    use std::io::Cursor;

    fn square(faces: &[Vec<usize>]) -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_polygons(&vertices, faces).unwrap()
    }

    #[test]
    fn test_round_trip_welds_vertices() {
        let mesh = square(&[vec![0, 1, 2], vec![0, 2, 3]]);
        let mut buffer = Vec::new();
        write(&mesh, &mut buffer).unwrap();

        let again: HalfEdgeMesh = read(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(again.num_vertices(), 4);
        assert_eq!(again.num_faces(), 2);
        assert_eq!(again.num_edges(), 5);
        assert!(again.is_valid());
    }

    #[test]
    fn test_polygons_are_rejected() {
        let mesh = square(&[vec![0, 1, 2, 3]]);
        let mut buffer = Vec::new();
        let err = write(&mesh, &mut buffer).unwrap_err();
        assert!(matches!(err, MeshError::InvalidState(_)));
        assert!(buffer.is_empty());
    }
}
