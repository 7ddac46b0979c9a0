//! PLY (Stanford polygon) format support.
//!
//! Faces are read and written as polygons of any size. Positions are written
//! as `double` so that a save/load cycle is exact.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_polygons, to_polygons, HalfEdgeMesh, MeshIndex};

/// Load a mesh from a PLY file (ASCII or binary).
///
/// # Example
///
/// ```no_run
/// use polytri::io::ply;
/// use polytri::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = ply::load("model.ply").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read(BufReader::new(file)).map_err(|e| match e {
        MeshError::LoadError { message, .. } => MeshError::LoadError {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Read PLY data.
///
/// Parse errors are reported as [`MeshError::LoadError`] with an empty path.
pub fn read<R: Read, I: MeshIndex>(mut reader: R) -> Result<HalfEdgeMesh<I>> {
    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(&mut reader).map_err(|e| load_error(e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error("PLY data has no vertex element"))?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let coord = |name: &str| {
            get_float_property(vertex, name)
                .ok_or_else(|| load_error(format!("vertex missing {} coordinate", name)))
        };
        vertices.push(Point3::new(coord("x")?, coord("y")?, coord("z")?));
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| load_error("PLY data has no face element"))?;

    let faces = face_element
        .iter()
        .map(|face| {
            get_list_property(face, "vertex_indices")
                .or_else(|| get_list_property(face, "vertex_index"))
                .ok_or_else(|| load_error("face missing vertex_indices property"))
        })
        .collect::<Result<Vec<Vec<usize>>>>()?;

    if faces.is_empty() {
        return Err(load_error("PLY data contains no faces"));
    }

    build_from_polygons(&vertices, &faces)
}

fn load_error(message: impl Into<String>) -> MeshError {
    MeshError::LoadError {
        path: Default::default(),
        message: message.into(),
    }
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    fn convert<T: Copy + TryInto<usize>>(values: &[T]) -> Option<Vec<usize>> {
        values.iter().map(|&x| x.try_into().ok()).collect()
    }

    match element.get(name)? {
        Property::ListInt(v) => convert(v),
        Property::ListUInt(v) => convert(v),
        Property::ListShort(v) => convert(v),
        Property::ListUShort(v) => convert(v),
        Property::ListChar(v) => convert(v),
        Property::ListUChar(v) => convert(v),
        _ => None,
    }
}

/// Save a mesh to a PLY file (ASCII format).
///
/// # Example
///
/// ```no_run
/// use polytri::io::ply;
/// use polytri::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// ply::save(&mesh, "output.ply").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as ASCII PLY.
pub fn write<W: Write, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, writer: &mut W) -> Result<()> {
    let (vertices, faces) = to_polygons(mesh);
    let max_degree = faces.iter().map(|f| f.len()).max().unwrap_or(0);
    let count_type = if max_degree <= u8::MAX as usize { "uchar" } else { "uint" };

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by polytri")?;
    writeln!(writer, "element vertex {}", vertices.len())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    writeln!(writer, "element face {}", faces.len())?;
    writeln!(writer, "property list {} int vertex_indices", count_type)?;
    writeln!(writer, "end_header")?;

    for v in &vertices {
        writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
    }

    for f in &faces {
        write!(writer, "{}", f.len())?;
        for &i in f {
            write!(writer, " {}", i)?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_AND_TRIANGLE: &str = "\
ply
format ascii 1.0
element vertex 5
property float x
property float y
property float z
element face 2
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
1 1 0
0 1 0
2 0.5 0
4 0 1 2 3
3 1 4 2
";

    #[test]
    fn test_read_polygons() {
        let mesh: HalfEdgeMesh = read(QUAD_AND_TRIANGLE.as_bytes()).unwrap();
        assert_eq!(mesh.num_vertices(), 5);
        assert_eq!(mesh.num_faces(), 2);
        let (_, faces) = to_polygons(&mesh);
        assert_eq!(faces, vec![vec![0, 1, 2, 3], vec![1, 4, 2]]);
    }

    #[test]
    fn test_round_trip_is_exact() {
        let vertices = vec![
            Point3::new(0.1, 0.2, 0.3),
            Point3::new(1.0 / 3.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1e-9),
            Point3::new(0.0, 1.0, -2.5),
        ];
        let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &[vec![0, 1, 2, 3]]).unwrap();
        let mut buffer = Vec::new();
        write(&mesh, &mut buffer).unwrap();

        let again: HalfEdgeMesh = read(buffer.as_slice()).unwrap();
        assert_eq!(to_polygons(&again), to_polygons(&mesh));
    }

    #[test]
    fn test_missing_faces() {
        let data = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nend_header\n0 0 0\n";
        let err = read::<_, u32>(data.as_bytes()).unwrap_err();
        assert!(matches!(err, MeshError::LoadError { .. }));
    }
}
