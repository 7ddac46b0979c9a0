//! Wavefront OBJ format support.
//!
//! Only geometry is read: `v` positions and `f` polygons. Texture and normal
//! references in face corners (`f 1/2/3`) are ignored, negative (relative)
//! indices are resolved, and every other statement is skipped. Faces keep
//! their polygon sizes.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_polygons, to_polygons, HalfEdgeMesh, MeshIndex};

/// Load a mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use polytri::io::obj;
/// use polytri::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = obj::load("model.obj").unwrap();
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

/// Read OBJ data from a buffered reader.
///
/// Parse errors are reported as [`MeshError::LoadError`] with an empty path.
pub fn read<R: BufRead, I: MeshIndex>(reader: R) -> Result<HalfEdgeMesh<I>> {
    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<Vec<usize>> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.split('#').next().unwrap_or("");
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let mut coords = [0.0; 3];
                for c in &mut coords {
                    *c = tokens
                        .next()
                        .and_then(|t| t.parse::<f64>().ok())
                        .ok_or_else(|| parse_error(line_no, "invalid vertex position"))?;
                }
                vertices.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let face = tokens
                    .map(|corner| resolve_index(corner, vertices.len()))
                    .collect::<Option<Vec<usize>>>()
                    .ok_or_else(|| parse_error(line_no, "invalid face index"))?;
                faces.push(face);
            }
            _ => {}
        }
    }

    if faces.is_empty() {
        return Err(MeshError::LoadError {
            path: Default::default(),
            message: "OBJ data contains no faces".to_string(),
        });
    }

    build_from_polygons(&vertices, &faces)
}

/// Resolve the vertex part of a face corner (`v`, `v/vt`, `v/vt/vn`, `v//vn`)
/// to a zero-based index.
fn resolve_index(corner: &str, num_vertices: usize) -> Option<usize> {
    let index: i64 = corner.split('/').next()?.parse().ok()?;
    if index > 0 {
        Some(index as usize - 1)
    } else if index < 0 {
        num_vertices.checked_sub(index.unsigned_abs() as usize)
    } else {
        None
    }
}

fn parse_error(line_no: usize, message: &str) -> MeshError {
    MeshError::LoadError {
        path: Default::default(),
        message: format!("line {}: {}", line_no + 1, message),
    }
}

/// Save a mesh to an OBJ file.
///
/// # Example
///
/// ```no_run
/// use polytri::io::obj;
/// use polytri::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// obj::save(&mesh, "output.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as OBJ text.
pub fn write<W: Write, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, writer: &mut W) -> Result<()> {
    let (vertices, faces) = to_polygons(mesh);

    writeln!(writer, "# polytri")?;
    for v in &vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for face in &faces {
        write!(writer, "f")?;
        for &i in face {
            write!(writer, " {}", i + 1)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const L_SHAPE: &str = "\
# L-shaped hexagon next to a triangle
v 0 0 0
v 2 0 0
v 2 1 0
v 1 1 0
v 1 2 0
v 0 2 0
v 3 0.5 0
vt 0 0
f 1/1 2/1 3/1 4/1 5/1 6/1
f -6//1 -1 -5
";

    #[test]
    fn test_read_polygons() {
        let mesh: HalfEdgeMesh = read(L_SHAPE.as_bytes()).unwrap();
        assert_eq!(mesh.num_vertices(), 7);
        assert_eq!(mesh.num_faces(), 2);
        let (_, faces) = to_polygons(&mesh);
        let mut sizes: Vec<usize> = faces.iter().map(|f| f.len()).collect();
        sizes.sort();
        assert_eq!(sizes, vec![3, 6]);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_round_trip_keeps_polygons() {
        let mesh: HalfEdgeMesh = read(L_SHAPE.as_bytes()).unwrap();
        let mut buffer = Vec::new();
        write(&mesh, &mut buffer).unwrap();
        let again: HalfEdgeMesh = read(buffer.as_slice()).unwrap();
        assert_eq!(to_polygons(&again), to_polygons(&mesh));
    }

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index("3", 5), Some(2));
        assert_eq!(resolve_index("3/1/2", 5), Some(2));
        assert_eq!(resolve_index("-1", 5), Some(4));
        assert_eq!(resolve_index("-6", 5), None);
        assert_eq!(resolve_index("0", 5), None);
        assert_eq!(resolve_index("x", 5), None);
    }

    #[test]
    fn test_errors() {
        let err = read::<_, u32>("v 0 0\nf 1 2 3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MeshError::LoadError { .. }));
        assert!(err.to_string().contains("line 1"));

        let err = read::<_, u32>("v 0 0 0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MeshError::LoadError { .. }));

        let err = read::<_, u32>("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MeshError::InvalidVertexIndex { face: 0, vertex: 8 }));
    }
}
