//! Numeric kernel: normal estimation and planar projection.
//!
//! The triangulation algorithms never do vector arithmetic on their own
//! terms; they ask a [`Kernel`] for a representative normal of a polygon and
//! for the 2D coordinates of each vertex in the plane orthogonal to it.
//!
//! [`NewellKernel`] is the `f64` backend: it estimates normals with Newell's
//! method, which is robust for non-planar and non-convex polygons.

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::newell_vector;

/// Capability set the triangulation code depends on.
pub trait Kernel {
    /// A unit normal representative of the polygon `points` (in boundary
    /// order, counter-clockwise around the normal), or `None` if the polygon
    /// is degenerate.
    fn estimate_normal(&self, points: &[Point3<f64>]) -> Option<Vector3<f64>>;

    /// Coordinates of `point` in the plane orthogonal to `normal`.
    ///
    /// The 2D frame must be right-handed with respect to `normal`, so that
    /// a polygon counter-clockwise around `normal` projects counter-clockwise.
    fn project(&self, point: &Point3<f64>, normal: &Vector3<f64>) -> Point2<f64>;
}

/// An orthonormal frame `(u, v)` spanning the plane orthogonal to a normal,
/// with `u × v = normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionFrame {
    /// First in-plane axis.
    pub u: Vector3<f64>,
    /// Second in-plane axis.
    pub v: Vector3<f64>,
}

impl ProjectionFrame {
    /// Build the frame for a unit normal.
    ///
    /// `u` is the world axis least aligned with `normal`, made orthogonal to
    /// it, so the frame is deterministic and for `normal = +Z` it is the
    /// identity on the XY plane.
    pub fn new(normal: &Vector3<f64>) -> Self {
        let n = normal.normalize();
        let axis = if n.x.abs() <= n.y.abs() && n.x.abs() <= n.z.abs() {
            Vector3::x()
        } else if n.y.abs() <= n.z.abs() {
            Vector3::y()
        } else {
            Vector3::z()
        };
        let u = (axis - n * axis.dot(&n)).normalize();
        let v = n.cross(&u);
        Self { u, v }
    }

    /// Project a point into this frame.
    #[inline]
    pub fn project(&self, p: &Point3<f64>) -> Point2<f64> {
        Point2::new(p.coords.dot(&self.u), p.coords.dot(&self.v))
    }
}

/// `f64` kernel using Newell's method for normals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewellKernel {
    /// A polygon is degenerate when the length of its Newell vector is at
    /// most `tolerance * extent²`, where `extent` is the largest side of its
    /// bounding box.
    pub tolerance: f64,
}

impl Default for NewellKernel {
    fn default() -> Self {
        Self { tolerance: 1e-12 }
    }
}

impl NewellKernel {
    /// Create a kernel with the given relative degeneracy tolerance.
    pub fn with_tolerance(tolerance: f64) -> Result<Self> {
        if !(tolerance >= 0.0 && tolerance.is_finite()) {
            return Err(MeshError::invalid_param(
                "tolerance",
                tolerance,
                "must be finite and non-negative",
            ));
        }
        Ok(Self { tolerance })
    }
}

impl Kernel for NewellKernel {
    fn estimate_normal(&self, points: &[Point3<f64>]) -> Option<Vector3<f64>> {
        if points.len() < 3 {
            return None;
        }

        let mut min = points[0];
        let mut max = points[0];
        for p in points {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        let extent = (max - min).amax();
        if !(extent > 0.0) || !extent.is_finite() {
            return None;
        }

        let normal = newell_vector(points);
        let length = normal.norm();
        if !(length > self.tolerance * extent * extent) {
            return None;
        }
        Some(normal / length)
    }

    fn project(&self, point: &Point3<f64>, normal: &Vector3<f64>) -> Point2<f64> {
        ProjectionFrame::new(normal).project(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(z: f64) -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(1.0, 1.0, z),
            Point3::new(0.0, 1.0, z),
        ]
    }

    #[test]
    fn test_square_normal() {
        let kernel = NewellKernel::default();
        let n = kernel.estimate_normal(&square(3.0)).unwrap();
        assert!((n - Vector3::z()).norm() < 1e-12);

        let mut reversed = square(0.0);
        reversed.reverse();
        let n = kernel.estimate_normal(&reversed).unwrap();
        assert!((n + Vector3::z()).norm() < 1e-12);
    }

    #[test]
    fn test_collinear_is_degenerate() {
        let kernel = NewellKernel::default();
        let line: Vec<Point3<f64>> = (0..4).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        assert!(kernel.estimate_normal(&line).is_none());

        let collapsed = vec![Point3::origin(); 4];
        assert!(kernel.estimate_normal(&collapsed).is_none());
        assert!(kernel.estimate_normal(&square(0.0)[..2]).is_none());
    }

    #[test]
    fn test_nonplanar_normal() {
        // A twisted quad still has a well-defined average normal.
        let kernel = NewellKernel::default();
        let quad = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.2),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.2),
        ];
        let n = kernel.estimate_normal(&quad).unwrap();
        assert!(n.z > 0.9);
        assert!((n.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_frame_is_right_handed() {
        for normal in [
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(1.0, 2.0, 3.0).normalize(),
            Vector3::new(-1.0, 0.0, 0.0),
        ] {
            let frame = ProjectionFrame::new(&normal);
            assert!(frame.u.dot(&normal).abs() < 1e-12);
            assert!(frame.v.dot(&normal).abs() < 1e-12);
            assert!((frame.u.cross(&frame.v) - normal).norm() < 1e-12);
        }
    }

    #[test]
    fn test_z_frame_is_identity() {
        let kernel = NewellKernel::default();
        let p = kernel.project(&Point3::new(2.0, 3.0, 7.0), &Vector3::z());
        assert!((p - Point2::new(2.0, 3.0)).norm() < 1e-12);
    }

    #[test]
    fn test_projection_preserves_orientation() {
        // A CCW triangle in a tilted plane stays CCW after projection.
        let kernel = NewellKernel::default();
        let tri = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let n = kernel.estimate_normal(&tri).unwrap();
        let p: Vec<Point2<f64>> = tri.iter().map(|q| kernel.project(q, &n)).collect();
        let area2 = (p[1] - p[0]).perp(&(p[2] - p[0]));
        assert!(area2 > 0.0);
    }

    #[test]
    fn test_invalid_tolerance() {
        assert!(NewellKernel::with_tolerance(-1.0).is_err());
        assert!(NewellKernel::with_tolerance(f64::NAN).is_err());
        assert_eq!(NewellKernel::with_tolerance(1e-6).unwrap().tolerance, 1e-6);
    }
}
