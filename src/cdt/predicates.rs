//! Planar orientation and in-circle predicates.
//!
//! These are plain `f64` determinants, not exact or adaptive predicates.
//! The sign is reliable while the determinant is large compared with the
//! rounding error of its terms, roughly `1e-15` times the product of the
//! coordinate differences involved. Nearly collinear or nearly cocircular
//! inputs below that level may be classified either way. A wrong
//! orientation sign can make
//! [`TriangulationBuilder::build`](super::TriangulationBuilder::build)
//! fail; a wrong in-circle sign only yields a valid triangulation that is
//! not quite Delaunay.

use nalgebra::Point2;

/// Twice the signed area of triangle `(a, b, c)`.
///
/// Positive if `c` lies to the left of the directed line `a -> b`
/// (counter-clockwise turn), negative to the right, zero if collinear.
#[inline]
pub fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// In-circle determinant.
///
/// For a counter-clockwise triangle `(a, b, c)`, positive if `d` lies
/// strictly inside its circumcircle, negative outside, zero on it.
#[inline]
pub fn incircle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> f64 {
    let adx = a.x - d.x;
    let ady = a.y - d.y;
    let bdx = b.x - d.x;
    let bdy = b.y - d.y;
    let cdx = c.x - d.x;
    let cdy = c.y - d.y;

    let a_lift = adx * adx + ady * ady;
    let b_lift = bdx * bdx + bdy * bdy;
    let c_lift = cdx * cdx + cdy * cdy;

    a_lift * (bdx * cdy - cdx * bdy) + b_lift * (cdx * ady - adx * cdy)
        + c_lift * (adx * bdy - bdx * ady)
}

/// Whether `p`, known to be collinear with `a` and `b`, lies strictly
/// between them.
#[inline]
pub fn strictly_between(a: &Point2<f64>, b: &Point2<f64>, p: &Point2<f64>) -> bool {
    let ab = b - a;
    let t = (p - a).dot(&ab);
    t > 0.0 && t < ab.norm_squared()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orient2d() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert!(orient2d(&a, &b, &Point2::new(0.5, 1.0)) > 0.0);
        assert!(orient2d(&a, &b, &Point2::new(0.5, -1.0)) < 0.0);
        assert_eq!(orient2d(&a, &b, &Point2::new(3.0, 0.0)), 0.0);
    }

    #[test]
    fn test_incircle() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);
        assert!(incircle(&a, &b, &c, &Point2::new(0.4, 0.4)) > 0.0);
        assert!(incircle(&a, &b, &c, &Point2::new(2.0, 2.0)) < 0.0);
        // The fourth corner of the unit square is cocircular.
        assert_eq!(incircle(&a, &b, &c, &Point2::new(1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_strictly_between() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 0.0);
        assert!(strictly_between(&a, &b, &Point2::new(1.0, 0.0)));
        assert!(!strictly_between(&a, &b, &Point2::new(2.0, 0.0)));
        assert!(!strictly_between(&a, &b, &Point2::new(-1.0, 0.0)));
        assert!(!strictly_between(&a, &b, &Point2::new(3.0, 0.0)));
    }
}
