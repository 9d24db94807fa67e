//! Planar triangle primitives used by the rasterizer.
//!
//! All tests work on the XY projection; `z` only matters for interpolation.

use glam::{DVec2, DVec3};

/// Signed orientation of `p1 -> p2 -> p3`: positive when counter-clockwise,
/// negative when clockwise, zero when collinear.
#[inline]
pub fn orientation(p1: DVec2, p2: DVec2, p3: DVec2) -> f64 {
    (p3.y - p1.y) * (p2.x - p1.x) - (p2.y - p1.y) * (p3.x - p1.x)
}

/// Orientation of `p1 -> p2 -> p3`. Collinear points count as
/// counter-clockwise.
#[inline]
pub fn is_ccw(p1: DVec2, p2: DVec2, p3: DVec2) -> bool {
    orientation(p1, p2, p3) >= 0.0
}

/// Whether `p` lies inside or on the boundary of triangle `abc`.
///
/// The sub-triangles `pab`, `pbc`, `pca` must all be counter-clockwise, or
/// all clockwise (counter-clockwise when traversed backwards). A collinear
/// sub-triangle passes both checks, so boundary points are inside for
/// either winding of `abc`.
#[inline]
pub fn contains(p: DVec2, a: DVec2, b: DVec2, c: DVec2) -> bool {
    let ccw = is_ccw(p, a, b) && is_ccw(p, b, c) && is_ccw(p, c, a);
    let cw = is_ccw(p, b, a) && is_ccw(p, c, b) && is_ccw(p, a, c);
    ccw || cw
}

/// Twice the signed area of `abc`; zero for degenerate triangles.
#[inline]
pub fn doubled_area(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y)
}

/// Barycentric weights of `p` with respect to `abc`.
///
/// Divides by [`doubled_area`]; callers must skip degenerate triangles.
#[inline]
pub fn barycentric(p: DVec2, a: DVec2, b: DVec2, c: DVec2) -> [f64; 3] {
    let denom = doubled_area(a, b, c);
    let w1 = ((b.y - c.y) * (p.x - c.x) + (c.x - b.x) * (p.y - c.y)) / denom;
    let w2 = ((c.y - a.y) * (p.x - c.x) + (a.x - c.x) * (p.y - c.y)) / denom;
    [w1, w2, 1.0 - w1 - w2]
}

/// Elevation of the plane through `a`, `b`, `c` at `p`.
#[inline]
pub fn interpolate_elevation(p: DVec2, a: DVec3, b: DVec3, c: DVec3) -> f64 {
    let [w1, w2, w3] = barycentric(p, a.truncate(), b.truncate(), c.truncate());
    w1 * a.z + w2 * b.z + w3 * c.z
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn p(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    // ==================== Orientation ====================

    #[test]
    fn test_is_ccw() {
        assert!(is_ccw(p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)));
        assert!(!is_ccw(p(0.0, 0.0), p(0.0, 1.0), p(1.0, 0.0)));
    }

    #[test]
    fn test_orientation_sign() {
        assert!(orientation(p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)) > 0.0);
        assert!(orientation(p(0.0, 0.0), p(0.0, 1.0), p(1.0, 0.0)) < 0.0);
        assert_eq!(orientation(p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0)), 0.0);
    }

    #[test]
    fn test_collinear_counts_as_ccw() {
        assert!(is_ccw(p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0)));
        assert!(is_ccw(p(2.0, 2.0), p(1.0, 1.0), p(0.0, 0.0)));
    }

    // ==================== Containment ====================

    #[test]
    fn test_contains_interior_both_windings() {
        let (a, b, c) = (p(0.0, 0.0), p(4.0, 0.0), p(0.0, 4.0));

        assert!(contains(p(1.0, 1.0), a, b, c));
        assert!(contains(p(1.0, 1.0), a, c, b));
    }

    #[test]
    fn test_contains_rejects_outside() {
        let (a, b, c) = (p(0.0, 0.0), p(4.0, 0.0), p(0.0, 4.0));

        assert!(!contains(p(3.0, 3.0), a, b, c));
        assert!(!contains(p(-1.0, 1.0), a, c, b));
        assert!(!contains(p(5.0, 0.0), a, b, c));
    }

    #[test]
    fn test_contains_boundary() {
        let (a, b, c) = (p(0.0, 0.0), p(4.0, 0.0), p(0.0, 4.0));

        // vertex
        assert!(contains(p(0.0, 4.0), a, b, c));
        // edge
        assert!(contains(p(2.0, 0.0), a, b, c));
        // hypotenuse
        assert!(contains(p(2.0, 2.0), a, b, c));
        assert!(contains(p(2.0, 2.0), b, a, c));
        assert!(contains(p(0.0, 2.0), a, c, b));
    }

    #[test]
    fn test_contains_boundary_clockwise() {
        // Clockwise order, points on the hypotenuse a-c
        let (a, b, c) = (p(4.0, 0.0), p(0.0, 0.0), p(0.0, 4.0));

        assert!(!is_ccw(p(2.0, 2.0), a, b));
        assert!(contains(p(2.0, 2.0), a, b, c));
        assert!(contains(p(1.0, 3.0), a, b, c));
        assert!(!contains(p(3.0, 3.0), a, b, c));
    }

    // ==================== Interpolation ====================

    #[test]
    fn test_doubled_area_sign_follows_winding() {
        let (a, b, c) = (p(0.0, 0.0), p(4.0, 0.0), p(0.0, 4.0));

        assert_eq!(doubled_area(a, b, c), 16.0);
        assert_eq!(doubled_area(a, c, b), -16.0);
        assert_eq!(doubled_area(a, p(1.0, 1.0), p(3.0, 3.0)), 0.0);
    }

    #[test]
    fn test_barycentric_weights_sum_to_one() {
        let w = barycentric(p(1.0, 0.5), p(0.0, 0.0), p(3.0, 0.0), p(0.0, 2.0));

        assert!((w[0] + w[1] + w[2] - 1.0).abs() < EPS);
        assert!(w.iter().all(|&wi| (0.0..=1.0).contains(&wi)));
    }

    #[test]
    fn test_barycentric_at_vertices() {
        let (a, b, c) = (p(0.0, 0.0), p(3.0, 0.0), p(0.0, 2.0));

        let wa = barycentric(a, a, b, c);
        let wb = barycentric(b, a, b, c);
        assert!((wa[0] - 1.0).abs() < EPS);
        assert!((wb[1] - 1.0).abs() < EPS);
    }

    #[test]
    fn test_interpolate_scenario_points() {
        let a = DVec3::new(0.0, 0.0, 10.0);
        let b = DVec3::new(4.0, 0.0, 10.0);
        let c = DVec3::new(0.0, 4.0, 20.0);

        assert!((interpolate_elevation(p(0.0, 0.0), a, b, c) - 10.0).abs() < EPS);
        assert!((interpolate_elevation(p(0.0, 4.0), a, b, c) - 20.0).abs() < EPS);
        assert!((interpolate_elevation(p(2.0, 2.0), a, b, c) - 15.0).abs() < EPS);
    }

    #[test]
    fn test_interpolate_is_winding_independent() {
        let a = DVec3::new(0.0, 0.0, 1.0);
        let b = DVec3::new(5.0, 1.0, 7.0);
        let c = DVec3::new(2.0, 6.0, -3.0);
        let q = p(2.0, 2.0);

        let forward = interpolate_elevation(q, a, b, c);
        let reversed = interpolate_elevation(q, a, c, b);
        assert!((forward - reversed).abs() < EPS);
    }

    #[test]
    fn test_interpolate_degenerate_is_not_finite() {
        let a = DVec3::new(0.0, 0.0, 1.0);
        let b = DVec3::new(1.0, 1.0, 2.0);
        let c = DVec3::new(2.0, 2.0, 3.0);

        assert!(!interpolate_elevation(p(1.0, 1.0), a, b, c).is_finite());
    }
}
