//! Small 2D geometry helpers shared by the mesh and query code.
//!
//! All "2D" operations work in the xz plane; y is carried along or
//! interpolated separately, matching how the mesh treats height.

use glam::Vec3;

/// Signed area of the triangle (a, b, c) projected to the xz plane.
#[inline]
pub fn tri_area_2d(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    let abx = b.x - a.x;
    let abz = b.z - a.z;
    let acx = c.x - a.x;
    let acz = c.z - a.z;
    acx * abz - abx * acz
}

/// Whether two points coincide in the xz plane (tight tolerance).
#[inline]
pub fn v_equal_2d(a: Vec3, b: Vec3) -> bool {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    dx * dx + dz * dz < 1e-5
}

/// Point-in-convex-polygon test in the xz plane.
pub fn point_in_poly_2d(pt: Vec3, verts: &[Vec3]) -> bool {
    let mut inside = false;
    let n = verts.len();
    let mut j = n - 1;
    for i in 0..n {
        let vi = verts[i];
        let vj = verts[j];
        if ((vi.z > pt.z) != (vj.z > pt.z))
            && (pt.x < (vj.x - vi.x) * (pt.z - vi.z) / (vj.z - vi.z) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Squared xz distance from `pt` to segment (a, b), plus the segment
/// parameter of the closest point.
pub fn dist_pt_seg_sqr_2d(pt: Vec3, a: Vec3, b: Vec3) -> (f32, f32) {
    let bx = b.x - a.x;
    let bz = b.z - a.z;
    let dx = pt.x - a.x;
    let dz = pt.z - a.z;
    let d = bx * bx + bz * bz;
    let mut t = bx * dx + bz * dz;
    if d > 0.0 {
        t /= d;
    }
    let t = t.clamp(0.0, 1.0);
    let ex = a.x + t * bx - pt.x;
    let ez = a.z + t * bz - pt.z;
    (ex * ex + ez * ez, t)
}

/// Height of the triangle (a, b, c) under `pt`, if `pt` projects inside it.
pub fn height_on_triangle(pt: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    const EPS: f32 = 1e-6;
    let v0 = c - a;
    let v1 = b - a;
    let v2 = pt - a;

    let dot00 = v0.x * v0.x + v0.z * v0.z;
    let dot01 = v0.x * v1.x + v0.z * v1.z;
    let dot02 = v0.x * v2.x + v0.z * v2.z;
    let dot11 = v1.x * v1.x + v1.z * v1.z;
    let dot12 = v1.x * v2.x + v1.z * v2.z;

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() < EPS {
        return None;
    }
    let u = (dot11 * dot02 - dot01 * dot12) / denom;
    let v = (dot00 * dot12 - dot01 * dot02) / denom;
    if u >= -EPS && v >= -EPS && u + v <= 1.0 + EPS {
        Some(a.y + v0.y * u + v1.y * v)
    } else {
        None
    }
}

/// Intersection of the ray (p, q) with segment (a, b) in the xz plane.
/// Returns (ray parameter, segment parameter) when the lines are not parallel.
pub fn intersect_seg_seg_2d(p: Vec3, q: Vec3, a: Vec3, b: Vec3) -> Option<(f32, f32)> {
    let dx = q.x - p.x;
    let dz = q.z - p.z;
    let sx = b.x - a.x;
    let sz = b.z - a.z;

    let d = sx * dz - sz * dx;
    if d.abs() < 1e-6 {
        return None;
    }
    let t = ((p.x - a.x) * dz - (p.z - a.z) * dx) / d;
    let s = ((p.x - a.x) * sz - (p.z - a.z) * sx) / d;
    Some((s, t))
}

/// Whether two axis-aligned bounds overlap.
#[inline]
pub fn overlap_bounds(amin: Vec3, amax: Vec3, bmin: Vec3, bmax: Vec3) -> bool {
    amin.x <= bmax.x
        && amax.x >= bmin.x
        && amin.y <= bmax.y
        && amax.y >= bmin.y
        && amin.z <= bmax.z
        && amax.z >= bmin.z
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_in_poly_detects_inside_and_outside() {
        let square = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 2.0),
            Vec3::new(0.0, 0.0, 2.0),
        ];
        assert!(point_in_poly_2d(Vec3::new(1.0, 5.0, 1.0), &square));
        assert!(!point_in_poly_2d(Vec3::new(3.0, 0.0, 1.0), &square));
    }

    #[test]
    fn height_interpolates_sloped_triangle() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(2.0, 2.0, 0.0);
        let c = Vec3::new(0.0, 0.0, 2.0);
        let h = height_on_triangle(Vec3::new(1.0, 9.0, 0.5), a, b, c).unwrap();
        assert!((h - 1.0).abs() < 1e-4);
    }

    #[test]
    fn segment_intersection_parameters_are_forward() {
        let p = Vec3::new(0.0, 0.0, 0.0);
        let q = Vec3::new(4.0, 0.0, 0.0);
        let a = Vec3::new(3.0, 0.0, -1.0);
        let b = Vec3::new(3.0, 0.0, 3.0);
        let (s, t) = intersect_seg_seg_2d(p, q, a, b).unwrap();
        assert!((s - 0.75).abs() < 1e-6);
        assert!((t - 0.25).abs() < 1e-6);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(2.0, 0.0, 0.0);
        let (d2, t) = dist_pt_seg_sqr_2d(Vec3::new(3.0, 0.0, 0.0), a, b);
        assert_eq!(t, 1.0);
        assert!((d2 - 1.0).abs() < 1e-6);
    }
}
