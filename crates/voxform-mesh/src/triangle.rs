//! Triangle primitives with UV coordinates.

use glam::{Vec2, Vec3};
use voxform_core::{triangle_area, Aabb};

/// Area below which a triangle is treated as degenerate.
pub const DEGENERATE_AREA_EPSILON: f32 = 1e-9;

/// A triangle with per-vertex UV coordinates and a material reference.
///
/// The material index points into the owning mesh's material table;
/// `None` means the triangle has no material and samples to the fallback
/// colour.
#[derive(Clone, Debug)]
pub struct UvTriangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    pub uv0: Vec2,
    pub uv1: Vec2,
    pub uv2: Vec2,
    pub material: Option<usize>,
}

impl UvTriangle {
    /// Create a new triangle
    pub const fn new(
        v0: Vec3,
        v1: Vec3,
        v2: Vec3,
        uv0: Vec2,
        uv1: Vec2,
        uv2: Vec2,
        material: Option<usize>,
    ) -> Self {
        Self {
            v0,
            v1,
            v2,
            uv0,
            uv1,
            uv2,
            material,
        }
    }

    /// Surface area of the triangle
    #[inline]
    pub fn area(&self) -> f32 {
        triangle_area(self.v0, self.v1, self.v2)
    }

    /// Whether the triangle has effectively zero area.
    ///
    /// Degenerate triangles are skipped during voxelisation, not errors.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.area() < DEGENERATE_AREA_EPSILON
    }

    /// Bounding box of the triangle
    pub fn aabb(&self) -> Aabb {
        let mut aabb = Aabb::new(self.v0, self.v0);
        aabb.expand_to_include(self.v1);
        aabb.expand_to_include(self.v2);
        aabb
    }

    /// Unit normal of the triangle plane.
    ///
    /// Returns `None` for degenerate triangles.
    pub fn normal(&self) -> Option<Vec3> {
        let n = (self.v1 - self.v0).cross(self.v2 - self.v0);
        if n.length_squared() < DEGENERATE_AREA_EPSILON {
            None
        } else {
            Some(n.normalize())
        }
    }

    /// Project a point onto the triangle's plane.
    ///
    /// Returns the projected point and the point's signed distance to the
    /// plane, or `None` for degenerate triangles.
    pub fn project_onto_plane(&self, p: Vec3) -> Option<(Vec3, f32)> {
        let n = self.normal()?;
        let dist = (p - self.v0).dot(n);
        Some((p - n * dist, dist))
    }

    /// Barycentric weights of a point computed from sub-triangle areas.
    ///
    /// `w0 = area(v1,v2,p) / total`, `w1 = area(v2,v0,p) / total`,
    /// `w2 = area(v0,v1,p) / total` where `total` is the sum of the three
    /// sub-areas. Returns `None` when the total is effectively zero.
    pub fn barycentric_weights(&self, p: Vec3) -> Option<[f32; 3]> {
        let area01 = triangle_area(self.v0, self.v1, p);
        let area12 = triangle_area(self.v1, self.v2, p);
        let area20 = triangle_area(self.v2, self.v0, p);
        let total = area01 + area12 + area20;
        if total < DEGENERATE_AREA_EPSILON {
            return None;
        }
        Some([area12 / total, area20 / total, area01 / total])
    }

    /// Test whether a point on the triangle's plane lies inside the
    /// triangle, by comparing the sum of sub-areas against the triangle's
    /// own area.
    pub fn contains_coplanar(&self, p: Vec3, epsilon: f32) -> bool {
        let area01 = triangle_area(self.v0, self.v1, p);
        let area12 = triangle_area(self.v1, self.v2, p);
        let area20 = triangle_area(self.v2, self.v0, p);
        area01 + area12 + area20 <= self.area() * (1.0 + epsilon)
    }

    /// Interpolate the triangle's UVs with the given barycentric weights
    #[inline]
    pub fn interpolate_uv(&self, w: [f32; 3]) -> Vec2 {
        self.uv0 * w[0] + self.uv1 * w[1] + self.uv2 * w[2]
    }

    /// Möller–Trumbore ray/triangle intersection.
    ///
    /// Returns the distance along the ray, or `None` on a miss. The ray
    /// direction does not need to be normalized; the returned `t` is in
    /// units of the direction's length.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        const EPS: f32 = 1e-7;

        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let h = direction.cross(edge2);
        let det = edge1.dot(h);
        if det.abs() < EPS {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = origin - self.v0;
        let u = s.dot(h) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        (t > EPS).then_some(t)
    }
}
