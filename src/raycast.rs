//! CPU ray casting against scene geometry.
//!
//! Rays, axis aligned bounding boxes and the view frustum used by the marker
//! occlusion test and by instance culling. All tests run in `f32` world space.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Transform, Vector3, Vector4};

const EPSILON: f32 = 1e-6;

/// A half-line starting at `origin`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Builds a ray with a normalized direction. Distances reported by the
    /// intersection routines are then world units.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Moves the ray into the space described by `inverse`.
    ///
    /// The direction is not renormalized, so a parameter `t` measured on the
    /// transformed ray names the same point as `t` on the original one.
    pub fn transformed(&self, inverse: &Matrix4<f32>) -> Self {
        Self {
            origin: inverse.transform_point(self.origin),
            direction: inverse.transform_vector(self.direction),
        }
    }

    /// Möller-Trumbore intersection, accepting hits from either side of the
    /// triangle. Returns the ray parameter of the hit.
    pub fn intersect_triangle(&self, [v0, v1, v2]: [Point3<f32>; 3]) -> Option<f32> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = self.direction.cross(edge2);
        let a = edge1.dot(h);
        // parallel to the triangle plane
        if a.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * self.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        (t > EPSILON).then_some(t)
    }

    /// Slab test. Returns the entry parameter (or 0 when the origin is inside).
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        let inv = |d: f32| {
            if d.abs() < EPSILON {
                1.0 / EPSILON.copysign(d)
            } else {
                1.0 / d
            }
        };
        let inv_dir = Vector3::new(inv(self.direction.x), inv(self.direction.y), inv(self.direction.z));

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        for axis in 0..3 {
            let t0 = (aabb.min[axis] - self.origin[axis]) * inv_dir[axis];
            let t1 = (aabb.max[axis] - self.origin[axis]) * inv_dir[axis];
            t_near = t_near.max(t0.min(t1));
            t_far = t_far.min(t0.max(t1));
        }

        if t_near > t_far || t_far < 0.0 {
            return None;
        }
        Some(t_near.max(0.0))
    }
}

/// Nearest intersection found by a scene ray cast.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    pub distance: f32,
    pub point: Point3<f32>,
    /// Name of the geometry that was hit.
    pub geometry: String,
}

/// Axis aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point3<f32>>) -> Self {
        points.into_iter().fold(Self::empty(), |mut aabb, p| {
            aabb.min = Point3::new(aabb.min.x.min(p.x), aabb.min.y.min(p.y), aabb.min.z.min(p.z));
            aabb.max = Point3::new(aabb.max.x.max(p.x), aabb.max.y.max(p.y), aabb.max.z.max(p.z));
            aabb
        })
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn center(&self) -> Point3<f32> {
        self.min.midpoint(self.max)
    }

    /// Bounding sphere of the box after applying `matrix`.
    pub fn bounding_sphere(&self, matrix: &Matrix4<f32>) -> (Point3<f32>, f32) {
        let corners = self.corners().map(|c| matrix.transform_point(c));
        let center = Point3::centroid(&corners);
        let radius = corners
            .iter()
            .map(|c| (c - center).magnitude())
            .fold(0.0, f32::max);
        (center, radius)
    }

    fn corners(&self) -> [Point3<f32>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }
}

/// Six clip planes extracted from a view-projection matrix.
///
/// Each plane is `(normal, d)` with the normal pointing into the frustum.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    planes: [Vector4<f32>; 6],
}

impl Frustum {
    pub fn from_view_proj(m: &Matrix4<f32>) -> Self {
        let row = |i: usize| Vector4::new(m.x[i], m.y[i], m.z[i], m.w[i]);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));
        let planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r3 + r2, r3 - r2].map(|p| {
            let len = p.truncate().magnitude();
            if len > 0.0 { p / len } else { p }
        });
        Self { planes }
    }

    pub fn intersects_sphere(&self, center: Point3<f32>, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|p| p.truncate().dot(center.to_vec()) + p.w >= -radius)
    }
}
