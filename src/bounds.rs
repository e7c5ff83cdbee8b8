//! Axis-aligned bounds and view frustum tests
//!
//! Bounds are kept as center + half extents, the form the per-frame world
//! transform is applied to.

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Axis-aligned box stored as center and half extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec3,
    pub extents: Vec3,
}

impl Aabb {
    pub fn new(center: Vec3, extents: Vec3) -> Self {
        Self { center, extents }
    }

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            extents: (max - min) * 0.5,
        }
    }

    /// Smallest box containing every point, or `None` for an empty slice
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self::from_min_max(min, max))
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.extents
    }

    /// Grow every face outward by `margin`
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            center: self.center,
            extents: self.extents + Vec3::splat(margin),
        }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        let d = (point - self.center).abs();
        d.cmple(self.extents + Vec3::splat(1e-5)).all()
    }

    /// Conservative world-space box for a local box under `transform`.
    ///
    /// Each local half-axis is pushed through the transform and the absolute
    /// values of its contributions are summed per world axis.
    pub fn transformed(&self, transform: &Mat4) -> Self {
        let center = transform.transform_point3(self.center);

        let axis_x = transform.transform_vector3(Vec3::new(self.extents.x, 0.0, 0.0));
        let axis_y = transform.transform_vector3(Vec3::new(0.0, self.extents.y, 0.0));
        let axis_z = transform.transform_vector3(Vec3::new(0.0, 0.0, self.extents.z));

        let extents = axis_x.abs() + axis_y.abs() + axis_z.abs();

        Self { center, extents }
    }
}

/// Plane in the form `normal . p + d = 0`, normal pointing inside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    fn from_vec4(v: Vec4) -> Self {
        let normal = v.truncate();
        let length = normal.length();
        if length > 0.0 {
            Self {
                normal: normal / length,
                d: v.w / length,
            }
        } else {
            Self { normal, d: v.w }
        }
    }

    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }
}

/// View frustum extracted from a view-projection matrix
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    pub planes: [Plane; 6], // Left, right, bottom, top, near, far
}

impl Frustum {
    /// Planes for a wgpu-style projection (clip depth in 0..1)
    pub fn from_view_projection(view_proj: &Mat4) -> Self {
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);

        Self {
            planes: [
                Plane::from_vec4(r3 + r0),
                Plane::from_vec4(r3 - r0),
                Plane::from_vec4(r3 + r1),
                Plane::from_vec4(r3 - r1),
                Plane::from_vec4(r2),
                Plane::from_vec4(r3 - r2),
            ],
        }
    }

    /// False only when the box lies entirely outside one plane
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|plane| {
            let radius = aabb.extents.dot(plane.normal.abs());
            plane.distance_to_point(aabb.center) >= -radius
        })
    }
}
