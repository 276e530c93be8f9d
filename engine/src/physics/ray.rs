//! Ray intersection
//!
//! Hit-scan queries against a single body's collider, used for crosshair and
//! gun raycasts. There is no "query every body" helper: gameplay code decides
//! which bodies are worth testing and calls these per body.
//!
//! # Box test
//!
//! A simplified slab test that assumes the ray starts outside the box: for each
//! axis the near face is chosen from the sign of the direction, the largest of
//! the three face distances is the entry candidate, and the candidate point is
//! then checked against the box bounds. An axis with a zero direction
//! component contributes no candidate.
//!
//! # Example
//!
//! ```ignore
//! use bottle_range_engine::math::Transform;
//! use bottle_range_engine::physics::{BoxCollider, Ray, ray::intersect_box};
//! use glam::Vec3;
//!
//! let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
//! let hit = intersect_box(&ray, &Transform::new(Vec3::ZERO), &BoxCollider::cube(1.0));
//! assert!(hit.has_intersected);
//! assert_eq!(hit.distance, 4.0);
//! ```

use glam::Vec3;
use super::collider::{BoxCollider, Collider, SphereCollider};
use super::types::{GEOMETRY_EPSILON, RAY_BOUNDS_EPSILON};
use crate::math::Transform;

/// Half-line from `origin` along unit `direction`.
///
/// Fields are private so the direction is always unit length (or zero), which
/// keeps every reported `distance` Euclidean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    /// Creates a ray; `direction` is normalized (zero stays zero).
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Start point in world space.
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit direction, or zero for a degenerate ray that never hits.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Ray starting at `from` and passing through `to`.
    pub fn from_points(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }

    /// Point at distance `t` along the ray.
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// True when the direction is zero (or not a number).
    pub fn is_degenerate(&self) -> bool {
        !self.direction.is_finite() || self.direction.length_squared() < GEOMETRY_EPSILON
    }
}

/// Outcome of a ray query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayIntersection {
    /// World-space hit point
    pub point: Vec3,
    /// Outward surface normal at the hit point
    pub normal: Vec3,
    /// Distance from the ray origin to `point`
    pub distance: f32,
    /// Whether anything was hit
    pub has_intersected: bool,
}

impl Default for RayIntersection {
    fn default() -> Self {
        Self::miss()
    }
}

impl RayIntersection {
    /// The "nothing hit" result.
    pub const fn miss() -> Self {
        Self {
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            distance: 0.0,
            has_intersected: false,
        }
    }

    fn hit(point: Vec3, normal: Vec3, distance: f32) -> Self {
        Self {
            point,
            normal,
            distance,
            has_intersected: true,
        }
    }
}

/// Dispatches to the box or sphere test for `collider`.
pub fn intersect_collider(ray: &Ray, transform: &Transform, collider: &Collider) -> RayIntersection {
    match collider {
        Collider::Box(shape) => intersect_box(ray, transform, shape),
        Collider::Sphere(shape) => intersect_sphere(ray, transform, shape),
    }
}

/// Ray against an axis-aligned box centred on `transform`'s position.
///
/// The box bounds are recomputed from the transform on every call. Zero or
/// negative extents never hit.
pub fn intersect_box(ray: &Ray, transform: &Transform, shape: &BoxCollider) -> RayIntersection {
    if ray.is_degenerate() || shape.is_degenerate() {
        return RayIntersection::miss();
    }

    let (min, max) = shape.bounds(transform.position());

    // Near-face distance per axis; axes the ray runs parallel to stay unset
    let mut t_values = [f32::NEG_INFINITY; 3];
    for axis in 0..3 {
        let dir = ray.direction[axis];
        if dir > 0.0 {
            t_values[axis] = (min[axis] - ray.origin[axis]) / dir;
        } else if dir < 0.0 {
            t_values[axis] = (max[axis] - ray.origin[axis]) / dir;
        }
    }

    let (best_axis, best_t) = t_values
        .into_iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (axis, t)| if t > best.1 { (axis, t) } else { best });

    // Box behind the origin, or no axis produced a candidate
    if !(best_t >= 0.0) {
        return RayIntersection::miss();
    }

    let point = ray.point_at(best_t);
    let outside = (0..3).any(|axis| {
        point[axis] + RAY_BOUNDS_EPSILON < min[axis] || point[axis] - RAY_BOUNDS_EPSILON > max[axis]
    });
    if outside {
        return RayIntersection::miss();
    }

    let mut normal = Vec3::ZERO;
    normal[best_axis] = -ray.direction[best_axis].signum();

    RayIntersection::hit(point, normal, best_t)
}

/// Ray against a sphere centred on `transform`'s position.
///
/// A ray that starts inside the sphere reports the exit point, wherever the
/// centre lies. Otherwise spheres whose centre projects behind the origin are
/// rejected.
pub fn intersect_sphere(ray: &Ray, transform: &Transform, shape: &SphereCollider) -> RayIntersection {
    if ray.is_degenerate() || shape.is_degenerate() {
        return RayIntersection::miss();
    }

    let center = transform.position();
    let radius_sq = shape.radius * shape.radius;
    let starts_inside = (ray.origin - center).length_squared() <= radius_sq;
    let projection = (center - ray.origin).dot(ray.direction);
    if projection < 0.0 && !starts_inside {
        return RayIntersection::miss();
    }

    let closest = ray.point_at(projection);
    let center_distance_sq = (closest - center).length_squared();
    if center_distance_sq > radius_sq {
        return RayIntersection::miss();
    }

    // Back off from the closest approach to the surface
    let offset = (radius_sq - center_distance_sq).sqrt();
    let distance = if starts_inside {
        projection + offset
    } else {
        projection - offset
    };

    let point = ray.point_at(distance);
    let normal = (point - center) / shape.radius;

    RayIntersection::hit(point, normal, distance)
}
