//! Collision detection module
//!
//! Narrow-phase tests between the collider primitives. Every test returns a
//! [`CollisionPoint`]; "no contact" is the `has_collided` flag, never a
//! sentinel depth.
//!
//! # Conventions
//!
//! - The contact normal is unit length and points from shape A toward shape B.
//!   Separating the pair means moving A along `-normal` and B along `+normal`.
//! - Contact points are world space and approximate. Box-box contacts report
//!   the centre of the overlap region for both bodies.
//! - Boxes are axis-aligned: only the transform position is read.
//!
//! # Example
//!
//! ```ignore
//! use bottle_range_engine::math::Transform;
//! use bottle_range_engine::physics::{Collider, collision::collide};
//! use glam::Vec3;
//!
//! let a = Collider::ball(0.5);
//! let b = Collider::ball(0.5);
//! let point = collide(
//!     Some(&a), &Transform::new(Vec3::ZERO),
//!     Some(&b), &Transform::new(Vec3::new(0.9, 0.0, 0.0)),
//! );
//! assert!(point.has_collided);
//! assert_eq!(point.normal, Vec3::X);
//! ```

use glam::Vec3;

use super::body::BodyHandle;
use super::collider::{BoxCollider, Collider, SphereCollider};
use super::types::GEOMETRY_EPSILON;
use crate::math::Transform;

/// Result of one narrow-phase test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPoint {
    /// Approximate world-space contact point on shape A
    pub point_a: Vec3,
    /// Approximate world-space contact point on shape B
    pub point_b: Vec3,
    /// Unit normal pointing from A toward B
    pub normal: Vec3,
    /// Overlap along the normal (>= 0)
    pub depth: f32,
    /// Whether the shapes touch at all
    pub has_collided: bool,
}

impl Default for CollisionPoint {
    fn default() -> Self {
        Self::none()
    }
}

impl CollisionPoint {
    /// The "not colliding" result.
    pub const fn none() -> Self {
        Self {
            point_a: Vec3::ZERO,
            point_b: Vec3::ZERO,
            normal: Vec3::ZERO,
            depth: 0.0,
            has_collided: false,
        }
    }

    /// A contact with the given geometry.
    pub fn contact(point_a: Vec3, point_b: Vec3, normal: Vec3, depth: f32) -> Self {
        Self {
            point_a,
            point_b,
            normal,
            depth,
            has_collided: true,
        }
    }

    /// Same contact seen from the other shape: points swapped, normal negated.
    pub fn flipped(self) -> Self {
        Self {
            point_a: self.point_b,
            point_b: self.point_a,
            normal: -self.normal,
            ..self
        }
    }
}

/// A contact between two bodies of the world, as published to collision listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionData {
    /// First body of the pair (the normal points away from it)
    pub body_a: BodyHandle,
    /// Second body of the pair
    pub body_b: BodyHandle,
    /// Contact geometry
    pub point: CollisionPoint,
}

/// Tests two optional colliders against each other.
///
/// A missing collider on either side is "not colliding", not an error.
pub fn collide(
    collider_a: Option<&Collider>,
    transform_a: &Transform,
    collider_b: Option<&Collider>,
    transform_b: &Transform,
) -> CollisionPoint {
    let (Some(collider_a), Some(collider_b)) = (collider_a, collider_b) else {
        return CollisionPoint::none();
    };

    let pos_a = transform_a.position();
    let pos_b = transform_b.position();

    match (collider_a, collider_b) {
        (Collider::Box(a), Collider::Box(b)) => box_box(a, pos_a, b, pos_b),
        (Collider::Sphere(a), Collider::Sphere(b)) => sphere_sphere(a, pos_a, b, pos_b),
        (Collider::Sphere(a), Collider::Box(b)) => sphere_box(a, pos_a, b, pos_b),
        (Collider::Box(a), Collider::Sphere(b)) => sphere_box(b, pos_b, a, pos_a).flipped(),
    }
}

/// Interval overlap on all three axes: `|center_b - center_a| < half_a + half_b`.
pub fn aabb_overlap(center_a: Vec3, half_a: Vec3, center_b: Vec3, half_b: Vec3) -> bool {
    let diff = (center_b - center_a).abs();
    diff.cmplt(half_a + half_b).all()
}

/// Axis-aligned box against axis-aligned box.
///
/// The normal is the face direction with the smallest positive separating
/// distance among the six candidates (A's faces against B's opposite faces).
pub fn box_box(box_a: &BoxCollider, center_a: Vec3, box_b: &BoxCollider, center_b: Vec3) -> CollisionPoint {
    if !aabb_overlap(center_a, box_a.half_extents, center_b, box_b.half_extents) {
        return CollisionPoint::none();
    }

    let (min_a, max_a) = box_a.bounds(center_a);
    let (min_b, max_b) = box_b.bounds(center_b);

    let candidates = [
        (Vec3::NEG_X, max_b.x - min_a.x), // B sits on A's -X side
        (Vec3::X, max_a.x - min_b.x),     // B sits on A's +X side
        (Vec3::NEG_Y, max_b.y - min_a.y),
        (Vec3::Y, max_a.y - min_b.y),
        (Vec3::NEG_Z, max_b.z - min_a.z),
        (Vec3::Z, max_a.z - min_b.z),
    ];

    let (normal, depth) = candidates
        .into_iter()
        .fold((Vec3::ZERO, f32::MAX), |best, candidate| {
            if candidate.1 < best.1 { candidate } else { best }
        });

    // Centre of the overlap region. Not an exact manifold.
    let overlap_center = (min_a.max(min_b) + max_a.min(max_b)) * 0.5;

    CollisionPoint::contact(overlap_center, overlap_center, normal, depth)
}

/// Sphere against sphere. Touching (`distance == r_a + r_b`) counts as colliding.
pub fn sphere_sphere(
    sphere_a: &SphereCollider,
    center_a: Vec3,
    sphere_b: &SphereCollider,
    center_b: Vec3,
) -> CollisionPoint {
    let radii = sphere_a.radius + sphere_b.radius;
    let diff = center_b - center_a;
    let distance = diff.length();

    if distance > radii {
        return CollisionPoint::none();
    }

    // Coincident centres have no preferred direction
    let normal = if distance > GEOMETRY_EPSILON {
        diff / distance
    } else {
        Vec3::Y
    };

    CollisionPoint::contact(
        center_a + normal * sphere_a.radius,
        center_b - normal * sphere_b.radius,
        normal,
        radii - distance,
    )
}

/// Sphere (A) against axis-aligned box (B). The normal points from the sphere into the box.
pub fn sphere_box(
    sphere: &SphereCollider,
    sphere_center: Vec3,
    shape: &BoxCollider,
    box_center: Vec3,
) -> CollisionPoint {
    let half = shape.half_extents;
    let offset = sphere_center - box_center;
    let closest = box_center + offset.clamp(-half, half);

    let to_sphere = sphere_center - closest;
    let distance = to_sphere.length();

    if distance > sphere.radius {
        return CollisionPoint::none();
    }

    if distance > GEOMETRY_EPSILON {
        let normal = -to_sphere / distance;
        return CollisionPoint::contact(
            sphere_center + normal * sphere.radius,
            closest,
            normal,
            sphere.radius - distance,
        );
    }

    // Sphere centre inside the box: push out through the nearest face
    let penetration = half - offset.abs();
    let axis = if penetration.x <= penetration.y && penetration.x <= penetration.z {
        0
    } else if penetration.y <= penetration.z {
        1
    } else {
        2
    };

    let side = if offset[axis] < 0.0 { -1.0 } else { 1.0 };
    let mut face_normal = Vec3::ZERO;
    face_normal[axis] = side;

    let mut face_point = closest;
    face_point[axis] = box_center[axis] + side * half[axis];

    let normal = -face_normal;
    CollisionPoint::contact(
        sphere_center + normal * sphere.radius,
        face_point,
        normal,
        sphere.radius + penetration[axis],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn at(x: f32, y: f32, z: f32) -> Transform {
        Transform::new(Vec3::new(x, y, z))
    }

    #[test]
    fn test_missing_collider_is_no_collision() {
        let ball = Collider::ball(1.0);
        assert!(!collide(None, &at(0.0, 0.0, 0.0), Some(&ball), &at(0.0, 0.0, 0.0)).has_collided);
        assert!(!collide(Some(&ball), &at(0.0, 0.0, 0.0), None, &at(0.0, 0.0, 0.0)).has_collided);
        assert!(!collide(None, &at(0.0, 0.0, 0.0), None, &at(0.0, 0.0, 0.0)).has_collided);
    }

    #[test]
    fn test_sphere_sphere_overlap() {
        let a = SphereCollider::new(0.5);
        let b = SphereCollider::new(0.5);
        let point = sphere_sphere(&a, Vec3::ZERO, &b, Vec3::new(0.9, 0.0, 0.0));

        assert!(point.has_collided);
        assert_eq!(point.normal, Vec3::X);
        assert_relative_eq!(point.depth, 0.1, epsilon = 1e-6);
        assert_eq!(point.point_a, Vec3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(point.point_b.x, 0.4, epsilon = 1e-6);
    }

    #[test]
    fn test_sphere_sphere_touching_counts() {
        let a = SphereCollider::new(1.0);
        let b = SphereCollider::new(1.0);
        let point = sphere_sphere(&a, Vec3::ZERO, &b, Vec3::new(0.0, 2.0, 0.0));
        assert!(point.has_collided);
        assert_eq!(point.depth, 0.0);
    }

    #[test]
    fn test_sphere_sphere_coincident_centres() {
        let a = SphereCollider::new(1.0);
        let point = sphere_sphere(&a, Vec3::ONE, &a, Vec3::ONE);
        assert!(point.has_collided);
        assert_eq!(point.normal, Vec3::Y);
        assert_relative_eq!(point.depth, 2.0);
    }

    #[test]
    fn test_box_box_picks_min_axis() {
        let a = BoxCollider::cube(1.0);
        let b = BoxCollider::cube(1.0);
        // Overlap of 0.5 on X, 1.8 on Y, 2.0 on Z
        let point = box_box(&a, Vec3::ZERO, &b, Vec3::new(1.5, 0.2, 0.0));

        assert!(point.has_collided);
        assert_eq!(point.normal, Vec3::X);
        assert_relative_eq!(point.depth, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_box_box_normal_points_toward_b() {
        let a = BoxCollider::cube(1.0);
        let b = BoxCollider::cube(1.0);
        let point = box_box(&a, Vec3::ZERO, &b, Vec3::new(0.0, -1.75, 0.0));
        assert_eq!(point.normal, Vec3::NEG_Y);
        assert_relative_eq!(point.depth, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_box_box_touching_faces_do_not_collide() {
        let a = BoxCollider::cube(1.0);
        let point = box_box(&a, Vec3::ZERO, &a, Vec3::new(2.0, 0.0, 0.0));
        assert!(!point.has_collided);
    }

    #[test]
    fn test_box_box_contact_is_overlap_centre() {
        let a = BoxCollider::cube(1.0);
        let point = box_box(&a, Vec3::ZERO, &a, Vec3::new(1.5, 0.0, 0.0));
        assert_relative_eq!(point.point_a.x, 0.75, epsilon = 1e-6);
        assert_eq!(point.point_a, point.point_b);
    }

    #[test]
    fn test_sphere_box_side_contact() {
        let sphere = SphereCollider::new(0.5);
        let shape = BoxCollider::cube(1.0);
        let point = sphere_box(&sphere, Vec3::new(-1.25, 0.0, 0.0), &shape, Vec3::ZERO);

        assert!(point.has_collided);
        assert_eq!(point.normal, Vec3::X);
        assert_relative_eq!(point.depth, 0.25, epsilon = 1e-6);
        assert_eq!(point.point_b, Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_sphere_box_miss_at_corner() {
        let sphere = SphereCollider::new(0.5);
        let shape = BoxCollider::cube(1.0);
        // Inside the per-axis slabs but outside the rounded corner
        let point = sphere_box(&sphere, Vec3::new(1.4, 1.4, 0.0), &shape, Vec3::ZERO);
        assert!(!point.has_collided);
    }

    #[test]
    fn test_sphere_centre_inside_box() {
        let sphere = SphereCollider::new(0.25);
        let shape = BoxCollider::cube(1.0);
        let point = sphere_box(&sphere, Vec3::new(0.0, 0.8, 0.0), &shape, Vec3::ZERO);

        assert!(point.has_collided);
        // Nearest face is +Y, so the sphere leaves upward; normal points into the box
        assert_eq!(point.normal, Vec3::NEG_Y);
        assert_relative_eq!(point.depth, 0.25 + 0.2, epsilon = 1e-5);
        assert_eq!(point.point_b, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_dispatch_box_sphere_is_flipped() {
        let sphere = Collider::ball(0.5);
        let shape = Collider::cuboid(Vec3::ONE);
        let sphere_at = at(0.0, 1.25, 0.0);
        let box_at = at(0.0, 0.0, 0.0);

        let sphere_first = collide(Some(&sphere), &sphere_at, Some(&shape), &box_at);
        let box_first = collide(Some(&shape), &box_at, Some(&sphere), &sphere_at);

        assert_eq!(sphere_first.normal, Vec3::NEG_Y);
        assert_eq!(box_first.normal, Vec3::Y);
        assert_relative_eq!(sphere_first.depth, box_first.depth);
        assert_eq!(sphere_first.point_a, box_first.point_b);
    }

    #[test]
    fn test_aabb_overlap() {
        assert!(aabb_overlap(Vec3::ZERO, Vec3::ONE, Vec3::splat(1.5), Vec3::ONE));
        assert!(!aabb_overlap(Vec3::ZERO, Vec3::ONE, Vec3::new(1.5, 1.5, 2.5), Vec3::ONE));
    }
}
