//! Colliders
//!
//! Shape data attached to a physics body. Two primitives exist:
//!
//! - [`BoxCollider`] - always axis-aligned; the owning body's rotation and
//!   scale are ignored by every box test.
//! - [`SphereCollider`] - a radius around the body position.
//!
//! [`Collider`] is the sum type the narrow phase matches on.

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned box described by its half extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxCollider {
    /// Half size along each world axis (meters)
    pub half_extents: Vec3,
}

impl BoxCollider {
    /// Creates a box from its half extents.
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    /// Creates a box from its full size.
    pub fn from_size(size: Vec3) -> Self {
        Self::new(size * 0.5)
    }

    /// Cube with equal half extents on every axis.
    pub fn cube(half_extent: f32) -> Self {
        Self::new(Vec3::splat(half_extent))
    }

    /// World-space `(min, max)` corners when centered at `center`.
    pub fn bounds(&self, center: Vec3) -> (Vec3, Vec3) {
        (center - self.half_extents, center + self.half_extents)
    }

    /// Full size along each axis.
    pub fn size(&self) -> Vec3 {
        self.half_extents * 2.0
    }

    /// True when any extent is zero, negative or not a number.
    pub fn is_degenerate(&self) -> bool {
        !(self.half_extents.cmpgt(Vec3::ZERO).all() && self.half_extents.is_finite())
    }
}

/// Sphere described by its radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereCollider {
    /// Radius (meters)
    pub radius: f32,
}

impl SphereCollider {
    /// Creates a sphere collider.
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    /// True when the radius is zero, negative or not a number.
    pub fn is_degenerate(&self) -> bool {
        !(self.radius > 0.0 && self.radius.is_finite())
    }
}

/// Discriminant of a [`Collider`], handy for logging and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderKind {
    Box,
    Sphere,
}

/// Shape attached to a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    Box(BoxCollider),
    Sphere(SphereCollider),
}

impl From<BoxCollider> for Collider {
    fn from(shape: BoxCollider) -> Self {
        Collider::Box(shape)
    }
}

impl From<SphereCollider> for Collider {
    fn from(shape: SphereCollider) -> Self {
        Collider::Sphere(shape)
    }
}

impl Collider {
    /// Shorthand for `Collider::Box(BoxCollider::new(half_extents))`.
    pub fn cuboid(half_extents: Vec3) -> Self {
        Collider::Box(BoxCollider::new(half_extents))
    }

    /// Shorthand for `Collider::Sphere(SphereCollider::new(radius))`.
    pub fn ball(radius: f32) -> Self {
        Collider::Sphere(SphereCollider::new(radius))
    }

    /// Which primitive this is.
    pub fn kind(&self) -> ColliderKind {
        match self {
            Collider::Box(_) => ColliderKind::Box,
            Collider::Sphere(_) => ColliderKind::Sphere,
        }
    }

    /// Scale the render transform takes on when this collider is attached.
    ///
    /// Boxes use their full size, spheres their radius on every axis. Purely
    /// cosmetic; no collision test reads the transform scale.
    pub fn render_scale(&self) -> Vec3 {
        match self {
            Collider::Box(shape) => shape.size(),
            Collider::Sphere(shape) => Vec3::splat(shape.radius),
        }
    }

    /// Inertia tensor of the solid shape with the given mass.
    ///
    /// Box: solid cuboid with full extents `w, h, d`:
    /// `diag(m/12 (h² + d²), m/12 (w² + d²), m/12 (w² + h²))`.
    /// Sphere: `2/5 m r²` on the diagonal.
    pub fn inertia_tensor(&self, mass: f32) -> Mat3 {
        match self {
            Collider::Box(shape) => {
                let size = shape.size();
                let (w2, h2, d2) = (size.x * size.x, size.y * size.y, size.z * size.z);
                let k = mass / 12.0;
                Mat3::from_diagonal(Vec3::new(k * (h2 + d2), k * (w2 + d2), k * (w2 + h2)))
            }
            Collider::Sphere(shape) => {
                let i = 0.4 * mass * shape.radius * shape.radius;
                Mat3::from_diagonal(Vec3::splat(i))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_bounds() {
        let shape = BoxCollider::new(Vec3::new(1.0, 2.0, 3.0));
        let (min, max) = shape.bounds(Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(min, Vec3::new(9.0, -2.0, -3.0));
        assert_eq!(max, Vec3::new(11.0, 2.0, 3.0));
    }

    #[test]
    fn test_cuboid_inertia() {
        // 2 x 4 x 6 box, mass 12
        let collider = Collider::cuboid(Vec3::new(1.0, 2.0, 3.0));
        let inertia = collider.inertia_tensor(12.0);
        assert_relative_eq!(inertia.x_axis.x, 16.0 + 36.0);
        assert_relative_eq!(inertia.y_axis.y, 4.0 + 36.0);
        assert_relative_eq!(inertia.z_axis.z, 4.0 + 16.0);
        assert_eq!(inertia.x_axis.y, 0.0);
    }

    #[test]
    fn test_sphere_inertia() {
        let inertia = Collider::ball(0.5).inertia_tensor(2.0);
        assert_relative_eq!(inertia.x_axis.x, 0.2);
        assert_relative_eq!(inertia.y_axis.y, 0.2);
        assert_relative_eq!(inertia.z_axis.z, 0.2);
    }

    #[test]
    fn test_render_scale() {
        assert_eq!(Collider::cuboid(Vec3::new(0.5, 1.0, 0.25)).render_scale(), Vec3::new(1.0, 2.0, 0.5));
        assert_eq!(Collider::ball(0.3).render_scale(), Vec3::splat(0.3));
    }

    #[test]
    fn test_degenerate_shapes() {
        assert!(BoxCollider::new(Vec3::new(1.0, 0.0, 1.0)).is_degenerate());
        assert!(BoxCollider::new(Vec3::new(1.0, f32::NAN, 1.0)).is_degenerate());
        assert!(!BoxCollider::cube(0.1).is_degenerate());
        assert!(SphereCollider::new(0.0).is_degenerate());
        assert!(SphereCollider::new(-1.0).is_degenerate());
        assert!(!SphereCollider::new(0.01).is_degenerate());
    }

    #[test]
    fn test_kind() {
        assert_eq!(Collider::ball(1.0).kind(), ColliderKind::Sphere);
        assert_eq!(Collider::from(BoxCollider::cube(1.0)).kind(), ColliderKind::Box);
    }
}
