//! Transform
//!
//! Position, rotation and scale of an entity plus the composite model matrix
//! the renderer consumes.
//!
//! The matrix is always `translate(position) * rotate(rotation) * scale(scale)`.
//! Every mutator rebuilds it immediately, so [`Transform::matrix`] is never stale.
//!
//! # Example
//!
//! ```ignore
//! use bottle_range_engine::math::Transform;
//! use glam::{Quat, Vec3};
//!
//! let mut transform = Transform::new(Vec3::new(0.0, 2.0, -5.0));
//! transform.rotate_axis_angle(Vec3::Y, std::f32::consts::FRAC_PI_2);
//! transform.rescale(Vec3::splat(0.2));
//!
//! let model = transform.matrix();
//! ```

use glam::{Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Squared length under which a quaternion is treated as degenerate.
const DEGENERATE_ROTATION_EPSILON: f32 = 1e-12;

/// Position/rotation/scale triple with a cached model matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransformParts", into = "TransformParts")]
pub struct Transform {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    matrix: Mat4,
}

/// Serialized form: the matrix is derived, so it is never written out.
#[derive(Serialize, Deserialize)]
struct TransformParts {
    position: Vec3,
    #[serde(default = "identity_rotation")]
    rotation: Quat,
    #[serde(default = "unit_scale")]
    scale: Vec3,
}

fn identity_rotation() -> Quat {
    Quat::IDENTITY
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl From<TransformParts> for Transform {
    fn from(parts: TransformParts) -> Self {
        Self::from_parts(parts.position, parts.rotation, parts.scale)
    }
}

impl From<Transform> for TransformParts {
    fn from(transform: Transform) -> Self {
        Self {
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Transform {
    /// Creates a transform at `position` with identity rotation and unit scale.
    pub fn new(position: Vec3) -> Self {
        Self::from_parts(position, Quat::IDENTITY, Vec3::ONE)
    }

    /// Creates a transform from all three components.
    ///
    /// The rotation is normalized; a degenerate (near-zero) quaternion becomes identity.
    pub fn from_parts(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let mut transform = Self {
            position,
            rotation: normalize_rotation(rotation),
            scale,
            matrix: Mat4::IDENTITY,
        };
        transform.rebuild();
        transform
    }

    /// World-space position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Orientation (always unit length).
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Per-axis scale.
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Composite model matrix: translate * rotate * scale.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Moves the transform to `position`.
    pub fn translate(&mut self, position: Vec3) {
        self.position = position;
        self.rebuild();
    }

    /// Replaces the orientation with `rotation`, normalized.
    pub fn rotate(&mut self, rotation: Quat) {
        self.rotation = normalize_rotation(rotation);
        self.rebuild();
    }

    /// Replaces the orientation with a rotation of `angle` radians about `axis`.
    ///
    /// A zero-length axis yields the identity rotation.
    pub fn rotate_axis_angle(&mut self, axis: Vec3, angle: f32) {
        let axis = axis.normalize_or_zero();
        let rotation = if axis == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_axis_angle(axis, angle)
        };
        self.rotate(rotation);
    }

    /// Axis-angle packed into a `Vec4`: `xyz` is the axis, `w` the angle in radians.
    pub fn rotate_axis_angle_vec(&mut self, axis_angle: Vec4) {
        self.rotate_axis_angle(axis_angle.truncate(), axis_angle.w);
    }

    /// Replaces the per-axis scale.
    pub fn rescale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.matrix = Mat4::from_translation(self.position)
            * Mat4::from_quat(self.rotation)
            * Mat4::from_scale(self.scale);
    }
}

fn normalize_rotation(rotation: Quat) -> Quat {
    if !rotation.is_finite() || rotation.length_squared() <= DEGENERATE_ROTATION_EPSILON {
        Quat::IDENTITY
    } else {
        rotation.normalize()
    }
}
