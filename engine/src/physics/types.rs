//! Physics math types
//!
//! glam types used throughout the physics code, re-exported so gameplay code
//! does not need its own glam import, plus the shared tolerances.

pub use glam::{Mat3, Mat4, Quat, Vec3, Vec4};

/// Tolerance for treating a length or determinant as zero.
pub const GEOMETRY_EPSILON: f32 = 1e-6;

/// Slack allowed when checking a ray hit point against box bounds.
pub const RAY_BOUNDS_EPSILON: f32 = 1e-4;
