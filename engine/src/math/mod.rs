//! Math Module
//!
//! Spatial helpers shared by physics and rendering. Vector and quaternion
//! types come straight from glam.

pub mod transform;

pub use transform::Transform;
