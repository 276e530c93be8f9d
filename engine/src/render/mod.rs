//! Render Module
//!
//! Read-out side of the engine: turns physics bodies into plain instance data.
//! Drawing itself belongs to the host renderer.

pub mod instance;

pub use instance::{BodyInstance, SHAPE_BOX, SHAPE_SPHERE, as_bytes};
