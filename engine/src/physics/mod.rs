//! Physics module for the bottle range
//!
//! Small rigid-body simulator built directly on glam, with no external physics
//! library. A [`PhysicsWorld`] owns every body; gameplay code holds
//! [`BodyHandle`]s, pushes forces and impulses through them, and reads the
//! resulting transforms back for rendering.
//!
//! # Unit System
//!
//! **1 unit = 1 meter** (SI units throughout)
//!
//! - Distances in meters
//! - Velocities in m/s
//! - Accelerations in m/s²
//! - Mass in kg
//!
//! # Submodules
//!
//! - [`types`] - glam types re-exported plus shared tolerances
//! - [`config`] - World parameters and JSON loading
//! - [`collider`] - Box and sphere shapes, inertia tensors
//! - [`body`] - Body state, descriptors, force and impulse application
//! - [`collision`] - Narrow-phase tests producing contact points
//! - [`world`] - Body ownership and the per-frame step
//! - [`ray`] - Ray queries against a single body's collider
//!
//! # Frame Order
//!
//! integrate -> all-pairs narrow phase (listeners notified per contact) ->
//! positional correction + impulse per contact. There is no broad phase and no
//! iterative solver; each contact is resolved exactly once.

pub mod body;
pub mod collider;
pub mod collision;
pub mod config;
pub mod ray;
pub mod types;
pub mod world;

// Re-export commonly used types at the physics module level
pub use body::{BodyDesc, BodyHandle, BodyType, PhysicsBody};
pub use collider::{BoxCollider, Collider, ColliderKind, SphereCollider};
pub use collision::{CollisionData, CollisionPoint, collide};
pub use config::{ConfigError, PhysicsConfig};
pub use ray::{Ray, RayIntersection, intersect_box, intersect_collider, intersect_sphere};
pub use types::{Mat3, Mat4, Quat, Vec3, Vec4};
pub use world::{PhysicsWorld, StepStats};
