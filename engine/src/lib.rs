//! Bottle Range Engine Library
//!
//! Headless rigid-body core of the bottle range game. Gameplay code creates
//! bodies, pushes forces and impulses at them, listens for collisions and reads
//! transforms back for drawing. Windowing, audio, UI and the renderer itself
//! live outside this crate.
//!
//! # Modules
//!
//! - [`math`] - Transform with cached model matrix
//! - [`core`] - Synchronous event channel
//! - [`physics`] - Colliders, bodies, narrow phase, world step and ray queries
//! - [`render`] - GPU-ready instance data built from bodies
//!
//! # Example
//!
//! ```ignore
//! use bottle_range_engine::physics::{BodyDesc, Collider, PhysicsWorld, Ray};
//! use glam::Vec3;
//!
//! let mut world = PhysicsWorld::new(Vec3::new(0.0, -9.81, 0.0));
//!
//! let bottle = world.add_body(
//!     BodyDesc::dynamic(Vec3::new(0.0, 1.0, -10.0))
//!         .with_mass(0.4)
//!         .with_collider(Collider::cuboid(Vec3::new(0.1, 0.3, 0.1))),
//! );
//!
//! world.on_collision(|contact| tracing::debug!(?contact.body_a, ?contact.body_b, "clink"));
//!
//! // Shoot: raycast from the camera, push whatever was hit
//! let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.1, -1.0));
//! let hit = world.raycast_body(&ray, bottle);
//! if hit.has_intersected {
//!     world.apply_linear_impulse(bottle, ray.direction() * 2.0);
//! }
//!
//! world.step(1.0 / 60.0);
//! let instances = world.instances();
//! ```

pub mod core;
pub mod math;
pub mod physics;
pub mod render;

// Re-export the types almost every caller touches
pub use math::Transform;
pub use physics::{BodyDesc, BodyHandle, BodyType, Collider, PhysicsBody, PhysicsConfig, PhysicsWorld};
pub use render::BodyInstance;
