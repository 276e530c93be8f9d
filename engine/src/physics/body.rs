//! Physics bodies
//!
//! [`PhysicsBody`] is the mutable simulation state of one entity: transform,
//! velocities, accumulated force/torque and mass properties. Bodies are owned
//! by a [`PhysicsWorld`](super::PhysicsWorld) and addressed through
//! [`BodyHandle`]s.
//!
//! # Mass conventions
//!
//! - `inverse_mass == 0` means infinite mass: the body ignores gravity and is
//!   never pushed apart during contact resolution.
//! - Static bodies always have zero inverse mass, whatever mass they were given,
//!   and silently ignore every force and impulse.
//! - A non-positive or non-finite mass also yields infinite mass.
//!
//! # Example
//!
//! ```ignore
//! use bottle_range_engine::physics::{BodyDesc, BodyType, Collider, PhysicsBody};
//! use glam::Vec3;
//!
//! let mut body = PhysicsBody::new(&BodyDesc::dynamic(Vec3::new(0.0, 5.0, 0.0)).with_mass(2.0));
//! body.attach_collider(Collider::ball(0.5));
//! body.apply_linear_impulse(Vec3::new(4.0, 0.0, 0.0)); // +2 m/s on X
//! ```

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::collider::Collider;
use super::types::GEOMETRY_EPSILON;
use crate::math::Transform;

slotmap::new_key_type! {
    /// Generation-checked handle to a body owned by a [`PhysicsWorld`](super::PhysicsWorld).
    ///
    /// A handle to a removed body never resolves again, even after its slot is reused.
    pub struct BodyHandle;
}

/// How the solver treats a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BodyType {
    /// Fully simulated.
    #[default]
    Dynamic,
    /// Integrated like a dynamic body; reserved for gameplay-driven movers.
    Kinematic,
    /// Never moves, never integrates, ignores forces and impulses.
    Static,
}

/// Creation parameters for a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    /// Initial world position (meters)
    pub position: Vec3,
    /// Solver treatment
    pub body_type: BodyType,
    /// Mass (kilograms). Non-positive means infinite.
    pub mass: f32,
    /// Bounciness, combined multiplicatively with the other body's
    pub restitution: f32,
    /// Inactive bodies are neither integrated nor collided
    pub is_active: bool,
    /// Opaque id of the owning gameplay entity
    pub user_data: u64,
    /// Collider attached right after creation
    pub collider: Option<Collider>,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self::new(Vec3::ZERO, BodyType::Dynamic)
    }
}

impl BodyDesc {
    /// Descriptor with the stock defaults: mass 1, restitution 0.5, active, no collider.
    pub fn new(position: Vec3, body_type: BodyType) -> Self {
        Self {
            position,
            body_type,
            mass: 1.0,
            restitution: 0.5,
            is_active: true,
            user_data: 0,
            collider: None,
        }
    }

    /// Dynamic body at `position`.
    pub fn dynamic(position: Vec3) -> Self {
        Self::new(position, BodyType::Dynamic)
    }

    /// Kinematic body at `position`.
    pub fn kinematic(position: Vec3) -> Self {
        Self::new(position, BodyType::Kinematic)
    }

    /// Static body at `position`.
    pub fn fixed(position: Vec3) -> Self {
        Self::new(position, BodyType::Static)
    }

    /// Mass in kilograms. Zero or less gives the body infinite mass.
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Bounciness; the two bodies' values multiply on contact.
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Opaque gameplay tag; its low 32 bits reach render instances.
    pub fn with_user_data(mut self, user_data: u64) -> Self {
        self.user_data = user_data;
        self
    }

    /// Collider attached when the body is created.
    pub fn with_collider(mut self, collider: impl Into<Collider>) -> Self {
        self.collider = Some(collider.into());
        self
    }

    /// Starts the body switched off (pooled particles, hidden targets).
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Simulation state for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsBody {
    /// Position, orientation and render scale
    pub transform: Transform,
    /// Force accumulated since the last step (cleared every step)
    pub force: Vec3,
    /// Torque accumulated since the last step (cleared every step)
    pub torque: Vec3,
    /// Linear velocity (m/s)
    pub linear_velocity: Vec3,
    /// Angular velocity (rad/s)
    pub angular_velocity: Vec3,
    /// Bounciness
    pub restitution: f32,
    /// Inactive bodies are skipped by integration and pair testing
    pub is_active: bool,
    /// Opaque id of the owning gameplay entity
    pub user_data: u64,

    body_type: BodyType,
    collider: Option<Collider>,
    mass: f32,
    inverse_mass: f32,
    inertia_tensor: Mat3,
    inverse_inertia_tensor: Mat3,
}

impl PhysicsBody {
    /// Builds a body from its descriptor. Velocities and accumulators start at zero.
    pub fn new(desc: &BodyDesc) -> Self {
        let inverse_mass = inverse_mass_for(desc.body_type, desc.mass);
        let inverse_inertia_tensor = if inverse_mass > 0.0 {
            Mat3::IDENTITY
        } else {
            Mat3::ZERO
        };

        let mut body = Self {
            transform: Transform::new(desc.position),
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            restitution: desc.restitution,
            is_active: desc.is_active,
            user_data: desc.user_data,
            body_type: desc.body_type,
            collider: None,
            mass: desc.mass,
            inverse_mass,
            inertia_tensor: Mat3::IDENTITY,
            inverse_inertia_tensor,
        };

        if let Some(collider) = desc.collider {
            body.attach_collider(collider);
        }
        body
    }

    /// Static, kinematic or dynamic.
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// True for bodies that never move.
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    /// Attached collider, if any.
    pub fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }

    /// Mass as given at creation (kilograms).
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Reciprocal mass; zero for static and infinite-mass bodies.
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// False for static and infinite-mass bodies. Gravity only acts on finite mass.
    pub fn has_finite_mass(&self) -> bool {
        self.inverse_mass > 0.0
    }

    /// Body-space inertia of the collider shape; identity without one.
    pub fn inertia_tensor(&self) -> Mat3 {
        self.inertia_tensor
    }

    /// Inverse of `inertia_tensor`, used for angular acceleration.
    pub fn inverse_inertia_tensor(&self) -> Mat3 {
        self.inverse_inertia_tensor
    }

    /// World position shortcut.
    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    /// Attaches the body's one collider.
    ///
    /// Rescales the transform to the shape's extents (cosmetic) and rebuilds the
    /// inertia tensor from the current mass. A body keeps its first collider:
    /// later calls are ignored and return `false`.
    pub fn attach_collider(&mut self, collider: impl Into<Collider>) -> bool {
        let collider = collider.into();
        if let Some(existing) = self.collider {
            warn!(existing = ?existing.kind(), rejected = ?collider.kind(), "body already has a collider");
            return false;
        }

        self.transform.rescale(collider.render_scale());
        self.inertia_tensor = collider.inertia_tensor(self.mass);
        self.inverse_inertia_tensor = if self.has_finite_mass()
            && self.inertia_tensor.determinant().abs() > GEOMETRY_EPSILON
        {
            self.inertia_tensor.inverse()
        } else {
            Mat3::ZERO
        };
        self.collider = Some(collider);

        debug!(kind = ?collider.kind(), mass = self.mass, "collider attached");
        true
    }

    /// Accumulates `force` applied at world point `point`.
    ///
    /// The off-centre part becomes torque `(point - position) x (-force)`.
    pub fn apply_force_at(&mut self, force: Vec3, point: Vec3) {
        if self.is_static() {
            return;
        }
        let lever = point - self.transform.position();
        self.force += force;
        self.torque += lever.cross(-force);
    }

    /// Accumulates a force through the centre of mass.
    pub fn apply_linear_force(&mut self, force: Vec3) {
        if self.is_static() {
            return;
        }
        self.force += force;
    }

    /// Accumulates a torque.
    pub fn apply_angular_force(&mut self, torque: Vec3) {
        if self.is_static() {
            return;
        }
        self.torque += torque;
    }

    /// Instantly changes linear velocity by `impulse * inverse_mass`.
    pub fn apply_linear_impulse(&mut self, impulse: Vec3) {
        if self.is_static() {
            return;
        }
        self.linear_velocity += impulse * self.inverse_mass;
    }

    /// Instantly changes angular velocity by `inverse_inertia * impulse`.
    pub fn apply_angular_impulse(&mut self, impulse: Vec3) {
        if self.is_static() {
            return;
        }
        self.angular_velocity += self.inverse_inertia_tensor * impulse;
    }

    /// Stops the body: velocities and accumulators back to zero.
    pub fn reset_motion(&mut self) {
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }

    /// Toggles simulation of the body. Deactivating also stops it.
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        if !active {
            self.reset_motion();
        }
    }

    /// Moves the body without touching its velocity.
    pub fn teleport(&mut self, position: Vec3) {
        self.transform.translate(position);
    }

    /// Semi-implicit Euler step for one body.
    ///
    /// Velocity is updated before position. Angular velocity is damped by
    /// `angular_damping_factor`; linear velocity is not. Force and torque are
    /// cleared afterwards. Callers gate out static/inactive bodies and bad `dt`.
    pub(crate) fn integrate(&mut self, dt: f32, gravity: Vec3, angular_damping_factor: f32) {
        let mut acceleration = self.force * self.inverse_mass;
        if self.has_finite_mass() {
            acceleration += gravity;
        }

        self.linear_velocity += acceleration * dt;
        let position = self.transform.position() + self.linear_velocity * dt;

        let angular_acceleration = self.inverse_inertia_tensor * self.torque;
        self.angular_velocity += angular_acceleration * dt;
        self.angular_velocity *= angular_damping_factor;

        let orientation = self.transform.rotation();
        let half_step = self.angular_velocity * dt * 0.5;
        let spin = Quat::from_xyzw(half_step.x, half_step.y, half_step.z, 0.0) * orientation;

        self.transform.translate(position);
        self.transform.rotate(orientation + spin);

        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }
}

fn inverse_mass_for(body_type: BodyType, mass: f32) -> f32 {
    if body_type == BodyType::Static || !(mass > 0.0 && mass.is_finite()) {
        0.0
    } else {
        1.0 / mass
    }
}
