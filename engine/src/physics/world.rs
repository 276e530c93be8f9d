//! Physics world and simulation
//!
//! [`PhysicsWorld`] owns every body and runs the per-frame pipeline:
//!
//! 1. Integrate every active, non-static body (semi-implicit Euler)
//! 2. Enumerate all unordered pairs of active bodies (no spatial partitioning)
//! 3. Narrow-phase test each pair; publish and record every contact
//! 4. Resolve each recorded contact once (positional correction + linear impulse)
//!
//! The contact list only lives for the duration of [`PhysicsWorld::step`].
//! Nothing is cached between frames.
//!
//! # Example
//!
//! ```ignore
//! use bottle_range_engine::physics::{BodyDesc, Collider, PhysicsWorld};
//! use glam::Vec3;
//!
//! let mut world = PhysicsWorld::new(Vec3::new(0.0, -9.81, 0.0));
//! let ground = world.add_body(
//!     BodyDesc::fixed(Vec3::ZERO).with_collider(Collider::cuboid(Vec3::new(50.0, 0.5, 50.0))),
//! );
//! let crate_body = world.add_body(
//!     BodyDesc::dynamic(Vec3::new(0.0, 5.0, 0.0)).with_collider(Collider::cuboid(Vec3::splat(0.5))),
//! );
//!
//! world.on_collision(|contact| println!("{:?} hit {:?}", contact.body_a, contact.body_b));
//!
//! for _ in 0..120 {
//!     world.step(1.0 / 60.0);
//! }
//! let model = world.body(crate_body).unwrap().transform.matrix();
//! ```

use glam::Vec3;
use slotmap::SlotMap;
use tracing::{debug, info, trace, warn};

use super::body::{BodyDesc, BodyHandle, BodyType, PhysicsBody};
use super::collider::Collider;
use super::collision::{CollisionData, CollisionPoint, collide};
use super::config::PhysicsConfig;
use super::ray::{Ray, RayIntersection, intersect_collider};
use crate::core::{EventChannel, ListenerId};
use crate::math::Transform;
use crate::render::BodyInstance;

/// What one call to [`PhysicsWorld::step`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Bodies moved by the integration pass
    pub integrated: usize,
    /// Pairs that reached the narrow phase
    pub pairs_tested: usize,
    /// Contacts found (and published) this step
    pub contacts: usize,
    /// Contacts that changed at least one body
    pub resolved: usize,
    /// True when `dt` was rejected and integration did not run
    pub skipped_integration: bool,
}

/// Owner of all physics bodies and driver of the simulation step.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    bodies: SlotMap<BodyHandle, PhysicsBody>,
    /// Contacts found this step, drained by the resolution pass
    contacts: Vec<CollisionData>,
    collision_events: EventChannel<CollisionData>,
    /// Reused pair-iteration buffer
    handle_scratch: Vec<BodyHandle>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::with_config(PhysicsConfig::default())
    }
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("config", &self.config)
            .field("bodies", &self.bodies.len())
            .field("collision_listeners", &self.collision_events.listener_count())
            .finish()
    }
}

impl PhysicsWorld {
    /// Creates an empty world with default parameters and the given gravity.
    pub fn new(gravity: Vec3) -> Self {
        Self::with_config(PhysicsConfig::with_gravity(gravity))
    }

    /// Creates an empty world from a full configuration.
    pub fn with_config(config: PhysicsConfig) -> Self {
        info!(gravity = ?config.gravity, "physics world created");
        Self {
            config,
            bodies: SlotMap::with_key(),
            contacts: Vec::new(),
            collision_events: EventChannel::new(),
            handle_scratch: Vec::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Gravity acceleration (m/s²).
    pub fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    /// Replaces gravity; takes effect on the next step.
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
    }

    // ====== Body Management ======

    /// Descriptor carrying this world's default mass and restitution.
    pub fn body_desc(&self, position: Vec3, body_type: BodyType) -> BodyDesc {
        BodyDesc::new(position, body_type)
            .with_mass(self.config.default_mass)
            .with_restitution(self.config.default_restitution)
    }

    /// Creates a body from `desc` and returns its handle.
    pub fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = self.bodies.insert(PhysicsBody::new(&desc));
        debug!(?handle, body_type = ?desc.body_type, position = ?desc.position, "body added");
        handle
    }

    /// Destroys a body. Its handle (and every copy of it) stops resolving.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<PhysicsBody> {
        let removed = self.bodies.remove(handle);
        if removed.is_some() {
            debug!(?handle, "body removed");
        }
        removed
    }

    /// Body behind `handle`, `None` once removed.
    pub fn body(&self, handle: BodyHandle) -> Option<&PhysicsBody> {
        self.bodies.get(handle)
    }

    /// Mutable body behind `handle`, `None` once removed.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut PhysicsBody> {
        self.bodies.get_mut(handle)
    }

    /// True while `handle` refers to a live body.
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    /// Transform of a body, for rendering.
    pub fn transform(&self, handle: BodyHandle) -> Option<&Transform> {
        self.bodies.get(handle).map(|body| &body.transform)
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// True when no bodies are alive.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Iterates all bodies with their handles.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &PhysicsBody)> {
        self.bodies.iter()
    }

    /// Destroys every body. Listeners stay registered.
    pub fn clear(&mut self) {
        let count = self.bodies.len();
        self.bodies.clear();
        self.contacts.clear();
        debug!(count, "all bodies cleared");
    }

    /// Attaches a collider to a live body. `false` on a stale handle or if the
    /// body already has one.
    pub fn attach_collider(&mut self, handle: BodyHandle, collider: impl Into<Collider>) -> bool {
        self.bodies
            .get_mut(handle)
            .is_some_and(|body| body.attach_collider(collider))
    }

    // ====== Forces and Impulses ======
    //
    // Each returns whether the handle was live. Static bodies accept the call
    // and ignore it.

    /// Adds a force through the centre of mass.
    pub fn apply_linear_force(&mut self, handle: BodyHandle, force: Vec3) -> bool {
        self.with_body(handle, |body| body.apply_linear_force(force))
    }

    /// Adds a torque.
    pub fn apply_angular_force(&mut self, handle: BodyHandle, torque: Vec3) -> bool {
        self.with_body(handle, |body| body.apply_angular_force(torque))
    }

    /// Adds a force at a world-space point, producing torque about the centre.
    pub fn apply_force_at(&mut self, handle: BodyHandle, force: Vec3, point: Vec3) -> bool {
        self.with_body(handle, |body| body.apply_force_at(force, point))
    }

    /// Changes linear velocity by `impulse / mass` at once.
    pub fn apply_linear_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> bool {
        self.with_body(handle, |body| body.apply_linear_impulse(impulse))
    }

    /// Changes angular velocity through the inverse inertia tensor at once.
    pub fn apply_angular_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> bool {
        self.with_body(handle, |body| body.apply_angular_impulse(impulse))
    }

    fn with_body(&mut self, handle: BodyHandle, f: impl FnOnce(&mut PhysicsBody)) -> bool {
        match self.bodies.get_mut(handle) {
            Some(body) => {
                f(body);
                true
            }
            None => false,
        }
    }

    // ====== Collision Events ======

    /// Registers a listener called synchronously for every contact, during
    /// [`step`](Self::step), before the contact is resolved.
    pub fn on_collision<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&CollisionData) + 'static,
    {
        self.collision_events.subscribe(listener)
    }

    pub fn collision_events_mut(&mut self) -> &mut EventChannel<CollisionData> {
        &mut self.collision_events
    }

    // ====== Queries ======

    /// Casts `ray` against one body's collider.
    ///
    /// Misses on a stale handle, an inactive body, or a body without a collider.
    pub fn raycast_body(&self, ray: &Ray, handle: BodyHandle) -> RayIntersection {
        let Some(body) = self.bodies.get(handle) else {
            return RayIntersection::miss();
        };
        match body.collider() {
            Some(collider) if body.is_active => intersect_collider(ray, &body.transform, collider),
            _ => RayIntersection::miss(),
        }
    }

    /// Render instances for every active body that has a collider.
    pub fn instances(&self) -> Vec<BodyInstance> {
        self.bodies
            .values()
            .filter(|body| body.is_active && body.collider().is_some())
            .map(BodyInstance::from_body)
            .collect()
    }

    // ====== Simulation ======

    /// Advances the simulation by `dt` seconds.
    ///
    /// A non-finite or too-small `dt` skips integration; contacts are still
    /// detected and resolved.
    pub fn step(&mut self, dt: f32) -> StepStats {
        let mut stats = StepStats::default();

        if self.config.accepts_delta_time(dt) {
            self.integrate(dt, &mut stats);
        } else {
            warn!(dt, "skipping integration for degenerate delta time");
            stats.skipped_integration = true;
        }

        self.detect_collisions(&mut stats);
        self.resolve_collisions(&mut stats);

        trace!(?stats, "physics step");
        stats
    }

    fn integrate(&mut self, dt: f32, stats: &mut StepStats) {
        let gravity = self.config.gravity;
        let damping = self.config.angular_damping_factor(dt);

        for body in self.bodies.values_mut() {
            // Inactive and static bodies do not move
            if !body.is_active || body.is_static() {
                continue;
            }
            body.integrate(dt, gravity, damping);
            stats.integrated += 1;
        }
    }

    fn detect_collisions(&mut self, stats: &mut StepStats) {
        let mut handles = std::mem::take(&mut self.handle_scratch);
        handles.clear();
        handles.extend(self.bodies.keys());

        for (i, &handle_a) in handles.iter().enumerate() {
            let body_a = &self.bodies[handle_a];
            if !body_a.is_active {
                continue;
            }

            for &handle_b in &handles[i + 1..] {
                let body_b = &self.bodies[handle_b];
                if !body_b.is_active {
                    continue;
                }
                stats.pairs_tested += 1;

                let point = collide(
                    body_a.collider(),
                    &body_a.transform,
                    body_b.collider(),
                    &body_b.transform,
                );
                if !point.has_collided {
                    continue;
                }

                let contact = CollisionData {
                    body_a: handle_a,
                    body_b: handle_b,
                    point,
                };
                trace!(?handle_a, ?handle_b, depth = point.depth, normal = ?point.normal, "contact");
                self.collision_events.publish(&contact);
                self.contacts.push(contact);
            }
        }

        stats.contacts = self.contacts.len();
        self.handle_scratch = handles;
    }

    fn resolve_collisions(&mut self, stats: &mut StepStats) {
        for contact in self.contacts.drain(..) {
            let Some([body_a, body_b]) = self.bodies.get_disjoint_mut([contact.body_a, contact.body_b]) else {
                continue;
            };
            if resolve_contact(body_a, body_b, &contact.point) {
                stats.resolved += 1;
            }
        }
    }
}

impl Drop for PhysicsWorld {
    fn drop(&mut self) {
        info!(bodies = self.bodies.len(), "physics world destroyed");
    }
}

/// Single-pass resolution of one contact.
///
/// Pushes the bodies apart along the normal, weighted by inverse mass, then
/// applies equal and opposite linear impulses if they are still approaching.
/// Returns `false` when both bodies have infinite mass and nothing happened.
fn resolve_contact(body_a: &mut PhysicsBody, body_b: &mut PhysicsBody, point: &CollisionPoint) -> bool {
    let combined_inverse_mass = body_a.inverse_mass() + body_b.inverse_mass();
    if combined_inverse_mass <= 0.0 {
        return false;
    }

    // Positional correction: lighter bodies move further
    let correction = point.normal * point.depth;
    if !body_a.is_static() {
        let share = body_a.inverse_mass() / combined_inverse_mass;
        body_a.teleport(body_a.position() - correction * share);
    }
    if !body_b.is_static() {
        let share = body_b.inverse_mass() / combined_inverse_mass;
        body_b.teleport(body_b.position() + correction * share);
    }

    // Velocity of each contact point, including spin
    let offset_a = point.point_a - body_a.position();
    let offset_b = point.point_b - body_b.position();
    let velocity_a = body_a.linear_velocity + body_a.angular_velocity.cross(offset_a);
    let velocity_b = body_b.linear_velocity + body_b.angular_velocity.cross(offset_b);

    let normal_speed = (velocity_b - velocity_a).dot(point.normal);

    // Separating or resting contacts get no impulse
    if normal_speed >= 0.0 {
        return true;
    }

    let restitution = body_a.restitution * body_b.restitution;
    let magnitude = -(1.0 + restitution) * normal_speed / combined_inverse_mass;
    let impulse = point.normal * magnitude;

    body_a.apply_linear_impulse(-impulse);
    body_b.apply_linear_impulse(impulse);

    // TODO: apply angular impulses once box-box contacts produce real manifold points
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ball(position: Vec3) -> BodyDesc {
        BodyDesc::dynamic(position).with_collider(Collider::ball(0.5))
    }

    #[test]
    fn test_add_and_remove_body() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let handle = world.add_body(ball(Vec3::ZERO));
        assert!(world.contains(handle));
        assert_eq!(world.body_count(), 1);

        assert!(world.remove_body(handle).is_some());
        assert!(!world.contains(handle));
        assert!(world.body(handle).is_none());
        assert!(!world.apply_linear_impulse(handle, Vec3::X));
    }

    #[test]
    fn test_stale_handle_does_not_alias_new_body() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let old = world.add_body(ball(Vec3::ZERO));
        world.remove_body(old);
        let new = world.add_body(ball(Vec3::ONE));

        assert_ne!(old, new);
        assert!(world.body(old).is_none());
        assert_eq!(world.body(new).map(|b| b.position()), Some(Vec3::ONE));
    }

    #[test]
    fn test_resolve_skips_two_infinite_masses() {
        let mut a = PhysicsBody::new(&BodyDesc::fixed(Vec3::ZERO));
        let mut b = PhysicsBody::new(&BodyDesc::dynamic(Vec3::X).with_mass(0.0));
        let point = CollisionPoint::contact(Vec3::ZERO, Vec3::ZERO, Vec3::X, 0.5);

        assert!(!resolve_contact(&mut a, &mut b, &point));
        assert_eq!(b.position(), Vec3::X);
    }

    #[test]
    fn test_resolve_against_static_moves_only_dynamic() {
        let mut ground = PhysicsBody::new(&BodyDesc::fixed(Vec3::ZERO));
        let mut falling = PhysicsBody::new(&BodyDesc::dynamic(Vec3::new(0.0, 0.9, 0.0)));
        falling.linear_velocity = Vec3::new(0.0, -2.0, 0.0);
        ground.restitution = 1.0;
        falling.restitution = 0.5;

        let point = CollisionPoint::contact(Vec3::ZERO, Vec3::ZERO, Vec3::Y, 0.1);
        assert!(resolve_contact(&mut ground, &mut falling, &point));

        assert_eq!(ground.position(), Vec3::ZERO);
        assert_relative_eq!(falling.position().y, 1.0, epsilon = 1e-6);
        // v' = v - (1 + e) v = -e v with e = 0.5
        assert_relative_eq!(falling.linear_velocity.y, 1.0, epsilon = 1e-5);
        assert_eq!(ground.linear_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_step_reports_stats() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        world.add_body(ball(Vec3::ZERO));
        world.add_body(ball(Vec3::new(0.9, 0.0, 0.0)));
        world.add_body(BodyDesc::fixed(Vec3::new(10.0, 0.0, 0.0)));

        let stats = world.step(1.0 / 60.0);
        assert_eq!(stats.integrated, 2);
        assert_eq!(stats.pairs_tested, 3);
        assert_eq!(stats.contacts, 1);
        assert_eq!(stats.resolved, 1);
        assert!(!stats.skipped_integration);
    }

    #[test]
    fn test_body_desc_uses_config_defaults() {
        let config = PhysicsConfig {
            default_mass: 3.0,
            default_restitution: 0.2,
            ..PhysicsConfig::zero_gravity()
        };
        let world = PhysicsWorld::with_config(config);
        let desc = world.body_desc(Vec3::ONE, BodyType::Kinematic);
        assert_eq!(desc.mass, 3.0);
        assert_eq!(desc.restitution, 0.2);
        assert_eq!(desc.body_type, BodyType::Kinematic);
    }

    #[test]
    fn test_raycast_body_misses_without_collider() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let bare = world.add_body(BodyDesc::dynamic(Vec3::ZERO));
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(!world.raycast_body(&ray, bare).has_intersected);

        world.attach_collider(bare, Collider::cuboid(Vec3::ONE));
        assert!(world.raycast_body(&ray, bare).has_intersected);
    }
}
