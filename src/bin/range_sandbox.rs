//! Range Sandbox - Headless Shooting-Range Simulation
//!
//! Run with: `cargo run --bin range_sandbox [config.json] [seconds]`
//!
//! Builds a small range (ground, a table, a row of bottles and one thrown
//! ball), shoots every bottle with a hit-scan ray and reports which ones ended
//! up knocked off the table. Logging follows `RUST_LOG` (default `info`).
//!
//! Optional config file, any subset of:
//!
//! ```json
//! { "gravity": [0.0, -9.81, 0.0], "angular_damping": 0.95 }
//! ```

use std::cell::Cell;
use std::error::Error;
use std::rc::Rc;

use bottle_range_engine::physics::{
    BodyDesc, BodyHandle, Collider, PhysicsConfig, PhysicsWorld, Ray, Vec3,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Simulation rate (steps per second)
const STEP_RATE: f32 = 60.0;
/// Seconds simulated when no duration is given
const DEFAULT_SECONDS: f32 = 4.0;
/// Number of bottles on the table
const BOTTLE_COUNT: usize = 6;
/// Table top height (meters)
const TABLE_TOP: f32 = 1.0;
/// Impulse delivered by one shot (N·s)
const SHOT_IMPULSE: f32 = 1.5;

/// Bodies of the range the sandbox needs to look at again.
struct Range {
    bottles: Vec<BodyHandle>,
    ball: BodyHandle,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => PhysicsConfig::load(&path)?,
        None => PhysicsConfig::default(),
    };
    let seconds = match args.next() {
        Some(raw) => raw.parse::<f32>()?,
        None => DEFAULT_SECONDS,
    };

    let mut world = PhysicsWorld::with_config(config);
    let range = build_range(&mut world);

    let contact_count = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&contact_count);
    world.on_collision(move |contact| {
        counter.set(counter.get() + 1);
        debug!(
            body_a = ?contact.body_a,
            body_b = ?contact.body_b,
            depth = contact.point.depth,
            "collision"
        );
    });

    // Let everything settle before shooting
    run(&mut world, 0.5);

    let camera = Vec3::new(0.0, 1.6, 6.0);
    let mut shots_hit = 0;
    for &bottle in &range.bottles {
        if shoot(&mut world, camera, bottle) {
            shots_hit += 1;
        }
    }
    info!(shots_hit, shots = range.bottles.len(), "volley fired");

    // Toss the ball at the table as well
    world.apply_linear_impulse(range.ball, Vec3::new(0.0, 2.0, -6.0));

    run(&mut world, seconds);

    let knocked_down = range
        .bottles
        .iter()
        .filter(|&&bottle| {
            world
                .body(bottle)
                .is_some_and(|body| body.position().y < TABLE_TOP)
        })
        .count();

    info!(
        knocked_down,
        standing = range.bottles.len() - knocked_down,
        contacts = contact_count.get(),
        "range cleared"
    );
    if let Some(ball) = world.body(range.ball) {
        info!(position = ?ball.position(), "ball came to rest");
    }

    let instances = world.instances();
    debug!(count = instances.len(), bytes = bottle_range_engine::render::as_bytes(&instances).len(), "render instances");

    Ok(())
}

/// Populates the world with the ground, the table, the bottles and the ball.
fn build_range(world: &mut PhysicsWorld) -> Range {
    world.add_body(
        BodyDesc::fixed(Vec3::new(0.0, -0.5, 0.0))
            .with_restitution(0.3)
            .with_collider(Collider::cuboid(Vec3::new(20.0, 0.5, 20.0))),
    );
    world.add_body(
        BodyDesc::fixed(Vec3::new(0.0, TABLE_TOP - 0.05, 0.0))
            .with_restitution(0.2)
            .with_collider(Collider::cuboid(Vec3::new(2.0, 0.05, 0.4))),
    );

    let bottle_half = Vec3::new(0.06, 0.15, 0.06);
    let spacing = 3.0 / BOTTLE_COUNT as f32;
    let bottles = (0..BOTTLE_COUNT)
        .map(|i| {
            let x = -1.5 + spacing * (i as f32 + 0.5);
            world.add_body(
                BodyDesc::dynamic(Vec3::new(x, TABLE_TOP + bottle_half.y, 0.0))
                    .with_mass(0.4)
                    .with_restitution(0.4)
                    .with_user_data(i as u64 + 1)
                    .with_collider(Collider::cuboid(bottle_half)),
            )
        })
        .collect();

    let ball = world.add_body(
        BodyDesc::dynamic(Vec3::new(0.3, 0.3, 5.0))
            .with_mass(0.15)
            .with_restitution(0.8)
            .with_collider(Collider::ball(0.1)),
    );

    info!(bodies = world.body_count(), "range built");
    Range { bottles, ball }
}

/// Steps the world at the fixed rate for `seconds`.
fn run(world: &mut PhysicsWorld, seconds: f32) {
    let dt = 1.0 / STEP_RATE;
    let steps = (seconds * STEP_RATE).round() as usize;
    for _ in 0..steps {
        world.step(dt);
    }
}

/// Fires a ray from `camera` at `target` and pushes it on a hit.
fn shoot(world: &mut PhysicsWorld, camera: Vec3, target: BodyHandle) -> bool {
    let Some(aim) = world.body(target).map(|body| body.position()) else {
        warn!(?target, "shot at a body that no longer exists");
        return false;
    };

    let ray = Ray::from_points(camera, aim);
    let hit = world.raycast_body(&ray, target);
    if !hit.has_intersected {
        return false;
    }

    debug!(?target, distance = hit.distance, point = ?hit.point, "hit");
    world.apply_linear_impulse(target, ray.direction() * SHOT_IMPULSE);
    true
}
