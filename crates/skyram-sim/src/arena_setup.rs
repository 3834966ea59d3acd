//! Spawn factories for the arena world.

use glam::DVec3;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skyram_core::constants::{LAYER_OBSTACLE, OBSTACLE_FIELD_RADIUS, PILOT_HIT_POINTS};
use skyram_core::enums::ObstacleKind;
use skyram_core::health::Health;
use skyram_core::types::{look_rotation, ViewBasis};
use skyram_core::world::{ColliderId, ColliderInfo, TargetState};

use crate::components::{Obstacle, Pilot};

/// Build the pilot's state facing along its velocity (or +Z when stationary).
pub fn pilot_state(position: DVec3, velocity: DVec3) -> TargetState {
    let mut state = TargetState::stationary(position);
    state.velocity = velocity;
    if let Some(rotation) = look_rotation(velocity, DVec3::Y) {
        state.pose.rotation = rotation;
        state.view = ViewBasis::from_pose(&state.pose);
    }
    state.grounded = position.y <= 0.0;
    state
}

/// Spawn the pilot. Any previous pilot is despawned first.
pub fn spawn_pilot(world: &mut World, position: DVec3, velocity: DVec3) -> Entity {
    let existing: Vec<Entity> = world
        .query::<&Pilot>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();
    for entity in existing {
        let _ = world.despawn(entity);
    }
    world.spawn((
        Pilot,
        pilot_state(position, velocity),
        Health::new(PILOT_HIT_POINTS),
    ))
}

/// Spawn a static obstacle on the obstacle layer.
pub fn spawn_obstacle(
    world: &mut World,
    id: ColliderId,
    kind: ObstacleKind,
    center: DVec3,
    radius: f64,
) -> Entity {
    world.spawn((Obstacle {
        info: ColliderInfo {
            id,
            layer: LAYER_OBSTACLE,
            is_trigger: false,
            kind,
            center,
            radius,
        },
    },))
}

/// Scatter `count` obstacles across the field. Roughly one in four is
/// indestructible.
pub fn scatter_obstacles(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    next_collider_id: &mut u64,
    count: usize,
) {
    for _ in 0..count {
        let center = DVec3::new(
            rng.gen_range(-OBSTACLE_FIELD_RADIUS..OBSTACLE_FIELD_RADIUS),
            rng.gen_range(0.0..40.0),
            rng.gen_range(-OBSTACLE_FIELD_RADIUS..OBSTACLE_FIELD_RADIUS),
        );
        let radius = rng.gen_range(1.0..5.0);
        let kind = if rng.gen_bool(0.25) {
            ObstacleKind::Indestructible
        } else {
            ObstacleKind::Destructible
        };
        *next_collider_id += 1;
        spawn_obstacle(world, ColliderId(*next_collider_id), kind, center, radius);
    }
}
