//! The barrier stretched between a duo's two agents.
//!
//! While a controller holds its hazard active, destructible obstacles
//! touching the barrier segment are destroyed and counted as collision
//! kills, and the pilot takes damage on contact.

use glam::DVec3;
use hecs::{Entity, World};

use skyram_core::constants::{BARRIER_DAMAGE_PER_TICK, BARRIER_THICKNESS, PILOT_RADIUS};
use skyram_core::enums::{ObstacleKind, Role};
use skyram_core::health::Health;
use skyram_core::world::{Hazard, TargetState, UnitId};

use crate::components::{Obstacle, Pilot};
use crate::events::ArenaEvent;
use crate::pool::ControllerPool;

/// Hazard handed to each pooled controller. Contact is resolved by [`run`]
/// from the controller's own hazard state.
#[derive(Debug, Clone, Copy)]
pub struct BarrierHazard {
    unit: UnitId,
}

impl BarrierHazard {
    pub fn new(unit: UnitId) -> Self {
        Self { unit }
    }
}

impl Hazard for BarrierHazard {
    fn set_active(&mut self, active: bool) {
        tracing::trace!(unit = self.unit.0, active, "barrier toggled");
    }
}

/// Shortest distance from `point` to the segment `a..b`.
pub fn distance_to_segment(point: DVec3, a: DVec3, b: DVec3) -> f64 {
    let ab = b - a;
    let length_sq = ab.length_squared();
    if length_sq <= f64::EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Resolve barrier contacts for every unit with an active hazard.
pub fn run(
    world: &mut World,
    pool: &mut ControllerPool,
    despawn_buffer: &mut Vec<Entity>,
    events: &mut Vec<ArenaEvent>,
) {
    despawn_buffer.clear();

    for unit in pool.active_mut() {
        if !unit.controller.hazard_active() {
            continue;
        }
        let (Some(a), Some(b)) = (
            unit.controller.agent(Role::A),
            unit.controller.agent(Role::B),
        ) else {
            continue;
        };
        let (a, b) = (a.pose.position, b.pose.position);
        let id = unit.id();

        for (entity, obstacle) in world.query::<&Obstacle>().iter() {
            let info = obstacle.info;
            if info.kind != ObstacleKind::Destructible || despawn_buffer.contains(&entity) {
                continue;
            }
            if distance_to_segment(info.center, a, b) <= info.radius + BARRIER_THICKNESS {
                despawn_buffer.push(entity);
                unit.controller.register_collision_kill();
                events.push(ArenaEvent::ObstacleDestroyed {
                    unit: id,
                    collider: info.id,
                });
            }
        }

        for (_entity, (_pilot, state, health)) in
            world.query_mut::<(&Pilot, &TargetState, &mut Health)>()
        {
            if health.is_dead() {
                continue;
            }
            if distance_to_segment(state.position(), a, b) <= PILOT_RADIUS + BARRIER_THICKNESS {
                health.take_damage(BARRIER_DAMAGE_PER_TICK);
                events.push(ArenaEvent::PilotHit {
                    unit: id,
                    damage: BARRIER_DAMAGE_PER_TICK,
                });
            }
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
