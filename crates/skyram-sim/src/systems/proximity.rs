//! Proximity triggers: each agent senses obstacles within its preset
//! detection radius. Runs before the controllers so avoidance and the
//! premature-stop check see this tick's contacts.

use glam::DVec3;
use hecs::World;

use skyram_core::enums::Role;
use skyram_core::world::{ColliderId, ColliderInfo};

use crate::components::Obstacle;
use crate::pool::ControllerPool;

fn overlaps(position: DVec3, radius: f64, collider: &ColliderInfo) -> bool {
    position.distance(collider.center) <= collider.radius + radius
}

/// Deliver exit notifications for colliders that left (or were destroyed),
/// then enter notifications for colliders now in range.
pub fn run(world: &World, pool: &mut ControllerPool) {
    let colliders: Vec<ColliderInfo> = world
        .query::<&Obstacle>()
        .iter()
        .map(|(_, obstacle)| obstacle.info)
        .collect();

    for unit in pool.active_mut() {
        let radius = unit.controller.preset().detection_radius;
        for role in Role::ALL {
            let Some(agent) = unit.controller.agent_by_origin(role) else {
                continue;
            };
            let position = agent.pose.position;
            let in_range: Vec<ColliderInfo> = colliders
                .iter()
                .filter(|c| overlaps(position, radius, c))
                .copied()
                .collect();
            let exited: Vec<ColliderId> = agent
                .obstacles
                .ids()
                .filter(|id| !in_range.iter().any(|c| c.id == *id))
                .collect();

            for id in exited {
                unit.controller.obstacle_exited(role, id);
            }
            for collider in &in_range {
                if unit.controller.obstacle_entered(role, collider) {
                    tracing::trace!(unit = unit.id().0, ?role, collider = collider.id.0, "obstacle entered");
                }
            }
        }
    }
}
