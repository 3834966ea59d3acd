//! Line-of-sight queries against the arena world.
//!
//! Obstacles and the pilot are spheres; terrain is the `y = 0` plane.

use glam::DVec3;
use hecs::World;

use skyram_core::constants::{LAYER_PILOT, LAYER_TERRAIN, PILOT_RADIUS};
use skyram_core::health::Health;
use skyram_core::world::{ColliderId, LayerMask, RayHit, TargetState, WorldQuery};

use crate::components::{Obstacle, Pilot};

/// Collider id reported for the ground plane.
pub const TERRAIN_COLLIDER: ColliderId = ColliderId(0);

/// Collider id reported for the pilot.
pub const PILOT_COLLIDER: ColliderId = ColliderId(u64::MAX);

/// Read-only raycast view of the world for one tick.
pub struct ArenaQuery<'w> {
    world: &'w World,
}

impl<'w> ArenaQuery<'w> {
    pub fn new(world: &'w World) -> Self {
        Self { world }
    }
}

/// Distance along a unit ray to the first intersection with a sphere.
/// A ray starting inside the sphere hits at distance zero.
pub fn ray_sphere(origin: DVec3, direction: DVec3, center: DVec3, radius: f64) -> Option<f64> {
    let to_center = center - origin;
    let c = to_center.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let b = to_center.dot(direction);
    if b <= 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some(b - discriminant.sqrt())
}

/// Distance along a unit ray to the ground plane.
fn ray_ground(origin: DVec3, direction: DVec3) -> Option<f64> {
    if origin.y <= 0.0 {
        return Some(0.0);
    }
    if direction.y >= 0.0 {
        return None;
    }
    Some(-origin.y / direction.y)
}

impl WorldQuery for ArenaQuery<'_> {
    fn raycast(
        &self,
        origin: DVec3,
        direction: DVec3,
        max_distance: f64,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        let mut consider = |collider: ColliderId, distance: Option<f64>, belongs_to_target: bool| {
            let Some(distance) = distance.filter(|d| *d <= max_distance) else {
                return;
            };
            if best.map_or(true, |hit| distance < hit.distance) {
                best = Some(RayHit {
                    collider,
                    distance,
                    belongs_to_target,
                });
            }
        };

        if mask.contains(LAYER_TERRAIN) {
            consider(TERRAIN_COLLIDER, ray_ground(origin, direction), false);
        }
        for (_, obstacle) in self.world.query::<&Obstacle>().iter() {
            let info = obstacle.info;
            if info.is_trigger || !mask.contains(info.layer) {
                continue;
            }
            consider(info.id, ray_sphere(origin, direction, info.center, info.radius), false);
        }
        if mask.contains(LAYER_PILOT) {
            for (_, (_, state, health)) in
                self.world.query::<(&Pilot, &TargetState, &Health)>().iter()
            {
                if health.is_dead() {
                    continue;
                }
                let hit = ray_sphere(origin, direction, state.position(), PILOT_RADIUS);
                consider(PILOT_COLLIDER, hit, true);
            }
        }
        best
    }
}
