//! Pilot kinematics: constant-velocity integration clamped to the ground.

use glam::DVec3;
use hecs::World;

use skyram_core::health::Health;
use skyram_core::world::TargetState;

use crate::arena_setup::pilot_state;
use crate::components::Pilot;

/// Move a living pilot by `velocity * dt`.
pub fn run(world: &mut World, dt: f64) {
    for (_entity, (_pilot, state, health)) in
        world.query_mut::<(&Pilot, &mut TargetState, &Health)>()
    {
        if health.is_dead() {
            continue;
        }
        let next = state.pose.position + state.velocity * dt;
        *state = pilot_state(DVec3::new(next.x, next.y.max(0.0), next.z), state.velocity);
    }
}

/// The living pilot's state, if there is one.
pub fn current(world: &World) -> Option<TargetState> {
    world
        .query::<(&Pilot, &TargetState, &Health)>()
        .iter()
        .find(|(_, (_, _, health))| !health.is_dead())
        .map(|(_, (_, state, _))| *state)
}
