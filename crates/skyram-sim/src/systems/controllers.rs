//! Controller passes: the fixed physics pass, then the late pivot-sync pass.

use hecs::World;

use skyram_core::world::TargetState;

use crate::events::ArenaEvent;
use crate::pool::ControllerPool;
use crate::systems::raycast::ArenaQuery;

/// Steering, choreography and velocity commit for every active unit.
pub fn run_fixed(world: &World, pool: &mut ControllerPool, target: Option<&TargetState>, dt: f64) {
    let query = ArenaQuery::new(world);
    for unit in pool.active_mut() {
        let _span = tracing::debug_span!("unit", id = unit.id().0).entered();
        unit.controller.fixed_update(dt, target, &query);
    }
}

/// Pivot frames snap to their controllers. Must follow every position change
/// of the tick.
pub fn run_late(pool: &mut ControllerPool) {
    for unit in pool.active_mut() {
        unit.controller.late_update();
    }
}

/// Move controller events into the arena event stream.
pub fn drain_events(pool: &mut ControllerPool, events: &mut Vec<ArenaEvent>) {
    for unit in pool.active_mut() {
        let id = unit.id();
        events.extend(
            unit.controller
                .drain_events()
                .into_iter()
                .map(|event| ArenaEvent::Controller { unit: id, event }),
        );
    }
}
