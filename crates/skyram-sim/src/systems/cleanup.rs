//! Returns destroyed composites to the pool once their death sequence is over.

use skyram_core::world::{UnitId, UnitPool};

use crate::events::ArenaEvent;
use crate::pool::ControllerPool;
use crate::systems::death_sequence::DeathSequence;

pub fn run(pool: &mut ControllerPool, deaths: &DeathSequence, events: &mut Vec<ArenaEvent>) {
    let finished: Vec<UnitId> = pool
        .active()
        .filter(|unit| unit.is_destroyed() && !deaths.has_pending(unit.id()))
        .map(|unit| unit.id())
        .collect();
    for unit in finished {
        pool.release(unit);
        events.push(ArenaEvent::UnitReleased { unit });
    }
}
