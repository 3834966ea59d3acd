//! Fixed-capacity controller pool.
//!
//! Each slot keeps its controller, the composite's invulnerable shell, one
//! health component per agent and the death aggregator. Released slots are
//! reinitialized in place on the next `acquire`, so a slot's `UnitId` is
//! stable across reuse.

use skyram_ai::death::DeathAggregator;
use skyram_ai::{ControllerConfig, RamController, Spawn};
use skyram_core::constants::{AGENT_COUNT, AGENT_HIT_POINTS};
use skyram_core::enums::Role;
use skyram_core::health::{Health, HealthListener, HealthNotification};
use skyram_core::preset::PresetSet;
use skyram_core::world::{UnitId, UnitPool};

use crate::error::SimError;
use crate::systems::hazard::BarrierHazard;

/// One pooled composite.
pub struct ArenaUnit {
    id: UnitId,
    active: bool,
    pub controller: RamController,
    /// The coordinating shell. Only the aggregator can kill it.
    pub shell: Health,
    /// Agent health, indexed by spawn identity.
    pub agent_health: [Health; AGENT_COUNT],
    pub aggregator: DeathAggregator,
}

impl ArenaUnit {
    fn new(id: UnitId, presets: PresetSet, spawn: Spawn) -> Self {
        let controller = RamController::new(
            ControllerConfig { id, presets },
            Box::new(BarrierHazard::new(id)),
            spawn,
        );
        let mut shell = Health::with_god_mode(AGENT_HIT_POINTS);
        shell.subscribe(HealthListener::Arena { unit: id });
        let agent_health = Role::ALL.map(|role| {
            let mut health = Health::new(AGENT_HIT_POINTS);
            health.subscribe(HealthListener::PartnerLoss { unit: id, role });
            health.subscribe(HealthListener::DeathAggregator { unit: id, role });
            health
        });

        let mut unit = Self {
            id,
            active: true,
            controller,
            shell,
            agent_health,
            aggregator: DeathAggregator::new(),
        };
        unit.count_missing_agents();
        unit
    }

    fn reactivate(&mut self, spawn: Spawn) {
        self.controller.reinitialize(spawn);
        self.shell.reset();
        for health in &mut self.agent_health {
            health.reset();
        }
        self.aggregator.reset();
        self.active = true;
        self.count_missing_agents();
    }

    fn deactivate(&mut self) {
        self.controller.force_stop_attack();
        self.active = false;
    }

    /// A solo spawn has no agent B; the aggregator counts it as already dead
    /// so the composite still dies with its last agent.
    fn count_missing_agents(&mut self) {
        for role in Role::ALL {
            if self.controller.agent_by_origin(role).is_none() {
                self.aggregator.record_death(role);
            }
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The shell has died and the unit is waiting for its agents and release.
    pub fn is_destroyed(&self) -> bool {
        self.shell.is_dead()
    }

    pub fn agent_health(&self, role: Role) -> &Health {
        &self.agent_health[role.index()]
    }

    /// Take every queued health notification, shell first.
    pub fn drain_health_notifications(&mut self) -> Vec<HealthNotification> {
        let mut notifications = self.shell.drain_notifications();
        for health in &mut self.agent_health {
            notifications.extend(health.drain_notifications());
        }
        notifications
    }
}

/// Pool of reusable controllers with a hard capacity.
pub struct ControllerPool {
    presets: PresetSet,
    capacity: usize,
    units: Vec<ArenaUnit>,
}

impl ControllerPool {
    pub fn new(capacity: usize, presets: PresetSet) -> Self {
        Self {
            presets,
            capacity,
            units: Vec::with_capacity(capacity),
        }
    }

    /// Activate a unit, reusing a released slot when there is one.
    pub fn acquire(&mut self, spawn: Spawn) -> Result<UnitId, SimError> {
        if let Some(unit) = self.units.iter_mut().find(|u| !u.active) {
            unit.reactivate(spawn);
            tracing::info!(unit = unit.id.0, "unit reacquired from pool");
            return Ok(unit.id);
        }
        if self.units.len() >= self.capacity {
            return Err(SimError::PoolExhausted {
                capacity: self.capacity,
            });
        }
        let id = UnitId(self.units.len() as u32);
        self.units
            .push(ArenaUnit::new(id, self.presets.clone(), spawn));
        tracing::info!(unit = id.0, "unit created");
        Ok(id)
    }

    /// Deactivate an active unit.
    pub fn try_release(&mut self, unit: UnitId) -> Result<(), SimError> {
        let slot = self.get_mut(unit).ok_or(SimError::UnknownUnit(unit))?;
        slot.deactivate();
        tracing::info!(unit = unit.0, "unit released to pool");
        Ok(())
    }

    /// An active unit by id.
    pub fn get(&self, unit: UnitId) -> Option<&ArenaUnit> {
        self.units
            .get(unit.0 as usize)
            .filter(|u| u.active)
    }

    pub fn get_mut(&mut self, unit: UnitId) -> Option<&mut ArenaUnit> {
        self.units
            .get_mut(unit.0 as usize)
            .filter(|u| u.active)
    }

    pub fn active(&self) -> impl Iterator<Item = &ArenaUnit> {
        self.units.iter().filter(|u| u.active)
    }

    pub fn active_mut(&mut self) -> impl Iterator<Item = &mut ArenaUnit> {
        self.units.iter_mut().filter(|u| u.active)
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl UnitPool for ControllerPool {
    fn release(&mut self, unit: UnitId) {
        if let Err(err) = self.try_release(unit) {
            tracing::warn!(%err, "release ignored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyram_core::types::Pose;

    fn spawn() -> Spawn {
        Spawn {
            pose: Pose::default(),
            agent_count: 2,
            seed: 1,
            spin: None,
        }
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut pool = ControllerPool::new(1, PresetSet::default());
        assert_eq!(pool.acquire(spawn()), Ok(UnitId(0)));
        assert_eq!(
            pool.acquire(spawn()),
            Err(SimError::PoolExhausted { capacity: 1 })
        );
    }

    #[test]
    fn test_released_slot_is_reused() {
        let mut pool = ControllerPool::new(2, PresetSet::default());
        let first = pool.acquire(spawn()).unwrap();
        pool.acquire(spawn()).unwrap();
        pool.release(first);
        assert_eq!(pool.active_count(), 1);
        assert!(pool.get(first).is_none());
        assert_eq!(pool.acquire(spawn()), Ok(first));
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_release_of_unknown_unit_is_an_error() {
        let mut pool = ControllerPool::new(2, PresetSet::default());
        assert_eq!(
            pool.try_release(UnitId(5)),
            Err(SimError::UnknownUnit(UnitId(5)))
        );
    }

    #[test]
    fn test_solo_spawn_counts_missing_agent() {
        let mut pool = ControllerPool::new(1, PresetSet::default());
        let id = pool
            .acquire(Spawn {
                agent_count: 1,
                ..spawn()
            })
            .unwrap();
        assert_eq!(pool.get(id).unwrap().aggregator.dead_count(), 1);
    }
}
