//! Simulation engine for the arena.
//!
//! `SimulationEngine` owns the hecs world, the controller pool and the
//! death-sequence queue, applies queued commands, runs all systems and
//! produces `ArenaSnapshot`s. Completely headless and deterministic: the
//! same seed and the same inputs give the same snapshots.

use std::collections::VecDeque;

use glam::DVec3;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use skyram_ai::Spawn;
use skyram_core::constants::DEFAULT_POOL_CAPACITY;
use skyram_core::enums::ObstacleKind;
use skyram_core::health::Health;
use skyram_core::preset::PresetSet;
use skyram_core::types::SimTime;
use skyram_core::world::{ColliderId, TargetState, UnitId};

use crate::arena_setup;
use crate::components::Pilot;
use crate::error::SimError;
use crate::events::{ArenaCommand, ArenaEvent};
use crate::pool::{ArenaUnit, ControllerPool};
use crate::systems;
use crate::systems::death_sequence::DeathSequence;
use crate::systems::snapshot::ArenaSnapshot;

/// Configuration for starting a new arena.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Maximum number of simultaneously active units.
    pub pool_capacity: usize,
    pub presets: PresetSet,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            presets: PresetSet::default(),
        }
    }
}

/// The arena engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    rng: ChaCha8Rng,
    pool: ControllerPool,
    deaths: DeathSequence,
    next_collider_id: u64,
    command_queue: VecDeque<ArenaCommand>,
    despawn_buffer: Vec<Entity>,
    events: Vec<ArenaEvent>,
}

impl SimulationEngine {
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            pool: ControllerPool::new(config.pool_capacity, config.presets),
            deaths: DeathSequence::new(),
            next_collider_id: 0,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Activate a unit from the pool.
    pub fn spawn_unit(&mut self, spawn: Spawn) -> Result<UnitId, SimError> {
        let unit = self.pool.acquire(spawn)?;
        self.events.push(ArenaEvent::UnitSpawned { unit });
        Ok(unit)
    }

    /// Place (or replace) the pilot.
    pub fn place_pilot(&mut self, position: DVec3, velocity: DVec3) {
        arena_setup::spawn_pilot(&mut self.world, position, velocity);
    }

    /// Despawn the pilot. Controllers idle until a new one is placed.
    pub fn remove_pilot(&mut self) {
        let pilots: Vec<Entity> = self
            .world
            .query::<&Pilot>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();
        for entity in pilots {
            let _ = self.world.despawn(entity);
        }
    }

    pub fn spawn_obstacle(&mut self, kind: ObstacleKind, center: DVec3, radius: f64) -> ColliderId {
        self.next_collider_id += 1;
        let id = ColliderId(self.next_collider_id);
        arena_setup::spawn_obstacle(&mut self.world, id, kind, center, radius);
        id
    }

    /// Scatter `count` random obstacles using the engine's RNG.
    pub fn scatter_obstacles(&mut self, count: usize) {
        arena_setup::scatter_obstacles(
            &mut self.world,
            &mut self.rng,
            &mut self.next_collider_id,
            count,
        );
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: ArenaCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = ArenaCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the arena by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> ArenaSnapshot {
        self.process_commands();
        self.run_systems();
        self.time.advance();

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.pool, &self.deaths, &self.time, events)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn pool(&self) -> &ControllerPool {
        &self.pool
    }

    pub fn unit(&self, unit: UnitId) -> Option<&ArenaUnit> {
        self.pool.get(unit)
    }

    pub fn pilot(&self) -> Option<TargetState> {
        systems::pilot::current(&self.world)
    }

    pub fn pending_deaths(&self) -> &DeathSequence {
        &self.deaths
    }

    fn unit_mut(&mut self, unit: UnitId) -> Result<&mut ArenaUnit, SimError> {
        self.pool.get_mut(unit).ok_or(SimError::UnknownUnit(unit))
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(err) = self.handle_command(command) {
                tracing::warn!(%err, ?command, "command ignored");
            }
        }
    }

    fn handle_command(&mut self, command: ArenaCommand) -> Result<(), SimError> {
        match command {
            ArenaCommand::DamageAgent { unit, role, amount } => {
                self.unit_mut(unit)?.agent_health[role.index()].take_damage(amount);
            }
            ArenaCommand::KillAgent { unit, role } => {
                self.unit_mut(unit)?.agent_health[role.index()]
                    .forcibly_die_ignoring_invulnerability();
            }
            ArenaCommand::DestroyUnit { unit } => {
                self.unit_mut(unit)?
                    .shell
                    .forcibly_die_ignoring_invulnerability();
            }
            ArenaCommand::ForceStop { unit } => {
                self.unit_mut(unit)?.controller.force_stop_attack();
            }
            ArenaCommand::SetAttacksAllowed { allowed } => {
                for unit in self.pool.active_mut() {
                    if !unit.is_destroyed() {
                        unit.controller.set_attacks_allowed(allowed);
                    }
                }
            }
            ArenaCommand::MovePilot { position, velocity } => {
                let state = arena_setup::pilot_state(position, velocity);
                let mut moved = false;
                for (_entity, (_pilot, target, _health)) in self
                    .world
                    .query_mut::<(&Pilot, &mut TargetState, &Health)>()
                {
                    *target = state;
                    moved = true;
                }
                if !moved {
                    self.place_pilot(position, velocity);
                }
            }
        }
        Ok(())
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let dt = self.time.dt();

        // 1. Pilot movement
        systems::pilot::run(&mut self.world, dt);
        let target = systems::pilot::current(&self.world);
        // 2. Proximity triggers (enter/exit before avoidance)
        systems::proximity::run(&self.world, &mut self.pool);
        // 3. Controller physics pass
        systems::controllers::run_fixed(&self.world, &mut self.pool, target.as_ref(), dt);
        // 4. Barrier contacts (collision kills, pilot damage)
        systems::hazard::run(
            &mut self.world,
            &mut self.pool,
            &mut self.despawn_buffer,
            &mut self.events,
        );
        // 5. Pivot sync pass, after every position change
        systems::controllers::run_late(&mut self.pool);
        // 6. Staggered agent deaths
        systems::death_sequence::run(&mut self.deaths, &mut self.pool, dt);
        // 7. Health notification routing
        systems::health::run(&mut self.pool, &mut self.deaths, &mut self.rng, &mut self.events);
        // 8. Controller events
        systems::controllers::drain_events(&mut self.pool, &mut self.events);
        // 9. Release finished composites
        systems::cleanup::run(&mut self.pool, &self.deaths, &mut self.events);
    }
}
