//! Snapshot system: reads the world and the pool into an `ArenaSnapshot`.
//!
//! Read-only; never modifies the world or any controller.

use glam::DVec3;
use hecs::World;
use serde::{Deserialize, Serialize};

use skyram_core::enums::{Mode, Phase, Role};
use skyram_core::health::Health;
use skyram_core::types::{Pose, SimTime};
use skyram_core::world::{TargetState, UnitId};

use crate::components::{Obstacle, Pilot};
use crate::events::ArenaEvent;
use crate::pool::{ArenaUnit, ControllerPool};
use crate::systems::death_sequence::DeathSequence;

/// Complete arena state after one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub time: SimTime,
    pub pilot: Option<PilotView>,
    pub units: Vec<UnitView>,
    pub obstacle_count: usize,
    pub pending_deaths: usize,
    /// Events raised during this tick, in order.
    pub events: Vec<ArenaEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PilotView {
    pub pose: Pose,
    pub velocity: DVec3,
    pub grounded: bool,
    pub hit_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    pub id: UnitId,
    pub mode: Mode,
    pub phase: Phase,
    pub is_attacking: bool,
    pub hazard_active: bool,
    pub destroyed: bool,
    pub pivot_point: Option<DVec3>,
    pub agents: Vec<AgentView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    /// Spawn identity; survives promotion into slot A.
    pub origin: Role,
    pub position: DVec3,
    pub velocity: DVec3,
    pub hit_points: f64,
}

pub fn build_snapshot(
    world: &World,
    pool: &ControllerPool,
    deaths: &DeathSequence,
    time: &SimTime,
    events: Vec<ArenaEvent>,
) -> ArenaSnapshot {
    ArenaSnapshot {
        time: *time,
        pilot: build_pilot(world),
        units: pool.active().map(build_unit).collect(),
        obstacle_count: world.query::<&Obstacle>().iter().count(),
        pending_deaths: deaths.len(),
        events,
    }
}

fn build_pilot(world: &World) -> Option<PilotView> {
    world
        .query::<(&Pilot, &TargetState, &Health)>()
        .iter()
        .next()
        .map(|(_, (_, state, health))| PilotView {
            pose: state.pose,
            velocity: state.velocity,
            grounded: state.grounded,
            hit_points: health.hit_points(),
        })
}

fn build_unit(unit: &ArenaUnit) -> UnitView {
    let controller = &unit.controller;
    // Slot order: the survivor of a duo always reports first.
    let agents = Role::ALL
        .into_iter()
        .filter_map(|slot| controller.agent(slot))
        .map(|agent| AgentView {
            origin: agent.origin,
            position: agent.pose.position,
            velocity: agent.velocity,
            hit_points: unit.agent_health(agent.origin).hit_points(),
        })
        .collect();

    UnitView {
        id: unit.id(),
        mode: controller.mode(),
        phase: controller.phase(),
        is_attacking: controller.is_attacking(),
        hazard_active: controller.hazard_active(),
        destroyed: unit.is_destroyed(),
        pivot_point: controller.pivot_point(),
        agents,
    }
}
