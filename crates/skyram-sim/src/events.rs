//! Commands into the arena and events out of it.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use skyram_core::enums::Role;
use skyram_core::events::ControllerEvent;
use skyram_core::world::{ColliderId, UnitId};

/// External input, applied at the next tick boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArenaCommand {
    /// Deal damage to one agent of a unit, by spawn identity.
    DamageAgent { unit: UnitId, role: Role, amount: f64 },
    /// Kill one agent outright, ignoring its protection.
    KillAgent { unit: UnitId, role: Role },
    /// Kill the composite; its remaining agents follow on a stagger.
    DestroyUnit { unit: UnitId },
    /// Cancel the unit's attack in flight.
    ForceStop { unit: UnitId },
    /// Arena-wide veto on starting attacks.
    SetAttacksAllowed { allowed: bool },
    /// Teleport the pilot and set its velocity.
    MovePilot { position: DVec3, velocity: DVec3 },
}

/// Everything observable that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArenaEvent {
    UnitSpawned { unit: UnitId },
    Controller { unit: UnitId, event: ControllerEvent },
    ObstacleDestroyed { unit: UnitId, collider: ColliderId },
    PilotHit { unit: UnitId, damage: f64 },
    AgentDied { unit: UnitId, role: Role },
    CompositeDestroyed { unit: UnitId },
    UnitReleased { unit: UnitId },
}
