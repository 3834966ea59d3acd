//! Staggered agent destruction after a composite dies.
//!
//! Each entry waits out its own delay, advanced by the tick delta like every
//! other timer in the arena. A unit is only released once none of its
//! entries remain.

use serde::{Deserialize, Serialize};

use skyram_core::enums::Role;
use skyram_core::world::UnitId;

use crate::pool::ControllerPool;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingDeath {
    pub unit: UnitId,
    pub agent: Role,
    /// Seconds left before the agent is destroyed.
    pub delay: f64,
}

#[derive(Debug, Clone, Default)]
pub struct DeathSequence {
    pending: Vec<PendingDeath>,
}

impl DeathSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `agent` of `unit` for destruction after `delay` seconds.
    /// An agent already queued keeps its original delay.
    pub fn schedule(&mut self, unit: UnitId, agent: Role, delay: f64) {
        if self.pending.iter().any(|p| p.unit == unit && p.agent == agent) {
            return;
        }
        self.pending.push(PendingDeath { unit, agent, delay });
    }

    /// Count every delay down by `dt` and return the entries that expired,
    /// in scheduling order.
    pub fn advance(&mut self, dt: f64) -> Vec<PendingDeath> {
        let mut due = Vec::new();
        self.pending.retain_mut(|entry| {
            entry.delay -= dt;
            if entry.delay <= 0.0 {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due
    }

    pub fn has_pending(&self, unit: UnitId) -> bool {
        self.pending.iter().any(|p| p.unit == unit)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Destroy every agent whose delay ran out this tick.
pub fn run(deaths: &mut DeathSequence, pool: &mut ControllerPool, dt: f64) {
    for entry in deaths.advance(dt) {
        if let Some(unit) = pool.get_mut(entry.unit) {
            unit.agent_health[entry.agent.index()].forcibly_die_ignoring_invulnerability();
            tracing::debug!(unit = entry.unit.0, agent = ?entry.agent, "staggered agent death");
        }
    }
}
