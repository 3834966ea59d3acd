//! Composite death aggregation.
//!
//! The coordinating shell is invulnerable on its own, so it only dies when
//! both sub-units have reported death. Deaths are counted per identity, so
//! the force-kill fires exactly once whatever order (or tick) the reports
//! arrive in.

use skyram_core::constants::AGENT_COUNT;
use skyram_core::enums::Role;
use skyram_core::health::Health;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeathAggregator {
    dead: [bool; AGENT_COUNT],
    fired: bool,
}

impl DeathAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a death report without evaluating. Duplicate reports count once.
    pub fn record_death(&mut self, which: Role) {
        self.dead[which.index()] = true;
    }

    /// A revived sub-unit no longer counts, unless the composite already died.
    pub fn record_revival(&mut self, which: Role) {
        if !self.fired {
            self.dead[which.index()] = false;
        }
    }

    pub fn dead_count(&self) -> usize {
        self.dead.iter().filter(|d| **d).count()
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Kill the composite, ignoring its protection, once every sub-unit is
    /// dead. Returns true only on the call that fired.
    pub fn evaluate(&mut self, composite: &mut Health) -> bool {
        if self.fired || self.dead_count() < AGENT_COUNT {
            return false;
        }
        self.fired = true;
        composite.forcibly_die_ignoring_invulnerability();
        tracing::info!("both sub-units dead, composite force-killed");
        true
    }

    /// Record and evaluate in one step.
    pub fn on_sub_unit_died(&mut self, which: Role, composite: &mut Health) -> bool {
        self.record_death(which);
        self.evaluate(composite)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
