//! Hit-point component with fire-once death/revival notifications.
//!
//! Observers subscribe with a [`HealthListener`] tag. When the component
//! dies or revives it queues one [`HealthNotification`] per listener; the
//! owner drains and routes them. `Died` fires once and cannot fire again
//! until a `Revived` or a [`Health::reset`].

use serde::{Deserialize, Serialize};

use crate::enums::Role;
use crate::world::UnitId;

/// Lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthEvent {
    Died,
    Revived,
}

/// Who wants to hear about a health component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthListener {
    /// The composite's death aggregator, counting sub-unit deaths.
    DeathAggregator { unit: UnitId, role: Role },
    /// The composite controller's partner-loss handler.
    PartnerLoss { unit: UnitId, role: Role },
    /// The arena, for the composite's own health.
    Arena { unit: UnitId },
}

/// A queued notification for one listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthNotification {
    pub listener: HealthListener,
    pub event: HealthEvent,
}

/// Hit points plus invulnerability flags.
#[derive(Debug, Clone)]
pub struct Health {
    hit_points: f64,
    max_hit_points: f64,
    /// Temporary protection; ignored by the forcible kills.
    pub invulnerable: bool,
    /// Permanent protection; ignored only by
    /// [`Health::forcibly_die_ignoring_invulnerability`].
    pub god_mode: bool,
    dead: bool,
    listeners: Vec<HealthListener>,
    outbox: Vec<HealthNotification>,
}

impl Health {
    pub fn new(max_hit_points: f64) -> Self {
        Self {
            hit_points: max_hit_points,
            max_hit_points,
            invulnerable: false,
            god_mode: false,
            dead: false,
            listeners: Vec::new(),
            outbox: Vec::new(),
        }
    }

    /// A component that soft kills can never touch.
    pub fn with_god_mode(max_hit_points: f64) -> Self {
        Self {
            god_mode: true,
            ..Self::new(max_hit_points)
        }
    }

    pub fn hit_points(&self) -> f64 {
        self.hit_points
    }

    pub fn max_hit_points(&self) -> f64 {
        self.max_hit_points
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Register a listener. Subscribing twice is a no-op.
    pub fn subscribe(&mut self, listener: HealthListener) {
        if !self.listeners.contains(&listener) {
            self.listeners.push(listener);
        }
    }

    pub fn unsubscribe(&mut self, listener: HealthListener) {
        self.listeners.retain(|l| *l != listener);
    }

    /// Apply damage. Returns true if this call killed the component.
    pub fn take_damage(&mut self, amount: f64) -> bool {
        if self.dead || self.invulnerable || self.god_mode || amount <= 0.0 {
            return false;
        }
        self.hit_points = (self.hit_points - amount).max(0.0);
        if self.hit_points <= 0.0 {
            return self.die();
        }
        false
    }

    /// Restore hit points. Healing a dead component revives it.
    pub fn heal(&mut self, amount: f64) {
        if amount <= 0.0 {
            return;
        }
        self.hit_points = (self.hit_points + amount).min(self.max_hit_points);
        if self.dead {
            self.dead = false;
            self.notify(HealthEvent::Revived);
        }
    }

    /// Soft kill: honors both `invulnerable` and `god_mode`.
    pub fn instantly_die(&mut self) -> bool {
        if self.invulnerable || self.god_mode {
            return false;
        }
        self.die()
    }

    /// Hard kill: ignores `invulnerable`, honors `god_mode`.
    pub fn forcibly_die(&mut self) -> bool {
        if self.god_mode {
            return false;
        }
        self.die()
    }

    /// Hard kill that ignores every protection flag.
    pub fn forcibly_die_ignoring_invulnerability(&mut self) -> bool {
        self.die()
    }

    /// Back to full health for pool reuse. Listeners are kept; queued
    /// notifications are dropped.
    pub fn reset(&mut self) {
        self.hit_points = self.max_hit_points;
        self.dead = false;
        self.invulnerable = false;
        self.outbox.clear();
    }

    /// Take every queued notification.
    pub fn drain_notifications(&mut self) -> Vec<HealthNotification> {
        std::mem::take(&mut self.outbox)
    }

    fn die(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.dead = true;
        self.hit_points = 0.0;
        self.notify(HealthEvent::Died);
        true
    }

    fn notify(&mut self, event: HealthEvent) {
        for &listener in &self.listeners {
            self.outbox.push(HealthNotification { listener, event });
        }
    }
}
