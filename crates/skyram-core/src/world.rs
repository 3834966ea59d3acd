//! Collaborator interfaces and the plain data exchanged with them.
//!
//! The AI core never reaches into an engine. Everything it needs from the
//! outside world arrives as one of these values or through one of these
//! traits, passed in explicitly.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::ObstacleKind;
use crate::types::{Pose, ViewBasis};

/// Bit set of collision layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

/// Stable identity of a collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderId(pub u64);

/// Identity of a pooled composite unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// A collider reported by a proximity trigger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColliderInfo {
    pub id: ColliderId,
    /// Layer index (0..32).
    pub layer: u32,
    /// Trigger volumes never block.
    pub is_trigger: bool,
    pub kind: ObstacleKind,
    pub center: DVec3,
    /// Bounding radius used for surface distance.
    pub radius: f64,
}

/// First hit of a line-of-sight probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub collider: ColliderId,
    pub distance: f64,
    /// True when the hit collider belongs to the pilot itself.
    pub belongs_to_target: bool,
}

/// Read-only view of the pilot for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetState {
    pub pose: Pose,
    pub velocity: DVec3,
    pub grounded: bool,
    pub view: ViewBasis,
}

/// World line-of-sight query.
pub trait WorldQuery {
    /// Cast a ray from `origin` along unit `direction`; return the closest hit
    /// within `max_distance` on any layer in `mask`.
    fn raycast(
        &self,
        origin: DVec3,
        direction: DVec3,
        max_distance: f64,
        mask: LayerMask,
    ) -> Option<RayHit>;
}

/// The visual/contact hazard stretched between the two agents.
pub trait Hazard {
    fn set_active(&mut self, active: bool);
}

/// Object pool that owns composite units between activations.
pub trait UnitPool {
    /// Return a dead or retired unit to the pool.
    fn release(&mut self, unit: UnitId);
}

/// A world with nothing in it. Every probe is clear.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyWorld;

/// A hazard with no visual; it only remembers its state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHazard {
    pub active: bool,
}

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// Mask containing exactly one layer.
    pub fn layer(layer: u32) -> Self {
        LayerMask(1u32.checked_shl(layer).unwrap_or(0))
    }

    pub fn with(self, layer: u32) -> Self {
        LayerMask(self.0 | Self::layer(layer).0)
    }

    pub fn contains(self, layer: u32) -> bool {
        self.0 & Self::layer(layer).0 != 0
    }

    pub fn union(self, other: LayerMask) -> Self {
        LayerMask(self.0 | other.0)
    }
}

impl TargetState {
    /// A stationary, airborne pilot at `position` looking down +Z.
    pub fn stationary(position: DVec3) -> Self {
        Self {
            pose: Pose::at(position),
            velocity: DVec3::ZERO,
            grounded: false,
            view: ViewBasis::default(),
        }
    }

    pub fn position(&self) -> DVec3 {
        self.pose.position
    }
}

impl WorldQuery for EmptyWorld {
    fn raycast(&self, _: DVec3, _: DVec3, _: f64, _: LayerMask) -> Option<RayHit> {
        None
    }
}

impl Hazard for NullHazard {
    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}
