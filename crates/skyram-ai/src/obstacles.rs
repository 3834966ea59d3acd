//! Proximity-trigger bookkeeping and obstacle repulsion.
//!
//! Membership changes only through enter/exit notifications. Entering a
//! tracked collider or exiting an untracked one does nothing.

use std::collections::BTreeMap;

use glam::DVec3;

use skyram_core::enums::ObstacleKind;
use skyram_core::types::clamp01;
use skyram_core::world::{ColliderId, ColliderInfo, LayerMask};

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrackedObstacle {
    kind: ObstacleKind,
    center: DVec3,
    radius: f64,
}

/// Blocking colliders currently overlapping one agent's proximity trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleTracker {
    mask: LayerMask,
    // Ordered so the avoidance sum is reproducible across runs.
    tracked: BTreeMap<ColliderId, TrackedObstacle>,
    destructible: usize,
    indestructible: usize,
}

impl ObstacleTracker {
    pub fn new(mask: LayerMask) -> Self {
        Self {
            mask,
            tracked: BTreeMap::new(),
            destructible: 0,
            indestructible: 0,
        }
    }

    pub fn mask(&self) -> LayerMask {
        self.mask
    }

    /// Change the blocking mask. Already-tracked colliders stay tracked until
    /// they exit.
    pub fn set_mask(&mut self, mask: LayerMask) {
        self.mask = mask;
    }

    /// Start tracking a collider. Returns true if it was added.
    pub fn on_enter(&mut self, collider: &ColliderInfo) -> bool {
        if collider.is_trigger || !self.mask.contains(collider.layer) {
            return false;
        }
        if self.tracked.contains_key(&collider.id) {
            return false;
        }
        self.tracked.insert(
            collider.id,
            TrackedObstacle {
                kind: collider.kind,
                center: collider.center,
                radius: collider.radius,
            },
        );
        match collider.kind {
            ObstacleKind::Destructible => self.destructible += 1,
            ObstacleKind::Indestructible => self.indestructible += 1,
        }
        true
    }

    /// Stop tracking a collider. Returns true if it was tracked.
    pub fn on_exit(&mut self, id: ColliderId) -> bool {
        let Some(obstacle) = self.tracked.remove(&id) else {
            return false;
        };
        match obstacle.kind {
            ObstacleKind::Destructible => self.destructible -= 1,
            ObstacleKind::Indestructible => self.indestructible -= 1,
        }
        true
    }

    /// Sum of per-obstacle repulsion. Each term is the unit vector away from
    /// the obstacle scaled by `force`, at full strength on contact and fading
    /// to zero at `detection_radius`.
    pub fn avoidance_vector(&self, position: DVec3, detection_radius: f64, force: f64) -> DVec3 {
        if detection_radius <= 0.0 {
            return DVec3::ZERO;
        }
        self.tracked
            .values()
            .map(|obstacle| {
                let offset = position - obstacle.center;
                let Some(away) = offset.try_normalize() else {
                    return DVec3::ZERO;
                };
                let distance = (offset.length() - obstacle.radius).max(0.0);
                let strength = clamp01((detection_radius - distance) / detection_radius);
                away * force * strength
            })
            .sum()
    }

    pub fn contains(&self, id: ColliderId) -> bool {
        self.tracked.contains_key(&id)
    }

    /// Tracked collider ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ColliderId> + '_ {
        self.tracked.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    pub fn destructible_count(&self) -> usize {
        self.destructible
    }

    pub fn indestructible_count(&self) -> usize {
        self.indestructible
    }
}
