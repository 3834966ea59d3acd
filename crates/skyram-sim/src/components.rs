//! ECS components for the arena world.
//!
//! Controllers are not entities; they live in the pool. The world only holds
//! what controllers sense: the pilot and the obstacles.

use skyram_core::world::ColliderInfo;

/// Marker for the pilot entity. Carries `TargetState` and `Health` alongside.
#[derive(Debug, Clone, Copy)]
pub struct Pilot;

/// A static sphere collider.
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub info: ColliderInfo,
}
