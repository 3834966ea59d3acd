//! Enumeration types used throughout the ramming AI.

use serde::{Deserialize, Serialize};

/// Slot / identity tag of a ramming agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    A,
    B,
}

/// Whether the controller coordinates one or two agents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Solo,
    Duo,
}

/// Attack choreography phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Steering-driven pursuit of the current pivot (or pilot, in Solo).
    #[default]
    Approach,
    /// Straight-line dash toward the pivot at burst speed.
    Burst,
    /// Agents ease onto the barrier anchors while the pivot frame turns to the pilot.
    AlignToPivot,
    /// Pivot frame locks onto the pilot; agents hold position.
    AlignToAnchors,
    /// Full-speed ram along the pivot frame's forward axis.
    Attacking,
    /// One-tick cleanup before returning to Approach.
    Resolved,
}

/// Spin sense of the solo spiral and orbit cycling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpinDirection {
    #[default]
    Clockwise,
    CounterClockwise,
}

/// Obstacle category, derived from collider tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Destructible,
    Indestructible,
}

impl Role {
    /// Slot index (A = 0, B = 1).
    pub fn index(self) -> usize {
        match self {
            Role::A => 0,
            Role::B => 1,
        }
    }

    pub fn other(self) -> Role {
        match self {
            Role::A => Role::B,
            Role::B => Role::A,
        }
    }

    pub const ALL: [Role; 2] = [Role::A, Role::B];
}

impl Phase {
    /// From the start of the burst until the attack resolves.
    pub fn is_attack_sequence(self) -> bool {
        matches!(
            self,
            Phase::Burst | Phase::AlignToPivot | Phase::AlignToAnchors | Phase::Attacking
        )
    }

    /// Every phase past Approach needs two agents.
    pub fn is_duo_only(self) -> bool {
        self != Phase::Approach
    }
}

impl SpinDirection {
    /// Step sign for ring cycling and spiral rotation.
    pub fn sign(self) -> i32 {
        match self {
            SpinDirection::Clockwise => 1,
            SpinDirection::CounterClockwise => -1,
        }
    }
}
