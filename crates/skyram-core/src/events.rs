//! Events emitted by a controller for arena, audio and UI feedback.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Why an attack ended early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// An agent touched an indestructible obstacle.
    IndestructibleContact,
    /// The hazard destroyed too many things in one run.
    CollisionKillCap,
}

/// Controller-level events, drained once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControllerEvent {
    PhaseChanged { from: Phase, to: Phase },
    HazardToggled { active: bool },
    PivotChosen { index: Option<usize> },
    PrematureStop { reason: StopReason },
    PartnerLost { role: Role },
    ModeChanged { mode: Mode },
}
