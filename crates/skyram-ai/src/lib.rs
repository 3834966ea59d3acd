//! Ramming-unit AI for SKYRAM.
//!
//! Implements the dual-agent steering model, pivot selection, the duo orbit
//! ring, the attack choreography state machine, partner-loss handling and
//! composite death aggregation.

pub mod choreographer;
pub mod controller;
pub mod death;
pub mod noise;
pub mod obstacles;
pub mod orbit;
pub mod partner_loss;
pub mod pivot;
pub mod steering;

pub use controller::{ControllerConfig, RamController, Spawn};
pub use skyram_core as core;

#[cfg(test)]
mod tests;
