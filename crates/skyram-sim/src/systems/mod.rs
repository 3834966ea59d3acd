//! Arena systems, run once per tick in a fixed order by the engine.
//!
//! Systems are plain functions over the world, the pool and the engine's
//! buffers. They hold no state of their own; the death-sequence queue is
//! owned by the engine.

pub mod cleanup;
pub mod controllers;
pub mod death_sequence;
pub mod hazard;
pub mod health;
pub mod pilot;
pub mod proximity;
pub mod raycast;
pub mod snapshot;
