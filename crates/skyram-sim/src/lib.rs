//! Headless arena for SKYRAM ramming units.
//!
//! Owns a hecs world with the pilot and static obstacles, a pool of
//! controllers, and runs every system at a fixed tick rate. Each tick
//! produces a serializable `ArenaSnapshot`.

pub mod arena_setup;
pub mod components;
pub mod engine;
pub mod error;
pub mod events;
pub mod pool;
pub mod systems;

pub use engine::{SimConfig, SimulationEngine};
pub use error::SimError;
pub use events::{ArenaCommand, ArenaEvent};
pub use skyram_core as core;
