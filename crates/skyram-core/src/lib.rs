//! Core types and definitions for the SKYRAM ramming-unit AI.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry, enums, tunable presets, the health component, collaborator
//! interfaces, controller events, and constants.
//! It has no dependency on any engine or runtime framework.

pub mod constants;
pub mod enums;
pub mod events;
pub mod health;
pub mod preset;
pub mod types;
pub mod world;

#[cfg(test)]
mod tests;
