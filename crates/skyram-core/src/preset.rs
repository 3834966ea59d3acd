//! Mode-specific tunable bundles.
//!
//! A [`Preset`] is an immutable value. Controllers hold it behind an `Arc`
//! and swap the whole `Arc` on a mode change; fields are never edited in
//! place.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::enums::Mode;
use crate::world::LayerMask;

/// Tunables for one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    // --- Steering ---
    /// Hard cap on desired velocity (m/s).
    pub max_speed: f64,
    /// Length of the pursuit term in the desired velocity.
    pub burst_distance: f64,
    /// Seconds between velocity commits.
    pub burst_cooldown: f64,
    /// Relative random spread applied to `burst_cooldown` at initialization.
    pub burst_cooldown_jitter: f64,
    /// Exponential decay rate of velocity between commits (1/s).
    pub velocity_decay: f64,
    /// Per-axis acceleration limit in the attacking phase (m/s²).
    pub max_acceleration: f64,

    // --- Procedural offsets ---
    pub chaos_near_distance: f64,
    pub chaos_far_distance: f64,
    pub chaos_near_range: f64,
    pub chaos_far_range: f64,
    /// Noise sample rate (1/s).
    pub noise_frequency: f64,
    pub spiral_close_distance: f64,
    pub spiral_far_distance: f64,
    pub max_spiral_offset: f64,

    // --- Avoidance ---
    pub avoidance_force: f64,
    pub detection_radius: f64,
    pub blocking_layers: LayerMask,

    // --- Pivot selection ---
    pub pivot_distance: f64,
    pub pivot_forward_push: f64,
    pub pivot_height_offset: f64,
    /// Seconds between pivot re-picks in Approach.
    pub pivot_repick_interval: f64,
    /// Layers that block pivot line-of-sight.
    pub line_of_sight_layers: LayerMask,

    // --- Orbit ring ---
    pub orbit_ring_size: usize,
    pub orbit_radius: f64,
    /// Per-axis jitter applied to each anchor on a cycle.
    pub pivot_random_offset: f64,
    /// Lerp rate of agents toward their anchors (1/s).
    pub pivot_move_speed: f64,
    /// Turn rate of the pivot frame outside the attack (rad/s).
    pub pivot_rotation_speed: f64,

    // --- Choreography ---
    pub min_burst_distance: f64,
    pub max_burst_distance: f64,
    pub burst_speed: f64,
    pub burst_duration: f64,
    pub align_time: f64,
    pub left_right_align_time: f64,
    /// Distance of each barrier anchor from the pivot frame's axis.
    pub barrier_half_width: f64,
    pub randomize_anchor_swap: bool,
    pub attack_time: f64,
    /// Pivot frame turn rate while attacking (rad/s).
    pub attack_rotation_speed: f64,
    pub attack_rotation_breakoff_distance: f64,
    pub max_collision_kills: u32,
    /// Seconds after a resolved attack before another may start.
    pub attack_cooldown: f64,
}

/// The solo and duo presets, shared by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetSet {
    pub solo: Arc<Preset>,
    pub duo: Arc<Preset>,
}

#[derive(Debug, Deserialize)]
struct PresetFile {
    solo: Preset,
    duo: Preset,
}

/// Preset loading and validation failures.
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("failed to parse preset file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid preset field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl Preset {
    /// Defaults for a lone agent.
    pub fn solo() -> Self {
        Self {
            max_speed: SOLO_MAX_SPEED,
            burst_distance: SOLO_BURST_DISTANCE,
            burst_cooldown: SOLO_BURST_COOLDOWN,
            burst_cooldown_jitter: 0.2,
            velocity_decay: 1.5,
            max_acceleration: 80.0,
            chaos_near_distance: 15.0,
            chaos_far_distance: 120.0,
            chaos_near_range: 2.0,
            chaos_far_range: 18.0,
            noise_frequency: 0.35,
            spiral_close_distance: 20.0,
            spiral_far_distance: 90.0,
            max_spiral_offset: SOLO_MAX_SPIRAL_OFFSET,
            avoidance_force: 2.0,
            detection_radius: 12.0,
            blocking_layers: LayerMask::layer(LAYER_TERRAIN).with(LAYER_OBSTACLE),
            pivot_distance: 25.0,
            pivot_forward_push: 10.0,
            pivot_height_offset: 4.0,
            pivot_repick_interval: 3.0,
            line_of_sight_layers: LayerMask::layer(LAYER_TERRAIN).with(LAYER_OBSTACLE),
            orbit_ring_size: ORBIT_RING_SIZE,
            orbit_radius: ORBIT_RADIUS,
            pivot_random_offset: 1.0,
            pivot_move_speed: 4.0,
            pivot_rotation_speed: 2.5,
            min_burst_distance: DUO_MIN_BURST_DISTANCE,
            max_burst_distance: DUO_MAX_BURST_DISTANCE,
            burst_speed: DUO_BURST_SPEED,
            burst_duration: DUO_BURST_DURATION,
            align_time: DUO_ALIGN_TIME,
            left_right_align_time: DUO_LEFT_RIGHT_ALIGN_TIME,
            barrier_half_width: 6.0,
            randomize_anchor_swap: false,
            attack_time: DUO_ATTACK_TIME,
            attack_rotation_speed: 1.8,
            attack_rotation_breakoff_distance: 25.0,
            max_collision_kills: DUO_MAX_COLLISION_KILLS,
            attack_cooldown: DUO_ATTACK_COOLDOWN,
        }
    }

    /// Defaults for a coordinated pair.
    pub fn duo() -> Self {
        Self {
            max_speed: DUO_MAX_SPEED,
            burst_distance: DUO_BURST_DISTANCE,
            burst_cooldown: DUO_BURST_COOLDOWN,
            burst_cooldown_jitter: 0.15,
            chaos_near_range: 1.5,
            chaos_far_range: 12.0,
            max_spiral_offset: 0.0,
            pivot_distance: 35.0,
            pivot_forward_push: 15.0,
            pivot_height_offset: 6.0,
            pivot_random_offset: 1.5,
            randomize_anchor_swap: true,
            ..Self::solo()
        }
    }

    /// Check every field that is later used as a divisor, band edge or count.
    pub fn validate(&self) -> Result<(), PresetError> {
        let positive = [
            ("max_speed", self.max_speed),
            ("burst_cooldown", self.burst_cooldown),
            ("detection_radius", self.detection_radius),
            ("burst_duration", self.burst_duration),
            ("align_time", self.align_time),
            ("left_right_align_time", self.left_right_align_time),
            ("attack_time", self.attack_time),
            ("pivot_repick_interval", self.pivot_repick_interval),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(invalid(field, format!("must be > 0, got {value}")));
            }
        }

        let non_negative = [
            ("burst_distance", self.burst_distance),
            ("velocity_decay", self.velocity_decay),
            ("max_acceleration", self.max_acceleration),
            ("max_spiral_offset", self.max_spiral_offset),
            ("avoidance_force", self.avoidance_force),
            ("pivot_random_offset", self.pivot_random_offset),
            ("attack_cooldown", self.attack_cooldown),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(invalid(field, format!("must be >= 0, got {value}")));
            }
        }

        if !(0.0..1.0).contains(&self.burst_cooldown_jitter) {
            return Err(invalid(
                "burst_cooldown_jitter",
                format!("must be in [0, 1), got {}", self.burst_cooldown_jitter),
            ));
        }
        if self.min_burst_distance > self.max_burst_distance {
            return Err(invalid(
                "min_burst_distance",
                format!(
                    "{} exceeds max_burst_distance {}",
                    self.min_burst_distance, self.max_burst_distance
                ),
            ));
        }
        if self.chaos_near_distance >= self.chaos_far_distance {
            return Err(invalid(
                "chaos_near_distance",
                "must be below chaos_far_distance".to_string(),
            ));
        }
        if self.spiral_close_distance >= self.spiral_far_distance {
            return Err(invalid(
                "spiral_close_distance",
                "must be below spiral_far_distance".to_string(),
            ));
        }
        if self.orbit_ring_size < 2 || self.orbit_ring_size % 2 != 0 {
            return Err(invalid(
                "orbit_ring_size",
                format!("must be even and >= 2, got {}", self.orbit_ring_size),
            ));
        }
        Ok(())
    }
}

impl Default for PresetSet {
    fn default() -> Self {
        Self {
            solo: Arc::new(Preset::solo()),
            duo: Arc::new(Preset::duo()),
        }
    }
}

impl PresetSet {
    /// Build a set from two validated presets.
    pub fn new(solo: Preset, duo: Preset) -> Result<Self, PresetError> {
        for (name, preset) in [("solo", &solo), ("duo", &duo)] {
            if let Err(err) = preset.validate() {
                tracing::warn!(preset = name, %err, "preset rejected");
                return Err(err);
            }
        }
        Ok(Self {
            solo: Arc::new(solo),
            duo: Arc::new(duo),
        })
    }

    /// Load `{ "solo": {...}, "duo": {...} }` and validate both.
    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        let file: PresetFile = serde_json::from_str(json)?;
        Self::new(file.solo, file.duo)
    }

    /// The shared preset for a mode.
    pub fn for_mode(&self, mode: Mode) -> Arc<Preset> {
        match mode {
            Mode::Solo => Arc::clone(&self.solo),
            Mode::Duo => Arc::clone(&self.duo),
        }
    }
}

fn invalid(field: &'static str, reason: String) -> PresetError {
    PresetError::Invalid { field, reason }
}
