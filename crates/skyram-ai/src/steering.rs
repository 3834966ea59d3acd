//! Desired-velocity computation and the burst commit cadence.
//!
//! `compute_desired_velocity` is a pure function of the tick's inputs.
//! The cadence helpers decide how the desired value reaches the agent's
//! actual velocity: snapped once per burst and decayed in between, or
//! acceleration-limited per axis while attacking.

use std::f64::consts::FRAC_PI_2;

use glam::DVec3;

use skyram_core::enums::{Mode, SpinDirection};
use skyram_core::preset::Preset;
use skyram_core::types::inverse_lerp01;

use crate::noise::ChaosNoise;

/// Everything the steering model reads for one agent on one tick.
pub struct SteeringInput<'a> {
    pub position: DVec3,
    /// The pilot in Solo, the current pivot in Duo.
    pub pursuit_point: DVec3,
    /// Distance to the pilot; drives the chaos and spiral bands.
    pub target_distance: f64,
    pub up_hint: DVec3,
    pub mode: Mode,
    pub preset: &'a Preset,
    pub spin: SpinDirection,
    pub spiral_step: u32,
    pub noise: &'a ChaosNoise,
    pub noise_time: f64,
    /// Output of the obstacle tracker.
    pub avoidance: DVec3,
}

/// Timer that fires once per burst cooldown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstCadence {
    timer: f64,
    cooldown: f64,
}

/// Combine pursuit, avoidance, chaos and spiral into a desired velocity
/// whose length never exceeds `preset.max_speed`.
pub fn compute_desired_velocity(input: &SteeringInput) -> DVec3 {
    let preset = input.preset;
    let pursuit = (input.pursuit_point - input.position).normalize_or_zero();
    let heading = (pursuit + input.avoidance).normalize_or_zero();

    let mut desired = heading * preset.burst_distance;

    if let Some((right, up)) = perpendicular_basis(pursuit, input.up_hint) {
        let range = chaos_range(input.target_distance, preset);
        let (lateral, vertical) = input
            .noise
            .sample(input.noise_time * preset.noise_frequency);
        desired += right * (lateral * range) + up * (vertical * range);

        if input.mode == Mode::Solo {
            let magnitude = spiral_magnitude(input.target_distance, preset);
            desired += spiral_offset(right, up, input.spiral_step, input.spin, magnitude);
        }
    }

    tracing::trace!(
        speed = desired.length(),
        max_speed = preset.max_speed,
        "desired velocity"
    );
    desired.clamp_length_max(preset.max_speed)
}

/// Chaos magnitude, interpolated from near to far range across the
/// near/far distance band.
pub fn chaos_range(distance: f64, preset: &Preset) -> f64 {
    let t = inverse_lerp01(preset.chaos_near_distance, preset.chaos_far_distance, distance);
    preset.chaos_near_range + (preset.chaos_far_range - preset.chaos_near_range) * t
}

/// Spiral magnitude: zero inside the close band, full beyond the far edge.
pub fn spiral_magnitude(distance: f64, preset: &Preset) -> f64 {
    preset.max_spiral_offset
        * inverse_lerp01(
            preset.spiral_close_distance,
            preset.spiral_far_distance,
            distance,
        )
}

/// Offset rotated a quarter turn per step around the pursuit axis.
pub fn spiral_offset(
    right: DVec3,
    up: DVec3,
    step: u32,
    spin: SpinDirection,
    magnitude: f64,
) -> DVec3 {
    // Quarter turns repeat every 4 steps; reduce first to keep the angle exact.
    let quarter = (step % 4) as f64 * spin.sign() as f64;
    let angle = quarter * FRAC_PI_2;
    (right * angle.cos() + up * angle.sin()) * magnitude
}

/// Right/up unit vectors perpendicular to `axis`. `None` for a zero axis.
pub fn perpendicular_basis(axis: DVec3, up_hint: DVec3) -> Option<(DVec3, DVec3)> {
    let axis = axis.try_normalize()?;
    let right = up_hint
        .cross(axis)
        .try_normalize()
        .or_else(|| DVec3::X.cross(axis).try_normalize())
        .or_else(|| DVec3::Z.cross(axis).try_normalize())?;
    Some((right, axis.cross(right)))
}

/// Exponential decay toward zero between commits.
pub fn decay_velocity(velocity: DVec3, rate: f64, dt: f64) -> DVec3 {
    velocity * (-rate * dt).exp()
}

/// Move each axis toward `desired` by at most `max_acceleration * dt`.
pub fn accelerate_towards(velocity: DVec3, desired: DVec3, max_acceleration: f64, dt: f64) -> DVec3 {
    let step = max_acceleration * dt;
    let axis = |current: f64, target: f64| {
        let delta = target - current;
        if delta.abs() <= step {
            target
        } else {
            current + step * delta.signum()
        }
    };
    DVec3::new(
        axis(velocity.x, desired.x),
        axis(velocity.y, desired.y),
        axis(velocity.z, desired.z),
    )
}

impl BurstCadence {
    pub fn new(cooldown: f64) -> Self {
        Self {
            timer: 0.0,
            cooldown,
        }
    }

    /// Advance by `dt`. Returns true when a burst commit is due.
    pub fn tick(&mut self, dt: f64) -> bool {
        self.timer += dt;
        if self.timer >= self.cooldown {
            self.timer = 0.0;
            true
        } else {
            false
        }
    }

    pub fn cooldown(&self) -> f64 {
        self.cooldown
    }
}
