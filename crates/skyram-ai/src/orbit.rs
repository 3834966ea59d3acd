//! Duo orbit ring: anchors around the controller that keep the two agents
//! on opposite sides of the pair.
//!
//! Offsets are captured once at spawn. Each burst commit advances the
//! running index one step in the spin direction and regenerates every
//! anchor's live position (rotated by the pivot frame, plus jitter). The
//! ring's size never changes after initialization.

use std::f64::consts::TAU;

use glam::{DQuat, DVec3};
use rand::Rng;

use skyram_core::enums::SpinDirection;
use skyram_core::types::clamp01;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrbitRing {
    offsets: Vec<DVec3>,
    positions: Vec<DVec3>,
    index: usize,
}

/// Evenly spaced anchors on a circle in the controller's local XY plane.
pub fn circular_anchors(center: DVec3, count: usize, radius: f64) -> Vec<DVec3> {
    (0..count)
        .map(|i| {
            let angle = TAU * i as f64 / count as f64;
            center + DVec3::new(angle.cos() * radius, angle.sin() * radius, 0.0)
        })
        .collect()
}

/// Lerp an agent toward its anchor at `speed` (1/s).
pub fn move_toward_anchor(current: DVec3, anchor: DVec3, speed: f64, dt: f64) -> DVec3 {
    current.lerp(anchor, clamp01(speed * dt))
}

impl OrbitRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture each anchor's offset from the controller.
    pub fn initialize(&mut self, controller_position: DVec3, anchors: &[DVec3]) {
        self.offsets = anchors.iter().map(|a| *a - controller_position).collect();
        self.positions = anchors.to_vec();
        self.index = 0;
    }

    /// Advance the running index by one step in `spin` and recompute every
    /// anchor as `controller + rotation * offset + jitter`.
    pub fn cycle_and_jitter<R: Rng>(
        &mut self,
        controller_position: DVec3,
        spin: SpinDirection,
        pivot_rotation: DQuat,
        jitter: f64,
        rng: &mut R,
    ) {
        if self.offsets.is_empty() {
            return;
        }
        let len = self.offsets.len() as i64;
        self.index = (self.index as i64 + spin.sign() as i64).rem_euclid(len) as usize;

        for (position, offset) in self.positions.iter_mut().zip(&self.offsets) {
            let noise = if jitter > 0.0 {
                DVec3::new(
                    rng.gen_range(-jitter..=jitter),
                    rng.gen_range(-jitter..=jitter),
                    rng.gen_range(-jitter..=jitter),
                )
            } else {
                DVec3::ZERO
            };
            *position = controller_position + pivot_rotation * *offset + noise;
        }
        tracing::debug!(index = self.index, "orbit ring cycled");
    }

    /// Carry every live anchor along with the controller.
    pub fn translate(&mut self, delta: DVec3) {
        for position in &mut self.positions {
            *position += delta;
        }
    }

    /// The anchor at `index` and the one diametrically opposite it.
    pub fn assigned_pivots(&self, index: usize) -> Option<(DVec3, DVec3)> {
        let len = self.positions.len();
        if len == 0 {
            return None;
        }
        let first = self.positions[index % len];
        let second = self.positions[(index + len / 2) % len];
        Some((first, second))
    }

    /// Anchors for the current running index.
    pub fn current_assignment(&self) -> Option<(DVec3, DVec3)> {
        self.assigned_pivots(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn reset_index(&mut self) {
        self.index = 0;
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }
}
