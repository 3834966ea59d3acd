//! Fundamental geometric and simulation types.
//!
//! Axes follow the game convention: +Z forward, +X right, +Y up.

use glam::{DMat3, DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// World pose: position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: DVec3,
    pub rotation: DQuat,
}

/// Camera/view basis of the pilot, used to build pivot candidates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBasis {
    pub forward: DVec3,
    pub right: DVec3,
    pub up: DVec3,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: DVec3, rotation: DQuat) -> Self {
        Self { position, rotation }
    }

    /// Pose at a position with identity orientation.
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            rotation: DQuat::IDENTITY,
        }
    }

    pub fn forward(&self) -> DVec3 {
        self.rotation * DVec3::Z
    }

    pub fn right(&self) -> DVec3 {
        self.rotation * DVec3::X
    }

    pub fn up(&self) -> DVec3 {
        self.rotation * DVec3::Y
    }

    /// Transform a point from this pose's local space into world space.
    pub fn transform_point(&self, local: DVec3) -> DVec3 {
        self.position + self.rotation * local
    }
}

impl ViewBasis {
    /// Basis aligned with a pose's own axes.
    pub fn from_pose(pose: &Pose) -> Self {
        Self {
            forward: pose.forward(),
            right: pose.right(),
            up: pose.up(),
        }
    }
}

impl Default for ViewBasis {
    fn default() -> Self {
        Self {
            forward: DVec3::Z,
            right: DVec3::X,
            up: DVec3::Y,
        }
    }
}

impl SimTime {
    /// Seconds per tick at the default tick rate.
    pub fn dt(&self) -> f64 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += self.dt();
    }
}

/// Rotation whose +Z axis points along `forward` with +Y as close to `up`
/// as possible. Returns `None` for a zero-length `forward`.
pub fn look_rotation(forward: DVec3, up: DVec3) -> Option<DQuat> {
    let fwd = forward.try_normalize()?;
    let right = up
        .cross(fwd)
        .try_normalize()
        .or_else(|| DVec3::X.cross(fwd).try_normalize())
        .or_else(|| DVec3::Y.cross(fwd).try_normalize())?;
    let true_up = fwd.cross(right);
    Some(DQuat::from_mat3(&DMat3::from_cols(right, true_up, fwd)))
}

/// Rotate `from` toward `to` by at most `max_angle` radians.
pub fn rotate_towards(from: DQuat, to: DQuat, max_angle: f64) -> DQuat {
    let angle = from.angle_between(to);
    if angle <= max_angle || angle < 1e-9 {
        to
    } else if max_angle <= 0.0 {
        from
    } else {
        from.slerp(to, max_angle / angle)
    }
}

/// Clamp a value into [0, 1].
pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Inverse lerp of `value` across `[a, b]`, clamped to [0, 1].
/// A degenerate band (`a == b`) is treated as a step at `a`.
pub fn inverse_lerp01(a: f64, b: f64, value: f64) -> f64 {
    if (b - a).abs() < f64::EPSILON {
        return if value >= a { 1.0 } else { 0.0 };
    }
    clamp01((value - a) / (b - a))
}
