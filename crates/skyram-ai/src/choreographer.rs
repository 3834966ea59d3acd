//! Duo attack choreography.
//!
//! Approach -> Burst -> AlignToPivot -> AlignToAnchors -> Attacking ->
//! Resolved -> Approach. The controller runs Approach itself (it is plain
//! steering); every other phase is advanced here and moves the rig for that
//! tick. All timers are delta accumulators.
//!
//! [`Choreographer::force_stop`] is the only cancellation primitive. It can
//! be called from any phase and leaves the same state every time.

use glam::{DQuat, DVec3};
use rand::Rng;

use skyram_core::constants::ALIGN_EASE_BASE;
use skyram_core::enums::{Phase, Role};
use skyram_core::events::{ControllerEvent, StopReason};
use skyram_core::preset::Preset;
use skyram_core::types::{look_rotation, rotate_towards, Pose};
use skyram_core::world::{Hazard, TargetState};

use crate::controller::Rig;
use crate::steering::{accelerate_towards, decay_velocity};

/// The hazard collaborator plus its last commanded state.
pub struct HazardSwitch {
    hazard: Box<dyn Hazard>,
    active: bool,
}

/// Per-tick inputs for the non-Approach phases.
pub struct PhaseContext<'a> {
    pub dt: f64,
    pub target: &'a TargetState,
    pub preset: &'a Preset,
    pub pivot_point: DVec3,
    /// Indestructible contacts summed over both agents.
    pub indestructible_contacts: usize,
}

/// Attack phase state. Everything here is cleared by a force stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Choreographer {
    phase: Phase,
    phase_timer: f64,
    cooldown_timer: f64,
    burst_direction: DVec3,
    align_from: [DVec3; 2],
    align_from_rotation: DQuat,
    anchors_swapped: bool,
    collision_kills: u32,
}

impl Default for Choreographer {
    fn default() -> Self {
        Self {
            phase: Phase::Approach,
            phase_timer: 0.0,
            cooldown_timer: 0.0,
            burst_direction: DVec3::ZERO,
            align_from: [DVec3::ZERO; 2],
            align_from_rotation: DQuat::IDENTITY,
            anchors_swapped: false,
            collision_kills: 0,
        }
    }
}

/// Ease-out progress `1 - 0.01^(t / duration)`, exactly 1 at the end.
pub fn align_ease(elapsed: f64, duration: f64) -> f64 {
    if elapsed >= duration {
        return 1.0;
    }
    1.0 - ALIGN_EASE_BASE.powf(elapsed / duration)
}

/// Left and right barrier anchors of the pivot frame.
pub fn barrier_anchors(frame: &Pose, half_width: f64) -> [DVec3; 2] {
    let right = frame.right() * half_width;
    [frame.position - right, frame.position + right]
}

/// Pivot frame turn-rate multiplier: full outside the breakoff distance,
/// fading linearly to zero at contact.
pub fn attack_turn_factor(distance: f64, breakoff: f64) -> f64 {
    if breakoff <= 0.0 || distance >= breakoff {
        1.0
    } else {
        (distance / breakoff).max(0.0)
    }
}

impl HazardSwitch {
    pub fn new(hazard: Box<dyn Hazard>) -> Self {
        Self {
            hazard,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Command the hazard. Repeating the current state is a no-op.
    pub fn set(&mut self, active: bool, events: &mut Vec<ControllerEvent>) {
        if self.active == active {
            return;
        }
        self.active = active;
        self.hazard.set_active(active);
        events.push(ControllerEvent::HazardToggled { active });
    }
}

impl Choreographer {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn phase_timer(&self) -> f64 {
        self.phase_timer
    }

    pub fn cooldown_remaining(&self) -> f64 {
        self.cooldown_timer
    }

    pub fn collision_kills(&self) -> u32 {
        self.collision_kills
    }

    pub fn anchors_swapped(&self) -> bool {
        self.anchors_swapped
    }

    /// True from the start of the burst until the attack resolves.
    pub fn is_attacking(&self) -> bool {
        self.phase.is_attack_sequence()
    }

    /// True once the post-attack cooldown has run out.
    pub fn attack_permitted(&self) -> bool {
        self.cooldown_timer <= 0.0
    }

    pub fn tick_cooldown(&mut self, dt: f64) {
        self.cooldown_timer = (self.cooldown_timer - dt).max(0.0);
    }

    /// Count a hazard kill. Only attacks count.
    pub fn register_collision_kill(&mut self) {
        if self.phase == Phase::Attacking {
            self.collision_kills += 1;
        }
    }

    /// Which agent sits at the left barrier anchor. Rolled once per attack
    /// as the burst ends; the other agent takes the right anchor.
    pub fn left_slot(&self) -> Role {
        if self.anchors_swapped {
            Role::B
        } else {
            Role::A
        }
    }

    /// Leave Approach for a straight dash toward the pivot. Ignored outside
    /// Approach or for a zero-length direction.
    pub fn begin_burst(&mut self, direction: DVec3, events: &mut Vec<ControllerEvent>) -> bool {
        if self.phase != Phase::Approach {
            return false;
        }
        let Some(direction) = direction.try_normalize() else {
            return false;
        };
        self.burst_direction = direction;
        self.transition(Phase::Burst, events);
        true
    }

    /// Clear every phase flag, timer and counter and switch the hazard off.
    /// Returns false when there was nothing to stop.
    pub fn force_stop(&mut self, hazard: &mut HazardSwitch, events: &mut Vec<ControllerEvent>) -> bool {
        if *self == Self::default() && !hazard.is_active() {
            return false;
        }
        let from = self.phase;
        *self = Self::default();
        hazard.set(false, events);
        if from != Phase::Approach {
            tracing::debug!(?from, "attack force-stopped");
            events.push(ControllerEvent::PhaseChanged {
                from,
                to: Phase::Approach,
            });
        }
        true
    }

    /// Advance one non-Approach phase by `ctx.dt`.
    pub fn step<R: Rng>(
        &mut self,
        rig: &mut Rig,
        ctx: &PhaseContext,
        hazard: &mut HazardSwitch,
        rng: &mut R,
        events: &mut Vec<ControllerEvent>,
    ) {
        match self.phase {
            Phase::Approach => {}
            Phase::Burst => self.step_burst(rig, ctx, rng, events),
            Phase::AlignToPivot => self.step_align_to_pivot(rig, ctx, hazard, events),
            Phase::AlignToAnchors => self.step_align_to_anchors(rig, ctx, events),
            Phase::Attacking => self.step_attacking(rig, ctx, hazard, events),
            Phase::Resolved => self.step_resolved(rig, ctx, hazard, events),
        }
    }

    fn step_burst<R: Rng>(
        &mut self,
        rig: &mut Rig,
        ctx: &PhaseContext,
        rng: &mut R,
        events: &mut Vec<ControllerEvent>,
    ) {
        rig.velocity = self.burst_direction * ctx.preset.burst_speed;
        rig.translate(rig.velocity * ctx.dt);
        turn_frame_toward(rig, ctx.target, ctx.preset.pivot_rotation_speed * ctx.dt);

        self.phase_timer += ctx.dt;
        if self.phase_timer >= ctx.preset.burst_duration {
            rig.velocity = DVec3::ZERO;
            self.align_from = rig.agent_positions();
            self.align_from_rotation = rig.pivot_frame.rotation;
            self.anchors_swapped = ctx.preset.randomize_anchor_swap && rng.gen_bool(0.5);
            self.transition(Phase::AlignToPivot, events);
        }
    }

    fn step_align_to_pivot(
        &mut self,
        rig: &mut Rig,
        ctx: &PhaseContext,
        hazard: &mut HazardSwitch,
        events: &mut Vec<ControllerEvent>,
    ) {
        self.phase_timer += ctx.dt;
        let ease = align_ease(self.phase_timer, ctx.preset.align_time);

        let facing = look_rotation(ctx.target.position() - rig.pivot_frame.position, DVec3::Y)
            .unwrap_or(self.align_from_rotation);
        rig.pivot_frame.rotation = self.align_from_rotation.slerp(facing, ease);

        let anchors = barrier_anchors(&rig.pivot_frame, ctx.preset.barrier_half_width);
        let left = self.left_slot().index();
        for (slot, agent) in rig.agents.iter_mut().enumerate() {
            if let Some(agent) = agent {
                let anchor = if slot == left { anchors[0] } else { anchors[1] };
                agent.pose.position = self.align_from[slot].lerp(anchor, ease);
                agent.velocity = DVec3::ZERO;
            }
        }

        if self.phase_timer >= ctx.preset.align_time {
            hazard.set(true, events);
            self.transition(Phase::AlignToAnchors, events);
        }
    }

    fn step_align_to_anchors(&mut self, rig: &mut Rig, ctx: &PhaseContext, events: &mut Vec<ControllerEvent>) {
        if let Some(facing) = look_rotation(ctx.target.position() - rig.pivot_frame.position, DVec3::Y) {
            rig.pivot_frame.rotation = facing;
        }
        self.phase_timer += ctx.dt;
        if self.phase_timer >= ctx.preset.left_right_align_time {
            self.transition(Phase::Attacking, events);
        }
    }

    fn step_attacking(
        &mut self,
        rig: &mut Rig,
        ctx: &PhaseContext,
        hazard: &mut HazardSwitch,
        events: &mut Vec<ControllerEvent>,
    ) {
        let premature = if ctx.indestructible_contacts > 0 {
            Some(StopReason::IndestructibleContact)
        } else if self.collision_kills >= ctx.preset.max_collision_kills {
            Some(StopReason::CollisionKillCap)
        } else {
            None
        };
        if let Some(reason) = premature {
            tracing::warn!(?reason, "attack stopped early");
            events.push(ControllerEvent::PrematureStop { reason });
            self.resolve(hazard, events);
            return;
        }

        let distance = (ctx.target.position() - rig.body.position).length();
        let factor = attack_turn_factor(distance, ctx.preset.attack_rotation_breakoff_distance);
        turn_frame_toward(rig, ctx.target, ctx.preset.attack_rotation_speed * factor * ctx.dt);

        let desired = rig.pivot_frame.forward() * ctx.preset.max_speed;
        for agent in rig.agents.iter_mut().flatten() {
            agent.velocity =
                accelerate_towards(agent.velocity, desired, ctx.preset.max_acceleration, ctx.dt);
            agent.pose.position += agent.velocity * ctx.dt;
            agent.pose.rotation = rig.pivot_frame.rotation;
        }
        rig.center_on_agents();

        self.phase_timer += ctx.dt;
        if self.phase_timer >= ctx.preset.attack_time {
            self.resolve(hazard, events);
        }
    }

    fn step_resolved(
        &mut self,
        rig: &mut Rig,
        ctx: &PhaseContext,
        hazard: &mut HazardSwitch,
        events: &mut Vec<ControllerEvent>,
    ) {
        hazard.set(false, events);
        for agent in rig.agents.iter_mut().flatten() {
            agent.velocity = DVec3::ZERO;
        }
        rig.velocity = decay_velocity(rig.velocity, ctx.preset.velocity_decay, ctx.dt);
        *self = Self {
            cooldown_timer: ctx.preset.attack_cooldown,
            ..Self::default()
        };
        events.push(ControllerEvent::PhaseChanged {
            from: Phase::Resolved,
            to: Phase::Approach,
        });
        tracing::debug!(from = ?Phase::Resolved, to = ?Phase::Approach, "phase transition");
    }

    /// Enter Resolved and drop the hazard in the same tick.
    fn resolve(&mut self, hazard: &mut HazardSwitch, events: &mut Vec<ControllerEvent>) {
        hazard.set(false, events);
        self.transition(Phase::Resolved, events);
    }

    fn transition(&mut self, to: Phase, events: &mut Vec<ControllerEvent>) {
        let from = self.phase;
        tracing::debug!(?from, ?to, "phase transition");
        self.phase = to;
        self.phase_timer = 0.0;
        events.push(ControllerEvent::PhaseChanged { from, to });
    }
}

/// Rotate the pivot frame toward the pilot by at most `max_angle`.
fn turn_frame_toward(rig: &mut Rig, target: &TargetState, max_angle: f64) {
    if let Some(facing) = look_rotation(target.position() - rig.pivot_frame.position, DVec3::Y) {
        rig.pivot_frame.rotation = rotate_towards(rig.pivot_frame.rotation, facing, max_angle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_ease_shape() {
        assert_eq!(align_ease(0.0, 1.0), 0.0);
        assert!((align_ease(0.5, 1.0) - 0.9).abs() < 1e-12);
        assert_eq!(align_ease(1.0, 1.0), 1.0);
        assert_eq!(align_ease(3.0, 1.0), 1.0);
    }

    #[test]
    fn test_barrier_anchors_straddle_frame() {
        let frame = Pose::at(DVec3::new(0.0, 5.0, 0.0));
        let [left, right] = barrier_anchors(&frame, 4.0);
        assert_eq!(left, DVec3::new(-4.0, 5.0, 0.0));
        assert_eq!(right, DVec3::new(4.0, 5.0, 0.0));
    }

    #[test]
    fn test_turn_factor_fades_inside_breakoff() {
        assert_eq!(attack_turn_factor(100.0, 25.0), 1.0);
        assert_eq!(attack_turn_factor(12.5, 25.0), 0.5);
        assert_eq!(attack_turn_factor(0.0, 25.0), 0.0);
    }

    #[test]
    fn test_begin_burst_only_from_approach() {
        let mut c = Choreographer::default();
        let mut events = Vec::new();
        assert!(!c.begin_burst(DVec3::ZERO, &mut events));
        assert!(c.begin_burst(DVec3::X, &mut events));
        assert!(!c.begin_burst(DVec3::X, &mut events));
        assert_eq!(c.phase(), Phase::Burst);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_kills_only_count_while_attacking() {
        let mut c = Choreographer::default();
        c.register_collision_kill();
        assert_eq!(c.collision_kills(), 0);
    }
}
