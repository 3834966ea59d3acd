//! The composite ramming controller.
//!
//! Owns one or two agents, the shared pivot frame, and every subsystem that
//! drives them. The host calls [`RamController::fixed_update`] once per
//! physics tick and [`RamController::late_update`] after all positions for
//! that tick are final. Obstacle enter/exit notifications must be delivered
//! before `fixed_update` for the same tick.

use std::sync::Arc;

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use skyram_core::constants::AGENT_COUNT;
use skyram_core::enums::{Mode, Phase, Role, SpinDirection};
use skyram_core::events::ControllerEvent;
use skyram_core::preset::{Preset, PresetSet};
use skyram_core::types::{look_rotation, rotate_towards, Pose};
use skyram_core::world::{ColliderId, ColliderInfo, Hazard, TargetState, UnitId, WorldQuery};

use crate::choreographer::{Choreographer, HazardSwitch, PhaseContext};
use crate::noise::ChaosNoise;
use crate::obstacles::ObstacleTracker;
use crate::orbit::{circular_anchors, move_toward_anchor, OrbitRing};
use crate::pivot::PivotSelector;
use crate::steering::{compute_desired_velocity, decay_velocity, BurstCadence, SteeringInput};

/// One ramming sub-unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    /// The health identity this agent was spawned with. Survives promotion
    /// from slot B to slot A.
    pub origin: Role,
    pub pose: Pose,
    pub velocity: DVec3,
    pub obstacles: ObstacleTracker,
}

/// Everything that moves: the controller body, its agents and the pivot frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Rig {
    pub body: Pose,
    pub velocity: DVec3,
    pub agents: [Option<Agent>; AGENT_COUNT],
    pub pivot_frame: Pose,
}

/// Static configuration of one pooled controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub id: UnitId,
    pub presets: PresetSet,
}

/// Per-activation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawn {
    pub pose: Pose,
    /// 1 or 2; anything else is clamped.
    pub agent_count: usize,
    pub seed: u64,
    /// Forces the spin direction instead of a coin flip.
    pub spin: Option<SpinDirection>,
}

/// Read-only status for arena logic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerStatus {
    pub mode: Mode,
    pub phase: Phase,
    pub is_attacking: bool,
    pub live_agents: usize,
}

pub struct RamController {
    config: ControllerConfig,
    mode: Mode,
    preset: Arc<Preset>,
    rig: Rig,
    pivot_selector: PivotSelector,
    pivot_point: Option<DVec3>,
    pivot_repick_timer: f64,
    orbit: OrbitRing,
    cadence: BurstCadence,
    spin: SpinDirection,
    spiral_step: u32,
    noise: ChaosNoise,
    noise_clock: f64,
    choreographer: Choreographer,
    hazard: HazardSwitch,
    attacks_allowed: bool,
    rng: ChaCha8Rng,
    events: Vec<ControllerEvent>,
}

impl Agent {
    fn new(origin: Role, position: DVec3, obstacles: ObstacleTracker) -> Self {
        Self {
            origin,
            pose: Pose::at(position),
            velocity: DVec3::ZERO,
            obstacles,
        }
    }
}

impl Rig {
    fn new(body: Pose) -> Self {
        Self {
            body,
            velocity: DVec3::ZERO,
            agents: [None, None],
            pivot_frame: body,
        }
    }

    /// Move the body and every agent by the same offset.
    pub fn translate(&mut self, delta: DVec3) {
        self.body.position += delta;
        for agent in self.agents.iter_mut().flatten() {
            agent.pose.position += delta;
        }
    }

    /// Agent positions by slot; empty slots read as the body position.
    pub fn agent_positions(&self) -> [DVec3; AGENT_COUNT] {
        let mut out = [self.body.position; AGENT_COUNT];
        for (slot, agent) in self.agents.iter().enumerate() {
            if let Some(agent) = agent {
                out[slot] = agent.pose.position;
            }
        }
        out
    }

    /// Put the body at the agents' centroid, moving at their mean velocity.
    pub fn center_on_agents(&mut self) {
        let live: Vec<&Agent> = self.agents.iter().flatten().collect();
        if live.is_empty() {
            return;
        }
        let n = live.len() as f64;
        self.body.position = live.iter().map(|a| a.pose.position).sum::<DVec3>() / n;
        self.velocity = live.iter().map(|a| a.velocity).sum::<DVec3>() / n;
    }

    pub fn live_agents(&self) -> usize {
        self.agents.iter().flatten().count()
    }
}

impl RamController {
    /// Build a controller and run the first activation.
    pub fn new(config: ControllerConfig, hazard: Box<dyn Hazard>, spawn: Spawn) -> Self {
        let preset = Arc::clone(&config.presets.solo);
        let mut controller = Self {
            config,
            mode: Mode::Solo,
            preset,
            rig: Rig::new(spawn.pose),
            pivot_selector: PivotSelector::new(),
            pivot_point: None,
            pivot_repick_timer: 0.0,
            orbit: OrbitRing::new(),
            cadence: BurstCadence::new(0.0),
            spin: SpinDirection::default(),
            spiral_step: 0,
            noise: ChaosNoise::new(0, 0),
            noise_clock: 0.0,
            choreographer: Choreographer::default(),
            hazard: HazardSwitch::new(hazard),
            attacks_allowed: true,
            rng: ChaCha8Rng::seed_from_u64(spawn.seed),
            events: Vec::new(),
        };
        controller.reinitialize(spawn);
        controller
    }

    /// Reset every piece of state for a fresh activation. Used on first
    /// activation and on every pool reuse; the result is indistinguishable
    /// from a newly built controller with the same spawn.
    pub fn reinitialize(&mut self, spawn: Spawn) {
        let mut scratch = Vec::new();
        self.choreographer.force_stop(&mut self.hazard, &mut scratch);

        self.rng = ChaCha8Rng::seed_from_u64(spawn.seed);
        self.noise = ChaosNoise::from_rng(&mut self.rng);
        self.rig = Rig::new(spawn.pose);
        self.pivot_selector.reset();
        self.pivot_point = None;
        self.pivot_repick_timer = 0.0;
        self.noise_clock = 0.0;
        self.attacks_allowed = true;
        self.mode = Mode::Solo;
        self.preset = Arc::clone(&self.config.presets.solo);

        let duo = Arc::clone(&self.config.presets.duo);
        let anchors: Vec<DVec3> = circular_anchors(DVec3::ZERO, duo.orbit_ring_size, duo.orbit_radius)
            .into_iter()
            .map(|local| spawn.pose.transform_point(local))
            .collect();
        self.orbit.initialize(spawn.pose.position, &anchors);

        let count = spawn.agent_count.clamp(1, AGENT_COUNT);
        let starts = match (count, self.orbit.current_assignment()) {
            (2, Some((a, b))) => [a, b],
            _ => [spawn.pose.position; AGENT_COUNT],
        };
        for (slot, role) in Role::ALL.iter().enumerate().take(count) {
            let tracker = ObstacleTracker::new(self.preset.blocking_layers);
            self.rig.agents[slot] = Some(Agent::new(*role, starts[slot], tracker));
        }

        self.configure_for_agents(spawn.spin);
        self.events.clear();
        tracing::info!(unit = self.config.id.0, mode = ?self.mode, "controller initialized");
    }

    /// Re-derive mode, preset and burst parameters from the live agent count.
    /// Resets the spiral counter and all velocities.
    pub(crate) fn configure_for_agents(&mut self, forced_spin: Option<SpinDirection>) {
        let mode = if self.rig.live_agents() >= AGENT_COUNT {
            Mode::Duo
        } else {
            Mode::Solo
        };
        if mode != self.mode {
            tracing::info!(unit = self.config.id.0, ?mode, "mode changed");
            self.events.push(ControllerEvent::ModeChanged { mode });
        }
        self.mode = mode;
        self.preset = self.config.presets.for_mode(mode);

        let jitter = self.preset.burst_cooldown_jitter;
        let scale = if jitter > 0.0 {
            self.rng.gen_range(1.0 - jitter..=1.0 + jitter)
        } else {
            1.0
        };
        self.cadence = BurstCadence::new(self.preset.burst_cooldown * scale);
        self.spin = forced_spin.unwrap_or_else(|| {
            if self.rng.gen_bool(0.5) {
                SpinDirection::Clockwise
            } else {
                SpinDirection::CounterClockwise
            }
        });
        self.spiral_step = 0;
        self.rig.velocity = DVec3::ZERO;
        let mask = self.preset.blocking_layers;
        for agent in self.rig.agents.iter_mut().flatten() {
            agent.velocity = DVec3::ZERO;
            agent.obstacles.set_mask(mask);
        }
    }

    /// Remove the agent spawned as `which`. When the dead agent held slot A
    /// the survivor moves into slot A, and the body moves onto the survivor.
    /// Returns false if no such agent exists.
    pub(crate) fn remove_agent(&mut self, which: Role) -> bool {
        let Some(slot) = self
            .rig
            .agents
            .iter()
            .position(|a| a.as_ref().is_some_and(|a| a.origin == which))
        else {
            return false;
        };
        self.rig.agents[slot] = None;
        if slot == Role::A.index() {
            self.rig.agents[Role::A.index()] = self.rig.agents[Role::B.index()].take();
        }
        // The survivor becomes the body; the solo pass slaves it there.
        self.rig.center_on_agents();
        self.rig.pivot_frame.position = self.rig.body.position;
        self.events.push(ControllerEvent::PartnerLost { role: which });
        true
    }

    /// Forget the orbit index and pivot re-pick schedule.
    pub(crate) fn clear_duo_bookkeeping(&mut self) {
        self.orbit.reset_index();
        self.pivot_repick_timer = 0.0;
        self.pivot_point = None;
        self.pivot_selector.reset();
    }

    /// Cancel any attack in flight. Safe to call at any time.
    pub fn force_stop_attack(&mut self) -> bool {
        self.choreographer.force_stop(&mut self.hazard, &mut self.events)
    }

    /// Physics pass: steering, choreography and velocity commit.
    /// A missing pilot skips the tick.
    pub fn fixed_update<W: WorldQuery + ?Sized>(
        &mut self,
        dt: f64,
        target: Option<&TargetState>,
        world: &W,
    ) {
        let Some(target) = target else {
            return;
        };
        if self.rig.live_agents() == 0 {
            return;
        }
        self.noise_clock += dt;
        self.choreographer.tick_cooldown(dt);

        if self.choreographer.phase() == Phase::Approach {
            self.step_approach(dt, target, world);
            return;
        }

        let preset = Arc::clone(&self.preset);
        let pivot_point = self.pivot_point.unwrap_or_else(|| target.position());
        self.step_phase(dt, target, &preset, pivot_point);
        if self.choreographer.phase() == Phase::Approach {
            // Fresh pivot after every attack.
            self.pivot_point = None;
        }
    }

    /// Pose sync pass: the pivot frame snaps to the body and secondary frames
    /// mirror its orientation. Must run after every position change of the tick.
    pub fn late_update(&mut self) {
        self.rig.pivot_frame.position = self.rig.body.position;
        match self.mode {
            Mode::Duo => {
                let rotation = self.rig.pivot_frame.rotation;
                for agent in self.rig.agents.iter_mut().flatten() {
                    agent.pose.rotation = rotation;
                }
            }
            Mode::Solo => {
                let velocity = self.rig.velocity;
                if let Some(agent) = self.rig.agents.iter_mut().flatten().next() {
                    if let Some(rotation) = look_rotation(velocity, DVec3::Y) {
                        agent.pose.rotation = rotation;
                    }
                    self.rig.body.rotation = agent.pose.rotation;
                }
            }
        }
    }

    fn step_approach<W: WorldQuery + ?Sized>(&mut self, dt: f64, target: &TargetState, world: &W) {
        let preset = Arc::clone(&self.preset);

        let pursuit_point = match self.mode {
            Mode::Solo => target.position(),
            Mode::Duo => self.update_pivot(dt, target, world, &preset),
        };

        if self.mode == Mode::Duo && self.try_begin_attack(pursuit_point, &preset) {
            self.step_phase(dt, target, &preset, pursuit_point);
            return;
        }

        let avoidance = self
            .rig
            .agents
            .iter()
            .flatten()
            .map(|a| {
                a.obstacles.avoidance_vector(
                    a.pose.position,
                    preset.detection_radius,
                    preset.avoidance_force,
                )
            })
            .sum::<DVec3>();

        let desired = compute_desired_velocity(&SteeringInput {
            position: self.rig.body.position,
            pursuit_point,
            target_distance: (target.position() - self.rig.body.position).length(),
            up_hint: DVec3::Y,
            mode: self.mode,
            preset: &preset,
            spin: self.spin,
            spiral_step: self.spiral_step,
            noise: &self.noise,
            noise_time: self.noise_clock,
            avoidance,
        });

        if self.cadence.tick(dt) {
            self.rig.velocity = desired;
            match self.mode {
                Mode::Solo => self.spiral_step = self.spiral_step.wrapping_add(1),
                Mode::Duo => self.orbit.cycle_and_jitter(
                    self.rig.body.position,
                    self.spin,
                    self.rig.pivot_frame.rotation,
                    preset.pivot_random_offset,
                    &mut self.rng,
                ),
            }
        } else {
            self.rig.velocity = decay_velocity(self.rig.velocity, preset.velocity_decay, dt);
        }

        let delta = self.rig.velocity * dt;
        self.rig.body.position += delta;

        match self.mode {
            Mode::Solo => {
                let (position, velocity) = (self.rig.body.position, self.rig.velocity);
                for agent in self.rig.agents.iter_mut().flatten() {
                    agent.pose.position = position;
                    agent.velocity = velocity;
                }
            }
            Mode::Duo => {
                self.orbit.translate(delta);
                if let Some(facing) =
                    look_rotation(target.position() - self.rig.body.position, DVec3::Y)
                {
                    self.rig.pivot_frame.rotation = rotate_towards(
                        self.rig.pivot_frame.rotation,
                        facing,
                        preset.pivot_rotation_speed * dt,
                    );
                }
                if let Some((first, second)) = self.orbit.current_assignment() {
                    let anchors = [first, second];
                    for (slot, agent) in self.rig.agents.iter_mut().enumerate() {
                        if let Some(agent) = agent {
                            agent.pose.position = move_toward_anchor(
                                agent.pose.position,
                                anchors[slot],
                                preset.pivot_move_speed,
                                dt,
                            );
                        }
                    }
                }
            }
        }
    }

    /// Advance the attack choreography one tick. The orbit ring rides along
    /// with whatever the phase does to the body.
    fn step_phase(&mut self, dt: f64, target: &TargetState, preset: &Preset, pivot_point: DVec3) {
        let before = self.rig.body.position;
        let ctx = PhaseContext {
            dt,
            target,
            preset,
            pivot_point,
            indestructible_contacts: self.indestructible_contacts(),
        };
        self.choreographer
            .step(&mut self.rig, &ctx, &mut self.hazard, &mut self.rng, &mut self.events);
        self.orbit.translate(self.rig.body.position - before);
    }

    /// Re-pick the pivot on the interval, otherwise re-evaluate the
    /// remembered direction against the pilot's current pose.
    fn update_pivot<W: WorldQuery + ?Sized>(
        &mut self,
        dt: f64,
        target: &TargetState,
        world: &W,
        preset: &Preset,
    ) -> DVec3 {
        self.pivot_repick_timer += dt;
        let point = if self.pivot_point.is_none()
            || self.pivot_repick_timer >= preset.pivot_repick_interval
        {
            self.pivot_repick_timer = 0.0;
            let choice = self
                .pivot_selector
                .choose_pivot(target, world, preset, &mut self.rng);
            self.events.push(ControllerEvent::PivotChosen {
                index: choice.index,
            });
            choice.point
        } else {
            self.pivot_selector.current_point(target, preset)
        };
        self.pivot_point = Some(point);
        point
    }

    fn try_begin_attack(&mut self, pivot: DVec3, preset: &Preset) -> bool {
        if !self.attacks_allowed
            || !self.choreographer.attack_permitted()
            || self.rig.live_agents() < AGENT_COUNT
        {
            return false;
        }
        let offset = pivot - self.rig.body.position;
        let distance = offset.length();
        if distance < preset.min_burst_distance || distance > preset.max_burst_distance {
            return false;
        }
        self.choreographer.begin_burst(offset, &mut self.events)
    }

    fn indestructible_contacts(&self) -> usize {
        self.rig
            .agents
            .iter()
            .flatten()
            .map(|a| a.obstacles.indestructible_count())
            .sum()
    }

    // --- Collaborator entry points ---

    /// Proximity trigger of `which` agent started overlapping a collider.
    pub fn obstacle_entered(&mut self, which: Role, collider: &ColliderInfo) -> bool {
        self.agent_mut(which)
            .is_some_and(|a| a.obstacles.on_enter(collider))
    }

    /// Proximity trigger of `which` agent stopped overlapping a collider.
    pub fn obstacle_exited(&mut self, which: Role, collider: ColliderId) -> bool {
        self.agent_mut(which)
            .is_some_and(|a| a.obstacles.on_exit(collider))
    }

    /// The hazard destroyed something during an attack.
    pub fn register_collision_kill(&mut self) {
        self.choreographer.register_collision_kill();
    }

    /// Arena-level veto on starting new attacks.
    pub fn set_attacks_allowed(&mut self, allowed: bool) {
        self.attacks_allowed = allowed;
    }

    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Read-only status ---

    pub fn id(&self) -> UnitId {
        self.config.id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.choreographer.phase()
    }

    pub fn is_attacking(&self) -> bool {
        self.choreographer.is_attacking()
    }

    pub fn live_agent_count(&self) -> usize {
        self.rig.live_agents()
    }

    pub fn is_alive(&self) -> bool {
        self.rig.live_agents() > 0
    }

    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            mode: self.mode,
            phase: self.phase(),
            is_attacking: self.is_attacking(),
            live_agents: self.rig.live_agents(),
        }
    }

    pub fn preset(&self) -> &Arc<Preset> {
        &self.preset
    }

    pub fn choreographer(&self) -> &Choreographer {
        &self.choreographer
    }

    pub fn hazard_active(&self) -> bool {
        self.hazard.is_active()
    }

    pub fn rig(&self) -> &Rig {
        &self.rig
    }

    pub fn agent(&self, slot: Role) -> Option<&Agent> {
        self.rig.agents[slot.index()].as_ref()
    }

    /// The agent spawned as `which`, wherever it sits now.
    pub fn agent_by_origin(&self, which: Role) -> Option<&Agent> {
        self.rig.agents.iter().flatten().find(|a| a.origin == which)
    }

    fn agent_mut(&mut self, which: Role) -> Option<&mut Agent> {
        self.rig.agents.iter_mut().flatten().find(|a| a.origin == which)
    }

    pub fn pivot_point(&self) -> Option<DVec3> {
        self.pivot_point
    }

    pub fn orbit(&self) -> &OrbitRing {
        &self.orbit
    }

    pub fn noise(&self) -> &ChaosNoise {
        &self.noise
    }

    pub fn spin(&self) -> SpinDirection {
        self.spin
    }

    pub fn spiral_step(&self) -> u32 {
        self.spiral_step
    }

    pub fn burst_cooldown(&self) -> f64 {
        self.cadence.cooldown()
    }

    pub fn pivot_repick_timer(&self) -> f64 {
        self.pivot_repick_timer
    }
}
