//! Controller-level tests: choreography, partner loss, reuse and death.

use std::cell::Cell;
use std::rc::Rc;

use glam::DVec3;

use skyram_core::constants::{DT, LAYER_OBSTACLE};
use skyram_core::enums::{Mode, ObstacleKind, Phase, Role, SpinDirection};
use skyram_core::events::{ControllerEvent, StopReason};
use skyram_core::health::Health;
use skyram_core::preset::{Preset, PresetSet};
use skyram_core::types::Pose;
use skyram_core::world::{
    ColliderId, ColliderInfo, EmptyWorld, Hazard, NullHazard, TargetState, UnitId,
};

use crate::choreographer::Choreographer;
use crate::controller::{ControllerConfig, RamController, Spawn};
use crate::death::DeathAggregator;

/// Hazard whose state the test can read back.
struct SharedHazard(Rc<Cell<bool>>);

impl Hazard for SharedHazard {
    fn set_active(&mut self, active: bool) {
        self.0.set(active);
    }
}

/// Duo pivots sit exactly on the pilot so distances are easy to reason about.
fn presets() -> PresetSet {
    let duo = Preset {
        pivot_distance: 0.0,
        pivot_forward_push: 0.0,
        pivot_height_offset: 0.0,
        ..Preset::duo()
    };
    PresetSet::new(Preset::solo(), duo).unwrap()
}

fn spawn(agent_count: usize) -> Spawn {
    Spawn {
        pose: Pose::default(),
        agent_count,
        seed: 7,
        spin: None,
    }
}

fn controller(agent_count: usize) -> RamController {
    RamController::new(
        ControllerConfig {
            id: UnitId(1),
            presets: presets(),
        },
        Box::new(NullHazard::default()),
        spawn(agent_count),
    )
}

/// Pilot 60 m ahead of the spawn point.
fn pilot() -> TargetState {
    TargetState::stationary(DVec3::new(0.0, 0.0, 60.0))
}

fn tick(c: &mut RamController, target: &TargetState) {
    c.fixed_update(DT, Some(target), &EmptyWorld);
    c.late_update();
}

fn run_until(c: &mut RamController, target: &TargetState, phase: Phase) -> bool {
    for _ in 0..10_000 {
        if c.phase() == phase {
            return true;
        }
        tick(c, target);
    }
    c.phase() == phase
}

fn rock(id: u64) -> ColliderInfo {
    ColliderInfo {
        id: ColliderId(id),
        layer: LAYER_OBSTACLE,
        is_trigger: false,
        kind: ObstacleKind::Indestructible,
        center: DVec3::new(100.0, 0.0, 0.0),
        radius: 1.0,
    }
}

// ---- Choreography ----

#[test]
fn test_duo_enters_burst_when_pivot_in_band() {
    let mut c = controller(2);
    assert_eq!(c.mode(), Mode::Duo);
    assert_eq!(c.phase(), Phase::Approach);
    tick(&mut c, &pilot());
    assert_eq!(c.phase(), Phase::Burst);
    assert!(c.is_attacking());
}

#[test]
fn test_duo_stays_in_approach_out_of_band() {
    let mut c = controller(2);
    let far = TargetState::stationary(DVec3::new(0.0, 0.0, 500.0));
    tick(&mut c, &far);
    assert_eq!(c.phase(), Phase::Approach);
}

#[test]
fn test_attack_veto_keeps_approach() {
    let mut c = controller(2);
    c.set_attacks_allowed(false);
    for _ in 0..50 {
        tick(&mut c, &pilot());
    }
    assert_eq!(c.phase(), Phase::Approach);
}

#[test]
fn test_duo_reaches_resolved_through_every_phase() {
    let mut c = controller(2);
    let target = pilot();
    let mut seen = vec![c.phase()];
    for _ in 0..10_000 {
        tick(&mut c, &target);
        if *seen.last().unwrap() != c.phase() {
            seen.push(c.phase());
        }
        if c.phase() == Phase::Resolved {
            break;
        }
    }
    assert_eq!(
        seen,
        vec![
            Phase::Approach,
            Phase::Burst,
            Phase::AlignToPivot,
            Phase::AlignToAnchors,
            Phase::Attacking,
            Phase::Resolved,
        ]
    );
    assert!(!c.hazard_active());

    tick(&mut c, &target);
    assert_eq!(c.phase(), Phase::Approach);
    assert!(c.choreographer().cooldown_remaining() > 0.0);
    // The cooldown holds the next attack back even though the pilot is in band.
    tick(&mut c, &target);
    assert_eq!(c.phase(), Phase::Approach);
}

#[test]
fn test_hazard_active_only_after_alignment() {
    let flag = Rc::new(Cell::new(false));
    let mut c = RamController::new(
        ControllerConfig {
            id: UnitId(2),
            presets: presets(),
        },
        Box::new(SharedHazard(Rc::clone(&flag))),
        spawn(2),
    );
    let target = pilot();
    assert!(run_until(&mut c, &target, Phase::AlignToPivot));
    assert!(!flag.get());
    assert!(run_until(&mut c, &target, Phase::AlignToAnchors));
    assert!(flag.get());
    assert!(c.hazard_active());
    assert!(run_until(&mut c, &target, Phase::Resolved));
    assert!(!flag.get());
}

#[test]
fn test_alignment_puts_agents_on_barrier_anchors() {
    let mut c = controller(2);
    let target = pilot();
    assert!(run_until(&mut c, &target, Phase::AlignToAnchors));
    let half = c.preset().barrier_half_width;
    let a = c.agent(Role::A).unwrap().pose.position;
    let b = c.agent(Role::B).unwrap().pose.position;
    assert!(((a - b).length() - 2.0 * half).abs() < 1e-6);
}

#[test]
fn test_anchor_swap_moves_slot_a_to_the_right() {
    let target = pilot();
    let mut seen = [false; 2];
    for seed in 0..20 {
        let mut c = RamController::new(
            ControllerConfig {
                id: UnitId(1),
                presets: presets(),
            },
            Box::new(NullHazard::default()),
            Spawn { seed, ..spawn(2) },
        );
        assert!(run_until(&mut c, &target, Phase::AlignToAnchors));
        let frame = c.rig().pivot_frame;
        let side = (c.agent(Role::A).unwrap().pose.position - frame.position).dot(frame.right());
        let swapped = c.choreographer().anchors_swapped();
        assert_eq!(side > 0.0, swapped, "seed {seed}: side {side}");
        let left = if swapped { Role::B } else { Role::A };
        assert_eq!(c.choreographer().left_slot(), left);
        seen[usize::from(swapped)] = true;
    }
    assert!(seen[0] && seen[1], "both anchor orders should occur");
}

#[test]
fn test_orbit_ring_follows_body_through_attack() {
    let mut c = controller(2);
    let target = pilot();
    assert!(run_until(&mut c, &target, Phase::Resolved));
    tick(&mut c, &target);
    assert_eq!(c.phase(), Phase::Approach);

    let before = [Role::A, Role::B].map(|r| c.agent(r).unwrap().pose.position);
    tick(&mut c, &target);
    let preset = Preset::clone(c.preset());
    let body = c.rig().body.position;
    let reach = preset.orbit_radius + 2.0 * preset.pivot_random_offset;
    for anchor in c.orbit().positions() {
        let distance = (*anchor - body).length();
        assert!(distance <= reach + 1e-6, "anchor {distance} m from body");
    }
    for (slot, role) in [Role::A, Role::B].into_iter().enumerate() {
        let step = (c.agent(role).unwrap().pose.position - before[slot]).length();
        assert!(step <= preset.max_speed * DT, "{role:?} moved {step} in one tick");
    }
}

#[test]
fn test_premature_stop_on_indestructible_contact() {
    let mut c = controller(2);
    let target = pilot();
    assert!(run_until(&mut c, &target, Phase::Attacking));
    assert!(c.hazard_active());
    c.drain_events();

    assert!(c.obstacle_entered(Role::A, &rock(9)));
    tick(&mut c, &target);

    assert_eq!(c.phase(), Phase::Resolved);
    assert!(!c.hazard_active());
    let events = c.drain_events();
    assert!(events.contains(&ControllerEvent::PrematureStop {
        reason: StopReason::IndestructibleContact
    }));
}

#[test]
fn test_premature_stop_on_collision_kill_cap() {
    let mut c = controller(2);
    let target = pilot();
    assert!(run_until(&mut c, &target, Phase::Attacking));
    let cap = c.preset().max_collision_kills;
    for _ in 0..cap {
        c.register_collision_kill();
    }
    assert_eq!(c.choreographer().collision_kills(), cap);
    tick(&mut c, &target);
    assert_eq!(c.phase(), Phase::Resolved);
    assert!(c
        .drain_events()
        .contains(&ControllerEvent::PrematureStop {
            reason: StopReason::CollisionKillCap
        }));
}

#[test]
fn test_force_stop_is_symmetric_across_phases() {
    let phases = [
        Phase::Burst,
        Phase::AlignToPivot,
        Phase::AlignToAnchors,
        Phase::Attacking,
        Phase::Resolved,
    ];
    for phase in phases {
        let mut c = controller(2);
        assert!(run_until(&mut c, &pilot(), phase), "never reached {phase:?}");
        assert!(c.force_stop_attack());
        assert_eq!(*c.choreographer(), Choreographer::default(), "after {phase:?}");
        assert!(!c.hazard_active());
        assert_eq!(c.phase(), Phase::Approach);
    }
}

#[test]
fn test_force_stop_when_idle_is_noop() {
    let mut c = controller(2);
    assert!(!c.force_stop_attack());
    assert!(c.drain_events().is_empty());
    assert_eq!(*c.choreographer(), Choreographer::default());
}

#[test]
fn test_missing_target_skips_tick() {
    let mut c = controller(2);
    let before = c.rig().clone();
    for _ in 0..10 {
        c.fixed_update(DT, None, &EmptyWorld);
    }
    assert_eq!(*c.rig(), before);
    assert_eq!(c.phase(), Phase::Approach);
}

// ---- Steering through the controller ----

#[test]
fn test_solo_never_leaves_approach_and_spirals() {
    let mut c = controller(1);
    assert_eq!(c.mode(), Mode::Solo);
    let target = pilot();
    let max_speed = c.preset().max_speed;
    for _ in 0..500 {
        tick(&mut c, &target);
        assert_eq!(c.phase(), Phase::Approach);
        assert!(c.rig().velocity.length() <= max_speed + 1e-9);
    }
    assert!(c.spiral_step() > 0);
    let agent = c.agent(Role::A).unwrap();
    assert_eq!(agent.pose.position, c.rig().body.position);
}

#[test]
fn test_solo_closes_on_pilot() {
    let mut c = controller(1);
    let target = TargetState::stationary(DVec3::new(0.0, 0.0, 400.0));
    let start = (target.position() - c.rig().body.position).length();
    for _ in 0..250 {
        tick(&mut c, &target);
    }
    let end = (target.position() - c.rig().body.position).length();
    assert!(end < start, "solo agent should close distance: {start} -> {end}");
}

#[test]
fn test_duo_orbit_cycles_on_burst_commits() {
    let mut c = controller(2);
    c.set_attacks_allowed(false);
    let target = TargetState::stationary(DVec3::new(0.0, 0.0, 300.0));
    let ticks = (c.burst_cooldown() / DT).ceil() as usize + 1;
    for _ in 0..ticks {
        tick(&mut c, &target);
    }
    let expected = match c.spin() {
        SpinDirection::Clockwise => 1,
        SpinDirection::CounterClockwise => c.orbit().len() - 1,
    };
    assert_eq!(c.orbit().index(), expected);
}

#[test]
fn test_velocity_decays_between_burst_commits() {
    let mut c = controller(1);
    let target = TargetState::stationary(DVec3::new(0.0, 0.0, 400.0));
    for _ in 0..10_000 {
        if c.rig().velocity != DVec3::ZERO {
            break;
        }
        tick(&mut c, &target);
    }
    let committed = c.rig().velocity;
    assert!(committed.length() > 0.0);

    let decay = (-c.preset().velocity_decay * DT).exp();
    let quiet = (c.burst_cooldown() / DT).floor() as usize - 2;
    let mut prev = committed;
    for _ in 0..quiet {
        tick(&mut c, &target);
        let v = c.rig().velocity;
        assert!((v - prev * decay).length() < 1e-9);
        prev = v;
    }
    assert!(prev.length() < committed.length());
}

fn pivot_picks(c: &mut RamController) -> usize {
    c.drain_events()
        .iter()
        .filter(|e| matches!(e, ControllerEvent::PivotChosen { .. }))
        .count()
}

#[test]
fn test_pivot_repicks_on_interval_and_tracks_pilot_between() {
    let mut c = controller(2);
    c.set_attacks_allowed(false);
    let interval = c.preset().pivot_repick_interval;

    let target = TargetState::stationary(DVec3::new(0.0, 0.0, 300.0));
    tick(&mut c, &target);
    assert_eq!(pivot_picks(&mut c), 1);

    // Between re-picks the remembered direction is re-evaluated against
    // the pilot's new position.
    let moved = TargetState::stationary(DVec3::new(10.0, 0.0, 300.0));
    tick(&mut c, &moved);
    assert_eq!(pivot_picks(&mut c), 0);
    assert_eq!(c.pivot_point(), Some(moved.position()));

    let ticks = (interval / DT).ceil() as usize + 1;
    let mut total = 0;
    for _ in 0..ticks {
        tick(&mut c, &moved);
        total += pivot_picks(&mut c);
    }
    assert_eq!(total, 1);
}

#[test]
fn test_late_update_puts_pivot_frame_on_body() {
    let mut c = controller(2);
    c.set_attacks_allowed(false);
    let target = TargetState::stationary(DVec3::new(0.0, 0.0, 300.0));
    for _ in 0..10_000 {
        c.fixed_update(DT, Some(&target), &EmptyWorld);
        if c.rig().pivot_frame.position != c.rig().body.position {
            break;
        }
        c.late_update();
    }
    assert_ne!(c.rig().pivot_frame.position, c.rig().body.position);

    c.late_update();
    assert_eq!(c.rig().pivot_frame.position, c.rig().body.position);
    let rotation = c.rig().pivot_frame.rotation;
    for agent in c.rig().agents.iter().flatten() {
        assert_eq!(agent.pose.rotation, rotation);
    }
}

// ---- Partner loss ----

#[test]
fn test_partner_loss_promotes_survivor_to_solo() {
    let mut c = controller(2);
    assert!(c.handle_partner_death(Role::A));
    assert_eq!(c.mode(), Mode::Solo);
    let survivor = c.agent(Role::A).unwrap();
    assert_eq!(survivor.origin, Role::B);
    assert!(c.agent(Role::B).is_none());
    assert_eq!(**c.preset(), Preset::solo());
    assert_eq!(c.spiral_step(), 0);
    assert_eq!(c.orbit().index(), 0);
    assert_eq!(c.pivot_point(), None);

    let target = pilot();
    for _ in 0..2_000 {
        tick(&mut c, &target);
        assert!(!c.phase().is_duo_only());
        assert_eq!(c.phase(), Phase::Approach);
    }
}

#[test]
fn test_survivor_position_is_continuous_across_partner_loss() {
    let mut c = controller(2);
    c.set_attacks_allowed(false);
    let target = TargetState::stationary(DVec3::new(0.0, 0.0, 300.0));
    for _ in 0..30 {
        tick(&mut c, &target);
    }
    let before = c.agent_by_origin(Role::B).unwrap().pose.position;
    assert!((before - c.rig().body.position).length() > 1.0);

    assert!(c.handle_partner_death(Role::A));
    assert_eq!(c.rig().body.position, before);
    assert_eq!(c.rig().pivot_frame.position, before);

    tick(&mut c, &target);
    let after = c.agent(Role::A).unwrap().pose.position;
    let limit = c.preset().max_speed * DT;
    assert!((after - before).length() <= limit + 1e-9);
}

#[test]
fn test_partner_loss_mid_attack_aborts() {
    let mut c = controller(2);
    let target = pilot();
    assert!(run_until(&mut c, &target, Phase::Attacking));
    assert!(c.handle_partner_death(Role::B));
    assert_eq!(c.phase(), Phase::Approach);
    assert!(!c.hazard_active());
    assert_eq!(c.mode(), Mode::Solo);
    assert_eq!(c.agent(Role::A).unwrap().origin, Role::A);
    assert_eq!(c.rig().velocity, DVec3::ZERO);
}

#[test]
fn test_partner_loss_reports_are_idempotent() {
    let mut c = controller(2);
    assert!(c.handle_partner_death(Role::A));
    assert!(!c.handle_partner_death(Role::A));
    assert!(c.is_alive());
    assert!(c.handle_partner_death(Role::B));
    assert!(!c.is_alive());
    // An empty controller ignores ticks.
    let before = c.rig().clone();
    tick(&mut c, &pilot());
    assert_eq!(*c.rig(), before);
}

#[test]
fn test_obstacle_notifications_follow_promoted_agent() {
    let mut c = controller(2);
    c.handle_partner_death(Role::A);
    assert!(!c.obstacle_entered(Role::A, &rock(1)));
    assert!(c.obstacle_entered(Role::B, &rock(1)));
    assert!(!c.obstacle_entered(Role::B, &rock(1)));
    assert!(c.obstacle_exited(Role::B, ColliderId(1)));
}

// ---- Pool reuse ----

#[test]
fn test_reinitialized_controller_matches_fresh_one() {
    let target = pilot();
    let mut reused = controller(2);
    assert!(run_until(&mut reused, &target, Phase::Attacking));
    reused.obstacle_entered(Role::A, &rock(3));
    reused.handle_partner_death(Role::B);
    for _ in 0..100 {
        tick(&mut reused, &target);
    }

    reused.reinitialize(spawn(2));
    let mut fresh = controller(2);

    assert_eq!(reused.mode(), fresh.mode());
    assert_eq!(*reused.rig(), *fresh.rig());
    assert_eq!(*reused.choreographer(), *fresh.choreographer());
    assert_eq!(reused.spin(), fresh.spin());
    assert_eq!(reused.burst_cooldown(), fresh.burst_cooldown());
    assert_eq!(*reused.orbit(), *fresh.orbit());
    assert!(!reused.hazard_active());

    for _ in 0..400 {
        tick(&mut reused, &target);
        tick(&mut fresh, &target);
        assert_eq!(*reused.rig(), *fresh.rig());
        assert_eq!(reused.phase(), fresh.phase());
    }
}

#[test]
fn test_chaos_noise_follows_spawn_seed() {
    let mut c = controller(2);
    let first = *c.noise();
    c.reinitialize(Spawn { seed: 8, ..spawn(2) });
    assert_ne!(*c.noise(), first);
    c.reinitialize(spawn(2));
    assert_eq!(*c.noise(), first);
}

#[test]
fn test_forced_spin_is_honored() {
    let c = RamController::new(
        ControllerConfig {
            id: UnitId(3),
            presets: presets(),
        },
        Box::new(NullHazard::default()),
        Spawn {
            spin: Some(SpinDirection::CounterClockwise),
            ..spawn(1)
        },
    );
    assert_eq!(c.spin(), SpinDirection::CounterClockwise);
}

// ---- Death aggregation ----

#[test]
fn test_death_aggregation_fires_once_in_any_order() {
    for order in [[Role::A, Role::B], [Role::B, Role::A]] {
        let mut shell = Health::with_god_mode(1.0);
        let mut agg = DeathAggregator::new();
        assert!(!agg.on_sub_unit_died(order[0], &mut shell));
        assert!(!shell.is_dead());
        assert!(agg.on_sub_unit_died(order[1], &mut shell));
        assert!(shell.is_dead());
        assert!(!agg.on_sub_unit_died(order[1], &mut shell));
        assert!(agg.has_fired());
    }
}

#[test]
fn test_death_aggregation_simultaneous_reports() {
    let mut shell = Health::with_god_mode(1.0);
    let mut agg = DeathAggregator::new();
    agg.record_death(Role::A);
    agg.record_death(Role::B);
    let fired = [agg.evaluate(&mut shell), agg.evaluate(&mut shell)];
    assert_eq!(fired, [true, false]);
    assert!(shell.is_dead());
}

#[test]
fn test_death_aggregation_ignores_duplicates_and_revivals() {
    let mut shell = Health::with_god_mode(1.0);
    let mut agg = DeathAggregator::new();
    agg.on_sub_unit_died(Role::A, &mut shell);
    agg.on_sub_unit_died(Role::A, &mut shell);
    assert_eq!(agg.dead_count(), 1);
    agg.record_revival(Role::A);
    assert!(!agg.on_sub_unit_died(Role::B, &mut shell));
    assert!(!shell.is_dead());
    agg.reset();
    assert_eq!(agg, DeathAggregator::default());
}
