#[cfg(test)]
mod tests {
    use glam::DVec3;

    use crate::enums::*;
    use crate::events::ControllerEvent;
    use crate::health::{Health, HealthEvent, HealthListener};
    use crate::preset::{Preset, PresetError, PresetSet};
    use crate::types::{look_rotation, rotate_towards, Pose};
    use crate::world::{LayerMask, UnitId};

    fn listener() -> HealthListener {
        HealthListener::DeathAggregator {
            unit: UnitId(7),
            role: Role::A,
        }
    }

    #[test]
    fn test_pose_axes_follow_convention() {
        let pose = Pose::default();
        assert_eq!(pose.forward(), DVec3::Z);
        assert_eq!(pose.right(), DVec3::X);
        assert_eq!(pose.up(), DVec3::Y);
    }

    #[test]
    fn test_look_rotation_points_forward() {
        let dir = DVec3::new(1.0, 2.0, -3.0).normalize();
        let rot = look_rotation(dir, DVec3::Y).unwrap();
        assert!((rot * DVec3::Z - dir).length() < 1e-9);
        // Straight up is degenerate against the up hint but still resolves.
        let up_rot = look_rotation(DVec3::Y, DVec3::Y).unwrap();
        assert!((up_rot * DVec3::Z - DVec3::Y).length() < 1e-9);
        assert!(look_rotation(DVec3::ZERO, DVec3::Y).is_none());
    }

    #[test]
    fn test_rotate_towards_limits_angle() {
        let from = look_rotation(DVec3::Z, DVec3::Y).unwrap();
        let to = look_rotation(DVec3::X, DVec3::Y).unwrap();
        let step = rotate_towards(from, to, 0.1);
        assert!((from.angle_between(step) - 0.1).abs() < 1e-9);
        assert_eq!(rotate_towards(from, to, 10.0), to);
    }

    #[test]
    fn test_role_slots() {
        assert_eq!(Role::A.index(), 0);
        assert_eq!(Role::B.index(), 1);
        assert_eq!(Role::A.other(), Role::B);
    }

    #[test]
    fn test_duo_only_phases() {
        assert!(Phase::Attacking.is_duo_only());
        assert!(Phase::AlignToAnchors.is_duo_only());
        assert!(!Phase::Approach.is_duo_only());
        assert!(Phase::Resolved.is_duo_only());
        assert!(!Phase::Approach.is_attack_sequence());
        assert!(Phase::Burst.is_attack_sequence());
        assert!(!Phase::Resolved.is_attack_sequence());
    }

    #[test]
    fn test_layer_mask() {
        let mask = LayerMask::layer(1).with(3);
        assert!(mask.contains(1));
        assert!(mask.contains(3));
        assert!(!mask.contains(2));
        assert!(!LayerMask::NONE.contains(0));
        assert!(!LayerMask::layer(40).contains(8));
    }

    #[test]
    fn test_health_died_fires_once() {
        let mut health = Health::new(10.0);
        health.subscribe(listener());
        health.subscribe(listener());
        assert!(health.take_damage(15.0));
        assert!(!health.take_damage(5.0));
        assert!(!health.instantly_die());
        let notes = health.drain_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].event, HealthEvent::Died);
        assert!(health.drain_notifications().is_empty());
    }

    #[test]
    fn test_health_revive_rearms_death() {
        let mut health = Health::new(10.0);
        health.subscribe(listener());
        health.instantly_die();
        health.heal(4.0);
        assert!(!health.is_dead());
        assert_eq!(health.hit_points(), 4.0);
        assert!(health.instantly_die());
        let events: Vec<_> = health
            .drain_notifications()
            .into_iter()
            .map(|n| n.event)
            .collect();
        assert_eq!(
            events,
            vec![HealthEvent::Died, HealthEvent::Revived, HealthEvent::Died]
        );
    }

    #[test]
    fn test_health_protection_levels() {
        let mut shell = Health::with_god_mode(1.0);
        assert!(!shell.take_damage(100.0));
        assert!(!shell.instantly_die());
        assert!(!shell.forcibly_die());
        assert!(shell.forcibly_die_ignoring_invulnerability());
        assert!(shell.is_dead());

        let mut agent = Health::new(1.0);
        agent.invulnerable = true;
        assert!(!agent.instantly_die());
        assert!(agent.forcibly_die());
    }

    #[test]
    fn test_health_reset_keeps_listeners() {
        let mut health = Health::new(3.0);
        health.subscribe(listener());
        health.instantly_die();
        health.reset();
        assert!(health.drain_notifications().is_empty());
        assert_eq!(health.hit_points(), 3.0);
        health.instantly_die();
        assert_eq!(health.drain_notifications().len(), 1);
    }

    #[test]
    fn test_default_presets_validate() {
        assert!(Preset::solo().validate().is_ok());
        assert!(Preset::duo().validate().is_ok());
        let set = PresetSet::default();
        assert_eq!(*set.for_mode(Mode::Duo), Preset::duo());
    }

    #[test]
    fn test_preset_rejects_inverted_burst_band() {
        let preset = Preset {
            min_burst_distance: 80.0,
            max_burst_distance: 70.0,
            ..Preset::duo()
        };
        match preset.validate() {
            Err(PresetError::Invalid { field, .. }) => assert_eq!(field, "min_burst_distance"),
            other => panic!("expected invalid band, got {other:?}"),
        }
    }

    #[test]
    fn test_preset_rejects_odd_ring() {
        let preset = Preset {
            orbit_ring_size: 5,
            ..Preset::duo()
        };
        assert!(preset.validate().is_err());
    }

    #[test]
    fn test_preset_set_from_json() {
        let json = serde_json::json!({
            "solo": Preset::solo(),
            "duo": Preset { max_speed: 99.0, ..Preset::duo() },
        })
        .to_string();
        let set = PresetSet::from_json(&json).unwrap();
        assert_eq!(set.duo.max_speed, 99.0);

        assert!(matches!(
            PresetSet::from_json("{\"solo\": 1}"),
            Err(PresetError::Parse(_))
        ));
    }

    #[test]
    fn test_controller_event_tagged_json() {
        let event = ControllerEvent::PhaseChanged {
            from: Phase::Approach,
            to: Phase::Burst,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"PhaseChanged\""));
        let back: ControllerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
