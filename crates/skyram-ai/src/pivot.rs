//! Attack anchor selection around the pilot.
//!
//! Five candidate directions are built from the pilot's view basis. A
//! candidate is usable when a probe from it back to the pilot is clear (or
//! only hits the pilot). Once a direction is picked it is remembered, so
//! later ticks re-evaluate the same relative direction instead of jumping.

use glam::DVec3;
use rand::Rng;

use skyram_core::constants::{LAYER_PILOT, PIVOT_CANDIDATE_COUNT, PIVOT_TOP_INDEX, STATIONARY_SPEED};
use skyram_core::preset::Preset;
use skyram_core::world::{LayerMask, TargetState, WorldQuery};

/// Result of a pivot pick. `index` is `None` for the fallback point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotChoice {
    pub point: DVec3,
    pub index: Option<usize>,
}

/// Remembers the last chosen candidate direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PivotSelector {
    remembered: Option<usize>,
}

/// View-forward, view-right, -view-right, up, -up.
pub fn candidate_directions(target: &TargetState) -> [DVec3; PIVOT_CANDIDATE_COUNT] {
    let up = target.pose.up();
    [
        target.view.forward,
        target.view.right,
        -target.view.right,
        up,
        -up,
    ]
}

/// Direction the pilot is flying, or where it is looking when nearly still.
pub fn movement_heading(target: &TargetState) -> DVec3 {
    if target.velocity.length() > STATIONARY_SPEED {
        target.velocity.normalize_or_zero()
    } else {
        target.view.forward.normalize_or_zero()
    }
}

/// Candidate point for one direction: out by `pivot_distance`, pushed along
/// the heading, then lifted.
pub fn candidate_point(target: &TargetState, direction: DVec3, preset: &Preset) -> DVec3 {
    target.position()
        + direction.normalize_or_zero() * preset.pivot_distance
        + movement_heading(target) * preset.pivot_forward_push
        + DVec3::Y * preset.pivot_height_offset
}

/// The point directly ahead of the pilot, used when nothing has line-of-sight.
pub fn fallback_point(target: &TargetState, preset: &Preset) -> DVec3 {
    target.position()
        + movement_heading(target) * preset.pivot_forward_push
        + DVec3::Y * preset.pivot_height_offset
}

/// True when a probe from `from` toward the pilot is clear or first hits
/// one of the pilot's own colliders.
pub fn has_line_of_sight<W: WorldQuery + ?Sized>(
    world: &W,
    from: DVec3,
    target: DVec3,
    mask: LayerMask,
) -> bool {
    let offset = target - from;
    let Some(direction) = offset.try_normalize() else {
        return true;
    };
    match world.raycast(from, direction, offset.length(), mask.with(LAYER_PILOT)) {
        None => true,
        Some(hit) => hit.belongs_to_target,
    }
}

impl PivotSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The remembered candidate index, if any.
    pub fn remembered(&self) -> Option<usize> {
        self.remembered
    }

    pub fn reset(&mut self) {
        self.remembered = None;
    }

    /// Pick uniformly among candidates with line-of-sight and remember it.
    /// Grounded pilots get the top candidate when it is visible.
    pub fn choose_pivot<W, R>(
        &mut self,
        target: &TargetState,
        world: &W,
        preset: &Preset,
        rng: &mut R,
    ) -> PivotChoice
    where
        W: WorldQuery + ?Sized,
        R: Rng,
    {
        let directions = candidate_directions(target);
        let mut valid = [0usize; PIVOT_CANDIDATE_COUNT];
        let mut count = 0;
        for (index, direction) in directions.iter().enumerate() {
            let point = candidate_point(target, *direction, preset);
            if has_line_of_sight(world, point, target.position(), preset.line_of_sight_layers) {
                valid[count] = index;
                count += 1;
            }
        }

        let chosen = if count == 0 {
            None
        } else if target.grounded && valid[..count].contains(&PIVOT_TOP_INDEX) {
            Some(PIVOT_TOP_INDEX)
        } else {
            Some(valid[rng.gen_range(0..count)])
        };

        self.remembered = chosen;
        match chosen {
            Some(index) => {
                tracing::debug!(index, candidates = count, "pivot chosen");
                PivotChoice {
                    point: candidate_point(target, directions[index], preset),
                    index: Some(index),
                }
            }
            None => {
                tracing::warn!("no pivot candidate has line of sight, using fallback");
                PivotChoice {
                    point: fallback_point(target, preset),
                    index: None,
                }
            }
        }
    }

    /// Recompute the point for a candidate index against the pilot's current
    /// pose. Grounded pilots always get the top candidate.
    pub fn reevaluate_pivot(
        &self,
        target: &TargetState,
        preset: &Preset,
        index: Option<usize>,
    ) -> DVec3 {
        let index = if target.grounded {
            Some(PIVOT_TOP_INDEX)
        } else {
            index
        };
        match index {
            Some(i) if i < PIVOT_CANDIDATE_COUNT => {
                candidate_point(target, candidate_directions(target)[i], preset)
            }
            _ => fallback_point(target, preset),
        }
    }

    /// Re-evaluate the remembered direction.
    pub fn current_point(&self, target: &TargetState, preset: &Preset) -> DVec3 {
        self.reevaluate_pivot(target, preset, self.remembered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use skyram_core::world::{ColliderId, EmptyWorld, RayHit};

    /// Blocks every probe whose origin is not in `open`.
    struct Walls {
        open: Vec<DVec3>,
        hit_target: bool,
    }

    impl WorldQuery for Walls {
        fn raycast(&self, origin: DVec3, _: DVec3, max: f64, _: LayerMask) -> Option<RayHit> {
            if self.open.iter().any(|p| (*p - origin).length() < 1e-6) {
                return None;
            }
            Some(RayHit {
                collider: ColliderId(1),
                distance: max * 0.5,
                belongs_to_target: self.hit_target,
            })
        }
    }

    fn preset() -> Preset {
        Preset {
            pivot_distance: 30.0,
            pivot_forward_push: 10.0,
            pivot_height_offset: 5.0,
            ..Preset::duo()
        }
    }

    #[test]
    fn test_fallback_when_all_blocked() {
        let target = TargetState::stationary(DVec3::new(0.0, 10.0, 0.0));
        let world = Walls {
            open: Vec::new(),
            hit_target: false,
        };
        let mut selector = PivotSelector::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let choice = selector.choose_pivot(&target, &world, &preset(), &mut rng);
        assert_eq!(choice.index, None);
        assert_eq!(choice.point, DVec3::new(0.0, 15.0, 10.0));
        assert_eq!(selector.remembered(), None);
    }

    #[test]
    fn test_hitting_target_counts_as_visible() {
        let target = TargetState::stationary(DVec3::ZERO);
        let world = Walls {
            open: Vec::new(),
            hit_target: true,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let choice = PivotSelector::new().choose_pivot(&target, &world, &preset(), &mut rng);
        assert!(choice.index.is_some());
    }

    #[test]
    fn test_only_visible_candidate_is_chosen() {
        let target = TargetState::stationary(DVec3::ZERO);
        let p = preset();
        let right = candidate_point(&target, DVec3::X, &p);
        let world = Walls {
            open: vec![right],
            hit_target: false,
        };
        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let choice = PivotSelector::new().choose_pivot(&target, &world, &p, &mut rng);
            assert_eq!(choice.index, Some(1));
            assert_eq!(choice.point, right);
        }
    }

    #[test]
    fn test_reevaluate_follows_moving_target() {
        let p = preset();
        let mut target = TargetState::stationary(DVec3::ZERO);
        let mut selector = PivotSelector::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let first = selector.choose_pivot(&target, &EmptyWorld, &p, &mut rng);
        target.pose.position = DVec3::new(100.0, 0.0, 0.0);
        let moved = selector.current_point(&target, &p);
        assert!((moved - first.point - DVec3::new(100.0, 0.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_grounded_target_forces_top() {
        let p = preset();
        let mut target = TargetState::stationary(DVec3::ZERO);
        target.grounded = true;
        let selector = PivotSelector::new();
        let point = selector.reevaluate_pivot(&target, &p, Some(1));
        let top = candidate_point(&target, DVec3::Y, &p);
        assert_eq!(point, top);

        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut chooser = PivotSelector::new();
        let choice = chooser.choose_pivot(&target, &EmptyWorld, &p, &mut rng);
        assert_eq!(choice.index, Some(PIVOT_TOP_INDEX));
    }

    #[test]
    fn test_heading_uses_velocity_when_moving() {
        let mut target = TargetState::stationary(DVec3::ZERO);
        target.velocity = DVec3::new(-20.0, 0.0, 0.0);
        assert_eq!(movement_heading(&target), -DVec3::X);
        target.velocity = DVec3::new(0.1, 0.0, 0.0);
        assert_eq!(movement_heading(&target), DVec3::Z);
    }
}
