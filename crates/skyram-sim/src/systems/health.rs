//! Routes health notifications to their listeners.
//!
//! Agent deaths go to the controller's partner-loss handler and to the
//! death aggregator; the shell's death schedules the remaining agents and
//! stops the unit from attacking. Routing repeats until no notifications
//! remain, so a death caused by routing is handled in the same tick.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skyram_core::constants::{DEATH_DELAY_MAX, DEATH_DELAY_MIN};
use skyram_core::enums::Role;
use skyram_core::health::{HealthEvent, HealthListener, HealthNotification};

use crate::events::ArenaEvent;
use crate::pool::ControllerPool;
use crate::systems::death_sequence::DeathSequence;

pub fn run(
    pool: &mut ControllerPool,
    deaths: &mut DeathSequence,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<ArenaEvent>,
) {
    loop {
        let notifications: Vec<HealthNotification> = pool
            .active_mut()
            .flat_map(|unit| unit.drain_health_notifications())
            .collect();
        if notifications.is_empty() {
            break;
        }
        for notification in notifications {
            dispatch(pool, deaths, rng, events, notification);
        }
    }
}

fn dispatch(
    pool: &mut ControllerPool,
    deaths: &mut DeathSequence,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<ArenaEvent>,
    notification: HealthNotification,
) {
    match (notification.listener, notification.event) {
        (HealthListener::PartnerLoss { unit, role }, HealthEvent::Died) => {
            if let Some(slot) = pool.get_mut(unit) {
                if slot.controller.handle_partner_death(role) {
                    events.push(ArenaEvent::AgentDied { unit, role });
                }
            }
        }
        // A revived agent only comes back through a new activation.
        (HealthListener::PartnerLoss { .. }, HealthEvent::Revived) => {}
        (HealthListener::DeathAggregator { unit, role }, HealthEvent::Died) => {
            if let Some(slot) = pool.get_mut(unit) {
                slot.aggregator.on_sub_unit_died(role, &mut slot.shell);
            }
        }
        (HealthListener::DeathAggregator { unit, role }, HealthEvent::Revived) => {
            if let Some(slot) = pool.get_mut(unit) {
                slot.aggregator.record_revival(role);
            }
        }
        (HealthListener::Arena { unit }, HealthEvent::Died) => {
            let Some(slot) = pool.get_mut(unit) else {
                return;
            };
            slot.controller.force_stop_attack();
            slot.controller.set_attacks_allowed(false);
            for role in Role::ALL {
                let alive = slot.controller.agent_by_origin(role).is_some()
                    && !slot.agent_health(role).is_dead();
                if alive {
                    deaths.schedule(unit, role, rng.gen_range(DEATH_DELAY_MIN..=DEATH_DELAY_MAX));
                }
            }
            tracing::info!(unit = unit.0, "composite destroyed");
            events.push(ArenaEvent::CompositeDestroyed { unit });
        }
        (HealthListener::Arena { .. }, HealthEvent::Revived) => {}
    }
}
