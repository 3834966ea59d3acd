//! Partner-loss protocol: collapse a duo into a solo without leaving any
//! attack state behind.

use skyram_core::enums::Role;

use crate::controller::RamController;

/// React to the death of the agent spawned as `which`.
///
/// In order: stop any attack, drop the dead agent (promoting the survivor
/// into slot A), re-run mode configuration against the remaining agents
/// (solo preset, fresh burst cooldown and spin, spiral counter and
/// velocities zeroed), then clear duo-only bookkeeping.
///
/// Reports for an agent that is already gone are ignored. Returns true if
/// the controller changed.
pub fn handle_partner_death(controller: &mut RamController, which: Role) -> bool {
    if controller.agent_by_origin(which).is_none() {
        return false;
    }
    controller.force_stop_attack();
    controller.remove_agent(which);
    controller.configure_for_agents(None);
    controller.clear_duo_bookkeeping();
    tracing::info!(
        unit = controller.id().0,
        lost = ?which,
        remaining = controller.status().live_agents,
        "partner lost"
    );
    true
}

impl RamController {
    /// See [`handle_partner_death`].
    pub fn handle_partner_death(&mut self, which: Role) -> bool {
        handle_partner_death(self, which)
    }
}
