//! Death distribution.

use super::{ActorShadows, DistributeOptions, DistributionReport, DistributionType, Distributor};
use crate::env::NpcHost;
use crate::npc::{NpcFlags, NpcSnapshot};

impl Distributor {
    /// Applies the death tables to a dying or dead NPC, once per actor.
    ///
    /// Players, templates, living actors and actors already processed are
    /// skipped and yield `None`. Grants from the death tables trigger only
    /// death-scoped linked entries.
    pub fn distribute_on_death(
        &self,
        npc: &mut NpcSnapshot,
        host: &mut dyn NpcHost,
        shadows: &ActorShadows,
    ) -> Option<DistributionReport> {
        if !self.config().death_distribution
            || npc.has_flag(NpcFlags::PLAYER)
            || npc.has_flag(NpcFlags::TEMPLATE)
            || !npc.life.is_dead_or_dying()
        {
            return None;
        }
        if !shadows.try_mark_death(npc.actor) {
            tracing::trace!(actor = %npc.actor, "death distribution already applied");
            return None;
        }

        let set = self.tables().death.as_set();
        let mut report = self.run(&set, npc, host, &DistributeOptions::default());
        self.run_linked(DistributionType::Death, npc, host, &mut report);
        tracing::debug!(
            actor = %npc.actor,
            granted = report.granted.len(),
            "death distribution"
        );
        Some(report)
    }
}
