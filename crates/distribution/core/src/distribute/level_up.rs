//! Level-up re-evaluation for NPCs whose level follows the player.

use super::{DistributeOptions, DistributionReport, Distributor, RecordKind};
use crate::env::NpcHost;
use crate::form::FormRef;
use crate::level_mult::{DistributedEntry, LevelMultCache, LevelMultInput};
use crate::npc::NpcSnapshot;

impl Distributor {
    /// Brings a level-scaled NPC up to date with its current level.
    ///
    /// Earlier grants are replayed from `cache`: entries granted above the
    /// current level are revoked, the others restored if missing. If this
    /// level was not evaluated yet, entries with level filters are evaluated
    /// with level scaling enabled and the grants recorded.
    ///
    /// Returns the report of the evaluation, or `None` if the NPC does not
    /// scale, has hit its level cap, or this level was already evaluated.
    pub fn redistribute_on_level_up(
        &self,
        npc: &mut NpcSnapshot,
        host: &mut dyn NpcHost,
        cache: &LevelMultCache,
        player: &str,
    ) -> Option<DistributionReport> {
        if !npc.is_pc_level_mult() {
            return None;
        }
        let input = LevelMultInput::for_npc(player, npc);
        if cache.has_hit_level_cap(&input) {
            tracing::trace!(npc = %npc.npc, level = npc.level, "level cap reached");
            return None;
        }

        self.replay(&input, npc, host, cache);
        if cache.find_distributed_entry(&input) {
            return None;
        }

        let options = DistributeOptions {
            include_level_scaled: true,
            only: None,
            level_cache: Some((cache, &input)),
        };
        let set = self.tables().regular.as_set();
        let report = self.run(&set, npc, host, &options);
        for entry in &report.distributed {
            cache.insert_distributed_entry(&input, entry.clone());
        }

        let cap_hit = npc.level_cap != 0 && npc.level >= npc.level_cap;
        cache.mark_evaluated(&input, cap_hit);
        tracing::debug!(
            npc = %npc.npc,
            level = npc.level,
            granted = report.granted.len(),
            cap_hit,
            "level-up distribution"
        );
        Some(report)
    }

    fn replay(
        &self,
        input: &LevelMultInput,
        npc: &mut NpcSnapshot,
        host: &mut dyn NpcHost,
        cache: &LevelMultCache,
    ) {
        let mut revoked = Vec::new();
        let mut restored = Vec::new();
        cache.for_each_distributed_entry(input, |entry, is_below_level| {
            if is_below_level {
                if host.has_form(&entry.form) {
                    revoked.push(entry.clone());
                }
            } else if !host.has_form(&entry.form) {
                restored.push(entry.clone());
            }
        });

        for entry in revoked {
            if entry.kind == RecordKind::Keyword {
                npc.remove_keyword(&entry.form);
            }
            match entry.kind {
                RecordKind::Item | RecordKind::DeathItem => {
                    host.remove_items(&[(entry.form, entry.quantity)]);
                }
                kind => host.revoke(kind, &[entry.form]),
            }
        }

        for entry in restored {
            restore(npc, host, entry);
        }
    }
}

fn restore(npc: &mut NpcSnapshot, host: &mut dyn NpcHost, entry: DistributedEntry) {
    let DistributedEntry {
        form,
        kind,
        quantity,
    } = entry;
    match kind {
        RecordKind::Item | RecordKind::DeathItem => host.add_items(&[(form, quantity)]),
        RecordKind::Package => {
            let index = i32::try_from(quantity).unwrap_or(i32::MAX);
            host.insert_packages(&[(form, index)]);
        }
        RecordKind::Skin => host.set_skin(&form),
        RecordKind::SleepOutfit => host.set_sleep_outfit(&form),
        RecordKind::Outfit => {}
        _ => {
            if kind == RecordKind::Keyword {
                npc.insert_keyword(&form);
            }
            host.grant(kind, &[form] as &[FormRef]);
        }
    }
}
