//! Cache for NPCs whose level follows the player.
//!
//! Such NPCs are re-evaluated every time the player levels up. The cache
//! records, per player identity, NPC template and NPC level, which entries
//! were rejected and which were granted, so a re-evaluation can:
//!
//! - skip entries already rejected at this level
//! - replay earlier grants, revoking those granted above the current level
//! - stop entirely once the NPC has reached its level cap
//!
//! Chance rejections are kept separately and hold for every level, so a
//! failed roll is never re-rolled within one player identity.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use crate::distribute::RecordKind;
use crate::form::{FormId, FormRef};
use crate::npc::NpcSnapshot;
use crate::sync;

/// Cache key for one evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelMultInput {
    /// Identity of the active save's player.
    pub player: String,
    /// NPC template id.
    pub npc: FormId,
    /// NPC level at evaluation time.
    pub level: u16,
}

impl LevelMultInput {
    pub fn new(player: impl Into<String>, npc: FormId, level: u16) -> Self {
        Self {
            player: player.into(),
            npc,
            level,
        }
    }

    /// Key for `npc` at its current level.
    pub fn for_npc(player: impl Into<String>, npc: &NpcSnapshot) -> Self {
        Self::new(player, npc.template_id(), npc.level)
    }
}

/// A grant made by a distribution pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistributedEntry {
    pub form: FormRef,
    pub kind: RecordKind,
    /// Item count, package placement index, or 1.
    pub quantity: u32,
}

#[derive(Debug, Default)]
struct LevelEntry {
    /// `(form, entry index)` pairs rejected at this level.
    rejected: BTreeSet<(FormId, usize)>,
    distributed: Vec<DistributedEntry>,
    evaluated: bool,
    cap_hit: bool,
}

#[derive(Debug, Default)]
struct NpcLevels {
    levels: BTreeMap<u16, LevelEntry>,
    /// Chance rejections, valid at every level.
    discarded: BTreeSet<(FormId, usize)>,
}

type NpcKey = (String, FormId);

fn key(input: &LevelMultInput) -> NpcKey {
    (input.player.clone(), input.npc)
}

/// Per-player, per-template, per-level evaluation record.
#[derive(Debug, Default)]
pub struct LevelMultCache {
    npcs: RwLock<HashMap<NpcKey, NpcLevels>>,
}

impl LevelMultCache {
    const LOCK: &'static str = "level_mult_cache";

    pub fn new() -> Self {
        Self::default()
    }

    fn with_level<R>(&self, input: &LevelMultInput, f: impl FnOnce(&LevelEntry) -> R) -> Option<R> {
        let npcs = sync::read(&self.npcs, Self::LOCK);
        npcs.get(&key(input))
            .and_then(|npc| npc.levels.get(&input.level))
            .map(f)
    }

    fn with_level_mut<R>(&self, input: &LevelMultInput, f: impl FnOnce(&mut LevelEntry) -> R) -> R {
        let mut npcs = sync::write(&self.npcs, Self::LOCK);
        let entry = npcs
            .entry(key(input))
            .or_default()
            .levels
            .entry(input.level)
            .or_default();
        f(entry)
    }

    pub fn find_rejected_entry(&self, input: &LevelMultInput, form: FormId, index: usize) -> bool {
        self.with_level(input, |level| level.rejected.contains(&(form, index)))
            .unwrap_or(false)
    }

    pub fn insert_rejected_entry(&self, input: &LevelMultInput, form: FormId, index: usize) {
        self.with_level_mut(input, |level| {
            level.rejected.insert((form, index));
        });
    }

    /// Returns true if a chance roll for this entry already failed.
    pub fn find_discarded_entry(&self, input: &LevelMultInput, form: FormId, index: usize) -> bool {
        let npcs = sync::read(&self.npcs, Self::LOCK);
        npcs.get(&key(input))
            .is_some_and(|npc| npc.discarded.contains(&(form, index)))
    }

    pub fn insert_discarded_entry(&self, input: &LevelMultInput, form: FormId, index: usize) {
        let mut npcs = sync::write(&self.npcs, Self::LOCK);
        npcs.entry(key(input))
            .or_default()
            .discarded
            .insert((form, index));
    }

    /// Returns true if this level was already evaluated.
    pub fn find_distributed_entry(&self, input: &LevelMultInput) -> bool {
        self.with_level(input, |level| level.evaluated)
            .unwrap_or(false)
    }

    /// Records a grant made at this level.
    pub fn insert_distributed_entry(&self, input: &LevelMultInput, entry: DistributedEntry) {
        self.with_level_mut(input, |level| {
            level.evaluated = true;
            level.distributed.push(entry);
        });
    }

    /// Marks this level as evaluated, even if nothing was granted.
    pub fn mark_evaluated(&self, input: &LevelMultInput, cap_hit: bool) {
        self.with_level_mut(input, |level| {
            level.evaluated = true;
            level.cap_hit |= cap_hit;
        });
    }

    /// Returns true if any level recorded a grant of `form`.
    pub fn is_distributed(&self, input: &LevelMultInput, form: FormId) -> bool {
        let npcs = sync::read(&self.npcs, Self::LOCK);
        npcs.get(&key(input)).is_some_and(|npc| {
            npc.levels
                .values()
                .any(|level| level.distributed.iter().any(|entry| entry.form.id == form))
        })
    }

    /// Replays every recorded grant for this NPC.
    ///
    /// `visitor` receives each entry and whether the NPC's current level is
    /// now below the level the entry was granted at.
    pub fn for_each_distributed_entry<F>(&self, input: &LevelMultInput, mut visitor: F)
    where
        F: FnMut(&DistributedEntry, bool),
    {
        let npcs = sync::read(&self.npcs, Self::LOCK);
        let Some(npc) = npcs.get(&key(input)) else {
            return;
        };
        for (&level, entry) in &npc.levels {
            let is_below_level = input.level < level;
            for distributed in &entry.distributed {
                visitor(distributed, is_below_level);
            }
        }
    }

    /// Returns true if the NPC reached its level cap at any recorded level.
    pub fn has_hit_level_cap(&self, input: &LevelMultInput) -> bool {
        let npcs = sync::read(&self.npcs, Self::LOCK);
        npcs.get(&key(input))
            .is_some_and(|npc| npc.levels.values().any(|level| level.cap_hit))
    }

    /// Moves every record of `old` to `new`, merging with existing ones.
    pub fn remap_player_id(&self, old: &str, new: &str) {
        if old == new {
            return;
        }
        let mut npcs = sync::write(&self.npcs, Self::LOCK);
        let moved: Vec<NpcKey> = npcs.keys().filter(|(player, _)| player == old).cloned().collect();
        for old_key in moved {
            let Some(levels) = npcs.remove(&old_key) else {
                continue;
            };
            let target = npcs.entry((new.to_string(), old_key.1)).or_default();
            target.discarded.extend(levels.discarded);
            for (level, entry) in levels.levels {
                let merged = target.levels.entry(level).or_default();
                merged.rejected.extend(entry.rejected);
                merged.distributed.extend(entry.distributed);
                merged.evaluated |= entry.evaluated;
                merged.cap_hit |= entry.cap_hit;
            }
        }
        tracing::debug!(old, new, "remapped level cache player id");
    }

    /// Drops every record of the NPC template `npc`.
    pub fn delete_npc(&self, npc: FormId) {
        let mut npcs = sync::write(&self.npcs, Self::LOCK);
        npcs.retain(|(_, id), _| *id != npc);
    }

    /// Number of tracked `(player, npc)` pairs.
    pub fn len(&self) -> usize {
        sync::read(&self.npcs, Self::LOCK).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
