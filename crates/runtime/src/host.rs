//! Host adapter seam.
//!
//! A [`Host`] hands out the actors an event refers to. Each [`HostActor`]
//! exposes the two mutation interfaces of the core separately, so the runtime
//! can distribute onto the NPC and then resolve the worn outfit of the same
//! actor. [`MemoryHost`] keeps everything in memory for tests and tools.

use std::collections::BTreeMap;

use distribution_core::{
    FormId, FormRef, LifeState, MemoryActor, MemoryNpc, NpcHost, NpcSnapshot, OutfitActor,
};

/// One loaded actor.
pub trait HostActor {
    /// Fresh view of the actor for filter evaluation.
    fn snapshot(&self) -> NpcSnapshot;

    fn npc_host(&mut self) -> &mut dyn NpcHost;

    fn outfit_actor(&mut self) -> &mut dyn OutfitActor;
}

/// The game session the runtime is attached to.
pub trait Host {
    /// Looks up a loaded actor.
    fn actor(&mut self, id: FormId) -> Option<&mut dyn HostActor>;

    /// Every actor currently loaded.
    fn loaded_actors(&self) -> Vec<FormId>;

    /// Identity of the current player character, used to key the level cache.
    fn player_id(&self) -> String;
}

/// In-memory actor built from a snapshot.
#[derive(Clone, Debug)]
pub struct MemoryHostActor {
    snapshot: NpcSnapshot,
    npc: MemoryNpc,
    actor: MemoryActor,
}

impl MemoryHostActor {
    /// Creates a living actor wearing `outfit`.
    pub fn new(snapshot: NpcSnapshot, outfit: Option<FormRef>) -> Self {
        let actor = MemoryActor::new(snapshot.actor, snapshot.npc, outfit);
        Self {
            snapshot,
            npc: MemoryNpc::new(),
            actor,
        }
    }

    #[must_use]
    pub fn with_npc(mut self, npc: MemoryNpc) -> Self {
        self.npc = npc;
        self
    }

    pub fn id(&self) -> FormId {
        self.snapshot.actor
    }

    pub fn npc(&self) -> &MemoryNpc {
        &self.npc
    }

    pub fn actor(&self) -> &MemoryActor {
        &self.actor
    }

    pub fn set_life_state(&mut self, life: LifeState) {
        self.actor.set_life_state(life);
    }

    pub fn set_level(&mut self, level: u16) {
        self.snapshot.level = level;
    }

    /// Removes the outfit items, as if the corpse was looted.
    pub fn loot(&mut self) {
        self.actor.loot();
    }
}

impl HostActor for MemoryHostActor {
    fn snapshot(&self) -> NpcSnapshot {
        let mut snapshot = self.snapshot.clone();
        snapshot.life = self.actor.life_state();
        snapshot.default_outfit = self.actor.outfit_id();
        snapshot
    }

    fn npc_host(&mut self) -> &mut dyn NpcHost {
        &mut self.npc
    }

    fn outfit_actor(&mut self) -> &mut dyn OutfitActor {
        &mut self.actor
    }
}

/// In-memory session.
#[derive(Clone, Debug, Default)]
pub struct MemoryHost {
    actors: BTreeMap<FormId, MemoryHostActor>,
    player: String,
}

impl MemoryHost {
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            actors: BTreeMap::new(),
            player: player.into(),
        }
    }

    /// Loads an actor into the session.
    pub fn insert(&mut self, actor: MemoryHostActor) {
        self.actors.insert(actor.id(), actor);
    }

    /// Unloads an actor.
    pub fn remove(&mut self, id: FormId) -> Option<MemoryHostActor> {
        self.actors.remove(&id)
    }

    pub fn get(&self, id: FormId) -> Option<&MemoryHostActor> {
        self.actors.get(&id)
    }

    pub fn get_mut(&mut self, id: FormId) -> Option<&mut MemoryHostActor> {
        self.actors.get_mut(&id)
    }

    pub fn set_player(&mut self, player: impl Into<String>) {
        self.player = player.into();
    }
}

impl Host for MemoryHost {
    fn actor(&mut self, id: FormId) -> Option<&mut dyn HostActor> {
        self.actors
            .get_mut(&id)
            .map(|actor| actor as &mut dyn HostActor)
    }

    fn loaded_actors(&self) -> Vec<FormId> {
        self.actors.keys().copied().collect()
    }

    fn player_id(&self) -> String {
        self.player.clone()
    }
}

#[cfg(test)]
mod tests {
    use distribution_core::NpcSnapshotBuilder;

    use super::*;

    #[test]
    fn snapshot_follows_actor_state() {
        let snapshot = NpcSnapshotBuilder::new(FormId(0xFF00_0001), FormId(0x100), "Guard")
            .level(4)
            .build();
        let mut host = MemoryHost::new("Player_1");
        host.insert(MemoryHostActor::new(snapshot, None));

        let actor = host.get_mut(FormId(0xFF00_0001)).unwrap();
        actor.set_life_state(LifeState::Dying);
        actor.set_level(9);

        let actor = host.actor(FormId(0xFF00_0001)).unwrap();
        let snapshot = actor.snapshot();
        assert_eq!(snapshot.life, LifeState::Dying);
        assert_eq!(snapshot.level, 9);
        assert_eq!(host.loaded_actors(), [FormId(0xFF00_0001)]);
        assert!(host.actor(FormId(0x2)).is_none());
    }
}
