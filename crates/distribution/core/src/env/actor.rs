//! Actor interface used by the outfit manager.

use crate::form::{Form, FormId, FormRef};
use crate::npc::LifeState;

/// Host-side actor whose worn outfit is managed.
pub trait OutfitActor {
    /// Actor reference id.
    fn actor_id(&self) -> FormId;

    /// NPC base id.
    fn npc_id(&self) -> FormId;

    fn life_state(&self) -> LifeState;

    /// Outfit currently assigned to the NPC base.
    fn default_outfit(&self) -> Option<FormRef>;

    /// Returns true if the actor still carries the items of `outfit`
    /// (i.e. it was not looted).
    fn has_outfit_items(&self, outfit: &Form) -> bool;

    /// Assigns `outfit`, strips current outfit items and adds the new ones.
    fn equip_outfit(&mut self, outfit: &FormRef);
}
