//! Worn-outfit state machine.
//!
//! Each actor may have a *pending* replacement (the latest candidate from
//! distribution) and a *worn* replacement (what the actor is committed to
//! wear, and what gets saved). Producers merge candidates into the pending
//! slot; the consumer, [`OutfitManager::resolve_worn_outfit`], pops the
//! pending slot and merges it into the worn slot.
//!
//! # Pending precedence
//!
//! - a final outfit is never replaced by a non-final one
//! - a death outfit is never replaced by a non-death one
//! - otherwise the later request wins
//! - a request without outfit only upgrades the flags of an existing
//!   candidate
//!
//! # Worn resolution (W = worn, G = popped pending)
//!
//! | Actor | G has outfit | Rule |
//! |---|---|---|
//! | dying | yes | overwrite W with G |
//! | dead, G death | yes | overwrite if W is not a death outfit and W's items are still carried |
//! | dead, G regular | yes | never overwrite |
//! | alive | yes | overwrite if W is not final |
//! | any, no W | yes | create W from G; dead actors only if their outfit was not looted |
//! | dying | no | mark W (or the current outfit) as death outfit |
//! | dead | no | mark W as death outfit, or capture the current outfit as one |
//! | alive | no | revert to the template outfit and clear W unless W is final |
//!
//! # Suspension
//!
//! When a script sets an NPC's outfit to anything other than the one
//! captured at template initialization, the manager stops equipping that
//! NPC's actors until a script restores the initial outfit.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::OutfitReplacement;
use crate::env::OutfitActor;
use crate::form::{FormId, FormRef};
use crate::npc::LifeState;
use crate::sync;

/// Result of a script changing an NPC's outfit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptOverride {
    /// The NPC now wears something else; equipping is suspended.
    Suspended,
    /// The initial outfit was restored; worn replacements must be re-applied.
    Resumed,
    Unchanged,
}

#[derive(Debug, Default)]
pub(super) struct OutfitState {
    pub(super) pending: HashMap<FormId, OutfitReplacement>,
    pub(super) worn: HashMap<FormId, OutfitReplacement>,
    /// NPC base to the outfit it had before any distribution.
    pub(super) initial: HashMap<FormId, Option<FormRef>>,
    /// NPC bases whose outfit was overridden by a script.
    pub(super) suspended: HashSet<FormId>,
}

impl OutfitState {
    fn template_outfit(&self, npc: FormId) -> Option<FormRef> {
        self.initial.get(&npc).cloned().flatten()
    }
}

/// Tracks and applies outfit replacements for every actor.
#[derive(Debug, Default)]
pub struct OutfitManager {
    pub(super) state: RwLock<OutfitState>,
}

impl OutfitManager {
    pub(super) const LOCK: &'static str = "outfit_manager";

    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outfit an NPC base had before distribution.
    ///
    /// Only the first call per NPC is kept.
    pub fn initialize_template(&self, npc: FormId, outfit: Option<FormRef>) {
        sync::write(&self.state, Self::LOCK)
            .initial
            .entry(npc)
            .or_insert(outfit);
    }

    pub fn initial_outfit(&self, npc: FormId) -> Option<FormRef> {
        sync::read(&self.state, Self::LOCK).template_outfit(npc)
    }

    /// Requests a regular outfit for `actor`.
    ///
    /// Returns true if the pending slot changed.
    pub fn set_default_outfit(
        &self,
        actor: &dyn OutfitActor,
        outfit: Option<FormRef>,
        is_final: bool,
    ) -> bool {
        self.resolve_pending_outfit(actor.actor_id(), outfit, false, is_final)
    }

    /// Requests a death outfit for a dying or dead `actor`.
    ///
    /// Returns true if the pending slot changed.
    pub fn set_death_outfit(
        &self,
        actor: &dyn OutfitActor,
        outfit: Option<FormRef>,
        is_final: bool,
    ) -> bool {
        debug_assert!(
            actor.life_state().is_dead_or_dying(),
            "death outfit requested for living actor {}",
            actor.actor_id()
        );
        self.resolve_pending_outfit(actor.actor_id(), outfit, true, is_final)
    }

    /// Merges a candidate into the actor's pending slot.
    pub fn resolve_pending_outfit(
        &self,
        actor: FormId,
        outfit: Option<FormRef>,
        is_death: bool,
        is_final: bool,
    ) -> bool {
        let mut state = sync::write(&self.state, Self::LOCK);
        let Some(existing) = state.pending.get_mut(&actor) else {
            let Some(outfit) = outfit else {
                return false;
            };
            state
                .pending
                .insert(actor, OutfitReplacement::new(outfit, is_death, is_final));
            return true;
        };

        let Some(outfit) = outfit else {
            let upgraded = (is_final && !existing.is_final_outfit)
                || (is_death && !existing.is_death_outfit);
            existing.is_final_outfit |= is_final;
            existing.is_death_outfit |= is_death;
            return upgraded;
        };

        if (existing.is_final_outfit && !is_final) || (existing.is_death_outfit && !is_death) {
            tracing::trace!(%actor, rejected = %outfit, kept = %existing, "pending outfit kept");
            return false;
        }
        *existing = OutfitReplacement::new(outfit, is_death, is_final);
        true
    }

    /// Pops the pending candidate and merges it into the worn slot.
    ///
    /// Returns the worn replacement the actor should now wear, or `None` if
    /// nothing is to be equipped. Reverting to the template outfit happens
    /// here, since it clears the worn slot.
    pub fn resolve_worn_outfit(
        &self,
        actor: &mut dyn OutfitActor,
        is_dying: bool,
    ) -> Option<OutfitReplacement> {
        let id = actor.actor_id();
        let npc = actor.npc_id();
        let life = if is_dying {
            LifeState::Dying
        } else {
            actor.life_state()
        };

        // Host queries happen before the state lock is taken.
        let carries_worn = self
            .worn_replacement(id)
            .and_then(|worn| worn.distributed)
            .is_some_and(|outfit| actor.has_outfit_items(&outfit));
        let current = actor.default_outfit();
        let carries_current = current
            .as_ref()
            .is_some_and(|outfit| actor.has_outfit_items(outfit));

        let (resolved, revert_to) = {
            let mut state = sync::write(&self.state, Self::LOCK);
            let mut revert_to = None;
            let resolved = resolve_locked(
                &mut state,
                Observed {
                    id,
                    npc,
                    life,
                    carries_worn,
                    current,
                    carries_current,
                },
                &mut revert_to,
            );
            (resolved, revert_to)
        };

        if let Some(template) = revert_to {
            revert(actor, Some(template));
        }
        if let Some(worn) = &resolved {
            tracing::trace!(actor = %id, ?life, %worn, "resolved worn outfit");
        }
        resolved
    }

    /// Resolves the worn outfit and equips it unless the NPC is suspended.
    pub fn apply_worn_outfit(
        &self,
        actor: &mut dyn OutfitActor,
        is_dying: bool,
    ) -> Option<OutfitReplacement> {
        let resolved = self.resolve_worn_outfit(actor, is_dying)?;
        if !self.is_suspended(actor.npc_id()) {
            equip(actor, &resolved);
        }
        Some(resolved)
    }

    /// Equips the current worn replacement again without resolving.
    pub fn reapply_worn_outfit(&self, actor: &mut dyn OutfitActor) {
        if self.is_suspended(actor.npc_id()) {
            return;
        }
        if let Some(worn) = self.worn_replacement(actor.actor_id()) {
            equip(actor, &worn);
        }
    }

    /// Handles a script assigning `outfit` to the NPC base `npc`.
    pub fn on_outfit_set_by_script(&self, npc: FormId, outfit: Option<FormId>) -> ScriptOverride {
        let mut state = sync::write(&self.state, Self::LOCK);
        let Some(initial) = state.initial.get(&npc) else {
            return ScriptOverride::Unchanged;
        };

        let initial = initial.as_ref().map(|outfit| outfit.id);
        if outfit == initial {
            if state.suspended.remove(&npc) {
                tracing::debug!(%npc, "outfit management resumed");
                return ScriptOverride::Resumed;
            }
        } else if state.suspended.insert(npc) {
            tracing::debug!(%npc, "outfit management suspended by script");
            return ScriptOverride::Suspended;
        }
        ScriptOverride::Unchanged
    }

    /// Lifts the death flag after resurrection and re-applies the result.
    ///
    /// A worn replacement equal to the template outfit is dropped.
    pub fn on_resurrect(&self, actor: &mut dyn OutfitActor) {
        let id = actor.actor_id();
        let npc = actor.npc_id();
        let (worn, template, suspended) = {
            let mut state = sync::write(&self.state, Self::LOCK);
            let template = state.template_outfit(npc);
            let template_id = template.as_ref().map(|outfit| outfit.id);
            if let Some(worn) = state.worn.get_mut(&id) {
                worn.is_death_outfit = false;
                if worn.distributed.as_ref().map(|outfit| outfit.id) == template_id {
                    state.worn.remove(&id);
                }
            }
            (state.worn.get(&id).cloned(), template, state.suspended.contains(&npc))
        };

        if suspended {
            return;
        }
        match worn {
            Some(worn) => equip(actor, &worn),
            None => revert(actor, template),
        }
    }

    /// Forgets the actor's replacements after a reset.
    pub fn on_reset(&self, actor: FormId) {
        let mut state = sync::write(&self.state, Self::LOCK);
        state.pending.remove(&actor);
        state.worn.remove(&actor);
    }

    /// Purges every record keyed by `form`.
    pub fn on_actor_deleted(&self, form: FormId) {
        let mut state = sync::write(&self.state, Self::LOCK);
        state.pending.remove(&form);
        state.worn.remove(&form);
        state.initial.remove(&form);
        state.suspended.remove(&form);
    }

    pub fn worn_replacement(&self, actor: FormId) -> Option<OutfitReplacement> {
        sync::read(&self.state, Self::LOCK).worn.get(&actor).cloned()
    }

    pub fn pending_replacement(&self, actor: FormId) -> Option<OutfitReplacement> {
        sync::read(&self.state, Self::LOCK).pending.get(&actor).cloned()
    }

    pub fn is_suspended(&self, npc: FormId) -> bool {
        sync::read(&self.state, Self::LOCK).suspended.contains(&npc)
    }

    /// Number of worn replacements.
    pub fn worn_count(&self) -> usize {
        sync::read(&self.state, Self::LOCK).worn.len()
    }
}

/// What the consumer read from the actor before locking.
struct Observed {
    id: FormId,
    npc: FormId,
    life: LifeState,
    /// The actor still carries the items of its worn replacement.
    carries_worn: bool,
    current: Option<FormRef>,
    /// The actor still carries the items of `current`.
    carries_current: bool,
}

/// Merges the popped pending slot into the worn slot.
///
/// Sets `revert_to` to the template outfit the actor must be put back into
/// once the lock is released.
fn resolve_locked(
    state: &mut OutfitState,
    observed: Observed,
    revert_to: &mut Option<FormRef>,
) -> Option<OutfitReplacement> {
    let Observed {
        id,
        npc,
        life,
        carries_worn,
        mut current,
        carries_current,
    } = observed;
    let suspended = state.suspended.contains(&npc);

    if state.worn.get(&id).is_some_and(OutfitReplacement::is_corrupted) {
        state.worn.remove(&id);
        tracing::debug!(actor = %id, "dropping corrupted worn outfit");
        if life == LifeState::Alive && !suspended {
            *revert_to = state.template_outfit(npc);
            if revert_to.is_some() {
                current = revert_to.clone();
            }
        }
    }

    let pending = state
        .pending
        .remove(&id)
        .filter(|candidate| !candidate.is_corrupted());

    match pending {
        Some(candidate) => match state.worn.get_mut(&id) {
            Some(worn) => {
                let overwrite = match life {
                    LifeState::Dying => true,
                    LifeState::Dead => {
                        candidate.is_death_outfit && !worn.is_death_outfit && carries_worn
                    }
                    LifeState::Alive => !worn.is_final_outfit,
                };
                if overwrite {
                    *worn = candidate;
                    Some(worn.clone())
                } else {
                    None
                }
            }
            None => {
                if life == LifeState::Dead && !carries_current {
                    None
                } else {
                    state.worn.insert(id, candidate.clone());
                    Some(candidate)
                }
            }
        },
        None => match life {
            LifeState::Dying | LifeState::Dead => {
                if let Some(worn) = state.worn.get_mut(&id) {
                    worn.is_death_outfit = true;
                    Some(worn.clone())
                } else {
                    current.map(|outfit| {
                        let frozen = OutfitReplacement::new(outfit, true, false);
                        state.worn.insert(id, frozen.clone());
                        frozen
                    })
                }
            }
            LifeState::Alive => match state.worn.get(&id) {
                Some(worn) if worn.is_final_outfit => Some(worn.clone()),
                Some(_) => {
                    state.worn.remove(&id);
                    if !suspended {
                        *revert_to = state.template_outfit(npc);
                    }
                    None
                }
                None => current.map(|outfit| {
                    let captured = OutfitReplacement::new(outfit, false, false);
                    state.worn.insert(id, captured.clone());
                    captured
                }),
            },
        },
    }
}

/// Equips `replacement` if the actor is not already wearing it.
fn equip(actor: &mut dyn OutfitActor, replacement: &OutfitReplacement) {
    let Some(outfit) = &replacement.distributed else {
        return;
    };
    if actor.default_outfit().map(|current| current.id) != Some(outfit.id) {
        actor.equip_outfit(outfit);
    }
}

/// Puts the template outfit back on, if it is known and not already worn.
fn revert(actor: &mut dyn OutfitActor, template: Option<FormRef>) {
    let Some(template) = template else {
        return;
    };
    if actor.default_outfit().map(|current| current.id) != Some(template.id) {
        tracing::debug!(actor = %actor.actor_id(), outfit = %template, "reverting to template outfit");
        actor.equip_outfit(&template);
    }
}
