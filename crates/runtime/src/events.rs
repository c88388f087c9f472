//! Host events the runtime reacts to.

use distribution_core::FormId;

/// A host callback, forwarded to [`Runtime::handle`](crate::Runtime::handle).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// An actor's 3D finished loading, or its outfit is about to be equipped.
    ActorLoaded { actor: FormId },
    /// The actor entered its death sequence.
    Dying { actor: FormId },
    /// The actor is dead.
    Died { actor: FormId },
    Resurrected { actor: FormId },
    /// The actor was reset to its base record.
    Reset { actor: FormId },
    /// A form was deleted from the game.
    FormDeleted { form: FormId },
    /// A script assigned `outfit` to the NPC base `npc`.
    OutfitSetByScript { npc: FormId, outfit: Option<FormId> },
    /// The player gained a level.
    LevelUp,
    /// A menu closed; the player identity may have changed.
    MenuClosed,
}

impl HostEvent {
    /// The actor the event is about, if any.
    pub fn actor(&self) -> Option<FormId> {
        match *self {
            HostEvent::ActorLoaded { actor }
            | HostEvent::Dying { actor }
            | HostEvent::Died { actor }
            | HostEvent::Resurrected { actor }
            | HostEvent::Reset { actor } => Some(actor),
            HostEvent::FormDeleted { .. }
            | HostEvent::OutfitSetByScript { .. }
            | HostEvent::LevelUp
            | HostEvent::MenuClosed => None,
        }
    }
}
