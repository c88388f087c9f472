//! Per-actor distribution state.
//!
//! An [`ActorShadow`] remembers what the core already did to an actor, so
//! events that re-fire (a reload, a second death event) do not grant twice.
//! Shadows are saved under [`ActorShadows::TAG`] and purged when the actor is
//! deleted.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::form::FormId;
use crate::persist::{PersistError, SaveReader, SaveWriter};
use crate::sync;

/// What the core already did to one actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActorShadow {
    /// The regular tables were applied.
    pub distributed: bool,
    /// The death tables were applied.
    pub death_distribution_applied: bool,
}

/// Shadows of every actor the core has touched.
#[derive(Debug, Default)]
pub struct ActorShadows {
    actors: RwLock<BTreeMap<FormId, ActorShadow>>,
}

impl ActorShadows {
    pub const TAG: [u8; 4] = *b"SHDW";
    pub const VERSION: u32 = 1;
    const LOCK: &'static str = "actor_shadows";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, actor: FormId) -> ActorShadow {
        sync::read(&self.actors, Self::LOCK)
            .get(&actor)
            .copied()
            .unwrap_or_default()
    }

    fn try_mark(&self, actor: FormId, field: impl FnOnce(&mut ActorShadow) -> &mut bool) -> bool {
        let mut actors = sync::write(&self.actors, Self::LOCK);
        let flag = field(actors.entry(actor).or_default());
        !std::mem::replace(flag, true)
    }

    /// Marks the regular tables as applied. Returns false if they already were.
    pub fn try_mark_distributed(&self, actor: FormId) -> bool {
        self.try_mark(actor, |shadow| &mut shadow.distributed)
    }

    /// Marks the death tables as applied. Returns false if they already were.
    pub fn try_mark_death(&self, actor: FormId) -> bool {
        self.try_mark(actor, |shadow| &mut shadow.death_distribution_applied)
    }

    /// Forgets the actor, e.g. on deletion or reset.
    pub fn forget(&self, actor: FormId) {
        sync::write(&self.actors, Self::LOCK).remove(&actor);
    }

    pub fn len(&self) -> usize {
        sync::read(&self.actors, Self::LOCK).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes every shadow as one record.
    ///
    /// # Errors
    ///
    /// Propagates writer failures.
    pub fn save(&self, writer: &mut dyn SaveWriter) -> Result<(), PersistError> {
        let actors = sync::read(&self.actors, Self::LOCK);
        writer.open_record(Self::TAG, Self::VERSION)?;
        writer.write_u32(actors.len() as u32)?;
        for (actor, shadow) in actors.iter() {
            writer.write_form_id(*actor)?;
            writer.write_bool(shadow.distributed)?;
            writer.write_bool(shadow.death_distribution_applied)?;
        }
        Ok(())
    }

    /// Reads the record the reader is positioned at, replacing current state.
    ///
    /// Actors that no longer exist are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnsupportedVersion`] for unknown versions and
    /// propagates truncated reads.
    pub fn load(&self, reader: &mut dyn SaveReader, version: u32) -> Result<(), PersistError> {
        if version != Self::VERSION {
            return Err(PersistError::UnsupportedVersion {
                tag: Self::TAG,
                version,
            });
        }

        let count = reader.read_u32()?;
        let mut loaded = BTreeMap::new();
        for _ in 0..count {
            let stored = reader.read_form_id()?;
            let shadow = ActorShadow {
                distributed: reader.read_bool()?,
                death_distribution_applied: reader.read_bool()?,
            };
            match reader.resolve_form_id(stored) {
                Some(actor) => {
                    loaded.insert(actor, shadow);
                }
                None => tracing::debug!(actor = %stored, "dropping shadow of missing actor"),
            }
        }

        tracing::debug!(count = loaded.len(), "loaded actor shadows");
        *sync::write(&self.actors, Self::LOCK) = loaded;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::RecordBuffer;

    #[test]
    fn marks_are_one_shot() {
        let shadows = ActorShadows::new();
        assert!(shadows.try_mark_death(FormId(1)));
        assert!(!shadows.try_mark_death(FormId(1)));
        assert!(shadows.try_mark_distributed(FormId(1)));
        shadows.forget(FormId(1));
        assert!(shadows.try_mark_death(FormId(1)));
    }

    #[test]
    fn save_and_load_skip_deleted_actors() {
        let shadows = ActorShadows::new();
        shadows.try_mark_death(FormId(1));
        shadows.try_mark_distributed(FormId(2));

        let mut buffer = RecordBuffer::new();
        shadows.save(&mut buffer).unwrap();
        let mut reader = RecordBuffer::from_records(buffer.into_records());
        reader.delete(FormId(2));

        let header = reader.next_record().unwrap();
        assert_eq!(header.tag, ActorShadows::TAG);
        let loaded = ActorShadows::new();
        loaded.load(&mut reader, header.version).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.get(FormId(1)).death_distribution_applied);
        assert!(!loaded.get(FormId(1)).distributed);
    }
}
