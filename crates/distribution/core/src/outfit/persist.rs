//! Saving and loading worn replacements.
//!
//! Only worn replacements are saved; pending ones are rebuilt by the next
//! distribution. Three record layouts exist:
//!
//! | Version | Fields |
//! |---|---|
//! | 1 | actor, original outfit, outfit, suspended |
//! | 2 | actor, original outfit, outfit, death, final, suspended |
//! | 3 | actor, outfit, death, final |
//!
//! Only version 3 is written. The original outfit and suspended flag of
//! older layouts are read and discarded.

use std::collections::HashMap;

use super::{OutfitManager, OutfitReplacement};
use crate::env::FormOracle;
use crate::form::{FormId, FormKind};
use crate::persist::{PersistError, SaveReader, SaveWriter};
use crate::sync;

impl OutfitManager {
    pub const TAG: [u8; 4] = *b"OTFT";
    pub const VERSION: u32 = 3;

    /// Writes every worn replacement as one record, ordered by actor id.
    ///
    /// # Errors
    ///
    /// Propagates writer failures.
    pub fn save(&self, writer: &mut dyn SaveWriter) -> Result<(), PersistError> {
        let state = sync::read(&self.state, Self::LOCK);
        let mut worn: Vec<_> = state.worn.iter().collect();
        worn.sort_by_key(|(actor, _)| **actor);

        writer.open_record(Self::TAG, Self::VERSION)?;
        writer.write_u32(worn.len() as u32)?;
        for (actor, replacement) in worn {
            writer.write_form_id(*actor)?;
            writer.write_form_id(replacement.outfit_id())?;
            writer.write_bool(replacement.is_death_outfit)?;
            writer.write_bool(replacement.is_final_outfit)?;
        }
        tracing::debug!(count = state.worn.len(), "saved worn outfits");
        Ok(())
    }

    /// Replaces worn state with the record the reader is positioned at.
    ///
    /// Outfits that cannot be resolved load as corrupted replacements, which
    /// revert the actor to its template outfit on the next resolution. Missing
    /// flags default to unset. A truncated record keeps what was read before
    /// the truncation.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnsupportedVersion`] for unknown versions.
    pub fn load(
        &self,
        reader: &mut dyn SaveReader,
        version: u32,
        forms: &dyn FormOracle,
    ) -> Result<(), PersistError> {
        if !(1..=Self::VERSION).contains(&version) {
            return Err(PersistError::UnsupportedVersion {
                tag: Self::TAG,
                version,
            });
        }

        let mut worn = HashMap::new();
        let mut corrupted = 0usize;
        match read_records(reader, version, forms, &mut worn, &mut corrupted) {
            Ok(()) => {}
            Err(err) => tracing::warn!(error = %err, loaded = worn.len(), "truncated outfit record"),
        }

        tracing::debug!(version, count = worn.len(), corrupted, "loaded worn outfits");
        let mut state = sync::write(&self.state, Self::LOCK);
        state.worn = worn;
        state.pending.clear();
        Ok(())
    }
}

fn read_records(
    reader: &mut dyn SaveReader,
    version: u32,
    forms: &dyn FormOracle,
    worn: &mut HashMap<FormId, OutfitReplacement>,
    corrupted: &mut usize,
) -> Result<(), PersistError> {
    let count = reader.read_u32()?;
    for _ in 0..count {
        let stored_actor = reader.read_form_id()?;
        if version < 3 {
            let _original = reader.read_form_id()?;
        }
        let stored_outfit = reader.read_form_id()?;
        let (is_death, is_final) = if version >= 2 {
            (
                reader.read_bool().unwrap_or(false),
                reader.read_bool().unwrap_or(false),
            )
        } else {
            (false, false)
        };
        if version < 3 {
            let _suspended = reader.read_bool().unwrap_or(false);
        }

        let Some(actor) = reader.resolve_form_id(stored_actor) else {
            tracing::debug!(actor = %stored_actor, "dropping outfit of missing actor");
            continue;
        };

        let outfit = reader
            .resolve_form_id(stored_outfit)
            .and_then(|id| forms.by_id(id))
            .filter(|form| form.kind == FormKind::Outfit);
        let replacement = match outfit {
            Some(outfit) => OutfitReplacement::new(outfit, is_death, is_final),
            None => {
                *corrupted += 1;
                tracing::warn!(%actor, outfit = %stored_outfit, "worn outfit no longer exists");
                let unresolved = (!stored_outfit.is_none()).then_some(stored_outfit);
                OutfitReplacement::corrupted(unresolved)
            }
        };
        worn.insert(actor, replacement);
    }
    Ok(())
}
