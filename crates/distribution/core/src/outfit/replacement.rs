//! Outfit replacement records.

use crate::form::{FormId, FormRef};

/// An outfit the manager wants an actor to wear.
#[derive(Clone, Debug, PartialEq)]
pub struct OutfitReplacement {
    /// The outfit to wear. `None` for a record whose outfit could not be
    /// resolved when loading a save.
    pub distributed: Option<FormRef>,
    /// Stored id of an outfit that no longer exists.
    pub unresolved: Option<FormId>,
    /// Comes from death distribution and outranks regular outfits.
    pub is_death_outfit: bool,
    /// Cannot be replaced by regular distribution.
    pub is_final_outfit: bool,
}

impl OutfitReplacement {
    pub fn new(outfit: FormRef, is_death_outfit: bool, is_final_outfit: bool) -> Self {
        Self {
            distributed: Some(outfit),
            unresolved: None,
            is_death_outfit,
            is_final_outfit,
        }
    }

    /// A record loaded from a save whose outfit is gone.
    pub fn corrupted(unresolved: Option<FormId>) -> Self {
        Self {
            distributed: None,
            unresolved,
            is_death_outfit: false,
            is_final_outfit: false,
        }
    }

    pub fn is_corrupted(&self) -> bool {
        self.distributed.is_none()
    }

    /// Id of the distributed outfit, or [`FormId::NONE`].
    pub fn outfit_id(&self) -> FormId {
        self.distributed.as_ref().map_or(FormId::NONE, |outfit| outfit.id)
    }
}

impl core::fmt::Display for OutfitReplacement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match (&self.distributed, self.unresolved) {
            (Some(outfit), _) => write!(f, "{outfit}")?,
            (None, Some(id)) => write!(f, "CORRUPTED [{id}]")?,
            (None, None) => f.write_str("CORRUPTED")?,
        }
        if self.is_death_outfit {
            f.write_str(" (death)")?;
        }
        if self.is_final_outfit {
            f.write_str(" (final)")?;
        }
        Ok(())
    }
}
