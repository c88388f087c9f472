//! Repository contract for saving and loading distribution state.

use distribution_core::SaveRecord;
use serde::{Deserialize, Serialize};

use super::{RepositoryError, Result};

/// Records written by the managers for one save slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFile {
    /// Container format version.
    pub version: u32,
    pub records: Vec<SaveRecord>,
}

impl SaveFile {
    pub const VERSION: u32 = 1;

    pub fn new(records: Vec<SaveRecord>) -> Self {
        Self {
            version: Self::VERSION,
            records,
        }
    }
}

/// Repository for distribution state, one entry per save slot.
///
/// Slots mirror the host's save games: the host saves the managers' records
/// next to its own save and loads them back when that save is loaded.
pub trait SaveRepository: Send + Sync {
    /// Save the records of `slot`, replacing any previous content.
    fn save(&self, slot: &str, file: &SaveFile) -> Result<()>;

    /// Load the records of `slot`.
    fn load(&self, slot: &str) -> Result<Option<SaveFile>>;

    fn exists(&self, slot: &str) -> bool;

    fn delete(&self, slot: &str) -> Result<()>;

    /// List every stored slot, sorted.
    fn list_slots(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}

/// Rejects slot names that cannot be used as a file stem.
pub(crate) fn validate_slot(slot: &str) -> Result<()> {
    let valid = !slot.is_empty()
        && slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' '));
    if valid {
        Ok(())
    } else {
        Err(RepositoryError::InvalidSlot(slot.to_string()))
    }
}

/// Rejects containers written by a newer build.
pub(crate) fn check_version(file: &SaveFile) -> Result<()> {
    if file.version > SaveFile::VERSION {
        return Err(RepositoryError::UnsupportedVersion {
            found: file.version,
            supported: SaveFile::VERSION,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_names_must_be_plain() {
        assert!(validate_slot("Quicksave-3").is_ok());
        assert!(validate_slot("").is_err());
        assert!(matches!(
            validate_slot("../escape"),
            Err(RepositoryError::InvalidSlot(_))
        ));
    }

    #[test]
    fn newer_containers_are_rejected() {
        let file = SaveFile {
            version: SaveFile::VERSION + 1,
            records: Vec::new(),
        };
        assert!(matches!(
            check_version(&file),
            Err(RepositoryError::UnsupportedVersion { .. })
        ));
        assert!(check_version(&SaveFile::default()).is_ok());
    }
}
