//! In-memory SaveRepository implementation for tests and tools.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::traits::{check_version, validate_slot};
use super::{RepositoryError, Result, SaveFile, SaveRepository};

/// In-memory implementation of SaveRepository.
pub struct InMemorySaveRepo {
    slots: RwLock<BTreeMap<String, SaveFile>>,
}

impl InMemorySaveRepo {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemorySaveRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveRepository for InMemorySaveRepo {
    fn save(&self, slot: &str, file: &SaveFile) -> Result<()> {
        validate_slot(slot)?;
        let mut slots = self
            .slots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        slots.insert(slot.to_string(), file.clone());
        Ok(())
    }

    fn load(&self, slot: &str) -> Result<Option<SaveFile>> {
        validate_slot(slot)?;
        let slots = self
            .slots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let Some(file) = slots.get(slot) else {
            return Ok(None);
        };
        check_version(file)?;
        Ok(Some(file.clone()))
    }

    fn exists(&self, slot: &str) -> bool {
        self.slots
            .read()
            .map(|slots| slots.contains_key(slot))
            .unwrap_or(false)
    }

    fn delete(&self, slot: &str) -> Result<()> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        slots.remove(slot);
        Ok(())
    }

    fn list_slots(&self) -> Result<Vec<String>> {
        let slots = self
            .slots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(slots.keys().cloned().collect())
    }
}
