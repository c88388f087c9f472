//! File-based SaveRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use super::traits::{check_version, validate_slot};
use super::{RepositoryError, Result, SaveFile, SaveRepository};

/// File-based implementation of SaveRepository.
///
/// Stores each slot as `{slot}.distr` in bincode format, next to the host's
/// own save files.
pub struct FileSaveRepository {
    base_dir: PathBuf,
}

impl FileSaveRepository {
    const EXTENSION: &'static str = "distr";

    /// Create a new file-based save repository.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.base_dir.join(format!("{slot}.{}", Self::EXTENSION))
    }
}

impl SaveRepository for FileSaveRepository {
    fn save(&self, slot: &str, file: &SaveFile) -> Result<()> {
        validate_slot(slot)?;
        let path = self.slot_path(slot);
        let temp_path = path.with_extension("distr.tmp");

        let bytes = bincode::serialize(file)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(
            slot,
            records = file.records.len(),
            path = %path.display(),
            "saved distribution state"
        );
        Ok(())
    }

    fn load(&self, slot: &str) -> Result<Option<SaveFile>> {
        validate_slot(slot)?;
        let path = self.slot_path(slot);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let file: SaveFile = bincode::deserialize(&bytes)
            .map_err(|e| RepositoryError::CorruptedData(format!("{}: {e}", path.display())))?;
        check_version(&file)?;

        tracing::debug!(
            slot,
            records = file.records.len(),
            path = %path.display(),
            "loaded distribution state"
        );
        Ok(Some(file))
    }

    fn exists(&self, slot: &str) -> bool {
        validate_slot(slot).is_ok() && self.slot_path(slot).exists()
    }

    fn delete(&self, slot: &str) -> Result<()> {
        validate_slot(slot)?;
        let path = self.slot_path(slot);
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!(slot, "deleted distribution state");
        }
        Ok(())
    }

    fn list_slots(&self) -> Result<Vec<String>> {
        let mut slots = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some(Self::EXTENSION)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                slots.push(stem.to_string());
            }
        }
        slots.sort_unstable();
        Ok(slots)
    }
}
