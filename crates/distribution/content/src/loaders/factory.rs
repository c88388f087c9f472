//! Content factory for loading everything from one data directory.

use std::path::{Path, PathBuf};

use distribution_core::{DistributionConfig, RuleSet};

use crate::loaders::{ConfigLoader, LoadResult, RuleLoader};

/// Content factory that loads distribution content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── distribution.toml
/// └── rules/
///     ├── Bandits_DISTR.ron
///     └── Guards_DISTR.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "distribution.toml";
    pub const RULES_DIR: &'static str = "rules";

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load the configuration, or the defaults if the file is absent.
    pub fn load_config(&self) -> LoadResult<DistributionConfig> {
        let path = self.data_dir.join(Self::CONFIG_FILE);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(DistributionConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load every rule file under `rules/`.
    pub fn load_rules(&self) -> LoadResult<RuleSet> {
        RuleLoader::load_dir(&self.data_dir.join(Self::RULES_DIR))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
