//! Distribution rule loader.
//!
//! A rule file is a RON [`RuleSet`]:
//!
//! ```ron
//! (
//!     records: [
//!         (
//!             kind: Spell,
//!             form: "0x12FCD~Skyrim.esm",
//!             strings: (all: ["Bandit"], not: ["*Boss"]),
//!             chance: 50.0,
//!         ),
//!         (kind: Outfit, form: "BanditOutfit", is_final: true),
//!     ],
//!     exclusion_groups: [
//!         (name: "Helmets", forms: ["ArmorIronHelmet", "ArmorSteelHelmet"]),
//!     ],
//! )
//! ```

use std::path::Path;

use distribution_core::RuleSet;

use crate::loaders::{LoadResult, read_file};

/// Loader for distribution rules from RON files.
pub struct RuleLoader;

impl RuleLoader {
    /// Suffix of rule file names, compared case-insensitively.
    pub const SUFFIX: &'static str = "_distr.ron";

    /// Load one rule file. Records without a path get the file name.
    pub fn load(path: &Path) -> LoadResult<RuleSet> {
        let content = read_file(path)?;
        let mut rules: RuleSet = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse rules RON at {}: {}", path.display(), e))?;

        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        rules.set_path(&name);
        Ok(rules)
    }

    /// Load and merge every rule file in `dir`, in lexical file name order.
    ///
    /// A file that fails to parse is logged and skipped.
    pub fn load_dir(dir: &Path) -> LoadResult<RuleSet> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        let mut files: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && Self::is_rule_file(path))
            .collect();
        files.sort();

        let mut rules = RuleSet::new();
        for file in &files {
            match Self::load(file) {
                Ok(loaded) => {
                    tracing::debug!(file = %file.display(), records = loaded.records.len(), "loaded rule file");
                    rules.merge(loaded);
                }
                Err(err) => tracing::warn!(file = %file.display(), "skipping rule file: {err:#}"),
            }
        }
        tracing::info!(
            dir = %dir.display(),
            files = files.len(),
            records = rules.records.len(),
            linked = rules.linked.len(),
            "rule files loaded"
        );
        Ok(rules)
    }

    fn is_rule_file(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.to_ascii_lowercase().ends_with(Self::SUFFIX))
    }
}
