//! Content loaders for reading distribution data from files.

pub mod config;
pub mod factory;
pub mod rules;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use rules::RuleLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
