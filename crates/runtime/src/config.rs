//! Runtime configuration.
use std::env;
use std::path::PathBuf;

use distribution_core::DistributionConfig;

/// Runtime configuration.
#[derive(Clone, Debug, Default)]
pub struct RuntimeConfig {
    pub distribution: DistributionConfig,
    pub log: LogConfig,
    /// Directory for [`FileSaveRepository`](crate::FileSaveRepository) slots.
    pub save_dir: Option<PathBuf>,
    /// Directory holding `distribution.toml` and `rules/`.
    pub data_dir: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Construct runtime configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DISTR_LOG` - tracing filter directives (default: `info`)
    /// - `DISTR_LOG_FILE` - write logs to this file instead of stderr
    /// - `DISTR_SAVE_DIR` - directory for saved distribution state
    /// - `DISTR_DATA_DIR` - directory holding settings and rule files
    /// - `DISTR_DEATH_DISTRIBUTION`, `DISTR_OUTFIT_MANAGEMENT`,
    ///   `DISTR_LEVEL_MULT` - toggle the matching [`DistributionConfig`] switch
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(filter) = env::var("DISTR_LOG") {
            config.log.filter = filter;
        }
        config.log.file = env::var_os("DISTR_LOG_FILE").map(PathBuf::from);
        config.save_dir = env::var_os("DISTR_SAVE_DIR").map(PathBuf::from);
        config.data_dir = env::var_os("DISTR_DATA_DIR").map(PathBuf::from);

        if let Some(enabled) = read_env::<bool>("DISTR_DEATH_DISTRIBUTION") {
            config.distribution.death_distribution = enabled;
        }
        if let Some(enabled) = read_env::<bool>("DISTR_OUTFIT_MANAGEMENT") {
            config.distribution.outfit_management = enabled;
        }
        if let Some(enabled) = read_env::<bool>("DISTR_LEVEL_MULT") {
            config.distribution.level_mult_redistribution = enabled;
        }

        config
    }
}

/// Logging configuration.
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Filter directives, e.g. `info,distribution_core=debug`.
    pub filter: String,
    /// Log file; stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_log_to_stderr_at_info() {
        let config = RuntimeConfig::default();
        assert_eq!(config.log.filter, "info");
        assert!(config.log.file.is_none());
        assert!(config.distribution.outfit_management);
    }
}
