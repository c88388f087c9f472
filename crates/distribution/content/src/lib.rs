//! Rule files and configuration loaders.
//!
//! This crate reads distribution content from disk:
//! - Distribution rules (`*_DISTR.ron`, one [`RuleSet`] per file)
//! - Distribution configuration (TOML)
//!
//! Loaded rules are still raw; `distribution_core::lookup::lookup` resolves
//! them against the host's forms.
//!
//! [`RuleSet`]: distribution_core::RuleSet

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, RuleLoader};
