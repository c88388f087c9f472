//! Outfit resolution.
//!
//! See [`OutfitManager`] for the state machine and its precedence rules.
mod manager;
mod persist;
mod replacement;

pub use manager::{OutfitManager, ScriptOverride};
pub use replacement::OutfitReplacement;
