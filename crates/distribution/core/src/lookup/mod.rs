//! Turning tokenized rule records into [`DistributionTables`].
//!
//! [`DistributionTables`]: crate::distribute::DistributionTables
mod build;
mod raw;

pub use build::lookup;
pub use raw::{
    FormFilters, LevelFilters, RawFormGroup, RawLinkedRecord, RawRecord, RuleSet, StringFilters,
    TraitFilters,
};
