//! Distribution tables and the engine that applies them.
//!
//! [`DistributionTables`] holds every resolved entry: the regular and death
//! tables (one list per [`RecordKind`]), linked entries and the two exclusion
//! group systems. A [`Distributor`] shares the tables and evaluates them
//! against one NPC at a time:
//!
//! - [`Distributor::distribute`] for the regular tables
//! - [`Distributor::distribute_on_death`] for the death tables
//! - [`Distributor::redistribute_on_level_up`] for NPCs scaling with the player
mod death;
mod engine;
mod entry;
mod keywords;
mod kind;
mod level_up;
mod linked;
mod shadow;
mod tables;

pub use engine::{DistributeOptions, DistributionReport, Distributor, OutfitChoice};
pub use entry::{Distributable, IndexOrCount, RandomCount};
pub use keywords::sort_by_dependencies;
pub use kind::RecordKind;
pub use linked::{DistributionType, LinkedForms};
pub use shadow::{ActorShadow, ActorShadows};
pub use tables::{DistributableForms, DistributionSet, DistributionTables};
