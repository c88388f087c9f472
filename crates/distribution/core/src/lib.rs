//! NPC object distribution and outfit resolution.
//!
//! `distribution-core` decides which objects (keywords, spells, items,
//! outfits, ...) each NPC receives and keeps the outfit an actor wears
//! consistent across loads, deaths and saves. Rule records are resolved once
//! into [`DistributionTables`] by [`lookup::lookup`]; a [`Distributor`] then
//! evaluates the tables against an [`NpcSnapshot`] and applies the grants
//! through the host traits in [`env`]. The [`OutfitManager`] arbitrates
//! between competing outfit requests.
//!
//! Nothing in this crate performs I/O. Host objects are reached through
//! oracles, and persistence goes through the record codec in [`persist`].
pub mod config;
pub mod dependency;
pub mod distribute;
pub mod env;
pub mod error;
pub mod exclusion;
pub mod filter;
pub mod form;
pub mod level_mult;
pub mod lookup;
pub mod npc;
pub mod outfit;
pub mod persist;

mod sync;

pub use config::DistributionConfig;
pub use dependency::{DependencyError, DependencyResolver};
pub use distribute::{
    ActorShadow, ActorShadows, DistributeOptions, Distributable, DistributionReport,
    DistributionTables, DistributionType, Distributor, IndexOrCount, RandomCount, RecordKind,
};
pub use env::{
    FormOracle, LookupError, MemoryActor, MemoryForms, MemoryNpc, NpcHost, OutfitActor,
    RngOracle, SharedRng,
};
pub use error::{CoreError, ErrorSeverity};
pub use exclusion::FormGroups;
pub use filter::{Filter, FilterContext, Filters, LevelRange};
pub use form::{Form, FormBody, FormId, FormKind, FormRef, LeveledEntry, LeveledList, RawForm};
pub use level_mult::{DistributedEntry, LevelMultCache, LevelMultInput};
pub use lookup::{RawRecord, RuleSet};
pub use npc::{LifeState, NpcFlags, NpcSnapshot, NpcSnapshotBuilder, Sex, Skill};
pub use outfit::{OutfitManager, OutfitReplacement, ScriptOverride};
pub use persist::{PersistError, RecordBuffer, SaveReader, SaveRecord, SaveWriter};
