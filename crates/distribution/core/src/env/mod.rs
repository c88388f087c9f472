//! Interfaces to the host process.
//!
//! The core never touches host objects directly. Lookups go through
//! [`FormOracle`], NPC mutation through [`NpcHost`], worn-outfit changes
//! through [`OutfitActor`] and randomness through [`RngOracle`]. In-memory
//! implementations ([`MemoryForms`], [`MemoryNpc`], [`MemoryActor`])
//! back the tests.
mod actor;
mod error;
mod forms;
mod memory;
mod npc;
mod rng;

pub use actor::OutfitActor;
pub use error::LookupError;
pub use forms::{FormOracle, validate_editor_id};
pub use memory::{MemoryActor, MemoryForms, MemoryNpc};
pub use npc::NpcHost;
pub use rng::{FixedRng, RngOracle, SharedRng};
