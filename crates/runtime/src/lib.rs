//! Runtime wiring for NPC distribution and outfit management.
//!
//! This crate binds the distribution tables and the managers of
//! `distribution-core` to a host session. The host adapter forwards its
//! callbacks as [`HostEvent`]s to [`Runtime::handle`], and saves or loads
//! the managers' records through a [`SaveRepository`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`events`] and [`host`] define the seam to the host adapter
//! - [`repository`] stores saved state per save slot
//! - [`config`] and [`logging`] cover process setup
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod logging;
pub mod repository;
pub mod runtime;

pub use config::{LogConfig, RuntimeConfig};
pub use error::{Result, RuntimeError};
pub use events::HostEvent;
pub use host::{Host, HostActor, MemoryHost, MemoryHostActor};
pub use repository::{
    FileSaveRepository, InMemorySaveRepo, RepositoryError, SaveFile, SaveRepository,
};
pub use runtime::{Runtime, RuntimeBuilder};
