//! Repository layer for saved distribution state.
//!
//! Repositories store what the managers write at save time:
//! - Worn outfit replacements
//! - Per-actor distribution markers
//!
//! Rules and forms are static content and never go through a repository.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileSaveRepository;
pub use memory::InMemorySaveRepo;
pub use traits::{SaveFile, SaveRepository};
