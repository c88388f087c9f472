//! Runtime error type.

use distribution_core::PersistError;

use crate::repository::RepositoryError;

/// Errors surfaced by the runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The builder was not given a form oracle.
    #[error("runtime requires a form oracle")]
    MissingForms,

    /// Slot save or load requested without a save repository.
    #[error("no save repository configured")]
    MissingRepository,

    /// Rule files or settings could not be loaded.
    #[error("content error: {0}")]
    Content(String),

    /// The tracing subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
