//! Common error infrastructure for distribution-core.
//!
//! This module provides shared types and traits used across all error types in
//! the crate. Domain-specific errors (e.g., [`LookupError`](crate::env::LookupError),
//! [`DependencyError`](crate::dependency::DependencyError)) are defined next to
//! the code that raises them.
//!
//! # Design Principles
//!
//! - **Entry granularity**: configuration errors never escape the single rule
//!   entry being processed; callers log and drop that entry
//! - **Rich Context**: errors carry the source path and raw identifier
//! - **Severity Classification**: errors are categorized for logging levels

/// Severity level of an error, used for categorization and logging.
///
/// - **Recoverable**: the offending item is skipped, processing continues
/// - **Validation**: invalid input that the user must fix in their rule file
/// - **Internal**: unexpected state inconsistencies that require investigation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - the item is skipped and the rest continues.
    ///
    /// Examples: redundant dependency edge, record with a missing form
    Recoverable,

    /// Validation error - the rule text is wrong.
    ///
    /// Examples: unknown editor id, mismatched form type, dependency cycle
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: truncated save record
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if processing may simply continue.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all distribution-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on who has to act, not on impact
pub trait CoreError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
