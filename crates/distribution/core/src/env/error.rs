//! Form lookup errors.
//!
//! Errors raised while resolving rule text into live host objects. Every one
//! of them is non-fatal: the offending rule entry, or the filter leaf that
//! referenced the form, is logged and dropped.

use crate::error::{CoreError, ErrorSeverity};
use crate::form::{FormId, FormKind, RawForm};

/// Errors that occur when resolving a [`RawForm`] into a form.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// No form with this id exists in the given (or any) plugin.
    #[error("unknown form id {raw}")]
    UnknownFormId { raw: RawForm },

    /// The plugin named by the rule is not loaded.
    #[error("plugin '{0}' is not loaded")]
    UnknownMod(String),

    /// No form carries this editor id.
    #[error("unknown editor id '{0}'")]
    UnknownEditorId(String),

    /// The editor id cannot be a valid identifier (empty, spaces, ...).
    #[error("malformed editor id '{0}'")]
    MalformedEditorId(String),

    /// The form exists but has the wrong type for this rule.
    #[error("form {form} is {actual}, expected {expected}")]
    MismatchedFormType {
        form: FormId,
        expected: &'static str,
        actual: FormKind,
    },

    /// The form type is never valid in this position (e.g. as a filter).
    #[error("form {form} of type {kind} is not supported here")]
    UnsupportedFormType { form: FormId, kind: FormKind },

    /// The host refused to create a keyword with this editor id.
    #[error("failed to create keyword '{0}'")]
    KeywordCreation(String),
}

impl CoreError for LookupError {
    fn severity(&self) -> ErrorSeverity {
        use LookupError::*;
        match self {
            UnknownMod(_) => ErrorSeverity::Recoverable,
            UnknownFormId { .. }
            | UnknownEditorId(_)
            | MalformedEditorId(_)
            | MismatchedFormType { .. }
            | UnsupportedFormType { .. } => ErrorSeverity::Validation,
            KeywordCreation(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use LookupError::*;
        match self {
            UnknownFormId { .. } => "LOOKUP_UNKNOWN_FORM_ID",
            UnknownMod(_) => "LOOKUP_UNKNOWN_MOD",
            UnknownEditorId(_) => "LOOKUP_UNKNOWN_EDITOR_ID",
            MalformedEditorId(_) => "LOOKUP_MALFORMED_EDITOR_ID",
            MismatchedFormType { .. } => "LOOKUP_MISMATCHED_FORM_TYPE",
            UnsupportedFormType { .. } => "LOOKUP_UNSUPPORTED_FORM_TYPE",
            KeywordCreation(_) => "LOOKUP_KEYWORD_CREATION",
        }
    }
}
