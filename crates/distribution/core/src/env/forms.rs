//! Form resolution oracle.

use super::LookupError;
use crate::form::{FormId, FormRef, RawForm};

/// Oracle resolving rule text into live host objects.
///
/// Implemented by the host adapter; [`MemoryForms`](super::MemoryForms) is the
/// in-memory implementation used by tests and tools.
pub trait FormOracle: Send + Sync {
    /// Resolves `raw` to a form of any type.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the plugin is not loaded, the id or editor
    /// id is unknown, or the editor id is malformed. `RawForm::File` never
    /// names a single form and yields [`LookupError::UnknownEditorId`].
    fn lookup(&self, raw: &RawForm) -> Result<FormRef, LookupError>;

    /// Returns the form with the given runtime id.
    fn by_id(&self, id: FormId) -> Option<FormRef>;

    /// Returns true if the named plugin is loaded (case-insensitive).
    fn has_file(&self, file: &str) -> bool;

    /// Creates a keyword for an editor id no plugin defines.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::KeywordCreation`] if the host cannot create it.
    fn create_keyword(&self, editor_id: &str) -> Result<FormRef, LookupError>;
}

/// Checks an editor id the way the host would before looking it up.
pub fn validate_editor_id(editor_id: &str) -> Result<(), LookupError> {
    let valid = !editor_id.is_empty()
        && editor_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(LookupError::MalformedEditorId(editor_id.to_string()))
    }
}
