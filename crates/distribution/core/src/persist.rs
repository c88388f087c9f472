//! Record-oriented save codec.
//!
//! Managers persist their state as tagged, versioned records, the way the
//! host's co-save interface exposes them: a writer opens a record and appends
//! little-endian fields, a reader walks the records in order and pulls fields
//! back out. [`RecordBuffer`] implements both sides in memory; the runtime
//! stores its records in its own save container.

use std::collections::{HashMap, HashSet};

use crate::error::{CoreError, ErrorSeverity};
use crate::form::FormId;

/// Four ASCII bytes identifying a record.
pub type RecordTag = [u8; 4];

/// Errors raised by the save codec.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PersistError {
    /// A field was written before any record was opened.
    #[error("no record is open")]
    NoOpenRecord,

    /// A field read ran past the end of the record.
    #[error("record {name} ended at byte {offset}", name = String::from_utf8_lossy(.tag))]
    UnexpectedEnd { tag: RecordTag, offset: usize },

    /// A record has a version this build does not understand.
    #[error("record {name} has unsupported version {version}", name = String::from_utf8_lossy(.tag))]
    UnsupportedVersion { tag: RecordTag, version: u32 },
}

impl CoreError for PersistError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnsupportedVersion { .. } => ErrorSeverity::Recoverable,
            Self::NoOpenRecord | Self::UnexpectedEnd { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoOpenRecord => "PERSIST_NO_OPEN_RECORD",
            Self::UnexpectedEnd { .. } => "PERSIST_UNEXPECTED_END",
            Self::UnsupportedVersion { .. } => "PERSIST_UNSUPPORTED_VERSION",
        }
    }
}

/// Header of a record returned by [`SaveReader::next_record`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    pub tag: RecordTag,
    pub version: u32,
    pub length: usize,
}

/// Appends records to a save.
pub trait SaveWriter {
    /// Starts a new record; subsequent writes go into it.
    fn open_record(&mut self, tag: RecordTag, version: u32) -> Result<(), PersistError>;

    fn write_u32(&mut self, value: u32) -> Result<(), PersistError>;

    fn write_bool(&mut self, value: bool) -> Result<(), PersistError> {
        self.write_u32(u32::from(value))
    }

    fn write_form_id(&mut self, id: FormId) -> Result<(), PersistError> {
        self.write_u32(id.0)
    }
}

/// Reads records back from a save.
pub trait SaveReader {
    /// Advances to the next record, if any.
    fn next_record(&mut self) -> Option<RecordHeader>;

    fn read_u32(&mut self) -> Result<u32, PersistError>;

    fn read_bool(&mut self) -> Result<bool, PersistError> {
        Ok(self.read_u32()? != 0)
    }

    /// Maps a form id stored in the save to its id in the current session.
    ///
    /// Returns `None` if the form no longer exists.
    fn resolve_form_id(&self, id: FormId) -> Option<FormId>;

    /// Reads a stored form id without resolving it.
    fn read_form_id(&mut self) -> Result<FormId, PersistError> {
        self.read_u32().map(FormId)
    }
}

/// One tagged record.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaveRecord {
    pub tag: RecordTag,
    pub version: u32,
    pub data: Vec<u8>,
}

/// In-memory record store implementing both codec sides.
#[derive(Clone, Debug, Default)]
pub struct RecordBuffer {
    records: Vec<SaveRecord>,
    /// Index of the record being read.
    cursor: Option<usize>,
    offset: usize,
    remapped: HashMap<FormId, FormId>,
    deleted: HashSet<FormId>,
}

impl RecordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps records loaded from a save container, ready for reading.
    pub fn from_records(records: Vec<SaveRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn into_records(self) -> Vec<SaveRecord> {
        self.records
    }

    pub fn records(&self) -> &[SaveRecord] {
        &self.records
    }

    /// Declares that `old` is now known as `new`.
    pub fn remap(&mut self, old: FormId, new: FormId) {
        self.remapped.insert(old, new);
    }

    /// Declares that `id` no longer exists.
    pub fn delete(&mut self, id: FormId) {
        self.deleted.insert(id);
    }

    /// Restarts reading from the first record.
    pub fn rewind(&mut self) {
        self.cursor = None;
        self.offset = 0;
    }

    fn current(&self) -> Result<&SaveRecord, PersistError> {
        self.cursor
            .and_then(|index| self.records.get(index))
            .ok_or(PersistError::NoOpenRecord)
    }
}

impl SaveWriter for RecordBuffer {
    fn open_record(&mut self, tag: RecordTag, version: u32) -> Result<(), PersistError> {
        self.records.push(SaveRecord {
            tag,
            version,
            data: Vec::new(),
        });
        Ok(())
    }

    fn write_u32(&mut self, value: u32) -> Result<(), PersistError> {
        let record = self.records.last_mut().ok_or(PersistError::NoOpenRecord)?;
        record.data.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }
}

impl SaveReader for RecordBuffer {
    fn next_record(&mut self) -> Option<RecordHeader> {
        let next = self.cursor.map_or(0, |index| index + 1);
        let record = self.records.get(next)?;
        self.cursor = Some(next);
        self.offset = 0;
        Some(RecordHeader {
            tag: record.tag,
            version: record.version,
            length: record.data.len(),
        })
    }

    fn read_u32(&mut self) -> Result<u32, PersistError> {
        let offset = self.offset;
        let record = self.current()?;
        let bytes: [u8; 4] = record
            .data
            .get(offset..offset + 4)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(PersistError::UnexpectedEnd {
                tag: record.tag,
                offset,
            })?;
        self.offset += 4;
        Ok(u32::from_le_bytes(bytes))
    }

    fn resolve_form_id(&self, id: FormId) -> Option<FormId> {
        if id.is_none() || self.deleted.contains(&id) {
            return None;
        }
        Some(self.remapped.get(&id).copied().unwrap_or(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_read_back_in_order() {
        let mut buffer = RecordBuffer::new();
        buffer.open_record(*b"AAAA", 2).unwrap();
        buffer.write_u32(7).unwrap();
        buffer.write_bool(true).unwrap();
        buffer.open_record(*b"BBBB", 1).unwrap();

        let mut reader = RecordBuffer::from_records(buffer.into_records());
        let header = reader.next_record().unwrap();
        assert_eq!((header.tag, header.version, header.length), (*b"AAAA", 2, 8));
        assert_eq!(reader.read_u32(), Ok(7));
        assert_eq!(reader.read_bool(), Ok(true));
        assert!(matches!(reader.read_u32(), Err(PersistError::UnexpectedEnd { offset: 8, .. })));

        assert_eq!(reader.next_record().map(|h| h.tag), Some(*b"BBBB"));
        assert!(reader.next_record().is_none());
    }

    #[test]
    fn writing_without_record_fails() {
        let mut buffer = RecordBuffer::new();
        assert_eq!(buffer.write_u32(1), Err(PersistError::NoOpenRecord));
    }

    #[test]
    fn form_ids_resolve_through_remap() {
        let mut buffer = RecordBuffer::new();
        buffer.remap(FormId(0x0100_0800), FormId(0x0200_0800));
        buffer.delete(FormId(0x99));
        assert_eq!(buffer.resolve_form_id(FormId(0x0100_0800)), Some(FormId(0x0200_0800)));
        assert_eq!(buffer.resolve_form_id(FormId(0x14)), Some(FormId(0x14)));
        assert_eq!(buffer.resolve_form_id(FormId(0x99)), None);
        assert_eq!(buffer.resolve_form_id(FormId::NONE), None);
    }
}
