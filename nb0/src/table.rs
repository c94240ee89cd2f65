use std::io::{Read, Seek, SeekFrom};

use deku::ctx::Endian;
use deku::prelude::*;

use crate::{ENTRY_HEADER_SIZE, FileEntry, FileEntryHeader, Nb0Error};

/// Size of the leading `file_count` field
const FILE_COUNT_SIZE: u64 = 4;

/// All file entries of a container, in stored order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTable {
    pub file_count: u32,
    /// Offset from start of file to the concatenated data, entry offsets are relative to this
    pub header_table_end: u64,
    pub entries: Vec<FileEntry>,
}

impl HeaderTable {
    /// Read `file_count` and every [`FileEntryHeader`] from the start of `reader`
    ///
    /// Every decoded entry is logged at `debug` level.
    pub fn from_reader<R: Read + Seek>(reader: &mut R) -> Result<Self, Nb0Error> {
        reader.seek(SeekFrom::Start(0))?;
        let mut reader = Reader::new(reader);

        let file_count = u32::from_reader_with_ctx(&mut reader, Endian::Little)?;
        let header_table_end = FILE_COUNT_SIZE + u64::from(file_count) * ENTRY_HEADER_SIZE;
        log::trace!("file_count: {file_count}, header_table_end: {header_table_end:#x}");

        // file_count is untrusted, so don't reserve from it
        let mut entries = vec![];
        for _ in 0..file_count {
            let header = FileEntryHeader::from_reader_with_ctx(&mut reader, ())?;
            let entry = FileEntry::from_header(header, header_table_end)?;
            log::debug!("\n{entry}");
            entries.push(entry);
        }

        Ok(Self { file_count, header_table_end, entries })
    }

    /// Size the container must have according to the last entry
    ///
    /// A table without entries describes a container of only the `file_count` field.
    pub fn expected_len(&self) -> Result<u64, Nb0Error> {
        match self.entries.last() {
            Some(last) => last.end(),
            None => Ok(self.header_table_end),
        }
    }

    /// Check that the last entry ends exactly at `source_len`
    ///
    /// This is the only structural check, entries before the last one are not inspected.
    pub fn validate(&self, source_len: u64) -> Result<(), Nb0Error> {
        let expected = self.expected_len()?;
        if expected != source_len {
            return Err(Nb0Error::Format { expected, actual: source_len });
        }

        Ok(())
    }
}
