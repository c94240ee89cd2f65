use core::fmt;

use deku::prelude::*;

use crate::Nb0Error;

/// Size of the NUL padded file name field in bytes
pub const NAME_LEN: usize = 48;

/// Size of one [`FileEntryHeader`] on disk in bytes
pub const ENTRY_HEADER_SIZE: u64 = 64;

/// On-disk file entry header
///
/// Offsets and sizes are split into 32 bit words. The data offset is relative to the end of
/// the whole header table, not to this header.
#[derive(DekuRead, DekuWrite, DekuSize, Debug, Copy, Clone, PartialEq, Eq)]
#[deku(endian = "little")]
pub struct FileEntryHeader {
    pub lo_data_offset: u32,
    pub lo_file_size: u32,
    pub hi_data_offset: u32,
    pub hi_file_size: u32,
    pub file_name: [u8; NAME_LEN],
}

impl FileEntryHeader {
    /// Create header from a name and the full 64 bit offset and size
    ///
    /// Returns `None` if `name` doesn't fit in [`NAME_LEN`] bytes.
    pub fn new(name: &str, data_offset: u64, file_size: u64) -> Option<Self> {
        let bytes = name.as_bytes();
        if bytes.len() > NAME_LEN {
            return None;
        }
        let mut file_name = [0; NAME_LEN];
        file_name[..bytes.len()].copy_from_slice(bytes);

        Some(Self {
            lo_data_offset: data_offset as u32,
            lo_file_size: file_size as u32,
            hi_data_offset: (data_offset >> 32) as u32,
            hi_file_size: (file_size >> 32) as u32,
            file_name,
        })
    }

    /// Data offset, relative to the end of the header table
    pub fn data_offset(&self) -> u64 {
        join(self.hi_data_offset, self.lo_data_offset)
    }

    pub fn file_size(&self) -> u64 {
        join(self.hi_file_size, self.lo_file_size)
    }

    /// Decode `file_name`, stripping the trailing NUL padding
    pub fn name(&self) -> Result<String, Nb0Error> {
        let end = self.file_name.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        let name = &self.file_name[..end];
        if !name.is_ascii() {
            return Err(Nb0Error::Decode(name.to_vec()));
        }

        Ok(name.iter().map(|b| char::from(*b)).collect())
    }
}

fn join(hi: u32, lo: u32) -> u64 {
    (u64::from(hi) << 32) | u64::from(lo)
}

/// Decoded file entry, with the absolute offset of its data in the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    /// Offset from the start of the container
    pub data_offset: u64,
    pub file_size: u64,
    pub header: FileEntryHeader,
}

impl FileEntry {
    pub fn from_header(header: FileEntryHeader, header_table_end: u64) -> Result<Self, Nb0Error> {
        let name = header.name()?;
        let Some(data_offset) = header_table_end.checked_add(header.data_offset()) else {
            return Err(Nb0Error::Overflow { name });
        };

        Ok(Self { name, data_offset, file_size: header.file_size(), header })
    }

    /// Offset one past the last byte of data
    pub fn end(&self) -> Result<u64, Nb0Error> {
        self.data_offset
            .checked_add(self.file_size)
            .ok_or_else(|| Nb0Error::Overflow { name: self.name.clone() })
    }
}

/// Human readable dump of the entry, split words are only shown when the high word is used
impl fmt::Display for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.header;
        writeln!(f, "{:<13} = {}", "FileName", self.name)?;
        if h.hi_file_size != 0 {
            writeln!(f, "{:<13} = {}", "HiFileSize", h.hi_file_size)?;
            writeln!(f, "{:<13} = {}", "LoFileSize", h.lo_file_size)?;
        }
        writeln!(f, "{:<13} = {}", "FileSize", self.file_size)?;
        if h.hi_data_offset != 0 {
            writeln!(f, "{:<13} = {}", "HiDataOffset", h.hi_data_offset)?;
            writeln!(f, "{:<13} = {}", "LoDataOffset", h.lo_data_offset)?;
        }
        write!(f, "{:<13} = {}", "DataOffset", self.data_offset)
    }
}
