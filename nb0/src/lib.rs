/*!
Reader library for nb0 firmware containers

An nb0 container is a `u32` file count, followed by that many 64 byte file entry headers, followed
by the data of every file. Offsets in the headers are relative to the end of the header table.

### Read
```rust, no_run
# use std::fs::{self, File};
# use std::path::Path;
# use nb0::{Nb0Reader, Nb0Read};
let file = File::open("firmware.nb0").unwrap();
let mut archive = Nb0Reader::from_reader(file).unwrap();

// extract all files into outdir
fs::create_dir_all("outdir").unwrap();
for entry in &archive.table.entries {
    archive.reader.extract_to_dir(entry, Path::new("outdir"), |_, _| ()).unwrap();
}
```
*/

#[cfg(doctest)]
#[doc = include_str!("../../README.md")]
type _ReadmeTest = ();

use std::io::{Read, Seek, SeekFrom, Write};

pub mod entry;
pub use entry::{ENTRY_HEADER_SIZE, FileEntry, FileEntryHeader, NAME_LEN};
pub mod error;
pub use error::Nb0Error;
pub mod extract;
pub use extract::{CHUNK_SIZE, Extraction, Nb0Read, check_out_dir};
pub mod table;
pub use table::HeaderTable;

/// `Read` + `Seek`
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Read and validate nb0 container, and extract data
///
/// # Example
/// Read `firmware.nb0` and extract `boot.img`.
/// ```rust, no_run
/// # use std::fs::File;
/// # use nb0::Nb0Reader;
/// let file = File::open("firmware.nb0").unwrap();
/// let mut archive = Nb0Reader::from_reader(file).unwrap();
///
/// let mut out = File::create("boot.img").unwrap();
/// archive.extract_by_name("boot.img", &mut out).unwrap();
/// ```
pub struct Nb0Reader<'b> {
    pub reader: Box<dyn ReadSeek + 'b>,
    pub table: HeaderTable,
}

impl<'b> Nb0Reader<'b> {
    /// Read the [`HeaderTable`] and check it against the length of `reader`
    ///
    /// Fails with [`Nb0Error::Format`] if the last entry doesn't end at the end of `reader`.
    pub fn from_reader(reader: impl ReadSeek + 'b) -> Result<Self, Nb0Error> {
        let mut reader: Box<dyn ReadSeek + 'b> = Box::new(reader);
        let table = HeaderTable::from_reader(&mut reader)?;

        // stream_len
        let len = reader.seek(SeekFrom::End(0))?;
        table.validate(len)?;

        Ok(Self { reader, table })
    }

    /// Extract data of the first entry named `name` into `writer`
    pub fn extract_by_name<W>(
        &mut self,
        name: &str,
        writer: &mut W,
    ) -> Result<Option<FileEntry>, Nb0Error>
    where
        W: Write,
    {
        for entry in &self.table.entries {
            if name == entry.name {
                self.reader.extract_data(entry, writer, |_, _| ())?;
                return Ok(Some(entry.clone()));
            }
        }

        Ok(None)
    }
}
