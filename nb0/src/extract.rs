use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Read, SeekFrom, Write};
use std::path::Path;

use crate::{FileEntry, Nb0Error, ReadSeek};

/// Bytes copied from the container per read
pub const CHUNK_SIZE: usize = 4096;

/// Outcome of [`Nb0Read::extract_to_dir`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Zero sized entry, nothing written
    Empty,
    /// File with the same size already exists, nothing written
    Duplicate,
    Written,
}

impl<T: ReadSeek> Nb0Read for T {}
/// Extract data from nb0 container
pub trait Nb0Read: ReadSeek {
    /// Copy exactly `entry.file_size` bytes starting at `entry.data_offset` into `writer`
    ///
    /// `progress` is called with `(written, total)` after every chunk. If the container ends
    /// early, everything that could be read is written before [`Nb0Error::Truncated`] is returned.
    fn extract_data<W>(
        &mut self,
        entry: &FileEntry,
        writer: &mut W,
        mut progress: impl FnMut(u64, u64),
    ) -> Result<(), Nb0Error>
    where
        W: Write,
    {
        self.seek(SeekFrom::Start(entry.data_offset))?;

        let mut buf = [0; CHUNK_SIZE];
        let mut remaining = entry.file_size;
        while remaining > 0 {
            // never read past the entry, even if the container has more data
            let len = remaining.min(CHUNK_SIZE as u64) as usize;
            let chunk = &mut buf[..len];
            let filled = read_chunk(self, chunk)?;
            writer.write_all(&chunk[..filled]).map_err(Nb0Error::Output)?;

            remaining -= filled as u64;
            if filled < len {
                return Err(Nb0Error::Truncated { name: entry.name.clone(), remaining });
            }
            progress(entry.file_size - remaining, entry.file_size);
        }

        Ok(())
    }

    /// Extract `entry` into `out_dir/entry.name`
    ///
    /// Zero sized entries are skipped, as are entries where a file of the same size already
    /// exists at the destination. The contents of an existing file are not compared. On error a
    /// partially written file is left behind.
    fn extract_to_dir(
        &mut self,
        entry: &FileEntry,
        out_dir: &Path,
        progress: impl FnMut(u64, u64),
    ) -> Result<Extraction, Nb0Error> {
        if entry.file_size == 0 {
            log::trace!("{}: empty, skipping", entry.name);
            return Ok(Extraction::Empty);
        }

        let path = out_dir.join(checked_name(&entry.name)?);
        if let Ok(metadata) = fs::metadata(&path) {
            if metadata.is_file() && metadata.len() == entry.file_size {
                log::debug!("Duplicate entry found {}, so skipping", entry.name);
                return Ok(Extraction::Duplicate);
            }
        }

        log::trace!("extracting {} -> {}", entry.name, path.display());
        let mut out = match OpenOptions::new().write(true).create(true).truncate(true).open(&path)
        {
            Ok(out) => out,
            Err(source) => return Err(Nb0Error::Write { path, source }),
        };
        match self.extract_data(entry, &mut out, progress) {
            Ok(()) => Ok(Extraction::Written),
            Err(Nb0Error::Output(source)) => Err(Nb0Error::Write { path, source }),
            Err(e) => Err(e),
        }
    }
}

/// Read until `chunk` is full or the reader is exhausted, returning the bytes read
fn read_chunk<R: Read + ?Sized>(reader: &mut R, chunk: &mut [u8]) -> Result<usize, Nb0Error> {
    let mut filled = 0;
    while filled < chunk.len() {
        match reader.read(&mut chunk[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(filled)
}

/// Fail if `out_dir` is taken by something that isn't a directory
///
/// A missing `out_dir` is fine, it is created before extraction.
pub fn check_out_dir(out_dir: &Path) -> Result<(), Nb0Error> {
    if out_dir.is_file() {
        return Err(Nb0Error::OutputIsFile(out_dir.to_path_buf()));
    }

    Ok(())
}

/// Reject names that would leave the output directory
fn checked_name(name: &str) -> Result<&str, Nb0Error> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(Nb0Error::UnsafeName(name.to_string()));
    }

    Ok(name)
}
