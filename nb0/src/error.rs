use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors generated from library
#[derive(Error, Debug)]
pub enum Nb0Error {
    #[error("std io error: {0}")]
    StdIo(#[from] io::Error),

    #[error("could not open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Header table could not be read, usually a truncated file
    #[error("could not read header table: {0:?}")]
    Header(#[from] deku::DekuError),

    #[error("file name is not ascii: {0:02x?}")]
    Decode(Vec<u8>),

    /// Last entry does not end at the end of the source
    #[error("not a .nb0 firmware")]
    Format { expected: u64, actual: u64 },

    #[error("offsets of {name} overflow a 64 bit file")]
    Overflow { name: String },

    #[error("data for {name} is truncated, {remaining} bytes left unread")]
    Truncated { name: String, remaining: u64 },

    /// Writer failed while copying data, without knowing the destination
    #[error("could not write data: {0}")]
    Output(#[source] io::Error),

    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("refusing to extract unsafe file name {0:?}")]
    UnsafeName(String),

    #[error("file with name {} exists", .0.display())]
    OutputIsFile(PathBuf),
}
