use thiserror::Error;

use crate::common::types::ChunkId;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("truncated file: read past the end of the buffer")]
    Truncated,

    #[error("unexpected chunk {actual} at offset {position}, expected {expected}")]
    UnexpectedChunk {
        expected: ChunkId,
        actual: ChunkId,
        position: u64,
    },

    #[error("invalid length field: {length}")]
    InvalidLength { length: i64 },

    #[error("world state marker WSTA not found")]
    WstaNotFound,

    #[error("the file is violating the expected format, because: {reason}")]
    FormatError { reason: &'static str },

    #[error(transparent)]
    IOError(std::io::Error),
}

// Reads running off the end of the buffer come back as UnexpectedEof from
// the io layer; everything downstream only ever sees Truncated.
impl From<std::io::Error> for ParserError {
    fn from(value: std::io::Error) -> Self {
        if value.kind() == std::io::ErrorKind::UnexpectedEof {
            ParserError::Truncated
        } else {
            ParserError::IOError(value)
        }
    }
}

pub mod common;
pub mod log;
pub mod wld;
