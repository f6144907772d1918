//! Store errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A persisted file did not match the expected format.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("invalid or overlong varint")]
    InvalidVarint,
    #[error("unknown dependency record tag {tag}")]
    UnknownTag { tag: u8 },
    #[error("string index {index} out of range (table has {len} entries)")]
    StringIndexOutOfRange { index: u64, len: usize },
    #[error("string delta {delta} reaches before the start of the table ({seen} seen)")]
    InvalidStringDelta { delta: usize, seen: usize },
    #[error("line {line}: {reason}")]
    MalformedLine { line: usize, reason: &'static str },
    #[error("invalid UTF-8")]
    InvalidUtf8,
}

/// Failure reading or writing the state directory.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed '{}': {source}", file.display())]
    Decode {
        file: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("'{}' is missing its tool version line", file.display())]
    MissingVersionLine { file: PathBuf },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn decode(file: impl Into<PathBuf>, source: DecodeError) -> Self {
        StoreError::Decode {
            file: file.into(),
            source,
        }
    }
}
