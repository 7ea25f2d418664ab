//! The stream error type.
//!
//! One error kind covers every failure a stream operation can surface:
//! open, close, seek, tell, flush, OS-level read failure, short write,
//! plus the codec-side failures the persistence bridge propagates
//! unchanged. Reaching end-of-file is not an error — it is a queryable
//! stream condition.

use thiserror::Error;

/// Failure raised by any file or codec operation.
///
/// Variants that originate in the OS carry the raw `errno` value from the
/// failing call; [`IoError::errno`] exposes it uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IoError {
    /// open(2) refused the path (missing file, permissions, bad flags).
    #[error("could not open file {path:?}: os error {errno}")]
    Open { path: String, errno: i32 },

    /// The access-mode string is not in the fopen vocabulary.
    #[error("invalid access mode {mode:?}")]
    InvalidMode { mode: String },

    /// An operation was invoked on a File with no live handle.
    #[error("file is not open")]
    NotOpen,

    /// close(2) reported failure. The handle is already reset by the
    /// time this is returned.
    #[error("failed to close file: os error {errno}")]
    Close { errno: i32 },

    /// lseek(2) rejected a reposition.
    #[error("failed to seek in file: os error {errno}")]
    Seek { errno: i32 },

    /// lseek(2) could not report the cursor.
    #[error("failed to tell file position: os error {errno}")]
    Tell { errno: i32 },

    /// Staged bytes could not be delivered to the descriptor.
    #[error("failed to flush file: os error {errno}")]
    Flush { errno: i32 },

    /// read(2) reported failure (distinct from reading zero bytes at EOF).
    #[error("failed to read from file: os error {errno}")]
    Read { errno: i32 },

    /// A write completed fewer elements than requested.
    #[error("short write: completed {written} of {expected} element(s)")]
    Write { written: usize, expected: usize },

    /// A codec needed more bytes than the stream had.
    #[error("unexpected end of stream while decoding")]
    UnexpectedEof,

    /// A codec rejected the byte stream it was handed.
    #[error("codec error: {message}")]
    Codec { message: String },
}

impl IoError {
    /// Build an open failure, capturing the path for context.
    pub fn open(path: impl Into<String>, errno: i32) -> Self {
        IoError::Open {
            path: path.into(),
            errno,
        }
    }

    /// Build a codec rejection with a human-readable reason.
    pub fn codec(message: impl Into<String>) -> Self {
        IoError::Codec {
            message: message.into(),
        }
    }

    /// The OS error code behind this failure, when one exists.
    pub fn errno(&self) -> Option<i32> {
        match *self {
            IoError::Open { errno, .. }
            | IoError::Close { errno }
            | IoError::Seek { errno }
            | IoError::Tell { errno }
            | IoError::Flush { errno }
            | IoError::Read { errno } => Some(errno),
            _ => None,
        }
    }
}
