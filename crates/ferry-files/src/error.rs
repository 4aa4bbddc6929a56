//! Error types for file handling.

use thiserror::Error;

/// File handling errors
#[derive(Debug, Error)]
pub enum FileError {
    /// Chunk size of zero or outside the permitted range
    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(usize),

    /// File descriptor with an empty name
    #[error("file name must not be empty")]
    EmptyFileName,

    /// Reassembled length differs from the announced size
    #[error("reassembled size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Announced file size
        expected: u64,
        /// Bytes actually accumulated
        actual: u64,
    },

    /// Path has no usable file name component
    #[error("path has no file name: {0}")]
    InvalidPath(String),

    /// File I/O error
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}
