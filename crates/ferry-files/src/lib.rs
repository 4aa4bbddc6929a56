//! # ferry files
//!
//! File handling for the ferry transfer protocol.
//!
//! This crate provides:
//! - File chunking with configurable chunk size
//! - Ordered chunk reassembly with exact-size verification
//! - File descriptors (name, size, mime type) for announcements
//! - Async file loading and persistence

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunker;
pub mod error;
pub mod io;
pub mod reassembler;

pub use chunker::FileChunker;
pub use error::FileError;
pub use io::{OutboundFile, ReceivedFile};
pub use reassembler::ReceptionBuffer;

/// Default chunk size (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Largest permitted chunk size (1 MiB); one chunk is one transport message
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Descriptor of one logical file in a transfer batch.
///
/// Created when a file is queued for sending; immutable afterwards. The
/// receiver learns it from the announcement frame that precedes the file's
/// binary chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// File name (never empty)
    pub name: String,
    /// File size in bytes
    pub size: u64,
    /// Mime type, empty when unknown
    pub mime_type: String,
}

impl FileDescriptor {
    /// Create a descriptor, rejecting empty file names.
    pub fn new(
        name: impl Into<String>,
        size: u64,
        mime_type: impl Into<String>,
    ) -> Result<Self, FileError> {
        let name = name.into();
        if name.is_empty() {
            return Err(FileError::EmptyFileName);
        }
        Ok(Self {
            name,
            size,
            mime_type: mime_type.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_rejects_empty_name() {
        assert!(matches!(
            FileDescriptor::new("", 10, "text/plain"),
            Err(FileError::EmptyFileName)
        ));
    }

    #[test]
    fn test_descriptor_allows_empty_mime() {
        let desc = FileDescriptor::new("notes.txt", 10, "").unwrap();
        assert_eq!(desc.name, "notes.txt");
        assert_eq!(desc.size, 10);
        assert!(desc.mime_type.is_empty());
    }

    #[test]
    fn test_descriptor_allows_zero_size() {
        let desc = FileDescriptor::new("empty.bin", 0, "application/octet-stream").unwrap();
        assert_eq!(desc.size, 0);
    }
}
